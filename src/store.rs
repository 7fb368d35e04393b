use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::eigen::EigenSolver;
use crate::engine::RecognitionEngine;
use crate::face::Face;

/// 图库文件，只保存 id 和特征向量，投影系数在加载时重新计算
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryFile {
    pub face_length: usize,
    #[serde(default)]
    pub faces: Vec<Face>,
}

impl GalleryFile {
    pub fn new(face_length: usize) -> Self {
        Self { face_length, faces: vec![] }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("无法打开图库文件 {}，请先运行 init", path.display()))?;
        let mut gallery: Self = serde_json::from_reader(BufReader::new(file))?;
        // 系数来自上一次计算，不可信
        gallery.faces = gallery.faces.iter().map(Face::deep_copy).collect();
        debug!("loaded {} faces from {}", gallery.faces.len(), path.display());
        Ok(gallery)
    }

    /// 先写入临时文件再重命名，避免中途失败留下损坏的图库
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut tmp_file = path.to_path_buf();
        tmp_file.set_extension("json.tmp");
        {
            let mut writer = BufWriter::new(File::create(&tmp_file)?);
            serde_json::to_writer_pretty(&mut writer, self)?;
            writer.flush()?;
        }
        fs::rename(&tmp_file, path)?;
        debug!("saved {} faces to {}", self.faces.len(), path.display());
        Ok(())
    }

    /// 把所有人脸一次性加入引擎，只重建一次子空间
    pub fn restore<S: EigenSolver>(&self, engine: &mut RecognitionEngine<S>) -> Result<()> {
        if engine.face_length() != self.face_length {
            bail!(
                "图库文件的 face_length 为 {}，引擎为 {}",
                self.face_length,
                engine.face_length()
            );
        }
        let count = engine
            .enroll_all(self.faces.iter().map(Face::deep_copy))
            .context("无法加载图库中的人脸")?;
        debug!("restored {} faces", count);
        Ok(())
    }

    /// 从引擎的当前图库生成文件内容
    pub fn snapshot<S: EigenSolver>(engine: &RecognitionEngine<S>) -> Self {
        Self {
            face_length: engine.face_length(),
            faces: engine.gallery().faces().iter().map(Face::deep_copy).collect(),
        }
    }
}
