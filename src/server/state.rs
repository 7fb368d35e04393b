use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::engine::RecognitionEngine;
use crate::store::GalleryFile;

/// 应用状态
pub struct AppState {
    /// 识别引擎，识别时加读锁，修改图库时加写锁
    pub engine: RwLock<RecognitionEngine>,
    /// 图库文件路径，为 `None` 时不保存修改
    pub gallery_path: Option<PathBuf>,
}

impl AppState {
    /// 创建新的应用状态
    pub fn new(engine: RecognitionEngine, gallery_path: Option<PathBuf>) -> Arc<Self> {
        Arc::new(AppState { engine: RwLock::new(engine), gallery_path })
    }

    /// 保存图库，调用方需持有写锁
    pub fn persist(&self, engine: &RecognitionEngine) -> anyhow::Result<()> {
        if let Some(path) = &self.gallery_path {
            GalleryFile::snapshot(engine).save(path)?;
        }
        Ok(())
    }
}
