use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts, VectorInput};
use crate::face::Face;
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct EnrollCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    /// 人脸的唯一标识
    pub id: String,
    #[command(flatten)]
    pub input: VectorInput,
    /// 如果 id 已存在，是否覆盖旧的记录
    #[arg(long)]
    pub overwrite: bool,
}

impl SubCommandExtend for EnrollCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let path = opts.conf_dir.gallery();
        let mut engine = self.engine.open(&GalleryFile::load(&path)?)?;

        let face = Face::new(self.id.clone(), self.input.read()?);
        if self.overwrite {
            if engine.replace(face)? {
                info!("覆盖旧记录: {}", self.id);
            }
        } else if engine.gallery().get(face.id()).is_some() {
            bail!("人脸 {} 已存在，使用 --overwrite 覆盖", face.id());
        } else {
            engine.enroll(face)?;
        }

        GalleryFile::snapshot(&engine).save(&path)?;
        info!("已添加 {}，图库共 {} 张人脸", self.id, engine.gallery().len());
        Ok(())
    }
}
