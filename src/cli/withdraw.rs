use anyhow::Result;
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts};
use crate::face::Face;
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct WithdrawCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    /// 要移除的人脸 id
    pub id: String,
}

impl SubCommandExtend for WithdrawCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let path = opts.conf_dir.gallery();
        let mut engine = self.engine.open(&GalleryFile::load(&path)?)?;

        // 只按 id 比较，向量内容无关
        if engine.withdraw(&Face::new(self.id.clone(), Vec::<f64>::new()))? {
            GalleryFile::snapshot(&engine).save(&path)?;
            println!("removed {}", self.id);
        } else {
            println!("not found {}", self.id);
        }
        info!("图库共 {} 张人脸", engine.gallery().len());
        Ok(())
    }
}
