use anyhow::{Result, bail};
use clap::Parser;
use log::info;

use crate::cli::SubCommandExtend;
use crate::config::Opts;
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct InitCommand {
    /// 特征向量长度，图库中所有人脸必须一致
    #[arg(short = 'l', long, value_name = "N")]
    pub face_length: usize,
    /// 如果图库已存在，是否覆盖
    #[arg(long)]
    pub force: bool,
}

impl SubCommandExtend for InitCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        if self.face_length == 0 {
            bail!("face_length 必须大于 0");
        }
        let path = opts.conf_dir.gallery();
        if path.exists() && !self.force {
            bail!("图库已存在: {}，使用 --force 覆盖", path.display());
        }
        GalleryFile::new(self.face_length).save(&path)?;
        info!("已创建图库: {}", path.display());
        Ok(())
    }
}
