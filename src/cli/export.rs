use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;
use ndarray::{Array1, Array2};
use ndarray_npy::write_npy;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts};
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct ExportCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    /// 输出目录，默认为配置目录
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

impl SubCommandExtend for ExportCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = self.engine.open(&GalleryFile::load(opts.conf_dir.gallery())?)?;
        let basis = engine.eigenfaces().ok_or_else(|| anyhow!("图库为空，没有可导出的特征脸"))?;
        let mean = engine.mean_face().ok_or_else(|| anyhow!("图库为空，没有均值脸"))?;

        // 每行一张特征脸
        let eigenfaces = Array2::from_shape_fn((basis.ncols(), basis.nrows()), |(i, j)| basis[(j, i)]);
        let mean = Array1::from_vec(mean.vector().to_vec());

        let (eigenfaces_path, mean_path) = match &self.output {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                (dir.join("eigenfaces.npy"), dir.join("mean.npy"))
            }
            None => (opts.conf_dir.eigenfaces(), opts.conf_dir.mean()),
        };
        write_npy(&eigenfaces_path, &eigenfaces)?;
        write_npy(&mean_path, &mean)?;
        info!("导出 {} 张特征脸到 {}", eigenfaces.nrows(), eigenfaces_path.display());
        Ok(())
    }
}
