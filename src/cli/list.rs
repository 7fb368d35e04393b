use anyhow::Result;
use clap::Parser;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts, OutputFormat};
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ListCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = self.engine.open(&GalleryFile::load(opts.conf_dir.gallery())?)?;
        let faces = engine.gallery().faces();

        match self.output_format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(faces)?),
            OutputFormat::Table => {
                for face in faces {
                    let coefficients = face
                        .coefficients()
                        .unwrap_or_default()
                        .iter()
                        .map(|c| format!("{:.4}", c))
                        .collect::<Vec<_>>();
                    println!("{}\t[{}]", face.id(), coefficients.join(", "));
                }
            }
        }
        Ok(())
    }
}
