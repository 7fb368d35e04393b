use anyhow::Result;
use clap::Parser;
use log::debug;
use serde_json::json;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts, OutputFormat, VectorInput};
use crate::engine::SearchResult;
use crate::face::Face;
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct IdentifyCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    #[command(flatten)]
    pub input: VectorInput,
    /// 额外显示距离最近的人脸数量
    #[arg(long, value_name = "COUNT", default_value_t = 0)]
    pub count: usize,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", default_value = "table")]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for IdentifyCommand {
    async fn run(&self, opts: &Opts) -> Result<()> {
        let engine = self.engine.open(&GalleryFile::load(opts.conf_dir.gallery())?)?;
        let probe = Face::new("probe", self.input.read()?);

        let search = engine.search(&probe, self.count)?;
        debug!("threshold: {}, rank: {}", engine.threshold(), engine.rank());

        print_result(&search, self.output_format)
    }
}

fn print_result(search: &SearchResult, format: OutputFormat) -> Result<()> {
    let (result, nearest) = (search.result, &search.nearest);
    match format {
        OutputFormat::Json => {
            let value = json!({
                "match": result.map(|m| json!({ "id": m.face.id(), "distance": m.distance })),
                "nearest": nearest.iter().map(|m| (m.distance, m.face.id())).collect::<Vec<_>>(),
            });
            println!("{}", serde_json::to_string_pretty(&value)?)
        }
        OutputFormat::Table => {
            match result {
                Some(m) => println!("match\t{}\t{:.4}", m.face.id(), m.distance),
                None => println!("no match"),
            }
            for m in nearest {
                println!("{:.4}\t{}", m.distance, m.face.id());
            }
        }
    }
    Ok(())
}
