use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use directories::ProjectDirs;

use crate::cli::*;
use crate::engine::{DEFAULT_RANK, DEFAULT_THRESHOLD, EngineBuilder, RecognitionEngine};
use crate::store::GalleryFile;

static CONF_DIR: LazyLock<ConfDir> = LazyLock::new(|| {
    let proj_dirs =
        ProjectDirs::from("", "eigenface", "eigenface").expect("failed to get project dir");
    ConfDir { path: proj_dirs.config_dir().to_path_buf() }
});

fn default_config_dir() -> &'static str {
    CONF_DIR.path().to_str().unwrap()
}

#[derive(Parser, Debug, Clone)]
pub struct EngineOptions {
    /// 保留的特征脸数量上限
    #[arg(short, long, value_name = "N", default_value_t = DEFAULT_RANK)]
    pub rank: usize,
    /// 识别成功所允许的最大距离平方，距离必须严格小于该值
    #[arg(short, long, value_name = "DISTANCE", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,
}

impl EngineOptions {
    /// 根据图库文件创建引擎，并加载其中所有人脸
    pub fn open(&self, gallery: &GalleryFile) -> anyhow::Result<RecognitionEngine> {
        let mut engine = EngineBuilder::new(gallery.face_length)
            .rank(self.rank)
            .threshold(self.threshold)
            .build()?;
        gallery.restore(&mut engine)?;
        Ok(engine)
    }
}

/// 特征向量来源：命令行参数或文件
#[derive(Args, Debug, Clone)]
#[group(required = true, multiple = false)]
pub struct VectorInput {
    /// 以逗号分隔的特征向量，如 `0.1,0.2,0.3`
    #[arg(value_name = "VECTOR", allow_hyphen_values = true)]
    pub vector: Option<String>,
    /// 从文件读取特征向量，数值之间用逗号或空白分隔
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl VectorInput {
    pub fn read(&self) -> anyhow::Result<Vec<f64>> {
        match (&self.vector, &self.file) {
            (Some(s), _) => parse_vector(s),
            (None, Some(path)) => {
                let s = fs::read_to_string(path)
                    .with_context(|| format!("无法读取 {}", path.display()))?;
                parse_vector(&s)
            }
            (None, None) => bail!("需要提供特征向量或文件"),
        }
    }
}

#[derive(Parser, Debug, Clone)]
#[command(name = "eigenface", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// eigenface 配置文件目录
    #[arg(short, long, default_value = default_config_dir())]
    pub conf_dir: ConfDir,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 创建一个空的图库
    Init(InitCommand),
    /// 添加训练人脸
    Enroll(EnrollCommand),
    /// 移除训练人脸
    Withdraw(WithdrawCommand),
    /// 列出图库中的人脸
    List(ListCommand),
    /// 识别一张人脸
    Identify(IdentifyCommand),
    /// 导出特征脸和均值脸
    Export(ExportCommand),
    /// 启动 HTTP 识别服务
    Server(ServerCommand),
}

#[derive(Debug, Clone)]
pub struct ConfDir {
    path: PathBuf,
}

impl ConfDir {
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// 返回图库文件的路径
    pub fn gallery(&self) -> PathBuf {
        self.path.join("gallery.json")
    }

    /// 返回特征脸矩阵的导出路径
    pub fn eigenfaces(&self) -> PathBuf {
        self.path.join("eigenfaces.npy")
    }

    /// 返回均值脸的导出路径
    pub fn mean(&self) -> PathBuf {
        self.path.join("mean.npy")
    }
}

impl FromStr for ConfDir {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self { path: PathBuf::from(s) })
    }
}

/// 解析以逗号或空白分隔的浮点数
pub fn parse_vector(s: &str) -> anyhow::Result<Vec<f64>> {
    let v = s
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| part.parse::<f64>().with_context(|| format!("无效的数值: {}", part)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if v.is_empty() {
        bail!("特征向量不能为空");
    }
    Ok(v)
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_vector() {
        assert_eq!(parse_vector("1,2.5,-3").unwrap(), vec![1.0, 2.5, -3.0]);
        assert_eq!(parse_vector(" 1\n2\t3 ,4\n").unwrap(), vec![1.0, 2.0, 3.0, 4.0]);
        assert!(parse_vector("1,x").is_err());
        assert!(parse_vector(" , ").is_err());
    }

    #[test]
    fn test_conf_dir_paths() {
        let conf_dir: ConfDir = "/tmp/eigenface".parse().unwrap();
        assert_eq!(conf_dir.gallery(), PathBuf::from("/tmp/eigenface/gallery.json"));
        assert_eq!(conf_dir.eigenfaces(), PathBuf::from("/tmp/eigenface/eigenfaces.npy"));
        assert_eq!(conf_dir.mean(), PathBuf::from("/tmp/eigenface/mean.npy"));
    }

    #[test]
    fn test_parse_opts() {
        let opts = Opts::try_parse_from([
            "eigenface", "-c", "/tmp/x", "identify", "-t", "0.5", "1,0,0",
        ])
        .unwrap();
        assert_eq!(opts.conf_dir.path(), Path::new("/tmp/x"));
        match opts.subcmd {
            SubCommand::Identify(cmd) => {
                assert_eq!(cmd.engine.threshold, 0.5);
                assert_eq!(cmd.engine.rank, DEFAULT_RANK);
                assert_eq!(cmd.input.read().unwrap(), vec![1.0, 0.0, 0.0]);
            }
            _ => panic!("unexpected subcommand"),
        }
    }
}
