use clap::Parser;
use log::info;
use tokio::net::TcpListener;

use crate::cli::SubCommandExtend;
use crate::config::{EngineOptions, Opts};
use crate::server;
use crate::store::GalleryFile;

#[derive(Parser, Debug, Clone)]
pub struct ServerCommand {
    #[command(flatten)]
    pub engine: EngineOptions,
    /// 监听地址
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub addr: String,
    /// 不把图库的修改写回文件
    #[arg(long)]
    pub no_persist: bool,
}

impl SubCommandExtend for ServerCommand {
    async fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        let path = opts.conf_dir.gallery();
        let engine = self.engine.open(&GalleryFile::load(&path)?)?;
        info!("已加载 {} 张人脸", engine.gallery().len());

        // 创建应用状态
        let state = server::AppState::new(engine, (!self.no_persist).then_some(path));

        // 创建应用
        let app = server::create_app(state);

        // 启动服务器
        info!("服务器启动：http://{}", &self.addr);
        let listener = TcpListener::bind(&self.addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
