use clap::Parser;
use eigenface::Opts;
use eigenface::cli::SubCommandExtend;
use eigenface::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();

    match &opts.subcmd {
        SubCommand::Init(config) => config.run(&opts).await,
        SubCommand::Enroll(config) => config.run(&opts).await,
        SubCommand::Withdraw(config) => config.run(&opts).await,
        SubCommand::List(config) => config.run(&opts).await,
        SubCommand::Identify(config) => config.run(&opts).await,
        SubCommand::Export(config) => config.run(&opts).await,
        SubCommand::Server(config) => config.run(&opts).await,
    }
}
