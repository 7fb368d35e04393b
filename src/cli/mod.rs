mod enroll;
mod export;
mod identify;
mod init;
mod list;
pub mod server;
mod withdraw;

pub use enroll::*;
pub use export::*;
pub use identify::*;
pub use init::*;
pub use list::*;
pub use server::*;
pub use withdraw::*;

use crate::config::Opts;

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}
