pub mod cli;
pub mod config;
pub mod eigen;
pub mod engine;
pub mod error;
pub mod face;
pub mod gallery;
mod metrics;
mod server;
pub mod store;

pub use config::Opts;
pub use engine::{EngineBuilder, Identification, RecognitionEngine, SearchResult};
pub use error::{Error, Result};
pub use face::Face;
pub use gallery::TrainingGallery;
