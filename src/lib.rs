pub mod client;
pub mod config;
pub mod error;
pub mod gallery;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod prompt;
#[cfg(feature = "server")]
pub mod server;

pub use client::{ImageClient, ImageGenerator};
pub use config::{Config, GeneratorConfig};
pub use error::{GenerationError, Result};
pub use gallery::{GalleryStore, ImageDownloader};
pub use models::*;
pub use orchestrator::{GenerationController, GenerationState, ViewState};
pub use prompt::compose_prompt;
