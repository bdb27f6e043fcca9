pub mod common;
pub mod image;
pub mod settings;

pub use common::*;
pub use image::*;
pub use settings::*;
