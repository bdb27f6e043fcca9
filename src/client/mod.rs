pub mod image_client;

use crate::{
    error::Result,
    models::{GenerationOutcome, GenerationRequest},
};
use async_trait::async_trait;
use std::sync::Arc;

pub use image_client::{extract_image_url, extract_image_urls, ImageClient};

/// Anything that can turn a [`GenerationRequest`] into an image URL.
///
/// [`ImageClient`] is the network implementation; the controller and the HTTP
/// surface only depend on this trait so a canned generator can stand in for it.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome>;
}

#[async_trait]
impl ImageGenerator for ImageClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        ImageClient::generate(self, request).await
    }
}

#[async_trait]
impl<T: ImageGenerator + ?Sized> ImageGenerator for Arc<T> {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        (**self).generate(request).await
    }
}
