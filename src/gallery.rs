use crate::{
    error::{GenerationError, Result},
    models::GeneratedImage,
};
use reqwest::Client;
use std::path::{Path, PathBuf};

/// Newest-first, in-memory collection of generated images for the current session.
#[derive(Debug, Clone, Default)]
pub struct GalleryStore {
    images: Vec<GeneratedImage>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, image: GeneratedImage) {
        self.images.insert(0, image);
    }

    /// Returns whether an entry was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.images.len();
        self.images.retain(|image| image.id != id);
        before != self.images.len()
    }

    pub fn clear(&mut self) {
        self.images.clear();
    }

    pub fn list(&self) -> &[GeneratedImage] {
        &self.images
    }

    pub fn get(&self, id: &str) -> Option<&GeneratedImage> {
        self.images.iter().find(|image| image.id == id)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

pub fn download_filename(image: &GeneratedImage) -> String {
    format!("generated-image-{}.png", image.id)
}

/// Fetches a gallery image and saves it under a directory.
#[derive(Clone, Default)]
pub struct ImageDownloader {
    client: Client,
}

impl ImageDownloader {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub async fn download(&self, image: &GeneratedImage, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(download_filename(image));
        log::info!("Downloading image {} to {}", image.id, path.display());

        let response = self
            .client
            .get(&image.url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| GenerationError::DownloadError(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| GenerationError::DownloadError(e.to_string()))?;

        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|e| GenerationError::DownloadError(e.to_string()))?;

        log::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
