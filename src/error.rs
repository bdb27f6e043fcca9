use thiserror::Error;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Image generation timed out")]
    Timeout,
    #[error("Upstream rate limit exceeded")]
    RateLimited,
    #[error("Upstream service unavailable")]
    ServiceUnavailable,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("No image URL found in response")]
    NoImageInResponse,
    #[error("Generation failed: {0}")]
    GenerationFailed(String),
    #[error("Unknown error: {0}")]
    UnknownError(String),
    #[error("A generation is already in progress")]
    Busy,
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Download error: {0}")]
    DownloadError(String),
}

impl GenerationError {
    /// Short message suitable for showing to an end user.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::InvalidInput(msg) => msg.clone(),
            GenerationError::Timeout => {
                "Generation timed out. Please try again with a simpler prompt.".into()
            }
            GenerationError::RateLimited => {
                "Rate limit exceeded. Please try again in a few moments.".into()
            }
            GenerationError::ServiceUnavailable => {
                "Service temporarily unavailable. Please try again.".into()
            }
            GenerationError::NetworkError(_) => {
                "Network error. Please check your connection and try again.".into()
            }
            GenerationError::NoImageInResponse => "Failed to extract image from response".into(),
            GenerationError::GenerationFailed(_) => {
                "Failed to generate image. Please try again.".into()
            }
            GenerationError::Busy => "An image is already being generated.".into(),
            GenerationError::DownloadError(_) => "Failed to download image".into(),
            GenerationError::UnknownError(_) | GenerationError::ConfigError(_) => {
                "An unexpected error occurred. Please try again.".into()
            }
        }
    }

    /// HTTP status used when the error is reported by the `/generate` endpoint.
    pub fn http_status(&self) -> u16 {
        match self {
            GenerationError::InvalidInput(_) => 400,
            GenerationError::Timeout => 408,
            GenerationError::Busy => 409,
            GenerationError::RateLimited => 429,
            GenerationError::ServiceUnavailable | GenerationError::NetworkError(_) => 503,
            GenerationError::NoImageInResponse
            | GenerationError::GenerationFailed(_)
            | GenerationError::UnknownError(_)
            | GenerationError::ConfigError(_)
            | GenerationError::DownloadError(_) => 500,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            GenerationError::InvalidInput(_) => "invalid_input",
            GenerationError::Timeout => "timeout",
            GenerationError::RateLimited => "rate_limited",
            GenerationError::ServiceUnavailable => "service_unavailable",
            GenerationError::NetworkError(_) => "network_error",
            GenerationError::NoImageInResponse => "no_image_in_response",
            GenerationError::GenerationFailed(_) => "generation_failed",
            GenerationError::UnknownError(_) => "unknown_error",
            GenerationError::Busy => "busy",
            GenerationError::ConfigError(_) => "config_error",
            GenerationError::DownloadError(_) => "download_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;
