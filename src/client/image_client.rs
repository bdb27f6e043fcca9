use crate::{
    config::GeneratorConfig,
    error::{GenerationError, Result},
    models::{ChatCompletionRequest, GenerationOutcome, GenerationRequest, ModelInfo},
    logger,
    prompt::compose_prompt,
};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{Client, StatusCode};

// unwrap() on the fallback: the empty-match pattern is known-good
static IMAGE_URL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)https?://[^\s<>"{}|\\^`\[\]]+\.(?:jpg|jpeg|png|webp)"#).unwrap_or_else(|e| {
        log::error!("Failed to compile image URL pattern: {}", e);
        Regex::new(r"[^\s\S]").unwrap()
    })
});

/// All image URLs embedded in free-form model output, in order of appearance.
pub fn extract_image_urls(content: &str) -> Vec<&str> {
    IMAGE_URL_PATTERN
        .find_iter(content)
        .map(|m| m.as_str())
        .collect()
}

pub fn extract_image_url(content: &str) -> Option<String> {
    IMAGE_URL_PATTERN
        .find(content)
        .map(|m| m.as_str().to_string())
}

#[derive(Clone)]
pub struct ImageClient {
    client: Client,
    config: GeneratorConfig,
}

impl ImageClient {
    pub fn new(config: GeneratorConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GenerationError::ConfigError(format!("HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn supported_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "replicate/black-forest-labs/flux-1.1-pro".into(),
                name: "FLUX 1.1 Pro".into(),
                provider: "Black Forest Labs".into(),
                description: "High quality text-to-image generation".into(),
            },
            ModelInfo {
                id: "replicate/black-forest-labs/flux-schnell".into(),
                name: "FLUX Schnell".into(),
                provider: "Black Forest Labs".into(),
                description: "Fast draft-quality generation".into(),
            },
        ]
    }

    pub async fn generate(&self, request: &GenerationRequest) -> Result<GenerationOutcome> {
        if request.prompt.trim().is_empty() {
            return Err(GenerationError::InvalidInput(
                "Valid prompt is required".into(),
            ));
        }
        request.settings.validate()?;

        let composed = compose_prompt(
            &request.prompt,
            &request.settings,
            request.system_prompt.as_deref(),
        );
        let payload = ChatCompletionRequest::single_user_message(&self.config.model, composed);

        log::info!("Generating image with model: {}", self.config.model);
        log::debug!("Composed prompt: {}", payload.messages[0].content);

        let timer = logger::timer("image generation");

        let mut builder = self.client.post(&self.config.endpoint).json(&payload);
        if let Some(api_key) = &self.config.api_key {
            builder = builder.bearer_auth(api_key);
        }
        if let Some(customer_id) = &self.config.customer_id {
            builder = builder.header("customerId", customer_id);
        }

        let response = builder.send().await.map_err(classify_transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            log::error!("Image API error: {} {}", status.as_u16(), body);
            return Err(match status {
                StatusCode::TOO_MANY_REQUESTS => GenerationError::RateLimited,
                StatusCode::SERVICE_UNAVAILABLE => GenerationError::ServiceUnavailable,
                other => GenerationError::GenerationFailed(format!(
                    "upstream returned status {}",
                    other.as_u16()
                )),
            });
        }

        let image_url = image_url_from_body(&body)?;
        let generation_time_ms = timer.stop().as_millis() as u64;

        log::info!("Image generated in {}ms: {}", generation_time_ms, image_url);

        Ok(GenerationOutcome {
            image_url,
            generation_time_ms,
        })
    }
}

fn classify_transport_error(e: reqwest::Error) -> GenerationError {
    if e.is_timeout() {
        log::error!("Image API request timed out: {}", e);
        GenerationError::Timeout
    } else if e.is_connect() || e.is_request() {
        log::error!("Image API network error: {}", e);
        GenerationError::NetworkError(e.to_string())
    } else {
        log::error!("Unexpected image API error: {:?}", e);
        GenerationError::UnknownError(e.to_string())
    }
}

fn image_url_from_body(body: &str) -> Result<String> {
    let json: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        log::error!("Image API returned invalid JSON: {}", e);
        GenerationError::UnknownError(format!("invalid JSON in response: {}", e))
    })?;

    let Some(content) = json["choices"][0]["message"]["content"].as_str() else {
        log::error!("No message content in response: {}", body);
        return Err(GenerationError::NoImageInResponse);
    };

    let urls = extract_image_urls(content);
    match urls.as_slice() {
        [] => {
            log::error!("No image URL found in response: {}", body);
            Err(GenerationError::NoImageInResponse)
        }
        [first, rest @ ..] => {
            if rest.iter().any(|url| url != first) {
                log::warn!(
                    "Response contained {} image URLs, using the first",
                    urls.len()
                );
            }
            Ok(first.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body_with_content(content: &str) -> String {
        serde_json::json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })
        .to_string()
    }

    #[test]
    fn test_extracts_url_from_prose() {
        assert_eq!(
            extract_image_url("Here is your image: https://cdn.example.com/out.png enjoy!"),
            Some("https://cdn.example.com/out.png".to_string())
        );
    }

    #[test]
    fn test_extraction_stops_at_brackets_and_quotes() {
        assert_eq!(
            extract_image_url("![img](https://x.io/a/b.JPEG)").as_deref(),
            Some("https://x.io/a/b.JPEG")
        );
        assert_eq!(
            extract_image_url(r#"{"url":"http://h.net/p.webp"}"#).as_deref(),
            Some("http://h.net/p.webp")
        );
        assert_eq!(
            extract_image_url("[https://h.net/q.jpg]").as_deref(),
            Some("https://h.net/q.jpg")
        );
    }

    #[test]
    fn test_no_match_for_non_image_urls() {
        assert_eq!(extract_image_url("see https://example.com/page.html"), None);
        assert_eq!(extract_image_url("ftp://example.com/a.png"), None);
        assert!(extract_image_urls("").is_empty());
    }

    #[test]
    fn test_body_parsing() {
        let body = body_with_content("first https://a.com/1.png then https://b.com/2.jpg");
        assert_eq!(image_url_from_body(&body).unwrap(), "https://a.com/1.png");

        let body = body_with_content("I could not make that image.");
        assert!(matches!(
            image_url_from_body(&body),
            Err(GenerationError::NoImageInResponse)
        ));

        let body = serde_json::json!({ "choices": [] }).to_string();
        assert!(matches!(
            image_url_from_body(&body),
            Err(GenerationError::NoImageInResponse)
        ));

        let body = serde_json::json!({ "choices": [{ "message": { "content": [1, 2] } }] })
            .to_string();
        assert!(matches!(
            image_url_from_body(&body),
            Err(GenerationError::NoImageInResponse)
        ));

        assert!(matches!(
            image_url_from_body("<html>oops</html>"),
            Err(GenerationError::UnknownError(_))
        ));
    }

    #[test]
    fn test_client_rejects_bad_config() {
        let config = GeneratorConfig::new().with_endpoint("not a url");
        assert!(matches!(
            ImageClient::new(config),
            Err(GenerationError::ConfigError(_))
        ));
    }
}
