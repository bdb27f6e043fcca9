use serde::{Deserialize, Serialize};

use super::settings::GenerationSettings;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub settings: GenerationSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, settings: GenerationSettings) -> Self {
        Self {
            prompt: prompt.into(),
            settings,
            system_prompt: None,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }
}

/// Body returned by `POST /generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_time: Option<u64>,
}

impl GenerationResponse {
    pub fn success(outcome: &GenerationOutcome) -> Self {
        Self {
            success: true,
            image_url: Some(outcome.image_url.clone()),
            error: None,
            generation_time: Some(outcome.generation_time_ms),
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            image_url: None,
            error: Some(error.into()),
            generation_time: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub image_url: String,
    pub generation_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedImage {
    pub id: String,
    pub url: String,
    pub prompt: String,
    pub timestamp: i64,
    pub settings: GenerationSettings,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Style;

    #[test]
    fn test_request_accepts_camel_case() {
        let request: GenerationRequest = serde_json::from_str(
            r#"{"prompt":"a red fox","settings":{"width":1024,"height":1024,"quality":"standard","style":"realistic"},"systemPrompt":"be nice"}"#,
        )
        .unwrap();
        assert_eq!(request.prompt, "a red fox");
        assert_eq!(request.settings.style, Style::Realistic);
        assert_eq!(request.system_prompt.as_deref(), Some("be nice"));
    }

    #[test]
    fn test_response_omits_absent_fields() {
        let ok = GenerationResponse::success(&GenerationOutcome {
            image_url: "https://cdn.example.com/out.png".into(),
            generation_time_ms: 1200,
        });
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["imageUrl"], "https://cdn.example.com/out.png");
        assert_eq!(json["generationTime"], 1200);
        assert!(json.get("error").is_none());

        let err = serde_json::to_value(GenerationResponse::failure("nope")).unwrap();
        assert_eq!(err["success"], false);
        assert_eq!(err["error"], "nope");
        assert!(err.get("imageUrl").is_none());
    }
}
