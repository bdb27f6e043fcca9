use std::env;
use std::time::Duration;

use crate::error::{GenerationError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://oi-server.onrender.com/chat/completions";
pub const DEFAULT_MODEL: &str = "replicate/black-forest-labs/flux-1.1-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub endpoint: String,
    pub model: String,
    pub api_key: Option<String>,
    pub customer_id: Option<String>,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: Option<u16>,
    pub generator: GeneratorConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: None,
            customer_id: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl GeneratorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let defaults = Self::default();
        let endpoint = env::var("IMAGE_API_ENDPOINT").unwrap_or(defaults.endpoint);
        let model = env::var("IMAGE_MODEL").unwrap_or(defaults.model);
        let api_key = env::var("IMAGE_API_KEY").ok().filter(|s| !s.is_empty());
        let customer_id = env::var("IMAGE_CUSTOMER_ID").ok().filter(|s| !s.is_empty());
        let timeout = env::var("IMAGE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.timeout);

        GeneratorConfig {
            endpoint,
            model,
            api_key,
            customer_id,
            timeout,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_credentials(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = Some(customer_id.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(GenerationError::ConfigError(format!(
                "Endpoint must be an http(s) URL, got '{}'",
                self.endpoint
            )));
        }
        if self.model.trim().is_empty() {
            return Err(GenerationError::ConfigError("Model identifier is required".into()));
        }
        if self.timeout.is_zero() {
            return Err(GenerationError::ConfigError("Timeout must be non-zero".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: None,
            generator: GeneratorConfig::default(),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("PORT").ok().and_then(|port| port.parse().ok());

        Config {
            host,
            port,
            generator: GeneratorConfig::from_env(),
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_generator(mut self, config: GeneratorConfig) -> Self {
        self.generator = config;
        self
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(8080)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::new();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.timeout, Duration::from_secs(300));
        assert!(config.api_key.is_none());
        assert!(config.validate().is_ok());
        assert_eq!(Config::new().port_or_default(), 8080);
    }

    #[test]
    fn test_builder_and_validation() {
        let config = GeneratorConfig::new()
            .with_endpoint("ftp://nope")
            .with_credentials("key");
        assert_eq!(config.api_key.as_deref(), Some("key"));
        assert!(matches!(
            config.validate(),
            Err(GenerationError::ConfigError(_))
        ));

        let zero = GeneratorConfig::new().with_timeout(Duration::ZERO);
        assert!(zero.validate().is_err());
    }
}
