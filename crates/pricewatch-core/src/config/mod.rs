//! Resolver configuration.
//!
//! The Gemini API key, model, and endpoint come from the environment so the
//! same build works against the public API or a proxy.

use std::time::Duration;

use crate::error::{Error, Result};
use crate::util::{is_http_url, normalize_text_option};

pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "PRICEWATCH_GEMINI_MODEL";
pub const ENV_GEMINI_BASE_URL: &str = "PRICEWATCH_GEMINI_BASE_URL";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the AI resolver.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolverConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl std::fmt::Debug for ResolverConfig {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ResolverConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ResolverConfig {
    /// Build a config with default model and endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::from_parts(Some(api_key.into()), None, None)?
            .ok_or_else(|| Error::InvalidInput("Gemini API key must not be empty".to_string()))
    }

    /// Read the resolver config from the environment.
    ///
    /// Returns `Ok(None)` when no API key is set.
    pub fn from_env() -> Result<Option<Self>> {
        Self::from_parts(
            std::env::var(ENV_GEMINI_API_KEY).ok(),
            std::env::var(ENV_GEMINI_MODEL).ok(),
            std::env::var(ENV_GEMINI_BASE_URL).ok(),
        )
    }

    /// Assemble a config from optional raw values, applying defaults.
    pub fn from_parts(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
    ) -> Result<Option<Self>> {
        let Some(api_key) = normalize_text_option(api_key) else {
            return Ok(None);
        };

        let base_url = normalize_text_option(base_url)
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !is_http_url(&base_url) {
            return Err(Error::InvalidInput(format!(
                "{ENV_GEMINI_BASE_URL} must start with http:// or https://"
            )));
        }

        let model = normalize_text_option(model).unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Some(Self {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }))
    }

    /// Full `generateContent` endpoint for the configured model.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_means_unconfigured() {
        assert_eq!(ResolverConfig::from_parts(None, None, None).unwrap(), None);
        assert_eq!(
            ResolverConfig::from_parts(Some("  ".to_string()), None, None).unwrap(),
            None
        );
        assert!(ResolverConfig::new("").is_err());
    }

    #[test]
    fn defaults_are_applied() {
        let config = ResolverConfig::new(" key ").unwrap();
        assert_eq!(config.api_key, "key");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(
            config.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn base_url_must_be_http() {
        let error = ResolverConfig::from_parts(
            Some("key".to_string()),
            None,
            Some("proxy.local".to_string()),
        )
        .unwrap_err();
        assert!(error.to_string().contains(ENV_GEMINI_BASE_URL));

        let config = ResolverConfig::from_parts(
            Some("key".to_string()),
            Some("gemini-pro".to_string()),
            Some("http://localhost:8080/".to_string()),
        )
        .unwrap()
        .unwrap();
        assert_eq!(
            config.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-pro:generateContent"
        );
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = ResolverConfig::new("secret").unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
