//! AI enrichment configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// OpenAI enrichment configuration.
///
/// The engine runs without a key: enrichment calls then resolve through the
/// deterministic fallback content, so an absent key is valid configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// API key, `sk-...`; leave unset to run fallback-only
    pub openai_api_key: Option<String>,

    /// Chat model name
    #[serde(default = "default_model")]
    pub model: String,

    /// Endpoint root, overridable for proxies and tests
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout, seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl AiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// True when a non-empty API key is present.
    pub fn has_openai(&self) -> bool {
        self.openai_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(key) = &self.openai_api_key {
            if !key.is_empty() && !key.starts_with("sk-") {
                return Err(ValidationError::InvalidOpenAiKey);
            }
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
        }
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}
