// SPDX-License-Identifier: MIT

//! Model configuration resolved from the environment
//!
//! The credential is looked up when the config is built, so a missing
//! `GITHUB_TOKEN` / `OPENAI_API_KEY` fails at client construction rather than
//! on the first request.

use crate::adk::error::{PathwayError, Result};
use crate::adk::model::GenerationConfig;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which hosted API surface to talk to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// GitHub Models inference endpoint
    GitHub,
    /// OpenAI API
    OpenAI,
}

impl Provider {
    /// Environment variable holding the bearer token
    pub fn credential_var(&self) -> &'static str {
        match self {
            Provider::GitHub => "GITHUB_TOKEN",
            Provider::OpenAI => "OPENAI_API_KEY",
        }
    }

    /// Environment variable overriding the endpoint
    pub fn endpoint_var(&self) -> &'static str {
        match self {
            Provider::GitHub => "GITHUB_MODELS_ENDPOINT",
            Provider::OpenAI => "OPENAI_BASE_URL",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Provider::GitHub => "https://models.github.ai/inference",
            Provider::OpenAI => "https://api.openai.com/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::GitHub => "openai/gpt-4.1",
            Provider::OpenAI => "gpt-4.1",
        }
    }

    /// Short label used in logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::OpenAI => "openai",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Provider {
    type Err = PathwayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "github" | "github-models" | "github_models" => Ok(Provider::GitHub),
            "openai" => Ok(Provider::OpenAI),
            other => Err(PathwayError::config(format!(
                "Unknown model provider: {}",
                other
            ))),
        }
    }
}

/// Everything needed to construct a model client
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub provider: Provider,
    pub model_id: String,
    pub base_url: Url,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
    /// Immediate retries after a retryable failure
    pub retries: u32,
}

impl ModelConfig {
    /// Resolve the config from process environment variables
    pub fn from_env(provider: Provider) -> Result<Self> {
        Self::from_lookup(provider, |key| env::var(key).ok())
    }

    /// Resolve the config through an arbitrary variable lookup
    pub fn from_lookup<F>(provider: Provider, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credential_var = provider.credential_var();
        let api_key = lookup(credential_var)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PathwayError::config(format!("{} environment variable not set.", credential_var))
            })?;

        let endpoint = lookup(provider.endpoint_var())
            .unwrap_or_else(|| provider.default_endpoint().to_string());
        let base_url = Url::parse(&endpoint).map_err(|e| {
            PathwayError::config(format!("Invalid endpoint '{}': {}", endpoint, e))
        })?;

        let model_id = lookup("MODEL_ID").unwrap_or_else(|| provider.default_model().to_string());

        Ok(Self {
            provider,
            model_id,
            base_url,
            api_key,
            max_tokens: parse_override(&lookup, "MODEL_MAX_TOKENS")?
                .unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: parse_override(&lookup, "MODEL_TEMPERATURE")?
                .unwrap_or(DEFAULT_TEMPERATURE),
            timeout: Duration::from_secs(
                parse_override(&lookup, "MODEL_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            retries: parse_override(&lookup, "MODEL_RETRIES")?.unwrap_or(0),
        })
    }

    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Full URL of the chat-completions route
    pub fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.base_url.as_str().trim_end_matches('/')
        )
    }

    pub fn generation_config(&self) -> GenerationConfig {
        GenerationConfig {
            temperature: Some(self.temperature),
            max_output_tokens: Some(self.max_tokens),
            top_p: None,
        }
    }
}

fn parse_override<F, T>(lookup: &F, key: &str) -> Result<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| PathwayError::config(format!("Invalid value for {}: '{}'", key, raw))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let err = ModelConfig::from_lookup(Provider::GitHub, lookup_from(&[])).unwrap_err();
        assert!(matches!(err, PathwayError::Config(_)));
        assert!(err.to_string().contains("GITHUB_TOKEN"));

        let err = ModelConfig::from_lookup(Provider::OpenAI, lookup_from(&[("OPENAI_API_KEY", "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_github_defaults() {
        let config =
            ModelConfig::from_lookup(Provider::GitHub, lookup_from(&[("GITHUB_TOKEN", "ghp")]))
                .unwrap();
        assert_eq!(config.model_id, "openai/gpt-4.1");
        assert_eq!(
            config.completions_url(),
            "https://models.github.ai/inference/chat/completions"
        );
        assert_eq!(config.max_tokens, 1000);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.retries, 0);
    }

    #[test]
    fn test_overrides() {
        let config = ModelConfig::from_lookup(
            Provider::OpenAI,
            lookup_from(&[
                ("OPENAI_API_KEY", "sk"),
                ("OPENAI_BASE_URL", "http://localhost:8080/v1/"),
                ("MODEL_ID", "gpt-4o-mini"),
                ("MODEL_MAX_TOKENS", "150"),
                ("MODEL_TEMPERATURE", "0.2"),
                ("MODEL_RETRIES", "1"),
            ]),
        )
        .unwrap();
        assert_eq!(config.model_id, "gpt-4o-mini");
        assert_eq!(config.completions_url(), "http://localhost:8080/v1/chat/completions");
        assert_eq!(config.max_tokens, 150);
        assert_eq!(config.retries, 1);
        assert_eq!(config.generation_config().max_output_tokens, Some(150));
    }

    #[test]
    fn test_invalid_overrides_rejected() {
        let err = ModelConfig::from_lookup(
            Provider::OpenAI,
            lookup_from(&[("OPENAI_API_KEY", "sk"), ("OPENAI_BASE_URL", "not a url")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Invalid endpoint"));

        let err = ModelConfig::from_lookup(
            Provider::OpenAI,
            lookup_from(&[("OPENAI_API_KEY", "sk"), ("MODEL_MAX_TOKENS", "lots")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("MODEL_MAX_TOKENS"));
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("GitHub".parse::<Provider>().unwrap(), Provider::GitHub);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAI);
        assert!("gemini".parse::<Provider>().is_err());
    }
}
