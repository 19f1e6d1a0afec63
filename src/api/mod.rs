//! Model capability layer: hosted language-model providers

mod client;
mod request;
mod response;

pub use client::ApiAgent;
pub use request::{CompletionRequest, Message, Role};
pub use response::{CompletionResponse, TokenUsage};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Rate limited: retry after {retry_after_secs} seconds")]
    RateLimited { retry_after_secs: u64 },

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Configuration for API providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub provider: ProviderType,
    pub api_key: String,
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderType {
    Claude,
    OpenAI,
    Ollama,
    Custom,
}

impl ProviderType {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderType::Claude => Some("https://api.anthropic.com/v1"),
            ProviderType::OpenAI => Some("https://api.openai.com/v1"),
            ProviderType::Ollama => Some("http://localhost:11434"),
            ProviderType::Custom => None,
        }
    }

    /// Whether requests to this provider carry an API key
    pub fn requires_key(&self) -> bool {
        !matches!(self, ProviderType::Ollama)
    }
}

impl FromStr for ProviderType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" | "anthropic" => Ok(ProviderType::Claude),
            "openai" => Ok(ProviderType::OpenAI),
            "ollama" => Ok(ProviderType::Ollama),
            "custom" => Ok(ProviderType::Custom),
            other => Err(ApiError::Provider(format!("Unknown provider: {}", other))),
        }
    }
}

impl std::fmt::Display for ProviderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ProviderType::Claude => "claude",
            ProviderType::OpenAI => "openai",
            ProviderType::Ollama => "ollama",
            ProviderType::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// A hosted model that turns a system instruction and a user prompt into text.
///
/// Latency and output quality are opaque to callers; any failure (network,
/// quota, timeout, malformed reply) surfaces as an [`ApiError`].
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn generate_completion(
        &self,
        system: &str,
        prompt: &str,
        max_output_tokens: u32,
    ) -> Result<String, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_type_parsing() {
        assert_eq!("OpenAI".parse::<ProviderType>().unwrap(), ProviderType::OpenAI);
        assert_eq!("anthropic".parse::<ProviderType>().unwrap(), ProviderType::Claude);
        assert!("venice".parse::<ProviderType>().is_err());
    }

    #[test]
    fn test_provider_display_round_trips_through_parse() {
        for provider in [
            ProviderType::Claude,
            ProviderType::OpenAI,
            ProviderType::Ollama,
            ProviderType::Custom,
        ] {
            assert_eq!(provider.to_string().parse::<ProviderType>().unwrap(), provider);
        }
    }

    #[test]
    fn test_only_ollama_is_keyless() {
        assert!(!ProviderType::Ollama.requires_key());
        assert!(ProviderType::OpenAI.requires_key());
        assert!(ProviderType::Custom.default_base_url().is_none());
    }
}
