//! Configuration management for the prompt optimizer
//!
//! Supports configuration via:
//! 1. Config file (~/.config/prompt-optimizer/config.toml)
//! 2. Environment variables (OPENAI_API_KEY, PROMPT_OPTIMIZER_MODEL, etc.)
//! 3. CLI arguments (override file/env settings)

use crate::api::{ApiConfig, ProviderType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hosted model settings
    pub provider: ProviderSettings,

    /// HTTP service settings
    pub server: ServerSettings,

    /// Client settings
    pub client: ClientSettings,
}

/// Hosted model settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Provider kind (openai, claude, ollama, custom)
    pub kind: ProviderType,

    /// API key (can also use OPENAI_API_KEY / ANTHROPIC_API_KEY)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Model to use
    pub model: String,

    /// Temperature for generation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            kind: ProviderType::OpenAI,
            api_key: None,
            base_url: None,
            model: "gpt-4.1-nano-2025-04-14".to_string(),
            temperature: None,
        }
    }
}

/// HTTP service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientSettings {
    /// Optimizer service URL used with --remote
    pub server_url: String,

    /// Clear the input after a successful optimization
    pub auto_clear: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:3000".to_string(),
            auto_clear: true,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prompt-optimizer")
            .join("config.toml")
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from specific path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self::load_file(path)?.with_env_overrides())
    }

    /// Load the stored file at the default location, ignoring the environment
    pub fn load_stored() -> Result<Self, ConfigError> {
        Self::load_file(Self::default_path())
    }

    /// Load only what the file says. Use this before `save` so values from the
    /// environment are never written back to disk.
    pub fn load_file(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    fn with_overrides_from(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(kind) = var("PROMPT_OPTIMIZER_PROVIDER").and_then(|k| k.parse().ok()) {
            self.provider.kind = kind;
        }

        let key_var = match self.provider.kind {
            ProviderType::Claude => Some("ANTHROPIC_API_KEY"),
            ProviderType::OpenAI => Some("OPENAI_API_KEY"),
            ProviderType::Ollama | ProviderType::Custom => None,
        };
        if let Some(key) = var("PROMPT_OPTIMIZER_API_KEY").or_else(|| key_var.and_then(&var)) {
            self.provider.api_key = Some(key);
        }
        if let Some(model) = var("PROMPT_OPTIMIZER_MODEL") {
            self.provider.model = model;
        }
        if let Some(url) = var("PROMPT_OPTIMIZER_BASE_URL") {
            self.provider.base_url = Some(url);
        }

        if let Some(bind) = var("PROMPT_OPTIMIZER_BIND") {
            self.server.bind = bind;
        }
        if let Some(url) = var("PROMPT_OPTIMIZER_SERVER_URL") {
            self.client.server_url = url;
        }

        self
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path())
    }

    /// Save config to specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.kind.requires_key() && self.provider.api_key.is_none() {
            return Err(ConfigError::MissingRequired(format!(
                "API key for provider '{}' (set provider.api_key or the provider's env var)",
                self.provider.kind
            )));
        }

        if self.provider.kind == ProviderType::Custom && self.provider.base_url.is_none() {
            return Err(ConfigError::MissingRequired(
                "provider.base_url is required for custom providers".to_string(),
            ));
        }

        Ok(())
    }

    /// Build the provider client configuration
    pub fn api_config(&self) -> Result<ApiConfig, ConfigError> {
        self.validate()?;

        Ok(ApiConfig {
            provider: self.provider.kind,
            api_key: self.provider.api_key.clone().unwrap_or_default(),
            base_url: self.provider.base_url.clone(),
            model: self.provider.model.clone(),
            temperature: self.provider.temperature,
        })
    }

    /// Set a value by `section.key`
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "provider.kind" => self.provider.kind = value.parse().map_err(|_| invalid())?,
            "provider.api_key" => self.provider.api_key = Some(value.to_string()),
            "provider.base_url" => self.provider.base_url = Some(value.to_string()),
            "provider.model" => self.provider.model = value.to_string(),
            "provider.temperature" => {
                self.provider.temperature = Some(value.parse().map_err(|_| invalid())?)
            }
            "server.bind" => self.server.bind = value.to_string(),
            "client.server_url" => self.client.server_url = value.to_string(),
            "client.auto_clear" => self.client.auto_clear = value.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        }

        Ok(())
    }

    /// Copy of the config with secrets masked, for display
    pub fn masked(&self) -> Self {
        let mut masked = self.clone();
        if masked.provider.api_key.is_some() {
            masked.provider.api_key = Some("***".to_string());
        }
        masked
    }

    /// Generate example config content
    pub fn example() -> String {
        let example = Config::default();
        toml::to_string_pretty(&example).unwrap_or_default()
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn provider(mut self, kind: ProviderType) -> Self {
        self.config.provider.kind = kind;
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.provider.api_key = Some(key.into());
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.provider.model = model.into();
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.provider.base_url = Some(url.into());
        self
    }

    pub fn bind(mut self, bind: impl Into<String>) -> Self {
        self.config.server.bind = bind.into();
        self
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.client.server_url = url.into();
        self
    }

    pub fn auto_clear(mut self, enabled: bool) -> Self {
        self.config.client.auto_clear = enabled;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
