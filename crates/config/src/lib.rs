//! Configuration loading and validation for Askbase.
//!
//! Loads configuration from `askbase.toml` (path overridable via the
//! `ASKBASE_CONFIG` environment variable) with environment variable
//! overrides for secrets. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `askbase.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key for the completion provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat completion model
    #[serde(default = "default_model")]
    pub model: String,

    /// Embedding model used for knowledge-base indexing
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Chat orchestration settings
    #[serde(default)]
    pub chat: ChatConfig,

    /// Gateway (HTTP server) settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_embedding_model() -> String {
    "text-embedding-3-small".into()
}

/// Chat orchestration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// How many of the most recent history turns are replayed per request
    #[serde(default = "default_history_max_turns")]
    pub history_max_turns: usize,

    /// Completion temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// How many snippets are retrieved per query
    #[serde(default = "default_retrieval_k")]
    pub retrieval_k: usize,
}

fn default_history_max_turns() -> usize {
    10
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_retrieval_k() -> usize {
    4
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            history_max_turns: default_history_max_turns(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            retrieval_k: default_retrieval_k(),
        }
    }
}

/// Gateway (HTTP server) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("chat", &self.chat)
            .field("gateway", &self.gateway)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default location with env overrides.
    ///
    /// `ASKBASE_CONFIG` overrides the file path; `ASKBASE_API_KEY` overrides
    /// the API key.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("ASKBASE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("askbase.toml"));

        let mut config = Self::load_from(&path)?;

        if let Ok(key) = std::env::var("ASKBASE_API_KEY") {
            config.api_key = Some(key);
        }

        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chat.temperature < 0.0 || self.chat.temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "chat.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.chat.history_max_turns == 0 {
            return Err(ConfigError::ValidationError(
                "chat.history_max_turns must be at least 1".into(),
            ));
        }

        if self.chat.retrieval_k == 0 {
            return Err(ConfigError::ValidationError(
                "chat.retrieval_k must be at least 1".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            embedding_model: default_embedding_model(),
            chat: ChatConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
