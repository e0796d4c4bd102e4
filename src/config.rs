//! Configuration management for SHIPSmart
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, ShipsmartError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for SHIPSmart
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Remote chat-completion settings
    #[serde(default)]
    pub completion: CompletionConfig,
    /// Conversation behavior
    #[serde(default)]
    pub assistant: AssistantConfig,
}

/// Remote chat-completion service configuration
///
/// The API key itself never lives in the file; `api_key_env` names the
/// environment variable that holds it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    /// Call the service to augment scripted replies
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Base URL; `/v1/chat/completions` is appended
    #[serde(default = "default_api_base")]
    pub api_base: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Environment variable holding the bearer token
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_top_p")]
    pub top_p: f32,

    #[serde(default = "default_max_completion_tokens")]
    pub max_completion_tokens: u32,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    /// Upper bound on `search_policy` round trips per reply
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,

    /// Request server-sent events and fill replies as deltas arrive
    #[serde(default = "default_stream")]
    pub stream: bool,
}

fn default_enabled() -> bool {
    true
}

fn default_api_base() -> String {
    "https://api.cerebras.ai".to_string()
}

fn default_model() -> String {
    "llama-4-scout-17b-16e-instruct".to_string()
}

fn default_api_key_env() -> String {
    "CEREBRAS_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.39
}

fn default_top_p() -> f32 {
    1.0
}

fn default_max_completion_tokens() -> u32 {
    8192
}

fn default_request_timeout() -> u64 {
    60
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_max_tool_rounds() -> usize {
    3
}

fn default_stream() -> bool {
    true
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            api_base: default_api_base(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            max_completion_tokens: default_max_completion_tokens(),
            request_timeout_seconds: default_request_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            max_tool_rounds: default_max_tool_rounds(),
            stream: default_stream(),
        }
    }
}

/// Conversation behavior configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Session messages sent as context with each remote request
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Replaces the built-in system prompt when set
    #[serde(default)]
    pub system_prompt: Option<String>,
}

fn default_history_limit() -> usize {
    20
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
            system_prompt: None,
        }
    }
}

/// Read a boolean environment variable, warning on unrecognized values
fn env_flag(name: &str) -> Option<bool> {
    let value = std::env::var(name).ok()?;
    match value.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => {
            tracing::warn!("Invalid {}: {}", name, value);
            None
        }
    }
}

impl Config {
    /// Load configuration from file, environment, and CLI
    ///
    /// A missing file is not an error; defaults are used instead.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ShipsmartError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ShipsmartError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Some(enabled) = env_flag("SHIPSMART_COMPLETION_ENABLED") {
            self.completion.enabled = enabled;
        }

        if let Some(stream) = env_flag("SHIPSMART_STREAM") {
            self.completion.stream = stream;
        }

        if let Ok(api_base) = std::env::var("SHIPSMART_API_BASE") {
            self.completion.api_base = api_base;
        }

        if let Ok(model) = std::env::var("SHIPSMART_MODEL") {
            self.completion.model = model;
        }

        if let Ok(timeout) = std::env::var("SHIPSMART_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.completion.request_timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SHIPSMART_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(limit) = std::env::var("SHIPSMART_HISTORY_LIMIT") {
            if let Ok(value) = limit.parse() {
                self.assistant.history_limit = value;
            } else {
                tracing::warn!("Invalid SHIPSMART_HISTORY_LIMIT: {}", limit);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.offline {
            tracing::debug!("Offline mode: remote completion disabled");
            self.completion.enabled = false;
        }
        if let Some(model) = &cli.model {
            self.completion.model = model.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `ShipsmartError::Config` naming the first invalid field
    pub fn validate(&self) -> Result<()> {
        let completion = &self.completion;

        if completion.api_base.trim().is_empty() {
            return Err(
                ShipsmartError::Config("completion.api_base cannot be empty".to_string()).into(),
            );
        }

        if completion.model.trim().is_empty() {
            return Err(
                ShipsmartError::Config("completion.model cannot be empty".to_string()).into(),
            );
        }

        if completion.api_key_env.trim().is_empty() {
            return Err(ShipsmartError::Config(
                "completion.api_key_env cannot be empty".to_string(),
            )
            .into());
        }

        if !(0.0..=2.0).contains(&completion.temperature) {
            return Err(ShipsmartError::Config(
                "completion.temperature must be between 0.0 and 2.0".to_string(),
            )
            .into());
        }

        if completion.top_p <= 0.0 || completion.top_p > 1.0 {
            return Err(ShipsmartError::Config(
                "completion.top_p must be greater than 0.0 and at most 1.0".to_string(),
            )
            .into());
        }

        if completion.max_completion_tokens == 0 {
            return Err(ShipsmartError::Config(
                "completion.max_completion_tokens must be greater than 0".to_string(),
            )
            .into());
        }

        if completion.request_timeout_seconds == 0 || completion.connect_timeout_seconds == 0 {
            return Err(ShipsmartError::Config(
                "completion timeouts must be greater than 0".to_string(),
            )
            .into());
        }

        if self.assistant.history_limit == 0 {
            return Err(ShipsmartError::Config(
                "assistant.history_limit must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
