//! Configuration management for GemChat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{GemChatError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for GemChat
///
/// This structure holds all configuration needed for the chat client,
/// including provider settings and chat surface behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gemini provider configuration
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Chat surface configuration
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key for the Gemini API
    ///
    /// Usually supplied through the `GEMINI_API_KEY` environment variable
    /// rather than the config file.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    ///
    /// When set, this base is used instead of the public
    /// `generativelanguage.googleapis.com` endpoint, which allows tests to
    /// point the provider at a mock server.
    #[serde(default)]
    pub api_base: Option<String>,

    /// Model to use
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// System instruction sent with every request
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum number of output tokens per reply
    #[serde(default)]
    pub max_output_tokens: Option<u32>,
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            model: default_gemini_model(),
            system_prompt: None,
            temperature: None,
            max_output_tokens: None,
        }
    }
}

/// Chat surface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Display name of the bot
    #[serde(default = "default_bot_title")]
    pub bot_title: String,

    /// Greeting turn seeded into a fresh conversation
    ///
    /// Stored in the history with role `model`, matching what the remote
    /// API reports for assistant turns.
    #[serde(default = "default_greeting")]
    pub greeting: String,

    /// Directory for persisted session files
    ///
    /// When unset, a platform data directory is used. The
    /// `GEMCHAT_HISTORY_DIR` environment variable overrides both.
    #[serde(default)]
    pub history_dir: Option<String>,

    /// Maximum attempts for a single provider call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base delay in milliseconds for exponential backoff between attempts
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
}

fn default_bot_title() -> String {
    "AI bot".to_string()
}

fn default_greeting() -> String {
    "Hello! What can I help you with today?".to_string()
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    500
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            bot_title: default_bot_title(),
            greeting: default_greeting(),
            history_dir: None,
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file, then apply environment overrides
    ///
    /// A missing config file is not an error; defaults are used so the
    /// binary can run with nothing but `GEMINI_API_KEY` set.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the YAML configuration file
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            let contents = std::fs::read_to_string(path).map_err(|e| {
                GemChatError::Config(format!("Failed to read config file {}: {}", path, e))
            })?;
            serde_yaml::from_str(&contents).map_err(|e| {
                GemChatError::Config(format!("Failed to parse config file {}: {}", path, e))
            })?
        } else {
            tracing::debug!("Config file {} not found, using defaults", path);
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of file values
    ///
    /// - `GEMINI_API_KEY` overrides `gemini.api_key`
    /// - `GEMINI_MODEL` overrides `gemini.model`
    /// - `BOT_TITLE` overrides `chat.bot_title`
    /// - `SYSTEM_PROMPT` overrides `gemini.system_prompt`
    /// - `GEMCHAT_HISTORY_DIR` overrides `chat.history_dir`
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            if !key.is_empty() {
                self.gemini.api_key = Some(key);
            }
        }
        if let Ok(model) = std::env::var("GEMINI_MODEL") {
            if !model.is_empty() {
                self.gemini.model = model;
            }
        }
        if let Ok(title) = std::env::var("BOT_TITLE") {
            if !title.is_empty() {
                self.chat.bot_title = title;
            }
        }
        if let Ok(prompt) = std::env::var("SYSTEM_PROMPT") {
            if !prompt.is_empty() {
                self.gemini.system_prompt = Some(prompt);
            }
        }
        if let Ok(dir) = std::env::var("GEMCHAT_HISTORY_DIR") {
            if !dir.is_empty() {
                self.chat.history_dir = Some(dir);
            }
        }
    }

    /// Validate the configuration
    ///
    /// Checks that values required at startup are present and sane. A
    /// missing API credential is fatal here rather than surfacing later as
    /// a mid-conversation provider error.
    ///
    /// # Errors
    ///
    /// Returns error if validation fails
    pub fn validate(&self) -> Result<()> {
        if self
            .gemini
            .api_key
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
        {
            return Err(GemChatError::MissingCredentials("gemini".to_string()).into());
        }

        if self.gemini.model.trim().is_empty() {
            return Err(GemChatError::Config("gemini.model must not be empty".to_string()).into());
        }

        if let Some(temperature) = self.gemini.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(GemChatError::Config(format!(
                    "gemini.temperature must be between 0.0 and 2.0, got {}",
                    temperature
                ))
                .into());
            }
        }

        if self.chat.max_retries == 0 {
            return Err(
                GemChatError::Config("chat.max_retries must be at least 1".to_string()).into(),
            );
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}
