//! Configuration for Pantry.
//!
//! Maps directly to `pantry.toml`. Every section and field has a default,
//! so an empty file (or no file) is a valid configuration.

use serde::{Deserialize, Serialize};

/// Top-level Pantry configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PantryConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// SQLite store settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Search result limits.
    #[serde(default)]
    pub search: SearchConfig,
    /// Text-generation service settings.
    #[serde(default)]
    pub llm: LlmConfig,
}

impl PantryConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `PantryError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::PantryError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// SQLite store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Database file path.
    #[serde(default = "default_db_path")]
    pub path: String,
    /// How long SQLite waits on a locked database before failing.
    #[serde(default = "default_5000")]
    pub busy_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            busy_timeout_ms: 5000,
        }
    }
}

/// Search result limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Recipes returned by a search.
    #[serde(default = "default_10")]
    pub limit: usize,
    /// Recipes returned by "find another".
    #[serde(default = "default_1")]
    pub another_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            limit: 10,
            another_limit: 1,
        }
    }
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "ollama", "openai", "none".
    #[serde(default = "default_ollama")]
    pub provider: String,
    /// Base URL for the provider API.
    #[serde(default = "default_ollama_url")]
    pub base_url: String,
    /// Model name.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for OpenAI-compatible providers.
    #[serde(default)]
    pub api_key: String,
    /// Hard timeout for a generation call in milliseconds.
    #[serde(default = "default_120000")]
    pub request_timeout_ms: u64,
    /// Extra attempts after a failed call.
    #[serde(default)]
    pub max_retries: u32,
    /// Sampling temperature.
    #[serde(default = "default_0_7")]
    pub temperature: f32,
    /// Maximum tokens to generate.
    #[serde(default = "default_1024")]
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_ollama(),
            base_url: default_ollama_url(),
            model: default_model(),
            api_key: String::new(),
            request_timeout_ms: 120_000,
            max_retries: 0,
            temperature: 0.7,
            max_tokens: 1024,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_log_level() -> String { "warn".to_string() }
fn default_db_path() -> String { "recipes.db".to_string() }
fn default_ollama() -> String { "ollama".to_string() }
fn default_ollama_url() -> String { "http://localhost:11434".to_string() }
fn default_model() -> String { "llama3".to_string() }
fn default_0_7() -> f32 { 0.7 }
fn default_1() -> usize { 1 }
fn default_10() -> usize { 10 }
fn default_1024() -> u32 { 1024 }
fn default_5000() -> u64 { 5000 }
fn default_120000() -> u64 { 120_000 }
