//! Configuration file support for tensaku.
//!
//! All tensaku data is stored in a `.tensaku/` directory:
//! - `.tensaku/config.toml` - Configuration file
//! - `.tensaku/logs/` - Log files
//!
//! Config discovery searches for `.tensaku/config.toml` starting from the
//! current directory and walking up to parent directories.

use std::path::{Path, PathBuf};

/// The tensaku data directory name.
pub const TENSAKU_DIR: &str = ".tensaku";
/// The config file name within the tensaku directory.
pub const CONFIG_FILE: &str = "config.toml";

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Chat backend settings.
    pub backend: BackendConfig,
    /// Review pipeline settings.
    pub review: ReviewConfig,
}

/// Chat backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of an OpenAI-compatible API.
    pub base_url: String,
    /// Model to use for explanations.
    pub model: String,
    /// API key (falls back to TENSAKU_API_KEY / OPENAI_API_KEY env vars).
    pub api_key: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum retries for transient network errors.
    pub max_retries: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key: None,
            timeout_secs: 120,
            max_retries: 3,
        }
    }
}

impl BackendConfig {
    /// Resolve the API key from config or environment.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("TENSAKU_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
    }
}

/// Review pipeline configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReviewConfig {
    /// Reasoning engine: "llm" or "rules".
    pub engine: String,
    /// Attempts before the LLM reasoner gives up on malformed output.
    pub max_attempts: u32,
    /// Fall back to the rule engine when the LLM path fails.
    pub fallback_to_rules: bool,
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            engine: "llm".to_string(),
            max_attempts: 3,
            fallback_to_rules: true,
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Find and load configuration from current or parent directories.
    ///
    /// Searches for `.tensaku/config.toml` starting from the current
    /// directory and walking up to parent directories.
    pub fn find_and_load() -> Result<Option<(Self, PathBuf)>> {
        let current = std::env::current_dir()?;
        Self::find_and_load_from(&current)
    }

    /// Find and load configuration starting from a specific directory.
    pub fn find_and_load_from(start: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start.to_path_buf();

        loop {
            let tensaku_dir = dir.join(TENSAKU_DIR);
            let config_path = tensaku_dir.join(CONFIG_FILE);
            if config_path.exists() {
                let config = Self::from_file(&config_path)?;
                // Return the .tensaku directory, not the config file
                return Ok(Some((config, tensaku_dir)));
            }

            if !dir.pop() {
                break;
            }
        }

        Ok(None)
    }
}
