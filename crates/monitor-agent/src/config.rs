use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use coordination::DEFAULT_WIN_THRESHOLD;
use serde::Deserialize;

use crate::prompts::EVALUATOR_INSTRUCTION;

/// Default generative model.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";
/// Default Gemini API base URL.
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";
/// Default peer polled when a message arrives without a sender.
pub const DEFAULT_PEER_URL: &str = "http://localhost:9009/";

/// Top-level monitor configuration.
///
/// `Default` reads the environment; a TOML file overrides individual keys
/// and falls back to the environment for the rest.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Model used for both summarization and attribution.
    pub model: String,
    pub api_base: String,
    /// Gemini API key (GEMINI_API_KEY, then GOOGLE_API_KEY).
    pub api_key: Option<String>,
    /// System instruction sent with every model call.
    pub system_instruction: String,
    /// Peers polled for messages without a sender.
    pub peer_urls: Vec<String>,
    /// A sender must exceed this percentage to win.
    pub win_threshold: f64,
    /// Emit the raw evaluator text as a second status update.
    pub emit_raw_evaluation: bool,
    pub request_timeout_secs: u64,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            model: std::env::var("MONITOR_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into()),
            api_base: std::env::var("GEMINI_API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.into()),
            api_key: Self::api_key_from_env(),
            system_instruction: EVALUATOR_INSTRUCTION.into(),
            peer_urls: std::env::var("MONITOR_PEER_URLS")
                .ok()
                .map(|v| parse_peer_list(&v))
                .filter(|urls| !urls.is_empty())
                .unwrap_or_else(|| vec![DEFAULT_PEER_URL.into()]),
            win_threshold: DEFAULT_WIN_THRESHOLD,
            emit_raw_evaluation: true,
            request_timeout_secs: 120,
        }
    }
}

impl MonitorConfig {
    /// Load `.env` (if present) into the process environment, then read
    /// the configuration from it.
    pub fn from_env() -> Self {
        // A missing .env file is the normal case in deployment
        let _ = dotenv::dotenv();
        Self::default()
    }

    /// Load configuration from a TOML file, after loading `.env`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let _ = dotenv::dotenv();
        let content =
            std::fs::read_to_string(path).context(format!("Failed to read {}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MonitorConfig =
            toml::from_str(content).context("Failed to parse monitor config TOML")?;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn api_key_from_env() -> Option<String> {
        std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .ok()
            .filter(|k| !k.is_empty())
    }
}

/// Split a comma-separated peer list, dropping blanks.
pub fn parse_peer_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
