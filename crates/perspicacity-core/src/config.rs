//! Client configuration
//!
//! Loaded from `~/.perspicacity/config.toml`. Every key is optional.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::Result;
use crate::paths;

/// Configuration for the answer client and renderer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Origin hosting `/search` and `/research`
    pub base_url: String,
    /// Deadline for the first response byte
    pub cold_start_timeout_ms: u64,
    /// Delay between revealed words
    pub reveal_delay_ms: u64,
    /// Scroll-follow cadence in revealed words
    pub follow_every_words: usize,
    /// Distance from the bottom that still counts as "following"
    pub scroll_threshold: usize,
    /// Link behind the ask-an-expert action
    pub ask_expert_url: String,
    pub connect_timeout_secs: u64,
    pub stream_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: constants::http::DEFAULT_BASE_URL.to_string(),
            cold_start_timeout_ms: constants::session::COLD_START_TIMEOUT.as_millis() as u64,
            reveal_delay_ms: constants::render::REVEAL_DELAY.as_millis() as u64,
            follow_every_words: constants::render::FOLLOW_EVERY_WORDS,
            scroll_threshold: constants::render::SCROLL_THRESHOLD,
            ask_expert_url: constants::render::ASK_EXPERT_URL.to_string(),
            connect_timeout_secs: constants::http::CONNECT_TIMEOUT.as_secs(),
            stream_timeout_secs: constants::http::STREAM_TIMEOUT.as_secs(),
        }
    }
}

impl ClientConfig {
    /// Load from the default location, falling back to defaults when absent
    pub fn load() -> Result<Self> {
        Self::load_from_path(&paths::config_file())
    }

    /// Load from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Endpoint URL for a processing mode
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn cold_start_timeout(&self) -> Duration {
        Duration::from_millis(self.cold_start_timeout_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn stream_timeout(&self) -> Duration {
        Duration::from_secs(self.stream_timeout_secs)
    }
}
