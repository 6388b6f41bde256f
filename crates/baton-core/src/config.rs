use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::platform;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub player: PlayerConfig,
    #[serde(default)]
    pub status: StatusConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

/// Credentials and endpoint for the remote catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub secret: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Name of the desktop application driven over the control surface.
    #[serde(default = "default_application")]
    pub application: String,
    /// Convergence-retry ceiling. The player may take tens of seconds to
    /// cold-start, so this is generous.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Issue the go-back command twice: the surface restarts the current
    /// track on the first press instead of skipping back.
    #[serde(default = "default_double_previous")]
    pub double_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusConfig {
    /// How long the status line stays up, in seconds. Negative means
    /// "indefinitely while the player is running".
    #[serde(default = "default_status_duration")]
    pub duration_secs: i64,
    #[serde(default = "default_update_period_ms")]
    pub update_period_ms: u64,
    /// Template with `{icon}` `{equalizer}` `{time}` `{duration}` `{song}`
    /// `{artist}` `{album}` placeholders.
    #[serde(default = "default_status_format")]
    pub format: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_enable_suggestions")]
    pub enable_suggestions: bool,
    /// Queries must be strictly longer than this before they are dispatched
    /// to the suggestion fetcher.
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: String::new(),
            secret: String::new(),
            base_url: default_base_url(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            application: default_application(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            double_previous: default_double_previous(),
        }
    }
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            duration_secs: default_status_duration(),
            update_period_ms: default_update_period_ms(),
            format: default_status_format(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable_suggestions: default_enable_suggestions(),
            min_query_len: default_min_query_len(),
            max_results: default_max_results(),
        }
    }
}

fn default_base_url() -> String {
    "https://services.rdio.com/api/1/".to_string()
}

fn default_application() -> String {
    "Rdio".to_string()
}

fn default_max_attempts() -> u32 {
    50
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_double_previous() -> bool {
    true
}

fn default_status_duration() -> i64 {
    15
}

fn default_update_period_ms() -> u64 {
    350
}

fn default_status_format() -> String {
    "{icon} {equalizer} [{time}/{duration}] {song} by {artist} ({album})".to_string()
}

fn default_enable_suggestions() -> bool {
    true
}

fn default_min_query_len() -> usize {
    2
}

fn default_max_results() -> usize {
    50
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            let config = Self::default();
            config.save()?;
            return Ok(config);
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        platform::config_dir().join("config.toml")
    }
}
