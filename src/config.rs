//! Configuration management
//!
//! Settings come from an optional `config.json` in the platform config
//! directory. The file is only ever read; the guide writes nothing to disk.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::epg::FetchConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_feed_url")]
    pub feed_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_page_size")]
    pub channels_per_page: usize,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
}

fn default_feed_url() -> String { "https://xmltv.net/xml_files/Melbourne.xml".to_string() }
fn default_user_agent() -> String { "Mozilla/5.0".to_string() }
fn default_timeout() -> u64 { 10 }
fn default_attempts() -> u32 { 1 }
fn default_retry_delay() -> u64 { 2000 }
fn default_refresh_interval() -> u64 { 60 }
fn default_page_size() -> usize { 15 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout(),
            max_attempts: default_attempts(),
            retry_delay_ms: default_retry_delay(),
            refresh_interval_secs: default_refresh_interval(),
            channels_per_page: default_page_size(),
            dark_mode: true,
        }
    }
}

impl AppConfig {
    pub fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("tv_guide");
        path.push("config.json");
        path
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => config.sanitized(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "invalid config file, using defaults");
                Self::default()
            }
        }
    }

    /// Replace zero values that would stall the guide
    fn sanitized(mut self) -> Self {
        if self.timeout_secs == 0 {
            self.timeout_secs = default_timeout();
        }
        if self.refresh_interval_secs == 0 {
            self.refresh_interval_secs = default_refresh_interval();
        }
        if self.channels_per_page == 0 {
            self.channels_per_page = default_page_size();
        }
        self.max_attempts = self.max_attempts.max(1);
        self
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            url: self.feed_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout_secs: self.timeout_secs,
            max_attempts: self.max_attempts,
            retry_delay_ms: self.retry_delay_ms,
        }
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }
}
