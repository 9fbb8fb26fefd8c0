use std::{env, time::Duration};

use crate::table::{WaitPolicy, MAX_PURGE_PAGE_SIZE};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "text" | "pretty" => Some(LogFormat::Text),
            "json" => Some(LogFormat::Json),
            _ => None,
        }
    }
}

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Table status polls before giving up (default: 60)
    pub table_wait_max_attempts: u32,
    /// Seconds between table status polls (default: 2)
    pub table_wait_delay_seconds: u64,
    /// Items per purge page, clamped to 1..=25 (default: 25)
    pub purge_page_size: i32,
    /// Log output format (default: text)
    pub log_format: LogFormat,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `TABLE_WAIT_MAX_ATTEMPTS` - Table status polls (default: 60)
    /// - `TABLE_WAIT_DELAY_SECONDS` - Delay between polls (default: 2)
    /// - `PURGE_PAGE_SIZE` - Items per purge batch (default: 25)
    /// - `LOG_FORMAT` - `text` or `json` (default: text)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable source.
    /// Unparseable values fall back to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            table_wait_max_attempts: lookup("TABLE_WAIT_MAX_ATTEMPTS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            table_wait_delay_seconds: lookup("TABLE_WAIT_DELAY_SECONDS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(2),
            purge_page_size: lookup("PURGE_PAGE_SIZE")
                .and_then(|v| v.parse::<i32>().ok())
                .unwrap_or(MAX_PURGE_PAGE_SIZE)
                .clamp(1, MAX_PURGE_PAGE_SIZE),
            log_format: lookup("LOG_FORMAT")
                .and_then(|v| LogFormat::parse(&v))
                .unwrap_or_default(),
        }
    }

    /// Get the table wait policy.
    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            max_attempts: self.table_wait_max_attempts,
            delay: Duration::from_secs(self.table_wait_delay_seconds),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
