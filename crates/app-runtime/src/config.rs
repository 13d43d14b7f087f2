//! # Runtime Configuration
//!
//! Read from environment variables first; CLI flags override.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `SC_STORAGE_PATH` | `./data/bus-store.json` | File backing the storage provider |
//! | `SC_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `SC_JSON_LOGS` | `false` | Emit JSON log lines |
//! | `SC_EXCLUDED_TOPICS` | (none) | Comma separated topics never written to storage |

use std::env;
use std::path::PathBuf;

/// Complete runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Storage file location.
    pub storage_path: PathBuf,
    /// Log level filter (trace, debug, info, warn, error or a full directive).
    pub log_level: String,
    /// Whether to emit JSON formatted logs.
    pub json_logs: bool,
    /// Topics excluded from persistence after initialization.
    pub excluded_topics: Vec<String>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            storage_path: PathBuf::from("./data/bus-store.json"),
            log_level: "info".to_string(),
            json_logs: false,
            excluded_topics: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    /// Create configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Create configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            storage_path: lookup("SC_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_path),

            log_level: lookup("SC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),

            json_logs: lookup("SC_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(defaults.json_logs),

            excluded_topics: lookup("SC_EXCLUDED_TOPICS")
                .map(|v| parse_topic_list(&v))
                .unwrap_or_default(),
        }
    }
}

/// Split a comma separated list, dropping blanks.
pub fn parse_topic_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
