//! Observability configuration types

use oncotree_config::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    Text,
    Json,
}

/// Settings consumed by [`crate::init_logging`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Default level for crates without a debug flag (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Base directory for per-run log folders; console only when `None`
    pub log_dir: Option<PathBuf>,

    /// Keep logs for N days
    pub retention_days: u64,

    /// Keep the N most recent runs
    pub retention_runs: usize,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl From<&LoggingConfig> for LoggingSettings {
    fn from(config: &LoggingConfig) -> Self {
        LoggingSettings {
            level: config.level.to_lowercase(),
            format: if config.json {
                LogFormat::Json
            } else {
                LogFormat::Text
            },
            log_dir: config.log_dir.clone(),
            ..LoggingSettings::default()
        }
    }
}
