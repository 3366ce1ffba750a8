// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging configuration types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Console format
    pub format: LogFormat,

    /// Base directory for run folders; `None` keeps logging console-only.
    /// Only honoured with the `file-logging` feature.
    pub log_dir: Option<PathBuf>,

    /// Delete run folders older than this many days
    pub retention_days: u64,

    /// Keep at most this many run folders
    pub retention_runs: usize,
}

/// Log format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
            format: LogFormat::Text,
            log_dir: None,
            retention_days: 30,
            retention_runs: 10,
        }
    }
}

impl LoggingConfig {
    /// Parsed `level`, or `None` if it is not a tracing level name
    pub fn parsed_level(&self) -> Option<tracing::Level> {
        self.level.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_parsing() {
        let mut config = LoggingConfig::default();
        assert_eq!(config.parsed_level(), Some(tracing::Level::INFO));

        config.level = "DEBUG".to_string();
        assert_eq!(config.parsed_level(), Some(tracing::Level::DEBUG));

        config.level = "verbose".to_string();
        assert_eq!(config.parsed_level(), None);
    }
}
