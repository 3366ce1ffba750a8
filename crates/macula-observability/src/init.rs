// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Unified logging initialization for macula
//!
//! Console output always; with the `file-logging` feature and a configured
//! `log_dir`, a combined JSON log is also written to a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       └── macula.log.2025-01-01
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LoggingConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync + 'static>;

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Logging initialization result; keep it alive for the whole program
pub struct LoggingGuard {
    #[cfg(feature = "file-logging")]
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Run folder receiving file logs, if file logging is active
    pub fn log_dir(&self) -> Option<&Path> {
        self.log_dir.as_deref()
    }
}

/// Filter directives: per-crate debug flags over the configured default level
pub fn filter_directives(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<String> {
    let level = config
        .parsed_level()
        .ok_or_else(|| anyhow!("invalid log level '{}'", config.level))?;
    Ok(debug_flags.to_filter_string_with_default(&level.to_string().to_lowercase()))
}

fn env_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives)
        .with_context(|| format!("invalid log filter directives: {}", directives))
}

/// Install the global subscriber
///
/// # Errors
/// Fails on an invalid level, when the log folder cannot be created, or when a
/// global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig, debug_flags: &CrateDebugFlags) -> Result<LoggingGuard> {
    let directives = filter_directives(config, debug_flags)?;

    let console: BoxedLayer = match config.format {
        LogFormat::Text => fmt::layer()
            .with_target(false)
            .with_file(false)
            .with_line_number(false)
            .with_filter(env_filter(&directives)?)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_filter(env_filter(&directives)?)
            .boxed(),
    };
    let mut layers = vec![console];

    #[cfg(feature = "file-logging")]
    let guard = match &config.log_dir {
        Some(base) => {
            let (run_folder, file_guard) = attach_file_layer(base, config, &directives, &mut layers)?;
            LoggingGuard {
                _file_guards: vec![file_guard],
                log_dir: Some(run_folder),
            }
        }
        None => LoggingGuard {
            _file_guards: Vec::new(),
            log_dir: None,
        },
    };
    #[cfg(not(feature = "file-logging"))]
    let guard = LoggingGuard { log_dir: None };

    Registry::default()
        .with(layers)
        .try_init()
        .context("a global tracing subscriber is already installed")?;

    if config.log_dir.is_some() && guard.log_dir.is_none() {
        tracing::warn!("[LOGGING] log_dir is set but file logging is not compiled in; console only");
    }
    tracing::debug!("[LOGGING] Initialised with filter '{}'", directives);

    Ok(guard)
}

#[cfg(feature = "file-logging")]
fn attach_file_layer(
    base_log_dir: &Path,
    config: &LoggingConfig,
    directives: &str,
    layers: &mut Vec<BoxedLayer>,
) -> Result<(PathBuf, tracing_appender::non_blocking::WorkerGuard)> {
    let run_folder = base_log_dir.join(format!(
        "{}{}",
        RUN_PREFIX,
        Utc::now().format(RUN_TIMESTAMP_FORMAT)
    ));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;

    cleanup_old_logs(
        base_log_dir,
        config.retention_days,
        config.retention_runs,
        Utc::now(),
    )?;

    let appender = tracing_appender::rolling::daily(&run_folder, "macula.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    layers.push(
        fmt::layer()
            .with_writer(writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(env_filter(directives)?)
            .boxed(),
    );

    Ok((run_folder, guard))
}

fn run_timestamp(path: &Path) -> Option<DateTime<Utc>> {
    let name = path.file_name()?.to_str()?;
    let stamp = name.strip_prefix(RUN_PREFIX)?;
    let naive = NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT).ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

/// Remove run folders older than `retention_days`, then all but the newest
/// `retention_runs`. Returns how many folders were removed.
pub fn cleanup_old_logs(
    base_log_dir: &Path,
    retention_days: u64,
    retention_runs: usize,
    now: DateTime<Utc>,
) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let cutoff = now - chrono::Duration::days(retention_days as i64);

    let mut runs: Vec<(PathBuf, DateTime<Utc>)> = Vec::new();
    for entry in std::fs::read_dir(base_log_dir)? {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        if let Some(stamp) = run_timestamp(&path) {
            runs.push((path, stamp));
        }
    }

    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    for (index, (path, stamp)) in runs.iter().enumerate() {
        if *stamp >= cutoff && index < retention_runs {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => eprintln!(
                "Warning: Failed to remove old log directory {}: {}",
                path.display(),
                e
            ),
        }
    }

    Ok(removed)
}
