// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! This module implements the 3-tier configuration loading system:
//! 1. TOML file (base defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use macula_engine::IntegrationMethod;
use tracing::warn;

use crate::{ConfigError, ConfigResult, MaculaConfig};

/// File name searched for by [`find_config_file`]
pub const CONFIG_FILE_NAME: &str = "macula.toml";

/// Environment variable pointing at an explicit configuration file
pub const CONFIG_PATH_ENV_VAR: &str = "MACULA_CONFIG_PATH";

/// Find the macula configuration file
///
/// Search order:
/// 1. `MACULA_CONFIG_PATH` environment variable
/// 2. Current working directory: `./macula.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV_VAR) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV_VAR,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV_VAR
    )))
}

/// Parse TOML text; missing sections and keys take their defaults
pub fn parse_config(content: &str) -> ConfigResult<MaculaConfig> {
    Ok(toml::from_str(content)?)
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides (dotted keys, see [`apply_cli_overrides`])
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML. Values
/// are not validated here; call [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<MaculaConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config = parse_config(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

fn parse_or_warn<T: FromStr>(source: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("[CONFIG] Ignoring {}: cannot parse '{}'", source, raw);
            None
        }
    }
}

fn parse_method(source: &str, raw: &str) -> Option<IntegrationMethod> {
    match raw.trim().to_lowercase().replace('-', "_").as_str() {
        "runge_kutta4" | "rk4" => Some(IntegrationMethod::RungeKutta4),
        "exponential_euler" => Some(IntegrationMethod::ExponentialEuler),
        _ => {
            warn!("[CONFIG] Ignoring {}: unknown integration method '{}'", source, raw);
            None
        }
    }
}

/// Apply one override by dotted key; returns false for unknown keys
fn apply_override(config: &mut MaculaConfig, key: &str, raw: &str, source: &str) -> bool {
    match key {
        "seed" => {
            if let Some(seed) = parse_or_warn(source, raw) {
                config.photons.seed = seed;
                config.lattice.seed = seed;
            }
        }
        "photons.seed" => {
            if let Some(seed) = parse_or_warn(source, raw) {
                config.photons.seed = seed;
            }
        }
        "lattice.seed" => {
            if let Some(seed) = parse_or_warn(source, raw) {
                config.lattice.seed = seed;
            }
        }
        "lattice.jitter_um" => {
            if let Some(jitter) = parse_or_warn(source, raw) {
                config.lattice.jitter_um = jitter;
            }
        }
        "photons.rate_per_ms" => {
            if let Some(rate) = parse_or_warn(source, raw) {
                config.photons.rate_per_ms = rate;
            }
        }
        "photons.max_events" => {
            if let Some(max_events) = parse_or_warn(source, raw) {
                config.photons.max_events = Some(max_events);
            }
        }
        "simulation.end_time_ms" => {
            if let Some(end) = parse_or_warn(source, raw) {
                config.simulation.end_time_ms = end;
            }
        }
        "simulation.reporting_interval_ms" => {
            if let Some(interval) = parse_or_warn(source, raw) {
                config.simulation.reporting_interval_ms = interval;
            }
        }
        "integration.step_ms" => {
            if let Some(step) = parse_or_warn(source, raw) {
                config.integration.step_ms = step;
            }
        }
        "integration.method" => {
            if let Some(method) = parse_method(source, raw) {
                config.integration.method = method;
            }
        }
        "logging.level" => config.logging.level = raw.trim().to_string(),
        _ => return false,
    }
    true
}

/// Environment variable → dotted configuration key
const ENVIRONMENT_OVERRIDES: &[(&str, &str)] = &[
    ("MACULA_SEED", "seed"),
    ("MACULA_PHOTON_RATE", "photons.rate_per_ms"),
    ("MACULA_END_TIME_MS", "simulation.end_time_ms"),
    ("MACULA_REPORTING_INTERVAL_MS", "simulation.reporting_interval_ms"),
    ("MACULA_STEP_MS", "integration.step_ms"),
    ("MACULA_INTEGRATION_METHOD", "integration.method"),
    ("MACULA_LOG_LEVEL", "logging.level"),
];

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `MACULA_SEED` -> `photons.seed` and `lattice.seed`
/// - `MACULA_PHOTON_RATE` -> `photons.rate_per_ms`
/// - `MACULA_END_TIME_MS` -> `simulation.end_time_ms`
/// - `MACULA_REPORTING_INTERVAL_MS` -> `simulation.reporting_interval_ms`
/// - `MACULA_STEP_MS` -> `integration.step_ms`
/// - `MACULA_INTEGRATION_METHOD` -> `integration.method`
/// - `MACULA_LOG_LEVEL` -> `logging.level`
///
/// Unparsable values are ignored with a warning.
pub fn apply_environment_overrides(config: &mut MaculaConfig) {
    for (variable, key) in ENVIRONMENT_OVERRIDES {
        if let Ok(value) = env::var(variable) {
            apply_override(config, key, &value, variable);
        }
    }
}

/// Apply CLI argument overrides to configuration
///
/// Keys are dotted paths: `seed` (both seeds), `photons.seed`, `lattice.seed`,
/// `lattice.jitter_um`, `photons.rate_per_ms`, `photons.max_events`,
/// `simulation.end_time_ms`, `simulation.reporting_interval_ms`,
/// `integration.step_ms`, `integration.method`, `logging.level`.
pub fn apply_cli_overrides(config: &mut MaculaConfig, cli_args: &HashMap<String, String>) {
    for (key, value) in cli_args {
        if !apply_override(config, key, value, key) {
            warn!("[CONFIG] Ignoring unknown CLI override '{}'", key);
        }
    }
}
