// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! CLI argument parsing for per-crate debug flags
//!
//! Supports flags like `--debug-macula-engine`, `--debug-macula-retina`, etc.
//! to raise the log level of individual crates.

use std::collections::HashMap;

use crate::KNOWN_CRATES;

/// Environment variable holding comma-separated crate names (or `all`)
pub const DEBUG_ENV_VAR: &str = "MACULA_DEBUG";

/// Parse debug flags from command-line arguments
///
/// # Example
/// ```rust
/// use macula_observability::CrateDebugFlags;
///
/// let flags = CrateDebugFlags::from_args(std::env::args());
/// if flags.is_enabled("macula-engine") {
///     // Per-photon tracing of the engine is useful here
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CrateDebugFlags {
    pub enabled_crates: HashMap<String, bool>,
}

impl CrateDebugFlags {
    /// Parse debug flags from command-line arguments
    ///
    /// Looks for arguments matching `--debug-{crate-name}` pattern.
    /// Also supports `--debug-all` to enable all crates.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut flags = CrateDebugFlags::default();

        for arg in args {
            if arg == "--debug-all" {
                flags.enable_all();
                continue;
            }

            if let Some(crate_name) = arg.strip_prefix("--debug-") {
                flags.enable(crate_name);
            }
        }

        flags
    }

    /// Parse the `MACULA_DEBUG` format: `all` or comma-separated crate names
    pub fn from_env_value(value: &str) -> Self {
        let mut flags = CrateDebugFlags::default();
        if value.trim() == "all" {
            flags.enable_all();
            return flags;
        }
        for crate_name in value.split(',') {
            let crate_name = crate_name.trim();
            if !crate_name.is_empty() {
                flags.enable(crate_name);
            }
        }
        flags
    }

    pub fn enable(&mut self, crate_name: &str) {
        self.enabled_crates.insert(crate_name.to_string(), true);
    }

    pub fn enable_all(&mut self) {
        for crate_name in KNOWN_CRATES {
            self.enable(crate_name);
        }
    }

    /// Check if debug is enabled for a specific crate
    pub fn is_enabled(&self, crate_name: &str) -> bool {
        self.enabled_crates.contains_key(crate_name)
    }

    /// Get all enabled crates, sorted
    pub fn enabled_crates(&self) -> Vec<&String> {
        let mut crates: Vec<&String> = self.enabled_crates.keys().collect();
        crates.sort();
        crates
    }

    /// Check if debug is enabled for any crate
    pub fn any_enabled(&self) -> bool {
        !self.enabled_crates.is_empty()
    }

    /// `DEBUG` for enabled crates, `INFO` otherwise
    pub fn log_level(&self, crate_name: &str) -> tracing::Level {
        if self.is_enabled(crate_name) {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// `EnvFilter` directives with `info` as the default level
    pub fn to_filter_string(&self) -> String {
        self.to_filter_string_with_default("info")
    }

    /// `EnvFilter` directives: `macula_engine=debug,...,{default_level}`
    ///
    /// Tracing targets are module paths, so crate names are written with
    /// underscores.
    pub fn to_filter_string_with_default(&self, default_level: &str) -> String {
        let mut filters: Vec<String> = self
            .enabled_crates()
            .into_iter()
            .map(|crate_name| format!("{}=debug", crate_name.replace('-', "_")))
            .collect();
        filters.push(default_level.to_string());
        filters.join(",")
    }
}

/// Generate help text for debug flags
pub fn debug_flags_help() -> String {
    format!(
        r#"Debug Flags:
  --debug-all                    Enable debug logging for all crates
  --debug-{{crate-name}}          Enable debug logging for specific crate

Available crates:
  {}

Environment Variable:
  {env}={{crate-name}}[,{{crate-name}}]  Enable debug for crates (comma-separated)
  {env}=all                               Enable debug for all crates

Examples:
  --debug-macula-engine
  --debug-macula-engine --debug-macula-retina
  {env}=macula-engine,macula-retina
"#,
        KNOWN_CRATES.join(", "),
        env = DEBUG_ENV_VAR
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crate_flag() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-macula-engine".to_string()]);
        assert!(flags.is_enabled("macula-engine"));
        assert!(!flags.is_enabled("macula-retina"));
    }

    #[test]
    fn test_unrelated_arguments_are_ignored() {
        let flags = CrateDebugFlags::from_args(vec![
            "macula".to_string(),
            "--config".to_string(),
            "macula.toml".to_string(),
        ]);
        assert!(!flags.any_enabled());
        assert_eq!(flags.to_filter_string(), "info");
    }

    #[test]
    fn test_debug_all() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-all".to_string()]);
        for crate_name in KNOWN_CRATES {
            assert!(flags.is_enabled(crate_name), "{} should be enabled", crate_name);
        }
    }

    #[test]
    fn test_filter_string_uses_module_paths() {
        let flags = CrateDebugFlags::from_args(vec![
            "--debug-macula-retina".to_string(),
            "--debug-macula-engine".to_string(),
        ]);
        assert_eq!(
            flags.to_filter_string_with_default("warn"),
            "macula_engine=debug,macula_retina=debug,warn"
        );
    }

    #[test]
    fn test_env_value() {
        let flags = CrateDebugFlags::from_env_value(" macula-engine , ,macula-config");
        assert_eq!(flags.enabled_crates(), vec!["macula-config", "macula-engine"]);

        let all = CrateDebugFlags::from_env_value("all");
        assert_eq!(all.enabled_crates().len(), KNOWN_CRATES.len());
    }

    #[test]
    fn test_log_level() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-macula-engine".to_string()]);
        assert_eq!(flags.log_level("macula-engine"), tracing::Level::DEBUG);
        assert_eq!(flags.log_level("macula-retina"), tracing::Level::INFO);
    }

    #[test]
    fn test_help_lists_crates() {
        let help = debug_flags_help();
        for crate_name in KNOWN_CRATES {
            assert!(help.contains(crate_name));
        }
        assert!(help.contains("MACULA_DEBUG=all"));
    }
}
