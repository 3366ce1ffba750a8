// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # macula-observability
//!
//! Logging setup shared by every macula crate, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: rolling JSON log files in timestamped run folders

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known macula crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "macula",
    "macula-retina",
    "macula-engine",
    "macula-config",
    "macula-observability",
];
