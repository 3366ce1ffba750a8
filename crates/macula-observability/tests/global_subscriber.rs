// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! The global subscriber can be installed once per process; this file holds a
//! single test so no other test races for it.

use macula_observability::{init_logging, CrateDebugFlags, LogFormat, LoggingConfig};

#[test]
fn test_init_logging_installs_once() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Json,
        ..Default::default()
    };
    let flags = CrateDebugFlags::from_env_value("macula-engine");

    let guard = init_logging(&config, &flags).expect("first initialisation succeeds");
    assert!(guard.log_dir().is_none());
    tracing::info!("[TEST] logging is live");

    let second = init_logging(&config, &flags);
    assert!(second.is_err());
}
