// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Runs every section's own validator plus the checks that need more than one
//! section, and reports all violations at once.

use macula_engine::require_resolvable_step;
use macula_retina::{Footprint, ModelParameters, RetinaError};

use crate::{ConfigError, ConfigResult, MaculaConfig};

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    /// A section rejected one of its own parameters
    Section { section: &'static str, error: RetinaError },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Section { section, error } => write!(f, "[{}] {}", section, error),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &MaculaConfig) -> ConfigResult<()> {
    let errors = collect_violations(config);
    if errors.is_empty() {
        return Ok(());
    }

    let error_messages = errors
        .iter()
        .map(|e| format!("  - {}", e))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::ValidationError(format!(
        "Configuration validation failed:\n{}",
        error_messages
    )))
}

/// Every violation in `config`, in section order
pub fn collect_violations(config: &MaculaConfig) -> Vec<ConfigValidationError> {
    let mut errors = Vec::new();

    let sections: [(&'static str, Result<(), RetinaError>); 5] = [
        ("lattice", config.lattice.validate()),
        ("photons", config.photons.validate()),
        ("cone", config.cone.validate()),
        ("integration", config.integration.validate()),
        ("simulation", config.simulation.validate()),
    ];
    let sections_ok = sections.iter().all(|(_, outcome)| outcome.is_ok());
    for (section, outcome) in sections {
        if let Err(error) = outcome {
            errors.push(ConfigValidationError::Section { section, error });
        }
    }

    if sections_ok {
        if let Err(error) =
            require_resolvable_step(config.integration.step_ms, config.simulation.end_time_ms)
        {
            errors.push(ConfigValidationError::Section {
                section: "integration",
                error,
            });
        }
    }

    validate_logging(config, &mut errors);
    validate_illumination_reaches_macula(config, &mut errors);

    errors
}

fn validate_logging(config: &MaculaConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.logging.parsed_level().is_none() {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!(
                "'{}' is not one of trace, debug, info, warn, error",
                config.logging.level
            ),
        });
    }
}

/// A footprint with bounded support that misses the whole lattice would
/// deliver photons no cone can absorb
fn validate_illumination_reaches_macula(
    config: &MaculaConfig,
    errors: &mut Vec<ConfigValidationError>,
) {
    let reach_um = match config.photons.footprint {
        Footprint::Point { .. } => 0.0,
        Footprint::UniformDisk { radius_um, .. } => radius_um,
        Footprint::Gaussian { .. } => return,
    };
    let center = config.photons.footprint.center();
    let distance = center.distance_to(config.lattice.center);
    let outer = config.lattice.parafovea.outer_radius_um + config.lattice.max_receptive_field_um();

    if distance - reach_um > outer {
        errors.push(ConfigValidationError::InvalidValue {
            field: "photons.footprint".to_string(),
            reason: format!(
                "illumination lies {:.1} µm from the macular centre, beyond the outermost cone field ({:.1} µm)",
                distance - reach_um,
                outer
            ),
        });
    }
}
