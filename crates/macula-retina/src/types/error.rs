// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for retina modelling and simulation

use super::ids::ConeId;

/// Error types for lattice construction, photon generation and cone integration
///
/// Configuration errors are raised eagerly, before any simulation work starts.
/// Numerical instabilities are raised per cone and carry enough context to
/// reproduce the failing step.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetinaError {
    #[error("invalid configuration for {parameter}: {reason}")]
    Configuration { parameter: String, reason: String },

    #[error(
        "numerical instability in {cone_id} at t={time_ms} ms (V={potential_mv} mV, A={adaptation}); reduce the integration step"
    )]
    NumericalInstability {
        cone_id: ConeId,
        time_ms: f64,
        potential_mv: f64,
        adaptation: f64,
    },

    #[error("photon stream is not time-ordered: arrival {arrival_ms} ms after {previous_ms} ms")]
    OutOfOrderPhoton { previous_ms: f64, arrival_ms: f64 },

    #[error("cone not found: {0}")]
    ConeNotFound(ConeId),
}

impl RetinaError {
    /// Shorthand for a configuration error on a named parameter
    pub fn configuration(parameter: impl Into<String>, reason: impl Into<String>) -> Self {
        RetinaError::Configuration {
            parameter: parameter.into(),
            reason: reason.into(),
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, RetinaError::Configuration { .. })
    }

    pub fn is_numerical_instability(&self) -> bool {
        matches!(self, RetinaError::NumericalInstability { .. })
    }
}

pub type Result<T> = core::result::Result<T, RetinaError>;
pub type Error = RetinaError;

/// Reject a non-finite or non-positive parameter
pub fn require_positive(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(RetinaError::configuration(
            parameter,
            format!("must be finite and > 0, got {}", value),
        ))
    }
}

/// Reject a non-finite or negative parameter
pub fn require_non_negative(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RetinaError::configuration(
            parameter,
            format!("must be finite and >= 0, got {}", value),
        ))
    }
}

pub fn require_finite(parameter: &str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(RetinaError::configuration(
            parameter,
            format!("must be finite, got {}", value),
        ))
    }
}
