// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration sections
//!
//! Each section is the parameter type of the crate that consumes it, so a TOML
//! table maps one-to-one onto what the lattice builder, photon source, cone
//! model, integrator and orchestrator validate.

use macula_engine::{IntegrationParameters, SimulationParameters};
use macula_observability::LoggingConfig;
use macula_retina::{GradedConeParameters, LatticeParameters, PhotonSourceParameters};
use serde::{Deserialize, Serialize};

/// Root configuration (`macula.toml`)
///
/// ```toml
/// [lattice]
/// seed = 7
/// jitter_um = 0.3
///
/// [lattice.foveola]
/// outer_radius_um = 350.0
/// density_per_mm2 = 200000.0
/// cone_mix = { l = 0.5, m = 0.5, s = 0.0 }
///
/// [photons]
/// rate_per_ms = 250.0
/// spectrum = { kind = "monochromatic", wavelength_nm = 560.0 }
///
/// [integration]
/// method = "exponential_euler"
/// step_ms = 0.05
///
/// [simulation]
/// end_time_ms = 500.0
/// reporting_interval_ms = 1.0
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaculaConfig {
    pub lattice: LatticeParameters,
    pub photons: PhotonSourceParameters,
    pub cone: GradedConeParameters,
    pub integration: IntegrationParameters,
    pub simulation: SimulationParameters,
    pub logging: LoggingConfig,
}

impl MaculaConfig {
    /// Render as TOML, e.g. to write out a starting `macula.toml`
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
