// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Macula - Macular Cone Photoreceptor Simulation
//!
//! Simulates the cone photoreceptors of the human macula responding to a
//! stream of photons: a hexagonal cone lattice whose density falls with
//! eccentricity, a seeded photon source, and a graded (non-spiking) cone model
//! whose output is a neurotransmitter release trace per cone.
//!
//! ## Quick Start
//!
//! The default configuration is the whole macula (about 1.4 million cones,
//! 101 samples each), which needs several GB for the traces. Shrink
//! `config.lattice` radii for a quick look.
//!
//! ```rust,no_run
//! use macula::prelude::*;
//!
//! let config = MaculaConfig::default();
//! let report = macula::run_with_config(&config)?;
//!
//! for (cone_id, trace) in &report.traces {
//!     let peak = trace.peak_release().map(|s| s.release).unwrap_or(0.0);
//!     println!("{}: {} samples, peak release {:.3}", cone_id, trace.len(), peak);
//! }
//! # Ok::<(), macula::MaculaError>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`file-logging`**: rolling JSON log files (see `macula-observability`)
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: macula-config, macula-observability        │
//! │  (TOML + overrides, logging and debug flags)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Model: macula-retina                                   │
//! │  (Cone lattice, photon sources, cone dynamics)          │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Execution: macula-engine                               │
//! │  (Photoreceptor engine, orchestrator, signal traces)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## License
//!
//! Apache-2.0

use std::sync::Arc;

use tracing::info;

// Re-export workspace crates
pub use macula_config as config;
pub use macula_engine as engine;
pub use macula_observability as observability;
pub use macula_retina as retina;

use macula_config::{validate_config, ConfigError, MaculaConfig};
use macula_engine::{Simulation, SimulationReport};
use macula_retina::{ConeLattice, PoissonPhotonSource, RetinaError};

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::config::{load_config, validate_config, MaculaConfig};
    pub use crate::engine::{
        CancellationToken, IntegrationMethod, IntegrationParameters, Simulation,
        SimulationParameters, SimulationReport, SignalTrace, Termination, TraceSample,
    };
    pub use crate::retina::{
        ConeId, ConeLattice, ConeModel, ConeType, Footprint, GradedConeModel,
        GradedConeParameters, LatticeParameters, MacularRegion, MergedSource, Photon,
        PhotonSourceParameters, PoissonPhotonSource, Point2, ReceptiveField, RetinaError,
        ScriptedPhotonSource, Spectrum,
    };
    pub use crate::{build_simulation, run_with_config, MaculaError};
}

/// Errors surfaced by the convenience pipeline
#[derive(Debug, thiserror::Error)]
pub enum MaculaError {
    #[error(transparent)]
    Retina(#[from] RetinaError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Validate `config`, build the lattice and the ambient photon source, and
/// return a ready simulation plus its source.
///
/// Use this instead of [`run_with_config`] when the caller needs the
/// cancellation token or wants to lay scripted flashes over the ambient light.
pub fn build_simulation(
    config: &MaculaConfig,
) -> Result<(Simulation, PoissonPhotonSource), MaculaError> {
    validate_config(config)?;

    let lattice = ConeLattice::build(&config.lattice)?;
    info!(
        "[MACULA] Lattice ready: {} cones ({} foveola, {} fovea, {} parafovea)",
        lattice.len(),
        lattice.count_in(macula_retina::MacularRegion::Foveola),
        lattice.count_in(macula_retina::MacularRegion::Fovea),
        lattice.count_in(macula_retina::MacularRegion::Parafovea)
    );

    let source = PoissonPhotonSource::new(config.photons.clone())?;
    let simulation = Simulation::graded(
        Arc::new(lattice),
        config.cone,
        config.integration,
        config.simulation,
    )?;
    Ok((simulation, source))
}

/// Run one simulation end to end from a configuration
pub fn run_with_config(config: &MaculaConfig) -> Result<SimulationReport, MaculaError> {
    let (simulation, source) = build_simulation(config)?;
    Ok(simulation.run(source)?)
}
