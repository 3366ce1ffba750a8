// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Macula Retina Model
//!
//! The spatial and per-cone model of the macular photoreceptor layer:
//! - **Types**: ids, regions, photons, errors
//! - **Lattice**: hexagonal cone mosaic with region-dependent density + spatial index
//! - **Stimulus**: seeded photon sources (Poisson, scripted, merged)
//! - **Models**: spectral sensitivity, stimulus kernels, graded cone dynamics
//!
//! Nothing here owns a clock; time-stepping lives in `macula-engine`.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod types;

pub mod lattice;
pub mod models;
pub mod sampling;
pub mod stimulus;

// Re-export types
pub use types::{
    ConeId, ConeMix, Error, MacularRegion, Photon, Point2, RegionProfile, Result, RetinaError,
};

pub use lattice::{ConeGeometry, ConeLattice, LatticeParameters, ReceptiveField, SpatialIndex};
pub use models::{
    ConeModel, ConeState, ConeType, GradedConeModel, GradedConeParameters, ModelParameters,
    SpectralSensitivity, SpectralTable, StimulusKernel,
};
pub use stimulus::{
    Footprint, FootprintSampler, MergedSource, PhotonSourceParameters, PoissonPhotonSource,
    ScriptedPhotonSource, Spectrum, SpectrumSampler,
};
