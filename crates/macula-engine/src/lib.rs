// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

// Manual `n % divisor == 0` used instead of `n.is_multiple_of(divisor)` for stable Rust
// compatibility.
#![allow(clippy::manual_is_multiple_of)]
/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Macula Engine
//!
//! Hybrid continuous / discrete-event simulation of the cone layer.
//!
//! ## Architecture
//! - Geometry is shared and read-only (`Arc<ConeLattice>`)
//! - Per-cone state is an owned arena, mutated only by the photoreceptor engine
//! - Integration stops exactly on every photon arrival and sample time
//! - Rayon for the final all-cone flush
//! - Cooperative cancellation via an atomic flag, checked once per photon

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod integrator;
pub mod orchestrator;
pub mod photoreceptor;
pub mod signal_trace;

pub use integrator::{
    integrate, require_resolvable_step, IntegrationMethod, IntegrationParameters,
};
pub use orchestrator::{
    CancellationToken, ConeFailure, RunStatistics, Simulation, SimulationParameters,
    SimulationReport, Termination,
};
pub use photoreceptor::{ConeUnit, PhotoreceptorEngine};
pub use signal_trace::{SignalTrace, TraceSample};
