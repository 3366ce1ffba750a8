// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Simulation Orchestrator
//!
//! Owns the global clock and drives a run from t = 0 to the end time:
//!
//! ```text
//! for photon in source:                         (non-decreasing arrival times)
//!     if cancelled            → flush(clock), Cancelled
//!     if arrival > end        → EndTimeReached
//!     clock = arrival
//!     for cone in lattice.cones_at(photon)      (ascending ConeId)
//!         engine.absorb(cone, photon)           (lazy: only this cone moves)
//! flush(end) + final sample                     (all cones, rayon)
//! ```
//!
//! A diverging cone is recorded as a [`ConeFailure`] and the run continues.
//! Configuration errors surface from [`Simulation::new`], before any work.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use macula_retina::types::error::require_positive;
use macula_retina::{
    ConeId, ConeLattice, ConeModel, GradedConeModel, GradedConeParameters, Photon, Result,
    RetinaError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, trace, warn};

use crate::integrator::{require_resolvable_step, IntegrationParameters};
use crate::photoreceptor::PhotoreceptorEngine;
use crate::signal_trace::SignalTrace;

/// Clock and reporting configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    pub end_time_ms: f64,
    /// Trace sampling interval Δ (ms); samples fall on `k·Δ`
    pub reporting_interval_ms: f64,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            end_time_ms: 100.0,
            reporting_interval_ms: 1.0,
        }
    }
}

impl SimulationParameters {
    pub fn validate(&self) -> Result<()> {
        require_positive("simulation.end_time_ms", self.end_time_ms)?;
        require_positive("simulation.reporting_interval_ms", self.reporting_interval_ms)
    }
}

/// Cooperative cancellation flag, checked once per photon
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Why a run stopped
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Termination {
    /// The photon source ran dry; cones were advanced to the end time
    SourceExhausted,
    /// The next photon arrived after the end time
    EndTimeReached,
    /// Stopped early; traces hold every sample strictly before `at_ms`
    Cancelled { at_ms: f64 },
}

/// A cone whose integration diverged
#[derive(Debug, Clone, PartialEq)]
pub struct ConeFailure {
    pub cone_id: ConeId,
    pub error: RetinaError,
}

/// Counters for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStatistics {
    /// Photons taken from the source and dispatched
    pub photons_dispatched: u64,
    /// Photons that fell outside every receptive field
    pub photons_unabsorbed: u64,
    /// Photon-to-cone deliveries (one photon may reach several cones)
    pub absorptions: u64,
    /// Deliveries skipped because the cone had already diverged
    pub skipped_deliveries: u64,
    pub samples_recorded: u64,
    pub wall_time: Duration,
}

/// Output of a run, keyed by cone id
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub traces: BTreeMap<ConeId, SignalTrace>,
    pub termination: Termination,
    /// Time every trace was brought up to
    pub final_time_ms: f64,
    pub stats: RunStatistics,
    pub failures: Vec<ConeFailure>,
}

impl SimulationReport {
    pub fn trace(&self, id: ConeId) -> Result<&SignalTrace> {
        self.traces.get(&id).ok_or(RetinaError::ConeNotFound(id))
    }

    /// True if no cone diverged
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn was_cancelled(&self) -> bool {
        matches!(self.termination, Termination::Cancelled { .. })
    }

    /// `(time, release)` series for every cone, the downstream hand-off format
    pub fn release_series(&self) -> BTreeMap<ConeId, Vec<(f64, f64)>> {
        self.traces
            .iter()
            .map(|(id, trace)| (*id, trace.release_pairs().collect()))
            .collect()
    }
}

/// One simulation run over a fixed lattice
pub struct Simulation<M: ConeModel = GradedConeModel> {
    lattice: Arc<ConeLattice>,
    engine: PhotoreceptorEngine<M>,
    params: SimulationParameters,
    cancellation: CancellationToken,
}

impl Simulation<GradedConeModel> {
    /// Simulation with the graded cone model
    pub fn graded(
        lattice: Arc<ConeLattice>,
        cone_params: GradedConeParameters,
        integration: IntegrationParameters,
        params: SimulationParameters,
    ) -> Result<Self> {
        Self::new(lattice, GradedConeModel::new(), cone_params, integration, params)
    }
}

impl<M: ConeModel> Simulation<M> {
    /// Validates every parameter set up front
    pub fn new(
        lattice: Arc<ConeLattice>,
        model: M,
        cone_params: M::Parameters,
        integration: IntegrationParameters,
        params: SimulationParameters,
    ) -> Result<Self> {
        params.validate()?;
        let engine = PhotoreceptorEngine::new(
            &lattice,
            model,
            cone_params,
            integration,
            params.reporting_interval_ms,
        )?;
        require_resolvable_step(integration.step_ms, params.end_time_ms)?;
        Ok(Self {
            lattice,
            engine,
            params,
            cancellation: CancellationToken::new(),
        })
    }

    /// Handle that stops this run from another thread (or from inside the source)
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation.clone()
    }

    pub fn lattice(&self) -> &ConeLattice {
        &self.lattice
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// Consume `photons` and integrate every cone to the end (or cancellation) time
    pub fn run<I>(mut self, photons: I) -> Result<SimulationReport>
    where
        I: IntoIterator<Item = Photon>,
    {
        let started = Instant::now();
        let end_ms = self.params.end_time_ms;
        let mut traces = self.engine.new_traces();
        let mut stats = RunStatistics::default();
        let mut failures: Vec<ConeFailure> = Vec::new();
        let mut hits: Vec<ConeId> = Vec::new();
        let mut clock_ms = 0.0_f64;
        let mut termination = Termination::SourceExhausted;

        info!(
            "[SIMULATION] Starting run: {} cones, end={} ms, Δ={} ms, model={}",
            self.lattice.len(),
            end_ms,
            self.params.reporting_interval_ms,
            self.engine.model().model_name()
        );

        for photon in photons {
            if self.cancellation.is_cancelled() {
                termination = Termination::Cancelled { at_ms: clock_ms };
                break;
            }
            photon.validate()?;
            if photon.arrival_ms < clock_ms {
                return Err(RetinaError::OutOfOrderPhoton {
                    previous_ms: clock_ms,
                    arrival_ms: photon.arrival_ms,
                });
            }
            if photon.arrival_ms > end_ms {
                termination = Termination::EndTimeReached;
                break;
            }

            clock_ms = photon.arrival_ms;
            stats.photons_dispatched += 1;
            self.lattice.cones_at_into(photon.position, &mut hits);
            trace!(
                "[SIMULATION] Photon t={:.4} ms λ={:.1} nm at ({:.2}, {:.2}) → {} cone(s)",
                photon.arrival_ms,
                photon.wavelength_nm,
                photon.position.x,
                photon.position.y,
                hits.len()
            );
            if hits.is_empty() {
                stats.photons_unabsorbed += 1;
                continue;
            }

            for &id in &hits {
                if self.engine.units()[id.index()].is_failed() {
                    stats.skipped_deliveries += 1;
                    continue;
                }
                match self.engine.absorb(id, &photon, &mut traces[id.index()]) {
                    Ok(()) => stats.absorptions += 1,
                    Err(err) if err.is_numerical_instability() => {
                        warn!("[SIMULATION] {} diverged: {}", id, err);
                        failures.push(ConeFailure {
                            cone_id: id,
                            error: err,
                        });
                    }
                    Err(err) => return Err(err),
                }
            }

            if stats.photons_dispatched % 100_000 == 0 {
                debug!(
                    "[SIMULATION] {} photons dispatched, clock={:.3} ms",
                    stats.photons_dispatched, clock_ms
                );
            }
        }

        let final_time_ms = match termination {
            Termination::Cancelled { at_ms } => {
                warn!("[SIMULATION] Cancelled at t={} ms; flushing partial traces", at_ms);
                let errors = self.engine.flush(at_ms, &mut traces, false)?;
                collect_failures(errors, &mut failures)?;
                at_ms
            }
            Termination::SourceExhausted | Termination::EndTimeReached => {
                let errors = self.engine.flush(end_ms, &mut traces, true)?;
                collect_failures(errors, &mut failures)?;
                end_ms
            }
        };

        failures.sort_by_key(|f| f.cone_id);
        stats.samples_recorded = traces.iter().map(|t| t.len() as u64).sum();
        stats.wall_time = started.elapsed();

        info!(
            "[SIMULATION] Run finished ({:?}) at t={} ms: {} photons, {} absorptions, {} samples, {} failed cone(s) in {:?}",
            termination,
            final_time_ms,
            stats.photons_dispatched,
            stats.absorptions,
            stats.samples_recorded,
            failures.len(),
            stats.wall_time
        );

        Ok(SimulationReport {
            traces: traces.into_iter().map(|t| (t.cone_id(), t)).collect(),
            termination,
            final_time_ms,
            stats,
            failures,
        })
    }
}

/// Divergences become per-cone failures; anything else aborts the run
fn collect_failures(errors: Vec<RetinaError>, failures: &mut Vec<ConeFailure>) -> Result<()> {
    for error in errors {
        let cone_id = match &error {
            RetinaError::NumericalInstability { cone_id, .. } => *cone_id,
            _ => return Err(error),
        };
        warn!("[SIMULATION] {} diverged during flush: {}", cone_id, error);
        failures.push(ConeFailure { cone_id, error });
    }
    Ok(())
}
