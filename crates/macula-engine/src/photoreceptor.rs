// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Photoreceptor Engine
//!
//! Owns the mutable state of every cone (an arena parallel to the lattice) and
//! advances it event by event:
//!
//! ```text
//! absorb(cone, photon @ t):
//!     advance(cone, t)            record samples k·Δ < t on the way
//!     I_stim += amplitude × efficiency(type, λ)
//!
//! flush(t_end):                   all cones, in parallel
//!     advance(cone, t_end)
//!     record final sample at t_end
//! ```
//!
//! Integration always stops exactly on photon arrivals and sample times, so the
//! result does not depend on where those fall relative to the step grid.
//! A cone that diverges is frozen: its trace is marked incomplete and it ignores
//! later photons, while every other cone carries on.

use macula_retina::types::error::require_positive;
use macula_retina::{
    ConeGeometry, ConeId, ConeLattice, ConeModel, ConeState, ConeType, ModelParameters, Photon,
    Result, RetinaError,
};
use rayon::prelude::*;

use crate::integrator::{integrate, IntegrationParameters};
use crate::signal_trace::{SignalTrace, TraceSample};

/// Per-cone dynamical state
#[derive(Debug, Clone)]
pub struct ConeUnit {
    pub id: ConeId,
    pub cone_type: ConeType,
    pub state: ConeState,
    /// Time of last update (ms)
    pub time_ms: f64,
    /// Index `k` of the next due sample at `k·Δ`
    next_sample: u64,
    absorbed: u64,
    failure: Option<RetinaError>,
}

impl ConeUnit {
    fn new(geometry: &ConeGeometry, resting: ConeState) -> Self {
        Self {
            id: geometry.id,
            cone_type: geometry.cone_type,
            state: resting,
            time_ms: 0.0,
            next_sample: 0,
            absorbed: 0,
            failure: None,
        }
    }

    pub fn absorbed(&self) -> u64 {
        self.absorbed
    }

    pub fn failure(&self) -> Option<&RetinaError> {
        self.failure.as_ref()
    }

    pub fn is_failed(&self) -> bool {
        self.failure.is_some()
    }
}

/// Shared, read-only configuration of one engine
struct Dynamics<'a, M: ConeModel> {
    model: &'a M,
    params: &'a M::Parameters,
    integration: &'a IntegrationParameters,
    reporting_interval_ms: f64,
}

impl<M: ConeModel> Dynamics<'_, M> {
    fn sample_time(&self, index: u64) -> f64 {
        index as f64 * self.reporting_interval_ms
    }

    fn record(&self, unit: &ConeUnit, time_ms: f64, trace: &mut SignalTrace) {
        trace.push(TraceSample {
            time_ms,
            release: self.model.release(&unit.state, self.params),
            potential_mv: unit.state.potential_mv,
            adaptation: unit.state.adaptation,
        });
    }

    /// Bring `unit` to `target_ms`, recording every sample strictly before it
    fn advance(&self, unit: &mut ConeUnit, target_ms: f64, trace: &mut SignalTrace) -> Result<()> {
        if let Some(failure) = &unit.failure {
            return Err(failure.clone());
        }
        if target_ms < unit.time_ms {
            return Err(RetinaError::OutOfOrderPhoton {
                previous_ms: unit.time_ms,
                arrival_ms: target_ms,
            });
        }
        let outcome = self.advance_unchecked(unit, target_ms, trace);
        if let Err(err) = &outcome {
            unit.failure = Some(err.clone());
            trace.mark_incomplete();
        }
        outcome
    }

    fn advance_unchecked(
        &self,
        unit: &mut ConeUnit,
        target_ms: f64,
        trace: &mut SignalTrace,
    ) -> Result<()> {
        loop {
            let sample_ms = self.sample_time(unit.next_sample);
            if sample_ms >= target_ms {
                break;
            }
            integrate(
                self.model,
                self.params,
                self.integration,
                unit.id,
                &mut unit.state,
                unit.time_ms,
                sample_ms,
            )?;
            unit.time_ms = sample_ms;
            self.record(unit, sample_ms, trace);
            unit.next_sample += 1;
        }

        integrate(
            self.model,
            self.params,
            self.integration,
            unit.id,
            &mut unit.state,
            unit.time_ms,
            target_ms,
        )?;
        unit.time_ms = target_ms;
        Ok(())
    }

    /// Advance to `end_ms` and close the trace with a sample at `end_ms`
    fn finish(&self, unit: &mut ConeUnit, end_ms: f64, trace: &mut SignalTrace) -> Result<()> {
        self.advance(unit, end_ms, trace)?;
        if self.sample_time(unit.next_sample) == end_ms {
            unit.next_sample += 1;
        }
        if trace.last().map_or(true, |last| last.time_ms < end_ms) {
            self.record(unit, end_ms, trace);
        }
        Ok(())
    }
}

/// Event-driven integrator for every cone of a lattice
pub struct PhotoreceptorEngine<M: ConeModel> {
    model: M,
    params: M::Parameters,
    integration: IntegrationParameters,
    reporting_interval_ms: f64,
    units: Vec<ConeUnit>,
}

impl<M: ConeModel> PhotoreceptorEngine<M> {
    /// One dark-adapted unit per lattice cone; parameters are validated here
    pub fn new(
        lattice: &ConeLattice,
        model: M,
        params: M::Parameters,
        integration: IntegrationParameters,
        reporting_interval_ms: f64,
    ) -> Result<Self> {
        params.validate()?;
        integration.validate()?;
        require_positive("simulation.reporting_interval_ms", reporting_interval_ms)?;

        let resting = model.resting_state(&params);
        let units = lattice
            .cones()
            .iter()
            .map(|geometry| ConeUnit::new(geometry, resting))
            .collect();

        Ok(Self {
            model,
            params,
            integration,
            reporting_interval_ms,
            units,
        })
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn params(&self) -> &M::Parameters {
        &self.params
    }

    pub fn reporting_interval_ms(&self) -> f64 {
        self.reporting_interval_ms
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[ConeUnit] {
        &self.units
    }

    pub fn unit(&self, id: ConeId) -> Result<&ConeUnit> {
        self.units.get(id.index()).ok_or(RetinaError::ConeNotFound(id))
    }

    /// Empty traces, one per cone, in id order
    pub fn new_traces(&self) -> Vec<SignalTrace> {
        self.units.iter().map(|unit| SignalTrace::new(unit.id)).collect()
    }

    /// Advance one cone to `target_ms` without absorbing anything.
    ///
    /// A `target_ms` before the cone's own clock is rejected as out of order.
    pub fn advance(&mut self, id: ConeId, target_ms: f64, trace: &mut SignalTrace) -> Result<()> {
        let dynamics = Dynamics {
            model: &self.model,
            params: &self.params,
            integration: &self.integration,
            reporting_interval_ms: self.reporting_interval_ms,
        };
        let unit = self
            .units
            .get_mut(id.index())
            .ok_or(RetinaError::ConeNotFound(id))?;
        dynamics.advance(unit, target_ms, trace)
    }

    /// Advance the cone to the photon's arrival, then inject its stimulus
    pub fn absorb(&mut self, id: ConeId, photon: &Photon, trace: &mut SignalTrace) -> Result<()> {
        self.advance(id, photon.arrival_ms, trace)?;

        let unit = &mut self.units[id.index()];
        let efficiency =
            self.model
                .absorption_efficiency(unit.cone_type, photon.wavelength_nm, &self.params);
        self.model.absorb(&mut unit.state, efficiency, &self.params);
        unit.absorbed += 1;
        Ok(())
    }

    /// Bring every healthy cone to `target_ms` in parallel.
    ///
    /// `traces` must hold one trace per cone, in id order. With `close_traces`,
    /// each trace also gets its final sample at `target_ms`.
    /// Returns the errors of cones that diverged during this flush.
    pub fn flush(
        &mut self,
        target_ms: f64,
        traces: &mut [SignalTrace],
        close_traces: bool,
    ) -> Result<Vec<RetinaError>> {
        if traces.len() != self.units.len() {
            // first id left without a partner
            let unpaired = traces.len().min(self.units.len());
            return Err(RetinaError::ConeNotFound(ConeId(unpaired as u32)));
        }

        let dynamics = Dynamics {
            model: &self.model,
            params: &self.params,
            integration: &self.integration,
            reporting_interval_ms: self.reporting_interval_ms,
        };

        Ok(self
            .units
            .par_iter_mut()
            .zip(traces.par_iter_mut())
            .filter(|(unit, _)| !unit.is_failed())
            .filter_map(|(unit, trace)| {
                let outcome = if close_traces {
                    dynamics.finish(unit, target_ms, trace)
                } else {
                    dynamics.advance(unit, target_ms, trace)
                };
                outcome.err()
            })
            .collect())
    }

    /// Current release of a cone (no integration)
    pub fn release(&self, id: ConeId) -> Result<f64> {
        let unit = self.unit(id)?;
        Ok(self.model.release(&unit.state, &self.params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macula_retina::{
        GradedConeModel, GradedConeParameters, LatticeParameters, Point2, ReceptiveField,
    };

    fn two_cone_lattice() -> ConeLattice {
        let params = LatticeParameters::uniform(
            [10.0, 20.0, 30.0],
            1000.0,
            ConeType::L,
            ReceptiveField::Fixed { radius_um: 1.0 },
        );
        ConeLattice::from_positions(
            &params,
            [
                (Point2::new(0.0, 0.0), ConeType::L),
                (Point2::new(5.0, 0.0), ConeType::S),
            ],
        )
        .unwrap()
    }

    fn engine(interval: f64) -> PhotoreceptorEngine<GradedConeModel> {
        PhotoreceptorEngine::new(
            &two_cone_lattice(),
            GradedConeModel::new(),
            GradedConeParameters::default(),
            IntegrationParameters::default(),
            interval,
        )
        .unwrap()
    }

    #[test]
    fn test_samples_lie_on_the_reporting_grid() {
        let mut engine = engine(0.5);
        let mut traces = engine.new_traces();
        engine.advance(ConeId(0), 1.2, &mut traces[0]).unwrap();
        let times: Vec<f64> = traces[0].samples().iter().map(|s| s.time_ms).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.0]);
        assert_eq!(engine.unit(ConeId(0)).unwrap().time_ms, 1.2);
        assert!(traces[1].is_empty());
    }

    #[test]
    fn test_photon_at_sample_time_is_applied_before_sampling() {
        let mut engine = engine(1.0);
        let mut traces = engine.new_traces();
        let photon = Photon::new(560.0, Point2::ORIGIN, 1.0);
        engine.absorb(ConeId(0), &photon, &mut traces[0]).unwrap();
        assert_eq!(traces[0].len(), 1);

        let failures = engine.flush(2.0, &mut traces, true).unwrap();
        assert!(failures.is_empty());
        let at_one = traces[0].sample_at(1.0).unwrap();
        let at_zero = traces[0].sample_at(0.0).unwrap();
        // stimulus only, V has not moved yet
        assert_eq!(at_one.potential_mv, at_zero.potential_mv);
        assert!(traces[0].sample_at(2.0).unwrap().potential_mv > at_one.potential_mv);
    }

    #[test]
    fn test_final_sample_recorded_once_off_grid() {
        let mut engine = engine(1.0);
        let mut traces = engine.new_traces();
        engine.flush(2.5, &mut traces, true).unwrap();
        for trace in &traces {
            let times: Vec<f64> = trace.samples().iter().map(|s| s.time_ms).collect();
            assert_eq!(times, vec![0.0, 1.0, 2.0, 2.5]);
        }
    }

    #[test]
    fn test_final_sample_recorded_once_on_grid() {
        let mut engine = engine(1.0);
        let mut traces = engine.new_traces();
        engine.flush(2.0, &mut traces, true).unwrap();
        let times: Vec<f64> = traces[1].samples().iter().map(|s| s.time_ms).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0]);
    }

    #[test]
    fn test_spectral_efficiency_depends_on_cone_type() {
        let mut engine = engine(1.0);
        let mut traces = engine.new_traces();
        let red = Photon::new(560.0, Point2::ORIGIN, 0.0);
        engine.absorb(ConeId(0), &red, &mut traces[0]).unwrap();
        engine.absorb(ConeId(1), &red, &mut traces[1]).unwrap();
        let l = engine.unit(ConeId(0)).unwrap().state.stimulus;
        let s = engine.unit(ConeId(1)).unwrap().state.stimulus;
        assert!(l > 100.0 * s);
        assert_eq!(engine.unit(ConeId(0)).unwrap().absorbed(), 1);
    }

    #[test]
    fn test_unknown_cone() {
        let mut engine = engine(1.0);
        let mut trace = SignalTrace::new(ConeId(7));
        assert_eq!(
            engine.advance(ConeId(7), 1.0, &mut trace).unwrap_err(),
            RetinaError::ConeNotFound(ConeId(7))
        );
    }

    #[test]
    fn test_cone_clock_never_runs_backwards() {
        let mut engine = engine(1.0);
        let mut traces = engine.new_traces();
        let late = Photon::new(560.0, Point2::ORIGIN, 5.0);
        let early = Photon::new(560.0, Point2::ORIGIN, 2.0);

        engine.absorb(ConeId(0), &late, &mut traces[0]).unwrap();
        assert_eq!(
            engine.absorb(ConeId(0), &early, &mut traces[0]).unwrap_err(),
            RetinaError::OutOfOrderPhoton {
                previous_ms: 5.0,
                arrival_ms: 2.0
            }
        );
        assert!(engine.advance(ConeId(0), 4.0, &mut traces[0]).is_err());

        // rejected, not frozen: the cone keeps its clock and carries on
        let unit = engine.unit(ConeId(0)).unwrap();
        assert_eq!(unit.time_ms, 5.0);
        assert_eq!(unit.absorbed(), 1);
        assert!(!unit.is_failed());
        assert!(traces[0].is_complete());
        engine.absorb(ConeId(0), &late, &mut traces[0]).unwrap();
        assert_eq!(engine.unit(ConeId(0)).unwrap().absorbed(), 2);
    }

    #[test]
    fn test_new_traces_start_empty_in_id_order() {
        let engine = engine(0.001);
        let traces = engine.new_traces();
        let ids: Vec<ConeId> = traces.iter().map(|t| t.cone_id()).collect();
        assert_eq!(ids, vec![ConeId(0), ConeId(1)]);
        assert!(traces.iter().all(|t| t.is_empty() && t.samples().is_empty()));
    }

    #[test]
    fn test_flush_needs_one_trace_per_cone() {
        let mut engine = engine(1.0);
        let mut short = vec![SignalTrace::new(ConeId(0))];
        assert_eq!(
            engine.flush(1.0, &mut short, true).unwrap_err(),
            RetinaError::ConeNotFound(ConeId(1))
        );
        assert!(short[0].is_empty());

        let mut long = engine.new_traces();
        long.push(SignalTrace::new(ConeId(2)));
        assert_eq!(
            engine.flush(1.0, &mut long, true).unwrap_err(),
            RetinaError::ConeNotFound(ConeId(2))
        );
        assert_eq!(engine.unit(ConeId(0)).unwrap().time_ms, 0.0);
    }

    #[test]
    fn test_invalid_reporting_interval() {
        let result = PhotoreceptorEngine::new(
            &two_cone_lattice(),
            GradedConeModel::new(),
            GradedConeParameters::default(),
            IntegrationParameters::default(),
            0.0,
        );
        assert!(result.err().unwrap().is_configuration());
    }
}
