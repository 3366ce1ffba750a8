// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Fixed-Step Integration
//!
//! Advances one cone's state over `[from, to]` in steps of at most `step_ms`.
//! The last step is shortened so integration lands exactly on `to`; callers use
//! this to stop on photon arrivals and sample times.
//!
//! Every step is checked against the model's plausibility envelope; a state
//! outside it is reported as [`RetinaError::NumericalInstability`], never clamped.

use macula_retina::types::error::require_positive;
use macula_retina::{ConeId, ConeModel, ConeState, Result, RetinaError};
use serde::{Deserialize, Serialize};

/// Remaining intervals within this relative slack of a full step are taken in one go
const STEP_SLACK: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationMethod {
    /// Classical 4th-order Runge-Kutta
    #[default]
    RungeKutta4,
    /// Exact on the linear leaks, drives frozen over the step
    ExponentialEuler,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrationParameters {
    pub method: IntegrationMethod,
    /// Maximum step length (ms)
    pub step_ms: f64,
}

impl Default for IntegrationParameters {
    fn default() -> Self {
        Self {
            method: IntegrationMethod::default(),
            step_ms: 0.1,
        }
    }
}

impl IntegrationParameters {
    pub fn validate(&self) -> Result<()> {
        require_positive("integration.step_ms", self.step_ms)
    }
}

/// Reject a step too small to move the clock at `time_ms`
pub fn require_resolvable_step(step_ms: f64, time_ms: f64) -> Result<()> {
    if time_ms + step_ms > time_ms {
        Ok(())
    } else {
        Err(stalled_step(step_ms, time_ms))
    }
}

fn stalled_step(step_ms: f64, time_ms: f64) -> RetinaError {
    RetinaError::configuration(
        "integration.step_ms",
        format!(
            "a {} ms step no longer advances the clock at t={} ms",
            step_ms, time_ms
        ),
    )
}

/// One RK4 step of length `h`
#[inline]
fn rk4_step<M: ConeModel>(model: &M, state: &ConeState, h: f64, params: &M::Parameters) -> ConeState {
    let k1 = model.derivatives(state, params);
    let k2 = model.derivatives(&state.offset(&k1, h / 2.0), params);
    let k3 = model.derivatives(&state.offset(&k2, h / 2.0), params);
    let k4 = model.derivatives(&state.offset(&k3, h), params);

    let weighted = |a: f64, b: f64, c: f64, d: f64| (a + 2.0 * b + 2.0 * c + d) / 6.0;
    let slope = ConeState {
        potential_mv: weighted(k1.potential_mv, k2.potential_mv, k3.potential_mv, k4.potential_mv),
        adaptation: weighted(k1.adaptation, k2.adaptation, k3.adaptation, k4.adaptation),
        stimulus: weighted(k1.stimulus, k2.stimulus, k3.stimulus, k4.stimulus),
        stimulus_rise: weighted(
            k1.stimulus_rise,
            k2.stimulus_rise,
            k3.stimulus_rise,
            k4.stimulus_rise,
        ),
    };
    state.offset(&slope, h)
}

/// Integrate `state` from `from_ms` to `to_ms` (no absorptions in between)
pub fn integrate<M: ConeModel>(
    model: &M,
    params: &M::Parameters,
    integration: &IntegrationParameters,
    cone_id: ConeId,
    state: &mut ConeState,
    from_ms: f64,
    to_ms: f64,
) -> Result<()> {
    let step = integration.step_ms;
    let mut t = from_ms;

    while t < to_ms {
        let remaining = to_ms - t;
        let (h, next_t) = if remaining <= step * (1.0 + STEP_SLACK) {
            (remaining, to_ms)
        } else {
            (step, t + step)
        };
        if next_t <= t {
            return Err(stalled_step(step, t));
        }

        let next = match integration.method {
            IntegrationMethod::RungeKutta4 => rk4_step(model, state, h, params),
            IntegrationMethod::ExponentialEuler => model.exponential_euler_step(state, h, params),
        };
        if !model.is_plausible(&next, params) {
            return Err(RetinaError::NumericalInstability {
                cone_id,
                time_ms: next_t,
                potential_mv: next.potential_mv,
                adaptation: next.adaptation,
            });
        }

        *state = next;
        t = next_t;
    }
    Ok(())
}
