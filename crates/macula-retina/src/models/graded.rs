// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Neuraville Inc.
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Graded Cone Model
//!
//! Lumped graded-potential abstraction of cone phototransduction. Cones do not
//! spike; their output is a continuous transmitter release driven by V.
//!
//! ## Model Dynamics
//!
//! ```text
//! Between absorptions:
//!     dV/dt = -(V - V_rest)/τ_V + I_stim(t) - k·A
//!     dA/dt = -A/τ_A + g·max(0, V - V_rest)
//!     I_stim follows the configured stimulus kernel
//!
//! Absorption of a photon of wavelength λ by a cone of type c:
//!     I_stim += amplitude × efficiency_c(λ)       (kernel-normalised)
//!
//! Release:
//!     R(V) = R_max / (1 + exp(-(V - V_threshold)/k_rel))
//! ```

use serde::{Deserialize, Serialize};

use super::kernel::StimulusKernel;
use super::spectral::{ConeType, SpectralTable};
use super::traits::{ConeModel, ConeState, ModelParameters};
use crate::types::error::{require_finite, require_non_negative, require_positive, Result};

/// Graded-potential cone model with slow adaptation feedback
#[derive(Debug, Clone, Copy, Default)]
pub struct GradedConeModel;

impl GradedConeModel {
    pub fn new() -> Self {
        Self
    }
}

impl ConeModel for GradedConeModel {
    type Parameters = GradedConeParameters;

    fn model_name(&self) -> &'static str {
        "Graded leaky integrator with adaptation"
    }

    fn resting_state(&self, params: &GradedConeParameters) -> ConeState {
        ConeState {
            potential_mv: params.v_rest_mv,
            adaptation: 0.0,
            stimulus: 0.0,
            stimulus_rise: 0.0,
        }
    }

    #[inline(always)]
    fn derivatives(&self, state: &ConeState, params: &GradedConeParameters) -> ConeState {
        let depolarisation = state.potential_mv - params.v_rest_mv;
        let (d_stimulus, d_rise) = params
            .kernel
            .derivatives(state.stimulus, state.stimulus_rise);

        ConeState {
            potential_mv: -depolarisation / params.tau_v_ms + state.stimulus
                - params.adaptation_feedback * state.adaptation,
            adaptation: -state.adaptation / params.tau_a_ms
                + params.adaptation_gain * depolarisation.max(0.0),
            stimulus: d_stimulus,
            stimulus_rise: d_rise,
        }
    }

    fn exponential_euler_step(
        &self,
        state: &ConeState,
        h: f64,
        params: &GradedConeParameters,
    ) -> ConeState {
        // Drives are frozen at the start of the step; leaks are integrated exactly
        let depolarisation = state.potential_mv - params.v_rest_mv;
        let drive_v = state.stimulus - params.adaptation_feedback * state.adaptation;
        let drive_a = params.adaptation_gain * depolarisation.max(0.0);

        let decay_v = (-h / params.tau_v_ms).exp();
        let decay_a = (-h / params.tau_a_ms).exp();
        let (stimulus, stimulus_rise) =
            params
                .kernel
                .propagate(state.stimulus, state.stimulus_rise, h);

        ConeState {
            potential_mv: params.v_rest_mv
                + depolarisation * decay_v
                + params.tau_v_ms * (1.0 - decay_v) * drive_v,
            adaptation: state.adaptation * decay_a + params.tau_a_ms * (1.0 - decay_a) * drive_a,
            stimulus,
            stimulus_rise,
        }
    }

    #[inline]
    fn absorption_efficiency(
        &self,
        cone_type: ConeType,
        wavelength_nm: f64,
        params: &GradedConeParameters,
    ) -> f64 {
        params.spectral.efficiency(cone_type, wavelength_nm)
    }

    #[inline]
    fn absorb(&self, state: &mut ConeState, efficiency: f64, params: &GradedConeParameters) {
        params.kernel.inject(
            &mut state.stimulus,
            &mut state.stimulus_rise,
            params.stimulus_amplitude * efficiency,
        );
    }

    #[inline]
    fn release(&self, state: &ConeState, params: &GradedConeParameters) -> f64 {
        let x = (state.potential_mv - params.v_threshold_mv) / params.release_slope_mv;
        params.release_max / (1.0 + (-x).exp())
    }

    #[inline]
    fn is_plausible(&self, state: &ConeState, params: &GradedConeParameters) -> bool {
        state.is_finite()
            && (state.potential_mv - params.v_rest_mv).abs() <= params.potential_limit_mv
            && state.adaptation.abs() <= params.adaptation_limit
    }
}

/// Graded cone model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradedConeParameters {
    /// Resting (dark) potential V_rest (mV)
    pub v_rest_mv: f64,

    /// Membrane leak time constant τ_V (ms)
    pub tau_v_ms: f64,

    /// Adaptation recovery time constant τ_A (ms)
    pub tau_a_ms: f64,

    /// Adaptation feedback gain k (mV/ms per unit A)
    pub adaptation_feedback: f64,

    /// Adaptation growth gain g (per mV per ms)
    pub adaptation_gain: f64,

    /// Peak stimulus current of one fully-absorbed photon (mV/ms)
    pub stimulus_amplitude: f64,

    /// Shape of the per-photon stimulus transient
    pub kernel: StimulusKernel,

    /// Half-activation potential of the release curve (mV)
    pub v_threshold_mv: f64,

    /// Slope factor of the release curve k_rel (mV)
    pub release_slope_mv: f64,

    /// Maximal release R_max (arbitrary units)
    pub release_max: f64,

    /// Absorption curves per cone type
    pub spectral: SpectralTable,

    /// Largest plausible |V - V_rest| (mV); beyond this integration has diverged
    pub potential_limit_mv: f64,

    /// Largest plausible |A|
    pub adaptation_limit: f64,
}

impl Default for GradedConeParameters {
    fn default() -> Self {
        Self {
            v_rest_mv: -50.0,
            tau_v_ms: 10.0,
            tau_a_ms: 100.0,
            adaptation_feedback: 0.05,
            adaptation_gain: 0.01,
            stimulus_amplitude: 0.5,
            kernel: StimulusKernel::default(),
            v_threshold_mv: -45.0,
            release_slope_mv: 4.0,
            release_max: 1.0,
            spectral: SpectralTable::default(),
            potential_limit_mv: 200.0,
            adaptation_limit: 1.0e6,
        }
    }
}

impl ModelParameters for GradedConeParameters {
    fn validate(&self) -> Result<()> {
        require_finite("cone.v_rest_mv", self.v_rest_mv)?;
        require_positive("cone.tau_v_ms", self.tau_v_ms)?;
        require_positive("cone.tau_a_ms", self.tau_a_ms)?;
        require_non_negative("cone.adaptation_feedback", self.adaptation_feedback)?;
        require_non_negative("cone.adaptation_gain", self.adaptation_gain)?;
        require_non_negative("cone.stimulus_amplitude", self.stimulus_amplitude)?;
        self.kernel.validate()?;
        require_finite("cone.v_threshold_mv", self.v_threshold_mv)?;
        require_positive("cone.release_slope_mv", self.release_slope_mv)?;
        require_positive("cone.release_max", self.release_max)?;
        self.spectral.validate()?;
        require_positive("cone.potential_limit_mv", self.potential_limit_mv)?;
        require_positive("cone.adaptation_limit", self.adaptation_limit)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resting_state_is_a_fixed_point() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let rest = model.resting_state(&params);
        let d = model.derivatives(&rest, &params);
        assert_eq!(d, ConeState::default());

        let stepped = model.exponential_euler_step(&rest, 0.5, &params);
        assert_eq!(stepped, rest);
    }

    #[test]
    fn test_absorption_scales_with_efficiency() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let mut state = model.resting_state(&params);

        let efficiency = model.absorption_efficiency(ConeType::L, 560.0, &params);
        assert_eq!(efficiency, 1.0);
        model.absorb(&mut state, efficiency, &params);
        assert_eq!(state.stimulus, params.stimulus_amplitude);

        let weak = model.absorption_efficiency(ConeType::S, 560.0, &params);
        assert!(weak < 0.01);
    }

    #[test]
    fn test_stimulus_depolarises() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let mut state = model.resting_state(&params);
        model.absorb(&mut state, 1.0, &params);
        let d = model.derivatives(&state, &params);
        assert!(d.potential_mv > 0.0);
        assert!(d.stimulus < 0.0);
    }

    #[test]
    fn test_adaptation_only_grows_when_depolarised() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let mut state = model.resting_state(&params);

        state.potential_mv = params.v_rest_mv - 5.0;
        assert_eq!(model.derivatives(&state, &params).adaptation, 0.0);

        state.potential_mv = params.v_rest_mv + 5.0;
        assert!(model.derivatives(&state, &params).adaptation > 0.0);
    }

    #[test]
    fn test_release_is_monotonic_and_half_at_threshold() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let mut state = model.resting_state(&params);

        state.potential_mv = params.v_threshold_mv;
        assert!((model.release(&state, &params) - 0.5 * params.release_max).abs() < 1e-12);

        let mut previous = 0.0;
        for step in 0..40 {
            state.potential_mv = -80.0 + step as f64 * 2.0;
            let release = model.release(&state, &params);
            assert!(release > previous);
            assert!(release < params.release_max);
            previous = release;
        }
    }

    #[test]
    fn test_plausibility_envelope() {
        let model = GradedConeModel::new();
        let params = GradedConeParameters::default();
        let mut state = model.resting_state(&params);
        assert!(model.is_plausible(&state, &params));

        state.potential_mv = params.v_rest_mv + params.potential_limit_mv * 2.0;
        assert!(!model.is_plausible(&state, &params));

        state = model.resting_state(&params);
        state.adaptation = f64::NAN;
        assert!(!model.is_plausible(&state, &params));
    }

    #[test]
    fn test_parameter_validation() {
        assert!(GradedConeParameters::default().validate().is_ok());

        let params = GradedConeParameters {
            tau_v_ms: 0.0,
            ..Default::default()
        };
        assert!(params.validate().unwrap_err().is_configuration());

        let params = GradedConeParameters {
            adaptation_gain: -1.0,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = GradedConeParameters {
            kernel: StimulusKernel::Alpha { tau_ms: -2.0 },
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }
}
