// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Core traits for cone models

use super::spectral::ConeType;
use crate::types::Result;

/// Continuous state of a single cone.
///
/// Also used as the derivative vector during integration.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ConeState {
    /// Graded membrane potential V (mV)
    pub potential_mv: f64,
    /// Adaptation / recovery variable A (dimensionless, rests at 0)
    pub adaptation: f64,
    /// Summed stimulus current of all photons still in flight (mV/ms)
    pub stimulus: f64,
    /// Auxiliary kernel variable (alpha-kernel rise term)
    pub stimulus_rise: f64,
}

impl ConeState {
    /// `self + h · derivative`
    #[inline(always)]
    pub fn offset(&self, derivative: &ConeState, h: f64) -> ConeState {
        ConeState {
            potential_mv: self.potential_mv + h * derivative.potential_mv,
            adaptation: self.adaptation + h * derivative.adaptation,
            stimulus: self.stimulus + h * derivative.stimulus,
            stimulus_rise: self.stimulus_rise + h * derivative.stimulus_rise,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.potential_mv.is_finite()
            && self.adaptation.is_finite()
            && self.stimulus.is_finite()
            && self.stimulus_rise.is_finite()
    }
}

/// Trait for cone model parameters
pub trait ModelParameters: Send + Sync + Clone {
    /// Reject physically meaningless values (configuration error)
    fn validate(&self) -> Result<()>;
}

/// A graded-potential cone model.
///
/// The model owns the maths only; per-cone state lives in the photoreceptor
/// engine and is passed in by reference.
pub trait ConeModel: Send + Sync {
    type Parameters: ModelParameters;

    fn model_name(&self) -> &'static str;

    /// State of a dark-adapted cone
    fn resting_state(&self, params: &Self::Parameters) -> ConeState;

    /// Right-hand side of the ODE system between absorption events
    fn derivatives(&self, state: &ConeState, params: &Self::Parameters) -> ConeState;

    /// One exponential-Euler step of length `h` (exact on the linear leak terms)
    fn exponential_euler_step(
        &self,
        state: &ConeState,
        h: f64,
        params: &Self::Parameters,
    ) -> ConeState;

    /// Relative absorption efficiency of a photon of `wavelength_nm`
    fn absorption_efficiency(
        &self,
        cone_type: ConeType,
        wavelength_nm: f64,
        params: &Self::Parameters,
    ) -> f64;

    /// Instantaneous stimulus injection for one absorbed photon
    fn absorb(&self, state: &mut ConeState, efficiency: f64, params: &Self::Parameters);

    /// Neurotransmitter release for the current state
    fn release(&self, state: &ConeState, params: &Self::Parameters) -> f64;

    /// Whether the state is inside the physically plausible envelope
    fn is_plausible(&self, state: &ConeState, params: &Self::Parameters) -> bool;
}
