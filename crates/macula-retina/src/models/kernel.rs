// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Stimulus Kernels
//!
//! Each absorbed photon triggers a transient stimulus current `I_stim(t)`.
//! Kernels are expressed as linear ODEs so that the sum over every photon still
//! in flight collapses into one or two state variables per cone.
//!
//! ```text
//! Exponential:  I(t) = a · exp(-t/τ)                dI/dt = -I/τ
//! Alpha:        I(t) = a · (t/τ) · exp(1 - t/τ)     dH/dt = -H/τ,  dI/dt = (H - I)/τ
//! ```
//!
//! Both kernels peak at the injected amplitude `a`.

use serde::{Deserialize, Serialize};

use crate::types::error::{require_positive, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StimulusKernel {
    /// Instant rise, exponential decay
    Exponential { tau_ms: f64 },
    /// Smooth rise peaking at `tau_ms`, then decay
    Alpha { tau_ms: f64 },
}

impl Default for StimulusKernel {
    fn default() -> Self {
        StimulusKernel::Exponential { tau_ms: 5.0 }
    }
}

impl StimulusKernel {
    pub fn tau_ms(&self) -> f64 {
        match *self {
            StimulusKernel::Exponential { tau_ms } | StimulusKernel::Alpha { tau_ms } => tau_ms,
        }
    }

    /// Apply an impulse of peak amplitude `amplitude` to `(stimulus, rise)`
    #[inline]
    pub fn inject(&self, stimulus: &mut f64, rise: &mut f64, amplitude: f64) {
        match self {
            StimulusKernel::Exponential { .. } => *stimulus += amplitude,
            StimulusKernel::Alpha { .. } => *rise += amplitude * core::f64::consts::E,
        }
    }

    /// Time derivatives `(dI/dt, dH/dt)`
    #[inline]
    pub fn derivatives(&self, stimulus: f64, rise: f64) -> (f64, f64) {
        match *self {
            StimulusKernel::Exponential { tau_ms } => (-stimulus / tau_ms, 0.0),
            StimulusKernel::Alpha { tau_ms } => ((rise - stimulus) / tau_ms, -rise / tau_ms),
        }
    }

    /// Exact propagation of `(I, H)` over `h` ms
    #[inline]
    pub fn propagate(&self, stimulus: f64, rise: f64, h: f64) -> (f64, f64) {
        match *self {
            StimulusKernel::Exponential { tau_ms } => (stimulus * (-h / tau_ms).exp(), 0.0),
            StimulusKernel::Alpha { tau_ms } => {
                let decay = (-h / tau_ms).exp();
                ((stimulus + rise * h / tau_ms) * decay, rise * decay)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        require_positive("cone.kernel.tau_ms", self.tau_ms())
    }
}
