// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Poisson Photon Source
//!
//! Ambient illumination as a homogeneous Poisson point process:
//!
//! ```text
//! Δt ~ Exp(rate)            t_{n+1} = t_n + Δt
//! position ~ footprint      wavelength ~ spectrum
//! ```
//!
//! The stream is lazy, strictly time-ordered and cannot be rewound. All draws come
//! from one ChaCha8 generator, so seed + parameters fix the whole sequence.

use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Exp};
use serde::{Deserialize, Serialize};

use super::footprint::{Footprint, FootprintSampler};
use super::spectrum::{Spectrum, SpectrumSampler};
use crate::sampling::{inter_arrival, seeded_rng};
use crate::types::error::{require_non_negative, require_positive, Result};
use crate::types::{Photon, RetinaError};

/// Illumination configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhotonSourceParameters {
    /// Mean photon arrivals per millisecond over the whole footprint (0 = darkness)
    pub rate_per_ms: f64,
    pub footprint: Footprint,
    pub spectrum: Spectrum,
    pub seed: u64,
    /// Stop after this much simulated time (ms)
    pub duration_ms: Option<f64>,
    /// Stop after this many photons
    pub max_events: Option<u64>,
}

impl Default for PhotonSourceParameters {
    fn default() -> Self {
        Self {
            rate_per_ms: 100.0,
            footprint: Footprint::default(),
            spectrum: Spectrum::default(),
            seed: 42,
            duration_ms: None,
            max_events: None,
        }
    }
}

impl PhotonSourceParameters {
    pub fn validate(&self) -> Result<()> {
        require_non_negative("photons.rate_per_ms", self.rate_per_ms)?;
        self.footprint.validate()?;
        self.spectrum.validate()?;
        if let Some(duration_ms) = self.duration_ms {
            require_positive("photons.duration_ms", duration_ms)?;
        }
        if self.max_events == Some(0) {
            return Err(RetinaError::configuration(
                "photons.max_events",
                "must be at least 1 when set",
            ));
        }
        Ok(())
    }
}

/// Seeded Poisson photon stream
#[derive(Debug, Clone)]
pub struct PoissonPhotonSource {
    params: PhotonSourceParameters,
    rng: ChaCha8Rng,
    /// `None` in darkness
    inter_arrival: Option<Exp<f64>>,
    footprint: FootprintSampler,
    spectrum: SpectrumSampler,
    clock_ms: f64,
    emitted: u64,
    exhausted: bool,
}

impl PoissonPhotonSource {
    pub fn new(params: PhotonSourceParameters) -> Result<Self> {
        params.validate()?;
        let arrivals = if params.rate_per_ms > 0.0 {
            Some(inter_arrival("photons.rate_per_ms", params.rate_per_ms)?)
        } else {
            None
        };
        Ok(Self {
            exhausted: arrivals.is_none(),
            rng: seeded_rng(params.seed, 0),
            inter_arrival: arrivals,
            footprint: params.footprint.sampler()?,
            spectrum: params.spectrum.sampler()?,
            params,
            clock_ms: 0.0,
            emitted: 0,
        })
    }

    pub fn params(&self) -> &PhotonSourceParameters {
        &self.params
    }

    /// Arrival time of the last emitted photon
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }
}

impl Iterator for PoissonPhotonSource {
    type Item = Photon;

    fn next(&mut self) -> Option<Photon> {
        let arrivals = match self.inter_arrival {
            Some(arrivals) if !self.exhausted => arrivals,
            _ => return None,
        };
        if self.params.max_events.is_some_and(|max| self.emitted >= max) {
            self.exhausted = true;
            return None;
        }

        let arrival_ms = self.clock_ms + arrivals.sample(&mut self.rng);
        if self.params.duration_ms.is_some_and(|d| arrival_ms > d) {
            self.exhausted = true;
            return None;
        }

        let position = self.footprint.sample(&mut self.rng);
        let wavelength_nm = self.spectrum.sample(&mut self.rng);
        self.clock_ms = arrival_ms;
        self.emitted += 1;
        Some(Photon::new(wavelength_nm, position, arrival_ms))
    }
}

impl core::iter::FusedIterator for PoissonPhotonSource {}
