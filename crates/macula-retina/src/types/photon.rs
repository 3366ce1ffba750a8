// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Photon arrival events

use serde::{Deserialize, Serialize};

use super::error::{require_non_negative, require_positive, Result, RetinaError};
use super::spatial::Point2;

/// Planck constant (J·s)
pub const PLANCK_CONSTANT: f64 = 6.626_070_15e-34;

/// Speed of light in vacuum (m/s)
pub const SPEED_OF_LIGHT: f64 = 2.997_924_58e8;

/// A single photon arriving on the retinal surface
///
/// Photons are plain values: produced by a photon source, consumed once by
/// the dispatch step, then dropped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Photon {
    /// Wavelength in nanometres
    pub wavelength_nm: f64,
    /// Landing position on the retina (µm)
    pub position: Point2,
    /// Arrival time (ms since simulation start)
    pub arrival_ms: f64,
}

impl Photon {
    pub fn new(wavelength_nm: f64, position: Point2, arrival_ms: f64) -> Self {
        Self {
            wavelength_nm,
            position,
            arrival_ms,
        }
    }

    /// Photon energy `E = h·c/λ`, in joules
    pub fn energy_joules(&self) -> f64 {
        PLANCK_CONSTANT * SPEED_OF_LIGHT / (self.wavelength_nm * 1e-9)
    }

    /// Check physical plausibility (positive wavelength, finite coordinates, t >= 0)
    pub fn validate(&self) -> Result<()> {
        require_positive("photon.wavelength_nm", self.wavelength_nm)?;
        require_non_negative("photon.arrival_ms", self.arrival_ms)?;
        if !self.position.is_finite() {
            return Err(RetinaError::configuration(
                "photon.position",
                "coordinates must be finite",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_energy_of_green_photon() {
        let photon = Photon::new(550.0, Point2::ORIGIN, 0.0);
        // hc/λ at 550 nm ≈ 3.61e-19 J
        let energy = photon.energy_joules();
        assert!((energy - 3.6117e-19).abs() < 1e-22, "energy = {}", energy);
    }

    #[test]
    fn test_shorter_wavelength_carries_more_energy() {
        let blue = Photon::new(420.0, Point2::ORIGIN, 0.0);
        let red = Photon::new(560.0, Point2::ORIGIN, 0.0);
        assert!(blue.energy_joules() > red.energy_joules());
    }

    #[test]
    fn test_validation_rejects_non_positive_wavelength() {
        let photon = Photon::new(0.0, Point2::ORIGIN, 1.0);
        assert!(photon.validate().is_err());
        let photon = Photon::new(500.0, Point2::new(f64::NAN, 0.0), 1.0);
        assert!(photon.validate().is_err());
    }
}
