// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Spectral Sensitivity
//!
//! Simplified cone absorption curves: a Gaussian in wavelength centred on each
//! cone type's optimum.
//!
//! ```text
//! efficiency(λ) = exp(-½ · ((λ - λ_peak) / width)²)       ∈ (0, 1]
//! ```
//!
//! This is not a colorimetric standard; peaks and widths are tunable.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::types::error::{require_positive, Result};

/// Cone type (wavelength sensitivity class)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConeType {
    /// Long wavelength, peak ~560 nm
    L,
    /// Medium wavelength, peak ~530 nm
    M,
    /// Short wavelength, peak ~420 nm
    S,
}

impl ConeType {
    pub const ALL: [ConeType; 3] = [ConeType::L, ConeType::M, ConeType::S];
}

impl fmt::Display for ConeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConeType::L => "L",
            ConeType::M => "M",
            ConeType::S => "S",
        };
        f.write_str(label)
    }
}

/// Gaussian absorption curve of one cone type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpectralSensitivity {
    /// Wavelength of maximal absorption (nm)
    pub peak_nm: f64,
    /// Standard deviation of the curve (nm)
    pub width_nm: f64,
}

impl SpectralSensitivity {
    pub const fn new(peak_nm: f64, width_nm: f64) -> Self {
        Self { peak_nm, width_nm }
    }

    /// Relative absorption efficiency at `wavelength_nm`, in (0, 1]
    #[inline]
    pub fn efficiency(&self, wavelength_nm: f64) -> f64 {
        let x = (wavelength_nm - self.peak_nm) / self.width_nm;
        (-0.5 * x * x).exp()
    }
}

/// Absorption curves for every cone type
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectralTable {
    pub l: SpectralSensitivity,
    pub m: SpectralSensitivity,
    pub s: SpectralSensitivity,
}

impl Default for SpectralTable {
    fn default() -> Self {
        Self {
            l: SpectralSensitivity::new(560.0, 40.0),
            m: SpectralSensitivity::new(530.0, 40.0),
            s: SpectralSensitivity::new(420.0, 35.0), // S cones are narrower
        }
    }
}

impl SpectralTable {
    #[inline]
    pub fn for_type(&self, cone_type: ConeType) -> &SpectralSensitivity {
        match cone_type {
            ConeType::L => &self.l,
            ConeType::M => &self.m,
            ConeType::S => &self.s,
        }
    }

    #[inline]
    pub fn efficiency(&self, cone_type: ConeType, wavelength_nm: f64) -> f64 {
        self.for_type(cone_type).efficiency(wavelength_nm)
    }

    pub fn validate(&self) -> Result<()> {
        for cone_type in ConeType::ALL {
            let curve = self.for_type(cone_type);
            let prefix = format!("cone.spectral.{}", cone_type.to_string().to_lowercase());
            require_positive(&format!("{}.peak_nm", prefix), curve.peak_nm)?;
            require_positive(&format!("{}.width_nm", prefix), curve.width_nm)?;
        }
        Ok(())
    }
}
