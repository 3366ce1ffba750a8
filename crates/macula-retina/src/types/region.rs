// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Macular regions and their sampling profiles
//!
//! The macula is partitioned by eccentricity into three concentric regions:
//!
//! ```text
//!   Foveola    0      ..= r_foveola     (densest cone sampling)
//!   Fovea      r_foveola ..= r_fovea
//!   Parafovea  r_fovea   ..= r_parafovea (sparsest cone sampling)
//! ```
//!
//! Boundaries are inclusive to the inner region.

use core::fmt;
use serde::{Deserialize, Serialize};

use super::error::{require_non_negative, require_positive, Result, RetinaError};
use crate::models::ConeType;

/// Square micrometres per square millimetre
const UM2_PER_MM2: f64 = 1.0e6;

/// Macular region, ordered from the centre outward
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MacularRegion {
    Foveola,
    Fovea,
    Parafovea,
}

impl MacularRegion {
    /// All regions, innermost first
    pub const ALL: [MacularRegion; 3] = [
        MacularRegion::Foveola,
        MacularRegion::Fovea,
        MacularRegion::Parafovea,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            MacularRegion::Foveola => "foveola",
            MacularRegion::Fovea => "fovea",
            MacularRegion::Parafovea => "parafovea",
        }
    }

    /// Position in [`MacularRegion::ALL`]
    pub const fn ordinal(self) -> usize {
        match self {
            MacularRegion::Foveola => 0,
            MacularRegion::Fovea => 1,
            MacularRegion::Parafovea => 2,
        }
    }
}

impl fmt::Display for MacularRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Relative abundance of L, M and S cones within a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeMix {
    pub l: f64,
    pub m: f64,
    pub s: f64,
}

impl ConeMix {
    /// A mosaic made of one cone type only
    pub fn single(cone_type: ConeType) -> Self {
        match cone_type {
            ConeType::L => Self { l: 1.0, m: 0.0, s: 0.0 },
            ConeType::M => Self { l: 0.0, m: 1.0, s: 0.0 },
            ConeType::S => Self { l: 0.0, m: 0.0, s: 1.0 },
        }
    }

    pub fn total(&self) -> f64 {
        self.l + self.m + self.s
    }

    /// Map a uniform draw in [0, 1) onto a cone type, proportionally to the mix
    pub fn pick(&self, draw: f64) -> ConeType {
        let scaled = draw * self.total();
        if scaled < self.l {
            ConeType::L
        } else if scaled < self.l + self.m || self.s <= 0.0 {
            ConeType::M
        } else {
            ConeType::S
        }
    }

    pub fn validate(&self, parameter: &str) -> Result<()> {
        require_non_negative(&format!("{}.l", parameter), self.l)?;
        require_non_negative(&format!("{}.m", parameter), self.m)?;
        require_non_negative(&format!("{}.s", parameter), self.s)?;
        if self.total() <= 0.0 {
            return Err(RetinaError::configuration(
                parameter,
                "cone mix must contain at least one cone type",
            ));
        }
        Ok(())
    }
}

/// Sampling profile of one macular region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionProfile {
    /// Outer radius bound (distance from the macular centre), inclusive
    pub outer_radius_um: f64,

    /// Cone density, cones per mm²
    pub density_per_mm2: f64,

    /// L:M:S composition of the mosaic
    pub cone_mix: ConeMix,
}

impl RegionProfile {
    /// Hexagonal lattice pitch giving this region's density.
    ///
    /// A hexagonal tiling with pitch `s` assigns `s²·√3/2` of area to each point,
    /// so `s = sqrt(2 / (√3 · density))`.
    pub fn spacing_um(&self) -> f64 {
        let density_per_um2 = self.density_per_mm2 / UM2_PER_MM2;
        (2.0 / (3.0_f64.sqrt() * density_per_um2)).sqrt()
    }

    pub fn validate(&self, region: MacularRegion) -> Result<()> {
        let prefix = format!("lattice.{}", region.name());
        require_positive(&format!("{}.outer_radius_um", prefix), self.outer_radius_um)?;
        require_positive(&format!("{}.density_per_mm2", prefix), self.density_per_mm2)?;
        self.cone_mix.validate(&format!("{}.cone_mix", prefix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spacing_matches_hexagonal_cell_area() {
        let profile = RegionProfile {
            outer_radius_um: 100.0,
            density_per_mm2: 200_000.0,
            cone_mix: ConeMix::single(ConeType::L),
        };
        let s = profile.spacing_um();
        let cell_area_um2 = s * s * 3.0_f64.sqrt() / 2.0;
        let density_per_um2 = 200_000.0 / 1.0e6;
        assert!((cell_area_um2 - 1.0 / density_per_um2).abs() < 1e-9);
    }

    #[test]
    fn test_cone_mix_pick_is_proportional() {
        let mix = ConeMix { l: 0.5, m: 0.45, s: 0.05 };
        assert_eq!(mix.pick(0.0), ConeType::L);
        assert_eq!(mix.pick(0.49), ConeType::L);
        assert_eq!(mix.pick(0.5), ConeType::M);
        assert_eq!(mix.pick(0.94), ConeType::M);
        assert_eq!(mix.pick(0.96), ConeType::S);
    }

    #[test]
    fn test_cone_mix_without_s_never_picks_s() {
        let mix = ConeMix { l: 0.5, m: 0.5, s: 0.0 };
        assert_eq!(mix.pick(0.999_999), ConeType::M);
    }

    #[test]
    fn test_empty_cone_mix_is_rejected() {
        let mix = ConeMix { l: 0.0, m: 0.0, s: 0.0 };
        assert!(mix.validate("mix").unwrap_err().is_configuration());
    }

    #[test]
    fn test_region_order() {
        assert!(MacularRegion::Foveola < MacularRegion::Fovea);
        assert!(MacularRegion::Fovea < MacularRegion::Parafovea);
        assert_eq!(MacularRegion::Parafovea.ordinal(), 2);
    }
}
