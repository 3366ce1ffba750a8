// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Lattice construction parameters

use serde::{Deserialize, Serialize};

use crate::models::ConeType;
use crate::types::error::{require_non_negative, require_positive, Result, RetinaError};
use crate::types::{ConeMix, MacularRegion, Point2, RegionProfile};

/// How large each cone's absorbing area is
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReceptiveField {
    /// Same radius for every cone (µm)
    Fixed { radius_um: f64 },
    /// Fraction of the local region's lattice spacing
    SpacingFraction { fraction: f64 },
}

impl Default for ReceptiveField {
    fn default() -> Self {
        ReceptiveField::SpacingFraction { fraction: 0.5 }
    }
}

impl ReceptiveField {
    /// Radius (µm) for a cone sampled at `spacing_um`
    pub fn radius_um(&self, spacing_um: f64) -> f64 {
        match *self {
            ReceptiveField::Fixed { radius_um } => radius_um,
            ReceptiveField::SpacingFraction { fraction } => fraction * spacing_um,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ReceptiveField::Fixed { radius_um } => {
                require_positive("lattice.receptive_field.radius_um", radius_um)
            }
            ReceptiveField::SpacingFraction { fraction } => {
                require_positive("lattice.receptive_field.fraction", fraction)
            }
        }
    }
}

/// Geometry of the macular cone mosaic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatticeParameters {
    /// Macular centre
    pub center: Point2,
    pub foveola: RegionProfile,
    pub fovea: RegionProfile,
    pub parafovea: RegionProfile,
    pub receptive_field: ReceptiveField,
    /// Standard deviation of the Gaussian displacement of each lattice point (µm)
    pub jitter_um: f64,
    /// Seed for jitter and cone-type assignment
    pub seed: u64,
}

/// The full human macula out to 2750 µm: about 1.4 million cones. Each cone
/// costs one trace sample per reporting interval, so shrink the radii for
/// quick experiments.
impl Default for LatticeParameters {
    fn default() -> Self {
        Self {
            center: Point2::ORIGIN,
            foveola: RegionProfile {
                outer_radius_um: 350.0,
                density_per_mm2: 200_000.0,
                cone_mix: ConeMix { l: 0.5, m: 0.5, s: 0.0 },
            },
            fovea: RegionProfile {
                outer_radius_um: 1500.0,
                density_per_mm2: 100_000.0,
                cone_mix: ConeMix { l: 0.5, m: 0.45, s: 0.05 },
            },
            parafovea: RegionProfile {
                outer_radius_um: 2750.0,
                density_per_mm2: 40_000.0,
                cone_mix: ConeMix { l: 0.5, m: 0.43, s: 0.07 },
            },
            receptive_field: ReceptiveField::default(),
            jitter_um: 0.0,
            seed: 42,
        }
    }
}

impl LatticeParameters {
    /// Three regions with the same density and a single cone type.
    ///
    /// Useful for small, hand-sized mosaics.
    pub fn uniform(
        radii_um: [f64; 3],
        density_per_mm2: f64,
        cone_type: ConeType,
        receptive_field: ReceptiveField,
    ) -> Self {
        let profile = |outer_radius_um| RegionProfile {
            outer_radius_um,
            density_per_mm2,
            cone_mix: ConeMix::single(cone_type),
        };
        Self {
            foveola: profile(radii_um[0]),
            fovea: profile(radii_um[1]),
            parafovea: profile(radii_um[2]),
            receptive_field,
            ..Self::default()
        }
    }

    pub fn profile(&self, region: MacularRegion) -> &RegionProfile {
        match region {
            MacularRegion::Foveola => &self.foveola,
            MacularRegion::Fovea => &self.fovea,
            MacularRegion::Parafovea => &self.parafovea,
        }
    }

    /// Region owning `point`: the innermost one whose (inclusive) bound it satisfies
    pub fn region_at(&self, point: Point2) -> Option<MacularRegion> {
        let distance = point.distance_to(self.center);
        MacularRegion::ALL
            .into_iter()
            .find(|&region| distance <= self.profile(region).outer_radius_um)
    }

    pub fn receptive_field_um(&self, region: MacularRegion) -> f64 {
        self.receptive_field
            .radius_um(self.profile(region).spacing_um())
    }

    /// Largest receptive field radius of any region
    pub fn max_receptive_field_um(&self) -> f64 {
        MacularRegion::ALL
            .into_iter()
            .map(|region| self.receptive_field_um(region))
            .fold(0.0, f64::max)
    }

    /// Reject geometry that cannot form a partition of the macula
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_finite() {
            return Err(RetinaError::configuration(
                "lattice.center",
                "centre coordinates must be finite",
            ));
        }
        for region in MacularRegion::ALL {
            self.profile(region).validate(region)?;
        }

        for pair in MacularRegion::ALL.windows(2) {
            let (inner, outer) = (self.profile(pair[0]), self.profile(pair[1]));
            if inner.outer_radius_um >= outer.outer_radius_um {
                return Err(RetinaError::configuration(
                    format!("lattice.{}.outer_radius_um", pair[1]),
                    format!(
                        "radius bounds must be strictly increasing ({} {} µm >= {} {} µm)",
                        pair[0], inner.outer_radius_um, pair[1], outer.outer_radius_um
                    ),
                ));
            }
            if inner.density_per_mm2 < outer.density_per_mm2 {
                return Err(RetinaError::configuration(
                    format!("lattice.{}.density_per_mm2", pair[1]),
                    format!(
                        "density must not increase outward ({} {}/mm² < {} {}/mm²)",
                        pair[0], inner.density_per_mm2, pair[1], outer.density_per_mm2
                    ),
                ));
            }
        }

        self.receptive_field.validate()?;
        require_non_negative("lattice.jitter_um", self.jitter_um)
    }
}
