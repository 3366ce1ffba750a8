// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spatial illumination footprints

use rand::Rng;
use rand_distr::{Distribution, Normal, UnitDisc};
use serde::{Deserialize, Serialize};

use crate::sampling::normal;
use crate::types::error::{require_positive, Result};
use crate::types::{Point2, RetinaError};

/// Where photons land on the retina
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Footprint {
    /// Every photon hits the same spot
    Point { center: Point2 },
    /// Uniform over a disk
    UniformDisk { center: Point2, radius_um: f64 },
    /// Isotropic Gaussian spot (point-spread of a focused source)
    Gaussian { center: Point2, sigma_um: f64 },
}

impl Default for Footprint {
    fn default() -> Self {
        Footprint::UniformDisk {
            center: Point2::ORIGIN,
            radius_um: 2750.0,
        }
    }
}

impl Footprint {
    pub fn center(&self) -> Point2 {
        match *self {
            Footprint::Point { center }
            | Footprint::UniformDisk { center, .. }
            | Footprint::Gaussian { center, .. } => center,
        }
    }

    /// Validate and build the position distribution
    pub fn sampler(&self) -> Result<FootprintSampler> {
        self.validate()?;
        Ok(match *self {
            Footprint::Point { center } => FootprintSampler::Point(center),
            Footprint::UniformDisk { center, radius_um } => {
                FootprintSampler::Disk { center, radius_um }
            }
            Footprint::Gaussian { center, sigma_um } => FootprintSampler::Gaussian {
                center,
                offset: normal("photons.footprint.sigma_um", 0.0, sigma_um)?,
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        if !self.center().is_finite() {
            return Err(RetinaError::configuration(
                "photons.footprint.center",
                "centre coordinates must be finite",
            ));
        }
        match *self {
            Footprint::Point { .. } => Ok(()),
            Footprint::UniformDisk { radius_um, .. } => {
                require_positive("photons.footprint.radius_um", radius_um)
            }
            Footprint::Gaussian { sigma_um, .. } => {
                require_positive("photons.footprint.sigma_um", sigma_um)
            }
        }
    }
}

/// Position distribution of a validated [`Footprint`]
#[derive(Debug, Clone, Copy)]
pub enum FootprintSampler {
    Point(Point2),
    Disk { center: Point2, radius_um: f64 },
    Gaussian { center: Point2, offset: Normal<f64> },
}

impl Distribution<Point2> for FootprintSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2 {
        match *self {
            FootprintSampler::Point(center) => center,
            FootprintSampler::Disk { center, radius_um } => {
                let [x, y]: [f64; 2] = UnitDisc.sample(rng);
                Point2::new(center.x + radius_um * x, center.y + radius_um * y)
            }
            FootprintSampler::Gaussian { center, offset } => Point2::new(
                center.x + offset.sample(rng),
                center.y + offset.sample(rng),
            ),
        }
    }
}
