// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Lattice Builder
//!
//! Places cones on a hexagonal grid whose pitch follows the density of the
//! macular region each point falls into, then freezes the result into an
//! immutable arena plus a spatial index.
//!
//! ## Algorithm
//!
//! ```text
//! for region in [Foveola, Fovea, Parafovea]:
//!     grid = hexagonal grid with the region's spacing, centred on the macula
//!     for p in grid ∩ disk(outer radius + jitter margin):
//!         p' = p + N(0, jitter²)
//!         keep p' iff region_at(p') == region     (innermost inclusive bound)
//! sort by (region, eccentricity, angle); assign ConeId sequentially
//! draw each cone's type from its region's L:M:S mix
//! ```
//!
//! Because every kept point is owned by exactly the region whose grid produced
//! it, cones never overlap across regions and each belongs to one region.

pub mod hex;
pub mod index;
pub mod params;

pub use hex::HexGrid;
pub use index::{GridKey, SpatialIndex};
pub use params::{LatticeParameters, ReceptiveField};

use rand_distr::Distribution;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::ConeType;
use crate::sampling::{normal, seeded_rng, unit};
use crate::types::{ConeId, MacularRegion, Point2, Result, RetinaError};

/// Jitter draws beyond this many standard deviations are vanishingly rare
const JITTER_MARGIN_SIGMAS: f64 = 6.0;

/// RNG substreams of the lattice seed
const JITTER_STREAM: u64 = 0;
const CONE_TYPE_STREAM: u64 = 1;

/// Immutable geometry of one cone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConeGeometry {
    pub id: ConeId,
    pub position: Point2,
    pub region: MacularRegion,
    pub cone_type: ConeType,
    /// Radius of the absorbing area (µm)
    pub receptive_field_um: f64,
}

impl ConeGeometry {
    /// Whether a photon landing at `point` can be absorbed (boundary inclusive)
    #[inline]
    pub fn contains(&self, point: Point2) -> bool {
        self.position.distance_squared_to(point) <= self.receptive_field_um * self.receptive_field_um
    }
}

/// Cone arena (indexed by `ConeId`) plus spatial index; read-only after construction
#[derive(Debug, Clone)]
pub struct ConeLattice {
    params: LatticeParameters,
    cones: Vec<ConeGeometry>,
    index: SpatialIndex,
}

impl ConeLattice {
    /// Build the mosaic described by `params`
    pub fn build(params: &LatticeParameters) -> Result<Self> {
        params.validate()?;

        let mut jitter_rng = seeded_rng(params.seed, JITTER_STREAM);
        let jitter = if params.jitter_um > 0.0 {
            Some(normal("lattice.jitter_um", 0.0, params.jitter_um)?)
        } else {
            None
        };
        let mut placed: Vec<(Point2, MacularRegion)> = Vec::new();
        let mut dropped = 0usize;

        for region in MacularRegion::ALL {
            let profile = params.profile(region);
            let grid = HexGrid::new(params.center, profile.spacing_um());
            let reach = profile.outer_radius_um + JITTER_MARGIN_SIGMAS * params.jitter_um;

            for point in grid.points_within(reach) {
                let point = match &jitter {
                    Some(jitter) => Point2::new(
                        point.x + jitter.sample(&mut jitter_rng),
                        point.y + jitter.sample(&mut jitter_rng),
                    ),
                    None => point,
                };
                if params.region_at(point) == Some(region) {
                    placed.push((point, region));
                } else {
                    dropped += 1;
                }
            }
        }

        let center = params.center;
        placed.sort_by(|(a, ra), (b, rb)| {
            ra.cmp(rb)
                .then(
                    a.distance_squared_to(center)
                        .total_cmp(&b.distance_squared_to(center)),
                )
                .then(a.angle_around(center).total_cmp(&b.angle_around(center)))
        });

        let mut type_rng = seeded_rng(params.seed, CONE_TYPE_STREAM);
        let cones = placed
            .into_iter()
            .enumerate()
            .map(|(i, (position, region))| {
                let draw = unit(&mut type_rng);
                ConeGeometry {
                    id: ConeId(i as u32),
                    position,
                    region,
                    cone_type: params.profile(region).cone_mix.pick(draw),
                    receptive_field_um: params.receptive_field_um(region),
                }
            })
            .collect::<Vec<_>>();

        let lattice = Self::from_arena(params.clone(), cones);
        debug!(
            "[LATTICE] Built {} cones (foveola={}, fovea={}, parafovea={}, dropped={}, cells={})",
            lattice.len(),
            lattice.count_in(MacularRegion::Foveola),
            lattice.count_in(MacularRegion::Fovea),
            lattice.count_in(MacularRegion::Parafovea),
            dropped,
            lattice.index.occupied_cells()
        );
        Ok(lattice)
    }

    /// Build a hand-placed mosaic; regions and receptive fields still follow `params`.
    ///
    /// Cones keep the order given and are numbered from 0.
    pub fn from_positions(
        params: &LatticeParameters,
        positions: impl IntoIterator<Item = (Point2, ConeType)>,
    ) -> Result<Self> {
        params.validate()?;

        let mut cones: Vec<ConeGeometry> = Vec::new();
        for (i, (position, cone_type)) in positions.into_iter().enumerate() {
            let region = params.region_at(position).ok_or_else(|| {
                RetinaError::configuration(
                    "lattice.positions",
                    format!(
                        "cone {} at ({}, {}) lies outside the parafovea bound",
                        i, position.x, position.y
                    ),
                )
            })?;
            if cones.iter().any(|c| c.position == position) {
                return Err(RetinaError::configuration(
                    "lattice.positions",
                    format!("duplicate cone position ({}, {})", position.x, position.y),
                ));
            }
            cones.push(ConeGeometry {
                id: ConeId(i as u32),
                position,
                region,
                cone_type,
                receptive_field_um: params.receptive_field_um(region),
            });
        }

        Ok(Self::from_arena(params.clone(), cones))
    }

    fn from_arena(params: LatticeParameters, cones: Vec<ConeGeometry>) -> Self {
        let smallest_spacing = MacularRegion::ALL
            .into_iter()
            .map(|region| params.profile(region).spacing_um())
            .fold(f64::INFINITY, f64::min);
        let cell_size = params.max_receptive_field_um().max(smallest_spacing);
        let index = SpatialIndex::build(&cones, cell_size);
        Self {
            params,
            cones,
            index,
        }
    }

    pub fn params(&self) -> &LatticeParameters {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.cones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cones.is_empty()
    }

    /// All cones, in id order
    pub fn cones(&self) -> &[ConeGeometry] {
        &self.cones
    }

    pub fn cone(&self, id: ConeId) -> Result<&ConeGeometry> {
        self.cones.get(id.index()).ok_or(RetinaError::ConeNotFound(id))
    }

    pub fn region_at(&self, point: Point2) -> Option<MacularRegion> {
        self.params.region_at(point)
    }

    pub fn count_in(&self, region: MacularRegion) -> usize {
        self.cones.iter().filter(|c| c.region == region).count()
    }

    pub fn spacing_um(&self, region: MacularRegion) -> f64 {
        self.params.profile(region).spacing_um()
    }

    /// Cones whose receptive field contains `point`, ascending by id
    pub fn cones_at(&self, point: Point2) -> Vec<ConeId> {
        let mut out = Vec::new();
        self.cones_at_into(point, &mut out);
        out
    }

    /// Allocation-free variant of [`ConeLattice::cones_at`]
    pub fn cones_at_into(&self, point: Point2, out: &mut Vec<ConeId>) {
        self.index.query(&self.cones, point, out);
    }

    pub fn index(&self) -> &SpatialIndex {
        &self.index
    }
}
