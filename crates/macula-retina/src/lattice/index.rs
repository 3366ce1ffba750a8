// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Grid-bucketed spatial index over cone positions
//!
//! Cells are at least as wide as the largest receptive field, so every cone whose
//! field contains a point sits in the point's cell or one of its 8 neighbours.

use ahash::AHashMap;

use super::ConeGeometry;
use crate::types::{ConeId, Point2};

/// Integer cell coordinate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridKey {
    pub x: i32,
    pub y: i32,
}

impl GridKey {
    pub fn from_point(point: Point2, cell_size: f64) -> Self {
        Self {
            x: (point.x / cell_size).floor() as i32,
            y: (point.y / cell_size).floor() as i32,
        }
    }

    /// This cell and its 8 neighbours (clamped at the edge of the key range)
    pub fn neighbors(&self) -> impl Iterator<Item = GridKey> + '_ {
        (-1..=1).flat_map(move |dx| {
            (-1..=1).map(move |dy| GridKey {
                x: self.x.saturating_add(dx),
                y: self.y.saturating_add(dy),
            })
        })
    }

    /// Whether `self` lies within one cell of the box spanned by `min` and `max`
    fn is_near(&self, min: GridKey, max: GridKey) -> bool {
        let within = |k: i32, lo: i32, hi: i32| {
            (i64::from(lo) - 1..=i64::from(hi) + 1).contains(&i64::from(k))
        };
        within(self.x, min.x, max.x) && within(self.y, min.y, max.y)
    }
}

/// Read-only bucket map from cell to cone ids
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cells: AHashMap<GridKey, Vec<ConeId>>,
    cell_size: f64,
    /// Smallest and largest occupied cell coordinates; `None` when empty
    bounds: Option<(GridKey, GridKey)>,
}

impl SpatialIndex {
    /// Index `cones`; `cell_size` must not be smaller than any receptive field
    pub fn build(cones: &[ConeGeometry], cell_size: f64) -> Self {
        let mut cells: AHashMap<GridKey, Vec<ConeId>> = AHashMap::new();
        for cone in cones {
            cells
                .entry(GridKey::from_point(cone.position, cell_size))
                .or_default()
                .push(cone.id);
        }
        let bounds = cells.keys().fold(None, |acc: Option<(GridKey, GridKey)>, &key| {
            Some(match acc {
                None => (key, key),
                Some((min, max)) => (
                    GridKey {
                        x: min.x.min(key.x),
                        y: min.y.min(key.y),
                    },
                    GridKey {
                        x: max.x.max(key.x),
                        y: max.y.max(key.y),
                    },
                ),
            })
        });
        Self {
            cells,
            cell_size,
            bounds,
        }
    }

    pub fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }

    /// Ids of cones whose receptive field contains `point` (inclusive), ascending.
    ///
    /// `out` is cleared first so a caller can reuse one buffer per photon.
    pub fn query(&self, cones: &[ConeGeometry], point: Point2, out: &mut Vec<ConeId>) {
        out.clear();
        let key = GridKey::from_point(point, self.cell_size);
        match self.bounds {
            Some((min, max)) if key.is_near(min, max) => {}
            _ => return,
        }
        for neighbor in key.neighbors() {
            let Some(bucket) = self.cells.get(&neighbor) else {
                continue;
            };
            for &id in bucket {
                let cone = &cones[id.index()];
                let radius = cone.receptive_field_um;
                if cone.position.distance_squared_to(point) <= radius * radius {
                    out.push(id);
                }
            }
        }
        out.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ConeType;
    use crate::types::MacularRegion;

    #[test]
    fn test_grid_key_from_point() {
        let key = GridKey::from_point(Point2::new(2.5, -1.2), 1.0);
        assert_eq!(key, GridKey { x: 2, y: -2 });
    }

    #[test]
    fn test_grid_key_neighbors() {
        let key = GridKey { x: 0, y: 0 };
        let neighbors: Vec<GridKey> = key.neighbors().collect();
        assert_eq!(neighbors.len(), 9);
        assert!(neighbors.contains(&GridKey { x: -1, y: 1 }));
        assert!(neighbors.contains(&key));
    }

    #[test]
    fn test_neighbors_at_the_edge_of_the_key_range() {
        let key = GridKey::from_point(Point2::new(1.0e12, -1.0e12), 1.0);
        assert_eq!(key, GridKey { x: i32::MAX, y: i32::MIN });
        let neighbors: Vec<GridKey> = key.neighbors().collect();
        assert_eq!(neighbors.len(), 9);
        assert!(neighbors.iter().all(|n| n.x >= i32::MAX - 1 && n.y <= i32::MIN + 1));
    }

    #[test]
    fn test_query_far_from_every_cone_is_empty() {
        let cones = [ConeGeometry {
            id: ConeId(0),
            position: Point2::ORIGIN,
            region: MacularRegion::Foveola,
            cone_type: ConeType::L,
            receptive_field_um: 1.0,
        }];
        let index = SpatialIndex::build(&cones, 2.0);
        let mut out = vec![ConeId(5)];

        index.query(&cones, Point2::new(1.0e12, 0.0), &mut out);
        assert!(out.is_empty());
        index.query(&cones, Point2::new(-1.0e12, 1.0e12), &mut out);
        assert!(out.is_empty());

        index.query(&cones, Point2::new(0.5, 0.0), &mut out);
        assert_eq!(out, vec![ConeId(0)]);

        let empty = SpatialIndex::build(&[], 2.0);
        empty.query(&[], Point2::ORIGIN, &mut out);
        assert!(out.is_empty());
    }
}
