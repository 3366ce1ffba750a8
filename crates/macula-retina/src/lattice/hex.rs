// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hexagonal close-packed point generation (offset coordinates)
//!
//! ```text
//!   row j+1:    •   •   •   •        odd rows shifted by s/2
//!   row j  :  •   •   •   •          rows separated by s·√3/2
//! ```

use crate::types::Point2;

/// Hexagonal grid of pitch `spacing_um` centred on `center`
#[derive(Debug, Clone, Copy)]
pub struct HexGrid {
    pub center: Point2,
    pub spacing_um: f64,
}

impl HexGrid {
    pub fn new(center: Point2, spacing_um: f64) -> Self {
        Self { center, spacing_um }
    }

    pub fn row_height_um(&self) -> f64 {
        self.spacing_um * 3.0_f64.sqrt() / 2.0
    }

    /// Grid point at offset coordinates `(column, row)`
    pub fn point(&self, column: i64, row: i64) -> Point2 {
        let shift = if row.rem_euclid(2) == 1 {
            self.spacing_um / 2.0
        } else {
            0.0
        };
        Point2::new(
            self.center.x + column as f64 * self.spacing_um + shift,
            self.center.y + row as f64 * self.row_height_um(),
        )
    }

    /// Every grid point within `radius_um` of the centre, row by row.
    ///
    /// Order is fixed for a given grid, which keeps seeded jitter reproducible.
    pub fn points_within(&self, radius_um: f64) -> impl Iterator<Item = Point2> + '_ {
        let rows = (radius_um / self.row_height_um()).ceil() as i64 + 1;
        let columns = (radius_um / self.spacing_um).ceil() as i64 + 1;
        let radius_sq = radius_um * radius_um;
        (-rows..=rows)
            .flat_map(move |row| (-columns..=columns).map(move |column| self.point(column, row)))
            .filter(move |p| p.distance_squared_to(self.center) <= radius_sq)
    }
}
