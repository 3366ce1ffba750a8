// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Identity types for cone units

use core::fmt;
use serde::{Deserialize, Serialize};

/// Cone ID (dense index into the lattice arena, unique across the macula)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ConeId(pub u32);

impl ConeId {
    /// Arena index of this cone
    #[inline(always)]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ConeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cone({})", self.0)
    }
}
