// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Retina Types Module
//!
//! Core type definitions shared by the lattice, the photon sources and the cone model.

pub mod error;
pub mod ids;
pub mod photon;
pub mod region;
pub mod spatial;

// Re-export commonly used types
pub use error::{Error, Result, RetinaError};
pub use ids::ConeId;
pub use photon::Photon;
pub use region::{ConeMix, MacularRegion, RegionProfile};
pub use spatial::Point2;
