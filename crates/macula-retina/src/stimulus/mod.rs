// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Photon Sources
//!
//! Every source is an `Iterator<Item = Photon>` with non-decreasing arrival
//! times. Sources are consumed once; build a new one (same seed) to replay.

pub mod footprint;
pub mod scripted;
pub mod source;
pub mod spectrum;

pub use footprint::{Footprint, FootprintSampler};
pub use scripted::{MergedSource, ScriptedPhotonSource};
pub use source::{PhotonSourceParameters, PoissonPhotonSource};
pub use spectrum::{Spectrum, SpectrumSampler};
