// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Cone Model Architecture
//!
//! Trait-based cone models: the maths of one photoreceptor, decoupled from the
//! per-cone state arena that the engine owns.
//!
//! ## Adding a New Cone Model
//!
//! 1. Create `src/models/your_model.rs`
//! 2. Implement `ConeModel` (and `ModelParameters` for its parameter struct)
//! 3. Add tests
//! 4. Export in `mod.rs`

pub mod graded;
pub mod kernel;
pub mod spectral;
pub mod traits;

// Re-export core types
pub use graded::{GradedConeModel, GradedConeParameters};
pub use kernel::StimulusKernel;
pub use spectral::{ConeType, SpectralSensitivity, SpectralTable};
pub use traits::{ConeModel, ConeState, ModelParameters};
