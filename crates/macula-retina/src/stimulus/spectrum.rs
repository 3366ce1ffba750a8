// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Spectral distributions of the illumination

use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::sampling::normal;
use crate::types::error::{require_positive, Result};
use crate::types::RetinaError;

/// Resampling cap for the Gaussian spectrum; the mean is used past it
const MAX_GAUSSIAN_REDRAWS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Spectrum {
    Monochromatic { wavelength_nm: f64 },
    /// Uniform over `[min_nm, max_nm)`
    UniformBand { min_nm: f64, max_nm: f64 },
    /// Normal around `mean_nm`, redrawn until positive
    Gaussian { mean_nm: f64, sigma_nm: f64 },
}

impl Default for Spectrum {
    fn default() -> Self {
        Spectrum::Monochromatic {
            wavelength_nm: 555.0,
        }
    }
}

impl Spectrum {
    /// Validate and build the wavelength distribution
    pub fn sampler(&self) -> Result<SpectrumSampler> {
        self.validate()?;
        Ok(match *self {
            Spectrum::Monochromatic { wavelength_nm } => {
                SpectrumSampler::Monochromatic(wavelength_nm)
            }
            Spectrum::UniformBand { min_nm, max_nm } => {
                SpectrumSampler::Band(Uniform::new(min_nm, max_nm))
            }
            Spectrum::Gaussian { mean_nm, sigma_nm } => SpectrumSampler::Gaussian {
                mean_nm,
                distribution: normal("photons.spectrum.sigma_nm", mean_nm, sigma_nm)?,
            },
        })
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Spectrum::Monochromatic { wavelength_nm } => {
                require_positive("photons.spectrum.wavelength_nm", wavelength_nm)
            }
            Spectrum::UniformBand { min_nm, max_nm } => {
                require_positive("photons.spectrum.min_nm", min_nm)?;
                require_positive("photons.spectrum.max_nm", max_nm)?;
                if max_nm <= min_nm {
                    return Err(RetinaError::configuration(
                        "photons.spectrum.max_nm",
                        format!("band is empty ({} nm ..= {} nm)", min_nm, max_nm),
                    ));
                }
                Ok(())
            }
            Spectrum::Gaussian { mean_nm, sigma_nm } => {
                require_positive("photons.spectrum.mean_nm", mean_nm)?;
                require_positive("photons.spectrum.sigma_nm", sigma_nm)
            }
        }
    }
}

/// Wavelength distribution of a validated [`Spectrum`]
#[derive(Debug, Clone, Copy)]
pub enum SpectrumSampler {
    Monochromatic(f64),
    Band(Uniform<f64>),
    Gaussian {
        mean_nm: f64,
        distribution: Normal<f64>,
    },
}

impl Distribution<f64> for SpectrumSampler {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match self {
            SpectrumSampler::Monochromatic(wavelength_nm) => *wavelength_nm,
            SpectrumSampler::Band(band) => band.sample(rng),
            SpectrumSampler::Gaussian {
                mean_nm,
                distribution,
            } => {
                for _ in 0..MAX_GAUSSIAN_REDRAWS {
                    let wavelength = distribution.sample(rng);
                    if wavelength > 0.0 {
                        return wavelength;
                    }
                }
                *mean_nm
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::seeded_rng;

    #[test]
    fn test_band_samples_in_range() {
        let spectrum = Spectrum::UniformBand {
            min_nm: 400.0,
            max_nm: 700.0,
        };
        let sampler = spectrum.sampler().unwrap();
        let mut rng = seeded_rng(2, 0);
        for _ in 0..1000 {
            let w = sampler.sample(&mut rng);
            assert!((400.0..700.0).contains(&w));
        }
    }

    #[test]
    fn test_gaussian_samples_are_positive() {
        let spectrum = Spectrum::Gaussian {
            mean_nm: 5.0,
            sigma_nm: 50.0,
        };
        let sampler = spectrum.sampler().unwrap();
        let mut rng = seeded_rng(4, 0);
        assert!((0..1000).all(|_| sampler.sample(&mut rng) > 0.0));
    }

    #[test]
    fn test_empty_band_rejected() {
        let spectrum = Spectrum::UniformBand {
            min_nm: 600.0,
            max_nm: 600.0,
        };
        assert!(spectrum.validate().unwrap_err().is_configuration());
        assert!(spectrum.sampler().unwrap_err().is_configuration());
        assert!(Spectrum::Monochromatic { wavelength_nm: -1.0 }
            .validate()
            .is_err());
    }
}
