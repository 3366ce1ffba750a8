// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Seeded generators and distribution constructors shared by the lattice
//! jitter and the photon sources

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Exp, Normal};

use crate::types::{Result, RetinaError};

/// Deterministic generator for substream `stream` of `seed`
pub fn seeded_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_add(stream))
}

/// Uniform draw in [0, 1)
#[inline]
pub fn unit<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    rng.gen::<f64>()
}

/// Normal distribution; a rejected `std_dev` is reported against `parameter`
pub fn normal(parameter: &str, mean: f64, std_dev: f64) -> Result<Normal<f64>> {
    Normal::new(mean, std_dev).map_err(|e| RetinaError::configuration(parameter, e.to_string()))
}

/// Inter-arrival distribution of a Poisson process with `rate` events per unit time
pub fn inter_arrival(parameter: &str, rate: f64) -> Result<Exp<f64>> {
    Exp::new(rate).map_err(|e| RetinaError::configuration(parameter, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_distr::Distribution;

    #[test]
    fn test_same_seed_same_stream() {
        let mut a = seeded_rng(7, 0);
        let mut b = seeded_rng(7, 0);
        for _ in 0..16 {
            assert_eq!(unit(&mut a).to_bits(), unit(&mut b).to_bits());
        }
    }

    #[test]
    fn test_streams_differ() {
        let mut a = seeded_rng(7, 0);
        let mut b = seeded_rng(7, 1);
        assert_ne!(unit(&mut a).to_bits(), unit(&mut b).to_bits());
    }

    #[test]
    fn test_inter_arrival_mean() {
        let exp = inter_arrival("rate", 2.0).unwrap();
        let mut rng = seeded_rng(3, 0);
        let n = 20_000;
        let draws: Vec<f64> = (0..n).map(|_| exp.sample(&mut rng)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        assert!((mean - 0.5).abs() < 0.02, "mean = {}", mean);
        assert!(draws.iter().all(|&d| d >= 0.0));
    }

    #[test]
    fn test_constructor_errors_name_the_parameter() {
        let err = normal("lattice.jitter_um", 0.0, f64::NAN).unwrap_err();
        assert!(err.is_configuration());
        assert!(err.to_string().contains("lattice.jitter_um"));
        assert!(inter_arrival("photons.rate_per_ms", -1.0)
            .unwrap_err()
            .is_configuration());
    }
}
