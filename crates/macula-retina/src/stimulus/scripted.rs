// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Scripted photon lists and stream merging

use core::iter::Peekable;

use crate::types::{Photon, Result, RetinaError};

/// Fixed, pre-validated photon sequence (flashes, test stimuli)
#[derive(Debug, Clone)]
pub struct ScriptedPhotonSource {
    photons: std::vec::IntoIter<Photon>,
}

impl ScriptedPhotonSource {
    /// Fails if any photon is malformed or the list is not time-ordered
    pub fn new(photons: Vec<Photon>) -> Result<Self> {
        let mut previous_ms = f64::NEG_INFINITY;
        for photon in &photons {
            photon.validate()?;
            if photon.arrival_ms < previous_ms {
                return Err(RetinaError::OutOfOrderPhoton {
                    previous_ms,
                    arrival_ms: photon.arrival_ms,
                });
            }
            previous_ms = photon.arrival_ms;
        }
        Ok(Self {
            photons: photons.into_iter(),
        })
    }

    pub fn remaining(&self) -> usize {
        self.photons.len()
    }
}

impl Iterator for ScriptedPhotonSource {
    type Item = Photon;

    fn next(&mut self) -> Option<Photon> {
        self.photons.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.photons.size_hint()
    }
}

/// Time-ordered union of two ordered streams; ties go to the left stream
pub struct MergedSource<A: Iterator<Item = Photon>, B: Iterator<Item = Photon>> {
    left: Peekable<A>,
    right: Peekable<B>,
}

impl<A, B> MergedSource<A, B>
where
    A: Iterator<Item = Photon>,
    B: Iterator<Item = Photon>,
{
    pub fn new(left: A, right: B) -> Self {
        Self {
            left: left.peekable(),
            right: right.peekable(),
        }
    }
}

impl<A, B> Iterator for MergedSource<A, B>
where
    A: Iterator<Item = Photon>,
    B: Iterator<Item = Photon>,
{
    type Item = Photon;

    fn next(&mut self) -> Option<Photon> {
        match (self.left.peek(), self.right.peek()) {
            (Some(l), Some(r)) if r.arrival_ms < l.arrival_ms => self.right.next(),
            (Some(_), _) => self.left.next(),
            (None, _) => self.right.next(),
        }
    }
}
