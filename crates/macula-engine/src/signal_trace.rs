// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-cone output traces.
//!
//! Append-only while the simulation runs, read-only afterwards. Samples are
//! strictly increasing in time.

use macula_retina::ConeId;
use serde::{Deserialize, Serialize};

/// One reporting-interval sample of a cone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceSample {
    pub time_ms: f64,
    /// Neurotransmitter release R(t)
    pub release: f64,
    pub potential_mv: f64,
    pub adaptation: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalTrace {
    cone_id: ConeId,
    samples: Vec<TraceSample>,
    complete: bool,
}

impl SignalTrace {
    pub fn new(cone_id: ConeId) -> Self {
        Self {
            cone_id,
            samples: Vec::new(),
            complete: true,
        }
    }

    pub(crate) fn push(&mut self, sample: TraceSample) {
        debug_assert!(
            self.samples
                .last()
                .map_or(true, |last| last.time_ms < sample.time_ms),
            "trace samples must be strictly increasing in time"
        );
        self.samples.push(sample);
    }

    /// Integration failed; samples recorded so far stay valid
    pub(crate) fn mark_incomplete(&mut self) {
        self.complete = false;
    }

    pub fn cone_id(&self) -> ConeId {
        self.cone_id
    }

    pub fn samples(&self) -> &[TraceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// False if the cone diverged before the run ended
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// `(time_ms, release)` pairs, the form handed to downstream layers
    pub fn release_pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.samples.iter().map(|s| (s.time_ms, s.release))
    }

    pub fn last(&self) -> Option<&TraceSample> {
        self.samples.last()
    }

    /// Sample with the largest release (first one on ties)
    pub fn peak_release(&self) -> Option<&TraceSample> {
        self.samples
            .iter()
            .fold(None, |best: Option<&TraceSample>, s| match best {
                Some(b) if b.release >= s.release => Some(b),
                _ => Some(s),
            })
    }

    /// Sample recorded exactly at `time_ms`, if any
    pub fn sample_at(&self, time_ms: f64) -> Option<&TraceSample> {
        self.samples
            .binary_search_by(|s| s.time_ms.total_cmp(&time_ms))
            .ok()
            .map(|i| &self.samples[i])
    }
}
