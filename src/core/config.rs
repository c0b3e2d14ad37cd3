// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filtering parameters.
//!
//! Values are stored in seconds internally; the millisecond setters exist
//! because the command line has always taken slop values in milliseconds.

use serde::{Deserialize, Serialize};

use crate::core::error::{TagFilterError, TagFilterResult};
use crate::core::interval::Gap;

/// Algorithmic parameters for DFA construction and run tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterParams {
    /// Allowed timing slop between consecutive bursts, in seconds. Absorbs
    /// measurement error at tag registration and detection time.
    pub burst_slop: Gap,

    /// How much the slop window widens for each skipped burst, in seconds.
    /// Absorbs clock drift between tag and receiver.
    pub slop_expansion: Gap,

    /// Maximum number of consecutive bursts that may go undetected without
    /// terminating a run.
    pub max_skipped_bursts: u32,

    /// Number of hits that must be accumulated before a candidate's tag
    /// identity is confirmed. Also the DFA confirmation depth.
    pub hits_to_confirm: u32,

    /// Treat tags that remain indistinguishable at the confirmation depth as
    /// a fatal error instead of a warning.
    pub fail_on_ambiguity: bool,
}

impl Default for FilterParams {
    fn default() -> Self {
        FilterParams {
            burst_slop: 0.010,
            slop_expansion: 0.001,
            max_skipped_bursts: 60,
            hits_to_confirm: 2,
            fail_on_ambiguity: false,
        }
    }
}

impl FilterParams {
    pub fn with_burst_slop_ms(mut self, ms: f64) -> Self {
        self.burst_slop = ms / 1000.0;
        self
    }

    pub fn with_slop_expansion_ms(mut self, ms: f64) -> Self {
        self.slop_expansion = ms / 1000.0;
        self
    }

    pub fn with_max_skipped_bursts(mut self, n: u32) -> Self {
        self.max_skipped_bursts = n;
        self
    }

    pub fn with_hits_to_confirm(mut self, n: u32) -> Self {
        self.hits_to_confirm = n;
        self
    }

    /// Expected-gap tolerance for the k-th burst-interval multiple.
    pub fn slop_for_multiple(&self, k: u32) -> Gap {
        self.burst_slop + self.slop_expansion * (k - 1) as Gap
    }

    /// Largest burst-interval multiple an edge is generated for. Tolerating
    /// K skipped bursts means accepting gaps up to K+1 intervals long.
    pub fn max_burst_multiple(&self) -> u32 {
        self.max_skipped_bursts + 1
    }

    pub fn validate(&self) -> TagFilterResult<()> {
        if !(self.burst_slop >= 0.0) {
            return Err(TagFilterError::invalid_parameter(
                "burst_slop",
                "must be non-negative",
            ));
        }
        if !(self.slop_expansion >= 0.0) {
            return Err(TagFilterError::invalid_parameter(
                "slop_expansion",
                "must be non-negative",
            ));
        }
        // a single hit confirms nothing; filtering with 1 would be a no-op
        if self.hits_to_confirm < 2 {
            return Err(TagFilterError::invalid_parameter(
                "hits_to_confirm",
                "must be at least 2",
            ));
        }
        Ok(())
    }
}
