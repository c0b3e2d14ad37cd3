// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registered-tag identity types.
//!
//! Many physically distinct tags share a 3-digit manufacturer code (the
//! "coarse code"); the registry distinguishes them by allowing full ids above
//! 999, where `id % 1000` recovers the coarse code and the thousands digits
//! separate physical tags with different burst intervals.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

/// Full registered tag identity (may exceed 3 digits, see module docs).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TagId(pub u32);

/// Manufacturer-level code shared by a group of physical tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct CoarseCode(pub u16);

/// Nominal transmit frequency in kHz, rounded from the registry's MHz value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct NominalFreqKhz(pub i32);

impl TagId {
    /// The coarse code embedded in a full tag id.
    pub fn coarse_code(self) -> CoarseCode {
        CoarseCode((self.0 % 1000) as u16)
    }
}

impl NominalFreqKhz {
    pub fn from_mhz(mhz: f64) -> Self {
        NominalFreqKhz((mhz * 1000.0).round() as i32)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CoarseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NominalFreqKhz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.0)
    }
}

/// Ordered, unique set of tag ids. Value equality on this set is the key
/// used to deduplicate DFA states within a depth.
pub type TagIdSet = BTreeSet<TagId>;

/// One registered tag. Immutable after registry load; shared by `Arc` between
/// the registry, the DFA graphs and confirmed run candidates.
#[derive(Debug, Clone, PartialEq)]
pub struct KnownTag {
    pub id: TagId,
    /// Project the tag was registered under (passed through to output).
    pub project: String,
    /// Nominal transmit frequency in MHz, as registered.
    pub freq_mhz: f64,
    /// Burst interval in seconds.
    pub burst_interval: f64,
}

impl KnownTag {
    pub fn new(id: TagId, project: impl Into<String>, freq_mhz: f64, burst_interval: f64) -> Self {
        KnownTag {
            id,
            project: project.into(),
            freq_mhz,
            burst_interval,
        }
    }

    pub fn coarse_code(&self) -> CoarseCode {
        self.id.coarse_code()
    }

    pub fn nominal_freq(&self) -> NominalFreqKhz {
        NominalFreqKhz::from_mhz(self.freq_mhz)
    }
}

/// Shared handle to a registered tag.
pub type TagRef = Arc<KnownTag>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coarse_code_is_low_three_digits() {
        assert_eq!(TagId(123).coarse_code(), CoarseCode(123));
        assert_eq!(TagId(1123).coarse_code(), CoarseCode(123));
        assert_eq!(TagId(2007).coarse_code(), CoarseCode(7));
    }

    #[test]
    fn test_nominal_freq_rounds_to_khz() {
        assert_eq!(NominalFreqKhz::from_mhz(166.380), NominalFreqKhz(166380));
        assert_eq!(NominalFreqKhz::from_mhz(150.1), NominalFreqKhz(150100));
    }

    #[test]
    fn test_tag_id_set_is_value_keyed() {
        let a: TagIdSet = [TagId(1), TagId(2)].into_iter().collect();
        let b: TagIdSet = [TagId(2), TagId(1)].into_iter().collect();
        assert_eq!(a, b);
    }
}
