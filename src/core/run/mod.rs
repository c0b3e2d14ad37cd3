// SPDX-License-Identifier: MIT OR Apache-2.0

//! Run tracking: candidates, per-frequency finders and the stream driver.

pub mod candidate;
pub mod driver;
pub mod finder;

pub use candidate::RunCandidate;
pub use driver::{StreamDriver, StreamSummary};
pub use finder::{RunFinder, RunIdCounter};
