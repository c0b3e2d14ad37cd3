// SPDX-License-Identifier: MIT OR Apache-2.0

//! Streaming filter for coded VHF telemetry detections.
//!
//! Receivers report every decoded pulse, including noise that happens to
//! decode as a valid tag id. This crate separates real tags from that noise
//! by exploiting the one thing a transmitter cannot fake: its registered
//! burst interval. For each (nominal frequency, coarse code) group a DFA is
//! built whose edges are the plausible inter-burst gaps of the registered
//! tags; hits that walk a path to an unambiguous identity are emitted as
//! runs, everything else is discarded.
//!
//! Typical embedding:
//!
//! ```no_run
//! use std::io::BufReader;
//!
//! use tagfilter::core::config::FilterParams;
//! use tagfilter::core::output::MemorySink;
//! use tagfilter::core::registry::TagRegistry;
//! use tagfilter::core::run::StreamDriver;
//!
//! # fn main() -> tagfilter::core::error::TagFilterResult<()> {
//! let registry = TagRegistry::from_path("tags.csv")?;
//! let mut driver = StreamDriver::new(&registry, &FilterParams::default())?;
//! let mut sink = MemorySink::new();
//! driver.run(BufReader::new(std::io::stdin()), &mut sink)?;
//! let summary = driver.finish(&mut sink)?;
//! println!("{} hits kept", sink.len());
//! # let _ = summary;
//! # Ok(())
//! # }
//! ```

pub mod core;

pub use crate::core::config::FilterParams;
pub use crate::core::error::{TagFilterError, TagFilterResult};
pub use crate::core::registry::TagRegistry;
pub use crate::core::run::{StreamDriver, StreamSummary};
