// SPDX-License-Identifier: MIT OR Apache-2.0

//! Output seam for confirmed runs.
//!
//! The engine emits one record per hit of a confirmed run, in ascending
//! sequence order. `RunSink` is the capability interface; the flat-file CSV
//! writer is the historical default, with a JSON-lines variant and an
//! in-memory collector for tests. A database writer would plug in here.

pub mod csv_sink;
pub mod json_sink;
pub mod memory_sink;

pub use csv_sink::{CsvSink, CSV_HEADER};
pub use json_sink::JsonSink;
pub use memory_sink::MemorySink;

use crate::core::error::TagFilterResult;
use crate::core::hit::Hit;
use crate::core::labels::LabelTable;
use crate::core::tag::TagRef;

/// One hit of a confirmed run, annotated for output.
#[derive(Debug, Clone, PartialEq)]
pub struct EmittedHit {
    pub run_id: u64,
    /// The confirmed tag this run resolved to.
    pub tag: TagRef,
    /// 1-based position of this hit within its run.
    pub pos_in_run: u32,
    /// Signed deviation of the gap since the previously emitted hit of this
    /// run from the nearest whole multiple of the tag's burst interval.
    /// 0.0 for the first hit of a run (distinguishable by pos_in_run == 1).
    pub burst_slop: f64,
    pub hit: Hit,
}

/// Consumer of finalized run output.
pub trait RunSink {
    fn write_hit(&mut self, rec: &EmittedHit, labels: &LabelTable) -> TagFilterResult<()>;
}
