// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory sink collecting emitted hits, for tests and embedding.

use crate::core::error::TagFilterResult;
use crate::core::labels::LabelTable;
use crate::core::output::{EmittedHit, RunSink};

#[derive(Debug, Default)]
pub struct MemorySink {
    pub records: Vec<EmittedHit>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RunSink for MemorySink {
    fn write_hit(&mut self, rec: &EmittedHit, _labels: &LabelTable) -> TagFilterResult<()> {
        self.records.push(rec.clone());
        Ok(())
    }
}
