// SPDX-License-Identifier: MIT OR Apache-2.0

//! JSON-lines writer for confirmed runs: one object per hit.

use std::io::Write;

use serde_json::json;

use crate::core::error::TagFilterResult;
use crate::core::labels::LabelTable;
use crate::core::output::{EmittedHit, RunSink};

pub struct JsonSink<W: Write> {
    out: W,
}

impl<W: Write> JsonSink<W> {
    pub fn new(out: W) -> Self {
        JsonSink { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RunSink for JsonSink<W> {
    fn write_hit(&mut self, rec: &EmittedHit, labels: &LabelTable) -> TagFilterResult<()> {
        let obj = json!({
            "run_id": rec.run_id,
            "tag_id": rec.tag.id,
            "proj": rec.tag.project,
            "pos_in_run": rec.pos_in_run,
            "ts": rec.hit.ts,
            "ant": labels.resolve(rec.hit.ant),
            "sig": rec.hit.sig,
            "lat": rec.hit.lat,
            "lon": rec.hit.lon,
            "ant_freq": rec.hit.ant_freq_mhz,
            "codeset": labels.resolve(rec.hit.codeset),
            "burst_slop": rec.burst_slop,
        });
        writeln!(self.out, "{obj}")?;
        Ok(())
    }
}
