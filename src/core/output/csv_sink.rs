// SPDX-License-Identifier: MIT OR Apache-2.0

//! Flat-file CSV writer for confirmed runs.

use std::io::Write;

use crate::core::error::TagFilterResult;
use crate::core::labels::LabelTable;
use crate::core::output::{EmittedHit, RunSink};

/// Column header matching the record layout of `write_hit`.
pub const CSV_HEADER: &str =
    "\"ts\",\"ant\",\"id\",\"proj\",\"run.id\",\"pos.in.run\",\"sig\",\"burst.slop\",\"lat\",\"lon\",\"ant.freq\"";

pub struct CsvSink<W: Write> {
    out: W,
}

impl<W: Write> CsvSink<W> {
    /// Wrap `out`, optionally emitting the column header first.
    pub fn new(mut out: W, with_header: bool) -> TagFilterResult<Self> {
        if with_header {
            writeln!(out, "{CSV_HEADER}")?;
        }
        Ok(CsvSink { out })
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

fn opt_coord(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.5}")).unwrap_or_else(|| "NA".to_string())
}

impl<W: Write> RunSink for CsvSink<W> {
    fn write_hit(&mut self, rec: &EmittedHit, labels: &LabelTable) -> TagFilterResult<()> {
        let ant = labels.resolve(rec.hit.ant).unwrap_or("?");
        writeln!(
            self.out,
            "{:.4},\"{}\",{},\"{}\",{},{},{:.2},{:.4},{},{},{:.3}",
            rec.hit.ts,
            ant,
            rec.tag.id,
            rec.tag.project,
            rec.run_id,
            rec.pos_in_run,
            rec.hit.sig,
            rec.burst_slop,
            opt_coord(rec.hit.lat),
            opt_coord(rec.hit.lon),
            rec.hit.ant_freq_mhz,
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::core::hit::Hit;
    use crate::core::tag::{CoarseCode, KnownTag, TagId};

    fn sample(labels: &mut LabelTable) -> EmittedHit {
        EmittedHit {
            run_id: 3,
            tag: Arc::new(KnownTag::new(TagId(123), "proj", 166.380, 5.0)),
            pos_in_run: 2,
            burst_slop: -0.0125,
            hit: Hit {
                seq_no: 10,
                ts: 1300000000.1234,
                code: CoarseCode(123),
                ant: labels.intern("A1"),
                sig: -42.5,
                lat: None,
                lon: Some(-64.25),
                ant_freq_mhz: 166.380,
                codeset: labels.intern("Lotek4"),
                line_no: 11,
            },
        }
    }

    #[test]
    fn test_writes_header_and_row() {
        let mut labels = LabelTable::new();
        let rec = sample(&mut labels);
        let mut sink = CsvSink::new(Vec::new(), true).unwrap();
        sink.write_hit(&rec, &labels).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some(CSV_HEADER));
        let row = lines.next().unwrap();
        assert_eq!(
            row,
            "1300000000.1234,\"A1\",123,\"proj\",3,2,-42.50,-0.0125,NA,-64.25000,166.380"
        );
    }

    #[test]
    fn test_header_suppressed() {
        let mut labels = LabelTable::new();
        let rec = sample(&mut labels);
        let mut sink = CsvSink::new(Vec::new(), false).unwrap();
        sink.write_hit(&rec, &labels).unwrap();
        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert!(!text.contains("\"ts\""));
    }
}
