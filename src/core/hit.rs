// SPDX-License-Identifier: MIT OR Apache-2.0

//! One tag detection from a receiver.
//!
//! The engine needs only the timestamp and coarse code; everything else is
//! carried opaquely into the output. Hits are keyed by a monotonically
//! increasing sequence number assigned at parse time, so that buffer order
//! stays deterministic even when timestamps collide.

use crate::core::error::{TagFilterError, TagFilterResult};
use crate::core::labels::{LabelId, LabelTable};
use crate::core::tag::{CoarseCode, NominalFreqKhz};

/// Seconds since the epoch.
pub type Timestamp = f64;

/// Arrival-order key for hits.
pub type SeqNo = u64;

#[derive(Debug, Clone, PartialEq)]
pub struct Hit {
    pub seq_no: SeqNo,
    pub ts: Timestamp,
    pub code: CoarseCode,
    /// Interned antenna label.
    pub ant: LabelId,
    /// Signal strength, in relative dB.
    pub sig: f32,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    /// Frequency the receiving antenna was tuned to, in MHz.
    pub ant_freq_mhz: f64,
    /// Interned codeset label.
    pub codeset: LabelId,
    /// Line of the input stream this hit came from.
    pub line_no: u64,
}

impl Hit {
    /// Parse one data line of the hit stream:
    /// `ts,id,ant,sig,lat,lon,antfreq,codeset`, where `lat`/`lon` may be
    /// `NA` and `ant`/`codeset` may be quoted.
    pub fn parse(
        line: &str,
        seq_no: SeqNo,
        line_no: u64,
        labels: &mut LabelTable,
    ) -> TagFilterResult<Hit> {
        let fields = split_quoted(line);
        if fields.len() != 8 {
            return Err(TagFilterError::other(format!(
                "expected 8 fields, found {}",
                fields.len()
            )));
        }

        let ts: Timestamp = parse_num(&fields[0], "ts")?;
        let id: u32 = parse_num(&fields[1], "id")?;
        let ant = labels.intern(fields[2].trim());
        let sig: f32 = parse_num(&fields[3], "sig")?;
        let lat = parse_opt_num(&fields[4], "lat")?;
        let lon = parse_opt_num(&fields[5], "lon")?;
        let ant_freq_mhz: f64 = parse_num(&fields[6], "antfreq")?;
        let codeset = labels.intern(fields[7].trim());

        Ok(Hit {
            seq_no,
            ts,
            code: CoarseCode((id % 1000) as u16),
            ant,
            sig,
            lat,
            lon,
            ant_freq_mhz,
            codeset,
            line_no,
        })
    }

    /// Nominal frequency of the antenna this hit arrived on.
    pub fn nominal_freq(&self) -> NominalFreqKhz {
        NominalFreqKhz::from_mhz(self.ant_freq_mhz)
    }
}

/// Split a comma-delimited line, honouring double-quoted fields (which may
/// contain commas). Quotes are stripped from the returned fields.
pub(crate) fn split_quoted(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    for c in line.trim_end().chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}

fn parse_num<T: std::str::FromStr>(field: &str, name: &str) -> TagFilterResult<T> {
    field
        .trim()
        .parse()
        .map_err(|_| TagFilterError::other(format!("bad {name} field: {field:?}")))
}

fn parse_opt_num(field: &str, name: &str) -> TagFilterResult<Option<f64>> {
    let f = field.trim();
    if f == "NA" || f.is_empty() {
        return Ok(None);
    }
    parse_num(f, name).map(Some)
}
