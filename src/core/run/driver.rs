// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stream driver: one `RunFinder` per nominal frequency.
//!
//! Receivers switch between antennas tuned to different frequencies, so the
//! driver routes each hit to the finder for the frequency its antenna was
//! tuned to. The driver owns everything shared across finders: the label
//! table, the run-id counter and the stream counters.

use std::collections::{BTreeMap, BTreeSet};
use std::io::BufRead;

use log::{debug, info, warn};

use crate::core::config::FilterParams;
use crate::core::error::TagFilterResult;
use crate::core::hit::{Hit, SeqNo};
use crate::core::labels::LabelTable;
use crate::core::output::RunSink;
use crate::core::registry::TagRegistry;
use crate::core::run::finder::{RunFinder, RunIdCounter};
use crate::core::tag::{CoarseCode, NominalFreqKhz};

/// End-of-stream accounting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines_read: u64,
    pub hits_processed: u64,
    pub malformed_lines: u64,
    /// Distinct coarse codes seen with no registered tag to match.
    pub unmatched_codes: BTreeSet<CoarseCode>,
}

#[derive(Debug)]
pub struct StreamDriver {
    finders: BTreeMap<NominalFreqKhz, RunFinder>,
    labels: LabelTable,
    run_ids: RunIdCounter,
    next_seq: SeqNo,
    lines_read: u64,
    hits_processed: u64,
    malformed_lines: u64,
    /// Codes seen on frequencies with no registered tags at all.
    stray_codes: BTreeSet<CoarseCode>,
}

impl StreamDriver {
    /// Build all DFA graphs for the registry up front. Streaming starts only
    /// after every graph is constructed and immutable.
    pub fn new(registry: &TagRegistry, params: &FilterParams) -> TagFilterResult<Self> {
        params.validate()?;
        let mut finders: BTreeMap<NominalFreqKhz, RunFinder> = BTreeMap::new();
        for (&(freq, code), group) in registry.groups() {
            finders
                .entry(freq)
                .or_insert_with(|| RunFinder::new(freq, params.clone()))
                .add_group(code, group)?;
        }
        info!(
            "prepared {} finder(s) for {} registered tag(s)",
            finders.len(),
            registry.len()
        );
        Ok(StreamDriver {
            finders,
            labels: LabelTable::new(),
            run_ids: RunIdCounter::new(),
            next_seq: 0,
            lines_read: 0,
            hits_processed: 0,
            malformed_lines: 0,
            stray_codes: BTreeSet::new(),
        })
    }

    /// Handle one raw line of the hit stream. A first line that fails to
    /// parse is taken to be the optional column header; later failures are
    /// counted and skipped.
    pub fn process_line(&mut self, line: &str, sink: &mut dyn RunSink) -> TagFilterResult<()> {
        self.lines_read += 1;
        if line.trim().is_empty() {
            return Ok(());
        }
        let hit = match Hit::parse(line, self.next_seq + 1, self.lines_read, &mut self.labels) {
            Ok(hit) => hit,
            Err(e) => {
                if self.lines_read == 1 {
                    debug!("skipping header line");
                } else {
                    self.malformed_lines += 1;
                    warn!("skipping malformed hit at line {}: {e}", self.lines_read);
                }
                return Ok(());
            }
        };
        self.next_seq += 1;
        self.process_hit(hit, sink)
    }

    /// Offer an already-parsed hit to the finder for its frequency.
    pub fn process_hit(&mut self, hit: Hit, sink: &mut dyn RunSink) -> TagFilterResult<()> {
        self.hits_processed += 1;
        match self.finders.get_mut(&hit.nominal_freq()) {
            Some(finder) => finder.process(hit, &mut self.run_ids, &self.labels, sink),
            None => {
                // no tag is registered anywhere near this frequency, so the
                // code cannot match; report it with the unmatched set
                self.stray_codes.insert(hit.code);
                Ok(())
            }
        }
    }

    /// Consume an entire hit stream.
    pub fn run(&mut self, reader: impl BufRead, sink: &mut dyn RunSink) -> TagFilterResult<()> {
        for line in reader.lines() {
            self.process_line(&line?, sink)?;
        }
        Ok(())
    }

    /// Flush all finders and report stream-level accounting.
    pub fn finish(&mut self, sink: &mut dyn RunSink) -> TagFilterResult<StreamSummary> {
        let mut unmatched = self.stray_codes.clone();
        for finder in self.finders.values_mut() {
            finder.finish(&self.labels, sink)?;
            unmatched.extend(finder.unmatched_codes().iter().copied());
        }
        if !unmatched.is_empty() {
            warn!(
                "{} coarse code(s) in the stream had no registered tags: {:?}",
                unmatched.len(),
                unmatched
            );
        }
        info!(
            "processed {} hit(s) from {} line(s), {} malformed",
            self.hits_processed, self.lines_read, self.malformed_lines
        );
        Ok(StreamSummary {
            lines_read: self.lines_read,
            hits_processed: self.hits_processed,
            malformed_lines: self.malformed_lines,
            unmatched_codes: unmatched,
        })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }
}
