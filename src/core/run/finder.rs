// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-frequency run tracking.
//!
//! A `RunFinder` owns, for each coarse code on its nominal frequency, the
//! DFA graph and the live candidate population. Confirmed candidates are
//! kept ahead of unconfirmed ones: a hit that continues an established
//! identity is more informative than one that might start a new hypothesis,
//! and a pulse belongs to at most one already-identified tag.
//!
//! Strictly single-pass: callers must offer hits in non-decreasing
//! timestamp order.

use std::collections::{BTreeMap, BTreeSet};

use log::debug;

use crate::core::config::FilterParams;
use crate::core::dfa::DfaGraph;
use crate::core::error::{TagFilterError, TagFilterResult};
use crate::core::hit::Hit;
use crate::core::labels::LabelTable;
use crate::core::output::RunSink;
use crate::core::run::candidate::RunCandidate;
use crate::core::tag::{CoarseCode, NominalFreqKhz, TagRef};

/// Explicit run-id source, owned by the stream driver and threaded through
/// `process` so ids stay unique across every finder of one stream.
#[derive(Debug, Default)]
pub struct RunIdCounter {
    next: u64,
}

impl RunIdCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}

/// Live candidates for one coarse code, confirmed ones first.
#[derive(Debug, Default)]
struct CandidateLists {
    confirmed: Vec<RunCandidate>,
    unconfirmed: Vec<RunCandidate>,
}

#[derive(Debug)]
pub struct RunFinder {
    freq: NominalFreqKhz,
    params: FilterParams,
    graphs: BTreeMap<CoarseCode, DfaGraph>,
    cands: BTreeMap<CoarseCode, CandidateLists>,
    unmatched: BTreeSet<CoarseCode>,
}

impl RunFinder {
    pub fn new(freq: NominalFreqKhz, params: FilterParams) -> Self {
        RunFinder {
            freq,
            params,
            graphs: BTreeMap::new(),
            cands: BTreeMap::new(),
            unmatched: BTreeSet::new(),
        }
    }

    pub fn freq(&self) -> NominalFreqKhz {
        self.freq
    }

    /// Register one coarse-code group and build its DFA graph.
    pub fn add_group(&mut self, code: CoarseCode, group: &[TagRef]) -> TagFilterResult<()> {
        if self.graphs.contains_key(&code) {
            return Err(TagFilterError::graph(format!(
                "code {code} registered twice on {}",
                self.freq
            )));
        }
        let graph = DfaGraph::build(self.freq, code, group, &self.params)?;
        self.graphs.insert(code, graph);
        self.cands.insert(code, CandidateLists::default());
        Ok(())
    }

    /// Coarse codes seen in the stream with no registered tags.
    pub fn unmatched_codes(&self) -> &BTreeSet<CoarseCode> {
        &self.unmatched
    }

    /// Offer one hit to the candidate population for its coarse code.
    pub fn process(
        &mut self,
        hit: Hit,
        ids: &mut RunIdCounter,
        labels: &LabelTable,
        sink: &mut dyn RunSink,
    ) -> TagFilterResult<()> {
        let Some(graph) = self.graphs.get(&hit.code) else {
            self.unmatched.insert(hit.code);
            return Ok(());
        };
        let lists = self.cands.entry(hit.code).or_default();
        let hits_to_confirm = self.params.hits_to_confirm;

        // Confirmed candidates get first chance. The first one that accepts
        // absorbs the hit outright; its buffer is emitted on the spot.
        let mut i = 0;
        while i < lists.confirmed.len() {
            if lists.confirmed[i].is_too_old(graph, hit.ts) {
                let mut retired = lists.confirmed.remove(i);
                debug!("retiring confirmed run {}", retired.run_id());
                retired.flush(sink, labels)?;
                continue;
            }
            if let Some(next) = lists.confirmed[i].advance(graph, &hit) {
                let cand = &mut lists.confirmed[i];
                cand.accept(graph, hit, next, hits_to_confirm);
                cand.flush(sink, labels)?;
                return Ok(());
            }
            i += 1;
        }

        // Unconfirmed candidates: the hit may extend several hypotheses.
        // Clones are parked and appended after the scan so the hit is never
        // offered to a clone of a candidate that just took it.
        let mut clones: Vec<RunCandidate> = Vec::new();
        let mut absorbed = false;
        let mut confirmed_idx = None;
        let mut i = 0;
        while i < lists.unconfirmed.len() {
            if lists.unconfirmed[i].is_too_old(graph, hit.ts) {
                lists.unconfirmed.remove(i);
                continue;
            }
            let Some(next) = lists.unconfirmed[i].advance(graph, &hit) else {
                i += 1;
                continue;
            };
            // accepting confirms only if it fills the buffer AND lands on a
            // fully disambiguated state; otherwise snapshot the pre-hit
            // branch so the "hit not taken" interpretation stays live
            let confirming = lists.unconfirmed[i].will_confirm_next_hit(hits_to_confirm)
                && graph.state(next).is_unique();
            if !confirming {
                clones.push(lists.unconfirmed[i].clone());
            }
            absorbed = true;
            if lists.unconfirmed[i].accept(graph, hit.clone(), next, hits_to_confirm) {
                confirmed_idx = Some(i);
                break;
            }
            i += 1;
        }

        if let Some(idx) = confirmed_idx {
            let mut winner = lists.unconfirmed.remove(idx);
            debug!(
                "run {} confirmed as tag {:?} on code {}",
                winner.run_id(),
                winner.tag_id(),
                hit.code
            );
            Self::eliminate_rivals(lists, &winner, sink, labels)?;
            // snapshots parked earlier in this cycle are rivals too: one
            // taken from a candidate sharing the winner's hits would later
            // re-emit them under the same run id
            clones.retain(|c| !c.shares_any_hits(&winner));
            winner.flush(sink, labels)?;
            lists.confirmed.push(winner);
        }

        lists.unconfirmed.append(&mut clones);

        if !absorbed {
            lists
                .unconfirmed
                .push(RunCandidate::new(ids.next_id(), graph.root(), hit));
        }
        Ok(())
    }

    /// Remove every live candidate that resolved to the winner's tag or
    /// double-counts any of its buffered hits as evidence. First confirmed
    /// wins; displaced confirmed candidates still flush what they buffered.
    fn eliminate_rivals(
        lists: &mut CandidateLists,
        winner: &RunCandidate,
        sink: &mut dyn RunSink,
        labels: &LabelTable,
    ) -> TagFilterResult<()> {
        let mut i = 0;
        while i < lists.confirmed.len() {
            if lists.confirmed[i].has_same_tag_as(winner)
                || lists.confirmed[i].shares_any_hits(winner)
            {
                let mut loser = lists.confirmed.remove(i);
                loser.flush(sink, labels)?;
                continue;
            }
            i += 1;
        }
        lists
            .unconfirmed
            .retain(|c| !c.shares_any_hits(winner));
        Ok(())
    }

    /// Flush every still-confirmed candidate and drop all hypotheses.
    pub fn finish(&mut self, labels: &LabelTable, sink: &mut dyn RunSink) -> TagFilterResult<()> {
        for lists in self.cands.values_mut() {
            lists.unconfirmed.clear();
            let mut i = 0;
            while i < lists.confirmed.len() {
                // evidence is assigned once: drop later rivals sharing the
                // winner's identity or hits before emitting
                let mut j = i + 1;
                while j < lists.confirmed.len() {
                    if lists.confirmed[j].has_same_tag_as(&lists.confirmed[i])
                        || lists.confirmed[j].shares_any_hits(&lists.confirmed[i])
                    {
                        lists.confirmed.remove(j);
                    } else {
                        j += 1;
                    }
                }
                lists.confirmed[i].flush(sink, labels)?;
                i += 1;
            }
            lists.confirmed.clear();
        }
        Ok(())
    }
}
