// SPDX-License-Identifier: MIT OR Apache-2.0

//! A live run hypothesis: one walk of a DFA graph.
//!
//! A candidate starts at the graph root with a single buffered hit and
//! advances as compatible hits arrive. While unconfirmed, the caller clones
//! it before a non-confirming accept so the "hit not taken" branch survives
//! as its own hypothesis. Once the buffer reaches the confirmation count and
//! the state has narrowed to a single tag, the candidate binds that tag and
//! its buffered hits become emittable.
//!
//! Gaps for automaton decisions are measured from the last *accepted* hit;
//! burst slop at emission time is measured from the last *emitted* hit, so
//! confirmation-buffer lag never distorts the timing judgement.

use std::collections::BTreeMap;

use crate::core::dfa::{DfaGraph, StateId};
use crate::core::error::TagFilterResult;
use crate::core::hit::{Hit, SeqNo, Timestamp};
use crate::core::labels::LabelTable;
use crate::core::output::{EmittedHit, RunSink};
use crate::core::tag::{TagId, TagRef};

#[derive(Debug, Clone)]
pub struct RunCandidate {
    state: StateId,
    /// Accepted but not yet emitted hits, in sequence order.
    hits: BTreeMap<SeqNo, Hit>,
    last_hit_ts: Timestamp,
    last_emitted_ts: Option<Timestamp>,
    confirmed: Option<TagRef>,
    run_id: u64,
    emitted: u32,
}

impl RunCandidate {
    pub fn new(run_id: u64, root: StateId, first: Hit) -> Self {
        let last_hit_ts = first.ts;
        let mut hits = BTreeMap::new();
        hits.insert(first.seq_no, first);
        RunCandidate {
            state: root,
            hits,
            last_hit_ts,
            last_emitted_ts: None,
            confirmed: None,
            run_id,
            emitted: 0,
        }
    }

    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed.is_some()
    }

    /// Identity this run resolved to; None while unconfirmed.
    pub fn tag_id(&self) -> Option<TagId> {
        self.confirmed.as_ref().map(|t| t.id)
    }

    pub fn has_same_tag_as(&self, other: &RunCandidate) -> bool {
        self.tag_id().is_some() && self.tag_id() == other.tag_id()
    }

    /// Do two candidates claim any common hit as evidence?
    pub fn shares_any_hits(&self, other: &RunCandidate) -> bool {
        let (small, large) = if self.hits.len() <= other.hits.len() {
            (&self.hits, &other.hits)
        } else {
            (&other.hits, &self.hits)
        };
        small.keys().any(|seq| large.contains_key(seq))
    }

    /// Has this candidate waited past its state's maximum age, judged by the
    /// incoming hit's own timestamp? A state with no outgoing edges cannot
    /// retain a waiting candidate at all.
    pub fn is_too_old(&self, graph: &DfaGraph, now: Timestamp) -> bool {
        match graph.state(self.state).max_age() {
            Some(age) => now - self.last_hit_ts > age,
            None => true,
        }
    }

    /// Where would this hit take the automaton? Pure lookup, no mutation.
    pub fn advance(&self, graph: &DfaGraph, hit: &Hit) -> Option<StateId> {
        graph.state(self.state).next(hit.ts - self.last_hit_ts)
    }

    /// Would accepting one more hit push this candidate to confirmation?
    /// Used by the caller to decide whether a pre-accept clone is needed.
    pub fn will_confirm_next_hit(&self, hits_to_confirm: u32) -> bool {
        !self.is_confirmed() && self.hits.len() as u32 + 1 >= hits_to_confirm
    }

    /// Apply a hit along the already-computed transition. Returns true when
    /// this acceptance confirmed the candidate's identity.
    ///
    /// A buffer that reaches the confirmation count while the state still
    /// holds several tags does not confirm; such a candidate keeps walking
    /// unconfirmed (ambiguous registrations never confirm uniquely).
    pub fn accept(
        &mut self,
        graph: &DfaGraph,
        hit: Hit,
        next_state: StateId,
        hits_to_confirm: u32,
    ) -> bool {
        self.last_hit_ts = hit.ts;
        self.hits.insert(hit.seq_no, hit);
        self.state = next_state;

        if self.confirmed.is_none() && self.hits.len() as u32 >= hits_to_confirm {
            if let Some(tag) = graph.state(self.state).tag_id().and_then(|id| graph.tag(id)) {
                self.confirmed = Some(tag.clone());
                return true;
            }
        }
        false
    }

    /// Emit all buffered hits in sequence order and clear the buffer.
    /// No-op for an unconfirmed candidate.
    pub fn flush(&mut self, sink: &mut dyn RunSink, labels: &LabelTable) -> TagFilterResult<()> {
        let Some(tag) = self.confirmed.clone() else {
            return Ok(());
        };
        let bi = tag.burst_interval;
        for (_, hit) in std::mem::take(&mut self.hits) {
            let burst_slop = match self.last_emitted_ts {
                Some(prev) => {
                    let gap = hit.ts - prev;
                    gap - (gap / bi).round() * bi
                }
                None => 0.0,
            };
            self.emitted += 1;
            self.last_emitted_ts = Some(hit.ts);
            sink.write_hit(
                &EmittedHit {
                    run_id: self.run_id,
                    tag: tag.clone(),
                    pos_in_run: self.emitted,
                    burst_slop,
                    hit,
                },
                labels,
            )?;
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn buffered(&self) -> usize {
        self.hits.len()
    }
}
