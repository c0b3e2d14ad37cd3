// SPDX-License-Identifier: MIT OR Apache-2.0

//! DFA construction for one (nominal frequency, coarse code) tag group.
//!
//! The root state holds every tag in the group. Construction proceeds
//! breadth-first by depth: each state's tag set is expanded into fuzzified
//! burst-interval multiples, unioned into an interval map, and each distinct
//! payload set becomes (or reuses) a successor state at the next depth.
//! States are deduplicated within a depth by tag-set value.
//!
//! A state stops growing once it is a singleton (already disambiguated) or
//! sits at the final depth; its edges then target its own depth, where the
//! per-depth dedup turns them into a stable self-loop for ongoing runs.
//!
//! Graphs are built once, before streaming begins, and are read-only
//! thereafter; candidates reference states by handle only.

use std::collections::HashMap;

use log::{debug, warn};

use crate::core::config::FilterParams;
use crate::core::dfa::node::{DfaState, StateId};
use crate::core::error::{TagFilterError, TagFilterResult};
use crate::core::interval::IntervalMap;
use crate::core::tag::{CoarseCode, NominalFreqKhz, TagId, TagIdSet, TagRef};

#[derive(Debug)]
pub struct DfaGraph {
    freq: NominalFreqKhz,
    code: CoarseCode,
    /// Confirmation depth: number of hits needed to confirm an identity.
    max_depth: u32,
    states: Vec<DfaState>,
    root: StateId,
    tags: HashMap<TagId, TagRef>,
}

impl DfaGraph {
    /// Build the graph for one tag group. Fails on mixed groups, invalid
    /// parameters, or (when `fail_on_ambiguity` is set) tags that remain
    /// indistinguishable at the confirmation depth.
    pub fn build(
        freq: NominalFreqKhz,
        code: CoarseCode,
        group: &[TagRef],
        params: &FilterParams,
    ) -> TagFilterResult<Self> {
        params.validate()?;
        if group.is_empty() {
            return Err(TagFilterError::graph(format!(
                "no tags supplied for code {code} at {freq}"
            )));
        }
        for tag in group {
            if tag.coarse_code() != code || tag.nominal_freq() != freq {
                return Err(TagFilterError::graph(format!(
                    "tag {} ({} at {}) does not belong to code {code} at {freq}",
                    tag.id,
                    tag.coarse_code(),
                    tag.nominal_freq()
                )));
            }
        }

        let max_depth = params.hits_to_confirm;
        let tags: HashMap<TagId, TagRef> =
            group.iter().map(|t| (t.id, t.clone())).collect();

        let root_set: TagIdSet = group.iter().map(|t| t.id).collect();
        let root = StateId(0);
        let mut states = vec![DfaState::new(0, root_set.clone())];
        let mut by_depth: Vec<HashMap<TagIdSet, StateId>> =
            vec![HashMap::new(); max_depth as usize];
        let mut worklists: Vec<Vec<StateId>> = vec![Vec::new(); max_depth as usize];
        by_depth[0].insert(root_set, root);
        worklists[0].push(root);

        for depth in 0..max_depth {
            // new states may be appended to the current depth's worklist
            // while it is being processed (self-depth growth)
            let mut i = 0;
            while i < worklists[depth as usize].len() {
                let sid = worklists[depth as usize][i];
                i += 1;

                let state_tags = states[sid.index()].tags().clone();
                let target_depth = if state_tags.len() == 1 || depth == max_depth - 1 {
                    depth
                } else {
                    depth + 1
                };
                if target_depth > depth + 1 {
                    return Err(TagFilterError::graph(format!(
                        "growth from depth {depth} requested depth {target_depth}"
                    )));
                }

                let mut entries = Vec::new();
                for &tid in &state_tags {
                    let Some(tag) = tags.get(&tid) else {
                        return Err(TagFilterError::graph(format!(
                            "state references unknown tag {tid}"
                        )));
                    };
                    for k in 1..=params.max_burst_multiple() {
                        let center = tag.burst_interval * k as f64;
                        let slop = params.slop_for_multiple(k);
                        entries.push((center - slop, center + slop, tid));
                    }
                }
                let imap = IntervalMap::build(&entries);

                let mut edges = Vec::with_capacity(imap.segments().len());
                for (range, payload) in imap.segments() {
                    let succ = match by_depth[target_depth as usize].get(payload) {
                        Some(&id) => id,
                        None => {
                            let id = StateId(states.len() as u32);
                            states.push(DfaState::new(target_depth, payload.clone()));
                            by_depth[target_depth as usize].insert(payload.clone(), id);
                            worklists[target_depth as usize].push(id);
                            id
                        }
                    };
                    edges.push((*range, succ));
                }
                states[sid.index()].set_edges(edges);
            }
        }

        let graph = DfaGraph {
            freq,
            code,
            max_depth,
            states,
            root,
            tags,
        };
        graph.check_ambiguity(params.fail_on_ambiguity)?;
        debug!(
            "built DFA for code {code} at {freq}: {} tags, {} states, depth {max_depth}",
            graph.tags.len(),
            graph.states.len()
        );
        Ok(graph)
    }

    /// Report tag sets that are still not singletons at the final depth.
    /// Such tags can never confirm uniquely with the configured parameters.
    fn check_ambiguity(&self, fatal: bool) -> TagFilterResult<()> {
        let final_depth = self.max_depth - 1;
        for state in &self.states {
            if state.depth() == final_depth && !state.is_unique() {
                let ids: Vec<TagId> = state.tags().iter().copied().collect();
                if fatal {
                    return Err(TagFilterError::AmbiguousTags {
                        freq: self.freq,
                        code: self.code,
                        depth: self.max_depth,
                        tags: ids,
                    });
                }
                warn!(
                    "tags on code {} at {} not distinguishable after {} bursts: {:?}",
                    self.code, self.freq, self.max_depth, ids
                );
            }
        }
        Ok(())
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    pub fn state(&self, id: StateId) -> &DfaState {
        &self.states[id.index()]
    }

    pub fn tag(&self, id: TagId) -> Option<&TagRef> {
        self.tags.get(&id)
    }

    pub fn code(&self) -> CoarseCode {
        self.code
    }

    pub fn freq(&self) -> NominalFreqKhz {
        self.freq
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    #[cfg(test)]
    pub(crate) fn states(&self) -> &[DfaState] {
        &self.states
    }
}
