// SPDX-License-Identifier: MIT OR Apache-2.0

//! A single DFA state.
//!
//! States live in their graph's arena and are referenced by `StateId`
//! handles, so that many concurrent run candidates can share them without
//! ownership cycles. A state's tag set holds every registered tag still
//! consistent with the gap sequence that reached it.

use crate::core::interval::{Gap, GapRange};
use crate::core::tag::{TagId, TagIdSet};

/// Handle of a state within its graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateId(pub(crate) u32);

impl StateId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DfaState {
    depth: u32,
    tags: TagIdSet,
    /// Disjoint gap ranges, sorted by lower bound, each leading to the
    /// successor hypothesis compatible with that gap.
    edges: Vec<(GapRange, StateId)>,
    /// Upper bound of the largest outgoing range. None means no outgoing
    /// edges: a candidate sitting here cannot wait for anything and is
    /// retired by the next hit.
    max_age: Option<Gap>,
}

impl DfaState {
    pub(crate) fn new(depth: u32, tags: TagIdSet) -> Self {
        DfaState {
            depth,
            tags,
            edges: Vec::new(),
            max_age: None,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn tags(&self) -> &TagIdSet {
        &self.tags
    }

    /// Does this state represent a single, fully disambiguated tag?
    pub fn is_unique(&self) -> bool {
        self.tags.len() == 1
    }

    /// The tag this state resolves to, when unique.
    pub fn tag_id(&self) -> Option<TagId> {
        if self.is_unique() {
            self.tags.iter().next().copied()
        } else {
            None
        }
    }

    /// Follow the edge containing `gap`, if any. Pure lookup.
    pub fn next(&self, gap: Gap) -> Option<StateId> {
        let idx = self.edges.partition_point(|(r, _)| r.lo() <= gap);
        for (range, succ) in self.edges[..idx].iter().rev() {
            if range.contains(gap) {
                return Some(*succ);
            }
            if range.entirely_below(gap) {
                break;
            }
        }
        None
    }

    /// Longest time a candidate may sit in this state and still have some
    /// edge able to accept a future hit.
    pub fn max_age(&self) -> Option<Gap> {
        self.max_age
    }

    pub fn edges(&self) -> &[(GapRange, StateId)] {
        &self.edges
    }

    pub(crate) fn set_edges(&mut self, edges: Vec<(GapRange, StateId)>) {
        self.max_age = edges
            .iter()
            .map(|(r, _)| r.hi())
            .fold(None, |acc: Option<Gap>, hi| {
                Some(acc.map_or(hi, |a| a.max(hi)))
            });
        self.edges = edges;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tagset(ids: &[u32]) -> TagIdSet {
        ids.iter().map(|&i| TagId(i)).collect()
    }

    #[test]
    fn test_next_follows_containing_edge() {
        let mut s = DfaState::new(0, tagset(&[1, 2]));
        s.set_edges(vec![
            (GapRange::closed(4.98, 5.02), StateId(1)),
            (GapRange::closed(6.98, 7.02), StateId(2)),
        ]);
        assert_eq!(s.next(5.0), Some(StateId(1)));
        assert_eq!(s.next(7.02), Some(StateId(2)));
        assert_eq!(s.next(6.0), None);
        assert_eq!(s.next(8.0), None);
    }

    #[test]
    fn test_max_age_is_largest_upper_bound() {
        let mut s = DfaState::new(0, tagset(&[1, 2]));
        s.set_edges(vec![
            (GapRange::closed(4.98, 5.02), StateId(1)),
            (GapRange::closed(6.98, 7.02), StateId(2)),
        ]);
        assert_eq!(s.max_age(), Some(7.02));
    }

    #[test]
    fn test_edgeless_state_has_no_max_age() {
        let s = DfaState::new(3, tagset(&[1]));
        assert_eq!(s.max_age(), None);
        assert_eq!(s.next(5.0), None);
    }

    #[test]
    fn test_unique_state_reports_its_tag() {
        let s = DfaState::new(2, tagset(&[9]));
        assert!(s.is_unique());
        assert_eq!(s.tag_id(), Some(TagId(9)));
        let multi = DfaState::new(1, tagset(&[1, 2]));
        assert_eq!(multi.tag_id(), None);
    }
}
