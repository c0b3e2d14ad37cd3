// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interval map over burst gaps.
//!
//! A gap is the elapsed time between two accepted hits. DFA construction
//! needs to associate closed gap ranges `[k*BI - slop, k*BI + slop]` with
//! sets of tag ids, where overlapping ranges union their payloads: two tags
//! whose valid-gap windows overlap are still indistinguishable over that
//! stretch and must land in the same successor hypothesis.
//!
//! `IntervalMap::build` decomposes a batch of closed input intervals into
//! disjoint segments with exact open/closed endpoints, so that membership at
//! every point equals the union of all covering inputs. Coverage of each
//! elementary piece is decided by comparing bounds, never by probing a
//! floating-point midpoint.

use std::collections::BTreeSet;

/// Elapsed time between two bursts, in seconds.
pub type Gap = f64;

/// A contiguous range of gap values with explicit endpoint closure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapRange {
    lo: Gap,
    hi: Gap,
    lo_closed: bool,
    hi_closed: bool,
}

impl GapRange {
    /// Closed range `[lo, hi]`. Degenerate single-point ranges are allowed.
    pub fn closed(lo: Gap, hi: Gap) -> Self {
        debug_assert!(lo <= hi);
        GapRange {
            lo,
            hi,
            lo_closed: true,
            hi_closed: true,
        }
    }

    pub fn lo(&self) -> Gap {
        self.lo
    }

    /// Upper bound of the range; used for state max-age regardless of
    /// whether the endpoint itself is included.
    pub fn hi(&self) -> Gap {
        self.hi
    }

    pub fn contains(&self, g: Gap) -> bool {
        let above_lo = g > self.lo || (self.lo_closed && g == self.lo);
        let below_hi = g < self.hi || (self.hi_closed && g == self.hi);
        above_lo && below_hi
    }

    /// True when every point of the range lies strictly below `g`.
    pub(crate) fn entirely_below(&self, g: Gap) -> bool {
        self.hi < g || (!self.hi_closed && self.hi == g)
    }

    /// Whether `other` starts exactly where this range stops, with no point
    /// between and no point shared.
    fn abuts(&self, other: &GapRange) -> bool {
        self.hi == other.lo && (self.hi_closed != other.lo_closed)
    }
}

/// Disjoint gap segments, each carrying the set of payloads whose input
/// intervals cover it. Segments are sorted by lower bound.
#[derive(Debug, Clone, PartialEq)]
pub struct IntervalMap<T: Ord + Clone> {
    segments: Vec<(GapRange, BTreeSet<T>)>,
}

impl<T: Ord + Clone> IntervalMap<T> {
    /// Decompose closed input intervals `[lo, hi] -> payload` into disjoint
    /// segments with unioned payload sets.
    pub fn build(entries: &[(Gap, Gap, T)]) -> Self {
        // Every endpoint of an input interval becomes a cut point. The
        // elementary pieces are the cut points themselves and the open
        // spans between consecutive cut points.
        let mut bounds: Vec<Gap> = Vec::with_capacity(entries.len() * 2);
        for &(lo, hi, _) in entries {
            debug_assert!(lo <= hi);
            bounds.push(lo);
            bounds.push(hi);
        }
        bounds.sort_by(f64::total_cmp);
        bounds.dedup();

        let mut segments: Vec<(GapRange, BTreeSet<T>)> = Vec::new();
        let mut push = |range: GapRange, payload: BTreeSet<T>| {
            if payload.is_empty() {
                return;
            }
            if let Some((last_range, last_payload)) = segments.last_mut() {
                if last_range.abuts(&range) && *last_payload == payload {
                    last_range.hi = range.hi;
                    last_range.hi_closed = range.hi_closed;
                    return;
                }
            }
            segments.push((range, payload));
        };

        for (i, &v) in bounds.iter().enumerate() {
            // the cut point itself
            let at_point: BTreeSet<T> = entries
                .iter()
                .filter(|&&(lo, hi, _)| lo <= v && v <= hi)
                .map(|(_, _, t)| t.clone())
                .collect();
            push(GapRange::closed(v, v), at_point);

            // the open span up to the next cut point; a closed input covers
            // it exactly when it covers both endpoints
            if let Some(&next) = bounds.get(i + 1) {
                let between: BTreeSet<T> = entries
                    .iter()
                    .filter(|&&(lo, hi, _)| lo <= v && next <= hi)
                    .map(|(_, _, t)| t.clone())
                    .collect();
                push(
                    GapRange {
                        lo: v,
                        hi: next,
                        lo_closed: false,
                        hi_closed: false,
                    },
                    between,
                );
            }
        }

        IntervalMap { segments }
    }

    /// Payload set covering `g`, or None when no segment contains it.
    pub fn lookup(&self, g: Gap) -> Option<&BTreeSet<T>> {
        let idx = self.segments.partition_point(|(r, _)| r.lo <= g);
        for (range, payload) in self.segments[..idx].iter().rev() {
            if range.contains(g) {
                return Some(payload);
            }
            if range.entirely_below(g) {
                break;
            }
        }
        None
    }

    pub fn segments(&self) -> &[(GapRange, BTreeSet<T>)] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
