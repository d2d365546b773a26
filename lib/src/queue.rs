// Copyright 2024 The Seqfield Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Changeset iterator / queue (component C): walks two changesets in
//! lock-step over a common cell coordinate frame, splitting marks at
//! boundaries and ordering marks in empty regions using cell identity and,
//! failing that, a revision/local-id tie-break.
//!
//! Compose walks a changeset's *output* context against the next
//! changeset's *input* context; rebase walks `change` and `base` both over
//! their shared *input* context. Both uses share this queue by selecting
//! which polarity (pre- or post-cell population) each side is aligned on.

use std::collections::VecDeque;

use crate::changeset::Changeset;
use crate::mark::{split_mark, Mark, MarkData, Tiebreak};

/// Which side of a mark (pre- or post-application) determines whether the
/// cells it spans are "populated" for the purposes of alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Polarity {
    Pre,
    Post,
}

impl Polarity {
    fn populated<C>(self, mark: &Mark<C>) -> bool {
        match self {
            Polarity::Pre => mark.is_populated_pre(),
            Polarity::Post => mark.is_populated_post(),
        }
    }
}

/// One step of the lock-step walk.
#[derive(Debug)]
pub enum Step<C> {
    /// Both sides cover the same `count` of cells at this position: either
    /// a populated-region step (both sides populated, aligned by count) or
    /// a paired empty-region step (both sides name the same cell).
    Aligned {
        left: MarkData<C>,
        right: MarkData<C>,
    },
    /// Only the left changeset has a mark at this position; the right side
    /// has no corresponding cell here (an empty-region mark unmatched by
    /// the right changeset).
    LeftOnly(MarkData<C>),
    /// Symmetric to `LeftOnly`.
    RightOnly(MarkData<C>),
}

pub struct MarkQueue<C> {
    left: VecDeque<MarkData<C>>,
    right: VecDeque<MarkData<C>>,
    left_polarity: Polarity,
    right_polarity: Polarity,
}

impl<C: Clone> MarkQueue<C> {
    pub fn new(left: Changeset<C>, right: Changeset<C>, left_polarity: Polarity, right_polarity: Polarity) -> Self {
        MarkQueue {
            left: left.marks.into(),
            right: right.marks.into(),
            left_polarity,
            right_polarity,
        }
    }

    /// Returns the next aligned step, or `None` once both sides are
    /// exhausted.
    pub fn next_step(&mut self) -> Option<Step<C>> {
        loop {
            match (self.left.front(), self.right.front()) {
                (None, None) => return None,
                (Some(_), None) => return Some(Step::LeftOnly(self.left.pop_front().unwrap())),
                (None, Some(_)) => return Some(Step::RightOnly(self.right.pop_front().unwrap())),
                (Some(l), Some(r)) => {
                    let l_pop = self.left_polarity.populated(&l.mark);
                    let r_pop = self.right_polarity.populated(&r.mark);
                    match (l_pop, r_pop) {
                        (true, true) => return Some(self.take_aligned_front_by_count()),
                        (true, false) => return Some(Step::RightOnly(self.right.pop_front().unwrap())),
                        (false, true) => return Some(Step::LeftOnly(self.left.pop_front().unwrap())),
                        (false, false) => {
                            if let Some(step) = self.try_pair_empty_cells() {
                                return Some(step);
                            }
                            // Unmatched: decide which side's mark is ordered first.
                            if self.left_goes_first() {
                                return Some(Step::LeftOnly(self.left.pop_front().unwrap()));
                            } else {
                                return Some(Step::RightOnly(self.right.pop_front().unwrap()));
                            }
                        }
                    }
                }
            }
        }
    }

    fn try_pair_empty_cells(&mut self) -> Option<Step<C>> {
        let l = self.left.front()?;
        let r = self.right.front()?;
        let lc = l.mark.cell_id()?;
        let rc = r.mark.cell_id()?;
        if !lc.same_cell(&rc) {
            return None;
        }
        Some(self.take_aligned_front_by_count())
    }

    fn take_aligned_front_by_count(&mut self) -> Step<C> {
        let n = {
            let l = self.left.front().unwrap();
            let r = self.right.front().unwrap();
            l.count.min(r.count)
        };
        let left = take_front_n(&mut self.left, n);
        let right = take_front_n(&mut self.right, n);
        Step::Aligned { left, right }
    }

    /// Tie-break for unmatched empty-region marks: a fresh `Insert` defers
    /// to its own tiebreak policy (spec §4.F); anything else (a tombstone
    /// for an already-emptied cell, say) orders by `(revision, local_id)`
    /// ascending (spec §4.C step 3).
    fn left_goes_first(&self) -> bool {
        let l = self.left.front().unwrap();
        let r = self.right.front().unwrap();
        if let Mark::Insert { tiebreak, .. } = &l.mark {
            return matches!(tiebreak, Tiebreak::Left);
        }
        if let Mark::Insert { tiebreak, .. } = &r.mark {
            return matches!(tiebreak, Tiebreak::Right);
        }
        match (l.mark.cell_id(), r.mark.cell_id()) {
            (Some(lc), Some(rc)) => (lc.revision, lc.local_id) <= (rc.revision, rc.local_id),
            _ => true,
        }
    }
}

fn take_front_n<C: Clone>(q: &mut VecDeque<MarkData<C>>, n: u32) -> MarkData<C> {
    let front = q.front().unwrap();
    if front.count == n {
        q.pop_front().unwrap()
    } else {
        let (first, rest) = split_mark(front, n);
        q.pop_front();
        q.push_front(rest);
        first
    }
}
