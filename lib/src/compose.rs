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

//! Compose (component D): fuses a sequence of changesets into one
//! equivalent changeset (spec §4.D).

use tracing::instrument;

use crate::changeset::{Changeset, TaggedChange};
use crate::child_rebaser::{compose_opt, ChildRebaser};
use crate::mark::{Mark, MarkData};
use crate::queue::{MarkQueue, Polarity, Step};

/// Fuses `changes` into one changeset that applies to the input context of
/// the first change and produces the output context of the last.
/// Associative (spec property 8.6): reduced pairwise, left to right.
#[instrument(level = "debug", skip_all, fields(count = changes.len()))]
pub fn compose<C: Clone>(
    changes: &[TaggedChange<C>],
    rebaser: &dyn ChildRebaser<C>,
) -> Changeset<C> {
    let mut iter = changes.iter();
    let Some(first) = iter.next() else {
        return Changeset::empty();
    };
    let mut acc = first.change.clone();
    for next in iter {
        acc = compose_pair(acc, next.change.clone(), rebaser);
    }
    acc.normalize()
}

/// Composes two changesets where `a`'s output context equals `b`'s input
/// context.
fn compose_pair<C: Clone>(a: Changeset<C>, b: Changeset<C>, rebaser: &dyn ChildRebaser<C>) -> Changeset<C> {
    debug_assert_eq!(
        a.output_length(),
        b.input_length(),
        "compose requires a's output context to equal b's input context"
    );
    let mut queue = MarkQueue::new(a, b, Polarity::Post, Polarity::Pre);
    let mut out = Vec::new();
    while let Some(step) = queue.next_step() {
        match step {
            Step::Aligned { left, right } => {
                let revision = right.revision.or(left.revision);
                let mark = combine_mark_kind(&left.mark, &right.mark, rebaser);
                out.push(MarkData::new(left.count, revision, mark));
            }
            Step::LeftOnly(m) => out.push(m),
            Step::RightOnly(m) => out.push(m),
        }
    }
    Changeset::new(out)
}

/// Chooses the logical "final endpoint" a chained move mark should carry
/// forward: the earliest-assigned endpoint if one is already known,
/// otherwise the new hop's own destination (spec §3.2 vestigial endpoint).
pub(crate) fn chain_final_endpoint(
    existing: Option<crate::id::CellId>,
    next_final: Option<crate::id::CellId>,
    next_cell: crate::id::CellId,
) -> Option<crate::id::CellId> {
    existing.or(next_final).or(Some(next_cell))
}

fn combine_mark_kind<C: Clone>(a: &Mark<C>, b: &Mark<C>, rebaser: &dyn ChildRebaser<C>) -> Mark<C> {
    use Mark::*;
    match (a, b) {
        (Skip, _) => b.clone(),
        (_, Skip) => a.clone(),

        // X ∘ Modify(delta): fold the nested change into whatever attach
        // mark produced the populated cell.
        (Modify { changes }, Modify { changes: delta }) => Modify {
            changes: compose_opt(rebaser, changes.as_ref(), delta.as_ref()),
        },
        (Insert { cell_id, changes, tiebreak }, Modify { changes: delta }) => Insert {
            cell_id: *cell_id,
            changes: compose_opt(rebaser, changes.as_ref(), delta.as_ref()),
            tiebreak: *tiebreak,
        },
        (Revive { cell_id, changes }, Modify { changes: delta }) => Revive {
            cell_id: *cell_id,
            changes: compose_opt(rebaser, changes.as_ref(), delta.as_ref()),
        },
        (Pin { cell_id: _ }, Modify { changes: delta }) => Modify {
            changes: delta.clone(),
        },
        (MoveIn { cell_id, final_endpoint, changes }, Modify { changes: delta }) => MoveIn {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            changes: compose_opt(rebaser, changes.as_ref(), delta.as_ref()),
        },
        (ReturnTo { cell_id, source, changes }, Modify { changes: delta }) => ReturnTo {
            cell_id: *cell_id,
            source: *source,
            changes: compose_opt(rebaser, changes.as_ref(), delta.as_ref()),
        },

        // Pin ∘ X: a Pin is a no-op assertion over an already-populated
        // cell, so the second change's effect passes through unchanged.
        (_, Pin { .. }) => a.clone(),

        // Insert ∘ Remove (same cells): cancels to a tombstone at the
        // inserted id (spec §4.D, and the "insert then remove = empty
        // changeset" boundary case of §8).
        (Insert { cell_id, .. }, Remove { .. }) => Tomb { cell_id: *cell_id },

        // Remove ∘ Revive (undoing a detach): the cell is populated on
        // both sides with no net effect, so this degrades to a no-op.
        (Remove { .. }, Revive { .. }) => Skip,

        // MoveOut ∘ ReturnTo of the same cell (undoing a move): the node
        // never net-moved.
        (MoveOut { cell_id: ca, .. }, ReturnTo { cell_id: cb, .. }) if ca.same_cell(cb) => Skip,

        // Revive ∘ Remove (same cells): the revive is cancelled visibly —
        // a transient Remove carrying the revived cell id (spec §4.D).
        (Revive { cell_id, .. }, Remove { .. }) => Remove { cell_id: *cell_id },

        // Pin ∘ Remove: the pinned cell is detached.
        (Pin { cell_id }, Remove { .. }) => Remove { cell_id: *cell_id },

        // MoveIn/ReturnTo ∘ Remove: the node that just arrived via a move
        // leaves again through a new, chained detach point.
        (MoveIn { cell_id, final_endpoint, .. }, Remove { .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: None,
        },
        (ReturnTo { cell_id, .. }, Remove { .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: None,
            id_override: None,
        },

        // Remove (as a's post-empty... not reachable here: a is always
        // post-populated in the aligned-populated branch) — unreachable,
        // Remove only appears in `b`'s position within this branch.

        // Attach ∘ MoveOut: the node is moved back out, chaining the
        // endpoint.
        (Insert { cell_id, .. }, MoveOut { final_endpoint, id_override, .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },
        (Revive { cell_id, .. }, MoveOut { final_endpoint, id_override, .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },
        (Pin { cell_id }, MoveOut { final_endpoint, id_override, .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },
        (MoveIn { cell_id, final_endpoint: fa, .. }, MoveOut { final_endpoint: fb, id_override, .. }) => {
            MoveOut {
                cell_id: *cell_id,
                final_endpoint: chain_final_endpoint(*fa, *fb, *cell_id),
                id_override: id_override.clone(),
            }
        }
        (ReturnTo { cell_id, .. }, MoveOut { final_endpoint, id_override, .. }) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },

        // Rename is transparent: it only relabels an already-empty cell,
        // so whatever the second change does to it stands.
        (Rename { .. }, _) => b.clone(),
        (_, Rename { old_cell_id, new_cell_id }) => {
            let _ = (old_cell_id, new_cell_id);
            a.clone()
        }

        // AttachAndDetach composed with anything on either side: the
        // transient mark's outward-visible identity is its detach cell id,
        // so treat it like that detach for composition purposes.
        (AttachAndDetach { detach, .. }, other) => {
            combine_mark_kind(&detach_as_mark(detach), other, rebaser)
        }
        (other, AttachAndDetach { attach, .. }) => {
            combine_mark_kind(other, &attach_as_mark(attach), rebaser)
        }

        // No more specific rule applies: the second change's shape wins,
        // matching "Skip ∘ X = X" generalized to "no-op-on-identity ∘ X =
        // X" for combinations compose never needs to special-case.
        _ => b.clone(),
    }
}

pub(crate) fn detach_as_mark<C>(detach: &crate::mark::DetachMark) -> Mark<C> {
    match detach {
        crate::mark::DetachMark::Remove { cell_id } => Mark::Remove { cell_id: *cell_id },
        crate::mark::DetachMark::MoveOut {
            cell_id,
            final_endpoint,
            id_override,
        } => Mark::MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },
    }
}

pub(crate) fn attach_as_mark<C>(attach: &crate::mark::AttachMark) -> Mark<C> {
    match attach {
        crate::mark::AttachMark::Insert { cell_id, tiebreak } => Mark::Insert {
            cell_id: *cell_id,
            changes: None,
            tiebreak: *tiebreak,
        },
        crate::mark::AttachMark::Revive { cell_id } => Mark::Revive {
            cell_id: *cell_id,
            changes: None,
        },
        crate::mark::AttachMark::MoveIn { cell_id, final_endpoint } => Mark::MoveIn {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            changes: None,
        },
        crate::mark::AttachMark::ReturnTo { cell_id, source } => Mark::ReturnTo {
            cell_id: *cell_id,
            source: *source,
            changes: None,
        },
    }
}
