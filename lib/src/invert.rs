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

//! Invert (component E): produces the changeset that, composed with the
//! original, cancels it out (spec §4.E, property 8.2).

use tracing::instrument;

use crate::changeset::{Changeset, TaggedChange};
use crate::child_rebaser::{ChildRebaser, InvertKind};
use crate::id::{CellId, DUMMY_INVERT_REVISION};
use crate::mark::{AttachMark, DetachMark, Mark, MarkData, MoveIdOverride};

/// Inverts every mark in `change` in place, preserving mark order: the
/// result's input context is `change`'s output context and vice versa.
#[instrument(level = "debug", skip_all)]
pub fn invert<C: Clone>(
    change: &TaggedChange<C>,
    kind: InvertKind,
    rebaser: &dyn ChildRebaser<C>,
) -> Changeset<C> {
    let marks = change
        .change
        .marks
        .iter()
        .map(|m| invert_mark_data(m, kind, rebaser))
        .collect();
    Changeset::new(marks)
}

fn invert_mark_data<C: Clone>(
    m: &MarkData<C>,
    kind: InvertKind,
    rebaser: &dyn ChildRebaser<C>,
) -> MarkData<C> {
    MarkData::new(m.count, m.revision, invert_mark(&m.mark, kind, rebaser))
}

fn invert_mark<C: Clone>(mark: &Mark<C>, kind: InvertKind, rebaser: &dyn ChildRebaser<C>) -> Mark<C> {
    match mark {
        Mark::Skip => Mark::Skip,
        Mark::Tomb { cell_id } => Mark::Tomb { cell_id: *cell_id },

        // Nested edits invert through the injected child-rebaser; the cell
        // stays populated on both sides.
        Mark::Modify { changes } => Mark::Modify {
            changes: changes.as_ref().map(|c| rebaser.invert(c, kind)),
        },

        // Insert <-> Remove: undoing a creation detaches it again, at the
        // same cell id it was created at.
        Mark::Insert { cell_id, .. } => Mark::Remove { cell_id: *cell_id },

        // Remove <-> Revive. If the removed cell carried no revision yet
        // (the removing change itself hasn't been committed), a Rollback
        // can keep the bare placeholder since it is never committed
        // separately from the change it undoes. A publishable Undo is its
        // own commit with its own eventual revision, so its Revive must not
        // share that same `None` placeholder with the original change's
        // own commit-time rewrite; it gets the dummy invert tag instead,
        // resolved by its own `replace_revisions` call once the original's
        // real revision is known (spec §4.E).
        Mark::Remove { cell_id } => Mark::Revive {
            cell_id: dummy_tag_if_undo_and_placeholder(*cell_id, kind),
            changes: None,
        },

        // Remove <-> Revive (the other direction): undoing a revival
        // detaches the node again.
        Mark::Revive { cell_id, .. } => Mark::Remove { cell_id: *cell_id },

        // Pin is self-inverse: it asserts cell identity without altering
        // population, so undoing it is the same assertion.
        Mark::Pin { cell_id } => Mark::Pin { cell_id: *cell_id },

        // MoveOut <-> ReturnTo: undoing a move away from `cell_id` sends the
        // node back to it.
        Mark::MoveOut {
            cell_id,
            final_endpoint,
            ..
        } => Mark::ReturnTo {
            cell_id: *cell_id,
            source: final_endpoint.unwrap_or(*cell_id),
            changes: None,
        },
        // MoveIn <-> MoveOut: undoing an arrival sends the node back out the
        // way it came.
        Mark::MoveIn {
            cell_id,
            final_endpoint,
            ..
        } => Mark::MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: None,
        },
        Mark::ReturnTo { cell_id, source, .. } => Mark::MoveOut {
            cell_id: *cell_id,
            final_endpoint: Some(*source),
            id_override: None,
        },

        Mark::Rename {
            old_cell_id,
            new_cell_id,
        } => Mark::Rename {
            old_cell_id: *new_cell_id,
            new_cell_id: *old_cell_id,
        },

        Mark::AttachAndDetach { attach, detach } => Mark::AttachAndDetach {
            attach: Box::new(invert_detach_to_attach(detach, kind)),
            detach: Box::new(invert_attach_to_detach(attach)),
        },
    }
}

fn dummy_tag_if_undo_and_placeholder(cell_id: CellId, kind: InvertKind) -> CellId {
    match kind {
        InvertKind::Undo if cell_id.revision.is_none() => {
            CellId::new(Some(DUMMY_INVERT_REVISION), cell_id.local_id)
        }
        _ => cell_id,
    }
}

fn invert_detach_to_attach(detach: &DetachMark, kind: InvertKind) -> AttachMark {
    match detach {
        DetachMark::Remove { cell_id } => AttachMark::Revive {
            cell_id: dummy_tag_if_undo_and_placeholder(*cell_id, kind),
        },
        DetachMark::MoveOut {
            cell_id,
            final_endpoint,
            ..
        } => AttachMark::ReturnTo {
            cell_id: *cell_id,
            source: final_endpoint.unwrap_or(*cell_id),
        },
    }
}

fn invert_attach_to_detach(attach: &AttachMark) -> DetachMark {
    match attach {
        AttachMark::Insert { cell_id, .. } => DetachMark::Remove { cell_id: *cell_id },
        AttachMark::Revive { cell_id } => DetachMark::Remove { cell_id: *cell_id },
        AttachMark::MoveIn {
            cell_id,
            final_endpoint,
        } => DetachMark::MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: None::<MoveIdOverride>,
        },
        AttachMark::ReturnTo { cell_id, source } => DetachMark::MoveOut {
            cell_id: *cell_id,
            final_endpoint: Some(*source),
            id_override: None,
        },
    }
}
