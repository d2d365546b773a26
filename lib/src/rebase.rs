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

//! Rebase (component F): transforms a change authored against one context so
//! it applies to a context that diverged from it via a concurrent base
//! change (spec §4.F).

use tracing::instrument;

use crate::changeset::Changeset;
use crate::child_rebaser::{rebase_opt, ChildRebaser};
use crate::compose::{attach_as_mark, chain_final_endpoint, detach_as_mark};
use crate::id::RevisionTag;
use crate::mark::{Mark, MarkData};
use crate::queue::{MarkQueue, Polarity, Step};

/// Context `rebase` needs beyond the two changesets themselves: which
/// revision each side is tagged under. Rebase-over-composition passes the
/// revision of the *last* changeset in the base's composition here, since
/// that is what the walk is ultimately producing output against.
#[derive(Debug, Clone, Copy, Default)]
pub struct RebaseMetadata {
    pub change_revision: Option<RevisionTag>,
    pub base_revision: Option<RevisionTag>,
}

/// Transforms `change` (authored over some input context) into an
/// equivalent changeset over `base`'s output context. `base` may itself be
/// a composition of several changesets (spec's rebase-over-composition,
/// property 8.3): the same walk handles both, since composing `base` first
/// produces exactly the changeset this function expects.
#[instrument(level = "debug", skip_all)]
pub fn rebase<C: Clone>(
    change: &Changeset<C>,
    base: &Changeset<C>,
    metadata: RebaseMetadata,
    rebaser: &dyn ChildRebaser<C>,
) -> Changeset<C> {
    let mut queue = MarkQueue::new(change.clone(), base.clone(), Polarity::Pre, Polarity::Pre);
    let mut out = Vec::new();
    while let Some(step) = queue.next_step() {
        match step {
            Step::Aligned { left, right } => {
                let mark = rebase_mark_pair(&left.mark, &right.mark, metadata, rebaser);
                out.push(MarkData::new(left.count, left.revision, mark));
            }
            // `change`'s own action at a cell base never touched.
            Step::LeftOnly(m) => out.push(m),
            // A base mark `change` never referenced: attaches become
            // inert Skips in the new frame, detaches leave a tombstone so
            // further rebases can still recognize the cell by identity.
            Step::RightOnly(m) => {
                let mark = if m.mark.is_populated_post() {
                    Mark::Skip
                } else if let Some(cell_id) = m.mark.cell_id() {
                    Mark::Tomb { cell_id }
                } else {
                    Mark::Skip
                };
                out.push(MarkData::new(m.count, m.revision, mark));
            }
        }
    }
    Changeset::new(out).normalize()
}

fn rebase_mark_pair<C: Clone>(
    c: &Mark<C>,
    b: &Mark<C>,
    metadata: RebaseMetadata,
    rebaser: &dyn ChildRebaser<C>,
) -> Mark<C> {
    use Mark::*;
    match (c, b) {
        // Base did nothing: change's own mark applies unaltered.
        (_, Skip) => c.clone(),

        (Skip, Modify { .. }) => Skip,
        (Skip, Remove { cell_id }) => Tomb { cell_id: *cell_id },
        (Skip, MoveOut { cell_id, .. }) => Tomb { cell_id: *cell_id },

        (Modify { changes }, Modify { changes: over }) => Modify {
            changes: rebase_opt(
                rebaser,
                changes.as_ref(),
                over.as_ref(),
                metadata.change_revision,
                metadata.base_revision,
            ),
        },
        // The node change wanted to edit left via a concurrent detach: the
        // edit is subsumed into the detach (spec §4.F step 2, "a Modify
        // whose cell is now the detached cell").
        (Modify { .. }, Remove { cell_id }) => Remove { cell_id: *cell_id },
        (Modify { .. }, MoveOut { cell_id, .. }) => Remove { cell_id: *cell_id },

        // Both sides detach the same cell: the overlap collapses to a
        // tombstone recording base's (earlier-applied) detach.
        (Remove { .. }, Remove { cell_id: b }) => Tomb { cell_id: *b },
        (Remove { .. }, MoveOut { cell_id: b, .. }) => Tomb { cell_id: *b },

        // A Pin asserting an already-populated cell rides over a
        // concurrent detach by becoming a revive of the detached node.
        (Pin { .. }, Remove { cell_id }) => Revive {
            cell_id: *cell_id,
            changes: None,
        },
        (Pin { .. }, MoveOut { cell_id, .. }) => Revive {
            cell_id: *cell_id,
            changes: None,
        },
        (Pin { cell_id }, Modify { .. }) => Pin { cell_id: *cell_id },

        // A move whose source was concurrently detached chains through the
        // detached cell's identity.
        (
            MoveOut {
                final_endpoint: fc,
                id_override,
                ..
            },
            Remove { cell_id: b },
        ) => MoveOut {
            cell_id: *b,
            final_endpoint: fc.or(Some(*b)),
            id_override: id_override.clone(),
        },
        (
            MoveOut {
                final_endpoint: fc,
                id_override,
                ..
            },
            MoveOut {
                cell_id: b,
                final_endpoint: fb,
                ..
            },
        ) => MoveOut {
            cell_id: *b,
            final_endpoint: chain_final_endpoint(*fc, *fb, *b),
            id_override: id_override.clone(),
        },
        (
            MoveOut {
                cell_id,
                final_endpoint,
                id_override,
            },
            Modify { .. },
        ) => MoveOut {
            cell_id: *cell_id,
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },

        // Two revives of the same cell (matched by identity): the cell is
        // already populated, so the rebased mark degrades to a no-op Pin.
        (Revive { cell_id, .. }, Revive { .. }) => Pin { cell_id: *cell_id },
        (ReturnTo { source, changes, .. }, Revive { cell_id: b, .. }) => ReturnTo {
            cell_id: *b,
            source: *source,
            changes: changes.clone(),
        },
        (Tomb { .. }, Tomb { cell_id: b }) => Tomb { cell_id: *b },
        (Rename { old_cell_id, new_cell_id }, _) => Rename {
            old_cell_id: *old_cell_id,
            new_cell_id: *new_cell_id,
        },
        (_, Rename { .. }) => c.clone(),

        (AttachAndDetach { detach, .. }, other) => {
            rebase_mark_pair(&detach_as_mark(detach), other, metadata, rebaser)
        }
        (other, AttachAndDetach { attach, .. }) => {
            rebase_mark_pair(other, &attach_as_mark(attach), metadata, rebaser)
        }

        // Unenumerated combination (e.g. a fresh Insert paired by identity
        // with something it doesn't actually conflict with): change's own
        // shape wins.
        _ => c.clone(),
    }
}
