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

//! Replace revisions (component G): rewrites every occurrence of a set of
//! revision tags to one output tag, used at commit time to inline a
//! changeset's placeholder revision into its final assigned one (spec
//! §4.G).

use std::collections::HashSet;

use tracing::instrument;

use crate::changeset::Changeset;
use crate::id::RevisionTag;
use crate::mark::{AttachMark, DetachMark, Mark, MarkData, MoveIdOverride};

fn rewrite(rev: Option<RevisionTag>, inputs: &HashSet<Option<RevisionTag>>, output: Option<RevisionTag>) -> Option<RevisionTag> {
    if inputs.contains(&rev) {
        output
    } else {
        rev
    }
}

fn rewrite_cell(
    cell: crate::id::CellId,
    inputs: &HashSet<Option<RevisionTag>>,
    output: Option<RevisionTag>,
) -> crate::id::CellId {
    crate::id::CellId::new(rewrite(cell.revision, inputs, output), cell.local_id)
}

fn rewrite_id_override(
    id_override: &Option<MoveIdOverride>,
    inputs: &HashSet<Option<RevisionTag>>,
    output: Option<RevisionTag>,
) -> Option<MoveIdOverride> {
    id_override.map(|o| MoveIdOverride {
        role: o.role,
        cell_id: rewrite_cell(o.cell_id, inputs, output),
    })
}

/// Rewrites every `revision` field inside `change` whose value is in
/// `inputs` (cell ids, a mark's own revision, move endpoints, `idOverride`
/// cell ids) to `output`. Nested child changes are left untouched: this
/// crate never inspects them, so a revision embedded inside one is the
/// child-rebaser's own concern.
#[instrument(level = "debug", skip_all, fields(inputs = inputs.len()))]
pub fn replace_revisions<C: Clone>(
    change: &Changeset<C>,
    inputs: &HashSet<Option<RevisionTag>>,
    output: Option<RevisionTag>,
) -> Changeset<C> {
    let marks = change
        .marks
        .iter()
        .map(|m| MarkData::new(
            m.count,
            rewrite(m.revision, inputs, output),
            rewrite_mark(&m.mark, inputs, output),
        ))
        .collect();
    Changeset::new(marks)
}

fn rewrite_mark<C: Clone>(mark: &Mark<C>, inputs: &HashSet<Option<RevisionTag>>, output: Option<RevisionTag>) -> Mark<C> {
    let rc = |c: crate::id::CellId| rewrite_cell(c, inputs, output);
    match mark {
        Mark::Skip => Mark::Skip,
        Mark::Tomb { cell_id } => Mark::Tomb { cell_id: rc(*cell_id) },
        Mark::Modify { changes } => Mark::Modify {
            changes: changes.clone(),
        },
        Mark::Insert {
            cell_id,
            changes,
            tiebreak,
        } => Mark::Insert {
            cell_id: rc(*cell_id),
            changes: changes.clone(),
            tiebreak: *tiebreak,
        },
        Mark::Remove { cell_id } => Mark::Remove { cell_id: rc(*cell_id) },
        Mark::Revive { cell_id, changes } => Mark::Revive {
            cell_id: rc(*cell_id),
            changes: changes.clone(),
        },
        Mark::Pin { cell_id } => Mark::Pin { cell_id: rc(*cell_id) },
        Mark::MoveOut {
            cell_id,
            final_endpoint,
            id_override,
        } => Mark::MoveOut {
            cell_id: rc(*cell_id),
            final_endpoint: final_endpoint.map(rc),
            id_override: rewrite_id_override(id_override, inputs, output),
        },
        Mark::MoveIn {
            cell_id,
            final_endpoint,
            changes,
        } => Mark::MoveIn {
            cell_id: rc(*cell_id),
            final_endpoint: final_endpoint.map(rc),
            changes: changes.clone(),
        },
        Mark::ReturnTo {
            cell_id,
            source,
            changes,
        } => Mark::ReturnTo {
            cell_id: rc(*cell_id),
            source: rc(*source),
            changes: changes.clone(),
        },
        Mark::Rename {
            old_cell_id,
            new_cell_id,
        } => Mark::Rename {
            old_cell_id: rc(*old_cell_id),
            new_cell_id: rc(*new_cell_id),
        },
        Mark::AttachAndDetach { attach, detach } => Mark::AttachAndDetach {
            attach: Box::new(rewrite_attach(attach, inputs, output)),
            detach: Box::new(rewrite_detach(detach, inputs, output)),
        },
    }
}

fn rewrite_attach(attach: &AttachMark, inputs: &HashSet<Option<RevisionTag>>, output: Option<RevisionTag>) -> AttachMark {
    let rc = |c: crate::id::CellId| rewrite_cell(c, inputs, output);
    match attach {
        AttachMark::Insert { cell_id, tiebreak } => AttachMark::Insert {
            cell_id: rc(*cell_id),
            tiebreak: *tiebreak,
        },
        AttachMark::Revive { cell_id } => AttachMark::Revive { cell_id: rc(*cell_id) },
        AttachMark::MoveIn { cell_id, final_endpoint } => AttachMark::MoveIn {
            cell_id: rc(*cell_id),
            final_endpoint: final_endpoint.map(rc),
        },
        AttachMark::ReturnTo { cell_id, source } => AttachMark::ReturnTo {
            cell_id: rc(*cell_id),
            source: rc(*source),
        },
    }
}

fn rewrite_detach(detach: &DetachMark, inputs: &HashSet<Option<RevisionTag>>, output: Option<RevisionTag>) -> DetachMark {
    let rc = |c: crate::id::CellId| rewrite_cell(c, inputs, output);
    match detach {
        DetachMark::Remove { cell_id } => DetachMark::Remove { cell_id: rc(*cell_id) },
        DetachMark::MoveOut {
            cell_id,
            final_endpoint,
            id_override,
        } => DetachMark::MoveOut {
            cell_id: rc(*cell_id),
            final_endpoint: final_endpoint.map(rc),
            id_override: rewrite_id_override(id_override, inputs, output),
        },
    }
}
