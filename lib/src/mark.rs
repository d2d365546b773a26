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

//! Mark model (component B): the tagged union of marks that make up a
//! changeset, plus the `split_mark`/`try_merge_mark` helper pair.

use serde::{Deserialize, Serialize};

use crate::id::CellId;
use crate::id::RevisionTag;

/// Per-insertion tiebreak policy used when rebasing an Insert over a
/// concurrent Insert at the same index (spec §4.F). Default is `Left`: "new
/// insert orders before the concurrent base insert".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tiebreak {
    Left,
    Right,
}

impl Default for Tiebreak {
    fn default() -> Self {
        Tiebreak::Left
    }
}

/// The two historical roles of a move's `idOverride` field (spec §9 Open
/// Question). This crate picks `Redetach` (see DESIGN.md): the override
/// names the id that a chained detach should use so that a later rebase can
/// still recognize the move as a single logical operation across transient
/// hops, rather than naming an "unattach" counterpart cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveIdOverrideRole {
    Redetach,
    Unattach,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveIdOverride {
    pub role: MoveIdOverrideRole,
    pub cell_id: CellId,
}

/// The inner attach half of a transient `AttachAndDetach` mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AttachMark {
    Insert {
        cell_id: CellId,
        tiebreak: Tiebreak,
    },
    Revive {
        cell_id: CellId,
    },
    MoveIn {
        cell_id: CellId,
        final_endpoint: Option<CellId>,
    },
    ReturnTo {
        cell_id: CellId,
        source: CellId,
    },
}

/// The inner detach half of a transient `AttachAndDetach` mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DetachMark {
    Remove {
        cell_id: CellId,
    },
    MoveOut {
        cell_id: CellId,
        final_endpoint: Option<CellId>,
        id_override: Option<MoveIdOverride>,
    },
}

/// A single mark variant, generic over the opaque nested child-change type
/// `C`. `C` is never inspected by this crate; it is only ever handed to an
/// injected [`crate::child_rebaser::ChildRebaser`].
///
/// Tagged `#[serde(tag = "type")]` on the wire (spec §6), with each
/// variant's own fields renamed to `camelCase`; `MarkData` flattens this
/// alongside its own `count`/`revision` siblings to produce the single
/// `{type, count, cellId?, ...}` object the wire form calls for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Mark<C> {
    /// Populated -> populated. Advances `count` populated cells.
    Skip,
    /// Empty -> empty. Placeholder for cells known to be empty, used for
    /// ordering.
    #[serde(rename_all = "camelCase")]
    Tomb { cell_id: CellId },
    /// Populated -> populated. Nested edit to the node in the cell.
    Modify { changes: Option<C> },
    /// Empty -> populated. Creates nodes in empty cells.
    #[serde(rename_all = "camelCase")]
    Insert {
        cell_id: CellId,
        changes: Option<C>,
        tiebreak: Tiebreak,
    },
    /// Populated -> empty. Detaches nodes, naming the cells they land in.
    #[serde(rename_all = "camelCase")]
    Remove { cell_id: CellId },
    /// Empty -> populated. Restores previously detached nodes.
    #[serde(rename_all = "camelCase")]
    Revive { cell_id: CellId, changes: Option<C> },
    /// Populated -> populated. Asserts "this populated cell is `cell_id`";
    /// a no-op when the cell is populated, equivalent to Revive when the
    /// cell had been emptied by a concurrent edit.
    #[serde(rename_all = "camelCase")]
    Pin { cell_id: CellId },
    /// Populated -> empty. Source of a move.
    #[serde(rename_all = "camelCase")]
    MoveOut {
        cell_id: CellId,
        final_endpoint: Option<CellId>,
        id_override: Option<MoveIdOverride>,
    },
    /// Empty -> populated. Destination of a move.
    #[serde(rename_all = "camelCase")]
    MoveIn {
        cell_id: CellId,
        final_endpoint: Option<CellId>,
        changes: Option<C>,
    },
    /// Empty -> populated. Destination of a return-to-origin move.
    #[serde(rename_all = "camelCase")]
    ReturnTo {
        cell_id: CellId,
        source: CellId,
        changes: Option<C>,
    },
    /// Empty -> empty. Relabels empty cells.
    #[serde(rename_all = "camelCase")]
    Rename { old_cell_id: CellId, new_cell_id: CellId },
    /// Empty -> empty (but cell ids are observable by concurrent edits).
    /// A node arrives and leaves atomically.
    AttachAndDetach {
        attach: Box<AttachMark>,
        detach: Box<DetachMark>,
    },
}

impl<C> Mark<C> {
    /// Whether the cells this mark spans are populated *before* it is
    /// applied.
    pub fn is_populated_pre(&self) -> bool {
        matches!(
            self,
            Mark::Skip | Mark::Modify { .. } | Mark::Remove { .. } | Mark::Pin { .. } | Mark::MoveOut { .. }
        )
    }

    /// Whether the cells this mark spans are populated *after* it is
    /// applied.
    pub fn is_populated_post(&self) -> bool {
        matches!(
            self,
            Mark::Skip
                | Mark::Modify { .. }
                | Mark::Insert { .. }
                | Mark::Revive { .. }
                | Mark::Pin { .. }
                | Mark::MoveIn { .. }
                | Mark::ReturnTo { .. }
        )
    }

    /// The cell id this mark refers to, if any. Populated-cell-only marks
    /// (`Skip`, `Modify`) carry none.
    pub fn cell_id(&self) -> Option<CellId> {
        match self {
            Mark::Skip | Mark::Modify { .. } => None,
            Mark::Tomb { cell_id }
            | Mark::Insert { cell_id, .. }
            | Mark::Remove { cell_id }
            | Mark::Revive { cell_id, .. }
            | Mark::Pin { cell_id }
            | Mark::MoveOut { cell_id, .. }
            | Mark::MoveIn { cell_id, .. }
            | Mark::ReturnTo { cell_id, .. } => Some(*cell_id),
            Mark::Rename { old_cell_id, .. } => Some(*old_cell_id),
            Mark::AttachAndDetach { detach, .. } => Some(detach_cell_id(detach)),
        }
    }

    /// A mark carrying a nested change must span exactly one cell; this is
    /// checked wherever marks are constructed or split.
    pub fn changes(&self) -> Option<&C> {
        match self {
            Mark::Modify { changes }
            | Mark::Insert { changes, .. }
            | Mark::Revive { changes, .. }
            | Mark::MoveIn { changes, .. }
            | Mark::ReturnTo { changes, .. } => changes.as_ref(),
            _ => None,
        }
    }

    fn offset_cell_ids(&self, n: u32) -> Mark<C>
    where
        C: Clone,
    {
        match self {
            Mark::Skip => Mark::Skip,
            Mark::Tomb { cell_id } => Mark::Tomb {
                cell_id: cell_id.offset(n),
            },
            Mark::Modify { changes } => Mark::Modify {
                changes: changes.clone(),
            },
            Mark::Insert {
                cell_id,
                changes,
                tiebreak,
            } => Mark::Insert {
                cell_id: cell_id.offset(n),
                changes: changes.clone(),
                tiebreak: *tiebreak,
            },
            Mark::Remove { cell_id } => Mark::Remove {
                cell_id: cell_id.offset(n),
            },
            Mark::Revive { cell_id, changes } => Mark::Revive {
                cell_id: cell_id.offset(n),
                changes: changes.clone(),
            },
            Mark::Pin { cell_id } => Mark::Pin {
                cell_id: cell_id.offset(n),
            },
            Mark::MoveOut {
                cell_id,
                final_endpoint,
                id_override,
            } => Mark::MoveOut {
                cell_id: cell_id.offset(n),
                final_endpoint: *final_endpoint,
                id_override: id_override.clone(),
            },
            Mark::MoveIn {
                cell_id,
                final_endpoint,
                changes,
            } => Mark::MoveIn {
                cell_id: cell_id.offset(n),
                final_endpoint: *final_endpoint,
                changes: changes.clone(),
            },
            Mark::ReturnTo {
                cell_id,
                source,
                changes,
            } => Mark::ReturnTo {
                cell_id: cell_id.offset(n),
                source: source.offset(n),
                changes: changes.clone(),
            },
            Mark::Rename {
                old_cell_id,
                new_cell_id,
            } => Mark::Rename {
                old_cell_id: old_cell_id.offset(n),
                new_cell_id: new_cell_id.offset(n),
            },
            Mark::AttachAndDetach { attach, detach } => Mark::AttachAndDetach {
                attach: Box::new(offset_attach(attach, n)),
                detach: Box::new(offset_detach(detach, n)),
            },
        }
    }
}

fn detach_cell_id(detach: &DetachMark) -> CellId {
    match detach {
        DetachMark::Remove { cell_id } => *cell_id,
        DetachMark::MoveOut { cell_id, .. } => *cell_id,
    }
}

fn offset_attach(attach: &AttachMark, n: u32) -> AttachMark {
    match attach {
        AttachMark::Insert { cell_id, tiebreak } => AttachMark::Insert {
            cell_id: cell_id.offset(n),
            tiebreak: *tiebreak,
        },
        AttachMark::Revive { cell_id } => AttachMark::Revive {
            cell_id: cell_id.offset(n),
        },
        AttachMark::MoveIn {
            cell_id,
            final_endpoint,
        } => AttachMark::MoveIn {
            cell_id: cell_id.offset(n),
            final_endpoint: *final_endpoint,
        },
        AttachMark::ReturnTo { cell_id, source } => AttachMark::ReturnTo {
            cell_id: cell_id.offset(n),
            source: source.offset(n),
        },
    }
}

fn offset_detach(detach: &DetachMark, n: u32) -> DetachMark {
    match detach {
        DetachMark::Remove { cell_id } => DetachMark::Remove {
            cell_id: cell_id.offset(n),
        },
        DetachMark::MoveOut {
            cell_id,
            final_endpoint,
            id_override,
        } => DetachMark::MoveOut {
            cell_id: cell_id.offset(n),
            final_endpoint: *final_endpoint,
            id_override: id_override.clone(),
        },
    }
}

/// A mark together with the cell count it spans and the revision it is
/// tagged with (inherited from the containing changeset when `None`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkData<C> {
    pub count: u32,
    pub revision: Option<RevisionTag>,
    pub mark: Mark<C>,
}

impl<C> MarkData<C> {
    pub fn new(count: u32, revision: Option<RevisionTag>, mark: Mark<C>) -> Self {
        assert!(count > 0, "a mark must span at least one cell");
        debug_assert!(
            count == 1 || mark.changes().is_none(),
            "a mark spanning more than one cell cannot carry a nested change"
        );
        MarkData {
            count,
            revision,
            mark,
        }
    }
}

/// Wire shape of an explicit (non-shorthand) mark entry: `count`/`revision`
/// flattened alongside `Mark`'s own internally-tagged fields, matching
/// spec §6's `{type, count, cellId?, changes?, revision?, ...}` object.
#[derive(Serialize)]
struct ExplicitMarkRef<'a, C> {
    count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<RevisionTag>,
    #[serde(flatten)]
    mark: &'a Mark<C>,
}

#[derive(Deserialize)]
struct ExplicitMarkOwned<C> {
    count: u32,
    #[serde(default)]
    revision: Option<RevisionTag>,
    #[serde(flatten)]
    mark: Mark<C>,
}

impl<C: Serialize> Serialize for MarkData<C> {
    /// A bare positive integer is shorthand for a Skip of that count (spec
    /// §6); every other mark encodes as the explicit tagged object.
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.revision.is_none() && matches!(self.mark, Mark::Skip) {
            serializer.serialize_u32(self.count)
        } else {
            ExplicitMarkRef {
                count: self.count,
                revision: self.revision,
                mark: &self.mark,
            }
            .serialize(serializer)
        }
    }
}

impl<'de, C: Deserialize<'de>> Deserialize<'de> for MarkData<C> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Wire<C> {
            SkipShorthand(u32),
            Explicit(ExplicitMarkOwned<C>),
        }
        let (count, revision, mark) = match Wire::<C>::deserialize(deserializer)? {
            Wire::SkipShorthand(count) => (count, None, Mark::Skip),
            Wire::Explicit(e) => (e.count, e.revision, e.mark),
        };
        if count == 0 {
            return Err(serde::de::Error::custom("a mark must span at least one cell"));
        }
        Ok(MarkData {
            count,
            revision,
            mark,
        })
    }
}

/// Splits `m` into `(first, rest)` where `first.count == n` and
/// `rest.count == m.count - n`. All id fields in `rest` are shifted by `n`.
/// Requires `1 <= n < m.count`.
pub fn split_mark<C: Clone>(m: &MarkData<C>, n: u32) -> (MarkData<C>, MarkData<C>) {
    assert!(n >= 1 && n < m.count, "split point out of range");
    let first = MarkData {
        count: n,
        revision: m.revision,
        mark: m.mark.clone(),
    };
    let rest = MarkData {
        count: m.count - n,
        revision: m.revision,
        mark: m.mark.offset_cell_ids(n),
    };
    (first, rest)
}

/// Returns `Some(merged)` iff `a` and `b` are compatible (same variant and
/// fields modulo count, and contiguous cell ids), with
/// `merged.count == a.count + b.count`. Forms an inverse pair with
/// [`split_mark`] (spec property 8.1).
pub fn try_merge_mark<C: Clone + PartialEq>(
    a: &MarkData<C>,
    b: &MarkData<C>,
) -> Option<MarkData<C>> {
    if a.revision != b.revision {
        return None;
    }
    let merged_mark = try_merge_variant(&a.mark, &b.mark, a.count)?;
    Some(MarkData {
        count: a.count + b.count,
        revision: a.revision,
        mark: merged_mark,
    })
}

fn contiguous(a: &CellId, b: &CellId, offset: u32) -> bool {
    a.revision == b.revision && b.local_id.0 == a.local_id.0 + offset
}

fn try_merge_variant<C: Clone + PartialEq>(a: &Mark<C>, b: &Mark<C>, a_count: u32) -> Option<Mark<C>> {
    use Mark::*;
    match (a, b) {
        (Skip, Skip) => Some(Skip),
        (Tomb { cell_id: ca }, Tomb { cell_id: cb }) if contiguous(ca, cb, a_count) => {
            Some(Tomb { cell_id: *ca })
        }
        (Modify { changes: None }, Modify { changes: None }) => Some(Modify { changes: None }),
        (
            Insert {
                cell_id: ca,
                changes: None,
                tiebreak: ta,
            },
            Insert {
                cell_id: cb,
                changes: None,
                tiebreak: tb,
            },
        ) if contiguous(ca, cb, a_count) && ta == tb => Some(Insert {
            cell_id: *ca,
            changes: None,
            tiebreak: *ta,
        }),
        (Remove { cell_id: ca }, Remove { cell_id: cb }) if contiguous(ca, cb, a_count) => {
            Some(Remove { cell_id: *ca })
        }
        (
            Revive {
                cell_id: ca,
                changes: None,
            },
            Revive {
                cell_id: cb,
                changes: None,
            },
        ) if contiguous(ca, cb, a_count) => Some(Revive {
            cell_id: *ca,
            changes: None,
        }),
        (Pin { cell_id: ca }, Pin { cell_id: cb }) if contiguous(ca, cb, a_count) => {
            Some(Pin { cell_id: *ca })
        }
        (
            MoveOut {
                cell_id: ca,
                final_endpoint: None,
                id_override: None,
            },
            MoveOut {
                cell_id: cb,
                final_endpoint: None,
                id_override: None,
            },
        ) if contiguous(ca, cb, a_count) => Some(MoveOut {
            cell_id: *ca,
            final_endpoint: None,
            id_override: None,
        }),
        (
            MoveIn {
                cell_id: ca,
                final_endpoint: None,
                changes: None,
            },
            MoveIn {
                cell_id: cb,
                final_endpoint: None,
                changes: None,
            },
        ) if contiguous(ca, cb, a_count) => Some(MoveIn {
            cell_id: *ca,
            final_endpoint: None,
            changes: None,
        }),
        (
            ReturnTo {
                cell_id: ca,
                source: sa,
                changes: None,
            },
            ReturnTo {
                cell_id: cb,
                source: sb,
                changes: None,
            },
        ) if contiguous(ca, cb, a_count) && contiguous(sa, sb, a_count) => Some(ReturnTo {
            cell_id: *ca,
            source: *sa,
            changes: None,
        }),
        (
            Rename {
                old_cell_id: oa,
                new_cell_id: na,
            },
            Rename {
                old_cell_id: ob,
                new_cell_id: nb,
            },
        ) if contiguous(oa, ob, a_count) && contiguous(na, nb, a_count) => Some(Rename {
            old_cell_id: *oa,
            new_cell_id: *na,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(id: u32) -> CellId {
        CellId::new(Some(RevisionTag::new(1)), crate::id::LocalId(id))
    }

    #[test]
    fn split_then_merge_round_trips_remove() {
        let m: MarkData<()> = MarkData::new(5, None, Mark::Remove { cell_id: cell(0) });
        for n in 1..5 {
            let (first, rest) = split_mark(&m, n);
            let merged = try_merge_mark(&first, &rest).expect("should remerge");
            assert_eq!(merged, m);
        }
    }

    #[test]
    fn split_then_merge_round_trips_skip() {
        let m: MarkData<()> = MarkData::new(3, None, Mark::Skip);
        let (first, rest) = split_mark(&m, 1);
        assert_eq!(try_merge_mark(&first, &rest), Some(m));
    }

    #[test]
    fn non_contiguous_cells_do_not_merge() {
        let a: MarkData<()> = MarkData::new(1, None, Mark::Remove { cell_id: cell(0) });
        let b: MarkData<()> = MarkData::new(1, None, Mark::Remove { cell_id: cell(5) });
        assert_eq!(try_merge_mark(&a, &b), None);
    }
}
