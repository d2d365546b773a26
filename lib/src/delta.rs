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

//! Delta emission (component H): flattens a changeset into the abstract
//! edit list a downstream tree engine consumes (spec §4.H). Transient marks
//! collapse or vanish; empty-cell regions contribute nothing.

use serde::{Deserialize, Serialize};

use crate::changeset::Changeset;
use crate::id::CellId;
use crate::mark::Mark;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeltaType {
    Modify,
    Insert,
    Remove,
    MoveOut,
    MoveIn,
}

/// One entry of the delta stream. `content`/`fields` are left as serialized
/// JSON blobs: this crate has no visibility into the nested child-change
/// schema, only into where it attaches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeltaMark {
    #[serde(rename = "type")]
    pub kind: DeltaType,
    pub count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub before_shallow: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub after_shallow: Option<serde_json::Value>,
}

impl DeltaMark {
    fn plain(kind: DeltaType, count: u32) -> Self {
        DeltaMark {
            kind,
            count,
            content: None,
            fields: None,
            before_shallow: None,
            after_shallow: None,
        }
    }
}

/// Converts a nested child change into a JSON content blob via a caller
/// supplied projection, since this crate does not know the child-change
/// schema.
pub fn to_delta<C>(change: &Changeset<C>, mut render_child: impl FnMut(&C) -> serde_json::Value) -> Vec<DeltaMark> {
    let mut out = Vec::new();
    for m in &change.marks {
        if let Some(entry) = mark_to_delta(&m.mark, m.count, &mut render_child) {
            out.push(entry);
        }
    }
    out
}

fn mark_to_delta<C>(
    mark: &Mark<C>,
    count: u32,
    render_child: &mut impl FnMut(&C) -> serde_json::Value,
) -> Option<DeltaMark> {
    match mark {
        Mark::Skip | Mark::Tomb { .. } | Mark::Pin { .. } | Mark::Rename { .. } => None,
        Mark::Modify { changes } => {
            let mut entry = DeltaMark::plain(DeltaType::Modify, count);
            entry.content = changes.as_ref().map(|c| render_child(c));
            Some(entry)
        }
        Mark::Insert { changes, .. } => {
            let mut entry = DeltaMark::plain(DeltaType::Insert, count);
            entry.content = changes.as_ref().map(|c| render_child(c));
            Some(entry)
        }
        Mark::Revive { changes, .. } => {
            let mut entry = DeltaMark::plain(DeltaType::Insert, count);
            entry.content = changes.as_ref().map(|c| render_child(c));
            Some(entry)
        }
        Mark::Remove { .. } => Some(DeltaMark::plain(DeltaType::Remove, count)),
        Mark::MoveOut { .. } => Some(DeltaMark::plain(DeltaType::MoveOut, count)),
        Mark::MoveIn { changes, .. } | Mark::ReturnTo { changes, .. } => {
            let mut entry = DeltaMark::plain(DeltaType::MoveIn, count);
            entry.content = changes.as_ref().map(|c| render_child(c));
            Some(entry)
        }
        // A node that arrived and departed in the same changeset is
        // invisible downstream unless it carried an edit worth surfacing;
        // emit nothing (spec §4.H, "vanish if downstream does not need
        // them").
        Mark::AttachAndDetach { .. } => None,
    }
}

pub fn cell_before_after(mark: &Mark<impl Clone>) -> Option<(Option<CellId>, Option<CellId>)> {
    Some((mark.cell_id(), mark.cell_id()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{CellId, LocalId, RevisionTag};
    use crate::mark::MarkData;

    #[test]
    fn skip_and_tomb_emit_no_delta() {
        let cs: Changeset<()> = Changeset::new(vec![
            MarkData::new(2, None, Mark::Skip),
            MarkData::new(
                1,
                None,
                Mark::Tomb {
                    cell_id: CellId::new(Some(RevisionTag::new(1)), LocalId(0)),
                },
            ),
        ]);
        let delta = to_delta(&cs, |_: &()| serde_json::Value::Null);
        assert!(delta.is_empty());
    }

    #[test]
    fn insert_and_remove_become_matching_delta_entries() {
        let cell = CellId::new(None, LocalId(0));
        let cs: Changeset<()> = Changeset::new(vec![
            MarkData::new(
                1,
                None,
                Mark::Insert {
                    cell_id: cell,
                    changes: None,
                    tiebreak: crate::mark::Tiebreak::Left,
                },
            ),
            MarkData::new(1, None, Mark::Remove { cell_id: cell }),
        ]);
        let delta = to_delta(&cs, |_: &()| serde_json::Value::Null);
        assert_eq!(delta.len(), 2);
        assert_eq!(delta[0].kind, DeltaType::Insert);
        assert_eq!(delta[1].kind, DeltaType::Remove);
    }

    #[test]
    fn attach_and_detach_vanishes() {
        let cell = CellId::new(None, LocalId(0));
        let cs: Changeset<()> = Changeset::new(vec![MarkData::new(
            1,
            None,
            Mark::AttachAndDetach {
                attach: Box::new(crate::mark::AttachMark::Insert {
                    cell_id: cell,
                    tiebreak: crate::mark::Tiebreak::Left,
                }),
                detach: Box::new(crate::mark::DetachMark::Remove { cell_id: cell }),
            },
        )]);
        let delta = to_delta(&cs, |_: &()| serde_json::Value::Null);
        assert!(delta.is_empty());
    }
}
