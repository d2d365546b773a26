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

use seqfield::delta::{to_delta, DeltaType};
use seqfield::id::LocalId;
use seqfield::mark::{Mark, MarkData};
use seqfield::Changeset;
use testutils::{cell, TestChildChange};

fn render(c: &TestChildChange) -> serde_json::Value {
    serde_json::json!({ "delta": c.delta })
}

#[test]
fn revive_and_return_to_map_to_insert_and_move_in() {
    let cs: Changeset<TestChildChange> = Changeset::new(vec![
        MarkData::new(
            1,
            None,
            Mark::Revive {
                cell_id: cell(1, 0),
                changes: None,
            },
        ),
        MarkData::new(
            1,
            None,
            Mark::ReturnTo {
                cell_id: cell(1, 1),
                source: cell(1, 2),
                changes: None,
            },
        ),
    ]);
    let delta = to_delta(&cs, render);
    assert_eq!(delta.len(), 2);
    assert_eq!(delta[0].kind, DeltaType::Insert);
    assert_eq!(delta[1].kind, DeltaType::MoveIn);
}

#[test]
fn nested_change_content_is_rendered_through_the_caller_projection() {
    let cs: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(
        1,
        None,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 3 }),
        },
    )]);
    let delta = to_delta(&cs, render);
    assert_eq!(delta[0].content, Some(serde_json::json!({ "delta": 3 })));
}

#[test]
fn pin_and_rename_emit_nothing() {
    let cs: Changeset<TestChildChange> = Changeset::new(vec![
        MarkData::new(1, None, Mark::Pin { cell_id: cell(1, 0) }),
        MarkData::new(
            1,
            None,
            Mark::Rename {
                old_cell_id: cell(1, 1),
                new_cell_id: cell(1, 2),
            },
        ),
    ]);
    let delta = to_delta(&cs, render);
    assert!(delta.is_empty());
    let _ = LocalId(0);
}
