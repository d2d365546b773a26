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

use seqfield::compose::compose;
use seqfield::id::{LocalId, RevisionTag};
use seqfield::mark::{Mark, MarkData, Tiebreak};
use seqfield::{Changeset, TaggedChange};
use testutils::{cell, placeholder_cell, TestChildChange, TestChildRebaser};

fn tagged(rev: u128, mark: Mark<TestChildChange>) -> TaggedChange<TestChildChange> {
    TaggedChange::new(Some(RevisionTag::new(rev)), Changeset::new(vec![MarkData::new(1, None, mark)]))
}

#[test]
fn insert_then_remove_is_the_empty_changeset() {
    let id = placeholder_cell(0);
    let insert = tagged(
        1,
        Mark::Insert {
            cell_id: id,
            changes: None,
            tiebreak: Tiebreak::Left,
        },
    );
    let remove = tagged(2, Mark::Remove { cell_id: id });
    let result = compose(&[insert, remove], &TestChildRebaser);
    assert_eq!(result.marks.len(), 1);
    assert!(matches!(result.marks[0].mark, Mark::Tomb { .. }));
    assert_eq!(result.input_length(), 0);
    assert_eq!(result.output_length(), 0);
}

#[test]
fn compose_is_associative_over_an_insert_modify_remove_chain() {
    let id = placeholder_cell(0);
    let a = tagged(
        1,
        Mark::Insert {
            cell_id: id,
            changes: None,
            tiebreak: Tiebreak::Left,
        },
    );
    let b = tagged(
        2,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 3 }),
        },
    );
    let c = tagged(3, Mark::Remove { cell_id: id });

    let left_first = compose(&[a.clone(), b.clone()], &TestChildRebaser);
    let left_assoc = compose(
        &[TaggedChange::new(None, left_first), c.clone()],
        &TestChildRebaser,
    );

    let right_first = compose(&[b.clone(), c.clone()], &TestChildRebaser);
    let right_assoc = compose(
        &[a.clone(), TaggedChange::new(None, right_first)],
        &TestChildRebaser,
    );

    let all_at_once = compose(&[a, b, c], &TestChildRebaser);

    assert_eq!(left_assoc, right_assoc);
    assert_eq!(left_assoc, all_at_once);
}

#[test]
fn composing_three_inserts_at_the_same_index_merges_into_one_run() {
    let a = tagged(
        1,
        Mark::Insert {
            cell_id: cell(1, 0),
            changes: None,
            tiebreak: Tiebreak::Left,
        },
    );
    let b = tagged(
        2,
        Mark::Insert {
            cell_id: cell(2, 0),
            changes: None,
            tiebreak: Tiebreak::Left,
        },
    );
    // Different input changesets (not composable end-to-end since each is a
    // fresh 0-cell -> 1-cell insert); exercise normalize()'s merge path
    // directly by constructing the three-insert run the way compose would
    // if its inputs were already concatenated.
    let run: Changeset<TestChildChange> = Changeset::new(vec![
        MarkData::new(
            1,
            None,
            Mark::Insert {
                cell_id: cell(1, 0),
                changes: None,
                tiebreak: Tiebreak::Left,
            },
        ),
        MarkData::new(
            1,
            None,
            Mark::Insert {
                cell_id: cell(1, 1),
                changes: None,
                tiebreak: Tiebreak::Left,
            },
        ),
        MarkData::new(
            1,
            None,
            Mark::Insert {
                cell_id: cell(1, 2),
                changes: None,
                tiebreak: Tiebreak::Left,
            },
        ),
    ]);
    let normalized = run.normalize();
    assert_eq!(normalized.marks.len(), 1);
    assert_eq!(normalized.marks[0].count, 3);
    let _ = (a, b);
}

#[test]
fn skip_on_either_side_is_compose_identity() {
    let cell_id = cell(1, 0);
    let remove = tagged(1, Mark::Remove { cell_id });
    let skip = tagged(2, Mark::Skip);
    let _ = LocalId(0);
    let result = compose(&[remove.clone(), skip], &TestChildRebaser);
    assert_eq!(result.marks[0].mark, remove.change.marks[0].mark);
}
