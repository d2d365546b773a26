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
use seqfield::id::RevisionTag;
use seqfield::invert::invert;
use seqfield::mark::{Mark, MarkData, Tiebreak};
use seqfield::rebase::{rebase, RebaseMetadata};
use seqfield::child_rebaser::InvertKind;
use seqfield::{Changeset, TaggedChange};
use testutils::{cell, placeholder_cell, TestChildChange, TestChildRebaser};

fn single(mark: Mark<TestChildChange>) -> Changeset<TestChildChange> {
    Changeset::new(vec![MarkData::new(1, None, mark)])
}

fn tagged(rev: u128, marks: Vec<MarkData<TestChildChange>>) -> TaggedChange<TestChildChange> {
    TaggedChange::new(Some(RevisionTag::new(rev)), Changeset::new(marks))
}

/// An insert authored on top of another insert's output survives rebasing
/// off the now-undone dependency, keeping its own cell identity and
/// tiebreak (concrete scenario 1: nested inserts).
#[test]
fn nested_insert_survives_rebase_off_its_dependency() {
    let a0 = cell(1, 0);
    let b0 = cell(2, 0);
    let insert_a = single(Mark::Insert { cell_id: a0, changes: None, tiebreak: Tiebreak::Left });
    let insert_b = Changeset::new(vec![
        MarkData::new(1, None, Mark::Skip),
        MarkData::new(
            1,
            None,
            Mark::Insert { cell_id: b0, changes: None, tiebreak: Tiebreak::Left },
        ),
    ]);
    let inverse_a = invert(&tagged(1, insert_a.marks.clone()), InvertKind::Rollback, &TestChildRebaser);

    let rebased = rebase(&insert_b, &inverse_a, RebaseMetadata::default(), &TestChildRebaser);
    let last = rebased.marks.last().unwrap();
    assert!(matches!(
        last.mark,
        Mark::Insert { cell_id, tiebreak: Tiebreak::Left, .. } if cell_id == b0
    ));
}

/// Two inserts concurrent with a remove each rebase independently, and a
/// later insert that targeted a position past the removed cell keeps its
/// own identity rather than being pulled into the other insert's position
/// (concrete scenario 2: concurrent inserts preserve intended index).
#[test]
fn concurrent_inserts_preserve_intended_index() {
    let x = cell(1, 0);
    let b0 = cell(2, 0);
    let c0 = cell(3, 0);

    let del_a: Changeset<TestChildChange> = single(Mark::Remove { cell_id: x });
    let insert_b = Changeset::new(vec![
        MarkData::new(1, None, Mark::Insert { cell_id: b0, changes: None, tiebreak: Tiebreak::Left }),
        MarkData::new(1, None, Mark::Skip),
    ]);
    let insert_c = Changeset::new(vec![
        MarkData::new(1, None, Mark::Skip),
        MarkData::new(1, None, Mark::Insert { cell_id: c0, changes: None, tiebreak: Tiebreak::Left }),
    ]);

    let c_over_a = rebase(&insert_c, &del_a, RebaseMetadata::default(), &TestChildRebaser);
    let b_over_a = rebase(&insert_b, &del_a, RebaseMetadata::default(), &TestChildRebaser);
    let c_over_a_over_b = rebase(&c_over_a, &b_over_a, RebaseMetadata::default(), &TestChildRebaser);

    let last = c_over_a_over_b.marks.last().unwrap();
    assert!(matches!(
        last.mark,
        Mark::Insert { cell_id, tiebreak: Tiebreak::Left, .. } if cell_id == c0
    ));
    let _ = x;
}

/// Removing a node and reviving the exact same node cancels to a no-op,
/// the core cancellation underlying the longer remove/revive/insert
/// round trip (concrete scenario 3).
#[test]
fn remove_then_revive_of_the_same_cell_composes_to_identity() {
    let ac = cell(2, 0);
    let removed = tagged(2, vec![MarkData::new(2, None, Mark::Remove { cell_id: ac })]);
    let revived = tagged(4, vec![MarkData::new(2, None, Mark::Revive { cell_id: ac, changes: None })]);
    let result = compose(&[removed, revived], &TestChildRebaser);
    assert!(result.marks.iter().all(|m| matches!(m.mark, Mark::Skip)));
}

/// A move whose source is concurrently removed chains through the
/// removed cell's identity, leaving the move's destination untouched
/// (concrete scenario 4).
#[test]
fn move_over_remove_chains_through_the_tombstone() {
    let source = cell(0, 0);
    let dest = placeholder_cell(1);
    let change = Changeset::new(vec![
        MarkData::new(
            1,
            None,
            Mark::MoveOut { cell_id: source, final_endpoint: None, id_override: None },
        ),
        MarkData::new(1, None, Mark::MoveIn { cell_id: dest, final_endpoint: None, changes: None }),
    ]);
    let base: Changeset<TestChildChange> = single(Mark::Remove { cell_id: source });

    let rebased = rebase(&change, &base, RebaseMetadata::default(), &TestChildRebaser);
    assert!(matches!(
        rebased.marks[0].mark,
        Mark::MoveOut { cell_id, final_endpoint: Some(fe), .. } if cell_id == source && fe == source
    ));
    assert!(matches!(
        rebased.marks[1].mark,
        Mark::MoveIn { cell_id, .. } if cell_id == dest
    ));
}

/// Rebasing an insert over a same-index concurrent insert orders the two
/// results predictably from each side's own tiebreak policy (boundary
/// case).
#[test]
fn rebase_over_same_index_insert_obeys_tiebreak_policy() {
    let p = placeholder_cell(0);
    let q = placeholder_cell(1);
    let base: Changeset<TestChildChange> = single(Mark::Insert { cell_id: q, changes: None, tiebreak: Tiebreak::Right });

    let change_left: Changeset<TestChildChange> =
        single(Mark::Insert { cell_id: p, changes: None, tiebreak: Tiebreak::Left });
    let rebased_left = rebase(&change_left, &base, RebaseMetadata::default(), &TestChildRebaser);
    assert!(matches!(rebased_left.marks[0].mark, Mark::Insert { cell_id, .. } if cell_id == p));
    assert!(matches!(rebased_left.marks[1].mark, Mark::Skip));

    let change_right: Changeset<TestChildChange> =
        single(Mark::Insert { cell_id: p, changes: None, tiebreak: Tiebreak::Right });
    let rebased_right = rebase(&change_right, &base, RebaseMetadata::default(), &TestChildRebaser);
    assert!(matches!(rebased_right.marks[0].mark, Mark::Skip));
    assert!(matches!(rebased_right.marks[1].mark, Mark::Insert { cell_id, .. } if cell_id == p));
}
