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
use seqfield::mark::{Mark, MarkData};
use seqfield::rebase::{rebase, RebaseMetadata};
use seqfield::{Changeset, TaggedChange};
use seqfield::child_rebaser::InvertKind;
use testutils::{cell, TestChildChange, TestChildRebaser};

fn tagged(rev: u128, mark: Mark<TestChildChange>) -> TaggedChange<TestChildChange> {
    TaggedChange::new(Some(RevisionTag::new(rev)), Changeset::new(vec![MarkData::new(1, None, mark)]))
}

#[test]
fn skip_over_remove_becomes_tombstone() {
    let id = cell(1, 0);
    let x: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Skip)]);
    let base: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Remove { cell_id: id })]);
    let rebased = rebase(&x, &base, RebaseMetadata::default(), &TestChildRebaser);
    assert!(matches!(rebased.marks[0].mark, Mark::Tomb { cell_id } if cell_id == id));
}

/// `(X ↷ B) ↷ C ≡ X ↷ (B ∘ C)` (spec property 8.5).
#[test]
fn rebase_over_composition_matches_repeated_single_rebases() {
    let id = cell(1, 0);
    let x: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Skip)]);
    let b: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Remove { cell_id: id })]);
    let c: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Skip)]);

    let repeated = rebase(
        &rebase(&x, &b, RebaseMetadata::default(), &TestChildRebaser),
        &c,
        RebaseMetadata::default(),
        &TestChildRebaser,
    );

    let b_then_c = compose(
        &[TaggedChange::new(None, b), TaggedChange::new(None, c)],
        &TestChildRebaser,
    );
    let direct = rebase(&x, &b_then_c, RebaseMetadata::default(), &TestChildRebaser);

    assert_eq!(repeated, direct);
}

/// `(X ↷ B) ↷ B⁻¹ ≡ X` (spec property 8.3), exercised on a nested-change
/// mark so the law is carried entirely by `rebase_opt`/`compose_opt`
/// threading rather than by a trivial Skip/Skip no-op.
#[test]
fn rebase_over_inverse_restores_the_original_nested_change() {
    let x = tagged(
        1,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 4 }),
        },
    );
    let b = tagged(
        2,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 9 }),
        },
    );
    let rebased_over_b = rebase(&x.change, &b.change, RebaseMetadata::default(), &TestChildRebaser);
    let inverse_b = invert(&b, InvertKind::Rollback, &TestChildRebaser);
    let restored = rebase(&rebased_over_b, &inverse_b, RebaseMetadata::default(), &TestChildRebaser);
    assert_eq!(restored, x.change);
}

/// Sandwich: `(X ↷ B) ↷ B⁻¹ ↷ B ≡ X ↷ B` (spec property 8.4).
#[test]
fn sandwich_rebase_is_stable() {
    let x = tagged(
        1,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 4 }),
        },
    );
    let b = tagged(
        2,
        Mark::Modify {
            changes: Some(TestChildChange { delta: 9 }),
        },
    );
    let x_over_b = rebase(&x.change, &b.change, RebaseMetadata::default(), &TestChildRebaser);
    let inverse_b = invert(&b, InvertKind::Rollback, &TestChildRebaser);
    let sandwiched = rebase(
        &rebase(&x_over_b, &inverse_b, RebaseMetadata::default(), &TestChildRebaser),
        &b.change,
        RebaseMetadata::default(),
        &TestChildRebaser,
    );
    assert_eq!(sandwiched, x_over_b);
}

#[test]
fn pin_over_remove_revives_the_detached_node() {
    let id = cell(1, 0);
    let x: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Pin { cell_id: id })]);
    let base: Changeset<TestChildChange> = Changeset::new(vec![MarkData::new(1, None, Mark::Remove { cell_id: id })]);
    let rebased = rebase(&x, &base, RebaseMetadata::default(), &TestChildRebaser);
    assert!(matches!(rebased.marks[0].mark, Mark::Revive { cell_id, .. } if cell_id == id));
}
