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

//! Shared test fixtures for the `seqfield` integration test suite: a
//! catalogue of representative single-mark changesets (spec §8's
//! *testChanges*) and a trivial child-rebaser for exercising the nested
//! child-change seam without depending on a real tree engine.

use std::fs;
use std::path::Path;

use seqfield::child_rebaser::{ChildRebaser, InvertKind};
use seqfield::id::{CellId, LocalId, RevisionTag};
use seqfield::mark::{AttachMark, DetachMark, Mark, MarkData, Tiebreak};
use seqfield::{Changeset, TaggedChange};

/// A minimal nested child change: a counter delta. Stands in for whatever a
/// real downstream tree engine would nest inside a populated cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TestChildChange {
    pub delta: i64,
}

pub struct TestChildRebaser;

impl ChildRebaser<TestChildChange> for TestChildRebaser {
    fn compose(&self, a: &TestChildChange, b: &TestChildChange) -> TestChildChange {
        TestChildChange {
            delta: a.delta + b.delta,
        }
    }

    fn invert(&self, change: &TestChildChange, _kind: InvertKind) -> TestChildChange {
        TestChildChange { delta: -change.delta }
    }

    fn rebase(
        &self,
        change: &TestChildChange,
        _base: &TestChildChange,
        _change_revision: Option<RevisionTag>,
        _base_revision: Option<RevisionTag>,
    ) -> TestChildChange {
        *change
    }
}

pub fn cell(rev: u128, id: u32) -> CellId {
    CellId::new(Some(RevisionTag::new(rev)), LocalId(id))
}

pub fn placeholder_cell(id: u32) -> CellId {
    CellId::new(None, LocalId(id))
}

fn single<C>(rev: u128, mark: Mark<C>) -> TaggedChange<C> {
    TaggedChange::new(Some(RevisionTag::new(rev)), Changeset::new(vec![MarkData::new(1, None, mark)]))
}

/// The spec's *testChanges* catalogue: one representative single-mark
/// changeset per named entry, all operating on a 1-cell field so they can
/// be freely composed/rebased/inverted against one another in property
/// tests.
pub fn test_changes(rev: u128) -> Vec<(&'static str, TaggedChange<TestChildChange>)> {
    vec![
        (
            "insert",
            single(
                rev,
                Mark::Insert {
                    cell_id: placeholder_cell(0),
                    changes: None,
                    tiebreak: Tiebreak::Left,
                },
            ),
        ),
        (
            "modify",
            single(
                rev,
                Mark::Modify {
                    changes: Some(TestChildChange { delta: 1 }),
                },
            ),
        ),
        ("remove", single(rev, Mark::Remove { cell_id: cell(rev, 0) })),
        (
            "revive",
            single(
                rev,
                Mark::Revive {
                    cell_id: cell(rev, 0),
                    changes: None,
                },
            ),
        ),
        (
            "move",
            single(
                rev,
                Mark::MoveOut {
                    cell_id: cell(rev, 0),
                    final_endpoint: Some(cell(rev, 1)),
                    id_override: None,
                },
            ),
        ),
        (
            "return",
            single(
                rev,
                Mark::ReturnTo {
                    cell_id: cell(rev, 0),
                    source: cell(rev, 1),
                    changes: None,
                },
            ),
        ),
        ("pin", single(rev, Mark::Pin { cell_id: cell(rev, 0) })),
        (
            "transient-insert",
            single(
                rev,
                Mark::AttachAndDetach {
                    attach: Box::new(AttachMark::Insert {
                        cell_id: placeholder_cell(0),
                        tiebreak: Tiebreak::Left,
                    }),
                    detach: Box::new(DetachMark::Remove { cell_id: placeholder_cell(0) }),
                },
            ),
        ),
        (
            "transient-revive",
            single(
                rev,
                Mark::AttachAndDetach {
                    attach: Box::new(AttachMark::Revive { cell_id: cell(rev, 0) }),
                    detach: Box::new(DetachMark::Remove { cell_id: cell(rev, 0) }),
                },
            ),
        ),
        (
            "nested-change",
            single(
                rev,
                Mark::Modify {
                    changes: Some(TestChildChange { delta: 5 }),
                },
            ),
        ),
        ("no-op", single(rev, Mark::Skip)),
    ]
}

/// Fails if any `tests/*.rs` file besides `runner.rs` lacks a `mod ...;`
/// declaration in the runner.
pub fn assert_no_forgotten_test_files(test_dir: &Path) {
    let runner_path = test_dir.join("runner.rs");
    let runner = fs::read_to_string(&runner_path).unwrap();
    let entries = fs::read_dir(test_dir).unwrap();
    for entry in entries {
        let path = entry.unwrap().path();
        if let Some(ext) = path.extension() {
            let name = path.file_stem().unwrap();
            if ext == "rs" && name != "runner" {
                let search = format!("mod {};", name.to_str().unwrap());
                assert!(
                    runner.contains(&search),
                    "missing `{search}` declaration in {}",
                    runner_path.display()
                );
            }
        }
    }
}
