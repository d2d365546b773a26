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

use seqfield::id::{CellId, LocalId, RevisionTag};
use seqfield::mark::{split_mark, try_merge_mark, Mark, MarkData};
use test_case::test_case;

fn remove_run(count: u32) -> MarkData<()> {
    MarkData::new(
        count,
        None,
        Mark::Remove {
            cell_id: CellId::new(Some(RevisionTag::new(1)), LocalId(0)),
        },
    )
}

#[test_case(2, 1; "count 2 split at 1")]
#[test_case(5, 1; "count 5 split at 1")]
#[test_case(5, 4; "count 5 split at 4")]
#[test_case(8, 3; "count 8 split at 3")]
fn split_then_merge_round_trips(count: u32, k: u32) {
    let mark = remove_run(count);
    let (first, rest) = split_mark(&mark, k);
    assert_eq!(first.count, k);
    assert_eq!(rest.count, count - k);
    let merged = try_merge_mark(&first, &rest).expect("should remerge into the original mark");
    assert_eq!(merged, mark);
}

#[test]
fn split_then_merge_round_trips_skip_runs() {
    let mark: MarkData<()> = MarkData::new(6, None, Mark::Skip);
    for k in 1..6 {
        let (first, rest) = split_mark(&mark, k);
        assert_eq!(try_merge_mark(&first, &rest), Some(mark.clone()));
    }
}

#[test]
fn marks_with_different_revisions_never_merge() {
    let a: MarkData<()> = MarkData::new(
        1,
        Some(RevisionTag::new(1)),
        Mark::Remove {
            cell_id: CellId::new(Some(RevisionTag::new(1)), LocalId(0)),
        },
    );
    let b: MarkData<()> = MarkData::new(
        1,
        Some(RevisionTag::new(2)),
        Mark::Remove {
            cell_id: CellId::new(Some(RevisionTag::new(1)), LocalId(1)),
        },
    );
    assert_eq!(try_merge_mark(&a, &b), None);
}
