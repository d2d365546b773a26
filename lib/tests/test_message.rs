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

use seqfield::id::RevisionTag;
use seqfield::mark::{Mark, MarkData};
use seqfield::message::{decode_message, encode_message, CommitPayload, Message};
use seqfield::{Changeset, SeqFieldError};
use testutils::TestChildChange;

#[test]
fn roundtrips_a_commit_with_a_branch_id() {
    let msg: Message<TestChildChange> = Message::new(
        "session-a",
        CommitPayload {
            revision: Some(RevisionTag::new(3)),
            change: Changeset::new(vec![MarkData::new(1, None, Mark::Skip)]),
        },
        Some("branch-1".to_string()),
    );
    let bytes = encode_message(&msg).unwrap();
    let decoded: Message<TestChildChange> = decode_message(&bytes).unwrap();
    assert_eq!(decoded.branch_id.as_deref(), Some("branch-1"));
    assert_eq!(decoded.version, 1);
}

#[test]
fn rejects_unknown_versions() {
    let payload = serde_json::json!({
        "version": 2,
        "session_id": "x",
        "commit": { "revision": null, "change": { "marks": [] } },
    });
    let err = decode_message::<TestChildChange>(payload.to_string().as_bytes()).unwrap_err();
    assert!(matches!(err, SeqFieldError::UnsupportedVersion { observed: 2, .. }));
}

#[test]
fn extra_commit_fields_are_dropped_on_encode() {
    let msg: Message<TestChildChange> = Message::new(
        "session-a",
        CommitPayload {
            revision: None,
            change: Changeset::empty(),
        },
        None,
    );
    let bytes = encode_message(&msg).unwrap();
    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(value.get("commit").unwrap().get("parent").is_none());
}
