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

//! Wire messages (component J): the envelope sequenced and local commits
//! travel in between sessions (spec §4.J).

use serde::{Deserialize, Serialize};

use crate::changeset::Changeset;
use crate::error::{SeqFieldError, SeqFieldResult};
use crate::id::RevisionTag;

const CURRENT_VERSION: u32 = 1;
const SUPPORTED_VERSIONS: &[u32] = &[1];

/// The commit payload inside a [`Message`]. `parent`/`inverse` and any
/// other bookkeeping fields a sender attaches for its own purposes are
/// dropped on encode: only `revision` and `change` cross the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitPayload<C> {
    pub revision: Option<RevisionTag>,
    pub change: Changeset<C>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message<C> {
    #[serde(default = "default_version")]
    pub version: u32,
    pub session_id: String,
    pub commit: CommitPayload<C>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_id: Option<String>,
}

fn default_version() -> u32 {
    CURRENT_VERSION
}

impl<C> Message<C> {
    pub fn new(session_id: impl Into<String>, commit: CommitPayload<C>, branch_id: Option<String>) -> Self {
        Message {
            version: CURRENT_VERSION,
            session_id: session_id.into(),
            commit,
            branch_id,
        }
    }
}

/// Decodes a raw message, rejecting versions this crate does not know how
/// to interpret. Unversioned payloads (legacy senders) are treated as
/// version 1 by serde's `default_version`.
pub fn decode_message<C: for<'de> Deserialize<'de>>(bytes: &[u8]) -> SeqFieldResult<Message<C>> {
    let msg: Message<C> = serde_json::from_slice(bytes).map_err(|e| SeqFieldError::MalformedChangeset {
        reason: e.to_string(),
    })?;
    if !SUPPORTED_VERSIONS.contains(&msg.version) {
        return Err(SeqFieldError::UnsupportedVersion {
            observed: msg.version,
            supported: SUPPORTED_VERSIONS.to_vec(),
        });
    }
    Ok(msg)
}

pub fn encode_message<C: Serialize>(msg: &Message<C>) -> SeqFieldResult<Vec<u8>> {
    serde_json::to_vec(msg).map_err(|e| SeqFieldError::MalformedChangeset {
        reason: e.to_string(),
    })
}
