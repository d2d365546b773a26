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

//! Peer branch bookkeeping (spec §4.I): how far each remote session had
//! caught up with the trunk the last time it authored a commit.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PeerBranch {
    pub session_id: String,
    /// The trunk `ref_number` this peer had observed when it authored its
    /// most recently sequenced commit. Used to locate where an incoming
    /// batch from this peer should be rebased forward from.
    pub caught_up_through: u64,
}

impl PeerBranch {
    pub fn new(session_id: impl Into<String>) -> Self {
        PeerBranch {
            session_id: session_id.into(),
            caught_up_through: 0,
        }
    }
}
