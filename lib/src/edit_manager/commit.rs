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

//! The two commit shapes the edit manager tracks: sequenced trunk commits
//! and not-yet-sequenced local ones (spec §4.I).

use serde::{Deserialize, Serialize};

use crate::changeset::{Changeset, TaggedChange};
use crate::id::RevisionTag;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrunkCommit<C> {
    pub seq_number: u64,
    pub ref_number: u64,
    pub session_id: String,
    pub revision: Option<RevisionTag>,
    pub change: Changeset<C>,
}

impl<C: Clone> TrunkCommit<C> {
    pub fn tagged(&self) -> TaggedChange<C> {
        TaggedChange::new(self.revision, self.change.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalCommit<C> {
    pub revision: Option<RevisionTag>,
    pub change: Changeset<C>,
}

impl<C: Clone> LocalCommit<C> {
    pub fn tagged(&self) -> TaggedChange<C> {
        TaggedChange::new(self.revision, self.change.clone())
    }
}
