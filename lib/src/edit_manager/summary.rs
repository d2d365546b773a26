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

//! Trunk/peer-branch summary persistence (spec §4.I `getSummaryData` /
//! `loadSummaryData`). Carries its own version tag so a summary taken by an
//! older build of this crate can still be loaded.

use serde::{Deserialize, Serialize};

use crate::error::{SeqFieldError, SeqFieldResult};

use super::commit::{LocalCommit, TrunkCommit};
use super::branch::PeerBranch;
use super::EditManager;

const CURRENT_VERSION: u32 = 2;
const SUPPORTED_VERSIONS: &[u32] = &[1, 2];

/// One entry of the `branches` array: `[sessionId, {refSeq, commits}]`
/// (spec §6). `refSeq` is the trunk `ref_number` that branch had observed
/// as of this summary; `commits` is the not-yet-sequenced work still
/// pending on it. This crate only retains that commit list for its own
/// session's local branch — peer branches are tracked solely by how far
/// they've caught up (`PeerBranch`), so their entry always carries an
/// empty `commits` list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchEntry<C> {
    pub ref_seq: u64,
    pub commits: Vec<LocalCommit<C>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditManagerSummary<C> {
    pub trunk: Vec<TrunkCommit<C>>,
    pub branches: Vec<(String, BranchEntry<C>)>,
    /// Absent on summaries taken before this field existed; treated as
    /// version 1 on load (spec §6).
    #[serde(default = "legacy_version")]
    pub version: u32,
    /// Not part of spec §6's illustrative grammar, but carried as an extra
    /// field: without it a reloaded manager would lose the boundary
    /// `advance_minimum_sequence_number` enforces against regressing.
    pub minimum_sequence_number: u64,
}

fn legacy_version() -> u32 {
    1
}

impl<C: Clone + PartialEq> EditManagerSummary<C> {
    pub(super) fn from_manager(manager: &EditManager<C>) -> Self {
        let mut branches: Vec<(String, BranchEntry<C>)> = manager
            .peer_branches
            .values()
            .map(|p| {
                (
                    p.session_id.clone(),
                    BranchEntry {
                        ref_seq: p.caught_up_through,
                        commits: Vec::new(),
                    },
                )
            })
            .collect();
        branches.push((
            manager.session_id.clone(),
            BranchEntry {
                ref_seq: manager.trunk.last().map(|c| c.ref_number + 1).unwrap_or(0),
                commits: manager.local_branch.clone(),
            },
        ));
        EditManagerSummary {
            version: CURRENT_VERSION,
            minimum_sequence_number: manager.minimum_sequence_number,
            trunk: manager.trunk.clone(),
            branches,
        }
    }

    pub(super) fn into_manager(self, session_id: impl Into<String>) -> SeqFieldResult<EditManager<C>> {
        if !SUPPORTED_VERSIONS.contains(&self.version) {
            return Err(SeqFieldError::UnsupportedVersion {
                observed: self.version,
                supported: SUPPORTED_VERSIONS.to_vec(),
            });
        }
        let session_id = session_id.into();
        let mut manager = EditManager::new(session_id.clone());
        manager.minimum_sequence_number = self.minimum_sequence_number;
        manager.trunk = self.trunk;
        for (sid, entry) in self.branches {
            if sid == session_id {
                manager.local_branch = entry.commits;
            } else {
                manager.peer_branches.insert(
                    sid.clone(),
                    PeerBranch {
                        session_id: sid,
                        caught_up_through: entry.ref_seq,
                    },
                );
            }
        }
        Ok(manager)
    }
}
