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

//! Edit manager (component I): trunk/local-branch/peer-branch bookkeeping
//! for an optimistically-replicated sequence field, including sandwich
//! rebasing of the local branch whenever sequenced commits arrive and
//! sequence-number-driven eviction of the trunk (spec §4.I).

mod branch;
mod commit;
mod summary;

pub use branch::PeerBranch;
pub use commit::{LocalCommit, TrunkCommit};
pub use summary::{BranchEntry, EditManagerSummary};

use std::collections::HashMap;

use tracing::instrument;

use crate::changeset::{Changeset, TaggedChange};
use crate::child_rebaser::{ChildRebaser, InvertKind};
use crate::compose::compose;
use crate::error::{SeqFieldError, SeqFieldResult};
use crate::id::RevisionTag;
use crate::invert::invert;
use crate::rebase::{rebase, RebaseMetadata};

/// A sequenced commit arriving as part of `addSequencedChanges`'s input
/// batch, before it has been assigned its final trunk position.
#[derive(Debug, Clone)]
pub struct IncomingCommit<C> {
    pub revision: Option<RevisionTag>,
    pub change: Changeset<C>,
}

pub struct EditManager<C> {
    session_id: String,
    trunk: Vec<TrunkCommit<C>>,
    local_branch: Vec<LocalCommit<C>>,
    peer_branches: HashMap<String, PeerBranch>,
    minimum_sequence_number: u64,
}

impl<C: Clone + PartialEq> EditManager<C> {
    pub fn new(session_id: impl Into<String>) -> Self {
        EditManager {
            session_id: session_id.into(),
            trunk: Vec::new(),
            local_branch: Vec::new(),
            peer_branches: HashMap::new(),
            minimum_sequence_number: 0,
        }
    }

    pub fn trunk(&self) -> &[TrunkCommit<C>] {
        &self.trunk
    }

    pub fn local_branch(&self) -> &[LocalCommit<C>] {
        &self.local_branch
    }

    /// Appends `change` to the local branch (spec §4.I `apply`).
    #[instrument(level = "debug", skip_all)]
    pub fn apply(&mut self, revision: Option<RevisionTag>, change: Changeset<C>) {
        self.local_branch.push(LocalCommit { revision, change });
    }

    /// Incorporates a batch of now-sequenced commits authored by
    /// `session_id`, rebasing each forward through whatever trunk commits
    /// that session hadn't yet observed, then sandwich-rebasing the local
    /// branch onto the new trunk tip.
    #[instrument(level = "debug", skip_all, fields(session_id, batch_len = batch.len()))]
    pub fn add_sequenced_changes(
        &mut self,
        batch: Vec<IncomingCommit<C>>,
        session_id: &str,
        starting_seq: u64,
        starting_ref: u64,
        rebaser: &dyn ChildRebaser<C>,
    ) -> Changeset<C> {
        let mut net_delta = Changeset::empty();
        for (i, commit) in batch.into_iter().enumerate() {
            let seq_number = starting_seq + i as u64;
            let ref_number = starting_ref + i as u64;
            let delta = self.add_one_sequenced_commit(commit, session_id, seq_number, ref_number, rebaser);
            net_delta = compose(
                &[
                    TaggedChange::new(None, net_delta),
                    TaggedChange::new(None, delta),
                ],
                rebaser,
            );
        }
        net_delta
    }

    fn add_one_sequenced_commit(
        &mut self,
        commit: IncomingCommit<C>,
        session_id: &str,
        seq_number: u64,
        ref_number: u64,
        rebaser: &dyn ChildRebaser<C>,
    ) -> Changeset<C> {
        // Self-authored commits are already applied locally: acknowledge by
        // moving the oldest pending local commit straight onto the trunk,
        // unchanged. The sandwich collapses to identity.
        if session_id == self.session_id {
            let local = if self.local_branch.is_empty() {
                LocalCommit {
                    revision: commit.revision,
                    change: commit.change,
                }
            } else {
                self.local_branch.remove(0)
            };
            self.trunk.push(TrunkCommit {
                seq_number,
                ref_number,
                session_id: session_id.to_string(),
                revision: local.revision,
                change: local.change,
            });
            return Changeset::empty();
        }

        let caught_up_through = self
            .peer_branches
            .get(session_id)
            .map(|p| p.caught_up_through)
            .unwrap_or(0);
        let start = self.trunk.partition_point(|c| c.ref_number < caught_up_through);
        let unseen: Vec<TaggedChange<C>> = self.trunk[start..].iter().map(|c| c.tagged()).collect();
        let base = compose(&unseen, rebaser);
        let rebased_change = if base.is_empty() {
            commit.change
        } else {
            rebase(&commit.change, &base, RebaseMetadata::default(), rebaser)
        };

        let new_trunk_commit = TrunkCommit {
            seq_number,
            ref_number,
            session_id: session_id.to_string(),
            revision: commit.revision,
            change: rebased_change,
        };
        self.trunk.push(new_trunk_commit.clone());
        self.peer_branches
            .entry(session_id.to_string())
            .or_insert_with(|| PeerBranch::new(session_id))
            .caught_up_through = ref_number + 1;

        self.sandwich_rebase_local_branch(new_trunk_commit.tagged(), rebaser)
    }

    /// Invert the old local branch, append the new trunk commit, then
    /// re-rebase each original local commit onto the new tip in turn,
    /// threading the running base forward one rebased commit at a time
    /// (the descendant-rebase chaining pattern).
    fn sandwich_rebase_local_branch(
        &mut self,
        new_trunk_commit: TaggedChange<C>,
        rebaser: &dyn ChildRebaser<C>,
    ) -> Changeset<C> {
        if self.local_branch.is_empty() {
            return new_trunk_commit.change;
        }
        let old_local: Vec<TaggedChange<C>> = self.local_branch.iter().map(|c| c.tagged()).collect();
        let composed_old_local = compose(&old_local, rebaser);
        let inverse_old_local = invert(
            &TaggedChange::new(None, composed_old_local),
            InvertKind::Rollback,
            rebaser,
        );

        let mut base = compose(
            &[TaggedChange::new(None, inverse_old_local), new_trunk_commit],
            rebaser,
        );
        let mut new_local_branch = Vec::with_capacity(self.local_branch.len());
        for original in &self.local_branch {
            let rebased = rebase(&original.change, &base, RebaseMetadata::default(), rebaser);
            base = compose(
                &[
                    TaggedChange::new(None, base.clone()),
                    TaggedChange::new(original.revision, rebased.clone()),
                ],
                rebaser,
            );
            new_local_branch.push(LocalCommit {
                revision: original.revision,
                change: rebased,
            });
        }
        self.local_branch = new_local_branch;
        base
    }

    /// Evicts trunk commits no participant can still reference, then rolls
    /// forward any peer branch that hadn't caught up that far so it no
    /// longer names an evicted position (spec §4.I, §5 memory discipline).
    ///
    /// A trunk commit is only dropped when `seq <= msn` *and* no peer
    /// branch still references it, i.e. every peer's `caught_up_through`
    /// is past its `ref_number`. The local branch never blocks eviction:
    /// it is fully rebased onto the trunk tip on every `add_sequenced_changes`
    /// call, so it never depends on an earlier trunk position. This crate
    /// has no separate notion of forks or revertibles to consult; a caller
    /// layering those on top must keep its own references alive some other
    /// way (see DESIGN.md).
    #[instrument(level = "debug", skip(self))]
    pub fn advance_minimum_sequence_number(&mut self, msn: u64) -> SeqFieldResult<()> {
        if msn < self.minimum_sequence_number {
            return Err(SeqFieldError::ProtocolViolation {
                session: self.session_id.clone(),
                reference: msn,
                minimum: self.minimum_sequence_number,
            });
        }
        let min_referenced_ref = self
            .peer_branches
            .values()
            .map(|p| p.caught_up_through)
            .min()
            .unwrap_or(u64::MAX);
        self.trunk
            .retain(|c| c.seq_number > msn || c.ref_number >= min_referenced_ref);
        self.minimum_sequence_number = msn;
        for peer in self.peer_branches.values_mut() {
            if peer.caught_up_through < msn {
                peer.caught_up_through = msn;
            }
        }
        Ok(())
    }

    /// The longest distance, in commits, between any branch's head and the
    /// most recent point every branch has advanced past.
    pub fn get_longest_branch_length(&self) -> usize {
        let trunk_len = self.trunk.len() as u64;
        let local_len = self.local_branch.len() as u64;
        let peer_max = self
            .peer_branches
            .values()
            .map(|p| trunk_len.saturating_sub(p.caught_up_through))
            .max()
            .unwrap_or(0);
        local_len.max(peer_max) as usize
    }

    pub fn get_summary_data(&self) -> EditManagerSummary<C> {
        EditManagerSummary::from_manager(self)
    }

    pub fn load_summary_data(session_id: impl Into<String>, summary: EditManagerSummary<C>) -> SeqFieldResult<Self> {
        summary.into_manager(session_id)
    }
}
