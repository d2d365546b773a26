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

//! The child-rebaser boundary (spec §9): a polymorphic dependency with
//! `compose`, `invert`, `rebase` over an opaque `ChildChange` type. The
//! sequence core never inspects child-change internals; it only ever calls
//! through this trait, the same way [`crate::id::RevisionTag`] minting and
//! session-id compression are treated as external collaborators.
//!
//! Grounded on the injected-trait style of jj-lib's `OpStore` trait
//! (`op_store.rs`): a narrow, `Send + Sync`-free interface the core code
//! depends on without knowing its implementation.

use crate::id::RevisionTag;

/// Whether an [`invert`](ChildRebaser::invert) call should produce a private
/// rollback or a publishable undo (spec §4.E).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvertKind {
    Rollback,
    Undo,
}

/// Compose/invert/rebase over an opaque nested child-change type `C`.
/// Implementations live entirely outside this crate's scope; this trait is
/// the only seam the sequence-field algebra uses to reach them.
pub trait ChildRebaser<C> {
    /// Fuses `a` (applied first) and `b` (applied second) into one
    /// equivalent child change.
    fn compose(&self, a: &C, b: &C) -> C;

    /// Produces the inverse of `change`.
    fn invert(&self, change: &C, kind: InvertKind) -> C;

    /// Rebases `change` over `base`; both changes' revisions are supplied
    /// for implementations that need tie-break context equivalent to the
    /// sequence core's own rebase metadata.
    fn rebase(
        &self,
        change: &C,
        base: &C,
        change_revision: Option<RevisionTag>,
        base_revision: Option<RevisionTag>,
    ) -> C;
}

/// Composes two optional nested child changes through `rebaser`, matching
/// the sequence algebra's "nested changes always compose through the
/// injected child-rebaser" rule (spec §4.D). `None` on either side passes
/// the other through unchanged.
pub fn compose_opt<C: Clone>(rebaser: &dyn ChildRebaser<C>, a: Option<&C>, b: Option<&C>) -> Option<C> {
    match (a, b) {
        (Some(a), Some(b)) => Some(rebaser.compose(a, b)),
        (Some(a), None) => Some(a.clone()),
        (None, Some(b)) => Some(b.clone()),
        (None, None) => None,
    }
}

/// Rebases an optional nested child change over an optional base child
/// change. When only one side carries a change, it is "carried through
/// unchanged" per spec §4.F step 4.
pub fn rebase_opt<C: Clone>(
    rebaser: &dyn ChildRebaser<C>,
    change: Option<&C>,
    base: Option<&C>,
    change_revision: Option<RevisionTag>,
    base_revision: Option<RevisionTag>,
) -> Option<C> {
    match (change, base) {
        (Some(change), Some(base)) => {
            Some(rebaser.rebase(change, base, change_revision, base_revision))
        }
        (Some(change), None) => Some(change.clone()),
        (None, _) => None,
    }
}
