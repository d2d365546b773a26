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

//! Identifier model (component A): revision tags, local ids, cell ids, node
//! ids, and the per-revision id allocator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque unique identifier for one committed changeset.
///
/// Two tags are equal iff bit-identical; they carry no order. A changeset
/// that has not yet been committed (or a cell id that inherits its revision
/// from the enclosing changeset) is represented by `Option<RevisionTag>` at
/// the call site rather than by a sentinel value here, matching the `RevisionTag?`
/// notation used throughout the spec.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RevisionTag(pub u128);

impl RevisionTag {
    pub fn new(value: u128) -> Self {
        RevisionTag(value)
    }

    pub fn as_u128(&self) -> u128 {
        self.0
    }
}

/// Sentinel tag stamped onto a Remove's inverted Revive cell id when the
/// removed cell itself carried no revision yet (spec §4.E). Distinct from
/// `None` so a later `replace_revisions` pass aimed at the *original*
/// change's own placeholder does not also rewrite the inverse's reference
/// to it; the undo commit's own commit-time pass targets this sentinel
/// specifically once the original's real revision is known.
pub const DUMMY_INVERT_REVISION: RevisionTag = RevisionTag(u128::MAX);

impl fmt::Debug for RevisionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RevisionTag({:032x})", self.0)
    }
}

/// Dense non-negative integer assigned by a per-revision allocator.
/// `(revision, local_id)` is globally unique.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LocalId(pub u32);

impl LocalId {
    pub const ZERO: LocalId = LocalId(0);

    /// Returns the id `self + offset`, used when splitting a mark that spans
    /// more than one cell.
    pub fn offset(&self, offset: u32) -> LocalId {
        LocalId(self.0 + offset)
    }
}

impl fmt::Debug for LocalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A single position that once held (or will hold) a node. The primary
/// cross-changeset coordinate (spec §3.1).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellId {
    pub revision: Option<RevisionTag>,
    pub local_id: LocalId,
}

impl CellId {
    pub fn new(revision: Option<RevisionTag>, local_id: LocalId) -> Self {
        CellId { revision, local_id }
    }

    /// Returns the cell id for the `n`th cell after this one, as produced by
    /// splitting a mark that spans several adjacent cells.
    pub fn offset(&self, n: u32) -> CellId {
        CellId {
            revision: self.revision,
            local_id: self.local_id.offset(n),
        }
    }

    /// Two cell ids name the same cell iff their `(revision, local_id)` pairs
    /// are identical. Used by the changeset queue (§4.C step 2) to pair up
    /// empty-cell marks from both sides.
    pub fn same_cell(&self, other: &CellId) -> bool {
        self.revision == other.revision && self.local_id == other.local_id
    }
}

impl fmt::Debug for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.revision {
            Some(rev) => write!(f, "Cell({:032x}, {})", rev.0, self.local_id.0),
            None => write!(f, "Cell(-, {})", self.local_id.0),
        }
    }
}

/// Alias used when a change is named rather than a cell (spec §3.1).
pub type ChangeAtomId = CellId;

/// Opaque id of a nested child change, passed through to the child-rebaser
/// without interpretation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({:x})", self.0)
    }
}

/// A compact range of adjacent local ids.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Debug)]
pub struct IdRange {
    pub id: LocalId,
    pub count: u32,
}

impl IdRange {
    pub fn new(id: LocalId, count: u32) -> Self {
        assert!(count > 0, "IdRange must span at least one id");
        IdRange { id, count }
    }

    pub fn contains(&self, id: LocalId) -> bool {
        id.0 >= self.id.0 && id.0 < self.id.0 + self.count
    }
}

/// Allocates dense, monotonically increasing [`LocalId`]s for a single
/// changeset build. Allocators are stack-scoped to the build that owns them
/// and are never shared across compose/rebase/invert inputs (spec §9).
#[derive(Debug, Default)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        IdAllocator { next: 0 }
    }

    /// Allocates a contiguous range of `count` ids and returns its first id.
    pub fn alloc(&mut self, count: u32) -> LocalId {
        assert!(count > 0, "cannot allocate zero ids");
        let id = LocalId(self.next);
        self.next += count;
        id
    }
}
