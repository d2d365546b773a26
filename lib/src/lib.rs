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

//! A sequence field change algebra: compose, invert, rebase, and
//! replace-revisions over an ordered collection of cells, plus an edit
//! manager that uses the algebra to keep an optimistically-replicated
//! sequence in sync across sessions.
//!
//! The algebra is generic over an opaque nested child-change type and never
//! inspects it directly; callers supply a [`child_rebaser::ChildRebaser`]
//! implementation for whatever lives inside each cell.

pub mod changeset;
pub mod child_rebaser;
pub mod compose;
pub mod delta;
pub mod edit_manager;
pub mod error;
pub mod id;
pub mod invert;
pub mod mark;
pub mod message;
pub mod queue;
pub mod rebase;
pub mod replace_revisions;

pub use changeset::{Changeset, TaggedChange};
pub use child_rebaser::{ChildRebaser, InvertKind};
pub use compose::compose;
pub use edit_manager::EditManager;
pub use error::{SeqFieldError, SeqFieldResult};
pub use id::{CellId, IdAllocator, LocalId, RevisionTag};
pub use invert::invert;
pub use mark::{Mark, MarkData, Tiebreak};
pub use rebase::{rebase, RebaseMetadata};
pub use replace_revisions::replace_revisions;
