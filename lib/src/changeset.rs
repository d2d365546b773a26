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

//! The `Changeset`/`TaggedChange` types: an ordered sequence of marks plus
//! the revision metadata compose/invert/rebase need to interpret it.

use serde::{Deserialize, Serialize};

use crate::id::RevisionTag;
use crate::mark::{try_merge_mark, MarkData};

/// An ordered sequence of marks describing edits to a sequence field.
/// Spec invariant 5: the identity changeset (no change) is the empty
/// sequence.
///
/// Encodes as a bare JSON array of marks (spec §6), not as an object
/// wrapping a `marks` field: each mark is either a bare integer (Skip
/// shorthand) or the explicit tagged object `MarkData`'s own (de)serializer
/// produces.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Changeset<C> {
    pub marks: Vec<MarkData<C>>,
}

impl<C: Serialize> Serialize for Changeset<C> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.marks.serialize(serializer)
    }
}

impl<'de, C: Deserialize<'de>> Deserialize<'de> for Changeset<C> {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Changeset {
            marks: Vec::deserialize(deserializer)?,
        })
    }
}

impl<C> Changeset<C> {
    pub fn empty() -> Self {
        Changeset { marks: Vec::new() }
    }

    pub fn new(marks: Vec<MarkData<C>>) -> Self {
        Changeset { marks }
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn push(&mut self, mark: MarkData<C>) {
        self.marks.push(mark);
    }

    /// The logical length of the field in this changeset's input context
    /// (spec invariant 1): the number of cells populated *before* the
    /// changeset is applied.
    pub fn input_length(&self) -> u64 {
        self.marks
            .iter()
            .filter(|m| m.mark.is_populated_pre())
            .map(|m| u64::from(m.count))
            .sum()
    }

    /// The logical length of the field in this changeset's output context:
    /// the number of cells populated *after* the changeset is applied.
    pub fn output_length(&self) -> u64 {
        self.marks
            .iter()
            .filter(|m| m.mark.is_populated_post())
            .map(|m| u64::from(m.count))
            .sum()
    }

    /// Merges adjacent equivalent marks and asserts no zero-length marks
    /// remain (spec invariant 4). Compose and rebase call this on their
    /// result before returning it.
    pub fn normalize(mut self) -> Self
    where
        C: Clone + PartialEq,
    {
        let mut merged: Vec<MarkData<C>> = Vec::with_capacity(self.marks.len());
        for mark in self.marks.drain(..) {
            if let Some(prev) = merged.last() {
                if let Some(combined) = try_merge_mark(prev, &mark) {
                    *merged.last_mut().unwrap() = combined;
                    continue;
                }
            }
            merged.push(mark);
        }
        Changeset { marks: merged }
    }
}

/// A [`Changeset`] together with the revision it was (or will be) committed
/// under. `revision` is `None` for a changeset that has not yet been
/// committed; marks inside that inherit no explicit `revision` field take
/// this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedChange<C> {
    pub revision: Option<RevisionTag>,
    pub change: Changeset<C>,
}

impl<C> TaggedChange<C> {
    pub fn new(revision: Option<RevisionTag>, change: Changeset<C>) -> Self {
        TaggedChange { revision, change }
    }

    /// The revision a mark inside this changeset should be considered
    /// tagged with, honoring a per-mark override.
    pub fn effective_revision(&self, mark_revision: Option<RevisionTag>) -> Option<RevisionTag> {
        mark_revision.or(self.revision)
    }
}
