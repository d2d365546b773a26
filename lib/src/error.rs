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

//! Error taxonomy (spec §7): malformed input and decode failures fail fast
//! as usage errors; the edit manager additionally surfaces protocol
//! violations it cannot recover from locally.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SeqFieldError {
    /// A changeset's mark counts don't sum to its declared input-context
    /// length, or a mark carries fields inconsistent with its variant.
    #[error("malformed changeset: {reason}")]
    MalformedChangeset { reason: String },

    /// Decode of a wire message/summary whose `version` field is not one
    /// this crate understands.
    #[error("unsupported version {observed} (supported: {supported:?})")]
    UnsupportedVersion { observed: u32, supported: Vec<u32> },

    /// Decode of a wire message/summary missing a field the format requires.
    #[error("missing required field `{field}` while decoding {context}")]
    MissingField {
        field: &'static str,
        context: &'static str,
    },

    /// A peer's reference sequence number points at a trunk commit that has
    /// already been evicted. This is a protocol violation: the peer should
    /// never have been allowed to fall that far behind.
    #[error(
        "peer {session:?} referenced sequence number {reference}, which is below the known \
         minimum {minimum}"
    )]
    ProtocolViolation {
        session: String,
        reference: u64,
        minimum: u64,
    },
}

pub type SeqFieldResult<T> = Result<T, SeqFieldError>;
