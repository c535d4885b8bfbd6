// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Node and responder identifiers.

use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};
use displaydoc::Display as DisplayDerive;
use serde::{Deserialize, Serialize};

/// Errors parsing a [`ResponderId`] from a string.
#[derive(Clone, Debug, DisplayDerive, Eq, Ord, PartialEq, PartialOrd)]
pub enum ResponderIdParseError {
    /// responder id `{0}` is not in host:port form
    InvalidFormat(String),
}

/// The network-address identity of a peer (`host:port`).
#[derive(Clone, Debug, Default, Eq, Serialize, Deserialize, PartialEq, PartialOrd, Ord, Hash)]
pub struct ResponderId(pub String);

impl Display for ResponderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ResponderId {
    type Err = ResponderIdParseError;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        if !src.contains(':') {
            return Err(ResponderIdParseError::InvalidFormat(src.to_string()));
        }
        Ok(Self(src.to_string()))
    }
}

/// A validator's unique identifier: its network address plus its Ed25519
/// public key bytes.
///
/// Equality, ordering, and hashing are keyed on the public key alone, since
/// two entries at different network addresses with the same key refer to
/// the same validator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NodeId {
    /// The responder (network) identity.
    pub responder_id: ResponderId,
    /// The 32-byte Ed25519 public key bytes identifying this validator.
    pub public_key_bytes: [u8; 32],
}

impl PartialEq for NodeId {
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes == other.public_key_bytes
    }
}

impl Eq for NodeId {}

impl PartialOrd for NodeId {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NodeId {
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        self.public_key_bytes.cmp(&other.public_key_bytes)
    }
}

impl core::hash::Hash for NodeId {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.public_key_bytes.hash(state);
    }
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{}:{}", self.responder_id, hex::encode(self.public_key_bytes))
    }
}
