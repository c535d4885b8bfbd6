// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The [`QuorumSlice`] type and its sanity/normalization checks (§3, §4.8).

use agora_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// A single validator's trust slice: it considers a set of nodes to have
/// reached agreement once at least `threshold` of `members` agree.
///
/// `members` is always kept sorted by the nodes' encoded public keys, so two
/// independently-built slices over the same node set compare equal.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct QuorumSlice {
    pub threshold: u32,
    pub members: Vec<PublicKey>,
}

impl QuorumSlice {
    pub fn new(mut members: Vec<PublicKey>) -> Self {
        members.sort();
        members.dedup();
        let threshold = quorum_threshold(members.len());
        QuorumSlice { threshold, members }
    }

    /// Number of members from `nodes` present in this slice meets the
    /// threshold, i.e. `nodes` (restricted to this slice) satisfies it.
    pub fn is_satisfied_by<'a>(&self, nodes: impl Iterator<Item = &'a PublicKey>) -> bool {
        let agreeing = nodes.filter(|n| self.members.contains(n)).count();
        agreeing as u32 >= self.threshold
    }

    /// `false` if the slice is empty, the threshold is zero, or the
    /// threshold exceeds the member count.
    pub fn is_sane(&self) -> bool {
        !self.members.is_empty()
            && self.threshold > 0
            && (self.threshold as usize) <= self.members.len()
            && self.members.windows(2).all(|w| w[0] < w[1])
    }
}

/// `threshold = max(1, ceil(0.67 * member_count))` (§4.8 step 6).
pub fn quorum_threshold(member_count: usize) -> u32 {
    let scaled = (member_count as u64 * 67 + 99) / 100;
    scaled.max(1) as u32
}
