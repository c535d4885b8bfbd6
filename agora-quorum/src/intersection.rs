// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! SCP-style quorum intersection checking (§4.8, §8).
//!
//! A set of nodes is a *quorum* if every node in it has its own slice
//! satisfied by members drawn from the set. Safety requires that any two
//! quorums share at least one node; otherwise the network could fork. This
//! checker is exhaustive (`O(2^n)` over the candidate node set) and is only
//! cheap enough to run for small validator counts.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use agora_crypto::PublicKey;

use crate::slice::QuorumSlice;

/// Above this many validators the exhaustive check is skipped and `true` is
/// returned optimistically; the caller is expected to rely on the
/// construction algorithm's guarantees instead (§4.8 step 2's stake
/// threshold already biases every slice toward overlap).
pub const MAX_NODES_FOR_EXHAUSTIVE_CHECK: usize = 8;

fn is_quorum(nodes: &BTreeSet<PublicKey>, slices: &BTreeMap<PublicKey, QuorumSlice>) -> bool {
    if nodes.is_empty() {
        return false;
    }
    nodes.iter().all(|node| match slices.get(node) {
        Some(slice) => slice.is_satisfied_by(nodes.iter()),
        None => false,
    })
}

/// `true` if every pair of quorums formed from `slices` shares a node, or if
/// the validator count exceeds [`MAX_NODES_FOR_EXHAUSTIVE_CHECK`].
pub fn check_quorum_intersection(slices: &BTreeMap<PublicKey, QuorumSlice>) -> bool {
    let nodes: Vec<PublicKey> = slices.keys().cloned().collect();
    if nodes.len() > MAX_NODES_FOR_EXHAUSTIVE_CHECK {
        return true;
    }

    let mut quorums: Vec<BTreeSet<PublicKey>> = Vec::new();
    for mask in 1u32..(1u32 << nodes.len()) {
        let candidate: BTreeSet<PublicKey> = nodes
            .iter()
            .enumerate()
            .filter(|(index, _)| mask & (1 << index) != 0)
            .map(|(_, node)| node.clone())
            .collect();
        if is_quorum(&candidate, slices) {
            quorums.push(candidate);
        }
    }

    for (i, a) in quorums.iter().enumerate() {
        for b in &quorums[i + 1..] {
            if a.is_disjoint(b) {
                return false;
            }
        }
    }
    true
}
