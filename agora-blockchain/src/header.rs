// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Block headers (§3).

use agora_common::{hash_multi, Hash};
use agora_crypto::Signature;
use serde::{Deserialize, Serialize};

use crate::enrollment::Enrollment;

/// The fixed number of transactions every non-genesis block carries (§3).
pub const TXS_PER_BLOCK: usize = 8;

/// A block header: everything needed to verify a block's place in the
/// chain and its aggregate validator signature, without the transaction
/// bodies themselves.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Header {
    pub prev_block_hash: Hash,
    pub height: u64,
    pub merkle_root: Hash,
    /// Which of the sorted active-validator public keys signed, in
    /// sorted-key order (§4.1's last paragraph).
    pub validator_bitmask: Vec<bool>,
    pub aggregate_signature: Signature,
    pub enrollments: Vec<Enrollment>,
}

impl Header {
    /// The header's identifying hash; this, not any transaction hash, is
    /// what the aggregate validator signature commits to.
    pub fn hash(&self) -> Hash {
        let bitmask_bytes: Vec<u8> = self
            .validator_bitmask
            .iter()
            .map(|&b| b as u8)
            .collect();
        let height_bytes = self.height.to_le_bytes();
        let enrollment_count_bytes = (self.enrollments.len() as u64).to_le_bytes();
        let mut enrollment_hashes = Vec::with_capacity(self.enrollments.len());
        for enrollment in &self.enrollments {
            enrollment_hashes.push(hash_multi(&[
                enrollment.utxo_key.as_bytes(),
                enrollment.random_seed.as_bytes(),
            ]));
        }
        let mut parts: Vec<&[u8]> = vec![
            self.prev_block_hash.as_bytes(),
            &height_bytes,
            self.merkle_root.as_bytes(),
            &bitmask_bytes,
            &enrollment_count_bytes,
        ];
        for h in &enrollment_hashes {
            parts.push(h.as_bytes());
        }
        hash_multi(&parts)
    }
}
