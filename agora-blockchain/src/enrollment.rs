// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Validator enrollment records and pre-image chains (§3, §4.6).
//!
//! The lifecycle state machine (pending/active/expired) and per-height
//! bookkeeping live in `agora-ledger`'s enrollment manager; this module
//! only defines the data these records carry and the pre-image chain math
//! both that manager and the quorum builder rely on.

use agora_common::Hash;
use agora_crypto::Signature;
use serde::{Deserialize, Serialize};

/// Number of blocks an enrollment stays active before it must be renewed.
pub const CYCLE_LENGTH: u64 = 1008;

/// A validator's declaration of intent to participate, bound to a specific
/// Freeze UTXO and the head of a reverse hash chain used for randomness.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    /// The Freeze UTXO's storage key, proving this validator has bonded
    /// stake.
    pub utxo_key: Hash,
    pub cycle_length: u64,
    /// The head of the reverse pre-image chain (`preimage[0]`).
    pub random_seed: Hash,
    /// A signature over `utxo_key` from the Freeze UTXO's owning key,
    /// proving the enroller controls the bonded stake.
    pub enroll_sig: Signature,
}

impl Enrollment {
    pub fn new(utxo_key: Hash, random_seed: Hash, enroll_sig: Signature) -> Self {
        Enrollment {
            utxo_key,
            cycle_length: CYCLE_LENGTH,
            random_seed,
            enroll_sig,
        }
    }
}

/// Build a reverse hash chain of `length + 1` pre-images from `seed`:
/// `chain[length] = seed`, `chain[i] = hash(chain[i + 1])`, so
/// `chain[0]` is the value published as `Enrollment::random_seed`.
///
/// Each pre-image is revealed in turn, earliest index first, one per block
/// height the validator signs.
pub fn build_preimage_chain(seed: Hash, length: u64) -> Vec<Hash> {
    let mut chain = vec![Hash::ZERO; (length + 1) as usize];
    let last = length as usize;
    chain[last] = seed;
    for i in (0..last).rev() {
        chain[i] = Hash::digest(chain[i + 1].as_bytes());
    }
    chain
}

/// Whether `revealed` is the correct pre-image of `previous` (i.e.
/// `hash(revealed) == previous`), the per-reveal check §4.6 requires.
pub fn verifies_predecessor(revealed: &Hash, previous: &Hash) -> bool {
    &Hash::digest(revealed.as_bytes()) == previous
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_links_hash_to_predecessor() {
        let chain = build_preimage_chain(Hash::digest(b"tail"), 4);
        for i in 0..4 {
            assert!(verifies_predecessor(&chain[i + 1], &chain[i]));
        }
    }

    #[test]
    fn wrong_preimage_is_rejected() {
        let chain = build_preimage_chain(Hash::digest(b"tail"), 4);
        assert!(!verifies_predecessor(&chain[0], &chain[0]));
    }

    #[test]
    fn chain_head_matches_seed_tail() {
        let seed = Hash::digest(b"tail");
        let chain = build_preimage_chain(seed, 3);
        assert_eq!(chain[3], seed);
    }
}
