// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic genesis block construction (§6, S1). A real network's
//! genesis is a fixed, out-of-band artifact; this builds one from the
//! validator seeds an operator's config supplies, the way the teacher's
//! ledger tests build one from a single funding key (`genesis_with_payment`
//! in `agora-ledger`'s own test module).

use agora_blockchain::{merkle_root, Block, Header};
use agora_common::{Amount, Hash};
use agora_crypto::{PrivateKey, PublicKey, Signature};
use agora_transaction::{Input, Lock, Output, Transaction, TxType};
use curve25519_dalek::scalar::Scalar;

/// One genesis-funded identity: its key pair and its starting balance.
pub struct GenesisAllocation {
    pub public_key: PublicKey,
    pub amount: Amount,
}

/// Derive a private key deterministically from a named seed string, for
/// single-operator test networks where validator keys are config-driven
/// rather than generated and distributed out of band.
pub fn key_from_seed(seed: &str) -> PrivateKey {
    let digest = Hash::digest(seed.as_bytes());
    PrivateKey::from_scalar(Scalar::from_bytes_mod_order_wide(digest.as_bytes()))
}

/// Build the single-coinbase genesis block funding every allocation.
pub fn build_genesis(allocations: &[GenesisAllocation]) -> Block {
    let outputs = allocations
        .iter()
        .map(|a| Output {
            amount: a.amount,
            lock: Lock::Key(a.public_key),
        })
        .collect::<Vec<_>>();
    let coinbase = Transaction {
        tx_type: TxType::Coinbase,
        inputs: vec![Input::zeroed()],
        outputs,
        unlock_height: None,
    };
    let header = Header {
        prev_block_hash: Hash::ZERO,
        height: 0,
        merkle_root: merkle_root(&[coinbase.hash()]),
        validator_bitmask: vec![],
        aggregate_signature: Signature::new([0u8; 32], [0u8; 32]),
        enrollments: vec![],
    };
    Block {
        header,
        txs: vec![coinbase],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_derives_the_same_key_twice() {
        let a = key_from_seed("validator-0");
        let b = key_from_seed("validator-0");
        assert_eq!(a.public_key(), b.public_key());
    }

    #[test]
    fn genesis_merkle_root_matches_its_own_transactions() {
        let pk = key_from_seed("validator-0").public_key();
        let block = build_genesis(&[GenesisAllocation {
            public_key: pk,
            amount: Amount::new(1_000_000),
        }]);
        assert_eq!(block.computed_merkle_root(), block.header.merkle_root);
    }
}
