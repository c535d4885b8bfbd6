// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The full block: a header plus its transactions (§3).

use agora_common::Hash;
use agora_transaction::Transaction;
use serde::{Deserialize, Serialize};

use crate::header::Header;
use crate::merkle::merkle_root;

/// A header paired with the transactions it commits to.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub header: Header,
    pub txs: Vec<Transaction>,
}

impl Block {
    pub fn hash(&self) -> Hash {
        self.header.hash()
    }

    /// Recompute the Merkle root from this block's own transactions, to
    /// compare against `header.merkle_root`.
    pub fn computed_merkle_root(&self) -> Hash {
        let leaves: Vec<Hash> = self.txs.iter().map(|tx| tx.hash()).collect();
        merkle_root(&leaves)
    }

    /// Whether `txs` is sorted ascending by transaction hash, a structural
    /// requirement of every block (§3, §4.4).
    pub fn txs_are_sorted(&self) -> bool {
        self.txs
            .windows(2)
            .all(|pair| pair[0].hash() <= pair[1].hash())
    }
}
