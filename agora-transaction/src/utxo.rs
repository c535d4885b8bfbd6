// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Unspent transaction outputs and their lookup key (§3, §4.5).

use agora_common::{hash_multi, Hash};
use serde::{Deserialize, Serialize};

use crate::tx::{Output, TxType};

/// The key a [`Utxo`] is stored under: `hash_multi(tx_hash, out_index)`.
pub fn utxo_key(tx_hash: &Hash, output_index: u32) -> Hash {
    hash_multi(&[tx_hash.as_bytes(), &output_index.to_le_bytes()])
}

/// A single unspent output, plus the bookkeeping the ledger needs to
/// enforce freeze/melt timing (§3).
///
/// `unlock_height` is the first height at which this UTXO may be spent: for
/// a `Payment` output created by melting a `Freeze` UTXO this is
/// `creation_height + 2016`; for every other case it is `creation_height`
/// (Freeze UTXOs) or `creation_height + 1` (ordinary Payment chains), per
/// §4.5's `update_cache` rule.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Utxo {
    pub unlock_height: u64,
    pub source_tx_type: TxType,
    pub output: Output,
}

impl Utxo {
    pub fn new(unlock_height: u64, source_tx_type: TxType, output: Output) -> Self {
        Utxo {
            unlock_height,
            source_tx_type,
            output,
        }
    }

    /// Whether this UTXO may be spent at `height`.
    pub fn is_spendable_at(&self, height: u64) -> bool {
        height >= self.unlock_height
    }
}
