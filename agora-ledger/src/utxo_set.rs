// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The keyed UTXO mapping and its per-block double-spend guard (§4.5).

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use agora_common::Hash;
use agora_transaction::validation::UtxoFinder;
use agora_transaction::{utxo_key, Transaction, TxType, Utxo};

/// Blocks a melted Freeze must wait before the resulting Payment UTXO is
/// spendable again (§3, §8 property 5).
pub const MELT_DELAY: u64 = 2016;

/// How many blocks after `height` a transaction's outputs become spendable,
/// given the transaction's own type and whether its inputs all trace back
/// to Freeze UTXOs (§4.5: "1 for Payments spending Payments, 2016 for
/// Payments spending Freezes, 1 for Freezes").
pub fn unlock_delta(tx_type: TxType, inputs_are_freeze_sourced: bool) -> u64 {
    match tx_type {
        TxType::Payment if inputs_are_freeze_sourced => MELT_DELAY,
        _ => 1,
    }
}

/// Keyed mapping from `hash_multi(tx_hash, out_index)` to [`Utxo`].
///
/// Readers get owned clones rather than references into the map, so no
/// caller can observe a UTXO while `apply_transaction`/`restore` mutates
/// this set underneath it (§9's UTXO-ownership note).
#[derive(Clone, Debug, Default)]
pub struct UtxoSet {
    entries: BTreeMap<Hash, Utxo>,
}

impl UtxoSet {
    pub fn new() -> Self {
        UtxoSet::default()
    }

    pub fn get(&self, key: &Hash) -> Option<Utxo> {
        self.entries.get(key).cloned()
    }

    pub fn contains(&self, key: &Hash) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove `tx`'s spent inputs and insert its outputs, unlockable at
    /// `height + unlock_delta(..)`. `spent_utxos` must be the UTXOs the
    /// inputs referenced, in input order, looked up before this call (the
    /// caller already did this during validation).
    pub fn apply_transaction(&mut self, tx: &Transaction, height: u64, spent_utxos: &[Utxo]) {
        for input in &tx.inputs {
            let key = utxo_key(&input.previous_tx_hash, input.output_index);
            self.entries.remove(&key);
        }

        let inputs_are_freeze_sourced = spent_utxos
            .iter()
            .all(|utxo| utxo.source_tx_type == TxType::Freeze);
        let delta = unlock_delta(tx.tx_type, inputs_are_freeze_sourced);
        let unlock_height = height + delta;

        let tx_hash = tx.hash();
        for (index, output) in tx.outputs.iter().enumerate() {
            let key = utxo_key(&tx_hash, index as u32);
            let utxo = Utxo::new(unlock_height, tx.tx_type, output.clone());
            self.entries.insert(key, utxo);
        }
    }
}

/// Wraps a [`UtxoSet`] so a second lookup of the same key within one block
/// fails, the way `agora-transaction`'s validator expects double-spends
/// within a single block to be rejected regardless of transaction order
/// (§4.5, §5).
pub struct UsedSetFinder<'a> {
    utxo_set: &'a UtxoSet,
    used: RefCell<BTreeSet<Hash>>,
}

impl<'a> UsedSetFinder<'a> {
    pub fn new(utxo_set: &'a UtxoSet) -> Self {
        UsedSetFinder {
            utxo_set,
            used: RefCell::new(BTreeSet::new()),
        }
    }
}

impl<'a> UtxoFinder for UsedSetFinder<'a> {
    fn find(&self, key: &Hash) -> Option<Utxo> {
        let mut used = self.used.borrow_mut();
        if used.contains(key) {
            return None;
        }
        let utxo = self.utxo_set.get(key)?;
        used.insert(*key);
        Some(utxo)
    }
}
