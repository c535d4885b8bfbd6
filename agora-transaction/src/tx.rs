// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The transaction type and its structural helpers (§3).

use agora_common::{hash_multi, Amount, Hash};
use serde::{Deserialize, Serialize};

use crate::lock::{Lock, Unlock};

/// What a transaction's inputs are allowed to reference and what its
/// outputs become once accepted (§3, §4.3).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum TxType {
    /// An ordinary spend. May melt a `Freeze` UTXO or continue spending an
    /// already-melted `Payment` chain.
    Payment,
    /// Bonds inputs (which must be `Payment` UTXOs summing to at least
    /// `MIN_FREEZE_AMOUNT`) into validator-eligible `Freeze` outputs.
    Freeze,
    /// The block-reward transaction; has no real inputs to validate against
    /// the UTXO set.
    Coinbase,
}

/// A reference to a previous output, plus whatever the matching
/// [`Lock`](crate::Lock)'s unlock machinery needs.
///
/// `unlock_age` is supplied by the spender as part of constructing the
/// unlock witness (mirroring a BIP68-style relative-locktime field); the
/// validator does not trust it on its own. [`crate::TxScriptContext`] instead
/// recomputes the true age from the referenced UTXO's recorded
/// `unlock_height` against the height the transaction is being validated at,
/// and it is that recomputed value, not this field, that `VERIFY_INPUT_LOCK`
/// sees.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub previous_tx_hash: Hash,
    pub output_index: u32,
    pub unlock_age: u64,
    pub unlock_script: Unlock,
}

impl Input {
    /// An all-zero input, used to blank the input named by a
    /// `SigHash::NoInput` challenge.
    pub fn zeroed() -> Self {
        Input {
            previous_tx_hash: Hash::ZERO,
            output_index: 0,
            unlock_age: 0,
            unlock_script: Unlock::default(),
        }
    }
}

/// A spendable amount locked under some spending condition.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Output {
    pub amount: Amount,
    pub lock: Lock,
}

/// A transaction: some inputs consumed, some outputs created.
///
/// Structural invariants (enforced by [`crate::validation::validate`], not
/// by construction): at least one input and one output; every output
/// strictly positive and non-overflowing; `sum(outputs) <= sum(inputs)`; and
/// the type-specific rules on what UTXO types the inputs may reference
/// (§3).
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub tx_type: TxType,
    pub inputs: Vec<Input>,
    pub outputs: Vec<Output>,
    pub unlock_height: Option<u64>,
}

impl Transaction {
    /// The transaction's identifying hash, used to key it in the mempool,
    /// sort it within a block, and key the UTXOs it creates.
    pub fn hash(&self) -> Hash {
        let tx_type_byte = [match self.tx_type {
            TxType::Payment => 0u8,
            TxType::Freeze => 1,
            TxType::Coinbase => 2,
        }];
        let mut parts: Vec<&[u8]> = vec![&tx_type_byte];
        let input_bytes: Vec<Vec<u8>> = self.inputs.iter().map(encode_input).collect();
        let output_bytes: Vec<Vec<u8>> = self.outputs.iter().map(encode_output).collect();
        for bytes in &input_bytes {
            parts.push(bytes);
        }
        for bytes in &output_bytes {
            parts.push(bytes);
        }
        let unlock_height_bytes = self.unlock_height.unwrap_or(0).to_le_bytes();
        parts.push(&unlock_height_bytes);
        hash_multi(&parts)
    }

    /// A copy of this transaction with `inputs[index]` zeroed out, used to
    /// build the `SigHash::NoInput` challenge.
    pub fn with_input_blanked(&self, index: usize) -> Transaction {
        let mut clone = self.clone();
        if let Some(slot) = clone.inputs.get_mut(index) {
            *slot = Input::zeroed();
        }
        clone
    }
}

fn encode_input(input: &Input) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(64 + 4 + 8 + input.unlock_script.as_bytes().len());
    bytes.extend_from_slice(input.previous_tx_hash.as_bytes());
    bytes.extend_from_slice(&input.output_index.to_le_bytes());
    bytes.extend_from_slice(&input.unlock_age.to_le_bytes());
    bytes.extend_from_slice(input.unlock_script.as_bytes());
    bytes
}

fn encode_output(output: &Output) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&output.amount.value().to_le_bytes());
    match &output.lock {
        Lock::Key(pk) => {
            bytes.push(0);
            bytes.extend_from_slice(&pk.to_bytes());
        }
        Lock::KeyHash(hash) => {
            bytes.push(1);
            bytes.extend_from_slice(hash.as_bytes());
        }
        Lock::Script(script) => {
            bytes.push(2);
            bytes.extend_from_slice(script);
        }
        Lock::ScriptHash(hash) => {
            bytes.push(3);
            bytes.extend_from_slice(hash.as_bytes());
        }
    }
    bytes
}
