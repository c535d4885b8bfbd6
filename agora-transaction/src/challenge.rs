// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-input signature challenges (§4.1) and the [`agora_script::ScriptContext`]
//! bridge the validator hands to the script engine.

use agora_common::{hash_multi, Hash};
use agora_script::{ScriptContext, SigHash};
use displaydoc::Display;

use crate::tx::Transaction;

/// Reasons [`get_challenge`] or [`TxScriptContext::new`] may refuse to run.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ChallengeError {
    /// input index {0} is out of range for this transaction
    InputIndexOutOfRange(usize),
}

/// The digest a signature over `tx.inputs[input_index]` must commit to.
///
/// `SigHash::All` binds the whole transaction; `SigHash::NoInput` binds the
/// transaction with that one input zeroed out, so the same signature stays
/// valid if the input is later re-pointed at a different outpoint (the
/// mechanism Eltoo settlement transactions rely on, §4.9/§4.10).
pub fn get_challenge(
    tx: &Transaction,
    sig_hash: SigHash,
    input_index: usize,
) -> Result<Hash, ChallengeError> {
    if input_index >= tx.inputs.len() {
        return Err(ChallengeError::InputIndexOutOfRange(input_index));
    }
    let tag = [sig_hash.tag()];
    let tx_hash = match sig_hash {
        SigHash::All => tx.hash(),
        SigHash::NoInput => tx.with_input_blanked(input_index).hash(),
    };
    Ok(hash_multi(&[tx_hash.as_bytes(), &tag]))
}

/// Binds a `(transaction, input index)` pair to the facts
/// [`agora_script::evaluate`] needs: the signature challenge under either
/// `SigHash` mode, how mature the referenced UTXO is, and the
/// transaction's sequence number.
///
/// The transaction data model (§3) carries only one optional numeric field
/// beyond its inputs/outputs — `unlock_height` — and Eltoo's "sequence
/// number" (§4.9) has no separate field of its own, so `tx_sequence` reuses
/// it, the way Bitcoin overloads `nSequence`/`nLockTime` for more than one
/// purpose depending on context.
pub struct TxScriptContext<'a> {
    tx: &'a Transaction,
    input_index: usize,
    input_unlock_age: u64,
}

impl<'a> TxScriptContext<'a> {
    /// `input_unlock_age` is the number of blocks elapsed since the UTXO
    /// referenced by `tx.inputs[input_index]` was created, as computed by
    /// the caller from the ledger's current height and the UTXO's recorded
    /// `unlock_height` — never trusted from the transaction itself.
    pub fn new(
        tx: &'a Transaction,
        input_index: usize,
        input_unlock_age: u64,
    ) -> Result<Self, ChallengeError> {
        if input_index >= tx.inputs.len() {
            return Err(ChallengeError::InputIndexOutOfRange(input_index));
        }
        Ok(TxScriptContext {
            tx,
            input_index,
            input_unlock_age,
        })
    }
}

impl ScriptContext for TxScriptContext<'_> {
    fn challenge(&self, sig_hash: SigHash) -> Hash {
        get_challenge(self.tx, sig_hash, self.input_index)
            .expect("input_index validated in TxScriptContext::new")
    }

    fn input_unlock_age(&self) -> u64 {
        self.input_unlock_age
    }

    fn tx_sequence(&self) -> u64 {
        self.tx.unlock_height.unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{Lock, Unlock};
    use crate::tx::{Input, Output, TxType};
    use agora_common::Amount;

    fn sample_tx() -> Transaction {
        Transaction {
            tx_type: TxType::Payment,
            inputs: vec![Input {
                previous_tx_hash: Hash::digest(b"parent"),
                output_index: 0,
                unlock_age: 0,
                unlock_script: Unlock(vec![]),
            }],
            outputs: vec![Output {
                amount: Amount::new(10),
                lock: Lock::KeyHash(Hash::digest(b"dest")),
            }],
            unlock_height: Some(7),
        }
    }

    #[test]
    fn out_of_range_index_is_rejected() {
        let tx = sample_tx();
        assert_eq!(
            get_challenge(&tx, SigHash::All, 5),
            Err(ChallengeError::InputIndexOutOfRange(5))
        );
    }

    #[test]
    fn all_and_no_input_diverge() {
        let tx = sample_tx();
        let all = get_challenge(&tx, SigHash::All, 0).unwrap();
        let no_input = get_challenge(&tx, SigHash::NoInput, 0).unwrap();
        assert_ne!(all, no_input);
    }

    #[test]
    fn no_input_challenge_is_stable_across_differing_inputs() {
        let mut tx_a = sample_tx();
        let mut tx_b = sample_tx();
        tx_a.inputs[0].output_index = 1;
        tx_b.inputs[0].output_index = 2;
        let challenge_a = get_challenge(&tx_a, SigHash::NoInput, 0).unwrap();
        let challenge_b = get_challenge(&tx_b, SigHash::NoInput, 0).unwrap();
        assert_eq!(challenge_a, challenge_b);
    }

    #[test]
    fn script_context_reports_tx_sequence_from_unlock_height() {
        let tx = sample_tx();
        let ctx = TxScriptContext::new(&tx, 0, 3).unwrap();
        assert_eq!(ctx.tx_sequence(), 7);
        assert_eq!(ctx.input_unlock_age(), 3);
    }
}
