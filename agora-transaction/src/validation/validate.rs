// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Transaction validation (§4.3).

use agora_common::Amount;
use agora_script::evaluate;

use super::error::{TransactionValidationError as Error, TransactionValidationResult};
use crate::challenge::TxScriptContext;
use crate::tx::{Transaction, TxType};
use crate::utxo::{utxo_key, Utxo};

/// Looks up a [`Utxo`] by its storage key; implemented by `agora-ledger`'s
/// UTXO set (optionally wrapped in a per-block "used set" that removes
/// entries as they're spent, to reject double-spends within one block).
pub trait UtxoFinder {
    fn find(&self, key: &agora_common::Hash) -> Option<Utxo>;
}

impl<F: Fn(&agora_common::Hash) -> Option<Utxo>> UtxoFinder for F {
    fn find(&self, key: &agora_common::Hash) -> Option<Utxo> {
        self(key)
    }
}

/// Validate `tx` against the UTXO view `finder` exposes at `current_height`.
///
/// On success, returns the transaction's fee (`sum(inputs) - sum(outputs)`).
/// `Coinbase` transactions skip UTXO-referencing checks entirely — there is
/// no prior output to look up — and always report a zero fee.
pub fn validate(
    tx: &Transaction,
    current_height: u64,
    finder: &dyn UtxoFinder,
) -> TransactionValidationResult<Amount> {
    validate_structure(tx)?;
    let output_sum = validate_outputs(tx)?;

    if tx.tx_type == TxType::Coinbase {
        return Ok(Amount::ZERO);
    }

    let (input_sum, utxos) = validate_inputs(tx, current_height, finder)?;
    if output_sum.value() > input_sum.value() {
        return Err(Error::OutputsExceedInputs);
    }
    validate_type_rules(tx, &utxos)?;

    let fee = input_sum
        .checked_sub(output_sum)
        .unwrap_or(Amount::ZERO);
    Ok(fee)
}

fn validate_structure(tx: &Transaction) -> TransactionValidationResult<()> {
    if tx.inputs.is_empty() {
        return Err(Error::NoInputs);
    }
    if tx.outputs.is_empty() {
        return Err(Error::NoOutputs);
    }
    Ok(())
}

fn validate_outputs(tx: &Transaction) -> TransactionValidationResult<Amount> {
    let mut sum = Amount::ZERO;
    for output in &tx.outputs {
        if !output.amount.is_valid_positive() {
            return Err(Error::OutputValueIsZero);
        }
        sum = sum.checked_add(output.amount)?;
    }
    Ok(sum)
}

fn validate_inputs(
    tx: &Transaction,
    current_height: u64,
    finder: &dyn UtxoFinder,
) -> TransactionValidationResult<(Amount, Vec<Utxo>)> {
    let mut sum = Amount::ZERO;
    let mut utxos = Vec::with_capacity(tx.inputs.len());
    for (index, input) in tx.inputs.iter().enumerate() {
        let key = utxo_key(&input.previous_tx_hash, input.output_index);
        let utxo = finder.find(&key).ok_or(Error::MissingUtxo(key))?;

        if utxo.unlock_height > current_height {
            return Err(Error::MeltingUtxoImmature);
        }

        let unlock_age = current_height.saturating_sub(utxo.unlock_height);
        let ctx = TxScriptContext::new(tx, index, unlock_age)
            .expect("index is within tx.inputs by construction of this loop");
        evaluate(
            &utxo.output.lock.as_script_lock(),
            input.unlock_script.as_bytes(),
            &ctx,
        )
        .map_err(|e| Error::InvalidUnlock(index, e))?;

        sum = sum.checked_add(utxo.output.amount)?;
        utxos.push(utxo);
    }
    Ok((sum, utxos))
}

fn validate_type_rules(tx: &Transaction, utxos: &[Utxo]) -> TransactionValidationResult<()> {
    match tx.tx_type {
        TxType::Freeze => {
            if !utxos.iter().all(|u| u.source_tx_type == TxType::Payment) {
                return Err(Error::FreezeInputsMustBePayment);
            }
            let total: u64 = utxos.iter().map(|u| u.output.amount.value()).sum();
            if total < agora_common::MIN_FREEZE_AMOUNT {
                return Err(Error::FreezeAmountBelowMinimum);
            }
        }
        TxType::Payment => {
            let all_freeze = utxos.iter().all(|u| u.source_tx_type == TxType::Freeze);
            let all_payment = utxos.iter().all(|u| u.source_tx_type == TxType::Payment);
            if !(all_freeze || all_payment) {
                return Err(Error::PaymentInputsMixedUtxoTypes);
            }
        }
        TxType::Coinbase => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lock::{Lock, Unlock};
    use crate::tx::{Input, Output};
    use agora_common::Hash;
    use agora_crypto::{schnorr_sign, PrivateKey};
    use curve25519_dalek::{constants::ED25519_BASEPOINT_TABLE, scalar::Scalar};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;
    use std::collections::HashMap;

    fn signer(seed: u64) -> PrivateKey {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        PrivateKey::from_scalar(Scalar::random(&mut rng))
    }

    fn sign_all(sk: &PrivateKey, tx: &Transaction, input_index: usize, seed: u64) -> Vec<u8> {
        let pk = sk.public_key();
        let challenge = crate::challenge::get_challenge(
            tx,
            agora_script::SigHash::All,
            input_index,
        )
        .unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let nonce = Scalar::random(&mut rng);
        let r = &nonce * ED25519_BASEPOINT_TABLE;
        let sig = schnorr_sign(sk.scalar(), &pk, r, nonce, &challenge);
        sig.to_bytes().to_vec()
    }

    fn prev_hash() -> Hash {
        Hash::digest(b"parent")
    }

    #[test]
    fn simple_payment_passes_with_valid_signature() {
        let sk = signer(1);
        let pk = sk.public_key();

        let mut tx = Transaction {
            tx_type: TxType::Payment,
            inputs: vec![Input {
                previous_tx_hash: prev_hash(),
                output_index: 0,
                unlock_age: 0,
                unlock_script: Unlock(vec![]),
            }],
            outputs: vec![Output {
                amount: Amount::new(90),
                lock: Lock::KeyHash(Hash::digest(b"dest")),
            }],
            unlock_height: None,
        };
        let sig = sign_all(&sk, &tx, 0, 2);
        tx.inputs[0].unlock_script = Unlock(sig);

        let key = utxo_key(&prev_hash(), 0);
        let mut utxos = HashMap::new();
        utxos.insert(
            key,
            Utxo::new(
                0,
                TxType::Payment,
                Output {
                    amount: Amount::new(100),
                    lock: Lock::Key(pk),
                },
            ),
        );

        let finder = |k: &Hash| utxos.get(k).cloned();
        let fee = validate(&tx, 10, &finder).unwrap();
        assert_eq!(fee.value(), 10);
    }

    #[test]
    fn zero_value_output_is_rejected() {
        let sk = signer(3);
        let pk = sk.public_key();
        let mut tx = Transaction {
            tx_type: TxType::Payment,
            inputs: vec![Input {
                previous_tx_hash: prev_hash(),
                output_index: 0,
                unlock_age: 0,
                unlock_script: Unlock(vec![]),
            }],
            outputs: vec![Output {
                amount: Amount::ZERO,
                lock: Lock::KeyHash(Hash::digest(b"dest")),
            }],
            unlock_height: None,
        };
        let sig = sign_all(&sk, &tx, 0, 4);
        tx.inputs[0].unlock_script = Unlock(sig);

        let key = utxo_key(&prev_hash(), 0);
        let mut utxos = HashMap::new();
        utxos.insert(
            key,
            Utxo::new(
                0,
                TxType::Payment,
                Output {
                    amount: Amount::new(100),
                    lock: Lock::Key(pk),
                },
            ),
        );
        let finder = |k: &Hash| utxos.get(k).cloned();
        assert_eq!(validate(&tx, 1, &finder), Err(Error::OutputValueIsZero));
    }

    #[test]
    fn melting_utxo_before_maturity_is_rejected() {
        let sk = signer(5);
        let pk = sk.public_key();
        let mut tx = Transaction {
            tx_type: TxType::Payment,
            inputs: vec![Input {
                previous_tx_hash: prev_hash(),
                output_index: 0,
                unlock_age: 0,
                unlock_script: Unlock(vec![]),
            }],
            outputs: vec![Output {
                amount: Amount::new(50),
                lock: Lock::KeyHash(Hash::digest(b"dest")),
            }],
            unlock_height: None,
        };
        let sig = sign_all(&sk, &tx, 0, 6);
        tx.inputs[0].unlock_script = Unlock(sig);

        let key = utxo_key(&prev_hash(), 0);
        let mut utxos = HashMap::new();
        // melted at height 2, matures at height 2 + 2016
        utxos.insert(
            key,
            Utxo::new(
                2 + 2016,
                TxType::Payment,
                Output {
                    amount: Amount::new(100),
                    lock: Lock::Key(pk),
                },
            ),
        );
        let finder = |k: &Hash| utxos.get(k).cloned();
        assert_eq!(
            validate(&tx, 2 + 2015, &finder),
            Err(Error::MeltingUtxoImmature)
        );
        assert!(validate(&tx, 2 + 2016, &finder).is_ok());
    }
}
