// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Block validation (§4.4).

use agora_transaction::Transaction;

use super::error::{BlockValidationError as Error, BlockValidationResult};
use crate::block::Block;
use crate::header::TXS_PER_BLOCK;

/// Validates one transaction against whatever UTXO view the caller (the
/// ledger) currently has at `height`; lets this crate check blocks without
/// depending on `agora-ledger`.
pub trait TxValidator {
    fn validate(&self, tx: &Transaction, height: u64) -> bool;
}

impl<F: Fn(&Transaction, u64) -> bool> TxValidator for F {
    fn validate(&self, tx: &Transaction, height: u64) -> bool {
        self(tx, height)
    }
}

/// Validate `block` against `parent` (`None` only for height 0) and
/// `genesis`, delegating per-transaction validity to `tx_validator`.
///
/// `active_validator_count` is the number of validators already enrolled
/// before this block; combined with the block's own new enrollments it must
/// meet `min_validator_count` (§4.4's last sentence).
pub fn validate(
    block: &Block,
    parent: Option<&Block>,
    genesis: &Block,
    active_validator_count: usize,
    min_validator_count: usize,
    tx_validator: &dyn TxValidator,
) -> BlockValidationResult<()> {
    if block.header.height == 0 {
        return if block == genesis {
            Ok(())
        } else {
            Err(Error::GenesisMismatch)
        };
    }

    let parent = parent.ok_or(Error::MissingParent)?;

    if block.header.height != parent.header.height + 1 {
        return Err(Error::HeightMismatch {
            expected: parent.header.height + 1,
            actual: block.header.height,
        });
    }
    if block.header.prev_block_hash != parent.hash() {
        return Err(Error::PrevHashMismatch);
    }
    if block.txs.len() != TXS_PER_BLOCK {
        return Err(Error::WrongTxCount {
            expected: TXS_PER_BLOCK,
            actual: block.txs.len(),
        });
    }
    if !block.txs_are_sorted() {
        return Err(Error::TxsNotSorted);
    }
    if block.computed_merkle_root() != block.header.merkle_root {
        return Err(Error::MerkleRootMismatch);
    }
    for (index, tx) in block.txs.iter().enumerate() {
        if !tx_validator.validate(tx, block.header.height) {
            return Err(Error::InvalidTransaction(index));
        }
    }

    let combined = active_validator_count + block.header.enrollments.len();
    if combined < min_validator_count {
        return Err(Error::InsufficientValidatorCount {
            active: combined,
            min: min_validator_count,
        });
    }

    Ok(())
}
