// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Reasons a block may fail to be valid against its parent (§4.4).

use displaydoc::Display;

/// Type alias for block validation results.
pub type BlockValidationResult<T> = Result<T, BlockValidationError>;

/// Reasons why a block is invalid.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum BlockValidationError {
    /// height-0 block does not match the configured genesis block
    GenesisMismatch,
    /// non-genesis block requires a parent
    MissingParent,
    /// expected height {expected}, got {actual}
    HeightMismatch { expected: u64, actual: u64 },
    /// previous block hash does not match the parent's hash
    PrevHashMismatch,
    /// expected {expected} transactions, got {actual}
    WrongTxCount { expected: usize, actual: usize },
    /// transactions are not sorted ascending by hash
    TxsNotSorted,
    /// Merkle root does not match the block's transactions
    MerkleRootMismatch,
    /// transaction at index {0} failed validation
    InvalidTransaction(usize),
    /// active validators ({active}) plus new enrollments fall below the minimum ({min})
    InsufficientValidatorCount { active: usize, min: usize },
}
