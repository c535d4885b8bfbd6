// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Typed errors the Ledger's entry points can fail with (§7's supplemented
//! structural-error type, replacing a bare `Option<String>`).

use displaydoc::Display;

use agora_blockchain::validation::BlockValidationError;
use agora_transaction::validation::TransactionValidationError;

use crate::enrollment::EnrollmentError;

/// Reasons [`crate::Ledger::validate_consensus_data`] or internal block
/// application can fail.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum LedgerError {
    /// block failed validation: {0}
    InvalidBlock(BlockValidationError),
    /// a transaction in the nominated set failed validation: {0}
    InvalidTransaction(TransactionValidationError),
    /// an enrollment in the nominated set failed validation: {0}
    InvalidEnrollment(EnrollmentError),
    /// nominated transaction set is not sorted ascending by hash
    TxSetNotSorted,
    /// genesis block loaded from storage differs from the configured genesis
    GenesisMismatch,
}

impl From<BlockValidationError> for LedgerError {
    fn from(e: BlockValidationError) -> Self {
        LedgerError::InvalidBlock(e)
    }
}

impl From<TransactionValidationError> for LedgerError {
    fn from(e: TransactionValidationError) -> Self {
        LedgerError::InvalidTransaction(e)
    }
}

impl From<EnrollmentError> for LedgerError {
    fn from(e: EnrollmentError) -> Self {
        LedgerError::InvalidEnrollment(e)
    }
}
