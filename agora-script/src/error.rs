// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Script evaluation errors.
//!
//! Every failure mode is a descriptive string, never a panic — a malformed
//! or adversarial script must terminate cleanly with a reason the caller can
//! log or gossip-ban on (§7).

use displaydoc::Display;

/// Reasons a script may fail to evaluate.
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum ScriptError {
    /// unknown opcode byte {0:#04x}
    UnknownOpcode(u8),
    /// PUSH_DATA size {0} is out of the allowed 1..=512 range
    InvalidPushSize(usize),
    /// script ended in the middle of a push operand
    TruncatedPush,
    /// stack item exceeds the 512-byte limit
    ItemTooLarge,
    /// total stack size exceeds the 16384-byte limit
    StackTooLarge,
    /// `{0}` opcode requires an item on the stack
    StackUnderflow(&'static str),
    /// `HASH` opcode requires an item on the stack
    HashRequiresItem,
    /// `CHECK_SIG`/`VERIFY_SIG` requires a 32-byte public key
    InvalidPublicKeyLength,
    /// `CHECK_SIG`/`VERIFY_SIG` requires a signature blob of 65 bytes (64-byte signature + sighash tag)
    InvalidSignatureBlobLength,
    /// unknown SigHash tag byte {0}
    InvalidSigHashTag(u8),
    /// `VERIFY_SIG` signature failed validation
    SignatureFailedValidation,
    /// `VERIFY_EQUAL` items were not equal
    EqualityFailedValidation,
    /// `IF`/`NOT_IF` requires a boolean item on the stack
    IfRequiresBoolean,
    /// `ELSE` with no matching `IF`
    ElseWithoutIf,
    /// `END_IF` with no matching `IF`
    EndIfWithoutIf,
    /// script ended with unterminated `IF` scope(s)
    UnterminatedIf,
    /// `VERIFY_INPUT_LOCK` requires unlock age >= {required}, got {actual}
    InputLockNotMature { required: u64, actual: u64 },
    /// `VERIFY_TX_SEQ` mismatch: expected {expected}, got {actual}
    SequenceMismatch { expected: u64, actual: u64 },
    /// script evaluation did not leave exactly one `TRUE` value on the stack
    DidNotReturnTrue,
    /// redeem script hash did not match the `ScriptHash` lock
    RedeemScriptHashMismatch,
    /// `ScriptHash` unlock is missing the redeem script
    MissingRedeemScript,
    /// `KeyHash` unlock must be signature (64 bytes) followed by a 32-byte public key
    MalformedKeyHashUnlock,
    /// `KeyHash` public key does not hash to the lock
    KeyHashMismatch,
    /// `Key` unlock must be exactly a 64-byte signature
    MalformedKeyUnlock,
}
