// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Fixed opcode byte values.
//!
//! Push opcodes occupy the low range so that the opcode byte *is* the
//! payload length for short pushes: `PUSH_BYTES_1..PUSH_BYTES_64` are the
//! byte values `1..=64`. Everything else lives above that range; the engine
//! refuses any byte it does not recognize at syntax-check time (§4.2).

use crate::error::ScriptError;

/// Smallest opcode value reserved for a direct one-byte push length.
pub const PUSH_BYTES_MIN: u8 = 1;
/// Largest opcode value reserved for a direct one-byte push length.
pub const PUSH_BYTES_MAX: u8 = 64;

/// A decoded opcode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Opcode {
    /// Push the next `n` bytes (`n` is the opcode value itself, 1..=64).
    PushBytes(u8),
    /// Push the next `size` bytes, where `size` (1..=512) is read from the
    /// following 1-byte operand.
    PushData1,
    /// Push the next `size` bytes, where `size` (1..=512) is read from the
    /// following 2-byte little-endian operand.
    PushData2,
    /// Push a single `0x01` byte.
    True,
    /// Push a single `0x00` byte.
    False,
    /// Duplicate the top stack item.
    Dup,
    /// Pop one item, push its 64-byte hash.
    Hash,
    /// Pop pubkey then signature blob; push `TRUE`/`FALSE`.
    CheckSig,
    /// As `CheckSig`, but fail the script instead of pushing `FALSE`.
    VerifySig,
    /// Pop two items; push `TRUE`/`FALSE` according to byte equality.
    CheckEqual,
    /// As `CheckEqual`, but fail the script instead of pushing `FALSE`.
    VerifyEqual,
    /// Pop a boolean, enter a new conditional scope.
    If,
    /// Pop a boolean, enter a new conditional scope with the sense inverted.
    NotIf,
    /// Toggle the innermost conditional scope.
    Else,
    /// Close the innermost conditional scope.
    EndIf,
    /// Fail unless the current input's unlock-age is >= the following
    /// 8-byte little-endian operand.
    VerifyInputLock,
    /// Fail unless the transaction's sequence number equals the following
    /// 8-byte little-endian operand.
    VerifyTxSeq,
}

const OP_PUSH_DATA_1: u8 = 0xF0;
const OP_PUSH_DATA_2: u8 = 0xF1;
const OP_TRUE: u8 = 0xF2;
const OP_FALSE: u8 = 0xF3;
const OP_DUP: u8 = 0xF4;
const OP_HASH: u8 = 0xF5;
const OP_CHECK_SIG: u8 = 0xF6;
const OP_VERIFY_SIG: u8 = 0xF7;
const OP_CHECK_EQUAL: u8 = 0xF8;
const OP_VERIFY_EQUAL: u8 = 0xF9;
const OP_IF: u8 = 0xFA;
const OP_NOT_IF: u8 = 0xFB;
const OP_ELSE: u8 = 0xFC;
const OP_END_IF: u8 = 0xFD;
const OP_VERIFY_INPUT_LOCK: u8 = 0xFE;
const OP_VERIFY_TX_SEQ: u8 = 0xFF;

impl Opcode {
    /// Decode a single opcode byte. Does not consume any following operand
    /// bytes — the caller reads those separately once it knows the opcode.
    pub fn from_byte(byte: u8) -> Result<Self, ScriptError> {
        match byte {
            PUSH_BYTES_MIN..=PUSH_BYTES_MAX => Ok(Opcode::PushBytes(byte)),
            OP_PUSH_DATA_1 => Ok(Opcode::PushData1),
            OP_PUSH_DATA_2 => Ok(Opcode::PushData2),
            OP_TRUE => Ok(Opcode::True),
            OP_FALSE => Ok(Opcode::False),
            OP_DUP => Ok(Opcode::Dup),
            OP_HASH => Ok(Opcode::Hash),
            OP_CHECK_SIG => Ok(Opcode::CheckSig),
            OP_VERIFY_SIG => Ok(Opcode::VerifySig),
            OP_CHECK_EQUAL => Ok(Opcode::CheckEqual),
            OP_VERIFY_EQUAL => Ok(Opcode::VerifyEqual),
            OP_IF => Ok(Opcode::If),
            OP_NOT_IF => Ok(Opcode::NotIf),
            OP_ELSE => Ok(Opcode::Else),
            OP_END_IF => Ok(Opcode::EndIf),
            OP_VERIFY_INPUT_LOCK => Ok(Opcode::VerifyInputLock),
            OP_VERIFY_TX_SEQ => Ok(Opcode::VerifyTxSeq),
            other => Err(ScriptError::UnknownOpcode(other)),
        }
    }

    /// A full syntax check of an opcode stream: every byte, including push
    /// operands, must be a recognized opcode or a well-formed push payload.
    /// Used to reject malformed scripts before execution begins.
    pub fn check_syntax(script: &[u8]) -> Result<(), ScriptError> {
        let mut i = 0;
        while i < script.len() {
            let op = Opcode::from_byte(script[i])?;
            i += 1;
            match op {
                Opcode::PushBytes(n) => {
                    let n = n as usize;
                    if i + n > script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    i += n;
                }
                Opcode::PushData1 => {
                    if i >= script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    let size = script[i] as usize;
                    i += 1;
                    if !(1..=512).contains(&size) {
                        return Err(ScriptError::InvalidPushSize(size));
                    }
                    if i + size > script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    i += size;
                }
                Opcode::PushData2 => {
                    if i + 2 > script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    let size = u16::from_le_bytes([script[i], script[i + 1]]) as usize;
                    i += 2;
                    if !(1..=512).contains(&size) {
                        return Err(ScriptError::InvalidPushSize(size));
                    }
                    if i + size > script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    i += size;
                }
                Opcode::VerifyInputLock | Opcode::VerifyTxSeq => {
                    if i + 8 > script.len() {
                        return Err(ScriptError::TruncatedPush);
                    }
                    i += 8;
                }
                _ => {}
            }
        }
        Ok(())
    }
}
