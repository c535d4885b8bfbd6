// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Eltoo lock/unlock script generators (§4.10).
//!
//! The byte values below mirror `agora_script::opcode`'s private opcode
//! table; they aren't re-exported from that crate (only its `Opcode` enum
//! and `evaluate` entry point are public), so the generator emits them
//! directly the same way `agora-script`'s own tests do.
const OP_PUSH_DATA_1: u8 = 0xF0;
const OP_TRUE: u8 = 0xF2;
const OP_FALSE: u8 = 0xF3;
const OP_VERIFY_SIG: u8 = 0xF7;
const OP_IF: u8 = 0xFA;
const OP_ELSE: u8 = 0xFC;
const OP_END_IF: u8 = 0xFD;
const OP_VERIFY_INPUT_LOCK: u8 = 0xFE;
const OP_VERIFY_TX_SEQ: u8 = 0xFF;

use agora_crypto::{PublicKey, Signature};
use agora_script::SigHash;

fn push_pubkey(script: &mut Vec<u8>, pubkey: &PublicKey) {
    // 32 bytes fits a direct one-byte-length push (PUSH_BYTES_MIN..=PUSH_BYTES_MAX).
    script.push(32);
    script.extend_from_slice(&pubkey.to_bytes());
}

/// Build the two-branch Eltoo lock script for a funding or update output.
///
/// IF branch (settlement path, taken when the unlock pushes `TRUE`):
/// `VERIFY_INPUT_LOCK <age>` then `VERIFY_SIG <settle_x>`. ELSE branch
/// (update path): `VERIFY_TX_SEQ <seq_id + 1>` then `VERIFY_SIG <update_x>`.
/// Both branches end with a bare `TRUE` push, since `VERIFY_SIG` itself
/// leaves nothing on the stack and a [`agora_script::Lock::Script`] must
/// leave exactly `TRUE` on top to be accepted.
pub fn create_lock_eltoo(age: u64, settle_x: &PublicKey, update_x: &PublicKey, seq_id: u64) -> Vec<u8> {
    let mut script = Vec::new();

    script.push(OP_IF);
    script.push(OP_VERIFY_INPUT_LOCK);
    script.extend_from_slice(&age.to_le_bytes());
    push_pubkey(&mut script, settle_x);
    script.push(OP_VERIFY_SIG);
    script.push(OP_TRUE);

    script.push(OP_ELSE);
    script.push(OP_VERIFY_TX_SEQ);
    script.extend_from_slice(&(seq_id + 1).to_le_bytes());
    push_pubkey(&mut script, update_x);
    script.push(OP_VERIFY_SIG);
    script.push(OP_TRUE);

    script.push(OP_END_IF);
    script
}

fn push_sig_blob(script: &mut Vec<u8>, signature: &Signature) {
    // 64-byte signature + 1-byte SigHash tag exceeds PUSH_BYTES_MAX (64),
    // so it needs the one-operand-byte PUSH_DATA_1 form.
    let mut blob = signature.to_bytes().to_vec();
    blob.push(SigHash::NoInput.tag());
    script.push(OP_PUSH_DATA_1);
    script.push(blob.len() as u8);
    script.extend_from_slice(&blob);
}

/// Build the unlock bytes that take the settlement (`IF`) branch of a
/// [`create_lock_eltoo`] lock.
pub fn unlock_eltoo_settle(signature: &Signature) -> Vec<u8> {
    let mut unlock = Vec::new();
    push_sig_blob(&mut unlock, signature);
    unlock.push(OP_TRUE);
    unlock
}

/// Build the unlock bytes that take the update (`ELSE`) branch of a
/// [`create_lock_eltoo`] lock.
pub fn unlock_eltoo_update(signature: &Signature) -> Vec<u8> {
    let mut unlock = Vec::new();
    push_sig_blob(&mut unlock, signature);
    unlock.push(OP_FALSE);
    unlock
}
