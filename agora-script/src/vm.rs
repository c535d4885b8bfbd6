// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Lock/unlock evaluation (§4.2).
//!
//! [`Lock::Key`] and [`Lock::KeyHash`] verify directly without touching the
//! stack machine. [`Lock::Script`] runs the unlock script then the lock
//! script back to back on one stack; [`Lock::ScriptHash`] runs the unlock
//! script, pops its last item as the redeem script, checks it hashes to the
//! lock, then runs it the same way.

use agora_common::Hash;
use agora_crypto::{PublicKey, Signature};

use crate::context::{ScriptContext, SigHash};
use crate::error::ScriptError;
use crate::opcode::Opcode;
use crate::scope::ScopeStack;
use crate::stack::{bool_item, is_truthy, Stack};

/// A lock, borrowed from whatever owns the real output/redeem-script data.
pub enum Lock<'a> {
    /// Spendable by a signature from exactly this key.
    Key(&'a PublicKey),
    /// Spendable by a signature from the key whose hash matches.
    KeyHash(&'a Hash),
    /// Spendable by any unlock script that leaves `TRUE` on top after this
    /// script runs.
    Script(&'a [u8]),
    /// Spendable by an unlock script whose last pushed item hashes to this
    /// value and, once run as a script, leaves `TRUE` on top.
    ScriptHash(&'a Hash),
}

/// Evaluate `unlock` against `lock`, consulting `ctx` for signature
/// challenges and Eltoo sequence/maturity checks.
pub fn evaluate(lock: &Lock, unlock: &[u8], ctx: &dyn ScriptContext) -> Result<(), ScriptError> {
    match lock {
        Lock::Key(pubkey) => verify_key_unlock(pubkey, unlock, ctx),
        Lock::KeyHash(hash) => verify_key_hash_unlock(hash, unlock, ctx),
        Lock::Script(script) => {
            Opcode::check_syntax(unlock)?;
            Opcode::check_syntax(script)?;
            let mut stack = Stack::new();
            run(&mut stack, unlock, ctx)?;
            run(&mut stack, script, ctx)?;
            require_true(&stack)
        }
        Lock::ScriptHash(hash) => {
            Opcode::check_syntax(unlock)?;
            let mut stack = Stack::new();
            run(&mut stack, unlock, ctx)?;
            let redeem = stack
                .pop("SCRIPT_HASH")
                .map_err(|_| ScriptError::MissingRedeemScript)?;
            if &Hash::digest(&redeem) != *hash {
                return Err(ScriptError::RedeemScriptHashMismatch);
            }
            Opcode::check_syntax(&redeem)?;
            run(&mut stack, &redeem, ctx)?;
            require_true(&stack)
        }
    }
}

fn verify_key_unlock(
    pubkey: &PublicKey,
    unlock: &[u8],
    ctx: &dyn ScriptContext,
) -> Result<(), ScriptError> {
    if unlock.len() != 64 {
        return Err(ScriptError::MalformedKeyUnlock);
    }
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(unlock);
    let signature = Signature::from_bytes(&sig_bytes);
    if ctx.verify_signature(pubkey, &signature, SigHash::All) {
        Ok(())
    } else {
        Err(ScriptError::SignatureFailedValidation)
    }
}

fn verify_key_hash_unlock(
    hash: &Hash,
    unlock: &[u8],
    ctx: &dyn ScriptContext,
) -> Result<(), ScriptError> {
    if unlock.len() != 96 {
        return Err(ScriptError::MalformedKeyHashUnlock);
    }
    let (sig_part, pubkey_part) = unlock.split_at(64);
    let pubkey =
        PublicKey::from_bytes(pubkey_part).map_err(|_| ScriptError::MalformedKeyHashUnlock)?;
    if &Hash::digest(pubkey_part) != hash {
        return Err(ScriptError::KeyHashMismatch);
    }
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(sig_part);
    let signature = Signature::from_bytes(&sig_bytes);
    if ctx.verify_signature(&pubkey, &signature, SigHash::All) {
        Ok(())
    } else {
        Err(ScriptError::SignatureFailedValidation)
    }
}

fn verify_sig_blob(
    pubkey_bytes: &[u8],
    sig_blob: &[u8],
    ctx: &dyn ScriptContext,
) -> Result<bool, ScriptError> {
    if pubkey_bytes.len() != 32 {
        return Err(ScriptError::InvalidPublicKeyLength);
    }
    let pubkey =
        PublicKey::from_bytes(pubkey_bytes).map_err(|_| ScriptError::InvalidPublicKeyLength)?;
    if sig_blob.len() != 65 {
        return Err(ScriptError::InvalidSignatureBlobLength);
    }
    let tag = sig_blob[64];
    let sig_hash = SigHash::from_tag(tag).ok_or(ScriptError::InvalidSigHashTag(tag))?;
    let mut sig_bytes = [0u8; 64];
    sig_bytes.copy_from_slice(&sig_blob[..64]);
    let signature = Signature::from_bytes(&sig_bytes);
    Ok(ctx.verify_signature(&pubkey, &signature, sig_hash))
}

fn require_true(stack: &Stack) -> Result<(), ScriptError> {
    if stack.len() != 1 {
        return Err(ScriptError::DidNotReturnTrue);
    }
    if is_truthy(stack.top("evaluation result")?) {
        Ok(())
    } else {
        Err(ScriptError::DidNotReturnTrue)
    }
}

/// Run one opcode stream against `stack`, which may already hold items left
/// by a previous script (the unlock-then-lock chain). Assumes `script`
/// already passed [`Opcode::check_syntax`].
fn run(stack: &mut Stack, script: &[u8], ctx: &dyn ScriptContext) -> Result<(), ScriptError> {
    let mut scopes = ScopeStack::new();
    let mut i = 0;
    while i < script.len() {
        let op = Opcode::from_byte(script[i])?;
        i += 1;
        let executing = scopes.executing();
        match op {
            Opcode::PushBytes(n) => {
                let n = n as usize;
                let data = script[i..i + n].to_vec();
                i += n;
                if executing {
                    stack.push(data)?;
                }
            }
            Opcode::PushData1 => {
                let size = script[i] as usize;
                i += 1;
                let data = script[i..i + size].to_vec();
                i += size;
                if executing {
                    stack.push(data)?;
                }
            }
            Opcode::PushData2 => {
                let size = u16::from_le_bytes([script[i], script[i + 1]]) as usize;
                i += 2;
                let data = script[i..i + size].to_vec();
                i += size;
                if executing {
                    stack.push(data)?;
                }
            }
            Opcode::True => {
                if executing {
                    stack.push(bool_item(true))?;
                }
            }
            Opcode::False => {
                if executing {
                    stack.push(bool_item(false))?;
                }
            }
            Opcode::Dup => {
                if executing {
                    let top = stack.top("DUP")?.clone();
                    stack.push(top)?;
                }
            }
            Opcode::Hash => {
                if executing {
                    let item = stack.pop("HASH").map_err(|_| ScriptError::HashRequiresItem)?;
                    stack.push(Hash::digest(&item).as_bytes().to_vec())?;
                }
            }
            Opcode::CheckSig | Opcode::VerifySig => {
                if executing {
                    let pubkey_bytes = stack.pop("CHECK_SIG")?;
                    let sig_blob = stack.pop("CHECK_SIG")?;
                    let ok = verify_sig_blob(&pubkey_bytes, &sig_blob, ctx)?;
                    if op == Opcode::VerifySig {
                        if !ok {
                            return Err(ScriptError::SignatureFailedValidation);
                        }
                    } else {
                        stack.push(bool_item(ok))?;
                    }
                }
            }
            Opcode::CheckEqual | Opcode::VerifyEqual => {
                if executing {
                    let a = stack.pop("CHECK_EQUAL")?;
                    let b = stack.pop("CHECK_EQUAL")?;
                    let equal = a == b;
                    if op == Opcode::VerifyEqual {
                        if !equal {
                            return Err(ScriptError::EqualityFailedValidation);
                        }
                    } else {
                        stack.push(bool_item(equal))?;
                    }
                }
            }
            Opcode::If | Opcode::NotIf => {
                if executing {
                    let item = stack.pop("IF")?;
                    if item != bool_item(true) && item != bool_item(false) {
                        return Err(ScriptError::IfRequiresBoolean);
                    }
                    let truthy = is_truthy(&item);
                    let condition = if op == Opcode::If { truthy } else { !truthy };
                    scopes.enter(condition);
                } else {
                    scopes.enter(false);
                }
            }
            Opcode::Else => scopes.toggle_else()?,
            Opcode::EndIf => scopes.end_if()?,
            Opcode::VerifyInputLock => {
                let required = u64::from_le_bytes(script[i..i + 8].try_into().unwrap());
                i += 8;
                if executing {
                    let actual = ctx.input_unlock_age();
                    if actual < required {
                        return Err(ScriptError::InputLockNotMature { required, actual });
                    }
                }
            }
            Opcode::VerifyTxSeq => {
                let expected = u64::from_le_bytes(script[i..i + 8].try_into().unwrap());
                i += 8;
                if executing {
                    let actual = ctx.tx_sequence();
                    if actual != expected {
                        return Err(ScriptError::SequenceMismatch { expected, actual });
                    }
                }
            }
        }
    }
    scopes.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{schnorr_sign, PrivateKey};
    use curve25519_dalek::{constants::ED25519_BASEPOINT_TABLE, scalar::Scalar};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    struct FixedContext {
        challenge: Hash,
        unlock_age: u64,
        tx_sequence: u64,
    }

    impl ScriptContext for FixedContext {
        fn challenge(&self, _sig_hash: SigHash) -> Hash {
            self.challenge
        }
        fn input_unlock_age(&self) -> u64 {
            self.unlock_age
        }
        fn tx_sequence(&self) -> u64 {
            self.tx_sequence
        }
    }

    fn signer(seed: u64) -> (PrivateKey, PublicKey) {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let sk = PrivateKey::from_scalar(Scalar::random(&mut rng));
        let pk = sk.public_key();
        (sk, pk)
    }

    fn sign(sk: &PrivateKey, pk: &PublicKey, message: &Hash, seed: u64) -> Signature {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let nonce = Scalar::random(&mut rng);
        let r = &nonce * ED25519_BASEPOINT_TABLE;
        schnorr_sign(sk.scalar(), pk, r, nonce, message)
    }

    fn sig_blob(sig: &Signature, sig_hash: SigHash) -> Vec<u8> {
        let mut out = sig.to_bytes().to_vec();
        out.push(sig_hash.tag());
        out
    }

    #[test]
    fn key_lock_accepts_valid_signature() {
        let (sk, pk) = signer(1);
        let message = Hash::digest(b"agora tx");
        let ctx = FixedContext {
            challenge: message,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let sig = sign(&sk, &pk, &message, 2);
        let unlock = sig.to_bytes().to_vec();
        assert!(evaluate(&Lock::Key(&pk), &unlock, &ctx).is_ok());
    }

    #[test]
    fn key_lock_rejects_wrong_length_unlock() {
        let (_, pk) = signer(1);
        let ctx = FixedContext {
            challenge: Hash::ZERO,
            unlock_age: 0,
            tx_sequence: 0,
        };
        assert_eq!(
            evaluate(&Lock::Key(&pk), &[0u8; 10], &ctx),
            Err(ScriptError::MalformedKeyUnlock)
        );
    }

    #[test]
    fn key_hash_lock_accepts_matching_key_and_signature() {
        let (sk, pk) = signer(3);
        let message = Hash::digest(b"agora tx");
        let ctx = FixedContext {
            challenge: message,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let sig = sign(&sk, &pk, &message, 4);
        let mut unlock = sig.to_bytes().to_vec();
        unlock.extend_from_slice(&pk.to_bytes());
        let lock_hash = Hash::digest(&pk.to_bytes());
        assert!(evaluate(&Lock::KeyHash(&lock_hash), &unlock, &ctx).is_ok());
    }

    #[test]
    fn key_hash_lock_rejects_mismatched_key() {
        let (sk, pk) = signer(5);
        let (_, other_pk) = signer(6);
        let message = Hash::digest(b"agora tx");
        let ctx = FixedContext {
            challenge: message,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let sig = sign(&sk, &pk, &message, 7);
        let mut unlock = sig.to_bytes().to_vec();
        unlock.extend_from_slice(&pk.to_bytes());
        let wrong_hash = Hash::digest(&other_pk.to_bytes());
        assert_eq!(
            evaluate(&Lock::KeyHash(&wrong_hash), &unlock, &ctx),
            Err(ScriptError::KeyHashMismatch)
        );
    }

    #[test]
    fn script_lock_checksig_then_true() {
        let (sk, pk) = signer(8);
        let message = Hash::digest(b"agora tx");
        let ctx = FixedContext {
            challenge: message,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let sig = sign(&sk, &pk, &message, 9);

        let mut unlock = Vec::new();
        let blob = sig_blob(&sig, SigHash::All);
        unlock.push(0xF0); // PUSH_DATA_1, since the 65-byte blob exceeds PUSH_BYTES_MAX
        unlock.push(blob.len() as u8);
        unlock.extend_from_slice(&blob);

        let mut lock_script = Vec::new();
        lock_script.push(32u8);
        lock_script.extend_from_slice(&pk.to_bytes());
        lock_script.push(0xF7); // VERIFY_SIG
        lock_script.push(0xF2); // TRUE, since VERIFY_SIG itself leaves nothing on the stack

        assert!(evaluate(&Lock::Script(&lock_script), &unlock, &ctx).is_ok());
    }

    #[test]
    fn verify_input_lock_enforces_maturity() {
        let ctx = FixedContext {
            challenge: Hash::ZERO,
            unlock_age: 5,
            tx_sequence: 0,
        };
        let mut script = vec![0xFE]; // VERIFY_INPUT_LOCK
        script.extend_from_slice(&10u64.to_le_bytes());
        script.push(0xF2); // TRUE

        let err = evaluate(&Lock::Script(&script), &[], &ctx).unwrap_err();
        assert_eq!(
            err,
            ScriptError::InputLockNotMature {
                required: 10,
                actual: 5
            }
        );
    }

    #[test]
    fn if_else_selects_correct_branch() {
        let ctx = FixedContext {
            challenge: Hash::ZERO,
            unlock_age: 0,
            tx_sequence: 0,
        };
        // push FALSE, IF <fail via unequal> ELSE TRUE END_IF
        let mut script = vec![0xF3]; // FALSE
        script.push(0xFA); // IF
        script.push(0xF3); // FALSE (would be the "then" branch, skipped)
        script.push(0xFC); // ELSE
        script.push(0xF2); // TRUE
        script.push(0xFD); // END_IF
        assert!(evaluate(&Lock::Script(&script), &[], &ctx).is_ok());
    }

    #[test]
    fn script_hash_lock_runs_redeem_script() {
        let ctx = FixedContext {
            challenge: Hash::ZERO,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let redeem_script = vec![0xF2]; // TRUE
        let hash = Hash::digest(&redeem_script);

        let mut unlock = Vec::new();
        unlock.push(redeem_script.len() as u8);
        unlock.extend_from_slice(&redeem_script);

        assert!(evaluate(&Lock::ScriptHash(&hash), &unlock, &ctx).is_ok());
    }

    #[test]
    fn script_hash_lock_rejects_mismatched_redeem_script() {
        let ctx = FixedContext {
            challenge: Hash::ZERO,
            unlock_age: 0,
            tx_sequence: 0,
        };
        let redeem_script = vec![0xF2];
        let wrong_hash = Hash::digest(b"not the redeem script");

        let mut unlock = Vec::new();
        unlock.push(redeem_script.len() as u8);
        unlock.extend_from_slice(&redeem_script);

        assert_eq!(
            evaluate(&Lock::ScriptHash(&wrong_hash), &unlock, &ctx),
            Err(ScriptError::RedeemScriptHashMismatch)
        );
    }
}
