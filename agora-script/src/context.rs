// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The transaction-shaped data the VM needs but does not own.
//!
//! `agora-script` has no dependency on `agora-transaction` — instead,
//! `agora-transaction` implements this trait over its own `Transaction`/
//! `Input` types, and hands a `&dyn ScriptContext` down into [`crate::evaluate`].
//! This keeps the script engine reusable and testable without ever
//! constructing a real transaction.

use agora_common::Hash;
use agora_crypto::PublicKey;

/// The two ways a signature can commit to transaction data (§4.1).
///
/// `All` binds the signature to every input and output; `NoInput` omits the
/// spending input's own outpoint, which is what lets Eltoo update
/// transactions be re-signed against a new input once a newer state
/// publishes on top of an old one.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SigHash {
    All,
    NoInput,
}

impl SigHash {
    /// Decode the one-byte tag appended to a signature blob on the wire.
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(SigHash::All),
            1 => Some(SigHash::NoInput),
            _ => None,
        }
    }

    /// The one-byte tag appended to a signature blob on the wire.
    pub fn tag(self) -> u8 {
        match self {
            SigHash::All => 0,
            SigHash::NoInput => 1,
        }
    }
}

/// Transaction-specific facts the script engine needs to evaluate
/// `CHECK_SIG`/`VERIFY_SIG`, `VERIFY_INPUT_LOCK`, and `VERIFY_TX_SEQ`.
///
/// `agora-transaction` implements this once per (transaction, input index)
/// pair being evaluated.
pub trait ScriptContext {
    /// The digest that a signature over this input must commit to, under
    /// the given [`SigHash`] mode.
    fn challenge(&self, sig_hash: SigHash) -> Hash;

    /// How many blocks have passed since the UTXO being spent by the
    /// current input was created, used by `VERIFY_INPUT_LOCK`.
    fn input_unlock_age(&self) -> u64;

    /// The transaction's own sequence number, used by `VERIFY_TX_SEQ` to
    /// enforce Eltoo's newest-state-wins replacement rule.
    fn tx_sequence(&self) -> u64;

    /// Verify a signature against `pubkey` under the given sig-hash mode,
    /// using this context's challenge digest.
    fn verify_signature(
        &self,
        pubkey: &PublicKey,
        signature: &agora_crypto::Signature,
        sig_hash: SigHash,
    ) -> bool {
        agora_crypto::schnorr_verify(pubkey, signature, &self.challenge(sig_hash))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sig_hash_tag_round_trips() {
        assert_eq!(SigHash::from_tag(SigHash::All.tag()), Some(SigHash::All));
        assert_eq!(
            SigHash::from_tag(SigHash::NoInput.tag()),
            Some(SigHash::NoInput)
        );
        assert_eq!(SigHash::from_tag(2), None);
    }
}
