// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Output locks and their matching unlock byte strings (§3, §4.2).

use agora_common::Hash;
use agora_crypto::PublicKey;
use serde::{Deserialize, Serialize};

/// How an [`Output`](crate::Output) may be spent.
///
/// `Script`/`ScriptHash` carry raw opcode bytes rather than a parsed
/// program — `agora-script` is the only crate that interprets them, and it
/// re-validates syntax on every evaluation rather than trusting a
/// previously-parsed form.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Lock {
    /// Spendable by a signature from exactly this key.
    Key(PublicKey),
    /// Spendable by a signature from the key whose hash matches.
    KeyHash(Hash),
    /// Spendable by any unlock script that leaves `TRUE` on top once this
    /// script runs after it.
    Script(Vec<u8>),
    /// Spendable by an unlock script whose last pushed item hashes to this
    /// value.
    ScriptHash(Hash),
}

impl Lock {
    /// Borrow this owned lock as the matching [`agora_script::Lock`]
    /// variant, for handing to [`agora_script::evaluate`].
    pub fn as_script_lock(&self) -> agora_script::Lock<'_> {
        match self {
            Lock::Key(pubkey) => agora_script::Lock::Key(pubkey),
            Lock::KeyHash(hash) => agora_script::Lock::KeyHash(hash),
            Lock::Script(bytes) => agora_script::Lock::Script(bytes),
            Lock::ScriptHash(hash) => agora_script::Lock::ScriptHash(hash),
        }
    }
}

/// The byte string an input presents to unlock the UTXO it spends.
///
/// Interpreted according to the matching [`Lock`] variant: a bare
/// signature, a signature-then-pubkey pair, a raw push stream, or a push
/// stream ending in a redeem script.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize, Default)]
pub struct Unlock(pub Vec<u8>);

impl Unlock {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<Vec<u8>> for Unlock {
    fn from(bytes: Vec<u8>) -> Self {
        Unlock(bytes)
    }
}
