// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Transaction, UTXO, and lock/unlock types, plus the transaction validator.
//!
//! This crate sits between `agora-script` (the stack VM) and `agora-ledger`
//! (which owns the UTXO set the validator reads from): it implements
//! [`agora_script::ScriptContext`] over a `(Transaction, input index)` pair
//! so the script engine never needs to know what a transaction looks like.

mod challenge;
mod lock;
mod tx;
mod utxo;
pub mod validation;

pub use challenge::{get_challenge, ChallengeError, TxScriptContext};
pub use agora_script::SigHash;
pub use lock::{Lock, Unlock};
pub use tx::{Input, Output, Transaction, TxType};
pub use utxo::{utxo_key, Utxo};
