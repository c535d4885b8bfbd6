// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Ed25519 curve arithmetic, Schnorr signing/verification, and multi-party
//! signature aggregation.
//!
//! This crate deliberately knows nothing about transactions or sig-hash
//! modes — that logic lives in `agora-transaction::challenge`, which calls
//! back into [`schnorr_verify`] and [`aggregate`] with the message digest it
//! computed.

mod keys;
mod multisig;
mod schnorr;

pub use keys::{KeyError, PrivateKey, PublicKey};
pub use multisig::{aggregate, sort_by_public_key, validator_bitmask, AggregateError, SignerContribution};
pub use schnorr::{schnorr_sign, schnorr_verify, Signature};
