// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Per-sequence settlement key derivation and the nonce pair exchanged at
//! channel setup and before every balance update (§4.9).

use agora_common::hash_multi;
use agora_crypto::{PrivateKey, PublicKey};
use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::scalar::Scalar;
use serde::{Deserialize, Serialize};

/// The two public nonce commitments a party publishes before a signing
/// round: one for the settlement transaction, one for the update
/// transaction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NoncePair {
    pub settle_nonce: PublicKey,
    pub update_nonce: PublicKey,
}

fn sequence_offset(seq: u64) -> Scalar {
    let digest = hash_multi(&[&seq.to_le_bytes()]);
    Scalar::from_bytes_mod_order_wide(digest.as_bytes())
}

/// Derive this party's settlement private key for sequence `seq`:
/// `settle_kp_0 + Scalar(hashFull(seq))`.
///
/// Each sequence's settlement key is only ever used to sign that
/// sequence's settlement transaction, so a settlement signature leaked or
/// replayed from an earlier sequence cannot be reused against a later one.
pub fn derive_settle_private(base: &PrivateKey, seq: u64) -> PrivateKey {
    PrivateKey::from_scalar(base.scalar() + sequence_offset(seq))
}

/// Derive the public counterpart of [`derive_settle_private`], so a peer
/// can compute the other side's per-sequence settlement key from its
/// long-term base key without learning the private scalar.
pub fn derive_settle_public(base: &PublicKey, seq: u64) -> PublicKey {
    let point = base.point() + &sequence_offset(seq) * ED25519_BASEPOINT_TABLE;
    PublicKey::from_point(point)
}
