// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Schnorr signing and verification over Ed25519.
//!
//! `s = nonce + e * private`, where the challenge `e` is the curve-scalar
//! reduction of `hash_multi(R, P, message)`. This is the additive Schnorr
//! construction multi-signature aggregation (see [`crate::aggregate`])
//! builds on: summing `R`, `P`, and `s` across signers who all derive `e`
//! from the same summed `(R, P)` produces a signature that verifies against
//! the summed public key.

use agora_common::{hash_multi, Hash};
use curve25519_dalek::{
    constants::ED25519_BASEPOINT_TABLE, edwards::CompressedEdwardsY, edwards::EdwardsPoint,
    scalar::Scalar,
};
use serde::{Deserialize, Serialize};

use crate::keys::PublicKey;

/// A 64-byte Schnorr signature: a 32-byte curve point `R` and a 32-byte
/// scalar `s`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    /// Build a signature from its raw 32-byte components.
    pub fn new(r: [u8; 32], s: [u8; 32]) -> Self {
        Signature { r, s }
    }

    /// The 64-byte wire encoding, `R ‖ s`.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    /// Decode a signature from its 64-byte wire encoding.
    pub fn from_bytes(bytes: &[u8; 64]) -> Self {
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Signature { r, s }
    }

    /// The `R` component's encoded bytes.
    pub fn r_bytes(&self) -> [u8; 32] {
        self.r
    }

    /// The `s` component's encoded bytes.
    pub fn s_bytes(&self) -> [u8; 32] {
        self.s
    }
}

/// Compute the Schnorr challenge scalar `e = H(R ‖ P ‖ message) mod L`.
pub(crate) fn challenge(r: &EdwardsPoint, p: &PublicKey, message: &Hash) -> Scalar {
    let r_bytes = r.compress().to_bytes();
    let p_bytes = p.to_bytes();
    let digest: Hash = hash_multi(&[&r_bytes, &p_bytes, message.as_bytes()]);
    Scalar::from_bytes_mod_order_wide(digest.as_bytes())
}

/// Produce a Schnorr signature over `message_hash`.
///
/// `r_sum` and `pubkey_sum` are the (possibly multi-party) summed nonce
/// commitment and public key; for a single signer they are simply
/// `nonce_scalar * G` and the signer's own public key.
pub fn schnorr_sign(
    private_scalar: Scalar,
    pubkey_sum: &PublicKey,
    r_sum: EdwardsPoint,
    nonce_scalar: Scalar,
    message_hash: &Hash,
) -> Signature {
    let e = challenge(&r_sum, pubkey_sum, message_hash);
    let s = nonce_scalar + e * private_scalar;
    Signature {
        r: r_sum.compress().to_bytes(),
        s: s.to_bytes(),
    }
}

/// Verify a Schnorr signature against `pubkey` and `message_hash`.
///
/// Returns `false` (never panics) for a malformed `R` component, a
/// non-canonical `s` scalar, or a signature that simply does not verify.
pub fn schnorr_verify(pubkey: &PublicKey, signature: &Signature, message_hash: &Hash) -> bool {
    let Some(r) = CompressedEdwardsY(signature.r).decompress() else {
        return false;
    };
    let s = Scalar::from_canonical_bytes(signature.s);
    let s: Scalar = if s.is_some().into() {
        s.unwrap()
    } else {
        return false;
    };

    let e = challenge(&r, pubkey, message_hash);
    let lhs = &s * ED25519_BASEPOINT_TABLE;
    let rhs = r + e * pubkey.point();
    lhs == rhs
}
