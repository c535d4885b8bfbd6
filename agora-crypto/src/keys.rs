// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Ed25519 scalars and curve points.

use curve25519_dalek::{
    constants::ED25519_BASEPOINT_TABLE,
    edwards::{CompressedEdwardsY, EdwardsPoint},
    scalar::Scalar,
};
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// Errors decoding key material.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum KeyError {
    /// expected 32 bytes, got {0}
    WrongLength(usize),
    /// bytes do not decode to a point on the curve
    InvalidPoint,
}

/// A 32-byte Ed25519 private scalar.
///
/// Zeroized on drop; never serialized or logged.
#[derive(Clone)]
pub struct PrivateKey(Scalar);

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0 = Scalar::ZERO;
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PrivateKey {
    /// Build a private key from a scalar.
    pub fn from_scalar(scalar: Scalar) -> Self {
        PrivateKey(scalar)
    }

    /// The underlying curve scalar.
    pub fn scalar(&self) -> Scalar {
        self.0
    }

    /// Derive the corresponding [`PublicKey`].
    pub fn public_key(&self) -> PublicKey {
        let point = &self.0 * ED25519_BASEPOINT_TABLE;
        PublicKey::from_point(point)
    }
}

/// A validated Ed25519 public key: a 32-byte encoded curve point that has
/// been checked to decode to a point on the curve.
///
/// Equality, ordering, hashing, and serialization are all keyed on the
/// 32-byte encoded form, matching how the ledger compares and sorts keys
/// (e.g. the quorum builder's sorted-public-key member order).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct PublicKey {
    bytes: [u8; 32],
}

impl PublicKey {
    /// Decode and validate a public key from its 32-byte wire form.
    ///
    /// Mirrors libsodium's `is_valid_point`: the bytes must decompress to an
    /// actual point on the curve.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != 32 {
            return Err(KeyError::WrongLength(bytes.len()));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        CompressedEdwardsY(arr)
            .decompress()
            .ok_or(KeyError::InvalidPoint)?;
        Ok(PublicKey { bytes: arr })
    }

    /// Build a [`PublicKey`] directly from a curve point (used internally
    /// when summing points during multi-signature aggregation).
    pub fn from_point(point: EdwardsPoint) -> Self {
        PublicKey {
            bytes: point.compress().to_bytes(),
        }
    }

    /// The 32-byte encoded form.
    pub fn to_bytes(&self) -> [u8; 32] {
        self.bytes
    }

    /// Decompress to the curve point, for arithmetic. Infallible: the bytes
    /// were validated at construction time.
    pub fn point(&self) -> EdwardsPoint {
        CompressedEdwardsY(self.bytes)
            .decompress()
            .expect("PublicKey bytes were validated at construction")
    }
}
