// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The 64-byte opaque digest used throughout the ledger.

use core::fmt;
use displaydoc::Display;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha512};

/// Number of bytes in a [`Hash`].
pub const HASH_SIZE: usize = 64;

/// Errors constructing a [`Hash`] from untrusted bytes.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum HashError {
    /// expected 64 bytes, got {0}
    WrongLength(usize),
}

/// A 64-byte opaque digest.
///
/// Hashing is multi-argument and order-sensitive: `hash_multi(a, b, c)` is
/// not `hash_multi(c, b, a)`, since each argument is fed to the underlying
/// hasher in the order given, with its length prefixed so that
/// `hash_multi(a, "bc")` cannot collide with `hash_multi("ab", c)`.
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Hash(pub [u8; HASH_SIZE]);

impl Serialize for Hash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct HashVisitor;

        impl<'de> serde::de::Visitor<'de> for HashVisitor {
            type Value = Hash;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} bytes", HASH_SIZE)
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Hash::try_from(v).map_err(|_| E::invalid_length(v.len(), &self))
            }
        }

        deserializer.deserialize_bytes(HashVisitor)
    }
}

impl Hash {
    /// The all-zero digest, used as the previous-block hash of genesis and
    /// as a placeholder inside blanked inputs.
    pub const ZERO: Hash = Hash([0u8; HASH_SIZE]);

    /// Hash a single byte slice.
    pub fn digest(bytes: &[u8]) -> Self {
        hash_multi(&[bytes])
    }

    /// Borrow the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Hash {
    type Error = HashError;

    fn try_from(src: &[u8]) -> Result<Self, Self::Error> {
        if src.len() != HASH_SIZE {
            return Err(HashError::WrongLength(src.len()));
        }
        let mut out = [0u8; HASH_SIZE];
        out.copy_from_slice(src);
        Ok(Hash(out))
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hash({})", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Hash an ordered sequence of byte strings into a single [`Hash`].
///
/// Each part is length-prefixed (as a little-endian `u64`) before being fed
/// to the hasher, so that concatenation boundaries cannot be shifted by an
/// attacker choosing part contents.
pub fn hash_multi(parts: &[&[u8]]) -> Hash {
    let mut hasher = Sha512::new();
    for part in parts {
        hasher.update((part.len() as u64).to_le_bytes());
        hasher.update(part);
    }
    let digest = hasher.finalize();
    let mut out = [0u8; HASH_SIZE];
    out.copy_from_slice(&digest);
    Hash(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_multi_is_order_sensitive() {
        let a = hash_multi(&[b"a", b"b", b"c"]);
        let b = hash_multi(&[b"c", b"b", b"a"]);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_multi_does_not_confuse_part_boundaries() {
        let a = hash_multi(&[b"ab", b"c"]);
        let b = hash_multi(&[b"a", b"bc"]);
        assert_ne!(a, b);
    }

    #[test]
    fn hash_multi_is_deterministic() {
        let a = hash_multi(&[b"x", b"y"]);
        let b = hash_multi(&[b"x", b"y"]);
        assert_eq!(a, b);
    }

    #[test]
    fn try_from_rejects_wrong_length() {
        let short = [0u8; 10];
        assert_eq!(Hash::try_from(&short[..]), Err(HashError::WrongLength(10)));
    }

    #[test]
    fn display_round_trips_through_hex() {
        let h = Hash::digest(b"hello");
        let s = h.to_string();
        assert_eq!(s.len(), HASH_SIZE * 2);
        assert_eq!(hex::decode(s).unwrap(), h.0.to_vec());
    }
}
