// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Multi-party Schnorr signature aggregation.

use curve25519_dalek::{edwards::EdwardsPoint, scalar::Scalar, traits::Identity};
use displaydoc::Display;

use crate::{
    keys::PublicKey,
    schnorr::{challenge, Signature},
};

/// A single signer's contribution to an aggregate signature: their public
/// key, their nonce commitment `R_i`, and their partial scalar `s_i`
/// (computed against the *summed* `R` and `P`, per [`schnorr_sign`]'s
/// contract).
///
/// [`schnorr_sign`]: crate::schnorr_sign
pub struct SignerContribution {
    /// This signer's public key.
    pub public_key: PublicKey,
    /// This signer's nonce commitment.
    pub r: EdwardsPoint,
    /// This signer's partial signature scalar.
    pub s: Scalar,
}

/// Errors aggregating multi-party Schnorr contributions.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum AggregateError {
    /// no signer contributions were supplied
    Empty,
}

/// Sum a set of signer contributions into one aggregate `(R_sum, P_sum,
/// s_sum)` Schnorr signature over `P_sum`.
///
/// Each contribution's `s_i` must already have been computed by
/// [`crate::schnorr_sign`] with `r_sum`/`pubkey_sum` equal to the sums this
/// function independently recomputes, or the aggregate will fail to verify.
pub fn aggregate(
    contributions: &[SignerContribution],
) -> Result<(PublicKey, Signature), AggregateError> {
    if contributions.is_empty() {
        return Err(AggregateError::Empty);
    }

    let mut r_sum = EdwardsPoint::identity();
    let mut p_sum = EdwardsPoint::identity();
    let mut s_sum = Scalar::ZERO;

    for c in contributions {
        r_sum += c.r;
        p_sum += c.public_key.point();
        s_sum += c.s;
    }

    let pubkey_sum = PublicKey::from_point(p_sum);
    Ok((
        pubkey_sum,
        Signature::new(r_sum.compress().to_bytes(), s_sum.to_bytes()),
    ))
}

/// Sort public keys ascending by their encoded bytes.
///
/// Validators must be iterated in this order whenever a validator-bitmask
/// index is assigned, so that every node derives the same index for the
/// same validator.
pub fn sort_by_public_key(keys: &mut [PublicKey]) {
    keys.sort_by_key(|k| k.to_bytes());
}

/// Build the validator bitmask for `signers` against the full sorted
/// validator set `all_sorted`.
///
/// `all_sorted` must already be in ascending public-key order (see
/// [`sort_by_public_key`]); the returned vector has one entry per validator,
/// `true` where that validator is among `signers`.
pub fn validator_bitmask(all_sorted: &[PublicKey], signers: &[PublicKey]) -> Vec<bool> {
    all_sorted
        .iter()
        .map(|v| signers.contains(v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{keys::PrivateKey, schnorr::schnorr_verify};
    use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn aggregate_of_single_signer_matches_plain_schnorr() {
        let mut rng = ChaCha20Rng::seed_from_u64(7);
        let sk = PrivateKey::from_scalar(Scalar::random(&mut rng));
        let pk = sk.public_key();
        let nonce = Scalar::random(&mut rng);
        let r = &nonce * ED25519_BASEPOINT_TABLE;
        let message = agora_common::Hash::digest(b"single signer");

        let s = {
            let e = challenge(&r, &pk, &message);
            nonce + e * sk.scalar()
        };

        let (agg_pk, sig) = aggregate(&[SignerContribution {
            public_key: pk,
            r,
            s,
        }])
        .unwrap();

        assert_eq!(agg_pk, pk);
        assert!(schnorr_verify(&agg_pk, &sig, &message));
    }

    #[test]
    fn aggregate_of_two_signers_verifies_against_summed_key() {
        let mut rng = ChaCha20Rng::seed_from_u64(8);
        let message = agora_common::Hash::digest(b"two signers");

        let sk1 = PrivateKey::from_scalar(Scalar::random(&mut rng));
        let sk2 = PrivateKey::from_scalar(Scalar::random(&mut rng));
        let nonce1 = Scalar::random(&mut rng);
        let nonce2 = Scalar::random(&mut rng);
        let r1 = &nonce1 * ED25519_BASEPOINT_TABLE;
        let r2 = &nonce2 * ED25519_BASEPOINT_TABLE;

        let r_sum = r1 + r2;
        let p_sum = PublicKey::from_point(sk1.public_key().point() + sk2.public_key().point());

        let e = challenge(&r_sum, &p_sum, &message);
        let s1 = nonce1 + e * sk1.scalar();
        let s2 = nonce2 + e * sk2.scalar();

        let (agg_pk, sig) = aggregate(&[
            SignerContribution {
                public_key: sk1.public_key(),
                r: r1,
                s: s1,
            },
            SignerContribution {
                public_key: sk2.public_key(),
                r: r2,
                s: s2,
            },
        ])
        .unwrap();

        assert_eq!(agg_pk, p_sum);
        assert!(schnorr_verify(&agg_pk, &sig, &message));
    }

    #[test]
    fn aggregate_rejects_empty_input() {
        assert_eq!(aggregate(&[]), Err(AggregateError::Empty));
    }

    #[test]
    fn bitmask_marks_only_signers() {
        let mut rng = ChaCha20Rng::seed_from_u64(9);
        let mut keys: Vec<PublicKey> = (0..4)
            .map(|_| PrivateKey::from_scalar(Scalar::random(&mut rng)).public_key())
            .collect();
        sort_by_public_key(&mut keys);

        let signers = vec![keys[1], keys[3]];
        let mask = validator_bitmask(&keys, &signers);
        assert_eq!(mask, vec![false, true, false, true]);
    }
}
