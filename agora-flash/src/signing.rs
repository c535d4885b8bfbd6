// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Two-party aggregate-signature coordination (§4.9).
//!
//! A signing round always needs a fresh nonce from each side before either
//! can compute its share, since the Schnorr challenge binds to the *summed*
//! nonce commitment. [`LocalNonce`] is that one-off secret; [`local_contribution`]
//! turns it, together with the peer's returned [`SignerContribution`], into
//! this party's own share of the aggregate.

use agora_common::Hash;
use agora_crypto::{schnorr_sign, PrivateKey, PublicKey, SignerContribution};
use curve25519_dalek::constants::ED25519_BASEPOINT_TABLE;
use curve25519_dalek::edwards::EdwardsPoint;
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};

/// A single-use nonce generated for one signing round. Never reused: two
/// signatures sharing a nonce leak the private scalar.
pub struct LocalNonce {
    pub scalar: Scalar,
    pub point: EdwardsPoint,
}

/// Draw a fresh nonce from `rng`.
pub fn fresh_nonce(rng: &mut (impl RngCore + CryptoRng)) -> LocalNonce {
    let scalar = Scalar::random(rng);
    let point = &scalar * ED25519_BASEPOINT_TABLE;
    LocalNonce { scalar, point }
}

/// Compute this party's [`SignerContribution`] to a two-party aggregate
/// signature over `message`, combining `local_nonce` with the peer's
/// already-returned nonce commitment `peer_r` and per-sequence signer key
/// `peer_public_key`.
pub fn local_contribution(
    private: &PrivateKey,
    public_key: PublicKey,
    local_nonce: &LocalNonce,
    peer_r: EdwardsPoint,
    peer_public_key: &PublicKey,
    message: &Hash,
) -> SignerContribution {
    let r_sum = local_nonce.point + peer_r;
    let p_sum = PublicKey::from_point(public_key.point() + peer_public_key.point());
    let sig = schnorr_sign(private.scalar(), &p_sum, r_sum, local_nonce.scalar, message);

    let s_ct = Scalar::from_canonical_bytes(sig.s_bytes());
    let s: Scalar = if s_ct.is_some().into() {
        s_ct.unwrap()
    } else {
        unreachable!("schnorr_sign always returns a canonical scalar")
    };

    SignerContribution {
        public_key,
        r: local_nonce.point,
        s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_crypto::{aggregate, schnorr_verify};
    use rand_chacha::rand_core::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn two_local_contributions_aggregate_to_a_valid_signature() {
        let mut rng_a = ChaCha20Rng::seed_from_u64(1);
        let mut rng_b = ChaCha20Rng::seed_from_u64(2);

        let sk_a = PrivateKey::from_scalar(Scalar::random(&mut rng_a));
        let sk_b = PrivateKey::from_scalar(Scalar::random(&mut rng_b));
        let pk_a = sk_a.public_key();
        let pk_b = sk_b.public_key();

        let nonce_a = fresh_nonce(&mut rng_a);
        let nonce_b = fresh_nonce(&mut rng_b);
        let message = Hash::digest(b"channel settlement");

        let contrib_a = local_contribution(&sk_a, pk_a, &nonce_a, nonce_b.point, &pk_b, &message);
        let contrib_b = local_contribution(&sk_b, pk_b, &nonce_b, nonce_a.point, &pk_a, &message);

        let (agg_pub, sig) = aggregate(&[contrib_a, contrib_b]).unwrap();
        assert_eq!(agg_pub, PublicKey::from_point(pk_a.point() + pk_b.point()));
        assert!(schnorr_verify(&agg_pub, &sig, &message));
    }
}
