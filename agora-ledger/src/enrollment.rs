// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Tracks the active validator set, their pre-image chains, and per-cycle
//! progress (§4.6).

use std::collections::BTreeMap;

use agora_blockchain::{verifies_predecessor, Enrollment};
use agora_common::{hash_multi, Hash, MIN_FREEZE_AMOUNT};
use agora_crypto::{schnorr_verify, PublicKey};
use agora_transaction::{Lock, TxType, Utxo};
use displaydoc::Display;

/// Why an enrollment was rejected by [`EnrollmentManager::add_validator`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum EnrollmentError {
    /// referenced UTXO does not exist
    MissingUtxo,
    /// referenced UTXO is not a Freeze output
    NotAFreeze,
    /// referenced UTXO amount is below the freeze minimum
    BelowFreezeMinimum,
    /// referenced UTXO is not yet spendable at this height
    UtxoNotYetUnlocked,
    /// a validator's Freeze UTXO must be locked directly to a key
    LockIsNotDirectKey,
    /// enrollment signature does not verify
    InvalidSignature,
    /// this UTXO is already enrolled
    AlreadyEnrolled,
}

/// A validator's enrollment, its public key, and its progress revealing
/// pre-images.
#[derive(Clone, Debug)]
struct ActiveValidator {
    public_key: PublicKey,
    enrollment: Enrollment,
    enrollment_height: u64,
    /// `revealed[0]` is the most recently revealed pre-image; starts empty.
    revealed: Vec<Hash>,
}

/// The enrolled validator set, keyed by the Freeze UTXO each validator's
/// enrollment is bound to.
#[derive(Clone, Debug, Default)]
pub struct EnrollmentManager {
    validators: BTreeMap<Hash, ActiveValidator>,
}

impl EnrollmentManager {
    pub fn new() -> Self {
        EnrollmentManager::default()
    }

    /// Validate and insert a new enrollment (§4.6's
    /// `isInvalidEnrollmentReason` checks): the referenced UTXO must exist,
    /// be a `Freeze` output, meet the freeze minimum, already be spendable
    /// at `height`, and the enrollment's signature over its own fields must
    /// verify against the UTXO's owning key.
    ///
    /// The Freeze UTXO must use a direct `Lock::Key` (not `KeyHash`,
    /// `Script`, or `ScriptHash`): the enrollment manager has no other way
    /// to recover the owning public key to verify `enroll_sig` against, and
    /// §3/§4.6 never describe a separate key-announcement channel for
    /// validators.
    pub fn add_validator(
        &mut self,
        enrollment: Enrollment,
        height: u64,
        utxo: Option<&Utxo>,
    ) -> Result<(), EnrollmentError> {
        if self.validators.contains_key(&enrollment.utxo_key) {
            return Err(EnrollmentError::AlreadyEnrolled);
        }
        let utxo = utxo.ok_or(EnrollmentError::MissingUtxo)?;
        if utxo.source_tx_type != TxType::Freeze {
            return Err(EnrollmentError::NotAFreeze);
        }
        if !utxo.output.amount.meets_freeze_minimum() {
            return Err(EnrollmentError::BelowFreezeMinimum);
        }
        if height < utxo.unlock_height {
            return Err(EnrollmentError::UtxoNotYetUnlocked);
        }
        let signer_key = match &utxo.output.lock {
            Lock::Key(pk) => *pk,
            _ => return Err(EnrollmentError::LockIsNotDirectKey),
        };
        let challenge = enrollment_challenge(&enrollment);
        if !schnorr_verify(&signer_key, &enrollment.enroll_sig, &challenge) {
            return Err(EnrollmentError::InvalidSignature);
        }

        self.validators.insert(
            enrollment.utxo_key,
            ActiveValidator {
                public_key: signer_key,
                enrollment,
                enrollment_height: height,
                revealed: Vec::new(),
            },
        );
        Ok(())
    }

    /// Reveal the next pre-image in `utxo_key`'s chain: it must hash to the
    /// most recently revealed one (or to the published `random_seed`
    /// commitment, for the first reveal).
    ///
    /// Per §9's open question resolution: if `preimage` does not hash to
    /// the expected predecessor, the reveal is rejected but the validator's
    /// enrollment is left untouched (no slashing).
    pub fn reveal_preimage(&mut self, utxo_key: &Hash, preimage: Hash) -> Result<(), EnrollmentError> {
        let validator = self
            .validators
            .get_mut(utxo_key)
            .ok_or(EnrollmentError::MissingUtxo)?;
        let previous = validator.revealed.last().copied().unwrap_or(validator.enrollment.random_seed);
        if !verifies_predecessor(&preimage, &previous) {
            return Err(EnrollmentError::InvalidSignature);
        }
        validator.revealed.push(preimage);
        Ok(())
    }

    /// Drop validators whose cycle has expired by `height`.
    pub fn clear_expired(&mut self, height: u64) {
        self.validators
            .retain(|_, v| v.enrollment_height + v.enrollment.cycle_length > height);
    }

    pub fn validator_count(&self, height: u64) -> usize {
        self.validators
            .values()
            .filter(|v| v.enrollment_height + v.enrollment.cycle_length > height)
            .count()
    }

    /// The Freeze UTXO keys each active enrollment is bound to.
    pub fn get_enrolled_utxos(&self) -> Vec<Hash> {
        self.validators.keys().copied().collect()
    }

    /// The Freeze UTXO keys of validators still active at `height`, sorted.
    pub fn active_utxo_keys(&self, height: u64) -> Vec<Hash> {
        self.validators
            .iter()
            .filter(|(_, v)| v.enrollment_height + v.enrollment.cycle_length > height)
            .map(|(key, _)| *key)
            .collect()
    }

    /// The public key a given Freeze UTXO's validator enrolled under.
    pub fn get_enrollment_public_key(&self, utxo_key: &Hash) -> Option<PublicKey> {
        self.validators.get(utxo_key).map(|v| v.public_key)
    }

    /// Stake-weighted validator list, sorted by public key, for the quorum
    /// builder: `(public_key, stake_amount)`, using each validator's bound
    /// Freeze UTXO as its stake.
    pub fn stake_weighted_validators(&self, stakes: &BTreeMap<Hash, u64>) -> Vec<(PublicKey, u64)> {
        let mut out: Vec<(PublicKey, u64)> = self
            .validators
            .iter()
            .map(|(utxo_key, v)| (v.public_key, stakes.get(utxo_key).copied().unwrap_or(0)))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    /// Deterministic combination of the most recently revealed pre-image
    /// from every active validator in `sorted_keys` order, fed to the
    /// quorum builder as `rand_seed` (§4.6).
    pub fn get_random_seed(&self, sorted_keys: &[Hash]) -> Hash {
        let parts: Vec<&[u8]> = sorted_keys
            .iter()
            .filter_map(|key| self.validators.get(key))
            .filter_map(|v| v.revealed.last())
            .map(|h| h.as_bytes().as_slice())
            .collect();
        hash_multi(&parts)
    }
}

fn enrollment_challenge(enrollment: &Enrollment) -> Hash {
    hash_multi(&[
        enrollment.utxo_key.as_bytes(),
        &enrollment.cycle_length.to_le_bytes(),
        enrollment.random_seed.as_bytes(),
    ])
}
