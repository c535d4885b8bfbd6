// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Deterministic stake-weighted quorum-slice construction (§4.8).

use std::collections::BTreeMap;

use agora_common::{hash_multi, Hash};
use agora_crypto::PublicKey;
use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::slice::QuorumSlice;

/// A slice never holds fewer members than this, stake permitting.
pub const MIN_NODES_IN_QUORUM: usize = 3;
/// A slice never grows past this many members, no matter how much stake
/// remains undistributed (§3).
pub const MAX_NODES_IN_QUORUM: usize = 7;
/// Fraction of total stake a slice must reach before it stops growing.
const QUORUM_STAKE_FRACTION_NUM: u128 = 67;
const QUORUM_STAKE_FRACTION_DEN: u128 = 100;

/// Build one quorum slice per validator, deterministically, from each
/// validator's own public key, the full stake-weighted validator set, and a
/// shared `rand_seed` (the most recent enrolled random seed). Two nodes
/// running this function over the same inputs always produce the same
/// output (§8 property: deterministic quorum construction).
///
/// Steps follow §4.8:
/// 1. sort validators by stake, descending;
/// 2. compute `min_quorum_amount = floor(0.67 * total_stake)`;
/// 3. for each validator, seed a PRNG from `hash_multi(validator_key, rand_seed)`
///    and stake-weighted-draw other validators into its slice until the
///    slice's stake crosses `min_quorum_amount` or it hits
///    [`MAX_NODES_IN_QUORUM`] members;
/// 4. sort each slice's members by public key;
/// 5. assign any validator who ended up in nobody's slice into a randomly
///    chosen other validator's slice;
/// 6. set each slice's threshold to `ceil(0.67 * |members|)`.
pub fn build_quorum_slices(
    validators: &[(PublicKey, u64)],
    rand_seed: Hash,
) -> BTreeMap<PublicKey, QuorumSlice> {
    if validators.is_empty() {
        return BTreeMap::new();
    }

    let mut sorted = validators.to_vec();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let total_stake: u128 = sorted.iter().map(|(_, stake)| *stake as u128).sum();
    let min_quorum_amount = total_stake * QUORUM_STAKE_FRACTION_NUM / QUORUM_STAKE_FRACTION_DEN;

    let mut slices: BTreeMap<PublicKey, QuorumSlice> = sorted
        .iter()
        .map(|(key, _)| {
            let members = draw_slice_members(key, &sorted, min_quorum_amount, rand_seed);
            (key.clone(), QuorumSlice::new(members))
        })
        .collect();

    assign_leftover_nodes(&mut slices, &sorted, rand_seed);

    slices
}

/// Stake-weighted draw of members for `node`'s own slice (§4.8 steps 2-3).
fn draw_slice_members(
    node: &PublicKey,
    sorted: &[(PublicKey, u64)],
    min_quorum_amount: u128,
    rand_seed: Hash,
) -> Vec<PublicKey> {
    let mut rng = seeded_rng(node, rand_seed);

    let mut pool: Vec<(PublicKey, u64)> = sorted
        .iter()
        .filter(|(key, _)| key != node)
        .cloned()
        .collect();

    let mut members = vec![node.clone()];
    let mut accumulated: u128 = sorted
        .iter()
        .find(|(key, _)| key == node)
        .map(|(_, stake)| *stake as u128)
        .unwrap_or(0);

    while accumulated < min_quorum_amount
        && members.len() < MAX_NODES_IN_QUORUM
        && !pool.is_empty()
    {
        let pool_stake: u128 = pool.iter().map(|(_, stake)| *stake as u128).sum();
        if pool_stake == 0 {
            break;
        }
        let pick = weighted_pick(&mut rng, &pool, pool_stake);
        let (picked_key, picked_stake) = pool.remove(pick);
        accumulated += picked_stake as u128;
        members.push(picked_key);
    }

    while members.len() < MIN_NODES_IN_QUORUM.min(sorted.len()) && !pool.is_empty() {
        let pool_stake: u128 = pool.iter().map(|(_, stake)| *stake as u128).sum();
        let pick = if pool_stake == 0 {
            0
        } else {
            weighted_pick(&mut rng, &pool, pool_stake)
        };
        let (picked_key, _) = pool.remove(pick);
        members.push(picked_key);
    }

    members
}

/// Index into `pool` chosen with probability proportional to stake.
fn weighted_pick(rng: &mut ChaCha20Rng, pool: &[(PublicKey, u64)], pool_stake: u128) -> usize {
    let mut roll = (rng.next_u64() as u128) % pool_stake;
    for (index, (_, stake)) in pool.iter().enumerate() {
        if roll < *stake as u128 {
            return index;
        }
        roll -= *stake as u128;
    }
    pool.len() - 1
}

fn seeded_rng(node: &PublicKey, rand_seed: Hash) -> ChaCha20Rng {
    let digest = hash_multi(&[&node.to_bytes(), rand_seed.as_bytes()]);
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest.as_bytes()[..8]);
    ChaCha20Rng::seed_from_u64(u64::from_le_bytes(seed_bytes))
}

/// Any validator who isn't a member of any other validator's slice gets
/// folded into one, chosen deterministically, so the network-wide slice
/// collection always covers every enrolled validator (§9 open question:
/// "leftover node" assignment).
fn assign_leftover_nodes(
    slices: &mut BTreeMap<PublicKey, QuorumSlice>,
    sorted: &[(PublicKey, u64)],
    rand_seed: Hash,
) {
    if sorted.len() < 2 {
        return;
    }

    let covered: std::collections::BTreeSet<PublicKey> = slices
        .iter()
        .flat_map(|(owner, slice)| {
            slice
                .members
                .iter()
                .filter(move |member| *member != owner)
                .cloned()
        })
        .collect();

    for (node, _) in sorted {
        if covered.contains(node) {
            continue;
        }
        let mut rng = seeded_rng(node, rand_seed);
        let others: Vec<PublicKey> = sorted
            .iter()
            .map(|(key, _)| key.clone())
            .filter(|key| key != node)
            .collect();
        if others.is_empty() {
            continue;
        }
        let target = others[(rng.next_u64() as usize) % others.len()].clone();
        if let Some(target_slice) = slices.get_mut(&target) {
            if target_slice.members.len() < MAX_NODES_IN_QUORUM
                && !target_slice.members.contains(node)
            {
                let mut members = target_slice.members.clone();
                members.push(node.clone());
                *target_slice = QuorumSlice::new(members);
            }
        }
    }
}
