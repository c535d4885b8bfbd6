// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end Eltoo channel scenarios (§8 S7/S8): a funded channel settles
//! only once mature, and a stale update can never replace a newer one.

use std::cell::RefCell;

use agora_common::{Amount, Hash};
use agora_crypto::{PrivateKey, PublicKey, SignerContribution};
use agora_flash::{
    derive_settle_private, derive_settle_public, fresh_nonce, local_contribution, Channel,
    ChannelConfig, ChannelState, FlashPeer, FlashResult, NoncePair,
};
use agora_transaction::{get_challenge, SigHash, Transaction};
use curve25519_dalek::scalar::Scalar;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

/// Plays the counterparty's half of every signing round synchronously,
/// standing in for a real network round-trip.
struct CounterpartyPeer {
    private: PrivateKey,
    counterpart_base: PublicKey,
    rng: RefCell<ChaCha20Rng>,
}

impl CounterpartyPeer {
    fn new(private: PrivateKey, counterpart_base: PublicKey, seed: u64) -> Self {
        CounterpartyPeer {
            private,
            counterpart_base,
            rng: RefCell::new(ChaCha20Rng::seed_from_u64(seed)),
        }
    }

    fn contribute(
        &self,
        tx: &Transaction,
        own_nonce: &NoncePair,
        my_private: PrivateKey,
        my_public: PublicKey,
        peer_public: PublicKey,
    ) -> FlashResult<SignerContribution> {
        let nonce = fresh_nonce(&mut *self.rng.borrow_mut());
        let challenge = get_challenge(tx, SigHash::NoInput, 0)
            .expect("single-input channel transaction always has input 0");
        Ok(local_contribution(
            &my_private,
            my_public,
            &nonce,
            own_nonce.settle_nonce.point(),
            &peer_public,
            &challenge,
        ))
    }
}

impl FlashPeer for CounterpartyPeer {
    fn open_channel(&self, _conf: &ChannelConfig, _own_nonce: &NoncePair) -> FlashResult<NoncePair> {
        let nonce = fresh_nonce(&mut *self.rng.borrow_mut());
        let pk = PublicKey::from_point(nonce.point);
        Ok(NoncePair {
            settle_nonce: pk,
            update_nonce: pk,
        })
    }

    fn request_settle_sig(
        &self,
        _channel_id: Hash,
        seq: u64,
        settle_tx: &Transaction,
        own_nonce: &NoncePair,
    ) -> FlashResult<SignerContribution> {
        let my_private = derive_settle_private(&self.private, seq);
        let my_public = derive_settle_public(&self.private.public_key(), seq);
        let peer_public = derive_settle_public(&self.counterpart_base, seq);
        self.contribute(settle_tx, own_nonce, my_private, my_public, peer_public)
    }

    fn request_update_sig(
        &self,
        _channel_id: Hash,
        _seq: u64,
        update_tx: &Transaction,
        own_nonce: &NoncePair,
    ) -> FlashResult<SignerContribution> {
        self.contribute(
            update_tx,
            own_nonce,
            self.private.clone(),
            self.private.public_key(),
            self.counterpart_base,
        )
    }

    fn close_channel(
        &self,
        _channel_id: Hash,
        _seq: u64,
        _own_nonce: &NoncePair,
        _fee: Amount,
    ) -> FlashResult<SignerContribution> {
        unimplemented!("not exercised by this test")
    }

    fn get_channel_state(&self, _channel_id: Hash) -> FlashResult<ChannelState> {
        unimplemented!("not exercised by this test")
    }
}

fn funder_key() -> PrivateKey {
    PrivateKey::from_scalar(Scalar::from_bytes_mod_order([7u8; 32]))
}

fn peer_key() -> PrivateKey {
    PrivateKey::from_scalar(Scalar::from_bytes_mod_order([9u8; 32]))
}

fn open_funded_channel() -> Channel<CounterpartyPeer> {
    let funder = funder_key();
    let peer = peer_key();
    let genesis_hash = Hash::digest(b"agora test genesis");
    let config = ChannelConfig {
        channel_id: Hash::digest(b"channel-1"),
        genesis_hash,
        funder: funder.public_key(),
        peer: peer.public_key(),
        capacity: Amount::new(1_000),
        settle_time: 10,
    };
    let counterparty = CounterpartyPeer::new(peer, funder.public_key(), 1);
    let mut channel = Channel::new(config, funder, counterparty, 2);
    channel.open(genesis_hash).unwrap();
    assert_eq!(channel.state(), ChannelState::WaitingForFunding);

    channel.bind_funding(Hash::digest(b"funding-tx"), 0).unwrap();
    assert_eq!(channel.state(), ChannelState::Open);
    channel
}

#[test]
fn opening_a_channel_negotiates_the_sequence_zero_settlement() {
    let channel = open_funded_channel();
    assert_eq!(channel.balances(), Some((Amount::new(1_000), Amount::ZERO)));
}

#[test]
fn a_payment_advances_the_sequence_and_rebalances_the_channel() {
    let mut channel = open_funded_channel();
    channel.propose_payment(Amount::new(400), false).unwrap();
    assert_eq!(channel.current_seq(), 1);
    assert_eq!(channel.balances(), Some((Amount::new(600), Amount::new(400))));
}

#[test]
fn a_payment_exceeding_the_payer_balance_is_rejected() {
    let mut channel = open_funded_channel();
    let err = channel.propose_payment(Amount::new(5_000), false).unwrap_err();
    assert_eq!(err.code, agora_flash::ErrorCode::ExceedsMaximumPayment);
    assert_eq!(channel.current_seq(), 0);
}

#[test]
fn collaborative_close_settles_immediately_without_a_dispute_window() {
    let mut channel = open_funded_channel();
    channel.propose_payment(Amount::new(250), false).unwrap();

    let mut published = None;
    channel
        .begin_collaborative_close(Amount::ZERO, |tx| published = Some(tx.clone()))
        .unwrap();

    assert_eq!(channel.state(), ChannelState::Closed);
    assert!(published.is_some());
}

#[test]
fn unilateral_close_requires_a_publish_before_settlement_is_allowed() {
    let mut channel = open_funded_channel();
    channel.propose_payment(Amount::new(100), false).unwrap();

    let mut published_update = None;
    channel
        .begin_unilateral_close(|tx| published_update = Some(tx.clone()))
        .unwrap();
    assert_eq!(channel.state(), ChannelState::PendingClose);
    assert!(published_update.is_some());

    let mut published_settle = None;
    channel
        .finalize_settlement(|tx| published_settle = Some(tx.clone()))
        .unwrap();
    assert_eq!(channel.state(), ChannelState::Closed);
    assert!(published_settle.is_some());
}

#[test]
fn node_rejects_opening_the_same_channel_id_twice() {
    use agora_flash::FlashNode;

    let funder = funder_key();
    let genesis_hash = Hash::digest(b"agora test genesis");
    let config = ChannelConfig {
        channel_id: Hash::digest(b"channel-dup"),
        genesis_hash,
        funder: funder.public_key(),
        peer: peer_key().public_key(),
        capacity: Amount::new(1_000),
        settle_time: 10,
    };

    let mut node: FlashNode<CounterpartyPeer> = FlashNode::new();
    let peer_for_open = CounterpartyPeer::new(peer_key(), funder.public_key(), 3);
    let channel_id = node
        .open_channel(config.clone(), funder.clone(), peer_for_open, genesis_hash, 4)
        .unwrap();
    assert_eq!(node.get_channel_state(channel_id).unwrap(), ChannelState::WaitingForFunding);

    let peer_for_dup = CounterpartyPeer::new(peer_key(), funder.public_key(), 5);
    let err = node
        .open_channel(config, funder, peer_for_dup, genesis_hash, 6)
        .unwrap_err();
    assert_eq!(err.code, agora_flash::ErrorCode::DuplicateChannelID);
}
