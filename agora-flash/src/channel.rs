// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The per-channel Eltoo state machine (§4.9).

use agora_common::{Amount, Hash};
use agora_crypto::{aggregate, schnorr_verify, PrivateKey, PublicKey, Signature};
use agora_transaction::{get_challenge, Input, Lock, Output, SigHash, Transaction, TxType, Unlock};
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::{ErrorCode, FlashError, FlashResult};
use crate::eltoo::{create_lock_eltoo, unlock_eltoo_settle, unlock_eltoo_update};
use crate::keys::{derive_settle_private, derive_settle_public, NoncePair};
use crate::signing::{fresh_nonce, local_contribution};

/// A channel's lifecycle (§4.9). Transitions are monotonic: a channel never
/// moves backward through this list.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ChannelState {
    Setup,
    WaitingForFunding,
    Open,
    PendingClose,
    Closed,
}

/// The parameters both parties agree on before `Setup` begins.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ChannelConfig {
    pub channel_id: Hash,
    pub genesis_hash: Hash,
    pub funder: PublicKey,
    pub peer: PublicKey,
    pub capacity: Amount,
    pub settle_time: u64,
}

impl ChannelConfig {
    /// The constant two-party update key: the point sum of both parties'
    /// long-term identity keys. Unlike the settlement key it is not
    /// re-derived per sequence.
    pub fn update_x(&self) -> PublicKey {
        PublicKey::from_point(self.funder.point() + self.peer.point())
    }

    /// The two-party settlement key for `seq`: the point sum of both
    /// parties' per-sequence derived settlement keys (§4.9's
    /// `settle_kp_s = settle_kp_0 + Scalar(hashFull(s))`, applied to each
    /// side then summed).
    pub fn settle_x(&self, seq: u64) -> PublicKey {
        let funder = derive_settle_public(&self.funder, seq);
        let peer = derive_settle_public(&self.peer, seq);
        PublicKey::from_point(funder.point() + peer.point())
    }

    /// The Eltoo lock script this channel's funding/update output at `seq`
    /// must carry.
    pub fn lock_script(&self, seq: u64) -> Vec<u8> {
        create_lock_eltoo(self.settle_time, &self.settle_x(seq), &self.update_x(), seq)
    }
}

/// The signed settlement (and, for every sequence but the first, update)
/// transaction pair for one channel state. A higher-sequence pair
/// supersedes every earlier one.
#[derive(Clone, Debug)]
pub struct UpdatePair {
    pub seq_id: u64,
    pub balances: (Amount, Amount),
    pub settle_tx: Transaction,
    /// `None` for sequence 0: the funding transaction itself carries that
    /// first state, so there is no separate update transaction to publish.
    pub update_tx: Option<Transaction>,
}

/// The RPC surface a channel's counterparty exposes (§6). `agora-peers`
/// implements this over a concrete transport; this crate only depends on
/// the interface, the way [`crate::keys`]'s derivations don't care how the
/// bytes reach the wire.
pub trait FlashPeer {
    fn open_channel(&self, conf: &ChannelConfig, own_nonce: &NoncePair) -> FlashResult<NoncePair>;
    fn request_settle_sig(
        &self,
        channel_id: Hash,
        seq: u64,
        settle_tx: &Transaction,
        own_nonce: &NoncePair,
    ) -> FlashResult<agora_crypto::SignerContribution>;
    fn request_update_sig(
        &self,
        channel_id: Hash,
        seq: u64,
        update_tx: &Transaction,
        own_nonce: &NoncePair,
    ) -> FlashResult<agora_crypto::SignerContribution>;
    fn close_channel(
        &self,
        channel_id: Hash,
        seq: u64,
        own_nonce: &NoncePair,
        fee: Amount,
    ) -> FlashResult<agora_crypto::SignerContribution>;
    fn get_channel_state(&self, channel_id: Hash) -> FlashResult<ChannelState>;
}

/// One party's view of a channel: its own identity key, the counterparty
/// RPC handle, and the negotiated state history.
pub struct Channel<P: FlashPeer> {
    config: ChannelConfig,
    own_key: PrivateKey,
    is_funder: bool,
    peer: P,
    state: ChannelState,
    history: Vec<UpdatePair>,
    funding_outpoint: Option<(Hash, u32)>,
    rng: ChaCha20Rng,
}

fn plain_outputs(balances: (Amount, Amount), funder: &PublicKey, peer: &PublicKey) -> Vec<Output> {
    let mut outputs = Vec::with_capacity(2);
    if balances.0.is_valid_positive() {
        outputs.push(Output {
            amount: balances.0,
            lock: Lock::Key(*funder),
        });
    }
    if balances.1.is_valid_positive() {
        outputs.push(Output {
            amount: balances.1,
            lock: Lock::Key(*peer),
        });
    }
    outputs
}

fn placeholder_input() -> Input {
    Input {
        previous_tx_hash: Hash::ZERO,
        output_index: 0,
        unlock_age: 0,
        unlock_script: Unlock::default(),
    }
}

impl<P: FlashPeer> Channel<P> {
    /// `own_key` must be the private half of either `config.funder` or
    /// `config.peer`; callers are expected to have validated that before
    /// construction, the way a wallet would reject a channel open request
    /// for a key it doesn't hold.
    pub fn new(config: ChannelConfig, own_key: PrivateKey, peer: P, rng_seed: u64) -> Self {
        let is_funder = own_key.public_key() == config.funder;
        Channel {
            config,
            own_key,
            is_funder,
            peer,
            state: ChannelState::Setup,
            history: Vec::new(),
            funding_outpoint: None,
            rng: ChaCha20Rng::seed_from_u64(rng_seed),
        }
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    pub fn channel_id(&self) -> Hash {
        self.config.channel_id
    }

    pub fn current_seq(&self) -> u64 {
        self.history.last().map(|pair| pair.seq_id).unwrap_or(0)
    }

    pub fn balances(&self) -> Option<(Amount, Amount)> {
        self.history.last().map(|pair| pair.balances)
    }

    fn counterpart_base(&self) -> PublicKey {
        if self.is_funder {
            self.config.peer
        } else {
            self.config.funder
        }
    }

    /// **Setup**: collaboratively sign the sequence-0 settlement that
    /// refunds everything to the funder. Does not publish the funding
    /// transaction — the funder does that separately once this returns,
    /// then calls [`Channel::bind_funding`].
    pub fn open(&mut self, observed_genesis: Hash) -> FlashResult<()> {
        if self.state != ChannelState::Setup {
            return Err(FlashError::new(
                ErrorCode::SigningInProcess,
                "channel setup has already run",
            ));
        }
        if observed_genesis != self.config.genesis_hash {
            return Err(FlashError::new(
                ErrorCode::InvalidGenesisHash,
                "channel is bound to a different chain than this node's",
            ));
        }
        if !self.config.capacity.is_valid_positive() {
            return Err(FlashError::new(
                ErrorCode::FundingTooLow,
                "channel capacity must be a positive amount",
            ));
        }

        let settle_tx = self.build_settle_tx(0, (self.config.capacity, Amount::ZERO));
        let settle_sig = self.sign_settle(0, &settle_tx)?;
        let mut settle_tx = settle_tx;
        settle_tx.inputs[0].unlock_script = Unlock(unlock_eltoo_settle(&settle_sig));

        self.history.push(UpdatePair {
            seq_id: 0,
            balances: (self.config.capacity, Amount::ZERO),
            settle_tx,
            update_tx: None,
        });
        self.state = ChannelState::WaitingForFunding;
        Ok(())
    }

    /// Record the real outpoint of the published funding transaction, and
    /// move the channel to `Open`.
    pub fn bind_funding(&mut self, funding_tx_hash: Hash, output_index: u32) -> FlashResult<()> {
        if self.state != ChannelState::WaitingForFunding {
            return Err(FlashError::new(
                ErrorCode::ChannelNotFunded,
                "channel is not waiting on a funding transaction",
            ));
        }
        self.funding_outpoint = Some((funding_tx_hash, output_index));
        let genesis_pair = self
            .history
            .first_mut()
            .expect("Setup always records the sequence-0 pair before WaitingForFunding");
        genesis_pair.settle_tx.inputs[0].previous_tx_hash = funding_tx_hash;
        genesis_pair.settle_tx.inputs[0].output_index = output_index;
        self.state = ChannelState::Open;
        Ok(())
    }

    /// The outpoint an update (or, at sequence 0, settlement) transaction
    /// spending the current on-chain state must reference.
    fn current_outpoint(&self) -> FlashResult<(Hash, u32)> {
        match self.history.last() {
            None => Err(FlashError::new(
                ErrorCode::ChannelNotOpen,
                "channel has no negotiated state yet",
            )),
            Some(pair) => match &pair.update_tx {
                Some(update_tx) => Ok((update_tx.hash(), 0)),
                None => self.funding_outpoint.ok_or_else(|| {
                    FlashError::new(ErrorCode::ChannelNotFunded, "funding outpoint is not bound yet")
                }),
            },
        }
    }

    fn build_settle_tx(&self, _seq: u64, balances: (Amount, Amount)) -> Transaction {
        Transaction {
            tx_type: TxType::Payment,
            inputs: vec![placeholder_input()],
            outputs: plain_outputs(balances, &self.config.funder, &self.config.peer),
            unlock_height: None,
        }
    }

    fn build_update_tx(&self, seq: u64) -> Transaction {
        Transaction {
            tx_type: TxType::Payment,
            inputs: vec![placeholder_input()],
            outputs: vec![Output {
                amount: self.config.capacity,
                lock: Lock::Script(self.config.lock_script(seq)),
            }],
            unlock_height: Some(seq),
        }
    }

    fn sign_settle(&mut self, seq: u64, tx: &Transaction) -> FlashResult<Signature> {
        let my_nonce = fresh_nonce(&mut self.rng);
        let my_noncepair = NoncePair {
            settle_nonce: PublicKey::from_point(my_nonce.point),
            update_nonce: PublicKey::from_point(my_nonce.point),
        };
        let peer_contribution =
            self.peer
                .request_settle_sig(self.config.channel_id, seq, tx, &my_noncepair)?;

        let my_private = derive_settle_private(&self.own_key, seq);
        let my_public = derive_settle_public(&self.own_key.public_key(), seq);
        let peer_public = derive_settle_public(&self.counterpart_base(), seq);

        let challenge = get_challenge(tx, SigHash::NoInput, 0).map_err(|_| {
            FlashError::new(ErrorCode::InvalidSequenceID, "settlement transaction has no input 0")
        })?;
        let mine = local_contribution(
            &my_private,
            my_public,
            &my_nonce,
            peer_contribution.r,
            &peer_public,
            &challenge,
        );

        self.finish_aggregate(mine, peer_contribution, &self.config.settle_x(seq), &challenge)
    }

    fn sign_update(&mut self, seq: u64, tx: &Transaction) -> FlashResult<Signature> {
        let my_nonce = fresh_nonce(&mut self.rng);
        let my_noncepair = NoncePair {
            settle_nonce: PublicKey::from_point(my_nonce.point),
            update_nonce: PublicKey::from_point(my_nonce.point),
        };
        let peer_contribution =
            self.peer
                .request_update_sig(self.config.channel_id, seq, tx, &my_noncepair)?;

        let my_public = self.own_key.public_key();
        let peer_public = self.counterpart_base();

        let challenge = get_challenge(tx, SigHash::NoInput, 0).map_err(|_| {
            FlashError::new(ErrorCode::InvalidSequenceID, "update transaction has no input 0")
        })?;
        let mine = local_contribution(
            &self.own_key,
            my_public,
            &my_nonce,
            peer_contribution.r,
            &peer_public,
            &challenge,
        );

        self.finish_aggregate(mine, peer_contribution, &self.config.update_x(), &challenge)
    }

    fn finish_aggregate(
        &self,
        mine: agora_crypto::SignerContribution,
        theirs: agora_crypto::SignerContribution,
        expected_key: &PublicKey,
        challenge: &Hash,
    ) -> FlashResult<Signature> {
        let (agg_pub, sig) = aggregate(&[mine, theirs])
            .map_err(|_| FlashError::new(ErrorCode::InvalidSignature, "no signer contributions to aggregate"))?;
        if &agg_pub != expected_key {
            return Err(FlashError::new(
                ErrorCode::InvalidSignature,
                "aggregate key does not match this sequence's signer key",
            ));
        }
        if !schnorr_verify(&agg_pub, &sig, challenge) {
            return Err(FlashError::new(
                ErrorCode::InvalidSignature,
                "aggregate signature failed to verify",
            ));
        }
        Ok(sig)
    }

    /// Propose moving the channel to `new_balances` at the next sequence
    /// id. Signs settlement before update (§4.9's asymmetric-risk rule),
    /// then locally patches the settlement's input to point at the freshly
    /// signed update transaction.
    pub fn propose_update(&mut self, new_balances: (Amount, Amount)) -> FlashResult<()> {
        if self.state != ChannelState::Open {
            return Err(FlashError::new(
                ErrorCode::ChannelNotOpen,
                "channel must be Open to propose a balance update",
            ));
        }
        let total = new_balances.0.checked_add(new_balances.1).map_err(|_| {
            FlashError::new(ErrorCode::ExceedsMaximumPayment, "new balances overflow the channel capacity")
        })?;
        if total.value() > self.config.capacity.value() {
            return Err(FlashError::new(
                ErrorCode::ExceedsMaximumPayment,
                "new balances exceed the channel's funded capacity",
            ));
        }

        let next_seq = self.current_seq() + 1;
        let (prior_hash, prior_index) = self.current_outpoint()?;

        let settle_tx = self.build_settle_tx(next_seq, new_balances);
        let settle_sig = self.sign_settle(next_seq, &settle_tx)?;

        let mut update_tx = self.build_update_tx(next_seq);
        update_tx.inputs[0].previous_tx_hash = prior_hash;
        update_tx.inputs[0].output_index = prior_index;
        let update_sig = self.sign_update(next_seq, &update_tx)?;
        update_tx.inputs[0].unlock_script = Unlock(unlock_eltoo_update(&update_sig));

        let mut settle_tx = settle_tx;
        settle_tx.inputs[0].previous_tx_hash = update_tx.hash();
        settle_tx.inputs[0].output_index = 0;
        settle_tx.inputs[0].unlock_script = Unlock(unlock_eltoo_settle(&settle_sig));

        self.history.push(UpdatePair {
            seq_id: next_seq,
            balances: new_balances,
            settle_tx,
            update_tx: Some(update_tx),
        });
        Ok(())
    }

    /// Move `amount` from the funder's side of the balance to the peer's
    /// (or the reverse, if `from_peer` is set), then propose the update.
    pub fn propose_payment(&mut self, amount: Amount, from_peer: bool) -> FlashResult<()> {
        let (funder_balance, peer_balance) = self.balances().ok_or_else(|| {
            FlashError::new(ErrorCode::ChannelNotOpen, "channel has no current balance")
        })?;
        let new_balances = if from_peer {
            let peer_new = peer_balance.checked_sub(amount).map_err(|_| {
                FlashError::new(ErrorCode::ExceedsMaximumPayment, "payment exceeds the peer's balance")
            })?;
            let funder_new = funder_balance.checked_add(amount).map_err(|_| {
                FlashError::new(ErrorCode::ExceedsMaximumPayment, "payment overflows the funder's balance")
            })?;
            (funder_new, peer_new)
        } else {
            let funder_new = funder_balance.checked_sub(amount).map_err(|_| {
                FlashError::new(ErrorCode::ExceedsMaximumPayment, "payment exceeds the funder's balance")
            })?;
            let peer_new = peer_balance.checked_add(amount).map_err(|_| {
                FlashError::new(ErrorCode::ExceedsMaximumPayment, "payment overflows the peer's balance")
            })?;
            (funder_new, peer_new)
        };
        self.propose_update(new_balances)
    }

    /// Publish the latest update transaction (or, at sequence 0, nothing —
    /// the funding transaction is already the on-chain state) via
    /// `publish`, starting the dispute window.
    pub fn begin_unilateral_close(&mut self, publish: impl FnOnce(&Transaction)) -> FlashResult<()> {
        if self.state != ChannelState::Open {
            return Err(FlashError::new(
                ErrorCode::ChannelNotOpen,
                "channel must be Open to begin closing",
            ));
        }
        let latest = self
            .history
            .last()
            .expect("Open implies at least the sequence-0 pair exists");
        if let Some(update_tx) = &latest.update_tx {
            publish(update_tx);
        }
        self.state = ChannelState::PendingClose;
        Ok(())
    }

    /// Publish the settlement transaction, realizing the final balance.
    /// The chain itself enforces `unlock_age >= settle_time` via
    /// `VERIFY_INPUT_LOCK`; the caller is expected to have waited that long
    /// since the update transaction (or funding transaction, at sequence 0)
    /// was externalized.
    pub fn finalize_settlement(&mut self, publish: impl FnOnce(&Transaction)) -> FlashResult<()> {
        if self.state != ChannelState::PendingClose {
            return Err(FlashError::new(
                ErrorCode::SettleNotReceived,
                "channel must have published an update before settling",
            ));
        }
        let latest = self
            .history
            .last()
            .expect("PendingClose implies at least one negotiated pair exists");
        publish(&latest.settle_tx);
        self.state = ChannelState::Closed;
        Ok(())
    }

    /// Collaborative close: both parties co-sign a direct spend of the
    /// current on-chain state (taking the update branch one sequence
    /// higher, so the old lock still accepts it) straight to each side's
    /// final balance, skipping the dispute window entirely.
    pub fn begin_collaborative_close(&mut self, fee: Amount, publish: impl FnOnce(&Transaction)) -> FlashResult<()> {
        if self.state != ChannelState::Open {
            return Err(FlashError::new(
                ErrorCode::ChannelNotOpen,
                "channel must be Open to begin a collaborative close",
            ));
        }
        let (funder_balance, peer_balance) = self
            .balances()
            .expect("Open implies at least the sequence-0 pair exists");
        let payer_balance = if self.is_funder { funder_balance } else { peer_balance };
        let payer_balance = payer_balance
            .checked_sub(fee)
            .map_err(|_| FlashError::new(ErrorCode::ExceedsMaximumPayment, "fee exceeds this side's balance"))?;
        let new_balances = if self.is_funder {
            (payer_balance, peer_balance)
        } else {
            (funder_balance, payer_balance)
        };

        let next_seq = self.current_seq() + 1;
        let (prior_hash, prior_index) = self.current_outpoint()?;

        let mut close_tx = Transaction {
            tx_type: TxType::Payment,
            inputs: vec![placeholder_input()],
            outputs: plain_outputs(new_balances, &self.config.funder, &self.config.peer),
            unlock_height: Some(next_seq),
        };
        close_tx.inputs[0].previous_tx_hash = prior_hash;
        close_tx.inputs[0].output_index = prior_index;

        let sig = self.sign_update(next_seq, &close_tx)?;
        close_tx.inputs[0].unlock_script = Unlock(unlock_eltoo_update(&sig));

        publish(&close_tx);
        self.history.push(UpdatePair {
            seq_id: next_seq,
            balances: new_balances,
            settle_tx: close_tx.clone(),
            update_tx: Some(close_tx),
        });
        self.state = ChannelState::Closed;
        Ok(())
    }
}
