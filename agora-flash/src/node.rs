// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! A node's set of open channels, keyed by channel id (§5, §6).

use std::collections::HashMap;

use agora_common::{Amount, Hash};
use agora_crypto::PrivateKey;
use agora_transaction::Transaction;
use tracing::{info, warn};

use crate::channel::{Channel, ChannelConfig, ChannelState, FlashPeer};
use crate::error::{ErrorCode, FlashError, FlashResult};

/// Owns every channel this node is a party to and dispatches the §6
/// interface methods to the right one.
///
/// Generic over the peer transport so tests can run against an in-process
/// [`FlashPeer`] stub instead of a real network connection.
pub struct FlashNode<P: FlashPeer> {
    channels: HashMap<Hash, Channel<P>>,
}

impl<P: FlashPeer> FlashNode<P> {
    pub fn new() -> Self {
        FlashNode {
            channels: HashMap::new(),
        }
    }

    pub fn open_channel(
        &mut self,
        config: ChannelConfig,
        own_key: PrivateKey,
        peer: P,
        genesis_hash: Hash,
        rng_seed: u64,
    ) -> FlashResult<Hash> {
        if self.channels.contains_key(&config.channel_id) {
            return Err(FlashError::new(
                ErrorCode::DuplicateChannelID,
                "a channel with this id is already registered",
            ));
        }
        let channel_id = config.channel_id;
        let mut channel = Channel::new(config, own_key, peer, rng_seed);
        channel.open(genesis_hash)?;
        info!(channel_id = %channel_id, "channel entered setup");
        self.channels.insert(channel_id, channel);
        Ok(channel_id)
    }

    fn channel_mut(&mut self, channel_id: Hash) -> FlashResult<&mut Channel<P>> {
        self.channels
            .get_mut(&channel_id)
            .ok_or_else(|| FlashError::new(ErrorCode::WrongChannelID, "no channel with this id is registered"))
    }

    pub fn bind_funding(&mut self, channel_id: Hash, funding_tx_hash: Hash, output_index: u32) -> FlashResult<()> {
        self.channel_mut(channel_id)?.bind_funding(funding_tx_hash, output_index)
    }

    pub fn propose_payment(&mut self, channel_id: Hash, amount: Amount, from_peer: bool) -> FlashResult<()> {
        self.channel_mut(channel_id)?.propose_payment(amount, from_peer)
    }

    pub fn propose_update(&mut self, channel_id: Hash, new_balances: (Amount, Amount)) -> FlashResult<()> {
        self.channel_mut(channel_id)?.propose_update(new_balances)
    }

    pub fn begin_collaborative_close(
        &mut self,
        channel_id: Hash,
        fee: Amount,
        publish: impl FnOnce(&Transaction),
    ) -> FlashResult<()> {
        self.channel_mut(channel_id)?.begin_collaborative_close(fee, publish)
    }

    pub fn begin_unilateral_close(&mut self, channel_id: Hash, publish: impl FnOnce(&Transaction)) -> FlashResult<()> {
        let result = self.channel_mut(channel_id)?.begin_unilateral_close(publish);
        if result.is_err() {
            warn!(channel_id = %channel_id, "unilateral close rejected");
        }
        result
    }

    pub fn finalize_settlement(&mut self, channel_id: Hash, publish: impl FnOnce(&Transaction)) -> FlashResult<()> {
        self.channel_mut(channel_id)?.finalize_settlement(publish)
    }

    pub fn get_channel_state(&self, channel_id: Hash) -> FlashResult<ChannelState> {
        self.channels
            .get(&channel_id)
            .map(|c| c.state())
            .ok_or_else(|| FlashError::new(ErrorCode::InvalidChannelID, "no channel with this id is registered"))
    }
}

impl<P: FlashPeer> Default for FlashNode<P> {
    fn default() -> Self {
        Self::new()
    }
}
