// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Eltoo-style payment channels (§4.9, §4.10): per-sequence key derivation,
//! the two-branch settlement/update lock script, two-party signature
//! aggregation, and the channel state machine built on top of them.

mod channel;
mod eltoo;
mod error;
mod keys;
mod node;
mod signing;

pub use channel::{Channel, ChannelConfig, ChannelState, FlashPeer, UpdatePair};
pub use eltoo::{create_lock_eltoo, unlock_eltoo_settle, unlock_eltoo_update};
pub use error::{ErrorCode, FlashError, FlashResult};
pub use keys::{derive_settle_private, derive_settle_public, NoncePair};
pub use node::FlashNode;
pub use signing::{fresh_nonce, local_contribution, LocalNonce};
