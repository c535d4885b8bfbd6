// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The peer-network transport interface (§6). SCP envelopes are treated
//! as opaque blobs here — the ballot/nomination protocol they carry is an
//! external collaborator, not something this workspace implements (§1).

use agora_blockchain::{Block, Enrollment};
use agora_common::{Hash, NodeId};
use agora_transaction::Transaction;

/// An opaque consensus-protocol message, passed through unexamined.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Envelope(pub Vec<u8>);

/// What a node asks of its peer-network connections.
///
/// One implementor per remote peer, the same one-object-per-counterparty
/// shape as `FlashPeer`; a concrete implementation lives in an
/// out-of-workspace transport adapter crate — `agora-node`'s stub peer
/// wiring is the reference caller.
pub trait PeerTransport {
    /// The remote peer's address and public key.
    fn node_id(&self) -> NodeId;

    fn get_block_height(&self) -> u64;

    fn get_blocks_from(&self, start: u64, max: u64) -> Vec<Block>;

    fn put_transaction(&self, tx: &Transaction);

    fn send_envelope(&self, env: &Envelope);

    fn send_enrollment(&self, enroll: &Enrollment);

    fn send_preimage(&self, preimage: Hash);
}
