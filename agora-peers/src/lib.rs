// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The collaborator interfaces the core consumes and exposes (§6): block
//! storage, the peer-network transport, and the Flash counterparty RPC.
//! No concrete network implementation lives here — transport is out of
//! scope (§1) — only the trait contracts and the opaque wire types they
//! pass.

mod transport;

pub use agora_flash::FlashPeer;
pub use agora_ledger::{BlockStorage, MemoryBlockStorage};
pub use transport::{Envelope, PeerTransport};
