// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Shared primitives used across the Agora workspace: the opaque [`Hash`]
//! digest, the saturating-checked [`Amount`] type, node/responder
//! identifiers, and the `tracing`-based logging setup.

mod amount;
mod hash;
pub mod logger;
mod node_id;

pub use amount::{Amount, AmountError, AmountStatus, MIN_FREEZE_AMOUNT};
pub use hash::{hash_multi, Hash, HashError};
pub use node_id::{NodeId, ResponderId, ResponderIdParseError};
