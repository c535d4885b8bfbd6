// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The lock/unlock script interpreter.
//!
//! Evaluation is two-phase: the unlock script runs first against a fresh
//! stack, then (for [`Lock::Script`]/[`Lock::ScriptHash`]) the lock script
//! continues against the same stack. [`Lock::Key`]/[`Lock::KeyHash`] never
//! touch the stack machine at all — they verify directly, per §4.2 of the
//! design.

mod context;
mod error;
mod opcode;
mod scope;
mod stack;
mod vm;

pub use context::{ScriptContext, SigHash};
pub use error::ScriptError;
pub use opcode::Opcode;
pub use stack::{MAX_STACK_ITEM_SIZE, MAX_STACK_TOTAL_SIZE};
pub use vm::{evaluate, Lock};
