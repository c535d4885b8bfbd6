// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Transaction validation (§4.3): structural rules, UTXO-referencing rules,
//! and the type-specific freeze/melt rules from §3.

mod error;
mod validate;

pub use error::{TransactionValidationError, TransactionValidationResult};
pub use validate::{validate, UtxoFinder};
