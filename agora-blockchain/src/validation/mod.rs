// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Block validation (§4.4).

mod error;
mod validate;

pub use error::{BlockValidationError, BlockValidationResult};
pub use validate::{validate, TxValidator};
