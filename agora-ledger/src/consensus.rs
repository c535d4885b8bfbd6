// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! The nominated set a node proposes to its quorum slice for externalization
//! (§4.7).

use agora_blockchain::Enrollment;
use agora_transaction::Transaction;

/// A candidate block body: transactions and new validator enrollments,
/// sorted ascending by their own hash so every node that nominates the
/// same underlying set produces byte-identical `ConsensusData`.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ConsensusData {
    pub tx_set: Vec<Transaction>,
    pub enrolls: Vec<Enrollment>,
}
