// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Flash's enumerated error codes (§7).

use displaydoc::Display;

/// Category of a Flash operation failure.
///
/// Mirrors the enumerated codes of §7 verbatim, minus the `None` sentinel
/// variant: an idiomatic `Result<T, FlashError>` already distinguishes
/// success from failure, so there is no need for a "no error" code to carry
/// alongside it.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum ErrorCode {
    /// the counterparty never returned its settlement signature
    SettleNotReceived,
    /// sequence id does not match the channel's current sequence
    InvalidSequenceID,
    /// signature failed to verify
    InvalidSignature,
    /// channel id does not match the channel this request was routed to
    WrongChannelID,
    /// a channel with this id already exists
    DuplicateChannelID,
    /// channel is bound to a different genesis block than this node's chain
    InvalidGenesisHash,
    /// funding amount is below the configured minimum
    FundingTooLow,
    /// channel has not yet observed its funding transaction on-chain
    ChannelNotFunded,
    /// channel is not in the Open state
    ChannelNotOpen,
    /// a signing round is already in progress for this channel
    SigningInProcess,
    /// could not decrypt the peer's payload
    CantDecrypt,
    /// requested payment exceeds the channel's remaining capacity
    ExceedsMaximumPayment,
    /// channel id is malformed
    InvalidChannelID,
}

/// {code}: {message}
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub struct FlashError {
    pub code: ErrorCode,
    pub message: String,
}

impl FlashError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        FlashError {
            code,
            message: message.into(),
        }
    }
}

/// The result of a Flash operation.
pub type FlashResult<T> = Result<T, FlashError>;
