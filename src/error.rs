// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use std::fmt;

use thiserror::Error;

/// Category of a failed bridge submission.
///
/// Submission failures are fatal to a bridge run and are never retried, so the
/// category only exists to let callers render a useful message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionErrorKind {
    /// The wallet or signer refused to sign the transaction.
    UserRejected,
    /// The sender cannot cover the token amount or the messaging fee.
    InsufficientFunds,
    /// The node could not be reached or rejected the request.
    Network,
}

impl fmt::Display for SubmissionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UserRejected => f.write_str("user rejected"),
            Self::InsufficientFunds => f.write_str("insufficient funds"),
            Self::Network => f.write_str("network error"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Balance read failed on {chain}: {reason}")]
    BalanceRead { chain: String, reason: String },

    #[error("Bridge submission failed ({kind}): {reason}")]
    Submission {
        kind: SubmissionErrorKind,
        reason: String,
    },

    #[error("Transaction failed: {reason}")]
    TransactionFailed { reason: String },

    #[error("Timeout waiting for source transaction confirmation")]
    ConfirmationTimeout,

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Contract call failed: {0}")]
    ContractCall(String),

    #[error("RPC error: {0}")]
    Rpc(#[from] alloy_json_rpc::RpcError<alloy_transport::TransportErrorKind>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Amount conversion error: {0}")]
    Units(#[from] alloy_primitives::utils::UnitsError),
}

impl BridgeError {
    /// Returns true for errors that may clear up when the same call is
    /// retried, such as a dropped connection. Configuration and input errors
    /// never do.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::BalanceRead { .. } | Self::Provider(_) | Self::Rpc(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
