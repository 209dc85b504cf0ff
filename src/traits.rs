// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Core trait abstractions for bridge operations.
//!
//! This module defines the seams between the completion detector, the
//! orchestrator and the outside world. Chain reads, transaction submission and
//! time are all injected, so the whole bridge flow can be driven by fakes (see
//! [`crate::testing`]) including flaky RPCs and fast-forwarded clocks.
//!
//! # Example: Implementing a Test Fake
//!
//! ```rust,ignore
//! use xbridge_rs::{BalanceSource, Result};
//! use alloy_chains::NamedChain;
//! use alloy_primitives::{Address, U256};
//!
//! struct FixedBalance(U256);
//!
//! #[async_trait::async_trait]
//! impl BalanceSource for FixedBalance {
//!     async fn balance_of(&self, _address: Address, _chain: NamedChain) -> Result<U256> {
//!         Ok(self.0)
//!     }
//! }
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::error::Result;

/// Read access to a fungible-token balance on a given chain.
///
/// Implementations must distinguish a failed read from a zero balance: a
/// transient network failure is an `Err`, an empty account is `Ok(U256::ZERO)`.
/// The completion detector treats every `Err` as a missed tick.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    /// Returns the token balance of `address` on `chain`, in smallest units.
    async fn balance_of(&self, address: Address, chain: NamedChain) -> Result<U256>;

    /// Checks, without reading a balance, that `chain` can be read at all.
    ///
    /// Called before a bridge is submitted so a destination that can never
    /// be observed fails up front instead of timing out after the tokens
    /// were sent. Sources that cover every chain keep the default.
    fn check_chain(&self, _chain: NamedChain) -> Result<()> {
        Ok(())
    }
}

/// Submits burn-and-send operations on a source chain.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Wallet rejection
/// - Insufficient funds for the amount or the messaging fee
/// - Source transactions that revert after being accepted
#[async_trait]
pub trait TransactionSubmitter: Send + Sync {
    /// The chain transactions are submitted on.
    fn source_chain(&self) -> NamedChain;

    /// Burns `amount` on the source chain and sends it to `recipient` on
    /// `destination`.
    ///
    /// Returns the transaction hash as soon as the node accepts the
    /// transaction.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Submission`](crate::BridgeError::Submission)
    /// categorised as user-rejected, insufficient-funds or network.
    async fn submit_bridge(
        &self,
        destination: NamedChain,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash>;

    /// Waits until `tx_hash` is included and succeeded on the source chain.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction reverted or was not confirmed in
    /// time.
    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<()>;
}

/// Trait for time-based operations.
///
/// This trait abstracts sleep and time queries, enabling fast-forward testing
/// where tests can instantly advance through polling loops and timeouts without
/// actually waiting.
///
/// # Test Scenarios
///
/// Implementing this trait with fakes enables testing:
/// - Timeout behavior without waiting
/// - Polling interval correctness
/// - Time-dependent state transitions
#[async_trait]
pub trait Clock: Send + Sync {
    /// Asynchronously sleeps for the given duration.
    async fn sleep(&self, duration: Duration);

    /// Returns the current instant in time.
    ///
    /// Used for calculating timeouts and measuring elapsed time.
    fn now(&self) -> Instant;
}
