// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! OpenTelemetry span helpers for bridge operations
//!
//! Static span names and structured attributes, kept separate from the code
//! they instrument.
//!
//! # Usage
//!
//! These span helpers are used internally by the detector, the orchestrator
//! and the alloy-backed providers, but are exposed publicly for users who wire
//! their own [`BalanceSource`](crate::BalanceSource) or
//! [`TransactionSubmitter`](crate::TransactionSubmitter) implementations.
//!
//! # Example
//!
//! ```rust,no_run
//! use xbridge_rs::spans;
//! use alloy_chains::NamedChain;
//! use alloy_primitives::{Address, U256};
//!
//! let span = spans::submit_bridge(
//!     &NamedChain::Sepolia,
//!     &NamedChain::ArbitrumSepolia,
//!     &Address::ZERO,
//!     &U256::from(1_000_000u64),
//! );
//! let _guard = span.enter();
//! // Your custom submission logic here
//! ```

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use tracing::Span;

use crate::detector::DetectionConfig;

/// Create span for one end-to-end bridge run.
///
/// Parent: Caller's span
/// Children: xbridge.submit_bridge, xbridge.wait_for_confirmation, xbridge.detect
#[inline]
pub fn run_bridge(
    source_chain: &NamedChain,
    destination_chain: &NamedChain,
    recipient: &Address,
    amount: &U256,
) -> Span {
    tracing::info_span!(
        "xbridge.run_bridge",
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        recipient = %recipient,
        amount = %amount,
        source_tx = tracing::field::Empty,
        final_state = tracing::field::Empty,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for a completion-detection run.
///
/// Parent: xbridge.run_bridge, or the caller's span
/// Children: xbridge.poll_balance (one per read)
#[inline]
pub fn detect(
    chain: &NamedChain,
    recipient: &Address,
    expected: &U256,
    config: &DetectionConfig,
) -> Span {
    tracing::info_span!(
        "xbridge.detect",
        chain = %chain,
        recipient = %recipient,
        expected = %expected,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        timeout_secs = config.timeout.as_secs(),
        tolerance = %config.tolerance,
        max_polls = config.max_polls(),
    )
}

/// Create span for a single balance read.
///
/// Parent: xbridge.detect
/// Children: Provider RPC calls
#[inline]
pub fn poll_balance(chain: &NamedChain, address: &Address, poll: u32) -> Span {
    tracing::debug_span!(
        "xbridge.poll_balance",
        chain = %chain,
        address = %address,
        poll = poll,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for submitting a burn-and-send transaction.
///
/// Parent: xbridge.run_bridge
/// Children: Fee quote and send RPC calls
#[inline]
pub fn submit_bridge(
    source_chain: &NamedChain,
    destination_chain: &NamedChain,
    recipient: &Address,
    amount: &U256,
) -> Span {
    tracing::info_span!(
        "xbridge.submit_bridge",
        source_chain = %source_chain,
        destination_chain = %destination_chain,
        recipient = %recipient,
        amount = %amount,
        error.type = tracing::field::Empty,
        error.message = tracing::field::Empty,
        error.context = tracing::field::Empty,
        otel.status_code = "OK",
    )
}

/// Create span for waiting for transaction confirmation.
///
/// Parent: xbridge.run_bridge
/// Children: Provider RPC calls (polling)
#[inline]
pub fn wait_for_confirmation(tx_hash: TxHash, chain: &NamedChain, max_attempts: u32) -> Span {
    tracing::debug_span!(
        "xbridge.wait_for_confirmation",
        tx_hash = %tx_hash,
        chain = %chain,
        max_attempts = max_attempts,
    )
}

/// Record error attributes with custom context on the current span.
///
/// # Example
///
/// ```rust,no_run
/// use xbridge_rs::spans;
///
/// # fn example() {
/// let span = tracing::info_span!("xbridge.operation");
/// let _guard = span.enter();
///
/// if let Err(e) = some_operation() {
///     spans::record_error_with_context(
///         "TransactionFailed",
///         &format!("Failed to submit transaction: {}", e),
///         Some("Transaction may have been dropped from mempool"),
///     );
/// }
/// # }
/// # fn some_operation() -> Result<(), String> { Ok(()) }
/// ```
pub fn record_error_with_context(
    error_type: &str,
    error_message: &str,
    additional_context: Option<&str>,
) {
    let current_span = tracing::Span::current();
    current_span.record("error.type", error_type);
    current_span.record("error.message", error_message);
    current_span.record("otel.status_code", "ERROR");

    if let Some(context) = additional_context {
        current_span.record("error.context", context);
    }
}
