// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! # xbridge-rs
//!
//! Bridge a cross-chain fungible token between EVM chains and find out when it
//! actually arrived.
//!
//! Submitting a bridge is one transaction on the source chain. Knowing that it
//! completed is harder: the messaging layer delivers on its own schedule and
//! the destination offers no callback. This crate watches the recipient's
//! balance on the destination chain and reports the transfer complete once it
//! grew by the bridged amount.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use xbridge_rs::providers::{ChainClients, Erc20BalanceSource, OftSubmitter, TokioClock};
//! use xbridge_rs::{
//!     cancellation, BridgeOrchestrator, BridgeParams, CompletionDetector, ConsoleReporter,
//!     DetectionConfig, NetworkConfig,
//! };
//! use alloy_chains::NamedChain;
//! use alloy_network::EthereumWallet;
//! use alloy_primitives::U256;
//! use alloy_provider::{Provider, ProviderBuilder};
//! use alloy_signer_local::PrivateKeySigner;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = NetworkConfig::load("deployments.json")?.with_env_overrides()?;
//! let source = config.entry(NamedChain::Sepolia)?.clone();
//!
//! let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
//! let sender = signer.address();
//! let provider = ProviderBuilder::new()
//!     .wallet(EthereumWallet::from(signer))
//!     .connect_http(source.rpc_url.clone())
//!     .erased();
//!
//! let submitter = OftSubmitter::builder()
//!     .provider(provider)
//!     .source_chain(NamedChain::Sepolia)
//!     .token(source.token)
//!     .from(sender)
//!     .clock(TokioClock::new())
//!     .build();
//!
//! let orchestrator = BridgeOrchestrator::new(
//!     submitter,
//!     Erc20BalanceSource::new(ChainClients::new(config)),
//!     CompletionDetector::new(DetectionConfig::default()),
//! )
//! .with_reporter(Arc::new(ConsoleReporter::stdout()));
//!
//! let params = BridgeParams::builder()
//!     .source_chain(NamedChain::Sepolia)
//!     .destination_chain(NamedChain::ArbitrumSepolia)
//!     .recipient(sender)
//!     .amount(U256::from(10u64).pow(U256::from(18u64)))
//!     .build();
//!
//! let (_handle, cancel) = cancellation();
//! let result = orchestrator.run(params, cancel).await?;
//! println!("finished as {}", result.final_state);
//! # Ok(())
//! # }
//! ```
//!
//! ## Detection only
//!
//! [`CompletionDetector`] works on any [`BalanceSource`], independent of how
//! the transfer was sent. Pass a [`CancelSignal`] to stop it early and a
//! [`StatusReporter`] to follow its progress.
//!
//! ## Public API
//!
//! - [`CompletionDetector`], [`DetectionConfig`], [`DetectionResult`] - destination-side detection
//! - [`BridgeOrchestrator`], [`BridgeParams`], [`BridgeRequest`] - the end-to-end flow
//! - [`BalanceSource`], [`TransactionSubmitter`], [`Clock`] - injection seams
//! - [`StatusReporter`] and the bundled reporters
//! - [`BridgeError`] and [`Result`]
//! - [`providers`] - alloy-backed implementations, [`testing`] - fakes

mod bridge;
mod chain;
mod config;
mod contracts;
mod detector;
mod error;
mod protocol;
mod reporter;
mod traits;

pub mod providers;
pub mod testing;

pub use bridge::{BridgeOrchestrator, BridgeParams, BridgeRequest, ConfirmationConfig};
pub use chain::{parse_network, OftChain};
pub use config::{NetworkConfig, NetworkEntry, RPC_URL_ENV_PREFIX};
pub use contracts::{erc20::Erc20Contract, oft::OftContract};
pub use detector::{
    cancellation, matched_delta, BalanceSnapshot, CancelHandle, CancelSignal, CompletionDetector,
    DetectionConfig, DetectionResult, DetectionState, DEFAULT_POLL_INTERVAL_SECS,
    DEFAULT_TIMEOUT_SECS, DEFAULT_TOLERANCE,
};
pub use error::{BridgeError, Result, SubmissionErrorKind};
pub use protocol::{
    address_to_bytes32, format_amount, parse_amount, rescale_amount, EndpointId, InvalidEndpointId,
};
pub use reporter::{
    deliver, BridgeStatus, ConsoleReporter, NoopReporter, ReportContext, ReportError,
    StatusReporter, StatusUpdate, TracingReporter, WatchReporter,
};
pub use traits::{BalanceSource, Clock, TransactionSubmitter};

// Public module for advanced users who need custom instrumentation
pub mod spans;
