// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Alloy-backed bridge submission through the token's cross-chain `send`.

use alloy_chains::NamedChain;
use alloy_json_rpc::RpcError;
use alloy_network::ReceiptResponse;
use alloy_primitives::{Address, Bytes, TxHash, U256};
use alloy_provider::{DynProvider, Provider};
use alloy_transport::TransportErrorKind;
use async_trait::async_trait;
use bon::Builder;
use std::time::Duration;
use tracing::{debug, error, info, warn, Instrument};

use super::TokioClock;
use crate::bridge::ConfirmationConfig;
use crate::chain::OftChain;
use crate::contracts::erc20::Erc20Contract;
use crate::contracts::oft::OftContract;
use crate::error::{BridgeError, Result, SubmissionErrorKind};
use crate::spans;
use crate::traits::{Clock, TransactionSubmitter};

/// JSON-RPC error code wallets use for a refused signature request.
const USER_REJECTED_CODE: i64 = 4001;

/// Submits bridges by calling `send` on the token contract of the source
/// chain.
///
/// `provider` must be able to sign for `from`, typically a provider built with
/// a wallet filler.
///
/// # Examples
///
/// ```rust,no_run
/// use xbridge_rs::providers::{OftSubmitter, TokioClock};
/// use xbridge_rs::TransactionSubmitter;
/// use alloy_chains::NamedChain;
/// use alloy_network::EthereumWallet;
/// use alloy_primitives::{address, U256};
/// use alloy_provider::{Provider, ProviderBuilder};
/// use alloy_signer_local::PrivateKeySigner;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let signer: PrivateKeySigner = std::env::var("PRIVATE_KEY")?.parse()?;
/// let from = signer.address();
/// let provider = ProviderBuilder::new()
///     .wallet(EthereumWallet::from(signer))
///     .connect_http("https://ethereum-sepolia-rpc.publicnode.com".parse()?)
///     .erased();
///
/// let submitter = OftSubmitter::builder()
///     .provider(provider)
///     .source_chain(NamedChain::Sepolia)
///     .token(address!("1111111111111111111111111111111111111111"))
///     .from(from)
///     .clock(TokioClock::new())
///     .build();
///
/// let tx = submitter
///     .submit_bridge(NamedChain::ArbitrumSepolia, from, U256::from(1_000u64))
///     .await?;
/// submitter.wait_for_confirmation(tx).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Builder, Debug, Clone)]
pub struct OftSubmitter<C: Clock = TokioClock> {
    provider: DynProvider,
    source_chain: NamedChain,
    /// Token contract on the source chain.
    token: Address,
    /// Sender, also refunded any unused messaging fee.
    from: Address,
    #[builder(default)]
    confirmation: ConfirmationConfig,
    /// Executor options passed with every send. Empty relies on the options
    /// enforced by the token's owner.
    #[builder(default)]
    extra_options: Bytes,
    clock: C,
}

impl<C: Clock> OftSubmitter<C> {
    pub fn from_address(&self) -> Address {
        self.from
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn confirmation(&self) -> &ConfirmationConfig {
        &self.confirmation
    }

    async fn ensure_token_balance(&self, amount: U256) -> Result<()> {
        let erc20 = Erc20Contract::new(self.token, self.provider.clone());
        let balance = erc20
            .balance_of(self.from)
            .await
            .map_err(|e| submission_error(&e.to_string()))?;
        if balance < amount {
            return Err(BridgeError::Submission {
                kind: SubmissionErrorKind::InsufficientFunds,
                reason: format!("{} holds {balance}, bridge needs {amount}", self.from),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<C: Clock> TransactionSubmitter for OftSubmitter<C> {
    fn source_chain(&self) -> NamedChain {
        self.source_chain
    }

    async fn submit_bridge(
        &self,
        destination: NamedChain,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash> {
        let span = spans::submit_bridge(&self.source_chain, &destination, &recipient, &amount);

        async move {
            let destination_eid = destination.endpoint_id()?;
            self.ensure_token_balance(amount).await?;

            let oft = OftContract::new(self.token, self.provider.clone());
            let param = OftContract::<DynProvider>::send_param(
                destination_eid,
                recipient,
                amount,
                amount,
                self.extra_options.clone(),
            );
            let fee = oft
                .quote_send(&param)
                .await
                .map_err(|e| submission_error(&e.to_string()))?;

            let tx = oft.send_transaction(self.from, param, fee, self.from);
            let pending = match self.provider.send_transaction(tx).await {
                Ok(pending) => pending,
                Err(e) => {
                    let err = classify_rpc_error(&e);
                    spans::record_error_with_context(
                        "SubmissionFailed",
                        &err.to_string(),
                        Some("The node did not accept the send transaction"),
                    );
                    error!(error = %e, event = "send_transaction_rejected");
                    return Err(err);
                }
            };

            let tx_hash = *pending.tx_hash();
            info!(
                tx_hash = %tx_hash,
                destination_eid = %destination_eid,
                event = "send_transaction_accepted"
            );
            Ok(tx_hash)
        }
        .instrument(span)
        .await
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<()> {
        let span = spans::wait_for_confirmation(
            tx_hash,
            &self.source_chain,
            self.confirmation.max_attempts,
        );

        async move {
            let interval = Duration::from_secs(self.confirmation.poll_interval_secs);
            for attempt in 1..=self.confirmation.max_attempts {
                match self.provider.get_transaction_receipt(tx_hash).await {
                    Ok(Some(receipt)) => {
                        if receipt.status() {
                            info!(
                                tx_hash = %tx_hash,
                                block_number = ?receipt.block_number(),
                                attempt = attempt,
                                event = "transaction_confirmed"
                            );
                            return Ok(());
                        }
                        let reason = format!("{tx_hash} reverted on {}", self.source_chain);
                        spans::record_error_with_context("TransactionReverted", &reason, None);
                        error!(tx_hash = %tx_hash, event = "transaction_reverted");
                        return Err(BridgeError::TransactionFailed { reason });
                    }
                    Ok(None) => debug!(
                        tx_hash = %tx_hash,
                        attempt = attempt,
                        event = "receipt_pending"
                    ),
                    Err(e) => warn!(
                        tx_hash = %tx_hash,
                        attempt = attempt,
                        error = %e,
                        event = "receipt_lookup_failed"
                    ),
                }

                if attempt < self.confirmation.max_attempts {
                    self.clock.sleep(interval).await;
                }
            }

            spans::record_error_with_context(
                "ConfirmationTimeout",
                &format!("{tx_hash} not confirmed"),
                Some("The transaction may still be mined later"),
            );
            Err(BridgeError::ConfirmationTimeout)
        }
        .instrument(span)
        .await
    }
}

/// Maps a node or wallet error to a categorised submission error.
fn classify_rpc_error(err: &RpcError<TransportErrorKind>) -> BridgeError {
    if let Some(payload) = err.as_error_resp() {
        if payload.code == USER_REJECTED_CODE {
            return BridgeError::Submission {
                kind: SubmissionErrorKind::UserRejected,
                reason: payload.message.to_string(),
            };
        }
    }
    submission_error(&err.to_string())
}

fn submission_error(message: &str) -> BridgeError {
    BridgeError::Submission {
        kind: classify_message(message),
        reason: message.to_string(),
    }
}

/// Categorises an error by the wording nodes and wallets commonly use.
pub(crate) fn classify_message(message: &str) -> SubmissionErrorKind {
    let lower = message.to_ascii_lowercase();
    if ["user rejected", "user denied", "rejected the request"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        SubmissionErrorKind::UserRejected
    } else if [
        "insufficient funds",
        "insufficient balance",
        "exceeds balance",
        "erc20insufficientbalance",
    ]
    .iter()
    .any(|needle| lower.contains(needle))
    {
        SubmissionErrorKind::InsufficientFunds
    } else {
        SubmissionErrorKind::Network
    }
}
