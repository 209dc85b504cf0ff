// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::TxHash;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn, Instrument, Span};

use super::params::{BridgeParams, BridgeRequest};
use crate::detector::{CancelSignal, CompletionDetector, DetectionResult, DetectionState};
use crate::error::{BridgeError, Result};
use crate::providers::TokioClock;
use crate::reporter::{
    deliver, BridgeStatus, NoopReporter, ReportContext, ReportError, StatusReporter, StatusUpdate,
};
use crate::spans;
use crate::traits::{BalanceSource, Clock, TransactionSubmitter};

/// Drives one bridge from submission to destination-side completion.
///
/// Submission and source confirmation go through the [`TransactionSubmitter`],
/// the destination side through a [`CompletionDetector`] reading a
/// [`BalanceSource`]. Every transition is handed to the reporter.
///
/// # Example
///
/// ```rust,no_run
/// use xbridge_rs::{
///     cancellation, BridgeOrchestrator, BridgeParams, CompletionDetector, DetectionConfig,
///     TracingReporter,
/// };
/// use xbridge_rs::testing::{FakeBalanceSource, FakeSubmitter};
/// use xbridge_rs::providers::TokioClock;
/// use alloy_chains::NamedChain;
/// use alloy_primitives::{Address, U256};
/// use std::sync::Arc;
///
/// # async fn example() -> xbridge_rs::Result<()> {
/// let orchestrator = BridgeOrchestrator::new(
///     FakeSubmitter::new(NamedChain::Sepolia),
///     FakeBalanceSource::new(TokioClock::new()),
///     CompletionDetector::new(DetectionConfig::default()),
/// )
/// .with_reporter(Arc::new(TracingReporter));
///
/// let params = BridgeParams::builder()
///     .source_chain(NamedChain::Sepolia)
///     .destination_chain(NamedChain::ArbitrumSepolia)
///     .recipient(Address::repeat_byte(1))
///     .amount(U256::from(1_000_000u64))
///     .build();
///
/// let (_handle, cancel) = cancellation();
/// let result = orchestrator.run(params, cancel).await?;
/// println!("bridge finished as {}", result.final_state);
/// # Ok(())
/// # }
/// ```
pub struct BridgeOrchestrator<T, B, C: Clock = TokioClock> {
    submitter: T,
    balances: B,
    detector: CompletionDetector<C>,
    reporter: Arc<dyn StatusReporter>,
}

impl<T, B, C> BridgeOrchestrator<T, B, C>
where
    T: TransactionSubmitter,
    B: BalanceSource,
    C: Clock,
{
    /// Creates an orchestrator that reports nowhere.
    pub fn new(submitter: T, balances: B, detector: CompletionDetector<C>) -> Self {
        Self {
            submitter,
            balances,
            detector,
            reporter: Arc::new(NoopReporter),
        }
    }

    pub fn with_reporter(mut self, reporter: Arc<dyn StatusReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn submitter(&self) -> &T {
        &self.submitter
    }

    pub fn balances(&self) -> &B {
        &self.balances
    }

    pub fn detector(&self) -> &CompletionDetector<C> {
        &self.detector
    }

    /// Submits the bridge, waits for the source transaction, then waits for
    /// the tokens to arrive.
    ///
    /// Cancelling while the source transaction is confirming ends the run as
    /// `Cancelled` without reading any destination balance. The submission
    /// itself is never interrupted.
    ///
    /// # Errors
    ///
    /// Validation, submission and confirmation failures are returned as-is.
    /// Once detection starts the run always produces a [`DetectionResult`].
    pub async fn run(&self, params: BridgeParams, mut cancel: CancelSignal) -> Result<DetectionResult> {
        let span = spans::run_bridge(
            &params.source_chain(),
            &params.destination_chain(),
            &params.recipient(),
            &params.amount(),
        );

        async move {
            let started = self.detector.clock().now();
            let request = self.submit(&params).await?;

            let confirmed = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                confirmed = self.confirm(&request) => Some(confirmed),
            };
            match confirmed {
                Some(confirmed) => confirmed?,
                None => {
                    info!(source_tx = %request.source_tx(), event = "bridge_cancelled_while_confirming");
                    Span::current().record("final_state", DetectionState::Cancelled.as_str());
                    return Ok(self.cancelled_before_detection(&request, started));
                }
            }

            let result = self.detect(&request, cancel).await;
            Span::current().record("final_state", result.final_state.as_str());
            info!(
                source_tx = %request.source_tx(),
                final_state = %result.final_state,
                polls = result.polls,
                event = "bridge_run_completed"
            );
            Ok(result)
        }
        .instrument(span)
        .await
    }

    /// Submits the bridge and waits for the source transaction, without
    /// waiting for the destination.
    pub async fn submit_and_confirm(&self, params: &BridgeParams) -> Result<BridgeRequest> {
        let request = self.submit(params).await?;
        self.confirm(&request).await?;
        Ok(request)
    }

    /// Validates and submits the bridge.
    ///
    /// Returns once the source chain accepted the transaction. Nothing is sent
    /// if the balance source cannot read the destination chain.
    pub async fn submit(&self, params: &BridgeParams) -> Result<BridgeRequest> {
        params.validate()?;
        self.detector.config().validate()?;
        let submitter_chain = self.submitter.source_chain();
        if params.source_chain() != submitter_chain {
            return Err(BridgeError::InvalidInput(format!(
                "submitter sends from {submitter_chain}, bridge starts on {}",
                params.source_chain()
            )));
        }
        self.balances.check_chain(params.destination_chain())?;

        let started = self.detector.clock().now();
        let source_tx = match self
            .submitter
            .submit_bridge(params.destination_chain(), params.recipient(), params.amount())
            .await
        {
            Ok(tx) => tx,
            Err(e) => {
                spans::record_error_with_context(
                    "SubmissionFailed",
                    &e.to_string(),
                    Some("Nothing was sent, no balance will change"),
                );
                error!(error = %e, event = "bridge_submission_failed");
                return Err(e);
            }
        };

        Span::current().record("source_tx", tracing::field::display(source_tx));
        info!(
            source_tx = %source_tx,
            source_chain = %params.source_chain(),
            destination_chain = %params.destination_chain(),
            event = "bridge_submitted"
        );

        let request = BridgeRequest::from_accepted(params.clone(), source_tx);
        self.report(
            BridgeStatus::SourceConfirming,
            &request,
            request.source_chain(),
            started,
        );
        Ok(request)
    }

    /// Waits until the request's source transaction is included and succeeded.
    pub async fn confirm(&self, request: &BridgeRequest) -> Result<()> {
        match self.submitter.wait_for_confirmation(request.source_tx()).await {
            Ok(()) => {
                info!(source_tx = %request.source_tx(), event = "source_transaction_confirmed");
                Ok(())
            }
            Err(e) => {
                spans::record_error_with_context(
                    "ConfirmationFailed",
                    &e.to_string(),
                    Some("Source transaction did not confirm, nothing will arrive"),
                );
                error!(
                    source_tx = %request.source_tx(),
                    error = %e,
                    event = "source_confirmation_failed"
                );
                Err(e)
            }
        }
    }

    /// Waits for the request's tokens to reach the recipient on the
    /// destination chain, matching in destination units.
    pub async fn detect(&self, request: &BridgeRequest, cancel: CancelSignal) -> DetectionResult {
        let started = self.detector.clock().now();
        self.report(
            BridgeStatus::WaitingDestination,
            request,
            request.destination_chain(),
            started,
        );

        let reporter = SourceTagged {
            inner: self.reporter.as_ref(),
            source_tx: request.source_tx(),
        };
        self.detector
            .detect(
                &self.balances,
                request.destination_chain(),
                request.recipient(),
                request.expected_amount(),
                cancel,
                &reporter,
            )
            .await
    }

    fn report(
        &self,
        status: BridgeStatus,
        request: &BridgeRequest,
        chain: alloy_chains::NamedChain,
        started: Instant,
    ) {
        let update = StatusUpdate {
            status,
            context: ReportContext {
                chain,
                recipient: request.recipient(),
                source_tx: Some(request.source_tx()),
                elapsed: self.detector.clock().now().saturating_duration_since(started),
                matched_delta: None,
            },
        };
        deliver(self.reporter.as_ref(), &update);
    }

    fn cancelled_before_detection(&self, request: &BridgeRequest, started: Instant) -> DetectionResult {
        let elapsed = self.detector.clock().now().saturating_duration_since(started);
        warn!(
            source_tx = %request.source_tx(),
            event = "detection_skipped"
        );
        let update = StatusUpdate {
            status: BridgeStatus::Detection(DetectionState::Cancelled),
            context: ReportContext {
                chain: request.destination_chain(),
                recipient: request.recipient(),
                source_tx: Some(request.source_tx()),
                elapsed,
                matched_delta: None,
            },
        };
        deliver(self.reporter.as_ref(), &update);
        DetectionResult {
            final_state: DetectionState::Cancelled,
            matched_delta: None,
            elapsed,
            baseline: None,
            polls: 0,
        }
    }
}

/// Stamps the source transaction onto detector updates.
struct SourceTagged<'a> {
    inner: &'a dyn StatusReporter,
    source_tx: TxHash,
}

impl StatusReporter for SourceTagged<'_> {
    fn report(&self, update: &StatusUpdate) -> std::result::Result<(), ReportError> {
        let mut update = update.clone();
        update.context.source_tx = Some(self.source_tx);
        self.inner.report(&update)
    }
}
