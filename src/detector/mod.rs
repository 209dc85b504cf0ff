// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Destination-side completion detection
//!
//! After a burn-and-send is accepted on the source chain, the only signal this
//! crate has that the transfer landed is the recipient's balance on the
//! destination chain. [`CompletionDetector`] captures a baseline balance, then
//! polls until the balance has grown by the bridged amount (within an absolute
//! tolerance), the timeout elapses, or the caller cancels.

mod cancel;
mod config;
mod state;

pub use cancel::{cancellation, CancelHandle, CancelSignal};
pub use config::{
    DetectionConfig, DEFAULT_POLL_INTERVAL_SECS, DEFAULT_TIMEOUT_SECS, DEFAULT_TOLERANCE,
};
pub use state::{BalanceSnapshot, DetectionResult, DetectionState};

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use bon::Builder;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn, Instrument};

use crate::providers::TokioClock;
use crate::reporter::{deliver, BridgeStatus, ReportContext, StatusReporter, StatusUpdate};
use crate::spans;
use crate::traits::{BalanceSource, Clock};
use state::StateTracker;

/// Shortest sleep between two polls, used when a zero interval slips through.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Returns the balance increase if `current` grew over `baseline` by
/// `expected`, give or take `tolerance` smallest units.
///
/// A balance at or below the baseline never matches, and neither does an
/// increase outside the tolerance band, however large.
///
/// ```rust
/// use alloy_primitives::U256;
/// use xbridge_rs::matched_delta;
///
/// let delta = matched_delta(U256::from(1000), U256::from(1501), U256::from(500), U256::from(2));
/// assert_eq!(delta, Some(U256::from(501)));
///
/// // An unrelated deposit on top is not a match
/// let delta = matched_delta(U256::from(1000), U256::from(9000), U256::from(500), U256::from(2));
/// assert_eq!(delta, None);
/// ```
pub fn matched_delta(baseline: U256, current: U256, expected: U256, tolerance: U256) -> Option<U256> {
    if current <= baseline {
        return None;
    }
    let delta = current - baseline;
    let difference = if delta >= expected {
        delta - expected
    } else {
        expected - delta
    };
    (difference <= tolerance).then_some(delta)
}

/// Polls a [`BalanceSource`] until a bridged amount shows up.
///
/// A detector holds only configuration and a clock; every call to
/// [`detect`](Self::detect) owns its own baseline and timers, so one detector
/// can serve any number of concurrent runs.
///
/// # Example
///
/// ```rust,no_run
/// # use xbridge_rs::{CompletionDetector, DetectionConfig, NoopReporter, CancelSignal, BalanceSource};
/// # use alloy_chains::NamedChain;
/// # use alloy_primitives::{Address, U256};
/// # use std::time::Duration;
/// # async fn example(source: impl BalanceSource) {
/// let detector =
///     CompletionDetector::new(DetectionConfig::default().with_timeout(Duration::from_secs(300)));
///
/// let result = detector
///     .detect(
///         &source,
///         NamedChain::Arbitrum,
///         Address::ZERO,
///         U256::from(1_000_000u64),
///         CancelSignal::never(),
///         &NoopReporter,
///     )
///     .await;
/// println!("finished as {}", result.final_state);
/// # }
/// ```
#[derive(Builder, Debug, Clone)]
pub struct CompletionDetector<C: Clock = TokioClock> {
    #[builder(default)]
    config: DetectionConfig,
    clock: C,
}

impl CompletionDetector<TokioClock> {
    /// Creates a detector on the Tokio clock.
    pub fn new(config: DetectionConfig) -> Self {
        Self {
            config,
            clock: TokioClock::new(),
        }
    }
}

impl<C: Clock> CompletionDetector<C> {
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Waits for `recipient`'s balance on `chain` to grow by `expected`.
    ///
    /// Read failures never end the run: a failed baseline read is retried on
    /// the next tick, a failed poll counts as a missed tick. The run ends as
    /// `Matched`, `TimedOut` (timeout measured from the baseline read, or from
    /// the start of the run while no baseline could be read) or `Cancelled`.
    ///
    /// Polls are strictly sequential. A read still outstanding at the deadline
    /// is dropped and the run times out on schedule. Cancellation interrupts
    /// the sleep between polls immediately; a read already in flight is
    /// allowed to finish, and its result is discarded.
    pub async fn detect<S>(
        &self,
        source: &S,
        chain: NamedChain,
        recipient: Address,
        expected: U256,
        cancel: CancelSignal,
        reporter: &dyn StatusReporter,
    ) -> DetectionResult
    where
        S: BalanceSource + ?Sized,
    {
        let span = spans::detect(&chain, &recipient, &expected, &self.config);
        let run = Run {
            detector: self,
            source,
            chain,
            recipient,
            expected,
            cancel,
            reporter,
            tracker: StateTracker::new(),
            started: self.clock.now(),
            polls: 0,
        };
        run.execute().instrument(span).await
    }
}

/// Outcome of one balance read.
enum Tick {
    Read(BalanceSnapshot),
    Missed,
    /// The read was still outstanding at the deadline.
    Expired,
}

/// State owned by a single detection run.
struct Run<'a, C: Clock, S: BalanceSource + ?Sized> {
    detector: &'a CompletionDetector<C>,
    source: &'a S,
    chain: NamedChain,
    recipient: Address,
    expected: U256,
    cancel: CancelSignal,
    reporter: &'a dyn StatusReporter,
    tracker: StateTracker,
    started: Instant,
    polls: u32,
}

impl<C: Clock, S: BalanceSource + ?Sized> Run<'_, C, S> {
    async fn execute(mut self) -> DetectionResult {
        let config = self.detector.config;
        let poll_interval = config.poll_interval.max(MIN_POLL_INTERVAL);

        info!(
            poll_interval_ms = poll_interval.as_millis() as u64,
            timeout_secs = config.timeout.as_secs(),
            tolerance = %config.tolerance,
            max_polls = config.max_polls(),
            event = "detection_started"
        );
        self.emit(DetectionState::Pending, None);

        let baseline = loop {
            if self.cancel.is_cancelled() {
                return self.finish(DetectionState::Cancelled, None, None);
            }

            let budget = config.timeout.saturating_sub(self.since(self.started));
            match self.poll(budget).await {
                Tick::Read(snapshot) => break snapshot,
                Tick::Expired => return self.finish(DetectionState::TimedOut, None, None),
                Tick::Missed => {}
            }

            let elapsed = self.since(self.started);
            if elapsed >= config.timeout {
                return self.finish(DetectionState::TimedOut, None, None);
            }
            if !self.pause(poll_interval.min(config.timeout - elapsed)).await {
                return self.finish(DetectionState::Cancelled, None, None);
            }
        };

        if self.cancel.is_cancelled() {
            return self.finish(DetectionState::Cancelled, None, Some(baseline));
        }

        info!(
            baseline = %baseline.balance,
            event = "baseline_captured"
        );
        self.advance(DetectionState::Waiting, None);

        loop {
            let elapsed = self.since(baseline.observed_at);
            if elapsed >= config.timeout {
                warn!(
                    baseline = %baseline.balance,
                    polls = self.polls,
                    event = "detection_timed_out"
                );
                return self.finish(DetectionState::TimedOut, None, Some(baseline));
            }

            if !self.pause(poll_interval.min(config.timeout - elapsed)).await {
                return self.finish(DetectionState::Cancelled, None, Some(baseline));
            }

            let budget = config.timeout.saturating_sub(self.since(baseline.observed_at));
            let snapshot = match self.poll(budget).await {
                Tick::Read(snapshot) => snapshot,
                Tick::Missed => continue,
                Tick::Expired => {
                    warn!(
                        baseline = %baseline.balance,
                        polls = self.polls,
                        event = "detection_timed_out"
                    );
                    return self.finish(DetectionState::TimedOut, None, Some(baseline));
                }
            };
            if self.cancel.is_cancelled() {
                return self.finish(DetectionState::Cancelled, None, Some(baseline));
            }

            match matched_delta(
                baseline.balance,
                snapshot.balance,
                self.expected,
                config.tolerance,
            ) {
                Some(delta) => {
                    info!(
                        baseline = %baseline.balance,
                        balance = %snapshot.balance,
                        delta = %delta,
                        polls = self.polls,
                        event = "transfer_matched"
                    );
                    return self.finish(DetectionState::Matched, Some(delta), Some(baseline));
                }
                None => debug!(
                    baseline = %baseline.balance,
                    balance = %snapshot.balance,
                    event = "balance_unchanged"
                ),
            }
        }
    }

    /// Issues one balance read, abandoning it once `budget` has passed.
    async fn poll(&mut self, budget: Duration) -> Tick {
        self.polls += 1;
        let span = spans::poll_balance(&self.chain, &self.recipient, self.polls);

        let read = self
            .source
            .balance_of(self.recipient, self.chain)
            .instrument(span.clone());
        let result = tokio::select! {
            biased;
            result = read => result,
            _ = self.detector.clock.sleep(budget) => {
                let _guard = span.enter();
                warn!(
                    poll = self.polls,
                    budget_ms = budget.as_millis() as u64,
                    event = "balance_read_deadline_exceeded"
                );
                return Tick::Expired;
            }
        };

        match result {
            Ok(balance) => Tick::Read(BalanceSnapshot {
                chain: self.chain,
                address: self.recipient,
                balance,
                observed_at: self.detector.clock.now(),
            }),
            Err(e) => {
                let _guard = span.enter();
                spans::record_error_with_context(
                    "BalanceReadFailed",
                    &e.to_string(),
                    Some("Treated as a missed tick"),
                );
                warn!(
                    error = %e,
                    transient = e.is_transient(),
                    poll = self.polls,
                    event = "balance_read_failed"
                );
                Tick::Missed
            }
        }
    }

    /// Sleeps for `wait` unless cancelled first. Returns false on cancellation.
    async fn pause(&mut self, wait: Duration) -> bool {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => false,
            _ = self.detector.clock.sleep(wait) => true,
        }
    }

    fn since(&self, earlier: Instant) -> Duration {
        self.detector.clock.now().saturating_duration_since(earlier)
    }

    fn advance(&mut self, next: DetectionState, delta: Option<U256>) {
        if self.tracker.advance(next) {
            self.emit(next, delta);
        }
    }

    fn emit(&self, state: DetectionState, delta: Option<U256>) {
        let update = StatusUpdate {
            status: BridgeStatus::Detection(state),
            context: ReportContext {
                chain: self.chain,
                recipient: self.recipient,
                source_tx: None,
                elapsed: self.since(self.started),
                matched_delta: delta,
            },
        };
        deliver(self.reporter, &update);
    }

    fn finish(
        mut self,
        state: DetectionState,
        delta: Option<U256>,
        baseline: Option<BalanceSnapshot>,
    ) -> DetectionResult {
        self.advance(state, delta);
        let result = DetectionResult {
            final_state: self.tracker.current(),
            matched_delta: delta,
            elapsed: self.since(self.started),
            baseline,
            polls: self.polls,
        };

        info!(
            final_state = %result.final_state,
            elapsed_ms = result.elapsed.as_millis() as u64,
            polls = result.polls,
            event = "detection_finished"
        );
        result
    }
}
