// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Test utilities and fake implementations
//!
//! This module provides fake implementations of the crate's traits so the
//! detector and the orchestrator can be exercised without a node or a wallet:
//! scripted balances with injected RPC failures, a submitter that can reject or
//! revert, reporters that record, fail or panic, and a clock that
//! fast-forwards instead of sleeping.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::detector::{CancelHandle, DetectionState};
use crate::error::SubmissionErrorKind;
use crate::reporter::{BridgeStatus, ReportError, StatusReporter, StatusUpdate};
use crate::traits::{BalanceSource, Clock, TransactionSubmitter};
use crate::{BridgeError, Result};

// ============================================================================
// Fake Balance Source
// ============================================================================

/// One scripted read result: a balance or a transient error message.
pub type ScriptedRead = std::result::Result<U256, String>;

/// A balance read observed by [`FakeBalanceSource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadRecord {
    pub chain: NamedChain,
    pub address: Address,
    pub at: Instant,
}

#[derive(Debug, Default)]
struct Script {
    steps: Vec<ScriptedRead>,
    index: usize,
}

impl Script {
    /// Returns the next step, repeating the last one once the script runs out.
    fn next(&mut self) -> ScriptedRead {
        let step = self
            .steps
            .get(self.index)
            .or_else(|| self.steps.last())
            .cloned()
            .unwrap_or(Ok(U256::ZERO));
        self.index += 1;
        step
    }
}

#[derive(Default)]
struct BalanceState {
    scripts: HashMap<(NamedChain, Address), Script>,
    reads: Vec<ReadRecord>,
    cancel_after: Option<(usize, CancelHandle)>,
    read_delay: Option<Duration>,
    unconfigured: HashSet<NamedChain>,
}

/// A balance source that replays scripted balances per (chain, address).
///
/// Unscripted addresses hold a zero balance. Every read is logged with the
/// time reported by the clock the fake was created with.
#[derive(Clone)]
pub struct FakeBalanceSource {
    clock: Arc<dyn Clock>,
    state: Arc<Mutex<BalanceState>>,
}

impl FakeBalanceSource {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Arc::new(clock),
            state: Arc::new(Mutex::new(BalanceState::default())),
        }
    }

    /// Configure a script of balances and errors, read in order.
    pub fn add_script(&self, chain: NamedChain, address: Address, steps: Vec<ScriptedRead>) {
        self.state
            .lock()
            .unwrap()
            .scripts
            .insert((chain, address), Script { steps, index: 0 });
    }

    /// Configure a sequence of balances; the last one repeats forever.
    pub fn add_sequence(&self, chain: NamedChain, address: Address, balances: Vec<U256>) {
        self.add_script(chain, address, balances.into_iter().map(Ok).collect());
    }

    /// Configure a balance that never changes.
    pub fn add_constant(&self, chain: NamedChain, address: Address, balance: U256) {
        self.add_sequence(chain, address, vec![balance]);
    }

    /// Configure every read for this address to fail.
    pub fn add_always_failing(&self, chain: NamedChain, address: Address) {
        self.add_script(
            chain,
            address,
            vec![Err("Simulated RPC error".to_string())],
        );
    }

    /// Cancel `handle` while serving the `reads`-th read overall.
    pub fn cancel_after_reads(&self, reads: usize, handle: CancelHandle) {
        self.state.lock().unwrap().cancel_after = Some((reads, handle));
    }

    /// Delay every read by `delay` of Tokio time.
    pub fn set_read_delay(&self, delay: Duration) {
        self.state.lock().unwrap().read_delay = Some(delay);
    }

    /// Treat `chain` as missing from the deployment configuration.
    pub fn mark_unconfigured(&self, chain: NamedChain) {
        self.state.lock().unwrap().unconfigured.insert(chain);
    }

    pub fn read_count(&self) -> usize {
        self.state.lock().unwrap().reads.len()
    }

    pub fn reads(&self) -> Vec<ReadRecord> {
        self.state.lock().unwrap().reads.clone()
    }

    /// Reads issued for a single address.
    pub fn reads_for(&self, address: Address) -> Vec<ReadRecord> {
        self.reads()
            .into_iter()
            .filter(|read| read.address == address)
            .collect()
    }
}

#[async_trait]
impl BalanceSource for FakeBalanceSource {
    async fn balance_of(&self, address: Address, chain: NamedChain) -> Result<U256> {
        let delay = self.state.lock().unwrap().read_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let step = {
            let mut state = self.state.lock().unwrap();
            state.reads.push(ReadRecord {
                chain,
                address,
                at: self.clock.now(),
            });
            let count = state.reads.len();
            if let Some((after, handle)) = &state.cancel_after {
                if count >= *after {
                    handle.cancel();
                }
            }
            state
                .scripts
                .get_mut(&(chain, address))
                .map(Script::next)
                .unwrap_or(Ok(U256::ZERO))
        };

        step.map_err(|reason| BridgeError::BalanceRead {
            chain: chain.to_string(),
            reason,
        })
    }

    fn check_chain(&self, chain: NamedChain) -> Result<()> {
        if self.state.lock().unwrap().unconfigured.contains(&chain) {
            return Err(BridgeError::InvalidConfig(format!(
                "no deployment configured for {chain}"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// Fake Submitter
// ============================================================================

/// A submitted bridge as seen by [`FakeSubmitter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Submission {
    pub destination: NamedChain,
    pub recipient: Address,
    pub amount: U256,
}

#[derive(Debug, Default)]
struct SubmitterState {
    submissions: Vec<Submission>,
    confirmations: Vec<TxHash>,
    submit_failure: Option<(SubmissionErrorKind, String)>,
    revert_reason: Option<String>,
}

/// A submitter that accepts every bridge unless told otherwise.
#[derive(Clone, Debug)]
pub struct FakeSubmitter {
    source_chain: NamedChain,
    tx_hash: TxHash,
    state: Arc<Mutex<SubmitterState>>,
}

impl FakeSubmitter {
    pub fn new(source_chain: NamedChain) -> Self {
        Self {
            source_chain,
            tx_hash: TxHash::repeat_byte(0xaa),
            state: Arc::new(Mutex::new(SubmitterState::default())),
        }
    }

    /// Hash returned for accepted submissions.
    pub fn with_tx_hash(mut self, tx_hash: TxHash) -> Self {
        self.tx_hash = tx_hash;
        self
    }

    /// Make every submission fail with the given category.
    pub fn fail_submissions(&self, kind: SubmissionErrorKind, reason: &str) {
        self.state.lock().unwrap().submit_failure = Some((kind, reason.to_string()));
    }

    /// Make accepted transactions revert while confirming.
    pub fn revert_on_confirmation(&self, reason: &str) {
        self.state.lock().unwrap().revert_reason = Some(reason.to_string());
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn confirmations(&self) -> Vec<TxHash> {
        self.state.lock().unwrap().confirmations.clone()
    }
}

#[async_trait]
impl TransactionSubmitter for FakeSubmitter {
    fn source_chain(&self) -> NamedChain {
        self.source_chain
    }

    async fn submit_bridge(
        &self,
        destination: NamedChain,
        recipient: Address,
        amount: U256,
    ) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        if let Some((kind, reason)) = &state.submit_failure {
            return Err(BridgeError::Submission {
                kind: *kind,
                reason: reason.clone(),
            });
        }
        state.submissions.push(Submission {
            destination,
            recipient,
            amount,
        });
        Ok(self.tx_hash)
    }

    async fn wait_for_confirmation(&self, tx_hash: TxHash) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.confirmations.push(tx_hash);
        match &state.revert_reason {
            Some(reason) => Err(BridgeError::TransactionFailed {
                reason: reason.clone(),
            }),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Fake Reporters
// ============================================================================

/// Records every update it receives.
#[derive(Clone, Debug, Default)]
pub struct RecordingReporter {
    updates: Arc<Mutex<Vec<StatusUpdate>>>,
}

impl RecordingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }

    pub fn statuses(&self) -> Vec<BridgeStatus> {
        self.updates().into_iter().map(|u| u.status).collect()
    }

    /// Only the completion-detector transitions, in order.
    pub fn detection_states(&self) -> Vec<DetectionState> {
        self.statuses()
            .into_iter()
            .filter_map(|status| match status {
                BridgeStatus::Detection(state) => Some(state),
                _ => None,
            })
            .collect()
    }
}

impl StatusReporter for RecordingReporter {
    fn report(&self, update: &StatusUpdate) -> std::result::Result<(), ReportError> {
        self.updates.lock().unwrap().push(update.clone());
        Ok(())
    }
}

/// Fails every report.
#[derive(Debug, Default)]
pub struct FailingReporter {
    attempts: AtomicUsize,
}

impl FailingReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl StatusReporter for FailingReporter {
    fn report(&self, _update: &StatusUpdate) -> std::result::Result<(), ReportError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err("sink unavailable".into())
    }
}

/// Panics on every report.
#[derive(Debug, Default, Clone, Copy)]
pub struct PanickingReporter;

impl StatusReporter for PanickingReporter {
    fn report(&self, update: &StatusUpdate) -> std::result::Result<(), ReportError> {
        panic!("reporter exploded on {}", update.status);
    }
}

// ============================================================================
// Fake Clock
// ============================================================================

/// A fake clock that allows fast-forwarding time in tests.
///
/// This enables testing timeout behavior without actually waiting.
#[derive(Clone, Debug)]
pub struct FakeClock {
    current_time: Arc<Mutex<Instant>>,
    sleep_log: Arc<Mutex<Vec<Duration>>>,
}

impl Default for FakeClock {
    fn default() -> Self {
        Self {
            current_time: Arc::new(Mutex::new(Instant::now())),
            sleep_log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fast-forward the clock by the given duration
    pub fn advance(&self, duration: Duration) {
        let mut time = self.current_time.lock().unwrap();
        *time += duration;
    }

    /// Get the total time "slept" by this clock
    pub fn total_sleep_time(&self) -> Duration {
        self.sleep_log.lock().unwrap().iter().sum()
    }

    /// Get the number of times sleep was called
    pub fn sleep_count(&self) -> usize {
        self.sleep_log.lock().unwrap().len()
    }

    /// Every requested sleep, in order
    pub fn sleep_log(&self) -> Vec<Duration> {
        self.sleep_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for FakeClock {
    async fn sleep(&self, duration: Duration) {
        self.sleep_log.lock().unwrap().push(duration);
        self.advance(duration);
    }

    fn now(&self) -> Instant {
        *self.current_time.lock().unwrap()
    }
}
