// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Status reporting for bridge runs.
//!
//! Reporters are sinks: they receive every state transition of a bridge run and
//! render it somewhere (a terminal, a log, a UI state slot). They never feed
//! anything back into the run. All deliveries go through [`deliver`], which
//! swallows reporter errors and panics so a broken sink cannot change how a
//! detection run behaves.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::detector::DetectionState;

/// Error type returned by reporters. Only ever logged.
pub type ReportError = Box<dyn std::error::Error + Send + Sync>;

/// Phase of a bridge run as seen by a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeStatus {
    /// The burn-and-send transaction was accepted; waiting for it to confirm.
    SourceConfirming,
    /// The source transaction confirmed; waiting for the mint.
    WaitingDestination,
    /// A completion-detector transition.
    Detection(DetectionState),
}

impl fmt::Display for BridgeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SourceConfirming => f.write_str("source_confirming"),
            Self::WaitingDestination => f.write_str("waiting_destination"),
            Self::Detection(state) => write!(f, "detection.{state}"),
        }
    }
}

/// Where a status update applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportContext {
    /// The chain the status refers to: the source chain while confirming,
    /// the destination chain afterwards.
    pub chain: NamedChain,
    pub recipient: Address,
    pub source_tx: Option<TxHash>,
    /// Time since the reporting component started its phase.
    pub elapsed: Duration,
    /// Balance increase, set on `Matched` updates.
    pub matched_delta: Option<U256>,
}

/// A single status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate {
    pub status: BridgeStatus,
    pub context: ReportContext,
}

impl fmt::Display for StatusUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ctx = &self.context;
        let secs = ctx.elapsed.as_secs_f64();
        match self.status {
            BridgeStatus::SourceConfirming => match ctx.source_tx {
                Some(tx) => write!(f, "Waiting for {tx} to confirm on {}", ctx.chain),
                None => write!(f, "Waiting for the source transaction on {}", ctx.chain),
            },
            BridgeStatus::WaitingDestination => write!(
                f,
                "Source confirmed, waiting for tokens to reach {} on {}",
                ctx.recipient, ctx.chain
            ),
            BridgeStatus::Detection(DetectionState::Pending) => write!(
                f,
                "Reading baseline balance of {} on {}",
                ctx.recipient, ctx.chain
            ),
            BridgeStatus::Detection(DetectionState::Waiting) => {
                write!(f, "Baseline captured, polling {} for the transfer", ctx.chain)
            }
            BridgeStatus::Detection(DetectionState::Matched) => write!(
                f,
                "Tokens arrived on {}: +{} units after {secs:.1}s",
                ctx.chain,
                ctx.matched_delta.unwrap_or_default()
            ),
            BridgeStatus::Detection(DetectionState::TimedOut) => write!(
                f,
                "No matching balance change on {} after {secs:.1}s. The transfer may still \
                 complete, check the balance again later",
                ctx.chain
            ),
            BridgeStatus::Detection(DetectionState::Cancelled) => {
                write!(f, "Stopped waiting for the transfer on {}", ctx.chain)
            }
        }
    }
}

/// Sink for bridge status transitions.
pub trait StatusReporter: Send + Sync {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError>;
}

impl<R: StatusReporter + ?Sized> StatusReporter for Arc<R> {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError> {
        (**self).report(update)
    }
}

impl<R: StatusReporter + ?Sized> StatusReporter for &R {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError> {
        (**self).report(update)
    }
}

/// Hands `update` to `reporter`, ignoring whatever goes wrong inside it.
pub fn deliver(reporter: &dyn StatusReporter, update: &StatusUpdate) {
    match panic::catch_unwind(AssertUnwindSafe(|| reporter.report(update))) {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(
            error = %e,
            status = %update.status,
            event = "status_report_failed"
        ),
        Err(_) => warn!(status = %update.status, event = "status_reporter_panicked"),
    }
}

/// Discards every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopReporter;

impl StatusReporter for NoopReporter {
    fn report(&self, _update: &StatusUpdate) -> Result<(), ReportError> {
        Ok(())
    }
}

/// Emits every update as a structured `tracing` event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl StatusReporter for TracingReporter {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError> {
        info!(
            status = %update.status,
            chain = %update.context.chain,
            recipient = %update.context.recipient,
            source_tx = ?update.context.source_tx,
            elapsed_ms = update.context.elapsed.as_millis() as u64,
            matched_delta = ?update.context.matched_delta,
            event = "bridge_status"
        );
        Ok(())
    }
}

/// Writes one human-readable line per update, used by the CLI.
#[derive(Debug)]
pub struct ConsoleReporter<W> {
    out: Mutex<W>,
}

impl<W: Write + Send> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl ConsoleReporter<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StatusReporter for ConsoleReporter<W> {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError> {
        let mut out = self
            .out
            .lock()
            .map_err(|_| "console reporter lock poisoned")?;
        writeln!(out, "{update}")?;
        out.flush()?;
        Ok(())
    }
}

/// Publishes the latest update into a `watch` slot for a UI to render.
#[derive(Debug)]
pub struct WatchReporter {
    tx: watch::Sender<Option<StatusUpdate>>,
}

impl WatchReporter {
    /// Creates the reporter together with the receiver a UI should observe.
    pub fn new() -> (Self, watch::Receiver<Option<StatusUpdate>>) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, rx)
    }

    /// Returns another receiver for the same slot.
    pub fn subscribe(&self) -> watch::Receiver<Option<StatusUpdate>> {
        self.tx.subscribe()
    }
}

impl StatusReporter for WatchReporter {
    fn report(&self, update: &StatusUpdate) -> Result<(), ReportError> {
        self.tx.send_replace(Some(update.clone()));
        Ok(())
    }
}
