// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use std::fmt;
use std::time::{Duration, Instant};

/// Progress of a single completion-detection run.
///
/// States only move forward: `Pending` → `Waiting` → one of the terminal
/// states. `Pending` may also jump straight to a terminal state when the run
/// is cancelled or times out before a baseline could be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectionState {
    /// No balance has been read yet.
    Pending,
    /// Baseline captured, polling for the expected increase.
    Waiting,
    /// The recipient's balance increased by the expected amount.
    Matched,
    /// The timeout elapsed without a match. The transfer may still land later.
    TimedOut,
    /// The caller cancelled the run.
    Cancelled,
}

impl DetectionState {
    /// Returns true for `Matched`, `TimedOut` and `Cancelled`.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Matched | Self::TimedOut | Self::Cancelled)
    }

    /// Returns true if moving from `self` to `next` respects the forward-only
    /// ordering of states.
    pub const fn can_advance_to(self, next: Self) -> bool {
        match (self, next) {
            (Self::Pending, Self::Waiting) => true,
            (Self::Pending | Self::Waiting, next) => next.is_terminal(),
            _ => false,
        }
    }

    /// Static name used in logs and span attributes.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Waiting => "waiting",
            Self::Matched => "matched",
            Self::TimedOut => "timed_out",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DetectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single balance observation. Each poll produces a new snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceSnapshot {
    pub chain: NamedChain,
    pub address: Address,
    /// Balance in the token's smallest unit.
    pub balance: U256,
    pub observed_at: Instant,
}

/// Outcome of a completion-detection run, produced exactly once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionResult {
    pub final_state: DetectionState,
    /// Balance increase over the baseline. Only set when `Matched`.
    pub matched_delta: Option<U256>,
    /// Time from the start of the run until it settled.
    pub elapsed: Duration,
    /// The snapshot every later poll was compared against, if one was read.
    pub baseline: Option<BalanceSnapshot>,
    /// Number of balance reads issued, including the baseline read and
    /// failed reads.
    pub polls: u32,
}

impl DetectionResult {
    pub fn is_matched(&self) -> bool {
        self.final_state == DetectionState::Matched
    }

    pub fn is_timed_out(&self) -> bool {
        self.final_state == DetectionState::TimedOut
    }

    pub fn is_cancelled(&self) -> bool {
        self.final_state == DetectionState::Cancelled
    }
}

/// Enforces forward-only state transitions for one run.
#[derive(Debug)]
pub(crate) struct StateTracker {
    current: DetectionState,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            current: DetectionState::Pending,
        }
    }

    pub(crate) fn current(&self) -> DetectionState {
        self.current
    }

    /// Moves to `next`, returning false (and staying put) if the move would go
    /// backwards or leave a terminal state.
    pub(crate) fn advance(&mut self, next: DetectionState) -> bool {
        if self.current.can_advance_to(next) {
            self.current = next;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(DetectionState::Pending, DetectionState::Waiting, true)]
    #[case(DetectionState::Pending, DetectionState::Matched, true)]
    #[case(DetectionState::Pending, DetectionState::Cancelled, true)]
    #[case(DetectionState::Pending, DetectionState::TimedOut, true)]
    #[case(DetectionState::Waiting, DetectionState::Matched, true)]
    #[case(DetectionState::Waiting, DetectionState::Pending, false)]
    #[case(DetectionState::Waiting, DetectionState::Waiting, false)]
    #[case(DetectionState::Matched, DetectionState::Waiting, false)]
    #[case(DetectionState::Matched, DetectionState::Matched, false)]
    #[case(DetectionState::TimedOut, DetectionState::Cancelled, false)]
    #[case(DetectionState::Cancelled, DetectionState::Matched, false)]
    fn test_transition_ordering(
        #[case] from: DetectionState,
        #[case] to: DetectionState,
        #[case] allowed: bool,
    ) {
        assert_eq!(from.can_advance_to(to), allowed);
    }

    #[test]
    fn test_tracker_refuses_to_leave_terminal_state() {
        let mut tracker = StateTracker::new();
        assert!(tracker.advance(DetectionState::Waiting));
        assert!(tracker.advance(DetectionState::TimedOut));
        assert!(!tracker.advance(DetectionState::Matched));
        assert_eq!(tracker.current(), DetectionState::TimedOut);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(DetectionState::TimedOut.to_string(), "timed_out");
        assert_eq!(DetectionState::Waiting.to_string(), "waiting");
    }
}
