// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_primitives::U256;
use std::time::Duration;

use crate::error::{BridgeError, Result};

/// Default seconds between balance polls.
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;

/// Default seconds to wait for the destination mint.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10 * 60;

/// Default match tolerance, in smallest token units.
pub const DEFAULT_TOLERANCE: u64 = 2;

/// Configuration for completion detection.
///
/// The tolerance is an absolute number of smallest token units and absorbs the
/// rounding introduced when a decimal amount is converted on either side of
/// the bridge. It is not a percentage.
///
/// # Examples
///
/// ```rust
/// use xbridge_rs::DetectionConfig;
/// use alloy_primitives::U256;
/// use std::time::Duration;
///
/// // Defaults: 5 second polls, 10 minute timeout, tolerance of 2 units
/// let config = DetectionConfig::default();
///
/// let config = DetectionConfig::default()
///     .with_poll_interval(Duration::from_secs(2))
///     .with_timeout(Duration::from_secs(120))
///     .with_tolerance(U256::ZERO);
/// assert_eq!(config.timeout, Duration::from_secs(120));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionConfig {
    /// Time between two balance reads.
    pub poll_interval: Duration,
    /// Maximum time to wait after the baseline was captured.
    pub timeout: Duration,
    /// Largest accepted difference between the observed and expected increase.
    pub tolerance: U256,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            tolerance: U256::from(DEFAULT_TOLERANCE),
        }
    }
}

impl DetectionConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_tolerance(mut self, tolerance: U256) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Upper bound on the number of reads a run that never matches will issue,
    /// baseline included.
    pub fn max_polls(&self) -> u64 {
        if self.poll_interval.is_zero() {
            return u64::MAX;
        }
        let ticks = self.timeout.as_nanos().div_ceil(self.poll_interval.as_nanos());
        u64::try_from(ticks).unwrap_or(u64::MAX).saturating_add(1)
    }

    /// Checks that the configuration describes a run that can make progress.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(BridgeError::InvalidConfig(
                "poll interval must be greater than zero".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(BridgeError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
