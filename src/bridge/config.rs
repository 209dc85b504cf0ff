// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
use alloy_chains::NamedChain;

use crate::chain::OftChain;
use crate::error::Result;

/// Configuration for source-transaction confirmation polling.
///
/// Controls how long a submitter waits for the burn-and-send transaction to be
/// included on the source chain before reporting
/// [`BridgeError::ConfirmationTimeout`](crate::BridgeError::ConfirmationTimeout).
///
/// # Examples
///
/// ```rust
/// use xbridge_rs::ConfirmationConfig;
///
/// // Use defaults (60 attempts, 2 second intervals)
/// let config = ConfirmationConfig::default();
///
/// // Customize polling behavior
/// let config = ConfirmationConfig::default()
///     .with_max_attempts(20)
///     .with_poll_interval_secs(5);
/// assert_eq!(config.total_timeout_secs(), 100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfirmationConfig {
    /// Maximum number of receipt lookups before giving up.
    pub max_attempts: u32,
    /// Seconds to wait between receipt lookups.
    pub poll_interval_secs: u64,
}

impl Default for ConfirmationConfig {
    /// - `max_attempts`: 60
    /// - `poll_interval_secs`: 2
    fn default() -> Self {
        Self {
            max_attempts: 60,
            poll_interval_secs: 2,
        }
    }
}

impl ConfirmationConfig {
    /// Derives a configuration from the chain's typical confirmation time.
    ///
    /// Polls at the chain's average block confirmation time (at least one
    /// second) and allows twenty times that before giving up, with a floor of
    /// two minutes.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xbridge_rs::ConfirmationConfig;
    /// use alloy_chains::NamedChain;
    ///
    /// let config = ConfirmationConfig::for_chain(NamedChain::Sepolia).unwrap();
    /// assert_eq!(config.poll_interval_secs, 15);
    /// ```
    pub fn for_chain(chain: NamedChain) -> Result<Self> {
        let interval = chain.confirmation_average_time_seconds()?.max(1);
        let max_attempts = (120 / interval).max(20) as u32;
        Ok(Self {
            max_attempts,
            poll_interval_secs: interval,
        })
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_poll_interval_secs(mut self, secs: u64) -> Self {
        self.poll_interval_secs = secs;
        self
    }

    /// Returns the total maximum wait time in seconds.
    pub fn total_timeout_secs(&self) -> u64 {
        self.max_attempts as u64 * self.poll_interval_secs
    }
}
