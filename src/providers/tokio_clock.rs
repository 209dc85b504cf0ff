// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Tokio-based clock implementation.

use async_trait::async_trait;
use std::time::{Duration, Instant};

use crate::traits::Clock;

/// Production clock implementation using Tokio's time functions.
///
/// `now()` reads Tokio's clock rather than the OS clock, so a runtime started
/// with paused time (`#[tokio::test(start_paused = true)]`) sees sleeps and
/// elapsed time advance together.
///
/// # Examples
///
/// ```rust
/// use xbridge_rs::providers::TokioClock;
///
/// let clock = TokioClock::new();
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokioClock;

impl TokioClock {
    /// Creates a new Tokio clock instance.
    pub fn new() -> Self {
        Self
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_paused_clock_advances_with_sleep() {
        let clock = TokioClock::new();
        let start = clock.now();

        clock.sleep(Duration::from_secs(90)).await;

        assert_eq!(clock.now().duration_since(start), Duration::from_secs(90));
    }
}
