// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0
//! Rate limiting for balance reads shared between runs.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::trace;

use super::TokioClock;
use crate::error::{BridgeError, Result};
use crate::traits::{BalanceSource, Clock};

/// Serves repeated reads of the same `(chain, address)` from cache for
/// `min_interval`.
///
/// Useful when several detection runs watch the same recipient, or a UI polls
/// alongside a detector. Never sleeps: a read inside the interval returns the
/// cached balance immediately. Failed reads are not cached.
#[derive(Debug)]
pub struct ThrottledBalanceSource<S, C = TokioClock> {
    inner: S,
    clock: C,
    min_interval: Duration,
    cache: Mutex<HashMap<(NamedChain, Address), (U256, Instant)>>,
}

impl<S: BalanceSource> ThrottledBalanceSource<S, TokioClock> {
    pub fn new(inner: S, min_interval: Duration) -> Self {
        Self::with_clock(inner, min_interval, TokioClock::new())
    }
}

impl<S: BalanceSource, C: Clock> ThrottledBalanceSource<S, C> {
    pub fn with_clock(inner: S, min_interval: Duration, clock: C) -> Self {
        Self {
            inner,
            clock,
            min_interval,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn cached(&self, key: (NamedChain, Address)) -> Result<Option<U256>> {
        let cache = self
            .cache
            .lock()
            .map_err(|_| BridgeError::Provider("balance cache lock poisoned".to_string()))?;
        let now = self.clock.now();
        Ok(cache.get(&key).and_then(|(balance, at)| {
            (now.saturating_duration_since(*at) < self.min_interval).then_some(*balance)
        }))
    }
}

#[async_trait]
impl<S: BalanceSource, C: Clock> BalanceSource for ThrottledBalanceSource<S, C> {
    async fn balance_of(&self, address: Address, chain: NamedChain) -> Result<U256> {
        let key = (chain, address);
        if let Some(balance) = self.cached(key)? {
            trace!(chain = %chain, address = %address, event = "balance_served_from_cache");
            return Ok(balance);
        }

        let balance = self.inner.balance_of(address, chain).await?;
        self.cache
            .lock()
            .map_err(|_| BridgeError::Provider("balance cache lock poisoned".to_string()))?
            .insert(key, (balance, self.clock.now()));
        Ok(balance)
    }

    fn check_chain(&self, chain: NamedChain) -> Result<()> {
        self.inner.check_chain(chain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBalanceSource, FakeClock};

    const ALICE: Address = Address::repeat_byte(0xa1);
    const BOB: Address = Address::repeat_byte(0xb0);

    #[tokio::test]
    async fn test_reads_inside_interval_hit_cache() {
        let clock = FakeClock::new();
        let fake = FakeBalanceSource::new(clock.clone());
        fake.add_sequence(
            NamedChain::Sepolia,
            ALICE,
            vec![U256::from(1u64), U256::from(2u64)],
        );
        let throttled =
            ThrottledBalanceSource::with_clock(fake.clone(), Duration::from_secs(5), clock.clone());

        assert_eq!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.unwrap(), U256::from(1u64));
        clock.advance(Duration::from_secs(4));
        assert_eq!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.unwrap(), U256::from(1u64));
        assert_eq!(fake.read_count(), 1);

        clock.advance(Duration::from_secs(1));
        assert_eq!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.unwrap(), U256::from(2u64));
        assert_eq!(fake.read_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_is_keyed_by_chain_and_address() {
        let clock = FakeClock::new();
        let fake = FakeBalanceSource::new(clock.clone());
        fake.add_constant(NamedChain::Sepolia, ALICE, U256::from(10u64));
        fake.add_constant(NamedChain::Sepolia, BOB, U256::from(20u64));
        fake.add_constant(NamedChain::BaseSepolia, ALICE, U256::from(30u64));
        let throttled =
            ThrottledBalanceSource::with_clock(fake.clone(), Duration::from_secs(60), clock);

        assert_eq!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.unwrap(), U256::from(10u64));
        assert_eq!(throttled.balance_of(BOB, NamedChain::Sepolia).await.unwrap(), U256::from(20u64));
        assert_eq!(throttled.balance_of(ALICE, NamedChain::BaseSepolia).await.unwrap(), U256::from(30u64));
        assert_eq!(fake.read_count(), 3);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let clock = FakeClock::new();
        let fake = FakeBalanceSource::new(clock.clone());
        fake.add_script(
            NamedChain::Sepolia,
            ALICE,
            vec![Err("rpc down".to_string()), Ok(U256::from(7u64))],
        );
        let throttled =
            ThrottledBalanceSource::with_clock(fake.clone(), Duration::from_secs(60), clock);

        assert!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.is_err());
        assert_eq!(throttled.balance_of(ALICE, NamedChain::Sepolia).await.unwrap(), U256::from(7u64));
        assert_eq!(fake.read_count(), 2);
    }
}
