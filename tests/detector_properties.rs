//! Completion-detector behavior on the Tokio clock with paused time
//!
//! These tests run real sleeps and real cancellation against a paused Tokio
//! runtime, so deadlines are checked against real timers without the tests
//! taking any wall-clock time.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, U256};
use std::time::Duration;
use xbridge_rs::providers::TokioClock;
use xbridge_rs::testing::{FakeBalanceSource, RecordingReporter};
use xbridge_rs::{
    cancellation, CancelSignal, CompletionDetector, DetectionConfig, DetectionState, NoopReporter,
};

const CHAIN: NamedChain = NamedChain::BaseSepolia;
const ALICE: Address = Address::repeat_byte(0xa1);
const BOB: Address = Address::repeat_byte(0xb0);

fn detector(poll_secs: u64, timeout_secs: u64) -> CompletionDetector {
    CompletionDetector::new(
        DetectionConfig::default()
            .with_poll_interval(Duration::from_secs(poll_secs))
            .with_timeout(Duration::from_secs(timeout_secs)),
    )
}

#[tokio::test(start_paused = true)]
async fn test_times_out_within_one_interval_of_deadline() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_constant(CHAIN, ALICE, U256::from(100u64));
    let start = tokio::time::Instant::now();

    let result = detector(1, 3)
        .detect(
            &balances,
            CHAIN,
            ALICE,
            U256::from(50u64),
            CancelSignal::never(),
            &NoopReporter,
        )
        .await;

    let waited = start.elapsed();
    assert!(result.is_timed_out());
    assert!(waited >= Duration::from_secs(3), "waited {waited:?}");
    assert!(waited < Duration::from_secs(4), "waited {waited:?}");
    assert!(result.elapsed >= Duration::from_secs(3));
    assert!(result.elapsed < Duration::from_secs(4));
    assert_eq!(result.polls, 4);
}

#[tokio::test(start_paused = true)]
async fn test_cancel_mid_run_stops_reads() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_constant(CHAIN, ALICE, U256::from(100u64));
    let (handle, signal) = cancellation();

    let task = {
        let balances = balances.clone();
        tokio::spawn(async move {
            detector(1, 60)
                .detect(&balances, CHAIN, ALICE, U256::from(50u64), signal, &NoopReporter)
                .await
        })
    };

    tokio::time::sleep(Duration::from_millis(2_500)).await;
    handle.cancel();
    let cancelled_at = std::time::Instant::from(tokio::time::Instant::now());
    let result = task.await.unwrap();

    assert!(result.is_cancelled());
    assert_eq!(result.polls, 3);
    assert!(balances.reads().iter().all(|read| read.at < cancelled_at));

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(balances.read_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_sequential_runs_each_match_once() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_sequence(
        CHAIN,
        ALICE,
        vec![
            U256::from(100u64),
            U256::from(100u64),
            U256::from(600u64),
            U256::from(600u64),
            U256::from(600u64),
            U256::from(1_100u64),
        ],
    );
    let detector = detector(5, 60);

    let first = detector
        .detect(&balances, CHAIN, ALICE, U256::from(500u64), CancelSignal::never(), &NoopReporter)
        .await;
    let second = detector
        .detect(&balances, CHAIN, ALICE, U256::from(500u64), CancelSignal::never(), &NoopReporter)
        .await;

    assert!(first.is_matched());
    assert_eq!(first.baseline.map(|b| b.balance), Some(U256::from(100u64)));
    assert!(second.is_matched());
    assert_eq!(second.baseline.map(|b| b.balance), Some(U256::from(600u64)));
    assert_eq!(second.matched_delta, Some(U256::from(500u64)));
    assert_eq!(first.polls + second.polls, 6);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_runs_do_not_cross_report() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_sequence(
        CHAIN,
        ALICE,
        vec![U256::ZERO, U256::ZERO, U256::from(500u64)],
    );
    balances.add_constant(CHAIN, BOB, U256::from(7u64));
    let detector = detector(2, 20);
    let alice_reporter = RecordingReporter::new();
    let bob_reporter = RecordingReporter::new();

    let (alice, bob) = tokio::join!(
        detector.detect(
            &balances,
            CHAIN,
            ALICE,
            U256::from(500u64),
            CancelSignal::never(),
            &alice_reporter,
        ),
        detector.detect(
            &balances,
            CHAIN,
            BOB,
            U256::from(500u64),
            CancelSignal::never(),
            &bob_reporter,
        ),
    );

    assert!(alice.is_matched());
    assert_eq!(alice.polls, 3);
    assert!(bob.is_timed_out());
    assert!(bob.elapsed >= Duration::from_secs(20));
    assert!(bob.elapsed < Duration::from_secs(22));

    assert!(alice_reporter.updates().iter().all(|u| u.context.recipient == ALICE));
    assert!(bob_reporter.updates().iter().all(|u| u.context.recipient == BOB));
    assert_eq!(
        alice_reporter.detection_states(),
        vec![DetectionState::Pending, DetectionState::Waiting, DetectionState::Matched]
    );
    assert_eq!(
        bob_reporter.detection_states(),
        vec![DetectionState::Pending, DetectionState::Waiting, DetectionState::TimedOut]
    );
    assert_eq!(balances.reads_for(ALICE).len(), 3);
    assert_eq!(balances.reads_for(BOB).len(), 11);
}

#[tokio::test(start_paused = true)]
async fn test_slow_reads_count_against_timeout() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_constant(CHAIN, ALICE, U256::from(1u64));
    balances.set_read_delay(Duration::from_secs(2));
    let start = tokio::time::Instant::now();

    let result = detector(1, 5)
        .detect(
            &balances,
            CHAIN,
            ALICE,
            U256::from(50u64),
            CancelSignal::never(),
            &NoopReporter,
        )
        .await;

    assert!(result.is_timed_out());
    // Baseline lands at 2s, so the deadline is 7s; the third read is cut off there
    assert_eq!(result.polls, 3);
    assert_eq!(balances.read_count(), 2);
    let waited = start.elapsed();
    assert!(waited >= Duration::from_secs(7), "waited {waited:?}");
    assert!(waited < Duration::from_secs(8), "waited {waited:?}");
}

#[tokio::test(start_paused = true)]
async fn test_stalled_read_times_out_at_deadline() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_constant(CHAIN, ALICE, U256::from(1u64));
    let reporter = RecordingReporter::new();
    let start = tokio::time::Instant::now();

    let task = {
        let balances = balances.clone();
        let reporter = reporter.clone();
        tokio::spawn(async move {
            detector(1, 5)
                .detect(
                    &balances,
                    CHAIN,
                    ALICE,
                    U256::from(50u64),
                    CancelSignal::never(),
                    &reporter,
                )
                .await
        })
    };

    // The baseline is read at once; every read after it hangs for an hour
    tokio::time::sleep(Duration::from_millis(500)).await;
    balances.set_read_delay(Duration::from_secs(3_600));
    let result = task.await.unwrap();

    let waited = start.elapsed();
    assert!(result.is_timed_out());
    assert!(waited >= Duration::from_secs(5), "waited {waited:?}");
    assert!(waited < Duration::from_secs(6), "waited {waited:?}");
    assert!(result.elapsed < Duration::from_secs(6));
    assert_eq!(result.polls, 2);
    assert_eq!(result.baseline.map(|b| b.balance), Some(U256::from(1u64)));
    assert_eq!(
        reporter.detection_states(),
        vec![DetectionState::Pending, DetectionState::Waiting, DetectionState::TimedOut]
    );
}

#[tokio::test(start_paused = true)]
async fn test_stalled_baseline_read_times_out_from_start() {
    let balances = FakeBalanceSource::new(TokioClock::new());
    balances.add_constant(CHAIN, ALICE, U256::from(1u64));
    balances.set_read_delay(Duration::from_secs(3_600));
    let reporter = RecordingReporter::new();
    let start = tokio::time::Instant::now();

    let result = detector(1, 3)
        .detect(
            &balances,
            CHAIN,
            ALICE,
            U256::from(50u64),
            CancelSignal::never(),
            &reporter,
        )
        .await;

    let waited = start.elapsed();
    assert!(result.is_timed_out());
    assert!(waited >= Duration::from_secs(3), "waited {waited:?}");
    assert!(waited < Duration::from_secs(4), "waited {waited:?}");
    assert_eq!(result.baseline, None);
    assert_eq!(result.polls, 1);
    assert_eq!(balances.read_count(), 0);
    assert_eq!(
        reporter.detection_states(),
        vec![DetectionState::Pending, DetectionState::TimedOut]
    );
}
