//! Integration tests for the bridge flow using fake implementations
//!
//! Submission, source confirmation and destination balances are all faked, so
//! every failure mode of a bridge run can be driven deterministically.

use alloy_chains::NamedChain;
use alloy_primitives::{Address, TxHash, U256};
use std::sync::Arc;
use std::time::Duration;
use xbridge_rs::testing::{
    FakeBalanceSource, FakeClock, FakeSubmitter, RecordingReporter, Submission,
};
use xbridge_rs::{
    cancellation, BridgeError, BridgeOrchestrator, BridgeParams, BridgeRequest, BridgeStatus,
    CancelSignal, CompletionDetector, DetectionConfig, DetectionState, SubmissionErrorKind,
};

const RECIPIENT: Address = Address::repeat_byte(0x42);
const SOURCE: NamedChain = NamedChain::Sepolia;
const DESTINATION: NamedChain = NamedChain::ArbitrumSepolia;

type TestOrchestrator = BridgeOrchestrator<FakeSubmitter, FakeBalanceSource, FakeClock>;

/// Helper function to create an orchestrator wired to fakes
fn create_test_orchestrator(
    submitter: FakeSubmitter,
    balances: FakeBalanceSource,
    clock: FakeClock,
    reporter: RecordingReporter,
) -> TestOrchestrator {
    let detector = CompletionDetector::builder()
        .config(
            DetectionConfig::default()
                .with_poll_interval(Duration::from_secs(5))
                .with_timeout(Duration::from_secs(60)),
        )
        .clock(clock)
        .build();
    BridgeOrchestrator::new(submitter, balances, detector).with_reporter(Arc::new(reporter))
}

fn bridge_params(amount: u64) -> BridgeParams {
    BridgeParams::builder()
        .source_chain(SOURCE)
        .destination_chain(DESTINATION)
        .recipient(RECIPIENT)
        .amount(U256::from(amount))
        .build()
}

#[tokio::test]
async fn test_full_bridge_run_matches() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    balances.add_sequence(
        DESTINATION,
        RECIPIENT,
        vec![
            U256::from(1_000u64),
            U256::from(1_000u64),
            U256::from(1_999u64),
        ],
    );
    let submitter = FakeSubmitter::new(SOURCE).with_tx_hash(TxHash::repeat_byte(0x01));
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock.clone(), reporter.clone());

    let result = orchestrator
        .run(bridge_params(1_000), CancelSignal::never())
        .await
        .unwrap();

    assert!(result.is_matched());
    assert_eq!(result.matched_delta, Some(U256::from(999u64)));
    assert_eq!(result.polls, 3);
    assert_eq!(result.elapsed, Duration::from_secs(10));

    assert_eq!(
        submitter.submissions(),
        vec![Submission {
            destination: DESTINATION,
            recipient: RECIPIENT,
            amount: U256::from(1_000u64),
        }]
    );
    assert_eq!(submitter.confirmations(), vec![TxHash::repeat_byte(0x01)]);
    assert!(balances
        .reads()
        .iter()
        .all(|read| read.chain == DESTINATION && read.address == RECIPIENT));

    let updates = reporter.updates();
    assert_eq!(
        updates.last().map(|u| u.status),
        Some(BridgeStatus::Detection(DetectionState::Matched))
    );
    assert_eq!(updates.last().and_then(|u| u.context.matched_delta), Some(U256::from(999u64)));
}

#[tokio::test]
async fn test_submission_error_is_surfaced_verbatim() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    let submitter = FakeSubmitter::new(SOURCE);
    submitter.fail_submissions(
        SubmissionErrorKind::InsufficientFunds,
        "sender holds 5, bridge needs 10",
    );
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock, reporter.clone());

    let err = orchestrator
        .run(bridge_params(10), CancelSignal::never())
        .await
        .unwrap_err();

    match err {
        BridgeError::Submission { kind, reason } => {
            assert_eq!(kind, SubmissionErrorKind::InsufficientFunds);
            assert_eq!(reason, "sender holds 5, bridge needs 10");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(balances.read_count(), 0);
    assert!(submitter.confirmations().is_empty());
    assert!(reporter.updates().is_empty());
}

#[tokio::test]
async fn test_user_rejection_message() {
    let clock = FakeClock::new();
    let submitter = FakeSubmitter::new(SOURCE);
    submitter.fail_submissions(SubmissionErrorKind::UserRejected, "User denied transaction signature");
    let orchestrator = create_test_orchestrator(
        submitter,
        FakeBalanceSource::new(clock.clone()),
        clock,
        RecordingReporter::new(),
    );

    let err = orchestrator
        .submit_and_confirm(&bridge_params(10))
        .await
        .unwrap_err();

    insta::assert_snapshot!(
        err.to_string(),
        @"Bridge submission failed (user rejected): User denied transaction signature"
    );
}

#[tokio::test]
async fn test_reverted_source_transaction_skips_detection() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    let submitter = FakeSubmitter::new(SOURCE);
    submitter.revert_on_confirmation("execution reverted: SlippageExceeded");
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock, reporter.clone());

    let result = orchestrator.run(bridge_params(10), CancelSignal::never()).await;

    assert!(matches!(
        result,
        Err(BridgeError::TransactionFailed { ref reason }) if reason.contains("SlippageExceeded")
    ));
    assert_eq!(submitter.submissions().len(), 1);
    assert_eq!(balances.read_count(), 0);
    assert_eq!(reporter.statuses(), vec![BridgeStatus::SourceConfirming]);
}

#[tokio::test]
async fn test_invalid_params_never_submit() {
    let clock = FakeClock::new();
    let submitter = FakeSubmitter::new(SOURCE);
    let orchestrator = create_test_orchestrator(
        submitter.clone(),
        FakeBalanceSource::new(clock.clone()),
        clock,
        RecordingReporter::new(),
    );

    let result = orchestrator.run(bridge_params(0), CancelSignal::never()).await;

    assert!(matches!(result, Err(BridgeError::InvalidInput(_))));
    assert!(submitter.submissions().is_empty());
}

#[tokio::test]
async fn test_nowait_returns_after_confirmation() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    let submitter = FakeSubmitter::new(SOURCE);
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock, reporter.clone());

    let request = orchestrator
        .submit_and_confirm(&bridge_params(10))
        .await
        .unwrap();

    assert_eq!(request.source_tx(), TxHash::repeat_byte(0xaa));
    assert_eq!(request.destination_chain(), DESTINATION);
    assert_eq!(submitter.confirmations(), vec![request.source_tx()]);
    assert_eq!(balances.read_count(), 0);
    assert_eq!(reporter.statuses(), vec![BridgeStatus::SourceConfirming]);
}

#[tokio::test]
async fn test_run_times_out_when_nothing_arrives() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    balances.add_constant(DESTINATION, RECIPIENT, U256::from(50u64));
    let reporter = RecordingReporter::new();
    let orchestrator = create_test_orchestrator(
        FakeSubmitter::new(SOURCE),
        balances.clone(),
        clock.clone(),
        reporter.clone(),
    );

    let result = orchestrator
        .run(bridge_params(10), CancelSignal::never())
        .await
        .unwrap();

    assert!(result.is_timed_out());
    assert_eq!(result.matched_delta, None);
    assert_eq!(result.baseline.map(|b| b.balance), Some(U256::from(50u64)));
    // Baseline plus one read per 5 second interval over 60 seconds
    assert_eq!(result.polls, 13);
    assert_eq!(clock.total_sleep_time(), Duration::from_secs(60));
    assert_eq!(
        reporter.detection_states(),
        vec![
            DetectionState::Pending,
            DetectionState::Waiting,
            DetectionState::TimedOut
        ]
    );
}

#[tokio::test]
async fn test_cancel_before_confirmation_skips_detection() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    let submitter = FakeSubmitter::new(SOURCE);
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock, reporter.clone());

    let (handle, signal) = cancellation();
    handle.cancel();
    let result = orchestrator.run(bridge_params(10), signal).await.unwrap();

    assert!(result.is_cancelled());
    assert_eq!(result.polls, 0);
    assert_eq!(result.baseline, None);
    assert_eq!(submitter.submissions().len(), 1);
    assert_eq!(balances.read_count(), 0);
    assert_eq!(
        reporter.statuses(),
        vec![
            BridgeStatus::SourceConfirming,
            BridgeStatus::Detection(DetectionState::Cancelled)
        ]
    );
}

#[tokio::test]
async fn test_resume_detection_for_accepted_request() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    balances.add_sequence(
        DESTINATION,
        RECIPIENT,
        vec![U256::ZERO, U256::from(10u64)],
    );
    let submitter = FakeSubmitter::new(SOURCE);
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances, clock, reporter.clone());

    let request = BridgeRequest::from_accepted(bridge_params(10), TxHash::repeat_byte(0x77));
    let result = orchestrator.detect(&request, CancelSignal::never()).await;

    assert!(result.is_matched());
    assert!(submitter.submissions().is_empty());
    assert!(reporter
        .updates()
        .iter()
        .all(|u| u.context.source_tx == Some(TxHash::repeat_byte(0x77))));
    assert_eq!(reporter.statuses()[0], BridgeStatus::WaitingDestination);
}

#[tokio::test]
async fn test_unconfigured_destination_fails_before_submission() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    balances.mark_unconfigured(DESTINATION);
    let submitter = FakeSubmitter::new(SOURCE);
    let reporter = RecordingReporter::new();
    let orchestrator =
        create_test_orchestrator(submitter.clone(), balances.clone(), clock.clone(), reporter.clone());

    let result = orchestrator.run(bridge_params(10), CancelSignal::never()).await;

    assert!(matches!(result, Err(BridgeError::InvalidConfig(_))));
    assert!(submitter.submissions().is_empty());
    assert_eq!(balances.read_count(), 0);
    assert_eq!(clock.total_sleep_time(), Duration::ZERO);
    assert!(reporter.updates().is_empty());
}

#[tokio::test]
async fn test_match_uses_destination_decimals() {
    let clock = FakeClock::new();
    let balances = FakeBalanceSource::new(clock.clone());
    // 1.5 tokens: 18 decimals on the source, 6 on the destination
    balances.add_sequence(
        DESTINATION,
        RECIPIENT,
        vec![U256::from(2_000_000u64), U256::from(3_500_000u64)],
    );
    let submitter = FakeSubmitter::new(SOURCE);
    let orchestrator = create_test_orchestrator(
        submitter.clone(),
        balances,
        clock,
        RecordingReporter::new(),
    );
    let params = BridgeParams::builder()
        .source_chain(SOURCE)
        .destination_chain(DESTINATION)
        .recipient(RECIPIENT)
        .amount(U256::from(1_500_000_000_000_000_000u64))
        .source_decimals(18)
        .destination_decimals(6)
        .build();

    let result = orchestrator.run(params, CancelSignal::never()).await.unwrap();

    assert!(result.is_matched());
    assert_eq!(result.matched_delta, Some(U256::from(1_500_000u64)));
    assert_eq!(
        submitter.submissions()[0].amount,
        U256::from(1_500_000_000_000_000_000u64)
    );
}
