//! Integration test: partial-failure accounting.
//!
//! Batches confirmed before a failure are always reported, the failing batch
//! is named, and later batches are never attempted.

use std::time::Duration;

use payman_integration_tests::{equal_delegators, params, snapshot};
use payman_payout::batch::build_batches;
use payman_payout::stub::{InjectBehavior, StubChain};
use payman_payout::{
    compute_payout, run_batch_payout, BatchPolicy, GroupState, Injector, PaymentSource,
    PayoutError,
};

async fn report_source(chain: &StubChain) -> PaymentSource {
    let report = compute_payout(chain, &params(800, 0.1, 0))
        .await
        .expect("payout should compute");
    PaymentSource::Report(report)
}

fn chain_with(behavior: (usize, InjectBehavior)) -> StubChain {
    StubChain::new()
        .with_snapshot(snapshot(800, 1_000_000, &equal_delegators(250, 1_000)))
        .on_inject(behavior.0, behavior.1)
}

#[tokio::test]
async fn second_of_three_rejected() {
    let chain = chain_with((2, InjectBehavior::Reject("counter_in_the_past".into())));
    let source = report_source(&chain).await;

    let outcome = run_batch_payout(&chain, source, &BatchPolicy::default(), None).await;

    assert_eq!(outcome.submitted.len(), 1);
    assert_eq!(outcome.submitted, chain.injected_hashes());
    match outcome.error {
        Some(PayoutError::InjectionFailed { group, reason }) => {
            assert_eq!(group, 2);
            assert!(reason.contains("counter_in_the_past"));
        }
        other => panic!("expected InjectionFailed, got {other:?}"),
    }
    assert_eq!(chain.injected().len(), 2, "group 3 must not be attempted");
}

#[tokio::test(start_paused = true)]
async fn timeout_reported_as_ambiguous() {
    let chain = chain_with((3, InjectBehavior::Hang));
    let source = report_source(&chain).await;
    let policy = BatchPolicy {
        submission_timeout: Some(Duration::from_secs(10)),
        ..Default::default()
    };

    let outcome = run_batch_payout(&chain, source, &policy, None).await;

    assert_eq!(outcome.submitted.len(), 2);
    let err = outcome.error.expect("timeout should surface");
    assert!(matches!(err, PayoutError::SubmissionAmbiguous { group: 3, .. }));
    assert!(!err.is_retry_safe());
}

#[tokio::test]
async fn resume_after_failure_completes_without_duplicates() {
    let chain = chain_with((2, InjectBehavior::Disconnect));
    let payments = report_source(&chain).await.into_payments();
    let groups = build_batches(&chain, payments, &BatchPolicy::default())
        .await
        .expect("build");

    let mut injector = Injector::new(groups, None);
    let first = injector.run(&chain, None).await;
    assert_eq!(first.submitted.len(), 1);
    assert!(matches!(
        first.error,
        Some(PayoutError::SubmissionAmbiguous { group: 2, .. })
    ));

    // The operator reconciled group 2 and chose to resubmit.
    let second = injector.run(&chain, None).await;
    assert!(second.is_complete());
    assert_eq!(second.submitted.len(), 3);
    assert_eq!(second.submitted[0], first.submitted[0]);
    assert!(injector
        .states()
        .all(|(_, state)| matches!(state, GroupState::Confirmed(_))));

    // Group 1 once, group 2 twice, group 3 once.
    assert_eq!(chain.injected().len(), 4);
}

#[tokio::test]
async fn build_rejection_leaves_chain_untouched() {
    let chain = chain_with((1, InjectBehavior::Accept)).reject_build_for("tz1delegator0249");
    let source = report_source(&chain).await;

    let outcome = run_batch_payout(&chain, source, &BatchPolicy::default(), None).await;

    assert!(outcome.submitted.is_empty());
    assert!(matches!(
        outcome.error,
        Some(PayoutError::BuildFailed { group: 3, .. })
    ));
    assert!(chain.injected().is_empty());
}
