use intercom_client::{CallConnection, CallError, SilentAudioSource};
use tokio::sync::mpsc;

use crate::utils::{init_tracing, test_settings};

async fn new_connection() -> CallConnection {
    let (event_tx, _event_rx) = mpsc::channel(64);
    CallConnection::new(&SilentAudioSource::new(), &test_settings(), event_tx)
        .await
        .expect("Failed to create connection")
}

#[tokio::test]
async fn test_second_offer_is_reported_as_misuse() {
    init_tracing();

    let connection = new_connection().await;

    let offer = connection
        .create_offer()
        .await
        .expect("First offer must succeed");
    assert!(offer.contains("v=0"), "Expected an SDP payload");

    let err = connection
        .create_offer()
        .await
        .expect_err("Second offer must be rejected");
    assert!(matches!(err, CallError::NegotiationState(_)));

    connection.close().await;
}

#[tokio::test]
async fn test_duplicate_answer_applied_once() {
    init_tracing();

    let caller = new_connection().await;
    let callee = new_connection().await;

    let offer = caller.create_offer().await.expect("Failed to create offer");
    let answer = callee
        .handle_offer(offer)
        .await
        .expect("Failed to answer offer");

    let applied = caller
        .handle_answer(answer.clone())
        .await
        .expect("First answer must apply");
    assert!(applied);

    // The late duplicate is a no-op, not a negotiation-state error.
    let applied = caller
        .handle_answer(answer)
        .await
        .expect("Duplicate answer must not error");
    assert!(!applied);

    caller.close().await;
    callee.close().await;
}

#[tokio::test]
async fn test_teardown_is_idempotent_and_tolerant() {
    init_tracing();

    let connection = new_connection().await;

    // Close before any negotiation took place, then close again.
    connection.close().await;
    connection.close().await;

    // A candidate racing the teardown is swallowed, not raised.
    connection
        .add_ice_candidate(r#"{"candidate":"candidate:0 1 udp 1 127.0.0.1 9 typ host"}"#)
        .await;
    connection.add_ice_candidate("not json at all").await;
}
