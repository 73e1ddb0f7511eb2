use intercom_client::{CallFailure, CallSession, CallStatus, SilentAudioSource, TransportEvent};
use intercom_core::{CallRole, RejectReason, ServerEvent};
use std::sync::Arc;

use crate::utils::{
    MockTransport, STATUS_TIMEOUT_MS, init_tracing, test_context, test_settings, wait_for_status,
};

#[tokio::test]
async fn test_join_rejected_when_room_is_full() {
    init_tracing();

    let (transport, event_tx, event_rx) = MockTransport::new();
    let handle = CallSession::start(
        transport,
        event_rx,
        test_context("r1"),
        Arc::new(SilentAudioSource::new()),
        test_settings(),
    );

    event_tx
        .send(TransportEvent::Signal(ServerEvent::JoinRejected {
            reason: RejectReason::RoomFull,
        }))
        .await
        .expect("Failed to inject rejection");

    let mut status_rx = handle.watch_status();
    wait_for_status(
        &mut status_rx,
        CallStatus::Failed(CallFailure::RoomFull),
        STATUS_TIMEOUT_MS,
    )
    .await
    .expect("Capacity rejection must fail the session");
}

#[tokio::test]
async fn test_transport_loss_fails_the_session() {
    init_tracing();

    let (transport, event_tx, event_rx) = MockTransport::new();
    let handle = CallSession::start(
        transport,
        event_rx,
        test_context("r1"),
        Arc::new(SilentAudioSource::new()),
        test_settings(),
    );

    event_tx
        .send(TransportEvent::Signal(ServerEvent::Joined {
            role: CallRole::Caller,
            peer_present: false,
        }))
        .await
        .expect("Failed to inject join ack");

    event_tx
        .send(TransportEvent::Disconnected)
        .await
        .expect("Failed to inject disconnect");

    let mut status_rx = handle.watch_status();
    wait_for_status(
        &mut status_rx,
        CallStatus::Failed(CallFailure::TransportDisconnect),
        STATUS_TIMEOUT_MS,
    )
    .await
    .expect("Transport loss must fail the session");
}
