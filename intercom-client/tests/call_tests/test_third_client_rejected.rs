use intercom_client::{
    CallFailure, CallHandle, CallSession, CallStatus, SessionContext, SilentAudioSource,
    WsTransport,
};
use intercom_core::{PeerId, RoomId};
use std::sync::Arc;

use crate::utils::{
    CONNECT_TIMEOUT_MS, STATUS_TIMEOUT_MS, init_tracing, spawn_relay, test_settings,
    wait_for_status,
};

async fn start_client(addr: std::net::SocketAddr, room: &RoomId) -> CallHandle {
    let peer = PeerId::new();
    let (transport, events) = WsTransport::connect(&format!("ws://{addr}/ws/{peer}"))
        .await
        .expect("Failed to connect client");
    CallSession::start(
        Arc::new(transport),
        events,
        SessionContext {
            peer,
            room: room.clone(),
        },
        Arc::new(SilentAudioSource::new()),
        test_settings(),
    )
}

/// The relay, not the client, enforces the two-party invariant.
#[tokio::test]
async fn test_third_client_rejected() {
    init_tracing();

    let (addr, _router) = spawn_relay().await.expect("Failed to start relay");
    let room = RoomId::from("busy-room");

    let handle_a = start_client(addr, &room).await;
    tokio::time::sleep(std::time::Duration::from_millis(250)).await;
    let handle_b = start_client(addr, &room).await;

    let mut status_a = handle_a.watch_status();
    let mut status_b = handle_b.watch_status();
    wait_for_status(&mut status_a, CallStatus::Connected, CONNECT_TIMEOUT_MS)
        .await
        .expect("Caller never connected");
    wait_for_status(&mut status_b, CallStatus::Connected, CONNECT_TIMEOUT_MS)
        .await
        .expect("Callee never connected");

    // The latecomer is turned away; its session never starts.
    let handle_c = start_client(addr, &room).await;
    let mut status_c = handle_c.watch_status();
    wait_for_status(
        &mut status_c,
        CallStatus::Failed(CallFailure::RoomFull),
        STATUS_TIMEOUT_MS,
    )
    .await
    .expect("Third client must be rejected");

    // The established call is unaffected.
    assert_eq!(handle_a.status(), CallStatus::Connected);
    assert_eq!(handle_b.status(), CallStatus::Connected);
}
