use intercom_core::{PeerId, RoomId, ServerEvent};

use crate::integration::{create_test_router, init_tracing};
use crate::utils::{wait_event_for, wait_for_release};

/// Abrupt transport loss is handled exactly like an explicit end: the peer
/// is notified and the room is released.
#[tokio::test]
async fn test_disconnect_treated_as_end() {
    init_tracing();

    let (router, _signaling, mut event_rx) = create_test_router();
    let room = RoomId::from("r1");

    let caller = PeerId::new();
    let callee = PeerId::new();

    router
        .join(&room, caller.clone())
        .await
        .expect("Caller join failed");
    router
        .join(&room, callee.clone())
        .await
        .expect("Callee join failed");

    router.disconnect(&room, &caller).await;

    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("No join ack for callee");
    assert!(matches!(event, ServerEvent::Joined { .. }));
    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("Disconnect not propagated to callee");
    assert!(matches!(event, ServerEvent::CallEnded));

    wait_for_release(&router, &room)
        .await
        .expect("Room not released after disconnect");
}
