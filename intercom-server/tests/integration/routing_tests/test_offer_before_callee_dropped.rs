use intercom_core::{PeerId, RoomId, ServerEvent};
use intercom_server::CallSignal;

use crate::integration::{create_test_router, init_tracing};
use crate::utils::wait_event_for;

/// The relay does not buffer: an offer sent while the caller is alone is
/// dropped, and the retry after peer-joined is what reaches the callee.
#[tokio::test]
async fn test_offer_before_callee_dropped() {
    init_tracing();

    let (router, signaling, mut event_rx) = create_test_router();
    let room = RoomId::from("r1");

    let caller = PeerId::new();
    let callee = PeerId::new();

    router
        .join(&room, caller.clone())
        .await
        .expect("Caller join failed");

    // Premature offer: no callee yet.
    router
        .forward(
            &room,
            &caller,
            CallSignal::Offer {
                sdp: "early offer".into(),
            },
        )
        .await;

    router
        .join(&room, callee.clone())
        .await
        .expect("Callee join failed");

    let event = wait_event_for(&mut event_rx, &caller)
        .await
        .expect("No join ack for caller");
    assert!(matches!(event, ServerEvent::Joined { .. }));
    let event = wait_event_for(&mut event_rx, &caller)
        .await
        .expect("No peer-joined for caller");
    assert!(matches!(event, ServerEvent::PeerJoined { .. }));

    // Retry after peer-joined.
    router
        .forward(
            &room,
            &caller,
            CallSignal::Offer {
                sdp: "retried offer".into(),
            },
        )
        .await;

    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("No join ack for callee");
    assert!(matches!(event, ServerEvent::Joined { .. }));
    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("Retried offer not delivered");
    match event {
        ServerEvent::Offer { sdp } => assert_eq!(sdp, "retried offer"),
        other => panic!("Expected Offer, got {:?}", other),
    }

    // The early offer went nowhere.
    let callee_events = signaling.events_for(&callee).await;
    assert_eq!(
        callee_events
            .iter()
            .filter(|event| matches!(event, ServerEvent::Offer { .. }))
            .count(),
        1,
        "Only the retried offer may reach the callee"
    );
}
