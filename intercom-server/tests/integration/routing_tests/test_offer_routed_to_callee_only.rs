use intercom_core::{PeerId, RoomId, ServerEvent};
use intercom_server::CallSignal;

use crate::integration::{create_test_router, init_tracing};
use crate::utils::wait_event_for;

#[tokio::test]
async fn test_offer_routed_to_callee_only() {
    init_tracing();

    let (router, signaling, mut event_rx) = create_test_router();
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

    router
        .forward(
            &room,
            &caller,
            CallSignal::Offer {
                sdp: "v=0 offer".into(),
            },
        )
        .await;

    // Callee sees its join ack, then the offer.
    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("No join ack for callee");
    assert!(matches!(event, ServerEvent::Joined { .. }));

    let event = wait_event_for(&mut event_rx, &callee)
        .await
        .expect("Offer not delivered");
    match event {
        ServerEvent::Offer { sdp } => assert_eq!(sdp, "v=0 offer"),
        other => panic!("Expected Offer, got {:?}", other),
    }

    router
        .forward(
            &room,
            &callee,
            CallSignal::Answer {
                sdp: "v=0 answer".into(),
            },
        )
        .await;

    let event = wait_event_for(&mut event_rx, &caller)
        .await
        .expect("No join ack for caller");
    assert!(matches!(event, ServerEvent::Joined { .. }));
    let event = wait_event_for(&mut event_rx, &caller)
        .await
        .expect("No peer-joined for caller");
    assert!(matches!(event, ServerEvent::PeerJoined { .. }));

    let event = wait_event_for(&mut event_rx, &caller)
        .await
        .expect("Answer not delivered");
    match event {
        ServerEvent::Answer { sdp } => assert_eq!(sdp, "v=0 answer"),
        other => panic!("Expected Answer, got {:?}", other),
    }

    // The offer never echoed back to its sender.
    let caller_events = signaling.events_for(&caller).await;
    assert!(
        caller_events
            .iter()
            .all(|event| !matches!(event, ServerEvent::Offer { .. })),
        "Offer must not be delivered to its sender"
    );
}
