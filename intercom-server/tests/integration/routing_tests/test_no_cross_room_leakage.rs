use intercom_core::{PeerId, RoomId, ServerEvent};
use intercom_server::CallSignal;

use crate::integration::{create_test_router, init_tracing};
use crate::utils::wait_event_for;

#[tokio::test]
async fn test_no_cross_room_leakage() {
    init_tracing();

    let (router, signaling, mut event_rx) = create_test_router();
    let room_one = RoomId::from("r1");
    let room_two = RoomId::from("r2");

    let peer_a = PeerId::new();
    let peer_b = PeerId::new();
    let peer_c = PeerId::new();
    let peer_d = PeerId::new();

    router
        .join(&room_one, peer_a.clone())
        .await
        .expect("Join failed for A");
    router
        .join(&room_one, peer_b.clone())
        .await
        .expect("Join failed for B");
    router
        .join(&room_two, peer_c.clone())
        .await
        .expect("Join failed for C");
    router
        .join(&room_two, peer_d.clone())
        .await
        .expect("Join failed for D");

    router
        .forward(
            &room_one,
            &peer_a,
            CallSignal::Offer {
                sdp: "offer for r1".into(),
            },
        )
        .await;

    let event = wait_event_for(&mut event_rx, &peer_b)
        .await
        .expect("No join ack for B");
    assert!(matches!(event, ServerEvent::Joined { .. }));
    let event = wait_event_for(&mut event_rx, &peer_b)
        .await
        .expect("Offer not delivered inside r1");
    assert!(matches!(event, ServerEvent::Offer { .. }));

    // Nothing crossed into r2: its participants only ever saw their own
    // join traffic.
    for peer in [&peer_c, &peer_d] {
        let events = signaling.events_for(peer).await;
        assert!(
            events.iter().all(|event| matches!(
                event,
                ServerEvent::Joined { .. } | ServerEvent::PeerJoined { .. }
            )),
            "Unexpected cross-room event for {:?}: {:?}",
            peer,
            events
        );
    }
}
