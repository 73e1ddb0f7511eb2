use crate::room::{CallSignal, RoomRouter};
use crate::signaling::SignalingService;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use intercom_core::{PeerId, RoomId, ServerEvent, SignalMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

pub struct AppState {
    pub signaling: SignalingService,
    pub router: RoomRouter,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(peer_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let Ok(peer_id) = peer_id.parse::<PeerId>() else {
        return (StatusCode::BAD_REQUEST, "invalid peer id").into_response();
    };

    ws.on_upgrade(move |socket| handle_socket(socket, peer_id, state))
        .into_response()
}

async fn handle_socket(socket: WebSocket, peer_id: PeerId, state: Arc<AppState>) {
    info!("New WebSocket connection: {:?}", peer_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    state.signaling.add_peer(peer_id.clone(), tx);

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let state = state.clone();
        let peer_id = peer_id.clone();

        async move {
            // Участник состоит максимум в одной комнате: join в новую
            // комнату сначала отключает его от предыдущей.
            let mut current_room: Option<RoomId> = None;

            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => match serde_json::from_str::<SignalMessage>(&text) {
                        Ok(signal) => {
                            handle_signal(&state, &peer_id, &mut current_room, signal).await
                        }
                        Err(e) => warn!("Invalid SignalMessage from {:?}: {:?}", peer_id, e),
                    },
                    Message::Close(_) => break,
                    _ => {}
                }
            }

            if let Some(room) = current_room.take() {
                state.router.disconnect(&room, &peer_id).await;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    state.signaling.remove_peer(&peer_id);
    info!("WebSocket disconnected: {:?}", peer_id);
}

async fn handle_signal(
    state: &Arc<AppState>,
    peer_id: &PeerId,
    current_room: &mut Option<RoomId>,
    signal: SignalMessage,
) {
    match signal {
        SignalMessage::Join { room } => {
            if let Some(prev) = current_room.take() {
                if prev != room {
                    state.router.disconnect(&prev, peer_id).await;
                }
            }

            match state.router.join(&room, peer_id.clone()).await {
                Ok(_ack) => {
                    *current_room = Some(room);
                }
                Err(e) => {
                    warn!("Join failed for {:?}: {}", peer_id, e);
                    // Отказ по переполнению комната уже отправила сама;
                    // прочие отказы доносим отсюда.
                    if matches!(e, crate::RelayError::RoomUnavailable(_)) {
                        state.signaling.send_signal(
                            peer_id.clone(),
                            &ServerEvent::JoinRejected {
                                reason: e.reject_reason(),
                            },
                        );
                    }
                }
            }
        }
        SignalMessage::Leave { room } => {
            if current_room.as_ref() == Some(&room) {
                current_room.take();
                state.router.disconnect(&room, peer_id).await;
            }
        }
        SignalMessage::Offer { room, sdp } => {
            state
                .router
                .forward(&room, peer_id, CallSignal::Offer { sdp })
                .await;
        }
        SignalMessage::Answer { room, sdp } => {
            state
                .router
                .forward(&room, peer_id, CallSignal::Answer { sdp })
                .await;
        }
        SignalMessage::IceCandidate { room, candidate } => {
            state
                .router
                .forward(&room, peer_id, CallSignal::Candidate { candidate })
                .await;
        }
        SignalMessage::End { room } => {
            if current_room.as_ref() == Some(&room) {
                current_room.take();
            }
            state.router.forward(&room, peer_id, CallSignal::End).await;
        }
    }
}
