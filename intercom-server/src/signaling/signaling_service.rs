use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use intercom_core::{PeerId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Registry of connected peers and their outbound WebSocket queues.
/// Events for one peer are serialized through its unbounded queue, so the
/// per-sender ordering a room produces survives down to the socket.
#[derive(Clone, Default)]
pub struct SignalingService {
    peers: Arc<DashMap<PeerId, mpsc::UnboundedSender<Message>>>,
}

impl SignalingService {
    pub fn new() -> Self {
        Self {
            peers: Arc::new(DashMap::new()),
        }
    }

    pub fn add_peer(&self, peer_id: PeerId, tx: mpsc::UnboundedSender<Message>) {
        self.peers.insert(peer_id, tx);
    }

    pub fn remove_peer(&self, peer_id: &PeerId) {
        self.peers.remove(peer_id);
    }

    pub fn send_signal(&self, peer_id: PeerId, event: &ServerEvent) {
        if let Some(peer) = self.peers.get(&peer_id) {
            match serde_json::to_string(event) {
                Ok(json) => {
                    if let Err(e) = peer.send(Message::Text(json.into())) {
                        error!("Failed to send WS message to {:?}: {:?}", peer_id, e);
                    }
                }
                Err(e) => error!("Failed to serialize server event: {}", e),
            }
        } else {
            warn!(
                "Attempted to send signal to disconnected peer {:?}",
                peer_id
            );
        }
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_event(&self, peer_id: PeerId, event: ServerEvent) {
        self.send_signal(peer_id, &event);
    }
}
