use crate::error::RelayError;
use crate::room::room::Room;
use crate::room::room_command::{CallSignal, JoinAck, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use intercom_core::{PeerId, RoomId};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

const ROOM_MAILBOX: usize = 64;

/// Maps room ids to room actors. Rooms are created on first join and remove
/// themselves from the registry when their last participant is gone; signals
/// addressed to an unknown room are dropped, never create one.
#[derive(Clone)]
pub struct RoomRouter {
    rooms: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    signaling: Arc<dyn SignalingOutput>,
}

impl RoomRouter {
    pub fn new(signaling: Arc<dyn SignalingOutput>) -> Self {
        Self {
            rooms: Arc::new(DashMap::new()),
            signaling,
        }
    }

    pub async fn join(&self, room_id: &RoomId, peer_id: PeerId) -> Result<JoinAck, RelayError> {
        // Комната могла опустеть и выйти, пока join был в полёте: тогда
        // oneshot умирает вместе с актором и мы пробуем ещё раз на свежей.
        for _ in 0..2 {
            let tx = self.room_sender(room_id);
            let (ack_tx, ack_rx) = oneshot::channel();

            let sent = tx
                .send(RoomCommand::Join {
                    peer_id: peer_id.clone(),
                    ack: ack_tx,
                })
                .await
                .is_ok();

            if sent {
                if let Ok(result) = ack_rx.await {
                    return result;
                }
            }

            self.rooms
                .remove_if(room_id, |_, sender| sender.same_channel(&tx));
        }

        Err(RelayError::RoomUnavailable(room_id.clone()))
    }

    /// Forward a signal into a room. Unknown rooms and dead actors swallow
    /// the message silently: a candidate arriving after both sides left is
    /// an expected race, not an error.
    pub async fn forward(&self, room_id: &RoomId, peer_id: &PeerId, signal: CallSignal) {
        let Some(tx) = self.rooms.get(room_id).map(|entry| entry.clone()) else {
            debug!("Dropping signal for unknown room '{}'", room_id);
            return;
        };

        let _ = tx
            .send(RoomCommand::Forward {
                peer_id: peer_id.clone(),
                signal,
            })
            .await;
    }

    pub async fn disconnect(&self, room_id: &RoomId, peer_id: &PeerId) {
        let Some(tx) = self.rooms.get(room_id).map(|entry| entry.clone()) else {
            return;
        };

        let _ = tx
            .send(RoomCommand::Disconnect {
                peer_id: peer_id.clone(),
            })
            .await;
    }

    pub fn contains_room(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    fn room_sender(&self, room_id: &RoomId) -> mpsc::Sender<RoomCommand> {
        self.rooms
            .entry(room_id.clone())
            .or_insert_with(|| {
                info!("Creating room '{}'", room_id);
                let (tx, rx) = mpsc::channel(ROOM_MAILBOX);
                let room = Room::new(
                    room_id.clone(),
                    rx,
                    tx.clone(),
                    self.signaling.clone(),
                    Arc::clone(&self.rooms),
                );
                tokio::spawn(room.run());
                tx
            })
            .clone()
    }
}
