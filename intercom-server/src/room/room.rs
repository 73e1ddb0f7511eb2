use crate::error::RelayError;
use crate::room::room_command::{CallSignal, JoinAck, RoomCommand};
use crate::signaling::SignalingOutput;
use dashmap::DashMap;
use intercom_core::{CallRole, PeerId, RoomId, ServerEvent};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Двухсторонний звонок: больше двух участников комната не принимает.
const MAX_PARTICIPANTS: usize = 2;

/// Комната-актор: единственный владелец списка участников. Все мутации
/// проходят через command_rx, поэтому порядок сообщений одного отправителя
/// сохраняется при пересылке.
pub(crate) struct Room {
    id: RoomId,
    participants: Vec<(PeerId, CallRole)>,
    command_rx: mpsc::Receiver<RoomCommand>,
    /// Собственный Sender нужен только для сравнения идентичности при
    /// самоудалении из реестра.
    command_tx: mpsc::Sender<RoomCommand>,
    signaling: Arc<dyn SignalingOutput>,
    registry: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    released: bool,
}

impl Room {
    pub(crate) fn new(
        id: RoomId,
        command_rx: mpsc::Receiver<RoomCommand>,
        command_tx: mpsc::Sender<RoomCommand>,
        signaling: Arc<dyn SignalingOutput>,
        registry: Arc<DashMap<RoomId, mpsc::Sender<RoomCommand>>>,
    ) -> Self {
        Self {
            id,
            participants: Vec::with_capacity(MAX_PARTICIPANTS),
            command_rx,
            command_tx,
            signaling,
            registry,
            released: false,
        }
    }

    pub(crate) async fn run(mut self) {
        info!("Room '{}' event loop started", self.id);

        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RoomCommand::Join { peer_id, ack } => self.handle_join(peer_id, ack).await,
                RoomCommand::Forward { peer_id, signal } => {
                    self.handle_signal(peer_id, signal).await
                }
                RoomCommand::Disconnect { peer_id } => self.handle_disconnect(peer_id).await,
            }

            if self.released {
                break;
            }
        }

        // Убираем только собственную запись: на этот id мог уже встать
        // новый актор.
        self.registry
            .remove_if(&self.id, |_, tx| tx.same_channel(&self.command_tx));
        info!("Room '{}' released", self.id);
    }

    async fn handle_join(
        &mut self,
        peer_id: PeerId,
        ack: tokio::sync::oneshot::Sender<Result<JoinAck, RelayError>>,
    ) {
        // Повторный join того же участника подтверждаем прежней ролью.
        if let Some((_, role)) = self.participants.iter().find(|(id, _)| *id == peer_id) {
            let reply = JoinAck {
                role: *role,
                peer_present: self.participants.len() == MAX_PARTICIPANTS,
            };
            self.send_joined(&peer_id, reply).await;
            let _ = ack.send(Ok(reply));
            return;
        }

        if self.participants.len() >= MAX_PARTICIPANTS {
            warn!("Join rejected for {:?}: room '{}' is full", peer_id, self.id);
            self.signaling
                .send_event(
                    peer_id,
                    ServerEvent::JoinRejected {
                        reason: intercom_core::RejectReason::RoomFull,
                    },
                )
                .await;
            let _ = ack.send(Err(RelayError::RoomFull(self.id.clone())));
            return;
        }

        let role = if self.participants.is_empty() {
            CallRole::Caller
        } else {
            CallRole::Callee
        };
        let peer_present = !self.participants.is_empty();

        info!(
            "Peer {:?} joined room '{}' as {:?}",
            peer_id, self.id, role
        );
        self.participants.push((peer_id.clone(), role));
        let reply = JoinAck { role, peer_present };

        // Joined уходит раньше уведомления второй стороне: повторный offer
        // звонящего не может обогнать подтверждение входа у вызываемого.
        self.send_joined(&peer_id, reply).await;
        let _ = ack.send(Ok(reply));

        for (other, _) in self.participants.clone() {
            if other != peer_id {
                self.signaling
                    .send_event(
                        other,
                        ServerEvent::PeerJoined {
                            peer: peer_id.clone(),
                        },
                    )
                    .await;
            }
        }
    }

    async fn handle_signal(&mut self, peer_id: PeerId, signal: CallSignal) {
        if !self.is_member(&peer_id) {
            debug!(
                "Dropping signal from non-member {:?} of room '{}'",
                peer_id, self.id
            );
            return;
        }

        match signal {
            CallSignal::End => {
                info!("Call ended in room '{}' by {:?}", self.id, peer_id);
                self.notify_others(&peer_id, ServerEvent::CallEnded).await;
                self.participants.clear();
                self.released = true;
            }
            other => {
                let event = match other {
                    CallSignal::Offer { sdp } => ServerEvent::Offer { sdp },
                    CallSignal::Answer { sdp } => ServerEvent::Answer { sdp },
                    CallSignal::Candidate { candidate } => ServerEvent::IceCandidate { candidate },
                    CallSignal::End => unreachable!(),
                };

                if self.participants.len() < MAX_PARTICIPANTS {
                    // Политика: не буферизуем. Звонящий повторит offer по
                    // событию peer-joined.
                    debug!(
                        "No remote participant in room '{}' yet, dropping signal from {:?}",
                        self.id, peer_id
                    );
                    return;
                }

                self.notify_others(&peer_id, event).await;
            }
        }
    }

    async fn handle_disconnect(&mut self, peer_id: PeerId) {
        // Обрыв транспорта эквивалентен явному завершению звонка.
        if !self.is_member(&peer_id) {
            return;
        }

        info!(
            "Peer {:?} disconnected, closing call in room '{}'",
            peer_id, self.id
        );
        self.notify_others(&peer_id, ServerEvent::CallEnded).await;
        self.participants.clear();
        self.released = true;
    }

    fn is_member(&self, peer_id: &PeerId) -> bool {
        self.participants.iter().any(|(id, _)| id == peer_id)
    }

    async fn send_joined(&self, peer_id: &PeerId, ack: JoinAck) {
        self.signaling
            .send_event(
                peer_id.clone(),
                ServerEvent::Joined {
                    role: ack.role,
                    peer_present: ack.peer_present,
                },
            )
            .await;
    }

    async fn notify_others(&self, sender: &PeerId, event: ServerEvent) {
        for (other, _) in &self.participants {
            if other != sender {
                self.signaling.send_event(other.clone(), event.clone()).await;
            }
        }
    }
}
