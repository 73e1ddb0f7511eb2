use crate::call::call_connection::{CallConnection, ConnectionEvent, RtcSettings};
use crate::call::call_state::{CallFailure, CallState, CallStatus};
use crate::media::MediaSource;
use crate::transport::{SignalingTransport, TransportEvent};
use intercom_core::{CallRole, PeerId, RejectReason, RoomId, ServerEvent, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::track::track_remote::TrackRemote;

const CONNECTION_EVENT_QUEUE: usize = 64;

/// Identity and room for one call, injected by the hosting application.
/// The subsystem never reads ambient state; the relay remains the authority
/// on role assignment.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub peer: PeerId,
    pub room: RoomId,
}

enum SessionCommand {
    End,
}

/// The UI's grip on a running call. Ending the call (or dropping the
/// handle when the call surface goes away) drives the same release path:
/// the end signal is emitted, the connection is torn down and the terminal
/// status is published, unconditionally and in that order.
pub struct CallHandle {
    status_rx: watch::Receiver<CallStatus>,
    track_rx: mpsc::UnboundedReceiver<Arc<TrackRemote>>,
    cmd_tx: mpsc::Sender<SessionCommand>,
}

impl CallHandle {
    pub fn status(&self) -> CallStatus {
        *self.status_rx.borrow()
    }

    pub fn watch_status(&self) -> watch::Receiver<CallStatus> {
        self.status_rx.clone()
    }

    /// The remote audio stream, handed over for playback when it arrives.
    pub async fn next_remote_track(&mut self) -> Option<Arc<TrackRemote>> {
        self.track_rx.recv().await
    }

    /// End the call. Safe to call repeatedly; after the first time the
    /// session is already tearing down and further calls are no-ops.
    pub async fn end(&self) {
        let _ = self.cmd_tx.send(SessionCommand::End).await;
    }

    /// Wait until the session reaches a terminal status and return it.
    pub async fn ended(&mut self) -> CallStatus {
        loop {
            let status = *self.status_rx.borrow_and_update();
            if matches!(status, CallStatus::Ended | CallStatus::Failed(_)) {
                return status;
            }
            if self.status_rx.changed().await.is_err() {
                return *self.status_rx.borrow();
            }
        }
    }
}

/// One call from initiation to teardown. The session task exclusively owns
/// the negotiation object; every signaling event and connection callback is
/// funneled into its single event loop.
pub struct CallSession {
    ctx: SessionContext,
    transport: Arc<dyn SignalingTransport>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    connection: Option<CallConnection>,
    conn_event_tx: mpsc::Sender<ConnectionEvent>,
    conn_event_rx: mpsc::Receiver<ConnectionEvent>,
    cmd_rx: mpsc::Receiver<SessionCommand>,
    status_tx: watch::Sender<CallStatus>,
    track_tx: mpsc::UnboundedSender<Arc<TrackRemote>>,
    state: CallState,
    role: Option<CallRole>,
    local_offer: Option<String>,
}

impl CallSession {
    /// Spawn the session task. The returned handle is the only way the
    /// hosting UI interacts with the call.
    pub fn start(
        transport: Arc<dyn SignalingTransport>,
        transport_rx: mpsc::Receiver<TransportEvent>,
        ctx: SessionContext,
        media: Arc<dyn MediaSource>,
        settings: RtcSettings,
    ) -> CallHandle {
        let (conn_event_tx, conn_event_rx) = mpsc::channel(CONNECTION_EVENT_QUEUE);
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (status_tx, status_rx) = watch::channel(CallStatus::Connecting);
        let (track_tx, track_rx) = mpsc::unbounded_channel();

        let session = Self {
            ctx,
            transport,
            transport_rx,
            connection: None,
            conn_event_tx,
            conn_event_rx,
            cmd_rx,
            status_tx,
            track_tx,
            state: CallState::Idle,
            role: None,
            local_offer: None,
        };

        tokio::spawn(session.run(media, settings));

        CallHandle {
            status_rx,
            track_rx,
            cmd_tx,
        }
    }

    async fn run(mut self, media: Arc<dyn MediaSource>, settings: RtcSettings) {
        self.set_state(CallState::Initializing);

        match CallConnection::new(media.as_ref(), &settings, self.conn_event_tx.clone()).await {
            Ok(connection) => self.connection = Some(connection),
            Err(e) => {
                error!("Failed to initialize call media: {}", e);
                self.fail(CallFailure::Media).await;
                return;
            }
        }

        if let Err(e) = self
            .transport
            .send(SignalMessage::Join {
                room: self.ctx.room.clone(),
            })
            .await
        {
            error!("Failed to join room '{}': {}", self.ctx.room, e);
            self.fail(CallFailure::TransportDisconnect).await;
            return;
        }

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    // Закрытие канала команд означает уход хоста с экрана
                    // звонка; путь освобождения тот же, что и при явном end.
                    match cmd {
                        Some(SessionCommand::End) | None => {
                            self.end_call().await;
                            break;
                        }
                    }
                }

                event = self.transport_rx.recv() => {
                    match event {
                        Some(TransportEvent::Signal(signal)) => {
                            if self.handle_server_event(signal).await {
                                break;
                            }
                        }
                        Some(TransportEvent::Disconnected) | None => {
                            warn!("Signaling transport lost");
                            self.fail(CallFailure::TransportDisconnect).await;
                            break;
                        }
                    }
                }

                event = self.conn_event_rx.recv() => {
                    if let Some(event) = event {
                        if self.handle_connection_event(event).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    /// Returns `true` when the session reached a terminal state.
    async fn handle_server_event(&mut self, event: ServerEvent) -> bool {
        if self.state.is_terminal() {
            return true;
        }

        match event {
            ServerEvent::Joined { role, peer_present } => {
                info!("Joined room '{}' as {:?}", self.ctx.room, role);
                self.role = Some(role);
                match role {
                    CallRole::Caller => {
                        self.set_state(CallState::AwaitingAnswer);
                        if peer_present {
                            self.send_offer().await;
                        }
                    }
                    CallRole::Callee => self.set_state(CallState::AwaitingOffer),
                }
            }

            ServerEvent::JoinRejected { reason } => {
                warn!("Relay rejected join into '{}': {:?}", self.ctx.room, reason);
                let failure = match reason {
                    RejectReason::RoomFull => CallFailure::RoomFull,
                    RejectReason::RoomUnavailable => CallFailure::Negotiation,
                };
                self.fail(failure).await;
                return true;
            }

            ServerEvent::PeerJoined { peer } => {
                debug!("Peer {:?} joined room '{}'", peer, self.ctx.room);
                // Relay роняет offer, отправленный до входа второй стороны;
                // это сигнал повторить его.
                if self.role == Some(CallRole::Caller) {
                    self.send_offer().await;
                }
            }

            ServerEvent::Offer { sdp } => {
                if self.role != Some(CallRole::Callee) {
                    warn!("Unexpected offer for role {:?}, dropping", self.role);
                    return false;
                }
                let Some(connection) = &self.connection else {
                    return false;
                };

                match connection.handle_offer(sdp).await {
                    Ok(answer) => {
                        if let Err(e) = self
                            .transport
                            .send(SignalMessage::Answer {
                                room: self.ctx.room.clone(),
                                sdp: answer,
                            })
                            .await
                        {
                            warn!("Failed to send answer: {}", e);
                        }
                    }
                    // Единичный сбой согласования не рвёт звонок: сообщение
                    // могло просто продублироваться.
                    Err(e) => warn!("Failed to apply offer: {}", e),
                }
            }

            ServerEvent::Answer { sdp } => {
                if self.role != Some(CallRole::Caller) {
                    warn!("Unexpected answer for role {:?}, dropping", self.role);
                    return false;
                }
                let Some(connection) = &self.connection else {
                    return false;
                };

                match connection.handle_answer(sdp).await {
                    Ok(true) => debug!("Remote answer applied"),
                    Ok(false) => debug!("Duplicate answer ignored"),
                    Err(e) => warn!("Failed to apply answer: {}", e),
                }
            }

            ServerEvent::IceCandidate { candidate } => {
                if let Some(connection) = &self.connection {
                    connection.add_ice_candidate(&candidate).await;
                }
            }

            ServerEvent::CallEnded => {
                info!("Call in room '{}' ended by peer", self.ctx.room);
                self.shutdown(CallState::Ended).await;
                return true;
            }
        }

        false
    }

    async fn handle_connection_event(&mut self, event: ConnectionEvent) -> bool {
        if self.state.is_terminal() {
            return true;
        }

        match event {
            ConnectionEvent::CandidateGenerated(candidate) => {
                if let Err(e) = self
                    .transport
                    .send(SignalMessage::IceCandidate {
                        room: self.ctx.room.clone(),
                        candidate,
                    })
                    .await
                {
                    warn!("Failed to send ICE candidate: {}", e);
                }
            }

            ConnectionEvent::TrackArrived(track) => {
                info!("Remote audio attached for room '{}'", self.ctx.room);
                let _ = self.track_tx.send(track);
            }

            ConnectionEvent::StateChanged(state) => match state {
                RTCPeerConnectionState::Connected => {
                    self.set_state(CallState::Connected);
                }
                RTCPeerConnectionState::Failed
                | RTCPeerConnectionState::Disconnected
                | RTCPeerConnectionState::Closed => {
                    warn!("Peer connection lost: {:?}", state);
                    self.fail(CallFailure::Negotiation).await;
                    return true;
                }
                _ => {}
            },
        }

        false
    }

    async fn send_offer(&mut self) {
        let Some(connection) = &self.connection else {
            return;
        };

        // Повтор offer шлёт то же локальное описание: второй create_offer
        // на той же сессии считается ошибкой протокола.
        let sdp = match &self.local_offer {
            Some(sdp) => sdp.clone(),
            None => match connection.create_offer().await {
                Ok(sdp) => {
                    self.local_offer = Some(sdp.clone());
                    sdp
                }
                Err(e) => {
                    error!("Failed to create offer: {}", e);
                    self.fail(CallFailure::Negotiation).await;
                    return;
                }
            },
        };

        if let Err(e) = self
            .transport
            .send(SignalMessage::Offer {
                room: self.ctx.room.clone(),
                sdp,
            })
            .await
        {
            warn!("Failed to send offer: {}", e);
        }
    }

    /// User-initiated end: emit the end signal, tear down, publish. Each
    /// step runs even when an earlier one fails, so the hosting UI never
    /// sees a stuck call indicator.
    async fn end_call(&mut self) {
        if self.state.is_terminal() {
            return;
        }

        info!("Ending call in room '{}'", self.ctx.room);
        if let Err(e) = self
            .transport
            .send(SignalMessage::End {
                room: self.ctx.room.clone(),
            })
            .await
        {
            warn!("Failed to send end signal: {}", e);
        }

        self.shutdown(CallState::Ended).await;
    }

    async fn fail(&mut self, failure: CallFailure) {
        if self.state.is_terminal() {
            return;
        }
        self.shutdown(CallState::Failed(failure)).await;
    }

    async fn shutdown(&mut self, terminal: CallState) {
        if let Some(connection) = self.connection.take() {
            connection.close().await;
        }
        self.set_state(terminal);
    }

    fn set_state(&mut self, next: CallState) {
        if self.state == next {
            return;
        }
        debug!("Call state: {:?} -> {:?}", self.state, next);
        self.state = next;
        self.status_tx.send_replace(next.status());
    }
}
