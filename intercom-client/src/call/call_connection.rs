use crate::error::CallError;
use crate::media::{LocalAudio, MediaSource};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;
use webrtc::track::track_remote::TrackRemote;

/// ICE configuration handed to the peer connection. The relay never dials
/// these servers itself.
#[derive(Clone)]
pub struct RtcSettings {
    pub ice_servers: Vec<String>,
}

impl Default for RtcSettings {
    fn default() -> Self {
        Self {
            ice_servers: vec!["stun:stun.l.google.com:19302".to_owned()],
        }
    }
}

/// Events the negotiation object pushes back to the session loop. The
/// session is the only consumer; nothing is mutated from a callback.
#[derive(Debug)]
pub enum ConnectionEvent {
    CandidateGenerated(String),
    TrackArrived(Arc<TrackRemote>),
    StateChanged(RTCPeerConnectionState),
}

/// Owns the one peer connection of a call session and drives it through the
/// offer/answer/candidate exchange without leaking resources on any exit
/// path.
pub struct CallConnection {
    peer_connection: Arc<RTCPeerConnection>,
    local_audio: Mutex<Option<LocalAudio>>,
    closed: AtomicBool,
}

impl CallConnection {
    /// Acquires local audio, builds the peer connection and wires its
    /// callbacks into `event_tx`. Capture failure surfaces as
    /// [`CallError::Media`] before any connection state exists.
    pub async fn new(
        media: &dyn MediaSource,
        settings: &RtcSettings,
        event_tx: mpsc::Sender<ConnectionEvent>,
    ) -> Result<Self, CallError> {
        let local_audio = media.acquire().await?;

        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = if settings.ice_servers.is_empty() {
            vec![]
        } else {
            vec![RTCIceServer {
                urls: settings.ice_servers.clone(),
                ..Default::default()
            }]
        };

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        let state_tx = event_tx.clone();
        peer_connection.on_peer_connection_state_change(Box::new(
            move |state: RTCPeerConnectionState| {
                let tx = state_tx.clone();
                Box::pin(async move {
                    debug!("Peer connection state changed: {:?}", state);
                    let _ = tx.send(ConnectionEvent::StateChanged(state)).await;
                })
            },
        ));

        // Trickle ICE: каждый локальный кандидат сразу уходит в сигналинг.
        let ice_tx = event_tx.clone();
        peer_connection.on_ice_candidate(Box::new(move |candidate: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else { return };
                let Ok(json_candidate) = candidate.to_json() else {
                    return;
                };
                let Ok(serialized) = serde_json::to_string(&json_candidate) else {
                    return;
                };
                let _ = tx.send(ConnectionEvent::CandidateGenerated(serialized)).await;
            })
        }));

        let track_tx = event_tx.clone();
        peer_connection.on_track(Box::new(move |track, _receiver, _transceiver| {
            let tx = track_tx.clone();
            Box::pin(async move {
                let _ = tx.send(ConnectionEvent::TrackArrived(track)).await;
            })
        }));

        peer_connection
            .add_track(local_audio.track() as Arc<dyn TrackLocal + Send + Sync>)
            .await?;

        Ok(Self {
            peer_connection,
            local_audio: Mutex::new(Some(local_audio)),
            closed: AtomicBool::new(false),
        })
    }

    /// Caller-only. A second call on the same session is protocol misuse
    /// and is reported, not silently ignored.
    pub async fn create_offer(&self) -> Result<String, CallError> {
        if self.peer_connection.local_description().await.is_some() {
            return Err(CallError::NegotiationState(
                "offer already created for this session",
            ));
        }

        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        Ok(offer.sdp)
    }

    /// Callee-only: apply the remote offer and produce the local answer.
    pub async fn handle_offer(&self, sdp: String) -> Result<String, CallError> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.peer_connection.set_remote_description(offer).await?;

        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        Ok(answer.sdp)
    }

    /// Caller-only. Applies the remote description only if none is set yet;
    /// a duplicate or late answer returns `false` and mutates nothing.
    pub async fn handle_answer(&self, sdp: String) -> Result<bool, CallError> {
        if self.peer_connection.remote_description().await.is_some() {
            debug!("Remote description already set, ignoring duplicate answer");
            return Ok(false);
        }

        let answer = RTCSessionDescription::answer(sdp)?;
        self.peer_connection.set_remote_description(answer).await?;
        Ok(true)
    }

    /// Candidate races are expected: failures here are logged and swallowed,
    /// never fatal to the call.
    pub async fn add_ice_candidate(&self, candidate_json: &str) {
        let candidate: RTCIceCandidateInit = match serde_json::from_str(candidate_json) {
            Ok(candidate) => candidate,
            Err(e) => {
                warn!("Failed to parse ICE candidate: {}", e);
                return;
            }
        };

        if let Err(e) = self.peer_connection.add_ice_candidate(candidate).await {
            warn!("Failed to add ICE candidate: {}", e);
        }
    }

    /// Idempotent teardown: stops local capture and closes the peer
    /// connection. Release errors are logged, never re-raised.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }

        let local_audio = self.local_audio.lock().ok().and_then(|mut slot| slot.take());
        drop(local_audio);

        if let Err(e) = self.peer_connection.close().await {
            warn!("Error closing peer connection: {}", e);
        }
    }
}
