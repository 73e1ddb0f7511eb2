//! Client side of the voice-call subsystem: the signaling transport, the
//! peer-connection manager and the call session state machine a hosting UI
//! binds to.
//!
//! One call is one [`CallSession`]. The session task is the only owner of
//! the underlying peer connection; `webrtc` callbacks talk to it through
//! channels, so teardown deterministically cancels everything they could
//! still emit. The hosting UI observes [`CallStatus`] through a watch
//! channel, receives the remote audio track when it arrives, and ends the
//! call through the [`CallHandle`] (dropping the handle tears down too).

pub mod call;
mod error;
pub mod media;
pub mod transport;

pub use call::{
    CallConnection, CallFailure, CallHandle, CallSession, CallState, CallStatus, ConnectionEvent,
    RtcSettings, SessionContext,
};
pub use error::CallError;
pub use media::{LocalAudio, MediaAcquisitionError, MediaSource, SilentAudioSource};
pub use transport::{SignalingTransport, TransportError, TransportEvent, WsTransport};
