use crate::media::MediaAcquisitionError;
use thiserror::Error;

/// Failures of the peer-connection manager. Only media acquisition and room
/// capacity are surfaced to the user; everything else is recovered or
/// logged locally by the session.
#[derive(Debug, Error)]
pub enum CallError {
    #[error(transparent)]
    Media(#[from] MediaAcquisitionError),

    #[error("negotiation out of order: {0}")]
    NegotiationState(&'static str),

    #[error("webrtc failure: {0}")]
    Rtc(#[from] webrtc::Error),
}
