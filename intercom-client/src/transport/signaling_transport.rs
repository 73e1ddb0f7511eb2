use async_trait::async_trait;
use intercom_core::{ServerEvent, SignalMessage};
use thiserror::Error;

/// Outbound half of the signaling channel. The inbound half is the
/// [`TransportEvent`] receiver handed out when the transport is connected;
/// the call session owns that receiver for the life of the call.
#[async_trait]
pub trait SignalingTransport: Send + Sync {
    async fn send(&self, msg: SignalMessage) -> Result<(), TransportError>;
}

#[derive(Debug)]
pub enum TransportEvent {
    Signal(ServerEvent),
    /// The connection to the relay is gone. Emitted exactly once; the
    /// session treats it as an implicit end of the call.
    Disconnected,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to connect to signaling server: {0}")]
    Connect(String),

    #[error("signaling connection closed")]
    Closed,

    #[error("failed to encode signal: {0}")]
    Encode(#[from] serde_json::Error),
}
