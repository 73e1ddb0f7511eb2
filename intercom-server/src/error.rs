use intercom_core::{RejectReason, RoomId};
use thiserror::Error;

/// Errors the relay reports back to a joining client.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Room already holds two participants; the set is left unchanged.
    #[error("room '{0}' already has two participants")]
    RoomFull(RoomId),

    /// The room actor went away while the join was in flight and could not
    /// be recreated.
    #[error("room '{0}' is unavailable")]
    RoomUnavailable(RoomId),
}

impl RelayError {
    pub fn reject_reason(&self) -> RejectReason {
        match self {
            RelayError::RoomFull(_) => RejectReason::RoomFull,
            RelayError::RoomUnavailable(_) => RejectReason::RoomUnavailable,
        }
    }
}
