/// Internal session state. Transitions are strictly forward; `Ended` and
/// `Failed` are terminal and a session is never reused after reaching them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Initializing,
    /// Caller: local offer created or pending, waiting for the answer.
    AwaitingAnswer,
    /// Callee: joined, waiting for the remote offer.
    AwaitingOffer,
    Connected,
    Ended,
    Failed(CallFailure),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallFailure {
    Media,
    RoomFull,
    Negotiation,
    TransportDisconnect,
}

/// What the hosting UI sees. Collapses the negotiation sub-states into
/// `Connecting`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Connecting,
    Connected,
    Ended,
    Failed(CallFailure),
}

impl CallState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallState::Ended | CallState::Failed(_))
    }

    pub fn status(&self) -> CallStatus {
        match self {
            CallState::Idle
            | CallState::Initializing
            | CallState::AwaitingAnswer
            | CallState::AwaitingOffer => CallStatus::Connecting,
            CallState::Connected => CallStatus::Connected,
            CallState::Ended => CallStatus::Ended,
            CallState::Failed(failure) => CallStatus::Failed(*failure),
        }
    }
}
