use crate::model::peer::PeerId;
use crate::model::role::CallRole;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};

/// Client → relay messages. Every routable message carries the room id so the
/// relay can route without inspecting the payload; `sdp` and `candidate` are
/// opaque strings to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum SignalMessage {
    Join {
        room: RoomId,
    },
    Leave {
        room: RoomId,
    },
    Offer {
        room: RoomId,
        sdp: String,
    },
    Answer {
        room: RoomId,
        sdp: String,
    },
    IceCandidate {
        room: RoomId,
        candidate: String,
    },
    End {
        room: RoomId,
    },
}

impl SignalMessage {
    pub fn room(&self) -> &RoomId {
        match self {
            SignalMessage::Join { room }
            | SignalMessage::Leave { room }
            | SignalMessage::Offer { room, .. }
            | SignalMessage::Answer { room, .. }
            | SignalMessage::IceCandidate { room, .. }
            | SignalMessage::End { room } => room,
        }
    }
}

/// Relay → client events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Join acknowledgement. `peer_present` tells a caller whether the callee
    /// is already in the room; otherwise the offer waits for `PeerJoined`.
    Joined {
        role: CallRole,
        peer_present: bool,
    },
    JoinRejected {
        reason: RejectReason,
    },
    PeerJoined {
        peer: PeerId,
    },
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    IceCandidate {
        candidate: String,
    },
    CallEnded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum RejectReason {
    RoomFull,
    RoomUnavailable,
}
