//! Relay side of the voice-call subsystem: a signaling router that brokers
//! offer/answer/candidate exchange between the two participants of a room.
//! The relay owns no media; SDP and ICE payloads pass through verbatim.
//!
//! Routing guarantees:
//! - at most two participants per room, roles assigned by join order;
//! - per-sender ordering is preserved inside a room (each room is a single
//!   actor task draining one mailbox);
//! - no cross-room delivery, and nothing is forwarded on behalf of a
//!   participant that has already been removed;
//! - signaling sent while the peer slot is empty is dropped, the caller
//!   retries when the `peer-joined` notification arrives.

mod error;
pub mod room;
pub mod signaling;

pub use error::RelayError;
pub use room::{CallSignal, JoinAck, RoomCommand, RoomRouter};
pub use signaling::{AppState, SignalingOutput, SignalingService, ws_handler};
