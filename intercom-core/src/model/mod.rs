mod peer;
mod role;
mod room;
mod signaling;

pub use peer::PeerId;
pub use role::CallRole;
pub use room::RoomId;
pub use signaling::{RejectReason, ServerEvent, SignalMessage};
