pub mod model;

pub use model::{CallRole, PeerId, RejectReason, RoomId, ServerEvent, SignalMessage};
