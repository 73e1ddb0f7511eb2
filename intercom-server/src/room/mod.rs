mod room;
mod room_command;
mod room_router;

pub use room_command::*;
pub use room_router::*;
