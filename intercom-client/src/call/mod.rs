mod call_connection;
mod call_session;
mod call_state;

pub use call_connection::*;
pub use call_session::*;
pub use call_state::*;
