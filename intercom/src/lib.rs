pub use intercom_core::model::{PeerId, RoomId};

pub mod model {
    pub use intercom_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use intercom_server::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use intercom_client::*;
}
