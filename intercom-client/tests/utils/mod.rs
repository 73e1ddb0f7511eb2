
pub use mock_transport::*;
pub use relay::*;
pub use session_helpers::*;
