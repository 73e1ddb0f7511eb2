mod media_source;
mod silent_source;

pub use media_source::*;
pub use silent_source::*;
