use serde::{Deserialize, Serialize};

/// Role inside a two-party room, assigned by the relay on join:
/// the first participant becomes the caller, the second the callee.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum CallRole {
    Caller,
    Callee,
}
