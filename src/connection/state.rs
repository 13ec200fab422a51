//! Connection lifecycle states

use serde::{Deserialize, Serialize};

/// Lifecycle state of one conversation connection
///
/// `Idle -(open)-> Connecting -(handshake ok)-> Open -(transport error)->
/// Reconnecting -(handshake ok)-> Open; Open -(explicit close)-> Closing ->
/// Closed`. `Closed` is terminal per instance; a new `open` constructs a
/// fresh link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    /// No connection attempt has started
    Idle,
    /// Handshake in progress
    Connecting,
    /// Connected and authenticated
    Open,
    /// Transport failed; retrying with backoff
    Reconnecting,
    /// Explicit close in progress
    Closing,
    /// Terminal: the link is gone
    Closed,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Reconnecting => "reconnecting",
            Self::Closing => "closing",
            Self::Closed => "closed",
        };
        f.write_str(name)
    }
}
