//! Error types for the DoctorQ inbox SDK

use thiserror::Error;

/// Main error type for the inbox SDK
#[derive(Error, Debug)]
pub enum InboxError {
    /// Connection error while establishing or maintaining the socket
    #[error("Connection error: {0}")]
    Connection(String),

    /// Transport layer error (send/receive on an established socket)
    #[error("Transport error: {0}")]
    Transport(String),

    /// REST API request returned a non-success status
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code returned by the backend
        status: u16,
        /// Response body or status text
        message: String,
    },

    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON decode error when parsing backend payloads
    #[error("JSON decode error: {0}")]
    JsonDecode(#[from] serde_json::Error),

    /// Wire frame could not be parsed, with optional raw data
    #[error("Frame parse error: {message}")]
    FrameParse {
        /// Error message
        message: String,
        /// Raw frame data that failed to parse
        data: Option<serde_json::Value>,
    },

    /// I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Timeout error
    #[error("Timeout: {0}")]
    Timeout(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Session command channel closed (session task has shut down)
    #[error("Session closed: {0}")]
    SessionClosed(String),

    /// No conversation is currently selected
    #[error("No conversation selected")]
    NoSelection,
}

/// Result type alias for inbox SDK operations
pub type Result<T> = std::result::Result<T, InboxError>;

impl InboxError {
    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create an API error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Create a frame parse error
    pub fn frame_parse(msg: impl Into<String>, data: Option<serde_json::Value>) -> Self {
        Self::FrameParse {
            message: msg.into(),
            data,
        }
    }

    /// Create a timeout error
    pub fn timeout(msg: impl Into<String>) -> Self {
        Self::Timeout(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a session closed error
    pub fn session_closed(msg: impl Into<String>) -> Self {
        Self::SessionClosed(msg.into())
    }
}
