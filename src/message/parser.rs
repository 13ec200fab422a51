//! Frame parser for conversation socket payloads

use crate::error::{InboxError, Result};
use crate::types::frames::Frame;

/// Parse a JSON value into a typed Frame
///
/// # Arguments
/// * `data` - Raw JSON value read off the socket
///
/// # Returns
/// Parsed Frame or error
///
/// # Errors
/// Returns `InboxError::FrameParse` if the JSON is not one of the two
/// supported frame kinds (`message`, `typing`)
pub fn parse_frame(data: serde_json::Value) -> Result<Frame> {
    serde_json::from_value(data.clone())
        .map_err(|e| InboxError::frame_parse(format!("Failed to parse frame: {e}"), Some(data)))
}

/// Parse a raw socket text payload into a typed Frame
///
/// # Errors
/// Returns `InboxError::FrameParse` if the payload is not valid JSON or not a
/// supported frame kind
pub fn parse_frame_str(payload: &str) -> Result<Frame> {
    let value: serde_json::Value = serde_json::from_str(payload)
        .map_err(|e| InboxError::frame_parse(format!("Invalid frame JSON: {e}"), None))?;
    parse_frame(value)
}
