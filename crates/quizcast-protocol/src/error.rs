//! Error types for the protocol layer.
//!
//! Each Quizcast crate defines its own error enum; a `ProtocolError` always
//! means the problem is in serialization or event framing, not in
//! networking or room logic.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust type into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed — malformed JSON, an unknown event tag, or
    /// missing required fields.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The event decoded but is invalid at the protocol level (e.g. a room
    /// code that doesn't match the code shape).
    #[error("invalid event: {0}")]
    InvalidEvent(String),
}
