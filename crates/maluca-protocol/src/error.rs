//! Error types for the protocol layer.
//!
//! Each Maluca crate defines its own error enum. A `ProtocolError` always
//! means a serialization problem at the boundary, never a rule violation
//! inside a room.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a Rust value into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a Rust value).
    ///
    /// Common causes: malformed JSON, an unknown event `type`, or a
    /// missing field such as `room`.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The frame decoded but is not a valid event.
    #[error("invalid message: {0}")]
    InvalidMessage(String),
}
