//! Codec trait and implementations for serializing boundary events.
//!
//! The game core never touches bytes. Whatever transport embeds it picks
//! a [`Codec`] to turn incoming frames into [`ClientEvent`]s and outgoing
//! [`ServerEvent`]s back into frames.
//!
//! [`JsonCodec`] is the only implementation today. It is readable in
//! browser DevTools, which is where the game's clients live.
//!
//! [`ClientEvent`]: crate::ClientEvent
//! [`ServerEvent`]: crate::ServerEvent

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Encodes values to bytes and decodes bytes back.
///
/// `Send + Sync + 'static` because the gateway shares one codec across
/// every session task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if the value cannot be represented
    /// in this format.
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or don't
    /// match the expected type.
    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use maluca_protocol::{ClientEvent, Codec, JsonCodec, RoomName};
///
/// let codec = JsonCodec;
///
/// let bytes = br#"{"type":"RollDice","room":"R1"}"#;
/// let event: ClientEvent = codec.decode(bytes).unwrap();
/// assert_eq!(event, ClientEvent::RollDice { room: RoomName::from("R1") });
///
/// let encoded = codec.encode(&event).unwrap();
/// let again: ClientEvent = codec.decode(&encoded).unwrap();
/// assert_eq!(event, again);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(
        &self,
        value: &T,
    ) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(
        &self,
        data: &[u8],
    ) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
