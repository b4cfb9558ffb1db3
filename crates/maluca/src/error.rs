//! Unified error type for Maluca.

use maluca_protocol::{PlayerId, ProtocolError};
use maluca_room::RoomError;

/// Top-level error that wraps all crate-specific errors.
///
/// Room errors produced while handling a client event are reported to the
/// client or logged, never returned; this type surfaces what the embedding
/// transport has to deal with: undecodable frames, unknown sessions and
/// bad configuration.
#[derive(Debug, thiserror::Error)]
pub enum MalucaError {
    /// A protocol-level error (encode, decode, invalid frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (bad config, room gone).
    #[error(transparent)]
    Room(#[from] RoomError),

    /// The player has no open session.
    #[error("player {0} is not connected")]
    NotConnected(PlayerId),

    /// The player already has an open session.
    #[error("player {0} is already connected")]
    AlreadyConnected(PlayerId),

    /// The config file could not be read.
    #[error("failed to read config: {0}")]
    ConfigRead(#[from] std::io::Error),

    /// The config file is not valid JSON for [`MalucaConfig`](crate::MalucaConfig).
    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] serde_json::Error),
}
