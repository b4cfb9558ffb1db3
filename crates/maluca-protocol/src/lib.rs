//! Boundary protocol for Maluca.
//!
//! This crate defines everything that crosses the line between the game
//! core and the session gateway:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomSnapshot`],
//!   [`Recipient`], etc.): the events a session sends in and the
//!   notifications the core sends out.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes by whatever transport embeds the core.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! ```text
//! Transport (bytes) → Protocol (ClientEvent) → Gateway → Room actor
//! Room actor → (Recipient, ServerEvent) → Gateway sessions → Transport
//! ```
//!
//! The protocol layer knows nothing about rooms or rules. It only knows
//! the shapes of the messages.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientEvent, JoinErrorReason, PlayerId, PlayerView, Recipient,
    RoomName, RoomSnapshot, ServerEvent, TileKind,
};
