//! # Maluca
//!
//! Authoritative server core for Maluca, a turn-based pizza delivery board
//! game. Players race around a circular track collecting the ingredients of
//! their assigned recipe; the first to reach the Finish tile holding a
//! complete recipe wins.
//!
//! Many named rooms run side by side, each as its own actor task. The
//! [`Gateway`] is the only entry point a transport needs: it turns
//! session events into room operations and hands back the notifications
//! each session should see. The core itself never touches the network.
//!
//! ## Quick Start
//!
//! ```rust
//! use maluca::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), MalucaError> {
//! let gateway = Gateway::from_config(MalucaConfig::default(), Some(7))?;
//!
//! let alice = PlayerId::from("alice");
//! let mut events = gateway.connect(alice.clone()).await?;
//! gateway
//!     .handle_frame(&alice, br#"{"type":"Join","room":"R1","name":"Alice"}"#)
//!     .await?;
//!
//! while let Ok(event) = events.try_recv() {
//!     println!("{}", String::from_utf8_lossy(&gateway.encode(&event)?));
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod gateway;

pub use config::MalucaConfig;
pub use error::MalucaError;
pub use gateway::Gateway;

/// Everything needed to embed the core in a transport.
pub mod prelude {
    pub use crate::{Gateway, MalucaConfig, MalucaError};
    pub use maluca_protocol::{
        ClientEvent, Codec, JoinErrorReason, JsonCodec, PlayerId, PlayerView, ProtocolError,
        Recipient, RoomName, RoomSnapshot, ServerEvent, TileKind,
    };
    pub use maluca_room::{
        CardEffect, Catalog, EventCard, RoomConfig, RoomError, RoomPhase, RoomRegistry,
    };
}
