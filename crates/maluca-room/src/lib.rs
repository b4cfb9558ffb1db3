//! Rooms for Maluca: the per-room game state machine and the actors and
//! registry that run many of them side by side.
//!
//! Each room runs as an isolated Tokio task (actor model) owning one
//! [`Room`]. Rooms share nothing but the read-only [`Catalog`].
//!
//! # Key types
//!
//! - [`Room`]: seating, turns, tiles, cards and win detection
//! - [`RoomHandle`]: sends commands to a running room actor
//! - [`RoomRegistry`]: creates rooms on demand, tracks memberships
//! - [`Catalog`]: board layout, recipes and the event deck
//! - [`RoomConfig`]: seat limits and pickup rule

mod actor;
mod card;
mod catalog;
mod config;
mod error;
mod player;
mod registry;
mod room;
mod selector;

pub use actor::{RoomHandle, SessionSender};
pub use card::{CardEffect, EventCard};
pub use catalog::Catalog;
pub use config::{RoomConfig, RoomPhase};
pub use error::RoomError;
pub use player::Player;
pub use registry::RoomRegistry;
pub use room::{Outcome, Room};
pub use selector::pick_weighted;
