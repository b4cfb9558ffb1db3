//! Core protocol types: identities, board tiles, snapshots and the two
//! event enums that cross the gateway boundary.
//!
//! Everything here is plain data. Rules live in `maluca-room`.

use serde::{Deserialize, Serialize};

use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A session-stable, opaque player identifier.
///
/// Newtype over `String` so a player id can never be passed where a room
/// name is expected. `#[serde(transparent)]` keeps the JSON form a plain
/// string: `PlayerId("p1")` is `"p1"` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// The unique name of a room. Assigned by whoever joins first, never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomName(pub String);

impl RoomName {
    /// Returns `true` if the name is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for RoomName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RoomName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RoomName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// Recipient
// ---------------------------------------------------------------------------

/// Who inside a room should receive a server event.
///
/// Room operations return `(Recipient, ServerEvent)` pairs and the room
/// actor fans them out to the matching sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recipient {
    /// Every player seated in the room.
    All,

    /// One specific player (e.g. the drawer of an event card).
    Player(PlayerId),
}

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

/// The kind of a cell on the circular track.
///
/// The Finish cell is not a kind of its own: it is an index overlaid on
/// whatever kind sits there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileKind {
    /// Nothing happens; the turn passes.
    Plain,
    /// Draw one ingredient token.
    Ingredient,
    /// Draw one event card, to be confirmed later.
    Event,
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain => write!(f, "Plain"),
            Self::Ingredient => write!(f, "Ingredient"),
            Self::Event => write!(f, "Event"),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// One player as seen by every session in the room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub name: String,
    pub position: usize,
    /// Assigned recipe. `None` until the game starts.
    pub flavor: Option<String>,
    /// Collected tokens in pickup order, no duplicates.
    pub ingredients: Vec<String>,
    /// Whether the player holds an unconfirmed event card.
    pub has_pending_card: bool,
}

/// The full, broadcastable state of one room.
///
/// Sent as [`ServerEvent::RoomState`] after every accepted mutation.
/// `last_roll` and `last_ingredient` are display hints for the latest
/// roll only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room: RoomName,
    /// Seating order, which is also turn order.
    pub players: Vec<PlayerView>,
    pub started: bool,
    pub turn_counter: u64,
    /// `players[turn_counter % players.len()]`, precomputed for clients.
    pub current_player: Option<PlayerId>,
    /// Empty while the room is in the lobby.
    pub board: Vec<TileKind>,
    pub finish_index: usize,
    pub winner: Option<PlayerId>,
    pub last_roll: Option<u8>,
    pub last_ingredient: Option<String>,
}

// ---------------------------------------------------------------------------
// ClientEvent: session → core
// ---------------------------------------------------------------------------

/// An event a session sends to the core.
///
/// The sending player's id is not part of the frame: the gateway knows
/// which session a frame came from. Disconnects are a transport
/// condition, reported through `Gateway::disconnect`, not a frame.
///
/// Internally tagged, so a roll looks like
/// `{ "type": "RollDice", "room": "R1" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientEvent {
    /// "Show me the room directory."
    ListRooms,

    /// "Seat me in this room under this display name." Creates the room
    /// if the name is unknown.
    Join { room: RoomName, name: String },

    /// "Take me out of this room."
    Leave { room: RoomName },

    /// "Deal flavors and start the game."
    Start { room: RoomName },

    /// "Roll the dice for my turn."
    RollDice { room: RoomName },

    /// "I've read my event card, apply it."
    ConfirmCard { room: RoomName },

    /// "Send everyone back to the lobby."
    Restart { room: RoomName },
}

// ---------------------------------------------------------------------------
// ServerEvent: core → sessions
// ---------------------------------------------------------------------------

/// Why a join was refused. Sent only to the requesting session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinErrorReason {
    RoomFull,
    MissingName,
    MissingRoom,
    GameInProgress,
}

impl fmt::Display for JoinErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomFull => write!(f, "room is full"),
            Self::MissingName => write!(f, "a display name is required"),
            Self::MissingRoom => write!(f, "a room name is required"),
            Self::GameInProgress => write!(f, "game already in progress"),
        }
    }
}

/// A notification the core sends to sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// The room directory, in creation order. Broadcast to every session
    /// when a room appears or disappears, and sent as the reply to
    /// [`ClientEvent::ListRooms`].
    RoomList { rooms: Vec<RoomName> },

    /// Sent to the joining session once it is seated.
    Joined {
        room: RoomName,
        player_id: PlayerId,
        name: String,
    },

    /// Full state after an accepted mutation.
    RoomState(RoomSnapshot),

    /// Sent only to the player who drew the card.
    CardDrawn { room: RoomName, description: String },

    /// Terminal: someone completed their recipe on the Finish tile.
    GameOver {
        room: RoomName,
        winner: PlayerId,
        name: String,
        ingredients: Vec<String>,
    },

    /// The room went back to the lobby. Clients should leave the board
    /// view.
    RoomRestarted { room: RoomName },

    /// A join was refused.
    JoinError { reason: JoinErrorReason },
}

// =========================================================================
// Tests
// =========================================================================
