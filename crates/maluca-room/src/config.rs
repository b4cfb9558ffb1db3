//! Room configuration and lifecycle phases.

use serde::{Deserialize, Serialize};

use crate::RoomError;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Configuration shared by every room a registry creates.
///
/// `#[serde(default)]` lets a config file override only the fields it
/// names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Minimum seated players required to start a game.
    pub min_players: usize,

    /// Maximum seated players.
    pub max_players: usize,

    /// When set, an ingredient draw is kept only if it belongs to the
    /// player's recipe and is not already held. Otherwise every new
    /// token is kept.
    pub flavor_aware_pickup: bool,

    /// Capacity of each room actor's command mailbox.
    pub mailbox_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            min_players: 2,
            max_players: 2,
            flavor_aware_pickup: true,
            mailbox_size: 64,
        }
    }
}

impl RoomConfig {
    /// Checks the capacity bounds.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.min_players == 0 {
            return Err(RoomError::InvalidConfig(
                "min_players must be at least 1".into(),
            ));
        }
        if self.max_players < self.min_players {
            return Err(RoomError::InvalidConfig(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        if self.mailbox_size == 0 {
            return Err(RoomError::InvalidConfig(
                "mailbox_size must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// RoomPhase
// ---------------------------------------------------------------------------

/// Where a room is in its lifecycle, derived from `started` and `winner`.
///
/// ```text
/// Lobby ──start──→ InProgress ──win──→ Finished
///   ↑                  │                  │
///   └─────restart──────┴─────restart──────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomPhase {
    /// Seats open, no board.
    Lobby,
    /// Dice are rolling.
    InProgress,
    /// Someone won. Board and final positions stay visible.
    Finished,
}

impl RoomPhase {
    /// Returns `true` if new players may take a seat.
    pub fn is_joinable(&self) -> bool {
        !self.is_active()
    }

    /// Returns `true` if rolls and confirmations are accepted.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::InProgress)
    }
}

impl std::fmt::Display for RoomPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lobby => write!(f, "Lobby"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
