//! Error types for the room layer.

use maluca_protocol::{JoinErrorReason, PlayerId, RoomName};

/// Errors that can occur during room operations.
///
/// Only some of these are reported back to a client. Turn-order and
/// card-state violations are expected from stale clients retrying an
/// action, so the gateway drops them after a debug log
/// (see [`RoomError::is_silent`]).
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// No room with this name exists.
    #[error("room {0} not found")]
    NotFound(RoomName),

    /// Every seat is taken.
    #[error("room {0} is full")]
    RoomFull(RoomName),

    /// The game is running and the joining id is not seated.
    #[error("room {0} already has a game in progress")]
    GameInProgress(RoomName),

    /// Join without a display name.
    #[error("a display name is required")]
    MissingName,

    /// Join without a room name.
    #[error("a room name is required")]
    MissingRoom,

    /// The player is not seated in this room.
    #[error("player {0} not in room {1}")]
    NotInRoom(PlayerId, RoomName),

    /// Someone other than the current actor tried to act.
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The current actor must confirm their card before rolling again.
    #[error("player {0} has an unconfirmed event card")]
    CardPending(PlayerId),

    /// Confirmation without a drawn card.
    #[error("player {0} has no event card to confirm")]
    NoPendingCard(PlayerId),

    /// The room is still in the lobby.
    #[error("room {0} has not started")]
    GameNotStarted(RoomName),

    /// The room has a winner; only restart or start are accepted.
    #[error("room {0} already has a winner")]
    GameOver(RoomName),

    /// Start requested while a game is running.
    #[error("room {0} is already running")]
    AlreadyStarted(RoomName),

    /// Start requested with too few seated players.
    #[error("room {room} needs {need} players to start, has {have}")]
    NotEnoughPlayers {
        room: RoomName,
        have: usize,
        need: usize,
    },

    /// A room config or catalog failed validation.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The room's mailbox is closed; it has been removed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomName),
}

impl RoomError {
    /// Returns `true` for errors that are dropped without telling the
    /// client anything.
    pub fn is_silent(&self) -> bool {
        matches!(
            self,
            Self::NotInRoom(..)
                | Self::NotYourTurn(_)
                | Self::CardPending(_)
                | Self::NoPendingCard(_)
                | Self::GameNotStarted(_)
                | Self::GameOver(_)
                | Self::AlreadyStarted(_)
                | Self::NotEnoughPlayers { .. }
        )
    }

    /// Maps join failures to the reason reported to the joining session.
    pub fn join_reason(&self) -> Option<JoinErrorReason> {
        match self {
            Self::RoomFull(_) => Some(JoinErrorReason::RoomFull),
            Self::GameInProgress(_) => Some(JoinErrorReason::GameInProgress),
            Self::MissingName => Some(JoinErrorReason::MissingName),
            Self::MissingRoom => Some(JoinErrorReason::MissingRoom),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_errors_are_silent() {
        assert!(RoomError::NotYourTurn(PlayerId::from("p2")).is_silent());
        assert!(RoomError::NoPendingCard(PlayerId::from("p1")).is_silent());
        assert!(RoomError::GameNotStarted(RoomName::from("R1")).is_silent());
    }

    #[test]
    fn test_join_errors_are_reported() {
        let full = RoomError::RoomFull(RoomName::from("R1"));
        assert!(!full.is_silent());
        assert_eq!(full.join_reason(), Some(JoinErrorReason::RoomFull));
        assert_eq!(
            RoomError::MissingName.join_reason(),
            Some(JoinErrorReason::MissingName)
        );
        assert_eq!(RoomError::Unavailable(RoomName::from("R1")).join_reason(), None);
    }

    #[test]
    fn test_not_enough_players_message() {
        let err = RoomError::NotEnoughPlayers {
            room: RoomName::from("R1"),
            have: 1,
            need: 2,
        };
        assert_eq!(err.to_string(), "room R1 needs 2 players to start, has 1");
    }
}
