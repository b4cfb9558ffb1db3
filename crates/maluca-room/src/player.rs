//! A seated player and their per-game state.

use maluca_protocol::{PlayerId, PlayerView};

use crate::EventCard;

/// One player in a room.
///
/// Created on join, dropped on leave. Never moves between rooms.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: PlayerId,
    /// Display name. Not unique.
    pub name: String,
    /// Index into the board. Always `< board.len()` while a game runs.
    pub position: usize,
    /// Assigned recipe, drawn at game start.
    pub flavor: Option<String>,
    /// Collected tokens, in pickup order, no duplicates.
    pub ingredients: Vec<String>,
    /// A drawn card awaiting confirmation. Blocks rolling while set.
    pub pending_card: Option<EventCard>,
}

impl Player {
    pub fn new(id: PlayerId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            position: 0,
            flavor: None,
            ingredients: Vec::new(),
            pending_card: None,
        }
    }

    /// Adds `token` unless it is already held. Returns `true` if added.
    pub fn collect(&mut self, token: &str) -> bool {
        if self.holds(token) {
            return false;
        }
        self.ingredients.push(token.to_string());
        true
    }

    pub fn holds(&self, token: &str) -> bool {
        self.ingredients.iter().any(|held| held == token)
    }

    pub fn holds_all(&self, required: &[String]) -> bool {
        required.iter().all(|token| self.holds(token))
    }

    /// Moves `steps` cells (negative = backwards) on a circular track.
    pub fn advance(&mut self, steps: i64, board_len: usize) {
        if board_len == 0 {
            return;
        }
        let len = board_len as i64;
        self.position = (self.position as i64 + steps).rem_euclid(len) as usize;
    }

    /// Back to the start line with an empty hand. Keeps the flavor.
    pub fn reset(&mut self) {
        self.position = 0;
        self.ingredients.clear();
        self.pending_card = None;
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            id: self.id.clone(),
            name: self.name.clone(),
            position: self.position,
            flavor: self.flavor.clone(),
            ingredients: self.ingredients.clone(),
            has_pending_card: self.pending_card.is_some(),
        }
    }
}
