//! Event cards and their effects.

use serde::{Deserialize, Serialize};

use crate::Player;

/// What a confirmed event card does to the player who drew it.
///
/// A closed set: every effect is data, interpreted by [`CardEffect::apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum CardEffect {
    /// Move along the track. Negative deltas move backwards. Wraps in
    /// both directions.
    MoveRelative { delta: i32 },
    /// Lose the most recently collected ingredient.
    DropLastIngredient,
    /// Lose every ingredient.
    DropAllIngredients,
}

impl CardEffect {
    /// Applies the effect to `player` on a board of `board_len` cells.
    pub fn apply(&self, player: &mut Player, board_len: usize) {
        match self {
            Self::MoveRelative { delta } => {
                player.advance(i64::from(*delta), board_len);
            }
            Self::DropLastIngredient => {
                player.ingredients.pop();
            }
            Self::DropAllIngredients => {
                player.ingredients.clear();
            }
        }
    }
}

/// One card of the event deck.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventCard {
    /// Text shown to the drawing player.
    pub description: String,
    pub effect: CardEffect,
    /// Relative draw weight. Need not sum to 1 across the deck.
    pub weight: f64,
}

impl EventCard {
    pub fn new(description: &str, effect: CardEffect, weight: f64) -> Self {
        Self {
            description: description.to_string(),
            effect,
            weight,
        }
    }
}
