//! The static game data: track layout, recipes and the event deck.

use std::collections::BTreeMap;

use maluca_protocol::TileKind;
use serde::{Deserialize, Serialize};

use crate::{CardEffect, EventCard, Player, RoomError};

/// Board, recipes and event deck for every room of a registry.
///
/// `Default` is the standard pizzeria: a ten-cell track with the Finish on
/// the last cell, five recipes of five ingredients and a four-card deck.
/// Recipes live in a `BTreeMap` so flavor draws are reproducible under a
/// seeded generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Catalog {
    pub board: Vec<TileKind>,
    pub finish_index: usize,
    /// Flavor name → required ingredients.
    pub recipes: BTreeMap<String, Vec<String>>,
    pub events: Vec<EventCard>,
}

impl Default for Catalog {
    fn default() -> Self {
        use TileKind::{Event, Ingredient, Plain};

        let recipe = |items: &[&str]| -> Vec<String> {
            items.iter().map(|s| s.to_string()).collect()
        };

        let mut recipes = BTreeMap::new();
        recipes.insert(
            "Margherita".to_string(),
            recipe(&["Tomato", "Mozzarella", "Basil", "Olive Oil", "Oregano"]),
        );
        recipes.insert(
            "Pepperoni".to_string(),
            recipe(&["Tomato", "Mozzarella", "Pepperoni", "Oregano", "Onion"]),
        );
        recipes.insert(
            "Portuguesa".to_string(),
            recipe(&["Tomato", "Mozzarella", "Ham", "Egg", "Onion"]),
        );
        recipes.insert(
            "Calabresa".to_string(),
            recipe(&["Tomato", "Mozzarella", "Calabresa", "Onion", "Olives"]),
        );
        recipes.insert(
            "Four Cheese".to_string(),
            recipe(&["Mozzarella", "Gorgonzola", "Parmesan", "Provolone", "Oregano"]),
        );

        Self {
            board: vec![
                Plain, Ingredient, Plain, Event, Ingredient, Plain, Event,
                Ingredient, Plain, Ingredient,
            ],
            finish_index: 9,
            recipes,
            events: vec![
                EventCard::new(
                    "Tailwind on the scooter! Move forward 2 tiles.",
                    CardEffect::MoveRelative { delta: 2 },
                    0.3,
                ),
                EventCard::new(
                    "Wrong address. Go back 3 tiles.",
                    CardEffect::MoveRelative { delta: -3 },
                    0.2,
                ),
                EventCard::new(
                    "A hungry customer ate your last ingredient.",
                    CardEffect::DropLastIngredient,
                    0.5,
                ),
                EventCard::new(
                    "The oven caught fire! Lose every ingredient.",
                    CardEffect::DropAllIngredients,
                    0.05,
                ),
            ],
        }
    }
}

impl Catalog {
    /// Checks that rooms can actually play with this data.
    pub fn validate(&self) -> Result<(), RoomError> {
        if self.board.is_empty() {
            return Err(RoomError::InvalidConfig("board is empty".into()));
        }
        if self.finish_index >= self.board.len() {
            return Err(RoomError::InvalidConfig(format!(
                "finish_index {} is outside a board of {} tiles",
                self.finish_index,
                self.board.len()
            )));
        }
        if self.recipes.is_empty() {
            return Err(RoomError::InvalidConfig("no recipes".into()));
        }
        if let Some((flavor, _)) =
            self.recipes.iter().find(|(_, items)| items.is_empty())
        {
            return Err(RoomError::InvalidConfig(format!(
                "recipe {flavor} has no ingredients"
            )));
        }
        if self.board.contains(&TileKind::Event)
            && !self.events.iter().any(|card| card.weight > 0.0)
        {
            return Err(RoomError::InvalidConfig(
                "board has event tiles but no card has a positive weight"
                    .into(),
            ));
        }
        Ok(())
    }

    /// Flavor names, in stable order.
    pub fn flavors(&self) -> Vec<&str> {
        self.recipes.keys().map(String::as_str).collect()
    }

    /// Every ingredient appearing in any recipe, once each, in first-seen
    /// order. Ingredient tiles draw uniformly from this pool.
    pub fn ingredient_pool(&self) -> Vec<String> {
        let mut pool: Vec<String> = Vec::new();
        for token in self.recipes.values().flatten() {
            if !pool.contains(token) {
                pool.push(token.clone());
            }
        }
        pool
    }

    /// Returns the required ingredients for `flavor`.
    pub fn recipe(&self, flavor: &str) -> Option<&[String]> {
        self.recipes.get(flavor).map(Vec::as_slice)
    }

    /// The win predicate: the player holds every ingredient of their
    /// assigned recipe. A player without a flavor never wins.
    pub fn is_recipe_complete(&self, player: &Player) -> bool {
        player
            .flavor
            .as_deref()
            .and_then(|flavor| self.recipe(flavor))
            .is_some_and(|required| player.holds_all(required))
    }
}
