//! Process-level configuration: room limits plus the game catalog.

use std::path::Path;

use maluca_room::{Catalog, RoomConfig, RoomRegistry};
use serde::{Deserialize, Serialize};

use crate::MalucaError;

/// Everything needed to build a [`RoomRegistry`].
///
/// Every field falls back to its default, so a config file only names
/// what it changes:
///
/// ```json
/// { "room": { "max_players": 4 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MalucaConfig {
    pub room: RoomConfig,
    pub catalog: Catalog,
}

impl MalucaConfig {
    pub fn from_json_str(json: &str) -> Result<Self, MalucaError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, MalucaError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Validates the config and builds a registry. With a seed, every room
    /// the registry creates replays identically across runs.
    pub fn into_registry(self, seed: Option<u64>) -> Result<RoomRegistry, MalucaError> {
        let registry = match seed {
            Some(seed) => RoomRegistry::seeded(self.room, self.catalog, seed)?,
            None => RoomRegistry::new(self.room, self.catalog)?,
        };
        Ok(registry)
    }
}
