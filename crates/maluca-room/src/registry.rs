//! Room registry: creates, tracks and forgets rooms by name, and keeps the
//! index of which rooms each player sits in.
//!
//! The registry itself never awaits. Callers look a handle up, clone it,
//! release whatever lock guards the registry and only then talk to the
//! room, so a slow room never blocks work on other rooms.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use maluca_protocol::{PlayerId, RoomName};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::actor::spawn_room;
use crate::{Catalog, RoomConfig, RoomError, RoomHandle};

/// Counter for telling apart successive actors of the same room name.
static NEXT_ROOM_SERIAL: AtomicU64 = AtomicU64::new(1);

/// All live rooms, in creation order.
pub struct RoomRegistry {
    rooms: HashMap<RoomName, RoomHandle>,
    /// Creation order, for listing.
    order: Vec<RoomName>,
    /// Player → rooms they are seated in. A player may sit in several.
    memberships: HashMap<PlayerId, BTreeSet<RoomName>>,
    config: RoomConfig,
    catalog: Arc<Catalog>,
    /// Source of per-room seeds.
    seeds: StdRng,
}

impl RoomRegistry {
    /// Creates an empty registry whose rooms draw from OS entropy.
    pub fn new(config: RoomConfig, catalog: Catalog) -> Result<Self, RoomError> {
        Self::build(config, catalog, StdRng::from_os_rng())
    }

    /// Creates an empty registry whose rooms are fully reproducible: the
    /// n-th room created gets the same seed on every run.
    pub fn seeded(config: RoomConfig, catalog: Catalog, seed: u64) -> Result<Self, RoomError> {
        Self::build(config, catalog, StdRng::seed_from_u64(seed))
    }

    fn build(config: RoomConfig, catalog: Catalog, seeds: StdRng) -> Result<Self, RoomError> {
        config.validate()?;
        catalog.validate()?;
        Ok(Self {
            rooms: HashMap::new(),
            order: Vec::new(),
            memberships: HashMap::new(),
            config,
            catalog: Arc::new(catalog),
            seeds,
        })
    }

    /// Returns the room called `name`, spawning it first if needed.
    /// The flag is `true` when the room was just created.
    pub fn get_or_create(&mut self, name: &RoomName) -> (RoomHandle, bool) {
        if let Some(handle) = self.rooms.get(name) {
            return (handle.clone(), false);
        }

        let serial = NEXT_ROOM_SERIAL.fetch_add(1, Ordering::Relaxed);
        let seed = self.seeds.random::<u64>();
        let handle = spawn_room(
            name.clone(),
            serial,
            self.config.clone(),
            Arc::clone(&self.catalog),
            seed,
        );
        self.rooms.insert(name.clone(), handle.clone());
        self.order.push(name.clone());
        tracing::info!(room = %name, serial, "room created");
        (handle, true)
    }

    pub fn get(&self, name: &RoomName) -> Option<RoomHandle> {
        self.rooms.get(name).cloned()
    }

    /// Forgets the room called `name` and every membership pointing at it.
    pub fn remove(&mut self, name: &RoomName) -> Option<RoomHandle> {
        let handle = self.rooms.remove(name)?;
        self.order.retain(|n| n != name);
        self.memberships.retain(|_, rooms| {
            rooms.remove(name);
            !rooms.is_empty()
        });
        tracing::info!(room = %name, serial = handle.serial(), "room removed");
        Some(handle)
    }

    /// Removes the room only if `handle` is still the one registered under
    /// its name. Returns whether anything was removed.
    pub fn remove_handle(&mut self, handle: &RoomHandle) -> bool {
        let current = self
            .rooms
            .get(handle.name())
            .is_some_and(|registered| registered.serial() == handle.serial());
        if current {
            self.remove(handle.name());
        }
        current
    }

    /// Room names in creation order.
    pub fn list_names(&self) -> Vec<RoomName> {
        self.order.clone()
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn record_join(&mut self, player_id: &PlayerId, room: &RoomName) {
        self.memberships
            .entry(player_id.clone())
            .or_default()
            .insert(room.clone());
    }

    pub fn record_leave(&mut self, player_id: &PlayerId, room: &RoomName) {
        if let Some(rooms) = self.memberships.get_mut(player_id) {
            rooms.remove(room);
            if rooms.is_empty() {
                self.memberships.remove(player_id);
            }
        }
    }

    /// Rooms `player_id` is seated in, sorted by name.
    pub fn rooms_of(&self, player_id: &PlayerId) -> Vec<RoomName> {
        self.memberships
            .get(player_id)
            .map(|rooms| rooms.iter().cloned().collect())
            .unwrap_or_default()
    }
}
