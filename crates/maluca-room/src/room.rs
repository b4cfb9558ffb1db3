//! The room state machine: seating, turn order, tile resolution and win
//! detection for one game.
//!
//! A [`Room`] is plain synchronous state. It never awaits and never does
//! I/O; every operation returns the notifications to deliver as
//! `(Recipient, ServerEvent)` pairs and leaves delivery to the caller.
//! The actor in `actor.rs` owns one `Room` and is the only writer.
//!
//! Randomness is always passed in, so a seeded generator replays a game
//! exactly.

use std::sync::Arc;

use maluca_protocol::{
    PlayerId, Recipient, RoomName, RoomSnapshot, ServerEvent, TileKind,
};
use rand::Rng;
use rand::seq::IndexedRandom;

use crate::selector::pick_weighted;
use crate::{Catalog, Player, RoomConfig, RoomError, RoomPhase};

/// Notifications produced by one room operation, in delivery order.
pub type Outcome = Vec<(Recipient, ServerEvent)>;

/// One game's full mutable state.
pub struct Room {
    name: RoomName,
    config: RoomConfig,
    catalog: Arc<Catalog>,
    /// Ingredient tiles draw from here. Cached from the catalog.
    pool: Vec<String>,
    /// Seating order is turn order.
    players: Vec<Player>,
    started: bool,
    /// Never decreases. The current actor is `players[turn_counter % len]`.
    turn_counter: u64,
    /// Empty in the lobby, loaded from the catalog on start.
    board: Vec<TileKind>,
    winner: Option<PlayerId>,
    last_roll: Option<u8>,
    last_ingredient: Option<String>,
}

impl Room {
    pub fn new(name: RoomName, config: RoomConfig, catalog: Arc<Catalog>) -> Self {
        let pool = catalog.ingredient_pool();
        Self {
            name,
            config,
            catalog,
            pool,
            players: Vec::new(),
            started: false,
            turn_counter: 0,
            board: Vec::new(),
            winner: None,
            last_roll: None,
            last_ingredient: None,
        }
    }

    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn turn_counter(&self) -> u64 {
        self.turn_counter
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    pub fn phase(&self) -> RoomPhase {
        if self.started {
            RoomPhase::InProgress
        } else if self.winner.is_some() {
            RoomPhase::Finished
        } else {
            RoomPhase::Lobby
        }
    }

    /// The player whose turn it is, if anyone is seated.
    pub fn current_player(&self) -> Option<&Player> {
        self.current_index().map(|idx| &self.players[idx])
    }

    fn current_index(&self) -> Option<usize> {
        if self.players.is_empty() {
            return None;
        }
        Some((self.turn_counter % self.players.len() as u64) as usize)
    }

    fn seat_of(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    // -----------------------------------------------------------------
    // Seating
    // -----------------------------------------------------------------

    /// Seats a new player at the end of the turn order.
    ///
    /// Joining again with an id that is already seated changes nothing;
    /// that session just receives its confirmation and the current state
    /// again.
    pub fn join(&mut self, player_id: PlayerId, name: &str) -> Result<Outcome, RoomError> {
        if let Some(seat) = self.seat_of(&player_id) {
            let joined = ServerEvent::Joined {
                room: self.name.clone(),
                player_id: player_id.clone(),
                name: self.players[seat].name.clone(),
            };
            let recipient = Recipient::Player(player_id);
            return Ok(vec![
                (recipient.clone(), joined),
                (recipient, ServerEvent::RoomState(self.snapshot())),
            ]);
        }
        if name.trim().is_empty() {
            return Err(RoomError::MissingName);
        }
        if self.players.len() >= self.config.max_players {
            return Err(RoomError::RoomFull(self.name.clone()));
        }
        if !self.phase().is_joinable() {
            return Err(RoomError::GameInProgress(self.name.clone()));
        }

        self.players.push(Player::new(player_id.clone(), name));
        tracing::info!(
            room = %self.name,
            player = %player_id,
            players = self.players.len(),
            "player joined"
        );

        Ok(vec![
            (
                Recipient::Player(player_id.clone()),
                ServerEvent::Joined {
                    room: self.name.clone(),
                    player_id,
                    name: name.to_string(),
                },
            ),
            (Recipient::All, ServerEvent::RoomState(self.snapshot())),
        ])
    }

    /// Removes a player. A pending card leaves with them.
    ///
    /// The turn counter is moved forward to the smallest value that still
    /// names the right player in the shrunken seating: the same player if
    /// someone seated earlier left, or the next player in seating order
    /// if the current actor left.
    ///
    /// Returns no notifications when the room became empty; the caller is
    /// expected to remove the room.
    pub fn leave(&mut self, player_id: &PlayerId) -> Result<Outcome, RoomError> {
        let removed = self
            .seat_of(player_id)
            .ok_or_else(|| RoomError::NotInRoom(player_id.clone(), self.name.clone()))?;
        let current = self.current_index().unwrap_or(0);

        self.players.remove(removed);
        tracing::info!(
            room = %self.name,
            player = %player_id,
            players = self.players.len(),
            "player left"
        );

        if self.players.is_empty() {
            return Ok(Vec::new());
        }

        let seats = self.players.len();
        let next_seat = if removed < current {
            current - 1
        } else {
            current % seats
        };
        self.turn_counter = advance_to_seat(self.turn_counter, next_seat, seats);

        Ok(vec![(Recipient::All, ServerEvent::RoomState(self.snapshot()))])
    }

    // -----------------------------------------------------------------
    // Game lifecycle
    // -----------------------------------------------------------------

    /// Loads the board, clears every hand and deals each player a flavor.
    ///
    /// Only accepted from the lobby. A finished room must be restarted
    /// first.
    pub fn start<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Outcome, RoomError> {
        match self.phase() {
            RoomPhase::Lobby => {}
            RoomPhase::InProgress => return Err(RoomError::AlreadyStarted(self.name.clone())),
            RoomPhase::Finished => return Err(RoomError::GameOver(self.name.clone())),
        }
        if self.players.len() < self.config.min_players {
            return Err(RoomError::NotEnoughPlayers {
                room: self.name.clone(),
                have: self.players.len(),
                need: self.config.min_players,
            });
        }
        if self.catalog.board.is_empty() {
            return Err(RoomError::InvalidConfig("board is empty".into()));
        }

        self.started = true;
        self.turn_counter = 0;
        self.winner = None;
        self.board = self.catalog.board.clone();
        self.last_roll = None;
        self.last_ingredient = None;

        let flavors = self.catalog.flavors();
        for player in &mut self.players {
            player.reset();
            player.flavor = flavors.choose(rng).map(|flavor| flavor.to_string());
        }

        tracing::info!(room = %self.name, players = self.players.len(), "game started");
        Ok(vec![(Recipient::All, ServerEvent::RoomState(self.snapshot()))])
    }

    /// Sends the room back to the lobby. Seating is kept.
    pub fn restart(&mut self) -> Outcome {
        self.started = false;
        self.turn_counter = 0;
        self.board.clear();
        self.winner = None;
        self.last_roll = None;
        self.last_ingredient = None;
        for player in &mut self.players {
            player.reset();
            player.flavor = None;
        }

        tracing::info!(room = %self.name, "room restarted");
        vec![(
            Recipient::All,
            ServerEvent::RoomRestarted {
                room: self.name.clone(),
            },
        )]
    }

    // -----------------------------------------------------------------
    // Turns
    // -----------------------------------------------------------------

    /// Rolls for the current actor and resolves the tile they land on.
    pub fn roll_dice<R: Rng + ?Sized>(
        &mut self,
        player_id: &PlayerId,
        rng: &mut R,
    ) -> Result<Outcome, RoomError> {
        let seat = self.acting_seat(player_id)?;
        if Some(seat) != self.current_index() {
            return Err(RoomError::NotYourTurn(player_id.clone()));
        }
        if self.players[seat].pending_card.is_some() {
            return Err(RoomError::CardPending(player_id.clone()));
        }

        let dice: u8 = rng.random_range(1..=6);
        Ok(self.move_and_resolve(seat, dice, rng))
    }

    /// Applies the pending card of `player_id`, then checks the Finish
    /// tile again and passes the turn.
    pub fn confirm_card(&mut self, player_id: &PlayerId) -> Result<Outcome, RoomError> {
        let seat = self.acting_seat(player_id)?;
        let board_len = self.board.len();

        let player = &mut self.players[seat];
        let card = player
            .pending_card
            .take()
            .ok_or_else(|| RoomError::NoPendingCard(player_id.clone()))?;
        card.effect.apply(player, board_len);
        tracing::debug!(
            room = %self.name,
            player = %player_id,
            card = %card.description,
            position = player.position,
            "card confirmed"
        );

        if let Some(outcome) = self.check_finish(seat) {
            return Ok(outcome);
        }

        self.turn_counter += 1;
        Ok(vec![(Recipient::All, ServerEvent::RoomState(self.snapshot()))])
    }

    /// Common gate for roll and confirm: a running game and a seated player.
    fn acting_seat(&self, player_id: &PlayerId) -> Result<usize, RoomError> {
        let phase = self.phase();
        if !phase.is_active() {
            return Err(match phase {
                RoomPhase::Finished => RoomError::GameOver(self.name.clone()),
                _ => RoomError::GameNotStarted(self.name.clone()),
            });
        }
        self.seat_of(player_id)
            .ok_or_else(|| RoomError::NotInRoom(player_id.clone(), self.name.clone()))
    }

    fn move_and_resolve<R: Rng + ?Sized>(
        &mut self,
        seat: usize,
        dice: u8,
        rng: &mut R,
    ) -> Outcome {
        let board_len = self.board.len();
        let player = &mut self.players[seat];
        player.advance(i64::from(dice), board_len);
        let landed = player.position;

        // The tile is read before a failed Finish sends the player home, so
        // the Finish cell's own kind still resolves.
        let tile = self.board[landed];
        self.last_roll = Some(dice);
        self.last_ingredient = None;
        tracing::debug!(
            room = %self.name,
            player = %self.players[seat].id,
            dice,
            position = landed,
            %tile,
            "dice rolled"
        );

        if let Some(outcome) = self.check_finish(seat) {
            return outcome;
        }

        let mut card_drawn = None;
        match tile {
            TileKind::Plain => {
                self.turn_counter += 1;
            }
            TileKind::Ingredient => {
                if let Some(token) = self.pool.choose(rng).cloned() {
                    if self.keeps(seat, &token) {
                        self.players[seat].collect(&token);
                    }
                    self.last_ingredient = Some(token);
                }
                self.turn_counter += 1;
            }
            TileKind::Event => {
                match pick_weighted(&self.catalog.events, |card| card.weight, rng).cloned() {
                    Some(card) => {
                        card_drawn = Some((
                            Recipient::Player(self.players[seat].id.clone()),
                            ServerEvent::CardDrawn {
                                room: self.name.clone(),
                                description: card.description.clone(),
                            },
                        ));
                        self.players[seat].pending_card = Some(card);
                    }
                    None => self.turn_counter += 1,
                }
            }
        }

        let mut outcome = vec![(Recipient::All, ServerEvent::RoomState(self.snapshot()))];
        outcome.extend(card_drawn);
        outcome
    }

    /// Whether the player at `seat` keeps a freshly drawn `token`.
    fn keeps(&self, seat: usize, token: &str) -> bool {
        let player = &self.players[seat];
        if player.holds(token) {
            return false;
        }
        if !self.config.flavor_aware_pickup {
            return true;
        }
        player
            .flavor
            .as_deref()
            .and_then(|flavor| self.catalog.recipe(flavor))
            .is_some_and(|required| required.iter().any(|t| t == token))
    }

    /// Finish-tile rule. A complete recipe wins; otherwise the player is
    /// sent back to the start and the caller carries on.
    fn check_finish(&mut self, seat: usize) -> Option<Outcome> {
        if self.players[seat].position != self.catalog.finish_index {
            return None;
        }
        if self.catalog.is_recipe_complete(&self.players[seat]) {
            return Some(self.declare_winner(seat));
        }
        self.players[seat].position = 0;
        None
    }

    fn declare_winner(&mut self, seat: usize) -> Outcome {
        let player = &self.players[seat];
        let game_over = ServerEvent::GameOver {
            room: self.name.clone(),
            winner: player.id.clone(),
            name: player.name.clone(),
            ingredients: player.ingredients.clone(),
        };
        self.winner = Some(player.id.clone());
        self.started = false;

        tracing::info!(
            room = %self.name,
            winner = %self.players[seat].id,
            turn = self.turn_counter,
            "game won"
        );
        vec![
            (Recipient::All, ServerEvent::RoomState(self.snapshot())),
            (Recipient::All, game_over),
        ]
    }

    // -----------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room: self.name.clone(),
            players: self.players.iter().map(Player::view).collect(),
            started: self.started,
            turn_counter: self.turn_counter,
            current_player: self.current_player().map(|p| p.id.clone()),
            board: self.board.clone(),
            finish_index: self.catalog.finish_index,
            winner: self.winner.clone(),
            last_roll: self.last_roll,
            last_ingredient: self.last_ingredient.clone(),
        }
    }
}

/// Smallest counter `>= counter` with `counter % seats == seat`.
fn advance_to_seat(counter: u64, seat: usize, seats: usize) -> u64 {
    let seats = seats as u64;
    let seat = seat as u64;
    counter + (seat + seats - counter % seats) % seats
}
