//! Session gateway: the boundary between transport sessions and rooms.
//!
//! A transport calls [`Gateway::connect`] once per session, feeds every
//! inbound frame to [`Gateway::handle_frame`] (or an already decoded event
//! to [`Gateway::handle`]), drains the returned receiver to the client and
//! calls [`Gateway::disconnect`] when the connection goes away.
//!
//! The gateway holds no game state. It resolves the target room, forwards
//! the event to that room's actor and keeps the room directory current.
//! Locks are held only around registry and session-table bookkeeping,
//! never while awaiting a room, and never both at once.

use std::collections::HashMap;

use maluca_protocol::{
    ClientEvent, Codec, JoinErrorReason, JsonCodec, PlayerId, ProtocolError, RoomName,
    RoomSnapshot, ServerEvent,
};
use maluca_room::{RoomError, RoomHandle, RoomRegistry, SessionSender};
use tokio::sync::{Mutex, mpsc};

use crate::{MalucaConfig, MalucaError};

/// Routes client events to rooms and room notifications to sessions.
///
/// Share it across session tasks behind an `Arc`.
pub struct Gateway<C: Codec = JsonCodec> {
    registry: Mutex<RoomRegistry>,
    /// Outbound channel per connected session.
    sessions: Mutex<HashMap<PlayerId, SessionSender>>,
    codec: C,
}

impl Gateway<JsonCodec> {
    /// Creates a JSON gateway over `registry`.
    pub fn new(registry: RoomRegistry) -> Self {
        Self::with_codec(registry, JsonCodec)
    }

    /// Builds the registry from `config` and wraps it in a JSON gateway.
    pub fn from_config(config: MalucaConfig, seed: Option<u64>) -> Result<Self, MalucaError> {
        Ok(Self::new(config.into_registry(seed)?))
    }
}

impl<C: Codec> Gateway<C> {
    pub fn with_codec(registry: RoomRegistry, codec: C) -> Self {
        Self {
            registry: Mutex::new(registry),
            sessions: Mutex::new(HashMap::new()),
            codec,
        }
    }

    /// Encodes an outbound event for the wire.
    pub fn encode(&self, event: &ServerEvent) -> Result<Vec<u8>, MalucaError> {
        Ok(self.codec.encode(event)?)
    }

    // -----------------------------------------------------------------
    // Sessions
    // -----------------------------------------------------------------

    /// Opens a session for `player_id` and returns the receiving end of
    /// its notification stream.
    pub async fn connect(
        &self,
        player_id: PlayerId,
    ) -> Result<mpsc::UnboundedReceiver<ServerEvent>, MalucaError> {
        let mut sessions = self.sessions.lock().await;
        if sessions.contains_key(&player_id) {
            return Err(MalucaError::AlreadyConnected(player_id));
        }
        let (tx, rx) = mpsc::unbounded_channel();
        sessions.insert(player_id.clone(), tx);
        tracing::info!(player = %player_id, sessions = sessions.len(), "session connected");
        Ok(rx)
    }

    /// Closes the session and leaves every room the player sits in.
    pub async fn disconnect(&self, player_id: &PlayerId) {
        let removed = self.sessions.lock().await.remove(player_id).is_some();
        let rooms = self.registry.lock().await.rooms_of(player_id);
        tracing::info!(
            player = %player_id,
            known = removed,
            rooms = rooms.len(),
            "session disconnected"
        );
        for room in rooms {
            self.leave(player_id, room).await;
        }
    }

    async fn session(&self, player_id: &PlayerId) -> Result<SessionSender, MalucaError> {
        self.sessions
            .lock()
            .await
            .get(player_id)
            .cloned()
            .ok_or_else(|| MalucaError::NotConnected(player_id.clone()))
    }

    // -----------------------------------------------------------------
    // Inbound
    // -----------------------------------------------------------------

    /// Decodes one inbound frame and handles it.
    ///
    /// # Errors
    /// Returns `MalucaError::Protocol` for empty or undecodable frames and
    /// `MalucaError::NotConnected` for unknown sessions. No state is
    /// touched in either case.
    pub async fn handle_frame(&self, player_id: &PlayerId, frame: &[u8]) -> Result<(), MalucaError> {
        if frame.iter().all(u8::is_ascii_whitespace) {
            return Err(ProtocolError::InvalidMessage("empty frame".into()).into());
        }
        let event: ClientEvent = self.codec.decode(frame)?;
        self.handle(player_id, event).await
    }

    /// Handles one client event from `player_id`.
    ///
    /// Rule violations never surface here: join failures become a
    /// `JoinError` to the requester and everything else is logged and
    /// dropped.
    pub async fn handle(&self, player_id: &PlayerId, event: ClientEvent) -> Result<(), MalucaError> {
        let sender = self.session(player_id).await?;
        tracing::debug!(player = %player_id, ?event, "client event");

        match event {
            ClientEvent::ListRooms => {
                let rooms = self.room_names().await;
                let _ = sender.send(ServerEvent::RoomList { rooms });
            }
            ClientEvent::Join { room, name } => {
                self.join(player_id, room, name, sender).await;
            }
            ClientEvent::Leave { room } => {
                self.leave(player_id, room).await;
            }
            ClientEvent::Start { room } => {
                let result = match self.lookup(&room).await {
                    Ok(handle) => handle.start().await,
                    Err(e) => Err(e),
                };
                self.report(player_id, &sender, result);
            }
            ClientEvent::Restart { room } => {
                let result = match self.lookup(&room).await {
                    Ok(handle) => handle.restart().await,
                    Err(e) => Err(e),
                };
                self.report(player_id, &sender, result);
            }
            ClientEvent::RollDice { room } => {
                let result = match self.lookup(&room).await {
                    Ok(handle) => handle.roll_dice(player_id.clone()).await,
                    Err(e) => Err(e),
                };
                self.report(player_id, &sender, result);
            }
            ClientEvent::ConfirmCard { room } => {
                let result = match self.lookup(&room).await {
                    Ok(handle) => handle.confirm_card(player_id.clone()).await,
                    Err(e) => Err(e),
                };
                self.report(player_id, &sender, result);
            }
        }
        Ok(())
    }

    async fn join(&self, player_id: &PlayerId, room: RoomName, name: String, sender: SessionSender) {
        if room.is_blank() {
            return self.report(player_id, &sender, Err(RoomError::MissingRoom));
        }
        if name.trim().is_empty() {
            return self.report(player_id, &sender, Err(RoomError::MissingName));
        }

        // A room found empty a moment ago may be closing; one retry lands
        // in a freshly created room of the same name.
        let mut retried = false;
        loop {
            let (handle, created) = self.registry.lock().await.get_or_create(&room);
            if created {
                self.broadcast_room_list().await;
            }

            match handle.join(player_id.clone(), name.clone(), sender.clone()).await {
                Ok(()) => {
                    self.registry.lock().await.record_join(player_id, &room);
                    return;
                }
                Err(RoomError::Unavailable(_)) if !retried => {
                    tracing::warn!(room = %room, "room closed during join, retrying");
                    self.forget(&handle).await;
                    retried = true;
                }
                Err(e) => return self.report(player_id, &sender, Err(e)),
            }
        }
    }

    async fn leave(&self, player_id: &PlayerId, room: RoomName) {
        let handle = match self.lookup(&room).await {
            Ok(handle) => handle,
            Err(e) => {
                self.registry.lock().await.record_leave(player_id, &room);
                return self.log_ignored(player_id, &e);
            }
        };

        match handle.leave(player_id.clone()).await {
            Ok(remaining) => {
                self.registry.lock().await.record_leave(player_id, &room);
                if remaining == 0 {
                    self.forget(&handle).await;
                }
            }
            Err(e) => self.log_ignored(player_id, &e),
        }
    }

    /// Drops `handle` from the registry (if it is still the registered
    /// room of that name), stops its actor and announces the new list.
    async fn forget(&self, handle: &RoomHandle) {
        let removed = self.registry.lock().await.remove_handle(handle);
        if removed {
            let _ = handle.shutdown().await;
            self.broadcast_room_list().await;
        }
    }

    async fn lookup(&self, room: &RoomName) -> Result<RoomHandle, RoomError> {
        self.registry
            .lock()
            .await
            .get(room)
            .ok_or_else(|| RoomError::NotFound(room.clone()))
    }

    // -----------------------------------------------------------------
    // Outbound
    // -----------------------------------------------------------------

    /// Tells every connected session about the current room list.
    async fn broadcast_room_list(&self) {
        let rooms = self.registry.lock().await.list_names();
        let sessions = self.sessions.lock().await;
        tracing::debug!(rooms = rooms.len(), sessions = sessions.len(), "room list changed");
        for sender in sessions.values() {
            let _ = sender.send(ServerEvent::RoomList {
                rooms: rooms.clone(),
            });
        }
    }

    /// Sends join failures back to the requester; logs everything else.
    fn report(&self, player_id: &PlayerId, sender: &SessionSender, result: Result<(), RoomError>) {
        let Err(e) = result else { return };
        match e.join_reason() {
            Some(reason) => self.reject_join(player_id, sender, reason),
            None => self.log_ignored(player_id, &e),
        }
    }

    fn reject_join(&self, player_id: &PlayerId, sender: &SessionSender, reason: JoinErrorReason) {
        tracing::debug!(player = %player_id, %reason, "join rejected");
        let _ = sender.send(ServerEvent::JoinError { reason });
    }

    fn log_ignored(&self, player_id: &PlayerId, e: &RoomError) {
        if e.is_silent() || matches!(e, RoomError::NotFound(_)) {
            tracing::debug!(player = %player_id, error = %e, "action ignored");
        } else {
            tracing::warn!(player = %player_id, error = %e, "action failed");
        }
    }

    // -----------------------------------------------------------------
    // Introspection
    // -----------------------------------------------------------------

    /// Room names in creation order.
    pub async fn room_names(&self) -> Vec<RoomName> {
        self.registry.lock().await.list_names()
    }

    /// Current state of `room`, if it exists.
    pub async fn snapshot(&self, room: &RoomName) -> Option<RoomSnapshot> {
        let handle = self.lookup(room).await.ok()?;
        handle.snapshot().await.ok()
    }

    /// Rooms `player_id` is seated in.
    pub async fn rooms_of(&self, player_id: &PlayerId) -> Vec<RoomName> {
        self.registry.lock().await.rooms_of(player_id)
    }
}
