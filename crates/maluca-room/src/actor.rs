//! Room actor: an isolated Tokio task that owns one [`Room`].
//!
//! All operations on a room arrive through a bounded mpsc mailbox and are
//! applied one at a time, so no two operations on the same room ever
//! interleave. Requests carry a `oneshot` reply channel; the reply is sent
//! only after the operation's notifications have been queued to every
//! recipient.

use std::collections::HashMap;
use std::sync::Arc;

use maluca_protocol::{PlayerId, Recipient, RoomName, RoomSnapshot, ServerEvent};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{mpsc, oneshot};

use crate::room::Outcome;
use crate::{Catalog, Room, RoomConfig, RoomError};

/// Channel sender for delivering notifications to one player's session.
pub type SessionSender = mpsc::UnboundedSender<ServerEvent>;

type Reply<T> = oneshot::Sender<Result<T, RoomError>>;

/// Commands sent to a room actor through its mailbox.
pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        name: String,
        sender: SessionSender,
        reply: Reply<()>,
    },
    /// Replies with the number of players still seated.
    Leave {
        player_id: PlayerId,
        reply: Reply<usize>,
    },
    Start {
        reply: Reply<()>,
    },
    Restart {
        reply: Reply<()>,
    },
    RollDice {
        player_id: PlayerId,
        reply: Reply<()>,
    },
    ConfirmCard {
        player_id: PlayerId,
        reply: Reply<()>,
    },
    Snapshot {
        reply: Reply<RoomSnapshot>,
    },
    Shutdown,
}

/// Handle to a running room actor.
///
/// Cheap to clone. The serial tells apart two actors that were created
/// for the same room name at different times.
#[derive(Clone)]
pub struct RoomHandle {
    name: RoomName,
    serial: u64,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn name(&self) -> &RoomName {
        &self.name
    }

    pub fn serial(&self) -> u64 {
        self.serial
    }

    /// Seats `player_id` and routes the room's notifications for them to
    /// `sender`. Re-joining with a seated id just swaps in the new sender.
    pub async fn join(
        &self,
        player_id: PlayerId,
        name: String,
        sender: SessionSender,
    ) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Join {
            player_id,
            name,
            sender,
            reply,
        })
        .await
    }

    /// Removes a player. Returns how many players remain seated.
    pub async fn leave(&self, player_id: PlayerId) -> Result<usize, RoomError> {
        self.request(|reply| RoomCommand::Leave { player_id, reply })
            .await
    }

    pub async fn start(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Start { reply }).await
    }

    pub async fn restart(&self) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::Restart { reply }).await
    }

    pub async fn roll_dice(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::RollDice { player_id, reply })
            .await
    }

    pub async fn confirm_card(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.request(|reply| RoomCommand::ConfirmCard { player_id, reply })
            .await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        self.request(|reply| RoomCommand::Snapshot { reply }).await
    }

    /// Tells the room to stop. Queued commands ahead of this one still run.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Shutdown)
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> RoomCommand,
    ) -> Result<T, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))?;
        reply_rx
            .await
            .map_err(|_| RoomError::Unavailable(self.name.clone()))?
    }
}

/// The actor's private state. Runs inside a Tokio task.
struct RoomActor {
    room: Room,
    rng: StdRng,
    /// Outbound channel per seated player.
    senders: HashMap<PlayerId, SessionSender>,
    /// Set once the last player leaves. A closed room refuses new players
    /// so that a fresh room can take over its name.
    closed: bool,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(room = %self.room.name(), "room actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                RoomCommand::Join {
                    player_id,
                    name,
                    sender,
                    reply,
                } => {
                    let result = self.handle_join(player_id, &name, sender);
                    let _ = reply.send(result);
                }
                RoomCommand::Leave { player_id, reply } => {
                    let result = self.handle_leave(&player_id);
                    let _ = reply.send(result);
                }
                RoomCommand::Start { reply } => {
                    let result = self.room.start(&mut self.rng);
                    let _ = reply.send(self.dispatch_result(result));
                }
                RoomCommand::Restart { reply } => {
                    let outcome = self.room.restart();
                    self.dispatch(outcome);
                    let _ = reply.send(Ok(()));
                }
                RoomCommand::RollDice { player_id, reply } => {
                    let result = self.room.roll_dice(&player_id, &mut self.rng);
                    let _ = reply.send(self.dispatch_result(result));
                }
                RoomCommand::ConfirmCard { player_id, reply } => {
                    let result = self.room.confirm_card(&player_id);
                    let _ = reply.send(self.dispatch_result(result));
                }
                RoomCommand::Snapshot { reply } => {
                    let _ = reply.send(Ok(self.room.snapshot()));
                }
                RoomCommand::Shutdown => {
                    tracing::info!(room = %self.room.name(), "room shutting down");
                    break;
                }
            }
        }

        tracing::info!(room = %self.room.name(), "room actor stopped");
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        name: &str,
        sender: SessionSender,
    ) -> Result<(), RoomError> {
        if self.closed {
            return Err(RoomError::Unavailable(self.room.name().clone()));
        }
        let outcome = self.room.join(player_id.clone(), name)?;
        self.senders.insert(player_id, sender);
        self.dispatch(outcome);
        Ok(())
    }

    fn handle_leave(&mut self, player_id: &PlayerId) -> Result<usize, RoomError> {
        let outcome = self.room.leave(player_id)?;
        self.senders.remove(player_id);
        self.dispatch(outcome);

        let remaining = self.room.players().len();
        if remaining == 0 {
            self.closed = true;
        }
        Ok(remaining)
    }

    fn dispatch_result(&self, result: Result<Outcome, RoomError>) -> Result<(), RoomError> {
        result.map(|outcome| self.dispatch(outcome))
    }

    /// Delivers notifications to the seated players they address.
    fn dispatch(&self, outcome: Outcome) {
        for (recipient, event) in outcome {
            match recipient {
                Recipient::All => {
                    for player in self.room.players() {
                        self.send_to(&player.id, event.clone());
                    }
                }
                Recipient::Player(player_id) => {
                    self.send_to(&player_id, event);
                }
            }
        }
    }

    /// Drops the event if the session is gone.
    fn send_to(&self, player_id: &PlayerId, event: ServerEvent) {
        if let Some(sender) = self.senders.get(player_id) {
            let _ = sender.send(event);
        }
    }
}

/// Spawns a room actor and returns a handle to it.
///
/// `seed` drives every dice roll, ingredient draw, card draw and flavor
/// assignment in the room.
pub(crate) fn spawn_room(
    name: RoomName,
    serial: u64,
    config: RoomConfig,
    catalog: Arc<Catalog>,
    seed: u64,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(config.mailbox_size);

    let actor = RoomActor {
        room: Room::new(name.clone(), config, catalog),
        rng: StdRng::seed_from_u64(seed),
        senders: HashMap::new(),
        closed: false,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        name,
        serial,
        sender: tx,
    }
}
