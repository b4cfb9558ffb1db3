//! Plays one Maluca game between bots, end to end through the gateway.
//!
//! Every bot rolls when it holds the turn and confirms any card it draws.
//! Each notification a bot receives is printed as the JSON a client would
//! see on the wire.
//!
//! ```text
//! RUST_LOG=debug maluca-sim --seed 42 --players 3
//! ```

use std::path::PathBuf;

use clap::Parser;
use maluca::prelude::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Plays a full Maluca game between bots")]
struct Params {
    /// Seed for every random draw. Omit for a fresh game each run.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Number of bots to seat.
    #[arg(short, long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(1..))]
    players: u8,

    /// Room to play in.
    #[arg(short, long, default_value = "R1")]
    room: String,

    /// Stop after this many dice rolls even without a winner.
    #[arg(long, default_value_t = 500)]
    max_rolls: usize,

    /// JSON file with `room` and `catalog` overrides.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct Bot {
    id: PlayerId,
    inbox: UnboundedReceiver<ServerEvent>,
}

#[tokio::main]
async fn main() -> Result<(), MalucaError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Params::parse();
    tracing::info!(?args, "starting simulation");

    let mut config = match &args.config {
        Some(path) => MalucaConfig::from_json_file(path)?,
        None => MalucaConfig::default(),
    };
    let seats = usize::from(args.players);
    if config.room.max_players < seats {
        tracing::info!(
            configured = config.room.max_players,
            seats,
            "raising max_players to fit every bot"
        );
        config.room.max_players = seats;
    }

    let gateway = Gateway::from_config(config, args.seed)?;
    let room = RoomName::from(args.room);

    let mut bots = Vec::with_capacity(seats);
    for n in 1..=seats {
        let id = PlayerId::from(format!("bot{n}"));
        let inbox = gateway.connect(id.clone()).await?;
        gateway
            .handle(
                &id,
                ClientEvent::Join {
                    room: room.clone(),
                    name: format!("Bot {n}"),
                },
            )
            .await?;
        bots.push(Bot { id, inbox });
    }
    gateway
        .handle(&bots[0].id, ClientEvent::Start { room: room.clone() })
        .await?;
    flush(&gateway, &mut bots)?;

    let mut rolls = 0;
    let mut outcome = None;
    while rolls < args.max_rolls {
        let Some(snapshot) = gateway.snapshot(&room).await else {
            break;
        };
        if snapshot.winner.is_some() || !snapshot.started {
            outcome = Some(snapshot);
            break;
        }
        let Some(current) = snapshot.current_player.clone() else {
            break;
        };

        let pending = snapshot
            .players
            .iter()
            .any(|p| p.id == current && p.has_pending_card);
        let event = if pending {
            ClientEvent::ConfirmCard { room: room.clone() }
        } else {
            rolls += 1;
            ClientEvent::RollDice { room: room.clone() }
        };
        gateway.handle(&current, event).await?;
        flush(&gateway, &mut bots)?;
    }

    match outcome.as_ref().and_then(|s| s.winner.as_ref()) {
        Some(winner) => tracing::info!(%winner, rolls, "game over"),
        None => tracing::info!(rolls, "stopped without a winner"),
    }

    for bot in &bots {
        gateway.disconnect(&bot.id).await;
    }
    Ok(())
}

/// Prints everything the bots have received so far.
fn flush(gateway: &Gateway, bots: &mut [Bot]) -> Result<(), MalucaError> {
    for bot in bots {
        while let Ok(event) = bot.inbox.try_recv() {
            let frame = gateway.encode(&event)?;
            println!("{} <- {}", bot.id, String::from_utf8_lossy(&frame));
        }
    }
    Ok(())
}
