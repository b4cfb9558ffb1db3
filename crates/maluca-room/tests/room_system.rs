//! Integration tests for room actors and the room registry.

use maluca_protocol::{PlayerId, RoomName, RoomSnapshot, ServerEvent};
use maluca_room::{Catalog, RoomConfig, RoomError, RoomHandle, RoomRegistry, SessionSender};
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

fn pid(id: &str) -> PlayerId {
    PlayerId::from(id)
}

fn room(name: &str) -> RoomName {
    RoomName::from(name)
}

fn registry() -> RoomRegistry {
    RoomRegistry::seeded(RoomConfig::default(), Catalog::default(), 11).unwrap()
}

/// A session channel whose receiver is dropped immediately.
fn dummy_sender() -> SessionSender {
    mpsc::unbounded_channel().0
}

/// Everything queued on `rx` so far.
fn drain(rx: &mut mpsc::UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn last_state(events: &[ServerEvent]) -> Option<&RoomSnapshot> {
    events.iter().rev().find_map(|event| match event {
        ServerEvent::RoomState(snapshot) => Some(snapshot),
        _ => None,
    })
}

/// Seats Alice (p1) and Bob (p2) and returns their session receivers.
async fn seat_two(
    handle: &RoomHandle,
) -> (
    mpsc::UnboundedReceiver<ServerEvent>,
    mpsc::UnboundedReceiver<ServerEvent>,
) {
    let (tx1, rx1) = mpsc::unbounded_channel();
    let (tx2, rx2) = mpsc::unbounded_channel();
    handle.join(pid("p1"), "Alice".into(), tx1).await.unwrap();
    handle.join(pid("p2"), "Bob".into(), tx2).await.unwrap();
    (rx1, rx2)
}

// =========================================================================
// RoomRegistry
// =========================================================================

#[tokio::test]
async fn test_get_or_create_creates_once() {
    let mut reg = registry();

    let (first, created) = reg.get_or_create(&room("R1"));
    assert!(created);
    let (second, created) = reg.get_or_create(&room("R1"));
    assert!(!created);

    assert_eq!(first.serial(), second.serial());
    assert_eq!(reg.room_count(), 1);
}

#[tokio::test]
async fn test_list_names_in_creation_order() {
    let mut reg = registry();
    for name in ["Zeta", "Alpha", "Mid"] {
        reg.get_or_create(&room(name));
    }
    assert_eq!(reg.list_names(), vec![room("Zeta"), room("Alpha"), room("Mid")]);
}

#[tokio::test]
async fn test_remove_forgets_room_and_memberships() {
    let mut reg = registry();
    reg.get_or_create(&room("R1"));
    reg.get_or_create(&room("R2"));
    reg.record_join(&pid("p1"), &room("R1"));
    reg.record_join(&pid("p1"), &room("R2"));

    assert!(reg.remove(&room("R1")).is_some());

    assert!(reg.get(&room("R1")).is_none());
    assert_eq!(reg.rooms_of(&pid("p1")), vec![room("R2")]);
    assert_eq!(reg.list_names(), vec![room("R2")]);
    assert!(reg.remove(&room("R1")).is_none());
}

#[tokio::test]
async fn test_remove_handle_ignores_stale_handles() {
    let mut reg = registry();
    let (old, _) = reg.get_or_create(&room("R1"));
    reg.remove(&room("R1"));
    let (new, created) = reg.get_or_create(&room("R1"));
    assert!(created);
    assert_ne!(old.serial(), new.serial());

    assert!(!reg.remove_handle(&old), "stale handle must not remove the new room");
    assert!(reg.get(&room("R1")).is_some());
    assert!(reg.remove_handle(&new));
    assert_eq!(reg.room_count(), 0);
}

#[tokio::test]
async fn test_memberships_span_rooms() {
    let mut reg = registry();
    reg.record_join(&pid("p1"), &room("R2"));
    reg.record_join(&pid("p1"), &room("R1"));
    assert_eq!(reg.rooms_of(&pid("p1")), vec![room("R1"), room("R2")]);

    reg.record_leave(&pid("p1"), &room("R1"));
    reg.record_leave(&pid("p1"), &room("R2"));
    assert!(reg.rooms_of(&pid("p1")).is_empty());
}

#[tokio::test]
async fn test_registry_rejects_bad_config() {
    let config = RoomConfig {
        min_players: 3,
        max_players: 2,
        ..RoomConfig::default()
    };
    assert!(matches!(
        RoomRegistry::seeded(config, Catalog::default(), 1),
        Err(RoomError::InvalidConfig(_))
    ));

    let catalog = Catalog {
        finish_index: 99,
        ..Catalog::default()
    };
    assert!(RoomRegistry::new(RoomConfig::default(), catalog).is_err());
}

// =========================================================================
// Room actor
// =========================================================================

#[tokio::test]
async fn test_join_notifies_joiner_and_room() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let (mut rx1, mut rx2) = seat_two(&handle).await;

    let alice = drain(&mut rx1);
    assert!(matches!(alice[0], ServerEvent::Joined { ref name, .. } if name == "Alice"));
    // Alice also sees Bob's arrival.
    assert_eq!(last_state(&alice).unwrap().players.len(), 2);

    let bob = drain(&mut rx2);
    assert!(matches!(bob[0], ServerEvent::Joined { ref player_id, .. } if *player_id == pid("p2")));
    assert_eq!(bob.len(), 2);
}

#[tokio::test]
async fn test_third_player_rejected_from_full_room() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let _rx = seat_two(&handle).await;

    let result = handle.join(pid("p3"), "Carol".into(), dummy_sender()).await;

    assert!(matches!(result, Err(RoomError::RoomFull(_))));
    assert_eq!(handle.snapshot().await.unwrap().players.len(), 2);
}

#[tokio::test]
async fn test_start_then_out_of_turn_roll_is_silent() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let (mut rx1, mut rx2) = seat_two(&handle).await;
    drain(&mut rx1);
    drain(&mut rx2);

    handle.start().await.unwrap();
    let started = drain(&mut rx1);
    let snapshot = last_state(&started).unwrap();
    assert!(snapshot.started);
    assert_eq!(snapshot.current_player, Some(pid("p1")));
    assert!(snapshot.players.iter().all(|p| p.flavor.is_some()));
    drain(&mut rx2);

    let result = handle.roll_dice(pid("p2")).await;
    assert!(matches!(result, Err(RoomError::NotYourTurn(_))));
    assert!(drain(&mut rx1).is_empty());
    assert!(drain(&mut rx2).is_empty());
}

#[tokio::test]
async fn test_roll_broadcasts_state() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let (mut rx1, mut rx2) = seat_two(&handle).await;
    handle.start().await.unwrap();
    drain(&mut rx1);
    drain(&mut rx2);

    handle.roll_dice(pid("p1")).await.unwrap();

    let seen_by_bob = drain(&mut rx2);
    let snapshot = last_state(&seen_by_bob).unwrap();
    assert!(snapshot.last_roll.is_some());
    assert!(last_state(&drain(&mut rx1)).is_some());
}

#[tokio::test]
async fn test_concurrent_rolls_are_serialized() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let _rx = seat_two(&handle).await;
    handle.start().await.unwrap();

    let mut tasks = Vec::new();
    for _ in 0..10 {
        let handle = handle.clone();
        tasks.push(tokio::spawn(async move { handle.roll_dice(pid("p1")).await }));
    }
    let mut accepted = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            accepted += 1;
        }
    }

    // The first accepted roll either passes the turn or leaves a card
    // pending; every later roll from p1 is refused.
    assert_eq!(accepted, 1);
    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.turn_counter <= 1);
}

#[tokio::test]
async fn test_restart_returns_room_to_lobby() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let (mut rx1, _rx2) = seat_two(&handle).await;
    handle.start().await.unwrap();
    handle.roll_dice(pid("p1")).await.unwrap();
    drain(&mut rx1);

    handle.restart().await.unwrap();

    assert_eq!(
        drain(&mut rx1),
        vec![ServerEvent::RoomRestarted { room: room("R1") }]
    );
    let snapshot = handle.snapshot().await.unwrap();
    assert!(!snapshot.started);
    assert!(snapshot.board.is_empty());
    assert_eq!(snapshot.players.len(), 2);
}

#[tokio::test]
async fn test_leaver_stops_receiving_events() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    let (mut rx1, mut rx2) = seat_two(&handle).await;
    drain(&mut rx1);
    drain(&mut rx2);

    let remaining = handle.leave(pid("p1")).await.unwrap();

    assert_eq!(remaining, 1);
    assert!(drain(&mut rx1).is_empty());
    let bob = drain(&mut rx2);
    assert_eq!(last_state(&bob).unwrap().players.len(), 1);
}

#[tokio::test]
async fn test_empty_room_refuses_new_players() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    handle.join(pid("p1"), "Alice".into(), dummy_sender()).await.unwrap();

    assert_eq!(handle.leave(pid("p1")).await.unwrap(), 0);

    let result = handle.join(pid("p2"), "Bob".into(), dummy_sender()).await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}

#[tokio::test]
async fn test_shutdown_makes_room_unavailable() {
    let mut reg = registry();
    let (handle, _) = reg.get_or_create(&room("R1"));
    handle.shutdown().await.unwrap();

    let result = handle.snapshot().await;
    assert!(matches!(result, Err(RoomError::Unavailable(_))));
}

#[tokio::test]
async fn test_rooms_are_isolated() {
    let mut reg = registry();
    let (r1, _) = reg.get_or_create(&room("R1"));
    let (r2, _) = reg.get_or_create(&room("R2"));
    let (mut rx1, _rx2) = seat_two(&r1).await;
    let _other = seat_two(&r2).await;
    drain(&mut rx1);

    r2.start().await.unwrap();
    r2.roll_dice(pid("p1")).await.unwrap();

    assert!(drain(&mut rx1).is_empty());
    assert!(!r1.snapshot().await.unwrap().started);
}

#[tokio::test]
async fn test_same_seed_same_game() {
    async fn play(seed: u64) -> Vec<RoomSnapshot> {
        let mut reg =
            RoomRegistry::seeded(RoomConfig::default(), Catalog::default(), seed).unwrap();
        let (handle, _) = reg.get_or_create(&room("R1"));
        let _rx = seat_two(&handle).await;
        handle.start().await.unwrap();

        let mut snapshots = Vec::new();
        for _ in 0..30 {
            let snapshot = handle.snapshot().await.unwrap();
            let Some(current) = snapshot.current_player.clone() else { break };
            if snapshot.winner.is_some() {
                break;
            }
            let pending = snapshot
                .players
                .iter()
                .any(|p| p.id == current && p.has_pending_card);
            if pending {
                handle.confirm_card(current).await.unwrap();
            } else {
                handle.roll_dice(current).await.unwrap();
            }
            snapshots.push(handle.snapshot().await.unwrap());
        }
        snapshots
    }

    assert_eq!(play(5).await, play(5).await);
}
