//! End-to-end engine scenarios driven through the public API, the way
//! the session layer drives it: parse a command line, look the table
//! up in the registry, apply the operation under the table lock.

use holdem::{
    Command, PlayerAction, PlayerName, Registry, Street, TableConfig, TableError, TableSnapshot,
    TableState,
};

fn name(s: &str) -> PlayerName {
    PlayerName::new(s)
}

fn whose_turn(registry: &Registry, id: &str) -> PlayerName {
    let table = registry.get(id).unwrap();
    let guard = table.lock().unwrap();
    guard.current_turn().unwrap().name.clone()
}

/// Call or check as appropriate for the seat whose turn it is.
fn passive_action(registry: &Registry, id: &str) {
    let table = registry.get(id).unwrap();
    let mut guard = table.lock().unwrap();
    let actor = guard.current_turn().unwrap().name.clone();
    let action = if guard.committed(&actor) == guard.current_bet() {
        PlayerAction::Check
    } else {
        PlayerAction::Call
    };
    guard.apply_action(&actor, action, 0).unwrap();
}

#[test]
fn full_hand_from_create_to_showdown() {
    let registry = Registry::new(TableConfig::default());

    // CREATE seats the sender; JOIN seats two more.
    let (id, table) = registry.create_table(name("alice"));
    table.lock().unwrap().add_seat(name("bob")).unwrap();
    table.lock().unwrap().add_seat(name("carol")).unwrap();

    let total_before: u32 = table.lock().unwrap().seats().iter().map(|s| s.chips).sum();

    table.lock().unwrap().start_hand().unwrap();
    {
        let guard = table.lock().unwrap();
        assert_eq!(guard.state(), TableState::Playing);
        assert_eq!(guard.street(), Street::Preflop);
        assert_eq!(guard.pot(), 150);
    }

    // Everyone plays passively until the hand settles.
    let mut steps = 0;
    while table.lock().unwrap().street() != Street::Showdown {
        passive_action(&registry, &id);
        steps += 1;
        assert!(steps < 32, "hand failed to settle");
    }

    let guard = table.lock().unwrap();
    assert_eq!(guard.community().len(), 5);
    assert_eq!(guard.pot(), 0);
    assert!(guard.winner().is_some());
    let total_after: u32 = guard.seats().iter().map(|s| s.chips).sum();
    assert_eq!(total_after, total_before);
}

#[test]
fn parsed_commands_drive_the_table() {
    let registry = Registry::new(TableConfig::default());
    let (id, table) = registry.create_table(name("alice"));

    match Command::parse(&format!("JOIN:bob:{id}")).unwrap() {
        Command::Join { name, game_id } => {
            assert_eq!(game_id, id);
            table.lock().unwrap().add_seat(name).unwrap();
        }
        other => panic!("unexpected command {other:?}"),
    }

    match Command::parse(&format!("START_GAME:{}", id.to_ascii_lowercase())).unwrap() {
        Command::StartGame { game_id } => {
            let table = registry.get(&game_id).unwrap();
            table.lock().unwrap().start_hand().unwrap();
        }
        other => panic!("unexpected command {other:?}"),
    }

    // An out-of-turn fold parsed off the wire is rejected cleanly.
    let not_their_turn = {
        let guard = table.lock().unwrap();
        let turn = guard.current_turn().unwrap().name.clone();
        guard
            .seats()
            .iter()
            .find(|s| s.name != turn)
            .unwrap()
            .name
            .clone()
    };
    match Command::parse(&format!("FOLD:{id}:{not_their_turn}")).unwrap() {
        Command::Action {
            name,
            action,
            amount,
            ..
        } => {
            assert_eq!(
                table.lock().unwrap().apply_action(&name, action, amount),
                Err(TableError::OutOfTurn)
            );
        }
        other => panic!("unexpected command {other:?}"),
    }
}

#[test]
fn creator_advances_to_the_next_hand() {
    let registry = Registry::new(TableConfig::default());
    let (id, table) = registry.create_table(name("alice"));
    table.lock().unwrap().add_seat(name("bob")).unwrap();
    table.lock().unwrap().start_hand().unwrap();

    let mut steps = 0;
    while table.lock().unwrap().street() != Street::Showdown {
        passive_action(&registry, &id);
        steps += 1;
        assert!(steps < 32);
    }

    assert_eq!(
        table.lock().unwrap().next_hand(&name("bob")),
        Err(TableError::NotCreator)
    );
    table.lock().unwrap().next_hand(&name("alice")).unwrap();
    assert_eq!(table.lock().unwrap().street(), Street::Preflop);
    assert_eq!(table.lock().unwrap().pot(), 150);
}

#[test]
fn leaving_empties_and_deregisters_the_table() {
    let registry = Registry::new(TableConfig::default());
    let (id, table) = registry.create_table(name("alice"));
    table.lock().unwrap().add_seat(name("bob")).unwrap();

    table.lock().unwrap().remove_seat(&name("bob")).unwrap();
    assert!(!registry.remove_if_empty(&id));

    table.lock().unwrap().remove_seat(&name("alice")).unwrap();
    assert!(registry.remove_if_empty(&id));
    assert!(registry.get(&id).is_none());
}

#[test]
fn mid_hand_departure_settles_by_default_win() {
    let registry = Registry::new(TableConfig::default());
    let (_, table) = registry.create_table(name("alice"));
    table.lock().unwrap().add_seat(name("bob")).unwrap();
    table.lock().unwrap().start_hand().unwrap();
    let pot = table.lock().unwrap().pot();
    assert!(pot > 0);

    table.lock().unwrap().remove_seat(&name("bob")).unwrap();
    let guard = table.lock().unwrap();
    assert_eq!(guard.street(), Street::Showdown);
    assert_eq!(guard.winner(), Some(&name("alice")));
    assert_eq!(guard.pot(), 0);
}

#[test]
fn snapshots_track_each_state_change() {
    let registry = Registry::new(TableConfig::default());
    let (id, table) = registry.create_table(name("alice"));
    table.lock().unwrap().add_seat(name("bob")).unwrap();

    let before = TableSnapshot::of(&table.lock().unwrap());
    assert_eq!(before.state, TableState::Waiting);
    assert!(before.current_turn.is_none());

    table.lock().unwrap().start_hand().unwrap();
    let after = TableSnapshot::of(&table.lock().unwrap());
    assert_eq!(after.state, TableState::Playing);
    assert_eq!(after.id, id);
    assert_eq!(after.pot, 150);
    assert_eq!(after.current_turn.as_ref(), Some(&whose_turn(&registry, &id)));
}
