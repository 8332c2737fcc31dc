//! Integration tests for betting-round flow, from game start through
//! showdown, driven through the public table API.

use card_room::entities::{ActionKind, Chips, PlayerId};
use card_room::{GameOptions, GamePhase, HoldemTable, TableError};

fn heads_up() -> HoldemTable {
    let mut table = HoldemTable::new(GameOptions::default());
    table.add_player(1, "alice".to_string(), 1000).unwrap();
    table.add_player(2, "bob".to_string(), 1000).unwrap();
    table
}

fn current_id(table: &HoldemTable) -> PlayerId {
    table.current_player().unwrap().id
}

fn total_chips(table: &HoldemTable) -> Chips {
    table.players().iter().map(|p| p.chips).sum()
}

#[test]
fn test_heads_up_opening_state() {
    // Two players, stacks 1000/1000, blinds 10/20.
    let mut table = heads_up();
    table.start_game().unwrap();

    assert_eq!(table.phase(), GamePhase::Preflop);
    assert_eq!(table.pot(), 30);
    assert_eq!(table.current_bet(), 20);
    for player in table.players() {
        assert_eq!(player.hand.len(), 2);
    }

    // The button moved to seat 1; seat 0 posted the small blind and, being
    // the player after the big blind, opens the action.
    let small = &table.players()[0];
    let big = &table.players()[1];
    assert_eq!(small.chips_in_pot, 10);
    assert_eq!(small.chips, 990);
    assert_eq!(big.chips_in_pot, 20);
    assert_eq!(big.chips, 980);
    assert_eq!(current_id(&table), small.id);
}

#[test]
fn test_heads_up_call_and_check_to_the_flop() {
    let mut table = heads_up();
    table.start_game().unwrap();

    // Small blind calls to 20, big blind checks to complete the round.
    table.call(1).unwrap();
    assert_eq!(table.phase(), GamePhase::Preflop);
    table.check(2).unwrap();

    assert_eq!(table.phase(), GamePhase::Flop);
    assert_eq!(table.community().len(), 3);
    assert_eq!(table.pot(), 40);
    // A fresh betting round: everyone still in gets to act again.
    assert!(table.players().iter().all(|p| !p.has_acted));
}

#[test]
fn test_three_players_folding_to_a_bet_ends_the_hand_early() {
    let mut table = HoldemTable::new(GameOptions::default());
    table.add_player(1, "p1".to_string(), 1000).unwrap();
    table.add_player(2, "p2".to_string(), 1000).unwrap();
    table.add_player(3, "p3".to_string(), 1000).unwrap();
    table.start_game().unwrap();

    let bettor = current_id(&table);
    table.bet(bettor, 100).unwrap();
    let next = current_id(&table);
    table.fold(next).unwrap();
    let last = current_id(&table);
    table.fold(last).unwrap();

    // Only one active player remains: the pot is awarded without hand
    // evaluation, no further streets are dealt.
    assert_eq!(table.phase(), GamePhase::Showdown);
    assert!(table.community().is_empty());
    assert_eq!(table.winners().len(), 1);
    assert_eq!(table.winners()[0].player_id, bettor);
    assert!(table.winners()[0].hand_name.is_none());
    assert_eq!(table.pot(), 0);
}

#[test]
fn test_checked_down_hand_settles_with_evaluated_winners() {
    let mut table = heads_up();
    table.start_game().unwrap();
    let before = total_chips(&table) + table.pot();

    table.call(1).unwrap();
    table.check(2).unwrap();
    for _ in 0..3 {
        table.check(current_id(&table)).unwrap();
        table.check(current_id(&table)).unwrap();
    }

    assert_eq!(table.phase(), GamePhase::Showdown);
    assert_eq!(table.community().len(), 5);
    assert_eq!(table.pot(), 0);

    // Every winner carries an evaluated hand, and the payout is zero-sum.
    assert!(!table.winners().is_empty());
    for winner in table.winners() {
        assert!(winner.hand_name.is_some());
        assert_eq!(winner.hand.len(), 5);
    }
    let paid: Chips = table.winners().iter().map(|w| w.win_amount).sum();
    assert_eq!(paid, 40);
    assert_eq!(total_chips(&table), before);
}

#[test]
fn test_raise_reopens_the_action() {
    let mut table = HoldemTable::new(GameOptions::default());
    table.add_player(1, "p1".to_string(), 1000).unwrap();
    table.add_player(2, "p2".to_string(), 1000).unwrap();
    table.add_player(3, "p3".to_string(), 1000).unwrap();
    table.start_game().unwrap();

    // Opener calls, next player raises; the opener owes the difference and
    // the round is not over until they respond.
    let opener = current_id(&table);
    table.call(opener).unwrap();
    let raiser = current_id(&table);
    table.bet(raiser, 80).unwrap();
    assert!(table.current_bet() > 20);
    assert_eq!(table.last_raiser(), Some(raiser));
    assert_eq!(table.phase(), GamePhase::Preflop);

    // Action continues around to the players who have not matched.
    let mut guard = 0;
    while table.phase() == GamePhase::Preflop {
        table.call(current_id(&table)).unwrap();
        guard += 1;
        assert!(guard < 10, "round should complete");
    }
    assert_eq!(table.phase(), GamePhase::Flop);
}

#[test]
fn test_next_hand_restarts_from_showdown() {
    let mut table = heads_up();
    table.start_game().unwrap();
    table.fold(1).unwrap();
    assert_eq!(table.phase(), GamePhase::Showdown);

    table.start_game().unwrap();
    assert_eq!(table.phase(), GamePhase::Preflop);
    assert_eq!(table.pot(), 30);
    assert!(table.winners().is_empty());
    assert!(table.actions().iter().all(|a| matches!(
        a.action,
        ActionKind::SmallBlind | ActionKind::BigBlind
    )));
}

#[test]
fn test_action_errors_leave_state_untouched() {
    let mut table = heads_up();
    table.start_game().unwrap();
    let pot = table.pot();
    let log_len = table.actions().len();

    assert_eq!(table.call(2), Err(TableError::NotYourTurn));
    assert_eq!(table.check(1), Err(TableError::CheckNotAllowed { owed: 10 }));
    assert_eq!(table.bet(1, 3), Err(TableError::BetBelowMinimum { min: 10 }));
    assert_eq!(table.call(99), Err(TableError::NotSeated));

    assert_eq!(table.pot(), pot);
    assert_eq!(table.actions().len(), log_len);
    assert_eq!(table.phase(), GamePhase::Preflop);
}
