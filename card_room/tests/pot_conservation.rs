//! Chip conservation under randomized play: whatever sequence of legal
//! actions a hand sees, the pot always equals the sum of player
//! contributions, and settlement is exactly zero-sum.

use rand::Rng;

use card_room::entities::Chips;
use card_room::{GameOptions, GamePhase, HoldemTable};

fn in_pots(table: &HoldemTable) -> Chips {
    table.players().iter().map(|p| p.chips_in_pot).sum()
}

fn stacks(table: &HoldemTable) -> Chips {
    table.players().iter().map(|p| p.chips).sum()
}

fn is_betting(phase: GamePhase) -> bool {
    matches!(
        phase,
        GamePhase::Preflop | GamePhase::Flop | GamePhase::Turn | GamePhase::River
    )
}

/// Plays one hand to completion with random legal actions, checking the
/// pot invariant after every step.
fn play_random_hand(table: &mut HoldemTable, rng: &mut impl Rng) {
    table.start_game().unwrap();
    let mut steps = 0;

    while is_betting(table.phase()) {
        assert_eq!(table.pot(), in_pots(table), "pot must equal contributions");

        let actor = table.current_player().expect("betting round has an actor");
        let id = actor.id;
        let owed = table.current_bet().saturating_sub(actor.chips_in_pot);

        let roll = rng.random_range(0..10);
        let result = if roll == 0 {
            table.fold(id)
        } else if roll <= 2 {
            // Raise by a small random amount on top of the deficit.
            table.bet(id, owed + rng.random_range(1..50))
        } else if owed > 0 {
            table.call(id)
        } else {
            table.check(id)
        };
        result.unwrap();

        steps += 1;
        assert!(steps < 10_000, "hand must terminate");
    }

    assert_eq!(table.phase(), GamePhase::Showdown);
    assert_eq!(table.pot(), 0, "settlement must zero the pot");
}

#[test]
fn test_random_heads_up_hands_conserve_chips() {
    let mut rng = rand::rng();
    for _ in 0..25 {
        let mut table = HoldemTable::new(GameOptions::default());
        table.add_player(1, "p1".to_string(), 1000).unwrap();
        table.add_player(2, "p2".to_string(), 1000).unwrap();

        play_random_hand(&mut table, &mut rng);

        assert_eq!(stacks(&table), 2000, "settlement is zero-sum");
    }
}

#[test]
fn test_random_four_player_hands_conserve_chips() {
    let mut rng = rand::rng();
    for _ in 0..25 {
        let mut table = HoldemTable::new(GameOptions::default());
        for i in 1..=4 {
            table.add_player(i, format!("p{i}"), 500).unwrap();
        }

        play_random_hand(&mut table, &mut rng);

        assert_eq!(stacks(&table), 2000, "settlement is zero-sum");
    }
}

#[test]
fn test_winner_payouts_match_the_pot() {
    let mut rng = rand::rng();
    for _ in 0..25 {
        let mut table = HoldemTable::new(GameOptions::default());
        for i in 1..=3 {
            table.add_player(i, format!("p{i}"), 300).unwrap();
        }
        let before = stacks(&table);

        table.start_game().unwrap();
        let committed_goal = before; // stacks + pot is constant all hand
        while is_betting(table.phase()) {
            assert_eq!(stacks(&table) + table.pot(), committed_goal);
            let actor = table.current_player().unwrap();
            let id = actor.id;
            let owed = table.current_bet().saturating_sub(actor.chips_in_pot);
            if owed > 0 {
                table.call(id).unwrap();
            } else if rng.random_range(0..4) == 0 {
                table.bet(id, rng.random_range(10..80)).unwrap();
            } else {
                table.check(id).unwrap();
            }
        }

        let paid: Chips = table.winners().iter().map(|w| w.win_amount).sum();
        let contributed: Chips = in_pots(&table);
        assert_eq!(paid, contributed, "every contributed chip is paid out");
        assert_eq!(stacks(&table), before);
    }
}
