//! Property-based tests for hand evaluation: the comparison must be a
//! consistent total order (antisymmetric, transitive) across arbitrary
//! hands, and evaluation must be deterministic and total on valid input.

use proptest::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use card_room::entities::{Card, Rank, Suit};
use card_room::eval::{HandEvaluation, best_five, compare_hands, evaluate_hand};

fn rank_from_value(value: u8) -> Rank {
    match value {
        2 => Rank::Two,
        3 => Rank::Three,
        4 => Rank::Four,
        5 => Rank::Five,
        6 => Rank::Six,
        7 => Rank::Seven,
        8 => Rank::Eight,
        9 => Rank::Nine,
        10 => Rank::Ten,
        11 => Rank::Jack,
        12 => Rank::Queen,
        13 => Rank::King,
        _ => Rank::Ace,
    }
}

fn suit_from_index(index: u8) -> Suit {
    match index {
        0 => Suit::Hearts,
        1 => Suit::Diamonds,
        2 => Suit::Clubs,
        _ => Suit::Spades,
    }
}

// Strategy for `count` distinct (rank, suit) pairs, materialized as cards.
fn unique_cards(count: usize) -> impl Strategy<Value = Vec<Card>> {
    prop::collection::btree_set((2u8..=14, 0u8..=3), count).prop_map(|set| {
        set.into_iter()
            .map(|(value, suit)| Card::new(suit_from_index(suit), rank_from_value(value)))
            .collect()
    })
}

fn eval5(cards: &[Card]) -> HandEvaluation {
    evaluate_hand(cards).expect("5 cards evaluate")
}

proptest! {
    #[test]
    fn test_evaluation_is_total_on_five_cards(cards in unique_cards(5)) {
        let result = eval5(&cards);
        prop_assert!((1..=10).contains(&result.rank));
        prop_assert_eq!(result.rank, result.name.rank());
        prop_assert!(!result.description.is_empty());
        prop_assert_eq!(result.cards.len(), 5);
    }

    #[test]
    fn test_evaluation_is_deterministic(cards in unique_cards(5)) {
        let a = eval5(&cards);
        let b = eval5(&cards);
        prop_assert_eq!(a.rank, b.rank);
        prop_assert_eq!(a.value, b.value);
    }

    #[test]
    fn test_comparison_is_antisymmetric(a in unique_cards(5), b in unique_cards(5)) {
        let left = eval5(&a);
        let right = eval5(&b);
        prop_assert_eq!(
            compare_hands(&left, &right),
            compare_hands(&right, &left).reverse()
        );
    }

    #[test]
    fn test_comparison_is_transitive(
        a in unique_cards(5),
        b in unique_cards(5),
        c in unique_cards(5),
    ) {
        let x = eval5(&a);
        let y = eval5(&b);
        let z = eval5(&c);
        if compare_hands(&x, &y) != Ordering::Less && compare_hands(&y, &z) != Ordering::Less {
            prop_assert_ne!(compare_hands(&x, &z), Ordering::Less);
        }
    }

    #[test]
    fn test_evaluation_ignores_input_order(cards in unique_cards(5)) {
        let forward = eval5(&cards);
        let mut reversed = cards.clone();
        reversed.reverse();
        let backward = eval5(&reversed);
        prop_assert_eq!(forward.rank, backward.rank);
        prop_assert_eq!(forward.value, backward.value);
    }

    #[test]
    fn test_best_five_dominates_every_subset(cards in unique_cards(7)) {
        let best = best_five(&cards).expect("7 cards evaluate");
        // The first five cards are one of the C(7,5) subsets.
        let some_subset = eval5(&cards[..5]);
        prop_assert_ne!(compare_hands(&best, &some_subset), Ordering::Less);
    }

    #[test]
    fn test_duplicated_rank_set_ties(cards in unique_cards(5)) {
        // Rebuilding the same ranks in the same suits yields an exact tie,
        // even though the card ids differ.
        let rebuilt: Vec<Card> = cards.iter().map(Card::duplicate).collect();
        let a = eval5(&cards);
        let b = eval5(&rebuilt);
        prop_assert_eq!(compare_hands(&a, &b), Ordering::Equal);
    }
}

#[test]
fn test_distinct_categories_never_tie() {
    let straight: Vec<Card> = ["6h", "7d", "8c", "9s", "Th"]
        .iter()
        .map(|c| c.parse().unwrap())
        .collect();
    let flush: Vec<Card> = ["2d", "5d", "9d", "Jd", "Ad"]
        .iter()
        .map(|c| c.parse().unwrap())
        .collect();
    let a = eval5(&straight);
    let b = eval5(&flush);
    assert_eq!(compare_hands(&b, &a), Ordering::Greater);
}
