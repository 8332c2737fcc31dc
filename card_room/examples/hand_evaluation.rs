//! Hand Evaluation Example
//!
//! Demonstrates evaluating and comparing poker hands.

use std::cmp::Ordering;

use card_room::entities::Card;
use card_room::eval::{best_five, compare_hands, evaluate_hand};

fn cards(codes: &[&str]) -> Vec<Card> {
    codes.iter().map(|c| c.parse().unwrap()).collect()
}

fn main() {
    println!("=== Hand Evaluation Example ===\n");

    // Example 1: judge a 5-card hand directly.
    let royal = cards(&["Th", "Jh", "Qh", "Kh", "Ah"]);
    let result = evaluate_hand(&royal).unwrap();
    println!("Hand: {royal:?}");
    println!("Result: {} (rank {})\n", result.description, result.rank);

    // Example 2: compare two hands.
    let aces = evaluate_hand(&cards(&["As", "Ah", "Tc", "9d", "2s"])).unwrap();
    let kings = evaluate_hand(&cards(&["Ks", "Kh", "Tc", "9d", "2s"])).unwrap();
    match compare_hands(&aces, &kings) {
        Ordering::Greater => println!("{} beats {}", aces.description, kings.description),
        Ordering::Less => println!("{} beats {}", kings.description, aces.description),
        Ordering::Equal => println!("Tie!"),
    }

    // Example 3: the showdown search, best 5 of 7.
    let seven = cards(&["Ah", "Kh", "Qh", "Jh", "Th", "9s", "2c"]);
    let best = best_five(&seven).unwrap();
    println!("\nBest 5 of {seven:?}:");
    println!("{}", best.description);
}
