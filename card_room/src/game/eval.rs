//! Five-card poker hand evaluation.
//!
//! Hands are classified in strength order and scored with a bit-packed
//! tie-break value so that two evaluations compare with plain integer
//! comparisons. The packing is `(category << 20) | tb0 << 16 | tb1 << 12 |
//! tb2 << 8 | tb3 << 4 | tb4`, four bits per field (rank values span 2..14),
//! most significant facts first. Reimplementations that keep these widths
//! agree on every comparison.

use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, BTreeSet},
    fmt,
};
use thiserror::Error;

use super::constants::HAND_SIZE;
use super::entities::Card;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum HandName {
    HighCard,
    OnePair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl HandName {
    /// Category rank, 1 (high card) through 10 (royal flush).
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::HighCard => 1,
            Self::OnePair => 2,
            Self::TwoPair => 3,
            Self::ThreeOfAKind => 4,
            Self::Straight => 5,
            Self::Flush => 6,
            Self::FullHouse => 7,
            Self::FourOfAKind => 8,
            Self::StraightFlush => 9,
            Self::RoyalFlush => 10,
        }
    }
}

impl fmt::Display for HandName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::OnePair => "One Pair",
            Self::TwoPair => "Two Pair",
            Self::ThreeOfAKind => "Three of a Kind",
            Self::Straight => "Straight",
            Self::Flush => "Flush",
            Self::FullHouse => "Full House",
            Self::FourOfAKind => "Four of a Kind",
            Self::StraightFlush => "Straight Flush",
            Self::RoyalFlush => "Royal Flush",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum EvalError {
    #[error("no cards provided for evaluation")]
    NoCards,
    #[error("need at least 5 cards, got {got}")]
    NotEnoughCards { got: usize },
}

/// The result of judging a set of cards.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct HandEvaluation {
    pub name: HandName,
    /// Category rank 1..10, duplicated from `name` for wire payloads.
    pub rank: u8,
    /// Bit-packed tie-break value (see module docs).
    pub value: u32,
    /// The judged cards, sorted descending by rank value.
    pub cards: Vec<Card>,
    pub description: String,
}

impl HandEvaluation {
    fn key(&self) -> (u8, u32) {
        (self.rank, self.value)
    }
}

impl PartialEq for HandEvaluation {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for HandEvaluation {}

impl PartialOrd for HandEvaluation {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HandEvaluation {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Compares two evaluations: category first, packed tie-break value second.
/// `Greater` means `a` wins; `Equal` means an exact tie (split pot).
#[must_use]
pub fn compare_hands(a: &HandEvaluation, b: &HandEvaluation) -> Ordering {
    a.cmp(b)
}

/// Judges exactly the cards given (5 for direct evaluation; the table
/// supplies 5-of-7 subsets for Hold'em). Fails on empty input.
pub fn evaluate_hand(cards: &[Card]) -> Result<HandEvaluation, EvalError> {
    if cards.is_empty() {
        return Err(EvalError::NoCards);
    }
    let mut sorted = cards.to_vec();
    sorted.sort_by(|a, b| b.value().cmp(&a.value()));

    let (name, tiebreaks) = classify(&sorted);
    let mut value = u32::from(name.rank()) << 20;
    for (i, tb) in tiebreaks.iter().take(5).enumerate() {
        value |= u32::from(*tb) << (16 - 4 * i);
    }
    let description = describe(name, &sorted, &tiebreaks);

    Ok(HandEvaluation {
        name,
        rank: name.rank(),
        value,
        cards: sorted,
        description,
    })
}

/// Finds the best 5-card hand among all C(n,5) subsets of `cards`.
pub fn best_five(cards: &[Card]) -> Result<HandEvaluation, EvalError> {
    if cards.is_empty() {
        return Err(EvalError::NoCards);
    }
    if cards.len() < HAND_SIZE {
        return Err(EvalError::NotEnoughCards { got: cards.len() });
    }
    let mut best: Option<HandEvaluation> = None;
    for combo in combinations(cards, HAND_SIZE) {
        let evaluation = evaluate_hand(&combo)?;
        if best.as_ref().is_none_or(|b| evaluation > *b) {
            best = Some(evaluation);
        }
    }
    best.ok_or(EvalError::NotEnoughCards { got: cards.len() })
}

/// Classification in strength order; the first match wins. Returns the
/// category and its tie-break facts, most significant first.
fn classify(sorted: &[Card]) -> (HandName, Vec<u8>) {
    let counts = rank_counts(sorted);
    let flush = is_flush(sorted);
    let straight = straight_high(sorted);

    if flush && let Some(high) = straight {
        return if high == 14 {
            (HandName::RoyalFlush, vec![high])
        } else {
            (HandName::StraightFlush, vec![high])
        };
    }

    if let Some(&(quad, _)) = counts.iter().find(|(_, n)| *n == 4) {
        let kicker = other_ranks(&counts, quad).first().copied().unwrap_or(0);
        return (HandName::FourOfAKind, vec![quad, kicker]);
    }

    let trips: Vec<u8> = counts.iter().filter(|(_, n)| *n == 3).map(|(v, _)| *v).collect();
    let pairs: Vec<u8> = counts.iter().filter(|(_, n)| *n == 2).map(|(v, _)| *v).collect();

    if let (Some(&trip), Some(&pair)) = (trips.first(), pairs.first()) {
        return (HandName::FullHouse, vec![trip, pair]);
    }

    if flush {
        return (HandName::Flush, top_values(sorted, 5));
    }

    if let Some(high) = straight {
        return (HandName::Straight, vec![high]);
    }

    if let Some(&trip) = trips.first() {
        let mut tiebreaks = vec![trip];
        tiebreaks.extend(other_ranks(&counts, trip).into_iter().take(2));
        return (HandName::ThreeOfAKind, tiebreaks);
    }

    if pairs.len() >= 2 {
        let kicker = counts
            .iter()
            .filter(|(_, n)| *n == 1)
            .map(|(v, _)| *v)
            .max()
            .unwrap_or(0);
        return (HandName::TwoPair, vec![pairs[0], pairs[1], kicker]);
    }

    if let Some(&pair) = pairs.first() {
        let mut tiebreaks = vec![pair];
        tiebreaks.extend(other_ranks(&counts, pair).into_iter().take(3));
        return (HandName::OnePair, tiebreaks);
    }

    (HandName::HighCard, top_values(sorted, 5))
}

/// Rank values and their multiplicities, sorted by count descending then
/// value descending.
fn rank_counts(cards: &[Card]) -> Vec<(u8, u8)> {
    let mut map: BTreeMap<u8, u8> = BTreeMap::new();
    for card in cards {
        *map.entry(card.value()).or_default() += 1;
    }
    let mut counts: Vec<(u8, u8)> = map.into_iter().collect();
    counts.sort_by(|a, b| b.1.cmp(&a.1).then(b.0.cmp(&a.0)));
    counts
}

/// Every rank value other than `exclude`, descending.
fn other_ranks(counts: &[(u8, u8)], exclude: u8) -> Vec<u8> {
    let mut ranks: Vec<u8> = counts.iter().map(|(v, _)| *v).filter(|v| *v != exclude).collect();
    ranks.sort_by(|a, b| b.cmp(a));
    ranks
}

fn top_values(sorted: &[Card], count: usize) -> Vec<u8> {
    sorted.iter().take(count).map(Card::value).collect()
}

fn is_flush(cards: &[Card]) -> bool {
    cards.iter().all(|c| c.suit == cards[0].suit)
}

/// High card of the best run of 5 consecutive unique ranks, if any. The
/// wheel (A-2-3-4-5) counts as a straight whose high card is 5, not 14, and
/// only when no higher run exists.
fn straight_high(cards: &[Card]) -> Option<u8> {
    let unique: BTreeSet<u8> = cards.iter().map(|c| c.value()).collect();
    let ranks: Vec<u8> = unique.into_iter().collect();
    if ranks.len() < 5 {
        return None;
    }
    for start in (0..=ranks.len() - 5).rev() {
        let window = &ranks[start..start + 5];
        if window.windows(2).all(|pair| pair[1] == pair[0] + 1) {
            return Some(window[4]);
        }
    }
    let has = |v: u8| ranks.binary_search(&v).is_ok();
    if has(14) && has(2) && has(3) && has(4) && has(5) {
        return Some(5);
    }
    None
}

fn rank_label(value: u8) -> String {
    match value {
        14 => "A".to_string(),
        13 => "K".to_string(),
        12 => "Q".to_string(),
        11 => "J".to_string(),
        10 => "T".to_string(),
        v => v.to_string(),
    }
}

fn describe(name: HandName, cards: &[Card], tiebreaks: &[u8]) -> String {
    match name {
        HandName::RoyalFlush => format!("Royal Flush ({})", cards[0].suit),
        HandName::StraightFlush => format!(
            "Straight Flush ({} high, {})",
            rank_label(tiebreaks[0]),
            cards[0].suit
        ),
        HandName::FourOfAKind => format!(
            "Four of a Kind ({}s with {} kicker)",
            rank_label(tiebreaks[0]),
            rank_label(tiebreaks[1])
        ),
        HandName::FullHouse => format!(
            "Full House ({}s full of {}s)",
            rank_label(tiebreaks[0]),
            rank_label(tiebreaks[1])
        ),
        HandName::Flush => format!("Flush ({}, {} high)", cards[0].suit, rank_label(tiebreaks[0])),
        HandName::Straight => format!("Straight ({} high)", rank_label(tiebreaks[0])),
        HandName::ThreeOfAKind => format!("Three of a Kind ({}s)", rank_label(tiebreaks[0])),
        HandName::TwoPair => format!(
            "Two Pair ({}s and {}s)",
            rank_label(tiebreaks[0]),
            rank_label(tiebreaks[1])
        ),
        HandName::OnePair => format!("One Pair ({}s)", rank_label(tiebreaks[0])),
        HandName::HighCard => format!("High Card ({} high)", rank_label(cards[0].value())),
    }
}

/// All k-card subsets of `cards`, in input order.
fn combinations(cards: &[Card], k: usize) -> Vec<Vec<Card>> {
    fn recurse(cards: &[Card], k: usize, start: usize, current: &mut Vec<Card>, out: &mut Vec<Vec<Card>>) {
        if current.len() == k {
            out.push(current.clone());
            return;
        }
        for i in start..cards.len() {
            current.push(cards[i].clone());
            recurse(cards, k, i + 1, current, out);
            current.pop();
        }
    }
    let mut out = Vec::new();
    let mut current = Vec::with_capacity(k);
    recurse(cards, k, 0, &mut current, &mut out);
    out
}
