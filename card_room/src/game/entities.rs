use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    hash::{Hash, Hasher},
    str::FromStr,
    sync::atomic::{AtomicU64, Ordering},
};
use thiserror::Error;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Suit {
    Hearts,
    Diamonds,
    Clubs,
    Spades,
    // Jokers get their own suit so an optional pair of them can ride
    // along in a deck without colliding with the standard 52.
    Joker,
}

impl Suit {
    pub const STANDARD: [Self; 4] = [Self::Hearts, Self::Diamonds, Self::Clubs, Self::Spades];

    /// Single-letter code used in wire representations ("Ah", "Td").
    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Hearts => 'h',
            Self::Diamonds => 'd',
            Self::Clubs => 'c',
            Self::Spades => 's',
            Self::Joker => 'j',
        }
    }
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Hearts => "hearts",
            Self::Diamonds => "diamonds",
            Self::Clubs => "clubs",
            Self::Spades => "spades",
            Self::Joker => "joker",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Rank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
    // Joker colors.
    Red,
    Black,
}

impl Rank {
    pub const STANDARD: [Self; 13] = [
        Self::Two,
        Self::Three,
        Self::Four,
        Self::Five,
        Self::Six,
        Self::Seven,
        Self::Eight,
        Self::Nine,
        Self::Ten,
        Self::Jack,
        Self::Queen,
        Self::King,
        Self::Ace,
    ];

    /// Numeric value used for hand ranking (2..10 = 2..10, J=11, Q=12,
    /// K=13, A=14). Jokers carry no value of their own.
    #[must_use]
    pub fn value(self) -> u8 {
        match self {
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
            Self::Six => 6,
            Self::Seven => 7,
            Self::Eight => 8,
            Self::Nine => 9,
            Self::Ten => 10,
            Self::Jack => 11,
            Self::Queen => 12,
            Self::King => 13,
            Self::Ace => 14,
            Self::Red | Self::Black => 0,
        }
    }

    #[must_use]
    pub fn letter(self) -> char {
        match self {
            Self::Two => '2',
            Self::Three => '3',
            Self::Four => '4',
            Self::Five => '5',
            Self::Six => '6',
            Self::Seven => '7',
            Self::Eight => '8',
            Self::Nine => '9',
            Self::Ten => 'T',
            Self::Jack => 'J',
            Self::Queen => 'Q',
            Self::King => 'K',
            Self::Ace => 'A',
            Self::Red => 'R',
            Self::Black => 'B',
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        let rank = match code {
            "2" => Self::Two,
            "3" => Self::Three,
            "4" => Self::Four,
            "5" => Self::Five,
            "6" => Self::Six,
            "7" => Self::Seven,
            "8" => Self::Eight,
            "9" => Self::Nine,
            "10" | "T" => Self::Ten,
            "J" => Self::Jack,
            "Q" => Self::Queen,
            "K" => Self::King,
            "A" => Self::Ace,
            _ => return None,
        };
        Some(rank)
    }
}

/// Unique identifier of a physical card instance.
pub type CardId = u64;

static NEXT_CARD_ID: AtomicU64 = AtomicU64::new(0);

fn next_card_id() -> CardId {
    NEXT_CARD_ID.fetch_add(1, Ordering::Relaxed)
}

/// A playing card. Identity is by `id`, not by (suit, rank): two aces of
/// spades from different decks are different cards as far as deck
/// bookkeeping is concerned.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Card {
    pub suit: Suit,
    pub rank: Rank,
    pub id: CardId,
    pub face_up: bool,
    pub wild: bool,
}

impl Card {
    #[must_use]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Self {
            suit,
            rank,
            id: next_card_id(),
            face_up: true,
            wild: false,
        }
    }

    /// A new logical card sharing this card's suit and rank, with a fresh
    /// identity.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        Self {
            id: next_card_id(),
            ..self.clone()
        }
    }

    /// Numeric rank value used for hand ranking.
    #[must_use]
    pub fn value(&self) -> u8 {
        self.rank.value()
    }

    pub fn flip(&mut self) {
        self.face_up = !self.face_up;
    }

    #[must_use]
    pub fn is_wild(&self) -> bool {
        self.wild
    }

    pub fn make_wild(&mut self) {
        self.wild = true;
    }

    pub fn clear_wild(&mut self) {
        self.wild = false;
    }

    /// Two-character wire code, e.g. "Ah" or "Td".
    #[must_use]
    pub fn code(&self) -> String {
        format!("{}{}", self.rank.letter(), self.suit.letter())
    }
}

impl PartialEq for Card {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Card {}

impl Hash for Card {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Eq, Error, PartialEq)]
#[error("invalid card code: {0}")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    /// Parses codes like "Ah", "Td" or "10d". Jokers are not part of the
    /// wire format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() < 2 || !s.is_ascii() {
            return Err(ParseCardError(s.to_string()));
        }
        let (rank_code, suit_code) = s.split_at(s.len() - 1);
        let rank = Rank::from_code(&rank_code.to_ascii_uppercase())
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let suit = match suit_code.to_ascii_lowercase().as_str() {
            "h" => Suit::Hearts,
            "d" => Suit::Diamonds,
            "c" => Suit::Clubs,
            "s" => Suit::Spades,
            _ => return Err(ParseCardError(s.to_string())),
        };
        Ok(Self::new(suit, rank))
    }
}

/// A deck of cards: an ordered draw pile plus a separate discard pile for
/// burned cards. The multiset of card ids across both piles never changes
/// between construction and the next hand's fresh deck.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    discards: Vec<Card>,
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(false)
    }
}

impl Deck {
    /// Builds the cross-product of 4 suits and 13 ranks, each card with a
    /// freshly generated unique id, optionally followed by two jokers.
    #[must_use]
    pub fn new(include_jokers: bool) -> Self {
        let mut cards = Vec::with_capacity(54);
        for suit in Suit::STANDARD {
            for rank in Rank::STANDARD {
                cards.push(Card::new(suit, rank));
            }
        }
        if include_jokers {
            cards.push(Card::new(Suit::Joker, Rank::Red));
            cards.push(Card::new(Suit::Joker, Rank::Black));
        }
        Self {
            cards,
            discards: Vec::new(),
        }
    }

    /// A freshly shuffled 52-card deck.
    #[must_use]
    pub fn standard() -> Self {
        let mut deck = Self::new(false);
        deck.shuffle();
        deck
    }

    /// Fisher-Yates shuffle of the draw pile.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
    }

    /// Deals the top card. `None` on an empty deck is a terminal signal,
    /// not an error.
    pub fn deal(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Deals up to `count` cards, stopping early if the deck empties.
    pub fn deal_multiple(&mut self, count: usize) -> Vec<Card> {
        (0..count).map_while(|_| self.cards.pop()).collect()
    }

    /// Deals one card into the discard pile. Burned cards are never
    /// returned to callers.
    pub fn burn(&mut self) {
        if let Some(card) = self.cards.pop() {
            self.discards.push(card);
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discards.len()
    }

    /// Recombines the discard pile into the draw pile and reshuffles.
    /// Used only between hands, never mid-hand.
    pub fn reset(&mut self) {
        self.cards.append(&mut self.discards);
        self.shuffle();
    }
}

/// Type alias for chip amounts. All bets and stacks are whole chips.
pub type Chips = u32;

/// Type alias for player identifiers, as issued by the auth collaborator.
pub type PlayerId = i64;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Blinds {
    pub small: Chips,
    pub big: Chips,
}

impl fmt::Display for Blinds {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "${}/{}", self.small, self.big)
    }
}

/// What a player last did, as recorded in the action log and echoed in
/// state payloads.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    SmallBlind,
    BigBlind,
    Bet,
    Call,
    Check,
    Fold,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::SmallBlind => "small_blind",
            Self::BigBlind => "big_blind",
            Self::Bet => "bet",
            Self::Call => "call",
            Self::Check => "check",
            Self::Fold => "fold",
        };
        write!(f, "{repr}")
    }
}

/// One entry of a table's append-only action log.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub player_id: PlayerId,
    pub action: ActionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Chips>,
}

/// A player seated at a table. Chips are a working copy of the persisted
/// balance; reconciliation happens outside the engine.
#[derive(Clone, Debug)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub chips: Chips,
    pub hand: Vec<Card>,
    pub chips_in_pot: Chips,
    pub has_acted: bool,
    pub is_all_in: bool,
    pub is_folded: bool,
    pub last_action: Option<ActionKind>,
}

impl Player {
    #[must_use]
    pub fn new(id: PlayerId, name: String, chips: Chips) -> Self {
        Self {
            id,
            name,
            chips,
            hand: Vec::with_capacity(2),
            chips_in_pot: 0,
            has_acted: false,
            is_all_in: false,
            is_folded: false,
            last_action: None,
        }
    }

    pub fn reset_for_hand(&mut self) {
        self.hand.clear();
        self.chips_in_pot = 0;
        self.has_acted = false;
        self.is_all_in = false;
        self.is_folded = false;
        self.last_action = None;
    }

    /// Whether the player still has moves to make this hand.
    #[must_use]
    pub fn can_act(&self) -> bool {
        !self.is_folded && !self.is_all_in
    }
}
