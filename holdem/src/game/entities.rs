use rand::seq::SliceRandom;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use thiserror::Error;

use super::constants;
use super::table::TableError;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub enum Suit {
    Club,
    Diamond,
    Heart,
    Spade,
}

impl Suit {
    pub const ALL: [Self; 4] = [Self::Club, Self::Diamond, Self::Heart, Self::Spade];
}

impl fmt::Display for Suit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Club => "♣",
            Self::Diamond => "♦",
            Self::Heart => "♥",
            Self::Spade => "♠",
        };
        write!(f, "{repr}")
    }
}

/// Placeholder for card values. Deuce is 2, ace is high-only 14.
pub type Value = u8;

/// A card is a tuple of a value (2u8 ... ace=14u8) and a suit.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct Card(pub Value, pub Suit);

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let value = match self.0 {
            14 => "A",
            13 => "K",
            12 => "Q",
            11 => "J",
            v => &v.to_string(),
        };
        write!(f, "{value}{}", self.1)
    }
}

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum DeckError {
    #[error("no cards remain in the deck")]
    EmptyDeck,
}

fn full_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(constants::DECK_SIZE);
    for value in 2..=14 {
        for suit in Suit::ALL {
            cards.push(Card(value, suit));
        }
    }
    cards
}

/// An ordered deck of cards. Dealing advances an index rather than
/// removing cards so a hand can never duplicate or lose a card.
#[derive(Debug)]
pub struct Deck {
    cards: Vec<Card>,
    deal_idx: usize,
}

impl Default for Deck {
    fn default() -> Self {
        Self {
            cards: full_deck(),
            deal_idx: 0,
        }
    }
}

impl Deck {
    /// Reinitialize to the full 52-card set, clearing any dealt state.
    pub fn reset(&mut self) {
        self.cards = full_deck();
        self.deal_idx = 0;
    }

    /// Uniformly permute the deck and rewind the deal index.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut rand::rng());
        self.deal_idx = 0;
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.deal_idx
    }

    pub fn deal_card(&mut self) -> Result<Card, DeckError> {
        let card = *self.cards.get(self.deal_idx).ok_or(DeckError::EmptyDeck)?;
        self.deal_idx += 1;
        Ok(card)
    }

    /// Deal up to `n` cards, stopping early if the deck is exhausted.
    pub fn deal_cards(&mut self, n: usize) -> Vec<Card> {
        (0..n).map_while(|_| self.deal_card().ok()).collect()
    }

    /// Discard one card without revealing it.
    pub fn burn(&mut self) -> Result<(), DeckError> {
        self.deal_card().map(|_| ())
    }

    /// Deal `per_seat` hole cards to every seat, one card at a time
    /// round-robin starting at `start_idx`. Clears each seat's hole
    /// cards first.
    pub fn deal_from_seat(
        &mut self,
        seats: &mut [Seat],
        start_idx: usize,
        per_seat: usize,
    ) -> Result<(), DeckError> {
        if seats.is_empty() {
            return Ok(());
        }
        for seat in seats.iter_mut() {
            seat.clear_hole_cards();
        }
        let count = seats.len();
        let start_idx = start_idx % count;
        for _ in 0..per_seat {
            for offset in 0..count {
                let card = self.deal_card()?;
                seats[(start_idx + offset) % count].hole_cards.push(card);
            }
        }
        Ok(())
    }
}

/// Type alias for whole chips. All bets and stacks are whole chips.
pub type Chips = u32;

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct PlayerName(String);

impl PlayerName {
    pub fn new(s: &str) -> Self {
        let mut name: String = s
            .trim()
            .chars()
            .map(|c| if c.is_ascii_whitespace() { '_' } else { c })
            .collect();
        name.truncate(constants::MAX_NAME_LENGTH);
        Self(name)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name uniqueness at a table is case-insensitive.
    pub fn eq_ignore_case(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for PlayerName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for PlayerName {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// One table occupant's state. Holds no connection or I/O handles; the
/// session layer maps seat names to connections.
#[derive(Clone, Debug)]
pub struct Seat {
    pub name: PlayerName,
    pub chips: Chips,
    pub hole_cards: Vec<Card>,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    /// False once the seat has folded out of the current hand.
    pub is_active: bool,
    /// Set on exactly one seat per table, at table creation. Immutable.
    pub is_creator: bool,
}

impl Seat {
    #[must_use]
    pub fn new(name: PlayerName, chips: Chips, is_creator: bool) -> Self {
        Self {
            name,
            chips,
            hole_cards: Vec::with_capacity(constants::CARDS_PER_SEAT),
            is_dealer: false,
            is_small_blind: false,
            is_big_blind: false,
            is_active: true,
            is_creator,
        }
    }

    pub fn add_chips(&mut self, amount: Chips) {
        self.chips += amount;
    }

    /// Remove chips from the stack. Fails without mutation when the
    /// stack is short.
    pub fn remove_chips(&mut self, amount: Chips) -> Result<(), TableError> {
        if amount > self.chips {
            return Err(TableError::InsufficientChips);
        }
        self.chips -= amount;
        Ok(())
    }

    /// Clear all three role flags.
    pub fn reset_roles(&mut self) {
        self.is_dealer = false;
        self.is_small_blind = false;
        self.is_big_blind = false;
    }

    pub fn clear_hole_cards(&mut self) {
        self.hole_cards.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    // === Card tests ===

    #[test]
    fn card_equality_by_value() {
        assert_eq!(Card(14, Suit::Spade), Card(14, Suit::Spade));
        assert_ne!(Card(14, Suit::Spade), Card(14, Suit::Heart));
        assert_ne!(Card(14, Suit::Spade), Card(13, Suit::Spade));
    }

    #[test]
    fn card_display_face_cards() {
        assert_eq!(Card(14, Suit::Spade).to_string(), "A♠");
        assert_eq!(Card(13, Suit::Heart).to_string(), "K♥");
        assert_eq!(Card(12, Suit::Diamond).to_string(), "Q♦");
        assert_eq!(Card(11, Suit::Club).to_string(), "J♣");
        assert_eq!(Card(10, Suit::Club).to_string(), "10♣");
        assert_eq!(Card(2, Suit::Heart).to_string(), "2♥");
    }

    // === Deck tests ===

    #[test]
    fn reset_deck_has_52_unique_cards() {
        let mut deck = Deck::default();
        deck.shuffle();
        deck.deal_cards(10);
        deck.reset();

        let mut seen = HashSet::new();
        for _ in 0..constants::DECK_SIZE {
            let card = deck.deal_card().unwrap();
            assert!((2..=14).contains(&card.0));
            assert!(seen.insert(card), "duplicate card dealt: {card}");
        }
        assert_eq!(seen.len(), 52);
    }

    #[test]
    fn deal_beyond_52_fails_with_empty_deck() {
        let mut deck = Deck::default();
        for _ in 0..constants::DECK_SIZE {
            assert!(deck.deal_card().is_ok());
        }
        assert_eq!(deck.deal_card(), Err(DeckError::EmptyDeck));
    }

    #[test]
    fn shuffle_keeps_all_cards_and_rewinds() {
        let mut deck = Deck::default();
        deck.deal_cards(5);
        deck.shuffle();
        assert_eq!(deck.remaining(), 52);

        let cards: HashSet<Card> = deck.deal_cards(52).into_iter().collect();
        assert_eq!(cards.len(), 52);
    }

    #[test]
    fn deal_cards_stops_early_when_exhausted() {
        let mut deck = Deck::default();
        deck.deal_cards(50);
        let rest = deck.deal_cards(10);
        assert_eq!(rest.len(), 2);
        assert_eq!(deck.remaining(), 0);
    }

    #[test]
    fn burn_discards_one_card() {
        let mut deck = Deck::default();
        assert!(deck.burn().is_ok());
        assert_eq!(deck.remaining(), 51);
    }

    #[test]
    fn deal_from_seat_round_robin() {
        let mut deck = Deck::default();
        deck.shuffle();
        let mut seats = vec![
            Seat::new(PlayerName::new("alice"), 1000, true),
            Seat::new(PlayerName::new("bob"), 1000, false),
            Seat::new(PlayerName::new("carol"), 1000, false),
        ];
        // Stale hole cards from a previous hand must be cleared.
        seats[0].hole_cards.push(Card(2, Suit::Club));

        deck.deal_from_seat(&mut seats, 1, 2).unwrap();
        for seat in &seats {
            assert_eq!(seat.hole_cards.len(), 2);
        }
        assert_eq!(deck.remaining(), 52 - 6);

        let dealt: HashSet<Card> = seats
            .iter()
            .flat_map(|s| s.hole_cards.iter().copied())
            .collect();
        assert_eq!(dealt.len(), 6);
    }

    #[test]
    fn deal_from_seat_starts_at_given_index() {
        let mut deck = Deck::default();
        let mut seats = vec![
            Seat::new(PlayerName::new("a"), 1000, true),
            Seat::new(PlayerName::new("b"), 1000, false),
        ];
        // Unshuffled deck deals in a known order: seat 1 gets the first card.
        deck.deal_from_seat(&mut seats, 1, 1).unwrap();
        assert_eq!(seats[1].hole_cards[0], Card(2, Suit::Club));
        assert_eq!(seats[0].hole_cards[0], Card(2, Suit::Diamond));
    }

    #[test]
    fn deal_from_seat_empty_seats_is_noop() {
        let mut deck = Deck::default();
        let mut seats: Vec<Seat> = Vec::new();
        assert!(deck.deal_from_seat(&mut seats, 0, 2).is_ok());
        assert_eq!(deck.remaining(), 52);
    }

    // === PlayerName tests ===

    #[test]
    fn player_name_normalizes_whitespace() {
        assert_eq!(PlayerName::new("alice bob").as_str(), "alice_bob");
        assert_eq!(PlayerName::new("  carol  ").as_str(), "carol");
    }

    #[test]
    fn player_name_truncates() {
        let long = "x".repeat(100);
        assert_eq!(
            PlayerName::new(&long).as_str().len(),
            constants::MAX_NAME_LENGTH
        );
    }

    #[test]
    fn player_name_case_insensitive_match() {
        let a = PlayerName::new("Alice");
        let b = PlayerName::new("alice");
        assert_ne!(a, b);
        assert!(a.eq_ignore_case(&b));
    }

    // === Seat tests ===

    #[test]
    fn remove_chips_fails_without_mutation() {
        let mut seat = Seat::new(PlayerName::new("alice"), 100, false);
        assert_eq!(
            seat.remove_chips(101),
            Err(TableError::InsufficientChips)
        );
        assert_eq!(seat.chips, 100);
        assert!(seat.remove_chips(100).is_ok());
        assert_eq!(seat.chips, 0);
    }

    #[test]
    fn reset_roles_clears_all_flags() {
        let mut seat = Seat::new(PlayerName::new("alice"), 100, false);
        seat.is_dealer = true;
        seat.is_small_blind = true;
        seat.is_big_blind = true;
        seat.reset_roles();
        assert!(!seat.is_dealer && !seat.is_small_blind && !seat.is_big_blind);
    }

    #[test]
    fn new_seat_is_active_with_no_cards() {
        let seat = Seat::new(PlayerName::new("alice"), 1000, true);
        assert!(seat.is_active);
        assert!(seat.is_creator);
        assert!(seat.hole_cards.is_empty());
    }
}
