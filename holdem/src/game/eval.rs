//! Five-card hand classification and best-of-seven search.
//!
//! Hands compare by category first, then element-wise over the
//! category-specific tie-break rank sequence. The ace is high-only:
//! A-2-3-4-5 is deliberately not a straight.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::entities::{Card, Value};

/// Hand categories, weakest first so the derived ordering matches
/// hand strength.
#[derive(
    Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize,
)]
pub enum HandCategory {
    HighCard,
    Pair,
    TwoPair,
    ThreeOfAKind,
    Straight,
    Flush,
    FullHouse,
    FourOfAKind,
    StraightFlush,
    RoyalFlush,
}

impl fmt::Display for HandCategory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::HighCard => "High Card",
            Self::Pair => "Pair",
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

/// A classified hand: the category plus its tie-break rank sequence.
/// The derived ordering compares categories, then sequences
/// element-wise, which is exactly the ordering between two hands.
#[derive(Clone, Debug, Eq, Ord, PartialEq, PartialOrd)]
pub struct HandValue {
    pub category: HandCategory,
    pub ranks: Vec<Value>,
}

impl fmt::Display for HandValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.category)
    }
}

/// Classify exactly five cards.
#[must_use]
pub fn evaluate_five(cards: [Card; 5]) -> HandValue {
    let mut cards = cards;
    cards.sort_by(|a, b| b.0.cmp(&a.0));
    let values: Vec<Value> = cards.iter().map(|card| card.0).collect();

    let is_flush = cards.iter().all(|card| card.1 == cards[0].1);
    // Five strictly consecutive descending values. Ace is high-only.
    let is_straight = values.windows(2).all(|pair| pair[0] == pair[1] + 1);

    if is_straight && is_flush {
        let category = if values[0] == 14 {
            HandCategory::RoyalFlush
        } else {
            HandCategory::StraightFlush
        };
        return HandValue {
            category,
            ranks: values,
        };
    }

    // Rank -> count histogram over the sorted values, preserving
    // descending rank order within each count bucket.
    let mut counts: Vec<(Value, usize)> = Vec::with_capacity(5);
    for &value in &values {
        match counts.last_mut() {
            Some(entry) if entry.0 == value => entry.1 += 1,
            _ => counts.push((value, 1)),
        }
    }

    let of_a_kind = |n: usize| counts.iter().find(|&&(_, count)| count == n);
    let kickers = |exclude: &[Value]| -> Vec<Value> {
        values
            .iter()
            .copied()
            .filter(|value| !exclude.contains(value))
            .collect()
    };

    if let Some(&(quad, _)) = of_a_kind(4) {
        let mut ranks = vec![quad];
        ranks.extend(kickers(&[quad]));
        return HandValue {
            category: HandCategory::FourOfAKind,
            ranks,
        };
    }

    if let (Some(&(trips, _)), Some(&(pair, _))) = (of_a_kind(3), of_a_kind(2)) {
        return HandValue {
            category: HandCategory::FullHouse,
            ranks: vec![trips, pair],
        };
    }

    if is_flush {
        return HandValue {
            category: HandCategory::Flush,
            ranks: values,
        };
    }

    if is_straight {
        return HandValue {
            category: HandCategory::Straight,
            ranks: values,
        };
    }

    if let Some(&(trips, _)) = of_a_kind(3) {
        let mut ranks = vec![trips];
        ranks.extend(kickers(&[trips]));
        return HandValue {
            category: HandCategory::ThreeOfAKind,
            ranks,
        };
    }

    let pairs: Vec<Value> = counts
        .iter()
        .filter(|&&(_, count)| count == 2)
        .map(|&(value, _)| value)
        .collect();
    match pairs.as_slice() {
        // Counts are in descending rank order, so pairs already are too.
        [high, low] => {
            let mut ranks = vec![*high, *low];
            ranks.extend(kickers(&[*high, *low]));
            HandValue {
                category: HandCategory::TwoPair,
                ranks,
            }
        }
        [pair] => {
            let mut ranks = vec![*pair];
            ranks.extend(kickers(&[*pair]));
            HandValue {
                category: HandCategory::Pair,
                ranks,
            }
        }
        _ => HandValue {
            category: HandCategory::HighCard,
            ranks: values,
        },
    }
}

/// Find the best five-card hand within a candidate set by enumerating
/// every five-card subset and keeping the maximum. Deterministic, no
/// heuristics. Returns `None` for fewer than five cards.
#[must_use]
pub fn best_hand(cards: &[Card]) -> Option<HandValue> {
    let n = cards.len();
    if n < 5 {
        return None;
    }
    let mut best: Option<HandValue> = None;
    for a in 0..n - 4 {
        for b in a + 1..n - 3 {
            for c in b + 1..n - 2 {
                for d in c + 1..n - 1 {
                    for e in d + 1..n {
                        let hand =
                            evaluate_five([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                        if best.as_ref().is_none_or(|current| hand > *current) {
                            best = Some(hand);
                        }
                    }
                }
            }
        }
    }
    best
}
