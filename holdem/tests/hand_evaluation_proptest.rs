//! Property tests for the hand evaluator, driven by random draws from
//! a real 52-card deck so no impossible hands (duplicate cards) occur.

use proptest::prelude::*;
use proptest::sample::subsequence;

use holdem::game::eval::{best_hand, evaluate_five, HandCategory};
use holdem::{Card, Suit};

fn full_deck() -> Vec<Card> {
    let mut cards = Vec::with_capacity(52);
    for value in 2..=14 {
        for suit in Suit::ALL {
            cards.push(Card(value, suit));
        }
    }
    cards
}

fn five_cards() -> impl Strategy<Value = [Card; 5]> {
    subsequence(full_deck(), 5).prop_map(|cards| {
        [cards[0], cards[1], cards[2], cards[3], cards[4]]
    })
}

proptest! {
    #[test]
    fn evaluation_ignores_input_order(cards in five_cards(), seed in any::<u64>()) {
        let baseline = evaluate_five(cards);
        let mut shuffled = cards;
        // Cheap deterministic permutation from the seed.
        for i in 0..5 {
            let j = ((seed >> (i * 8)) % 5) as usize;
            shuffled.swap(i, j);
        }
        prop_assert_eq!(evaluate_five(shuffled), baseline);
    }

    #[test]
    fn tie_break_ranks_are_descending_within_groups(cards in five_cards()) {
        let hand = evaluate_five(cards);
        prop_assert!(!hand.ranks.is_empty());
        prop_assert!(hand.ranks.iter().all(|rank| (2..=14).contains(rank)));
        // For the categories whose sequence is all five card values,
        // the sequence must be strictly non-increasing.
        match hand.category {
            HandCategory::HighCard
            | HandCategory::Straight
            | HandCategory::Flush
            | HandCategory::StraightFlush
            | HandCategory::RoyalFlush => {
                prop_assert_eq!(hand.ranks.len(), 5);
                prop_assert!(hand.ranks.windows(2).all(|pair| pair[0] >= pair[1]));
            }
            _ => {}
        }
    }

    #[test]
    fn best_of_seven_dominates_every_five_subset(cards in subsequence(full_deck(), 7)) {
        let best = best_hand(&cards).unwrap();
        for a in 0..3 {
            for b in a + 1..4 {
                for c in b + 1..5 {
                    for d in c + 1..6 {
                        for e in d + 1..7 {
                            let hand = evaluate_five([
                                cards[a], cards[b], cards[c], cards[d], cards[e],
                            ]);
                            prop_assert!(hand <= best);
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn adding_cards_never_weakens_the_best_hand(cards in subsequence(full_deck(), 7)) {
        let from_five = best_hand(&cards[..5]).unwrap();
        let from_seven = best_hand(&cards).unwrap();
        prop_assert!(from_seven >= from_five);
    }

    #[test]
    fn same_suit_hands_rank_at_least_a_flush(values in subsequence((2u8..=14).collect::<Vec<_>>(), 5)) {
        let cards = [
            Card(values[0], Suit::Spade),
            Card(values[1], Suit::Spade),
            Card(values[2], Suit::Spade),
            Card(values[3], Suit::Spade),
            Card(values[4], Suit::Spade),
        ];
        let hand = evaluate_five(cards);
        prop_assert!(hand.category >= HandCategory::Flush);
    }
}
