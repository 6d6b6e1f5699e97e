//! The table betting state machine.
//!
//! A table owns its deck and seats and runs hands end-to-end: blind
//! collection, the four betting streets, showdown settlement, and
//! dealer rotation between hands. It knows nothing about connections;
//! callers serialize access through the table's mutex in the registry.

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

use super::constants;
use super::entities::{Card, Chips, Deck, DeckError, PlayerName, Seat};
use super::eval::{self, HandValue};

/// Errors that can occur during table operations. None are fatal to
/// the process; all leave the table unmutated.
#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub enum TableError {
    #[error("table is full")]
    CapacityReached,
    #[error("this name is already taken at the table")]
    NameTaken,
    #[error("no such seat at the table")]
    UnknownSeat,
    #[error("not your turn")]
    OutOfTurn,
    #[error("need 2+ seated players")]
    NotEnoughPlayers,
    #[error("a hand is already in progress")]
    HandInProgress,
    #[error("no hand in progress")]
    HandNotInProgress,
    #[error("the hand is not over")]
    HandNotOver,
    #[error("only the table creator can do that")]
    NotCreator,
    #[error("can't check a live bet")]
    IllegalCheck,
    #[error("illegal bet of {amount}")]
    IllegalBet { amount: Chips },
    #[error("raise to {amount} is below the minimum of {min}")]
    IllegalRaise { amount: Chips, min: Chips },
    #[error("not enough chips")]
    InsufficientChips,
    #[error(transparent)]
    Deck(#[from] DeckError),
}

/// A seat's move during a betting round. Bet sizes travel separately;
/// they're meaningless for fold and check.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum PlayerAction {
    Fold,
    Check,
    Call,
    Bet,
    Raise,
}

impl fmt::Display for PlayerAction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Fold => "folds",
            Self::Check => "checks",
            Self::Call => "calls",
            Self::Bet => "bets",
            Self::Raise => "raises",
        };
        write!(f, "{repr}")
    }
}

/// The betting phase within a hand.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl fmt::Display for Street {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Preflop => "preflop",
            Self::Flop => "flop",
            Self::Turn => "turn",
            Self::River => "river",
            Self::Showdown => "showdown",
        };
        write!(f, "{repr}")
    }
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TableState {
    /// No hand has been played yet; seats may join freely.
    Waiting,
    Playing,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableConfig {
    pub max_seats: usize,
    pub small_blind: Chips,
    pub big_blind: Chips,
    pub starting_chips: Chips,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            max_seats: constants::DEFAULT_MAX_SEATS,
            small_blind: constants::DEFAULT_SMALL_BLIND,
            big_blind: constants::DEFAULT_BIG_BLIND,
            starting_chips: constants::DEFAULT_STARTING_CHIPS,
        }
    }
}

impl TableConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.max_seats < 2 {
            return Err("a table needs room for at least 2 seats".to_string());
        }
        if self.big_blind <= self.small_blind {
            return Err("big blind must be greater than small blind".to_string());
        }
        if self.starting_chips < self.big_blind {
            return Err("starting chips must cover the big blind".to_string());
        }
        Ok(())
    }
}

/// A poker table running hands end-to-end.
///
/// Invariant: the sum of all seats' chips plus the pot is constant
/// across any sequence of in-hand actions.
#[derive(Debug)]
pub struct Table {
    id: String,
    config: TableConfig,
    seats: Vec<Seat>,
    deck: Deck,
    dealer_idx: usize,
    turn_idx: usize,
    street: Street,
    community: Vec<Card>,
    pot: Chips,
    current_bet: Chips,
    /// Minimum increment the next raise must add on top of the
    /// current bet. Resets to the big blind each street.
    last_raise: Chips,
    last_aggressor: Option<usize>,
    committed: HashMap<PlayerName, Chips>,
    state: TableState,
    winner: Option<PlayerName>,
}

impl Table {
    /// Create a table with its creator already seated. The creator
    /// flag is set here and never moves.
    #[must_use]
    pub fn new(id: String, config: TableConfig, creator: PlayerName) -> Self {
        let starting_chips = config.starting_chips;
        let mut table = Self {
            id,
            config,
            seats: Vec::new(),
            deck: Deck::default(),
            dealer_idx: 0,
            turn_idx: 0,
            street: Street::Preflop,
            community: Vec::with_capacity(5),
            pot: 0,
            current_bet: 0,
            last_raise: 0,
            last_aggressor: None,
            committed: HashMap::new(),
            state: TableState::Waiting,
            winner: None,
        };
        table
            .seats
            .push(Seat::new(creator, starting_chips, true));
        table
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn seats(&self) -> &[Seat] {
        &self.seats
    }

    pub fn street(&self) -> Street {
        self.street
    }

    pub fn state(&self) -> TableState {
        self.state
    }

    pub fn pot(&self) -> Chips {
        self.pot
    }

    pub fn current_bet(&self) -> Chips {
        self.current_bet
    }

    pub fn community(&self) -> &[Card] {
        &self.community
    }

    pub fn winner(&self) -> Option<&PlayerName> {
        self.winner.as_ref()
    }

    pub fn committed(&self, name: &PlayerName) -> Chips {
        self.committed.get(name).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }

    /// The seat whose turn it is, if a betting round is live.
    pub fn current_turn(&self) -> Option<&Seat> {
        if self.state != TableState::Playing || self.street == Street::Showdown {
            return None;
        }
        self.seats.get(self.turn_idx)
    }

    /// True while no hand is live: before the first hand or after a
    /// showdown.
    fn between_hands(&self) -> bool {
        self.state == TableState::Waiting || self.street == Street::Showdown
    }

    fn seat_idx(&self, name: &PlayerName) -> Option<usize> {
        self.seats
            .iter()
            .position(|seat| seat.name.eq_ignore_case(name))
    }

    fn active_count(&self) -> usize {
        self.seats.iter().filter(|seat| seat.is_active).count()
    }

    fn next_active_after(&self, idx: usize) -> usize {
        let count = self.seats.len();
        let mut next = (idx + 1) % count;
        while !self.seats[next].is_active {
            next = (next + 1) % count;
        }
        next
    }

    /// Seat a new player. Legal while waiting for the first hand and
    /// between hands, capacity permitting.
    pub fn add_seat(&mut self, name: PlayerName) -> Result<(), TableError> {
        if !self.between_hands() {
            return Err(TableError::HandInProgress);
        }
        if self.seats.len() >= self.config.max_seats {
            return Err(TableError::CapacityReached);
        }
        if self.seat_idx(&name).is_some() {
            return Err(TableError::NameTaken);
        }
        debug!("table {}: {name} takes a seat", self.id);
        self.seats
            .push(Seat::new(name, self.config.starting_chips, false));
        Ok(())
    }

    /// Remove a seat by name. If a hand is live and this leaves fewer
    /// than two contenders, the hand resolves by default win.
    pub fn remove_seat(&mut self, name: &PlayerName) -> Result<(), TableError> {
        let idx = self.seat_idx(name).ok_or(TableError::UnknownSeat)?;
        let seat = self.seats.remove(idx);
        self.committed.remove(&seat.name);
        debug!("table {}: {} leaves", self.id, seat.name);

        if self.seats.is_empty() {
            return Ok(());
        }

        // Repair positions that pointed past the removed seat.
        if idx < self.dealer_idx {
            self.dealer_idx -= 1;
        }
        self.dealer_idx %= self.seats.len();
        if idx < self.turn_idx {
            self.turn_idx -= 1;
        }
        self.turn_idx %= self.seats.len();
        if let Some(aggressor) = self.last_aggressor {
            if aggressor == idx {
                self.last_aggressor = None;
            } else if idx < aggressor {
                self.last_aggressor = Some(aggressor - 1);
            }
        }

        if self.state == TableState::Playing && self.street != Street::Showdown {
            if self.active_count() < 2 {
                self.resolve_default_win();
            } else if !self.seats[self.turn_idx].is_active {
                self.turn_idx = self.next_active_after(self.turn_idx);
            }
        }
        Ok(())
    }

    /// Start the first hand or the next one. The first hand draws the
    /// dealer position uniformly at random; afterwards the button
    /// rotates one seat clockwise.
    pub fn start_hand(&mut self) -> Result<(), TableError> {
        if !self.between_hands() {
            return Err(TableError::HandInProgress);
        }
        if self.seats.len() < 2 {
            return Err(TableError::NotEnoughPlayers);
        }

        if self.state == TableState::Waiting {
            self.dealer_idx = rand::rng().random_range(0..self.seats.len());
        } else {
            self.dealer_idx = (self.dealer_idx + 1) % self.seats.len();
        }

        self.pot = 0;
        self.current_bet = 0;
        self.last_raise = 0;
        self.last_aggressor = None;
        self.committed.clear();
        self.community.clear();
        self.winner = None;
        for seat in &mut self.seats {
            seat.is_active = true;
            seat.clear_hole_cards();
        }
        self.assign_roles();

        self.deck.reset();
        self.deck.shuffle();

        self.collect_blinds()?;

        let small_blind_idx = (self.dealer_idx + 1) % self.seats.len();
        let big_blind_idx = (small_blind_idx + 1) % self.seats.len();
        self.deck.deal_from_seat(
            &mut self.seats,
            small_blind_idx,
            constants::CARDS_PER_SEAT,
        )?;

        self.turn_idx = (big_blind_idx + 1) % self.seats.len();
        self.street = Street::Preflop;
        self.state = TableState::Playing;
        debug!(
            "table {}: new hand, dealer {}",
            self.id, self.seats[self.dealer_idx].name
        );
        Ok(())
    }

    /// Start the next hand after a showdown. Only the table's creator
    /// may force this progression.
    pub fn next_hand(&mut self, requester: &PlayerName) -> Result<(), TableError> {
        let idx = self.seat_idx(requester).ok_or(TableError::UnknownSeat)?;
        if !self.seats[idx].is_creator {
            return Err(TableError::NotCreator);
        }
        if self.state != TableState::Playing || self.street != Street::Showdown {
            return Err(TableError::HandNotOver);
        }
        self.start_hand()
    }

    fn assign_roles(&mut self) {
        for seat in &mut self.seats {
            seat.reset_roles();
        }
        let count = self.seats.len();
        self.seats[self.dealer_idx].is_dealer = true;
        self.seats[(self.dealer_idx + 1) % count].is_small_blind = true;
        self.seats[(self.dealer_idx + 2) % count].is_big_blind = true;
    }

    /// Post the blinds. Short stacks post what they have; the bet to
    /// match is nevertheless the full big blind, and the big blind
    /// seat opens as the aggressor.
    fn collect_blinds(&mut self) -> Result<(), TableError> {
        let count = self.seats.len();
        let small_blind_idx = (self.dealer_idx + 1) % count;
        let big_blind_idx = (small_blind_idx + 1) % count;

        let small = self.config.small_blind.min(self.seats[small_blind_idx].chips);
        self.seats[small_blind_idx].remove_chips(small)?;
        self.pot += small;
        self.committed
            .insert(self.seats[small_blind_idx].name.clone(), small);

        let big = self.config.big_blind.min(self.seats[big_blind_idx].chips);
        self.seats[big_blind_idx].remove_chips(big)?;
        self.pot += big;
        self.committed
            .insert(self.seats[big_blind_idx].name.clone(), big);

        self.current_bet = self.config.big_blind;
        self.last_raise = self.config.big_blind;
        self.last_aggressor = Some(big_blind_idx);
        Ok(())
    }

    /// Apply one betting action for the named seat. Rejected without
    /// mutation unless it is that seat's turn and the action is legal
    /// for the current bet state.
    pub fn apply_action(
        &mut self,
        name: &PlayerName,
        action: PlayerAction,
        amount: Chips,
    ) -> Result<(), TableError> {
        if self.state != TableState::Playing || self.street == Street::Showdown {
            return Err(TableError::HandNotInProgress);
        }
        let idx = self.seat_idx(name).ok_or(TableError::UnknownSeat)?;
        if idx != self.turn_idx {
            return Err(TableError::OutOfTurn);
        }

        let committed = self.committed(&self.seats[idx].name);
        match action {
            PlayerAction::Fold => {
                self.seats[idx].is_active = false;
            }
            PlayerAction::Check => {
                if committed != self.current_bet {
                    return Err(TableError::IllegalCheck);
                }
            }
            PlayerAction::Call => {
                let owed = self.current_bet.saturating_sub(committed);
                let paid = owed.min(self.seats[idx].chips);
                self.seats[idx].remove_chips(paid)?;
                self.pot += paid;
                self.committed
                    .insert(self.seats[idx].name.clone(), committed + paid);
            }
            PlayerAction::Bet => {
                if self.current_bet > 0 {
                    return Err(TableError::IllegalBet { amount });
                }
                if amount < self.config.big_blind || amount > self.seats[idx].chips {
                    return Err(TableError::IllegalBet { amount });
                }
                self.seats[idx].remove_chips(amount)?;
                self.pot += amount;
                self.current_bet = amount;
                self.last_raise = amount;
                self.last_aggressor = Some(idx);
                self.committed.insert(self.seats[idx].name.clone(), amount);
            }
            PlayerAction::Raise => {
                let min = self.current_bet + self.last_raise;
                if amount < min {
                    return Err(TableError::IllegalRaise { amount, min });
                }
                let delta = amount - committed;
                if delta > self.seats[idx].chips {
                    return Err(TableError::InsufficientChips);
                }
                self.seats[idx].remove_chips(delta)?;
                self.pot += delta;
                self.last_raise = amount - self.current_bet;
                self.current_bet = amount;
                self.last_aggressor = Some(idx);
                self.committed.insert(self.seats[idx].name.clone(), amount);
            }
        }
        debug!("table {}: {} {action} ({amount})", self.id, name);

        if self.active_count() < 2 {
            self.resolve_default_win();
            return Ok(());
        }

        self.turn_idx = self.next_active_after(self.turn_idx);
        if self.round_complete() {
            self.advance_street()?;
        }
        Ok(())
    }

    /// A betting round ends when every active seat has matched the
    /// current bet (or is out of chips) and the turn has come back
    /// around to the seat after the dealer (no aggressor yet) or the
    /// seat after the last aggressor.
    fn round_complete(&self) -> bool {
        let all_matched = self
            .seats
            .iter()
            .filter(|seat| seat.is_active)
            .all(|seat| self.committed(&seat.name) == self.current_bet || seat.chips == 0);
        if !all_matched {
            return false;
        }
        let anchor = match self.last_aggressor {
            None => self.next_active_after(self.dealer_idx),
            Some(aggressor) => self.next_active_after(aggressor),
        };
        self.turn_idx == anchor
    }

    fn advance_street(&mut self) -> Result<(), TableError> {
        match self.street {
            Street::Preflop => {
                self.street = Street::Flop;
                self.deck.burn()?;
                let flop = self.deck.deal_cards(3);
                self.community.extend(flop);
            }
            Street::Flop => {
                self.street = Street::Turn;
                self.deck.burn()?;
                self.community.push(self.deck.deal_card()?);
            }
            Street::Turn => {
                self.street = Street::River;
                self.deck.burn()?;
                self.community.push(self.deck.deal_card()?);
            }
            Street::River => {
                self.settle_showdown();
                return Ok(());
            }
            Street::Showdown => return Ok(()),
        }
        debug!("table {}: {} ({:?})", self.id, self.street, self.community);
        self.current_bet = 0;
        self.last_raise = self.config.big_blind;
        self.last_aggressor = None;
        self.committed.clear();
        self.turn_idx = self.next_active_after(self.dealer_idx);
        Ok(())
    }

    /// Everyone but one seat folded: the survivor takes the pot and
    /// the hand is over without dealing further streets.
    fn resolve_default_win(&mut self) {
        self.street = Street::Showdown;
        self.current_bet = 0;
        self.committed.clear();
        if let Some(seat) = self.seats.iter_mut().find(|seat| seat.is_active) {
            seat.add_chips(self.pot);
            self.winner = Some(seat.name.clone());
            debug!(
                "table {}: {} wins {} by default",
                self.id, seat.name, self.pot
            );
        }
        self.pot = 0;
    }

    /// Compare the remaining seats' best five-card hands and pay the
    /// pot. Ties split evenly; the integer remainder goes one chip at
    /// a time to winners in seat order, so no chip is ever lost.
    fn settle_showdown(&mut self) {
        self.street = Street::Showdown;
        self.current_bet = 0;
        self.committed.clear();

        let mut contenders: Vec<(usize, HandValue)> = Vec::new();
        for (idx, seat) in self.seats.iter().enumerate() {
            if !seat.is_active {
                continue;
            }
            let mut cards = seat.hole_cards.clone();
            cards.extend_from_slice(&self.community);
            if let Some(best) = eval::best_hand(&cards) {
                contenders.push((idx, best));
            }
        }
        let Some(best) = contenders.iter().map(|(_, hand)| hand).max().cloned() else {
            self.pot = 0;
            return;
        };
        let winners: Vec<usize> = contenders
            .iter()
            .filter(|(_, hand)| *hand == best)
            .map(|&(idx, _)| idx)
            .collect();

        let share = self.pot / winners.len() as Chips;
        let remainder = self.pot % winners.len() as Chips;
        for (nth, &idx) in winners.iter().enumerate() {
            let extra = u32::from((nth as Chips) < remainder);
            self.seats[idx].add_chips(share + extra);
        }
        self.winner = Some(self.seats[winners[0]].name.clone());
        debug!(
            "table {}: showdown, {} wins with {best}",
            self.id, self.seats[winners[0]].name
        );
        self.pot = 0;
    }
}
