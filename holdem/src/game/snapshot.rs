//! Pure serialization of a table's state for broadcast to clients.
//!
//! Building a snapshot never mutates the table and performs no I/O;
//! the session layer serializes it to JSON and writes it out after
//! releasing the table lock.

use serde::{Deserialize, Serialize};

use super::entities::{Card, Chips, PlayerName};
use super::table::{Street, Table, TableState};

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SeatSnapshot {
    pub name: PlayerName,
    pub chips: Chips,
    pub hole_cards: Vec<Card>,
    pub committed: Chips,
    pub is_dealer: bool,
    pub is_small_blind: bool,
    pub is_big_blind: bool,
    pub is_active: bool,
    pub is_creator: bool,
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct TableSnapshot {
    pub id: String,
    pub state: TableState,
    pub street: Street,
    pub seats: Vec<SeatSnapshot>,
    pub community: Vec<Card>,
    pub pot: Chips,
    pub current_bet: Chips,
    pub current_turn: Option<PlayerName>,
    pub winner: Option<PlayerName>,
}

impl TableSnapshot {
    #[must_use]
    pub fn of(table: &Table) -> Self {
        let seats = table
            .seats()
            .iter()
            .map(|seat| SeatSnapshot {
                name: seat.name.clone(),
                chips: seat.chips,
                hole_cards: seat.hole_cards.clone(),
                committed: table.committed(&seat.name),
                is_dealer: seat.is_dealer,
                is_small_blind: seat.is_small_blind,
                is_big_blind: seat.is_big_blind,
                is_active: seat.is_active,
                is_creator: seat.is_creator,
            })
            .collect();
        Self {
            id: table.id().to_string(),
            state: table.state(),
            street: table.street(),
            seats,
            community: table.community().to_vec(),
            pot: table.pot(),
            current_bet: table.current_bet(),
            current_turn: table.current_turn().map(|seat| seat.name.clone()),
            winner: table.winner().cloned(),
        }
    }
}
