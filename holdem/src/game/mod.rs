//! Poker game engine.
//!
//! This module provides the foundational game implementation:
//! - Card, deck, and seat entities
//! - Hand evaluation with a total ordering over 5-card hands
//! - The table betting state machine (blinds, streets, showdown)
//! - Pure snapshot serialization of a table's public state

pub mod constants;
pub mod entities;
pub mod eval;
pub mod snapshot;
pub mod table;
