//! # Holdem
//!
//! A multiplayer Texas Hold'em engine: card model, betting state machine,
//! hand evaluation, pot settlement, and a concurrent table registry.
//!
//! The engine is free of any I/O. Network connections interact with it
//! through the [`Registry`], which hands out tables behind their own
//! mutexes, and through the [`protocol`] module, which parses the
//! line-oriented client commands and frames server pushes.
//!
//! ## Architecture
//!
//! - [`game::entities`]: cards, deck, and seat state
//! - [`game::eval`]: 5-card hand classification and best-of-seven search
//! - [`game::table`]: the betting round state machine
//! - [`game::snapshot`]: pure serialization of a table's public state
//! - [`registry`]: process-wide id -> table map with lifecycle management
//! - [`protocol`]: text command parsing and server message framing
//!
//! ## Example
//!
//! ```
//! use holdem::{Registry, TableConfig, game::entities::PlayerName};
//!
//! let registry = Registry::new(TableConfig::default());
//! let (id, table) = registry.create_table(PlayerName::new("alice"));
//! assert!(registry.get(&id).is_some());
//! assert_eq!(table.lock().unwrap().seats().len(), 1);
//! ```

/// Core game logic: entities, hand evaluation, and the table state machine.
pub mod game;
pub use game::{
    constants,
    entities::{Card, Chips, Deck, DeckError, PlayerName, Seat, Suit},
    eval::{HandCategory, HandValue},
    snapshot::TableSnapshot,
    table::{PlayerAction, Street, Table, TableConfig, TableError, TableState},
};

/// Concurrent id -> table registry.
pub mod registry;
pub use registry::{Registry, SharedTable};

/// Line-oriented text protocol for client-server communication.
pub mod protocol;
pub use protocol::{Command, ProtocolError};
