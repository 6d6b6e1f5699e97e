use super::entities::Chips;

/// Number of cards in a fresh deck.
pub const DECK_SIZE: usize = 52;

/// Hole cards dealt to each seat at the start of a hand.
pub const CARDS_PER_SEAT: usize = 2;

/// Maximum length of a player name. Longer names are truncated.
pub const MAX_NAME_LENGTH: usize = 32;

/// Length of generated table ids.
pub const TABLE_ID_LENGTH: usize = 6;

/// Alphabet used for generated table ids.
pub const TABLE_ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const DEFAULT_MAX_SEATS: usize = 4;
pub const DEFAULT_SMALL_BLIND: Chips = 50;
pub const DEFAULT_BIG_BLIND: Chips = 100;
pub const DEFAULT_STARTING_CHIPS: Chips = 1000;
