//! The line-oriented wire protocol.
//!
//! Clients send newline-terminated, colon-delimited commands; the
//! server answers with a status line and pushes `UPDATE_GAME:<json>`
//! snapshots to every seated connection after state changes. Command
//! words match case-insensitively; a malformed line is an error for
//! that line only and never tears down the connection.

use std::fmt;
use thiserror::Error;

use crate::game::entities::{Chips, PlayerName};
use crate::game::snapshot::TableSnapshot;
use crate::game::table::PlayerAction;

pub const UPDATE_PREFIX: &str = "UPDATE_GAME:";

#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum ProtocolError {
    #[error("unknown command {0:?}")]
    UnknownCommand(String),
    #[error("{command} expects {expected} fields, got {found}")]
    WrongFieldCount {
        command: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("invalid amount {0:?}")]
    InvalidAmount(String),
    #[error("player name must not be empty")]
    EmptyName,
}

/// A parsed client command. Field order follows the wire format, which
/// is not uniform: `LEAVE_GAME` puts the name before the table id
/// while the action commands put the id first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Create {
        name: PlayerName,
    },
    Join {
        name: PlayerName,
        game_id: String,
    },
    StartGame {
        game_id: String,
    },
    Action {
        game_id: String,
        name: PlayerName,
        action: PlayerAction,
        amount: Chips,
    },
    NextGame {
        game_id: String,
        name: PlayerName,
    },
    Leave {
        name: PlayerName,
        game_id: String,
    },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Create { name } => write!(f, "CREATE:{name}"),
            Self::Join { name, game_id } => write!(f, "JOIN:{name}:{game_id}"),
            Self::StartGame { game_id } => write!(f, "START_GAME:{game_id}"),
            Self::Action {
                game_id,
                name,
                action,
                amount,
            } => match action {
                PlayerAction::Fold => write!(f, "FOLD:{game_id}:{name}"),
                PlayerAction::Check => write!(f, "CHECK:{game_id}:{name}"),
                PlayerAction::Call => write!(f, "CALL:{game_id}:{name}:{amount}"),
                PlayerAction::Bet => write!(f, "BET:{game_id}:{name}:{amount}"),
                PlayerAction::Raise => write!(f, "RAISE:{game_id}:{name}:{amount}"),
            },
            Self::NextGame { game_id, name } => write!(f, "NEXTGAME:{game_id}:{name}"),
            Self::Leave { name, game_id } => write!(f, "LEAVE_GAME:{name}:{game_id}"),
        }
    }
}

fn expect_fields(
    command: &'static str,
    fields: &[&str],
    expected: usize,
) -> Result<(), ProtocolError> {
    if fields.len() == expected {
        Ok(())
    } else {
        Err(ProtocolError::WrongFieldCount {
            command,
            expected,
            found: fields.len(),
        })
    }
}

fn parse_name(raw: &str) -> Result<PlayerName, ProtocolError> {
    let name = PlayerName::new(raw);
    if name.as_str().is_empty() {
        return Err(ProtocolError::EmptyName);
    }
    Ok(name)
}

fn parse_amount(raw: &str) -> Result<Chips, ProtocolError> {
    raw.trim()
        .parse()
        .map_err(|_| ProtocolError::InvalidAmount(raw.to_string()))
}

impl Command {
    /// Parse one trimmed input line.
    pub fn parse(line: &str) -> Result<Self, ProtocolError> {
        let line = line.trim();
        let (word, rest) = match line.split_once(':') {
            Some((word, rest)) => (word, rest),
            None => (line, ""),
        };
        let fields: Vec<&str> = if rest.is_empty() {
            Vec::new()
        } else {
            rest.split(':').collect()
        };

        match word.to_ascii_uppercase().as_str() {
            "CREATE" => {
                expect_fields("CREATE", &fields, 1)?;
                Ok(Self::Create {
                    name: parse_name(fields[0])?,
                })
            }
            "JOIN" => {
                expect_fields("JOIN", &fields, 2)?;
                Ok(Self::Join {
                    name: parse_name(fields[0])?,
                    game_id: fields[1].trim().to_ascii_uppercase(),
                })
            }
            "START_GAME" => {
                expect_fields("START_GAME", &fields, 1)?;
                Ok(Self::StartGame {
                    game_id: fields[0].trim().to_ascii_uppercase(),
                })
            }
            "FOLD" => Self::parse_action("FOLD", PlayerAction::Fold, &fields),
            "CHECK" => Self::parse_action("CHECK", PlayerAction::Check, &fields),
            "CALL" => Self::parse_sized_action("CALL", PlayerAction::Call, &fields),
            "BET" => Self::parse_sized_action("BET", PlayerAction::Bet, &fields),
            "RAISE" => Self::parse_sized_action("RAISE", PlayerAction::Raise, &fields),
            "NEXTGAME" => {
                expect_fields("NEXTGAME", &fields, 2)?;
                Ok(Self::NextGame {
                    game_id: fields[0].trim().to_ascii_uppercase(),
                    name: parse_name(fields[1])?,
                })
            }
            "LEAVE_GAME" => {
                expect_fields("LEAVE_GAME", &fields, 2)?;
                Ok(Self::Leave {
                    name: parse_name(fields[0])?,
                    game_id: fields[1].trim().to_ascii_uppercase(),
                })
            }
            other => Err(ProtocolError::UnknownCommand(other.to_string())),
        }
    }

    fn parse_action(
        command: &'static str,
        action: PlayerAction,
        fields: &[&str],
    ) -> Result<Self, ProtocolError> {
        expect_fields(command, fields, 2)?;
        Ok(Self::Action {
            game_id: fields[0].trim().to_ascii_uppercase(),
            name: parse_name(fields[1])?,
            action,
            amount: 0,
        })
    }

    fn parse_sized_action(
        command: &'static str,
        action: PlayerAction,
        fields: &[&str],
    ) -> Result<Self, ProtocolError> {
        expect_fields(command, fields, 3)?;
        Ok(Self::Action {
            game_id: fields[0].trim().to_ascii_uppercase(),
            name: parse_name(fields[1])?,
            action,
            amount: parse_amount(fields[2])?,
        })
    }
}

/// Render a table snapshot as the push line sent to every seat.
pub fn update_game_line(snapshot: &TableSnapshot) -> Result<String, serde_json::Error> {
    let json = serde_json::to_string(snapshot)?;
    Ok(format!("{UPDATE_PREFIX}{json}"))
}
