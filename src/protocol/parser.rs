//! Command parser.
//!
//! Parses incoming protocol lines from raw text into structured `Command`
//! variants that the engine main loop can dispatch on.

use std::str::FromStr;

use log::warn;

use crate::grid::{Coord, ObjectId};

/// A parsed input-layer command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Protocol handshake.
    Hello,

    /// Synchronization ping; engine must reply `readyok`.
    IsReady,

    /// Set an engine option: `setoption name <id> [value <x>]`.
    SetOption { name: String, value: Option<String> },

    /// Start a level from a JSON layout: `level <json>`.
    Level { json: String },

    /// Move an object to a cell: `move <id> <row> <col>`.
    Move { id: ObjectId, target: Coord },

    /// Drag an object and release it at a point: `drop <id> <x> <y>`.
    Drop { id: ObjectId, x: f32, y: f32 },

    /// Interact with an object: `interact <id>`.
    Interact { id: ObjectId },

    /// Start a conga run.
    Conga,

    /// Advance the simulated clock: `tick <ms>`.
    Tick { ms: u64 },

    /// Restart the current level from its starting state.
    Reset,

    /// Leave the current level.
    End,

    /// Print the session status and grid.
    State,

    /// Terminate the engine process.
    Quit,
}

/// Parses a single line of input into a `Command`.
///
/// Returns `None` for empty lines or unrecognized commands. Malformed
/// arguments for known commands also return `None` after logging a warning.
pub fn parse_command(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    let tokens: Vec<&str> = trimmed.split_whitespace().collect();
    let first = *tokens.first()?;

    match first {
        "hello" => Some(Command::Hello),
        "isready" => Some(Command::IsReady),
        "conga" => Some(Command::Conga),
        "reset" => Some(Command::Reset),
        "end" => Some(Command::End),
        "state" => Some(Command::State),
        "quit" => Some(Command::Quit),

        "setoption" => parse_setoption(&tokens),
        "level" => parse_level(trimmed),
        "move" => parse_move(&tokens),
        "drop" => parse_drop(&tokens),
        "interact" => parse_interact(&tokens),
        "tick" => parse_tick(&tokens),

        other => {
            warn!("unknown command: {}", other);
            None
        }
    }
}

/// Parses `setoption name <id> [value <x>]`.
fn parse_setoption(tokens: &[&str]) -> Option<Command> {
    if tokens.len() < 3 || tokens[1] != "name" {
        warn!("malformed setoption: expected 'setoption name <id> [value <x>]'");
        return None;
    }

    let value_idx = tokens.iter().position(|&t| t == "value");
    let (name, value) = match value_idx {
        Some(vi) => {
            let name_parts = &tokens[2..vi];
            let value_parts = &tokens[vi + 1..];
            if name_parts.is_empty() {
                warn!("malformed setoption: empty name");
                return None;
            }
            let value = if value_parts.is_empty() {
                None
            } else {
                Some(value_parts.join(" "))
            };
            (name_parts.join(" "), value)
        }
        None => (tokens[2..].join(" "), None),
    };

    Some(Command::SetOption { name, value })
}

/// Parses `level <json>`, keeping everything after the keyword verbatim.
fn parse_level(line: &str) -> Option<Command> {
    let json = line.strip_prefix("level").unwrap_or("").trim();
    if json.is_empty() {
        warn!("malformed level: expected 'level <json>'");
        return None;
    }
    Some(Command::Level {
        json: json.to_string(),
    })
}

/// Parses the numeric argument at `idx`, logging on failure.
fn arg<T: FromStr>(tokens: &[&str], idx: usize, what: &str) -> Option<T> {
    let Some(raw) = tokens.get(idx) else {
        warn!("malformed {}: missing {}", tokens[0], what);
        return None;
    };
    match raw.parse::<T>() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!("invalid {} value: '{}'", what, raw);
            None
        }
    }
}

/// Parses `move <id> <row> <col>`.
fn parse_move(tokens: &[&str]) -> Option<Command> {
    let id = arg::<u32>(tokens, 1, "id")?;
    let row = arg::<i32>(tokens, 2, "row")?;
    let col = arg::<i32>(tokens, 3, "col")?;
    Some(Command::Move {
        id: ObjectId(id),
        target: Coord::new(row, col),
    })
}

/// Parses `drop <id> <x> <y>`.
fn parse_drop(tokens: &[&str]) -> Option<Command> {
    let id = arg::<u32>(tokens, 1, "id")?;
    let x = arg::<f32>(tokens, 2, "x")?;
    let y = arg::<f32>(tokens, 3, "y")?;
    if !x.is_finite() || !y.is_finite() {
        warn!("drop coordinates must be finite");
        return None;
    }
    Some(Command::Drop {
        id: ObjectId(id),
        x,
        y,
    })
}

/// Parses `interact <id>`.
fn parse_interact(tokens: &[&str]) -> Option<Command> {
    let id = arg::<u32>(tokens, 1, "id")?;
    Some(Command::Interact { id: ObjectId(id) })
}

/// Parses `tick <ms>`.
fn parse_tick(tokens: &[&str]) -> Option<Command> {
    let ms = arg::<u64>(tokens, 1, "ms")?;
    Some(Command::Tick { ms })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_bare_commands() {
        assert_eq!(parse_command("hello"), Some(Command::Hello));
        assert_eq!(parse_command("isready"), Some(Command::IsReady));
        assert_eq!(parse_command("conga"), Some(Command::Conga));
        assert_eq!(parse_command("reset"), Some(Command::Reset));
        assert_eq!(parse_command("end"), Some(Command::End));
        assert_eq!(parse_command("state"), Some(Command::State));
        assert_eq!(parse_command("quit"), Some(Command::Quit));
    }

    #[test]
    fn parse_empty_line_returns_none() {
        assert_eq!(parse_command(""), None);
        assert_eq!(parse_command("  "), None);
        assert_eq!(parse_command("\t"), None);
    }

    #[test]
    fn parse_unknown_command_returns_none() {
        assert_eq!(parse_command("foobar"), None);
    }

    #[test]
    fn parse_setoption_with_value() {
        let cmd = parse_command("setoption name StepInterval value 250").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "StepInterval".to_string(),
                value: Some("250".to_string()),
            }
        );
    }

    #[test]
    fn parse_setoption_no_value() {
        let cmd = parse_command("setoption name Seed").unwrap();
        assert_eq!(
            cmd,
            Command::SetOption {
                name: "Seed".to_string(),
                value: None,
            }
        );
    }

    #[test]
    fn parse_setoption_malformed_returns_none() {
        assert_eq!(parse_command("setoption"), None);
        assert_eq!(parse_command("setoption foo"), None);
        assert_eq!(parse_command("setoption name value 3"), None);
    }

    #[test]
    fn parse_level_keeps_json() {
        let cmd = parse_command(r#"level {"actions": 2, "cells": [[2, 3]]}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Level {
                json: r#"{"actions": 2, "cells": [[2, 3]]}"#.to_string(),
            }
        );
        assert_eq!(parse_command("level"), None);
    }

    #[test]
    fn parse_move_and_interact() {
        assert_eq!(
            parse_command("move 3 1 -1"),
            Some(Command::Move {
                id: ObjectId(3),
                target: Coord::new(1, -1),
            })
        );
        assert_eq!(
            parse_command("interact 7"),
            Some(Command::Interact { id: ObjectId(7) })
        );
        assert_eq!(parse_command("move 3 1"), None);
        assert_eq!(parse_command("move x 1 1"), None);
        assert_eq!(parse_command("interact"), None);
    }

    #[test]
    fn parse_drop_point() {
        assert_eq!(
            parse_command("drop 0 96.5 32"),
            Some(Command::Drop {
                id: ObjectId(0),
                x: 96.5,
                y: 32.0,
            })
        );
        assert_eq!(parse_command("drop 0 NaN 1"), None);
    }

    #[test]
    fn parse_tick() {
        assert_eq!(parse_command("tick 600"), Some(Command::Tick { ms: 600 }));
        assert_eq!(parse_command("tick -1"), None);
    }

    #[test]
    fn parse_with_leading_trailing_whitespace() {
        assert_eq!(parse_command("  hello  "), Some(Command::Hello));
        assert_eq!(parse_command("  isready  "), Some(Command::IsReady));
    }
}
