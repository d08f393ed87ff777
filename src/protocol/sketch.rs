//! Compact text notation for grids.
//!
//! Cells are whitespace-separated tokens; rows are separated by `/` or a
//! newline. Objects are spawned in row-major order, so ids follow reading
//! order.
//!
//! | token | cell |
//! |---|---|
//! | `#` | inactive |
//! | `.` | empty |
//! | `^` `v` `<` `>` | character facing up, down, left, right |
//! | `R3>` | rofl of rarity tier 3 facing right |
//! | `!>`, `!R3>` | burnt character or rofl |
//! | `G` / `g` | live / exploded grenade |
//! | `M` | milkshake |
//! | `C` | cactus |
//! | `O` / `o` | open / closed portal |
//!
//! Example: `"> O . / # v C"` is a 2x3 grid.

use thiserror::Error;

use crate::error::GridError;
use crate::grid::{
    Coord, Direction, GrenadeStatus, Grid, Lookup, ObjectKind, PortalStatus, Rarity, Walker,
};

/// Errors that can occur when parsing a sketch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SketchError {
    #[error("empty sketch")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown token '{token}' at ({row}, {col})")]
    UnknownToken {
        row: usize,
        col: usize,
        token: String,
    },

    #[error("grid rejected a cell: {0}")]
    Grid(#[from] GridError),
}

/// What a token puts in its cell.
enum Token {
    Inactive,
    Empty,
    Object(ObjectKind),
}

fn parse_walker(token: &str) -> Option<ObjectKind> {
    let (burnt, rest) = match token.strip_prefix('!') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    let mut chars = rest.chars();
    let kind = match (chars.next()?, chars.next(), chars.next(), chars.next()) {
        (c, None, None, None) => ObjectKind::character(Direction::from_arrow(c)?),
        ('R', Some(tier), Some(arrow), None) => {
            let tier = tier.to_digit(10)? as u8;
            ObjectKind::rofl(Direction::from_arrow(arrow)?, Rarity::from_tier(tier)?)
        }
        _ => return None,
    };
    if !burnt {
        return Some(kind);
    }
    let mut kind = kind;
    if let Some(walker) = kind.walker_mut() {
        *walker = Walker::burnt(walker.facing);
    }
    Some(kind)
}

fn parse_token(token: &str) -> Option<Token> {
    let object = match token {
        "#" => return Some(Token::Inactive),
        "." => return Some(Token::Empty),
        "G" => ObjectKind::live_grenade(),
        "g" => ObjectKind::Grenade(GrenadeStatus::Exploded),
        "M" => ObjectKind::Milkshake,
        "C" => ObjectKind::Cactus,
        "O" => ObjectKind::open_portal(),
        "o" => ObjectKind::Portal(PortalStatus::Closed),
        other => parse_walker(other)?,
    };
    Some(Token::Object(object))
}

/// Parses a sketch into a grid.
pub fn parse_sketch(sketch: &str) -> Result<Grid, SketchError> {
    let rows: Vec<Vec<&str>> = sketch
        .split(['/', '\n'])
        .map(|r| r.split_whitespace().collect::<Vec<_>>())
        .filter(|r| !r.is_empty())
        .collect();
    let cols = rows.first().map_or(0, Vec::len);
    if cols == 0 {
        return Err(SketchError::Empty);
    }

    let mut grid = Grid::new(rows.len(), cols);
    for (row, tokens) in rows.iter().enumerate() {
        if tokens.len() != cols {
            return Err(SketchError::Ragged {
                row,
                expected: cols,
                found: tokens.len(),
            });
        }
        for (col, token) in tokens.iter().enumerate() {
            let coord = Coord::new(row as i32, col as i32);
            let unknown = || SketchError::UnknownToken {
                row,
                col,
                token: token.to_string(),
            };
            match parse_token(token).ok_or_else(unknown)? {
                Token::Inactive => grid.set_active(coord, false)?,
                Token::Empty => {}
                Token::Object(kind) => {
                    grid.spawn(kind, coord)?;
                }
            }
        }
    }
    Ok(grid)
}

fn encode_kind(kind: &ObjectKind) -> String {
    let walker = |w: &Walker, body: String| {
        if w.is_burnt() {
            format!("!{}", body)
        } else {
            body
        }
    };
    match kind {
        ObjectKind::Character(w) => walker(w, w.facing.arrow().to_string()),
        ObjectKind::Rofl { walker: w, rarity } => {
            walker(w, format!("R{}{}", rarity.tier(), w.facing.arrow()))
        }
        ObjectKind::Grenade(GrenadeStatus::Live) => "G".to_string(),
        ObjectKind::Grenade(GrenadeStatus::Exploded) => "g".to_string(),
        ObjectKind::Milkshake => "M".to_string(),
        ObjectKind::Cactus => "C".to_string(),
        ObjectKind::Portal(PortalStatus::Open) => "O".to_string(),
        ObjectKind::Portal(PortalStatus::Closed) => "o".to_string(),
    }
}

/// Encodes a grid as a single-line sketch with rows separated by ` / `.
/// Conga statuses other than `Burnt` are not represented.
pub fn encode_sketch(grid: &Grid) -> String {
    let mut rows = Vec::with_capacity(grid.rows());
    for row in 0..grid.rows() {
        let tokens: Vec<String> = (0..grid.cols())
            .map(|col| match grid.object_at(Coord::new(row as i32, col as i32)) {
                Lookup::OutOfBounds | Lookup::Inactive => "#".to_string(),
                Lookup::Empty => ".".to_string(),
                Lookup::Object(id) => grid
                    .get(id)
                    .map_or_else(|| ".".to_string(), |o| encode_kind(&o.kind)),
            })
            .collect();
        rows.push(tokens.join(" "));
    }
    rows.join(" / ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{ObjectId, WalkerStatus};

    #[test]
    fn parse_basic_grid() {
        let grid = parse_sketch("> O . / # v C").unwrap();
        assert_eq!(grid.rows(), 2);
        assert_eq!(grid.cols(), 3);
        assert_eq!(grid.object_count(), 4);
        assert_eq!(grid.object_at(Coord::new(1, 0)), Lookup::Inactive);
        let first = grid.get(ObjectId(0)).unwrap();
        assert_eq!(first.pos(), Coord::new(0, 0));
        assert_eq!(first.facing(), Some(Direction::Right));
        assert!(grid.get(ObjectId(1)).unwrap().kind.is_open_portal());
    }

    #[test]
    fn newlines_separate_rows() {
        let grid = parse_sketch("\n  . M\n  G .\n").unwrap();
        assert_eq!(grid.rows(), 2);
        assert!(grid.object_in(Coord::new(1, 0)).unwrap().kind.is_live_grenade());
    }

    #[test]
    fn parses_rofls_and_burnt_walkers() {
        let grid = parse_sketch("R6< !^ !R1v").unwrap();
        assert_eq!(
            grid.get(ObjectId(0)).unwrap().kind,
            ObjectKind::rofl(Direction::Left, Rarity::Godlike)
        );
        let burnt = grid.get(ObjectId(1)).unwrap().walker().unwrap();
        assert_eq!(burnt.status, WalkerStatus::Burnt);
        assert_eq!(burnt.facing, Direction::Up);
        assert!(grid.get(ObjectId(2)).unwrap().walker().unwrap().is_burnt());
    }

    #[test]
    fn encode_matches_input() {
        let sketch = "> O . / # !v C / R2< g o";
        let grid = parse_sketch(sketch).unwrap();
        assert_eq!(encode_sketch(&grid), sketch);
    }

    #[test]
    fn rejects_unknown_tokens() {
        assert_eq!(
            parse_sketch(". X").unwrap_err(),
            SketchError::UnknownToken {
                row: 0,
                col: 1,
                token: "X".to_string()
            }
        );
        assert!(parse_sketch("R7>").is_err());
        assert!(parse_sketch("R>").is_err());
        assert!(parse_sketch(">>").is_err());
    }

    #[test]
    fn rejects_ragged_and_empty() {
        assert_eq!(
            parse_sketch(". . / .").unwrap_err(),
            SketchError::Ragged {
                row: 1,
                expected: 2,
                found: 1
            }
        );
        assert_eq!(parse_sketch("  / ").unwrap_err(), SketchError::Empty);
    }

    #[test]
    fn grid_errors_surface_as_sketch_errors() {
        let at = Coord::new(4, 4);
        let err: SketchError = GridError::OutOfBounds(at).into();
        assert_eq!(err, SketchError::Grid(GridError::OutOfBounds(at)));
        assert!(err.to_string().starts_with("grid rejected a cell"));
    }
}
