//! Declarative level layouts.
//!
//! A layout is a JSON object holding a matrix of cell codes plus level
//! metadata:
//!
//! ```json
//! {
//!   "name": "first steps",
//!   "actions": 5,
//!   "cells": [[2, 3, 1], [1, 1, 0]],
//!   "stat_mask": ["saved", "conga_jump"],
//!   "traits": { "energy": 70, "aggression": 20, "spookiness": 50, "brain": 90 },
//!   "facings": [{ "row": 0, "col": 0, "facing": "right" }],
//!   "scatter": { "milkshakes": 2 }
//! }
//! ```
//!
//! Cell codes: 0 inactive, 1 empty, 2 character, 3 open portal, 4 milkshake,
//! 5 grenade, 6 cactus, 9 burnt character, 11..=16 rofl by rarity tier.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Direction, Rarity};
use crate::session::budget::Traits;
use crate::session::score::{ScoreCategory, StatMask};

/// Errors that can occur when parsing or validating a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("malformed layout JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("layout has no cells")]
    Empty,

    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unknown cell code {code} at ({row}, {col})")]
    UnknownCode { row: usize, col: usize, code: u8 },

    #[error("facing override at ({row}, {col}) does not name a character")]
    FacingTarget { row: usize, col: usize },
}

/// The object a cell code places at level start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellCode {
    Inactive,
    Empty,
    Character,
    Portal,
    Milkshake,
    Grenade,
    Cactus,
    BurntCharacter,
    Rofl(Rarity),
}

impl CellCode {
    pub fn from_code(code: u8) -> Option<CellCode> {
        match code {
            0 => Some(CellCode::Inactive),
            1 => Some(CellCode::Empty),
            2 => Some(CellCode::Character),
            3 => Some(CellCode::Portal),
            4 => Some(CellCode::Milkshake),
            5 => Some(CellCode::Grenade),
            6 => Some(CellCode::Cactus),
            9 => Some(CellCode::BurntCharacter),
            11..=16 => Rarity::from_tier(code - 10).map(CellCode::Rofl),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            CellCode::Inactive => 0,
            CellCode::Empty => 1,
            CellCode::Character => 2,
            CellCode::Portal => 3,
            CellCode::Milkshake => 4,
            CellCode::Grenade => 5,
            CellCode::Cactus => 6,
            CellCode::BurntCharacter => 9,
            CellCode::Rofl(r) => 10 + r.tier(),
        }
    }

    /// True for codes that place a character or rofl.
    pub fn is_walker(self) -> bool {
        matches!(
            self,
            CellCode::Character | CellCode::BurntCharacter | CellCode::Rofl(_)
        )
    }
}

/// Fixes the initial facing of the walker at `(row, col)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacingOverride {
    pub row: usize,
    pub col: usize,
    pub facing: Direction,
}

/// Extra objects dropped on random empty cells after the matrix is placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scatter {
    pub characters: u32,
    pub grenades: u32,
    pub milkshakes: u32,
    pub cacti: u32,
}

impl Scatter {
    pub fn total(&self) -> u32 {
        self.characters + self.grenades + self.milkshakes + self.cacti
    }
}

fn all_categories() -> Vec<ScoreCategory> {
    ScoreCategory::ALL.to_vec()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelLayout {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Shared action allowance for the level.
    pub actions: u32,
    pub cells: Vec<Vec<u8>>,
    #[serde(default = "all_categories")]
    pub stat_mask: Vec<ScoreCategory>,
    #[serde(default)]
    pub traits: Traits,
    #[serde(default)]
    pub facings: Vec<FacingOverride>,
    #[serde(default)]
    pub scatter: Scatter,
}

impl LevelLayout {
    /// A layout with the given matrix and defaults everywhere else.
    pub fn from_cells(actions: u32, cells: Vec<Vec<u8>>) -> Self {
        LevelLayout {
            name: String::new(),
            description: String::new(),
            actions,
            cells,
            stat_mask: all_categories(),
            traits: Traits::default(),
            facings: Vec::new(),
            scatter: Scatter::default(),
        }
    }

    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    pub fn cols(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn mask(&self) -> StatMask {
        StatMask::from_categories(&self.stat_mask)
    }

    /// The override for `(row, col)`, if any. Later entries win.
    pub fn facing_at(&self, row: usize, col: usize) -> Option<Direction> {
        self.facings
            .iter()
            .rev()
            .find(|f| f.row == row && f.col == col)
            .map(|f| f.facing)
    }

    /// Checks the matrix shape, every cell code, and every facing override.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let cols = self.cols();
        if self.rows() == 0 || cols == 0 {
            return Err(LayoutError::Empty);
        }
        for (row, cells) in self.cells.iter().enumerate() {
            if cells.len() != cols {
                return Err(LayoutError::Ragged {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
            for (col, &code) in cells.iter().enumerate() {
                if CellCode::from_code(code).is_none() {
                    return Err(LayoutError::UnknownCode { row, col, code });
                }
            }
        }
        for f in &self.facings {
            let on_walker = self
                .cells
                .get(f.row)
                .and_then(|r| r.get(f.col))
                .and_then(|&code| CellCode::from_code(code))
                .is_some_and(CellCode::is_walker);
            if !on_walker {
                return Err(LayoutError::FacingTarget {
                    row: f.row,
                    col: f.col,
                });
            }
        }
        Ok(())
    }
}

/// Parses and validates a layout from JSON.
pub fn parse_layout(json: &str) -> Result<LevelLayout, LayoutError> {
    let layout: LevelLayout = serde_json::from_str(json)?;
    layout.validate()?;
    Ok(layout)
}
