//! Error types for grid mutation, player actions, and level setup.
//!
//! `GridError` and `ActionError` are recoverable: the requested operation is
//! refused and no state changes. `LevelError` covers level construction,
//! where `MaxIterationsExceeded` means the level data itself is unusable.

use thiserror::Error;

use crate::grid::{Coord, ObjectId};
use crate::protocol::layout::LayoutError;
use crate::session::budget::Counter;
use crate::session::SessionStatus;

/// Occupancy-table errors.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GridError {
    /// The coordinate is outside the grid or outside its playable footprint.
    #[error("cell {0} is out of bounds")]
    OutOfBounds(Coord),

    #[error("cell {0} is occupied")]
    CellOccupied(Coord),

    #[error("no object {0} on the grid")]
    UnknownObject(ObjectId),
}

/// A refused player action.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error(transparent)]
    Grid(#[from] GridError),

    #[error("insufficient budget: {0} exhausted")]
    InsufficientBudget(Counter),

    #[error("cannot {action} while the level is {status}")]
    InvalidStateTransition {
        status: SessionStatus,
        action: &'static str,
    },

    #[error("object {0} cannot be moved")]
    NotMovable(ObjectId),

    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Coord, to: Coord },
}

/// Failure to build or rebuild a level.
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),

    #[error("no empty cell found after {attempts} attempts; too many objects for the footprint")]
    MaxIterationsExceeded { attempts: u32 },

    #[error(transparent)]
    Refused(#[from] ActionError),

    #[error(transparent)]
    Grid(#[from] GridError),
}
