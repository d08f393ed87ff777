//! Movement legality for player moves.
//!
//! A player move relocates one object by exactly one orthogonal cell into an
//! empty active cell. Validation is pure: it never touches the budget or the
//! grid, so a refused move leaves everything unchanged.

pub mod drag;

use crate::error::{ActionError, GridError};
use crate::grid::{Coord, Direction, Grid, GrenadeStatus, ObjectId, ObjectKind};
use crate::session::budget::Counter;

pub use drag::DragGesture;

/// Outcome of validating a move request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveCheck {
    /// The target is the object's own cell. Nothing happens and nothing is
    /// spent.
    Unchanged,
    /// A legal one-cell move.
    Step {
        from: Coord,
        to: Coord,
        dir: Direction,
    },
}

/// True if the player may drag objects of this kind.
pub fn is_draggable(kind: &ObjectKind) -> bool {
    match kind {
        ObjectKind::Character(_)
        | ObjectKind::Rofl { .. }
        | ObjectKind::Milkshake
        | ObjectKind::Cactus => true,
        ObjectKind::Grenade(status) => *status == GrenadeStatus::Live,
        ObjectKind::Portal(_) => false,
    }
}

/// The per-color counter a move of this kind spends, if any.
pub fn move_cost(kind: &ObjectKind) -> Option<Counter> {
    match kind {
        ObjectKind::Character(_) => Some(Counter::Move),
        ObjectKind::Rofl { .. } => Some(Counter::Pink),
        ObjectKind::Grenade(_) => Some(Counter::Red),
        ObjectKind::Cactus => Some(Counter::Green),
        ObjectKind::Milkshake | ObjectKind::Portal(_) => None,
    }
}

/// The per-color counter an interact on this kind spends, or `None` if
/// interacting does nothing.
pub fn interact_cost(kind: &ObjectKind) -> Option<Counter> {
    match kind {
        ObjectKind::Grenade(GrenadeStatus::Live) => Some(Counter::Red),
        ObjectKind::Portal(_) => Some(Counter::Blue),
        ObjectKind::Grenade(GrenadeStatus::Exploded)
        | ObjectKind::Character(_)
        | ObjectKind::Rofl { .. }
        | ObjectKind::Milkshake
        | ObjectKind::Cactus => None,
    }
}

/// Validates moving object `id` to `target`.
pub fn check_move(grid: &Grid, id: ObjectId, target: Coord) -> Result<MoveCheck, ActionError> {
    let obj = grid.get(id).ok_or(GridError::UnknownObject(id))?;
    let from = obj.pos();
    if target == from {
        return Ok(MoveCheck::Unchanged);
    }
    if !is_draggable(&obj.kind) {
        return Err(ActionError::NotMovable(id));
    }
    if !grid.is_active(target) {
        return Err(GridError::OutOfBounds(target).into());
    }
    let Some(dir) = from.direction_to(target) else {
        return Err(ActionError::IllegalMove { from, to: target });
    };
    if !grid.is_empty(target) {
        return Err(GridError::CellOccupied(target).into());
    }
    Ok(MoveCheck::Step {
        from,
        to: target,
        dir,
    })
}
