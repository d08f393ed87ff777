//! Grenade detonation and blast resolution.
//!
//! A grenade is armed once (`Live` to `Exploded`) and its blast resolves
//! later, when the session's timeline says so. Other live grenades caught
//! in a blast are armed by it and returned to the caller for scheduling;
//! they never resolve inside the same call.

use crate::error::GridError;
use crate::grid::{Coord, Grid, GrenadeStatus, ObjectId, ObjectKind, WalkerStatus};

/// Arms a live grenade. Returns false, changing nothing, for an already
/// exploded grenade or any other object.
pub fn trigger(grid: &mut Grid, id: ObjectId) -> bool {
    match grid.get_mut(id).map(|o| &mut o.kind) {
        Some(ObjectKind::Grenade(status @ GrenadeStatus::Live)) => {
            *status = GrenadeStatus::Exploded;
            true
        }
        _ => false,
    }
}

/// Live grenades whose 3x3 block contains any of `cells`, in id order.
pub fn live_grenades_near(grid: &Grid, cells: &[Coord]) -> Vec<ObjectId> {
    grid.objects()
        .filter(|o| o.kind.is_live_grenade())
        .filter(|o| cells.iter().any(|c| c.chebyshev(o.pos()) <= 1))
        .map(|o| o.id())
        .collect()
}

/// Everything a single blast did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlastOutcome {
    pub origin: Coord,
    /// Walkers newly set to `Burnt`.
    pub burnt: Vec<(ObjectId, Coord)>,
    /// Live grenades armed by this blast. Their own blasts are pending.
    pub chained: Vec<(ObjectId, Coord)>,
    /// Milkshakes removed from the grid.
    pub destroyed: Vec<(ObjectId, Coord)>,
}

/// Resolves the blast of exploded grenade `id` over its 3x3 block, then
/// removes the grenade from the grid.
pub fn resolve_blast(grid: &mut Grid, id: ObjectId) -> Result<BlastOutcome, GridError> {
    let origin = grid.get(id).ok_or(GridError::UnknownObject(id))?.pos();
    let mut outcome = BlastOutcome {
        origin,
        burnt: Vec::new(),
        chained: Vec::new(),
        destroyed: Vec::new(),
    };
    let cells: Vec<Coord> = grid.neighborhood(origin).collect();
    for cell in cells {
        let Some(obj) = grid.object_in(cell) else {
            continue;
        };
        let (target, kind) = (obj.id(), obj.kind);
        if target == id {
            continue;
        }
        match kind {
            ObjectKind::Character(_) | ObjectKind::Rofl { .. } => {
                if let Some(walker) = grid.get_mut(target).and_then(|o| o.walker_mut()) {
                    if walker.status != WalkerStatus::Burnt {
                        walker.status = WalkerStatus::Burnt;
                        outcome.burnt.push((target, cell));
                    }
                }
            }
            ObjectKind::Grenade(GrenadeStatus::Live) => {
                if trigger(grid, target) {
                    outcome.chained.push((target, cell));
                }
            }
            ObjectKind::Milkshake => {
                grid.vacate(cell);
                outcome.destroyed.push((target, cell));
            }
            ObjectKind::Grenade(GrenadeStatus::Exploded)
            | ObjectKind::Cactus
            | ObjectKind::Portal(_) => {}
        }
    }
    grid.vacate(origin);
    Ok(outcome)
}
