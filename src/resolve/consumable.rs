//! Milkshake pickups and cactus spikes.

use crate::grid::{Coord, Grid, ObjectId, ObjectKind};

/// A milkshake picked up by the walkers around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pickup {
    pub milkshake: ObjectId,
    pub at: Coord,
    pub buffed: Vec<ObjectId>,
}

/// A walker that congaed into a cactus's 3x3 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spike {
    pub cactus: ObjectId,
    pub victim: ObjectId,
}

/// Consumes every milkshake near `touched` that has at least one walker in
/// its 3x3 block. Consumed milkshakes are removed from the grid.
pub fn collect_milkshakes(grid: &mut Grid, touched: &[Coord]) -> Vec<Pickup> {
    let candidates: Vec<(ObjectId, Coord)> = grid
        .objects()
        .filter(|o| o.kind == ObjectKind::Milkshake)
        .filter(|o| touched.iter().any(|c| c.chebyshev(o.pos()) <= 1))
        .map(|o| (o.id(), o.pos()))
        .collect();

    let mut pickups = Vec::new();
    for (milkshake, at) in candidates {
        let buffed: Vec<ObjectId> = grid
            .neighborhood(at)
            .filter_map(|c| grid.object_in(c))
            .filter(|o| o.kind.is_walker())
            .map(|o| o.id())
            .collect();
        if buffed.is_empty() {
            continue;
        }
        grid.vacate(at);
        pickups.push(Pickup {
            milkshake,
            at,
            buffed,
        });
    }
    pickups
}

/// Spikes for each `(walker, destination)` whose destination lies in a
/// cactus's 3x3 block. One spike per cactus per walker.
pub fn cactus_spikes(grid: &Grid, movers: &[(ObjectId, Coord)]) -> Vec<Spike> {
    let mut spikes = Vec::new();
    for &(victim, to) in movers {
        for cell in grid.neighborhood(to) {
            if let Some(obj) = grid.object_in(cell) {
                if obj.kind == ObjectKind::Cactus {
                    spikes.push(Spike {
                        cactus: obj.id(),
                        victim,
                    });
                }
            }
        }
    }
    spikes
}
