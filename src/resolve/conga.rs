//! Conga chain discovery and stepwise resolution.
//!
//! Each step is resolved in two phases. `CongaResolver::plan` runs over the
//! whole grid at once: it anchors chains on open portals, walks outwards to
//! collect followers, assigns priority, and fixes every walker's status for
//! the step. Only then does `apply_step` move anything, so the order moves
//! are applied in cannot change who moves.
//!
//! A follower of `L` is a walker in a cell orthogonally adjacent to `L`,
//! facing `L`, while `L` does not face it. Links are rebuilt from scratch
//! every step.

use log::debug;

use crate::error::GridError;
use crate::grid::{Coord, Direction, Grid, GridObject, ObjectId, WalkerStatus};

/// Rank of a follower among its leader's followers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    /// The one follower allowed to step into the leader's cell.
    Top,
    Low,
}

/// How a walker joined a chain this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Link {
    /// Faces an open portal from an adjacent cell.
    Anchor { portal: ObjectId },
    Follower { leader: ObjectId, priority: Priority },
}

/// A walker's place in this step's chains and its snapshotted status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub id: ObjectId,
    pub link: Link,
    pub status: WalkerStatus,
    /// Index into `StepPlan::chains`.
    pub chain: usize,
    /// Hops from the anchor; the anchor itself is 0.
    pub depth: usize,
}

/// One move of a `Congoing` walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedMove {
    pub id: ObjectId,
    pub from: Coord,
    pub to: Coord,
    /// Facing after the move.
    pub facing: Direction,
    /// Set for anchors, which leave the grid through this portal.
    pub into_portal: Option<ObjectId>,
    pub chain: usize,
}

/// Summary of one portal-anchored chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainInfo {
    pub portal: ObjectId,
    pub anchor: ObjectId,
    /// Walkers linked into the chain, anchor included.
    pub members: usize,
    /// Walkers that move this step.
    pub moving: usize,
}

/// The full resolution of one conga step, computed before any mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepPlan {
    /// In discovery order: every leader precedes its followers.
    pub assignments: Vec<Assignment>,
    /// In the same order as `assignments`.
    pub moves: Vec<PlannedMove>,
    pub chains: Vec<ChainInfo>,
}

impl StepPlan {
    pub fn status_of(&self, id: ObjectId) -> Option<WalkerStatus> {
        self.assignments.iter().find(|a| a.id == id).map(|a| a.status)
    }

    pub fn is_idle(&self) -> bool {
        self.moves.is_empty()
    }

    /// Cells about to receive a moving walker, portal cells included.
    pub fn destinations(&self) -> impl Iterator<Item = Coord> + '_ {
        self.moves.iter().map(|m| m.to)
    }
}

/// What `apply_step` did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOutcome {
    /// Followers that advanced, with the size of their moving chain.
    pub advanced: Vec<Advance>,
    /// Anchors absorbed by a portal.
    pub saved: Vec<Saved>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Advance {
    pub id: ObjectId,
    pub from: Coord,
    pub to: Coord,
    pub chain_length: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub object: GridObject,
    pub portal: ObjectId,
    pub portal_at: Coord,
    pub chain_length: usize,
}

/// Reusable planner. The id-indexed visit table is kept between calls.
#[derive(Debug, Default)]
pub struct CongaResolver {
    slot: Vec<Option<usize>>,
}

impl CongaResolver {
    pub fn new() -> Self {
        CongaResolver::default()
    }

    /// Computes the plan for the next step against the current grid.
    /// The grid is not modified.
    pub fn plan(&mut self, grid: &Grid) -> StepPlan {
        self.slot.clear();
        self.slot.resize(grid.id_bound(), None);

        let mut plan = StepPlan::default();
        // Facing each assigned walker had when the plan was taken.
        let mut facings: Vec<Direction> = Vec::new();

        for portal in grid.objects().filter(|o| o.kind.is_open_portal()) {
            for dir in Direction::ALL {
                let Some(obj) = grid.object_in(portal.pos().step(dir)) else {
                    continue;
                };
                let Some(walker) = obj.walker() else { continue };
                if walker.facing != dir.opposite() || self.slot[obj.id().index()].is_some() {
                    continue;
                }
                let chain = plan.chains.len();
                plan.chains.push(ChainInfo {
                    portal: portal.id(),
                    anchor: obj.id(),
                    members: 1,
                    moving: 0,
                });
                let status = if walker.is_burnt() {
                    WalkerStatus::Burnt
                } else {
                    WalkerStatus::Congoing
                };
                self.assign(
                    &mut plan,
                    &mut facings,
                    Assignment {
                        id: obj.id(),
                        link: Link::Anchor {
                            portal: portal.id(),
                        },
                        status,
                        chain,
                        depth: 0,
                    },
                    walker.facing,
                );
            }
        }

        // Breadth-first from the anchors, at most `object_count` hops deep.
        let max_depth = grid.object_count();
        let mut next = 0;
        while next < plan.assignments.len() {
            let leader = plan.assignments[next];
            let leader_facing = facings[next];
            next += 1;
            if leader.depth >= max_depth {
                continue;
            }
            let Some(leader_pos) = grid.get(leader.id).map(GridObject::pos) else {
                continue;
            };

            let mut top_taken = false;
            for side in [
                leader_facing.opposite(),
                leader_facing.turn_left(),
                leader_facing.turn_right(),
            ] {
                let Some(obj) = grid.object_in(leader_pos.step(side)) else {
                    continue;
                };
                let Some(walker) = obj.walker() else { continue };
                if walker.facing != side.opposite() || self.slot[obj.id().index()].is_some() {
                    continue;
                }
                let priority = if !top_taken && !walker.is_burnt() {
                    top_taken = true;
                    Priority::Top
                } else {
                    Priority::Low
                };
                let status = if walker.is_burnt() {
                    WalkerStatus::Burnt
                } else if priority == Priority::Top && leader.status == WalkerStatus::Congoing {
                    WalkerStatus::Congoing
                } else {
                    WalkerStatus::Waiting
                };
                plan.chains[leader.chain].members += 1;
                self.assign(
                    &mut plan,
                    &mut facings,
                    Assignment {
                        id: obj.id(),
                        link: Link::Follower {
                            leader: leader.id,
                            priority,
                        },
                        status,
                        chain: leader.chain,
                        depth: leader.depth + 1,
                    },
                    walker.facing,
                );
            }
        }

        self.collect_moves(grid, &mut plan, &facings);
        debug!(
            "conga plan: {} chains, {} linked, {} moving",
            plan.chains.len(),
            plan.assignments.len(),
            plan.moves.len()
        );
        plan
    }

    fn assign(
        &mut self,
        plan: &mut StepPlan,
        facings: &mut Vec<Direction>,
        assignment: Assignment,
        facing: Direction,
    ) {
        self.slot[assignment.id.index()] = Some(plan.assignments.len());
        plan.assignments.push(assignment);
        facings.push(facing);
    }

    fn collect_moves(&self, grid: &Grid, plan: &mut StepPlan, facings: &[Direction]) {
        for (i, a) in plan.assignments.iter().enumerate() {
            if a.status != WalkerStatus::Congoing {
                continue;
            }
            let Some(from) = grid.get(a.id).map(GridObject::pos) else {
                continue;
            };
            let (to, facing, into_portal) = match a.link {
                Link::Anchor { portal } => {
                    let Some(portal_pos) = grid.get(portal).map(GridObject::pos) else {
                        continue;
                    };
                    (portal_pos, facings[i], Some(portal))
                }
                Link::Follower { leader, .. } => {
                    let Some(li) = self.slot[leader.index()] else {
                        continue;
                    };
                    let Some(leader_pos) = grid.get(leader).map(GridObject::pos) else {
                        continue;
                    };
                    (leader_pos, facings[li], None)
                }
            };
            plan.moves.push(PlannedMove {
                id: a.id,
                from,
                to,
                facing,
                into_portal,
                chain: a.chain,
            });
            plan.chains[a.chain].moving += 1;
        }
    }
}

/// Writes the plan's status snapshot onto the grid. Walkers outside every
/// chain go back to `Idle`; `Burnt` is never cleared here.
pub fn apply_statuses(grid: &mut Grid, plan: &StepPlan) {
    for obj in grid.objects_mut() {
        if let Some(walker) = obj.walker_mut() {
            if !walker.is_burnt() {
                walker.status = WalkerStatus::Idle;
            }
        }
    }
    for a in &plan.assignments {
        if let Some(walker) = grid.get_mut(a.id).and_then(GridObject::walker_mut) {
            if !walker.is_burnt() {
                walker.status = a.status;
            }
        }
    }
}

/// Moves every `Congoing` walker one cell. Anchors leave the grid through
/// their portal; followers take their leader's previous cell and facing.
pub fn apply_step(grid: &mut Grid, plan: &StepPlan) -> Result<StepOutcome, GridError> {
    let mut outcome = StepOutcome::default();
    for m in &plan.moves {
        let chain_length = plan.chains[m.chain].moving;
        match m.into_portal {
            Some(portal) => {
                let object = grid.vacate(m.from).ok_or(GridError::UnknownObject(m.id))?;
                outcome.saved.push(Saved {
                    object,
                    portal,
                    portal_at: m.to,
                    chain_length,
                });
            }
            None => {
                grid.place(m.id, m.to)?;
                if let Some(walker) = grid.get_mut(m.id).and_then(GridObject::walker_mut) {
                    walker.facing = m.facing;
                }
                outcome.advanced.push(Advance {
                    id: m.id,
                    from: m.from,
                    to: m.to,
                    chain_length,
                });
            }
        }
    }
    Ok(outcome)
}
