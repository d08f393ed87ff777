//! Step resolution.
//!
//! Resolves conga steps (chain discovery, priority, movement), grenade
//! blasts, and the consumable and hazard side effects of movement.

pub mod conga;
pub mod consumable;
pub mod hazard;

pub use conga::{
    apply_statuses, apply_step, Assignment, CongaResolver, Link, PlannedMove, Priority, StepOutcome,
    StepPlan,
};
pub use consumable::{cactus_spikes, collect_milkshakes, Pickup, Spike};
pub use hazard::{live_grenades_near, resolve_blast, trigger, BlastOutcome};
