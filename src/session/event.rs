//! Domain events emitted by a level session.
//!
//! The presentation, audio, and persistence layers consume these to animate
//! and record what happened. Events are serialized as tagged JSON objects.

use serde::Serialize;

use crate::grid::{Coord, ObjectId};

use super::score::ScoreCategory;
use super::SessionStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    /// A player move relocated an object.
    ObjectMoved { id: ObjectId, from: Coord, to: Coord },
    /// A walker advanced one cell during a conga step.
    ObjectCongaed {
        id: ObjectId,
        from: Coord,
        to: Coord,
        chain_length: usize,
    },
    GrenadeArmed { id: ObjectId, at: Coord },
    GrenadeExploded { id: ObjectId, at: Coord },
    CharacterBurnt { id: ObjectId, at: Coord },
    /// A milkshake was picked up by the listed walkers.
    MilkshakeConsumed {
        id: ObjectId,
        at: Coord,
        buffed: Vec<ObjectId>,
    },
    /// A milkshake was caught in a blast.
    MilkshakeDestroyed { id: ObjectId, at: Coord },
    CactusSpiked { cactus: ObjectId, victim: ObjectId },
    /// A walker entered a portal and left the grid.
    CharacterSaved { id: ObjectId, portal: ObjectId },
    PortalToggled { id: ObjectId, open: bool },
    ScoreDelta {
        amount: i64,
        reason: ScoreCategory,
        total: u64,
    },
    LevelStatusChanged {
        from: SessionStatus,
        to: SessionStatus,
    },
}

impl DomainEvent {
    /// Short name of the event kind.
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::ObjectMoved { .. } => "object_moved",
            DomainEvent::ObjectCongaed { .. } => "object_congaed",
            DomainEvent::GrenadeArmed { .. } => "grenade_armed",
            DomainEvent::GrenadeExploded { .. } => "grenade_exploded",
            DomainEvent::CharacterBurnt { .. } => "character_burnt",
            DomainEvent::MilkshakeConsumed { .. } => "milkshake_consumed",
            DomainEvent::MilkshakeDestroyed { .. } => "milkshake_destroyed",
            DomainEvent::CactusSpiked { .. } => "cactus_spiked",
            DomainEvent::CharacterSaved { .. } => "character_saved",
            DomainEvent::PortalToggled { .. } => "portal_toggled",
            DomainEvent::ScoreDelta { .. } => "score_delta",
            DomainEvent::LevelStatusChanged { .. } => "level_status_changed",
        }
    }
}
