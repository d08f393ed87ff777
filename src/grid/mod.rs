//! Grid representation and object taxonomy.
//!
//! Contains the coordinate types, the closed set of object kinds, and the
//! occupancy table that owns them.

pub mod coord;
pub mod object;
pub mod state;

pub use coord::{Axis, Coord, Direction, GridGeometry};
pub use object::{
    GrenadeStatus, GridObject, ObjectId, ObjectKind, PortalStatus, Rarity, Walker, WalkerStatus,
};
pub use state::{Cell, Grid, Lookup};
