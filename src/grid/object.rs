//! Grid object taxonomy.
//!
//! The set of object kinds is closed: every resolver and hazard pass matches
//! on `ObjectKind` exhaustively, so adding a kind forces each of them to be
//! revisited. Empty and inactive cells are cell states, not objects; see
//! `grid::state::Lookup`.

use serde::{Deserialize, Serialize};

use super::coord::{Coord, Direction};

/// Stable identity of an object within one grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Conga status of a character or rofl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WalkerStatus {
    Idle,
    Congoing,
    Waiting,
    Burnt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrenadeStatus {
    Live,
    Exploded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortalStatus {
    Open,
    Closed,
}

/// Rarity tier of a rofl. Tiers 1..=6 map to layout codes 11..=16.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
    Mythical,
    Godlike,
}

impl Rarity {
    pub const ALL: [Rarity; 6] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Legendary,
        Rarity::Mythical,
        Rarity::Godlike,
    ];

    /// Returns the 1-based tier number.
    pub const fn tier(self) -> u8 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::Legendary => 4,
            Rarity::Mythical => 5,
            Rarity::Godlike => 6,
        }
    }

    pub fn from_tier(tier: u8) -> Option<Rarity> {
        Rarity::ALL.into_iter().find(|r| r.tier() == tier)
    }

    /// Multiplier applied to the save score when a rofl reaches a portal.
    pub const fn save_multiplier(self) -> i64 {
        match self {
            Rarity::Common => 1,
            Rarity::Uncommon => 2,
            Rarity::Rare => 3,
            Rarity::Legendary => 5,
            Rarity::Mythical => 10,
            Rarity::Godlike => 20,
        }
    }
}

/// Facing and conga status shared by characters and rofls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Walker {
    pub facing: Direction,
    pub status: WalkerStatus,
}

impl Walker {
    pub const fn new(facing: Direction) -> Self {
        Walker {
            facing,
            status: WalkerStatus::Idle,
        }
    }

    pub const fn burnt(facing: Direction) -> Self {
        Walker {
            facing,
            status: WalkerStatus::Burnt,
        }
    }

    pub fn is_burnt(&self) -> bool {
        self.status == WalkerStatus::Burnt
    }
}

/// The closed set of object kinds that can occupy a cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "state", rename_all = "snake_case")]
pub enum ObjectKind {
    Character(Walker),
    Rofl { walker: Walker, rarity: Rarity },
    Grenade(GrenadeStatus),
    Milkshake,
    Cactus,
    Portal(PortalStatus),
}

impl ObjectKind {
    pub const fn character(facing: Direction) -> Self {
        ObjectKind::Character(Walker::new(facing))
    }

    pub const fn rofl(facing: Direction, rarity: Rarity) -> Self {
        ObjectKind::Rofl {
            walker: Walker::new(facing),
            rarity,
        }
    }

    pub const fn live_grenade() -> Self {
        ObjectKind::Grenade(GrenadeStatus::Live)
    }

    pub const fn open_portal() -> Self {
        ObjectKind::Portal(PortalStatus::Open)
    }

    /// Returns the walker state of characters and rofls.
    pub fn walker(&self) -> Option<&Walker> {
        match self {
            ObjectKind::Character(w) | ObjectKind::Rofl { walker: w, .. } => Some(w),
            ObjectKind::Grenade(_)
            | ObjectKind::Milkshake
            | ObjectKind::Cactus
            | ObjectKind::Portal(_) => None,
        }
    }

    pub fn walker_mut(&mut self) -> Option<&mut Walker> {
        match self {
            ObjectKind::Character(w) | ObjectKind::Rofl { walker: w, .. } => Some(w),
            ObjectKind::Grenade(_)
            | ObjectKind::Milkshake
            | ObjectKind::Cactus
            | ObjectKind::Portal(_) => None,
        }
    }

    pub fn is_walker(&self) -> bool {
        self.walker().is_some()
    }

    pub fn is_open_portal(&self) -> bool {
        matches!(self, ObjectKind::Portal(PortalStatus::Open))
    }

    pub fn is_live_grenade(&self) -> bool {
        matches!(self, ObjectKind::Grenade(GrenadeStatus::Live))
    }

    /// Short lowercase name used in logs and protocol output.
    pub const fn name(&self) -> &'static str {
        match self {
            ObjectKind::Character(_) => "character",
            ObjectKind::Rofl { .. } => "rofl",
            ObjectKind::Grenade(_) => "grenade",
            ObjectKind::Milkshake => "milkshake",
            ObjectKind::Cactus => "cactus",
            ObjectKind::Portal(_) => "portal",
        }
    }
}

/// An object placed on the grid.
///
/// The position is a cache of the cell that owns the object. Only the grid
/// may change it, so it is not publicly writable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridObject {
    id: ObjectId,
    pos: Coord,
    pub kind: ObjectKind,
}

impl GridObject {
    pub(crate) fn new(id: ObjectId, pos: Coord, kind: ObjectKind) -> Self {
        GridObject { id, pos, kind }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn pos(&self) -> Coord {
        self.pos
    }

    pub(crate) fn set_pos(&mut self, pos: Coord) {
        self.pos = pos;
    }

    pub fn walker(&self) -> Option<&Walker> {
        self.kind.walker()
    }

    pub fn walker_mut(&mut self) -> Option<&mut Walker> {
        self.kind.walker_mut()
    }

    /// Returns the facing of a walker, `None` for other kinds.
    pub fn facing(&self) -> Option<Direction> {
        self.walker().map(|w| w.facing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rarity_tier_roundtrip() {
        for r in Rarity::ALL {
            assert_eq!(Rarity::from_tier(r.tier()), Some(r));
        }
        assert_eq!(Rarity::from_tier(0), None);
        assert_eq!(Rarity::from_tier(7), None);
    }

    #[test]
    fn multipliers_grow_with_rarity() {
        let m: Vec<i64> = Rarity::ALL.iter().map(|r| r.save_multiplier()).collect();
        assert!(m.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn only_characters_and_rofls_walk() {
        assert!(ObjectKind::character(Direction::Up).is_walker());
        assert!(ObjectKind::rofl(Direction::Up, Rarity::Rare).is_walker());
        assert!(!ObjectKind::live_grenade().is_walker());
        assert!(!ObjectKind::Milkshake.is_walker());
        assert!(!ObjectKind::Cactus.is_walker());
        assert!(!ObjectKind::open_portal().is_walker());
    }

    #[test]
    fn walker_mut_updates_status() {
        let mut kind = ObjectKind::rofl(Direction::Left, Rarity::Common);
        kind.walker_mut().unwrap().status = WalkerStatus::Burnt;
        assert!(kind.walker().unwrap().is_burnt());
    }

    #[test]
    fn kind_serializes_with_tag() {
        let json = serde_json::to_string(&ObjectKind::open_portal()).unwrap();
        assert!(json.contains("\"kind\":\"portal\""), "{}", json);
    }
}
