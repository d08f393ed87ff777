//! Level score and the per-level mask of active scoring categories.

use serde::{Deserialize, Serialize};

/// Why a score delta was awarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreCategory {
    /// A character reached a portal.
    Saved,
    /// A follower advanced during a conga step.
    CongaJump,
    /// A milkshake was picked up.
    Buff,
    /// A character congaed next to a cactus.
    Spike,
}

impl ScoreCategory {
    pub const ALL: [ScoreCategory; 4] = [
        ScoreCategory::Saved,
        ScoreCategory::CongaJump,
        ScoreCategory::Buff,
        ScoreCategory::Spike,
    ];

    const fn bit(self) -> u8 {
        match self {
            ScoreCategory::Saved => 1,
            ScoreCategory::CongaJump => 1 << 1,
            ScoreCategory::Buff => 1 << 2,
            ScoreCategory::Spike => 1 << 3,
        }
    }
}

/// The set of scoring categories a level counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatMask(u8);

impl StatMask {
    pub const fn all() -> Self {
        StatMask(0b1111)
    }

    pub const fn none() -> Self {
        StatMask(0)
    }

    pub fn from_categories(categories: &[ScoreCategory]) -> Self {
        StatMask(categories.iter().fold(0, |acc, c| acc | c.bit()))
    }

    pub fn contains(self, category: ScoreCategory) -> bool {
        self.0 & category.bit() != 0
    }
}

impl Default for StatMask {
    fn default() -> Self {
        StatMask::all()
    }
}

/// A non-negative running score. Negative deltas saturate at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Score(u64);

impl Score {
    pub fn value(self) -> u64 {
        self.0
    }

    /// Applies a delta and returns the amount actually applied.
    pub fn apply(&mut self, delta: i64) -> i64 {
        let before = self.0;
        self.0 = if delta >= 0 {
            self.0.saturating_add(delta.unsigned_abs())
        } else {
            self.0.saturating_sub(delta.unsigned_abs())
        };
        self.0 as i64 - before as i64
    }
}
