//! Player action economy.
//!
//! A level grants one shared action allowance plus five per-color counters.
//! Counter capacities are derived from the controlling character's four
//! traits at level start and are never replenished mid-level.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// A budget counter. `Actions` is the shared allowance every action spends;
/// the rest are per-color counters spent only by actions that carry a cost
/// in that color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Counter {
    Actions,
    Move,
    Pink,
    Red,
    Green,
    Blue,
}

impl Counter {
    /// The per-color counters, in table order.
    pub const COLORS: [Counter; 5] = [
        Counter::Move,
        Counter::Pink,
        Counter::Red,
        Counter::Green,
        Counter::Blue,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            Counter::Actions => "actions",
            Counter::Move => "move",
            Counter::Pink => "pink",
            Counter::Red => "red",
            Counter::Green => "green",
            Counter::Blue => "blue",
        }
    }

    fn slot(self) -> Option<usize> {
        match self {
            Counter::Actions => None,
            Counter::Move => Some(0),
            Counter::Pink => Some(1),
            Counter::Red => Some(2),
            Counter::Green => Some(3),
            Counter::Blue => Some(4),
        }
    }
}

impl std::fmt::Display for Counter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// The controlling character's numeric traits, each in 0..=99.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Traits {
    pub energy: i32,
    pub aggression: i32,
    pub spookiness: i32,
    pub brain: i32,
}

impl Default for Traits {
    fn default() -> Self {
        Traits {
            energy: 50,
            aggression: 50,
            spookiness: 50,
            brain: 50,
        }
    }
}

/// Inclusive bounds for a counter's starting value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRange {
    pub min: u32,
    pub max: u32,
}

impl StatRange {
    /// Range for a single trait: the further from the neutral 50, the
    /// larger the allowance.
    pub fn from_trait(value: i32) -> Self {
        let extremity = (value.clamp(0, 99) - 50).unsigned_abs();
        let min = 1 + extremity / 25;
        StatRange {
            min,
            max: min + 1 + extremity / 10,
        }
    }

    /// Range for the generic move counter, driven by the mean extremity of
    /// all four traits.
    pub fn for_moves(traits: &Traits) -> Self {
        let total: u32 = [traits.energy, traits.aggression, traits.spookiness, traits.brain]
            .into_iter()
            .map(|v| (v.clamp(0, 99) - 50).unsigned_abs())
            .sum();
        let min = 3 + total / 4 / 10;
        StatRange { min, max: min + 3 }
    }

    pub fn contains(&self, value: u32) -> bool {
        value >= self.min && value <= self.max
    }
}

impl Traits {
    /// Ranges for `Counter::COLORS`, in the same order.
    pub fn ranges(&self) -> [StatRange; 5] {
        [
            StatRange::for_moves(self),
            StatRange::from_trait(self.energy),
            StatRange::from_trait(self.aggression),
            StatRange::from_trait(self.spookiness),
            StatRange::from_trait(self.brain),
        ]
    }
}

/// Remaining allowances for one level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionBudget {
    actions_remaining: u32,
    counters: [u32; 5],
    ranges: [StatRange; 5],
}

impl ActionBudget {
    /// Draws each counter's starting value from its trait-derived range.
    pub fn roll(actions: u32, traits: &Traits, rng: &mut impl Rng) -> Self {
        let ranges = traits.ranges();
        let mut counters = [0u32; 5];
        for (slot, range) in counters.iter_mut().zip(ranges.iter()) {
            *slot = rng.gen_range(range.min..=range.max);
        }
        ActionBudget {
            actions_remaining: actions,
            counters,
            ranges,
        }
    }

    /// Builds a budget with explicit counter values, in `Counter::COLORS`
    /// order. Each range collapses to its value.
    pub fn with_counters(actions: u32, counters: [u32; 5]) -> Self {
        let ranges = counters.map(|v| StatRange { min: v, max: v });
        ActionBudget {
            actions_remaining: actions,
            counters,
            ranges,
        }
    }

    pub fn actions_remaining(&self) -> u32 {
        self.actions_remaining
    }

    pub fn remaining(&self, counter: Counter) -> u32 {
        match counter.slot() {
            Some(i) => self.counters[i],
            None => self.actions_remaining,
        }
    }

    pub fn range(&self, counter: Counter) -> Option<StatRange> {
        counter.slot().map(|i| self.ranges[i])
    }

    /// Checks that one action with the given color cost is affordable.
    pub fn check(&self, cost: Option<Counter>) -> Result<(), ActionError> {
        if self.actions_remaining == 0 {
            return Err(ActionError::InsufficientBudget(Counter::Actions));
        }
        if let Some(counter) = cost {
            if self.remaining(counter) == 0 {
                return Err(ActionError::InsufficientBudget(counter));
            }
        }
        Ok(())
    }

    /// Spends one action and, if given, one point of the color counter.
    /// Nothing is spent when either is exhausted.
    pub fn spend(&mut self, cost: Option<Counter>) -> Result<(), ActionError> {
        self.check(cost)?;
        self.actions_remaining -= 1;
        if let Some(i) = cost.and_then(Counter::slot) {
            self.counters[i] -= 1;
        }
        Ok(())
    }
}
