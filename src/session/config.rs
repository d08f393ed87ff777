//! Session tuning knobs.
//!
//! The engine keeps `setoption` pairs in a string map; `SessionConfig` is
//! built from that map when a level starts.

use std::collections::HashMap;
use std::str::FromStr;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::grid::GridGeometry;

/// Score awarded per event category, before rarity multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTable {
    pub saved: i64,
    pub conga_jump: i64,
    pub buff: i64,
    pub spike: i64,
}

impl Default for ScoreTable {
    fn default() -> Self {
        ScoreTable {
            saved: 100,
            conga_jump: 10,
            buff: 25,
            spike: -15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Simulated time between the start of one conga step and the next.
    pub step_interval_ms: u64,
    /// Delay between a grenade being armed and its blast resolving.
    pub blast_delay_ms: u64,
    /// Extra delay before a grenade caught in a blast resolves its own.
    pub chain_stagger_ms: u64,
    /// Attempts allowed when searching for a random empty cell.
    pub max_placement_attempts: u32,
    /// RNG seed; 0 draws one from entropy.
    pub seed: u64,
    pub geometry: GridGeometry,
    pub scores: ScoreTable,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            step_interval_ms: 600,
            blast_delay_ms: 400,
            chain_stagger_ms: 150,
            max_placement_attempts: 1000,
            seed: 0,
            geometry: GridGeometry::default(),
            scores: ScoreTable::default(),
        }
    }
}

impl SessionConfig {
    /// Builds a config from engine options. Missing options keep their
    /// defaults; unparsable ones keep their defaults and log a warning.
    pub fn from_options(options: &HashMap<String, String>) -> Self {
        let mut config = SessionConfig::default();
        read_option(options, "StepInterval", &mut config.step_interval_ms);
        read_option(options, "BlastDelay", &mut config.blast_delay_ms);
        read_option(options, "ChainStagger", &mut config.chain_stagger_ms);
        read_option(
            options,
            "MaxPlacementAttempts",
            &mut config.max_placement_attempts,
        );
        read_option(options, "Seed", &mut config.seed);
        read_option(options, "CellSize", &mut config.geometry.cell_size);
        if config.geometry.cell_size <= 0.0 {
            warn!("CellSize must be positive; using default");
            config.geometry.cell_size = GridGeometry::default().cell_size;
        }
        config
    }
}

fn read_option<T: FromStr>(options: &HashMap<String, String>, name: &str, slot: &mut T) {
    let Some(raw) = options.get(name) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(v) => *slot = v,
        Err(_) => warn!("ignoring option {}: cannot parse {:?}", name, raw),
    }
}
