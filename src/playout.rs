//! Batch random playouts for level tuning.
//!
//! Plays a level many times with a random agent that drags and pokes
//! objects until its action allowance runs out, then starts a conga and
//! lets the session run to completion. Records the outcome of each run
//! for offline analysis of level difficulty.

use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use log::{debug, info};
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use thiserror::Error;

use crate::error::LevelError;
use crate::grid::{Direction, ObjectId};
use crate::movement;
use crate::protocol::layout::LevelLayout;
use crate::session::config::SessionConfig;
use crate::session::event::DomainEvent;
use crate::session::{LevelSession, SessionStatus};

/// Failure of a playout batch.
#[derive(Debug, Error)]
pub enum PlayoutError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error("cannot build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Configuration for a playout batch.
#[derive(Debug, Clone)]
pub struct PlayoutConfig {
    /// Number of runs to play.
    pub runs: usize,
    /// Agent decisions per run before the conga is forced.
    pub max_decisions: u32,
    /// Chance that a decision on an interactive object interacts rather than drags.
    pub interact_chance: f64,
    /// Number of parallel threads for concurrent runs.
    pub threads: usize,
    /// Random seed (0 = use entropy).
    pub seed: u64,
    /// Session settings shared by every run. Its seed is replaced per run.
    pub session: SessionConfig,
}

impl Default for PlayoutConfig {
    fn default() -> Self {
        PlayoutConfig {
            runs: 100,
            max_decisions: 64,
            interact_chance: 0.25,
            threads: 4,
            seed: 0,
            session: SessionConfig::default(),
        }
    }
}

/// Outcome of a single playout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayoutRecord {
    pub run_id: usize,
    pub score: u64,
    pub saved: u32,
    pub burnt: u32,
    pub steps: u32,
    pub actions_used: u32,
    pub refused: u32,
    pub final_status: SessionStatus,
    pub elapsed_ms: u64,
}

/// Seed for run `i`, or 0 to draw from entropy.
fn run_seed(base: u64, i: usize) -> u64 {
    if base == 0 {
        0
    } else {
        base.wrapping_add(i as u64)
    }
}

fn tally(events: Vec<DomainEvent>, record: &mut PlayoutRecord) {
    for event in events {
        match event {
            DomainEvent::CharacterSaved { .. } => record.saved += 1,
            DomainEvent::CharacterBurnt { .. } => record.burnt += 1,
            _ => {}
        }
    }
}

/// Picks one agent action and submits it. Returns false if the session
/// refused it.
fn decide(session: &mut LevelSession, config: &PlayoutConfig, rng: &mut SmallRng) -> bool {
    let candidates: Vec<(ObjectId, bool, bool)> = session
        .grid()
        .objects()
        .map(|o| {
            (
                o.id(),
                movement::is_draggable(&o.kind),
                movement::interact_cost(&o.kind).is_some(),
            )
        })
        .filter(|&(_, drag, poke)| drag || poke)
        .collect();
    let Some(&(id, drag, poke)) = candidates.choose(rng) else {
        return false;
    };

    let result = if poke && (!drag || rng.gen_bool(config.interact_chance)) {
        session.request_interact(id)
    } else {
        let Some(pos) = session.grid().get(id).map(|o| o.pos()) else {
            return false;
        };
        let dir = Direction::ALL[rng.gen_range(0..Direction::ALL.len())];
        session.request_move(id, pos.step(dir))
    };
    match result {
        Ok(()) => true,
        Err(e) => {
            debug!("agent action on {} refused: {}", id, e);
            false
        }
    }
}

/// Plays one run of `layout` and returns its record.
pub fn play_level(
    layout: &LevelLayout,
    config: &PlayoutConfig,
    run_id: usize,
    rng: &mut SmallRng,
) -> Result<PlayoutRecord, LevelError> {
    let start = Instant::now();
    let session_config = SessionConfig {
        seed: run_seed(config.seed, run_id),
        ..config.session.clone()
    };
    let mut session = LevelSession::new(session_config);
    session.start_level(layout)?;
    let allowance = session.budget().actions_remaining();

    let mut record = PlayoutRecord {
        run_id,
        score: 0,
        saved: 0,
        burnt: 0,
        steps: 0,
        actions_used: 0,
        refused: 0,
        final_status: session.status(),
        elapsed_ms: 0,
    };

    for _ in 0..config.max_decisions {
        if session.budget().actions_remaining() == 0 {
            break;
        }
        if !decide(&mut session, config, rng) {
            record.refused += 1;
        }
        session.run_until_idle()?;
        tally(session.drain_events(), &mut record);
    }

    if session.status() == SessionStatus::Active {
        session.start_conga()?;
    }
    session.run_until_idle()?;
    tally(session.drain_events(), &mut record);

    record.score = session.score().value();
    record.steps = session.steps();
    record.actions_used = allowance - session.budget().actions_remaining();
    record.final_status = session.status();
    record.elapsed_ms = start.elapsed().as_millis() as u64;
    Ok(record)
}

/// Plays `config.runs` runs of `layout`.
///
/// When `config.threads > 1`, runs are played concurrently using rayon.
/// Records come back ordered by run id either way.
pub fn run_playouts(
    layout: &LevelLayout,
    config: &PlayoutConfig,
) -> Result<Vec<PlayoutRecord>, PlayoutError> {
    if config.threads > 1 {
        run_parallel(layout, config)
    } else {
        run_sequential(layout, config)
    }
}

fn agent_rng(config: &PlayoutConfig, i: usize) -> SmallRng {
    match run_seed(config.seed, i) {
        0 => SmallRng::from_entropy(),
        seed => SmallRng::seed_from_u64(seed),
    }
}

fn run_sequential(
    layout: &LevelLayout,
    config: &PlayoutConfig,
) -> Result<Vec<PlayoutRecord>, PlayoutError> {
    let mut records = Vec::with_capacity(config.runs);
    for i in 0..config.runs {
        let mut rng = agent_rng(config, i);
        let record = play_level(layout, config, i, &mut rng)?;
        debug!(
            "run {}/{}: score {} saved {} ({}ms)",
            i + 1,
            config.runs,
            record.score,
            record.saved,
            record.elapsed_ms
        );
        records.push(record);
    }
    Ok(records)
}

fn run_parallel(
    layout: &LevelLayout,
    config: &PlayoutConfig,
) -> Result<Vec<PlayoutRecord>, PlayoutError> {
    use rayon::prelude::*;

    let completed = AtomicUsize::new(0);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let records = pool.install(|| {
        (0..config.runs)
            .into_par_iter()
            .map(|i| -> Result<PlayoutRecord, LevelError> {
                let mut rng = agent_rng(config, i);
                let record = play_level(layout, config, i, &mut rng)?;
                let n = completed.fetch_add(1, Ordering::Relaxed) + 1;
                debug!(
                    "run {}/{}: score {} saved {} ({}ms)",
                    n, config.runs, record.score, record.saved, record.elapsed_ms
                );
                Ok(record)
            })
            .collect::<Result<Vec<_>, LevelError>>()
    })?;
    Ok(records)
}

/// Writes playout records as JSONL (one JSON object per run, one per line).
pub fn write_jsonl<W: Write>(records: &[PlayoutRecord], out: &mut W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut *out, record)?;
        writeln!(out)?;
    }
    out.flush()
}

/// Aggregate statistics over a batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlayoutSummary {
    pub runs: usize,
    pub cleared: usize,
    pub mean_score: f64,
    pub best_score: u64,
    pub mean_saved: f64,
    pub mean_burnt: f64,
    pub mean_steps: f64,
}

/// Summarizes a batch. A run counts as cleared when it reached the level
/// over screen.
pub fn summarize(records: &[PlayoutRecord]) -> PlayoutSummary {
    let runs = records.len();
    if runs == 0 {
        return PlayoutSummary::default();
    }
    let n = runs as f64;
    let mean = |f: fn(&PlayoutRecord) -> f64| records.iter().map(f).sum::<f64>() / n;
    PlayoutSummary {
        runs,
        cleared: records
            .iter()
            .filter(|r| r.final_status == SessionStatus::LevelOverScreen)
            .count(),
        mean_score: mean(|r| r.score as f64),
        best_score: records.iter().map(|r| r.score).max().unwrap_or(0),
        mean_saved: mean(|r| r.saved as f64),
        mean_burnt: mean(|r| r.burnt as f64),
        mean_steps: mean(|r| r.steps as f64),
    }
}

/// Logs a summary of a batch.
pub fn log_summary(records: &[PlayoutRecord]) {
    let s = summarize(records);
    info!("=== Playout Summary ===");
    info!("Runs: {}", s.runs);
    info!(
        "Cleared: {} ({:.1}%)",
        s.cleared,
        100.0 * s.cleared as f64 / s.runs.max(1) as f64
    );
    info!("Mean score: {:.1} (best {})", s.mean_score, s.best_score);
    info!("Mean saved/burnt: {:.2}/{:.2}", s.mean_saved, s.mean_burnt);
    info!("Mean conga steps: {:.1}", s.mean_steps);
}
