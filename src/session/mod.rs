//! Level session orchestration.
//!
//! `LevelSession` owns one level's grid, budget, score, and status machine,
//! and drives conga steps and grenade blasts on a simulated clock. Every
//! observable change is reported as a `DomainEvent`.
//!
//! Within one conga step the order of evaluation is fixed: plan and status
//! snapshot, proximity arming of grenades, movement, post-move cactus and
//! milkshake checks, then scheduling of the armed blasts and of the step's
//! completion.

pub mod budget;
pub mod config;
pub mod event;
pub mod score;
pub mod timeline;

use log::{debug, error, info, warn};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::{ActionError, GridError, LevelError};
use crate::grid::{Coord, Grid, GridObject, ObjectId, ObjectKind, PortalStatus, WalkerStatus};
use crate::levelgen;
use crate::movement::{self, DragGesture, MoveCheck};
use crate::protocol::layout::LevelLayout;
use crate::resolve::{conga, consumable, hazard, CongaResolver};

use budget::ActionBudget;
use config::SessionConfig;
use event::DomainEvent;
use score::{Score, ScoreCategory, StatMask};
use timeline::{Task, Timeline};

/// Level status machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// No level loaded.
    Inactive,
    /// Accepting player actions.
    Active,
    /// Conga steps are being resolved.
    CongaRunning,
    /// Every walker has left the grid.
    LevelOverScreen,
}

impl SessionStatus {
    pub const fn name(self) -> &'static str {
        match self {
            SessionStatus::Inactive => "inactive",
            SessionStatus::Active => "active",
            SessionStatus::CongaRunning => "conga_running",
            SessionStatus::LevelOverScreen => "level_over_screen",
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Starting state kept for `reset_level`.
#[derive(Debug, Clone)]
struct Snapshot {
    grid: Grid,
    budget: ActionBudget,
}

pub struct LevelSession {
    config: SessionConfig,
    status: SessionStatus,
    grid: Grid,
    budget: ActionBudget,
    score: Score,
    mask: StatMask,
    initial: Option<Snapshot>,
    timeline: Timeline,
    resolver: CongaResolver,
    events: Vec<DomainEvent>,
    rng: SmallRng,
    last_step_moved: bool,
    steps: u32,
}

impl LevelSession {
    /// Creates a session with no level loaded.
    pub fn new(config: SessionConfig) -> Self {
        let rng = if config.seed == 0 {
            SmallRng::from_entropy()
        } else {
            SmallRng::seed_from_u64(config.seed)
        };
        LevelSession {
            config,
            status: SessionStatus::Inactive,
            grid: Grid::new(0, 0),
            budget: ActionBudget::with_counters(0, [0; 5]),
            score: Score::default(),
            mask: StatMask::all(),
            initial: None,
            timeline: Timeline::new(),
            resolver: CongaResolver::new(),
            events: Vec::new(),
            rng,
            last_step_moved: false,
            steps: 0,
        }
    }

    /// Starts a session directly on a prepared grid and budget.
    pub fn from_grid(grid: Grid, budget: ActionBudget, config: SessionConfig) -> Self {
        let mut session = LevelSession::new(config);
        session.initial = Some(Snapshot {
            grid: grid.clone(),
            budget: budget.clone(),
        });
        session.grid = grid;
        session.budget = budget;
        session.status = SessionStatus::Active;
        session
    }

    /// Builds the level from `layout` and makes it active. Any previous
    /// level is discarded.
    pub fn start_level(&mut self, layout: &LevelLayout) -> Result<(), LevelError> {
        if self.is_step_running() {
            return Err(self.refuse("start a level").into());
        }
        let grid = levelgen::build_grid(layout, &mut self.rng, self.config.max_placement_attempts)
            .map_err(|e| {
                error!("level {:?} cannot be built: {}", layout.name, e);
                e
            })?;
        let budget = ActionBudget::roll(layout.actions, &layout.traits, &mut self.rng);
        info!(
            "starting level {:?}: {}x{}, {} objects, {} actions",
            layout.name,
            grid.rows(),
            grid.cols(),
            grid.object_count(),
            budget.actions_remaining()
        );
        self.initial = Some(Snapshot {
            grid: grid.clone(),
            budget: budget.clone(),
        });
        self.grid = grid;
        self.budget = budget;
        self.score = Score::default();
        self.mask = layout.mask();
        self.timeline.clear();
        self.last_step_moved = false;
        self.steps = 0;
        self.set_status(SessionStatus::Active);
        Ok(())
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn score(&self) -> Score {
        self.score
    }

    pub fn budget(&self) -> &ActionBudget {
        &self.budget
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Current simulated time in milliseconds.
    pub fn now_ms(&self) -> u64 {
        self.timeline.now_ms()
    }

    /// Conga steps executed since the level started.
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// True while a conga run or any deferred evaluation is in flight.
    /// Exit and reset must wait until this is false.
    pub fn is_step_running(&self) -> bool {
        self.status == SessionStatus::CongaRunning || !self.timeline.is_idle()
    }

    /// Takes every event emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<DomainEvent> {
        std::mem::take(&mut self.events)
    }

    /// Moves object `id` one cell to `target`. A move onto the object's own
    /// cell succeeds without spending anything. A refused move changes
    /// nothing.
    pub fn request_move(&mut self, id: ObjectId, target: Coord) -> Result<(), ActionError> {
        self.require_active("move")?;
        let (from, to) = match movement::check_move(&self.grid, id, target)? {
            MoveCheck::Unchanged => return Ok(()),
            MoveCheck::Step { from, to, .. } => (from, to),
        };
        let kind = self.object(id)?.kind;
        let cost = movement::move_cost(&kind);
        self.budget.check(cost)?;
        self.grid.place(id, to)?;
        self.budget.spend(cost)?;
        if let Some(walker) = self.grid.get_mut(id).and_then(GridObject::walker_mut) {
            if walker.is_burnt() {
                walker.status = WalkerStatus::Idle;
            }
        }
        debug!("moved {} {} from {} to {}", kind.name(), id, from, to);
        self.events.push(DomainEvent::ObjectMoved { id, from, to });
        if kind.is_walker() {
            self.pick_up_milkshakes(&[to]);
        }
        Ok(())
    }

    /// Drags object `id` from its cell centre to the presentation-space
    /// point `(x, y)` and releases it there.
    pub fn request_drag(&mut self, id: ObjectId, x: f32, y: f32) -> Result<(), ActionError> {
        self.require_active("move")?;
        let geometry = self.config.geometry;
        let (cx, cy) = geometry.center_of(self.object(id)?.pos());
        let mut gesture = DragGesture::begin(&self.grid, &geometry, id, cx, cy)?;
        gesture.drag_to(x, y);
        self.request_move(id, gesture.release())
    }

    /// Interacts with object `id`: arms a live grenade or toggles a portal.
    /// Other objects ignore interaction without spending anything.
    pub fn request_interact(&mut self, id: ObjectId) -> Result<(), ActionError> {
        self.require_active("interact")?;
        let obj = self.object(id)?;
        let (kind, at) = (obj.kind, obj.pos());
        let Some(cost) = movement::interact_cost(&kind) else {
            return Ok(());
        };
        self.budget.spend(Some(cost))?;
        match kind {
            ObjectKind::Grenade(_) => {
                self.arm(id, at);
                self.timeline
                    .schedule(self.config.blast_delay_ms, Task::Blast(id));
            }
            ObjectKind::Portal(status) => {
                let next = match status {
                    PortalStatus::Open => PortalStatus::Closed,
                    PortalStatus::Closed => PortalStatus::Open,
                };
                if let Some(obj) = self.grid.get_mut(id) {
                    obj.kind = ObjectKind::Portal(next);
                }
                self.events.push(DomainEvent::PortalToggled {
                    id,
                    open: next == PortalStatus::Open,
                });
            }
            ObjectKind::Character(_)
            | ObjectKind::Rofl { .. }
            | ObjectKind::Milkshake
            | ObjectKind::Cactus => {}
        }
        Ok(())
    }

    /// Starts a conga run. The first step resolves immediately; later steps
    /// follow every `step_interval_ms` until a step moves nothing.
    pub fn start_conga(&mut self) -> Result<(), ActionError> {
        self.require_active("start a conga")?;
        self.set_status(SessionStatus::CongaRunning);
        self.execute_step()
    }

    /// Advances the simulated clock by `ms`, running every evaluation that
    /// falls due on the way.
    pub fn advance(&mut self, ms: u64) -> Result<(), ActionError> {
        let until = self.timeline.now_ms().saturating_add(ms);
        while let Some(task) = self.timeline.pop_due(until) {
            match task {
                Task::StepComplete => self.complete_step()?,
                Task::Blast(id) => self.blast(id)?,
            }
        }
        self.timeline.set_now(until);
        Ok(())
    }

    /// Advances the clock until nothing is pending.
    pub fn run_until_idle(&mut self) -> Result<(), ActionError> {
        while let Some(due) = self.timeline.next_due() {
            let ms = due.saturating_sub(self.timeline.now_ms());
            self.advance(ms)?;
        }
        Ok(())
    }

    /// Restores the level to its starting state. Refused while a step is
    /// in flight.
    pub fn reset_level(&mut self) -> Result<(), ActionError> {
        if self.is_step_running() || self.status == SessionStatus::Inactive {
            return Err(self.refuse("reset"));
        }
        let Some(initial) = self.initial.clone() else {
            return Err(self.refuse("reset"));
        };
        info!("resetting level (score was {})", self.score.value());
        self.grid = initial.grid;
        self.budget = initial.budget;
        self.score = Score::default();
        self.last_step_moved = false;
        self.steps = 0;
        self.set_status(SessionStatus::Active);
        Ok(())
    }

    /// Leaves the level. Refused while a step is in flight.
    pub fn end_level(&mut self) -> Result<(), ActionError> {
        if self.is_step_running() || self.status == SessionStatus::Inactive {
            return Err(self.refuse("end the level"));
        }
        info!("ending level with score {}", self.score.value());
        self.grid = Grid::new(0, 0);
        self.initial = None;
        self.set_status(SessionStatus::Inactive);
        Ok(())
    }

    /// Tears the session down and returns the final score.
    pub fn destroy(mut self) -> Score {
        self.timeline.clear();
        debug!("session destroyed after {} steps", self.steps);
        self.score
    }

    fn object(&self, id: ObjectId) -> Result<&GridObject, GridError> {
        self.grid.get(id).ok_or(GridError::UnknownObject(id))
    }

    fn refuse(&self, action: &'static str) -> ActionError {
        let err = ActionError::InvalidStateTransition {
            status: self.status,
            action,
        };
        warn!("{}", err);
        err
    }

    fn require_active(&self, action: &'static str) -> Result<(), ActionError> {
        if self.status == SessionStatus::Active {
            Ok(())
        } else {
            Err(self.refuse(action))
        }
    }

    fn set_status(&mut self, to: SessionStatus) {
        let from = self.status;
        if from == to {
            return;
        }
        self.status = to;
        debug!("level status {} -> {}", from, to);
        self.events.push(DomainEvent::LevelStatusChanged { from, to });
    }

    fn award(&mut self, reason: ScoreCategory, amount: i64) {
        if amount == 0 || !self.mask.contains(reason) {
            return;
        }
        let applied = self.score.apply(amount);
        self.events.push(DomainEvent::ScoreDelta {
            amount: applied,
            reason,
            total: self.score.value(),
        });
    }

    /// Arms a live grenade. The caller schedules its blast.
    fn arm(&mut self, id: ObjectId, at: Coord) -> bool {
        if hazard::trigger(&mut self.grid, id) {
            self.events.push(DomainEvent::GrenadeArmed { id, at });
            true
        } else {
            false
        }
    }

    fn execute_step(&mut self) -> Result<(), ActionError> {
        self.steps += 1;
        let plan = self.resolver.plan(&self.grid);
        conga::apply_statuses(&mut self.grid, &plan);

        let destinations: Vec<Coord> = plan.destinations().collect();
        let mut armed = Vec::new();
        for id in hazard::live_grenades_near(&self.grid, &destinations) {
            let at = self.object(id)?.pos();
            if self.arm(id, at) {
                armed.push(id);
            }
        }

        let outcome = conga::apply_step(&mut self.grid, &plan)?;
        let scores = self.config.scores;
        for saved in &outcome.saved {
            let id = saved.object.id();
            self.events.push(DomainEvent::ObjectCongaed {
                id,
                from: saved.object.pos(),
                to: saved.portal_at,
                chain_length: saved.chain_length,
            });
            self.events.push(DomainEvent::CharacterSaved {
                id,
                portal: saved.portal,
            });
            let multiplier = match saved.object.kind {
                ObjectKind::Rofl { rarity, .. } => rarity.save_multiplier(),
                _ => 1,
            };
            self.award(ScoreCategory::Saved, scores.saved * multiplier);
        }
        let mut landed = Vec::with_capacity(outcome.advanced.len());
        for adv in &outcome.advanced {
            self.events.push(DomainEvent::ObjectCongaed {
                id: adv.id,
                from: adv.from,
                to: adv.to,
                chain_length: adv.chain_length,
            });
            self.award(ScoreCategory::CongaJump, scores.conga_jump);
            landed.push((adv.id, adv.to));
        }

        for spike in consumable::cactus_spikes(&self.grid, &landed) {
            self.events.push(DomainEvent::CactusSpiked {
                cactus: spike.cactus,
                victim: spike.victim,
            });
            self.award(ScoreCategory::Spike, scores.spike);
        }
        let touched: Vec<Coord> = landed.iter().map(|&(_, to)| to).collect();
        self.pick_up_milkshakes(&touched);

        for id in armed {
            self.timeline
                .schedule(self.config.blast_delay_ms, Task::Blast(id));
        }
        self.last_step_moved = !plan.is_idle();
        debug!(
            "step {}: {} saved, {} advanced",
            self.steps,
            outcome.saved.len(),
            outcome.advanced.len()
        );
        self.timeline
            .schedule(self.config.step_interval_ms, Task::StepComplete);
        Ok(())
    }

    fn complete_step(&mut self) -> Result<(), ActionError> {
        if self.status != SessionStatus::CongaRunning {
            return Ok(());
        }
        if self.last_step_moved {
            return self.execute_step();
        }
        for obj in self.grid.objects_mut() {
            if let Some(walker) = obj.walker_mut() {
                if !walker.is_burnt() {
                    walker.status = WalkerStatus::Idle;
                }
            }
        }
        let remaining = self.grid.objects().filter(|o| o.kind.is_walker()).count();
        info!(
            "conga run finished after {} steps, {} walkers left, score {}",
            self.steps,
            remaining,
            self.score.value()
        );
        if remaining == 0 {
            self.set_status(SessionStatus::LevelOverScreen);
        } else {
            self.set_status(SessionStatus::Active);
        }
        Ok(())
    }

    fn blast(&mut self, id: ObjectId) -> Result<(), ActionError> {
        let outcome = hazard::resolve_blast(&mut self.grid, id)?;
        self.events.push(DomainEvent::GrenadeExploded {
            id,
            at: outcome.origin,
        });
        for &(burnt, at) in &outcome.burnt {
            self.events.push(DomainEvent::CharacterBurnt { id: burnt, at });
        }
        for &(shake, at) in &outcome.destroyed {
            self.events
                .push(DomainEvent::MilkshakeDestroyed { id: shake, at });
        }
        for &(next, at) in &outcome.chained {
            self.events.push(DomainEvent::GrenadeArmed { id: next, at });
            self.timeline
                .schedule(self.config.chain_stagger_ms, Task::Blast(next));
        }
        debug!(
            "blast at {}: {} burnt, {} chained",
            outcome.origin,
            outcome.burnt.len(),
            outcome.chained.len()
        );
        Ok(())
    }

    fn pick_up_milkshakes(&mut self, touched: &[Coord]) {
        for pickup in consumable::collect_milkshakes(&mut self.grid, touched) {
            let count = pickup.buffed.len() as i64;
            self.events.push(DomainEvent::MilkshakeConsumed {
                id: pickup.milkshake,
                at: pickup.at,
                buffed: pickup.buffed,
            });
            for _ in 0..count {
                self.award(ScoreCategory::Buff, self.config.scores.buff);
            }
        }
    }
}
