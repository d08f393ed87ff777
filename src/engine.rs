//! Engine state management.
//!
//! Holds the engine options and the current level session, and turns
//! commands into session calls and protocol output. Exit and reset
//! requests that arrive while a step is in flight are queued and replayed
//! once the session's timeline drains.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Write};

use log::{info, warn};

use crate::error::ActionError;
use crate::grid::{Coord, ObjectId};
use crate::protocol::layout::parse_layout;
use crate::protocol::sketch::encode_sketch;
use crate::session::budget::Counter;
use crate::session::config::SessionConfig;
use crate::session::LevelSession;

/// A lifecycle request waiting for the in-flight step to finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deferred {
    Reset,
    End,
}

impl Deferred {
    fn name(self) -> &'static str {
        match self {
            Deferred::Reset => "reset",
            Deferred::End => "end",
        }
    }
}

/// Holds the mutable state of the engine between commands.
pub struct Engine {
    pub options: HashMap<String, String>,
    session: LevelSession,
    deferred: VecDeque<Deferred>,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new()
    }
}

impl Engine {
    /// Creates an engine with no level loaded.
    pub fn new() -> Self {
        Engine {
            options: HashMap::new(),
            session: LevelSession::new(SessionConfig::default()),
            deferred: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &LevelSession {
        &self.session
    }

    /// Sets an engine option. Takes effect at the next `level`.
    pub fn set_option(&mut self, name: String, value: Option<String>) {
        self.options.insert(name, value.unwrap_or_default());
    }

    /// Handles the handshake: writes id, options, protocol_version, and hellook.
    pub fn handle_hello<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "id name congaline")?;
        writeln!(out, "id author polite-betrayal")?;
        writeln!(out, "option name StepInterval type spin default 600 min 0 max 60000")?;
        writeln!(out, "option name BlastDelay type spin default 400 min 0 max 60000")?;
        writeln!(out, "option name ChainStagger type spin default 150 min 0 max 60000")?;
        writeln!(
            out,
            "option name MaxPlacementAttempts type spin default 1000 min 1 max 1000000"
        )?;
        writeln!(out, "option name Seed type spin default 0 min 0 max 18446744073709551615")?;
        writeln!(out, "option name CellSize type string default 64")?;
        writeln!(out, "protocol_version 1")?;
        writeln!(out, "hellook")?;
        out.flush()
    }

    /// Handles the `isready` command.
    pub fn handle_isready<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "readyok")?;
        out.flush()
    }

    /// Starts a new session on the layout in `json`.
    pub fn handle_level<W: Write>(&mut self, json: &str, out: &mut W) -> io::Result<()> {
        if self.session.is_step_running() {
            return self.refused(
                ActionError::InvalidStateTransition {
                    status: self.session.status(),
                    action: "start a level",
                },
                out,
            );
        }
        let layout = match parse_layout(json) {
            Ok(layout) => layout,
            Err(e) => {
                warn!("rejected level: {}", e);
                writeln!(out, "error {}", e)?;
                return out.flush();
            }
        };
        let mut session = LevelSession::new(SessionConfig::from_options(&self.options));
        match session.start_level(&layout) {
            Ok(()) => {
                self.session = session;
                self.deferred.clear();
                let grid = self.session.grid();
                writeln!(
                    out,
                    "levelok {} {} {}",
                    grid.rows(),
                    grid.cols(),
                    self.session.budget().actions_remaining()
                )?;
                self.flush_events(out)
            }
            Err(e) => {
                writeln!(out, "error {}", e)?;
                out.flush()
            }
        }
    }

    pub fn handle_move<W: Write>(
        &mut self,
        id: ObjectId,
        target: Coord,
        out: &mut W,
    ) -> io::Result<()> {
        let result = self.session.request_move(id, target);
        self.report(result, out)
    }

    pub fn handle_drop<W: Write>(&mut self, id: ObjectId, x: f32, y: f32, out: &mut W) -> io::Result<()> {
        let result = self.session.request_drag(id, x, y);
        self.report(result, out)
    }

    pub fn handle_interact<W: Write>(&mut self, id: ObjectId, out: &mut W) -> io::Result<()> {
        let result = self.session.request_interact(id);
        self.report(result, out)
    }

    pub fn handle_conga<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let result = self.session.start_conga();
        self.report(result, out)
    }

    /// Advances the simulated clock, then replays any deferred requests
    /// once nothing is in flight.
    pub fn handle_tick<W: Write>(&mut self, ms: u64, out: &mut W) -> io::Result<()> {
        let result = self.session.advance(ms);
        self.report(result, out)?;
        while !self.session.is_step_running() {
            let Some(next) = self.deferred.pop_front() else {
                break;
            };
            info!("replaying deferred {}", next.name());
            self.run_lifecycle(next, out)?;
        }
        Ok(())
    }

    pub fn handle_reset<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.lifecycle(Deferred::Reset, out)
    }

    pub fn handle_end<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.lifecycle(Deferred::End, out)
    }

    /// Prints the session status line and the grid sketch.
    pub fn handle_state<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let s = &self.session;
        let budget = s.budget();
        let colors: Vec<String> = Counter::COLORS
            .iter()
            .map(|c| format!("{} {}", c, budget.remaining(*c)))
            .collect();
        writeln!(
            out,
            "status {} score {} actions {} {} time {} running {}",
            s.status(),
            s.score().value(),
            budget.actions_remaining(),
            colors.join(" "),
            s.now_ms(),
            s.is_step_running()
        )?;
        writeln!(out, "grid {}", encode_sketch(s.grid()))?;
        out.flush()
    }

    fn lifecycle<W: Write>(&mut self, request: Deferred, out: &mut W) -> io::Result<()> {
        if self.session.is_step_running() {
            self.deferred.push_back(request);
            writeln!(out, "deferred {}", request.name())?;
            return out.flush();
        }
        self.run_lifecycle(request, out)
    }

    fn run_lifecycle<W: Write>(&mut self, request: Deferred, out: &mut W) -> io::Result<()> {
        let result = match request {
            Deferred::Reset => self.session.reset_level(),
            Deferred::End => self.session.end_level(),
        };
        self.report(result, out)
    }

    fn report<W: Write>(&mut self, result: Result<(), ActionError>, out: &mut W) -> io::Result<()> {
        match result {
            Ok(()) => self.flush_events(out),
            Err(e) => self.refused(e, out),
        }
    }

    fn refused<W: Write>(&mut self, err: ActionError, out: &mut W) -> io::Result<()> {
        writeln!(out, "refused {}", err)?;
        self.flush_events(out)
    }

    fn flush_events<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        for event in self.session.drain_events() {
            match serde_json::to_string(&event) {
                Ok(json) => writeln!(out, "event {}", json)?,
                Err(e) => warn!("cannot encode {} event: {}", event.name(), e),
            }
        }
        out.flush()
    }
}
