//! Congaline -- a grid conga puzzle engine driven over a line protocol.
//!
//! This binary reads commands from stdin and writes responses to stdout.
//! Logging goes to stderr and is controlled by `RUST_LOG`.

use std::io::{self, BufRead};

use log::error;

use congaline::engine::Engine;
use congaline::protocol::parser::{parse_command, Command};

/// Runs the main protocol loop, reading commands from stdin
/// and writing responses to stdout.
fn main() {
    env_logger::init();

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let mut engine = Engine::new();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(_) => break,
        };

        let cmd = match parse_command(&line) {
            Some(c) => c,
            None => continue,
        };

        let written = match cmd {
            Command::Hello => engine.handle_hello(&mut out),
            Command::IsReady => engine.handle_isready(&mut out),
            Command::SetOption { name, value } => {
                engine.set_option(name, value);
                Ok(())
            }
            Command::Level { json } => engine.handle_level(&json, &mut out),
            Command::Move { id, target } => engine.handle_move(id, target, &mut out),
            Command::Drop { id, x, y } => engine.handle_drop(id, x, y, &mut out),
            Command::Interact { id } => engine.handle_interact(id, &mut out),
            Command::Conga => engine.handle_conga(&mut out),
            Command::Tick { ms } => engine.handle_tick(ms, &mut out),
            Command::Reset => engine.handle_reset(&mut out),
            Command::End => engine.handle_end(&mut out),
            Command::State => engine.handle_state(&mut out),
            Command::Quit => break,
        };

        if let Err(e) = written {
            error!("output closed: {}", e);
            break;
        }
    }
}
