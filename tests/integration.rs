//! Integration tests for the congaline engine binary.
//!
//! Tests the full protocol session flow by spawning the engine process,
//! sending commands via stdin, and verifying stdout responses.

use std::io::{BufRead, Write};
use std::process::{Command, Stdio};

/// Sends a sequence of commands to the engine and collects stdout lines.
fn run_engine(commands: &[&str]) -> Vec<String> {
    let exe = env!("CARGO_BIN_EXE_congaline");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to start congaline");

    let mut stdin = child.stdin.take().unwrap();
    let stdout = child.stdout.take().unwrap();
    let reader = std::io::BufReader::new(stdout);

    for cmd in commands {
        writeln!(stdin, "{}", cmd).unwrap();
    }
    stdin.flush().unwrap();
    drop(stdin);

    let lines: Vec<String> = reader.lines().map(|l| l.unwrap()).collect();
    let status = child.wait().expect("failed to wait on child");
    assert!(status.success());
    lines
}

/// Two characters facing right in front of an open portal.
const PAIR_LEVEL: &str = r#"level {"actions": 3, "cells": [[2, 2, 3]], "facings": [{"row": 0, "col": 0, "facing": "right"}, {"row": 0, "col": 1, "facing": "right"}]}"#;

/// One character on a 2x3 board with a portal to its right.
const SINGLE_LEVEL: &str = r#"level {"actions": 1, "cells": [[2, 3, 1], [1, 1, 1]], "facings": [{"row": 0, "col": 0, "facing": "right"}]}"#;

fn events<'a>(lines: &'a [String], name: &str) -> Vec<&'a String> {
    let tag = format!(r#""event":"{}""#, name);
    lines
        .iter()
        .filter(|l| l.starts_with("event ") && l.contains(&tag))
        .collect()
}

#[test]
fn hello_handshake_with_protocol_version() {
    let lines = run_engine(&["hello", "quit"]);

    assert!(lines.iter().any(|l| l == "id name congaline"));
    assert!(lines.iter().any(|l| l == "id author polite-betrayal"));
    assert!(lines.iter().any(|l| l == "protocol_version 1"));
    assert!(lines.iter().any(|l| l == "hellook"));

    // hellook must be the last line of the handshake
    let ok_idx = lines.iter().position(|l| l == "hellook").unwrap();
    let proto_idx = lines.iter().position(|l| l == "protocol_version 1").unwrap();
    assert!(proto_idx < ok_idx, "protocol_version must appear before hellook");
}

#[test]
fn hello_handshake_includes_options() {
    let lines = run_engine(&["hello", "quit"]);

    let option_lines: Vec<&String> = lines.iter().filter(|l| l.starts_with("option ")).collect();
    assert_eq!(option_lines.len(), 6);
    for opt in &option_lines {
        assert!(opt.contains("type "), "option line missing type: {}", opt);
    }
    assert!(option_lines.iter().any(|l| l.contains("name StepInterval")));
}

#[test]
fn isready_response() {
    let lines = run_engine(&["isready", "quit"]);
    assert!(lines.contains(&"readyok".to_string()));
}

#[test]
fn unknown_commands_are_ignored() {
    let lines = run_engine(&["foobar", "nonsense", "move 1", "quit"]);
    assert!(lines.is_empty());
}

#[test]
fn empty_lines_are_ignored() {
    let lines = run_engine(&["", "  ", "isready", "quit"]);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0], "readyok");
}

#[test]
fn setoption_then_isready() {
    let lines = run_engine(&[
        "hello",
        "setoption name StepInterval value 100",
        "setoption name Seed value 4",
        "isready",
        "quit",
    ]);
    assert!(lines.last() == Some(&"readyok".to_string()));
}

#[test]
fn conga_run_saves_both_characters() {
    let lines = run_engine(&[PAIR_LEVEL, "conga", "tick 5000", "state", "quit"]);

    assert!(lines[0].starts_with("levelok 1 3 3"), "{:?}", lines);
    assert_eq!(events(&lines, "character_saved").len(), 2);
    assert_eq!(events(&lines, "object_congaed").len(), 3);
    let state = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(
        state.starts_with("status level_over_screen score 210 actions 3 "),
        "{}",
        state
    );
    assert!(lines.last().unwrap().starts_with("grid . . O"));
}

#[test]
fn step_interval_option_controls_timing() {
    let lines = run_engine(&[
        "setoption name StepInterval value 100",
        PAIR_LEVEL,
        "conga",
        "tick 150",
        "state",
        "quit",
    ]);
    // The second step ran at 100ms and saved the second character.
    assert_eq!(events(&lines, "character_saved").len(), 2);
    let state = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(state.contains("time 150"), "{}", state);
}

#[test]
fn move_spends_budget_and_refuses_when_exhausted() {
    let lines = run_engine(&[SINGLE_LEVEL, "move 0 1 0", "move 0 1 1", "state", "quit"]);

    assert_eq!(events(&lines, "object_moved").len(), 1);
    assert!(lines
        .iter()
        .any(|l| l == "refused insufficient budget: actions exhausted"));
    let grid = lines.last().unwrap();
    assert_eq!(grid, "grid . O . / > . .");
}

#[test]
fn drop_snaps_to_neighbour() {
    let lines = run_engine(&[SINGLE_LEVEL, "drop 0 30 100", "state", "quit"]);
    assert_eq!(events(&lines, "object_moved").len(), 1);
    assert_eq!(lines.last().unwrap(), "grid . O . / > . .");
}

#[test]
fn reset_during_run_is_deferred() {
    let lines = run_engine(&[PAIR_LEVEL, "conga", "reset", "tick 5000", "state", "quit"]);

    assert!(lines.iter().any(|l| l == "deferred reset"));
    let state = lines.iter().find(|l| l.starts_with("status ")).unwrap();
    assert!(state.starts_with("status active score 0 "), "{}", state);
    assert_eq!(lines.last().unwrap(), "grid > > O");
}

#[test]
fn end_leaves_level() {
    let lines = run_engine(&[SINGLE_LEVEL, "end", "conga", "quit"]);
    assert!(lines
        .iter()
        .any(|l| l.contains(r#""to":"inactive""#)));
    assert!(lines
        .last()
        .unwrap()
        .starts_with("refused cannot start a conga while the level is inactive"));
}

#[test]
fn malformed_level_reports_error() {
    let lines = run_engine(&[r#"level {"actions": 1, "cells": [[2, 8]]}"#, "quit"]);
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("error "), "{}", lines[0]);
}
