//! Congaline engine library.
//!
//! Exposes the grid model, movement rules, conga and hazard resolution,
//! level sessions, and protocol modules for use by integration tests and
//! the binary entry points.

pub mod engine;
pub mod error;
pub mod grid;
pub mod levelgen;
pub mod movement;
pub mod playout;
pub mod protocol;
pub mod resolve;
pub mod session;
