//! Text protocol handling.
//!
//! Level layouts (JSON), the compact grid sketch notation, and the command
//! parser for the main loop.

pub mod layout;
pub mod parser;
pub mod sketch;

pub use layout::{parse_layout, CellCode, LayoutError, LevelLayout};
pub use parser::{parse_command, Command};
pub use sketch::{encode_sketch, parse_sketch, SketchError};
