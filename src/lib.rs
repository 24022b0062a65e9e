//! Tsumego-RS: turns one-line Go problem records into board diagrams.
//!
//! - `parser` extracts black/white stone runs and the caption from a record line
//! - `store` loads a whole problem file, skipping (and logging) malformed lines
//! - `render` draws a 19x19 board with stones and caption and saves it as PNG
//!
//! Bot wiring, scheduling and delivery of the images live outside this crate.

pub mod config;
pub mod daily;
pub mod parser;
pub mod puzzle;
pub mod render;
pub mod store;

pub use config::{Config, ConfigError};
pub use daily::{daily_index, daily_problem};
pub use parser::{ParseError, parse_line};
pub use puzzle::{BOARD_SIZE, Puzzle, Stone, decode_coordinate};
pub use render::{
    BoardRenderer, RenderError, RenderOptions, output_file_name, render_problem, sanitize_filename,
};
pub use store::{LoadError, ProblemStore, load_problems};
