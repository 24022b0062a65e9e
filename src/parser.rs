//! Record parser module.
//! Turns one line of setup-record text into a `Puzzle`.
//! Three independent extractions run against the same line:
//! - `AB` followed by a contiguous run of `[xy]` groups -> black stones
//! - `AW` followed by a contiguous run of `[xy]` groups -> white stones
//! - the first `C[...]` span -> title, taken verbatim up to the first `]`
//!
//! A run stops at the first token that is not a coordinate group, so brackets appearing
//! later in the line are never swept into it. Marker order within the line is irrelevant.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::puzzle::Puzzle;

lazy_static! {
    static ref BLACK_RUN_REGEX: Regex = Regex::new(r"AB((?:\[[a-s]{2}\])+)").expect("bad regex");
    static ref WHITE_RUN_REGEX: Regex = Regex::new(r"AW((?:\[[a-s]{2}\])+)").expect("bad regex");
    static ref COORD_REGEX: Regex = Regex::new(r"\[([a-s]{2})\]").expect("bad regex");
    static ref CAPTION_REGEX: Regex = Regex::new(r"C\[(.*?)\]").expect("bad regex");
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("no recognizable fields in line")]
    NoFields,
}

/// Parses a single record line.
///
/// Fails only when the line yields no black stones, no white stones and no caption.
/// Anything missing otherwise defaults to empty.
pub fn parse_line(line: &str) -> Result<Puzzle, ParseError> {
    let black = extract_run(&BLACK_RUN_REGEX, line);
    let white = extract_run(&WHITE_RUN_REGEX, line);
    let caption = extract_caption(line);

    if black.is_empty() && white.is_empty() && caption.is_empty() {
        return Err(ParseError::NoFields);
    }

    Ok(Puzzle::new(caption, black, white))
}

/// Coordinates of the first marker run matched by `run_regex`, in order. Empty when absent.
fn extract_run(run_regex: &Regex, line: &str) -> Vec<String> {
    let Some(run) = run_regex.captures(line).and_then(|caps| caps.get(1)) else {
        return Vec::new();
    };
    COORD_REGEX
        .captures_iter(run.as_str())
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Content of the first caption span, or an empty string. `C[]` yields nothing.
fn extract_caption(line: &str) -> String {
    CAPTION_REGEX
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
