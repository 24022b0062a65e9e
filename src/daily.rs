//! Daily selection module.
//! Picks a "problem of the day" deterministically from the UTC day number,
//! so every caller asking on the same day gets the same puzzle.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::puzzle::Puzzle;

const SECONDS_PER_DAY: u64 = 86_400;

/// Index of the day's problem among `count` problems, `None` when there are none.
pub fn daily_index(count: usize, unix_secs: u64) -> Option<usize> {
    if count == 0 {
        return None;
    }
    let day = unix_secs / SECONDS_PER_DAY;
    Some((day % count as u64) as usize)
}

/// The day's problem for `now`. Clocks set before the epoch count as day 0.
pub fn daily_problem(problems: &[Puzzle], now: SystemTime) -> Option<&Puzzle> {
    let secs = now
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    daily_index(problems.len(), secs).map(|i| &problems[i])
}
