//! Problem store module.
//! Loads a problem file line by line, one record per line, through `parser::parse_line`.
//! Malformed lines are logged and skipped; they never abort a load.
//! Only failing to open the file, or an I/O fault mid-read, is an error.

use log::{debug, info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::parser::parse_line;
use crate::puzzle::Puzzle;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open problem file {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read line {line} of {}: {source}", path.display())]
    Read {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },
}

/// Ordered collection of puzzles loaded from one or more files.
#[derive(Clone, Debug, Default)]
pub struct ProblemStore {
    problems: Vec<Puzzle>,
}

impl ProblemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every parseable record of `path` in file order and returns how many were added.
    ///
    /// On a read error the records parsed before the fault stay in the store.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<usize, LoadError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| LoadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_reader(BufReader::new(file), path)
    }

    /// Same as `load`, reading from any buffered source. `origin` only labels errors and logs.
    pub fn load_from_reader<R: BufRead>(
        &mut self,
        mut reader: R,
        origin: &Path,
    ) -> Result<usize, LoadError> {
        let before = self.problems.len();
        let mut skipped = 0usize;
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = reader
                .read_until(b'\n', &mut buf)
                .map_err(|source| LoadError::Read {
                    path: origin.to_path_buf(),
                    line: line_no + 1,
                    source,
                })?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let line = String::from_utf8_lossy(trim_line_ending(&buf));
            match parse_line(&line) {
                Ok(puzzle) => {
                    debug!("{}:{}: parsed {:?}", origin.display(), line_no, puzzle.title);
                    self.problems.push(puzzle);
                }
                Err(e) => {
                    warn!("skipping line {} of {}: {:?}: {}", line_no, origin.display(), line, e);
                    skipped += 1;
                }
            }
        }

        let added = self.problems.len() - before;
        info!(
            "Loaded {} problems from {} ({} lines skipped)",
            added,
            origin.display(),
            skipped
        );
        Ok(added)
    }

    pub fn problems(&self) -> &[Puzzle] {
        &self.problems
    }

    pub fn get(&self, index: usize) -> Option<&Puzzle> {
        self.problems.get(index)
    }

    pub fn len(&self) -> usize {
        self.problems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.problems.is_empty()
    }

    /// Drops every loaded puzzle, e.g. before a reload.
    pub fn clear(&mut self) {
        self.problems.clear();
    }

    pub fn into_problems(self) -> Vec<Puzzle> {
        self.problems
    }
}

/// Loads all parseable puzzles from `path` into a fresh collection.
pub fn load_problems(path: impl AsRef<Path>) -> Result<Vec<Puzzle>, LoadError> {
    let mut store = ProblemStore::new();
    store.load(path)?;
    Ok(store.into_problems())
}

/// Strips a trailing `\n` or `\r\n`.
fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
