//! Puzzle module.
//! Holds the parsed shape of one setup record: a title plus black and white stone placements.
//! Coordinates are kept as the raw two-letter codes found in the record; they are only
//! decoded (and validated) when a board is drawn.

/// Number of lines per axis on the board.
pub const BOARD_SIZE: usize = 19;

/// One stone-placement problem, immutable once parsed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Puzzle {
    /// Caption text, possibly empty. Also the base of the rendered file name.
    pub title: String,
    /// Black stone coordinates in record order (duplicates kept).
    pub black: Vec<String>,
    /// White stone coordinates in record order (duplicates kept).
    pub white: Vec<String>,
}

impl Puzzle {
    pub fn new(title: impl Into<String>, black: Vec<String>, white: Vec<String>) -> Self {
        Self {
            title: title.into(),
            black,
            white,
        }
    }

    /// Total number of stones on the board.
    pub fn stone_count(&self) -> usize {
        self.black.len() + self.white.len()
    }
}

/// Stone colour, used to pick the fill when drawing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stone {
    Black,
    White,
}

impl std::fmt::Display for Stone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stone::Black => write!(f, "black"),
            Stone::White => write!(f, "white"),
        }
    }
}

/// Decodes a two-letter coordinate ("cd") into 0-based (column, row) indices.
/// Returns `None` unless the code is exactly two characters, each in `a..=s`.
pub fn decode_coordinate(coord: &str) -> Option<(usize, usize)> {
    let bytes = coord.as_bytes();
    if bytes.len() != 2 {
        return None;
    }
    let axis = |b: u8| -> Option<usize> {
        let index = b.checked_sub(b'a')? as usize;
        (index < BOARD_SIZE).then_some(index)
    };
    Some((axis(bytes[0])?, axis(bytes[1])?))
}
