//! Error types for the maze core

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Problems found while parsing a maze layout.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MazeError {
    /// Layout contains no rows
    #[error("maze layout is empty")]
    Empty,

    /// Row length differs from the first row
    #[error("row {row} has {found} columns, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// Character is not one of `#`, `.`, `o`, `P`, `G`
    #[error("unknown tile {ch:?} at row {row}, col {col}")]
    UnknownTile { row: usize, col: usize, ch: char },

    /// Open cell on the top or bottom border
    #[error("open cell on the outer border at row {row}, col {col}")]
    OpenBorder { row: usize, col: usize },

    /// Side-border opening with no matching opening on the other side
    #[error("row {row} opens on one side border only")]
    BrokenTunnel { row: usize },

    /// Spawn marker absent
    #[error("layout has no {0} spawn marker")]
    MissingSpawn(&'static str),

    /// Spawn marker given more than once
    #[error("layout has more than one {0} spawn marker")]
    DuplicateSpawn(&'static str),
}

/// Crate error type
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid maze layout
    #[error("Maze error: {0}")]
    Maze(#[from] MazeError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
