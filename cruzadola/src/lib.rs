//! This crate is meant to be used as the foundation for a daily crossword app.
//! It provides no UI itself, but see `cruzadola-tui` for an example of how you can use it
//! to produce a crossword app.
//!
//! Puzzles are JSON files listing their across and down words, each with a clue, an answer
//! and the grid position of its first letter. A [Grid] is derived from those word lists, and
//! a [Session] tracks everything that happens while a user solves it: the letters typed so
//! far, which squares were revealed, the cursor, the timer and the saved progress.

use Direction::{Across, Down};
use std::fmt::Display;
use std::ops::Not;
use std::path::PathBuf;

mod grid;
pub mod meta;
pub mod progress;
mod puzzle;
mod session;
pub mod store;

pub use grid::{Cell, GRID_SIZE, Grid, GridPosIter};
pub use meta::PuzzleMeta;
pub use puzzle::{PuzzleData, WordBounds, WordEntry, WordInfo};
pub use session::{Arrow, Event, Key, Session, SquareStyle, Timer, Verdict};
pub use store::{FileStore, MemoryStore, PersistedState, ProgressStore};

/// The two crossword directions: `Across` and `Down`
#[derive(Debug, Eq, PartialEq, Hash, Copy, Clone)]
pub enum Direction {
  Across,
  Down,
}

impl Not for Direction {
  type Output = Self;
  fn not(self) -> Self {
    match self {
      Across => Down,
      Down => Across,
    }
  }
}

impl Display for Direction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Across => write!(f, "Across"),
      Down => write!(f, "Down"),
    }
  }
}

/// A position in a grid: (row, column)
pub type Pos = (usize, usize);

/// The errors that may be produced by functions in this crate.
#[derive(thiserror::Error, Debug)]
pub enum Error {
  /// An [I/O error](std::io::Error) occurred while touching the given path.
  #[error("I/O error on {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  /// Some JSON could not be read or written.
  #[error("invalid JSON in {context}: {source}")]
  Json {
    context: String,
    #[source]
    source: serde_json::Error,
  },
  /// Something went wrong while interpreting a puzzle file.
  #[error("parse error: {0}")]
  ParseError(String),
  /// A word runs off the edge of the grid.
  #[error("{number} {direction} does not fit in the grid")]
  OutOfBounds { number: u32, direction: Direction },
  /// Neither an explicit data directory nor a platform default was available.
  #[error("could not determine a directory for saved progress")]
  NoDataDir,
}

impl Error {
  pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
    let path = path.into();
    move |source| Self::Io { path, source }
  }

  pub(crate) fn json(context: impl Display) -> impl FnOnce(serde_json::Error) -> Self {
    let context = context.to_string();
    move |source| Self::Json { context, source }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn direction_not() {
    assert_eq!(!Across, Down);
    assert_eq!(!Down, Across);
    assert_eq!(!!Across, Across);
  }

  #[test]
  fn error_messages() {
    let e = Error::OutOfBounds {
      number: 7,
      direction: Down,
    };
    assert_eq!(e.to_string(), "7 Down does not fit in the grid");
    assert_eq!(
      Error::ParseError("bad key".into()).to_string(),
      "parse error: bad key"
    );
  }
}
