//! Saved progress: one JSON blob per puzzle, kept in a simple key-value store.

use crate::Error;
use crate::progress::{GridValues, HelpedCells};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A place to keep strings by key, like a browser's local storage.
pub trait ProgressStore {
  /// Returns the value stored under `key`, or `None` if nothing was ever stored there.
  fn get(&self, key: &str) -> Result<Option<String>, Error>;

  /// Stores `value` under `key`, replacing whatever was there.
  fn set(&mut self, key: &str, value: &str) -> Result<(), Error>;
}

/// Keeps each key in its own `<key>.json` file inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
  dir: PathBuf,
}

impl FileStore {
  /// A store rooted at `dir`. The directory is created on the first write.
  pub fn new(dir: impl Into<PathBuf>) -> Self {
    Self { dir: dir.into() }
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  fn path(&self, key: &str) -> PathBuf {
    self.dir.join(format!("{key}.json"))
  }
}

impl ProgressStore for FileStore {
  fn get(&self, key: &str) -> Result<Option<String>, Error> {
    let path = self.path(key);
    match std::fs::read_to_string(&path) {
      Ok(contents) => Ok(Some(contents)),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
      Err(e) => Err(Error::Io { path, source: e }),
    }
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
    std::fs::create_dir_all(&self.dir).map_err(Error::io(&self.dir))?;
    let path = self.path(key);
    std::fs::write(&path, value).map_err(Error::io(path))
  }
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  entries: HashMap<String, String>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

impl ProgressStore for MemoryStore {
  fn get(&self, key: &str) -> Result<Option<String>, Error> {
    Ok(self.entries.get(key).cloned())
  }

  fn set(&mut self, key: &str, value: &str) -> Result<(), Error> {
    self.entries.insert(key.to_string(), value.to_string());
    Ok(())
  }
}

/// Where progress is kept when no directory is given: the platform data directory.
pub fn default_data_dir() -> Result<PathBuf, Error> {
  dirs::data_dir()
    .map(|dir| dir.join("cruzadola"))
    .ok_or(Error::NoDataDir)
}

/// Everything remembered about a puzzle between sessions.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
  /// Older saves called this `grid`.
  #[serde(alias = "grid")]
  pub grid_values: GridValues,
  #[serde(default)]
  pub helped_cells: Option<HelpedCells>,
  /// Seconds spent on the puzzle so far.
  #[serde(default)]
  pub time: u64,
  #[serde(default)]
  pub completion_percentage: u8,
  #[serde(default)]
  pub no_help_percentage: u8,
}

/// The key progress for a puzzle is stored under.
pub fn progress_key(puzzle_id: &str) -> String {
  format!("crossword_{puzzle_id}")
}

/// Reads the saved progress for a puzzle.
///
/// Anything that can't be used (a missing entry, unreadable storage, broken JSON, or a
/// grid of the wrong size) is treated as no progress at all.
pub fn load_progress(
  store: &impl ProgressStore,
  puzzle_id: &str,
  size: usize,
) -> Option<PersistedState> {
  let key = progress_key(puzzle_id);
  let raw = match store.get(&key) {
    Ok(Some(raw)) => raw,
    Ok(None) => return None,
    Err(e) => {
      warn!("Could not read progress for {puzzle_id}: {e}");
      return None;
    }
  };

  let mut state: PersistedState = match serde_json::from_str(&raw) {
    Ok(state) => state,
    Err(e) => {
      warn!("Discarding unreadable progress for {puzzle_id}: {e}");
      return None;
    }
  };

  if !state.grid_values.has_size(size) {
    warn!("Discarding progress for {puzzle_id}: grid is not {size}x{size}");
    return None;
  }
  if state.helped_cells.as_ref().is_some_and(|h| !h.has_size(size)) {
    debug!("Ignoring helped cells for {puzzle_id}: wrong size");
    state.helped_cells = None;
  }
  Some(state)
}

/// Writes the progress for a puzzle, replacing any earlier save.
pub fn save_progress(
  store: &mut impl ProgressStore,
  puzzle_id: &str,
  state: &PersistedState,
) -> Result<(), Error> {
  let json = serde_json::to_string(state).map_err(Error::json(progress_key(puzzle_id)))?;
  store.set(&progress_key(puzzle_id), &json)
}

/// The completion percentage saved for a puzzle, or 0 if there is none.
pub fn saved_completion(store: &impl ProgressStore, puzzle_id: &str) -> u8 {
  #[derive(Deserialize)]
  #[serde(rename_all = "camelCase")]
  struct Completion {
    #[serde(default)]
    completion_percentage: u8,
  }

  store
    .get(&progress_key(puzzle_id))
    .ok()
    .flatten()
    .and_then(|raw| serde_json::from_str::<Completion>(&raw).ok())
    .map_or(0, |c| c.completion_percentage)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn state(size: usize) -> PersistedState {
    let mut grid_values = GridValues::new(size);
    grid_values.set((0, 0), Some('A'));
    PersistedState {
      grid_values,
      helped_cells: Some(HelpedCells::new(size)),
      time: 75,
      completion_percentage: 12,
      no_help_percentage: 12,
    }
  }

  #[test]
  fn saves_and_loads() {
    let mut store = MemoryStore::new();
    save_progress(&mut store, "000001_240101", &state(3)).unwrap();

    let raw = store.get("crossword_000001_240101").unwrap().unwrap();
    assert!(raw.contains(r#""gridValues":[["A","",""]"#), "{raw}");
    assert!(raw.contains(r#""completionPercentage":12"#), "{raw}");

    assert_eq!(load_progress(&store, "000001_240101", 3), Some(state(3)));
    assert_eq!(saved_completion(&store, "000001_240101"), 12);
  }

  #[test]
  fn missing_progress_is_none() {
    let store = MemoryStore::new();
    assert_eq!(load_progress(&store, "nope", 3), None);
    assert_eq!(saved_completion(&store, "nope"), 0);
  }

  #[test]
  fn corrupt_progress_is_none() {
    let mut store = MemoryStore::new();
    store.set("crossword_x", "{not json").unwrap();
    assert_eq!(load_progress(&store, "x", 3), None);
    assert_eq!(saved_completion(&store, "x"), 0);
  }

  #[test]
  fn wrong_size_is_none() {
    let mut store = MemoryStore::new();
    save_progress(&mut store, "x", &state(2)).unwrap();
    assert_eq!(load_progress(&store, "x", 3), None);
  }

  #[test]
  fn accepts_legacy_grid_key() {
    let mut store = MemoryStore::new();
    store
      .set("crossword_old", r#"{"grid": [["B", ""], ["", ""]], "time": 9}"#)
      .unwrap();

    let state = load_progress(&store, "old", 2).unwrap();
    assert_eq!(state.grid_values.get((0, 0)), Some('B'));
    assert_eq!(state.helped_cells, None);
    assert_eq!(state.time, 9);
    assert_eq!(saved_completion(&store, "old"), 0);
  }

  #[test]
  fn file_store_round_trip() {
    let dir = TempDir::new().unwrap();
    let mut store = FileStore::new(dir.path().join("progress"));
    assert_eq!(store.get("crossword_a").unwrap(), None);

    store.set("crossword_a", "{}").unwrap();
    assert_eq!(store.get("crossword_a").unwrap().as_deref(), Some("{}"));
    assert!(dir.path().join("progress/crossword_a.json").exists());
  }
}
