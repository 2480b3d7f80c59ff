//! The index of available puzzles, which is generated offline from a directory of puzzle
//! files, and the helpers the puzzle list needs to show it.

use crate::{Error, GRID_SIZE, Grid, PuzzleData};
use chrono::{Days, NaiveDate};
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::LazyLock;

/// Puzzle files are named `puzzle_<original date>_<publication date>.json`, both as YYMMDD.
///
/// The whole name has to match. Names with anything before `puzzle_`, like
/// `x_puzzle_000001_240101.json`, are not puzzles, even though an unanchored search for
/// the pattern would find one inside them.
static PUZZLE_FILE: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r"^puzzle_(\d{6})_(\d{6})\.json$").expect("puzzle file pattern is valid")
});

/// How many days of puzzles, counting today, are offered to play.
const WINDOW_DAYS: u64 = 10;

/// One entry of the puzzle index.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleMeta {
  /// `<original date>_<publication date>`, used as the key for saved progress.
  pub id: String,
  /// The publication date, as YYMMDD.
  pub date: String,
  /// The file name of the puzzle, relative to the puzzle directory.
  pub file: String,
  /// The number of squares that are part of a word.
  pub total_cells: usize,
}

/// Builds the index entry for a puzzle file. Returns `None` if the file name doesn't
/// look like a puzzle.
pub fn meta_for_file(path: &Path) -> Result<Option<PuzzleMeta>, Error> {
  let Some(file) = path.file_name().and_then(|name| name.to_str()) else {
    return Ok(None);
  };
  let Some(captures) = PUZZLE_FILE.captures(file) else {
    debug!("Skipping {file}: not a puzzle file name");
    return Ok(None);
  };
  let (code, date) = (&captures[1], &captures[2]);

  let json = std::fs::read_to_string(path).map_err(Error::io(path))?;
  let value: serde_json::Value = serde_json::from_str(&json).map_err(Error::json(file))?;

  Ok(Some(PuzzleMeta {
    id: format!("{code}_{date}"),
    date: date.to_string(),
    file: file.to_string(),
    total_cells: total_cells(&value, file)?,
  }))
}

/// Counts the squares of a puzzle. Puzzles exported with a `grid` matrix are counted from
/// that; otherwise the grid is built from the word lists.
fn total_cells(value: &serde_json::Value, file: &str) -> Result<usize, Error> {
  if let Some(rows) = value.get("grid").and_then(|grid| grid.as_array()) {
    return Ok(
      rows
        .iter()
        .filter_map(|row| row.as_array())
        .flatten()
        .filter(|cell| is_truthy(cell))
        .count(),
    );
  }

  let data = PuzzleData::deserialize(value).map_err(Error::json(file))?;
  Ok(Grid::build(&data, GRID_SIZE)?.total_cells())
}

fn is_truthy(value: &serde_json::Value) -> bool {
  use serde_json::Value;
  match value {
    Value::Null => false,
    Value::Bool(b) => *b,
    Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
    Value::String(s) => !s.is_empty(),
    Value::Array(_) | Value::Object(_) => true,
  }
}

/// Builds the index for every puzzle file in `dir`, in file name order. Files whose names
/// don't match the puzzle naming scheme are left out.
pub fn generate(dir: &Path) -> Result<Vec<PuzzleMeta>, Error> {
  let mut paths = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(Error::io(dir))? {
    let path = entry.map_err(Error::io(dir))?.path();
    if path.extension().is_some_and(|ext| ext == "json") && path.is_file() {
      paths.push(path);
    }
  }
  paths.sort();

  let mut metas = Vec::with_capacity(paths.len());
  for path in paths {
    if let Some(meta) = meta_for_file(&path)? {
      metas.push(meta);
    }
  }
  info!("Indexed {} puzzles in {}", metas.len(), dir.display());
  Ok(metas)
}

/// Writes the index as pretty-printed JSON.
pub fn write_index(path: &Path, metas: &[PuzzleMeta]) -> Result<(), Error> {
  let json = serde_json::to_string_pretty(metas).map_err(Error::json(path.display()))?;
  std::fs::write(path, json).map_err(Error::io(path))
}

/// Reads an index written by [write_index].
pub fn load_index(path: &Path) -> Result<Vec<PuzzleMeta>, Error> {
  let json = std::fs::read_to_string(path).map_err(Error::io(path))?;
  serde_json::from_str(&json).map_err(Error::json(path.display()))
}

/// Reads the puzzle an index entry points to.
pub fn load_puzzle(dir: &Path, meta: &PuzzleMeta) -> Result<PuzzleData, Error> {
  PuzzleData::load(&dir.join(&meta.file))
}

/// Formats a date as YYMMDD.
pub fn format_date(date: NaiveDate) -> String {
  date.format("%y%m%d").to_string()
}

/// Parses a YYMMDD date. Years are taken to be in the 2000s.
pub fn parse_date(yymmdd: &str) -> Option<NaiveDate> {
  if yymmdd.len() != 6 || !yymmdd.bytes().all(|b| b.is_ascii_digit()) {
    return None;
  }
  let year = 2000 + yymmdd[0..2].parse::<i32>().ok()?;
  let month = yymmdd[2..4].parse().ok()?;
  let day = yymmdd[4..6].parse().ok()?;
  NaiveDate::from_ymd_opt(year, month, day)
}

/// A YYMMDD date the way the puzzle list shows it, e.g. `Monday, 01/01/2024`.
pub fn format_display_date(yymmdd: &str) -> Option<String> {
  parse_date(yymmdd).map(|date| date.format("%A, %d/%m/%Y").to_string())
}

/// The original and publication dates encoded in a puzzle file name.
pub fn file_dates(file: &str) -> Option<(String, String)> {
  let captures = PUZZLE_FILE.captures(file)?;
  Some((captures[1].to_string(), captures[2].to_string()))
}

/// The puzzles published in the ten days up to and including `today`, newest first.
pub fn recent(metas: &[PuzzleMeta], today: NaiveDate) -> Vec<PuzzleMeta> {
  let start = today
    .checked_sub_days(Days::new(WINDOW_DAYS - 1))
    .unwrap_or(NaiveDate::MIN);
  let (start, end) = (format_date(start), format_date(today));

  let mut recent: Vec<PuzzleMeta> = metas
    .iter()
    .filter(|meta| meta.date >= start && meta.date <= end)
    .cloned()
    .collect();
  recent.sort_by(|a, b| b.date.cmp(&a.date));
  recent
}
