//! The letters a user has entered, which of them came from a hint, and how far along
//! the puzzle they are.

use crate::{Grid, Pos};
use serde::{Deserialize, Serialize};

/// The letters entered so far, one optional letter per square.
///
/// Serialized as a matrix of strings, where an empty string is an empty square.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(from = "Vec<Vec<String>>", into = "Vec<Vec<String>>")]
pub struct GridValues(Vec<Vec<Option<char>>>);

impl GridValues {
  /// An empty `size`×`size` grid.
  pub fn new(size: usize) -> Self {
    Self(vec![vec![None; size]; size])
  }

  /// The solution letters of every square of the grid.
  pub fn solved(grid: &Grid) -> Self {
    let size = grid.size();
    let mut values = Self::new(size);
    for pos in grid.white_positions() {
      values.set(pos, grid.letter(pos));
    }
    values
  }

  /// Whether this is a `size`×`size` matrix.
  pub fn has_size(&self, size: usize) -> bool {
    self.0.len() == size && self.0.iter().all(|row| row.len() == size)
  }

  pub fn get(&self, (r, c): Pos) -> Option<char> {
    self.0.get(r).and_then(|row| row.get(c)).copied().flatten()
  }

  pub fn set(&mut self, (r, c): Pos, value: Option<char>) {
    self.0[r][c] = value;
  }

  /// Empties every square.
  pub fn clear(&mut self) {
    self.0.iter_mut().flatten().for_each(|value| *value = None);
  }
}

impl From<Vec<Vec<String>>> for GridValues {
  fn from(rows: Vec<Vec<String>>) -> Self {
    Self(
      rows
        .into_iter()
        .map(|row| {
          row
            .into_iter()
            .map(|s| {
              s.chars()
                .next()
                .filter(char::is_ascii_alphabetic)
                .map(|c| c.to_ascii_uppercase())
            })
            .collect()
        })
        .collect(),
    )
  }
}

impl From<GridValues> for Vec<Vec<String>> {
  fn from(values: GridValues) -> Self {
    values
      .0
      .into_iter()
      .map(|row| {
        row
          .into_iter()
          .map(|value| value.map(String::from).unwrap_or_default())
          .collect()
      })
      .collect()
  }
}

/// Marks the squares that were filled in by revealing a letter, a word or the whole
/// puzzle. Those squares don't count towards the "no help" score.
#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct HelpedCells(Vec<Vec<bool>>);

impl HelpedCells {
  pub fn new(size: usize) -> Self {
    Self(vec![vec![false; size]; size])
  }

  /// Whether this is a `size`×`size` matrix.
  pub fn has_size(&self, size: usize) -> bool {
    self.0.len() == size && self.0.iter().all(|row| row.len() == size)
  }

  pub fn get(&self, (r, c): Pos) -> bool {
    self
      .0
      .get(r)
      .and_then(|row| row.get(c))
      .copied()
      .unwrap_or(false)
  }

  pub fn set(&mut self, (r, c): Pos) {
    self.0[r][c] = true;
  }
}

/// How many squares were solved without any help.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct NoHelpStats {
  /// Squares holding the right letter that were not revealed.
  pub filled_without_help: usize,
  /// Squares that are part of a word.
  pub total_cells: usize,
}

impl NoHelpStats {
  /// The share of the grid solved without help, rounded down. 0 for an empty grid.
  pub fn percentage(&self) -> u8 {
    percentage(self.filled_without_help, self.total_cells)
  }
}

fn percentage(part: usize, total: usize) -> u8 {
  if total == 0 {
    return 0;
  }
  (part * 100 / total) as u8
}

pub fn no_help_stats(grid: &Grid, values: &GridValues, helped: &HelpedCells) -> NoHelpStats {
  let mut stats = NoHelpStats {
    filled_without_help: 0,
    total_cells: 0,
  };
  for pos in grid.white_positions() {
    stats.total_cells += 1;
    if values.get(pos).is_some() && values.get(pos) == grid.letter(pos) && !helped.get(pos) {
      stats.filled_without_help += 1;
    }
  }
  stats
}

/// The share of squares holding the right letter, helped or not, rounded down.
pub fn completion_percentage(grid: &Grid, values: &GridValues) -> u8 {
  let correct = grid
    .white_positions()
    .filter(|&pos| values.get(pos) == grid.letter(pos))
    .count();
  percentage(correct, grid.total_cells())
}

/// Whether every square that is part of a word has something in it.
pub fn is_filled(grid: &Grid, values: &GridValues) -> bool {
  grid.white_positions().all(|pos| values.get(pos).is_some())
}

/// The first square, in reading order, whose letter doesn't match the solution.
pub fn first_mismatch(grid: &Grid, values: &GridValues) -> Option<Pos> {
  grid
    .white_positions()
    .find(|&pos| values.get(pos) != grid.letter(pos))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::puzzle::tests::small_puzzle;

  fn grid() -> Grid {
    Grid::build(&small_puzzle(), 4).unwrap()
  }

  #[test]
  fn completion_reaches_100_only_when_solved() {
    let grid = grid();
    let solved = GridValues::solved(&grid);
    assert_eq!(completion_percentage(&grid, &solved), 100);
    assert_eq!(first_mismatch(&grid, &solved), None);

    let mut values = solved.clone();
    values.set((2, 3), Some('S'));
    assert_eq!(completion_percentage(&grid, &values), 88);
    assert_eq!(first_mismatch(&grid, &values), Some((2, 3)));
  }

  #[test]
  fn completion_never_decreases_while_filling() {
    let grid = grid();
    let mut values = GridValues::new(4);
    let mut last = completion_percentage(&grid, &values);
    assert_eq!(last, 0);

    for pos in grid.white_positions() {
      values.set(pos, grid.letter(pos));
      let now = completion_percentage(&grid, &values);
      assert!(now >= last);
      last = now;
    }
    assert_eq!(last, 100);
  }

  #[test]
  fn helped_cells_do_not_count_as_unaided() {
    let grid = grid();
    let values = GridValues::solved(&grid);
    let mut helped = HelpedCells::new(4);
    helped.set((0, 0));
    helped.set((0, 1));
    helped.set((0, 2));

    let stats = no_help_stats(&grid, &values, &helped);
    assert_eq!(
      stats,
      NoHelpStats {
        filled_without_help: 6,
        total_cells: 9
      }
    );
    assert_eq!(stats.percentage(), 66);
    assert_eq!(completion_percentage(&grid, &values), 100);
  }

  #[test]
  fn empty_grid_scores_zero() {
    let grid = Grid::build(&Default::default(), 3).unwrap();
    let values = GridValues::new(3);
    assert_eq!(completion_percentage(&grid, &values), 0);
    assert_eq!(no_help_stats(&grid, &values, &HelpedCells::new(3)).percentage(), 0);
    assert!(is_filled(&grid, &values));
  }

  #[test]
  fn values_serialize_as_strings() {
    let mut values = GridValues::new(2);
    values.set((0, 1), Some('Q'));
    let json = serde_json::to_string(&values).unwrap();
    assert_eq!(json, r#"[["","Q"],["",""]]"#);

    let parsed: GridValues = serde_json::from_str(r#"[["a",""],["","Z"]]"#).unwrap();
    assert_eq!(parsed.get((0, 0)), Some('A'));
    assert_eq!(parsed.get((0, 1)), None);
    assert_eq!(parsed.get((1, 1)), Some('Z'));
    assert!(parsed.has_size(2));
    assert!(!parsed.has_size(3));
  }
}
