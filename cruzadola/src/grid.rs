use crate::Direction::{Across, Down};
use crate::session::Arrow;
use crate::{Error, Pos, PuzzleData};
use std::fmt::{Debug, Display};

/// The width and height of every puzzle grid.
pub const GRID_SIZE: usize = 11;

/// A square of the grid that belongs to at least one word.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Cell {
  /// The solution letter.
  pub letter: char,
  /// The clue number, for squares where a word starts.
  pub number: Option<u32>,
}

/// The solution grid of a puzzle: a square of optional [Cell]s, where `None` is a
/// black square that no word passes through.
#[derive(Clone, Eq, PartialEq)]
pub struct Grid {
  size: usize,
  cells: Vec<Vec<Option<Cell>>>,
}

impl Grid {
  /// Derives the grid from the word lists of a puzzle.
  ///
  /// Across words are written first. Down words are written second, so where the two
  /// disagree about a shared square the down letter is the one that ends up in the grid.
  /// A down word only numbers its first square if no across word already did.
  pub fn build(data: &PuzzleData, size: usize) -> Result<Self, Error> {
    let mut cells = vec![vec![None; size]; size];

    for direction in [Across, Down] {
      for entry in data.entries(direction) {
        if entry.is_empty() {
          continue;
        }
        let (along, across) = match direction {
          Across => (entry.col, entry.row),
          Down => (entry.row, entry.col),
        };
        if across >= size || along >= size || entry.len() > size - along {
          return Err(Error::OutOfBounds {
            number: entry.number,
            direction,
          });
        }
        let bounds = entry.bounds(direction);

        for (i, ((r, c), letter)) in bounds.positions().zip(entry.answer.chars()).enumerate() {
          let cell: &mut Option<Cell> = &mut cells[r][c];
          let number = if i == 0 { Some(entry.number) } else { None };
          match cell {
            Some(existing) => {
              existing.letter = letter;
              existing.number = existing.number.or(number);
            }
            None => *cell = Some(Cell { letter, number }),
          }
        }
      }
    }

    Ok(Self { size, cells })
  }

  /// The width (and height) of this grid.
  pub fn size(&self) -> usize {
    self.size
  }

  /// Returns the [Cell] at the given [Pos], or `None` for a black square.
  pub fn get(&self, (r, c): Pos) -> Option<&Cell> {
    self.cells.get(r)?.get(c)?.as_ref()
  }

  /// Whether the given position is a black square (or outside the grid).
  pub fn is_black(&self, pos: Pos) -> bool {
    self.get(pos).is_none()
  }

  /// The solution letter at the given position.
  pub fn letter(&self, pos: Pos) -> Option<char> {
    self.get(pos).map(|cell| cell.letter)
  }

  /// An iterator over all the positions of this grid, from left to right and top to bottom.
  pub fn positions(&self) -> GridPosIter {
    GridPosIter::new(self.size)
  }

  /// Positions of all the squares that are part of a word.
  pub fn white_positions(&self) -> impl Iterator<Item = Pos> + '_ {
    self.positions().filter(|&pos| !self.is_black(pos))
  }

  /// The number of squares that are part of a word.
  pub fn total_cells(&self) -> usize {
    self.white_positions().count()
  }

  /// The position one step away from `pos` in the direction of the arrow, treating the
  /// grid as one long sequence of squares.
  ///
  /// Left and right run through the grid row by row; stepping off the end of a row lands
  /// on the other end of the next (or previous) row. Up and down run through it column by
  /// column in the same way. Both wrap around from the last square to the first.
  pub(crate) fn step(&self, (row, col): Pos, arrow: Arrow) -> Pos {
    let last = self.size - 1;
    match arrow {
      Arrow::Right if col < last => (row, col + 1),
      Arrow::Right => (if row < last { row + 1 } else { 0 }, 0),
      Arrow::Left if col > 0 => (row, col - 1),
      Arrow::Left => (if row > 0 { row - 1 } else { last }, last),
      Arrow::Down if row < last => (row + 1, col),
      Arrow::Down => (0, if col < last { col + 1 } else { 0 }),
      Arrow::Up if row > 0 => (row - 1, col),
      Arrow::Up => (last, if col > 0 { col - 1 } else { last }),
    }
  }
}

/// Iterator over all the positions in the grid.
pub struct GridPosIter {
  pos: Pos,
  size: usize,
}

impl GridPosIter {
  fn new(size: usize) -> Self {
    Self { pos: (0, 0), size }
  }
}

impl Iterator for GridPosIter {
  type Item = Pos;
  fn next(&mut self) -> Option<Self::Item> {
    let (row, col) = self.pos;

    if row >= self.size {
      return None;
    }

    if col + 1 == self.size {
      self.pos = (row + 1, 0);
    } else {
      self.pos = (row, col + 1);
    }

    Some((row, col))
  }
}

impl Debug for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    for row in &self.cells {
      for cell in row {
        match cell {
          Some(cell) => write!(f, "{}", cell.letter)?,
          None => write!(f, "■")?,
        }
      }
      writeln!(f)?;
    }
    Ok(())
  }
}

impl Display for Grid {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "\n{:?}", self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::puzzle::tests::{entry, small_puzzle};

  #[test]
  fn build_small_grid() {
    let grid = Grid::build(&small_puzzle(), 4).unwrap();

    #[rustfmt::skip]
    assert_eq!(
      grid.to_string(),
      concat!(
        "\n",
        "CAT■\n",
        "A■O■\n",
        "RODE\n",
        "■■■■\n",
      )
    );
    assert_eq!(grid.total_cells(), 9);
  }

  #[test]
  fn numbers_are_not_overwritten_by_down_words() {
    let grid = Grid::build(&small_puzzle(), 4).unwrap();

    assert_eq!(grid.get((0, 0)).unwrap().number, Some(1));
    assert_eq!(grid.get((0, 2)).unwrap().number, Some(2));
    assert_eq!(grid.get((2, 0)).unwrap().number, Some(3));
    assert_eq!(grid.get((0, 1)).unwrap().number, None);
    assert_eq!(grid.get((1, 0)).unwrap().number, None);
  }

  #[test]
  fn every_letter_lands_in_place() {
    let data = small_puzzle();
    let grid = Grid::build(&data, GRID_SIZE).unwrap();

    for direction in [Across, Down] {
      for entry in data.entries(direction) {
        for (i, letter) in entry.answer.chars().enumerate() {
          let pos = match direction {
            Across => (entry.row, entry.col + i),
            Down => (entry.row + i, entry.col),
          };
          assert_eq!(grid.letter(pos), Some(letter), "{} {direction}", entry.number);
        }
      }
    }
  }

  #[test]
  fn build_is_deterministic() {
    let data = small_puzzle();
    let first = Grid::build(&data, GRID_SIZE).unwrap();
    let second = Grid::build(&data, GRID_SIZE).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn down_letter_wins_on_conflict() {
    let data = PuzzleData::new(vec![entry(1, "AB", 0, 0)], vec![entry(1, "XY", 0, 0)]);
    let grid = Grid::build(&data, 3).unwrap();
    assert_eq!(grid.letter((0, 0)), Some('X'));
    assert_eq!(grid.get((0, 0)).unwrap().number, Some(1));
  }

  #[test]
  fn words_off_the_grid_are_rejected() {
    let data = PuzzleData::new(vec![entry(4, "LONG", 1, 1)], vec![]);
    assert!(matches!(
      Grid::build(&data, 4),
      Err(Error::OutOfBounds {
        number: 4,
        direction: Across
      })
    ));
  }

  #[test]
  fn words_far_off_the_grid_are_rejected() {
    let across = PuzzleData::new(vec![entry(1, "AB", 0, usize::MAX)], vec![]);
    assert!(matches!(
      Grid::build(&across, GRID_SIZE),
      Err(Error::OutOfBounds { number: 1, .. })
    ));

    let down = PuzzleData::new(vec![], vec![entry(2, "AB", usize::MAX, 0)]);
    assert!(matches!(
      Grid::build(&down, GRID_SIZE),
      Err(Error::OutOfBounds {
        number: 2,
        direction: Down
      })
    ));

    let wrong_row = PuzzleData::new(vec![entry(3, "A", usize::MAX, 0)], vec![]);
    assert!(Grid::build(&wrong_row, GRID_SIZE).is_err());
  }

  #[test]
  fn positions_are_row_major() {
    let grid = Grid::build(&PuzzleData::default(), 2).unwrap();
    assert_eq!(
      grid.positions().collect::<Vec<_>>(),
      [(0, 0), (0, 1), (1, 0), (1, 1)]
    );
    assert_eq!(grid.total_cells(), 0);
  }

  #[test]
  fn step_wraps_through_the_grid() {
    let grid = Grid::build(&PuzzleData::default(), 3).unwrap();

    assert_eq!(grid.step((0, 2), Arrow::Right), (1, 0));
    assert_eq!(grid.step((2, 2), Arrow::Right), (0, 0));
    assert_eq!(grid.step((1, 0), Arrow::Left), (0, 2));
    assert_eq!(grid.step((0, 0), Arrow::Left), (2, 2));
    assert_eq!(grid.step((2, 1), Arrow::Down), (0, 2));
    assert_eq!(grid.step((2, 2), Arrow::Down), (0, 0));
    assert_eq!(grid.step((0, 1), Arrow::Up), (2, 0));
    assert_eq!(grid.step((0, 0), Arrow::Up), (2, 2));
    assert_eq!(grid.step((1, 1), Arrow::Up), (0, 1));
  }
}
