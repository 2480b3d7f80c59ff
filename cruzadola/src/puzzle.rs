use crate::Direction::{Across, Down};
use crate::{Direction, Error, Pos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One word of a puzzle: its clue, its answer and where its first letter goes.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WordEntry {
  /// The clue number printed in the first square of the word.
  pub number: u32,
  pub clue: String,
  /// The answer, in uppercase letters.
  pub answer: String,
  pub row: usize,
  pub col: usize,
}

impl WordEntry {
  /// The number of letters in the answer.
  pub fn len(&self) -> usize {
    self.answer.chars().count()
  }

  pub fn is_empty(&self) -> bool {
    self.answer.is_empty()
  }

  /// The squares covered by this word when it is read in the given direction.
  pub fn bounds(&self, direction: Direction) -> WordBounds {
    let last = self.len().saturating_sub(1);
    let end = match direction {
      Across => (self.row, self.col.saturating_add(last)),
      Down => (self.row.saturating_add(last), self.col),
    };
    WordBounds {
      start: (self.row, self.col),
      end,
    }
  }

  fn contains(&self, (row, col): Pos, direction: Direction) -> bool {
    match direction {
      Across => self.row == row && col >= self.col && col - self.col < self.len(),
      Down => self.col == col && row >= self.row && row - self.row < self.len(),
    }
  }
}

/// The first and last squares of a word. A word is always a straight line, so
/// either the rows or the columns of `start` and `end` are equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct WordBounds {
  pub start: Pos,
  pub end: Pos,
}

impl WordBounds {
  pub fn direction(&self) -> Direction {
    if self.start.0 == self.end.0 && self.start.1 != self.end.1 {
      Across
    } else if self.start.1 == self.end.1 && self.start.0 != self.end.0 {
      Down
    } else {
      // A single square reads the same both ways.
      Across
    }
  }

  /// How many squares the word spans.
  pub fn len(&self) -> usize {
    (self.end.0 - self.start.0) + (self.end.1 - self.start.1) + 1
  }

  pub fn contains(&self, (row, col): Pos) -> bool {
    (self.start.0..=self.end.0).contains(&row) && (self.start.1..=self.end.1).contains(&col)
  }

  /// Every position of the word, from its first letter to its last.
  pub fn positions(&self) -> impl Iterator<Item = Pos> + use<> {
    let (start_row, start_col) = self.start;
    let (end_row, end_col) = self.end;
    (start_row..=end_row).flat_map(move |r| (start_col..=end_col).map(move |c| (r, c)))
  }
}

/// Everything there is to know about the word under a square.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct WordInfo {
  pub number: u32,
  pub clue: String,
  pub answer: String,
  pub bounds: WordBounds,
}

/// The across and down words of a puzzle.
///
/// Each list is kept sorted by the position of the word's first letter, which for a
/// conventionally numbered puzzle is also clue-number order.
#[derive(Debug, Clone, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawPuzzle", into = "RawPuzzle")]
pub struct PuzzleData {
  across: Vec<WordEntry>,
  down: Vec<WordEntry>,
}

impl PuzzleData {
  /// Builds puzzle data from two word lists, uppercasing answers and sorting each
  /// list by position.
  pub fn new(across: Vec<WordEntry>, down: Vec<WordEntry>) -> Self {
    let normalize = |mut entries: Vec<WordEntry>| {
      for entry in entries.iter_mut() {
        entry.answer = entry.answer.to_uppercase();
      }
      entries.sort_by_key(|e| (e.row, e.col, e.number));
      entries
    };
    Self {
      across: normalize(across),
      down: normalize(down),
    }
  }

  /// Parses the JSON form of a puzzle.
  pub fn from_json(json: &str) -> Result<Self, Error> {
    serde_json::from_str(json).map_err(Error::json("puzzle data"))
  }

  /// Reads and parses a puzzle file.
  pub fn load(path: &Path) -> Result<Self, Error> {
    let json = std::fs::read_to_string(path).map_err(Error::io(path))?;
    serde_json::from_str(&json).map_err(Error::json(path.display()))
  }

  /// The words in the given direction, ordered by position.
  pub fn entries(&self, direction: Direction) -> &[WordEntry] {
    match direction {
      Across => &self.across,
      Down => &self.down,
    }
  }

  /// Finds the word in the given direction that covers `pos`, if there is one.
  pub fn word_at(&self, pos: Pos, direction: Direction) -> Option<&WordEntry> {
    self
      .entries(direction)
      .iter()
      .find(|entry| entry.contains(pos, direction))
  }

  /// The bounds of the word in the given direction that covers `pos`.
  pub fn word_bounds(&self, pos: Pos, direction: Direction) -> Option<WordBounds> {
    self
      .word_at(pos, direction)
      .map(|entry| entry.bounds(direction))
  }

  /// Like [word_bounds](Self::word_bounds), but also returns the number, clue and answer.
  pub fn word_info(&self, pos: Pos, direction: Direction) -> Option<WordInfo> {
    self.word_at(pos, direction).map(|entry| WordInfo {
      number: entry.number,
      clue: entry.clue.clone(),
      answer: entry.answer.clone(),
      bounds: entry.bounds(direction),
    })
  }
}

/// The on-disk shape of a puzzle: clue numbers are object keys.
#[derive(Deserialize, Serialize)]
struct RawPuzzle {
  across: BTreeMap<String, RawEntry>,
  down: BTreeMap<String, RawEntry>,
}

#[derive(Deserialize, Serialize)]
struct RawEntry {
  clue: String,
  answer: String,
  row: usize,
  col: usize,
}

impl TryFrom<RawPuzzle> for PuzzleData {
  type Error = Error;

  fn try_from(raw: RawPuzzle) -> Result<Self, Self::Error> {
    fn entries(map: BTreeMap<String, RawEntry>) -> Result<Vec<WordEntry>, Error> {
      map
        .into_iter()
        .map(|(key, raw)| {
          let number = key
            .trim()
            .parse()
            .map_err(|_| Error::ParseError(format!("clue key {key:?} is not a number")))?;
          Ok(WordEntry {
            number,
            clue: raw.clue,
            answer: raw.answer,
            row: raw.row,
            col: raw.col,
          })
        })
        .collect()
    }

    Ok(Self::new(entries(raw.across)?, entries(raw.down)?))
  }
}

impl From<PuzzleData> for RawPuzzle {
  fn from(data: PuzzleData) -> Self {
    fn map(entries: Vec<WordEntry>) -> BTreeMap<String, RawEntry> {
      entries
        .into_iter()
        .map(|e| {
          let raw = RawEntry {
            clue: e.clue,
            answer: e.answer,
            row: e.row,
            col: e.col,
          };
          (e.number.to_string(), raw)
        })
        .collect()
    }

    Self {
      across: map(data.across),
      down: map(data.down),
    }
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::*;

  pub(crate) fn entry(number: u32, answer: &str, row: usize, col: usize) -> WordEntry {
    WordEntry {
      number,
      clue: format!("clue {number}"),
      answer: answer.to_string(),
      row,
      col,
    }
  }

  /// ```text
  /// CAT■
  /// A■O■
  /// RODE
  /// ■■■■
  /// ```
  pub(crate) fn small_puzzle() -> PuzzleData {
    PuzzleData::new(
      vec![entry(1, "CAT", 0, 0), entry(3, "RODE", 2, 0)],
      vec![entry(1, "CAR", 0, 0), entry(2, "TOD", 0, 2)],
    )
  }

  #[test]
  fn parses_json_and_sorts_by_position() {
    let json = r#"{
      "across": {
        "10": {"clue": "Later", "answer": "rode", "row": 2, "col": 0},
        "1": {"clue": "Feline", "answer": "CAT", "row": 0, "col": 0}
      },
      "down": {
        "2": {"clue": "Fox", "answer": "TOD", "row": 0, "col": 2},
        "1": {"clue": "Auto", "answer": "CAR", "row": 0, "col": 0}
      }
    }"#;
    let data = PuzzleData::from_json(json).unwrap();

    let across: Vec<_> = data.entries(Across).iter().map(|e| e.number).collect();
    assert_eq!(across, [1, 10]);
    assert_eq!(data.entries(Across)[1].answer, "RODE");

    let down: Vec<_> = data.entries(Down).iter().map(|e| e.number).collect();
    assert_eq!(down, [1, 2]);
  }

  #[test]
  fn rejects_non_numeric_clue_keys() {
    let json = r#"{"across": {"one": {"clue": "x", "answer": "A", "row": 0, "col": 0}}, "down": {}}"#;
    let err = PuzzleData::from_json(json).unwrap_err();
    assert!(err.to_string().contains("\"one\""), "{err}");
  }

  #[test]
  fn word_bounds_match_entry_length() {
    let data = small_puzzle();

    for direction in [Across, Down] {
      for entry in data.entries(direction) {
        let bounds = entry.bounds(direction);
        for pos in bounds.positions() {
          let found = data.word_bounds(pos, direction).unwrap();
          assert_eq!(found, bounds);
          assert_eq!(found.len(), entry.len());
        }
      }
    }
  }

  #[test]
  fn word_bounds_not_found_outside_words() {
    let data = small_puzzle();

    // (0, 3) and (1, 1) are not covered by any word.
    for direction in [Across, Down] {
      assert_eq!(data.word_bounds((0, 3), direction), None);
      assert_eq!(data.word_bounds((1, 1), direction), None);
    }
    // (1, 0) is only part of a down word.
    assert_eq!(data.word_bounds((1, 0), Across), None);
    assert!(data.word_bounds((1, 0), Down).is_some());
  }

  #[test]
  fn lookup_near_the_end_of_usize() {
    let data = PuzzleData::new(vec![entry(1, "AB", 0, usize::MAX - 1)], vec![]);
    assert_eq!(data.word_bounds((0, 0), Across), None);
    let found = data.word_bounds((0, usize::MAX), Across).unwrap();
    assert_eq!(found.end, (0, usize::MAX));
  }

  #[test]
  fn word_info_reports_clue() {
    let data = small_puzzle();
    let info = data.word_info((2, 3), Across).unwrap();
    assert_eq!(info.number, 3);
    assert_eq!(info.clue, "clue 3");
    assert_eq!(info.answer, "RODE");
    assert_eq!(
      info.bounds,
      WordBounds {
        start: (2, 0),
        end: (2, 3)
      }
    );
  }

  #[test]
  fn bounds_positions_and_direction() {
    let across = WordBounds {
      start: (2, 1),
      end: (2, 3),
    };
    assert_eq!(across.positions().collect::<Vec<_>>(), [(2, 1), (2, 2), (2, 3)]);
    assert_eq!(across.direction(), Across);

    let down = WordBounds {
      start: (0, 4),
      end: (2, 4),
    };
    assert_eq!(down.positions().collect::<Vec<_>>(), [(0, 4), (1, 4), (2, 4)]);
    assert_eq!(down.direction(), Down);
    assert!(down.contains((1, 4)));
    assert!(!down.contains((1, 3)));
  }
}
