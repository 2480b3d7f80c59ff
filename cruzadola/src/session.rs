use crate::Direction::{Across, Down};
use crate::progress::{self, GridValues, HelpedCells};
use crate::store::{self, PersistedState, ProgressStore};
use crate::{Direction, Error, GRID_SIZE, Grid, Pos, PuzzleData, WordEntry, WordInfo};
use log::{debug, info};

/// How often the timer saves progress on its own, in seconds.
const AUTOSAVE_INTERVAL: u64 = 60;

/// The four arrow keys.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Arrow {
  Up,
  Down,
  Left,
  Right,
}

impl Arrow {
  /// Which direction to prefer for the square the cursor lands on.
  fn preferred_direction(self) -> Direction {
    match self {
      Arrow::Up | Arrow::Down => Down,
      Arrow::Left | Arrow::Right => Across,
    }
  }
}

/// A keystroke on the grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Key {
  Arrow(Arrow),
  Backspace,
  Char(char),
}

/// Things that happened during a session that the UI should react to.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Event {
  /// The given square should receive input focus.
  Focus(Pos),
  /// The grid is full but wrong. Only sent the first time this happens in a session.
  Incorrect,
  /// The grid is full and right.
  Solved {
    elapsed: u64,
    no_help_percentage: u8,
  },
  /// Progress was saved at the user's request.
  Saved { completion_percentage: u8 },
}

/// The outcome of checking a grid.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Verdict {
  Solved,
  Incorrect,
}

/// Indicates how a particular square should be styled. For instance, [Standard](Self::Standard)
/// might map to white, [Cursor](Self::Cursor) to orange, and [Word](Self::Word) to yellow.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SquareStyle {
  /// A square no word passes through.
  Black,
  /// Default styling
  Standard,
  /// The cursor is positioned on this square.
  Cursor,
  /// The cursor is not on this square, but the word indicated by the cursor includes this square.
  Word,
}

/// Seconds spent solving, and when to autosave next.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Timer {
  elapsed: u64,
  running: bool,
  since_autosave: u64,
}

impl Timer {
  fn resume(elapsed: u64) -> Self {
    Self {
      elapsed,
      ..Self::default()
    }
  }

  pub fn elapsed(&self) -> u64 {
    self.elapsed
  }

  pub fn is_running(&self) -> bool {
    self.running
  }

  fn start(&mut self) {
    if !self.running {
      self.running = true;
      self.since_autosave = 0;
    }
  }

  fn stop(&mut self) {
    self.running = false;
  }

  /// Advances the clock by a second. Returns whether it's time to autosave.
  fn tick(&mut self) -> bool {
    if !self.running {
      return false;
    }
    self.elapsed += 1;
    self.since_autosave += 1;
    if self.since_autosave >= AUTOSAVE_INTERVAL {
      self.since_autosave = 0;
      true
    } else {
      false
    }
  }

  /// The elapsed time as `MM:SS`.
  pub fn formatted(&self) -> String {
    format!("{:02}:{:02}", self.elapsed / 60, self.elapsed % 60)
  }
}

/// Everything about one user solving one puzzle: the grid, what they've typed, which
/// squares they were helped with, where the cursor is and how long they've been at it.
///
/// The session never talks to the UI directly. Anything the UI needs to know about, like
/// which square to focus or that the puzzle was solved, is queued as an [Event] and
/// collected with [take_events](Self::take_events).
#[derive(Debug)]
pub struct Session<S> {
  puzzle_id: String,
  data: PuzzleData,
  grid: Grid,
  values: GridValues,
  helped: HelpedCells,
  cursor: Option<Pos>,
  direction: Direction,
  current_word: Option<WordInfo>,
  timer: Timer,
  incorrect_shown: bool,
  events: Vec<Event>,
  store: S,
}

impl<S: ProgressStore> Session<S> {
  /// Opens a puzzle, picking up where any saved progress left off.
  pub fn open(puzzle_id: impl Into<String>, data: PuzzleData, store: S) -> Result<Self, Error> {
    Self::with_size(puzzle_id, data, store, GRID_SIZE)
  }

  /// Like [open](Self::open), for a grid of a different size.
  pub fn with_size(
    puzzle_id: impl Into<String>,
    data: PuzzleData,
    store: S,
    size: usize,
  ) -> Result<Self, Error> {
    let puzzle_id = puzzle_id.into();
    let grid = Grid::build(&data, size)?;

    let (values, helped, timer) = match store::load_progress(&store, &puzzle_id, size) {
      Some(saved) => {
        debug!("Resuming {puzzle_id} at {}s", saved.time);
        let helped = saved
          .helped_cells
          .unwrap_or_else(|| HelpedCells::new(size));
        (saved.grid_values, helped, Timer::resume(saved.time))
      }
      None => (
        GridValues::new(size),
        HelpedCells::new(size),
        Timer::default(),
      ),
    };

    Ok(Self {
      puzzle_id,
      data,
      grid,
      values,
      helped,
      cursor: None,
      direction: Across,
      current_word: None,
      timer,
      incorrect_shown: false,
      events: Vec::new(),
      store,
    })
  }

  pub fn puzzle_id(&self) -> &str {
    &self.puzzle_id
  }

  pub fn data(&self) -> &PuzzleData {
    &self.data
  }

  pub fn grid(&self) -> &Grid {
    &self.grid
  }

  pub fn values(&self) -> &GridValues {
    &self.values
  }

  pub fn helped(&self) -> &HelpedCells {
    &self.helped
  }

  pub fn cursor(&self) -> Option<Pos> {
    self.cursor
  }

  pub fn direction(&self) -> Direction {
    self.direction
  }

  /// The word under the cursor in the current direction.
  pub fn current_word(&self) -> Option<&WordInfo> {
    self.current_word.as_ref()
  }

  pub fn timer(&self) -> &Timer {
    &self.timer
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Removes and returns the events queued since the last call.
  pub fn take_events(&mut self) -> Vec<Event> {
    std::mem::take(&mut self.events)
  }

  /// Moves the cursor to `pos`.
  ///
  /// With `force`, that direction is used as is. Without it (a plain click on a square),
  /// clicking the square the cursor is already on switches direction if a word runs the
  /// other way, and clicking a square with no word in the current direction switches to
  /// the other one. Clicks on squares that aren't part of any word are ignored.
  ///
  /// Returns whether the cursor moved.
  pub fn select_cell(&mut self, pos: Pos, force: Option<Direction>) -> bool {
    let has_across = self.data.word_bounds(pos, Across).is_some();
    let has_down = self.data.word_bounds(pos, Down).is_some();

    let direction = match force {
      Some(direction) => {
        if self.grid.is_black(pos) {
          return false;
        }
        direction
      }
      None if self.cursor == Some(pos) => match self.direction {
        Across if has_down => Down,
        Down if has_across => Across,
        current => current,
      },
      None => match self.direction {
        _ if !has_across && !has_down => return false,
        Across if !has_across => Down,
        Down if !has_down => Across,
        current => current,
      },
    };

    self.cursor = Some(pos);
    self.direction = direction;
    self.current_word = self.data.word_info(pos, direction);
    self.events.push(Event::Focus(pos));
    debug!("Selected {pos:?} {direction}");
    true
  }

  /// Re-clicks the square under the cursor, which switches direction where possible.
  pub fn toggle_direction(&mut self) {
    if let Some(pos) = self.cursor {
      self.select_cell(pos, None);
    }
  }

  /// Jumps to the start of the next clue in the current direction, wrapping around.
  pub fn select_next_word(&mut self) {
    self.select_adjacent_word(1);
  }

  /// Jumps to the start of the previous clue in the current direction, wrapping around.
  pub fn select_previous_word(&mut self) {
    self.select_adjacent_word(-1);
  }

  fn select_adjacent_word(&mut self, step: isize) {
    let entries = self.data.entries(self.direction);
    if entries.is_empty() {
      return;
    }
    let current = self.cursor.and_then(|pos| {
      entries
        .iter()
        .position(|e| e.bounds(self.direction).contains(pos))
    });
    let next = match current {
      Some(i) => (i as isize + step).rem_euclid(entries.len() as isize) as usize,
      None if step > 0 => 0,
      None => entries.len() - 1,
    };
    let start = (entries[next].row, entries[next].col);
    self.select_cell(start, Some(self.direction));
  }

  /// Handles one keystroke.
  pub fn handle_key(&mut self, key: Key) {
    match key {
      Key::Arrow(arrow) => {
        self.move_cursor(arrow);
      }
      Key::Backspace => self.backspace(),
      Key::Char(c) => self.enter_char(c),
    }
  }

  /// Moves the cursor to the next square in the direction of the arrow that is part of
  /// a word, wrapping around the edges of the grid.
  ///
  /// Up and down prefer to land on a down word, left and right on an across word.
  /// Returns whether the cursor moved.
  pub fn move_cursor(&mut self, arrow: Arrow) -> bool {
    let Some(start) = self.cursor else {
      return false;
    };

    let preferred = arrow.preferred_direction();
    let mut pos = start;
    loop {
      pos = self.grid.step(pos, arrow);
      if pos == start {
        return false;
      }
      if self.grid.is_black(pos) {
        continue;
      }

      let direction = if self.data.word_bounds(pos, preferred).is_some() {
        preferred
      } else if self.data.word_bounds(pos, !preferred).is_some() {
        !preferred
      } else {
        continue;
      };
      return self.select_cell(pos, Some(direction));
    }
  }

  /// Types a letter into the square under the cursor and moves on to the next square of
  /// the current word. Anything but `A` to `Z` is ignored.
  pub fn enter_char(&mut self, c: char) {
    let Some(pos) = self.cursor else {
      return;
    };
    if !c.is_ascii_alphabetic() || self.grid.is_black(pos) {
      return;
    }

    self.timer.start();
    self.values.set(pos, Some(c.to_ascii_uppercase()));

    if let Some(next) = self.next_in_word(pos) {
      self.select_cell(next, None);
    }

    if progress::is_filled(&self.grid, &self.values) {
      self.validate();
    }
  }

  /// The square after `pos` in the current word, if `pos` isn't its last square.
  fn next_in_word(&self, pos: Pos) -> Option<Pos> {
    let bounds = self.data.word_bounds(pos, self.direction)?;
    let (row, col) = pos;
    let next = match self.direction {
      Across => (row, col + 1),
      Down => (row + 1, col),
    };
    (bounds.contains(next) && !self.grid.is_black(next)).then_some(next)
  }

  /// Erases the square under the cursor. If it's already empty, moves back a square
  /// (into the previous word on the same line, if need be) and erases that one.
  pub fn backspace(&mut self) {
    let Some(pos) = self.cursor else {
      return;
    };

    if self.values.get(pos).is_some() {
      self.values.set(pos, None);
      return;
    }

    if let Some(previous) = self.previous_cell(pos) {
      self.values.set(previous, None);
      self.select_cell(previous, None);
    }
  }

  /// The square before `pos` in the current word. From the first square of a word, this
  /// is the last square of the closest word that ends before it on the same row (across)
  /// or column (down).
  fn previous_cell(&self, pos: Pos) -> Option<Pos> {
    let direction = self.direction;
    let bounds = self.data.word_bounds(pos, direction)?;
    let (row, col) = pos;

    if pos != bounds.start {
      let previous = match direction {
        Across => (row, col - 1),
        Down => (row - 1, col),
      };
      return (!self.grid.is_black(previous)).then_some(previous);
    }

    let entries = self.data.entries(direction).iter();
    let previous_word: Option<&WordEntry> = match direction {
      Across => entries
        .filter(|e| e.row == row && e.col + e.len() <= col && !e.is_empty())
        .max_by_key(|e| e.col),
      Down => entries
        .filter(|e| e.col == col && e.row + e.len() <= row && !e.is_empty())
        .max_by_key(|e| e.row),
    };
    previous_word.map(|e| e.bounds(direction).end)
  }

  /// Checks the grid against the solution.
  ///
  /// A wrong grid produces [Event::Incorrect] the first time, and after that only asks
  /// for focus back on the cursor. A right one produces [Event::Solved]; the UI should
  /// then call [finish](Self::finish).
  pub fn validate(&mut self) -> Verdict {
    if let Some(pos) = progress::first_mismatch(&self.grid, &self.values) {
      debug!("{} is incorrect at {pos:?}", self.puzzle_id);
      if !self.incorrect_shown {
        self.incorrect_shown = true;
        self.events.push(Event::Incorrect);
      } else if let Some(cursor) = self.cursor {
        self.events.push(Event::Focus(cursor));
      }
      return Verdict::Incorrect;
    }

    info!("{} solved in {}s", self.puzzle_id, self.timer.elapsed);
    self.events.push(Event::Solved {
      elapsed: self.timer.elapsed,
      no_help_percentage: self.no_help_percentage(),
    });
    Verdict::Solved
  }

  /// The share of the grid solved without any help.
  pub fn no_help_percentage(&self) -> u8 {
    progress::no_help_stats(&self.grid, &self.values, &self.helped).percentage()
  }

  /// The share of the grid holding the right letter.
  pub fn completion_percentage(&self) -> u8 {
    progress::completion_percentage(&self.grid, &self.values)
  }

  /// Whether the letters of a word have all been filled in, right or wrong.
  pub fn is_word_complete(&self, entry: &WordEntry, direction: Direction) -> bool {
    entry
      .bounds(direction)
      .positions()
      .all(|pos| self.values.get(pos).is_some())
  }

  /// Whether the given clue is the one the cursor is on.
  pub fn is_current_clue(&self, number: u32, direction: Direction) -> bool {
    self.direction == direction
      && self
        .current_word
        .as_ref()
        .is_some_and(|word| word.number == number)
  }

  /// Determines how a particular square should be styled.
  /// See [SquareStyle].
  pub fn square_style(&self, pos: Pos) -> SquareStyle {
    if self.grid.is_black(pos) {
      SquareStyle::Black
    } else if self.cursor == Some(pos) {
      SquareStyle::Cursor
    } else if self
      .current_word
      .as_ref()
      .is_some_and(|word| word.bounds.contains(pos))
    {
      SquareStyle::Word
    } else {
      SquareStyle::Standard
    }
  }

  /// Fills in the right letter under the cursor.
  pub fn reveal_letter(&mut self) -> Result<(), Error> {
    let Some(pos) = self.cursor else {
      return Ok(());
    };
    let Some(letter) = self.grid.letter(pos) else {
      return Ok(());
    };
    self.values.set(pos, Some(letter));
    self.helped.set(pos);
    self.save().map(drop)
  }

  /// Fills in every letter of the current word.
  pub fn reveal_word(&mut self) -> Result<(), Error> {
    let Some(word) = &self.current_word else {
      return Ok(());
    };
    for (pos, letter) in word.bounds.positions().zip(word.answer.chars()) {
      self.values.set(pos, Some(letter));
      self.helped.set(pos);
    }
    self.save().map(drop)
  }

  /// Fills in the whole grid and checks it.
  pub fn solve(&mut self) -> Result<Verdict, Error> {
    self.values = GridValues::solved(&self.grid);
    for pos in self.grid.white_positions().collect::<Vec<_>>() {
      self.helped.set(pos);
    }
    let verdict = self.validate();
    self.save()?;
    Ok(verdict)
  }

  /// Empties the grid and the clock. Squares that were revealed stay marked as helped.
  pub fn reset(&mut self) -> Result<(), Error> {
    self.values.clear();
    self.timer = Timer::default();
    self.save().map(drop)
  }

  /// Called once a second by the UI. Advances the clock while it's running and saves
  /// every minute.
  pub fn tick(&mut self) -> Result<(), Error> {
    if self.timer.tick() {
      debug!("Autosaving {}", self.puzzle_id);
      self.save()?;
    }
    Ok(())
  }

  /// Writes the current progress to the store and returns what was written.
  pub fn save(&mut self) -> Result<PersistedState, Error> {
    let state = PersistedState {
      grid_values: self.values.clone(),
      helped_cells: Some(self.helped.clone()),
      time: self.timer.elapsed,
      completion_percentage: self.completion_percentage(),
      no_help_percentage: self.no_help_percentage(),
    };
    store::save_progress(&mut self.store, &self.puzzle_id, &state)?;
    info!(
      "Saved {} ({}% complete)",
      self.puzzle_id, state.completion_percentage
    );
    Ok(state)
  }

  /// Saves and lets the user know with [Event::Saved].
  pub fn save_with_message(&mut self) -> Result<(), Error> {
    let state = self.save()?;
    self.events.push(Event::Saved {
      completion_percentage: state.completion_percentage,
    });
    Ok(())
  }

  /// Stores the final state of a solved puzzle and stops the clock.
  pub fn finish(&mut self) -> Result<(), Error> {
    self.timer.stop();
    self.save().map(drop)
  }

  /// Saves and stops the clock before the puzzle is closed.
  pub fn exit(mut self) -> Result<S, Error> {
    self.timer.stop();
    self.save()?;
    Ok(self.store)
  }
}
