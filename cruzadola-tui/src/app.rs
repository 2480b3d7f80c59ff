use std::cell::RefCell;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDate};
use crossterm::event::{
  self, Event as TermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
  MouseEvent, MouseEventKind,
};
use cruzadola::{
  Arrow, Direction, Event, FileStore, Key, Pos, PuzzleMeta, Session, meta, store,
};
use log::{error, warn};
use ratatui::DefaultTerminal;
use ratatui::layout::{Position, Rect};

use crate::Cli;

/// How long to wait for input before redrawing.
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const TICK_INTERVAL: Duration = Duration::from_secs(1);
const TOAST_DURATION: Duration = Duration::from_secs(2);

pub const SQUARE_WIDTH: u16 = 5;
pub const SQUARE_HEIGHT: u16 = 2;
/// Columns between two squares.
pub const SQUARE_GAP: u16 = 1;

/// The entries of the in-game menu, in the order they are shown.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MenuItem {
  RevealLetter,
  RevealWord,
  Solve,
  Save,
  Info,
  Reset,
  Credits,
  Exit,
}

impl MenuItem {
  pub const ALL: [MenuItem; 8] = [
    MenuItem::RevealLetter,
    MenuItem::RevealWord,
    MenuItem::Solve,
    MenuItem::Save,
    MenuItem::Info,
    MenuItem::Reset,
    MenuItem::Credits,
    MenuItem::Exit,
  ];

  pub fn label(self) -> &'static str {
    match self {
      MenuItem::RevealLetter => "Reveal letter",
      MenuItem::RevealWord => "Reveal word",
      MenuItem::Solve => "Solve puzzle",
      MenuItem::Save => "Save",
      MenuItem::Info => "Puzzle info",
      MenuItem::Reset => "Restart puzzle",
      MenuItem::Credits => "Credits",
      MenuItem::Exit => "Exit",
    }
  }
}

/// What happens when a dialog is confirmed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Action {
  Close,
  Reset,
  FinishSolved,
  ExitPuzzle,
}

#[derive(Debug)]
pub enum Dialog {
  /// A message with a single button.
  Info {
    title: String,
    body: Vec<String>,
    confirm_label: String,
    on_confirm: Action,
  },
  /// A yes/no question.
  Confirm {
    title: String,
    body: String,
    on_confirm: Action,
  },
}

#[derive(Debug)]
pub struct Playing {
  pub session: Session<FileStore>,
  pub meta: PuzzleMeta,
  /// Index of the highlighted menu entry while the menu is open.
  pub menu: Option<usize>,
  /// The square the session last asked to focus.
  pub focus: Option<Pos>,
}

#[derive(Debug)]
pub enum Screen {
  List,
  Playing(Box<Playing>),
}

/// Where things were drawn on the last frame, so that mouse clicks can be mapped back
/// to squares and clues.
#[derive(Debug, Default)]
pub struct HitAreas {
  pub grid: Option<Rect>,
  /// Each clue list, the direction it lists, and the index of its first visible clue.
  pub clues: Vec<(Rect, Direction, usize)>,
}

#[derive(Debug)]
pub struct App {
  pub puzzles_dir: PathBuf,
  pub store: FileStore,
  pub puzzles: Vec<PuzzleMeta>,
  /// Saved completion of each entry of `puzzles`.
  pub progress: Vec<u8>,
  pub selected: usize,
  pub screen: Screen,
  pub dialog: Option<Dialog>,
  pub toast: Option<(String, Instant)>,
  pub hit_areas: RefCell<HitAreas>,
  /// Whether the list shows the whole index rather than the last ten days.
  pub show_all: bool,
  running: bool,
}

impl App {
  pub fn new(cli: &Cli, store: FileStore) -> Self {
    let index = cli
      .index
      .clone()
      .unwrap_or_else(|| cli.puzzles_dir.join("puzzlesMeta.json"));
    let puzzles = match meta::load_index(&index) {
      Ok(index) => visible_puzzles(index, cli.all, Local::now().date_naive()),
      Err(e) => {
        error!("Could not load the puzzle index: {e}");
        Vec::new()
      }
    };

    let mut app = Self {
      puzzles_dir: cli.puzzles_dir.clone(),
      store,
      puzzles,
      progress: Vec::new(),
      selected: 0,
      screen: Screen::List,
      dialog: None,
      toast: None,
      hit_areas: RefCell::default(),
      show_all: cli.all,
      running: true,
    };
    app.refresh_progress();
    app
  }

  pub fn run(mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
    let mut last_tick = Instant::now();
    while self.running {
      terminal.draw(|frame| crate::render::draw(&self, frame))?;

      if event::poll(POLL_INTERVAL)? {
        self.handle_crossterm_event(event::read()?);
      }

      while last_tick.elapsed() >= TICK_INTERVAL {
        last_tick += TICK_INTERVAL;
        self.tick();
      }
      if self
        .toast
        .as_ref()
        .is_some_and(|(_, shown)| shown.elapsed() >= TOAST_DURATION)
      {
        self.toast = None;
      }
    }

    if let Screen::Playing(_) = self.screen {
      self.leave_puzzle(Action::ExitPuzzle);
    }
    Ok(())
  }

  fn refresh_progress(&mut self) {
    self.progress = self
      .puzzles
      .iter()
      .map(|p| store::saved_completion(&self.store, &p.id))
      .collect();
  }

  fn tick(&mut self) {
    if let Screen::Playing(playing) = &mut self.screen {
      if let Err(e) = playing.session.tick() {
        warn!("Autosave failed: {e}");
      }
      self.drain_session_events();
    }
  }

  fn handle_crossterm_event(&mut self, event: TermEvent) {
    match event {
      // it's important to check KeyEventKind::Press to avoid handling key release events
      TermEvent::Key(key) if key.kind == KeyEventKind::Press => self.on_key_event(key),
      TermEvent::Mouse(mouse) => self.on_mouse_event(mouse),
      _ => {}
    }
  }

  fn on_key_event(&mut self, key: KeyEvent) {
    if key.modifiers.contains(KeyModifiers::CONTROL)
      && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
      self.quit();
      return;
    }

    if let Some(dialog) = &self.dialog {
      let action = match (dialog, key.code) {
        (Dialog::Info { on_confirm, .. }, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) => {
          Some(*on_confirm)
        }
        (Dialog::Confirm { on_confirm, .. }, KeyCode::Enter | KeyCode::Char('y' | 'Y')) => {
          Some(*on_confirm)
        }
        (Dialog::Confirm { .. }, KeyCode::Esc | KeyCode::Char('n' | 'N')) => Some(Action::Close),
        _ => None,
      };
      if let Some(action) = action {
        self.dialog = None;
        self.perform(action);
      }
      return;
    }

    let menu_open = match &self.screen {
      Screen::List => None,
      Screen::Playing(playing) => Some(playing.menu.is_some()),
    };
    match menu_open {
      None => self.on_list_key(key),
      Some(true) => self.on_menu_key(key),
      Some(false) => self.on_puzzle_key(key),
    }
  }

  fn on_list_key(&mut self, key: KeyEvent) {
    match key.code {
      KeyCode::Esc | KeyCode::Char('q') => self.quit(),
      KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
      KeyCode::Down | KeyCode::Char('j') => {
        if self.selected + 1 < self.puzzles.len() {
          self.selected += 1;
        }
      }
      KeyCode::Enter => self.open_selected(),
      _ => {}
    }
  }

  fn on_menu_key(&mut self, key: KeyEvent) {
    let Screen::Playing(playing) = &mut self.screen else {
      return;
    };
    let Some(index) = playing.menu else {
      return;
    };
    match key.code {
      KeyCode::Esc => playing.menu = None,
      KeyCode::Up => playing.menu = Some(index.saturating_sub(1)),
      KeyCode::Down => playing.menu = Some((index + 1).min(MenuItem::ALL.len() - 1)),
      KeyCode::Enter => {
        playing.menu = None;
        self.activate(MenuItem::ALL[index]);
      }
      _ => {}
    }
  }

  fn on_puzzle_key(&mut self, key: KeyEvent) {
    let Screen::Playing(playing) = &mut self.screen else {
      return;
    };
    let session = &mut playing.session;
    let key = match key.code {
      KeyCode::Esc => {
        playing.menu = Some(0);
        return;
      }
      KeyCode::Tab | KeyCode::BackTab => {
        session.toggle_direction();
        None
      }
      KeyCode::PageDown => {
        session.select_next_word();
        None
      }
      KeyCode::PageUp => {
        session.select_previous_word();
        None
      }
      KeyCode::Up => Some(Key::Arrow(Arrow::Up)),
      KeyCode::Down => Some(Key::Arrow(Arrow::Down)),
      KeyCode::Left => Some(Key::Arrow(Arrow::Left)),
      KeyCode::Right => Some(Key::Arrow(Arrow::Right)),
      KeyCode::Backspace | KeyCode::Delete => Some(Key::Backspace),
      KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
        Some(Key::Char(c))
      }
      _ => None,
    };

    if session.cursor().is_none() && key.is_some() {
      // Nothing is selected yet: the first keystroke lands on the first clue.
      session.select_next_word();
    } else if let Some(key) = key {
      session.handle_key(key);
    }
    self.drain_session_events();
  }

  fn on_mouse_event(&mut self, mouse: MouseEvent) {
    if self.dialog.is_some() || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
      return;
    }
    let Screen::Playing(playing) = &mut self.screen else {
      return;
    };
    if playing.menu.is_some() {
      return;
    }

    let click = Position::new(mouse.column, mouse.row);
    let hit_areas = self.hit_areas.borrow();
    if let Some(pos) = hit_areas.grid.and_then(|area| square_at(area, click)) {
      playing.session.select_cell(pos, None);
    } else if let Some((area, direction, offset)) = hit_areas
      .clues
      .iter()
      .find(|(area, _, _)| area.contains(click))
    {
      let index = offset + (click.y - area.y) as usize;
      if let Some(entry) = playing.session.data().entries(*direction).get(index) {
        let start = (entry.row, entry.col);
        playing.session.select_cell(start, Some(*direction));
      }
    }
    drop(hit_areas);
    self.drain_session_events();
  }

  fn open_selected(&mut self) {
    let Some(meta) = self.puzzles.get(self.selected).cloned() else {
      return;
    };
    let session = meta::load_puzzle(&self.puzzles_dir, &meta)
      .and_then(|data| Session::open(meta.id.clone(), data, self.store.clone()));
    match session {
      Ok(session) => {
        self.screen = Screen::Playing(Box::new(Playing {
          session,
          meta,
          menu: None,
          focus: None,
        }));
      }
      Err(e) => self.show_error(e),
    }
  }

  fn activate(&mut self, item: MenuItem) {
    let Screen::Playing(playing) = &mut self.screen else {
      return;
    };
    let session = &mut playing.session;
    let result = match item {
      MenuItem::RevealLetter => session.reveal_letter(),
      MenuItem::RevealWord => session.reveal_word(),
      MenuItem::Solve => session.solve().map(drop),
      MenuItem::Save => session.save_with_message(),
      MenuItem::Info => {
        self.dialog = Some(puzzle_info(&playing.meta));
        Ok(())
      }
      MenuItem::Reset => {
        self.dialog = Some(Dialog::Confirm {
          title: "Restart puzzle".into(),
          body: "Are you sure you want to restart? All your progress will be lost.".into(),
          on_confirm: Action::Reset,
        });
        Ok(())
      }
      MenuItem::Credits => {
        self.dialog = Some(credits());
        Ok(())
      }
      MenuItem::Exit => {
        self.dialog = Some(Dialog::Confirm {
          title: "Exit puzzle".into(),
          body: "Do you really want to leave this puzzle?".into(),
          on_confirm: Action::ExitPuzzle,
        });
        Ok(())
      }
    };
    if let Err(e) = result {
      self.show_error(e);
    }
    self.drain_session_events();
  }

  fn perform(&mut self, action: Action) {
    match action {
      Action::Close => {}
      Action::Reset => {
        if let Screen::Playing(playing) = &mut self.screen {
          if let Err(e) = playing.session.reset() {
            self.show_error(e);
          }
        }
      }
      Action::FinishSolved | Action::ExitPuzzle => self.leave_puzzle(action),
    }
  }

  /// Saves and goes back to the puzzle list.
  fn leave_puzzle(&mut self, action: Action) {
    let Screen::Playing(playing) = std::mem::replace(&mut self.screen, Screen::List) else {
      return;
    };
    let mut session = playing.session;
    let result = match action {
      Action::FinishSolved => session.finish(),
      _ => session.exit().map(drop),
    };
    if let Err(e) = result {
      self.show_error(e);
    }
    self.refresh_progress();
  }

  /// Turns the events queued by the session into dialogs and toasts.
  fn drain_session_events(&mut self) {
    let Screen::Playing(playing) = &mut self.screen else {
      return;
    };
    for event in playing.session.take_events() {
      match event {
        Event::Focus(pos) => playing.focus = Some(pos),
        Event::Incorrect => {
          self.dialog = Some(Dialog::Info {
            title: "You're almost there!".into(),
            body: vec!["Some of the answers are not right.".into()],
            confirm_label: "Keep trying!".into(),
            on_confirm: Action::Close,
          });
        }
        Event::Solved {
          elapsed,
          no_help_percentage,
        } => {
          self.dialog = Some(Dialog::Info {
            title: "You're a natural!".into(),
            body: vec![
              format!("Time: {:02}:{:02}", elapsed / 60, elapsed % 60),
              format!("Without help: {no_help_percentage}%"),
            ],
            confirm_label: "Back to the list".into(),
            on_confirm: Action::FinishSolved,
          });
        }
        Event::Saved {
          completion_percentage,
        } => {
          self.toast = Some((
            format!("Saved! {completion_percentage}% correct"),
            Instant::now(),
          ));
        }
      }
    }
  }

  fn show_error(&mut self, e: cruzadola::Error) {
    error!("{e}");
    self.toast = Some((format!("Error: {e}"), Instant::now()));
  }

  /// Set running to false to quit the application.
  fn quit(&mut self) {
    self.running = false;
  }
}

/// The puzzles offered on the list screen, newest first.
fn visible_puzzles(mut index: Vec<PuzzleMeta>, all: bool, today: NaiveDate) -> Vec<PuzzleMeta> {
  if all {
    index.sort_by(|a, b| b.date.cmp(&a.date));
    index
  } else {
    meta::recent(&index, today)
  }
}

/// Maps a click inside the grid area to the square under it.
pub fn square_at(area: Rect, click: Position) -> Option<Pos> {
  if !area.contains(click) {
    return None;
  }
  let dx = click.x - area.x;
  let dy = click.y - area.y;
  if dx % (SQUARE_WIDTH + SQUARE_GAP) >= SQUARE_WIDTH {
    return None;
  }
  let col = (dx / (SQUARE_WIDTH + SQUARE_GAP)) as usize;
  let row = (dy / SQUARE_HEIGHT) as usize;
  Some((row, col))
}

fn puzzle_info(meta: &PuzzleMeta) -> Dialog {
  let mut body = Vec::new();
  if let Some((original, _)) = meta::file_dates(&meta.file) {
    body.push(meta::format_display_date(&original).unwrap_or(original));
  }
  body.push(format!("{} squares", meta.total_cells));
  body.push(String::new());
  body.push("Palavras Cruzadas O Globo".into());
  body.push("by P. Durante".into());
  body.push("© Arte em Texto Ltda.".into());
  Dialog::Info {
    title: "Puzzle info".into(),
    body,
    confirm_label: "Close".into(),
    on_confirm: Action::Close,
  }
}

fn credits() -> Dialog {
  Dialog::Info {
    title: "Credits".into(),
    body: vec![
      "All puzzle credits go to:".into(),
      "Palavras Cruzadas O Globo".into(),
      "by P. Durante".into(),
      "Arte em Texto Ltda.".into(),
    ],
    confirm_label: "Close".into(),
    on_confirm: Action::Close,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clicks_map_to_squares() {
    let area = Rect::new(10, 5, 11 * (SQUARE_WIDTH + SQUARE_GAP), 11 * SQUARE_HEIGHT);
    assert_eq!(square_at(area, Position::new(10, 5)), Some((0, 0)));
    assert_eq!(square_at(area, Position::new(14, 6)), Some((0, 0)));
    // The gap between two squares.
    assert_eq!(square_at(area, Position::new(15, 5)), None);
    assert_eq!(square_at(area, Position::new(16, 7)), Some((1, 1)));
    assert_eq!(square_at(area, Position::new(9, 5)), None);
  }

  #[test]
  fn old_puzzles_need_show_all() {
    let puzzle = |date: &str| PuzzleMeta {
      id: format!("000001_{date}"),
      date: date.to_string(),
      file: format!("puzzle_000001_{date}.json"),
      total_cells: 8,
    };
    let index = vec![puzzle("261018"), puzzle("261101")];
    let later = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();

    assert!(visible_puzzles(index.clone(), false, later).is_empty());
    let dates: Vec<_> = visible_puzzles(index, true, later)
      .into_iter()
      .map(|p| p.date)
      .collect();
    assert_eq!(dates, ["261101", "261018"]);
  }

  #[test]
  fn menu_lists_every_item_once() {
    for (i, item) in MenuItem::ALL.iter().enumerate() {
      assert_eq!(MenuItem::ALL.iter().position(|x| x == item), Some(i));
      assert!(!item.label().is_empty());
    }
  }
}
