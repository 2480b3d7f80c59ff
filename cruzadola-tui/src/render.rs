use cruzadola::Direction::{Across, Down};
use cruzadola::{Direction, SquareStyle, meta};
use ratatui::{
  Frame,
  buffer::Buffer,
  layout::{Constraint, Flex, Layout, Position, Rect},
  style::{Color, Modifier, Style, Stylize},
  text::{Line, Span},
  widgets::{Block, Clear, Padding, Paragraph, Widget, Wrap},
};
use ratatui_macros::{horizontal, line, span, vertical};

use crate::app::{
  App, Dialog, HitAreas, MenuItem, Playing, SQUARE_GAP, SQUARE_HEIGHT, SQUARE_WIDTH, Screen,
};

const PROGRESS_BAR_WIDTH: usize = 10;

fn square_style(value: SquareStyle) -> Style {
  let base_style = match value {
    SquareStyle::Black => return Style::new().bg(Color::Black),
    SquareStyle::Standard => Style::new().bg(Color::White),
    SquareStyle::Cursor => Style::new().bg(Color::LightRed),
    SquareStyle::Word => Style::new().bg(Color::LightYellow),
  };
  base_style.fg(Color::Black).add_modifier(Modifier::BOLD)
}

pub fn draw(app: &App, frame: &mut Frame) {
  *app.hit_areas.borrow_mut() = HitAreas::default();

  let [title_area, main_area, footer_area] = vertical![==2, *=1, ==1].areas(frame.area());

  match &app.screen {
    Screen::List => {
      Line::from("Cruzadola".bold().blue())
        .centered()
        .render(title_area, frame.buffer_mut());
      draw_list(app, main_area, frame.buffer_mut());
      footer(app, "↑/↓ choose · Enter play · q quit").render(footer_area, frame.buffer_mut());
    }
    Screen::Playing(playing) => {
      draw_title(playing, title_area, frame.buffer_mut());
      draw_puzzle(app, playing, main_area, frame);
      footer(
        app,
        "Tab switch direction · PgUp/PgDn clues · Esc menu · Ctrl-C quit",
      )
      .render(footer_area, frame.buffer_mut());
      if let Some(selected) = playing.menu {
        draw_menu(selected, frame.area(), frame.buffer_mut());
      }
    }
  }

  if let Some(dialog) = &app.dialog {
    draw_dialog(dialog, frame.area(), frame.buffer_mut());
  }
}

fn footer<'a>(app: &'a App, hints: &'a str) -> Line<'a> {
  match &app.toast {
    Some((message, _)) => Line::from(message.as_str().bold().green()).centered(),
    None => Line::from(hints.dark_gray()).centered(),
  }
}

fn progress_bar(percent: u8) -> String {
  let filled = (percent as usize * PROGRESS_BAR_WIDTH).div_ceil(100);
  format!(
    "{}{}",
    "█".repeat(filled),
    "░".repeat(PROGRESS_BAR_WIDTH - filled)
  )
}

fn draw_list(app: &App, area: Rect, buf: &mut Buffer) {
  let rows = if app.puzzles.is_empty() { 2 } else { app.puzzles.len() as u16 };
  let height = rows + 2;
  let area = center(area, Constraint::Length(52), Constraint::Length(height));
  let block = Block::bordered()
    .title(Line::from(" Pick your Cruzadola ".bold().blue()).centered())
    .padding(Padding::horizontal(1));

  if app.puzzles.is_empty() {
    let message = if app.show_all {
      "No puzzles available"
    } else {
      "No puzzles from the last ten days. Start with --all to see older ones."
    };
    Paragraph::new(message)
      .wrap(Wrap { trim: true })
      .centered()
      .block(block)
      .render(area, buf);
    return;
  }

  let lines: Vec<Line> = app
    .puzzles
    .iter()
    .zip(&app.progress)
    .enumerate()
    .map(|(i, (puzzle, &percent))| {
      let date = meta::format_display_date(&puzzle.date).unwrap_or_else(|| puzzle.date.clone());
      let line = line![
        span!(Style::new().fg(Color::Green); "{}", progress_bar(percent)),
        span!(" {percent:>3}%  "),
        Span::from(date)
      ];
      if i == app.selected {
        line.style(Style::new().bg(Color::Blue).fg(Color::White).bold())
      } else {
        line
      }
    })
    .collect();
  Paragraph::new(lines).block(block).render(area, buf);
}

fn draw_title(playing: &Playing, area: Rect, buf: &mut Buffer) {
  let date =
    meta::format_display_date(&playing.meta.date).unwrap_or_else(|| playing.meta.date.clone());
  line![
    "Cruzadola".bold().blue(),
    ": ".bold(),
    Span::from(date).bold(),
    "   ",
    span!(Style::new().fg(Color::Magenta).bold(); "⏱ {}", playing.session.timer().formatted())
  ]
  .centered()
  .render(area, buf);
}

fn draw_puzzle(app: &App, playing: &Playing, area: Rect, frame: &mut Frame) {
  let [clue_area, board_area] = horizontal![==45, *=1].areas(area);
  let [across_area, down_area] = vertical![*=1, *=1].areas(clue_area);
  let [current_area, grid_area] = vertical![==3, *=1].areas(board_area);

  draw_clue_list(app, playing, Across, across_area, frame.buffer_mut());
  draw_clue_list(app, playing, Down, down_area, frame.buffer_mut());
  draw_current_clue(playing, current_area, frame.buffer_mut());

  let size = playing.session.grid().size() as u16;
  let grid_area = center(
    grid_area,
    Constraint::Length(size * (SQUARE_WIDTH + SQUARE_GAP)),
    Constraint::Length(size * SQUARE_HEIGHT),
  );
  draw_grid(playing, grid_area, frame.buffer_mut());
  app.hit_areas.borrow_mut().grid = Some(grid_area);

  if playing.menu.is_none() && app.dialog.is_none() {
    if let Some((row, col)) = playing.focus.or(playing.session.cursor()) {
      let x = grid_area.x + col as u16 * (SQUARE_WIDTH + SQUARE_GAP) + SQUARE_WIDTH / 2;
      let y = grid_area.y + row as u16 * SQUARE_HEIGHT + 1;
      if grid_area.contains(Position::new(x, y)) {
        frame.set_cursor_position(Position::new(x, y));
      }
    }
  }
}

fn draw_grid(playing: &Playing, area: Rect, buf: &mut Buffer) {
  let session = &playing.session;
  for (row, col) in session.grid().positions() {
    let square_area = Rect {
      x: area.x + col as u16 * (SQUARE_WIDTH + SQUARE_GAP),
      y: area.y + row as u16 * SQUARE_HEIGHT,
      width: SQUARE_WIDTH,
      height: SQUARE_HEIGHT,
    }
    .intersection(area);
    if square_area.is_empty() {
      continue;
    }

    let style = square_style(session.square_style((row, col)));
    let Some(cell) = session.grid().get((row, col)) else {
      Block::new().style(style).render(square_area, buf);
      continue;
    };

    let number = cell.number.map(|n| n.to_string()).unwrap_or_default();
    let letter = session
      .values()
      .get((row, col))
      .map(String::from)
      .unwrap_or_default();
    let letter = if session.helped().get((row, col)) {
      Line::from(letter.fg(Color::Blue)).centered()
    } else {
      Line::from(letter).centered()
    };
    Paragraph::new(vec![
      Line::from(number.not_bold().fg(Color::DarkGray)),
      letter,
    ])
    .style(style)
    .render(square_area, buf);
  }
}

fn draw_current_clue(playing: &Playing, area: Rect, buf: &mut Buffer) {
  let session = &playing.session;
  let text = match session.current_word() {
    Some(word) => line![
      span!(Style::new().fg(Color::LightRed).bold(); "{} {}: ", word.number, session.direction()),
      Span::from(word.clue.as_str())
    ],
    None => Line::from("Pick a square or press PgDn to start".dark_gray()),
  };
  Paragraph::new(text)
    .centered()
    .block(Block::bordered())
    .render(area, buf);
}

fn draw_clue_list(app: &App, playing: &Playing, direction: Direction, area: Rect, buf: &mut Buffer) {
  let session = &playing.session;
  let block = Block::bordered().title(Line::from(format!(" {direction} ").bold()).centered());
  let inner = block.inner(area);
  block.render(area, buf);

  let entries = session.data().entries(direction);
  let current = entries
    .iter()
    .position(|e| session.is_current_clue(e.number, direction));
  let visible = inner.height as usize;
  let offset = match current {
    Some(i) if visible > 0 && i >= visible => i + 1 - visible,
    _ => 0,
  };

  let lines: Vec<Line> = entries
    .iter()
    .enumerate()
    .skip(offset)
    .map(|(i, entry)| {
      let mut style = Style::new();
      if session.is_word_complete(entry, direction) {
        style = style.add_modifier(Modifier::CROSSED_OUT).fg(Color::DarkGray);
      }
      if Some(i) == current {
        style = style.bg(Color::Yellow).fg(Color::Black).bold();
      }
      line![span!(Modifier::BOLD; "{:>2}. ", entry.number), Span::from(entry.clue.as_str())]
        .style(style)
    })
    .collect();
  Paragraph::new(lines).render(inner, buf);

  app
    .hit_areas
    .borrow_mut()
    .clues
    .push((inner, direction, offset));
}

fn draw_menu(selected: usize, area: Rect, buf: &mut Buffer) {
  let area = center(
    area,
    Constraint::Length(30),
    Constraint::Length(MenuItem::ALL.len() as u16 + 2),
  );
  let lines: Vec<Line> = MenuItem::ALL
    .iter()
    .enumerate()
    .map(|(i, item)| {
      if i == selected {
        Line::from(format!("▶ {}", item.label())).bold().blue()
      } else {
        Line::from(format!("  {}", item.label()))
      }
    })
    .collect();
  Clear.render(area, buf);
  Paragraph::new(lines)
    .block(
      Block::bordered()
        .title(Line::from(" Menu ").centered())
        .title_bottom(Line::from(" Enter select · Esc close ").centered())
        .padding(Padding::horizontal(1)),
    )
    .render(area, buf);
}

fn draw_dialog(dialog: &Dialog, area: Rect, buf: &mut Buffer) {
  let (title, mut lines, buttons) = match dialog {
    Dialog::Info {
      title,
      body,
      confirm_label,
      ..
    } => (
      title,
      body.iter().map(|l| Line::from(l.as_str())).collect::<Vec<_>>(),
      Line::from(format!("[ {confirm_label} ]").bold()),
    ),
    Dialog::Confirm { title, body, .. } => (
      title,
      vec![Line::from(body.as_str())],
      line!["[y] Yes".bold(), "    ", "[n] No".bold()],
    ),
  };
  lines.push(Line::default());
  lines.push(buttons);

  let area = center(
    area,
    Constraint::Length(56),
    Constraint::Length(lines.len() as u16 + 4),
  );
  Clear.render(area, buf);
  Paragraph::new(lines)
    .centered()
    .block(
      Block::bordered()
        .title(Line::from(format!(" {title} ").bold().blue()).centered())
        .padding(Padding::uniform(1)),
    )
    .render(area, buf);
}

/// https://ratatui.rs/recipes/layout/center-a-widget/
fn center(area: Rect, horizontal: Constraint, vertical: Constraint) -> Rect {
  let [area] = Layout::horizontal([horizontal])
    .flex(Flex::Center)
    .areas(area);
  let [area] = Layout::vertical([vertical]).flex(Flex::Center).areas(area);
  area
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn progress_bars() {
    assert_eq!(progress_bar(0), "░░░░░░░░░░");
    assert_eq!(progress_bar(42), "█████░░░░░");
    assert_eq!(progress_bar(100), "██████████");
  }

  #[test]
  fn square_styles() {
    assert_eq!(square_style(SquareStyle::Black), Style::new().bg(Color::Black));
    assert_eq!(
      square_style(SquareStyle::Cursor),
      Style::new()
        .bg(Color::LightRed)
        .fg(Color::Black)
        .add_modifier(Modifier::BOLD)
    );
    assert_ne!(
      square_style(SquareStyle::Word),
      square_style(SquareStyle::Standard)
    );
  }

  #[test]
  fn centered_area_is_inside() {
    let outer = Rect::new(0, 0, 100, 40);
    let inner = center(outer, Constraint::Length(20), Constraint::Length(10));
    assert_eq!(inner, Rect::new(40, 15, 20, 10));
  }
}
