use std::fs::File;
use std::io;
use std::path::PathBuf;

use clap::Parser;
use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use cruzadola::{FileStore, store};

mod app;
mod render;

use app::App;

/// Play the daily cruzadola crossword puzzles in your terminal.
#[derive(Parser, Debug)]
#[command(name = "cruzadola", version)]
pub struct Cli {
  /// Directory holding the puzzle files
  #[arg(long, env = "CRUZADOLA_PUZZLES_DIR", default_value = "assets/puzzles")]
  pub puzzles_dir: PathBuf,
  /// The puzzle index [default: <PUZZLES_DIR>/puzzlesMeta.json]
  #[arg(long)]
  pub index: Option<PathBuf>,
  /// Where progress is saved [default: the platform data directory]
  #[arg(long, env = "CRUZADOLA_DATA_DIR")]
  pub data_dir: Option<PathBuf>,
  /// List every puzzle in the index, not only the last ten days. Needed to see the
  /// bundled sample puzzle once it is more than ten days old.
  #[arg(long)]
  pub all: bool,
  /// Write logs to this file
  #[arg(long, value_name = "FILE")]
  pub log_file: Option<PathBuf>,
}

fn main() -> io::Result<()> {
  let cli = Cli::parse();

  if let Some(path) = &cli.log_file {
    let file = File::create(path)?;
    env_logger::builder()
      .filter_module("cruzadola", log::LevelFilter::Debug)
      .filter_module("cruzadola_tui", log::LevelFilter::Debug)
      .parse_default_env()
      .target(env_logger::Target::Pipe(Box::new(file)))
      .init();
  }

  let data_dir = match cli.data_dir.clone().map_or_else(store::default_data_dir, Ok) {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("{e}");
      std::process::exit(1);
    }
  };
  log::info!("Saving progress in {}", data_dir.display());

  let app = App::new(&cli, FileStore::new(data_dir));

  let mut terminal = ratatui::init();
  crossterm::execute!(io::stdout(), EnableMouseCapture)?;
  let result = app.run(&mut terminal);
  crossterm::execute!(io::stdout(), DisableMouseCapture)?;
  ratatui::restore();
  result
}
