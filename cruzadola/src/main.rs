use clap::Parser;
use cruzadola::{Error, meta};
use std::path::PathBuf;

/// Generates the index of available puzzles from a directory of puzzle files.
#[derive(Parser)]
#[command(name = "puzzles-meta", version)]
struct Cli {
  /// Directory containing `puzzle_<code>_<date>.json` files
  #[arg(short, long, value_name = "DIR", default_value = "assets/puzzles")]
  dir: PathBuf,
  /// Where to write the index [default: <DIR>/puzzlesMeta.json]
  #[arg(short, long, value_name = "FILE")]
  output: Option<PathBuf>,
}

fn main() -> Result<(), Error> {
  env_logger::builder()
    .filter_module("cruzadola", log::LevelFilter::Info)
    .filter_module("puzzles_meta", log::LevelFilter::Info)
    .parse_default_env()
    .init();

  let cli = Cli::parse();
  let output = cli
    .output
    .unwrap_or_else(|| cli.dir.join("puzzlesMeta.json"));

  let metas = meta::generate(&cli.dir)?;
  meta::write_index(&output, &metas)?;
  log::info!(
    "Generated {} puzzle metadata entries in {}",
    metas.len(),
    output.display()
  );

  Ok(())
}
