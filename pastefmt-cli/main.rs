//! Command-line host for the pastefmt pipeline.
//!
//! Reads the system clipboard, runs the formatting pipeline and prints the
//! result on stdout. With `--toggle`/`--value`, flips a formatter option in
//! the user settings instead of pasting.

use anyhow::{
  Result,
  bail,
};
use clap::Parser;
use pastefmt_lib::{
  clipboard::HtmlCapture,
  document::Buffer,
  paste::{
    self,
    PasteRequest,
  },
  settings,
};
use pastefmt_loader::FileStore;
use pastefmt_runtime::{
  HelperCapture,
  SystemClipboard,
};

#[derive(Debug, Parser)]
#[command(
  name = "pastefmt",
  about = "Paste clipboard text through a formatting pipeline"
)]
struct Cli {
  /// Prefer the clipboard's HTML flavor when the platform supports it
  #[arg(long)]
  html: bool,

  /// Formatter option to toggle instead of pasting
  #[arg(long, value_name = "OPTION", requires = "value")]
  toggle: Option<String>,

  /// Value for --toggle
  #[arg(long, value_name = "BOOL", requires = "toggle")]
  value: Option<bool>,

  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = clap::ArgAction::Count)]
  verbosity: u8,
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbosity);

  let mut store = FileStore::load()?;

  if let (Some(option), Some(value)) = (cli.toggle.as_deref(), cli.value) {
    if settings::toggle_is_noop(&store, option, value) {
      log::info!("{option} is already {value}");
      return Ok(());
    }
    if !settings::toggle_option(&mut store, option, value)? {
      bail!("unknown formatter option {option:?}");
    }
    log::info!("set {option} = {value} in {}", store.path().display());
    return Ok(());
  }

  let clipboard = SystemClipboard::detect();
  let capture = HelperCapture::detect();
  if cli.html && !capture.supported() {
    log::debug!("html capture unavailable here, falling back to plain text");
  }

  let project = pastefmt_loader::workspace_settings();
  let mut doc = Buffer::default();
  paste::paste(
    &mut doc,
    &clipboard,
    &capture,
    &store,
    project.as_ref(),
    PasteRequest { html: cli.html },
  )?;

  println!("{}", doc.text());
  Ok(())
}

fn init_logging(verbosity: u8) {
  let level = match verbosity {
    0 => "warn",
    1 => "info",
    2 => "debug",
    _ => "trace",
  };
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
