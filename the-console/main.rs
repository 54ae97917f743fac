//! Interactive management console.
//!
//! Reads command lines from stdin. A line ending in `?` prints the
//! completions for the text before the `?`; any other line is parsed,
//! validated and run.

use std::{
  fs::OpenOptions,
  io::{
    self,
    Write,
  },
  path::{
    Path,
    PathBuf,
  },
  sync::Mutex,
};

use clap::{
  Parser,
  Subcommand,
};
use eyre::{
  Result,
  WrapErr,
};
use the_args::Completion;
use the_console::{
  CommandRegistry,
  Console,
  ConsoleConfig,
  Outcome,
  console::describe,
};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "the-console")]
#[command(about = "Management console with argument completion")]
struct Cli {
  /// Path to a TOML config file
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Raise log verbosity, repeat for more
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Write logs to this file instead of stderr
  #[arg(long)]
  log: Option<PathBuf>,

  /// Start with an active session
  #[arg(long)]
  connected: bool,

  /// Start in this console mode
  #[arg(long)]
  mode: Option<String>,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
  /// Parse and validate one command line
  Parse { line: String },
  /// Print the completions for a command line
  Complete {
    line:   String,
    /// Byte offset of the cursor, defaults to the end of the line
    #[arg(long)]
    cursor: Option<usize>,
  },
  /// Read commands from stdin (the default)
  Repl,
}

fn init_logging(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
  let level = match verbosity {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    2 => LevelFilter::DEBUG,
    _ => LevelFilter::TRACE,
  };
  let filter = EnvFilter::builder()
    .with_default_directive(level.into())
    .from_env_lossy();
  let subscriber = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(false);

  match log_file {
    Some(path) => {
      let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .wrap_err_with(|| format!("failed to open log file {}", path.display()))?;
      subscriber
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    },
    None => subscriber.with_writer(io::stderr).init(),
  }
  Ok(())
}

fn print_completions(out: &mut impl Write, completions: &[Completion]) -> io::Result<()> {
  let width = completions.iter().map(|c| c.text.len()).max().unwrap_or(0);
  for completion in completions {
    match &completion.doc {
      Some(doc) => writeln!(out, "{:width$}  {doc}", completion.text)?,
      None => writeln!(out, "{}", completion.text)?,
    }
  }
  Ok(())
}

fn repl(console: &mut Console) -> Result<()> {
  let stdin = io::stdin();
  let mut stdout = io::stdout().lock();

  loop {
    write!(stdout, "> ")?;
    stdout.flush()?;

    let mut line = String::new();
    if stdin.read_line(&mut line)? == 0 {
      break;
    }

    match console.handle_line(&line) {
      Ok(Outcome::Nothing) => {},
      Ok(Outcome::Output(out)) => writeln!(stdout, "{out}")?,
      Ok(Outcome::Completions(completions)) => print_completions(&mut stdout, &completions)?,
      Ok(Outcome::Quit) => break,
      Err(err) => {
        tracing::debug!(%err, "command failed");
        writeln!(stdout, "error: {err}")?;
      },
    }
  }
  Ok(())
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_logging(cli.verbose, cli.log.as_deref())?;

  let mut config = match &cli.config {
    Some(path) => ConsoleConfig::load(path)?,
    None => ConsoleConfig::default(),
  };
  if cli.connected {
    config.session.connected = true;
  }
  if cli.mode.is_some() {
    config.session.mode = cli.mode;
  }

  let registry =
    CommandRegistry::with_builtins().wrap_err("invalid built-in command definitions")?;
  let mut console = Console::new(registry, config);

  match cli.command.unwrap_or(Command::Repl) {
    Command::Parse { line } => {
      let invocation = console.registry().parse(&line)?;
      println!("{}", describe(&invocation));
    },
    Command::Complete { line, cursor } => {
      let completions = console.complete(&line, cursor.unwrap_or(line.len()));
      print_completions(&mut io::stdout().lock(), &completions)?;
    },
    Command::Repl => repl(&mut console)?,
  }

  Ok(())
}
