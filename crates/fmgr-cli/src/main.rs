mod app;
mod display;

use std::fs::{self, OpenOptions};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use fmgr_core::config::settings::LogConfig;
use fmgr_core::{platform_trash, Bookmarks, Config};
use tracing_subscriber::EnvFilter;

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "fmgr", version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
struct Cli {
    /// Directory to start in (defaults to the working directory)
    start_dir: Option<PathBuf>,

    /// Configuration file (defaults to ~/.fmgr/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Run a single command line and exit with its status
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Log at debug level
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    let config = match cli.config.clone().or_else(Config::default_path) {
        Some(path) => Config::load_or_default(&path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    init_logging(&config.log, cli.verbose)?;

    let start_dir = match cli.start_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    let trash = platform_trash(&config.trash).context("failed to set up the trash")?;
    let mut app = App::new(config, &start_dir, trash, Bookmarks::default_path())
        .with_context(|| format!("cannot start in {}", start_dir.display()))?;
    tracing::info!(dir = %app.current_dir().display(), "session started");

    let mut stdout = io::stdout().lock();
    if let Some(line) = cli.command {
        return Ok(match app.execute(&line, &mut stdout) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {e}");
                ExitCode::FAILURE
            }
        });
    }

    run_repl(&mut app, &mut stdout)?;
    tracing::info!("session ended");
    Ok(ExitCode::SUCCESS)
}

fn run_repl<W: Write>(app: &mut App, out: &mut W) -> anyhow::Result<()> {
    writeln!(out, "fmgr {}. Type 'help' for commands.", env!("CARGO_PKG_VERSION"))?;
    let mut lines = io::stdin().lock().lines();

    while app.is_running() {
        write!(out, "{}> ", app.current_dir().display())?;
        out.flush()?;

        let Some(line) = lines.next() else {
            // EOF
            writeln!(out)?;
            break;
        };
        if let Err(e) = app.execute(&line?, out) {
            eprintln!("Error: {e}");
        }
    }
    Ok(())
}

/// Logs go to a file so they never interleave with shell output.
/// `RUST_LOG` overrides the configured level unless `--verbose` is given.
fn init_logging(config: &LogConfig, verbose: bool) -> anyhow::Result<()> {
    let Some(path) = config.resolved_file() else {
        return Ok(());
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}
