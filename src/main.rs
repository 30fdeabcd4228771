use std::fs::{self, File};
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, enable_raw_mode},
};
use log::{LevelFilter, error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, WriteLogger};

use folio::event_source::KeyboardEventSource;
use folio::panic_handler::{initialize_panic_handler, restore_terminal};
use folio::settings::SettingsStore;
use folio::terminal::{CellSize, TerminalEnv};
use folio::{App, run_app_with_event_source};

/// View PDF, Word and PowerPoint documents in the terminal
#[derive(Parser, Debug)]
#[command(name = "folio", version, about)]
struct Cli {
    /// Document to open (.pdf, .docx, .pptx)
    path: Option<PathBuf>,

    /// Settings file to use instead of <config_dir>/folio/config.yaml
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Log file, defaults to <data_dir>/folio/folio.log
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// One of off, error, warn, info, debug, trace
    #[arg(long, value_name = "LEVEL", default_value = "info")]
    log_level: String,

    /// Do not reopen the last document
    #[arg(long)]
    no_restore: bool,
}

fn default_log_file() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("folio"))
        .unwrap_or_else(std::env::temp_dir)
        .join("folio.log")
}

fn init_logging(cli: &Cli) -> Result<()> {
    let path = cli.log_file.clone().unwrap_or_else(default_log_file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let file =
        File::create(&path).with_context(|| format!("creating log file {}", path.display()))?;
    let level: LevelFilter = cli
        .log_level
        .parse()
        .map_err(|_| anyhow!("unknown log level '{}'", cli.log_level))?;
    WriteLogger::init(level, Config::default(), file)?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    info!("Starting folio {}", env!("CARGO_PKG_VERSION"));

    let settings = match &cli.config {
        Some(path) => SettingsStore::load(path),
        None => SettingsStore::load_default(),
    };

    // Before raw mode, some terminals answer pixel queries only outside it
    let cell_size = CellSize::detect();
    let terminal_env = TerminalEnv::read();
    info!("Cell size {cell_size:?}, terminal {terminal_env:?}");

    initialize_panic_handler();
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::with_terminal(settings, cell_size, terminal_env);
    app.handle_resize(terminal.size()?);
    match &cli.path {
        Some(path) => {
            app.open_path(path);
        }
        None if !cli.no_restore => {
            app.restore_session();
        }
        None => {}
    }

    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    restore_terminal();
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down folio");
    Ok(())
}
