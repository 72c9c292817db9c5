//! cepbook - look up Brazilian postal addresses by CEP and keep a list of them.
//!
//! Without arguments this starts the terminal form. Subcommands give a
//! scriptable interface to the same lookup client and address store.

mod app;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cepbook_core::form::FormField;
use cepbook_core::utils::is_complete_cep;
use cepbook_core::{AddressStore, CepClient, Config, FormController, FormState};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file prefix inside the log directory
const LOG_FILE_NAME: &str = "cepbook.log";

// ============================================================================
// Command line
// ============================================================================

#[derive(Parser)]
#[command(name = "cepbook", version, about = "Look up and save Brazilian postal addresses")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Look up a CEP and print the address as JSON
    Lookup { cep: String },
    /// Print the saved addresses as JSON
    List,
    /// Look up a CEP and save the resulting address
    Save {
        cep: String,
        /// Apartment, suite, block...
        #[arg(long)]
        complement: Option<String>,
        /// Override the neighborhood returned by the lookup
        #[arg(long)]
        neighborhood: Option<String>,
    },
    /// Remove a saved address by id
    Remove { id: String },
}

/// Initialize tracing to stderr, for subcommands
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Initialize tracing to a daily log file so the terminal UI stays clean.
/// The returned guard flushes the writer when dropped.
fn init_file_tracing() -> Option<WorkerGuard> {
    let log_dir = match Config::log_dir() {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Logging disabled: {}", e);
            return None;
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    Some(guard)
}

/// Fall back to defaults when the config file cannot be used, then apply
/// environment overrides. Needs a subscriber installed to report the fallback.
fn resolve_config(loaded: Result<Config>) -> Config {
    let config = match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!(error = %e, "Failed to load config, using defaults");
            Config::default()
        }
    };
    config.with_env_overrides()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logging first, so a config fallback is reported
    if let Some(command) = cli.command {
        init_tracing();
        let config = resolve_config(Config::load());
        return run_command(&config, command).await;
    }

    let _guard = init_file_tracing();
    info!("cepbook starting");
    let config = resolve_config(Config::load());

    let mut app = App::new(&config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("cepbook shutting down");
    Ok(())
}

async fn run_command(config: &Config, command: Command) -> Result<()> {
    match command {
        Command::Lookup { cep } => {
            if !is_complete_cep(&cep) {
                bail!("CEP must contain 8 digits: {}", cep);
            }
            let client = CepClient::from_config(config)?;
            let address = client.lookup(&cep).await?;
            println!("{}", serde_json::to_string_pretty(&address)?);
        }
        Command::List => {
            let store = AddressStore::from_config(config)?;
            println!("{}", serde_json::to_string_pretty(store.saved_addresses())?);
        }
        Command::Save {
            cep,
            complement,
            neighborhood,
        } => {
            let client = CepClient::from_config(config)?;
            let mut store = AddressStore::from_config(config)?;
            let mut form = FormController::new(client);

            form.set_cep_input(&cep);
            if form.search() {
                form.next_event().await;
            }
            if form.state() != FormState::Found {
                let reason = form.notice().map(|n| n.text.clone()).unwrap_or_default();
                bail!("Lookup failed for {}: {}", cep, reason);
            }

            if let Some(complement) = complement {
                form.edit_field(FormField::Complemento, &complement);
            }
            if let Some(neighborhood) = neighborhood {
                form.edit_field(FormField::Bairro, &neighborhood);
            }

            match form.save(&mut store) {
                Some(saved) => println!("{}", serde_json::to_string_pretty(&saved)?),
                None => {
                    let reason = form.notice().map(|n| n.text.clone()).unwrap_or_default();
                    bail!("Could not save {}: {}", cep, reason);
                }
            }
        }
        Command::Remove { id } => {
            let mut store = AddressStore::from_config(config)?;
            if !store.remove_address(&id)? {
                bail!("No saved address with id {}", id);
            }
            eprintln!("Removed {}", id);
        }
    }
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| render(f, app))?;

        // Poll for events with timeout to allow background updates
        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key) {
                    return Ok(());
                }
            }
        }

        // Apply lookup results and timers that completed
        app.check_background_tasks();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Collects formatted log output in memory
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl CapturedLogs {
        fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    #[test]
    fn test_malformed_config_falls_back_with_warning() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let config = tracing::subscriber::with_default(subscriber, || {
            resolve_config(Config::load_from(&path))
        });

        assert_eq!(config.request_timeout_secs, None);
        assert!(logs.contents().contains("Failed to load config, using defaults"));
    }

    #[test]
    fn test_valid_config_is_kept() {
        let config = resolve_config(Ok(Config {
            request_timeout_secs: Some(5),
            ..Default::default()
        }));
        assert_eq!(config.request_timeout_secs(), 5);
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["cepbook", "save", "01310-100", "--complement", "apto 12"]).unwrap();
        match cli.command {
            Some(Command::Save { cep, complement, neighborhood }) => {
                assert_eq!(cep, "01310-100");
                assert_eq!(complement.as_deref(), Some("apto 12"));
                assert_eq!(neighborhood, None);
            }
            _ => panic!("expected save"),
        }

        assert!(Cli::try_parse_from(["cepbook"]).unwrap().command.is_none());
        assert!(Cli::try_parse_from(["cepbook", "lookup"]).is_err());
    }
}
