//! Depot TUI - a terminal client for a Depot file storage server.
//!
//! This application provides a fast, keyboard-driven interface for
//! uploading files to and downloading files from a self-hosted Depot
//! server.

mod api;
mod app;
mod auth;
mod config;
mod models;
mod ui;
mod utils;

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

// ============================================================================
// Constants
// ============================================================================

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

/// Log file name in the cache directory
const LOG_FILE: &str = "depot.log";

/// Initialize the tracing subscriber for logging.
/// The TUI owns the terminal, so diagnostics go to a log file in the cache
/// directory. Use RUST_LOG to control the level (e.g. RUST_LOG=debug).
fn init_tracing(log_dir: &Path) -> tracing_appender::non_blocking::WorkerGuard {
    let _ = std::fs::create_dir_all(log_dir);
    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    // Check for CLI commands
    let args: Vec<String> = std::env::args().collect();
    if args.len() > 1 && args[1] == "--login" {
        return login_cli().await;
    }

    // Initialize logging
    let config = config::Config::load().unwrap_or_default();
    let log_dir = config
        .cache_dir()
        .unwrap_or_else(|_| std::path::PathBuf::from("."));
    let _guard = init_tracing(&log_dir);
    info!("Depot TUI starting");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app
    let mut app = App::new()?;

    // Ask for login when no stored session exists, otherwise load the list
    if !app.is_authenticated() {
        app.start_login();
    } else {
        app.refresh_files_background();
    }

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

    info!("Depot TUI shutting down");
    Ok(())
}

/// Interactive login from the terminal, outside the TUI.
/// Saves the session and exits, so the next TUI start skips the login form.
async fn login_cli() -> Result<()> {
    println!("\n=== Depot Login ===\n");

    let mut config = config::Config::load()?;

    let username = match config.last_username.clone() {
        Some(last_user) => {
            print!("Username [{}]: ", last_user);
            io::stdout().flush()?;

            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            let input = input.trim();

            if input.is_empty() {
                last_user
            } else {
                input.to_string()
            }
        }
        None => prompt_username()?,
    };

    let password = if auth::CredentialStore::has_credentials(&username) {
        print!("Use stored password? [Y/n]: ");
        io::stdout().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        if input.trim().to_lowercase() != "n" {
            auth::CredentialStore::get_password(&username)?
        } else {
            prompt_password()?
        }
    } else {
        prompt_password()?
    };

    println!("\nAuthenticating...");

    let api = api::ApiClient::new(&config.base_url())?;
    let session_data = api.authenticate(&username, &password).await?;

    if let Err(e) = auth::CredentialStore::store(&username, &password) {
        eprintln!("Warning: failed to store password in keychain: {}", e);
    }

    config.last_username = Some(username);
    config.save()?;

    let mut session = auth::Session::new(config.cache_dir()?);
    session.update(session_data);
    session.save()?;

    println!("Login successful!\n");
    Ok(())
}

fn prompt_username() -> Result<String> {
    print!("Username: ");
    io::stdout().flush()?;

    let mut username = String::new();
    io::stdin().read_line(&mut username)?;
    Ok(username.trim().to_string())
}

fn prompt_password() -> Result<String> {
    let password = rpassword::prompt_password("Password: ")?;
    Ok(password)
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

                // Handle input
                if handle_input(app, key).await? {
                    return Ok(());
                }
            }
        }

        // Check for completed background tasks
        app.check_background_tasks();

        // Check if we should quit
        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}
