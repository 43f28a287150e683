mod api;
mod app;
mod auth;
mod editor;
mod engine;
mod events;
mod keybindings;
mod requests;
mod router;
mod screens;
mod session;
mod settings;
mod syntax_highlight;
mod theme;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{
        DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::{self, File},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

use crate::{
    api::BackendClient,
    app::App,
    engine::{Completion, Engine},
    events::{Event, EventHandler},
    router::Route,
    settings::Settings,
    theme::{Theme, DEFAULT_THEME},
};

#[derive(Parser, Debug)]
#[command(name = "knightlint")]
#[command(about = "Terminal client for KnightLint AI pull request reviews", long_about = None)]
struct Cli {
    /// Start location, e.g. /select-repo, /repo/NAME/pr/42?token=..&username=..
    /// or the full callback URL from the sign-in page
    location: Option<String>,

    /// Base URL of the KnightLint backend
    #[arg(long, env = "KNIGHTLINT_BACKEND_URL")]
    backend_url: Option<String>,

    /// Backend session token (use together with --username)
    #[arg(short, long)]
    token: Option<String>,

    /// GitHub username the token belongs to
    #[arg(short, long)]
    username: Option<String>,

    /// Where to write logs
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// `$XDG_STATE_HOME/knightlint/knightlint.log`, falling back to
/// `~/.local/state/knightlint/knightlint.log`.
fn default_log_file() -> PathBuf {
    let base = if let Ok(state) = std::env::var("XDG_STATE_HOME") {
        PathBuf::from(state)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".local").join("state")
    } else {
        PathBuf::from(".")
    };
    base.join("knightlint").join("knightlint.log")
}

/// The terminal belongs to the UI, so logs go to a file.
fn init_logging(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("Failed to create log directory")?;
    }
    let file = File::options()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_file = cli.log_file.clone().unwrap_or_else(default_log_file);
    init_logging(&log_file)?;

    let settings = Settings::load().unwrap_or_else(|err| {
        warn!("using default settings: {err:#}");
        Settings::default()
    });
    let backend_url = cli
        .backend_url
        .clone()
        .unwrap_or_else(|| settings.backend_url.clone());
    let client = BackendClient::new(&backend_url).context("Invalid backend URL")?;

    // A session in the start location wins over stored credentials
    let (route, location_session) = match &cli.location {
        Some(location) => {
            let location = Route::parse(location).context("Invalid start location")?;
            (location.route, location.session)
        }
        None => (Route::Landing, None),
    };
    let host = client.base_url().host_str().unwrap_or_default().to_string();
    let session =
        location_session.or_else(|| auth::find_session(cli.token, cli.username, &host));

    if session.is_none() && route.requires_session() {
        eprintln!("Warning: no KnightLint session found; {route} will ask you to sign in.");
        eprintln!("Provide one using any of these methods:");
        eprintln!("  1. Command line: --token TOKEN --username USERNAME");
        eprintln!(
            "  2. ~/.authinfo file: machine {host} login USERNAME^knightlint password TOKEN"
        );
        eprintln!("  3. Environment: KNIGHTLINT_TOKEN and KNIGHTLINT_USERNAME");
    }

    let theme = settings.get_theme().or_else(|err| {
        warn!(theme = %settings.theme, "falling back to the default theme: {err:#}");
        Theme::builtin(DEFAULT_THEME)
    })?;

    if !crossterm::tty::IsTty::is_tty(&io::stdout()) {
        eprintln!("Error: This application requires a terminal environment to run.");
        eprintln!(
            "Please run this command directly in a terminal, not through a pipe or redirect."
        );
        return Ok(());
    }

    info!(backend = %client.base_url(), start = %route, "starting knightlint");
    let (tx, mut completions) = tokio::sync::mpsc::unbounded_channel();
    let engine = Engine::new(client, tx);
    let mut app = App::new(engine, settings, theme, session, route)
        .context("Failed to initialize application")?;

    // Setup terminal
    enable_raw_mode()
        .context("Failed to enable raw mode - make sure you're running in a terminal")?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )
    .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
    terminal.clear()?;

    let app_result = run_app(&mut terminal, &mut app, &mut completions).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    info!("exiting");
    app_result
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    completions: &mut UnboundedReceiver<Completion>,
) -> Result<()> {
    let event_handler = EventHandler::new();

    loop {
        while let Ok(completion) = completions.try_recv() {
            app.handle_completion(completion);
        }

        terminal.draw(|f| ui::draw(f, app))?;

        // Requests keep running on the runtime's worker threads while this polls
        if let Some(event) = event_handler.poll(Duration::from_millis(100))? {
            match event {
                Event::Key(key) => app.handle_key(key),
                Event::Paste(text) => app.handle_paste(&text),
                Event::Mouse(mouse) => app.handle_mouse(mouse.kind),
                Event::Resize | Event::Tick => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
