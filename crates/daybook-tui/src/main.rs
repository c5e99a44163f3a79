use std::io;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use daybook_core::user::Credentials;
use daybook_service::BlockingTaskStore;
use ratatui::prelude::*;

use daybook_tui::app::App;

#[derive(Parser)]
#[command(name = "daybook", about = "Terminal client for the daybook task scheduler")]
struct Cli {
    /// Base URL of a running daybook-server
    #[arg(long, env = "DAYBOOK_SERVER", default_value = "http://localhost:3720")]
    server: String,

    /// Bearer token (see `daybook-server issue-token`)
    #[arg(long, env = "DAYBOOK_TOKEN")]
    token: Option<String>,

    #[arg(long, env = "DAYBOOK_USERNAME")]
    username: Option<String>,

    #[arg(long, env = "DAYBOOK_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Create the account instead of logging in
    #[arg(long, requires = "username")]
    register: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut store = match cli.token.filter(|t| !t.is_empty()) {
        Some(token) => BlockingTaskStore::with_token(&cli.server, token)?,
        None => BlockingTaskStore::new(&cli.server)?,
    };
    wait_for_server(&store)?;

    // Sessions opened here are closed again on exit; a supplied token is not.
    let opened_session = sign_in(&mut store, cli.username, cli.password, cli.register)?;

    let app = App::new(store).context("failed to load tasks")?;
    let (app, result) = run_tui(app);

    if opened_session {
        if let Err(e) = app.into_store().logout() {
            eprintln!("Warning: failed to end the session: {e}");
        }
    }

    result
}

/// Returns whether a new session was opened with a username and password.
fn sign_in(
    store: &mut BlockingTaskStore,
    username: Option<String>,
    password: Option<String>,
    register: bool,
) -> Result<bool> {
    if store.has_token() {
        store
            .me()
            .context("the supplied token was rejected; issue a new one")?;
        return Ok(false);
    }

    let (Some(username), Some(password)) = (username, password) else {
        bail!(
            "not logged in: pass --token, or --username and --password \
             (DAYBOOK_TOKEN / DAYBOOK_USERNAME / DAYBOOK_PASSWORD)"
        );
    };
    let credentials = Credentials { username, password };
    if register {
        store.register(&credentials).context("registration failed")?;
    } else {
        store.login(&credentials).context("login failed")?;
    }
    Ok(true)
}

fn wait_for_server(store: &BlockingTaskStore) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(5);

    loop {
        if store.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!(
                "daybook-server at {} did not respond within {}s",
                store.base_url(),
                timeout.as_secs()
            );
        }
        thread::sleep(Duration::from_millis(100));
    }
}

fn run_tui(mut app: App) -> (App, Result<()>) {
    let result = (|| -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = event_loop(&mut terminal, &mut app);

        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()?;
        result
    })();

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    (app, result)
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
