//! HoosStudying CLI - binary entry point and terminal session management.
//!
//! # Event Loop
//!
//! One frame loop drives everything:
//!
//! 1. Wait for the frame tick
//! 2. Drain the input queue (non-blocking)
//! 3. Advance application state (`app.tick()`)
//! 4. Apply settled chat round trips
//! 5. Render
//!
//! Sign-in runs as its own small loop before the application exists; an
//! authentication rejection mid-session tears the app down and returns
//! there.

use std::fs::{self, OpenOptions};
use std::io::{Stdout, stdout};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use hoos_config::Config;
use hoos_core::{App, Bootstrap, Command};
use hoos_gateway::{Gateway, Identity, Session};
use hoos_tui::auth::{AuthAction, AuthForm, AuthMode};
use hoos_tui::theme::Palette;
use hoos_tui::{Outcome, Ui};

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::try_new("warn").expect("warn filter is valid"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::info!(path = %path.display(), "Logging initialized");
        return;
    }

    // Without a log file, prefer "no logs" over corrupting the TUI by
    // writing to stdout.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, std::fs::File)> {
    let dir = Config::path()?.parent()?.join("logs");
    fs::create_dir_all(&dir).ok()?;
    let path = dir.join("hoos.log");
    let file = OpenOptions::new().create(true).append(true).open(&path).ok()?;
    Some((path, file))
}

/// RAII wrapper restoring the terminal on drop, panics included.
struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut out = stdout();
        if let Err(err) = execute!(out, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(err.into());
        }
        let terminal = match Terminal::new(CrosstermBackend::new(out)) {
            Ok(terminal) => terminal,
            Err(err) => {
                let _ = disable_raw_mode();
                let _ = execute!(stdout(), LeaveAlternateScreen);
                return Err(err.into());
            }
        };
        Ok(Self { terminal })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

enum RunResult {
    Quit,
    SignedOut,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Config error: {err}");
            std::process::exit(1);
        }
    };
    let palette = Palette::standard(config.ui.ascii_only);
    let gateway = Gateway::new(&config);
    let mut identity = Identity::new(config.identity.clone());
    // Held for the life of the process; dropping it is the unsubscribe.
    let _auth_state = identity.subscribe();

    let mut session = TerminalSession::new()?;
    loop {
        let Some(signed_in) =
            run_auth(&mut session.terminal, &mut identity, &gateway, &palette).await?
        else {
            break;
        };

        let app = App::new(gateway.clone(), signed_in.session, signed_in.bootstrap);
        match run_app(&mut session.terminal, app, &mut identity, &palette).await? {
            RunResult::Quit => break,
            RunResult::SignedOut => {
                identity.sign_out();
                tracing::info!("Session ended; returning to sign-in");
            }
        }
    }

    Ok(())
}

struct SignedIn {
    session: Session,
    bootstrap: Bootstrap,
}

const FRAME_DURATION: Duration = Duration::from_millis(33);

/// The unauthenticated loop. Returns `None` on quit.
async fn run_auth(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    identity: &mut Identity,
    gateway: &Gateway,
    palette: &Palette,
) -> Result<Option<SignedIn>> {
    let mut form = AuthForm::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        frames.tick().await;

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match hoos_tui::auth::handle_key(&mut form, key) {
                    AuthAction::Quit => return Ok(None),
                    AuthAction::Submit => {
                        form.busy = true;
                        form.error = None;
                        terminal.draw(|frame| hoos_tui::auth::draw(frame, &form, palette))?;

                        let email = form.email.value.trim().to_string();
                        let result = match form.mode {
                            AuthMode::SignIn => {
                                identity.sign_in(&email, &form.password.value).await
                            }
                            AuthMode::SignUp => {
                                identity.sign_up(&email, &form.password.value).await
                            }
                        };
                        match result {
                            Ok(session) => match Bootstrap::load(gateway, &session).await {
                                Ok(bootstrap) => {
                                    return Ok(Some(SignedIn { session, bootstrap }));
                                }
                                Err(err) => {
                                    tracing::warn!("Bootstrap failed: {err}");
                                    form.error =
                                        Some("Could not reach the chat service".to_string());
                                }
                            },
                            Err(err) => form.error = Some(err.to_string()),
                        }
                        form.busy = false;
                        form.password.value.clear();
                    }
                    AuthAction::None => {}
                }
            }
        }

        terminal.draw(|frame| hoos_tui::auth::draw(frame, &form, palette))?;
    }
}

/// The signed-in loop.
async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut app: App,
    identity: &mut Identity,
    palette: &Palette,
) -> Result<RunResult> {
    let mut ui = Ui::new();
    let mut frames = tokio::time::interval(FRAME_DURATION);
    frames.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        frames.tick().await;

        if identity.needs_refresh() {
            match identity.refresh().await {
                Ok(session) => app.set_session(session),
                Err(err) => {
                    tracing::warn!("Token refresh failed: {err}");
                    return Ok(RunResult::SignedOut);
                }
            }
        }

        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                match hoos_tui::handle_key(&mut ui, &app, key) {
                    Outcome::Quit => return Ok(RunResult::Quit),
                    Outcome::Command(command) => app.dispatch(command).await,
                    Outcome::Upload(path) => upload(&mut app, path).await,
                    Outcome::None => {}
                }
            }
        }

        app.tick();
        app.process_chat_outcomes();
        if app.take_signed_out() {
            return Ok(RunResult::SignedOut);
        }

        ui.sync(&app);
        terminal.draw(|frame| hoos_tui::draw(frame, &app, &ui, palette))?;
    }
}

/// Read the chosen file and hand its bytes to the upload operation.
async fn upload(app: &mut App, path: std::path::PathBuf) {
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            app.dispatch(Command::UploadDocument { file_name, bytes }).await;
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "Failed to read upload: {err}");
            app.notify_error(format!("Could not read {file_name}"));
        }
    }
}
