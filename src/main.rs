//! isitonion — guess whether a headline came from The Onion or from real
//! life, in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌───────────┐ SelectMsg ┌──────────┐ Presenter ┌──────────┐ draw() ┌────────┐
//! │ select.rs │ ────────► │ game.rs  │ ────────► │  app.rs  │ ─────► │ ui.rs  │
//! │  (task)   │ ◄──────── │ (score)  │           │ (view)   │        │        │
//! └───────────┘  request  └──────────┘           └──────────┘        └────────┘
//!       │                      ▲
//!       ▼                      │ handle_key_event()
//! ┌───────────┐           ┌──────────┐
//! │ source/   │           │ input.rs │
//! │validate.rs│           └──────────┘
//! └───────────┘
//! ```
//!
//! * **`source/`** — the `ArticleSource` trait, the reddit implementation,
//!   and the `Candidate` type.
//! * **`validate`** — acceptance rules for raw records.
//! * **`select`** — the fetch/validate/retry loop, run on a tokio task.
//! * **`game`** — session score, guess scoring, phase transitions.
//! * **`tally`** — aggregate correct/incorrect counters.
//! * **`app`** / **`ui`** / **`input`** — view state, rendering, keys.
//! * **`main`** — wires everything together.

mod app;
mod config;
mod error;
mod game;
mod input;
mod logging;
mod select;
mod source;
mod tally;
mod ui;
mod validate;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use app::App;
use config::{Cli, Settings};
use game::Game;
use source::{ArticleSource, RedditSource};
use tally::{FileTally, MemoryTally, ScoreCounter};

// ---------------------------------------------------------------------------
// Terminal ownership while a game is on screen
// ---------------------------------------------------------------------------

/// Holds the terminal for the length of a game.
///
/// Raw mode lets a single `o`/`n` keypress count as a guess without Enter,
/// and the alternate screen keeps the headline board off the player's
/// scrollback. The cursor is hidden because nothing on the board takes
/// text input. Dropping the guard puts all three back.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        restore_terminal(&mut io::stdout());
        let _ = self.terminal.show_cursor();
    }
}

fn restore_terminal(out: &mut impl io::Write) {
    let _ = disable_raw_mode();
    let _ = execute!(out, LeaveAlternateScreen);
}

/// A panic inside the tick loop would otherwise print into the alternate
/// screen and vanish with it. Leave the board first, record the panic in
/// the game log, then let the default hook print to the restored shell.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal(&mut io::stdout());
        error!(panic = %info, "game crashed");
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::resolve(&cli)?;
    let _log_guard = logging::init(&settings.log_file)?;
    info!(base_url = %settings.base_url, tally = ?settings.tally, "starting");

    install_panic_hook();

    // -- selector task -------------------------------------------------------
    let runtime = tokio::runtime::Runtime::new().context("failed to start tokio runtime")?;
    let _enter = runtime.enter();

    let source: Arc<dyn ArticleSource> =
        Arc::new(RedditSource::new(&settings.base_url, settings.timeout)?);
    let cancel = CancellationToken::new();
    let mut selector = select::spawn(
        source,
        settings.rules.clone(),
        settings.retry.clone(),
        cancel.clone(),
    );

    let tally: Box<dyn ScoreCounter> = match &settings.tally {
        Some(path) => Box::new(FileTally::new(path)),
        None => Box::new(MemoryTally::default()),
    };

    // -- terminal setup (restored when the guard drops) ---------------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new();
    let mut game = Game::new(tally, selector.requests.clone());
    game.start(&mut app);

    // -- main event loop -----------------------------------------------------
    // Runs at ~10 fps (100 ms tick). Each iteration:
    //   1. Drain any messages from the selector.
    //   2. Render the UI.
    //   3. Poll for keyboard input (non-blocking, up to tick_rate).
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(msg) = selector.messages.try_recv() {
            game.on_select_msg(msg, &mut app);
        }

        guard.terminal.draw(|f| ui::draw(&app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, &mut game, key);
            }
        }

        if app.quit {
            break;
        }
    }

    // Abort any in-flight fetch before the runtime shuts down.
    cancel.cancel();
    info!(score = ?game.score(), "exiting");
    Ok(())
}
