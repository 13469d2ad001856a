//! Terminal User Interface for qtop.
//!
//! A single control thread does everything: it rebuilds the snapshot
//! (blocking on each scheduler query in turn) and runs a bounded input poll
//! between redraws. A refresh therefore blocks input handling for its full
//! duration; a wedged scheduler stalls the interface. There is no second
//! thread, so the snapshot needs no locking - the old value stays readable
//! until the rebuild completes and is swapped in.

pub mod app;
pub mod event;
pub mod layout;
pub mod theme;
pub mod ui;

use std::io::{self, IsTerminal, stdout};
use std::time::Duration;

use anyhow::{Result, bail};
use crossterm::{
    event::{Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;

use crate::models::TopConfig;
use crate::slurm::QueueSource;
use crate::tui::app::{App, CHROME_LINES};
use crate::tui::event::{EventResult, KeyAction};

/// Terminal capability requirements for TUI mode
#[derive(Debug)]
pub struct TerminalCapabilities {
    pub is_tty: bool,
    pub term_type: String,
    pub supports_alternate_screen: bool,
}

impl TerminalCapabilities {
    /// Detect terminal capabilities
    pub fn detect() -> Self {
        let is_tty = stdout().is_terminal();
        let term_type = std::env::var("TERM").unwrap_or_default();

        // Check for known problematic terminals
        let supports_alternate_screen = !matches!(term_type.as_str(), "dumb" | "" | "unknown");

        Self {
            is_tty,
            term_type,
            supports_alternate_screen,
        }
    }

    /// Check if terminal is suitable for TUI mode
    pub fn is_suitable(&self) -> bool {
        self.is_tty && self.supports_alternate_screen
    }

    /// Get error message for unsuitable terminal
    pub fn error_message(&self) -> String {
        if !self.is_tty {
            "TUI mode requires an interactive terminal (stdout is not a TTY).\n\
             Hint: Use 'qtop --once' for non-interactive output instead."
                .to_string()
        } else {
            format!(
                "Terminal type '{}' may not support TUI mode.\n\
                 Hint: Set TERM to a supported value (e.g., xterm-256color) or use --once.",
                if self.term_type.is_empty() {
                    "(unset)"
                } else {
                    &self.term_type
                }
            )
        }
    }
}

/// Run the TUI application.
///
/// The only fatal condition is failing to initialize the terminal; query
/// failures degrade to empty views.
pub fn run(username: String, config: TopConfig, source: &dyn QueueSource) -> Result<()> {
    let capabilities = TerminalCapabilities::detect();
    if !capabilities.is_suitable() {
        bail!("{}", capabilities.error_message());
    }

    let mut terminal = setup_terminal()?;

    let mut app = App::new(username, config);
    // Initial snapshot blocks before the first frame, like any refresh
    app.refresh(source);

    let result = run_loop(&mut terminal, &mut app, source);

    restore_terminal(&mut terminal)?;
    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    source: &dyn QueueSource,
) -> Result<()> {
    let poll_interval = Duration::from_millis(app.config.input.poll_ms);
    let mut needs_redraw = true;

    while app.running {
        if needs_redraw {
            let size = terminal.size()?;
            app.visible_rows = (size.height as usize).saturating_sub(CHROME_LINES);
            app.clamp_scroll();
            terminal.draw(|frame| ui::render(app, frame))?;
            needs_redraw = false;
        }

        if crossterm::event::poll(poll_interval)? {
            match crossterm::event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    let action = KeyAction::from_key_event(key);
                    match app.handle_action(action, source) {
                        EventResult::Continue => needs_redraw = true,
                        EventResult::Unchanged => {}
                        EventResult::Quit => break,
                    }
                }
                Event::Resize(_, _) => needs_redraw = true,
                _ => {}
            }
        } else if app.feedback.is_some() && app.current_feedback().is_none() {
            // The export toast expired; clear it on the next frame
            app.feedback = None;
            needs_redraw = true;
        }
    }

    Ok(())
}

/// Setup the terminal for TUI mode
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

/// Restore the terminal to normal mode
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
