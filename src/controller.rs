//! Application controller.
//!
//! This module orchestrates the main application loop:
//! - Terminal initialization and cleanup
//! - Key handling and session polling on a 50 ms tick
//! - Rendering

use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use crate::event::{apply_action, handle_event, poll_event, Action};
use crate::model::AppState;
use crate::ui::{calculate_text_width, render};

/// The main application controller.
pub struct App {
    /// Terminal backend
    terminal: Terminal<CrosstermBackend<Stdout>>,
    /// Application state
    state: AppState,
    /// Event poll timeout
    tick_rate: Duration,
}

impl App {
    /// Creates a new application with the given state.
    pub fn new(state: AppState) -> Result<Self> {
        // Setup terminal
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(Self {
            terminal,
            state,
            tick_rate: Duration::from_millis(50),
        })
    }

    /// Runs the main application loop.
    pub fn run(&mut self) -> Result<()> {
        self.update_text_width()?;

        loop {
            self.state.tick(Instant::now());

            self.terminal.draw(|frame| {
                render(frame, &self.state);
            })?;

            if let Some(event) = poll_event(self.tick_rate) {
                let action = handle_event(event, &self.state.mode, self.state.show_help);

                if let Action::Resize(_, _) = action {
                    self.update_text_width()?;
                }

                if !apply_action(&mut self.state, action) {
                    break;
                }
            }
        }

        // Stop driver threads before the terminal is restored
        self.state.session.reset();
        Ok(())
    }

    fn update_text_width(&mut self) -> Result<()> {
        let size = self.terminal.size()?;
        self.state.summary_width = calculate_text_width(size.width);
        Ok(())
    }
}

impl Drop for App {
    fn drop(&mut self) {
        // Restore terminal
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Runs the interactive simulator. If `autostart` is set and a sequence is
/// loaded, the animation starts right away.
pub fn run_app(mut state: AppState, autostart: bool) -> Result<()> {
    if autostart && state.session.input().is_some() {
        state.start();
    }
    let mut app = App::new(state)?;
    app.run()
}
