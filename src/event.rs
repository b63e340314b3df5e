//! Keyboard event handling.
//!
//! Normal mode keys:
//! - `s`: start the animation for the loaded sequence
//! - `space`: pause / resume
//! - `n`: next step (step mode)
//! - `r`: reset
//! - `+` / `-`: faster / slower
//! - `?`: help
//! - `:`: enter command mode
//!   - `:dna SEQ`, `:protein SEQ`: load a sequence
//!   - `:run`, `:speed MS`, `:mode auto|step`, `:strategy NAME`
//!   - `:progress`: show learner progress
//!   - `:quiz PHASE SCORE TOTAL`: record a quiz result
//!   - `:reset-progress`: clear learner progress
//!   - `:q` or `:quit`: quit the application
//!   - `:h` or `:help`: show help

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use std::time::Duration;

use crate::model::{AppMode, AppState};

/// Actions that can be triggered by keyboard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// No action (key not recognized)
    None,
    /// Quit the application
    Quit,
    Start,
    TogglePause,
    Step,
    Reset,
    Faster,
    Slower,
    ShowHelp,
    /// Dismiss the help overlay
    DismissHelp,
    /// Enter command mode
    EnterCommandMode,
    /// Add character to command buffer
    CommandChar(char),
    /// Execute current command
    ExecuteCommand,
    /// Cancel command mode
    CancelCommand,
    /// Backspace in command mode
    CommandBackspace,
    /// Resize event (terminal resized)
    Resize(u16, u16),
}

/// Polls for keyboard events with a timeout.
///
/// Returns `None` if no event occurred within the timeout.
pub fn poll_event(timeout: Duration) -> Option<Event> {
    if event::poll(timeout).ok()? {
        event::read().ok()
    } else {
        None
    }
}

/// Converts a crossterm event to an Action based on current app mode.
pub fn handle_event(event: Event, mode: &AppMode, show_help: bool) -> Action {
    match event {
        Event::Key(key_event) => handle_key_event(key_event, mode, show_help),
        Event::Resize(width, height) => Action::Resize(width, height),
        _ => Action::None,
    }
}

fn handle_key_event(key: KeyEvent, mode: &AppMode, show_help: bool) -> Action {
    // Ctrl+C quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    // If help is shown, any key dismisses it
    if show_help {
        return Action::DismissHelp;
    }

    match mode {
        AppMode::Normal => handle_normal_mode(key),
        AppMode::Command(_) => handle_command_mode(key),
    }
}

fn handle_normal_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('s') => Action::Start,
        KeyCode::Char(' ') => Action::TogglePause,
        KeyCode::Char('n') | KeyCode::Right => Action::Step,
        KeyCode::Char('r') => Action::Reset,
        KeyCode::Char('+') | KeyCode::Char('=') => Action::Faster,
        KeyCode::Char('-') => Action::Slower,
        KeyCode::Char('?') => Action::ShowHelp,
        KeyCode::Char(':') => Action::EnterCommandMode,
        _ => Action::None,
    }
}

/// Handles key events in command mode.
fn handle_command_mode(key: KeyEvent) -> Action {
    match key.code {
        KeyCode::Enter => Action::ExecuteCommand,
        KeyCode::Esc => Action::CancelCommand,
        KeyCode::Backspace => Action::CommandBackspace,
        KeyCode::Char(c) => Action::CommandChar(c),
        _ => Action::None,
    }
}

/// Applies an action to the application state.
///
/// Returns `true` if the application should continue, `false` if it should quit.
pub fn apply_action(state: &mut AppState, action: Action) -> bool {
    match action {
        Action::None => {}
        Action::Quit => {
            state.should_quit = true;
        }
        Action::Start => state.start(),
        Action::TogglePause => state.toggle_pause(),
        Action::Step => state.step(),
        Action::Reset => state.reset(),
        Action::Faster => state.faster(),
        Action::Slower => state.slower(),
        Action::ShowHelp => state.show_help(),
        Action::DismissHelp => state.dismiss_help(),
        Action::EnterCommandMode => {
            state.enter_command_mode();
        }
        Action::CommandChar(c) => {
            state.command_input(c);
        }
        Action::ExecuteCommand => {
            state.execute_command();
        }
        Action::CancelCommand => {
            state.cancel_command();
        }
        Action::CommandBackspace => {
            state.command_backspace();
        }
        Action::Resize(_, _) => {
            // Resize is handled in the main loop with actual terminal dimensions
        }
    }

    !state.should_quit
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_playback_keys() {
        let mode = AppMode::Normal;
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &mode, false), Action::Start);
        assert_eq!(handle_key_event(key(KeyCode::Char(' ')), &mode, false), Action::TogglePause);
        assert_eq!(handle_key_event(key(KeyCode::Char('n')), &mode, false), Action::Step);
        assert_eq!(handle_key_event(key(KeyCode::Char('r')), &mode, false), Action::Reset);
        assert_eq!(handle_key_event(key(KeyCode::Char('+')), &mode, false), Action::Faster);
        assert_eq!(handle_key_event(key(KeyCode::Char('-')), &mode, false), Action::Slower);
        assert_eq!(handle_key_event(key(KeyCode::Char('?')), &mode, false), Action::ShowHelp);
    }

    #[test]
    fn test_enter_command_mode() {
        let mode = AppMode::Normal;
        assert_eq!(
            handle_key_event(key(KeyCode::Char(':')), &mode, false),
            Action::EnterCommandMode
        );
    }

    #[test]
    fn test_command_mode_input() {
        let mode = AppMode::Command(String::new());

        // Playback keys are plain text while typing a command
        assert_eq!(handle_key_event(key(KeyCode::Char('s')), &mode, false), Action::CommandChar('s'));
        assert_eq!(handle_key_event(key(KeyCode::Enter), &mode, false), Action::ExecuteCommand);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, false), Action::CancelCommand);
        assert_eq!(handle_key_event(key(KeyCode::Backspace), &mode, false), Action::CommandBackspace);
    }

    #[test]
    fn test_ctrl_c_quit() {
        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Normal, false), Action::Quit);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Command("dna".into()), false), Action::Quit);
        assert_eq!(handle_key_event(ctrl_c, &AppMode::Normal, true), Action::Quit);
    }

    #[test]
    fn test_dismiss_help() {
        let mode = AppMode::Normal;
        // Any key when help is shown should dismiss help
        assert_eq!(handle_key_event(key(KeyCode::Char('x')), &mode, true), Action::DismissHelp);
        assert_eq!(handle_key_event(key(KeyCode::Esc), &mode, true), Action::DismissHelp);
    }

    #[test]
    fn test_resize() {
        assert_eq!(
            handle_event(Event::Resize(80, 24), &AppMode::Normal, false),
            Action::Resize(80, 24)
        );
    }
}
