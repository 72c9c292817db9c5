//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, AppState, Focus};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> bool {
    // Handle help overlay
    if matches!(app.state, AppState::ShowingHelp) {
        app.state = AppState::Normal;
        return false;
    }

    // Handle quit confirmation
    if matches!(app.state, AppState::ConfirmingQuit) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Quitting;
                return true;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Handle remove confirmation
    if matches!(app.state, AppState::ConfirmingRemove) {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                app.state = AppState::Normal;
                app.remove_selected();
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                app.state = AppState::Normal;
            }
            _ => {}
        }
        return false;
    }

    // Global keys
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::F(1) => {
            app.state = AppState::ShowingHelp;
            return false;
        }
        KeyCode::Char('q') if ctrl => {
            app.state = AppState::ConfirmingQuit;
            return false;
        }
        KeyCode::Char('s') if ctrl => {
            app.save_form();
            return false;
        }
        KeyCode::F(2) => {
            match app.focus {
                Focus::Form => app.focus_list(),
                Focus::List => app.focus_form(),
            }
            return false;
        }
        _ => {}
    }

    match app.focus {
        Focus::Form => handle_form_input(app, key),
        Focus::List => handle_list_input(app, key),
    }
    false
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Tab | KeyCode::Down => app.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.prev_field(),
        KeyCode::Enter => {
            if app.field_focus == cepbook_core::FormField::Cep {
                app.search();
            } else {
                app.next_field();
            }
        }
        KeyCode::Esc => app.clear_form(),
        KeyCode::Backspace => app.delete_char(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => app.type_char(c),
        _ => {}
    }
}

fn handle_list_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_remove(),
        KeyCode::Esc | KeyCode::Tab => app.focus_form(),
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        _ => {}
    }
}
