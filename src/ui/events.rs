//! Event handling and key bindings

use super::app::{App, InputMode, Pane};
use crate::sync::SyncService;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind};

/// Handle all user input events. Returns whether the event was consumed.
pub fn handle_events(event: Event, app: &mut App, sync_service: &SyncService) -> bool {
    if let Event::Key(key) = event {
        if key.kind == KeyEventKind::Press {
            // Input line captures everything while open
            if app.input_mode != InputMode::Normal {
                return handle_input_mode(key, app, sync_service);
            }

            // Logs dialog blocks all other shortcuts
            if app.show_logs {
                return handle_logs_dialog(key, app);
            }

            return handle_normal_mode(key, app, sync_service);
        }
    }
    false
}

fn handle_input_mode(key: KeyEvent, app: &mut App, sync_service: &SyncService) -> bool {
    match key.code {
        KeyCode::Enter => {
            app.submit_input(sync_service);
            true
        }
        KeyCode::Esc => {
            app.cancel_input();
            true
        }
        KeyCode::Backspace => {
            app.input.pop();
            true
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.input.push(c);
            true
        }
        _ => false,
    }
}

fn handle_logs_dialog(key: KeyEvent, app: &mut App) -> bool {
    match key.code {
        KeyCode::Esc | KeyCode::Char('G' | 'q') => {
            app.show_logs = false;
            true
        }
        _ => false,
    }
}

fn handle_normal_mode(key: KeyEvent, app: &mut App, sync_service: &SyncService) -> bool {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('j') | KeyCode::Down => app.move_selection(1, sync_service),
        KeyCode::Char('k') | KeyCode::Up => app.move_selection(-1, sync_service),
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('a') => app.begin_add(),
        KeyCode::Char('e') => app.begin_edit(),
        KeyCode::Char('d') if app.focus == Pane::Projects => app.begin_edit_description(),
        KeyCode::Char(' ') if app.focus == Pane::Todos => app.toggle_selected_todo(sync_service),
        KeyCode::Char('x') | KeyCode::Delete => app.delete_selected(sync_service),
        KeyCode::Char('r') => app.start_sync(sync_service),
        KeyCode::Char('G') => app.show_logs = true,
        _ => return false,
    }
    true
}
