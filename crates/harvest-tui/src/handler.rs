use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

use crate::app::{App, FocusPane, InputMode};
use crate::tui::AppEvent;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub fn handle_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick_animation(),
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    match (app.input_mode, app.focus) {
        (InputMode::Editing, FocusPane::Composer) => handle_composer_editing(app, key),
        (InputMode::Editing, FocusPane::History) => handle_search_editing(app, key),
        (InputMode::Editing, FocusPane::Conversation) => app.input_mode = InputMode::Normal,
        (InputMode::Normal, _) => handle_normal_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Tab => app.focus = app.focus.next(),
        KeyCode::Char('i') => {
            app.focus = FocusPane::Composer;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('/') => {
            app.focus = FocusPane::History;
            app.input_mode = InputMode::Editing;
        }
        KeyCode::Char('n') => app.new_chat(),
        KeyCode::Char('c') => app.copy_answer(),
        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::History => app.history_nav_down(),
            FocusPane::Conversation => app.scroll_down(),
            FocusPane::Composer => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::History => app.history_nav_up(),
            FocusPane::Conversation => app.scroll_up(),
            FocusPane::Composer => {}
        },
        KeyCode::Enter => match app.focus {
            FocusPane::History => app.open_highlighted(),
            FocusPane::Composer => app.input_mode = InputMode::Editing,
            FocusPane::Conversation => {}
        },
        KeyCode::Esc => {
            if !app.view.search.is_empty() {
                app.view.search.clear();
                app.on_search_changed();
            }
        }
        _ => {}
    }
}

fn handle_composer_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.submit_question();
        }
        KeyCode::Backspace => {
            if app.query_cursor > 0 {
                app.query_cursor -= 1;
                let byte_pos = char_to_byte_index(app.view.question(), app.query_cursor);
                app.view.question_mut().remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.view.question().chars().count();
            if app.query_cursor < char_count {
                let byte_pos = char_to_byte_index(app.view.question(), app.query_cursor);
                app.view.question_mut().remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.query_cursor = app.query_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.view.question().chars().count();
            app.query_cursor = (app.query_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.query_cursor = 0;
        }
        KeyCode::End => {
            app.query_cursor = app.view.question().chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(app.view.question(), app.query_cursor);
            app.view.question_mut().insert(byte_pos, c);
            app.query_cursor += 1;
        }
        _ => {}
    }
}

fn handle_search_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.view.search.pop();
            app.on_search_changed();
        }
        KeyCode::Char(c) => {
            app.view.search.push(c);
            app.on_search_changed();
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let (x, y) = (mouse.column, mouse.row);
    let in_history = app.history_area.is_some_and(|r| point_in_rect(x, y, r));
    let in_conversation = app.conversation_area.is_some_and(|r| point_in_rect(x, y, r));

    match mouse.kind {
        MouseEventKind::ScrollDown if in_history => app.history_nav_down(),
        MouseEventKind::ScrollDown if in_conversation => {
            app.conversation_scroll = app.conversation_scroll.saturating_add(3);
        }
        MouseEventKind::ScrollUp if in_history => app.history_nav_up(),
        MouseEventKind::ScrollUp if in_conversation => {
            app.conversation_scroll = app.conversation_scroll.saturating_sub(3);
        }
        _ => {}
    }
}
