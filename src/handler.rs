use anyhow::Result;
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

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => {
            app.poll_responses().await;
            app.tick_animation();
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The rename editor captures everything while open
    if app.rename_input.is_some() {
        handle_rename_editing(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_message_editing(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Tab cycles: Sidebar -> Input -> Chat -> Sidebar
        KeyCode::Tab => {
            app.focus = match app.focus {
                FocusPane::Sidebar => FocusPane::Input,
                FocusPane::Input => FocusPane::Chat,
                FocusPane::Chat => FocusPane::Sidebar,
            };
            if app.focus == FocusPane::Input {
                app.input_mode = InputMode::Editing;
                app.message_cursor = app.message_input.chars().count();
            }
        }

        // Jump straight to the message input
        KeyCode::Char('i') | KeyCode::Char('/') => {
            app.focus = FocusPane::Input;
            app.input_mode = InputMode::Editing;
            app.message_cursor = app.message_input.chars().count();
        }

        // Conversation management
        KeyCode::Char('n') => app.new_conversation(),
        KeyCode::Char('t') => app.toggle_dark_mode(),

        KeyCode::Char('j') | KeyCode::Down => match app.focus {
            FocusPane::Sidebar => app.sidebar_down(),
            FocusPane::Chat => app.scroll_chat_down(),
            FocusPane::Input => {}
        },
        KeyCode::Char('k') | KeyCode::Up => match app.focus {
            FocusPane::Sidebar => app.sidebar_up(),
            FocusPane::Chat => app.scroll_chat_up(),
            FocusPane::Input => {}
        },

        // Move the selected conversation within the list
        KeyCode::Char('J') => {
            if app.focus == FocusPane::Sidebar {
                app.move_selected_down();
            }
        }
        KeyCode::Char('K') => {
            if app.focus == FocusPane::Sidebar {
                app.move_selected_up();
            }
        }

        KeyCode::Enter => {
            if app.focus == FocusPane::Sidebar {
                app.activate_selected();
            }
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_half_page_down();
            }
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_half_page_up();
            }
        }
        KeyCode::Char('d') => {
            if app.focus == FocusPane::Sidebar {
                app.delete_selected();
            }
        }
        KeyCode::Char('r') => {
            if app.focus == FocusPane::Sidebar {
                app.begin_rename();
            }
        }

        KeyCode::Char('g') => {
            if app.focus == FocusPane::Chat {
                app.chat_scroll = 0;
            }
        }
        KeyCode::Char('G') => {
            if app.focus == FocusPane::Chat {
                app.scroll_chat_to_bottom();
            }
        }

        _ => {}
    }
}

fn handle_message_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Sidebar;
        }
        KeyCode::Tab => {
            app.input_mode = InputMode::Normal;
            app.focus = FocusPane::Chat;
        }
        KeyCode::Enter => {
            app.send_message();
        }
        KeyCode::Backspace => {
            if app.message_cursor > 0 {
                app.message_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.message_input, app.message_cursor);
                app.message_input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.message_input.chars().count();
            if app.message_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.message_input, app.message_cursor);
                app.message_input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.message_cursor = app.message_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.message_input.chars().count();
            app.message_cursor = (app.message_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.message_cursor = 0;
        }
        KeyCode::End => {
            app.message_cursor = app.message_input.chars().count();
        }
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.message_input, app.message_cursor);
            app.message_input.insert(byte_pos, c);
            app.message_cursor += 1;
        }
        _ => {}
    }
}

fn handle_rename_editing(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.cancel_rename(),
        KeyCode::Enter => app.commit_rename(),
        KeyCode::Backspace => {
            if app.rename_cursor > 0 {
                app.rename_cursor -= 1;
                let cursor = app.rename_cursor;
                if let Some(input) = app.rename_input.as_mut() {
                    let byte_pos = char_to_byte_index(input, cursor);
                    input.remove(byte_pos);
                }
            }
        }
        KeyCode::Left => {
            app.rename_cursor = app.rename_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app
                .rename_input
                .as_deref()
                .map(|s| s.chars().count())
                .unwrap_or(0);
            app.rename_cursor = (app.rename_cursor + 1).min(char_count);
        }
        KeyCode::Char(c) => {
            let cursor = app.rename_cursor;
            if let Some(input) = app.rename_input.as_mut() {
                let byte_pos = char_to_byte_index(input, cursor);
                input.insert(byte_pos, c);
                app.rename_cursor += 1;
            }
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let x = mouse.column;
    let y = mouse.row;

    let in_sidebar = app.sidebar_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);
    let in_chat = app.chat_area.map(|r| point_in_rect(x, y, r)).unwrap_or(false);

    match mouse.kind {
        MouseEventKind::ScrollDown => {
            if in_sidebar {
                app.sidebar_down();
            } else if in_chat {
                app.scroll_chat_down();
                app.scroll_chat_down();
                app.scroll_chat_down();
            }
        }
        MouseEventKind::ScrollUp => {
            if in_sidebar {
                app.sidebar_up();
            } else if in_chat {
                app.scroll_chat_up();
                app.scroll_chat_up();
                app.scroll_chat_up();
            }
        }
        _ => {}
    }
}
