//! Key bindings.
//!
//! Physical keys are resolved into [`Message`]s once, at the input boundary.
//! Only key presses count; repeats and releases are dropped.

use super::Message;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// One-line key help shown in the status bar
pub const KEY_HELP: &str = "↑↓/jk move  ←→/hl/Tab section  e expand  Space send  ^Q quit";

pub fn map_event(event: &Event) -> Option<Message> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => map_key(key),
        _ => None,
    }
}

pub fn map_key(key: &KeyEvent) -> Option<Message> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('q') | KeyCode::Char('c') => Some(Message::Quit),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
        KeyCode::Left | KeyCode::Char('h') | KeyCode::BackTab => Some(Message::MoveLeft),
        KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => Some(Message::MoveRight),
        KeyCode::Char('e') => Some(Message::Expand),
        KeyCode::Char(' ') | KeyCode::Enter => Some(Message::AwaitRequest),
        _ => None,
    }
}
