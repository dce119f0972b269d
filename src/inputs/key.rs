// inputs/key.rs

use std::fmt::{self, Display, Formatter};

use crossterm::event;

/// Represents a key.
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug)]
pub enum Key {
    Char(char),
    Ctrl(char),
    /// Function key, `F(5)` is F5
    F(u8),
    Unknown,
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            Key::Char(' ') => write!(f, "<Space>"),
            Key::Char(c) => write!(f, "<{}>", c),
            Key::Ctrl(' ') => write!(f, "<Ctrl+Space>"),
            Key::Ctrl(c) => write!(f, "<Ctrl+{}>", c),
            Key::F(n) => write!(f, "<F{}>", n),
            _ => write!(f, "<{:?}>", self),
        }
    }
}

// convert backend KeyEvent to this crate's Key
impl From<event::KeyEvent> for Key {
    fn from(key_event: event::KeyEvent) -> Self {
        match key_event {
            event::KeyEvent {
                code: event::KeyCode::F(n),
                ..
            } => Key::F(n),
            // No action is bound to Alt, keep <Alt+q> from quitting
            event::KeyEvent {
                code: event::KeyCode::Char(_),
                modifiers: event::KeyModifiers::ALT,
                ..
            } => Key::Unknown,
            event::KeyEvent {
                code: event::KeyCode::Char(c),
                modifiers: event::KeyModifiers::CONTROL,
                ..
            } => Key::Ctrl(c),
            event::KeyEvent {
                code: event::KeyCode::Char(c),
                ..
            } => Key::Char(c),

            _ => Key::Unknown,
        }
    }
}
