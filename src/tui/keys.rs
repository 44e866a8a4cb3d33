//! Key names and bindings.
//!
//! Crossterm key events are flattened into short names (`"ctrl+c"`,
//! `"shift+tab"`, `"esc"`, `"k"`, `"F"`). Screens and modals match on these,
//! which keeps their key handling testable without building `KeyEvent`s.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Flattens a key event into its binding name.
pub fn key_name(key: &KeyEvent) -> String {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let base = match key.code {
        KeyCode::Char(c) if ctrl => format!("ctrl+{}", c.to_ascii_lowercase()),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "shift+tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::F(n) => format!("f{n}"),
        _ => String::new(),
    };

    if alt && !base.is_empty() {
        format!("alt+{base}")
    } else {
        base
    }
}

/// A key binding with its help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub keys: &'static [&'static str],
    /// What the help bar shows for the key, e.g. `"j/k"`.
    pub label: &'static str,
    pub help: &'static str,
}

impl KeyBinding {
    pub const fn new(keys: &'static [&'static str], label: &'static str, help: &'static str) -> Self {
        Self { keys, label, help }
    }

    pub fn matches(&self, key: &str) -> bool {
        self.keys.contains(&key)
    }
}

pub const FORCE_QUIT: KeyBinding = KeyBinding::new(&["ctrl+c"], "ctrl+c", "quit");
pub const QUIT: KeyBinding = KeyBinding::new(&["q"], "q", "quit");
pub const BACK: KeyBinding = KeyBinding::new(&["esc"], "esc", "back");
pub const HELP: KeyBinding = KeyBinding::new(&["?"], "?", "help");
pub const LOGOUT: KeyBinding = KeyBinding::new(&["ctrl+q"], "ctrl+q", "logout");
pub const NEXT_TAB: KeyBinding = KeyBinding::new(&["tab"], "tab", "next tab");
pub const PREV_TAB: KeyBinding = KeyBinding::new(&["shift+tab"], "shift+tab", "prev tab");
pub const TAB_KEYS: KeyBinding = KeyBinding::new(&["1", "2", "3", "4"], "1-4", "switch tab");

pub const GLOBAL: [KeyBinding; 6] = [TAB_KEYS, NEXT_TAB, BACK, HELP, LOGOUT, QUIT];

pub const UP: KeyBinding = KeyBinding::new(&["up", "k"], "↑/k", "up");
pub const DOWN: KeyBinding = KeyBinding::new(&["down", "j"], "↓/j", "down");
pub const SELECT: KeyBinding = KeyBinding::new(&["enter"], "enter", "open");

/// Single printable character carried by a key name, if any.
pub fn printable(key: &str) -> Option<char> {
    let mut chars = key.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_control() => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEvent;

    fn ev(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_key_names() {
        assert_eq!(key_name(&ev(KeyCode::Char('c'), KeyModifiers::CONTROL)), "ctrl+c");
        assert_eq!(key_name(&ev(KeyCode::Char('F'), KeyModifiers::SHIFT)), "F");
        assert_eq!(key_name(&ev(KeyCode::BackTab, KeyModifiers::SHIFT)), "shift+tab");
        assert_eq!(key_name(&ev(KeyCode::Esc, KeyModifiers::NONE)), "esc");
        assert_eq!(key_name(&ev(KeyCode::Char(' '), KeyModifiers::NONE)), " ");
        assert_eq!(key_name(&ev(KeyCode::Char('x'), KeyModifiers::ALT)), "alt+x");
    }

    #[test]
    fn test_binding_matches_any_key() {
        assert!(UP.matches("k"));
        assert!(UP.matches("up"));
        assert!(!UP.matches("j"));
        assert!(TAB_KEYS.matches("3"));
    }

    #[test]
    fn test_printable() {
        assert_eq!(printable("a"), Some('a'));
        assert_eq!(printable(" "), Some(' '));
        assert_eq!(printable("é"), Some('é'));
        assert_eq!(printable("enter"), None);
        assert_eq!(printable(""), None);
    }
}
