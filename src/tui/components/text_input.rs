//! # Text Input
//!
//! Single-line editable field used by the setup token prompt and the search
//! box. Cursor is a char index, so multi-byte input edits correctly.
//! With `masked` set the value renders as bullets.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::keys::printable;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Changed,
    Submit(String),
}

#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    pub masked: bool,
    pub placeholder: String,
    pub focused: bool,
}

impl TextInput {
    pub fn new(placeholder: impl Into<String>) -> Self {
        Self {
            placeholder: placeholder.into(),
            focused: true,
            ..Default::default()
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the value, cursor at the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor = self.len();
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Inserts pasted text, dropping newlines.
    pub fn paste(&mut self, text: &str) {
        for c in text.chars().filter(|c| !c.is_control()) {
            self.insert(c);
        }
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_index();
        self.value.insert(at, c);
        self.cursor += 1;
    }

    fn len(&self) -> usize {
        self.value.chars().count()
    }

    fn display(&self) -> String {
        if self.masked {
            "•".repeat(self.len())
        } else {
            self.value.clone()
        }
    }
}

impl EventHandler for TextInput {
    type Event = InputEvent;

    fn handle_key(&mut self, key: &str) -> Option<InputEvent> {
        match key {
            "enter" => Some(InputEvent::Submit(self.value.trim().to_string())),
            "backspace" => {
                if self.cursor == 0 {
                    return None;
                }
                self.cursor -= 1;
                let at = self.byte_index();
                self.value.remove(at);
                Some(InputEvent::Changed)
            }
            "delete" => {
                if self.cursor >= self.len() {
                    return None;
                }
                let at = self.byte_index();
                self.value.remove(at);
                Some(InputEvent::Changed)
            }
            "left" => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            "right" => {
                self.cursor = (self.cursor + 1).min(self.len());
                None
            }
            "home" | "ctrl+a" => {
                self.cursor = 0;
                None
            }
            "end" | "ctrl+e" => {
                self.cursor = self.len();
                None
            }
            "ctrl+u" => {
                self.clear();
                Some(InputEvent::Changed)
            }
            _ => {
                let c = printable(key)?;
                self.insert(c);
                Some(InputEvent::Changed)
            }
        }
    }
}

impl Component for TextInput {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = if self.value.is_empty() {
            Line::from(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(self.display())
        };
        frame.render_widget(Paragraph::new(line), area);

        if self.focused {
            let shown = self.display();
            let before: String = shown.chars().take(self.cursor).collect();
            let x = area.x + (before.width() as u16).min(area.width.saturating_sub(1));
            frame.set_cursor_position(Position::new(x, area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn typed(text: &str) -> TextInput {
        let mut input = TextInput::new("");
        for c in text.chars() {
            input.handle_key(&c.to_string());
        }
        input
    }

    #[test]
    fn test_typing_and_submit_trims() {
        let mut input = typed(" dune ");
        assert_eq!(input.value(), " dune ");
        assert_eq!(
            input.handle_key("enter"),
            Some(InputEvent::Submit("dune".into()))
        );
    }

    #[test]
    fn test_editing_mid_string() {
        let mut input = typed("dne");
        input.handle_key("left");
        input.handle_key("left");
        input.handle_key("u");
        assert_eq!(input.value(), "dune");
        input.handle_key("end");
        input.handle_key("backspace");
        assert_eq!(input.value(), "dun");
        input.handle_key("home");
        input.handle_key("delete");
        assert_eq!(input.value(), "un");
    }

    #[test]
    fn test_multibyte_backspace() {
        let mut input = typed("café");
        input.handle_key("backspace");
        assert_eq!(input.value(), "caf");
    }

    #[test]
    fn test_named_keys_not_inserted() {
        let mut input = typed("a");
        assert_eq!(input.handle_key("tab"), None);
        assert_eq!(input.handle_key("ctrl+q"), None);
        assert_eq!(input.value(), "a");
    }

    #[test]
    fn test_paste_drops_newlines() {
        let mut input = TextInput::new("");
        input.paste("tok\nen\r\n");
        assert_eq!(input.value(), "token");
    }

    #[test]
    fn test_masked_render_hides_value() {
        let mut input = typed("secret").masked();
        let mut terminal = Terminal::new(TestBackend::new(20, 1)).unwrap();
        terminal.draw(|f| input.render(f, f.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(!text.contains("secret"));
        assert!(text.contains("••••••"));
    }
}
