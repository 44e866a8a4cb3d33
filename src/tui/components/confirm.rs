//! # Confirmation Dialog
//!
//! A yes/no prompt any owner can embed. The owner picks what happens on
//! "yes" through the action tag `A` (an enum of its own), so one dialog type
//! serves logout, delete-list, and remove-from-list alike.
//!
//! Cursor starts on **No**. Keys:
//!
//! | key                      | effect                  | returns         |
//! |--------------------------|-------------------------|-----------------|
//! | `esc`                    | close                   | `(false, true)` |
//! | `up` `k` `left` `h`      | cursor → Yes            | `(false, true)` |
//! | `down` `j` `right` `l`   | cursor → No             | `(false, true)` |
//! | `y`                      | close                   | `(true, true)`  |
//! | `n`                      | close                   | `(false, true)` |
//! | `enter`                  | close                   | `(cursor == Yes, true)` |
//! | anything else            | swallowed               | `(false, true)` |

use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Widget, Wrap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
}

#[derive(Debug, Clone)]
pub struct ConfirmDialog<A> {
    active: bool,
    message: String,
    action: Option<A>,
    cursor: Choice,
}

impl<A> Default for ConfirmDialog<A> {
    fn default() -> Self {
        Self {
            active: false,
            message: String::new(),
            action: None,
            cursor: Choice::No,
        }
    }
}

impl<A: Clone> ConfirmDialog<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self, message: impl Into<String>, action: A) {
        self.active = true;
        self.message = message.into();
        self.action = Some(action);
        self.cursor = Choice::No;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn cursor(&self) -> Choice {
        self.cursor
    }

    /// The tag the dialog was opened with. Still readable after it closes,
    /// so the owner can act on a confirmed result.
    pub fn action(&self) -> Option<A> {
        self.action.clone()
    }

    /// Returns `(confirmed, handled)`.
    pub fn handle_key(&mut self, key: &str) -> (bool, bool) {
        match key {
            "esc" | "n" => {
                self.active = false;
                (false, true)
            }
            "up" | "k" | "left" | "h" => {
                self.cursor = Choice::Yes;
                (false, true)
            }
            "down" | "j" | "right" | "l" => {
                self.cursor = Choice::No;
                (false, true)
            }
            "y" => {
                self.active = false;
                (true, true)
            }
            "enter" => {
                self.active = false;
                (self.cursor == Choice::Yes, true)
            }
            _ => (false, true),
        }
    }
}

/// Transient render wrapper for a confirmation panel.
pub struct ConfirmPanel<'a> {
    pub message: &'a str,
    pub cursor: Choice,
}

impl<'a> ConfirmPanel<'a> {
    pub fn new<A>(dialog: &'a ConfirmDialog<A>) -> Self {
        Self {
            message: &dialog.message,
            cursor: dialog.cursor,
        }
    }

    /// Panel width for a given screen width, clamped to 30..=50.
    pub fn width(screen_width: u16) -> u16 {
        (screen_width / 2).clamp(30, 50)
    }

    pub const HEIGHT: u16 = 9;
}

impl Widget for ConfirmPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let selected = |bg: Color| {
            Style::default()
                .fg(Color::Black)
                .bg(bg)
                .add_modifier(Modifier::BOLD)
        };
        let idle = Style::default().fg(Color::DarkGray);
        let (yes, no) = match self.cursor {
            Choice::Yes => (selected(Color::Red), idle),
            Choice::No => (idle, selected(Color::Green)),
        };

        let lines = vec![
            Line::from(self.message.to_string()),
            Line::default(),
            Line::from(vec![
                Span::styled("  Yes  ", yes),
                Span::raw("  "),
                Span::styled("  No  ", no),
            ]),
            Line::default(),
            Line::styled(
                "y/n | enter: confirm | esc: cancel",
                Style::default().fg(Color::DarkGray),
            ),
        ];

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow))
            .title(" Confirm ")
            .padding(Padding::horizontal(1));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(block)
            .render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::overlay::render_panel;

    #[derive(Debug, Clone, PartialEq)]
    enum Act {
        Delete(i64),
    }

    fn open() -> ConfirmDialog<Act> {
        let mut d = ConfirmDialog::new();
        d.open("Delete list?", Act::Delete(3));
        d
    }

    #[test]
    fn test_opens_on_no() {
        let d = open();
        assert!(d.is_active());
        assert_eq!(d.cursor(), Choice::No);
        assert_eq!(d.action(), Some(Act::Delete(3)));
    }

    #[test]
    fn test_esc_cancels() {
        let mut d = open();
        assert_eq!(d.handle_key("esc"), (false, true));
        assert!(!d.is_active());
    }

    #[test]
    fn test_y_confirms() {
        let mut d = open();
        assert_eq!(d.handle_key("y"), (true, true));
        assert!(!d.is_active());
        assert_eq!(d.action(), Some(Act::Delete(3)));
    }

    #[test]
    fn test_arrows_move_without_resolving() {
        let mut d = open();
        assert_eq!(d.handle_key("left"), (false, true));
        assert!(d.is_active());
        assert_eq!(d.cursor(), Choice::Yes);
        assert_eq!(d.handle_key("j"), (false, true));
        assert!(d.is_active());
        assert_eq!(d.cursor(), Choice::No);
    }

    #[test]
    fn test_enter_follows_cursor() {
        let mut d = open();
        assert_eq!(d.handle_key("enter"), (false, true));

        let mut d = open();
        d.handle_key("k");
        assert_eq!(d.handle_key("enter"), (true, true));
    }

    #[test]
    fn test_other_keys_swallowed() {
        let mut d = open();
        assert_eq!(d.handle_key("q"), (false, true));
        assert!(d.is_active());
    }

    #[test]
    fn test_panel_renders_message_and_buttons() {
        let d = open();
        let buf = render_panel(ConfirmPanel::new(&d), 40, ConfirmPanel::HEIGHT);
        let text: String = buf.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Confirm"));
        assert!(text.contains("Delete list?"));
        assert!(text.contains("Yes"));
        assert!(text.contains("No"));
    }

    #[test]
    fn test_panel_width_clamped() {
        assert_eq!(ConfirmPanel::width(40), 30);
        assert_eq!(ConfirmPanel::width(80), 40);
        assert_eq!(ConfirmPanel::width(200), 50);
    }
}
