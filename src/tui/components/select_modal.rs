//! # Select Modal
//!
//! A small picker owned by a screen (reading status, star rating).
//!
//! ```text
//! Closed ──open()──▶ Open(cursor) ──esc──▶ Closed           (Cancelled)
//!                         │
//!                         └──enter──▶ Loading ──finish()──▶ Closed
//!                                    (Commit(value))
//! ```
//!
//! While `Loading` every key is swallowed until the owner sees the command
//! result and calls [`SelectModal::finish`].

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Clear, Padding, Paragraph, Widget};

use crate::tui::component::EventHandler;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectState {
    Closed,
    Open { cursor: usize },
    Loading,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SelectOutcome<T> {
    Moved,
    Cancelled,
    Commit(T),
    /// Key swallowed while open or loading.
    Blocked,
}

#[derive(Debug, Clone)]
pub struct SelectModal<T> {
    title: &'static str,
    options: Vec<(String, T)>,
    state: SelectState,
}

impl<T: Clone> SelectModal<T> {
    pub fn new(title: &'static str, options: Vec<(String, T)>) -> Self {
        Self {
            title,
            options,
            state: SelectState::Closed,
        }
    }

    pub fn open(&mut self, cursor: usize) {
        let cursor = cursor.min(self.options.len().saturating_sub(1));
        self.state = SelectState::Open { cursor };
    }

    /// Back to `Closed` once the committed command has resolved.
    pub fn finish(&mut self) {
        self.state = SelectState::Closed;
    }

    pub fn state(&self) -> SelectState {
        self.state
    }

    /// Open or loading: the modal owns input.
    pub fn is_blocking(&self) -> bool {
        self.state != SelectState::Closed
    }

    pub fn is_loading(&self) -> bool {
        self.state == SelectState::Loading
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn height(&self) -> u16 {
        self.options.len() as u16 + 4
    }
}

impl<T: Clone> EventHandler for SelectModal<T> {
    type Event = SelectOutcome<T>;

    fn handle_key(&mut self, key: &str) -> Option<SelectOutcome<T>> {
        let cursor = match self.state {
            SelectState::Closed => return None,
            SelectState::Loading => return Some(SelectOutcome::Blocked),
            SelectState::Open { cursor } => cursor,
        };
        let last = self.options.len().saturating_sub(1);

        Some(match key {
            "esc" => {
                self.state = SelectState::Closed;
                SelectOutcome::Cancelled
            }
            "up" | "k" => {
                self.state = SelectState::Open {
                    cursor: cursor.saturating_sub(1),
                };
                SelectOutcome::Moved
            }
            "down" | "j" => {
                self.state = SelectState::Open {
                    cursor: (cursor + 1).min(last),
                };
                SelectOutcome::Moved
            }
            "enter" => match self.options.get(cursor) {
                Some((_, value)) => {
                    let value = value.clone();
                    self.state = SelectState::Loading;
                    SelectOutcome::Commit(value)
                }
                None => {
                    self.state = SelectState::Closed;
                    SelectOutcome::Cancelled
                }
            },
            _ => SelectOutcome::Blocked,
        })
    }
}

/// Transient render wrapper.
pub struct SelectPanel<'a, T> {
    modal: &'a SelectModal<T>,
}

impl<'a, T> SelectPanel<'a, T> {
    pub fn new(modal: &'a SelectModal<T>) -> Self {
        Self { modal }
    }
}

impl<T> Widget for SelectPanel<'_, T> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);

        let (cursor, footer) = match self.modal.state {
            SelectState::Open { cursor } => (Some(cursor), "enter: select | esc: cancel"),
            SelectState::Loading => (None, "Saving..."),
            SelectState::Closed => (None, ""),
        };

        let mut lines: Vec<Line> = self
            .modal
            .options
            .iter()
            .enumerate()
            .map(|(i, (label, _))| {
                if Some(i) == cursor {
                    Line::styled(
                        format!("▸ {label}"),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else {
                    Line::styled(format!("  {label}"), Style::default().fg(Color::Gray))
                }
            })
            .collect();
        lines.push(Line::default());
        lines.push(Line::styled(footer, Style::default().fg(Color::DarkGray)));

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", self.modal.title))
            .padding(Padding::horizontal(1));

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
