//! # Chrome
//!
//! The fixed rows around the content area: tab bar on top, breadcrumb under
//! it, help bar at the bottom. All three are stateless props components.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ 1 Home  2 Search  3 Lists  4 Stats                 │  TabBar
//! │ Home › Dune                                        │  Breadcrumb
//! │                                                    │
//! │                (screen content)                    │
//! │                                                    │
//! │ f filter  enter open  ? help  q quit    @reader PRO│  HelpBar
//! └────────────────────────────────────────────────────┘
//! ```

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

use crate::tui::component::Component;
use crate::tui::keys::{self, KeyBinding};

pub struct TabBar<'a> {
    pub tabs: &'a [&'a str],
    pub active: usize,
}

impl Component for TabBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::with_capacity(self.tabs.len() * 2);
        for (i, label) in self.tabs.iter().enumerate() {
            let text = format!(" {} {} ", i + 1, label);
            let style = if i == self.active {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(text, style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

pub struct Breadcrumb<'a> {
    pub titles: Vec<&'a str>,
}

impl Component for Breadcrumb<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let last = self.titles.len().saturating_sub(1);
        let mut spans = Vec::new();
        for (i, title) in self.titles.iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" › ", Style::default().fg(Color::DarkGray)));
            }
            let style = if i == last {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            spans.push(Span::styled(title.to_string(), style));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }
}

pub struct HelpBar<'a> {
    /// Screen-specific bindings, shown before the global ones.
    pub bindings: &'a [KeyBinding],
    pub username: Option<&'a str>,
    pub pro: bool,
    /// Expanded help: every binding, one per row.
    pub full: bool,
}

impl HelpBar<'_> {
    /// Rows the help bar needs at this size.
    pub fn height(bindings: usize, full: bool) -> u16 {
        if full {
            (bindings + keys::GLOBAL.len()) as u16 + 1
        } else {
            1
        }
    }

    fn all(&self) -> impl Iterator<Item = &KeyBinding> {
        self.bindings.iter().chain(keys::GLOBAL.iter())
    }

    fn badge(&self) -> Vec<Span<'static>> {
        let Some(name) = self.username else {
            return Vec::new();
        };
        let mut spans = vec![Span::styled(
            format!("@{name}"),
            Style::default().fg(Color::Cyan),
        )];
        if self.pro {
            spans.push(Span::raw(" "));
            spans.push(Span::styled(
                " PRO ",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ));
        }
        spans
    }
}

impl Component for HelpBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let key_style = Style::default().fg(Color::Cyan);
        let help_style = Style::default().fg(Color::DarkGray);
        let badge = self.badge();
        let badge_width: usize = badge.iter().map(|s| s.content.width()).sum();

        if self.full {
            let mut lines: Vec<Line> = self
                .all()
                .map(|b| {
                    Line::from(vec![
                        Span::styled(format!("{:>10}  ", b.label), key_style),
                        Span::styled(b.help, help_style),
                    ])
                })
                .collect();
            lines.push(Line::from(badge));
            frame.render_widget(Paragraph::new(lines), area);
            return;
        }

        let [left, right] = Layout::horizontal([
            Constraint::Min(0),
            Constraint::Length(badge_width as u16),
        ])
        .areas(area);

        let mut spans = Vec::new();
        for b in self.all() {
            spans.push(Span::styled(b.label, key_style));
            spans.push(Span::raw(" "));
            spans.push(Span::styled(b.help, help_style));
            spans.push(Span::raw("  "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), left);
        frame.render_widget(Paragraph::new(Line::from(badge)), right);
    }
}
