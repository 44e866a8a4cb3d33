//! Toast stack, drawn top-right over everything else.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use unicode_width::UnicodeWidthStr;

use crate::core::notify::{Level, Notification};
use crate::tui::overlay::{self, Anchor};

const MAX_WIDTH: u16 = 48;

fn color(level: Level) -> Color {
    match level {
        Level::Info => Color::Blue,
        Level::Success => Color::Green,
        Level::Warning => Color::Yellow,
        Level::Error => Color::Red,
    }
}

pub struct Toast<'a> {
    pub notification: &'a Notification,
}

impl Toast<'_> {
    pub fn width(&self, screen_width: u16) -> u16 {
        let content = u16::try_from(self.notification.message.width())
            .unwrap_or(MAX_WIDTH)
            .saturating_add(6);
        content.min(MAX_WIDTH).min(screen_width.saturating_sub(2)).max(10)
    }
}

impl Widget for Toast<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Clear.render(area, buf);
        let level = self.notification.level;
        let line = Line::from(vec![
            Span::styled(format!("{} ", level.icon()), Style::default().fg(color(level))),
            Span::raw(self.notification.message.clone()),
        ]);
        Paragraph::new(line)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color(level))),
            )
            .render(area, buf);
    }
}

/// Paints each toast under the previous one, newest at the bottom.
pub fn paint_toasts<'a>(
    toasts: impl Iterator<Item = &'a Notification>,
    buf: &mut Buffer,
    area: Rect,
) {
    let mut y = area.y;
    for notification in toasts {
        if y + 3 > area.bottom() {
            break;
        }
        let toast = Toast { notification };
        let width = toast.width(area.width);
        let panel = overlay::render_panel(toast, width, 3);
        let slot = Rect::new(area.x, y, area.width, area.bottom() - y);
        overlay::paint(&panel, buf, slot, Anchor::TopRight);
        y += 3;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn note(level: Level, message: &str) -> Notification {
        Notification {
            level,
            message: message.to_string(),
            expires_at: Instant::now(),
        }
    }

    #[test]
    fn test_toasts_stack_top_right() {
        let area = Rect::new(0, 0, 60, 12);
        let mut buf = Buffer::empty(area);
        let notes = [note(Level::Success, "Saved"), note(Level::Error, "Failed")];
        paint_toasts(notes.iter(), &mut buf, area);

        let row = |y: u16| -> String {
            (0..area.width)
                .map(|x| buf.cell((x, y)).map(|c| c.symbol()).unwrap_or(" "))
                .collect()
        };
        assert!(row(2).contains("Saved"));
        assert!(row(5).contains("Failed"));
        // Left half stays untouched
        assert!(row(2).starts_with("          "));
    }

    #[test]
    fn test_toast_width_bounds() {
        let long = note(Level::Info, &"x".repeat(200));
        assert_eq!(Toast { notification: &long }.width(120), MAX_WIDTH);
        let short = note(Level::Info, "ok");
        assert_eq!(Toast { notification: &short }.width(120), 10);
    }

    #[test]
    fn test_toast_width_saturates_past_u16() {
        for len in [65_530, 65_536, 70_000] {
            let huge = note(Level::Error, &"y".repeat(len));
            assert_eq!(Toast { notification: &huge }.width(120), MAX_WIDTH, "len {len}");
        }
    }
}
