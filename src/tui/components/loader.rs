//! # Loading Overlay
//!
//! Shown in the content area while the top screen has not loaded yet. A
//! block bounces across the middle third of the area with a reading quote
//! under it. Driven by the animation tick; `frame` advances once per draw.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Clear, Paragraph};

use crate::tui::component::Component;

const QUOTES: &[&str] = &[
    "So many books, so little time.",
    "Books are a uniquely portable magic.",
    "Reading is dreaming with open eyes.",
    "One more chapter...",
    "There is no friend as loyal as a book.",
    "A book is a dream you hold in your hands.",
    "I have always imagined paradise as a library.",
    "We read to know we are not alone.",
    "Today a reader, tomorrow a leader.",
    "Books are the quietest friends.",
    "Lost in a good book...",
    "Turning pages, turning worlds.",
    "Let the story unfold...",
];

const SPRITES: [&str; 4] = ["█", "▓", "▒", "░"];
const SPRITE_LEN: usize = 5;
/// Frames for one sweep across and back.
const PERIOD: usize = 40;

#[derive(Debug, Default)]
pub struct Loader {
    active: bool,
    frame: usize,
    quote: usize,
    starts: usize,
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts (or restarts) the animation with the next quote.
    pub fn start(&mut self) {
        self.active = true;
        self.frame = 0;
        self.quote = self.starts % QUOTES.len();
        self.starts += 1;
    }

    pub fn stop(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn tick(&mut self) {
        if self.active {
            self.frame = self.frame.wrapping_add(1);
        }
    }

    pub fn quote(&self) -> &'static str {
        QUOTES[self.quote % QUOTES.len()]
    }

    /// Column of the sprite inside a track of `width` cells.
    fn column(&self, width: usize) -> usize {
        let track = width.saturating_sub(SPRITE_LEN);
        let half = PERIOD / 2;
        let phase = self.frame % PERIOD;
        let pos = if phase < half { phase } else { PERIOD - phase };
        track * pos / half
    }
}

impl Component for Loader {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        frame.render_widget(Clear, area);

        let [bar_area, _, quote_area] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .flex(Flex::Center)
        .areas(area);

        let [_, track, _] = Layout::horizontal([
            Constraint::Percentage(30),
            Constraint::Percentage(40),
            Constraint::Percentage(30),
        ])
        .areas(bar_area);

        let sprite = SPRITES[(self.frame / 8) % SPRITES.len()].repeat(SPRITE_LEN);
        let bar = format!("{}{}", " ".repeat(self.column(track.width as usize)), sprite);
        frame.render_widget(
            Paragraph::new(Line::styled(bar, Style::default().fg(Color::Cyan))),
            track,
        );
        frame.render_widget(
            Paragraph::new(Line::styled(self.quote(), Style::default().fg(Color::DarkGray)))
                .alignment(Alignment::Center),
            quote_area,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_bounces_within_track() {
        let mut loader = Loader::new();
        loader.start();
        let mut seen_end = false;
        for _ in 0..(PERIOD * 2) {
            let col = loader.column(25);
            assert!(col <= 20);
            seen_end |= col == 20;
            loader.tick();
        }
        assert!(seen_end);
        assert_eq!(loader.column(3), 0);
    }

    #[test]
    fn test_restart_rotates_quote() {
        let mut loader = Loader::new();
        loader.start();
        let first = loader.quote();
        loader.stop();
        loader.start();
        assert_ne!(first, loader.quote());
        assert!(loader.is_active());
    }

    #[test]
    fn test_tick_is_noop_when_stopped() {
        let mut loader = Loader::new();
        loader.tick();
        assert_eq!(loader.frame, 0);
    }
}
