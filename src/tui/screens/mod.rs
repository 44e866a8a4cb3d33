//! # Screens
//!
//! Concrete [`Screen`](super::screen::Screen) implementations. The four tabs
//! each own a root screen; book detail is pushed on top of any of them, and
//! the review and progress editors on top of book detail.
//! Setup lives outside the stack and is owned by the controller directly.

pub mod book_detail;
pub mod home;
pub mod lists;
pub mod progress;
pub mod review;
pub mod search;
pub mod setup;
pub mod stats;

use ratatui::style::Color;

use crate::api::{DataError, ReadingStatus};

use super::screen::Screen;

pub use book_detail::BookDetailScreen;
pub use home::HomeScreen;
pub use lists::ListsScreen;
pub use progress::ProgressScreen;
pub use review::ReviewScreen;
pub use search::SearchScreen;
pub use setup::SetupScreen;
pub use stats::StatsScreen;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    Search,
    Lists,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Home, Tab::Search, Tab::Lists, Tab::Stats];
    pub const LABELS: [&'static str; 4] = ["Home", "Search", "Lists", "Stats"];

    pub fn index(self) -> usize {
        match self {
            Tab::Home => 0,
            Tab::Search => 1,
            Tab::Lists => 2,
            Tab::Stats => 3,
        }
    }

    pub fn from_index(index: usize) -> Tab {
        Self::ALL[index % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        Self::LABELS[self.index()]
    }

    pub fn next(self) -> Tab {
        Self::from_index(self.index() + 1)
    }

    pub fn prev(self) -> Tab {
        Self::from_index(self.index() + Self::ALL.len() - 1)
    }

    /// Parses `home`, `search`, `lists`, `stats` (any case).
    pub fn parse(name: &str) -> Option<Tab> {
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(name.trim()))
    }

    /// A fresh root screen for this tab.
    pub fn screen(self) -> Box<dyn Screen> {
        match self {
            Tab::Home => Box::new(HomeScreen::new()),
            Tab::Search => Box::new(SearchScreen::new()),
            Tab::Lists => Box::new(ListsScreen::new()),
            Tab::Stats => Box::new(StatsScreen::new()),
        }
    }
}

/// User-facing wording for a failed command.
pub fn describe(error: &DataError) -> String {
    match error {
        DataError::Timeout => "Request timed out. Press r to retry.".to_string(),
        DataError::RateLimited => "Rate limited by the server. Try again shortly.".to_string(),
        DataError::Unauthorized(_) => "Your token was rejected.".to_string(),
        DataError::Network(_) => "Could not reach the server.".to_string(),
        other => other.to_string(),
    }
}

pub fn status_color(status: Option<ReadingStatus>) -> Color {
    match status {
        Some(ReadingStatus::WantToRead) => Color::Blue,
        Some(ReadingStatus::CurrentlyReading) => Color::Yellow,
        Some(ReadingStatus::Read) => Color::Green,
        Some(ReadingStatus::Paused) => Color::Magenta,
        Some(ReadingStatus::DidNotFinish) => Color::Red,
        Some(ReadingStatus::Ignored) | None => Color::DarkGray,
    }
}

/// `★★★½☆` style bar for a 0-5 rating.
pub fn rating_stars(rating: f64) -> String {
    let clamped = rating.clamp(0.0, 5.0);
    let full = clamped.floor() as usize;
    let half = clamped - clamped.floor() >= 0.5;
    let empty = 5 - full - usize::from(half);
    format!("{}{}{}", "★".repeat(full), if half { "½" } else { "" }, "☆".repeat(empty))
}

/// Moves `index` by `delta` within `len`, wrapping at both ends.
pub fn wrap_index(index: usize, delta: isize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_cycle_wraps() {
        assert_eq!(Tab::Stats.next(), Tab::Home);
        assert_eq!(Tab::Home.prev(), Tab::Stats);
        assert_eq!(Tab::parse(" LISTS "), Some(Tab::Lists));
        assert_eq!(Tab::parse("profile"), None);
    }

    #[test]
    fn test_rating_stars() {
        assert_eq!(rating_stars(3.5), "★★★½☆");
        assert_eq!(rating_stars(5.0), "★★★★★");
        assert_eq!(rating_stars(0.0), "☆☆☆☆☆");
        assert_eq!(rating_stars(9.0), "★★★★★");
    }

    #[test]
    fn test_wrap_index() {
        assert_eq!(wrap_index(0, -1, 3), 2);
        assert_eq!(wrap_index(2, 1, 3), 0);
        assert_eq!(wrap_index(1, 1, 3), 2);
        assert_eq!(wrap_index(0, 1, 0), 0);
    }

    #[test]
    fn test_describe_timeout() {
        assert!(describe(&DataError::Timeout).contains("timed out"));
    }
}
