//! Toast notifications.
//!
//! Every entry carries its own expiry; pruning one never touches another.
//! Time comes from `tokio::time::Instant` so tests can pause the clock.

use std::collections::VecDeque;
use std::time::Duration;

use log::debug;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    pub fn icon(self) -> &'static str {
        match self {
            Level::Info => "i",
            Level::Success => "✓",
            Level::Warning => "!",
            Level::Error => "✗",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub expires_at: Instant,
}

#[derive(Debug)]
pub struct Notifications {
    queue: VecDeque<Notification>,
    ttl: Duration,
}

impl Notifications {
    pub fn new(ttl: Duration) -> Self {
        Self {
            queue: VecDeque::new(),
            ttl,
        }
    }

    pub fn post(&mut self, level: Level, message: impl Into<String>) {
        let message = message.into();
        debug!("Toast {:?}: {}", level, message);
        self.queue.push_back(Notification {
            level,
            message,
            expires_at: Instant::now() + self.ttl,
        });
    }

    /// Drops expired entries. Returns true if anything was removed.
    pub fn prune(&mut self) -> bool {
        let now = Instant::now();
        let before = self.queue.len();
        self.queue.retain(|n| n.expires_at > now);
        self.queue.len() != before
    }

    /// Oldest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    pub fn is_active(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_independently() {
        let mut toasts = Notifications::new(Duration::from_secs(3));
        toasts.post(Level::Success, "Status updated");
        tokio::time::advance(Duration::from_secs(2)).await;
        toasts.post(Level::Error, "Rating failed");

        tokio::time::advance(Duration::from_millis(999)).await;
        assert!(!toasts.prune());
        assert_eq!(toasts.len(), 2);

        tokio::time::advance(Duration::from_millis(2)).await;
        assert!(toasts.prune());
        let remaining: Vec<_> = toasts.visible().map(|n| n.message.as_str()).collect();
        assert_eq!(remaining, vec!["Rating failed"]);

        tokio::time::advance(Duration::from_secs(2)).await;
        toasts.prune();
        assert!(!toasts.is_active());
    }

    #[test]
    fn test_level_icons_are_distinct() {
        let icons = [Level::Info, Level::Success, Level::Warning, Level::Error].map(Level::icon);
        for (i, a) in icons.iter().enumerate() {
            for b in &icons[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
