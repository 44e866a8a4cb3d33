//! Navigation stack.
//!
//! Ordered screens, top is interactive. Once the main UI is up the stack is
//! never empty: `pop` at depth 1 is a no-op, and the only way to replace the
//! root is [`NavigationStack::reset_to`], which clears and pushes in one step.

use log::{debug, info};

use crate::core::scheduler::ScreenId;

use super::screen::Screen;

pub struct Entry {
    pub id: ScreenId,
    pub title: String,
    pub screen: Box<dyn Screen>,
}

#[derive(Default)]
pub struct NavigationStack {
    entries: Vec<Entry>,
    next_id: u64,
}

impl NavigationStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: impl Into<String>, screen: Box<dyn Screen>) -> ScreenId {
        self.next_id += 1;
        let id = ScreenId(self.next_id);
        let title = title.into();
        info!("Push {} '{}' (depth {})", id, title, self.entries.len() + 1);
        self.entries.push(Entry { id, title, screen });
        id
    }

    /// Removes the top screen. Returns false (and does nothing) at depth ≤ 1.
    pub fn pop(&mut self) -> bool {
        if self.entries.len() <= 1 {
            debug!("Pop ignored at depth {}", self.entries.len());
            return false;
        }
        if let Some(entry) = self.entries.pop() {
            info!("Pop {} '{}'", entry.id, entry.title);
        }
        true
    }

    pub fn clear(&mut self) {
        if !self.entries.is_empty() {
            debug!("Clearing {} screens", self.entries.len());
        }
        self.entries.clear();
    }

    /// Clear, then push. Used for tab switches.
    pub fn reset_to(&mut self, title: impl Into<String>, screen: Box<dyn Screen>) -> ScreenId {
        self.clear();
        self.push(title, screen)
    }

    pub fn top(&self) -> Option<&Entry> {
        self.entries.last()
    }

    pub fn top_mut(&mut self) -> Option<&mut Entry> {
        self.entries.last_mut()
    }

    pub fn get_mut(&mut self, id: ScreenId) -> Option<&mut Entry> {
        self.entries.iter_mut().find(|e| e.id == id)
    }

    pub fn contains(&self, id: ScreenId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.entries.iter_mut()
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Breadcrumb titles, bottom to top.
    pub fn summary(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.title.as_str()).collect()
    }
}
