//! Folio library exports for testing

use clap::ValueEnum;

pub mod api;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Tab to open after sign-in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StartTab {
    Home,
    Search,
    Lists,
    Stats,
}

impl StartTab {
    pub fn name(self) -> &'static str {
        match self {
            StartTab::Home => "home",
            StartTab::Search => "search",
            StartTab::Lists => "lists",
            StartTab::Stats => "stats",
        }
    }
}
