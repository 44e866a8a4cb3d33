use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};

use crate::core::debounce::DebounceToken;
use crate::core::scheduler::{CommandResult, Origin};

use super::keys::key_name;

/// Everything the event loop reacts to, in arrival order.
#[derive(Debug)]
pub enum AppEvent {
    /// A key press, already flattened to its binding name.
    Key(String),
    /// Bracketed paste; only delivered to a focused text input.
    Paste(String),
    Resize(u16, u16),
    /// A command finished (or timed out).
    Command(CommandResult),
    /// A debounce delay elapsed.
    Settled { origin: Origin, token: DebounceToken },
}

impl From<CommandResult> for AppEvent {
    fn from(result: CommandResult) -> Self {
        AppEvent::Command(result)
    }
}

/// Poll the terminal for up to `timeout`.
pub fn poll_terminal(timeout: Duration) -> io::Result<Option<AppEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    Ok(match event::read()? {
        // Release/repeat events show up with keyboard enhancement enabled
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            let name = key_name(&key);
            log::debug!("Key event: {:?} -> {:?}", key.code, name);
            (!name.is_empty()).then_some(AppEvent::Key(name))
        }
        Event::Resize(w, h) => Some(AppEvent::Resize(w, h)),
        Event::Paste(text) => Some(AppEvent::Paste(text)),
        _ => None,
    })
}

/// Poll without blocking.
pub fn poll_terminal_immediate() -> io::Result<Option<AppEvent>> {
    poll_terminal(Duration::ZERO)
}
