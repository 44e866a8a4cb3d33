//! # TUI Adapter
//!
//! The ratatui-specific layer: terminal modes, the event loop, the root
//! controller and every screen. This is the only module that knows about
//! ratatui and crossterm.
//!
//! ## Event Loop
//!
//! One synchronous loop owns all UI state. Background work (API commands,
//! debounce timers) runs on tokio and reports back over an `mpsc` channel;
//! the loop drains that channel after each terminal poll, so every state
//! change happens on this thread, one event at a time.
//!
//! ## Redraw Strategy
//!
//! - **Animating** (loading bar, visible toasts): draws every ~80ms.
//! - **Idle**: sleeps up to 500ms and only redraws after an event.

pub mod app;
pub mod component;
pub mod components;
pub mod event;
pub mod keys;
pub mod navigation;
pub mod overlay;
pub mod screen;
pub mod screens;

use std::io::stdout;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::cursor::Hide;
use crossterm::event::{
    DisableBracketedPaste, EnableBracketedPaste, KeyboardEnhancementFlags,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use log::{debug, info};

use crate::api::DataSource;
use crate::core::config::ResolvedConfig;
use crate::core::credentials::CredentialStore;

use app::App;
use event::{poll_terminal, poll_terminal_immediate};

const ANIMATION_POLL: Duration = Duration::from_millis(80);
const IDLE_POLL: Duration = Duration::from_millis(500);

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        // Disambiguated escape codes let `esc` and `ctrl+q` arrive as distinct
        // keys; terminals without the protocol ignore the request.
        execute!(
            stdout(),
            EnableBracketedPaste,
            Hide,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
            )
        )?;
        info!("Terminal modes enabled (bracketed paste, keyboard enhancement)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), PopKeyboardEnhancementFlags, DisableBracketedPaste);
    }
}

/// Runs the UI until the user quits. Must be called from within a tokio
/// runtime; commands are spawned onto it.
pub fn run(
    source: Arc<dyn DataSource>,
    store: Box<dyn CredentialStore>,
    config: ResolvedConfig,
) -> std::io::Result<()> {
    info!("Starting UI against {} source", source.name());
    let (tx, rx) = mpsc::channel();
    let mut app = App::new(source, store, Arc::new(config), tx);

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    let size = terminal.size()?;
    app.handle_event(event::AppEvent::Resize(size.width, size.height));
    app.initialize();

    let mut needs_redraw = true;
    let result = loop {
        let animating = app.is_animating();
        if animating {
            app.tick();
            needs_redraw = true;
        }

        if needs_redraw {
            if let Err(e) = terminal.draw(|f| app.draw(f)) {
                break Err(e);
            }
            needs_redraw = false;
        }

        let timeout = if animating { ANIMATION_POLL } else { IDLE_POLL };
        let first = match poll_terminal(timeout) {
            Ok(first) => first,
            Err(e) => break Err(e),
        };

        // Terminal input first, then everything background tasks posted
        let mut pending = Vec::new();
        pending.extend(first);
        loop {
            match poll_terminal_immediate() {
                Ok(Some(event)) => pending.push(event),
                Ok(None) => break,
                Err(e) => {
                    debug!("Terminal poll failed while draining: {}", e);
                    break;
                }
            }
        }
        pending.extend(rx.try_iter());

        if !pending.is_empty() {
            needs_redraw = true;
        }
        for event in pending {
            app.handle_event(event);
            if app.should_quit() {
                break;
            }
        }
        if app.should_quit() {
            info!("Shutting down");
            break Ok(());
        }
    };

    ratatui::restore();
    result
}
