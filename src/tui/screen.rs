//! # Screen Contract
//!
//! Every page that can sit on the navigation stack implements [`Screen`].
//! A screen never performs I/O or touches the controller directly: it
//! returns [`Effect`]s and the controller carries them out.
//!
//! ```text
//!  controller ──ScreenEvent──▶ screen.handle_event() ──▶ Vec<Effect>
//!                                                           │
//!        Command ─▶ Scheduler     Debounce ─▶ timer         │
//!        Notify  ─▶ toasts        Navigate ─▶ push / pop  ◀─┘
//! ```
//!
//! Optional capabilities are default methods: `set_size`, `input_focused`,
//! `loaded`, `help_bindings`. The controller consults them at fixed points
//! (resize, key routing, after each delivered event, when drawing chrome).

use std::sync::Arc;
use std::time::Duration;

use crate::api::{Credential, DataSource, GqlRequest, User};
use crate::core::config::{ResolvedConfig, Timeouts};
use crate::core::debounce::DebounceToken;
use crate::core::notify::Level;
use crate::core::scheduler::{Command, CommandKind, CommandResult};

use super::component::Component;
use super::keys::KeyBinding;

/// What a screen receives from the controller.
#[derive(Debug)]
pub enum ScreenEvent {
    Key(String),
    Paste(String),
    /// A result for a command this screen scheduled.
    Result(CommandResult),
    /// A debounce this screen armed has elapsed.
    Settled(DebounceToken),
}

/// Where the user wants to go next.
#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    OpenBook {
        book_id: i64,
        title: String,
        /// Set when opened from a list, so the book can be removed from it.
        from_list: Option<ListMembership>,
    },
    /// Edit the review on a library entry.
    WriteReview {
        user_book_id: i64,
        title: String,
        draft: Option<String>,
    },
    UpdateProgress {
        read_id: i64,
        title: String,
        current: Option<i64>,
        total: Option<i64>,
    },
    Back,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListMembership {
    pub list_book_id: i64,
    pub list_name: String,
}

/// Data families a screen can tell the rest of the stack are out of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Library,
    Lists,
}

/// Side effects a screen asks the controller to perform.
#[derive(Debug)]
pub enum Effect {
    Command(Command),
    /// Post `Settled(token)` back to this screen after the delay.
    Debounce(DebounceToken, Duration),
    Notify(Level, String),
    Navigate(Navigation),
    /// Every screen on the stack gets `invalidated(topic)`.
    Invalidate(Topic),
    /// Setup accepted a token and loaded its profile.
    Authenticated { credential: Credential, user: User },
}

impl Effect {
    pub fn notify(level: Level, message: impl Into<String>) -> Self {
        Effect::Notify(level, message.into())
    }
}

/// Read-only context a screen builds commands from.
///
/// The credential is a snapshot taken when the event is dispatched. Commands
/// capture it by value, so a logout or a new token only affects commands
/// scheduled afterwards.
#[derive(Clone)]
pub struct ScreenContext {
    pub source: Arc<dyn DataSource>,
    pub credential: Credential,
    pub user: User,
    pub config: Arc<ResolvedConfig>,
}

impl ScreenContext {
    pub fn timeouts(&self) -> Timeouts {
        self.config.timeouts
    }

    /// A command that runs `request` against the data source.
    pub fn fetch(&self, kind: CommandKind, timeout: Duration, request: GqlRequest) -> Command {
        let source = Arc::clone(&self.source);
        let credential = self.credential.clone();
        Command::new(kind, timeout, async move {
            source.query(&credential, &request).await
        })
    }

    pub fn primary(&self, kind: CommandKind, request: GqlRequest) -> Command {
        self.fetch(kind, self.config.timeouts.primary, request)
    }

    pub fn enrichment(&self, kind: CommandKind, request: GqlRequest) -> Command {
        self.fetch(kind, self.config.timeouts.enrichment, request)
    }

    pub fn image(&self, kind: CommandKind, request: GqlRequest) -> Command {
        self.fetch(kind, self.config.timeouts.image, request)
    }
}

pub trait Screen: Component {
    /// Breadcrumb title.
    fn title(&self) -> String;

    /// Called once, right after the screen is pushed.
    fn init(&mut self, ctx: &ScreenContext) -> Vec<Effect>;

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect>;

    /// Re-fetch in place (same-tab reselect).
    fn reload(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.init(ctx)
    }

    /// Another screen changed data this one may be showing.
    fn invalidated(&mut self, _ctx: &ScreenContext, _topic: Topic) -> Vec<Effect> {
        Vec::new()
    }

    /// Content area size, excluding chrome.
    fn set_size(&mut self, _width: u16, _height: u16) {}

    /// True while a text field wants raw keys before global shortcuts.
    fn input_focused(&self) -> bool {
        false
    }

    /// False until the first fetch lands; the loading overlay covers it.
    fn loaded(&self) -> bool {
        true
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        Vec::new()
    }
}
