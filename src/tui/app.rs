//! # Root Controller
//!
//! Owns everything above the screens: the phase, the session, the tab
//! selector, the navigation stack, the global key bindings, toasts and the
//! loading overlay.
//!
//! ```text
//!               stored token               profile ok
//! Bootstrapping ─────────────▶ (Profile) ─────────────▶ Active
//!       │                          │ err                  │ ctrl+q, y
//!       │ no token                 ▼                      ▼
//!       └────────────────────▶   Setup  ◀─────────────────┘
//!                                  │ Authenticated
//!                                  └──────────────▶ Active
//! ```
//!
//! ## Key routing
//!
//! 1. `ctrl+c` always quits.
//! 2. Setup phase: everything goes to the setup screen.
//! 3. The logout confirmation, while open, consumes every key.
//! 4. A top screen that reports input focus gets raw keys first.
//! 5. Global shortcuts (quit, back, help, logout, tabs).
//! 6. Whatever is left goes to the top screen, unless the loading overlay
//!    is covering it.
//!
//! ## Result routing
//!
//! Every command is scheduled with the [`Origin`] that issued it. A result
//! whose screen has since been popped finds no entry in the stack and is
//! dropped here; screens then match the narrower key (book id, list id,
//! query generation) themselves.

use std::sync::Arc;
use std::sync::mpsc;

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};

use crate::api::{Credential, DataError, DataSource, User, queries};
use crate::core::config::ResolvedConfig;
use crate::core::credentials::CredentialStore;
use crate::core::notify::{Level, Notifications};
use crate::core::scheduler::{Command, CommandKind, CommandResult, Origin, Scheduler, ScreenId};
use crate::core::session::Session;

use super::component::Component;
use super::components::chrome::{Breadcrumb, HelpBar, TabBar};
use super::components::confirm::{ConfirmDialog, ConfirmPanel};
use super::components::loader::Loader;
use super::components::toast::paint_toasts;
use super::event::AppEvent;
use super::keys::{self, KeyBinding};
use super::navigation::NavigationStack;
use super::overlay::{self, Anchor};
use super::screen::{Effect, Navigation, Screen, ScreenContext, ScreenEvent};
use super::screens::setup::decode_me;
use super::screens::{
    BookDetailScreen, ProgressScreen, ReviewScreen, SetupScreen, Tab, describe,
};

/// Origin id of the setup screen, which lives outside the stack.
pub const SETUP_ID: ScreenId = ScreenId(0);

/// Tab bar plus breadcrumb.
const HEADER_HEIGHT: u16 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    Setup,
    Active,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum GlobalAction {
    Logout,
}

pub struct App {
    phase: Phase,
    session: Session,
    source: Arc<dyn DataSource>,
    store: Box<dyn CredentialStore>,
    config: Arc<ResolvedConfig>,
    scheduler: Scheduler<AppEvent>,
    nav: NavigationStack,
    setup: Option<SetupScreen>,
    start_tab: Tab,
    tab: Tab,
    confirm: ConfirmDialog<GlobalAction>,
    notifications: Notifications,
    loader: Loader,
    show_help: bool,
    size: (u16, u16),
    profile_attempt: i64,
    should_quit: bool,
}

impl App {
    pub fn new(
        source: Arc<dyn DataSource>,
        store: Box<dyn CredentialStore>,
        config: Arc<ResolvedConfig>,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        let start_tab = config
            .start_tab
            .as_deref()
            .and_then(Tab::parse)
            .unwrap_or(Tab::Home);
        Self {
            phase: Phase::Bootstrapping,
            session: Session::default(),
            source,
            store,
            notifications: Notifications::new(config.toast_duration),
            config,
            scheduler: Scheduler::new(tx),
            nav: NavigationStack::new(),
            setup: None,
            start_tab,
            tab: start_tab,
            confirm: ConfirmDialog::new(),
            loader: Loader::new(),
            show_help: false,
            size: (80, 24),
            profile_attempt: 0,
            should_quit: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Toasts or the loading bar need regular redraws.
    pub fn is_animating(&self) -> bool {
        self.loader.is_active() || self.notifications.is_active()
    }

    /// Probes the credential store. A stored token is validated by loading the
    /// profile; without one the setup screen opens straight away.
    pub fn initialize(&mut self) {
        match self.store.load() {
            Ok(Some(credential)) => {
                info!("Found stored token, loading profile");
                self.session = Session::with_credential(credential);
                self.load_profile();
            }
            Ok(None) => {
                info!("No stored token, entering setup");
                self.enter_setup(None);
            }
            Err(e) => {
                warn!("Could not read stored token: {}", e);
                self.enter_setup(Some(format!("Could not read the stored token: {e}")));
            }
        }
    }

    fn load_profile(&mut self) {
        let Some(credential) = self.session.credential.clone() else {
            self.enter_setup(None);
            return;
        };
        self.phase = Phase::Bootstrapping;
        self.profile_attempt += 1;
        let source = Arc::clone(&self.source);
        let request = queries::me();
        let command = Command::new(
            CommandKind::Profile,
            self.config.timeouts.primary,
            async move { source.query(&credential, &request).await },
        )
        .keyed(self.profile_attempt);
        self.scheduler.schedule(Origin::Root, command);
        self.refresh_loader();
    }

    /// Advances animations and expires toasts.
    pub fn tick(&mut self) {
        self.loader.tick();
        self.notifications.prune();
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Paste(text) => self.handle_paste(text),
            AppEvent::Resize(width, height) => self.resize(width, height),
            AppEvent::Command(result) => self.route_result(result),
            AppEvent::Settled { origin, token } => {
                self.deliver(origin, ScreenEvent::Settled(token));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Context and sizing
    // ------------------------------------------------------------------------

    /// Snapshot handed to screens. Commands built from it capture the
    /// credential as it is right now.
    fn context(&self) -> ScreenContext {
        ScreenContext {
            source: Arc::clone(&self.source),
            credential: self
                .session
                .credential
                .clone()
                .unwrap_or_else(|| Credential::new("")),
            user: self.session.user.clone().unwrap_or_default(),
            config: Arc::clone(&self.config),
        }
    }

    fn top_bindings(&self) -> Vec<KeyBinding> {
        self.nav
            .top()
            .map(|e| e.screen.help_bindings())
            .unwrap_or_default()
    }

    /// Header, content, help bar.
    fn layout(&self, area: Rect) -> [Rect; 3] {
        let help = HelpBar::height(self.top_bindings().len(), self.show_help);
        Layout::vertical([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(0),
            Constraint::Length(help),
        ])
        .areas(area)
    }

    fn content_size(&self) -> (u16, u16) {
        let [_, content, _] = self.layout(Rect::new(0, 0, self.size.0, self.size.1));
        (content.width, content.height)
    }

    fn resize(&mut self, width: u16, height: u16) {
        debug!("Resize to {}x{}", width, height);
        self.size = (width, height);
        self.resize_screens();
    }

    fn resize_screens(&mut self) {
        if let Some(setup) = self.setup.as_mut() {
            setup.set_size(self.size.0, self.size.1);
        }
        let (w, h) = self.content_size();
        for entry in self.nav.iter_mut() {
            entry.screen.set_size(w, h);
        }
    }

    // ------------------------------------------------------------------------
    // Input
    // ------------------------------------------------------------------------

    fn handle_key(&mut self, key: String) {
        if keys::FORCE_QUIT.matches(&key) {
            info!("Force quit");
            self.should_quit = true;
            return;
        }
        match self.phase {
            Phase::Bootstrapping => return,
            Phase::Setup => {
                self.deliver(Origin::Screen(SETUP_ID), ScreenEvent::Key(key));
                return;
            }
            Phase::Active => {}
        }

        if self.confirm.is_active() {
            let (confirmed, _) = self.confirm.handle_key(&key);
            if confirmed && self.confirm.action() == Some(GlobalAction::Logout) {
                self.logout();
            }
            return;
        }

        let covered = self.loader.is_active();
        if !covered && self.nav.top().is_some_and(|e| e.screen.input_focused()) {
            self.deliver_top(ScreenEvent::Key(key));
            return;
        }
        if self.handle_global(&key) || covered {
            return;
        }
        self.deliver_top(ScreenEvent::Key(key));
    }

    /// Returns true when `key` was a global shortcut.
    fn handle_global(&mut self, key: &str) -> bool {
        match key {
            k if keys::QUIT.matches(k) => {
                info!("Quit requested");
                self.should_quit = true;
            }
            k if keys::BACK.matches(k) => {
                if self.nav.pop() {
                    self.refresh_loader();
                }
            }
            k if keys::HELP.matches(k) => {
                self.show_help = !self.show_help;
                self.resize_screens();
            }
            k if keys::LOGOUT.matches(k) => {
                self.confirm.open("Log out of folio?", GlobalAction::Logout);
            }
            k if keys::NEXT_TAB.matches(k) => self.switch_tab(self.tab.next()),
            k if keys::PREV_TAB.matches(k) => self.switch_tab(self.tab.prev()),
            k if keys::TAB_KEYS.matches(k) => {
                let index = k.parse::<usize>().unwrap_or(1).saturating_sub(1);
                self.switch_tab(Tab::from_index(index));
            }
            _ => return false,
        }
        true
    }

    fn handle_paste(&mut self, text: String) {
        match self.phase {
            Phase::Setup => self.deliver(Origin::Screen(SETUP_ID), ScreenEvent::Paste(text)),
            Phase::Active if !self.confirm.is_active() => {
                if self.nav.top().is_some_and(|e| e.screen.input_focused()) {
                    self.deliver_top(ScreenEvent::Paste(text));
                }
            }
            _ => {}
        }
    }

    // ------------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------------

    fn route_result(&mut self, result: CommandResult) {
        match result.origin {
            Origin::Root => self.on_profile(result),
            origin => self.deliver(origin, ScreenEvent::Result(result)),
        }
    }

    fn deliver_top(&mut self, event: ScreenEvent) {
        if let Some(id) = self.nav.top().map(|e| e.id) {
            self.deliver(Origin::Screen(id), event);
        }
    }

    /// Hands `event` to the screen that `origin` names, if it still exists.
    fn deliver(&mut self, origin: Origin, event: ScreenEvent) {
        let Origin::Screen(id) = origin else {
            return;
        };
        let ctx = self.context();
        let effects = if id == SETUP_ID {
            match self.setup.as_mut() {
                Some(setup) => setup.handle_event(&ctx, event),
                None => {
                    debug!("Setup is gone, dropping {:?}", event);
                    return;
                }
            }
        } else {
            match self.nav.get_mut(id) {
                Some(entry) => entry.screen.handle_event(&ctx, event),
                None => {
                    debug!("{} is no longer on the stack, dropping {:?}", id, event);
                    return;
                }
            }
        };
        self.apply(origin, effects);
        self.refresh_loader();
    }

    fn apply(&mut self, origin: Origin, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Command(command) => {
                    self.scheduler.schedule(origin, command);
                }
                Effect::Debounce(token, delay) => {
                    self.scheduler
                        .after(delay, AppEvent::Settled { origin, token });
                }
                Effect::Notify(level, message) => self.notifications.post(level, message),
                Effect::Navigate(Navigation::OpenBook {
                    book_id,
                    title,
                    from_list,
                }) => {
                    self.open(title, Box::new(BookDetailScreen::new(book_id, from_list)));
                }
                Effect::Navigate(Navigation::WriteReview {
                    user_book_id,
                    title,
                    draft,
                }) => {
                    let screen = ReviewScreen::new(user_book_id, title, draft);
                    self.open(screen.title(), Box::new(screen));
                }
                Effect::Navigate(Navigation::UpdateProgress {
                    read_id,
                    title,
                    current,
                    total,
                }) => {
                    let screen = ProgressScreen::new(read_id, title, current, total);
                    self.open(screen.title(), Box::new(screen));
                }
                Effect::Navigate(Navigation::Back) => {
                    if self.nav.pop() {
                        self.refresh_loader();
                    }
                }
                Effect::Invalidate(topic) => {
                    let ctx = self.context();
                    let pending: Vec<(ScreenId, Vec<Effect>)> = self
                        .nav
                        .iter_mut()
                        .filter(|e| Origin::Screen(e.id) != origin)
                        .map(|e| (e.id, e.screen.invalidated(&ctx, topic)))
                        .collect();
                    debug!("Invalidated {:?} on {} screens", topic, pending.len());
                    for (id, effects) in pending {
                        self.apply(Origin::Screen(id), effects);
                    }
                }
                Effect::Authenticated { credential, user } => {
                    self.on_authenticated(credential, user);
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    /// Pushes `screen` on top of the stack.
    fn open(&mut self, title: String, mut screen: Box<dyn Screen>) {
        let ctx = self.context();
        let (w, h) = self.content_size();
        screen.set_size(w, h);
        let effects = screen.init(&ctx);
        let id = self.nav.push(title, screen);
        self.apply(Origin::Screen(id), effects);
        self.refresh_loader();
    }

    /// Replaces the whole stack with a fresh root for `tab`.
    fn show_tab(&mut self, tab: Tab) {
        info!("Switching to {} tab", tab.label());
        self.tab = tab;
        let ctx = self.context();
        let mut screen = tab.screen();
        let (w, h) = self.content_size();
        screen.set_size(w, h);
        let effects = screen.init(&ctx);
        let id = self.nav.reset_to(tab.label(), screen);
        self.apply(Origin::Screen(id), effects);
        self.refresh_loader();
    }

    fn switch_tab(&mut self, tab: Tab) {
        if tab != self.tab || self.nav.depth() != 1 {
            self.show_tab(tab);
            return;
        }
        info!("Reloading {} tab", tab.label());
        let ctx = self.context();
        let reloaded = self
            .nav
            .top_mut()
            .map(|entry| (entry.id, entry.screen.reload(&ctx)));
        if let Some((id, effects)) = reloaded {
            self.apply(Origin::Screen(id), effects);
        }
        self.refresh_loader();
    }

    /// Shows the loading overlay while the top screen (or the profile) is
    /// still loading. Runs after every delivered event and every push/pop.
    fn refresh_loader(&mut self) {
        let waiting = match self.phase {
            Phase::Bootstrapping => true,
            Phase::Setup => false,
            Phase::Active => self.nav.top().is_some_and(|e| !e.screen.loaded()),
        };
        if waiting && !self.loader.is_active() {
            self.loader.start();
        } else if !waiting && self.loader.is_active() {
            self.loader.stop();
        }
    }

    // ------------------------------------------------------------------------
    // Session transitions
    // ------------------------------------------------------------------------

    fn enter_setup(&mut self, error: Option<String>) {
        info!("Entering setup (error: {:?})", error);
        self.phase = Phase::Setup;
        self.nav.clear();
        self.confirm = ConfirmDialog::new();
        self.setup = Some(match error {
            Some(message) => SetupScreen::with_error(message),
            None => SetupScreen::new(),
        });
        self.resize_screens();
        self.refresh_loader();
    }

    fn enter_active(&mut self) {
        self.phase = Phase::Active;
        self.setup = None;
        if let Some(name) = self.session.username() {
            let message = format!("Signed in as @{name}");
            self.notifications.post(Level::Success, message);
        }
        self.show_tab(self.start_tab);
    }

    fn on_profile(&mut self, result: CommandResult) {
        if result.kind != CommandKind::Profile || result.key != Some(self.profile_attempt) {
            debug!("Dropping stale profile result {:?}", result.key);
            return;
        }
        if self.phase != Phase::Bootstrapping {
            debug!("Profile arrived in {:?}, ignoring", self.phase);
            return;
        }
        match result.outcome.and_then(|data| decode_me(&data)) {
            Ok(user) => {
                info!("Profile loaded for @{}", user.username);
                match self.session.credential.clone() {
                    Some(credential) => {
                        self.session.sign_in(credential, user);
                        self.enter_active();
                    }
                    None => self.enter_setup(None),
                }
            }
            Err(e) => {
                warn!("Profile load failed: {}", e);
                // The stored token is kept either way; only a rejected token
                // asks for a new one outright.
                self.session.demote();
                let message = if e.is_unauthorized() {
                    "Your saved token was rejected. Enter a new one.".to_string()
                } else {
                    let reason = match &e {
                        DataError::Timeout => "The request timed out.".to_string(),
                        other => describe(other),
                    };
                    format!(
                        "Could not load your profile. {reason} Your saved token was kept; \
                         enter it again or restart to retry."
                    )
                };
                self.enter_setup(Some(message));
            }
        }
    }

    fn on_authenticated(&mut self, credential: Credential, user: User) {
        if let Err(e) = self.store.save(&credential) {
            warn!("Could not save token: {}", e);
            self.notifications
                .post(Level::Warning, format!("Token not saved: {e}"));
        }
        info!("Signed in as @{}", user.username);
        self.session.sign_in(credential, user);
        self.enter_active();
    }

    fn logout(&mut self) {
        info!("Logging out {:?}", self.session.username());
        if let Err(e) = self.store.delete() {
            warn!("Could not delete stored token: {}", e);
            self.notifications
                .post(Level::Error, format!("Could not remove the stored token: {e}"));
        }
        self.session.reset();
        self.tab = self.start_tab;
        self.show_help = false;
        self.enter_setup(None);
    }

    // ------------------------------------------------------------------------
    // Drawing
    // ------------------------------------------------------------------------

    pub fn draw(&mut self, frame: &mut Frame) {
        let area = frame.area();
        match self.phase {
            Phase::Bootstrapping => self.loader.render(frame, area),
            Phase::Setup => {
                if let Some(setup) = self.setup.as_mut() {
                    setup.render(frame, area);
                }
            }
            Phase::Active => self.draw_active(frame, area),
        }
        paint_toasts(self.notifications.visible(), frame.buffer_mut(), area);
    }

    fn draw_active(&mut self, frame: &mut Frame, area: Rect) {
        let bindings = self.top_bindings();
        let [header, content, help] = self.layout(area);
        let [tabs, crumbs] =
            Layout::vertical([Constraint::Length(1), Constraint::Length(1)]).areas(header);

        TabBar {
            tabs: &Tab::LABELS,
            active: self.tab.index(),
        }
        .render(frame, tabs);
        Breadcrumb {
            titles: self.nav.summary(),
        }
        .render(frame, crumbs);

        if self.loader.is_active() {
            self.loader.render(frame, content);
        } else if let Some(entry) = self.nav.top_mut() {
            entry.screen.render(frame, content);
        }

        let pro = self.session.user.as_ref().is_some_and(|u| u.pro);
        HelpBar {
            bindings: &bindings,
            username: self.session.username(),
            pro,
            full: self.show_help,
        }
        .render(frame, help);

        if self.confirm.is_active() {
            let panel = overlay::render_panel(
                ConfirmPanel::new(&self.confirm),
                ConfirmPanel::width(area.width),
                ConfirmPanel::HEIGHT,
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::credentials::MemoryCredentialStore;
    use crate::test_support::{ScriptedSource, me_response};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use serde_json::{Value, json};
    use std::time::Duration;

    struct Harness {
        app: App,
        rx: mpsc::Receiver<AppEvent>,
        source: Arc<ScriptedSource>,
    }

    impl Harness {
        fn new(source: Arc<ScriptedSource>, stored: Option<&str>) -> Self {
            let (tx, rx) = mpsc::channel();
            let store = MemoryCredentialStore::new(stored.map(Credential::new));
            let app = App::new(
                source.clone(),
                Box::new(store),
                Arc::new(ResolvedConfig::default()),
                tx,
            );
            Self { app, rx, source }
        }

        fn key(&mut self, key: &str) {
            self.app.handle_event(AppEvent::Key(key.to_string()));
        }

        /// Lets spawned commands run, then feeds their events to the app.
        async fn pump(&mut self) {
            for _ in 0..20 {
                tokio::task::yield_now().await;
                while let Ok(event) = self.rx.try_recv() {
                    self.app.handle_event(event);
                }
            }
        }

        async fn advance(&mut self, by: Duration) {
            tokio::time::advance(by).await;
            self.pump().await;
        }

        fn top_title(&self) -> Option<&str> {
            self.app.nav.top().map(|e| e.title.as_str())
        }

        fn stored(&self) -> Option<String> {
            self.app
                .store
                .load()
                .ok()
                .flatten()
                .map(|c| c.as_str().to_string())
        }
    }

    fn library() -> Value {
        json!({ "user_books": [
            { "id": 1, "book_id": 42, "status_id": 2, "book": { "id": 42, "title": "Dune" } },
            { "id": 2, "book_id": 43, "status_id": 3, "book": { "id": 43, "title": "Emma" } }
        ]})
    }

    fn scripted() -> Arc<ScriptedSource> {
        let source = ScriptedSource::new();
        source.respond("Me", me_response()).respond("UserBooks", library());
        source
    }

    async fn signed_in(source: Arc<ScriptedSource>) -> Harness {
        let mut h = Harness::new(source, Some("stored-token"));
        h.app.initialize();
        h.pump().await;
        assert_eq!(h.app.phase(), Phase::Active);
        h
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_stored_token_enters_setup() {
        let mut h = Harness::new(scripted(), None);
        h.app.initialize();
        assert_eq!(h.app.phase(), Phase::Setup);
        h.pump().await;
        assert!(h.source.calls().is_empty());
        assert!(!h.app.loader.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stored_token_loads_profile_then_home() {
        let mut h = Harness::new(scripted(), Some("stored-token"));
        h.app.initialize();
        assert_eq!(h.app.phase(), Phase::Bootstrapping);
        assert!(h.app.loader.is_active());

        h.pump().await;
        assert_eq!(h.app.phase(), Phase::Active);
        assert_eq!(h.app.nav.depth(), 1);
        assert_eq!(h.top_title(), Some("Home"));
        assert!(!h.app.loader.is_active());
        assert_eq!(h.app.session.username(), Some("reader"));
        assert_eq!(h.source.calls_to("Me").len(), 1);
        assert_eq!(h.source.calls_to("UserBooks").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_failure_returns_to_setup_and_keeps_token() {
        let source = ScriptedSource::new();
        source.fail("Me", DataError::Network("connection reset".into()));
        let mut h = Harness::new(source, Some("stored-token"));
        h.app.initialize();
        h.pump().await;

        assert_eq!(h.app.phase(), Phase::Setup);
        assert!(!h.app.session.authenticated);
        assert_eq!(h.stored().as_deref(), Some("stored-token"));
        let setup = h.app.setup.as_ref().map(|s| s.state().clone());
        assert!(matches!(setup, Some(crate::tui::screens::setup::SetupState::Error(m)) if m.contains("kept")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejected_token_message() {
        let source = ScriptedSource::new();
        source.fail("Me", DataError::Unauthorized("invalid".into()));
        let mut h = Harness::new(source, Some("old-token"));
        h.app.initialize();
        h.pump().await;
        let setup = h.app.setup.as_ref().map(|s| s.state().clone());
        assert!(matches!(setup, Some(crate::tui::screens::setup::SetupState::Error(m)) if m.contains("rejected")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_profile_timeout_fires_at_boundary() {
        let source = ScriptedSource::new();
        source.respond_after("Me", Duration::from_secs(60), me_response());
        let mut h = Harness::new(source, Some("stored-token"));
        h.app.initialize();
        h.pump().await;

        h.advance(Duration::from_millis(29_999)).await;
        assert_eq!(h.app.phase(), Phase::Bootstrapping);

        h.advance(Duration::from_millis(1)).await;
        assert_eq!(h.app.phase(), Phase::Setup);
        let setup = h.app.setup.as_ref().map(|s| s.state().clone());
        assert!(matches!(setup, Some(crate::tui::screens::setup::SetupState::Error(m)) if m.contains("timed out")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_setup_token_is_saved_and_opens_main_ui() {
        let mut h = Harness::new(scripted(), None);
        h.app.initialize();
        h.app.handle_event(AppEvent::Paste("fresh-token".into()));
        // Global shortcuts are plain text while setting up
        h.key("q");
        h.key("backspace");
        assert!(!h.app.should_quit());
        h.key("enter");
        h.pump().await;

        assert_eq!(h.app.phase(), Phase::Active);
        assert_eq!(h.stored().as_deref(), Some("fresh-token"));
        assert!(h.app.setup.is_none());
        assert!(h.app.notifications.is_active());
    }

    #[tokio::test(start_paused = true)]
    async fn test_five_filter_presses_issue_one_fetch() {
        let mut h = signed_in(scripted()).await;
        assert_eq!(h.source.calls_to("UserBooks").len(), 1);

        for _ in 0..5 {
            h.key("f");
            h.advance(Duration::from_millis(50)).await;
        }
        assert_eq!(h.source.calls_to("UserBooks").len(), 1);

        h.advance(Duration::from_millis(300)).await;
        let calls = h.source.calls_to("UserBooks");
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].variables["where"]["status_id"]["_eq"], json!(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_book_result_after_pop_is_dropped() {
        let source = scripted();
        source.respond_after(
            "BookById",
            Duration::from_secs(5),
            json!({ "books_by_pk": { "id": 42, "title": "Dune" } }),
        );
        let mut h = signed_in(source).await;

        h.key("enter");
        assert_eq!(h.app.nav.depth(), 2);
        assert_eq!(h.top_title(), Some("Dune"));
        assert!(h.app.loader.is_active());

        // Back works while the detail is still loading
        h.key("esc");
        assert_eq!(h.app.nav.depth(), 1);
        assert!(!h.app.loader.is_active());

        h.advance(Duration::from_secs(5)).await;
        assert_eq!(h.app.nav.depth(), 1);
        assert_eq!(h.top_title(), Some("Home"));
        // The book never reached a screen, so no follow-ups were requested
        assert!(h.source.calls_to("BookTags").is_empty());
        assert_eq!(h.source.calls_to("BookById").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_tab_reloads_in_place() {
        let mut h = signed_in(scripted()).await;
        let root = h.app.nav.top().map(|e| e.id);

        h.key("1");
        h.pump().await;
        assert_eq!(h.app.nav.depth(), 1);
        assert_eq!(h.app.nav.top().map(|e| e.id), root);
        assert_eq!(h.source.calls_to("UserBooks").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_tab_switch_resets_stack() {
        let source = scripted();
        source.respond("BookById", json!({ "books_by_pk": { "id": 42, "title": "Dune" } }));
        let mut h = signed_in(source).await;
        h.key("enter");
        h.pump().await;
        assert_eq!(h.app.nav.depth(), 2);

        // Same tab, but deeper than the root: a fresh root
        h.key("1");
        assert_eq!(h.app.nav.depth(), 1);
        assert_eq!(h.app.nav.summary(), vec!["Home"]);

        h.key("tab");
        assert_eq!(h.app.tab, Tab::Search);
        assert_eq!(h.app.nav.summary(), vec!["Search"]);
        // Search owns the keyboard: `q` is typed, not a quit
        h.key("q");
        assert!(!h.app.should_quit());
    }

    #[tokio::test(start_paused = true)]
    async fn test_review_pushed_over_detail_saves_and_pops() {
        let source = scripted();
        source
            .respond("BookById", json!({ "books_by_pk": { "id": 42, "title": "Dune" } }))
            .respond(
                "UserBookFor",
                json!({ "user_books": [{
                    "id": 1, "book_id": 42, "status_id": 2, "review": "Spice.",
                    "book": { "id": 42, "title": "Dune" }
                }]}),
            )
            .respond("UpdateReview", json!({ "update_user_book": { "id": 1 } }));
        let mut h = signed_in(source).await;
        h.key("enter");
        h.pump().await;

        h.key("w");
        h.pump().await;
        assert_eq!(h.app.nav.depth(), 3);
        assert_eq!(h.top_title(), Some("Review: Dune"));
        // The field owns the keyboard: `2` is typed, not a tab switch
        h.key("2");
        assert_eq!(h.app.tab, Tab::Home);

        h.key("enter");
        h.pump().await;
        let saved = h.source.calls_to("UpdateReview");
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].variables["review"], json!("Spice.2"));
        assert_eq!(h.app.nav.depth(), 2);
        assert_eq!(h.top_title(), Some("Dune"));
        // Detail and home both refresh after the save
        assert_eq!(h.source.calls_to("UserBookFor").len(), 2);
        assert_eq!(h.source.calls_to("UserBooks").len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_logout_confirmation_round_trip() {
        let mut h = signed_in(scripted()).await;

        h.key("ctrl+q");
        assert!(h.app.confirm.is_active());
        // Covered keys do nothing else while the dialog is up
        h.key("2");
        assert_eq!(h.app.tab, Tab::Home);
        h.key("esc");
        assert!(!h.app.confirm.is_active());
        assert_eq!(h.app.phase(), Phase::Active);

        h.key("ctrl+q");
        h.key("y");
        assert_eq!(h.app.phase(), Phase::Setup);
        assert!(h.app.nav.is_empty());
        assert!(h.stored().is_none());
        assert!(!h.app.session.authenticated);
    }

    #[tokio::test(start_paused = true)]
    async fn test_back_at_root_is_noop() {
        let mut h = signed_in(scripted()).await;
        h.key("esc");
        h.key("esc");
        assert_eq!(h.app.nav.depth(), 1);
        assert_eq!(h.app.phase(), Phase::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toasts_expire() {
        let mut h = signed_in(scripted()).await;
        assert!(h.app.is_animating());
        h.advance(Duration::from_secs(3)).await;
        h.app.tick();
        assert!(!h.app.notifications.is_active());
        assert!(!h.app.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_draw_active_with_confirm() {
        let mut h = signed_in(scripted()).await;
        h.app.handle_event(AppEvent::Resize(80, 24));
        h.key("ctrl+q");

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal.draw(|f| h.app.draw(f)).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Home"));
        assert!(text.contains("Log out of folio?"));
        assert!(text.contains("@reader"));
    }
}
