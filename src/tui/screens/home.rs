//! # Home Screen
//!
//! The user's library, filtered by reading status and paged.
//!
//! Filter cycling (`f` / `F`) is debounced: each press moves the filter and
//! re-arms a 300ms gate, and only the settle of the last press fetches. Every
//! library fetch is keyed with a generation so a slow response for an older
//! filter or page never overwrites a newer one.

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};

use crate::api::{ReadingStatus, UserBook, extract, queries};
use crate::core::debounce::DebounceGate;
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::Component;
use crate::tui::keys::{self, KeyBinding};
use crate::tui::screen::{Effect, Navigation, Screen, ScreenContext, ScreenEvent, Topic};

use super::{describe, rating_stars, status_color};

/// Filter slots: 0 is "All", 1..=6 map to [`ReadingStatus::ALL`].
const FILTER_COUNT: usize = 7;

const FILTER: KeyBinding = KeyBinding::new(&["f", "F"], "f/F", "filter");
const PAGE: KeyBinding = KeyBinding::new(&["[", "]"], "[/]", "page");
const REFRESH: KeyBinding = KeyBinding::new(&["r"], "r", "refresh");

pub struct HomeScreen {
    books: Vec<UserBook>,
    filter: usize,
    page: usize,
    list_state: ListState,
    gate: DebounceGate,
    generation: i64,
    /// Nothing shown yet.
    loading: bool,
    /// A fetch is in flight.
    fetching: bool,
    error: Option<String>,
}

impl Default for HomeScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl HomeScreen {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            filter: 0,
            page: 0,
            list_state: ListState::default(),
            gate: DebounceGate::new("filter", crate::core::config::DEFAULT_FILTER_DEBOUNCE),
            generation: 0,
            loading: true,
            fetching: false,
            error: None,
        }
    }

    pub fn filter(&self) -> usize {
        self.filter
    }

    fn filter_status(&self) -> Option<ReadingStatus> {
        self.filter
            .checked_sub(1)
            .and_then(|i| ReadingStatus::ALL.get(i).copied())
    }

    fn filter_label(&self) -> &'static str {
        self.filter_status().map(ReadingStatus::label).unwrap_or("All")
    }

    fn fetch(&mut self, ctx: &ScreenContext) -> Effect {
        self.generation += 1;
        self.fetching = true;
        let page_size = ctx.config.page_size;
        let request = queries::user_books(
            ctx.user.id,
            self.filter_status().map(ReadingStatus::id),
            page_size,
            self.page * page_size,
        );
        Effect::Command(ctx.primary(CommandKind::Library, request).keyed(self.generation))
    }

    fn cycle_filter(&mut self, delta: usize) -> Vec<Effect> {
        self.filter = (self.filter + delta) % FILTER_COUNT;
        self.page = 0;
        let token = self.gate.arm();
        vec![Effect::Debounce(token, self.gate.delay())]
    }

    fn selected(&self) -> Option<&UserBook> {
        self.list_state.selected().and_then(|i| self.books.get(i))
    }

    fn on_result(&mut self, result: CommandResult) -> Vec<Effect> {
        if result.kind != CommandKind::Library || result.key != Some(self.generation) {
            debug!("Home dropping stale {:?} (key={:?})", result.kind, result.key);
            return Vec::new();
        }
        let first_load = self.loading;
        self.loading = false;
        self.fetching = false;
        match result.outcome.and_then(|data| extract::<Vec<UserBook>>(&data, "user_books")) {
            Ok(books) => {
                self.error = None;
                self.books = books;
                self.list_state
                    .select((!self.books.is_empty()).then_some(0));
                Vec::new()
            }
            Err(e) => {
                let message = describe(&e);
                self.error = Some(message.clone());
                if first_load {
                    Vec::new()
                } else {
                    vec![Effect::notify(Level::Error, message)]
                }
            }
        }
    }

    fn on_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        match key {
            "f" => self.cycle_filter(1),
            "F" => self.cycle_filter(FILTER_COUNT - 1),
            "]" => {
                if self.books.len() < ctx.config.page_size || self.fetching {
                    return Vec::new();
                }
                self.page += 1;
                vec![self.fetch(ctx)]
            }
            "[" => {
                if self.page == 0 || self.fetching {
                    return Vec::new();
                }
                self.page -= 1;
                vec![self.fetch(ctx)]
            }
            "r" => vec![self.fetch(ctx)],
            "enter" => match self.selected() {
                Some(ub) => vec![Effect::Navigate(Navigation::OpenBook {
                    book_id: ub.book_id,
                    title: ub.book.title.clone(),
                    from_list: None,
                })],
                None => Vec::new(),
            },
            k if keys::UP.matches(k) => {
                if self.list_state.selected().is_some() {
                    self.list_state.select_previous();
                }
                Vec::new()
            }
            k if keys::DOWN.matches(k) => {
                if self
                    .list_state
                    .selected()
                    .is_some_and(|i| i + 1 < self.books.len())
                {
                    self.list_state.select_next();
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for HomeScreen {
    fn title(&self) -> String {
        "Home".to_string()
    }

    fn init(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.gate = DebounceGate::new("filter", ctx.config.filter_debounce);
        vec![self.fetch(ctx)]
    }

    fn reload(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.gate.cancel();
        vec![self.fetch(ctx)]
    }

    fn invalidated(&mut self, ctx: &ScreenContext, topic: Topic) -> Vec<Effect> {
        match topic {
            Topic::Library => vec![self.fetch(ctx)],
            Topic::Lists => Vec::new(),
        }
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => self.on_key(ctx, &key),
            ScreenEvent::Result(result) => self.on_result(result),
            ScreenEvent::Settled(token) => {
                if self.gate.settle(token) {
                    vec![self.fetch(ctx)]
                } else {
                    Vec::new()
                }
            }
            ScreenEvent::Paste(_) => Vec::new(),
        }
    }

    fn loaded(&self) -> bool {
        !self.loading
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        vec![keys::DOWN, keys::SELECT, FILTER, PAGE, REFRESH]
    }
}

impl Component for HomeScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [header, body] =
            Layout::vertical([Constraint::Length(2), Constraint::Min(0)]).areas(area);

        let mut spans = vec![
            Span::styled("Library", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("  filter: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                self.filter_label(),
                Style::default().fg(status_color(self.filter_status())),
            ),
            Span::styled(
                format!("  page {}", self.page + 1),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if self.fetching || self.gate.is_pending() {
            spans.push(Span::styled("  loading…", Style::default().fg(Color::Yellow)));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), header);

        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(err.clone(), Style::default().fg(Color::Red))),
                body,
            );
            return;
        }
        if self.books.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled(
                    "No books here yet.",
                    Style::default().fg(Color::DarkGray),
                )),
                body,
            );
            return;
        }

        let show_status = self.filter == 0;
        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|ub| {
                let mut title = Vec::new();
                if show_status {
                    title.push(Span::styled("■ ", Style::default().fg(status_color(ub.status()))));
                }
                title.push(Span::raw(ub.book.title.clone()));
                let mut detail = format!("  by {}", ub.book.authors());
                if let Some(r) = ub.rating {
                    detail.push_str(&format!("  {}", rating_stars(r)));
                }
                ListItem::new(vec![
                    Line::from(title),
                    Line::styled(detail, Style::default().fg(Color::DarkGray)),
                ])
            })
            .collect();

        let list = List::new(items).highlight_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_stateful_widget(list, body, &mut self.list_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DataError;
    use crate::core::scheduler::{CommandId, Origin, ScreenId};
    use crate::test_support::{ScriptedSource, command_kinds, test_context};
    use serde_json::json;

    fn key(k: &str) -> ScreenEvent {
        ScreenEvent::Key(k.to_string())
    }

    fn library(key: i64, outcome: Result<serde_json::Value, DataError>) -> ScreenEvent {
        ScreenEvent::Result(CommandResult {
            id: CommandId(key as u64),
            origin: Origin::Screen(ScreenId(1)),
            kind: CommandKind::Library,
            key: Some(key),
            outcome,
        })
    }

    fn books(n: usize) -> serde_json::Value {
        let rows: Vec<_> = (0..n)
            .map(|i| {
                json!({
                    "id": i, "book_id": 100 + i, "status_id": 1,
                    "book": { "id": 100 + i, "title": format!("Book {i}") }
                })
            })
            .collect();
        json!({ "user_books": rows })
    }

    #[test]
    fn test_init_fetches_and_reports_loading() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        let effects = home.init(&ctx);
        assert_eq!(command_kinds(&effects), vec![CommandKind::Library]);
        assert!(!home.loaded());

        home.handle_event(&ctx, library(1, Ok(books(2))));
        assert!(home.loaded());
        assert_eq!(home.books.len(), 2);
        assert_eq!(home.list_state.selected(), Some(0));
    }

    #[test]
    fn test_filter_presses_only_debounce() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);

        let mut tokens = Vec::new();
        for _ in 0..5 {
            let effects = home.handle_event(&ctx, key("f"));
            assert!(command_kinds(&effects).is_empty());
            match effects.as_slice() {
                [Effect::Debounce(token, delay)] => {
                    assert_eq!(*delay, ctx.config.filter_debounce);
                    tokens.push(*token);
                }
                other => panic!("unexpected effects: {other:?}"),
            }
        }
        assert_eq!(home.filter(), 5);

        let fetches: usize = tokens
            .into_iter()
            .map(|t| command_kinds(&home.handle_event(&ctx, ScreenEvent::Settled(t))).len())
            .sum();
        assert_eq!(fetches, 1);
    }

    #[test]
    fn test_shift_f_cycles_backwards() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);
        home.handle_event(&ctx, key("F"));
        assert_eq!(home.filter(), 6);
        assert_eq!(home.filter_label(), "Ignored");
    }

    #[test]
    fn test_stale_library_result_dropped() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);
        home.handle_event(&ctx, key("r"));

        // Response to the first fetch arrives after the refresh was issued
        home.handle_event(&ctx, library(1, Ok(books(3))));
        assert!(home.books.is_empty());
        assert!(!home.loaded());

        home.handle_event(&ctx, library(2, Ok(books(1))));
        assert_eq!(home.books.len(), 1);
    }

    #[test]
    fn test_enter_opens_selected_book() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);
        home.handle_event(&ctx, library(1, Ok(books(3))));
        home.handle_event(&ctx, key("j"));

        let effects = home.handle_event(&ctx, key("enter"));
        match effects.as_slice() {
            [Effect::Navigate(Navigation::OpenBook { book_id, title, from_list })] => {
                assert_eq!(*book_id, 101);
                assert_eq!(title, "Book 1");
                assert!(from_list.is_none());
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_paging_requires_full_page() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);
        home.handle_event(&ctx, library(1, Ok(books(2))));
        assert!(home.handle_event(&ctx, key("]")).is_empty());
        assert!(home.handle_event(&ctx, key("[")).is_empty());

        home.handle_event(&ctx, key("r"));
        home.handle_event(&ctx, library(2, Ok(books(ctx.config.page_size))));
        let effects = home.handle_event(&ctx, key("]"));
        assert_eq!(command_kinds(&effects), vec![CommandKind::Library]);
        assert_eq!(home.page, 1);
    }

    #[test]
    fn test_first_load_error_is_inline() {
        let ctx = test_context(ScriptedSource::new());
        let mut home = HomeScreen::new();
        home.init(&ctx);
        let effects = home.handle_event(&ctx, library(1, Err(DataError::Timeout)));
        assert!(effects.is_empty());
        assert!(home.loaded());
        assert!(home.error.as_deref().is_some_and(|e| e.contains("timed out")));
    }
}
