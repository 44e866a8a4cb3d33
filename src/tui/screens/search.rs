//! # Search Screen
//!
//! Title search. The text field owns the keyboard while focused, so typing
//! `q` or `1` never triggers a global shortcut. `tab`/`esc` move focus to the
//! results; `/` or `tab` move it back.
//!
//! Each submitted query bumps a generation that keys its command; a result
//! for an older query is ignored.

use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::{Book, extract, queries};
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::keys::{self, KeyBinding};
use crate::tui::screen::{Effect, Navigation, Screen, ScreenContext, ScreenEvent};

use super::{describe, rating_stars};

const RESULT_LIMIT: usize = 25;

const FOCUS_INPUT: KeyBinding = KeyBinding::new(&["/"], "/", "edit query");
const TOGGLE: KeyBinding = KeyBinding::new(&["tab"], "tab", "results");
const SUBMIT: KeyBinding = KeyBinding::new(&["enter"], "enter", "search");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Input,
    Results,
}

pub struct SearchScreen {
    input: TextInput,
    focus: Focus,
    results: Vec<Book>,
    list_state: ListState,
    generation: i64,
    last_query: Option<String>,
    searching: bool,
    error: Option<String>,
}

impl Default for SearchScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchScreen {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("Search by title..."),
            focus: Focus::Input,
            results: Vec::new(),
            list_state: ListState::default(),
            generation: 0,
            last_query: None,
            searching: false,
            error: None,
        }
    }

    fn search(&mut self, ctx: &ScreenContext, query: String) -> Vec<Effect> {
        if query.is_empty() {
            return Vec::new();
        }
        self.generation += 1;
        self.searching = true;
        self.error = None;
        let request = queries::search_books(&query, RESULT_LIMIT);
        self.last_query = Some(query);
        vec![Effect::Command(
            ctx.primary(CommandKind::Search, request).keyed(self.generation),
        )]
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.input.focused = focus == Focus::Input;
    }

    fn on_result(&mut self, result: CommandResult) -> Vec<Effect> {
        if result.kind != CommandKind::Search || result.key != Some(self.generation) {
            debug!("Search dropping stale result (key={:?})", result.key);
            return Vec::new();
        }
        self.searching = false;
        match result.outcome.and_then(|data| extract::<Vec<Book>>(&data, "books")) {
            Ok(books) => {
                self.results = books;
                self.list_state
                    .select((!self.results.is_empty()).then_some(0));
                if !self.results.is_empty() {
                    self.set_focus(Focus::Results);
                }
            }
            Err(e) => self.error = Some(describe(&e)),
        }
        Vec::new()
    }

    fn on_input_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        match key {
            "tab" | "esc" => {
                self.set_focus(Focus::Results);
                Vec::new()
            }
            _ => match self.input.handle_key(key) {
                Some(InputEvent::Submit(query)) => self.search(ctx, query),
                _ => Vec::new(),
            },
        }
    }

    fn on_results_key(&mut self, key: &str) -> Vec<Effect> {
        match key {
            "/" | "tab" => {
                self.set_focus(Focus::Input);
                Vec::new()
            }
            "enter" => match self.list_state.selected().and_then(|i| self.results.get(i)) {
                Some(book) => vec![Effect::Navigate(Navigation::OpenBook {
                    book_id: book.id,
                    title: book.title.clone(),
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
                    .is_some_and(|i| i + 1 < self.results.len())
                {
                    self.list_state.select_next();
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for SearchScreen {
    fn title(&self) -> String {
        "Search".to_string()
    }

    fn init(&mut self, _ctx: &ScreenContext) -> Vec<Effect> {
        self.set_focus(Focus::Input);
        Vec::new()
    }

    /// Re-runs the last query, if there was one.
    fn reload(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        match self.last_query.clone() {
            Some(query) => self.search(ctx, query),
            None => {
                self.set_focus(Focus::Input);
                Vec::new()
            }
        }
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => match self.focus {
                Focus::Input => self.on_input_key(ctx, &key),
                Focus::Results => self.on_results_key(&key),
            },
            ScreenEvent::Paste(text) => {
                if self.focus == Focus::Input {
                    self.input.paste(&text);
                }
                Vec::new()
            }
            ScreenEvent::Result(result) => self.on_result(result),
            ScreenEvent::Settled(_) => Vec::new(),
        }
    }

    fn input_focused(&self) -> bool {
        self.focus == Focus::Input
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        match self.focus {
            Focus::Input => vec![SUBMIT, TOGGLE],
            Focus::Results => vec![keys::DOWN, keys::SELECT, FOCUS_INPUT],
        }
    }
}

impl Component for SearchScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [field, status, body] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .areas(area);

        let border = if self.focus == Focus::Input {
            Color::Cyan
        } else {
            Color::DarkGray
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Search ");
        let inner = block.inner(field);
        frame.render_widget(block, field);
        self.input.render(frame, inner);

        let muted = Style::default().fg(Color::DarkGray);
        let status_line = if self.searching {
            Line::styled("Searching...", Style::default().fg(Color::Yellow))
        } else if let Some(err) = &self.error {
            Line::styled(err.clone(), Style::default().fg(Color::Red))
        } else if let Some(q) = &self.last_query {
            Line::styled(format!("{} results for \"{}\"", self.results.len(), q), muted)
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(status_line), status);

        let items: Vec<ListItem> = self
            .results
            .iter()
            .map(|book| {
                let mut meta = format!("  by {}", book.authors());
                if let Some(year) = book.release_year {
                    meta.push_str(&format!(" ({year})"));
                }
                if let Some(r) = book.rating {
                    meta.push_str(&format!("  {}", rating_stars(r)));
                }
                ListItem::new(vec![
                    Line::from(Span::raw(book.title.clone())),
                    Line::styled(meta, muted),
                ])
            })
            .collect();
        let highlight = if self.focus == Focus::Results {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        frame.render_stateful_widget(
            List::new(items).highlight_style(highlight),
            body,
            &mut self.list_state,
        );
    }
}
