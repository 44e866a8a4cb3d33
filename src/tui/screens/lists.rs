//! # Lists Screen
//!
//! Two panes: the user's lists on the left, the books of the highlighted
//! list on the right. Moving through lists wraps at both ends and re-arms a
//! 250ms gate; the books of a list are only fetched once the cursor rests.
//! The first list's books load right after the lists themselves.
//!
//! The books pane always belongs to `books_for`, which can lag behind the
//! cursor. It can only be entered once the two agree, and an opened book
//! takes its list membership from `books_for`.
//!
//! `d` on a list asks for confirmation before deleting it.

use log::{debug, info};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use crate::api::{BookList, ListBook, extract, queries};
use crate::core::debounce::DebounceGate;
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::Component;
use crate::tui::components::confirm::{ConfirmDialog, ConfirmPanel};
use crate::tui::keys::{self, KeyBinding};
use crate::tui::overlay::{self, Anchor};
use crate::tui::screen::{
    Effect, ListMembership, Navigation, Screen, ScreenContext, ScreenEvent, Topic,
};

use super::{describe, wrap_index};

const SWITCH: KeyBinding = KeyBinding::new(&["h", "l"], "h/l", "switch pane");
const DELETE: KeyBinding = KeyBinding::new(&["d"], "d", "delete list");
const REFRESH: KeyBinding = KeyBinding::new(&["r"], "r", "refresh");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pane {
    Lists,
    Books,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListAction {
    DeleteList { id: i64, name: String },
}

pub struct ListsScreen {
    lists: Vec<BookList>,
    cursor: usize,
    books: Vec<ListBook>,
    /// List whose books are currently shown.
    books_for: Option<i64>,
    books_state: ListState,
    /// Bumped per lists fetch; older responses are dropped.
    generation: i64,
    pane: Pane,
    gate: DebounceGate,
    loading: bool,
    books_loading: bool,
    error: Option<String>,
    confirm: ConfirmDialog<ListAction>,
    width: u16,
}

impl Default for ListsScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ListsScreen {
    pub fn new() -> Self {
        Self {
            lists: Vec::new(),
            cursor: 0,
            books: Vec::new(),
            books_for: None,
            books_state: ListState::default(),
            generation: 0,
            pane: Pane::Lists,
            gate: DebounceGate::new("list", crate::core::config::DEFAULT_LIST_DEBOUNCE),
            loading: true,
            books_loading: false,
            error: None,
            confirm: ConfirmDialog::new(),
            width: 80,
        }
    }

    fn current(&self) -> Option<&BookList> {
        self.lists.get(self.cursor)
    }

    /// The list the books pane is showing, looked up by id.
    fn shown_list(&self) -> Option<&BookList> {
        let id = self.books_for?;
        self.lists.iter().find(|l| l.id == id)
    }

    fn books_match_cursor(&self) -> bool {
        self.books_for.is_some() && self.books_for == self.current().map(|l| l.id)
    }

    fn fetch_lists(&mut self, ctx: &ScreenContext) -> Effect {
        self.generation += 1;
        Effect::Command(
            ctx.primary(CommandKind::Lists, queries::lists(ctx.user.id))
                .keyed(self.generation),
        )
    }

    fn fetch_books(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        let Some(list_id) = self.current().map(|l| l.id) else {
            return Vec::new();
        };
        self.books_loading = true;
        vec![Effect::Command(
            ctx.primary(CommandKind::ListBooks, queries::list_books(list_id))
                .keyed(list_id),
        )]
    }

    fn move_cursor(&mut self, delta: isize) -> Vec<Effect> {
        if self.lists.is_empty() {
            return Vec::new();
        }
        self.cursor = wrap_index(self.cursor, delta, self.lists.len());
        let token = self.gate.arm();
        vec![Effect::Debounce(token, self.gate.delay())]
    }

    fn on_result(&mut self, ctx: &ScreenContext, result: CommandResult) -> Vec<Effect> {
        match result.kind {
            CommandKind::Lists => {
                if result.key != Some(self.generation) {
                    debug!("Lists dropping generation {:?}", result.key);
                    return Vec::new();
                }
                self.loading = false;
                match result.outcome.and_then(|d| extract::<Vec<BookList>>(&d, "lists")) {
                    Ok(lists) => {
                        self.error = None;
                        self.lists = lists;
                        self.cursor = self.cursor.min(self.lists.len().saturating_sub(1));
                        self.gate.cancel();
                        if self.lists.is_empty() {
                            self.books.clear();
                            self.books_for = None;
                            Vec::new()
                        } else {
                            self.fetch_books(ctx)
                        }
                    }
                    Err(e) => {
                        self.error = Some(describe(&e));
                        Vec::new()
                    }
                }
            }
            CommandKind::ListBooks => {
                if result.key != self.current().map(|l| l.id) {
                    debug!("Lists dropping books for list {:?}", result.key);
                    return Vec::new();
                }
                self.books_loading = false;
                match result.outcome.and_then(|d| extract::<Vec<ListBook>>(&d, "list_books")) {
                    Ok(books) => {
                        self.books = books;
                        self.books_for = result.key;
                        self.books_state
                            .select((!self.books.is_empty()).then_some(0));
                        Vec::new()
                    }
                    Err(e) => {
                        self.books.clear();
                        self.books_for = None;
                        self.books_state.select(None);
                        self.pane = Pane::Lists;
                        vec![Effect::notify(Level::Error, describe(&e))]
                    }
                }
            }
            CommandKind::DeleteList => match result.outcome {
                Ok(_) => {
                    info!("Deleted list {:?}", result.key);
                    vec![
                        Effect::notify(Level::Success, "List deleted"),
                        self.fetch_lists(ctx),
                    ]
                }
                Err(e) => vec![Effect::notify(
                    Level::Error,
                    format!("Could not delete list: {}", describe(&e)),
                )],
            },
            _ => Vec::new(),
        }
    }

    fn on_confirm_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        let (confirmed, _) = self.confirm.handle_key(key);
        if !confirmed {
            return Vec::new();
        }
        match self.confirm.action() {
            Some(ListAction::DeleteList { id, name }) => {
                info!("Deleting list {} ({})", id, name);
                vec![Effect::Command(
                    ctx.primary(CommandKind::DeleteList, queries::delete_list(id))
                        .keyed(id),
                )]
            }
            None => Vec::new(),
        }
    }

    fn on_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        if self.confirm.is_active() {
            return self.on_confirm_key(ctx, key);
        }
        match (self.pane, key) {
            (_, "r") => vec![self.fetch_lists(ctx)],
            (Pane::Lists, k) if keys::UP.matches(k) => self.move_cursor(-1),
            (Pane::Lists, k) if keys::DOWN.matches(k) => self.move_cursor(1),
            (Pane::Lists, "l" | "right" | "enter") => {
                if self.books_match_cursor() && !self.books.is_empty() {
                    self.pane = Pane::Books;
                }
                Vec::new()
            }
            (Pane::Lists, "d") => {
                if let Some(list) = self.current().cloned() {
                    let message = format!("Delete list \"{}\"?", list.name);
                    self.confirm.open(
                        message,
                        ListAction::DeleteList {
                            id: list.id,
                            name: list.name,
                        },
                    );
                }
                Vec::new()
            }
            (Pane::Books, "h" | "left") => {
                self.pane = Pane::Lists;
                Vec::new()
            }
            (Pane::Books, k) if keys::UP.matches(k) => {
                if self.books_state.selected().is_some() {
                    self.books_state.select_previous();
                }
                Vec::new()
            }
            (Pane::Books, k) if keys::DOWN.matches(k) => {
                if self
                    .books_state
                    .selected()
                    .is_some_and(|i| i + 1 < self.books.len())
                {
                    self.books_state.select_next();
                }
                Vec::new()
            }
            (Pane::Books, "enter") => {
                let Some(list) = self.shown_list() else {
                    debug!("Books pane has no backing list; ignoring open");
                    return Vec::new();
                };
                match self.books_state.selected().and_then(|i| self.books.get(i)) {
                    Some(entry) => vec![Effect::Navigate(Navigation::OpenBook {
                        book_id: entry.book_id,
                        title: entry.book.title.clone(),
                        from_list: Some(ListMembership {
                            list_book_id: entry.id,
                            list_name: list.name.clone(),
                        }),
                    })],
                    None => Vec::new(),
                }
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for ListsScreen {
    fn title(&self) -> String {
        "Lists".to_string()
    }

    fn init(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.gate = DebounceGate::new("list", ctx.config.list_debounce);
        vec![self.fetch_lists(ctx)]
    }

    fn reload(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.gate.cancel();
        vec![self.fetch_lists(ctx)]
    }

    fn invalidated(&mut self, ctx: &ScreenContext, topic: Topic) -> Vec<Effect> {
        match topic {
            Topic::Lists => vec![self.fetch_lists(ctx)],
            Topic::Library => Vec::new(),
        }
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => self.on_key(ctx, &key),
            ScreenEvent::Result(result) => self.on_result(ctx, result),
            ScreenEvent::Settled(token) => {
                if self.gate.settle(token) {
                    self.fetch_books(ctx)
                } else {
                    Vec::new()
                }
            }
            ScreenEvent::Paste(_) => Vec::new(),
        }
    }

    fn set_size(&mut self, width: u16, _height: u16) {
        self.width = width;
    }

    fn input_focused(&self) -> bool {
        self.confirm.is_active()
    }

    fn loaded(&self) -> bool {
        !self.loading
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        match self.pane {
            Pane::Lists => vec![keys::DOWN, SWITCH, DELETE, REFRESH],
            Pane::Books => vec![keys::DOWN, keys::SELECT, SWITCH],
        }
    }
}

impl Component for ListsScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [left, right] =
            Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)]).areas(area);
        let muted = Style::default().fg(Color::DarkGray);
        let border = |active: bool| {
            Style::default().fg(if active { Color::Cyan } else { Color::DarkGray })
        };

        let lists_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border(self.pane == Pane::Lists))
            .title(" Lists ");
        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(err.clone(), Style::default().fg(Color::Red)))
                    .block(lists_block),
                left,
            );
        } else if self.lists.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("No lists yet.", muted)).block(lists_block),
                left,
            );
        } else {
            let items: Vec<ListItem> = self
                .lists
                .iter()
                .map(|l| {
                    ListItem::new(Line::from(vec![
                        Span::raw(l.name.clone()),
                        Span::styled(format!(" ({})", l.books_count), muted),
                    ]))
                })
                .collect();
            let mut state = ListState::default().with_selected(Some(self.cursor));
            frame.render_stateful_widget(
                List::new(items)
                    .block(lists_block)
                    .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .highlight_symbol("▸ "),
                left,
                &mut state,
            );
        }

        let title = self
            .shown_list()
            .or(self.current())
            .map(|l| format!(" {} ", l.name))
            .unwrap_or_else(|| " Books ".to_string());
        let books_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border(self.pane == Pane::Books))
            .title(title);
        let stale = self.books_for != self.current().map(|l| l.id);
        if self.books_loading || (stale && self.gate.is_pending()) {
            frame.render_widget(
                Paragraph::new(Line::styled("Loading…", Style::default().fg(Color::Yellow)))
                    .block(books_block),
                right,
            );
        } else if stale && self.current().is_some() {
            frame.render_widget(
                Paragraph::new(Line::styled("Books unavailable. Press r to retry.", muted))
                    .block(books_block),
                right,
            );
        } else if self.books.is_empty() {
            frame.render_widget(
                Paragraph::new(Line::styled("This list is empty.", muted)).block(books_block),
                right,
            );
        } else {
            let items: Vec<ListItem> = self
                .books
                .iter()
                .map(|lb| {
                    ListItem::new(vec![
                        Line::from(lb.book.title.clone()),
                        Line::styled(format!("  by {}", lb.book.authors()), muted),
                    ])
                })
                .collect();
            let highlight = if self.pane == Pane::Books {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            frame.render_stateful_widget(
                List::new(items).block(books_block).highlight_style(highlight),
                right,
                &mut self.books_state,
            );
        }

        if self.confirm.is_active() {
            let panel = overlay::render_panel(
                ConfirmPanel::new(&self.confirm),
                ConfirmPanel::width(self.width),
                ConfirmPanel::HEIGHT,
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
        }
    }
}
