//! # Book Detail Screen
//!
//! Pushed on top of any tab. Loads the book and the user's library entry for
//! it in parallel; once the book arrives, tags and reviews follow on the
//! enrichment timeout and the cover metadata on the image timeout. A slow or
//! failed follow-up only leaves its section empty.
//!
//! Every command is keyed with the book id, so a result from a detail screen
//! that was popped and replaced never lands on the new one.
//!
//! Keys: `s` status, `r` rating, `a` add to library, `l` add to one of the
//! user's lists, `w` write a review, `p` update progress, `d` delete a journal
//! entry and `x` remove from the list the book was opened from (both after
//! confirmation), `j`/`k` scroll.

use log::{debug, info, warn};
use ratatui::Frame;
use ratatui::layout::{Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Wrap};
use serde::Deserialize;
use serde_json::Value;
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::api::{
    Book, BookList, CoverHolder, DataError, Image, JournalEntry, ReadingStatus, Review, Tag,
    UserBook, extract, queries,
};
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::confirm::{ConfirmDialog, ConfirmPanel};
use crate::tui::components::select_modal::{SelectModal, SelectOutcome, SelectPanel};
use crate::tui::keys::{self, KeyBinding};
use crate::tui::overlay::{self, Anchor};
use crate::tui::screen::{
    Effect, ListMembership, Navigation, Screen, ScreenContext, ScreenEvent, Topic,
};

use super::{describe, rating_stars, status_color};

const REVIEW_LIMIT: usize = 5;
const JOURNAL_LIMIT: usize = 20;
const MODAL_WIDTH: u16 = 36;
const JOURNAL_MODAL_WIDTH: u16 = 56;

const STATUS: KeyBinding = KeyBinding::new(&["s"], "s", "status");
const RATE: KeyBinding = KeyBinding::new(&["r"], "r", "rate");
const ADD: KeyBinding = KeyBinding::new(&["a"], "a", "add");
const REMOVE: KeyBinding = KeyBinding::new(&["x"], "x", "remove from list");
const ADD_TO_LIST: KeyBinding = KeyBinding::new(&["l"], "l", "add to list");
const REVIEW: KeyBinding = KeyBinding::new(&["w"], "w", "review");
const PROGRESS: KeyBinding = KeyBinding::new(&["p"], "p", "progress");
const DELETE_JOURNAL: KeyBinding = KeyBinding::new(&["d"], "d", "delete journal entry");
const SCROLL: KeyBinding = KeyBinding::new(&["j", "k"], "j/k", "scroll");

#[derive(Debug, Clone, PartialEq)]
pub enum DetailAction {
    RemoveFromList(ListMembership),
    DeleteJournalEntry { id: i64 },
}

#[derive(Deserialize)]
struct Inserted {
    user_book: Option<UserBook>,
}

/// A follow-up section: not requested yet, in flight, or settled.
#[derive(Debug, Clone, PartialEq)]
enum Section<T> {
    Idle,
    Loading,
    Ready(T),
    Failed,
}

pub struct BookDetailScreen {
    book_id: i64,
    from_list: Option<ListMembership>,
    book: Option<Book>,
    entry: Option<UserBook>,
    tags: Section<Vec<Tag>>,
    reviews: Section<Vec<Review>>,
    cover: Section<Option<Image>>,
    journal: Section<Vec<JournalEntry>>,
    status_modal: SelectModal<ReadingStatus>,
    rating_modal: SelectModal<f64>,
    /// Rebuilt from the user's lists each time it opens.
    list_modal: SelectModal<(i64, String)>,
    journal_modal: SelectModal<i64>,
    confirm: ConfirmDialog<DetailAction>,
    pending_status: Option<ReadingStatus>,
    pending_rating: Option<f64>,
    pending_list: Option<String>,
    adding: bool,
    fetching_lists: bool,
    loading: bool,
    error: Option<String>,
    scroll: ScrollViewState,
    width: u16,
}

fn rating_options() -> Vec<(String, f64)> {
    (1..=10)
        .rev()
        .map(|half| {
            let rating = f64::from(half) / 2.0;
            (format!("{} {:.1}", rating_stars(rating), rating), rating)
        })
        .collect()
}

fn status_options() -> Vec<(String, ReadingStatus)> {
    ReadingStatus::ALL
        .into_iter()
        .map(|s| (s.label().to_string(), s))
        .collect()
}

/// Wraps `text` to `width` columns.
fn wrapped(text: &str, width: u16, style: Style) -> Vec<Line<'static>> {
    let options = textwrap::Options::new(usize::from(width.max(1)))
        .break_words(true)
        .word_separator(textwrap::WordSeparator::AsciiSpace);
    text.lines()
        .flat_map(|para| {
            if para.trim().is_empty() {
                vec![Line::default()]
            } else {
                textwrap::wrap(para, &options)
                    .into_iter()
                    .map(|l| Line::styled(l.into_owned(), style))
                    .collect()
            }
        })
        .collect()
}

impl BookDetailScreen {
    pub fn new(book_id: i64, from_list: Option<ListMembership>) -> Self {
        Self {
            book_id,
            from_list,
            book: None,
            entry: None,
            tags: Section::Idle,
            reviews: Section::Idle,
            cover: Section::Idle,
            journal: Section::Idle,
            status_modal: SelectModal::new("Reading status", status_options()),
            rating_modal: SelectModal::new("Rating", rating_options()),
            list_modal: SelectModal::new("Add to list", Vec::new()),
            journal_modal: SelectModal::new("Delete journal entry", Vec::new()),
            confirm: ConfirmDialog::new(),
            pending_status: None,
            pending_rating: None,
            pending_list: None,
            adding: false,
            fetching_lists: false,
            loading: true,
            error: None,
            scroll: ScrollViewState::default(),
            width: 80,
        }
    }

    pub fn book_id(&self) -> i64 {
        self.book_id
    }

    fn fetch_primary(&self, ctx: &ScreenContext) -> Vec<Effect> {
        vec![
            Effect::Command(
                ctx.primary(CommandKind::Book, queries::book_by_id(self.book_id))
                    .keyed(self.book_id),
            ),
            self.fetch_entry(ctx),
        ]
    }

    fn fetch_entry(&self, ctx: &ScreenContext) -> Effect {
        Effect::Command(
            ctx.primary(
                CommandKind::LibraryEntry,
                queries::user_book_for(ctx.user.id, self.book_id),
            )
            .keyed(self.book_id),
        )
    }

    fn fetch_journal(&mut self, ctx: &ScreenContext) -> Effect {
        if !matches!(self.journal, Section::Ready(_)) {
            self.journal = Section::Loading;
        }
        Effect::Command(
            ctx.enrichment(
                CommandKind::Journal,
                queries::book_journals(ctx.user.id, self.book_id, JOURNAL_LIMIT),
            )
            .keyed(self.book_id),
        )
    }

    fn fetch_follow_ups(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.tags = Section::Loading;
        self.reviews = Section::Loading;
        self.cover = Section::Loading;
        let journal = self.fetch_journal(ctx);
        vec![
            Effect::Command(
                ctx.enrichment(CommandKind::Tags, queries::book_tags(self.book_id))
                    .keyed(self.book_id),
            ),
            Effect::Command(
                ctx.enrichment(
                    CommandKind::Reviews,
                    queries::book_reviews(self.book_id, REVIEW_LIMIT),
                )
                .keyed(self.book_id),
            ),
            journal,
            Effect::Command(
                ctx.image(CommandKind::Cover, queries::book_cover(self.book_id))
                    .keyed(self.book_id),
            ),
        ]
    }

    fn add_to_library(&mut self, ctx: &ScreenContext, status: ReadingStatus) -> Vec<Effect> {
        self.adding = true;
        self.pending_status = Some(status);
        vec![Effect::Command(
            ctx.primary(
                CommandKind::AddToLibrary,
                queries::insert_user_book(self.book_id, status.id()),
            )
            .keyed(self.book_id),
        )]
    }

    fn on_result(&mut self, ctx: &ScreenContext, result: CommandResult) -> Vec<Effect> {
        if result.key != Some(self.book_id) {
            debug!(
                "Book {} dropping {:?} for key {:?}",
                self.book_id, result.kind, result.key
            );
            return Vec::new();
        }
        let outcome = result.outcome;
        match result.kind {
            CommandKind::Book => self.on_book(ctx, outcome),
            CommandKind::LibraryEntry => {
                match outcome.and_then(|d| extract::<Vec<UserBook>>(&d, "user_books")) {
                    Ok(rows) => self.entry = rows.into_iter().next(),
                    Err(e) => warn!("Library entry for book {} failed: {}", self.book_id, e),
                }
                Vec::new()
            }
            CommandKind::Tags => {
                self.tags = settle(outcome.and_then(|d| extract(&d, "taggings")), "tags");
                Vec::new()
            }
            CommandKind::Reviews => {
                self.reviews = settle(outcome.and_then(|d| extract(&d, "user_books")), "reviews");
                Vec::new()
            }
            CommandKind::Cover => {
                let image = outcome.and_then(|d| {
                    extract::<Option<CoverHolder>>(&d, "books_by_pk")
                        .map(|holder| holder.and_then(|h| h.image))
                });
                self.cover = settle(image, "cover");
                Vec::new()
            }
            CommandKind::UpdateStatus => {
                self.status_modal.finish();
                let status = self.pending_status.take();
                match outcome {
                    Ok(_) => {
                        if let (Some(entry), Some(status)) = (self.entry.as_mut(), status) {
                            entry.status_id = status.id();
                        }
                        let label = status.map(ReadingStatus::label).unwrap_or("updated");
                        vec![
                            Effect::notify(Level::Success, format!("Status: {label}")),
                            self.fetch_entry(ctx),
                            Effect::Invalidate(Topic::Library),
                        ]
                    }
                    Err(e) => vec![Effect::notify(Level::Error, describe(&e))],
                }
            }
            CommandKind::UpdateRating => {
                self.rating_modal.finish();
                let rating = self.pending_rating.take();
                match outcome {
                    Ok(_) => {
                        if let Some(entry) = self.entry.as_mut() {
                            entry.rating = rating;
                        }
                        vec![
                            Effect::notify(
                                Level::Success,
                                format!("Rated {}", rating_stars(rating.unwrap_or_default())),
                            ),
                            self.fetch_entry(ctx),
                            Effect::Invalidate(Topic::Library),
                        ]
                    }
                    Err(e) => vec![Effect::notify(Level::Error, describe(&e))],
                }
            }
            CommandKind::AddToLibrary => {
                self.adding = false;
                self.status_modal.finish();
                self.pending_status = None;
                match outcome.and_then(|d| extract::<Inserted>(&d, "insert_user_book")) {
                    Ok(inserted) => {
                        if inserted.user_book.is_some() {
                            self.entry = inserted.user_book;
                        }
                        info!("Added book {} to library", self.book_id);
                        vec![
                            Effect::notify(Level::Success, "Added to your library"),
                            Effect::Invalidate(Topic::Library),
                        ]
                    }
                    Err(e) => vec![Effect::notify(Level::Error, describe(&e))],
                }
            }
            CommandKind::Journal => {
                self.journal = settle(outcome.and_then(|d| extract(&d, "reading_journals")), "journal");
                Vec::new()
            }
            CommandKind::DeleteJournal => match outcome {
                Ok(_) => {
                    info!("Deleted a journal entry for book {}", self.book_id);
                    vec![
                        Effect::notify(Level::Success, "Journal entry deleted"),
                        self.fetch_journal(ctx),
                    ]
                }
                Err(e) => vec![Effect::notify(
                    Level::Error,
                    format!("Could not delete entry: {}", describe(&e)),
                )],
            },
            CommandKind::UserLists => {
                self.fetching_lists = false;
                match outcome.and_then(|d| extract::<Vec<BookList>>(&d, "lists")) {
                    Ok(lists) if lists.is_empty() => {
                        vec![Effect::notify(Level::Info, "You have no lists yet")]
                    }
                    Ok(lists) => {
                        let options = lists
                            .into_iter()
                            .map(|l| (format!("{} ({})", l.name, l.books_count), (l.id, l.name)))
                            .collect();
                        self.list_modal = SelectModal::new("Add to list", options);
                        self.list_modal.open(0);
                        Vec::new()
                    }
                    Err(e) => vec![Effect::notify(Level::Error, describe(&e))],
                }
            }
            CommandKind::AddToList => {
                self.list_modal.finish();
                let list = self.pending_list.take().unwrap_or_else(|| "list".to_string());
                match outcome {
                    Ok(_) => {
                        info!("Added book {} to {}", self.book_id, list);
                        vec![
                            Effect::notify(Level::Success, format!("Added to {list}")),
                            Effect::Invalidate(Topic::Lists),
                        ]
                    }
                    Err(e) => vec![Effect::notify(
                        Level::Error,
                        format!("Could not add to {list}: {}", describe(&e)),
                    )],
                }
            }
            CommandKind::RemoveFromList => match outcome {
                Ok(_) => {
                    let list = self
                        .from_list
                        .take()
                        .map(|m| m.list_name)
                        .unwrap_or_else(|| "list".to_string());
                    info!("Removed book {} from {}", self.book_id, list);
                    vec![
                        Effect::notify(Level::Success, format!("Removed from {list}")),
                        Effect::Invalidate(Topic::Lists),
                        Effect::Navigate(Navigation::Back),
                    ]
                }
                Err(e) => vec![Effect::notify(Level::Error, describe(&e))],
            },
            _ => Vec::new(),
        }
    }

    fn on_book(&mut self, ctx: &ScreenContext, outcome: Result<Value, DataError>) -> Vec<Effect> {
        self.loading = false;
        match outcome.and_then(|d| extract::<Option<Book>>(&d, "books_by_pk")) {
            Ok(Some(book)) => {
                self.error = None;
                self.book = Some(book);
                self.fetch_follow_ups(ctx)
            }
            Ok(None) => {
                self.error = Some("Book not found.".to_string());
                Vec::new()
            }
            Err(e) => {
                self.error = Some(describe(&e));
                Vec::new()
            }
        }
    }

    fn on_status_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        let Some(SelectOutcome::Commit(status)) = self.status_modal.handle_key(key) else {
            return Vec::new();
        };
        match self.entry.as_ref().map(|e| e.id) {
            Some(entry_id) => {
                self.pending_status = Some(status);
                vec![Effect::Command(
                    ctx.primary(
                        CommandKind::UpdateStatus,
                        queries::update_status(entry_id, status.id()),
                    )
                    .keyed(self.book_id),
                )]
            }
            None => self.add_to_library(ctx, status),
        }
    }

    fn on_rating_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        let Some(SelectOutcome::Commit(rating)) = self.rating_modal.handle_key(key) else {
            return Vec::new();
        };
        let Some(entry_id) = self.entry.as_ref().map(|e| e.id) else {
            self.rating_modal.finish();
            return Vec::new();
        };
        self.pending_rating = Some(rating);
        vec![Effect::Command(
            ctx.primary(CommandKind::UpdateRating, queries::update_rating(entry_id, rating))
                .keyed(self.book_id),
        )]
    }

    fn on_confirm_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        let (confirmed, _) = self.confirm.handle_key(key);
        if !confirmed {
            return Vec::new();
        }
        match self.confirm.action() {
            Some(DetailAction::RemoveFromList(membership)) => vec![Effect::Command(
                ctx.primary(
                    CommandKind::RemoveFromList,
                    queries::delete_list_book(membership.list_book_id),
                )
                .keyed(self.book_id),
            )],
            Some(DetailAction::DeleteJournalEntry { id }) => {
                info!("Deleting journal entry {}", id);
                vec![Effect::Command(
                    ctx.primary(CommandKind::DeleteJournal, queries::delete_journal(id))
                        .keyed(self.book_id),
                )]
            }
            None => Vec::new(),
        }
    }

    fn on_list_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        let Some(SelectOutcome::Commit((list_id, name))) = self.list_modal.handle_key(key) else {
            return Vec::new();
        };
        self.pending_list = Some(name);
        vec![Effect::Command(
            ctx.primary(
                CommandKind::AddToList,
                queries::insert_list_book(list_id, self.book_id),
            )
            .keyed(self.book_id),
        )]
    }

    /// Picking an entry hands over to the confirm dialog.
    fn on_journal_key(&mut self, key: &str) -> Vec<Effect> {
        if let Some(SelectOutcome::Commit(id)) = self.journal_modal.handle_key(key) {
            self.journal_modal.finish();
            self.confirm
                .open("Delete this journal entry?", DetailAction::DeleteJournalEntry { id });
        }
        Vec::new()
    }

    fn on_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        if self.confirm.is_active() {
            return self.on_confirm_key(ctx, key);
        }
        if self.status_modal.is_blocking() {
            return self.on_status_key(ctx, key);
        }
        if self.rating_modal.is_blocking() {
            return self.on_rating_key(ctx, key);
        }
        if self.list_modal.is_blocking() {
            return self.on_list_key(ctx, key);
        }
        if self.journal_modal.is_blocking() {
            return self.on_journal_key(key);
        }
        if self.book.is_none() {
            return Vec::new();
        }

        match key {
            "s" => {
                let cursor = self
                    .entry
                    .as_ref()
                    .and_then(UserBook::status)
                    .and_then(|s| ReadingStatus::ALL.iter().position(|x| *x == s))
                    .unwrap_or(0);
                self.status_modal.open(cursor);
                Vec::new()
            }
            "r" => match &self.entry {
                Some(entry) => {
                    let cursor = entry
                        .rating
                        .map(|r| (10 - (r * 2.0).round().clamp(1.0, 10.0) as usize))
                        .unwrap_or(0);
                    self.rating_modal.open(cursor);
                    Vec::new()
                }
                None => vec![Effect::notify(
                    Level::Warning,
                    "Add the book to your library to rate it",
                )],
            },
            "a" => {
                if self.entry.is_some() {
                    vec![Effect::notify(Level::Info, "Already in your library")]
                } else if self.adding {
                    Vec::new()
                } else {
                    self.add_to_library(ctx, ReadingStatus::WantToRead)
                }
            }
            "l" => {
                if self.fetching_lists {
                    return Vec::new();
                }
                self.fetching_lists = true;
                vec![Effect::Command(
                    ctx.primary(CommandKind::UserLists, queries::lists(ctx.user.id))
                        .keyed(self.book_id),
                )]
            }
            "w" => match &self.entry {
                Some(entry) => vec![Effect::Navigate(Navigation::WriteReview {
                    user_book_id: entry.id,
                    title: self.title(),
                    draft: entry.review.clone(),
                })],
                None => vec![Effect::notify(
                    Level::Warning,
                    "Add the book to your library to review it",
                )],
            },
            "p" => match self.entry.as_ref().and_then(UserBook::current_read) {
                Some(read) => vec![Effect::Navigate(Navigation::UpdateProgress {
                    read_id: read.id,
                    title: self.title(),
                    current: read.progress_pages,
                    total: self.book.as_ref().and_then(|b| b.pages),
                })],
                None => vec![Effect::notify(
                    Level::Warning,
                    "Start reading the book to track progress",
                )],
            },
            "d" => match &self.journal {
                Section::Ready(entries) if !entries.is_empty() => {
                    let options = entries.iter().map(|e| (e.summary(40), e.id)).collect();
                    self.journal_modal = SelectModal::new("Delete journal entry", options);
                    self.journal_modal.open(0);
                    Vec::new()
                }
                _ => vec![Effect::notify(Level::Info, "No journal entries for this book")],
            },
            "x" => match self.from_list.clone() {
                Some(membership) => {
                    let message = format!("Remove from \"{}\"?", membership.list_name);
                    self.confirm
                        .open(message, DetailAction::RemoveFromList(membership));
                    Vec::new()
                }
                None => Vec::new(),
            },
            k if keys::DOWN.matches(k) => {
                self.scroll.scroll_down();
                Vec::new()
            }
            k if keys::UP.matches(k) => {
                self.scroll.scroll_up();
                Vec::new()
            }
            "pgdown" => {
                self.scroll.scroll_page_down();
                Vec::new()
            }
            "pgup" => {
                self.scroll.scroll_page_up();
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn content(&self, book: &Book, width: u16) -> Vec<Line<'static>> {
        let muted = Style::default().fg(Color::DarkGray);
        let heading = Style::default().add_modifier(Modifier::BOLD);
        let mut lines = Vec::new();

        lines.push(Line::styled(
            book.title.clone(),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));
        if let Some(subtitle) = &book.subtitle {
            lines.extend(wrapped(subtitle, width, Style::default().fg(Color::Gray)));
        }
        lines.push(Line::from(format!("by {}", book.authors())));

        let mut meta = Vec::new();
        if let Some(year) = book.release_year {
            meta.push(year.to_string());
        }
        if let Some(pages) = book.pages {
            meta.push(format!("{pages} pages"));
        }
        if let Some(r) = book.rating {
            meta.push(format!("{} {:.2}", rating_stars(r), r));
        }
        if !meta.is_empty() {
            lines.push(Line::styled(meta.join(" · "), muted));
        }
        lines.push(Line::default());

        match &self.entry {
            Some(entry) => {
                let status = entry.status();
                let mut spans = vec![Span::styled(
                    status.map(ReadingStatus::label).unwrap_or("Unknown"),
                    Style::default().fg(status_color(status)),
                )];
                if let Some(r) = entry.rating {
                    spans.push(Span::raw(format!("  your rating {}", rating_stars(r))));
                }
                lines.push(Line::from(spans));
            }
            None => lines.push(Line::styled("Not in your library", muted)),
        }
        if let Some(m) = &self.from_list {
            lines.push(Line::styled(format!("On list: {}", m.list_name), muted));
        }
        lines.push(Line::default());

        match &self.cover {
            Section::Ready(Some(image)) => {
                let size = match (image.width, image.height) {
                    (Some(w), Some(h)) => format!(" ({w}×{h})"),
                    _ => String::new(),
                };
                lines.push(Line::styled(format!("Cover: {}{}", image.url, size), muted));
            }
            Section::Loading => lines.push(Line::styled("Cover: loading…", muted)),
            _ => {}
        }

        match &self.tags {
            Section::Ready(tags) if !tags.is_empty() => {
                let names: Vec<&str> = tags.iter().map(|t| t.tag.as_str()).collect();
                lines.extend(wrapped(
                    &format!("Genres: {}", names.join(", ")),
                    width,
                    Style::default().fg(Color::Magenta),
                ));
            }
            Section::Loading => lines.push(Line::styled("Genres: loading…", muted)),
            Section::Failed => lines.push(Line::styled("Genres unavailable", muted)),
            _ => {}
        }
        lines.push(Line::default());

        if let Some(description) = &book.description {
            lines.push(Line::styled("Description", heading));
            lines.extend(wrapped(description, width, Style::default()));
            lines.push(Line::default());
        }

        lines.push(Line::styled("Reviews", heading));
        match &self.reviews {
            Section::Ready(reviews) if reviews.is_empty() => {
                lines.push(Line::styled("No reviews yet.", muted));
            }
            Section::Ready(reviews) => {
                for review in reviews {
                    let stars = review.rating.map(rating_stars).unwrap_or_default();
                    lines.push(Line::from(vec![
                        Span::styled(format!("@{}", review.user.username), heading),
                        Span::raw(format!("  {stars}")),
                    ]));
                    if let Some(text) = &review.review {
                        lines.extend(wrapped(text, width, Style::default().fg(Color::Gray)));
                    }
                    lines.push(Line::default());
                }
            }
            Section::Loading | Section::Idle => lines.push(Line::styled("Loading…", muted)),
            Section::Failed => lines.push(Line::styled("Reviews unavailable", muted)),
        }

        lines.push(Line::styled("Journal", heading));
        match &self.journal {
            Section::Ready(entries) if entries.is_empty() => {
                lines.push(Line::styled("No journal entries.", muted));
            }
            Section::Ready(entries) => {
                for entry in entries {
                    lines.extend(wrapped(
                        &entry.summary(usize::from(width)),
                        width,
                        Style::default().fg(Color::Gray),
                    ));
                }
            }
            Section::Loading | Section::Idle => lines.push(Line::styled("Loading…", muted)),
            Section::Failed => lines.push(Line::styled("Journal unavailable", muted)),
        }
        lines
    }
}

/// Folds a follow-up outcome into its section. Failures are logged only.
fn settle<T>(outcome: Result<T, DataError>, what: &str) -> Section<T> {
    match outcome {
        Ok(value) => Section::Ready(value),
        Err(e) => {
            warn!("Loading {} failed: {}", what, e);
            Section::Failed
        }
    }
}

impl Screen for BookDetailScreen {
    fn title(&self) -> String {
        self.book
            .as_ref()
            .map(|b| b.title.clone())
            .unwrap_or_else(|| format!("Book {}", self.book_id))
    }

    fn init(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.fetch_primary(ctx)
    }

    fn reload(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
        self.fetch_primary(ctx)
    }

    fn invalidated(&mut self, ctx: &ScreenContext, topic: Topic) -> Vec<Effect> {
        match topic {
            Topic::Library => vec![self.fetch_entry(ctx)],
            Topic::Lists => Vec::new(),
        }
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => self.on_key(ctx, &key),
            ScreenEvent::Result(result) => self.on_result(ctx, result),
            ScreenEvent::Paste(_) | ScreenEvent::Settled(_) => Vec::new(),
        }
    }

    fn set_size(&mut self, width: u16, _height: u16) {
        self.width = width;
    }

    fn input_focused(&self) -> bool {
        self.confirm.is_active()
            || self.status_modal.is_blocking()
            || self.rating_modal.is_blocking()
            || self.list_modal.is_blocking()
            || self.journal_modal.is_blocking()
    }

    fn loaded(&self) -> bool {
        !self.loading
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        let mut bindings = vec![SCROLL, STATUS];
        match &self.entry {
            Some(entry) => {
                bindings.extend([RATE, REVIEW]);
                if entry.current_read().is_some() {
                    bindings.push(PROGRESS);
                }
            }
            None => bindings.push(ADD),
        }
        bindings.push(ADD_TO_LIST);
        if matches!(&self.journal, Section::Ready(entries) if !entries.is_empty()) {
            bindings.push(DELETE_JOURNAL);
        }
        if self.from_list.is_some() {
            bindings.push(REMOVE);
        }
        bindings
    }
}

impl Component for BookDetailScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(err.clone(), Style::default().fg(Color::Red)))
                    .wrap(Wrap { trim: true }),
                area,
            );
            return;
        }
        let Some(book) = &self.book else {
            return;
        };

        // One column for the scrollbar.
        let width = area.width.saturating_sub(1).max(1);
        let lines = self.content(book, width);
        let height = (lines.len() as u16).max(1);
        let mut scroll_view = ScrollView::new(Size::new(width, height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(Paragraph::new(lines), Rect::new(0, 0, width, height));
        frame.render_stateful_widget(scroll_view, area, &mut self.scroll);

        if self.status_modal.is_blocking() {
            let panel = overlay::render_panel(
                SelectPanel::new(&self.status_modal),
                MODAL_WIDTH,
                self.status_modal.height(),
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
        } else if self.rating_modal.is_blocking() {
            let panel = overlay::render_panel(
                SelectPanel::new(&self.rating_modal),
                MODAL_WIDTH,
                self.rating_modal.height(),
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
        } else if self.list_modal.is_blocking() {
            let panel = overlay::render_panel(
                SelectPanel::new(&self.list_modal),
                MODAL_WIDTH,
                self.list_modal.height(),
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
        } else if self.journal_modal.is_blocking() {
            let panel = overlay::render_panel(
                SelectPanel::new(&self.journal_modal),
                JOURNAL_MODAL_WIDTH,
                self.journal_modal.height(),
            );
            overlay::paint(&panel, frame.buffer_mut(), area, Anchor::Center);
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
