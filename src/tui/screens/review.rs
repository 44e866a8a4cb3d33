//! # Review Screen
//!
//! Pushed over book detail with `w`. Opens with the existing review in the
//! field and the field focused; `esc` leaves the field, `i` or `enter` returns
//! to it. Submitting saves and pops back to the book.

use log::{debug, info};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::api::queries;
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::keys::KeyBinding;
use crate::tui::screen::{Effect, Navigation, Screen, ScreenContext, ScreenEvent, Topic};

use super::describe;

const SAVE: KeyBinding = KeyBinding::new(&["enter"], "enter", "save");
const EDIT: KeyBinding = KeyBinding::new(&["i"], "i", "edit");
const STOP: KeyBinding = KeyBinding::new(&["esc"], "esc", "stop editing");

pub struct ReviewScreen {
    user_book_id: i64,
    title: String,
    input: TextInput,
    saving: bool,
    error: Option<String>,
}

impl ReviewScreen {
    pub fn new(user_book_id: i64, title: String, draft: Option<String>) -> Self {
        let mut input = TextInput::new("Write your review...");
        if let Some(draft) = draft {
            input.set_value(draft.trim());
        }
        Self {
            user_book_id,
            title,
            input,
            saving: false,
            error: None,
        }
    }

    fn save(&mut self, ctx: &ScreenContext, text: String) -> Vec<Effect> {
        if text.is_empty() {
            return vec![Effect::notify(Level::Warning, "The review is empty")];
        }
        self.saving = true;
        self.error = None;
        info!("Saving review for user book {}", self.user_book_id);
        vec![Effect::Command(
            ctx.primary(
                CommandKind::SaveReview,
                queries::update_review(self.user_book_id, &text),
            )
            .keyed(self.user_book_id),
        )]
    }

    fn on_result(&mut self, result: CommandResult) -> Vec<Effect> {
        if !result.is(CommandKind::SaveReview, Some(self.user_book_id)) {
            debug!("Review dropping {:?} for key {:?}", result.kind, result.key);
            return Vec::new();
        }
        self.saving = false;
        match result.outcome {
            Ok(_) => vec![
                Effect::notify(Level::Success, "Review saved"),
                Effect::Invalidate(Topic::Library),
                Effect::Navigate(Navigation::Back),
            ],
            Err(e) => {
                let message = describe(&e);
                self.error = Some(message.clone());
                vec![Effect::notify(Level::Error, message)]
            }
        }
    }

    fn on_key(&mut self, ctx: &ScreenContext, key: &str) -> Vec<Effect> {
        if self.saving {
            return Vec::new();
        }
        if !self.input.focused {
            if matches!(key, "i" | "enter") {
                self.input.focused = true;
            }
            return Vec::new();
        }
        if key == "esc" {
            self.input.focused = false;
            return Vec::new();
        }
        match self.input.handle_key(key) {
            Some(InputEvent::Submit(text)) => self.save(ctx, text),
            _ => Vec::new(),
        }
    }
}

impl Screen for ReviewScreen {
    fn title(&self) -> String {
        format!("Review: {}", self.title)
    }

    fn init(&mut self, _ctx: &ScreenContext) -> Vec<Effect> {
        Vec::new()
    }

    fn reload(&mut self, _ctx: &ScreenContext) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => self.on_key(ctx, &key),
            ScreenEvent::Paste(text) => {
                if self.input.focused && !self.saving {
                    self.input.paste(&text);
                }
                Vec::new()
            }
            ScreenEvent::Result(result) => self.on_result(result),
            ScreenEvent::Settled(_) => Vec::new(),
        }
    }

    /// While saving, keys are swallowed here rather than popping the screen.
    fn input_focused(&self) -> bool {
        self.input.focused || self.saving
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        if self.input.focused {
            vec![SAVE, STOP]
        } else {
            vec![EDIT]
        }
    }
}

impl Component for ReviewScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [heading, field, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("Review · {}", self.title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            heading,
        );

        let border = if self.input.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border));
        let inner = block.inner(field);
        frame.render_widget(block, field);
        self.input.render(frame, inner);

        let line = if self.saving {
            Line::styled("Saving…", Style::default().fg(Color::Yellow))
        } else if let Some(err) = &self.error {
            Line::styled(err.clone(), Style::default().fg(Color::Red))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: true }), status);
    }
}
