//! # Progress Screen
//!
//! Page progress for the current read of a library entry. The page number is
//! checked locally, then confirmed before the update is sent; a saved update
//! pops back to the book. The field holds the keyboard (digits would
//! otherwise switch tabs) until `esc` releases it.

use log::{debug, info};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::api::queries;
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::confirm::{ConfirmDialog, ConfirmPanel};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::keys::KeyBinding;
use crate::tui::overlay::{self, Anchor};
use crate::tui::screen::{Effect, Navigation, Screen, ScreenContext, ScreenEvent, Topic};

use super::describe;

const UPDATE: KeyBinding = KeyBinding::new(&["enter"], "enter", "update");
const EDIT: KeyBinding = KeyBinding::new(&["i"], "i", "edit");
const STOP: KeyBinding = KeyBinding::new(&["esc"], "esc", "stop editing");

/// Parses a page number, rejecting negatives and pages past the end.
fn parse_page(text: &str, total: Option<i64>) -> Result<i64, String> {
    let page: i64 = text
        .trim()
        .parse()
        .map_err(|_| "Enter a valid page number.".to_string())?;
    if page < 0 {
        return Err("Enter a valid page number.".to_string());
    }
    if let Some(total) = total.filter(|t| *t > 0)
        && page > total
    {
        return Err(format!("This edition has {total} pages."));
    }
    Ok(page)
}

pub struct ProgressScreen {
    read_id: i64,
    title: String,
    current: Option<i64>,
    total: Option<i64>,
    input: TextInput,
    confirm: ConfirmDialog<i64>,
    saving: bool,
    error: Option<String>,
    width: u16,
}

impl ProgressScreen {
    pub fn new(read_id: i64, title: String, current: Option<i64>, total: Option<i64>) -> Self {
        let mut input = TextInput::new("Current page...");
        if let Some(page) = current {
            input.set_value(&page.to_string());
        }
        Self {
            read_id,
            title,
            current,
            total,
            input,
            confirm: ConfirmDialog::new(),
            saving: false,
            error: None,
            width: 80,
        }
    }

    fn on_result(&mut self, result: CommandResult) -> Vec<Effect> {
        if !result.is(CommandKind::UpdateProgress, Some(self.read_id)) {
            debug!("Progress dropping {:?} for key {:?}", result.kind, result.key);
            return Vec::new();
        }
        self.saving = false;
        match result.outcome {
            Ok(_) => vec![
                Effect::notify(Level::Success, "Progress updated"),
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
        if self.confirm.is_active() {
            let (confirmed, _) = self.confirm.handle_key(key);
            return match self.confirm.action() {
                Some(pages) if confirmed => {
                    self.saving = true;
                    info!("Updating read {} to page {}", self.read_id, pages);
                    vec![Effect::Command(
                        ctx.primary(
                            CommandKind::UpdateProgress,
                            queries::update_progress(self.read_id, pages),
                        )
                        .keyed(self.read_id),
                    )]
                }
                _ => Vec::new(),
            };
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
            Some(InputEvent::Submit(text)) => {
                match parse_page(&text, self.total) {
                    Ok(page) => {
                        self.error = None;
                        self.confirm
                            .open(format!("Update progress to page {page}?"), page);
                    }
                    Err(message) => self.error = Some(message),
                }
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

impl Screen for ProgressScreen {
    fn title(&self) -> String {
        format!("Progress: {}", self.title)
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
            ScreenEvent::Result(result) => self.on_result(result),
            ScreenEvent::Paste(_) | ScreenEvent::Settled(_) => Vec::new(),
        }
    }

    fn set_size(&mut self, width: u16, _height: u16) {
        self.width = width;
    }

    fn input_focused(&self) -> bool {
        self.input.focused || self.confirm.is_active() || self.saving
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        if self.input.focused {
            vec![UPDATE, STOP]
        } else {
            vec![EDIT]
        }
    }
}

impl Component for ProgressScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [heading, gauge, field, status] = Layout::vertical([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .areas(area);

        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("Progress · {}", self.title),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            )),
            heading,
        );

        let block = Block::default().borders(Borders::ALL).title(" Pages read ");
        match (self.current, self.total) {
            (Some(current), Some(total)) if total > 0 => {
                let ratio = (current as f64 / total as f64).clamp(0.0, 1.0);
                frame.render_widget(
                    Gauge::default()
                        .block(block)
                        .gauge_style(Style::default().fg(Color::Green))
                        .ratio(ratio)
                        .label(format!("{current} / {total}")),
                    gauge,
                );
            }
            (current, _) => {
                let text = match current {
                    Some(page) => format!("Page {page}"),
                    None => "Not started".to_string(),
                };
                frame.render_widget(
                    Paragraph::new(Line::styled(text, Style::default().fg(Color::DarkGray)))
                        .block(block),
                    gauge,
                );
            }
        }

        let border = if self.input.focused { Color::Cyan } else { Color::DarkGray };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(" Page ");
        let inner = block.inner(field);
        frame.render_widget(block, field);
        self.input.render(frame, inner);

        let line = if self.saving {
            Line::styled("Updating…", Style::default().fg(Color::Yellow))
        } else if let Some(err) = &self.error {
            Line::styled(err.clone(), Style::default().fg(Color::Red))
        } else {
            Line::default()
        };
        frame.render_widget(Paragraph::new(line), status);

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
