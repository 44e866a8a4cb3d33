//! # Setup Screen
//!
//! Token entry shown whenever there is no usable session. The token is typed
//! (or pasted) into a masked field and validated by fetching the profile with
//! it. On success the screen emits `Effect::Authenticated`; persisting the
//! token is the controller's job.
//!
//! ```text
//! Input ──enter──▶ Validating ──ok──▶ (Authenticated)
//!   ▲                  │
//!   └──enter── Error ◀─┘ err
//! ```

use std::sync::Arc;

use log::{info, warn};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Flex, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::{Credential, DataError, User, extract, queries};
use crate::core::scheduler::{Command, CommandKind};
use crate::tui::component::{Component, EventHandler};
use crate::tui::components::text_input::{InputEvent, TextInput};
use crate::tui::keys::KeyBinding;
use crate::tui::screen::{Effect, Screen, ScreenContext, ScreenEvent};

use super::describe;

#[derive(Debug, Clone, PartialEq)]
pub enum SetupState {
    Input,
    Validating,
    Error(String),
}

pub struct SetupScreen {
    input: TextInput,
    state: SetupState,
    attempt: i64,
    pending: Option<Credential>,
}

impl Default for SetupScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl SetupScreen {
    pub fn new() -> Self {
        Self {
            input: TextInput::new("Bearer xxxxxxxxxx...").masked(),
            state: SetupState::Input,
            attempt: 0,
            pending: None,
        }
    }

    /// Opens in the error state, e.g. after a stored token stopped working.
    pub fn with_error(message: impl Into<String>) -> Self {
        let mut screen = Self::new();
        screen.fail(message);
        screen
    }

    pub fn fail(&mut self, message: impl Into<String>) {
        self.pending = None;
        self.state = SetupState::Error(message.into());
    }

    pub fn state(&self) -> &SetupState {
        &self.state
    }

    fn submit(&mut self, ctx: &ScreenContext, token: String) -> Vec<Effect> {
        if token.is_empty() {
            return Vec::new();
        }
        self.attempt += 1;
        self.state = SetupState::Validating;
        let credential = Credential::new(token);
        self.pending = Some(credential.clone());
        info!("Validating token (attempt {})", self.attempt);

        let source = Arc::clone(&ctx.source);
        let request = queries::me();
        let command = Command::new(
            CommandKind::ValidateToken,
            ctx.timeouts().primary,
            async move { source.query(&credential, &request).await },
        )
        .keyed(self.attempt);
        vec![Effect::Command(command)]
    }
}

/// First row of `me`. The API returns it as a one-element list.
pub fn decode_me(data: &serde_json::Value) -> Result<User, DataError> {
    let users: Vec<User> = extract(data, "me")?;
    users
        .into_iter()
        .next()
        .ok_or_else(|| DataError::Parse("me: empty result".to_string()))
}

impl Screen for SetupScreen {
    fn title(&self) -> String {
        "Setup".to_string()
    }

    fn init(&mut self, _ctx: &ScreenContext) -> Vec<Effect> {
        Vec::new()
    }

    fn handle_event(&mut self, ctx: &ScreenContext, event: ScreenEvent) -> Vec<Effect> {
        match event {
            ScreenEvent::Key(key) => match self.state {
                SetupState::Validating => Vec::new(),
                SetupState::Error(_) => {
                    if key == "enter" {
                        self.state = SetupState::Input;
                        self.input.clear();
                    }
                    Vec::new()
                }
                SetupState::Input => match self.input.handle_key(&key) {
                    Some(InputEvent::Submit(token)) => self.submit(ctx, token),
                    _ => Vec::new(),
                },
            },
            ScreenEvent::Paste(text) => {
                if self.state == SetupState::Input {
                    self.input.paste(&text);
                }
                Vec::new()
            }
            ScreenEvent::Result(result) => {
                if result.kind != CommandKind::ValidateToken || result.key != Some(self.attempt) {
                    return Vec::new();
                }
                let Some(credential) = self.pending.take() else {
                    return Vec::new();
                };
                match result.outcome.and_then(|data| decode_me(&data)) {
                    Ok(user) => {
                        info!("Token accepted for @{}", user.username);
                        vec![Effect::Authenticated { credential, user }]
                    }
                    Err(e) => {
                        warn!("Token validation failed: {}", e);
                        self.state = SetupState::Error(describe(&e));
                        Vec::new()
                    }
                }
            }
            ScreenEvent::Settled(_) => Vec::new(),
        }
    }

    fn input_focused(&self) -> bool {
        true
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        let enter = match self.state {
            SetupState::Error(_) => "try again",
            _ => "continue",
        };
        vec![
            KeyBinding::new(&["enter"], "enter", enter),
            KeyBinding::new(&["ctrl+c"], "ctrl+c", "quit"),
        ]
    }
}

impl Component for SetupScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let [body] = Layout::vertical([Constraint::Length(11)])
            .flex(Flex::Center)
            .areas(area);
        let [body] = Layout::horizontal([Constraint::Max(64)])
            .flex(Flex::Center)
            .areas(body);

        let [title, _, label, field, _, footer, _, help] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(body);

        frame.render_widget(
            Paragraph::new(Line::styled(
                "folio",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ))
            .alignment(Alignment::Center),
            title,
        );

        let muted = Style::default().fg(Color::DarkGray);
        match &self.state {
            SetupState::Input => {
                frame.render_widget(Paragraph::new("Enter your API token:"), label);
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan));
                let inner = block.inner(field);
                frame.render_widget(block, field);
                self.input.focused = true;
                self.input.render(frame, inner);
                frame.render_widget(
                    Paragraph::new(Line::styled(
                        "Get your token from https://hardcover.app/account/api",
                        muted,
                    )),
                    footer,
                );
            }
            SetupState::Validating => {
                frame.render_widget(
                    Paragraph::new("Validating token...").alignment(Alignment::Center),
                    field,
                );
            }
            SetupState::Error(message) => {
                frame.render_widget(
                    Paragraph::new(Line::styled(
                        "Authentication failed",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    ))
                    .alignment(Alignment::Center),
                    label,
                );
                frame.render_widget(
                    Paragraph::new(Line::styled(message.clone(), muted))
                        .alignment(Alignment::Center)
                        .wrap(ratatui::widgets::Wrap { trim: true }),
                    field,
                );
            }
        }

        let hints: Vec<String> = self
            .help_bindings()
            .iter()
            .map(|b| format!("{} {}", b.label, b.help))
            .collect();
        frame.render_widget(
            Paragraph::new(Line::styled(hints.join("  "), muted)).alignment(Alignment::Center),
            help,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scheduler::{CommandId, CommandResult, Origin, ScreenId};
    use crate::test_support::{ScriptedSource, me_response, test_context};

    fn key(k: &str) -> ScreenEvent {
        ScreenEvent::Key(k.to_string())
    }

    fn validated(attempt: i64, outcome: Result<serde_json::Value, DataError>) -> ScreenEvent {
        ScreenEvent::Result(CommandResult {
            id: CommandId(1),
            origin: Origin::Screen(ScreenId(0)),
            kind: CommandKind::ValidateToken,
            key: Some(attempt),
            outcome,
        })
    }

    #[test]
    fn test_blank_token_is_ignored() {
        let ctx = test_context(ScriptedSource::new());
        let mut setup = SetupScreen::new();
        assert!(setup.handle_event(&ctx, key("enter")).is_empty());
        assert_eq!(setup.state(), &SetupState::Input);
    }

    #[test]
    fn test_submit_then_success_authenticates() {
        let ctx = test_context(ScriptedSource::new());
        let mut setup = SetupScreen::new();
        for c in "tok".chars() {
            setup.handle_event(&ctx, key(&c.to_string()));
        }
        let effects = setup.handle_event(&ctx, key("enter"));
        assert!(matches!(
            effects.as_slice(),
            [Effect::Command(c)] if c.kind == CommandKind::ValidateToken && c.key == Some(1)
        ));
        assert_eq!(setup.state(), &SetupState::Validating);

        // Keys are ignored while validating
        assert!(setup.handle_event(&ctx, key("enter")).is_empty());

        let effects = setup.handle_event(&ctx, validated(1, Ok(me_response())));
        match effects.as_slice() {
            [Effect::Authenticated { credential, user }] => {
                assert_eq!(credential.as_str(), "tok");
                assert_eq!(user.username, "reader");
            }
            other => panic!("unexpected effects: {other:?}"),
        }
    }

    #[test]
    fn test_failure_then_enter_resets_input() {
        let ctx = test_context(ScriptedSource::new());
        let mut setup = SetupScreen::new();
        setup.handle_event(&ctx, ScreenEvent::Paste("bad".into()));
        setup.handle_event(&ctx, key("enter"));

        let effects = setup.handle_event(
            &ctx,
            validated(1, Err(DataError::Unauthorized("invalid".into()))),
        );
        assert!(effects.is_empty());
        assert!(matches!(setup.state(), SetupState::Error(msg) if msg.contains("rejected")));

        setup.handle_event(&ctx, key("enter"));
        assert_eq!(setup.state(), &SetupState::Input);
        assert_eq!(setup.input.value(), "");
    }

    #[test]
    fn test_result_for_old_attempt_dropped() {
        let ctx = test_context(ScriptedSource::new());
        let mut setup = SetupScreen::new();
        setup.handle_event(&ctx, ScreenEvent::Paste("tok".into()));
        setup.handle_event(&ctx, key("enter"));
        assert!(setup.handle_event(&ctx, validated(0, Ok(me_response()))).is_empty());
        assert_eq!(setup.state(), &SetupState::Validating);
    }

    #[test]
    fn test_empty_me_is_parse_error() {
        let data = serde_json::json!({ "me": [] });
        assert!(matches!(decode_me(&data), Err(DataError::Parse(_))));
    }
}
