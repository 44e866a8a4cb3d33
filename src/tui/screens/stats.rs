//! # Stats Screen
//!
//! Book counts per reading status and this year's reading goal. Each fetch
//! bumps a generation; only the newest generation's result is applied.

use chrono::{Datelike, Local, NaiveDate};
use log::debug;
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::api::{DataError, Goal, ReadingStatus, StatusCount, extract};
use crate::api::queries;
use crate::core::notify::Level;
use crate::core::scheduler::{CommandKind, CommandResult};
use crate::tui::component::Component;
use crate::tui::keys::KeyBinding;
use crate::tui::screen::{Effect, Screen, ScreenContext, ScreenEvent, Topic};

use super::{describe, status_color};

const REFRESH: KeyBinding = KeyBinding::new(&["r"], "r", "refresh");
const BAR_WIDTH: usize = 30;

#[derive(Debug, Clone, Default, PartialEq)]
struct Snapshot {
    counts: Vec<(ReadingStatus, i64)>,
    goal: Option<Goal>,
}

pub struct StatsScreen {
    snapshot: Option<Snapshot>,
    generation: i64,
    loading: bool,
    error: Option<String>,
}

impl Default for StatsScreen {
    fn default() -> Self {
        Self::new()
    }
}

/// The goal that started in `year`, if any.
fn goal_for_year(goals: Vec<Goal>, year: i32) -> Option<Goal> {
    goals.into_iter().find(|g| {
        g.start_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d.get(..10).unwrap_or(d), "%Y-%m-%d").ok())
            .is_some_and(|d| d.year() == year)
    })
}

fn decode(data: &serde_json::Value, year: i32) -> Result<Snapshot, DataError> {
    let rows: Vec<StatusCount> = extract(data, "status_counts")?;
    let goals: Vec<Goal> = extract::<Option<Vec<Goal>>>(data, "goals")?.unwrap_or_default();
    let counts = ReadingStatus::ALL
        .into_iter()
        .map(|status| {
            let count = rows
                .iter()
                .filter(|r| r.status_id == status.id())
                .map(|r| r.count)
                .sum();
            (status, count)
        })
        .collect();
    Ok(Snapshot {
        counts,
        goal: goal_for_year(goals, year),
    })
}

impl StatsScreen {
    pub fn new() -> Self {
        Self {
            snapshot: None,
            generation: 0,
            loading: true,
            error: None,
        }
    }

    fn fetch(&mut self, ctx: &ScreenContext) -> Effect {
        self.generation += 1;
        Effect::Command(
            ctx.primary(CommandKind::Stats, queries::status_counts(ctx.user.id))
                .keyed(self.generation),
        )
    }

    fn on_result(&mut self, result: CommandResult) -> Vec<Effect> {
        if result.kind != CommandKind::Stats {
            return Vec::new();
        }
        if result.key != Some(self.generation) {
            debug!("Dropping stats for generation {:?}", result.key);
            return Vec::new();
        }
        let had_data = self.snapshot.is_some();
        self.loading = false;
        let year = Local::now().year();
        match result.outcome.and_then(|data| decode(&data, year)) {
            Ok(snapshot) => {
                debug!("Stats loaded: {:?}", snapshot.counts);
                self.error = None;
                self.snapshot = Some(snapshot);
                Vec::new()
            }
            Err(e) if had_data => vec![Effect::notify(Level::Error, describe(&e))],
            Err(e) => {
                self.error = Some(describe(&e));
                Vec::new()
            }
        }
    }
}

impl Screen for StatsScreen {
    fn title(&self) -> String {
        "Stats".to_string()
    }

    fn init(&mut self, ctx: &ScreenContext) -> Vec<Effect> {
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
            ScreenEvent::Key(key) if REFRESH.matches(&key) => vec![self.fetch(ctx)],
            ScreenEvent::Result(result) => self.on_result(result),
            _ => Vec::new(),
        }
    }

    fn loaded(&self) -> bool {
        !self.loading
    }

    fn help_bindings(&self) -> Vec<KeyBinding> {
        vec![REFRESH]
    }
}

impl Component for StatsScreen {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Line::styled(err.clone(), Style::default().fg(Color::Red))),
                area,
            );
            return;
        }
        let Some(snapshot) = &self.snapshot else {
            return;
        };

        let rows = snapshot.counts.len() as u16 + 2;
        let [counts_area, goal_area] =
            Layout::vertical([Constraint::Length(rows), Constraint::Length(4)]).areas(area);

        let max = snapshot.counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1);
        let lines: Vec<Line> = snapshot
            .counts
            .iter()
            .map(|(status, count)| {
                let filled = (*count as usize * BAR_WIDTH) / max as usize;
                Line::from(vec![
                    Span::raw(format!("{:<18}", status.label())),
                    Span::styled(
                        "█".repeat(filled),
                        Style::default().fg(status_color(Some(*status))),
                    ),
                    Span::styled(format!(" {count}"), Style::default().add_modifier(Modifier::BOLD)),
                ])
            })
            .collect();
        frame.render_widget(
            Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title(" Library ")),
            counts_area,
        );

        let goal_block = Block::default().borders(Borders::ALL).title(" Reading goal ");
        match &snapshot.goal {
            Some(goal) if goal.goal > 0 => {
                let ratio = (goal.progress as f64 / goal.goal as f64).clamp(0.0, 1.0);
                frame.render_widget(
                    Gauge::default()
                        .block(goal_block)
                        .gauge_style(Style::default().fg(Color::Green))
                        .ratio(ratio)
                        .label(format!("{} / {} books", goal.progress, goal.goal)),
                    goal_area,
                );
            }
            _ => frame.render_widget(
                Paragraph::new(Line::styled(
                    "No goal set for this year.",
                    Style::default().fg(Color::DarkGray),
                ))
                .block(goal_block),
                goal_area,
            ),
        }
    }
}
