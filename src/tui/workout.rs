//! Workout screen - planned exercises with load entry

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};

use super::Action;
use crate::models::Workout;
use crate::program::{phase_name, workout_focus};
use crate::workout::{LoadSheet, focus_index, format_load};

#[derive(Default)]
pub(super) struct WorkoutScreen {
    workouts: Vec<Workout>,
    focus: usize,
    cursor: usize,
    sheet: LoadSheet,
}

impl WorkoutScreen {
    pub(super) fn set_workouts(&mut self, workouts: Vec<Workout>, today: NaiveDate) {
        self.focus = focus_index(&workouts, today).unwrap_or(0);
        self.workouts = workouts;
        self.reset_sheet();
    }

    fn reset_sheet(&mut self) {
        self.cursor = 0;
        self.sheet = self
            .focused()
            .map(LoadSheet::for_workout)
            .unwrap_or_default();
    }

    pub(super) fn focused(&self) -> Option<&Workout> {
        self.workouts.get(self.focus)
    }

    pub(super) fn sheet(&self) -> &LoadSheet {
        &self.sheet
    }

    fn cursor_exercise(&self) -> Option<String> {
        self.focused()
            .and_then(|w| w.exercises.get(self.cursor))
            .map(|e| e.name.clone())
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Action {
        let Some(workout) = self.focused() else {
            return Action::None;
        };
        let exercise_count = workout.exercises.len();
        let is_rest = workout.is_rest();

        match key.code {
            KeyCode::Left if self.focus > 0 => {
                self.focus -= 1;
                self.reset_sheet();
            }
            KeyCode::Right if self.focus + 1 < self.workouts.len() => {
                self.focus += 1;
                self.reset_sheet();
            }
            _ if is_rest => {}
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down if self.cursor + 1 < exercise_count => self.cursor += 1,
            KeyCode::Char('s') => return Action::SaveWorkout,
            KeyCode::Char('g') => {
                if let Some(name) = self.cursor_exercise() {
                    return Action::ShowExercise(name);
                }
            }
            KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => {
                if let Some(name) = self.cursor_exercise() {
                    self.sheet.push_char(&name, c);
                }
            }
            KeyCode::Backspace => {
                if let Some(name) = self.cursor_exercise() {
                    self.sheet.pop_char(&name);
                }
            }
            KeyCode::Delete => {
                if let Some(name) = self.cursor_exercise() {
                    self.sheet.clear(&name);
                }
            }
            _ => {}
        }
        Action::None
    }

    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let Some(workout) = self.focused() else {
            frame.render_widget(
                Paragraph::new("No workout loaded")
                    .block(Block::default().borders(Borders::ALL).title(" Workout ")),
                area,
            );
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(5)])
            .split(area);

        let date = workout
            .date
            .map(|d| d.format("%a %b %-d").to_string())
            .unwrap_or_else(|| "today".to_string());
        let mut flags = Vec::new();
        if workout.is_today {
            flags.push(Span::styled(" TODAY ", Style::default().fg(Color::Black).bg(Color::Yellow)));
        }
        if workout.is_completed {
            flags.push(Span::styled(" DONE ", Style::default().fg(Color::Black).bg(Color::Green)));
        }

        let position = if self.workouts.len() > 1 {
            format!("  ({}/{})", self.focus + 1, self.workouts.len())
        } else {
            String::new()
        };
        let mut title_line = vec![
            Span::styled(workout.title(), Style::default().fg(Color::Cyan).bold()),
            Span::raw(format!("  {date}{position}  ")),
        ];
        title_line.extend(flags);

        let header = vec![
            Line::from(title_line),
            Line::from(vec![
                Span::styled(format!("Week {}", workout.week), Style::default().bold()),
                Span::raw(" · "),
                Span::raw(phase_name(&workout.phase)),
                Span::raw(" · "),
                Span::styled(workout_focus(workout.workout_type), Style::default().fg(Color::DarkGray)),
            ]),
        ];
        frame.render_widget(
            Paragraph::new(header).block(Block::default().borders(Borders::ALL)),
            chunks[0],
        );

        if workout.is_rest() {
            let text = vec![
                Line::from("Rest Day").bold(),
                Line::from(""),
                Line::from("Recovery is part of the program. Light walking or mobility work is fine."),
                Line::from("Nothing to log today."),
            ];
            frame.render_widget(
                Paragraph::new(text)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().borders(Borders::ALL)),
                chunks[1],
            );
            return;
        }

        let rows: Vec<Row> = workout
            .exercises
            .iter()
            .enumerate()
            .map(|(i, ex)| {
                let input = self.sheet.input(&ex.name);
                let load_cell = if i == self.cursor {
                    format!("{input}▏ kg")
                } else if input.is_empty() {
                    "-".to_string()
                } else {
                    format!("{input} kg")
                };
                let row = Row::new(vec![
                    Cell::from(ex.name.clone()),
                    Cell::from(ex.sets.to_string()),
                    Cell::from(ex.reps.clone()),
                    Cell::from(
                        ex.previous_load
                            .map(|l| format!("{} kg", format_load(l)))
                            .unwrap_or_else(|| "-".to_string()),
                    ),
                    Cell::from(load_cell),
                ]);
                if i == self.cursor {
                    row.style(Style::default().fg(Color::Cyan).bold())
                } else {
                    row
                }
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Min(24),
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Length(10),
                Constraint::Length(12),
            ],
        )
        .header(
            Row::new(vec!["Exercise", "Sets", "Reps", "Previous", "Load"])
                .style(Style::default().bold()),
        )
        .block(Block::default().borders(Borders::ALL).title(" Exercises "));
        frame.render_widget(table, chunks[1]);
    }
}
