//! Calendar screen - Sunday-first schedule grid

use chrono::{Datelike, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use super::Action;
use crate::calendar::{DayTone, day_tone, is_today, month_label, select, week_grid};
use crate::models::CalendarDay;

const WEEKDAY_HEADERS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Default)]
pub(super) struct CalendarScreen {
    days: Vec<CalendarDay>,
    cursor: usize,
    today: Option<NaiveDate>,
}

impl CalendarScreen {
    pub(super) fn set_days(&mut self, days: Vec<CalendarDay>, today: NaiveDate) {
        self.cursor = days.iter().position(|d| is_today(d, today)).unwrap_or(0);
        self.days = days;
        self.today = Some(today);
    }

    fn move_by(&mut self, delta: isize) {
        if self.days.is_empty() {
            return;
        }
        let last = self.days.len() as isize - 1;
        self.cursor = (self.cursor as isize + delta).clamp(0, last) as usize;
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left => self.move_by(-1),
            KeyCode::Right => self.move_by(1),
            KeyCode::Up => self.move_by(-7),
            KeyCode::Down => self.move_by(7),
            KeyCode::Enter => {
                return match self.days.get(self.cursor) {
                    Some(day) => match select(day) {
                        Some(date) => Action::OpenWorkout(date),
                        None => Action::Notify("Rest day, nothing to train".to_string()),
                    },
                    None => Action::None,
                };
            }
            _ => {}
        }
        Action::None
    }

    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let title = month_label(&self.days)
            .map(|m| format!(" Workout Calendar · {m} "))
            .unwrap_or_else(|| " Workout Calendar ".to_string());
        let block = Block::default().borders(Borders::ALL).title(title);

        if self.days.is_empty() {
            frame.render_widget(
                Paragraph::new("No schedule loaded").block(block),
                area,
            );
            return;
        }

        let selected = self.days.get(self.cursor).map(|d| d.date);
        let rows: Vec<Row> = week_grid(&self.days)
            .into_iter()
            .map(|week| {
                let cells = week.into_iter().map(|slot| match slot {
                    Some(day) => self.day_cell(day, selected == Some(day.date)),
                    None => Cell::from(""),
                });
                Row::new(cells).height(3)
            })
            .collect();

        let header = Row::new(WEEKDAY_HEADERS.iter().map(|d| Cell::from(*d)))
            .style(Style::default().bold());
        let table = Table::new(rows, [Constraint::Ratio(1, 7); 7])
            .header(header)
            .column_spacing(1)
            .block(block);
        frame.render_widget(table, area);
    }

    fn day_cell<'a>(&self, day: &'a CalendarDay, is_selected: bool) -> Cell<'a> {
        let color = match day_tone(day) {
            DayTone::Push => Color::Red,
            DayTone::Pull => Color::Blue,
            DayTone::Legs => Color::Green,
            DayTone::Rest => Color::DarkGray,
        };

        let mut date_style = Style::default();
        if self.today.is_some_and(|t| is_today(day, t)) {
            date_style = date_style.fg(Color::Yellow).bold().underlined();
        }
        let mark = if day.is_completed { " ✓" } else { "" };

        let text = Text::from(vec![
            Line::from(Span::styled(format!("{}{}", day.date.day(), mark), date_style)),
            Line::from(Span::styled(day.workout_name.as_str(), Style::default().fg(color))),
            Line::from(Span::styled(
                format!("wk {}", day.week),
                Style::default().fg(Color::DarkGray),
            )),
        ]);

        let cell = Cell::from(text);
        if is_selected {
            cell.style(Style::default().reversed())
        } else {
            cell
        }
    }
}
