//! Progress screen - load history charts and the exercise popup

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    symbols,
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph},
};

use super::{Action, centered_rect};
use crate::api::AllProgress;
use crate::models::ProgressPoint;
use crate::progress::{ExerciseStats, OverallStats, chart_series, load_bounds};
use crate::workout::format_load;

#[derive(Default)]
pub(super) struct ProgressScreen {
    data: AllProgress,
    selected: usize,
}

impl ProgressScreen {
    pub(super) fn set_data(&mut self, data: AllProgress) {
        self.data = data;
        self.selected = 0;
    }

    fn selected_series(&self) -> Option<(&String, &Vec<ProgressPoint>)> {
        self.data.iter().nth(self.selected)
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down if self.selected + 1 < self.data.len() => self.selected += 1,
            _ => {}
        }
        Action::None
    }

    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        if self.data.is_empty() {
            frame.render_widget(
                Paragraph::new("No progress yet. Log a workout to start tracking loads.")
                    .block(Block::default().borders(Borders::ALL).title(" Progress ")),
                area,
            );
            return;
        }

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(8)])
            .split(area);

        let overall = OverallStats::from_all(&self.data);
        let summary = Line::from(vec![
            Span::styled("Exercises: ", Style::default().fg(Color::DarkGray)),
            Span::raw(overall.total_exercises.to_string()),
            Span::styled("   Sessions: ", Style::default().fg(Color::DarkGray)),
            Span::raw(overall.total_sessions.to_string()),
            Span::styled("   Avg improvement: ", Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!("{:+.1}%", overall.avg_improvement),
                improvement_style(overall.avg_improvement),
            ),
        ]);
        frame.render_widget(
            Paragraph::new(summary).block(Block::default().borders(Borders::ALL).title(" Progress ")),
            rows[0],
        );

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(30), Constraint::Min(30)])
            .split(rows[1]);

        let items: Vec<ListItem> = self
            .data
            .keys()
            .enumerate()
            .map(|(i, name)| {
                let item = ListItem::new(name.as_str());
                if i == self.selected {
                    item.style(Style::default().fg(Color::Cyan).bold().reversed())
                } else {
                    item
                }
            })
            .collect();
        frame.render_widget(
            List::new(items).block(Block::default().borders(Borders::ALL).title(" Exercises ")),
            cols[0],
        );

        if let Some((name, points)) = self.selected_series() {
            render_exercise(frame, cols[1], name, points);
        }
    }
}

/// Popup with one exercise's history, opened from the workout view
pub(super) struct ExerciseModal {
    name: String,
    points: Vec<ProgressPoint>,
}

impl ExerciseModal {
    pub(super) fn new(name: String, points: Vec<ProgressPoint>) -> Self {
        Self { name, points }
    }

    pub(super) fn closes_on(&self, key: KeyEvent) -> bool {
        matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('g')
        )
    }

    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(80, 70, area);
        frame.render_widget(Clear, popup);
        render_exercise(frame, popup, &self.name, &self.points);
    }
}

fn improvement_style(value: f64) -> Style {
    if value > 0.0 {
        Style::default().fg(Color::Green).bold()
    } else if value < 0.0 {
        Style::default().fg(Color::Red).bold()
    } else {
        Style::default()
    }
}

fn stats_line(stats: &ExerciseStats) -> Line<'static> {
    let label = Style::default().fg(Color::DarkGray);
    Line::from(vec![
        Span::styled("Max ", label),
        Span::raw(format!("{} kg", format_load(stats.max_load))),
        Span::styled("  Latest ", label),
        Span::raw(format!("{} kg", format_load(stats.latest_load))),
        Span::styled("  Change ", label),
        Span::styled(format!("{:+.1}%", stats.improvement), improvement_style(stats.improvement)),
        Span::styled("  Sessions ", label),
        Span::raw(stats.total_sessions.to_string()),
        Span::styled(
            format!(
                "  {} → {}",
                stats.first_date.format("%b %-d"),
                stats.last_date.format("%b %-d, %Y")
            ),
            label,
        ),
    ])
}

fn render_exercise(frame: &mut Frame, area: Rect, name: &str, points: &[ProgressPoint]) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {name} "))
        .title_style(Style::default().bold());

    let Some(stats) = ExerciseStats::from_points(points) else {
        frame.render_widget(
            Paragraph::new("No sessions logged for this exercise yet").block(block),
            area,
        );
        return;
    };

    let inner = block.inner(area);
    frame.render_widget(block, area);
    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(5)])
        .split(inner);

    frame.render_widget(Paragraph::new(stats_line(&stats)), parts[0]);

    let data = chart_series(points);
    let sessions = points.len().max(2) as f64;
    let [lo, hi] = load_bounds(points);
    let dataset = Dataset::default()
        .name("load (kg)")
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(Color::Cyan))
        .data(&data);

    let chart = Chart::new(vec![dataset])
        .x_axis(
            Axis::default()
                .title("Session")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([1.0, sessions])
                .labels(vec![Span::raw("1"), Span::raw(points.len().to_string())]),
        )
        .y_axis(
            Axis::default()
                .title("kg")
                .style(Style::default().fg(Color::DarkGray))
                .bounds([lo, hi])
                .labels(vec![Span::raw(format!("{lo:.0}")), Span::raw(format!("{hi:.0}"))]),
        );
    frame.render_widget(chart, parts[1]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;

    fn point(day: u32, load: f64) -> ProgressPoint {
        ProgressPoint {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            load,
            sets: None,
            reps: None,
        }
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_selection_bounds() {
        let mut data = AllProgress::new();
        data.insert("Bench Press".into(), vec![point(1, 60.0)]);
        data.insert("Squat".into(), vec![point(2, 100.0)]);

        let mut screen = ProgressScreen::default();
        screen.set_data(data);
        screen.handle_key(press(KeyCode::Down));
        screen.handle_key(press(KeyCode::Down));
        assert_eq!(screen.selected_series().unwrap().0, "Squat");
        screen.handle_key(press(KeyCode::Up));
        screen.handle_key(press(KeyCode::Up));
        assert_eq!(screen.selected_series().unwrap().0, "Bench Press");
    }

    #[test]
    fn test_modal_close_keys() {
        let modal = ExerciseModal::new("Squat".into(), vec![]);
        assert!(modal.closes_on(press(KeyCode::Esc)));
        assert!(!modal.closes_on(press(KeyCode::Down)));
    }

    #[test]
    fn test_render_modal_shows_change() {
        let modal = ExerciseModal::new(
            "Squat".into(),
            vec![point(1, 100.0), point(8, 105.0), point(15, 112.5)],
        );
        let backend = ratatui::backend::TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|frame| modal.render(frame, frame.area())).unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Squat"));
        assert!(text.contains("+12.5%"));
        assert!(text.contains("112.5 kg"));
    }
}
