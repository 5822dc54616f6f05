//! Dashboard - profile card and program overview

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::Action;
use crate::models::{User, weekday_name};
use crate::program::{DELOAD_NOTE, PHASES, rotation_label};

pub(super) fn handle_key(key: KeyEvent, user: Option<&User>) -> Action {
    match key.code {
        KeyCode::Char('s') => match user {
            Some(u) if u.has_started_program() => {
                Action::Notify("Program already started".to_string())
            }
            Some(_) => Action::StartProgram,
            None => Action::None,
        },
        _ => Action::None,
    }
}

pub(super) fn render(frame: &mut Frame, area: Rect, user: &User) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(8), Constraint::Min(8)])
        .split(area);

    let label = Style::default().fg(Color::DarkGray);
    let rest_day = user
        .rest_day
        .and_then(weekday_name)
        .unwrap_or("-")
        .to_string();
    let status = match user.program_start_date {
        Some(start) => Line::from(vec![
            Span::styled("Program:  ", label),
            Span::styled(
                format!("started {}", start.format("%Y-%m-%d")),
                Style::default().fg(Color::Green),
            ),
        ]),
        None => Line::from(vec![
            Span::styled("Program:  ", label),
            Span::styled("not started, press s", Style::default().fg(Color::Yellow).bold()),
        ]),
    };

    let profile = vec![
        Line::from(format!("Welcome, {}!", user.first_name)).bold(),
        Line::from(vec![
            Span::styled("Age:      ", label),
            Span::raw(format!("{} years", user.age)),
        ]),
        Line::from(vec![
            Span::styled("Height:   ", label),
            Span::raw(format!("{} cm", user.height)),
            Span::styled("   Weight: ", label),
            Span::raw(format!("{} kg", user.weight)),
        ]),
        Line::from(vec![
            Span::styled("Gender:   ", label),
            Span::raw(user.gender.label()),
            Span::styled("   Rest day: ", label),
            Span::raw(rest_day),
        ]),
        status,
    ];
    frame.render_widget(
        Paragraph::new(profile).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", user.full_name())),
        ),
        chunks[0],
    );

    let mut program = vec![
        Line::from("6-week Push/Pull/Legs program").bold(),
        Line::from(""),
    ];
    for info in PHASES {
        program.push(Line::from(vec![
            Span::styled(format!("{:<18}", info.phase.name()), Style::default().fg(Color::Cyan).bold()),
            Span::styled(format!("{:<10}", info.weeks), label),
            Span::raw(info.focus),
        ]));
    }
    program.push(Line::from(""));
    program.push(Line::from(vec![
        Span::styled("Rotation: ", label),
        Span::raw(rotation_label()),
    ]));
    program.push(Line::from(Span::styled(DELOAD_NOTE, label)));

    frame.render_widget(
        Paragraph::new(program)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL).title(" Program ")),
        chunks[1],
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Gender;
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    fn user(started: bool) -> User {
        User {
            id: "u1".into(),
            first_name: "Jo".into(),
            last_name: "Park".into(),
            age: 31,
            height: 170.0,
            weight: 70.0,
            gender: Gender::Other,
            rest_day: Some(3),
            program_start_date: started.then(Utc::now),
        }
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_start_only_once() {
        assert_eq!(handle_key(key('s'), Some(&user(false))), Action::StartProgram);
        assert!(matches!(
            handle_key(key('s'), Some(&user(true))),
            Action::Notify(_)
        ));
        assert_eq!(handle_key(key('x'), Some(&user(false))), Action::None);
    }

    #[test]
    fn test_render_shows_profile() {
        let backend = ratatui::backend::TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), &user(false)))
            .unwrap();
        let text: String = terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect();
        assert!(text.contains("Welcome, Jo!"));
        assert!(text.contains("Wednesday"));
        assert!(text.contains("Maximum Effort"));
    }
}
