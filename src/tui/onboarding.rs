//! Onboarding screen - profile form, phone entry and code check

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

use super::{Action, centered_rect};
use crate::models::weekday_name;
use crate::onboarding::{Field, OnboardingFlow, Step};

pub(super) struct OnboardingScreen {
    pub(super) flow: OnboardingFlow,
    pub(super) submit_error: Option<String>,
    focus: usize,
}

impl OnboardingScreen {
    pub(super) fn new(verify_phone: bool) -> Self {
        Self {
            flow: OnboardingFlow::new(verify_phone),
            submit_error: None,
            focus: 0,
        }
    }

    fn focused_field(&self) -> Field {
        Field::PROFILE[self.focus]
    }

    /// Step back one screen, dropping any failed-submit message
    fn back(&mut self) {
        self.flow.back();
        self.submit_error = None;
    }

    pub(super) fn handle_key(&mut self, key: KeyEvent) -> Action {
        match self.flow.step() {
            Step::Form => self.form_key(key),
            Step::Phone => {
                match key.code {
                    KeyCode::Esc => self.back(),
                    KeyCode::Enter => {
                        self.flow.send_code();
                    }
                    KeyCode::Backspace => self.flow.form.pop_char(Field::Phone),
                    KeyCode::Char(c) => self.flow.form.push_char(Field::Phone, c),
                    _ => {}
                }
                Action::None
            }
            Step::Otp => {
                match key.code {
                    KeyCode::Esc => self.back(),
                    KeyCode::Enter => {
                        if self.flow.verify() {
                            return Action::SubmitProfile;
                        }
                    }
                    KeyCode::Backspace => {
                        self.flow.otp_input.pop();
                    }
                    KeyCode::Char('r') => {
                        self.flow.resend_code(Instant::now());
                    }
                    KeyCode::Char(c) if c.is_ascii_digit() && self.flow.otp_input.len() < 6 => {
                        self.flow.otp_input.push(c);
                    }
                    _ => {}
                }
                Action::None
            }
            // Reached only when the create request failed; Enter retries
            Step::Verified => match key.code {
                KeyCode::Enter => Action::SubmitProfile,
                KeyCode::Esc => {
                    self.back();
                    Action::None
                }
                _ => Action::None,
            },
        }
    }

    fn form_key(&mut self, key: KeyEvent) -> Action {
        let field = self.focused_field();
        match key.code {
            KeyCode::Esc => return Action::Quit,
            KeyCode::Tab | KeyCode::Down => {
                self.focus = (self.focus + 1) % Field::PROFILE.len();
            }
            KeyCode::BackTab | KeyCode::Up => {
                self.focus = (self.focus + Field::PROFILE.len() - 1) % Field::PROFILE.len();
            }
            KeyCode::Backspace => self.flow.form.pop_char(field),
            KeyCode::Char(c) => self.flow.form.push_char(field, c),
            KeyCode::Enter => {
                self.submit_error = None;
                if self.flow.submit_form() && self.flow.is_verified() {
                    return Action::SubmitProfile;
                }
                // Jump to the first field with an error
                if let Some(pos) = Field::PROFILE
                    .iter()
                    .position(|f| self.flow.form.error(*f).is_some())
                {
                    self.focus = pos;
                }
            }
            _ => {}
        }
        Action::None
    }

    pub(super) fn render(&self, frame: &mut Frame, area: Rect) {
        let popup = centered_rect(70, 90, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(" Welcome to PPL Coach ")
            .title_style(Style::default().fg(Color::Cyan).bold());

        let mut lines = vec![
            Line::from("Let's get you started with your Push/Pull/Legs program").italic(),
            Line::from(""),
        ];
        match self.flow.step() {
            Step::Form => self.form_lines(&mut lines),
            Step::Phone => self.phone_lines(&mut lines),
            Step::Otp => self.otp_lines(&mut lines),
            Step::Verified => {
                lines.push(Line::from("Creating your profile...").bold());
            }
        }
        if let Some(err) = &self.submit_error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                err.as_str(),
                Style::default().fg(Color::Red).bold(),
            )));
            lines.push(Line::from("Enter: retry | Esc: back"));
        }

        frame.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(block),
            popup,
        );
    }

    fn form_lines<'a>(&'a self, lines: &mut Vec<Line<'a>>) {
        let form = &self.flow.form;
        for (i, field) in Field::PROFILE.iter().enumerate() {
            let focused = i == self.focus;
            let marker = if focused { "› " } else { "  " };
            let label_style = if focused {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(format!("{marker}{:<13}", field.label()), label_style),
                Span::raw(form.value(*field)),
            ];
            if focused {
                spans.push(Span::styled("▏", Style::default().fg(Color::Cyan)));
            }
            if let Some(hint) = field_hint(*field, form.value(*field)) {
                spans.push(Span::styled(format!("  {hint}"), Style::default().fg(Color::DarkGray)));
            }
            lines.push(Line::from(spans));
            if let Some(err) = form.error(*field) {
                lines.push(Line::from(Span::styled(
                    format!("                {err}"),
                    Style::default().fg(Color::Red),
                )));
            }
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab/↑↓: move | Enter: create profile | Esc: quit",
            Style::default().fg(Color::DarkGray),
        )));
    }

    fn phone_lines<'a>(&'a self, lines: &mut Vec<Line<'a>>) {
        lines.push(Line::from("Verify your phone number").bold());
        lines.push(Line::from(vec![
            Span::raw("Phone: "),
            Span::raw(self.flow.form.phone.as_str()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]));
        if let Some(err) = self.flow.form.error(Field::Phone) {
            lines.push(Line::from(Span::styled(err, Style::default().fg(Color::Red))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: send code | Esc: back",
            Style::default().fg(Color::DarkGray),
        )));
    }

    fn otp_lines<'a>(&'a self, lines: &mut Vec<Line<'a>>) {
        lines.push(Line::from("Enter the 6-digit code").bold());
        if let Some(sent) = self.flow.sent_code() {
            // No SMS is sent; the code is shown here instead
            lines.push(Line::from(vec![
                Span::styled("Demo code: ", Style::default().fg(Color::DarkGray)),
                Span::styled(sent.code(), Style::default().fg(Color::Yellow).bold()),
            ]));
            let wait = sent.resend_in(Instant::now()).as_secs();
            let resend = if wait == 0 {
                "r: resend code".to_string()
            } else {
                format!("resend available in {wait}s")
            };
            lines.push(Line::from(Span::styled(resend, Style::default().fg(Color::DarkGray))));
        }
        lines.push(Line::from(vec![
            Span::raw("Code: "),
            Span::styled(self.flow.otp_input.as_str(), Style::default().bold()),
            Span::styled("▏", Style::default().fg(Color::Cyan)),
        ]));
        if let Some(err) = self.flow.otp_error() {
            lines.push(Line::from(Span::styled(err, Style::default().fg(Color::Red))));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter: verify | Esc: back",
            Style::default().fg(Color::DarkGray),
        )));
    }
}

fn field_hint(field: Field, value: &str) -> Option<String> {
    match field {
        Field::Gender => Some("male / female / other".to_string()),
        Field::RestDay => Some(
            value
                .trim()
                .parse::<u8>()
                .ok()
                .and_then(weekday_name)
                .map(str::to_string)
                .unwrap_or_else(|| "0 = Sunday .. 6 = Saturday".to_string()),
        ),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_str(screen: &mut OnboardingScreen, s: &str) {
        for c in s.chars() {
            screen.handle_key(press(KeyCode::Char(c)));
        }
    }

    fn fill(screen: &mut OnboardingScreen, values: [&str; 7]) {
        for value in values {
            type_str(screen, value);
            screen.handle_key(press(KeyCode::Tab));
        }
    }

    #[test]
    fn test_complete_form_submits() {
        let mut screen = OnboardingScreen::new(false);
        fill(&mut screen, ["Ana", "Diaz", "34", "165", "58", "female", "6"]);
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::SubmitProfile);
    }

    #[test]
    fn test_invalid_form_focuses_first_error() {
        let mut screen = OnboardingScreen::new(false);
        fill(&mut screen, ["Ana", "Diaz", "34", "400", "58", "female", "6"]);
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::None);
        assert_eq!(screen.focused_field(), Field::Height);
        assert!(screen.flow.form.error(Field::Height).is_some());
    }

    #[test]
    fn test_phone_verification_path() {
        let mut screen = OnboardingScreen::new(true);
        fill(&mut screen, ["Ana", "Diaz", "34", "165", "58", "female", "6"]);
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::None);
        assert_eq!(screen.flow.step(), Step::Phone);

        type_str(&mut screen, "5551234567");
        screen.handle_key(press(KeyCode::Enter));
        assert_eq!(screen.flow.step(), Step::Otp);

        let code = screen.flow.sent_code().unwrap().code().to_string();
        type_str(&mut screen, &code);
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::SubmitProfile);
    }

    #[test]
    fn test_back_from_failed_submit_clears_message() {
        let mut screen = OnboardingScreen::new(false);
        fill(&mut screen, ["Ana", "Diaz", "34", "165", "58", "female", "6"]);
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::SubmitProfile);
        assert_eq!(screen.flow.step(), Step::Verified);

        screen.submit_error = Some("Failed to create user. Please try again.".into());
        assert_eq!(screen.handle_key(press(KeyCode::Enter)), Action::SubmitProfile);

        screen.handle_key(press(KeyCode::Esc));
        assert_eq!(screen.flow.step(), Step::Form);
        assert!(screen.submit_error.is_none());
    }

    #[test]
    fn test_escape_on_form_quits() {
        let mut screen = OnboardingScreen::new(false);
        assert_eq!(screen.handle_key(press(KeyCode::Esc)), Action::Quit);
    }

    #[test]
    fn test_rest_day_hint() {
        assert_eq!(field_hint(Field::RestDay, "1").as_deref(), Some("Monday"));
        assert_eq!(field_hint(Field::FirstName, "x"), None);
    }
}
