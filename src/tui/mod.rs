//! TUI module - full-screen client with ratatui

mod calendar;
mod dashboard;
mod onboarding;
mod progress;
mod workout;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph, Tabs},
};
use std::io::{Stdout, stdout};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::calendar::DEFAULT_DAYS;
use crate::db::ProfileStore;
use crate::models::User;
use crate::workout::{WorkoutRequest, build_session};

use self::calendar::CalendarScreen;
use self::onboarding::OnboardingScreen;
use self::progress::{ExerciseModal, ProgressScreen};
use self::workout::WorkoutScreen;

type Tui = Terminal<CrosstermBackend<Stdout>>;

const NOTICE_TTL: Duration = Duration::from_secs(4);

/// Top-level screens reachable from the navigation bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Workout,
    Calendar,
    Progress,
}

impl View {
    pub const ALL: [View; 4] = [View::Dashboard, View::Workout, View::Calendar, View::Progress];

    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Workout => "Workout",
            View::Calendar => "Calendar",
            View::Progress => "Progress",
        }
    }

    pub fn hotkey(&self) -> char {
        match self {
            View::Dashboard => 'd',
            View::Workout => 'w',
            View::Calendar => 'c',
            View::Progress => 'p',
        }
    }

    pub fn from_key(c: char) -> Option<View> {
        View::ALL.into_iter().find(|v| v.hotkey() == c)
    }

    fn index(&self) -> usize {
        View::ALL.iter().position(|v| v == self).unwrap_or(0)
    }
}

/// What a screen asks the app to do after a key press
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    None,
    Quit,
    SubmitProfile,
    StartProgram,
    OpenWorkout(NaiveDate),
    SaveWorkout,
    ShowExercise(String),
    Notify(String),
}

struct Notice {
    text: String,
    is_error: bool,
    shown_at: Instant,
}

/// App state for TUI
pub struct App {
    api: ApiClient,
    store: ProfileStore,
    user: Option<User>,
    view: View,
    selected_date: Option<NaiveDate>,
    onboarding: OnboardingScreen,
    calendar: CalendarScreen,
    workout: WorkoutScreen,
    progress: ProgressScreen,
    modal: Option<ExerciseModal>,
    notice: Option<Notice>,
    should_quit: bool,
}

impl App {
    pub fn new(api: ApiClient, store: ProfileStore, verify_phone: bool) -> Result<Self> {
        let user = store.load_user()?;
        Ok(Self {
            api,
            store,
            user,
            view: View::Dashboard,
            selected_date: None,
            onboarding: OnboardingScreen::new(verify_phone),
            calendar: CalendarScreen::default(),
            workout: WorkoutScreen::default(),
            progress: ProgressScreen::default(),
            modal: None,
            notice: None,
            should_quit: false,
        })
    }

    /// Run the TUI application
    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = init_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        restore_terminal()?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut Tui) -> Result<()> {
        while !self.should_quit {
            self.expire_notice();
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(Duration::from_millis(100))?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                self.handle_key(key).await;
            }
        }
        Ok(())
    }

    fn user_id(&self) -> Option<String> {
        self.user.as_ref().map(|u| u.id.clone())
    }

    fn notify(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: false,
            shown_at: Instant::now(),
        });
    }

    fn notify_error(&mut self, text: impl Into<String>) {
        self.notice = Some(Notice {
            text: text.into(),
            is_error: true,
            shown_at: Instant::now(),
        });
    }

    /// Log a failed call and tell the user; prior state is left as it was
    fn request_failed(&mut self, what: &str, err: ApiError) {
        error!(error = %err, "{}", what);
        self.notify_error(what.to_string());
    }

    fn expire_notice(&mut self) {
        if self
            .notice
            .as_ref()
            .is_some_and(|n| n.shown_at.elapsed() >= NOTICE_TTL)
        {
            self.notice = None;
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if self.user.is_none() {
            let action = self.onboarding.handle_key(key);
            self.dispatch(action).await;
            return;
        }

        if let Some(modal) = &self.modal {
            if modal.closes_on(key) {
                self.modal = None;
            }
            return;
        }

        if let KeyCode::Char(c) = key.code {
            if c == 'q' {
                self.should_quit = true;
                return;
            }
            if let Some(view) = View::from_key(c) {
                self.enter(view).await;
                return;
            }
        }

        let action = match self.view {
            View::Dashboard => dashboard::handle_key(key, self.user.as_ref()),
            View::Calendar => self.calendar.handle_key(key),
            View::Workout => self.workout.handle_key(key),
            View::Progress => self.progress.handle_key(key),
        };
        self.dispatch(action).await;
    }

    async fn dispatch(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.should_quit = true,
            Action::SubmitProfile => self.submit_profile().await,
            Action::StartProgram => self.start_program().await,
            Action::OpenWorkout(date) => {
                self.selected_date = Some(date);
                self.load_view(View::Workout).await;
            }
            Action::SaveWorkout => self.save_workout().await,
            Action::ShowExercise(name) => self.open_exercise(name).await,
            Action::Notify(text) => self.notify_error(text),
        }
    }

    /// Switch view from the navigation bar
    async fn enter(&mut self, view: View) {
        if view == View::Workout {
            self.selected_date = None;
        }
        self.load_view(view).await;
    }

    async fn load_view(&mut self, view: View) {
        self.view = view;
        let Some(user) = &self.user else {
            return;
        };
        let user_id = user.id.clone();

        let needs_program = matches!(view, View::Calendar | View::Workout);
        if needs_program && !user.has_started_program() {
            self.notify_error("Start the program from the dashboard first");
            return;
        }

        let today = Local::now().date_naive();
        match view {
            View::Dashboard => {}
            View::Calendar => match self.api.calendar(&user_id, DEFAULT_DAYS).await {
                Ok(days) => self.calendar.set_days(days, today),
                Err(e) => self.request_failed("Failed to load calendar", e),
            },
            View::Workout => {
                let result = match WorkoutRequest::resolve(self.selected_date) {
                    WorkoutRequest::Current => self
                        .api
                        .current_workout(&user_id)
                        .await
                        .map(|w| vec![w]),
                    WorkoutRequest::ForDate(date) => self
                        .api
                        .workout_for_date(&user_id, date)
                        .await
                        .map(|mut w| {
                            w.date.get_or_insert(date);
                            vec![w]
                        }),
                    WorkoutRequest::Upcoming(days) => {
                        self.api.upcoming_workouts(&user_id, days).await
                    }
                };
                match result {
                    Ok(workouts) => self.workout.set_workouts(workouts, today),
                    Err(e) => self.request_failed("Failed to load workout data", e),
                }
            }
            View::Progress => match self.api.all_progress(&user_id).await {
                Ok(all) => self.progress.set_data(all),
                Err(e) => self.request_failed("Failed to load progress", e),
            },
        }
    }

    async fn submit_profile(&mut self) {
        let payload = match self.onboarding.flow.form.submit_payload() {
            Ok(payload) => payload,
            Err(errors) => {
                warn!(fields = errors.len(), "profile form rejected");
                return;
            }
        };

        match self.api.create_user(&payload).await {
            Ok(user) => {
                if let Err(e) = self.store.save_user(&user) {
                    error!(error = %e, "caching profile failed");
                }
                info!(user_id = %user.id, "profile created");
                self.notify(format!("Welcome, {}!", user.first_name));
                self.user = Some(user);
                self.view = View::Dashboard;
            }
            Err(e) => {
                error!(error = %e, "creating user failed");
                self.onboarding.submit_error =
                    Some("Failed to create user. Please try again.".to_string());
            }
        }
    }

    async fn start_program(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        match self.api.start_program(&user_id).await {
            Ok(started) => {
                if let Some(user) = &mut self.user {
                    user.program_start_date = Some(started.start_date);
                }
                if let Err(e) = self.store.set_program_start(started.start_date) {
                    error!(error = %e, "caching program start failed");
                }
                info!(%user_id, start = %started.start_date, "program started");
                self.notify("Program started");
                self.selected_date = None;
                self.load_view(View::Workout).await;
            }
            Err(e) => self.request_failed("Failed to start program", e),
        }
    }

    async fn save_workout(&mut self) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        let Some(workout) = self.workout.focused() else {
            return;
        };
        let now = Local::now();
        let date = workout
            .date
            .or(self.selected_date)
            .unwrap_or_else(|| now.date_naive());

        let session = match build_session(&user_id, workout, self.workout.sheet(), date, now) {
            Ok(session) => session,
            Err(e) => {
                warn!(error = %e, "save blocked");
                self.notify_error(e.to_string());
                return;
            }
        };

        match self.api.submit_session(&session).await {
            Ok(()) => {
                info!(%user_id, date = %date, "workout saved");
                self.notify("Workout saved");
                self.load_view(View::Workout).await;
            }
            Err(e) => self.request_failed("Failed to save workout", e),
        }
    }

    async fn open_exercise(&mut self, name: String) {
        let Some(user_id) = self.user_id() else {
            return;
        };
        match self.api.exercise_progress(&user_id, &name).await {
            Ok(points) => self.modal = Some(ExerciseModal::new(name, points)),
            Err(e) => self.request_failed("Failed to load exercise progress", e),
        }
    }

    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let Some(user) = &self.user else {
            self.onboarding.render(frame, area);
            return;
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ])
            .split(area);

        // Navigation
        let titles = View::ALL
            .iter()
            .map(|v| format!("{} [{}]", v.title(), v.hotkey()));
        let tabs = Tabs::new(titles)
            .select(self.view.index())
            .style(Style::default().fg(Color::DarkGray))
            .highlight_style(Style::default().fg(Color::Cyan).bold())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" PPL Coach ")
                    .title_style(Style::default().bold()),
            );
        frame.render_widget(tabs, chunks[0]);

        match self.view {
            View::Dashboard => dashboard::render(frame, chunks[1], user),
            View::Workout => self.workout.render(frame, chunks[1]),
            View::Calendar => self.calendar.render(frame, chunks[1]),
            View::Progress => self.progress.render(frame, chunks[1]),
        }

        // Footer: transient notice wins over key help
        let footer = match &self.notice {
            Some(n) if n.is_error => {
                Paragraph::new(n.text.as_str()).style(Style::default().fg(Color::Red).bold())
            }
            Some(n) => Paragraph::new(n.text.as_str()).style(Style::default().fg(Color::Green)),
            None => Paragraph::new(self.help_line()).style(Style::default().fg(Color::DarkGray)),
        };
        frame.render_widget(footer.block(Block::default().borders(Borders::ALL)), chunks[2]);

        if let Some(modal) = &self.modal {
            modal.render(frame, area);
        }
    }

    fn help_line(&self) -> &'static str {
        match self.view {
            View::Dashboard => "q: quit | s: start program | d/w/c/p: switch view",
            View::Workout => {
                "↑↓: exercise | ←→: day | 0-9: load | del: clear | g: graph | s: save | q: quit"
            }
            View::Calendar => "arrows: move | enter: open workout | q: quit",
            View::Progress => "↑↓: exercise | q: quit",
        }
    }
}

fn init_terminal() -> Result<Tui> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    Ok(terminal)
}

fn restore_terminal() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Centered rectangle taking the given percentages of `area`
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::test_server::{serve, serve_once};
    use crate::models::{Gender, PlannedExercise, Workout, WorkoutType};
    use crate::onboarding::Field;
    use chrono::{TimeZone, Utc};
    use tokio::net::TcpListener;

    #[test]
    fn test_view_hotkeys_round_trip() {
        for view in View::ALL {
            assert_eq!(View::from_key(view.hotkey()), Some(view));
        }
        assert_eq!(View::from_key('x'), None);
    }

    #[test]
    fn test_view_index() {
        assert_eq!(View::Dashboard.index(), 0);
        assert_eq!(View::Progress.index(), 3);
    }

    #[test]
    fn test_centered_rect_inside_area() {
        let area = Rect::new(0, 0, 100, 40);
        let rect = centered_rect(60, 50, area);
        assert_eq!(rect, Rect::new(20, 10, 60, 20));
    }

    fn started_user() -> User {
        User {
            id: "u1".into(),
            first_name: "Jo".into(),
            last_name: "Park".into(),
            age: 31,
            height: 170.0,
            weight: 70.0,
            gender: Gender::Other,
            rest_day: Some(0),
            program_start_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap()),
        }
    }

    fn app_for(base: &str, user: Option<&User>) -> App {
        let store = ProfileStore::open_in_memory().unwrap();
        if let Some(user) = user {
            store.save_user(user).unwrap();
        }
        let api = ApiClient::new(base, Duration::from_secs(2)).unwrap();
        App::new(api, store, false).unwrap()
    }

    fn pull_day(date: NaiveDate) -> Workout {
        Workout {
            workout_type: WorkoutType::Pull,
            workout_number: 1,
            week: 1,
            phase: "phase1".into(),
            is_rest_day: false,
            exercises: vec![PlannedExercise {
                name: "Lat Pulldown".into(),
                sets: 3,
                reps: "8-10".into(),
                previous_load: Some(55.0),
            }],
            date: Some(date),
            is_today: false,
            is_completed: false,
        }
    }

    fn error_notice(app: &App) -> Option<&str> {
        app.notice
            .as_ref()
            .filter(|n| n.is_error)
            .map(|n| n.text.as_str())
    }

    #[tokio::test]
    async fn test_created_profile_is_cached_and_opens_dashboard() {
        let body = r#"{"id":"u-42","first_name":"Ana","last_name":"Diaz","age":34,"height":165.0,"weight":58.0,"gender":"female","rest_day":6}"#;
        let (base, server) = serve_once("200 OK", body).await;
        let mut app = app_for(&base, None);
        let form = &mut app.onboarding.flow.form;
        form.set(Field::FirstName, "Ana");
        form.set(Field::LastName, "Diaz");
        form.set(Field::Age, "34");
        form.set(Field::Height, "165");
        form.set(Field::Weight, "58");
        form.set(Field::Gender, "female");
        form.set(Field::RestDay, "6");

        app.dispatch(Action::SubmitProfile).await;

        assert_eq!(app.user.as_ref().map(|u| u.id.as_str()), Some("u-42"));
        assert_eq!(app.view, View::Dashboard);
        let cached = app.store.load_user().unwrap().unwrap();
        assert_eq!(cached.id, "u-42");
        assert_eq!(cached.rest_day, Some(6));

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/users "));
        assert!(request.contains(r#""gender":"female""#));
    }

    #[tokio::test]
    async fn test_failed_create_keeps_onboarding() {
        let (base, _server) = serve_once("500 Internal Server Error", "db down").await;
        let mut app = app_for(&base, None);
        let form = &mut app.onboarding.flow.form;
        form.set(Field::FirstName, "Ana");
        form.set(Field::LastName, "Diaz");
        form.set(Field::Age, "34");
        form.set(Field::Height, "165");
        form.set(Field::Weight, "58");
        form.set(Field::Gender, "female");
        form.set(Field::RestDay, "6");

        app.dispatch(Action::SubmitProfile).await;

        assert!(app.user.is_none());
        assert!(app.store.load_user().unwrap().is_none());
        assert!(app.onboarding.submit_error.is_some());
        assert_eq!(app.onboarding.flow.form.first_name, "Ana");
    }

    #[tokio::test]
    async fn test_start_program_records_date_and_opens_workout() {
        let (base, server) = serve(vec![
            (
                "200 OK",
                r#"{"message":"Program started","start_date":"2024-03-10T08:00:00Z"}"#,
            ),
            ("200 OK", "[]"),
        ])
        .await;
        let mut user = started_user();
        user.program_start_date = None;
        let mut app = app_for(&base, Some(&user));

        app.dispatch(Action::StartProgram).await;

        let start = Utc.with_ymd_and_hms(2024, 3, 10, 8, 0, 0).unwrap();
        assert_eq!(app.user.as_ref().unwrap().program_start_date, Some(start));
        assert_eq!(
            app.store.load_user().unwrap().unwrap().program_start_date,
            Some(start)
        );
        assert_eq!(app.view, View::Workout);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /api/users/u1/start-program "));
        assert!(requests[1].starts_with("GET /api/users/u1/upcoming-workouts?days=7 "));
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_workout() {
        let (base, _server) = serve_once("500 Internal Server Error", "boom").await;
        let user = started_user();
        let mut app = app_for(&base, Some(&user));
        let today = Local::now().date_naive();
        app.workout.set_workouts(vec![pull_day(today)], today);

        let yesterday = today.pred_opt().unwrap();
        app.dispatch(Action::OpenWorkout(yesterday)).await;

        assert_eq!(app.view, View::Workout);
        assert_eq!(app.workout.focused().and_then(|w| w.date), Some(today));
        assert_eq!(app.workout.sheet().load("Lat Pulldown"), Some(55.0));
        assert_eq!(error_notice(&app), Some("Failed to load workout data"));
    }

    #[tokio::test]
    async fn test_future_save_sends_nothing() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let user = started_user();
        let mut app = app_for(&base, Some(&user));
        let today = Local::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();
        app.workout.set_workouts(vec![pull_day(tomorrow)], today);

        app.dispatch(Action::SaveWorkout).await;

        let accepted = tokio::time::timeout(Duration::from_millis(200), listener.accept()).await;
        assert!(accepted.is_err(), "no request may reach the server");
        assert!(error_notice(&app).is_some_and(|text| text.contains("future")));
    }
}
