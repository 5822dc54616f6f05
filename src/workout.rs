//! Workout - load entry and session assembly

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use thiserror::Error;

use crate::models::{LoggedExercise, Workout, WorkoutSession};

pub const UPCOMING_DAYS: u32 = 7;

/// Which endpoint the workout view should call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkoutRequest {
    Current,
    ForDate(NaiveDate),
    Upcoming(u32),
}

impl WorkoutRequest {
    /// A date picked in the calendar wins; otherwise show the coming week
    pub fn resolve(selected: Option<NaiveDate>) -> Self {
        match selected {
            Some(date) => WorkoutRequest::ForDate(date),
            None => WorkoutRequest::Upcoming(UPCOMING_DAYS),
        }
    }
}

/// Index of the workout to focus in an upcoming list
pub fn focus_index(workouts: &[Workout], today: NaiveDate) -> Option<usize> {
    if workouts.is_empty() {
        return None;
    }
    workouts
        .iter()
        .position(|w| w.is_today || w.date == Some(today))
        .or(Some(0))
}

#[derive(Debug, Error, PartialEq)]
pub enum SaveError {
    #[error("cannot log a workout for {date}: it is in the future")]
    FutureDate { date: NaiveDate },

    #[error("rest day, nothing to log")]
    RestDay,
}

/// Parse a load field. Empty, non-numeric or non-positive input becomes `None`.
pub fn parse_load(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

/// Render a load the way it should appear in an input field
pub fn format_load(load: f64) -> String {
    if load.fract() == 0.0 {
        format!("{}", load as i64)
    } else {
        format!("{load}")
    }
}

/// Per-exercise load input for one workout
#[derive(Debug, Clone, Default)]
pub struct LoadSheet {
    inputs: HashMap<String, String>,
}

impl LoadSheet {
    /// Pre-fill every field with the previous load, if the server knows one
    pub fn for_workout(workout: &Workout) -> Self {
        let inputs = workout
            .exercises
            .iter()
            .map(|ex| {
                (
                    ex.name.clone(),
                    ex.previous_load.map(format_load).unwrap_or_default(),
                )
            })
            .collect();
        Self { inputs }
    }

    pub fn input(&self, exercise: &str) -> &str {
        self.inputs.get(exercise).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, exercise: &str, text: impl Into<String>) {
        self.inputs.insert(exercise.to_string(), text.into());
    }

    /// Keystroke into a load field; only characters that can form a number are kept
    pub fn push_char(&mut self, exercise: &str, c: char) {
        if c.is_ascii_digit() || c == '.' {
            self.inputs.entry(exercise.to_string()).or_default().push(c);
        }
    }

    pub fn pop_char(&mut self, exercise: &str) {
        if let Some(text) = self.inputs.get_mut(exercise) {
            text.pop();
        }
    }

    pub fn clear(&mut self, exercise: &str) {
        self.inputs.insert(exercise.to_string(), String::new());
    }

    pub fn load(&self, exercise: &str) -> Option<f64> {
        parse_load(self.input(exercise))
    }
}

/// Timestamp sent with a session: now for today, local noon for earlier days
pub fn session_timestamp(date: NaiveDate, now: DateTime<Local>) -> DateTime<Utc> {
    if date == now.date_naive() {
        return now.with_timezone(&Utc);
    }
    let noon = date.and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    Local
        .from_local_datetime(&noon)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&noon))
}

/// Assemble the session payload, refusing dates after today
pub fn build_session(
    user_id: &str,
    workout: &Workout,
    sheet: &LoadSheet,
    date: NaiveDate,
    now: DateTime<Local>,
) -> Result<WorkoutSession, SaveError> {
    if date > now.date_naive() {
        return Err(SaveError::FutureDate { date });
    }
    if workout.is_rest() {
        return Err(SaveError::RestDay);
    }

    let exercises = workout
        .exercises
        .iter()
        .map(|ex| LoggedExercise {
            name: ex.name.clone(),
            sets: ex.sets,
            reps: ex.reps.clone(),
            load: sheet.load(&ex.name),
        })
        .collect();

    Ok(WorkoutSession {
        user_id: user_id.to_string(),
        workout_type: workout.workout_type,
        workout_number: workout.workout_number,
        week: workout.week,
        phase: workout.phase.clone(),
        exercises,
        date: session_timestamp(date, now),
    })
}
