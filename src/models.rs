//! Wire types shared with the backend API

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" => Some(Gender::Male),
            "female" | "f" => Some(Gender::Female),
            "other" | "o" => Some(Gender::Other),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

/// Movement category of a training day
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum WorkoutType {
    Push,
    Pull,
    Legs,
    Rest,
}

impl WorkoutType {
    pub fn label(&self) -> &'static str {
        match self {
            WorkoutType::Push => "Push",
            WorkoutType::Pull => "Pull",
            WorkoutType::Legs => "Legs",
            WorkoutType::Rest => "Rest",
        }
    }
}

pub const WEEKDAYS: [&str; 7] = [
    "Sunday",
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
];

/// Weekday name for a rest-day index (0 = Sunday)
pub fn weekday_name(index: u8) -> Option<&'static str> {
    WEEKDAYS.get(index as usize).copied()
}

/// User profile as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub height: f64, // cm
    pub weight: f64, // kg
    pub gender: Gender,
    #[serde(default)]
    pub rest_day: Option<u8>,
    #[serde(default)]
    pub program_start_date: Option<DateTime<Utc>>,
}

impl User {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn has_started_program(&self) -> bool {
        self.program_start_date.is_some()
    }
}

/// Body of the create-user request
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub age: u32,
    pub height: f64,
    pub weight: f64,
    pub gender: Gender,
    pub rest_day: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProgramStarted {
    #[serde(default)]
    pub message: Option<String>,
    pub start_date: DateTime<Utc>,
}

/// One entry of the rolling schedule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub workout_number: Option<u8>,
    pub workout_name: String,
    pub week: u32,
    pub phase: String,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub is_completed: bool,
}

impl CalendarDay {
    pub fn is_rest(&self) -> bool {
        self.is_rest_day || self.workout_type == WorkoutType::Rest
    }
}

/// Exercise as planned by the backend for one workout
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlannedExercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    #[serde(default)]
    pub previous_load: Option<f64>,
}

/// One scheduled training day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Workout {
    pub workout_type: WorkoutType,
    #[serde(default)]
    pub workout_number: u8,
    pub week: u32,
    pub phase: String,
    #[serde(default)]
    pub is_rest_day: bool,
    #[serde(default)]
    pub exercises: Vec<PlannedExercise>,
    #[serde(default, deserialize_with = "de_opt_date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub is_today: bool,
    #[serde(default)]
    pub is_completed: bool,
}

impl Workout {
    pub fn is_rest(&self) -> bool {
        self.is_rest_day || self.workout_type == WorkoutType::Rest
    }

    /// "Push1", "Legs2", ...
    pub fn title(&self) -> String {
        if self.is_rest() {
            "Rest Day".to_string()
        } else {
            format!("{}{}", self.workout_type.label(), self.workout_number)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggedExercise {
    pub name: String,
    pub sets: u32,
    pub reps: String,
    pub load: Option<f64>,
}

/// Completed session sent to the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkoutSession {
    pub user_id: String,
    pub workout_type: WorkoutType,
    pub workout_number: u8,
    pub week: u32,
    pub phase: String,
    pub exercises: Vec<LoggedExercise>,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProgressPoint {
    #[serde(deserialize_with = "de_date")]
    pub date: NaiveDate,
    pub load: f64,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<String>,
}

/// Parse the date forms the backend emits: RFC 3339, naive ISO timestamp or plain date.
/// Zoned timestamps are reduced to the local calendar date.
pub fn parse_api_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Local).date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_api_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}")))
}

fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_api_date(&raw)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("unrecognised date: {raw}"))),
        None => Ok(None),
    }
}
