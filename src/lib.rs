//! ppl-coach - terminal client for a 6-week Push/Pull/Legs program
//!
//! The backend owns scheduling and progression; this crate renders it,
//! validates input and keeps a small local profile cache.

pub mod api;
pub mod calendar;
pub mod config;
pub mod db;
pub mod models;
pub mod onboarding;
pub mod program;
pub mod progress;
pub mod tui;
pub mod workout;

pub use api::{ApiClient, ApiError};
pub use config::Config;
pub use db::ProfileStore;
