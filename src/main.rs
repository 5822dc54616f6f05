//! ppl - Push/Pull/Legs training client

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};

use ppl_coach::api::ApiClient;
use ppl_coach::calendar::{DEFAULT_DAYS, group_by_weeks};
use ppl_coach::config::{Config, init_logging};
use ppl_coach::db::ProfileStore;
use ppl_coach::models::{User, Workout, weekday_name};
use ppl_coach::onboarding::{Field, ProfileForm};
use ppl_coach::program::phase_name;
use ppl_coach::progress::{ExerciseStats, OverallStats};
use ppl_coach::tui::App;
use ppl_coach::workout::{LoadSheet, UPCOMING_DAYS, build_session, format_load};

#[derive(Parser)]
#[command(name = "ppl")]
#[command(author, version, about = "Push/Pull/Legs training client")]
struct Cli {
    #[command(flatten)]
    config: Config,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the full-screen client
    Tui,

    /// Create a profile without the TUI
    Onboard {
        #[arg(long)]
        first_name: String,

        #[arg(long)]
        last_name: String,

        /// Age in years (13-100)
        #[arg(long)]
        age: String,

        /// Height in cm (100-250)
        #[arg(long)]
        height: String,

        /// Weight in kg (30-300)
        #[arg(long)]
        weight: String,

        /// male, female or other
        #[arg(long)]
        gender: String,

        /// Rest day, 0 = Sunday .. 6 = Saturday
        #[arg(long)]
        rest_day: String,

        #[arg(long)]
        phone: Option<String>,
    },

    /// Show the cached profile, refreshed from the server
    Status,

    /// Start the 6-week program
    Start,

    /// Show the schedule
    Calendar {
        /// Number of days to show
        #[arg(short, long, default_value_t = DEFAULT_DAYS)]
        days: u32,
    },

    /// Show a workout (upcoming week by default)
    Workout {
        /// Specific date (YYYY-MM-DD)
        #[arg(short, long, conflicts_with = "current")]
        date: Option<NaiveDate>,

        /// Today's workout
        #[arg(short, long)]
        current: bool,

        /// Days ahead for the upcoming list
        #[arg(short, long, default_value_t = UPCOMING_DAYS)]
        upcoming: u32,
    },

    /// Log loads for a workout
    Log {
        /// Workout date (YYYY-MM-DD), today if omitted
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Load per exercise, e.g. --load "Bench Press=80"
        #[arg(short, long = "load", value_parser = parse_load_arg)]
        loads: Vec<(String, String)>,
    },

    /// Show load progression
    Progress {
        /// Single exercise name
        exercise: Option<String>,
    },

    /// Forget the cached profile
    Logout,
}

fn parse_load_arg(s: &str) -> Result<(String, String), String> {
    let (name, load) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=LOAD, got '{s}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing exercise name in '{s}'"));
    }
    Ok((name.to_string(), load.trim().to_string()))
}

fn require_user(store: &ProfileStore) -> Result<User> {
    store
        .load_user()?
        .context("no profile cached, run `ppl onboard` or open the TUI first")
}

fn print_workout(workout: &Workout) {
    let date = workout
        .date
        .map(|d| d.format("%a %Y-%m-%d").to_string())
        .unwrap_or_else(|| "today".to_string());
    let mut flags = String::new();
    if workout.is_today {
        flags.push_str(" [today]");
    }
    if workout.is_completed {
        flags.push_str(" [done]");
    }
    println!(
        "{} | {} | week {} | {}{}",
        date,
        workout.title(),
        workout.week,
        phase_name(&workout.phase),
        flags
    );
    if workout.is_rest() {
        println!("  Rest day, recover well");
        return;
    }
    for ex in &workout.exercises {
        println!(
            "  {:28} {}x{:8} prev: {}",
            ex.name,
            ex.sets,
            ex.reps,
            ex.previous_load
                .map(|l| format!("{} kg", format_load(l)))
                .unwrap_or_else(|| "-".to_string())
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config;
    let tui = matches!(cli.command, None | Some(Commands::Tui));
    init_logging(&config.log_target(tui))?;
    let api: ApiClient = config.api_client()?;
    let store = config.open_store()?;

    match cli.command {
        Some(Commands::Tui) | None => {
            let mut app = App::new(api, store, config.verify_phone)?;
            app.run().await?;
        }

        Some(Commands::Onboard {
            first_name,
            last_name,
            age,
            height,
            weight,
            gender,
            rest_day,
            phone,
        }) => {
            let mut form = ProfileForm::new();
            form.set(Field::FirstName, first_name);
            form.set(Field::LastName, last_name);
            form.set(Field::Age, age);
            form.set(Field::Height, height);
            form.set(Field::Weight, weight);
            form.set(Field::Gender, gender);
            form.set(Field::RestDay, rest_day);
            form.set(Field::Phone, phone.unwrap_or_default());

            let payload = match form.submit_payload() {
                Ok(payload) => payload,
                Err(errors) => {
                    for (field, msg) in &errors {
                        eprintln!("{}: {}", field.label(), msg);
                    }
                    bail!("profile rejected ({} invalid fields)", errors.len());
                }
            };
            let user = api
                .create_user(&payload)
                .await
                .context("Failed to create user")?;
            store.save_user(&user)?;
            println!("Welcome, {}! (id: {})", user.first_name, user.id);
        }

        Some(Commands::Status) => {
            let cached = require_user(&store)?;
            let user = match api.get_user(&cached.id).await {
                Ok(fresh) => {
                    store.save_user(&fresh)?;
                    fresh
                }
                Err(e) => {
                    tracing::warn!(error = %e, "refresh failed, showing cached profile");
                    cached
                }
            };
            println!("{}", user.full_name());
            println!("{:-<40}", "");
            println!("Age:      {} years", user.age);
            println!("Height:   {} cm", user.height);
            println!("Weight:   {} kg", user.weight);
            println!("Gender:   {}", user.gender.label());
            println!(
                "Rest day: {}",
                user.rest_day.and_then(weekday_name).unwrap_or("-")
            );
            match user.program_start_date {
                Some(start) => println!("Program:  started {}", start.format("%Y-%m-%d")),
                None => println!("Program:  not started (run `ppl start`)"),
            }
        }

        Some(Commands::Start) => {
            let user = require_user(&store)?;
            if user.has_started_program() {
                println!("Program already started");
                return Ok(());
            }
            let started = api
                .start_program(&user.id)
                .await
                .context("Failed to start program")?;
            store.set_program_start(started.start_date)?;
            println!(
                "{}",
                started
                    .message
                    .unwrap_or_else(|| format!("Program started {}", started.start_date.format("%Y-%m-%d")))
            );
        }

        Some(Commands::Calendar { days }) => {
            let user = require_user(&store)?;
            let schedule = api
                .calendar(&user.id, days)
                .await
                .context("Failed to load calendar")?;
            let today = Local::now().date_naive();
            for week in group_by_weeks(&schedule) {
                let line: Vec<String> = week
                    .iter()
                    .map(|d| {
                        let mark = if d.date == today {
                            "*"
                        } else if d.is_completed {
                            "✓"
                        } else {
                            " "
                        };
                        format!("{}{} {:8}", d.date.format("%m-%d"), mark, d.workout_name)
                    })
                    .collect();
                println!("{}", line.join(" | "));
            }
        }

        Some(Commands::Workout { date, current, upcoming }) => {
            let user = require_user(&store)?;
            let workouts = if current {
                vec![api.current_workout(&user.id).await?]
            } else if let Some(date) = date {
                let mut workout = api.workout_for_date(&user.id, date).await?;
                workout.date.get_or_insert(date);
                vec![workout]
            } else {
                api.upcoming_workouts(&user.id, upcoming).await?
            };
            for workout in &workouts {
                print_workout(workout);
            }
        }

        Some(Commands::Log { date, loads }) => {
            let user = require_user(&store)?;
            let now = Local::now();
            let date = date.unwrap_or_else(|| now.date_naive());
            let mut workout = api
                .workout_for_date(&user.id, date)
                .await
                .context("Failed to load workout data")?;
            workout.date.get_or_insert(date);

            let mut sheet = LoadSheet::for_workout(&workout);
            for (name, load) in loads {
                if !workout.exercises.iter().any(|e| e.name == name) {
                    bail!("'{}' is not part of {}", name, workout.title());
                }
                sheet.set(&name, load);
            }

            let session = build_session(&user.id, &workout, &sheet, date, now)?;
            api.submit_session(&session)
                .await
                .context("Failed to save workout")?;
            println!("Saved {} for {}", workout.title(), date);
            for ex in &session.exercises {
                println!(
                    "  {:28} {}",
                    ex.name,
                    ex.load
                        .map(|l| format!("{} kg", format_load(l)))
                        .unwrap_or_else(|| "-".to_string())
                );
            }
        }

        Some(Commands::Progress { exercise }) => {
            let user = require_user(&store)?;
            if let Some(name) = exercise {
                let points = api.exercise_progress(&user.id, &name).await?;
                match ExerciseStats::from_points(&points) {
                    Some(stats) => {
                        println!("{name}");
                        println!("{:-<40}", "");
                        for p in &points {
                            println!("{}  {} kg", p.date, format_load(p.load));
                        }
                        println!(
                            "max {} kg | latest {} kg | change {:+.1}% | {} sessions",
                            format_load(stats.max_load),
                            format_load(stats.latest_load),
                            stats.improvement,
                            stats.total_sessions
                        );
                    }
                    None => println!("No sessions logged for {name} yet"),
                }
            } else {
                let all = api.all_progress(&user.id).await?;
                let overall = OverallStats::from_all(&all);
                println!(
                    "Exercises: {} | Sessions: {} | Avg improvement: {:+.1}%",
                    overall.total_exercises, overall.total_sessions, overall.avg_improvement
                );
                println!("{:-<60}", "");
                for (name, points) in &all {
                    if let Some(stats) = ExerciseStats::from_points(points) {
                        println!(
                            "{:28} {:>8} kg {:>+7.1}%",
                            name,
                            format_load(stats.latest_load),
                            stats.improvement
                        );
                    }
                }
            }
        }

        Some(Commands::Logout) => {
            store.clear()?;
            println!("Profile cache cleared");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_load_arg() {
        assert_eq!(
            parse_load_arg("Bench Press = 80").unwrap(),
            ("Bench Press".to_string(), "80".to_string())
        );
        assert_eq!(
            parse_load_arg("Squat=").unwrap(),
            ("Squat".to_string(), String::new())
        );
        assert!(parse_load_arg("80").is_err());
        assert!(parse_load_arg("=80").is_err());
    }

    #[test]
    fn test_cli_parses_log() {
        let cli = Cli::try_parse_from([
            "ppl",
            "log",
            "--date",
            "2024-03-13",
            "--load",
            "Bench Press=80",
            "-l",
            "Dips=0",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Log { date, loads }) => {
                assert_eq!(date, NaiveDate::from_ymd_opt(2024, 3, 13));
                assert_eq!(loads.len(), 2);
            }
            _ => panic!("expected log"),
        }
    }

    #[test]
    fn test_no_subcommand_means_tui() {
        let cli = Cli::try_parse_from(["ppl"]).unwrap();
        assert!(cli.command.is_none());
    }
}
