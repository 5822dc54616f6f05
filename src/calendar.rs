//! Calendar - week grouping and selection over the fetched schedule

use chrono::{Datelike, NaiveDate};

use crate::models::{CalendarDay, WorkoutType};

pub const DEFAULT_DAYS: u32 = 30;

/// One Sunday-first row of the calendar grid
pub type WeekRow<'a> = [Option<&'a CalendarDay>; 7];

/// Split consecutive days into rows, starting a new row on every Sunday
pub fn group_by_weeks(days: &[CalendarDay]) -> Vec<Vec<&CalendarDay>> {
    let mut weeks = Vec::new();
    let mut current: Vec<&CalendarDay> = Vec::new();

    for day in days {
        if day.date.weekday().num_days_from_sunday() == 0 && !current.is_empty() {
            weeks.push(std::mem::take(&mut current));
        }
        current.push(day);
    }
    if !current.is_empty() {
        weeks.push(current);
    }
    weeks
}

/// Seven-column grid where column 0 is always Sunday.
/// Missing cells before the first and after the last day are `None`.
pub fn week_grid(days: &[CalendarDay]) -> Vec<WeekRow<'_>> {
    group_by_weeks(days)
        .into_iter()
        .map(|week| {
            let mut row: WeekRow = [None; 7];
            for day in week {
                row[day.date.weekday().num_days_from_sunday() as usize] = Some(day);
            }
            row
        })
        .collect()
}

/// "March 2024" from the first entry
pub fn month_label(days: &[CalendarDay]) -> Option<String> {
    days.first().map(|d| d.date.format("%B %Y").to_string())
}

pub fn is_today(day: &CalendarDay, today: NaiveDate) -> bool {
    day.date == today
}

/// Date to open in the workout view; rest days are not selectable
pub fn select(day: &CalendarDay) -> Option<NaiveDate> {
    (!day.is_rest()).then_some(day.date)
}

/// Colour class used when rendering a day
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayTone {
    Push,
    Pull,
    Legs,
    Rest,
}

pub fn day_tone(day: &CalendarDay) -> DayTone {
    if day.is_rest() {
        return DayTone::Rest;
    }
    match day.workout_type {
        WorkoutType::Push => DayTone::Push,
        WorkoutType::Pull => DayTone::Pull,
        WorkoutType::Legs => DayTone::Legs,
        WorkoutType::Rest => DayTone::Rest,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Weekday};

    fn day(date: NaiveDate, workout_type: WorkoutType) -> CalendarDay {
        CalendarDay {
            date,
            workout_type,
            workout_number: Some(1),
            workout_name: format!("{}1", workout_type.label()),
            week: 1,
            phase: "phase1".to_string(),
            is_rest_day: workout_type == WorkoutType::Rest,
            is_completed: false,
        }
    }

    fn days_from(start: NaiveDate, n: i64) -> Vec<CalendarDay> {
        let rotation = [WorkoutType::Push, WorkoutType::Pull, WorkoutType::Legs];
        (0..n)
            .map(|i| day(start + Duration::days(i), rotation[i as usize % 3]))
            .collect()
    }

    #[test]
    fn test_thirty_days_grid_rows_start_on_sunday() {
        // 2024-03-13 is a Wednesday
        let start = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let days = days_from(start, 30);
        let grid = week_grid(&days);

        let placed: usize = grid.iter().map(|r| r.iter().flatten().count()).sum();
        assert_eq!(placed, 30);

        for row in &grid {
            let first = row.iter().flatten().next().unwrap();
            let col = row.iter().position(|c| c.is_some()).unwrap();
            assert_eq!(col, first.date.weekday().num_days_from_sunday() as usize);
            // column 0 holds a Sunday whenever it is filled
            if let Some(sunday) = row[0] {
                assert_eq!(sunday.date.weekday(), Weekday::Sun);
            }
        }

        // first row is padded: Sun..Tue empty, Wednesday in column 3
        assert!(grid[0][..3].iter().all(Option::is_none));
        assert_eq!(grid[0][3].unwrap().date, start);
        // every later row begins with a Sunday
        for row in &grid[1..] {
            assert_eq!(row[0].unwrap().date.weekday(), Weekday::Sun);
        }
    }

    #[test]
    fn test_group_by_weeks_splits_on_sunday() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        let days = days_from(start, 30);
        let weeks = group_by_weeks(&days);
        assert_eq!(weeks.len(), 5);
        assert_eq!(weeks[0].len(), 4); // Wed..Sat
        assert_eq!(weeks[1].len(), 7);
        assert_eq!(weeks[4].len(), 5);
    }

    #[test]
    fn test_group_starting_on_sunday() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let days = days_from(start, 14);
        let weeks = group_by_weeks(&days);
        assert_eq!(weeks.len(), 2);
        assert!(weeks.iter().all(|w| w.len() == 7));
    }

    #[test]
    fn test_empty_calendar() {
        assert!(group_by_weeks(&[]).is_empty());
        assert!(week_grid(&[]).is_empty());
        assert_eq!(month_label(&[]), None);
    }

    #[test]
    fn test_month_label() {
        let days = days_from(NaiveDate::from_ymd_opt(2024, 3, 13).unwrap(), 3);
        assert_eq!(month_label(&days).as_deref(), Some("March 2024"));
    }

    #[test]
    fn test_select_skips_rest_days() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(select(&day(date, WorkoutType::Pull)), Some(date));
        assert_eq!(select(&day(date, WorkoutType::Rest)), None);
    }

    #[test]
    fn test_day_tone() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 13).unwrap();
        assert_eq!(day_tone(&day(date, WorkoutType::Legs)), DayTone::Legs);
        let mut deload = day(date, WorkoutType::Push);
        deload.is_rest_day = true;
        assert_eq!(day_tone(&deload), DayTone::Rest);
        assert!(is_today(&deload, date));
    }
}
