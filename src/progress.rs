//! Progress - summary statistics over per-exercise load series

use chrono::NaiveDate;

use crate::api::AllProgress;
use crate::models::ProgressPoint;

/// Summary of one exercise's load history
#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseStats {
    pub max_load: f64,
    pub min_load: f64,
    pub latest_load: f64,
    pub first_load: f64,
    /// Percent change first -> latest, one decimal
    pub improvement: f64,
    pub total_sessions: usize,
    pub first_date: NaiveDate,
    pub last_date: NaiveDate,
}

impl ExerciseStats {
    pub fn from_points(points: &[ProgressPoint]) -> Option<Self> {
        let first = points.first()?;
        let last = points.last()?;
        let max_load = points.iter().map(|p| p.load).fold(f64::MIN, f64::max);
        let min_load = points.iter().map(|p| p.load).fold(f64::MAX, f64::min);

        let improvement = if points.len() < 2 {
            0.0
        } else {
            improvement_pct(first.load, last.load).map(round1).unwrap_or(0.0)
        };

        Some(Self {
            max_load,
            min_load,
            latest_load: last.load,
            first_load: first.load,
            improvement,
            total_sessions: points.len(),
            first_date: first.date,
            last_date: last.date,
        })
    }
}

/// (last - first) / first * 100, undefined for a zero starting load
pub fn improvement_pct(first: f64, last: f64) -> Option<f64> {
    let pct = (last - first) / first * 100.0;
    pct.is_finite().then_some(pct)
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Totals across every exercise
#[derive(Debug, Clone, PartialEq)]
pub struct OverallStats {
    pub total_exercises: usize,
    pub total_sessions: usize,
    /// Mean improvement over every exercise, one decimal. A single session counts as 0.
    pub avg_improvement: f64,
}

impl OverallStats {
    pub fn from_all(all: &AllProgress) -> Self {
        let improvements: Vec<f64> = all
            .values()
            .filter_map(|series| match (series.first(), series.last()) {
                (Some(first), Some(last)) if series.len() >= 2 => {
                    improvement_pct(first.load, last.load)
                }
                _ => Some(0.0),
            })
            .collect();

        let avg_improvement = if improvements.is_empty() {
            0.0
        } else {
            round1(improvements.iter().sum::<f64>() / improvements.len() as f64)
        };

        Self {
            total_exercises: all.len(),
            total_sessions: all.values().map(Vec::len).sum(),
            avg_improvement,
        }
    }
}

/// Chart points: (session number starting at 1, load)
pub fn chart_series(points: &[ProgressPoint]) -> Vec<(f64, f64)> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| ((i + 1) as f64, p.load))
        .collect()
}

/// Y-axis bounds with a little headroom
pub fn load_bounds(points: &[ProgressPoint]) -> [f64; 2] {
    match ExerciseStats::from_points(points) {
        Some(stats) => {
            let pad = ((stats.max_load - stats.min_load) * 0.1).max(2.5);
            [(stats.min_load - pad).max(0.0), stats.max_load + pad]
        }
        None => [0.0, 1.0],
    }
}
