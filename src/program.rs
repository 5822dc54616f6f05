//! Program description - 6-week Push/Pull/Legs structure shown on the dashboard
//!
//! Display data only. The backend decides which day and phase apply.

use crate::models::WorkoutType;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    BaseHypertrophy,
    MaximumEffort,
    Supercompensation,
    Deload,
}

impl Phase {
    /// Map a backend phase code ("phase1", "deload2", ...) to a phase
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "phase1" => Some(Phase::BaseHypertrophy),
            "phase2" => Some(Phase::MaximumEffort),
            "phase3" => Some(Phase::Supercompensation),
            c if c.starts_with("deload") => Some(Phase::Deload),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::BaseHypertrophy => "Base Hypertrophy",
            Phase::MaximumEffort => "Maximum Effort",
            Phase::Supercompensation => "Supercompensation",
            Phase::Deload => "Deload Week",
        }
    }
}

/// Display name for a phase code, falling back to the raw code
pub fn phase_name(code: &str) -> String {
    Phase::from_code(code)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| code.to_string())
}

pub struct PhaseInfo {
    pub phase: Phase,
    pub weeks: &'static str,
    pub focus: &'static str,
}

pub const PHASES: &[PhaseInfo] = &[
    PhaseInfo {
        phase: Phase::BaseHypertrophy,
        weeks: "Weeks 1-2",
        focus: "Foundation building with moderate volume and intensity",
    },
    PhaseInfo {
        phase: Phase::MaximumEffort,
        weeks: "Weeks 3-4",
        focus: "Intensity focus with lower volume, higher loads",
    },
    PhaseInfo {
        phase: Phase::Supercompensation,
        weeks: "Weeks 5-6",
        focus: "Peak volume for maximum hypertrophy stimulus",
    },
];

/// The 6-day rotation, in order
pub const ROTATION: [(WorkoutType, u8); 6] = [
    (WorkoutType::Push, 1),
    (WorkoutType::Pull, 1),
    (WorkoutType::Legs, 1),
    (WorkoutType::Push, 2),
    (WorkoutType::Pull, 2),
    (WorkoutType::Legs, 2),
];

pub const DELOAD_NOTE: &str =
    "Deload weeks replace training with light activity so the next phase starts recovered.";

pub fn rotation_label() -> String {
    ROTATION
        .iter()
        .map(|(t, n)| format!("{}{}", t.label(), n))
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Short description of what a workout type trains
pub fn workout_focus(workout_type: WorkoutType) -> &'static str {
    match workout_type {
        WorkoutType::Push => "Chest, shoulders, triceps",
        WorkoutType::Pull => "Back, biceps, rear delts",
        WorkoutType::Legs => "Quads, hamstrings, glutes, calves",
        WorkoutType::Rest => "Recovery",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_codes() {
        assert_eq!(Phase::from_code("phase1"), Some(Phase::BaseHypertrophy));
        assert_eq!(Phase::from_code("phase3"), Some(Phase::Supercompensation));
        assert_eq!(Phase::from_code("deload1"), Some(Phase::Deload));
        assert_eq!(Phase::from_code("deload2"), Some(Phase::Deload));
        assert_eq!(Phase::from_code("bonus"), None);
    }

    #[test]
    fn test_phase_name_falls_back_to_code() {
        assert_eq!(phase_name("phase2"), "Maximum Effort");
        assert_eq!(phase_name("mystery"), "mystery");
    }

    #[test]
    fn test_rotation_is_six_days() {
        assert_eq!(ROTATION.len(), 6);
        assert_eq!(
            rotation_label(),
            "Push1 → Pull1 → Legs1 → Push2 → Pull2 → Legs2"
        );
    }

    #[test]
    fn test_phases_cover_six_weeks() {
        assert_eq!(PHASES.len(), 3);
        assert_eq!(PHASES[2].weeks, "Weeks 5-6");
    }
}
