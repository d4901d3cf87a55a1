//! Point computation for finished attempts.
//!
//! Both functions are pure. Rounding is always `floor`, so the negative
//! bonuses that some inputs produce round toward negative infinity.

use crate::content::{Case, OutcomeClass};
use serde::{Deserialize, Serialize};

/// Streak bonus per consecutive correct diagnosis
const STREAK_STEP: i64 = 50;

/// Maximum streak bonus
const STREAK_CAP: i64 = 250;

/// Share of base points available as a Detective time bonus
const DETECTIVE_TIME_FACTOR: f64 = 0.5;

/// Share of base points available for solving with few clues
const DETECTIVE_CLUE_FACTOR: f64 = 0.3;

/// Share of base points available for finishing a mission early
const COMMAND_TURN_FACTOR: f64 = 0.3;

/// Points per unit of remaining resources
const COMMAND_RESOURCE_FACTOR: f64 = 2.0;

/// The named components of a score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub base_points: i64,
    pub time_bonus: i64,
    pub accuracy_bonus: i64,
    pub streak_bonus: i64,
    pub difficulty_multiplier: f64,
    pub total_score: i64,
}

impl ScoreBreakdown {
    /// The breakdown of an attempt that earns nothing
    pub fn zero() -> Self {
        Self {
            base_points: 0,
            time_bonus: 0,
            accuracy_bonus: 0,
            streak_bonus: 0,
            difficulty_multiplier: 1.0,
            total_score: 0,
        }
    }
}

/// `max(0, 1 - used / limit)`; a zero limit leaves nothing to reward
fn remaining_ratio(used: f64, limit: f64) -> f64 {
    if limit <= 0.0 {
        return 0.0;
    }
    (1.0 - used / limit).max(0.0)
}

/// Floors into points; out-of-range values saturate and NaN is 0
fn floor_points(value: f64) -> i64 {
    value.floor() as i64
}

/// Score a Detective submission.
///
/// The clue ratio is not clamped: revealing more clues than the
/// case defines yields a negative accuracy bonus.
pub fn score_detective(
    case: &Case,
    time_spent_seconds: u32,
    clues_revealed: usize,
    is_correct: bool,
    current_streak: u32,
) -> ScoreBreakdown {
    if !is_correct {
        return ScoreBreakdown::zero();
    }

    let base_points = case.base_points;
    let base = base_points as f64;

    let time_ratio = remaining_ratio(time_spent_seconds as f64, case.time_limit as f64);
    let time_bonus = floor_points(base * DETECTIVE_TIME_FACTOR * time_ratio);

    let clue_ratio = if case.clues.is_empty() {
        0.0
    } else {
        1.0 - clues_revealed as f64 / case.clues.len() as f64
    };
    let accuracy_bonus = floor_points(base * DETECTIVE_CLUE_FACTOR * clue_ratio);

    let streak_bonus = (i64::from(current_streak) * STREAK_STEP).min(STREAK_CAP);

    let difficulty_multiplier = case.difficulty.multiplier();
    let sum = base_points
        .saturating_add(time_bonus)
        .saturating_add(accuracy_bonus)
        .saturating_add(streak_bonus);
    let total_score = floor_points(sum as f64 * difficulty_multiplier);

    ScoreBreakdown {
        base_points,
        time_bonus,
        accuracy_bonus,
        streak_bonus,
        difficulty_multiplier,
        total_score,
    }
}

/// Base points for a mission result
pub fn command_base_points(outcome: OutcomeClass) -> i64 {
    match outcome {
        OutcomeClass::Victory => 1000,
        OutcomeClass::Partial => 500,
        OutcomeClass::Failure => 0,
    }
}

/// Score a finished Command mission.
///
/// `resources_remaining` is a caller-chosen scalar summary and may be
/// negative, in which case the accuracy bonus is a penalty.
pub fn score_command(
    turns_used: u32,
    total_turns: u32,
    outcome: OutcomeClass,
    resources_remaining: f64,
) -> ScoreBreakdown {
    let base_points = command_base_points(outcome);
    let turn_ratio = remaining_ratio(turns_used as f64, total_turns as f64);
    let time_bonus = floor_points(base_points as f64 * COMMAND_TURN_FACTOR * turn_ratio);
    let accuracy_bonus = floor_points(resources_remaining * COMMAND_RESOURCE_FACTOR);

    ScoreBreakdown {
        base_points,
        time_bonus,
        accuracy_bonus,
        streak_bonus: 0,
        difficulty_multiplier: 1.0,
        total_score: base_points
            .saturating_add(time_bonus)
            .saturating_add(accuracy_bonus),
    }
}
