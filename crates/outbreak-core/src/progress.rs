//! Durable cross-session progress.
//!
//! This module contains:
//! - Progress: completed content, streak, badges and aggregate stats
//! - PlayerProfile: the injected player identity
//! - Badge: milestones awarded as progress changes
//!
//! Completed ids live in ordered sets, so crediting the same case or mission
//! twice is a no-op and the persisted form is stable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Streak at which `HotStreak` is awarded
const HOT_STREAK: u32 = 3;

/// Streak at which `Unstoppable` is awarded
const UNSTOPPABLE_STREAK: u32 = 5;

/// Player identity, supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub id: Uuid,
    pub display_name: String,
}

impl PlayerProfile {
    pub fn new(id: Uuid, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }
}

/// Aggregate statistics, the target of score accumulation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub total_score: i64,
    pub cases_solved: u32,
    pub cases_failed: u32,
    pub missions_completed: u32,
    pub best_streak: u32,
}

/// Milestone badges
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    /// First correct diagnosis
    FirstDiagnosis,
    /// Three correct diagnoses in a row
    HotStreak,
    /// Five correct diagnoses in a row
    Unstoppable,
    /// First mission completed
    FirstCommand,
}

/// Progress that survives across sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    pub completed_cases: BTreeSet<String>,
    pub completed_missions: BTreeSet<String>,
    /// Consecutive correct Detective diagnoses
    pub streak: u32,
    pub player: Option<PlayerProfile>,
    pub badges: BTreeSet<Badge>,
    pub stats: PlayerStats,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty progress for a known player
    pub fn for_player(player: PlayerProfile) -> Self {
        Self {
            player: Some(player),
            ..Self::default()
        }
    }

    pub fn has_completed_case(&self, case_id: &str) -> bool {
        self.completed_cases.contains(case_id)
    }

    pub fn has_completed_mission(&self, mission_id: &str) -> bool {
        self.completed_missions.contains(mission_id)
    }

    /// Record a correct diagnosis. Returns badges earned by it.
    pub fn record_correct_diagnosis(&mut self, case_id: &str) -> Vec<Badge> {
        self.streak += 1;
        self.stats.best_streak = self.stats.best_streak.max(self.streak);
        if self.completed_cases.insert(case_id.to_string()) {
            self.stats.cases_solved += 1;
        }

        let mut earned = Vec::new();
        self.award(Badge::FirstDiagnosis, &mut earned);
        if self.streak >= HOT_STREAK {
            self.award(Badge::HotStreak, &mut earned);
        }
        if self.streak >= UNSTOPPABLE_STREAK {
            self.award(Badge::Unstoppable, &mut earned);
        }
        earned
    }

    /// Record an incorrect diagnosis; the streak is lost
    pub fn record_incorrect_diagnosis(&mut self) {
        self.streak = 0;
        self.stats.cases_failed += 1;
    }

    /// Record a completed mission. Returns badges earned by it.
    ///
    /// A mission already credited is not counted again.
    pub fn record_mission(&mut self, mission_id: &str) -> Vec<Badge> {
        let mut earned = Vec::new();
        if self.completed_missions.insert(mission_id.to_string()) {
            self.stats.missions_completed += 1;
            self.award(Badge::FirstCommand, &mut earned);
        }
        earned
    }

    /// Accumulate points into the player's total
    pub fn add_score(&mut self, points: i64) {
        self.stats.total_score = self.stats.total_score.saturating_add(points);
    }

    /// Whether nothing has been earned yet; the player identity is ignored
    pub fn is_blank(&self) -> bool {
        self.completed_cases.is_empty()
            && self.completed_missions.is_empty()
            && self.streak == 0
            && self.badges.is_empty()
            && self.stats == PlayerStats::default()
    }

    fn award(&mut self, badge: Badge, earned: &mut Vec<Badge>) {
        if self.badges.insert(badge) {
            earned.push(badge);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_correct_diagnosis_extends_streak() {
        let mut progress = Progress::new();
        progress.record_correct_diagnosis("a");
        progress.record_correct_diagnosis("b");
        assert_eq!(progress.streak, 2);
        assert_eq!(progress.stats.cases_solved, 2);
        assert_eq!(progress.stats.best_streak, 2);
    }

    #[test]
    fn test_repeat_case_is_not_duplicated() {
        let mut progress = Progress::new();
        progress.record_correct_diagnosis("a");
        progress.record_correct_diagnosis("a");
        assert_eq!(progress.completed_cases.len(), 1);
        assert_eq!(progress.stats.cases_solved, 1);
        assert_eq!(progress.streak, 2);
    }

    #[test]
    fn test_incorrect_diagnosis_resets_streak_but_keeps_best() {
        let mut progress = Progress::new();
        for id in ["a", "b", "c"] {
            progress.record_correct_diagnosis(id);
        }
        progress.record_incorrect_diagnosis();
        assert_eq!(progress.streak, 0);
        assert_eq!(progress.stats.best_streak, 3);
        assert_eq!(progress.stats.cases_failed, 1);
    }

    #[test]
    fn test_streak_badges() {
        let mut progress = Progress::new();
        assert_eq!(progress.record_correct_diagnosis("a"), vec![Badge::FirstDiagnosis]);
        assert!(progress.record_correct_diagnosis("b").is_empty());
        assert_eq!(progress.record_correct_diagnosis("c"), vec![Badge::HotStreak]);
        progress.record_correct_diagnosis("d");
        assert_eq!(progress.record_correct_diagnosis("e"), vec![Badge::Unstoppable]);
        assert_eq!(progress.badges.len(), 3);
    }

    #[test]
    fn test_mission_credited_once() {
        let mut progress = Progress::new();
        assert_eq!(progress.record_mission("m1"), vec![Badge::FirstCommand]);
        assert!(progress.record_mission("m1").is_empty());
        assert_eq!(progress.completed_missions.len(), 1);
        assert_eq!(progress.stats.missions_completed, 1);
    }

    #[test]
    fn test_missing_fields_deserialize_to_defaults() {
        let progress: Progress = serde_json::from_str(r#"{"streak": 4}"#).unwrap();
        assert_eq!(progress.streak, 4);
        assert!(progress.completed_cases.is_empty());
        assert!(progress.player.is_none());
    }

    #[test]
    fn test_total_score_saturates() {
        let mut progress = Progress::new();
        progress.add_score(i64::MAX);
        progress.add_score(1000);
        assert_eq!(progress.stats.total_score, i64::MAX);
    }

    #[test]
    fn test_blank_progress_ignores_player() {
        let mut progress = Progress::for_player(PlayerProfile::new(Uuid::nil(), "Dr Snow"));
        assert!(progress.is_blank());

        progress.record_incorrect_diagnosis();
        assert!(!progress.is_blank());
    }
}
