//! Immutable game content: Detective cases and Command missions.
//!
//! Content is owned by a catalog outside the session store. The store only
//! reads these definitions and never mutates them.

use crate::resources::{ResourceDelta, Resources};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Case or mission difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to a Detective total
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Hard => 1.5,
            Difficulty::Medium => 1.2,
            Difficulty::Easy => 1.0,
        }
    }
}

/// Kind of evidence a clue represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClueType {
    Lab,
    Epi,
    Clinical,
    Environmental,
    Historical,
}

/// A single piece of evidence in a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clue {
    pub id: String,
    #[serde(rename = "type")]
    pub clue_type: ClueType,
    /// Position in the case's clue list (1-based)
    pub order: u32,
    pub content: String,
}

/// A candidate answer for a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisOption {
    pub id: String,
    pub label: String,
    pub is_correct: bool,
}

/// A Detective case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    /// Decade bucket used to group cases, e.g. "1850s"
    pub era: String,
    pub title: String,
    pub year: i32,
    pub difficulty: Difficulty,
    /// Countdown length in seconds
    pub time_limit: u32,
    pub base_points: i64,
    pub clues: Vec<Clue>,
    pub diagnosis_options: Vec<DiagnosisOption>,
    pub correct_diagnosis: String,
    /// Narrative shown once the case is resolved
    pub outcome: String,
}

impl Case {
    /// Check the single-correct-answer invariant
    pub fn validate(&self) -> Result<(), ContentError> {
        let correct: Vec<&DiagnosisOption> = self
            .diagnosis_options
            .iter()
            .filter(|o| o.is_correct)
            .collect();

        match correct.as_slice() {
            [only] if only.id == self.correct_diagnosis => {}
            [only] => {
                return Err(ContentError::CorrectDiagnosisMismatch {
                    case_id: self.id.clone(),
                    flagged: only.id.clone(),
                    declared: self.correct_diagnosis.clone(),
                })
            }
            _ => {
                return Err(ContentError::CorrectOptionCount {
                    case_id: self.id.clone(),
                    count: correct.len(),
                })
            }
        }

        let mut seen = HashSet::new();
        for clue in &self.clues {
            if !seen.insert(clue.id.as_str()) {
                return Err(ContentError::DuplicateId(clue.id.clone()));
            }
        }

        Ok(())
    }

    pub fn clue_count(&self) -> usize {
        self.clues.len()
    }

    /// Whether the case defines a clue with this id
    pub fn has_clue(&self, clue_id: &str) -> bool {
        self.clues.iter().any(|c| c.id == clue_id)
    }

    /// Whether the case offers a diagnosis with this id
    pub fn has_diagnosis(&self, diagnosis_id: &str) -> bool {
        self.diagnosis_options.iter().any(|o| o.id == diagnosis_id)
    }

    /// Clues sorted by their declared position
    pub fn clues_in_order(&self) -> Vec<&Clue> {
        let mut clues: Vec<&Clue> = self.clues.iter().collect();
        clues.sort_by_key(|c| c.order);
        clues
    }
}

/// Result of a single resolved outcome branch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutcome {
    pub probability: f64,
    #[serde(default)]
    pub effect: ResourceDelta,
    pub message: String,
}

/// One choice offered by a mission event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionAction {
    pub id: String,
    pub label: String,
    /// Paid unconditionally before the draw
    #[serde(default)]
    pub cost: ResourceDelta,
    pub success: ActionOutcome,
    pub failure: ActionOutcome,
}

/// The event scheduled for a given turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissionEvent {
    pub turn: u32,
    pub title: String,
    pub description: String,
    pub options: Vec<MissionAction>,
}

impl MissionEvent {
    pub fn action(&self, action_id: &str) -> Option<&MissionAction> {
        self.options.iter().find(|a| a.id == action_id)
    }
}

/// Classification of a finished mission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeClass {
    Victory,
    Partial,
    Failure,
}

/// A terminal mission result, described for the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissionOutcome {
    /// Human readable condition, evaluated by the caller
    pub condition: String,
    pub result: OutcomeClass,
    pub message: String,
    pub points: i64,
}

/// A Command mission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    pub total_turns: u32,
    pub initial_resources: Resources,
    pub events: Vec<MissionEvent>,
    pub outcomes: Vec<MissionOutcome>,
}

impl Mission {
    /// Check that every event sits on its own turn within the mission
    pub fn validate(&self) -> Result<(), ContentError> {
        let mut turns = HashSet::new();
        for event in &self.events {
            if event.turn == 0 || event.turn > self.total_turns {
                return Err(ContentError::EventOutOfRange {
                    mission_id: self.id.clone(),
                    turn: event.turn,
                    total_turns: self.total_turns,
                });
            }
            if !turns.insert(event.turn) {
                return Err(ContentError::DuplicateEventTurn {
                    mission_id: self.id.clone(),
                    turn: event.turn,
                });
            }
        }
        Ok(())
    }

    /// The event scheduled for a turn, if any
    pub fn event_for_turn(&self, turn: u32) -> Option<&MissionEvent> {
        self.events.iter().find(|e| e.turn == turn)
    }

    /// The first outcome declared for a result class
    pub fn outcome_for(&self, result: OutcomeClass) -> Option<&MissionOutcome> {
        self.outcomes.iter().find(|o| o.result == result)
    }
}

/// Errors in content definitions
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Case {case_id} must have exactly one correct diagnosis, found {count}")]
    CorrectOptionCount { case_id: String, count: usize },

    #[error("Case {case_id} flags {flagged} as correct but declares {declared}")]
    CorrectDiagnosisMismatch {
        case_id: String,
        flagged: String,
        declared: String,
    },

    #[error("Mission {mission_id} schedules an event on turn {turn} outside 1..={total_turns}")]
    EventOutOfRange {
        mission_id: String,
        turn: u32,
        total_turns: u32,
    },

    #[error("Mission {mission_id} schedules two events on turn {turn}")]
    DuplicateEventTurn { mission_id: String, turn: u32 },

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Malformed content: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    /// A three-clue case with a configurable difficulty
    pub fn case(difficulty: Difficulty) -> Case {
        Case {
            id: "broad-street".into(),
            era: "1850s".into(),
            title: "The Broad Street Pump".into(),
            year: 1854,
            difficulty,
            time_limit: 120,
            base_points: 100,
            clues: vec![
                Clue {
                    id: "c1".into(),
                    clue_type: ClueType::Epi,
                    order: 1,
                    content: "Deaths cluster around one street".into(),
                },
                Clue {
                    id: "c2".into(),
                    clue_type: ClueType::Environmental,
                    order: 2,
                    content: "Brewery workers drink beer, not water".into(),
                },
                Clue {
                    id: "c3".into(),
                    clue_type: ClueType::Clinical,
                    order: 3,
                    content: "Profuse watery diarrhoea".into(),
                },
            ],
            diagnosis_options: vec![
                DiagnosisOption {
                    id: "cholera".into(),
                    label: "Waterborne cholera".into(),
                    is_correct: true,
                },
                DiagnosisOption {
                    id: "miasma".into(),
                    label: "Bad air".into(),
                    is_correct: false,
                },
            ],
            correct_diagnosis: "cholera".into(),
            outcome: "The pump handle is removed.".into(),
        }
    }

    fn outcome(probability: f64, effect: ResourceDelta, message: &str) -> ActionOutcome {
        ActionOutcome {
            probability,
            effect,
            message: message.into(),
        }
    }

    /// A four-turn mission with events on turns 1 and 2
    pub fn mission() -> Mission {
        Mission {
            id: "measles-1".into(),
            title: "School Outbreak".into(),
            difficulty: Difficulty::Medium,
            total_turns: 4,
            initial_resources: Resources::new(100, 10, 50, 30),
            events: vec![
                MissionEvent {
                    turn: 1,
                    title: "First cases".into(),
                    description: "Three pupils present with rash".into(),
                    options: vec![
                        MissionAction {
                            id: "vaccinate".into(),
                            label: "Run a vaccination clinic".into(),
                            cost: ResourceDelta {
                                budget: Some(40),
                                personnel: Some(3),
                                ..Default::default()
                            },
                            success: outcome(
                                1.0,
                                ResourceDelta {
                                    public_trust: Some(10),
                                    ..Default::default()
                                },
                                "Uptake is strong",
                            ),
                            failure: outcome(
                                0.0,
                                ResourceDelta {
                                    public_trust: Some(-5),
                                    ..Default::default()
                                },
                                "Few families attend",
                            ),
                        },
                        MissionAction {
                            id: "ignore".into(),
                            label: "Wait and see".into(),
                            cost: ResourceDelta::default(),
                            success: outcome(
                                0.0,
                                ResourceDelta::default(),
                                "Nothing happens",
                            ),
                            failure: outcome(
                                1.0,
                                ResourceDelta {
                                    public_trust: Some(-30),
                                    time: Some(-5),
                                    ..Default::default()
                                },
                                "The outbreak spreads",
                            ),
                        },
                    ],
                },
                MissionEvent {
                    turn: 2,
                    title: "Press inquiry".into(),
                    description: "A reporter calls".into(),
                    options: vec![MissionAction {
                        id: "briefing".into(),
                        label: "Hold a briefing".into(),
                        cost: ResourceDelta {
                            budget: Some(500),
                            ..Default::default()
                        },
                        success: outcome(
                            0.5,
                            ResourceDelta {
                                public_trust: Some(20),
                                ..Default::default()
                            },
                            "Coverage is calm",
                        ),
                        failure: outcome(
                            0.5,
                            ResourceDelta {
                                public_trust: Some(-20),
                                ..Default::default()
                            },
                            "Coverage is alarmist",
                        ),
                    }],
                },
            ],
            outcomes: vec![
                MissionOutcome {
                    condition: "Trust above 50 at the end".into(),
                    result: OutcomeClass::Victory,
                    message: "Outbreak contained".into(),
                    points: 1000,
                },
                MissionOutcome {
                    condition: "Trust collapses".into(),
                    result: OutcomeClass::Failure,
                    message: "The school closes".into(),
                    points: 0,
                },
            ],
        }
    }
}
