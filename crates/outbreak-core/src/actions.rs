//! Intents a player can issue and the events they produce.
//!
//! Each intent maps to exactly one [`SessionStore`](crate::SessionStore)
//! operation. Front ends (the WebAssembly binding, the server) go through
//! [`SessionStore::apply`](crate::SessionStore::apply) and render the events.

use crate::content::{Case, Mission};
use crate::progress::Badge;
use crate::resources::Resources;
use serde::{Deserialize, Serialize};

/// All possible player intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionIntent {
    // ==================== Detective ====================
    /// Begin a case, abandoning any live session
    StartCase(Box<Case>),
    RevealClue(String),
    SelectDiagnosis(String),
    SubmitDiagnosis,
    /// Timer tick from the front end
    SetTimeRemaining(u32),
    /// Record the scored total of a solved case
    RecordScore(i64),

    // ==================== Command ====================
    /// Begin a mission, abandoning any live session
    StartMission(Box<Mission>),
    ExecuteAction(String),
    AdvanceTurn,
    /// Finish the mission with a final score
    CompleteGame(i64),

    // ==================== Session ====================
    /// Drop the live session, keeping progress
    Reset,
}

/// Events that occur as a result of intents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SessionEvent {
    CaseStarted {
        case_id: String,
        time_limit: u32,
    },

    ClueRevealed {
        clue_id: String,
        /// False when the clue was already showing
        newly_revealed: bool,
    },

    DiagnosisSelected {
        diagnosis_id: String,
    },

    DiagnosisSubmitted {
        case_id: String,
        correct: bool,
        /// Streak after the submission
        streak: u32,
    },

    TimeUpdated {
        time_remaining: u32,
    },

    ScoreRecorded {
        score: i64,
        total_score: i64,
    },

    MissionStarted {
        mission_id: String,
        resources: Resources,
    },

    ActionResolved {
        turn: u32,
        action_id: String,
        success: bool,
        message: String,
        /// Resources after cost and effect
        resources: Resources,
    },

    TurnAdvanced {
        turn: u32,
        turns_exhausted: bool,
    },

    MissionCompleted {
        mission_id: String,
        score: i64,
    },

    SessionReset,

    /// Milestones reached by the intent
    BadgesEarned {
        badges: Vec<Badge>,
    },
}
