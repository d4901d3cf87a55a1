//! WebSocket protocol messages for the Outbreak session host.

use outbreak_core::{
    Difficulty, GameSession, OutcomeClass, Progress, ScoreBreakdown, SessionEvent,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Bind this connection to a known player identity
    Resume { player_id: Uuid, display_name: String },

    /// Request the available cases and missions
    ListCatalog,

    /// Request the live session and progress
    GetState,

    // Detective
    StartCase { case_id: String },
    RevealClue { clue_id: String },
    SelectDiagnosis { diagnosis_id: String },
    SubmitDiagnosis,
    /// Countdown tick
    Tick { time_remaining: u32 },

    // Command
    StartMission { mission_id: String },
    ExecuteAction { action_id: String },
    AdvanceTurn,
    /// Finish the mission with the result class the client evaluated.
    /// `resources_remaining` defaults to the sum of all resources.
    CompleteMission {
        outcome: OutcomeClass,
        resources_remaining: Option<f64>,
    },

    /// Abandon the live session
    ResetSession,

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the assigned player ID
    Welcome { player_id: Uuid },

    /// Connection now plays as this player
    Resumed { player_id: Uuid, progress: Progress },

    /// Available content
    Catalog {
        cases: Vec<CatalogEntry>,
        missions: Vec<CatalogEntry>,
    },

    /// Full session and progress snapshot
    SessionState {
        session: GameSession,
        progress: Progress,
    },

    /// What an intent changed
    Events { events: Vec<SessionEvent> },

    /// A diagnosis was submitted and scored
    DiagnosisResult {
        correct: bool,
        breakdown: ScoreBreakdown,
        outcome: String,
    },

    /// A mission was completed and scored
    MissionCompleted {
        breakdown: ScoreBreakdown,
        message: Option<String>,
    },

    /// Progress after a change
    Progress { progress: Progress },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// A catalog item as shown in a picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: String,
    pub title: String,
    pub difficulty: Difficulty,
    /// Cases only
    pub era: Option<String>,
}
