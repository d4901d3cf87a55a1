//! Per-player session hosting.
//!
//! The host plays the role of the UI orchestrator: it resolves catalog ids,
//! forwards intents to the player's [`SessionStore`], and scores finished
//! attempts with the same values the transition used.

use outbreak_core::{
    score_command, score_detective, Catalog, GameStatus, OutcomeClass, PlayerProfile,
    SessionError, SessionIntent, SessionStore,
};
use thiserror::Error;

use crate::protocol::{CatalogEntry, ClientMessage, ServerMessage};

/// Largest magnitude accepted for a client-reported resource summary
const MAX_RESOURCES_REMAINING: f64 = 1e12;

#[derive(Debug, Error)]
pub enum HostError {
    #[error("Unknown case: {0}")]
    UnknownCase(String),

    #[error("Unknown mission: {0}")]
    UnknownMission(String),

    #[error("{0}")]
    Session(#[from] SessionError),

    #[error("Resources remaining out of range: {0}")]
    InvalidResources(f64),

    #[error("Not a session message")]
    NotASessionMessage,
}

/// One player's live session and progress
pub struct PlayerSession {
    pub profile: PlayerProfile,
    pub store: SessionStore,
    /// Streak the player carried into the live case
    streak_at_start: u32,
}

impl PlayerSession {
    pub fn new(profile: PlayerProfile, mut store: SessionStore) -> Self {
        if store.progress().player.as_ref() != Some(&profile) {
            store.set_player(profile.clone());
        }
        Self {
            profile,
            store,
            streak_at_start: 0,
        }
    }

    /// Rename the player, keeping progress
    pub fn rename(&mut self, display_name: String) {
        if self.profile.display_name != display_name {
            self.profile.display_name = display_name;
            self.store.set_player(self.profile.clone());
        }
    }

    pub fn state_message(&self) -> ServerMessage {
        ServerMessage::SessionState {
            session: self.store.session().clone(),
            progress: self.store.progress().clone(),
        }
    }

    fn progress_message(&self) -> ServerMessage {
        ServerMessage::Progress {
            progress: self.store.progress().clone(),
        }
    }

    /// Apply a session message, returning the replies to send
    pub fn handle(
        &mut self,
        catalog: &Catalog,
        msg: ClientMessage,
    ) -> Result<Vec<ServerMessage>, HostError> {
        let replies = match msg {
            ClientMessage::GetState => vec![self.state_message()],
            ClientMessage::ListCatalog => vec![catalog_message(catalog)],

            ClientMessage::StartCase { case_id } => {
                let case = catalog
                    .case(&case_id)
                    .cloned()
                    .ok_or(HostError::UnknownCase(case_id))?;
                self.streak_at_start = self.store.progress().streak;
                let events = self.store.apply(SessionIntent::StartCase(Box::new(case)))?;
                vec![ServerMessage::Events { events }, self.state_message()]
            }
            ClientMessage::RevealClue { clue_id } => {
                self.apply(SessionIntent::RevealClue(clue_id))?
            }
            ClientMessage::SelectDiagnosis { diagnosis_id } => {
                self.apply(SessionIntent::SelectDiagnosis(diagnosis_id))?
            }
            ClientMessage::Tick { time_remaining } => {
                self.apply(SessionIntent::SetTimeRemaining(time_remaining))?
            }
            ClientMessage::SubmitDiagnosis => self.submit_diagnosis()?,

            ClientMessage::StartMission { mission_id } => {
                let mission = catalog
                    .mission(&mission_id)
                    .cloned()
                    .ok_or(HostError::UnknownMission(mission_id))?;
                let events = self
                    .store
                    .apply(SessionIntent::StartMission(Box::new(mission)))?;
                vec![ServerMessage::Events { events }, self.state_message()]
            }
            ClientMessage::ExecuteAction { action_id } => {
                self.apply(SessionIntent::ExecuteAction(action_id))?
            }
            ClientMessage::AdvanceTurn => self.apply(SessionIntent::AdvanceTurn)?,
            ClientMessage::CompleteMission {
                outcome,
                resources_remaining,
            } => self.complete_mission(outcome, resources_remaining)?,

            ClientMessage::ResetSession => self.apply(SessionIntent::Reset)?,

            ClientMessage::Resume { .. } | ClientMessage::Ping => {
                return Err(HostError::NotASessionMessage)
            }
        };
        Ok(replies)
    }

    fn apply(&mut self, intent: SessionIntent) -> Result<Vec<ServerMessage>, HostError> {
        let events = self.store.apply(intent)?;
        Ok(vec![ServerMessage::Events { events }])
    }

    /// Submit, then score with the timing and clue count the submission saw
    fn submit_diagnosis(&mut self) -> Result<Vec<ServerMessage>, HostError> {
        let (case, time_spent, clues_revealed) = match self.store.session().detective() {
            Some(d) => (d.case.clone(), d.time_spent(), d.revealed_clues.len()),
            None => {
                return Err(SessionError::InvalidState("no case in progress".into()).into())
            }
        };

        let mut events = self.store.apply(SessionIntent::SubmitDiagnosis)?;
        let correct = self.store.session().status == GameStatus::Completed;
        let breakdown = score_detective(
            &case,
            time_spent,
            clues_revealed,
            correct,
            self.streak_at_start,
        );
        if correct {
            events.extend(
                self.store
                    .apply(SessionIntent::RecordScore(breakdown.total_score))?,
            );
        }

        Ok(vec![
            ServerMessage::Events { events },
            ServerMessage::DiagnosisResult {
                correct,
                breakdown,
                outcome: case.outcome,
            },
            self.progress_message(),
        ])
    }

    fn complete_mission(
        &mut self,
        outcome: OutcomeClass,
        resources_remaining: Option<f64>,
    ) -> Result<Vec<ServerMessage>, HostError> {
        if let Some(value) = resources_remaining {
            if !value.is_finite() || value.abs() > MAX_RESOURCES_REMAINING {
                return Err(HostError::InvalidResources(value));
            }
        }
        let (turns_used, total_turns, remaining, message) = match self.store.session().command() {
            Some(c) => (
                c.turns_used(),
                c.mission.total_turns,
                resources_remaining.unwrap_or(c.resources.total() as f64),
                c.mission.outcome_for(outcome).map(|o| o.message.clone()),
            ),
            None => return Err(SessionError::InvalidState("no mission active".into()).into()),
        };

        let breakdown = score_command(turns_used, total_turns, outcome, remaining);
        let events = self
            .store
            .apply(SessionIntent::CompleteGame(breakdown.total_score))?;

        Ok(vec![
            ServerMessage::Events { events },
            ServerMessage::MissionCompleted { breakdown, message },
            self.progress_message(),
        ])
    }
}

/// Summaries of everything in the catalog
pub fn catalog_message(catalog: &Catalog) -> ServerMessage {
    ServerMessage::Catalog {
        cases: catalog
            .cases()
            .map(|c| CatalogEntry {
                id: c.id.clone(),
                title: c.title.clone(),
                difficulty: c.difficulty,
                era: Some(c.era.clone()),
            })
            .collect(),
        missions: catalog
            .missions()
            .map(|m| CatalogEntry {
                id: m.id.clone(),
                title: m.title.clone(),
                difficulty: m.difficulty,
                era: None,
            })
            .collect(),
    }
}
