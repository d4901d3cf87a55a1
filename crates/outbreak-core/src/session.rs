//! Session state machine.
//!
//! This module contains `SessionStore`, which owns the one live game session
//! together with the player's durable progress, and enforces the legal
//! transitions of both game modes:
//!
//! - Detective: `not_started -> in_progress -> completed | failed`
//! - Command: `not_started -> in_progress -> completed`
//!
//! Every operation validates before it mutates, so a rejected call leaves the
//! store exactly as it was. Starting a new case or mission is always allowed
//! and discards whatever session was live.

use crate::actions::{SessionEvent, SessionIntent};
use crate::content::{Case, Mission};
use crate::persistence::ProgressStore;
use crate::progress::{PlayerProfile, Progress};
use crate::resources::Resources;
use crate::rng::RandomSource;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;
use tracing::{debug, warn};

/// Which mode the live session is in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Detective,
    Command,
    None,
}

/// Lifecycle of the live session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    NotStarted,
    InProgress,
    Completed,
    /// Detective only: the submitted diagnosis was wrong
    Failed,
}

/// Errors that can occur when applying intents
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum SessionError {
    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("Invalid action: {0}")]
    InvalidAction(String),

    #[error("Unknown clue: {0}")]
    InvalidClue(String),

    #[error("Unknown diagnosis: {0}")]
    InvalidDiagnosis(String),
}

/// Store behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SessionConfig {
    /// Reject clue and diagnosis ids the active case does not define.
    /// Off by default: unknown ids are accepted as given.
    pub validate_ids: bool,
}

/// Detective sub-state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectiveState {
    pub case: Case,
    pub revealed_clues: BTreeSet<String>,
    pub selected_diagnosis: Option<String>,
    /// Seconds left on the externally driven countdown
    pub time_remaining: u32,
    pub score: i64,
    /// Whether the score has been added to the player's stats
    #[serde(default)]
    pub scored: bool,
}

impl DetectiveState {
    fn new(case: Case) -> Self {
        Self {
            time_remaining: case.time_limit,
            case,
            revealed_clues: BTreeSet::new(),
            selected_diagnosis: None,
            score: 0,
            scored: false,
        }
    }

    /// Seconds elapsed since the case started
    pub fn time_spent(&self) -> u32 {
        self.case.time_limit.saturating_sub(self.time_remaining)
    }
}

/// Whether an action's draw went the player's way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Success,
    Failure,
}

/// One resolved action in a mission's history
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub turn: u32,
    pub action_id: String,
    pub result: OutcomeKind,
    pub message: String,
}

/// What `execute_action` reports back
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub success: bool,
    pub message: String,
}

/// Command sub-state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandState {
    pub mission: Mission,
    /// Starts at 1
    pub current_turn: u32,
    pub resources: Resources,
    pub action_history: Vec<ActionRecord>,
    pub score: i64,
    #[serde(default)]
    pub credited: bool,
}

impl CommandState {
    fn new(mission: Mission) -> Self {
        Self {
            current_turn: 1,
            resources: mission.initial_resources,
            mission,
            action_history: Vec::new(),
            score: 0,
            credited: false,
        }
    }

    /// Whether play has moved past the mission's last turn
    pub fn turns_exhausted(&self) -> bool {
        self.current_turn > self.mission.total_turns
    }

    /// Turns played so far, counting the current one
    pub fn turns_used(&self) -> u32 {
        self.current_turn.min(self.mission.total_turns)
    }
}

/// Mode-specific part of a session
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "gameType", content = "state", rename_all = "snake_case")]
pub enum SessionMode {
    #[default]
    None,
    Detective(DetectiveState),
    Command(CommandState),
}

/// The one live play-through
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    pub status: GameStatus,
    #[serde(flatten)]
    pub mode: SessionMode,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            status: GameStatus::NotStarted,
            mode: SessionMode::None,
        }
    }
}

impl GameSession {
    pub fn game_type(&self) -> GameType {
        match self.mode {
            SessionMode::None => GameType::None,
            SessionMode::Detective(_) => GameType::Detective,
            SessionMode::Command(_) => GameType::Command,
        }
    }

    pub fn is_in_progress(&self) -> bool {
        self.status == GameStatus::InProgress
    }

    pub fn detective(&self) -> Option<&DetectiveState> {
        match &self.mode {
            SessionMode::Detective(d) => Some(d),
            _ => None,
        }
    }

    pub fn command(&self) -> Option<&CommandState> {
        match &self.mode {
            SessionMode::Command(c) => Some(c),
            _ => None,
        }
    }

    /// Score recorded for the session, whichever the mode
    pub fn score(&self) -> i64 {
        match &self.mode {
            SessionMode::None => 0,
            SessionMode::Detective(d) => d.score,
            SessionMode::Command(c) => c.score,
        }
    }
}

/// The detective state, if a case is in progress
fn active_detective(session: &mut GameSession) -> Result<&mut DetectiveState, SessionError> {
    if session.status != GameStatus::InProgress {
        return Err(SessionError::InvalidState("no case in progress".into()));
    }
    match &mut session.mode {
        SessionMode::Detective(d) => Ok(d),
        _ => Err(SessionError::InvalidState("no case in progress".into())),
    }
}

/// The command state, if a mission is in progress
fn active_command(session: &mut GameSession) -> Result<&mut CommandState, SessionError> {
    if session.status != GameStatus::InProgress {
        return Err(SessionError::InvalidState("no mission in progress".into()));
    }
    match &mut session.mode {
        SessionMode::Command(c) => Ok(c),
        _ => Err(SessionError::InvalidState("no mission in progress".into())),
    }
}

/// Owns the live session, the player's progress and the random source
pub struct SessionStore<R = StdRng> {
    session: GameSession,
    progress: Progress,
    rng: R,
    store: Option<Box<dyn ProgressStore>>,
    config: SessionConfig,
}

impl SessionStore<StdRng> {
    /// A store with fresh progress and an OS-seeded generator
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    /// A store whose outcome draws replay from `seed`
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Restore progress from `store` with an OS-seeded generator
    pub fn open(store: Box<dyn ProgressStore>) -> Self {
        Self::restore(store, StdRng::from_entropy())
    }
}

impl<R: RandomSource> SessionStore<R> {
    pub fn new(rng: R) -> Self {
        Self::with_progress(Progress::default(), rng)
    }

    pub fn with_progress(progress: Progress, rng: R) -> Self {
        Self {
            session: GameSession::default(),
            progress,
            rng,
            store: None,
            config: SessionConfig::default(),
        }
    }

    /// Initialize from the last persisted progress, or defaults if there is none.
    ///
    /// A store that fails to load is logged and treated as empty.
    pub fn restore(store: Box<dyn ProgressStore>, rng: R) -> Self {
        let progress = match store.load() {
            Ok(Some(progress)) => progress,
            Ok(None) => Progress::default(),
            Err(e) => {
                warn!("Could not load saved progress, starting fresh: {}", e);
                Progress::default()
            }
        };
        let mut session = Self::with_progress(progress, rng);
        session.store = Some(store);
        session
    }

    /// Attach a save hook
    pub fn with_store(mut self, store: Box<dyn ProgressStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Set the player identity that progress belongs to
    pub fn set_player(&mut self, player: PlayerProfile) {
        self.progress.player = Some(player);
        self.persist();
    }

    /// Abandon the live session without touching progress
    pub fn reset(&mut self) {
        self.session = GameSession::default();
        debug!("Session reset");
    }

    // ==================== Detective ====================

    /// Begin a case, discarding any live session
    pub fn start_case(&mut self, case: Case) {
        debug!(case = %case.id, "Starting case");
        self.session = GameSession {
            status: GameStatus::InProgress,
            mode: SessionMode::Detective(DetectiveState::new(case)),
        };
    }

    /// Reveal a clue. Revealing it again is a no-op.
    ///
    /// Returns whether the clue was newly revealed.
    pub fn reveal_clue(&mut self, clue_id: &str) -> Result<bool, SessionError> {
        let validate = self.config.validate_ids;
        let detective = active_detective(&mut self.session)?;
        if validate && !detective.case.has_clue(clue_id) {
            return Err(SessionError::InvalidClue(clue_id.to_string()));
        }
        let newly = detective.revealed_clues.insert(clue_id.to_string());
        debug!(clue = clue_id, newly, "Clue revealed");
        Ok(newly)
    }

    /// Select a diagnosis, replacing any earlier selection
    pub fn select_diagnosis(&mut self, diagnosis_id: &str) -> Result<(), SessionError> {
        let validate = self.config.validate_ids;
        let detective = active_detective(&mut self.session)?;
        if validate && !detective.case.has_diagnosis(diagnosis_id) {
            return Err(SessionError::InvalidDiagnosis(diagnosis_id.to_string()));
        }
        detective.selected_diagnosis = Some(diagnosis_id.to_string());
        Ok(())
    }

    /// Submit the selected diagnosis. Returns whether it was correct.
    ///
    /// A correct answer completes the case, extends the streak and credits the
    /// case; a wrong one fails the case and resets the streak. Scoring is left
    /// to the caller.
    pub fn submit_diagnosis(&mut self) -> Result<bool, SessionError> {
        let detective = active_detective(&mut self.session)?;
        let selected = detective
            .selected_diagnosis
            .as_deref()
            .ok_or_else(|| SessionError::InvalidState("no diagnosis selected".into()))?;
        let correct = selected == detective.case.correct_diagnosis;
        let case_id = detective.case.id.clone();

        if correct {
            self.session.status = GameStatus::Completed;
            let badges = self.progress.record_correct_diagnosis(&case_id);
            debug!(case = %case_id, streak = self.progress.streak, ?badges, "Correct diagnosis");
        } else {
            self.session.status = GameStatus::Failed;
            self.progress.record_incorrect_diagnosis();
            debug!(case = %case_id, "Incorrect diagnosis");
        }

        self.persist();
        Ok(correct)
    }

    /// Update the countdown. Reaching zero does not end the case.
    pub fn set_time_remaining(&mut self, seconds: u32) -> Result<(), SessionError> {
        let detective = active_detective(&mut self.session)?;
        detective.time_remaining = seconds;
        Ok(())
    }

    /// Seconds spent on the current case, if one is loaded
    pub fn time_spent(&self) -> Option<u32> {
        self.session.detective().map(DetectiveState::time_spent)
    }

    /// Record the scored total of a completed case and add it to the player's stats.
    ///
    /// A case can be scored once.
    pub fn record_score(&mut self, points: i64) -> Result<(), SessionError> {
        let status = self.session.status;
        let detective = match &mut self.session.mode {
            SessionMode::Detective(d) if status == GameStatus::Completed => d,
            _ => {
                return Err(SessionError::InvalidState(
                    "only a solved case can be scored".into(),
                ))
            }
        };
        if detective.scored {
            return Err(SessionError::InvalidState("case already scored".into()));
        }
        detective.score = points;
        detective.scored = true;
        self.progress.add_score(points);
        self.persist();
        Ok(())
    }

    // ==================== Command ====================

    /// Begin a mission, discarding any live session
    pub fn start_mission(&mut self, mission: Mission) {
        debug!(mission = %mission.id, "Starting mission");
        self.session = GameSession {
            status: GameStatus::InProgress,
            mode: SessionMode::Command(CommandState::new(mission)),
        };
    }

    /// Resolve one of the current turn's actions.
    ///
    /// The cost is paid unconditionally, then a single draw against the
    /// success probability picks which outcome's effect is applied.
    pub fn execute_action(&mut self, action_id: &str) -> Result<ActionResult, SessionError> {
        let command = active_command(&mut self.session)?;
        let turn = command.current_turn;
        let action = command
            .mission
            .event_for_turn(turn)
            .ok_or_else(|| SessionError::InvalidAction(format!("no event on turn {}", turn)))?
            .action(action_id)
            .ok_or_else(|| SessionError::InvalidAction(action_id.to_string()))?
            .clone();

        command.resources.pay(&action.cost);

        let success = self.rng.roll() < action.success.probability;
        let outcome = if success {
            &action.success
        } else {
            &action.failure
        };
        command.resources.apply(&outcome.effect);

        let result = if success {
            OutcomeKind::Success
        } else {
            OutcomeKind::Failure
        };
        command.action_history.push(ActionRecord {
            turn,
            action_id: action.id.clone(),
            result,
            message: outcome.message.clone(),
        });

        debug!(turn, action = action_id, ?result, resources = ?command.resources, "Action resolved");

        Ok(ActionResult {
            success,
            message: outcome.message.clone(),
        })
    }

    /// Move to the next turn. Returns the new turn number.
    ///
    /// Mission outcomes are not evaluated here; the caller decides when to
    /// call [`complete_game`](Self::complete_game).
    pub fn advance_turn(&mut self) -> Result<u32, SessionError> {
        let command = active_command(&mut self.session)?;
        command.current_turn += 1;
        debug!(turn = command.current_turn, "Turn advanced");
        Ok(command.current_turn)
    }

    /// Whether the live mission has run past its last turn
    pub fn turns_exhausted(&self) -> bool {
        self.session
            .command()
            .map(CommandState::turns_exhausted)
            .unwrap_or(false)
    }

    /// Finish the live mission with a final score.
    ///
    /// The mission id is credited with set semantics, and the score is added to
    /// the player's stats once per play-through, so repeating the call does not
    /// grant duplicate credit.
    pub fn complete_game(&mut self, final_score: i64) -> Result<(), SessionError> {
        let command = match &mut self.session.mode {
            SessionMode::Command(c) => c,
            _ => return Err(SessionError::InvalidState("no mission active".into())),
        };
        command.score = final_score;
        let first_credit = !command.credited;
        command.credited = true;
        let mission_id = command.mission.id.clone();

        self.session.status = GameStatus::Completed;
        let badges = self.progress.record_mission(&mission_id);
        if first_credit {
            self.progress.add_score(final_score);
        }
        debug!(mission = %mission_id, final_score, ?badges, "Mission completed");

        self.persist();
        Ok(())
    }

    // ==================== Intents ====================

    /// Apply a UI intent, returning the events it produced
    pub fn apply(&mut self, intent: SessionIntent) -> Result<Vec<SessionEvent>, SessionError> {
        let badges_before = self.progress.badges.clone();
        let mut events = Vec::new();

        match intent {
            SessionIntent::StartCase(case) => {
                let case_id = case.id.clone();
                let time_limit = case.time_limit;
                self.start_case(*case);
                events.push(SessionEvent::CaseStarted {
                    case_id,
                    time_limit,
                });
            }
            SessionIntent::RevealClue(clue_id) => {
                let newly_revealed = self.reveal_clue(&clue_id)?;
                events.push(SessionEvent::ClueRevealed {
                    clue_id,
                    newly_revealed,
                });
            }
            SessionIntent::SelectDiagnosis(diagnosis_id) => {
                self.select_diagnosis(&diagnosis_id)?;
                events.push(SessionEvent::DiagnosisSelected { diagnosis_id });
            }
            SessionIntent::SubmitDiagnosis => {
                let correct = self.submit_diagnosis()?;
                let case_id = self
                    .session
                    .detective()
                    .map(|d| d.case.id.clone())
                    .unwrap_or_default();
                events.push(SessionEvent::DiagnosisSubmitted {
                    case_id,
                    correct,
                    streak: self.progress.streak,
                });
            }
            SessionIntent::SetTimeRemaining(seconds) => {
                self.set_time_remaining(seconds)?;
                events.push(SessionEvent::TimeUpdated {
                    time_remaining: seconds,
                });
            }
            SessionIntent::RecordScore(points) => {
                self.record_score(points)?;
                events.push(SessionEvent::ScoreRecorded {
                    score: points,
                    total_score: self.progress.stats.total_score,
                });
            }
            SessionIntent::StartMission(mission) => {
                let mission_id = mission.id.clone();
                let resources = mission.initial_resources;
                self.start_mission(*mission);
                events.push(SessionEvent::MissionStarted {
                    mission_id,
                    resources,
                });
            }
            SessionIntent::ExecuteAction(action_id) => {
                let turn = self.session.command().map(|c| c.current_turn).unwrap_or(0);
                let result = self.execute_action(&action_id)?;
                let resources = self
                    .session
                    .command()
                    .map(|c| c.resources)
                    .unwrap_or_default();
                events.push(SessionEvent::ActionResolved {
                    turn,
                    action_id,
                    success: result.success,
                    message: result.message,
                    resources,
                });
            }
            SessionIntent::AdvanceTurn => {
                let turn = self.advance_turn()?;
                events.push(SessionEvent::TurnAdvanced {
                    turn,
                    turns_exhausted: self.turns_exhausted(),
                });
            }
            SessionIntent::CompleteGame(final_score) => {
                self.complete_game(final_score)?;
                let mission_id = self
                    .session
                    .command()
                    .map(|c| c.mission.id.clone())
                    .unwrap_or_default();
                events.push(SessionEvent::MissionCompleted {
                    mission_id,
                    score: final_score,
                });
            }
            SessionIntent::Reset => {
                self.reset();
                events.push(SessionEvent::SessionReset);
            }
        }

        let earned: Vec<_> = self.progress.badges.difference(&badges_before).copied().collect();
        if !earned.is_empty() {
            events.push(SessionEvent::BadgesEarned { badges: earned });
        }

        Ok(events)
    }

    /// Hand the current progress to the save hook, if any
    fn persist(&self) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(&self.progress) {
                warn!("Failed to persist progress: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{fixtures, Difficulty};
    use crate::persistence::MemoryStore;
    use crate::rng::ScriptedRolls;
    use pretty_assertions::assert_eq;

    fn detective_store() -> SessionStore<ScriptedRolls> {
        let mut store = SessionStore::new(ScriptedRolls::new(vec![0.5]));
        store.start_case(fixtures::case(Difficulty::Hard));
        store
    }

    fn command_store(rolls: Vec<f64>) -> SessionStore<ScriptedRolls> {
        let mut store = SessionStore::new(ScriptedRolls::new(rolls));
        store.start_mission(fixtures::mission());
        store
    }

    #[test]
    fn test_new_store_has_no_session() {
        let store = SessionStore::seeded(1);
        assert_eq!(store.session().game_type(), GameType::None);
        assert_eq!(store.session().status, GameStatus::NotStarted);
    }

    #[test]
    fn test_start_case_initializes_detective_state() {
        let store = detective_store();
        let session = store.session();
        assert_eq!(session.game_type(), GameType::Detective);
        assert_eq!(session.status, GameStatus::InProgress);
        let detective = session.detective().unwrap();
        assert!(detective.revealed_clues.is_empty());
        assert_eq!(detective.selected_diagnosis, None);
        assert_eq!(detective.time_remaining, 120);
        assert_eq!(detective.score, 0);
    }

    #[test]
    fn test_start_case_resets_terminal_sessions() {
        let mut store = detective_store();
        store.select_diagnosis("miasma").unwrap();
        store.submit_diagnosis().unwrap();
        assert_eq!(store.session().status, GameStatus::Failed);

        store.start_case(fixtures::case(Difficulty::Easy));
        assert_eq!(store.session().status, GameStatus::InProgress);
        assert_eq!(store.session().score(), 0);

        store.select_diagnosis("cholera").unwrap();
        store.submit_diagnosis().unwrap();
        store.record_score(100).unwrap();
        assert_eq!(store.session().status, GameStatus::Completed);

        store.start_case(fixtures::case(Difficulty::Easy));
        assert_eq!(store.session().status, GameStatus::InProgress);
        assert_eq!(store.session().score(), 0);
    }

    #[test]
    fn test_reveal_clue_is_idempotent() {
        let mut store = detective_store();
        assert!(store.reveal_clue("c1").unwrap());
        assert!(!store.reveal_clue("c1").unwrap());
        assert_eq!(store.session().detective().unwrap().revealed_clues.len(), 1);
    }

    #[test]
    fn test_unknown_ids_accepted_by_default() {
        let mut store = detective_store();
        assert!(store.reveal_clue("not-a-clue").is_ok());
        assert!(store.select_diagnosis("not-a-diagnosis").is_ok());
    }

    #[test]
    fn test_unknown_ids_rejected_when_validating() {
        let mut store = SessionStore::seeded(1).with_config(SessionConfig { validate_ids: true });
        store.start_case(fixtures::case(Difficulty::Hard));
        assert_eq!(
            store.reveal_clue("nope"),
            Err(SessionError::InvalidClue("nope".into()))
        );
        assert_eq!(
            store.select_diagnosis("nope"),
            Err(SessionError::InvalidDiagnosis("nope".into()))
        );
        let detective = store.session().detective().unwrap();
        assert!(detective.revealed_clues.is_empty());
        assert_eq!(detective.selected_diagnosis, None);
        assert!(store.reveal_clue("c2").unwrap());
    }

    #[test]
    fn test_select_diagnosis_overwrites() {
        let mut store = detective_store();
        store.select_diagnosis("miasma").unwrap();
        store.select_diagnosis("cholera").unwrap();
        assert_eq!(
            store.session().detective().unwrap().selected_diagnosis.as_deref(),
            Some("cholera")
        );
    }

    #[test]
    fn test_submit_without_selection_is_invalid_state() {
        let mut store = detective_store();
        let before = store.session().clone();
        assert!(matches!(
            store.submit_diagnosis(),
            Err(SessionError::InvalidState(_))
        ));
        assert_eq!(store.session(), &before);
        assert_eq!(store.progress(), &Progress::default());
    }

    #[test]
    fn test_operations_without_session_are_invalid_state() {
        let mut store = SessionStore::seeded(1);
        assert!(matches!(store.reveal_clue("c1"), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.select_diagnosis("x"), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.submit_diagnosis(), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.set_time_remaining(3), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.execute_action("a"), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.advance_turn(), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.complete_game(10), Err(SessionError::InvalidState(_))));
    }

    #[test]
    fn test_correct_submission_completes_and_credits() {
        let mut store = detective_store();
        store.select_diagnosis("cholera").unwrap();
        assert!(store.submit_diagnosis().unwrap());
        assert_eq!(store.session().status, GameStatus::Completed);
        assert_eq!(store.progress().streak, 1);
        assert!(store.progress().has_completed_case("broad-street"));
    }

    #[test]
    fn test_terminal_case_rejects_further_play() {
        let mut store = detective_store();
        store.select_diagnosis("cholera").unwrap();
        store.submit_diagnosis().unwrap();
        assert!(matches!(store.reveal_clue("c1"), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.submit_diagnosis(), Err(SessionError::InvalidState(_))));
        assert_eq!(store.progress().streak, 1);
    }

    #[test]
    fn test_resubmitting_solved_case_does_not_duplicate() {
        let mut store = detective_store();
        for _ in 0..2 {
            store.start_case(fixtures::case(Difficulty::Hard));
            store.select_diagnosis("cholera").unwrap();
            store.submit_diagnosis().unwrap();
        }
        assert_eq!(store.progress().completed_cases.len(), 1);
        assert_eq!(store.progress().streak, 2);
    }

    #[test]
    fn test_incorrect_submission_resets_streak() {
        let mut progress = Progress::default();
        progress.streak = 7;
        let mut store = SessionStore::with_progress(progress, ScriptedRolls::new(vec![]));
        store.start_case(fixtures::case(Difficulty::Medium));
        store.select_diagnosis("miasma").unwrap();

        assert!(!store.submit_diagnosis().unwrap());
        assert_eq!(store.session().status, GameStatus::Failed);
        assert_eq!(store.progress().streak, 0);
        assert!(!store.progress().has_completed_case("broad-street"));
    }

    #[test]
    fn test_timer_setter_does_not_fail_case() {
        let mut store = detective_store();
        store.set_time_remaining(30).unwrap();
        assert_eq!(store.time_spent(), Some(90));
        store.set_time_remaining(0).unwrap();
        assert_eq!(store.session().status, GameStatus::InProgress);
    }

    #[test]
    fn test_record_score_only_once_after_solving() {
        let mut store = detective_store();
        assert!(store.record_score(10).is_err());
        store.select_diagnosis("cholera").unwrap();
        store.submit_diagnosis().unwrap();
        store.record_score(270).unwrap();
        assert!(store.record_score(270).is_err());
        assert_eq!(store.session().score(), 270);
        assert_eq!(store.progress().stats.total_score, 270);
    }

    #[test]
    fn test_start_mission_initializes_command_state() {
        let store = command_store(vec![0.5]);
        let command = store.session().command().unwrap();
        assert_eq!(store.session().game_type(), GameType::Command);
        assert_eq!(store.session().status, GameStatus::InProgress);
        assert_eq!(command.current_turn, 1);
        assert_eq!(command.resources, Resources::new(100, 10, 50, 30));
        assert!(command.action_history.is_empty());
        assert_eq!(command.score, 0);
    }

    #[test]
    fn test_execute_action_pays_cost_and_applies_success() {
        let mut store = command_store(vec![0.99]);
        let result = store.execute_action("vaccinate").unwrap();
        assert_eq!(
            result,
            ActionResult {
                success: true,
                message: "Uptake is strong".into()
            }
        );
        let command = store.session().command().unwrap();
        assert_eq!(command.resources, Resources::new(60, 7, 60, 30));
        assert_eq!(
            command.action_history,
            vec![ActionRecord {
                turn: 1,
                action_id: "vaccinate".into(),
                result: OutcomeKind::Success,
                message: "Uptake is strong".into(),
            }]
        );
    }

    #[test]
    fn test_zero_probability_always_fails() {
        let mut store = command_store(vec![0.0]);
        let result = store.execute_action("ignore").unwrap();
        assert!(!result.success);
        let command = store.session().command().unwrap();
        assert_eq!(command.resources, Resources::new(100, 10, 20, 25));
    }

    #[test]
    fn test_draw_strictly_below_probability_succeeds() {
        let mut store = SessionStore::new(ScriptedRolls::new(vec![0.5, 0.49]));
        let mut mission = fixtures::mission();
        mission.events[0].turn = 3;
        mission.events[1].turn = 1;
        store.start_mission(mission);

        // briefing: success probability 0.5
        assert!(!store.execute_action("briefing").unwrap().success);
        assert!(store.execute_action("briefing").unwrap().success);
    }

    #[test]
    fn test_cost_can_drive_resources_negative() {
        let mut store = command_store(vec![0.0]);
        store.advance_turn().unwrap();
        store.execute_action("briefing").unwrap();
        let command = store.session().command().unwrap();
        assert_eq!(command.resources.budget, -400);
        assert_eq!(store.session().status, GameStatus::InProgress);
    }

    #[test]
    fn test_unknown_action_is_rejected_without_mutation() {
        let mut store = command_store(vec![0.0]);
        let before = store.session().clone();
        assert!(matches!(
            store.execute_action("briefing"),
            Err(SessionError::InvalidAction(_))
        ));
        assert_eq!(store.session(), &before);
    }

    #[test]
    fn test_turn_without_event_is_invalid_action() {
        let mut store = command_store(vec![0.0]);
        store.advance_turn().unwrap();
        store.advance_turn().unwrap();
        assert!(matches!(
            store.execute_action("vaccinate"),
            Err(SessionError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_advance_turn_does_not_complete_mission() {
        let mut store = command_store(vec![0.0]);
        for expected in 2..=6 {
            assert_eq!(store.advance_turn().unwrap(), expected);
        }
        assert!(store.turns_exhausted());
        assert_eq!(store.session().status, GameStatus::InProgress);
    }

    #[test]
    fn test_complete_game_twice_credits_once() {
        let mut store = command_store(vec![0.0]);
        store.complete_game(1250).unwrap();
        store.complete_game(1250).unwrap();
        assert_eq!(store.session().status, GameStatus::Completed);
        assert_eq!(store.progress().completed_missions.len(), 1);
        assert_eq!(store.progress().stats.total_score, 1250);
        assert_eq!(store.session().score(), 1250);
    }

    #[test]
    fn test_completed_mission_rejects_actions() {
        let mut store = command_store(vec![0.0]);
        store.complete_game(0).unwrap();
        assert!(matches!(store.execute_action("vaccinate"), Err(SessionError::InvalidState(_))));
        assert!(matches!(store.advance_turn(), Err(SessionError::InvalidState(_))));
    }

    #[test]
    fn test_command_outcomes_do_not_touch_streak() {
        let mut progress = Progress::default();
        progress.streak = 3;
        let mut store = SessionStore::with_progress(progress, ScriptedRolls::new(vec![0.0]));
        store.start_mission(fixtures::mission());
        store.execute_action("ignore").unwrap();
        store.complete_game(0).unwrap();
        assert_eq!(store.progress().streak, 3);
    }

    #[test]
    fn test_progress_saved_on_every_progress_change() {
        let saves = MemoryStore::new();
        let mut store = SessionStore::new(ScriptedRolls::new(vec![0.0]))
            .with_store(Box::new(saves.clone()));

        store.start_case(fixtures::case(Difficulty::Easy));
        store.reveal_clue("c1").unwrap();
        assert_eq!(saves.save_count(), 0);

        store.select_diagnosis("miasma").unwrap();
        store.submit_diagnosis().unwrap();
        assert_eq!(saves.save_count(), 1);

        store.start_mission(fixtures::mission());
        store.complete_game(500).unwrap();
        assert_eq!(saves.save_count(), 2);
        assert_eq!(saves.latest().as_ref(), Some(store.progress()));
    }

    #[test]
    fn test_restore_loads_saved_progress() {
        let mut progress = Progress::default();
        progress.streak = 2;
        progress.completed_cases.insert("old".into());
        let saves = MemoryStore::with_progress(progress.clone());

        let store = SessionStore::restore(Box::new(saves), ScriptedRolls::new(vec![]));
        assert_eq!(store.progress(), &progress);
        assert_eq!(store.session().game_type(), GameType::None);
    }

    #[test]
    fn test_apply_reports_badges() {
        let mut store = detective_store();
        store
            .apply(SessionIntent::SelectDiagnosis("cholera".into()))
            .unwrap();
        let events = store.apply(SessionIntent::SubmitDiagnosis).unwrap();
        assert_eq!(
            events,
            vec![
                SessionEvent::DiagnosisSubmitted {
                    case_id: "broad-street".into(),
                    correct: true,
                    streak: 1,
                },
                SessionEvent::BadgesEarned {
                    badges: vec![crate::progress::Badge::FirstDiagnosis],
                },
            ]
        );
    }

    #[test]
    fn test_reset_keeps_progress() {
        let mut store = detective_store();
        store.select_diagnosis("cholera").unwrap();
        store.submit_diagnosis().unwrap();
        store.apply(SessionIntent::Reset).unwrap();
        assert_eq!(store.session(), &GameSession::default());
        assert_eq!(store.progress().streak, 1);
    }

    #[test]
    fn test_session_serializes_with_game_type_tag() {
        let store = detective_store();
        let json = serde_json::to_value(store.session()).unwrap();
        assert_eq!(json["status"], "in_progress");
        assert_eq!(json["gameType"], "detective");
        assert_eq!(json["state"]["timeRemaining"], 120);
    }
}
