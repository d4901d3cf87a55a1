//! Outbreak - an epidemiology detective and command game engine
//!
//! This crate provides the core game logic for Outbreak, including:
//! - Immutable case and mission content, and a catalog to look it up
//! - The session store: one live game session plus durable player progress
//! - The scoring engine: pure point breakdowns for finished attempts
//!
//! # Architecture
//!
//! The engine is platform-agnostic and performs no I/O of its own apart from
//! the progress store it is handed. It can be compiled to:
//! - Native Rust for the session host server
//! - WebAssembly for a browser front end
//!
//! # Modules
//!
//! - [`content`]: Cases, clues, missions, events and outcomes
//! - [`catalog`]: Validated content lookup by id
//! - [`resources`]: Command mode resources and partial deltas
//! - [`session`]: The session store state machine
//! - [`actions`]: Intents and the events they produce
//! - [`scoring`]: Detective and Command score breakdowns
//! - [`progress`]: Completed content, streak, badges and stats
//! - [`persistence`]: Save hook for durable progress
//! - [`rng`]: Injectable random source for outcome draws

pub mod actions;
pub mod catalog;
pub mod content;
pub mod persistence;
pub mod progress;
pub mod resources;
pub mod rng;
pub mod scoring;
pub mod session;
#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use actions::{SessionEvent, SessionIntent};
pub use catalog::Catalog;
pub use content::{
    ActionOutcome, Case, Clue, ClueType, ContentError, DiagnosisOption, Difficulty, Mission,
    MissionAction, MissionEvent, MissionOutcome, OutcomeClass,
};
pub use persistence::{JsonFileStore, MemoryStore, ProgressStore, StoreError};
pub use progress::{Badge, PlayerProfile, PlayerStats, Progress};
pub use resources::{ResourceDelta, ResourceKind, Resources};
pub use rng::{RandomSource, ScriptedRolls};
pub use scoring::{score_command, score_detective, ScoreBreakdown};
pub use session::{
    ActionRecord, ActionResult, CommandState, DetectiveState, GameSession, GameStatus, GameType,
    OutcomeKind, SessionConfig, SessionError, SessionMode, SessionStore,
};
