//! WebAssembly bindings for the Outbreak session engine.
//!
//! This module exposes a single player's session to JavaScript through
//! wasm-bindgen. The browser owns persistence: after a submission or a
//! completed mission it reads `getProgress` and stores the result.

#[cfg(feature = "wasm")]
use wasm_bindgen::prelude::*;

#[cfg(feature = "wasm")]
use crate::actions::SessionIntent;
#[cfg(feature = "wasm")]
use crate::catalog::Catalog;
#[cfg(feature = "wasm")]
use crate::content::OutcomeClass;
#[cfg(feature = "wasm")]
use crate::progress::Progress;
#[cfg(feature = "wasm")]
use crate::scoring::{score_command, score_detective};
#[cfg(feature = "wasm")]
use crate::session::SessionStore;
#[cfg(feature = "wasm")]
use rand::{rngs::StdRng, SeedableRng};

/// Initialize panic hook for better error messages in browser console
#[cfg(feature = "wasm")]
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// WASM-exposed session wrapper
#[cfg(feature = "wasm")]
#[wasm_bindgen]
pub struct WasmSession {
    store: SessionStore,
    catalog: Catalog,
}

#[cfg(feature = "wasm")]
#[wasm_bindgen]
impl WasmSession {
    /// Create a session from previously saved progress JSON (or an empty string)
    #[wasm_bindgen(constructor)]
    pub fn new(progress_json: &str) -> Result<WasmSession, JsValue> {
        let progress: Progress = if progress_json.trim().is_empty() {
            Progress::default()
        } else {
            serde_json::from_str(progress_json)
                .map_err(|e| JsValue::from_str(&format!("Invalid progress: {}", e)))?
        };
        let catalog = Catalog::builtin()
            .map_err(|e| JsValue::from_str(&format!("Invalid catalog: {}", e)))?;

        let store = SessionStore::with_progress(progress, StdRng::from_entropy());
        Ok(WasmSession { store, catalog })
    }

    /// Get the live session as JSON
    #[wasm_bindgen(js_name = getSession)]
    pub fn get_session(&self) -> String {
        serde_json::to_string(self.store.session()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get durable progress as JSON, ready to persist
    #[wasm_bindgen(js_name = getProgress)]
    pub fn get_progress(&self) -> String {
        serde_json::to_string(self.store.progress()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Start a catalog case by id
    #[wasm_bindgen(js_name = startCase)]
    pub fn start_case(&mut self, case_id: &str) -> Result<String, JsValue> {
        let case = self
            .catalog
            .case(case_id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("Unknown case: {}", case_id)))?;
        self.apply(SessionIntent::StartCase(Box::new(case)))
    }

    /// Start a catalog mission by id
    #[wasm_bindgen(js_name = startMission)]
    pub fn start_mission(&mut self, mission_id: &str) -> Result<String, JsValue> {
        let mission = self
            .catalog
            .mission(mission_id)
            .cloned()
            .ok_or_else(|| JsValue::from_str(&format!("Unknown mission: {}", mission_id)))?;
        self.apply(SessionIntent::StartMission(Box::new(mission)))
    }

    /// Apply an intent from JSON, returns events JSON or error
    #[wasm_bindgen(js_name = applyIntent)]
    pub fn apply_intent(&mut self, intent_json: &str) -> Result<String, JsValue> {
        let intent: SessionIntent = serde_json::from_str(intent_json)
            .map_err(|e| JsValue::from_str(&format!("Invalid intent JSON: {}", e)))?;
        self.apply(intent)
    }

    /// Score the live case with the session's own timing, clue and streak values
    #[wasm_bindgen(js_name = scoreCase)]
    pub fn score_case(&self, streak_before: u32) -> String {
        let breakdown = self.store.session().detective().map(|d| {
            let correct = d.selected_diagnosis.as_deref() == Some(d.case.correct_diagnosis.as_str());
            score_detective(
                &d.case,
                d.time_spent(),
                d.revealed_clues.len(),
                correct,
                streak_before,
            )
        });
        serde_json::to_string(&breakdown).unwrap_or_else(|_| "null".to_string())
    }

    /// Score the live mission for a result class chosen by the front end
    #[wasm_bindgen(js_name = scoreMission)]
    pub fn score_mission(&self, outcome: &str, resources_remaining: f64) -> Result<String, JsValue> {
        let outcome: OutcomeClass = serde_json::from_value(serde_json::Value::from(outcome))
            .map_err(|e| JsValue::from_str(&format!("Invalid outcome: {}", e)))?;
        if !resources_remaining.is_finite() {
            return Err(JsValue::from_str("Resources remaining must be finite"));
        }
        let breakdown = self.store.session().command().map(|c| {
            score_command(c.turns_used(), c.mission.total_turns, outcome, resources_remaining)
        });
        Ok(serde_json::to_string(&breakdown).unwrap_or_else(|_| "null".to_string()))
    }
}

#[cfg(feature = "wasm")]
impl WasmSession {
    fn apply(&mut self, intent: SessionIntent) -> Result<String, JsValue> {
        match self.store.apply(intent) {
            Ok(events) => Ok(serde_json::to_string(&events).unwrap_or_else(|_| "[]".to_string())),
            Err(e) => Err(JsValue::from_str(&format!("Intent failed: {}", e))),
        }
    }
}
