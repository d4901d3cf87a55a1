//! Random draws for Command mode outcomes.
//!
//! The session store never calls an ambient random function; it owns a
//! [`RandomSource`] so tests and replays can fix the sequence of draws.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniform samples in `[0, 1)`
pub trait RandomSource {
    fn roll(&mut self) -> f64;
}

impl RandomSource for StdRng {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Build a seeded generator for deterministic sessions
pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Replays a fixed list of samples, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedRolls {
    samples: Vec<f64>,
    next: usize,
}

impl ScriptedRolls {
    /// Samples are clamped into `[0, 1)` and non-finite samples become 0;
    /// an empty script always yields 0
    pub fn new(samples: Vec<f64>) -> Self {
        let samples = samples
            .into_iter()
            .map(|s| {
                if s.is_finite() {
                    s.clamp(0.0, 1.0 - f64::EPSILON)
                } else {
                    0.0
                }
            })
            .collect();
        Self { samples, next: 0 }
    }

    /// How many samples have been drawn so far
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl RandomSource for ScriptedRolls {
    fn roll(&mut self) -> f64 {
        if self.samples.is_empty() {
            self.next += 1;
            return 0.0;
        }
        let value = self.samples[self.next % self.samples.len()];
        self.next += 1;
        value
    }
}
