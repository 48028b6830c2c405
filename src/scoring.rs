//! Trial records and the scoring sink
//!
//! Every checked round produces one `TrialRecord`. Where records go (an
//! analytics endpoint, a streak counter) is behind `ScoreSink`; `TrialLog`
//! keeps them in memory.

use serde::{Deserialize, Serialize};

use crate::sim::RoundVerdict;

/// Maximum number of records `TrialLog` keeps
pub const MAX_TRIALS: usize = 200;

/// One checked round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialRecord {
    /// Round generation
    pub round: u64,
    /// Prompt as shown to the learner
    pub question: String,
    pub correct: bool,
    /// Committed count per container, in container order
    pub response: Vec<usize>,
    pub expected_per_container: usize,
}

/// Fire-and-forget verdict consumer
pub trait ScoreSink {
    fn record(&mut self, verdict: &RoundVerdict, trial: TrialRecord);
}

/// In-memory trial history, oldest first
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrialLog {
    pub entries: Vec<TrialRecord>,
    /// Current run of correct answers
    pub streak: u32,
    pub best_streak: u32,
}

impl TrialLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn correct_count(&self) -> usize {
        self.entries.iter().filter(|t| t.correct).count()
    }

    /// Fraction of correct trials, `None` before the first one
    pub fn accuracy(&self) -> Option<f32> {
        if self.entries.is_empty() {
            return None;
        }
        Some(self.correct_count() as f32 / self.entries.len() as f32)
    }

    pub fn last(&self) -> Option<&TrialRecord> {
        self.entries.last()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl ScoreSink for TrialLog {
    fn record(&mut self, verdict: &RoundVerdict, trial: TrialRecord) {
        if verdict.is_correct() {
            self.streak += 1;
            self.best_streak = self.best_streak.max(self.streak);
        } else {
            self.streak = 0;
        }
        log::info!(
            "Trial {}: {} (streak {}, response {:?})",
            trial.round,
            if trial.correct { "correct" } else { "incorrect" },
            self.streak,
            trial.response
        );
        self.entries.push(trial);

        // Drop the oldest beyond the cap
        if self.entries.len() > MAX_TRIALS {
            let excess = self.entries.len() - MAX_TRIALS;
            self.entries.drain(..excess);
        }
    }
}
