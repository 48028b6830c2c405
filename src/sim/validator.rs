//! End-of-round verdict
//!
//! Runs only on an explicit check. Compares each container's committed count
//! to the expected share, and refuses to produce a verdict at all if the
//! item count is not conserved.

use serde::{Deserialize, Serialize};

use super::container::ContainerId;
use super::state::{AnnounceKind, GameEvent, RoundState};
use crate::error::{CheckError, IntegrityError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}

impl Verdict {
    pub fn from_bool(correct: bool) -> Self {
        if correct { Self::Correct } else { Self::Incorrect }
    }

    pub fn is_correct(self) -> bool {
        self == Self::Correct
    }
}

/// One container's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerVerdict {
    pub container: ContainerId,
    pub assigned: usize,
    pub expected: usize,
    pub verdict: Verdict,
}

/// Per-container results plus the aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundVerdict {
    pub containers: Vec<ContainerVerdict>,
    pub aggregate: Verdict,
}

impl RoundVerdict {
    pub fn is_correct(&self) -> bool {
        self.aggregate.is_correct()
    }

    pub fn incorrect_containers(&self) -> Vec<ContainerId> {
        self.containers
            .iter()
            .filter(|c| !c.verdict.is_correct())
            .map(|c| c.container)
            .collect()
    }

    /// The learner's answer as counts in container order
    pub fn response(&self) -> Vec<usize> {
        self.containers.iter().map(|c| c.assigned).collect()
    }
}

/// `free + placed` must equal the round's item count
pub fn check_conservation(free: usize, placed: usize, expected: usize) -> Result<(), IntegrityError> {
    if free + placed != expected {
        return Err(IntegrityError::ConservationViolated {
            free,
            placed,
            expected,
        });
    }
    Ok(())
}

/// Judge a final distribution.
///
/// `counts` is the committed count per container; `free` is the number of
/// items still in the pile.
pub fn validate(
    counts: &[(ContainerId, usize)],
    expected_per_container: usize,
    free: usize,
    item_count: usize,
) -> Result<RoundVerdict, IntegrityError> {
    let placed = counts.iter().map(|&(_, n)| n).sum();
    check_conservation(free, placed, item_count)?;

    let containers: Vec<ContainerVerdict> = counts
        .iter()
        .map(|&(container, assigned)| ContainerVerdict {
            container,
            assigned,
            expected: expected_per_container,
            verdict: Verdict::from_bool(assigned == expected_per_container),
        })
        .collect();
    let aggregate = Verdict::from_bool(containers.iter().all(|c| c.verdict.is_correct()));

    Ok(RoundVerdict {
        containers,
        aggregate,
    })
}

impl RoundState {
    /// Judge the round. Does not touch placements; input is closed afterwards.
    pub fn check(&mut self) -> Result<RoundVerdict, CheckError> {
        if self.is_checked() {
            return Err(CheckError::AlreadyChecked);
        }
        if !self.phase.is_idle() {
            return Err(CheckError::Busy);
        }
        if let Err(err) = self.audit() {
            self.report_integrity(&err);
            return Err(err.into());
        }

        let verdict = validate(
            &self.counts(),
            self.question.expected_per_container,
            self.free_count(),
            self.question.item_count(),
        )
        .inspect_err(|err| log::error!("Validator: {err}"))?;

        log::info!(
            "Round {} checked: {:?} (response {:?}, expected {} each)",
            self.round,
            verdict.aggregate,
            verdict.response(),
            self.question.expected_per_container
        );

        for c in &verdict.containers {
            self.emit(GameEvent::ContainerFeedback {
                container: c.container,
                correct: c.verdict.is_correct(),
            });
        }
        self.emit(GameEvent::Checked {
            verdict: verdict.clone(),
        });
        let text = if verdict.is_correct() {
            "Correct! Every plate has the same amount.".to_string()
        } else {
            let wrong: Vec<String> = verdict
                .incorrect_containers()
                .iter()
                .map(|c| (c.0 + 1).to_string())
                .collect();
            format!("Not quite. Check plate {}.", wrong.join(", "))
        };
        self.announce(AnnounceKind::Verdict, text);

        // Drop any half-made selection; the round is over
        self.selection.clear(&mut self.items);
        self.verdict = Some(verdict.clone());
        Ok(verdict)
    }
}
