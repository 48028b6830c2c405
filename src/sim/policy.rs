//! Interaction policy: selection cap and guided (tutorial) container order

use serde::{Deserialize, Serialize};

use super::container::ContainerId;

/// One tutorial step: only `container` accepts drops until it holds `fill_to` items
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuidedStep {
    pub container: ContainerId,
    pub fill_to: usize,
}

/// What the learner is allowed to do this round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionPolicy {
    /// Selection size cap; additions beyond it are ignored
    pub max_selectable: Option<usize>,
    /// Tutorial script; empty for a normal round
    pub steps: Vec<GuidedStep>,
    /// Index of the active step
    pub step: usize,
}

impl InteractionPolicy {
    /// No cap, every container eligible
    pub fn open() -> Self {
        Self::default()
    }

    /// Capped selection and a fixed container order
    pub fn guided(max_selectable: usize, steps: Vec<GuidedStep>) -> Self {
        Self {
            max_selectable: Some(max_selectable.max(1)),
            steps,
            step: 0,
        }
    }

    pub fn is_guided(&self) -> bool {
        !self.steps.is_empty()
    }

    /// Container the tutorial is pointing at, if any step remains
    pub fn current_target(&self) -> Option<ContainerId> {
        self.steps.get(self.step).map(|s| s.container)
    }

    /// Whether a drop on `container` is allowed right now
    pub fn permits(&self, container: ContainerId) -> bool {
        match self.current_target() {
            Some(target) => target == container,
            None => true,
        }
    }

    /// Whether another item may join a selection of `len`
    pub fn allows_selection_of(&self, len: usize) -> bool {
        self.max_selectable.is_none_or(|max| len <= max)
    }

    /// Advance the tutorial after a commit left `container` holding `held` items
    pub fn on_commit(&mut self, container: ContainerId, held: usize) {
        if let Some(step) = self.steps.get(self.step) {
            if step.container == container && held >= step.fill_to {
                self.step += 1;
                log::debug!("Guided step {} complete", self.step);
            }
        }
    }

    /// Rewind the tutorial (round reset)
    pub fn restart(&mut self) {
        self.step = 0;
    }
}
