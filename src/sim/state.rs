//! Round state and the shared placement resolution
//!
//! Both input paths (pointer drag and keyboard activation) end in
//! `RoundState::resolve`, so a given selection and target always produce the
//! same container contents whichever way the learner got there.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::animation::{Animator, Tween, TweenKind};
use super::container::{Container, ContainerId, Rejection};
use super::drag::DragTransaction;
use super::item::{Item, ItemId, Placement};
use super::policy::InteractionPolicy;
use super::selection::{Marquee, SelectionSet};
use super::validator::RoundVerdict;
use crate::consts::MAX_ITEMS;
use crate::error::{IntegrityError, SetupError};
use crate::question::Question;
use crate::tuning::Tuning;

/// Which input path produced an action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modality {
    Pointer,
    Keyboard,
}

impl Modality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Modality::Pointer => "pointer",
            Modality::Keyboard => "keyboard",
        }
    }
}

/// Announcement category, used by the host to filter verbosity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnounceKind {
    Selection,
    Placement,
    Verdict,
    Round,
}

/// Side effects for the host: rendering, audio cues, announcements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A question was loaded
    RoundStarted { round: u64, prompt: String },
    /// Explicit reset; every item is back in the pile
    RoundReset { round: u64 },
    /// Selection membership changed (any path)
    SelectionChanged { selected: Vec<ItemId> },
    /// Keyboard toggle acknowledgment, distinct for select vs deselect
    ItemAcknowledged { item: ItemId, selected: bool },
    /// Keyboard container activation with nothing selected
    NothingSelected { container: ContainerId },
    /// Pointer group entered or left a container
    HoverChanged { container: Option<ContainerId> },
    /// An item started moving
    TweenStarted {
        item: ItemId,
        kind: TweenKind,
        from: Vec2,
        to: Vec2,
        duration: f32,
    },
    /// Group committed to a container (placement sound)
    Placed {
        container: ContainerId,
        items: Vec<ItemId>,
        modality: Modality,
    },
    /// Group turned away by a container
    DropRejected {
        container: ContainerId,
        reason: Rejection,
        modality: Modality,
    },
    /// Pointer group heading back to the pile
    Reverted { items: Vec<ItemId> },
    /// Per-container verdict feedback
    ContainerFeedback { container: ContainerId, correct: bool },
    /// Round verdict
    Checked { verdict: RoundVerdict },
    /// Text for the accessibility announcer
    Announce { kind: AnnounceKind, text: String },
    /// Engine bug detected; the round should be abandoned
    IntegrityViolation { message: String },
}

/// Current input episode. At most one exists at a time.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub enum InteractionPhase {
    #[default]
    Idle,
    /// Rubber-band selection in progress
    Marquee(Marquee),
    /// Pointer pressed on a free item, not yet past the click threshold
    Armed {
        item: ItemId,
        origin: Vec2,
        was_selected: bool,
    },
    /// Group following the pointer
    Dragging(DragTransaction),
}

impl InteractionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_marquee(&self) -> bool {
        matches!(self, Self::Marquee(_))
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging(_))
    }

    pub fn drag(&self) -> Option<&DragTransaction> {
        match self {
            Self::Dragging(tx) => Some(tx),
            _ => None,
        }
    }
}

/// A group and a target, from either input path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub items: Vec<ItemId>,
    pub container: ContainerId,
    pub modality: Modality,
}

/// Outcome of a placement attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Committed {
        container: ContainerId,
        items: Vec<ItemId>,
    },
    Rejected {
        container: ContainerId,
        reason: Rejection,
    },
}

/// Slot pitch and width for a row of `count` containers holding `capacity`.
///
/// A container is `capacity + 1` pitches wide, narrowed when needed so that
/// neighbours keep at least `container_gap` between them.
pub fn container_metrics(tuning: &Tuning, count: usize, capacity: usize) -> (f32, f32) {
    let slots = (capacity.max(1) + 1) as f32;
    let spacing = tuning.arena_width / (count.max(1) + 1) as f32;
    let room = (spacing - tuning.container_gap).max(0.0);
    let width = (slots * tuning.slot_pitch).min(room);
    (width / slots, width)
}

/// One round of the mechanic
#[derive(Debug, Clone, Serialize)]
pub struct RoundState {
    /// Generation counter, bumped on every load and reset
    pub round: u64,
    pub question: Question,
    pub tuning: Tuning,
    pub policy: InteractionPolicy,
    /// Indexed by `ItemId`
    pub items: Vec<Item>,
    /// Indexed by `ContainerId`
    pub containers: Vec<Container>,
    /// Resident item spacing this round, narrowed to keep containers apart
    pub slot_pitch: f32,
    pub selection: SelectionSet,
    pub phase: InteractionPhase,
    pub animator: Animator,
    /// Set once the round is checked; input is ignored afterwards
    pub verdict: Option<RoundVerdict>,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Layout seed
    pub seed: u64,
    #[serde(skip)]
    events: Vec<GameEvent>,
}

impl RoundState {
    /// Build a round for `question`
    pub fn new(
        question: Question,
        policy: InteractionPolicy,
        tuning: Tuning,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let slot_pitch = tuning.slot_pitch;
        let mut state = Self {
            round: 0,
            question: question.clone(),
            tuning,
            policy: InteractionPolicy::open(),
            items: Vec::new(),
            containers: Vec::new(),
            slot_pitch,
            selection: SelectionSet::new(),
            phase: InteractionPhase::Idle,
            animator: Animator::new(),
            verdict: None,
            time_ticks: 0,
            seed,
            events: Vec::new(),
        };
        state.load_question(question, policy)?;
        Ok(state)
    }

    /// Replace the round with a new question. Nothing from the old round survives.
    pub fn load_question(
        &mut self,
        question: Question,
        policy: InteractionPolicy,
    ) -> Result<(), SetupError> {
        if question.container_count == 0 {
            return Err(SetupError::NoContainers);
        }
        let capacity = question
            .capacity(&self.tuning)
            .ok_or(SetupError::CapacityOverflow {
                expected: question.expected_per_container,
            })?;
        if capacity < question.expected_per_container {
            return Err(SetupError::CapacityTooSmall {
                capacity,
                expected: question.expected_per_container,
            });
        }
        if question.checked_item_count().is_none_or(|n| n > MAX_ITEMS) {
            return Err(SetupError::TooManyItems {
                containers: question.container_count,
                per_container: question.expected_per_container,
                max: MAX_ITEMS,
            });
        }
        if let Some(step) = policy
            .steps
            .iter()
            .find(|s| s.container.index() >= question.container_count)
        {
            return Err(SetupError::UnknownGuidedContainer {
                container: step.container,
                count: question.container_count,
            });
        }

        self.flush();
        self.round += 1;
        self.question = question;
        self.policy = policy;
        let (pitch, width) = container_metrics(&self.tuning, self.question.container_count, capacity);
        self.slot_pitch = pitch;
        self.containers = self.layout_containers(capacity, width);
        self.items = self.layout_items();
        self.selection = SelectionSet::new();
        self.verdict = None;

        log::info!(
            "Round {} loaded: {} containers x {} {} (capacity {})",
            self.round,
            self.question.container_count,
            self.question.expected_per_container,
            self.question.item_kind.as_str(),
            capacity
        );
        let prompt = self.question.text();
        self.emit(GameEvent::RoundStarted {
            round: self.round,
            prompt: prompt.clone(),
        });
        self.announce(AnnounceKind::Round, prompt);
        Ok(())
    }

    /// Containers in a single row across the arena
    fn layout_containers(&self, capacity: usize, width: f32) -> Vec<Container> {
        let t = &self.tuning;
        let count = self.question.container_count;
        let size = Vec2::new(width, t.container_height);
        (0..count)
            .map(|i| {
                let x = t.arena_width * (i + 1) as f32 / (count + 1) as f32;
                Container::new(
                    ContainerId(i as u32),
                    capacity,
                    Vec2::new(x, t.container_row_y),
                    size,
                )
            })
            .collect()
    }

    /// Items in a jittered grid below the containers
    fn layout_items(&self) -> Vec<Item> {
        let t = &self.tuning;
        let count = self.question.item_count();
        let columns = count.clamp(1, t.pile_columns.max(1));
        let mut rng = Pcg32::seed_from_u64(self.seed.wrapping_add(self.round));
        let jitter = t.pile_jitter.abs();

        (0..count)
            .map(|i| {
                let row = (i / columns) as f32;
                let col = (i % columns) as f32;
                let mid = (columns - 1) as f32 / 2.0;
                let base = Vec2::new(
                    t.arena_width / 2.0 + (col - mid) * t.pile_pitch,
                    t.pile_top_y + row * t.pile_pitch,
                );
                let offset = Vec2::new(
                    rng.random_range(-jitter..=jitter),
                    rng.random_range(-jitter..=jitter),
                );
                Item::new(ItemId(i as u32), self.question.item_kind, base + offset)
            })
            .collect()
    }

    // === Queries ===

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.index())
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.get(id.index())
    }

    pub fn free_items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter().filter(|item| item.is_free())
    }

    pub fn free_count(&self) -> usize {
        self.free_items().count()
    }

    pub fn placed_count(&self) -> usize {
        self.containers.iter().map(Container::held).sum()
    }

    /// Committed item count per container
    pub fn counts(&self) -> Vec<(ContainerId, usize)> {
        self.containers.iter().map(|c| (c.id, c.held())).collect()
    }

    pub fn is_checked(&self) -> bool {
        self.verdict.is_some()
    }

    /// Input is only processed before the round is checked
    pub fn accepts_input(&self) -> bool {
        self.verdict.is_none()
    }

    /// Container currently armed by a pointer group
    pub fn hovered_container(&self) -> Option<ContainerId> {
        self.phase.drag().and_then(|tx| tx.hovered)
    }

    // === Events ===

    pub fn events(&self) -> &[GameEvent] {
        &self.events
    }

    /// Take all pending events
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    pub(crate) fn announce(&mut self, kind: AnnounceKind, text: impl Into<String>) {
        self.emit(GameEvent::Announce {
            kind,
            text: text.into(),
        });
    }

    pub(crate) fn announce_selection(&mut self) {
        let selected = self.selection.items().to_vec();
        let kind = self.question.item_kind;
        let text = match selected.len() {
            0 => "Nothing selected".to_string(),
            n => format!("{n} {} selected", kind.noun(n)),
        };
        self.emit(GameEvent::SelectionChanged { selected });
        self.announce(AnnounceKind::Selection, text);
    }

    // === Resolution ===

    /// Commit or reject a group against a container, all or nothing.
    ///
    /// Logical state only; the caller picks the motion (settle, revert, feint).
    /// `None` when the proposal names an unknown container, no items, or an
    /// item that is unknown, repeated, placed or still animating.
    pub(crate) fn resolve(&mut self, proposal: &Proposal) -> Option<Resolution> {
        if proposal.items.is_empty() || !self.proposal_is_sound(&proposal.items) {
            return None;
        }
        let pitch = self.slot_pitch;
        let Some(container) = self.containers.get_mut(proposal.container.index()) else {
            log::warn!("Resolve: unknown container {}", proposal.container);
            return None;
        };

        let layout = match container.try_accept(&proposal.items, &self.policy, pitch) {
            Ok(layout) => layout,
            Err(reason) => {
                log::debug!(
                    "{} drop of {} on container {} rejected: {:?}",
                    proposal.modality.as_str(),
                    proposal.items.len(),
                    proposal.container,
                    reason
                );
                self.emit(GameEvent::DropRejected {
                    container: proposal.container,
                    reason,
                    modality: proposal.modality,
                });
                self.announce(AnnounceKind::Placement, reason.describe());
                return Some(Resolution::Rejected {
                    container: proposal.container,
                    reason,
                });
            }
        };
        let held = container.held();

        let mut settles = Vec::with_capacity(layout.len());
        for slot in &layout {
            if let Some(item) = self.items.get_mut(slot.item.index()) {
                let from = item.pos;
                item.assign(proposal.container, slot.slot);
                if from != slot.pos {
                    settles.push(Tween::linear(
                        item.id,
                        TweenKind::Settle,
                        from,
                        slot.pos,
                        self.tuning.settle_duration,
                        self.round,
                    ));
                }
            }
        }
        for tween in settles {
            self.start_tween(tween);
        }

        self.selection.clear(&mut self.items);
        self.policy.on_commit(proposal.container, held);

        log::debug!(
            "{} placed {} on container {} ({held} held)",
            proposal.modality.as_str(),
            proposal.items.len(),
            proposal.container
        );
        self.emit(GameEvent::Placed {
            container: proposal.container,
            items: proposal.items.clone(),
            modality: proposal.modality,
        });
        let kind = self.question.item_kind;
        let placed = proposal.items.len();
        self.announce(
            AnnounceKind::Placement,
            format!(
                "Placed {placed} {} on plate {}. It has {held}.",
                kind.noun(placed),
                proposal.container.0 + 1
            ),
        );

        Some(Resolution::Committed {
            container: proposal.container,
            items: proposal.items.clone(),
        })
    }

    /// Every id known, listed once, free and settled
    fn proposal_is_sound(&self, ids: &[ItemId]) -> bool {
        let mut seen = vec![false; self.items.len()];
        for &id in ids {
            let Some(item) = self.item(id) else {
                log::warn!("Resolve: unknown item {id}");
                return false;
            };
            if std::mem::replace(&mut seen[id.index()], true) {
                log::warn!("Resolve: item {id} proposed twice");
                return false;
            }
            if !item.is_interactive() {
                log::warn!("Resolve: item {id} is placed or animating");
                return false;
            }
        }
        true
    }

    /// Send a pointer group home. Items stay selected and locked until the tween ends.
    pub(crate) fn revert_group(&mut self, ids: &[ItemId]) {
        let duration = self.tuning.revert_duration;
        let round = self.round;
        let mut tweens = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(item) = self.items.get_mut(id.index()) {
                item.dragging = true;
                tweens.push(Tween::linear(id, TweenKind::Revert, item.pos, item.home, duration, round));
            }
        }
        for tween in tweens {
            self.start_tween(tween);
        }
        self.emit(GameEvent::Reverted { items: ids.to_vec() });
    }

    /// Lunge a keyboard selection toward `container` and back
    pub(crate) fn feint_group(&mut self, ids: &[ItemId], container: ContainerId) {
        let Some(target) = self.container(container).map(|c| c.center) else {
            return;
        };
        let duration = self.tuning.feint_duration;
        let reach = self.tuning.feint_reach;
        let round = self.round;
        let mut tweens = Vec::with_capacity(ids.len());
        for &id in ids {
            if let Some(item) = self.items.get_mut(id.index()) {
                item.dragging = true;
                let peak = item.home + (target - item.home) * reach;
                tweens.push(Tween::feint(id, container, item.home, peak, duration, round));
            }
        }
        for tween in tweens {
            self.start_tween(tween);
        }
    }

    fn start_tween(&mut self, tween: Tween) {
        self.emit(GameEvent::TweenStarted {
            item: tween.item,
            kind: tween.kind,
            from: tween.from,
            to: tween.peak,
            duration: tween.duration,
        });
        self.animator.start(tween);
    }

    /// Step animations; finished revert/feint tweens unlock their items
    pub fn advance_animations(&mut self, dt: f32) {
        let step = self.animator.advance(dt);
        for (id, pos) in step.moved {
            if let Some(item) = self.items.get_mut(id.index()) {
                item.pos = pos;
            }
        }
        for tween in step.finished {
            if tween.round != self.round {
                log::debug!("Dropping stale tween for item {} from round {}", tween.item, tween.round);
                continue;
            }
            let Some(item) = self.items.get_mut(tween.item.index()) else {
                continue;
            };
            item.pos = tween.to;
            match tween.kind {
                TweenKind::Revert | TweenKind::Feint { .. } => item.dragging = false,
                TweenKind::Settle => {}
            }
        }
    }

    // === Reset ===

    /// Cancel any gesture and pending animation without touching placements
    fn flush(&mut self) {
        let cancelled = self.animator.cancel_all();
        if cancelled > 0 {
            log::debug!("Flushed {cancelled} pending tweens");
        }
        self.phase = InteractionPhase::Idle;
    }

    /// Return every item to the pile and empty every container, synchronously
    pub fn reset(&mut self) {
        self.flush();
        self.round += 1;
        for item in &mut self.items {
            item.release();
        }
        for container in &mut self.containers {
            container.clear();
        }
        self.selection = SelectionSet::new();
        self.policy.restart();
        self.verdict = None;

        log::info!("Round reset (generation {})", self.round);
        self.emit(GameEvent::RoundReset { round: self.round });
        self.announce(AnnounceKind::Round, "All plates cleared");
    }

    // === Integrity ===

    /// Check every structural invariant of the placement model
    pub fn audit(&self) -> Result<(), IntegrityError> {
        let mut listed_in: Vec<Option<ContainerId>> = vec![None; self.items.len()];

        for container in &self.containers {
            if container.held() > container.capacity {
                return Err(IntegrityError::OverCapacity {
                    container: container.id,
                    held: container.held(),
                    capacity: container.capacity,
                });
            }
            for &id in &container.assigned {
                let Some(item) = self.item(id) else {
                    return Err(IntegrityError::PlacementMismatch {
                        item: id,
                        container: container.id,
                    });
                };
                if let Some(first) = listed_in[id.index()] {
                    return Err(IntegrityError::DuplicatePlacement {
                        item: id,
                        first,
                        second: container.id,
                    });
                }
                listed_in[id.index()] = Some(container.id);
                if item.is_free() {
                    return Err(IntegrityError::FreeItemInContainer {
                        item: id,
                        container: container.id,
                    });
                }
            }
        }

        for item in &self.items {
            if let Placement::Assigned { container, .. } = item.placement {
                if listed_in[item.id.index()] != Some(container) {
                    return Err(IntegrityError::PlacementMismatch {
                        item: item.id,
                        container,
                    });
                }
                if item.selected {
                    return Err(IntegrityError::SelectedWhilePlaced { item: item.id });
                }
            }
        }

        super::validator::check_conservation(
            self.free_count(),
            self.placed_count(),
            self.question.item_count(),
        )
    }

    /// Log and surface a broken invariant; panics under strict integrity
    pub(crate) fn report_integrity(&mut self, err: &IntegrityError) {
        log::error!("Integrity violation in round {}: {err}", self.round);
        self.emit(GameEvent::IntegrityViolation {
            message: err.to_string(),
        });
        if self.tuning.strict_integrity {
            panic!("integrity violation: {err}");
        }
    }
}
