//! Pointer path: marquee, click toggle and group drag
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Marquee      (press on empty space)
//! Idle -> Armed        (press on a free item)
//! Armed -> Dragging    (travel past the click threshold)
//! Armed -> Idle        (release under the threshold: click toggle)
//! Marquee -> Idle      (release: sweep kept, or click toggle)
//! Dragging -> Idle     (release: commit, or revert home)
//! ```
//!
//! Grabbing an unselected item collapses the selection to that item alone.

use glam::Vec2;
use serde::Serialize;

use super::container::{Container, ContainerId, slot_position};
use super::item::ItemId;
use super::selection::{MarqueeOutcome, SelectionChange, topmost_free_item};
use super::state::{GameEvent, InteractionPhase, Modality, Proposal, Resolution, RoundState};

/// A group following the pointer, from press to release
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DragTransaction {
    pub origin: Vec2,
    pub current: Vec2,
    /// Selection snapshot, in formation order
    pub items: Vec<ItemId>,
    /// Container under the pointer, if any
    pub hovered: Option<ContainerId>,
}

impl DragTransaction {
    pub fn new(origin: Vec2, items: Vec<ItemId>) -> Self {
        Self {
            origin,
            current: origin,
            items,
            hovered: None,
        }
    }

    /// Pointer-centered row of the group
    pub fn formation(&self, pitch: f32) -> Vec<(ItemId, Vec2)> {
        let n = self.items.len();
        self.items
            .iter()
            .enumerate()
            .map(|(k, &id)| (id, slot_position(self.current, k, n, pitch)))
            .collect()
    }
}

/// Nearest container whose padded bounds contain `p`
pub fn nearest_container(containers: &[Container], p: Vec2, padding: f32) -> Option<ContainerId> {
    containers
        .iter()
        .filter(|c| c.hit_bounds(padding).contains(p))
        .min_by(|a, b| {
            a.center
                .distance_squared(p)
                .partial_cmp(&b.center.distance_squared(p))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|c| c.id)
}

impl RoundState {
    pub fn pointer_down(&mut self, p: Vec2) {
        if !self.accepts_input() {
            return;
        }
        if !self.phase.is_idle() {
            log::debug!("Pointer down ignored: gesture already active");
            return;
        }

        let size = self.tuning.item_size;
        match topmost_free_item(&self.items, p, size) {
            Some(id) if self.items[id.index()].dragging => {
                log::debug!("Pointer down on animating item {id} ignored");
            }
            Some(id) => {
                self.phase = InteractionPhase::Armed {
                    item: id,
                    origin: p,
                    was_selected: self.selection.contains(id),
                };
            }
            None => {
                if let Some(marquee) = self.selection.begin_marquee(&self.items, p, size) {
                    self.phase = InteractionPhase::Marquee(marquee);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, p: Vec2) {
        if !self.accepts_input() {
            return;
        }
        match std::mem::take(&mut self.phase) {
            InteractionPhase::Idle => {}
            InteractionPhase::Marquee(mut marquee) => {
                let size = self.tuning.item_size;
                let added =
                    self.selection
                        .update_marquee(&mut marquee, &mut self.items, p, &self.policy, size);
                self.phase = InteractionPhase::Marquee(marquee);
                if !added.is_empty() {
                    self.announce_selection();
                }
            }
            InteractionPhase::Armed {
                item,
                origin,
                was_selected,
            } => {
                if origin.distance(p) < self.tuning.click_threshold {
                    self.phase = InteractionPhase::Armed {
                        item,
                        origin,
                        was_selected,
                    };
                    return;
                }
                match self.start_drag(item, origin, was_selected) {
                    Some(mut tx) => {
                        self.drag_to(&mut tx, p);
                        self.phase = InteractionPhase::Dragging(tx);
                    }
                    None => {
                        self.phase = InteractionPhase::Armed {
                            item,
                            origin,
                            was_selected,
                        };
                    }
                }
            }
            InteractionPhase::Dragging(mut tx) => {
                self.drag_to(&mut tx, p);
                self.phase = InteractionPhase::Dragging(tx);
            }
        }
    }

    pub fn pointer_up(&mut self, p: Vec2) {
        if !self.accepts_input() {
            return;
        }
        match std::mem::take(&mut self.phase) {
            InteractionPhase::Idle => {}
            InteractionPhase::Marquee(mut marquee) => {
                let size = self.tuning.item_size;
                self.selection
                    .update_marquee(&mut marquee, &mut self.items, p, &self.policy, size);
                let outcome = self.selection.end_marquee(
                    marquee,
                    &mut self.items,
                    &self.policy,
                    size,
                    self.tuning.click_threshold,
                );
                match outcome {
                    MarqueeOutcome::Swept(added) => {
                        log::debug!("Marquee swept {} items", added.len());
                        self.announce_selection();
                    }
                    MarqueeOutcome::Clicked(SelectionChange::Ignored) => {}
                    MarqueeOutcome::Clicked(_) => self.announce_selection(),
                }
            }
            InteractionPhase::Armed { item, .. } => {
                // Released without travel: a click on the item
                let change = self.selection.toggle(&mut self.items, item, &self.policy);
                if change != SelectionChange::Ignored {
                    self.announce_selection();
                }
            }
            InteractionPhase::Dragging(mut tx) => {
                self.drag_to(&mut tx, p);
                self.finish_drag(tx);
            }
        }
    }

    /// Pointer lost (capture lost, window blur). Drags revert; a marquee keeps its sweep.
    pub fn pointer_cancel(&mut self) {
        match std::mem::take(&mut self.phase) {
            InteractionPhase::Dragging(tx) => {
                self.set_hover(&tx, None);
                self.revert_group(&tx.items);
            }
            InteractionPhase::Marquee(_) | InteractionPhase::Armed { .. } | InteractionPhase::Idle => {}
        }
    }

    /// Snapshot the selection (collapsing onto `grab` if it was not selected)
    fn start_drag(&mut self, grab: ItemId, origin: Vec2, was_selected: bool) -> Option<DragTransaction> {
        if !was_selected || !self.selection.contains(grab) {
            if !self.selection.select_only(&mut self.items, grab, &self.policy) {
                return None;
            }
            self.announce_selection();
        }

        let snapshot = self.selection.items().to_vec();
        if snapshot.iter().any(|&id| self.items[id.index()].dragging) {
            log::debug!("Drag refused: part of the selection is still animating");
            return None;
        }
        for &id in &snapshot {
            self.items[id.index()].dragging = true;
        }
        log::debug!("Drag started with {} items", snapshot.len());
        Some(DragTransaction::new(origin, snapshot))
    }

    /// Move the group to `p` and update hover
    fn drag_to(&mut self, tx: &mut DragTransaction, p: Vec2) {
        tx.current = p;
        for (id, pos) in tx.formation(self.tuning.formation_pitch) {
            if let Some(item) = self.items.get_mut(id.index()) {
                item.pos = pos;
            }
        }

        let target = nearest_container(&self.containers, p, self.tuning.hit_padding);
        if target != tx.hovered {
            self.set_hover(tx, target);
            tx.hovered = target;
            self.emit(GameEvent::HoverChanged { container: target });
        }
    }

    /// Swap the armed container, reflowing residents (cosmetic only)
    fn set_hover(&mut self, tx: &DragTransaction, target: Option<ContainerId>) {
        let pitch = self.slot_pitch;
        if let Some(old) = tx.hovered.and_then(|id| self.containers.get_mut(id.index())) {
            old.clear_hover();
            for slot in old.layout(pitch) {
                self.items[slot.item.index()].pos = slot.pos;
            }
        }
        if let Some(new) = target.and_then(|id| self.containers.get_mut(id.index())) {
            new.set_hover(tx.items.len());
            for slot in new.preview_layout(pitch) {
                self.items[slot.item.index()].pos = slot.pos;
            }
        }
    }

    /// Release: commit onto the hovered container or revert home
    fn finish_drag(&mut self, tx: DragTransaction) {
        let Some(target) = tx.hovered else {
            log::debug!("Dropped on empty space, reverting {} items", tx.items.len());
            self.revert_group(&tx.items);
            return;
        };
        self.set_hover(&tx, None);

        // The gesture is over; a rejected group is re-locked by the revert
        for &id in &tx.items {
            self.items[id.index()].dragging = false;
        }
        let proposal = Proposal {
            items: tx.items.clone(),
            container: target,
            modality: Modality::Pointer,
        };
        match self.resolve(&proposal) {
            Some(Resolution::Committed { .. }) => {}
            Some(Resolution::Rejected { .. }) | None => self.revert_group(&tx.items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{ItemKind, Question};
    use crate::sim::policy::InteractionPolicy;
    use crate::tuning::Tuning;

    fn state() -> RoundState {
        let tuning = Tuning {
            strict_integrity: false,
            ..Default::default()
        };
        RoundState::new(
            Question::new(2, 2, ItemKind::Cookie).with_capacity(2),
            InteractionPolicy::open(),
            tuning,
            11,
        )
        .expect("valid question")
    }

    fn click(s: &mut RoundState, id: u32) {
        let p = s.items[id as usize].pos;
        s.pointer_down(p);
        s.pointer_up(p);
    }

    #[test]
    fn test_formation_is_centered_on_pointer() {
        let mut tx = DragTransaction::new(Vec2::ZERO, vec![ItemId(0), ItemId(1), ItemId(2)]);
        tx.current = Vec2::new(100.0, 100.0);
        let f = tx.formation(10.0);
        assert_eq!(f[1].1, Vec2::new(100.0, 100.0));
        assert_eq!(f[0].1, Vec2::new(90.0, 100.0));
        assert_eq!(f[2].1, Vec2::new(110.0, 100.0));
    }

    #[test]
    fn test_nearest_container_uses_padding() {
        let s = state();
        let c = &s.containers[0];
        let just_outside = Vec2::new(c.center.x, c.bounds().max.y + 10.0);
        assert_eq!(nearest_container(&s.containers, just_outside, 0.0), None);
        assert_eq!(nearest_container(&s.containers, just_outside, 24.0), Some(ContainerId(0)));
    }

    #[test]
    fn test_click_toggles_selection() {
        let mut s = state();
        click(&mut s, 0);
        click(&mut s, 1);
        assert_eq!(s.selection.items(), &[ItemId(0), ItemId(1)]);
        click(&mut s, 0);
        assert_eq!(s.selection.items(), &[ItemId(1)]);
        assert!(s.phase.is_idle());
    }

    #[test]
    fn test_drag_selected_group_commits() {
        let mut s = state();
        click(&mut s, 0);
        click(&mut s, 1);

        let start = s.items[1].pos;
        let target = s.containers[0].center;
        s.pointer_down(start);
        s.pointer_move(start + Vec2::new(20.0, 0.0));
        assert!(s.phase.is_dragging());
        assert!(s.items[0].dragging && s.items[1].dragging);

        s.pointer_move(target);
        assert_eq!(s.hovered_container(), Some(ContainerId(0)));
        assert!(s.containers[0].hovered);

        s.pointer_up(target);
        assert!(s.phase.is_idle());
        assert_eq!(s.containers[0].assigned, vec![ItemId(0), ItemId(1)]);
        assert!(!s.containers[0].hovered);
        assert!(s.selection.is_empty());
    }

    #[test]
    fn test_grab_unselected_collapses_selection() {
        let mut s = state();
        click(&mut s, 0);
        click(&mut s, 1);

        let start = s.items[3].pos;
        s.pointer_down(start);
        s.pointer_move(start + Vec2::new(0.0, -40.0));
        let tx = s.phase.drag().expect("dragging");
        assert_eq!(tx.items, vec![ItemId(3)]);
        assert_eq!(s.selection.items(), &[ItemId(3)]);
        assert!(!s.items[0].selected);
    }

    #[test]
    fn test_drop_on_empty_space_reverts_and_keeps_selection() {
        let mut s = state();
        click(&mut s, 2);
        let start = s.items[2].pos;
        let home = s.items[2].home;

        s.pointer_down(start);
        s.pointer_move(Vec2::new(5.0, 5.0));
        s.pointer_up(Vec2::new(5.0, 5.0));

        assert!(s.phase.is_idle());
        assert!(s.items[2].is_free());
        assert!(s.items[2].dragging, "locked until the revert finishes");
        assert_eq!(s.selection.items(), &[ItemId(2)]);

        s.advance_animations(1.0);
        assert!(!s.items[2].dragging);
        assert_eq!(s.items[2].pos, home);
    }

    #[test]
    fn test_hover_reflow_is_cosmetic() {
        let mut s = state();
        click(&mut s, 0);
        let target = s.containers[1].center;
        let start = s.items[0].pos;
        s.pointer_down(start);
        s.pointer_move(target);
        s.pointer_up(target);
        s.advance_animations(1.0);
        let settled = s.items[0].pos;

        click(&mut s, 1);
        let start = s.items[1].pos;
        s.pointer_down(start);
        s.pointer_move(target);
        assert_ne!(s.items[0].pos, settled, "resident nudged aside");
        assert_eq!(s.containers[1].assigned, vec![ItemId(0)]);

        // Leave again: resident snaps back, nothing committed
        s.pointer_move(Vec2::new(5.0, 700.0));
        assert_eq!(s.items[0].pos, settled);
        assert_eq!(s.containers[1].assigned, vec![ItemId(0)]);
        assert!(!s.containers[1].hovered);
    }

    #[test]
    fn test_cancel_reverts_drag() {
        let mut s = state();
        click(&mut s, 0);
        let start = s.items[0].pos;
        s.pointer_down(start);
        s.pointer_move(s.containers[0].center);
        s.pointer_cancel();

        assert!(s.phase.is_idle());
        assert!(s.containers[0].assigned.is_empty());
        assert!(!s.containers[0].hovered);
        assert!(s.items[0].is_free());
    }

    #[test]
    fn test_animating_item_cannot_be_grabbed() {
        let mut s = state();
        click(&mut s, 0);
        let start = s.items[0].pos;
        s.pointer_down(start);
        s.pointer_move(Vec2::new(5.0, 5.0));
        s.pointer_up(Vec2::new(5.0, 5.0));
        assert!(s.items[0].dragging);

        // Still reverting: press is ignored
        let p = s.items[0].pos;
        s.pointer_down(p);
        assert!(s.phase.is_idle());
    }
}
