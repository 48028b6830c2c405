//! Selection set: marquee sweep, click toggle and keyboard toggle
//!
//! The set keeps ids in the order they were picked; that order is the drag
//! formation order and the slot order on commit. Each member's `selected`
//! flag is kept in step with membership here and nowhere else, apart from
//! `Item::assign`/`Item::release`, which clear it on commit and reset.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::item::{Item, ItemId};
use super::policy::InteractionPolicy;

/// Result of a single-item toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectionChange {
    Selected(ItemId),
    Deselected(ItemId),
    /// Unknown, placed, busy, or over the cap
    Ignored,
}

/// An open rubber-band gesture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marquee {
    pub origin: Vec2,
    pub current: Vec2,
    /// Items this gesture added, in order
    added: Vec<ItemId>,
}

impl Marquee {
    pub fn new(origin: Vec2) -> Self {
        Self {
            origin,
            current: origin,
            added: Vec::new(),
        }
    }

    pub fn rect(&self) -> Rect {
        Rect::from_corners(self.origin, self.current)
    }

    /// Net pointer travel since the press
    pub fn displacement(&self) -> f32 {
        self.origin.distance(self.current)
    }

    pub fn added(&self) -> &[ItemId] {
        &self.added
    }
}

/// How a marquee gesture ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarqueeOutcome {
    /// Real sweep; these items joined the selection during the gesture
    Swept(Vec<ItemId>),
    /// Travel under the click threshold: a toggle of the item under the pointer
    Clicked(SelectionChange),
}

/// Topmost free, interactive item under `p` (later items draw on top)
pub fn topmost_free_item(items: &[Item], p: Vec2, item_size: f32) -> Option<ItemId> {
    items
        .iter()
        .rev()
        .filter(|item| item.is_free())
        .find(|item| item.bounds(item_size).contains(p))
        .map(|item| item.id)
}

/// Items currently picked up, pending placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSet {
    items: Vec<ItemId>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    /// Members in pick order
    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    /// Add one free item. Over-cap additions are silently dropped.
    pub fn add(&mut self, items: &mut [Item], id: ItemId, policy: &InteractionPolicy) -> bool {
        let Some(item) = items.get_mut(id.index()) else {
            log::warn!("Selection add: unknown item {id}");
            return false;
        };
        if !item.is_interactive() || item.selected {
            return false;
        }
        if !policy.allows_selection_of(self.items.len() + 1) {
            log::debug!("Selection cap reached, ignoring item {id}");
            return false;
        }
        item.selected = true;
        self.items.push(id);
        true
    }

    /// Drop one member. Refused while the item is mid-drag or animating.
    pub fn remove(&mut self, items: &mut [Item], id: ItemId) -> bool {
        let Some(pos) = self.items.iter().position(|&m| m == id) else {
            return false;
        };
        let Some(item) = items.get_mut(id.index()) else {
            return false;
        };
        if item.dragging {
            return false;
        }
        item.selected = false;
        self.items.remove(pos);
        true
    }

    pub fn toggle(
        &mut self,
        items: &mut [Item],
        id: ItemId,
        policy: &InteractionPolicy,
    ) -> SelectionChange {
        if self.contains(id) {
            if self.remove(items, id) {
                SelectionChange::Deselected(id)
            } else {
                SelectionChange::Ignored
            }
        } else if self.add(items, id, policy) {
            SelectionChange::Selected(id)
        } else {
            SelectionChange::Ignored
        }
    }

    /// Collapse to `id` alone (grabbing an unselected item)
    pub fn select_only(&mut self, items: &mut [Item], id: ItemId, policy: &InteractionPolicy) -> bool {
        self.clear(items);
        self.add(items, id, policy)
    }

    /// Deselect every member
    pub fn clear(&mut self, items: &mut [Item]) {
        for id in self.items.drain(..) {
            if let Some(item) = items.get_mut(id.index()) {
                item.selected = false;
            }
        }
    }

    /// Open a marquee at `origin`; `None` if the press lands on a selected item
    pub fn begin_marquee(&self, items: &[Item], origin: Vec2, item_size: f32) -> Option<Marquee> {
        match topmost_free_item(items, origin, item_size) {
            Some(id) if self.contains(id) => None,
            _ => Some(Marquee::new(origin)),
        }
    }

    /// Grow the sweep to `point`. Never removes items added earlier in the gesture.
    pub fn update_marquee(
        &mut self,
        marquee: &mut Marquee,
        items: &mut [Item],
        point: Vec2,
        policy: &InteractionPolicy,
        item_size: f32,
    ) -> Vec<ItemId> {
        marquee.current = point;
        let rect = marquee.rect();
        let hits: Vec<ItemId> = items
            .iter()
            .filter(|item| item.is_interactive() && !item.selected)
            .filter(|item| item.bounds(item_size).intersects(&rect))
            .map(|item| item.id)
            .collect();

        let mut added = Vec::new();
        for id in hits {
            if self.add(items, id, policy) {
                marquee.added.push(id);
                added.push(id);
            }
        }
        added
    }

    /// Close the gesture; a short one becomes a click toggle
    pub fn end_marquee(
        &mut self,
        marquee: Marquee,
        items: &mut [Item],
        policy: &InteractionPolicy,
        item_size: f32,
        click_threshold: f32,
    ) -> MarqueeOutcome {
        if marquee.displacement() >= click_threshold {
            return MarqueeOutcome::Swept(marquee.added);
        }

        // A click: undo whatever the tiny rectangle swept up, then toggle
        for &id in &marquee.added {
            self.remove(items, id);
        }
        let change = match topmost_free_item(items, marquee.current, item_size) {
            Some(id) => self.toggle(items, id, policy),
            None => SelectionChange::Ignored,
        };
        MarqueeOutcome::Clicked(change)
    }
}
