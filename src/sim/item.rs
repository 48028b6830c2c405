//! Placeable items

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::container::ContainerId;
use super::geometry::Rect;
use crate::question::ItemKind;

/// Stable item index within a round (0..N-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl ItemId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where an item logically is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// In the pile, available for selection
    Free,
    /// Committed to a container at the given stacking slot
    Assigned { container: ContainerId, slot: usize },
}

/// A discrete unit the learner selects and places
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub kind: ItemKind,
    /// Pile position to revert to
    pub home: Vec2,
    /// Current visual position (center)
    pub pos: Vec2,
    pub placement: Placement,
    /// Member of the selection (only while free)
    pub selected: bool,
    /// Moving with the pointer or finishing a revert/feint; not interactive
    pub dragging: bool,
}

impl Item {
    pub fn new(id: ItemId, kind: ItemKind, home: Vec2) -> Self {
        Self {
            id,
            kind,
            home,
            pos: home,
            placement: Placement::Free,
            selected: false,
            dragging: false,
        }
    }

    pub fn is_free(&self) -> bool {
        self.placement == Placement::Free
    }

    /// Free and not locked by a gesture or animation
    pub fn is_interactive(&self) -> bool {
        self.is_free() && !self.dragging
    }

    pub fn container(&self) -> Option<ContainerId> {
        match self.placement {
            Placement::Free => None,
            Placement::Assigned { container, .. } => Some(container),
        }
    }

    pub fn bounds(&self, size: f32) -> Rect {
        Rect::from_center_size(self.pos, Vec2::splat(size))
    }

    /// Commit into a container slot. Clears the transient flags.
    pub fn assign(&mut self, container: ContainerId, slot: usize) {
        self.placement = Placement::Assigned { container, slot };
        self.selected = false;
        self.dragging = false;
    }

    /// Back to the pile, unselected and at home
    pub fn release(&mut self) {
        self.placement = Placement::Free;
        self.pos = self.home;
        self.selected = false;
        self.dragging = false;
    }
}
