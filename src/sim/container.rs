//! Capacity-bounded containers (plates)

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::item::ItemId;
use super::policy::InteractionPolicy;

/// Stable container index within a round (0..M-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub u32);

impl ContainerId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a container turned a group away. An expected outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// The group does not fit in the remaining slots
    CapacityExceeded {
        capacity: usize,
        held: usize,
        incoming: usize,
    },
    /// The tutorial wants a different container right now
    PolicyDenied,
}

impl Rejection {
    /// Short learner-facing description
    pub fn describe(&self) -> String {
        match self {
            Rejection::CapacityExceeded { capacity, held, incoming } => {
                let room = capacity.saturating_sub(*held);
                format!("Only {room} more fit, you are holding {incoming}")
            }
            Rejection::PolicyDenied => "Try the highlighted plate".to_string(),
        }
    }
}

/// A resident item's computed slot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotPlacement {
    pub item: ItemId,
    pub slot: usize,
    pub pos: Vec2,
}

/// Position of slot `slot` in a centered single row of `total` items.
///
/// Pure; both input paths lay containers out through this.
pub fn slot_position(center: Vec2, slot: usize, total: usize, pitch: f32) -> Vec2 {
    let mid = (total.max(1) - 1) as f32 / 2.0;
    Vec2::new(center.x + (slot as f32 - mid) * pitch, center.y)
}

/// A fixed-capacity placement target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Container {
    pub id: ContainerId,
    pub capacity: usize,
    pub center: Vec2,
    pub size: Vec2,
    /// Committed items in stacking order
    pub assigned: Vec<ItemId>,
    /// Pointer group hovering over this container
    pub hovered: bool,
    /// Size of the hovering group (cosmetic only)
    pub preview: usize,
}

impl Container {
    pub fn new(id: ContainerId, capacity: usize, center: Vec2, size: Vec2) -> Self {
        Self {
            id,
            capacity,
            center,
            size,
            assigned: Vec::with_capacity(capacity),
            hovered: false,
            preview: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::from_center_size(self.center, self.size)
    }

    /// Hover region: bounds inflated by the hit padding
    pub fn hit_bounds(&self, padding: f32) -> Rect {
        self.bounds().inflate(padding)
    }

    pub fn held(&self) -> usize {
        self.assigned.len()
    }

    pub fn remaining(&self) -> usize {
        self.capacity.saturating_sub(self.assigned.len())
    }

    /// Would a group of `incoming` be accepted? Does not mutate.
    pub fn admits(&self, incoming: usize, policy: &InteractionPolicy) -> Result<(), Rejection> {
        if !policy.permits(self.id) {
            return Err(Rejection::PolicyDenied);
        }
        if self.assigned.len() + incoming > self.capacity {
            return Err(Rejection::CapacityExceeded {
                capacity: self.capacity,
                held: self.assigned.len(),
                incoming,
            });
        }
        Ok(())
    }

    /// Accept the whole group or nothing.
    ///
    /// On success returns the new layout of every resident item, incoming
    /// items last in the order given.
    pub fn try_accept(
        &mut self,
        items: &[ItemId],
        policy: &InteractionPolicy,
        pitch: f32,
    ) -> Result<Vec<SlotPlacement>, Rejection> {
        self.admits(items.len(), policy)?;
        self.assigned.extend_from_slice(items);
        Ok(self.layout(pitch))
    }

    /// Slot layout of the committed items
    pub fn layout(&self, pitch: f32) -> Vec<SlotPlacement> {
        let total = self.assigned.len();
        self.assigned
            .iter()
            .enumerate()
            .map(|(slot, &item)| SlotPlacement {
                item,
                slot,
                pos: slot_position(self.center, slot, total, pitch),
            })
            .collect()
    }

    /// Committed items nudged one step aside to signal an incoming group
    pub fn preview_layout(&self, pitch: f32) -> Vec<SlotPlacement> {
        let total = self.assigned.len() + 1;
        self.assigned
            .iter()
            .enumerate()
            .map(|(slot, &item)| SlotPlacement {
                item,
                slot,
                pos: slot_position(self.center, slot, total, pitch),
            })
            .collect()
    }

    /// Arm for an incoming group of `incoming`
    pub fn set_hover(&mut self, incoming: usize) {
        self.hovered = true;
        self.preview = incoming;
    }

    pub fn clear_hover(&mut self) {
        self.hovered = false;
        self.preview = 0;
    }

    /// Forget all assignments and hover state (round reset)
    pub fn clear(&mut self) {
        self.assigned.clear();
        self.clear_hover();
    }
}
