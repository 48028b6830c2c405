//! Data-driven geometry and timing
//!
//! Every field has a default from `consts`, so a partial JSON document only
//! overrides what it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Engine geometry, timing and policy knobs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Arena size (logical pixels)
    pub arena_width: f32,
    pub arena_height: f32,

    /// Pointer travel that turns a press into a marquee or drag
    pub click_threshold: f32,

    /// Item edge length
    pub item_size: f32,
    /// Resident item spacing inside a container
    pub slot_pitch: f32,
    /// Item spacing in a dragged group
    pub formation_pitch: f32,

    /// Container height (width follows capacity)
    pub container_height: f32,
    /// Minimum space between neighbouring containers
    pub container_gap: f32,
    /// Hover hit area inflation around containers
    pub hit_padding: f32,
    /// Vertical center of the container row
    pub container_row_y: f32,

    /// Free item pile layout
    pub pile_top_y: f32,
    pub pile_pitch: f32,
    pub pile_columns: usize,
    pub pile_jitter: f32,

    /// Tween durations (seconds)
    pub revert_duration: f32,
    pub feint_duration: f32,
    pub settle_duration: f32,
    /// Fraction of the distance a feint travels toward its container
    pub feint_reach: f32,
    /// Seconds verdict feedback is shown before the next round
    pub feedback_hold: f32,

    /// Capacity tiers, ascending
    pub capacity_tiers: Vec<usize>,

    /// Panic on integrity violations instead of only logging them
    pub strict_integrity: bool,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            click_threshold: CLICK_THRESHOLD,
            item_size: ITEM_SIZE,
            slot_pitch: SLOT_PITCH,
            formation_pitch: FORMATION_PITCH,
            container_height: CONTAINER_HEIGHT,
            container_gap: CONTAINER_GAP,
            hit_padding: CONTAINER_HIT_PADDING,
            container_row_y: CONTAINER_ROW_Y,
            pile_top_y: PILE_TOP_Y,
            pile_pitch: PILE_PITCH,
            pile_columns: PILE_COLUMNS,
            pile_jitter: PILE_JITTER,
            revert_duration: REVERT_DURATION,
            feint_duration: FEINT_DURATION,
            settle_duration: SETTLE_DURATION,
            feint_reach: FEINT_REACH,
            feedback_hold: FEEDBACK_HOLD,
            capacity_tiers: CAPACITY_TIERS.to_vec(),
            strict_integrity: cfg!(debug_assertions),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning document
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Capacity for a container expected to hold `expected` items.
    ///
    /// Smallest tier strictly above `expected`, leaving room to over-fill so a
    /// wrong share is expressible. Past the largest tier, one spare slot;
    /// `None` if that overflows.
    pub fn capacity_for(&self, expected: usize) -> Option<usize> {
        self.capacity_tiers
            .iter()
            .copied()
            .find(|&tier| tier > expected)
            .or_else(|| expected.checked_add(1))
    }

    /// Copy with every animation collapsed to a single tick
    pub fn with_reduced_motion(mut self) -> Self {
        self.revert_duration = 0.0;
        self.feint_duration = 0.0;
        self.settle_duration = 0.0;
        self
    }
}
