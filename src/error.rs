//! Error types for round setup, checking and integrity auditing
//!
//! Recoverable placement outcomes (a full container, a denied drop, an empty
//! selection, a wrong answer) are not errors; they are plain values in `sim`.
//! Everything here is either a bad setup or an engine bug.

use thiserror::Error;

use crate::sim::{ContainerId, ItemId};

/// A question that cannot be turned into a playable round
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    /// Nothing to distribute into
    #[error("question has no containers")]
    NoContainers,

    /// Capacity cannot hold the expected share
    #[error("container capacity {capacity} is below the expected count {expected}")]
    CapacityTooSmall { capacity: usize, expected: usize },

    /// The pile would be larger than a round can lay out
    #[error("{containers} containers x {per_container} items exceeds the {max} item limit")]
    TooManyItems {
        containers: usize,
        per_container: usize,
        max: usize,
    },

    /// No capacity tier fits and one spare slot overflows
    #[error("no container capacity can hold {expected} items")]
    CapacityOverflow { expected: usize },

    /// The provider had nothing to start a session with
    #[error("question provider returned no question")]
    NoQuestion,

    /// Guided policy names a container the round does not have
    #[error("guided step refers to container {container}, round has {count}")]
    UnknownGuidedContainer { container: ContainerId, count: usize },
}

/// A broken engine invariant. Never produced by user input alone.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntegrityError {
    /// Free plus placed items no longer adds up to the round's item count
    #[error("item count not conserved: {free} free + {placed} placed != {expected}")]
    ConservationViolated {
        free: usize,
        placed: usize,
        expected: usize,
    },

    /// An item listed in a container still claims to be free
    #[error("item {item} is free but listed in container {container}")]
    FreeItemInContainer { item: ItemId, container: ContainerId },

    /// An item listed in more than one container
    #[error("item {item} is listed in containers {first} and {second}")]
    DuplicatePlacement {
        item: ItemId,
        first: ContainerId,
        second: ContainerId,
    },

    /// An item whose placement names a container that does not list it
    #[error("item {item} is assigned to container {container} but not listed there")]
    PlacementMismatch { item: ItemId, container: ContainerId },

    /// A container holding more than its capacity
    #[error("container {container} holds {held} items, capacity {capacity}")]
    OverCapacity {
        container: ContainerId,
        held: usize,
        capacity: usize,
    },

    /// A placed item that is still selected
    #[error("item {item} is selected while placed")]
    SelectedWhilePlaced { item: ItemId },
}

/// Why a "check" trigger produced no verdict
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// A marquee or drag is in progress
    #[error("cannot check while an interaction is in progress")]
    Busy,

    /// The round was already checked
    #[error("round already checked")]
    AlreadyChecked,

    /// Counts are not trustworthy
    #[error(transparent)]
    Integrity(#[from] IntegrityError),
}
