//! Deterministic simulation module
//!
//! The selection, drag and placement engine. This module must be pure and
//! deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (pile layout)
//! - Stable iteration order (by item and container id)
//! - No rendering or platform dependencies

pub mod animation;
pub mod container;
pub mod drag;
pub mod geometry;
pub mod item;
pub mod keyboard;
pub mod policy;
pub mod selection;
pub mod state;
pub mod tick;
pub mod validator;

#[cfg(test)]
mod scenarios;

pub use animation::{Animator, Tween, TweenKind};
pub use container::{Container, ContainerId, Rejection, SlotPlacement, slot_position};
pub use drag::{DragTransaction, nearest_container};
pub use geometry::Rect;
pub use item::{Item, ItemId, Placement};
pub use keyboard::KeyboardOutcome;
pub use policy::{GuidedStep, InteractionPolicy};
pub use selection::{Marquee, MarqueeOutcome, SelectionChange, SelectionSet};
pub use state::{
    AnnounceKind, GameEvent, InteractionPhase, Modality, Proposal, Resolution, RoundState,
    container_metrics,
};
pub use tick::{Activation, PointerEvent, TickInput, tick};
pub use validator::{ContainerVerdict, RoundVerdict, Verdict, validate};
