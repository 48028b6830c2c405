//! Fixed timestep simulation tick
//!
//! Applies one tick's worth of queued input to the round in a fixed order,
//! then advances animations.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::container::ContainerId;
use super::item::ItemId;
use super::state::RoundState;

/// Raw pointer input, in arena coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(Vec2),
    Move(Vec2),
    Up(Vec2),
    /// Capture lost or window blurred
    Cancel,
}

/// Discrete accessible activation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Activation {
    Item(ItemId),
    Container(ContainerId),
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TickInput {
    /// Pointer events in arrival order
    pub pointer: Vec<PointerEvent>,
    /// Keyboard/switch activations in arrival order
    pub activations: Vec<Activation>,
    /// Check the round
    pub check: bool,
    /// Clear every placement
    pub reset: bool,
}

impl TickInput {
    pub fn is_empty(&self) -> bool {
        self.pointer.is_empty() && self.activations.is_empty() && !self.check && !self.reset
    }
}

/// Advance the round by one fixed timestep
pub fn tick(state: &mut RoundState, input: &TickInput, dt: f32) {
    if input.reset {
        state.reset();
    }

    for event in &input.pointer {
        match *event {
            PointerEvent::Down(p) => state.pointer_down(p),
            PointerEvent::Move(p) => state.pointer_move(p),
            PointerEvent::Up(p) => state.pointer_up(p),
            PointerEvent::Cancel => state.pointer_cancel(),
        }
    }

    for activation in &input.activations {
        match *activation {
            Activation::Item(id) => {
                state.activate_item(id);
            }
            Activation::Container(id) => {
                state.activate_container(id);
            }
        }
    }

    if input.check {
        // Outcome is reported through events; refusals are only logged
        if let Err(err) = state.check() {
            log::warn!("Check refused: {err}");
        }
    }

    state.advance_animations(dt);
    state.time_ticks += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::question::{ItemKind, Question};
    use crate::sim::policy::InteractionPolicy;
    use crate::sim::state::GameEvent;
    use crate::tuning::Tuning;

    fn state(seed: u64) -> RoundState {
        let tuning = Tuning {
            strict_integrity: false,
            ..Default::default()
        };
        RoundState::new(
            Question::new(2, 2, ItemKind::Strawberry).with_capacity(2),
            InteractionPolicy::open(),
            tuning,
            seed,
        )
        .expect("valid question")
    }

    #[test]
    fn test_tick_counts() {
        let mut s = state(1);
        tick(&mut s, &TickInput::default(), SIM_DT);
        tick(&mut s, &TickInput::default(), SIM_DT);
        assert_eq!(s.time_ticks, 2);
    }

    #[test]
    fn test_activations_then_check() {
        let mut s = state(1);
        let input = TickInput {
            activations: vec![
                Activation::Item(ItemId(0)),
                Activation::Item(ItemId(1)),
                Activation::Container(ContainerId(0)),
                Activation::Item(ItemId(2)),
                Activation::Item(ItemId(3)),
                Activation::Container(ContainerId(1)),
            ],
            check: true,
            ..Default::default()
        };
        tick(&mut s, &input, SIM_DT);
        assert!(s.verdict.as_ref().is_some_and(|v| v.is_correct()));
    }

    #[test]
    fn test_reset_runs_before_input() {
        let mut s = state(1);
        let commit = TickInput {
            activations: vec![Activation::Item(ItemId(0)), Activation::Container(ContainerId(0))],
            ..Default::default()
        };
        tick(&mut s, &commit, SIM_DT);
        assert_eq!(s.placed_count(), 1);

        let reset_and_commit = TickInput {
            reset: true,
            ..commit.clone()
        };
        tick(&mut s, &reset_and_commit, SIM_DT);
        assert_eq!(s.containers[0].assigned, vec![ItemId(0)]);
    }

    #[test]
    fn test_pointer_drag_over_ticks() {
        let mut s = state(4);
        let start = s.items[0].pos;
        let target = s.containers[1].center;

        tick(
            &mut s,
            &TickInput {
                pointer: vec![PointerEvent::Down(start), PointerEvent::Move(start + Vec2::new(0.0, -30.0))],
                ..Default::default()
            },
            SIM_DT,
        );
        assert!(s.phase.is_dragging());
        tick(
            &mut s,
            &TickInput {
                pointer: vec![PointerEvent::Move(target), PointerEvent::Up(target)],
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(s.containers[1].assigned, vec![ItemId(0)]);
        assert!(s.drain_events().iter().any(|e| matches!(e, GameEvent::Placed { .. })));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed and inputs end identically
        let mut a = state(99);
        let mut b = state(99);
        let p = a.items[1].pos;
        let inputs = [
            TickInput {
                pointer: vec![PointerEvent::Down(Vec2::new(10.0, 300.0))],
                ..Default::default()
            },
            TickInput {
                pointer: vec![PointerEvent::Move(Vec2::new(1000.0, 760.0)), PointerEvent::Up(Vec2::new(1000.0, 760.0))],
                ..Default::default()
            },
            TickInput {
                pointer: vec![PointerEvent::Down(p), PointerEvent::Move(Vec2::new(5.0, 5.0)), PointerEvent::Up(Vec2::new(5.0, 5.0))],
                ..Default::default()
            },
            TickInput::default(),
            TickInput {
                activations: vec![Activation::Container(ContainerId(0))],
                ..Default::default()
            },
        ];

        for input in &inputs {
            tick(&mut a, input, SIM_DT);
            tick(&mut b, input, SIM_DT);
        }

        let pos_a: Vec<Vec2> = a.items.iter().map(|i| i.pos).collect();
        let pos_b: Vec<Vec2> = b.items.iter().map(|i| i.pos).collect();
        assert_eq!(pos_a, pos_b);
        assert_eq!(a.counts(), b.counts());
        assert_eq!(a.drain_events(), b.drain_events());
    }
}
