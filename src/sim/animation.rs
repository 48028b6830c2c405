//! Tween bookkeeping for revert, feint and settle motions
//!
//! Tweens run on the simulation tick. The host may mirror them from the
//! `TweenStarted` events or simply read item positions each frame. A tween's
//! completion is the only point where a reverted or feinted item becomes
//! interactive again.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::container::ContainerId;
use super::item::ItemId;
use crate::{ease_out_cubic, out_and_back};

/// What a tween is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TweenKind {
    /// Back to the pile after an abandoned or rejected drop
    Revert,
    /// Toward a container and back (keyboard rejection)
    Feint { container: ContainerId },
    /// Into a committed slot
    Settle,
}

/// One item's motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tween {
    pub item: ItemId,
    pub kind: TweenKind,
    pub from: Vec2,
    pub to: Vec2,
    /// Turnaround point for feints; equal to `to` otherwise
    pub peak: Vec2,
    pub duration: f32,
    pub elapsed: f32,
    /// Round generation that started it
    pub round: u64,
}

impl Tween {
    pub fn linear(item: ItemId, kind: TweenKind, from: Vec2, to: Vec2, duration: f32, round: u64) -> Self {
        Self {
            item,
            kind,
            from,
            to,
            peak: to,
            duration,
            elapsed: 0.0,
            round,
        }
    }

    pub fn feint(
        item: ItemId,
        container: ContainerId,
        home: Vec2,
        peak: Vec2,
        duration: f32,
        round: u64,
    ) -> Self {
        Self {
            item,
            kind: TweenKind::Feint { container },
            from: home,
            to: home,
            peak,
            duration,
            elapsed: 0.0,
            round,
        }
    }

    /// Normalized time in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    pub fn is_done(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Position at the current time
    pub fn position(&self) -> Vec2 {
        let t = self.progress();
        if t >= 1.0 {
            return self.to;
        }
        match self.kind {
            TweenKind::Feint { .. } => self.from + (self.peak - self.from) * out_and_back(t),
            TweenKind::Revert | TweenKind::Settle => self.from.lerp(self.to, ease_out_cubic(t)),
        }
    }
}

/// Result of one animation step
#[derive(Debug, Default)]
pub struct AnimationStep {
    /// Positions of tweens still running
    pub moved: Vec<(ItemId, Vec2)>,
    /// Tweens that reached their end this step
    pub finished: Vec<Tween>,
}

/// Active tweens, at most one per item
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Animator {
    tweens: Vec<Tween>,
}

impl Animator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a tween, replacing any running one for the same item
    pub fn start(&mut self, tween: Tween) {
        self.tweens.retain(|t| t.item != tween.item);
        self.tweens.push(tween);
    }

    pub fn is_animating(&self, item: ItemId) -> bool {
        self.tweens.iter().any(|t| t.item == item)
    }

    pub fn len(&self) -> usize {
        self.tweens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tweens.is_empty()
    }

    pub fn tweens(&self) -> &[Tween] {
        &self.tweens
    }

    /// Advance every tween by `dt`
    pub fn advance(&mut self, dt: f32) -> AnimationStep {
        let mut step = AnimationStep::default();
        for tween in &mut self.tweens {
            tween.elapsed += dt;
        }
        let (finished, running): (Vec<Tween>, Vec<Tween>) =
            self.tweens.drain(..).partition(Tween::is_done);
        step.moved = running.iter().map(|t| (t.item, t.position())).collect();
        self.tweens = running;
        step.finished = finished;
        step
    }

    /// Drop every pending tween without running completions. Returns how many.
    pub fn cancel_all(&mut self) -> usize {
        let n = self.tweens.len();
        self.tweens.clear();
        n
    }
}
