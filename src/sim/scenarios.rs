//! End-to-end scenarios and property tests across both input paths

use glam::Vec2;
use proptest::prelude::*;

use super::*;
use crate::question::{ItemKind, Question};
use crate::tuning::Tuning;

fn tuning() -> Tuning {
    Tuning {
        strict_integrity: false,
        ..Default::default()
    }
}

fn round(question: Question, policy: InteractionPolicy) -> RoundState {
    RoundState::new(question, policy, tuning(), 2024).expect("valid question")
}

/// Pointer path: click-select `ids`, then drag the group onto `target`
fn pointer_place(s: &mut RoundState, ids: &[u32], target: ContainerId) {
    for &id in ids {
        let p = s.items[id as usize].pos;
        s.pointer_down(p);
        s.pointer_up(p);
    }
    let Some(&first) = ids.first() else {
        return;
    };
    let start = s.items[first as usize].pos;
    let drop = s.containers[target.index()].center;
    s.pointer_down(start);
    s.pointer_move(start + Vec2::new(0.0, -20.0));
    s.pointer_move(drop);
    s.pointer_up(drop);
}

/// Pointer path: sweep a marquee from `from` to `to`, then drag whatever it
/// caught onto `target`. Returns the swept ids in selection order.
fn marquee_place(s: &mut RoundState, from: Vec2, to: Vec2, target: ContainerId) -> Vec<u32> {
    s.pointer_down(from);
    s.pointer_move(to);
    s.pointer_up(to);
    let ids: Vec<u32> = s.selection.items().iter().map(|id| id.0).collect();
    if let Some(&first) = ids.first() {
        let start = s.items[first as usize].pos;
        let drop = s.containers[target.index()].center;
        s.pointer_down(start);
        s.pointer_move(start + Vec2::new(0.0, -20.0));
        s.pointer_move(drop);
        s.pointer_up(drop);
    }
    ids
}

/// Keyboard path: activate `ids`, then the container
fn keyboard_place(s: &mut RoundState, ids: &[u32], target: ContainerId) {
    for &id in ids {
        s.activate_item(ItemId(id));
    }
    s.activate_container(target);
}

/// Let every pending tween finish
fn settle(s: &mut RoundState) {
    s.advance_animations(10.0);
}

fn assigned(s: &RoundState) -> Vec<Vec<ItemId>> {
    s.containers.iter().map(|c| c.assigned.clone()).collect()
}

#[test]
fn scenario_a_even_split_is_correct() {
    let mut s = round(Question::new(2, 2, ItemKind::Apple).with_capacity(2), InteractionPolicy::open());

    pointer_place(&mut s, &[0, 1], ContainerId(0));
    assert_eq!(s.containers[0].assigned, vec![ItemId(0), ItemId(1)]);
    pointer_place(&mut s, &[2, 3], ContainerId(1));
    assert_eq!(s.containers[1].assigned, vec![ItemId(2), ItemId(3)]);

    let verdict = s.check().expect("verdict");
    assert_eq!(verdict.aggregate, Verdict::Correct);
}

#[test]
fn scenario_b_full_container_rejects_and_reverts() {
    let mut s = round(Question::new(2, 2, ItemKind::Apple).with_capacity(2), InteractionPolicy::open());
    pointer_place(&mut s, &[0, 1], ContainerId(0));

    pointer_place(&mut s, &[2], ContainerId(0));
    assert_eq!(s.containers[0].assigned, vec![ItemId(0), ItemId(1)]);
    assert!(s.items[2].is_free());
    assert!(
        s.events()
            .iter()
            .any(|e| matches!(e, GameEvent::DropRejected { container: ContainerId(0), .. }))
    );

    settle(&mut s);
    assert_eq!(s.items[2].pos, s.items[2].home);
    assert!(s.items[2].is_interactive());
}

#[test]
fn scenario_c_guided_cap_ignores_third_selection() {
    let policy = InteractionPolicy::guided(
        2,
        vec![GuidedStep {
            container: ContainerId(0),
            fill_to: 2,
        }],
    );
    let mut s = round(Question::new(2, 2, ItemKind::Cookie), policy);

    s.activate_item(ItemId(0));
    s.activate_item(ItemId(1));
    assert_eq!(s.activate_item(ItemId(2)), SelectionChange::Ignored);
    assert_eq!(s.selection.len(), 2);

    // The pointer path honors the same cap
    let p = s.items[3].pos;
    s.pointer_down(p);
    s.pointer_up(p);
    assert_eq!(s.selection.len(), 2);
    assert!(!s.items[3].selected);

    // And the guided order: the other plate is refused
    assert!(matches!(
        s.activate_container(ContainerId(1)),
        KeyboardOutcome::Resolved(Resolution::Rejected {
            reason: Rejection::PolicyDenied,
            ..
        })
    ));
}

#[test]
fn scenario_d_uneven_split_then_clean_reset() {
    // Capacity comes from the tiers (5) so that a container can hold 4
    let mut s = round(Question::new(3, 3, ItemKind::Strawberry), InteractionPolicy::open());
    assert!(s.containers.iter().all(|c| c.capacity >= 4));

    keyboard_place(&mut s, &[0, 1], ContainerId(0));
    keyboard_place(&mut s, &[2, 3, 4], ContainerId(1));
    keyboard_place(&mut s, &[5, 6, 7, 8], ContainerId(2));

    let verdict = s.check().expect("verdict");
    let per: Vec<Verdict> = verdict.containers.iter().map(|c| c.verdict).collect();
    assert_eq!(per, vec![Verdict::Incorrect, Verdict::Correct, Verdict::Incorrect]);
    assert_eq!(verdict.aggregate, Verdict::Incorrect);

    let feedback: Vec<bool> = s
        .events()
        .iter()
        .filter_map(|e| match e {
            GameEvent::ContainerFeedback { correct, .. } => Some(*correct),
            _ => None,
        })
        .collect();
    assert_eq!(feedback, vec![false, true, false]);

    s.load_question(Question::new(3, 3, ItemKind::Strawberry), InteractionPolicy::open())
        .expect("valid question");
    assert!(s.containers.iter().all(|c| c.assigned.is_empty()));
    assert!(s.items.iter().all(|i| i.is_free() && !i.selected && !i.dragging));
    assert!(!s.is_checked());
    assert!(s.audit().is_ok());
}

#[test]
fn reset_mid_drag_leaves_nothing_behind() {
    let mut s = round(Question::new(2, 3, ItemKind::Fish), InteractionPolicy::open());
    keyboard_place(&mut s, &[0, 1], ContainerId(0));

    let start = s.items[2].pos;
    s.pointer_down(start);
    s.pointer_move(s.containers[1].center);
    assert!(s.phase.is_dragging());
    assert!(s.containers[1].hovered);

    s.reset();
    assert!(s.phase.is_idle());
    assert!(s.animator.is_empty());
    assert!(s.containers.iter().all(|c| c.assigned.is_empty() && !c.hovered));
    assert!(s.items.iter().all(|i| i.pos == i.home && i.is_interactive()));

    // A late release from the cancelled gesture changes nothing
    s.pointer_up(s.containers[1].center);
    assert_eq!(s.placed_count(), 0);
}

#[test]
fn reset_mid_feint_does_not_resurrect_lock() {
    let mut s = round(Question::new(2, 1, ItemKind::Carrot).with_capacity(1), InteractionPolicy::open());
    keyboard_place(&mut s, &[0], ContainerId(0));
    keyboard_place(&mut s, &[1], ContainerId(0));
    assert!(s.items[1].dragging);

    s.reset();
    settle(&mut s);
    assert!(s.items.iter().all(|i| !i.dragging && i.pos == i.home));
}

/// Operations a learner can perform, by index into the round
#[derive(Debug, Clone)]
enum Op {
    KeyItem(u32),
    KeyContainer(u32),
    Drag { grab: u32, to: u32 },
    Marquee { from: (f32, f32), to: (f32, f32) },
    DropNowhere(u32),
    Tick,
    Reset,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u32..12).prop_map(Op::KeyItem),
        2 => (0u32..4).prop_map(Op::KeyContainer),
        2 => (0u32..12, 0u32..4).prop_map(|(grab, to)| Op::Drag { grab, to }),
        1 => ((0f32..1024.0, 300f32..768.0), (0f32..1024.0, 300f32..768.0))
            .prop_map(|(from, to)| Op::Marquee { from, to }),
        1 => (0u32..12).prop_map(Op::DropNowhere),
        2 => Just(Op::Tick),
        1 => Just(Op::Reset),
    ]
}

fn apply(s: &mut RoundState, op: &Op) {
    let items = s.items.len() as u32;
    let containers = s.containers.len() as u32;
    match *op {
        Op::KeyItem(i) => {
            s.activate_item(ItemId(i % items));
        }
        Op::KeyContainer(c) => {
            s.activate_container(ContainerId(c % containers));
        }
        Op::Drag { grab, to } => {
            let start = s.items[(grab % items) as usize].pos;
            let drop = s.containers[(to % containers) as usize].center;
            s.pointer_down(start);
            s.pointer_move(start + Vec2::new(0.0, -20.0));
            s.pointer_move(drop);
            s.pointer_up(drop);
        }
        Op::Marquee { from, to } => {
            s.pointer_down(Vec2::from(from));
            s.pointer_move(Vec2::from(to));
            s.pointer_up(Vec2::from(to));
        }
        Op::DropNowhere(i) => {
            let start = s.items[(i % items) as usize].pos;
            s.pointer_down(start);
            s.pointer_move(Vec2::new(1000.0, 700.0));
            s.pointer_up(Vec2::new(1000.0, 700.0));
        }
        Op::Tick => s.advance_animations(crate::consts::SIM_DT * 10.0),
        Op::Reset => s.reset(),
    }
}

proptest! {
    #[test]
    fn prop_invariants_hold_under_any_input(
        containers in 2usize..4,
        per in 1usize..4,
        ops in prop::collection::vec(op(), 0..60),
    ) {
        let mut s = round(Question::new(containers, per, ItemKind::Apple), InteractionPolicy::open());
        for op in &ops {
            apply(&mut s, op);
            prop_assert!(s.audit().is_ok(), "after {:?}: {:?}", op, s.audit());
            prop_assert_eq!(s.free_count() + s.placed_count(), s.question.item_count());
            for c in &s.containers {
                prop_assert!(c.held() <= c.capacity);
            }
            // Selection holds only free items, each flagged
            for &id in s.selection.items() {
                prop_assert!(s.items[id.index()].is_free());
                prop_assert!(s.items[id.index()].selected);
            }
            prop_assert_eq!(
                s.items.iter().filter(|i| i.selected).count(),
                s.selection.len()
            );
        }
    }

    #[test]
    fn prop_rejection_is_idempotent(attempts in 1usize..20, use_pointer in any::<bool>()) {
        let mut s = round(Question::new(2, 2, ItemKind::Apple).with_capacity(2), InteractionPolicy::open());
        keyboard_place(&mut s, &[0, 1], ContainerId(0));

        for _ in 0..attempts {
            if use_pointer {
                pointer_place(&mut s, &[2], ContainerId(0));
            } else {
                if !s.selection.contains(ItemId(2)) {
                    s.activate_item(ItemId(2));
                }
                s.activate_container(ContainerId(0));
            }
            prop_assert_eq!(s.containers[0].assigned.len(), 2);
            settle(&mut s);
        }
        prop_assert!(s.items[2].is_free());
    }

    #[test]
    fn prop_pointer_and_keyboard_agree(
        containers in 2usize..4,
        per in 1usize..4,
        plan in prop::collection::vec((1usize..4, 0u32..4), 1..6),
    ) {
        let question = Question::new(containers, per, ItemKind::Cookie);
        let mut by_pointer = round(question.clone(), InteractionPolicy::open());
        let mut by_keyboard = round(question, InteractionPolicy::open());

        // Hand out consecutive item ids in groups, as long as items remain
        let mut next = 0u32;
        let total = by_pointer.items.len() as u32;
        for &(k, target) in &plan {
            let k = k as u32;
            if next + k > total {
                break;
            }
            let ids: Vec<u32> = (next..next + k).collect();
            let target = ContainerId(target % containers as u32);
            pointer_place(&mut by_pointer, &ids, target);
            keyboard_place(&mut by_keyboard, &ids, target);
            settle(&mut by_pointer);
            settle(&mut by_keyboard);

            // Rejected groups stay selected on both sides; drop them before the next group
            by_pointer.selection.clear(&mut by_pointer.items);
            by_keyboard.selection.clear(&mut by_keyboard.items);
            if by_pointer.items[next as usize].is_free() {
                continue;
            }
            next += k;
        }

        prop_assert_eq!(assigned(&by_pointer), assigned(&by_keyboard));
        let vp = by_pointer.check();
        let vk = by_keyboard.check();
        prop_assert_eq!(vp, vk);
    }

    #[test]
    fn prop_marquee_and_keyboard_agree(
        containers in 2usize..4,
        per in 1usize..4,
        sweeps in prop::collection::vec(((0f32..1024.0, 0f32..1024.0, 470f32..700.0), 0u32..4), 1..6),
    ) {
        let question = Question::new(containers, per, ItemKind::Strawberry);
        let mut by_marquee = round(question.clone(), InteractionPolicy::open());
        let mut by_keyboard = round(question, InteractionPolicy::open());
        // Empty space between the container row and the top of the pile
        let above_pile = by_marquee.tuning.pile_top_y - 50.0;

        for &((x0, x1, y1), target) in &sweeps {
            let target = ContainerId(target % containers as u32);
            let ids = marquee_place(
                &mut by_marquee,
                Vec2::new(x0, above_pile),
                Vec2::new(x1, y1),
                target,
            );
            if ids.is_empty() {
                continue;
            }
            keyboard_place(&mut by_keyboard, &ids, target);
            settle(&mut by_marquee);
            settle(&mut by_keyboard);
            by_marquee.selection.clear(&mut by_marquee.items);
            by_keyboard.selection.clear(&mut by_keyboard.items);
            prop_assert_eq!(assigned(&by_marquee), assigned(&by_keyboard));
        }

        prop_assert_eq!(by_marquee.check(), by_keyboard.check());
    }
}
