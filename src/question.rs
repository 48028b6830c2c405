//! Question data and the provider seam
//!
//! A question is "share `container_count * expected_per_container` items
//! equally among `container_count` containers". Where questions come from
//! (a curriculum service, a fixed script, a seeded generator) is behind
//! `QuestionProvider`.

use std::collections::VecDeque;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::sim::{ContainerId, GuidedStep, InteractionPolicy};
use crate::tuning::Tuning;

/// What the items look like; cosmetic and for prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ItemKind {
    #[default]
    Apple,
    Cookie,
    Strawberry,
    Carrot,
    Fish,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Apple,
        ItemKind::Cookie,
        ItemKind::Strawberry,
        ItemKind::Carrot,
        ItemKind::Fish,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Apple => "Apple",
            ItemKind::Cookie => "Cookie",
            ItemKind::Strawberry => "Strawberry",
            ItemKind::Carrot => "Carrot",
            ItemKind::Fish => "Fish",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "apple" | "apples" => Some(ItemKind::Apple),
            "cookie" | "cookies" => Some(ItemKind::Cookie),
            "strawberry" | "strawberries" => Some(ItemKind::Strawberry),
            "carrot" | "carrots" => Some(ItemKind::Carrot),
            "fish" => Some(ItemKind::Fish),
            _ => None,
        }
    }

    /// Lowercase noun for `count` items
    pub fn noun(&self, count: usize) -> &'static str {
        let one = count == 1;
        match self {
            ItemKind::Apple => if one { "apple" } else { "apples" },
            ItemKind::Cookie => if one { "cookie" } else { "cookies" },
            ItemKind::Strawberry => if one { "strawberry" } else { "strawberries" },
            ItemKind::Carrot => if one { "carrot" } else { "carrots" },
            ItemKind::Fish => "fish",
        }
    }
}

/// One division problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub container_count: usize,
    pub expected_per_container: usize,
    pub item_kind: ItemKind,
    /// Per-container capacity; derived from the tuning tiers when absent
    #[serde(default)]
    pub capacity: Option<usize>,
}

impl Question {
    pub fn new(container_count: usize, expected_per_container: usize, item_kind: ItemKind) -> Self {
        Self {
            container_count,
            expected_per_container,
            item_kind,
            capacity: None,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Total items in the pile, saturating
    pub fn item_count(&self) -> usize {
        self.container_count.saturating_mul(self.expected_per_container)
    }

    /// Total items in the pile, `None` on overflow
    pub fn checked_item_count(&self) -> Option<usize> {
        self.container_count.checked_mul(self.expected_per_container)
    }

    /// Explicit capacity, else the tuning tier; `None` if the tier overflows
    pub fn capacity(&self, tuning: &Tuning) -> Option<usize> {
        match self.capacity {
            Some(capacity) => Some(capacity),
            None => tuning.capacity_for(self.expected_per_container),
        }
    }

    /// Learner-facing prompt
    pub fn text(&self) -> String {
        let items = self.item_count();
        let plates = if self.container_count == 1 { "plate" } else { "plates" };
        format!(
            "Share {items} {} equally among {} {plates}.",
            self.item_kind.noun(items),
            self.container_count
        )
    }

    /// The guided warm-up: two plates, two items each
    pub fn tutorial() -> Self {
        Self::new(2, 2, ItemKind::Apple)
    }

    /// Policy paired with `tutorial()`: two at a time, left plate first
    pub fn tutorial_policy() -> InteractionPolicy {
        InteractionPolicy::guided(
            2,
            vec![
                GuidedStep { container: ContainerId(0), fill_to: 2 },
                GuidedStep { container: ContainerId(1), fill_to: 2 },
            ],
        )
    }
}

/// Source of questions for a session
pub trait QuestionProvider {
    /// Next question, or `None` when the set is exhausted
    fn next_question(&mut self) -> Option<Question>;

    /// The learner finished `question` (checked, or abandoned after an engine fault)
    fn round_consumed(&mut self, question: &Question, correct: bool);
}

/// Seeded generator drawing from inclusive ranges
#[derive(Debug, Clone)]
pub struct RandomQuestionProvider {
    rng: Pcg32,
    containers: (usize, usize),
    per_container: (usize, usize),
    limit: Option<u32>,
    consumed: u32,
    correct: u32,
}

impl RandomQuestionProvider {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            containers: (2, 4),
            per_container: (2, 5),
            limit: None,
            consumed: 0,
            correct: 0,
        }
    }

    /// Container count and share ranges (inclusive); bounds are reordered and clamped to 1
    pub fn with_ranges(mut self, containers: (usize, usize), per_container: (usize, usize)) -> Self {
        let order = |(a, b): (usize, usize)| (a.min(b).max(1), a.max(b).max(1));
        self.containers = order(containers);
        self.per_container = order(per_container);
        self
    }

    /// Stop after `n` consumed rounds
    pub fn with_limit(mut self, n: u32) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn consumed(&self) -> u32 {
        self.consumed
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }
}

impl QuestionProvider for RandomQuestionProvider {
    fn next_question(&mut self) -> Option<Question> {
        if self.limit.is_some_and(|n| self.consumed >= n) {
            return None;
        }
        let containers = self.rng.random_range(self.containers.0..=self.containers.1);
        let per = self.rng.random_range(self.per_container.0..=self.per_container.1);
        let kind = ItemKind::ALL[self.rng.random_range(0..ItemKind::ALL.len())];
        Some(Question::new(containers, per, kind))
    }

    fn round_consumed(&mut self, _question: &Question, correct: bool) {
        self.consumed += 1;
        if correct {
            self.correct += 1;
        }
    }
}

/// Fixed list, served in order
#[derive(Debug, Clone, Default)]
pub struct ScriptedQuestions {
    queue: VecDeque<Question>,
    consumed: Vec<(Question, bool)>,
}

impl ScriptedQuestions {
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Self {
        Self {
            queue: questions.into_iter().collect(),
            consumed: Vec::new(),
        }
    }

    /// Questions finished so far, with their outcome
    pub fn consumed(&self) -> &[(Question, bool)] {
        &self.consumed
    }
}

impl QuestionProvider for ScriptedQuestions {
    fn next_question(&mut self) -> Option<Question> {
        self.queue.pop_front()
    }

    fn round_consumed(&mut self, question: &Question, correct: bool) {
        self.consumed.push((question.clone(), correct));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_text() {
        assert_eq!(
            Question::new(3, 4, ItemKind::Apple).text(),
            "Share 12 apples equally among 3 plates."
        );
        assert_eq!(
            Question::new(1, 1, ItemKind::Strawberry).text(),
            "Share 1 strawberry equally among 1 plate."
        );
    }

    #[test]
    fn test_capacity_explicit_or_tiered() {
        let tuning = Tuning::default();
        assert_eq!(Question::new(2, 2, ItemKind::Fish).capacity(&tuning), Some(3));
        assert_eq!(Question::new(2, 2, ItemKind::Fish).with_capacity(2).capacity(&tuning), Some(2));
        assert_eq!(Question::new(1, usize::MAX, ItemKind::Fish).capacity(&tuning), None);
    }

    #[test]
    fn test_item_count_never_overflows() {
        let q = Question::new(usize::MAX, 2, ItemKind::Apple);
        assert_eq!(q.checked_item_count(), None);
        assert_eq!(q.item_count(), usize::MAX);
        assert_eq!(Question::new(3, 4, ItemKind::Apple).checked_item_count(), Some(12));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!(ItemKind::parse("Cookies"), Some(ItemKind::Cookie));
        assert_eq!(ItemKind::parse("pebble"), None);
        for kind in ItemKind::ALL {
            assert_eq!(ItemKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_question_json_capacity_optional() {
        let q: Question = serde_json::from_str(
            r#"{"container_count":3,"expected_per_container":2,"item_kind":"Carrot"}"#,
        )
        .expect("valid json");
        assert_eq!(q.capacity, None);
        assert_eq!(q.item_count(), 6);
    }

    #[test]
    fn test_random_provider_is_seeded_and_in_range() {
        let mut a = RandomQuestionProvider::new(42).with_ranges((2, 3), (4, 2));
        let mut b = RandomQuestionProvider::new(42).with_ranges((2, 3), (4, 2));
        for _ in 0..50 {
            let qa = a.next_question().expect("unlimited");
            let qb = b.next_question().expect("unlimited");
            assert_eq!(qa, qb);
            assert!((2..=3).contains(&qa.container_count));
            assert!((2..=4).contains(&qa.expected_per_container));
        }
    }

    #[test]
    fn test_random_provider_limit() {
        let mut p = RandomQuestionProvider::new(1).with_limit(2);
        let q = p.next_question().expect("first");
        p.round_consumed(&q, true);
        let q = p.next_question().expect("second");
        p.round_consumed(&q, false);
        assert!(p.next_question().is_none());
        assert_eq!(p.consumed(), 2);
        assert_eq!(p.correct(), 1);
    }

    #[test]
    fn test_scripted_order() {
        let mut p = ScriptedQuestions::new([
            Question::new(2, 2, ItemKind::Apple),
            Question::new(3, 1, ItemKind::Fish),
        ]);
        assert_eq!(p.next_question().map(|q| q.container_count), Some(2));
        assert_eq!(p.next_question().map(|q| q.container_count), Some(3));
        assert!(p.next_question().is_none());
    }
}
