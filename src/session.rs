//! Round lifecycle: question in, verdict out, next question
//!
//! `Session` wires a `RoundState` to its external collaborators. It owns
//! them, so nothing is looked up at call time.
//!
//! ## Flow
//!
//! ```text
//! Playing  -> Feedback  (round checked: verdict recorded, question consumed)
//! Feedback -> Playing   (feedback hold elapsed: next question loaded)
//! Playing  -> Playing   (integrity fault: round abandoned, next question loaded)
//! *        -> Finished  (provider exhausted)
//! ```

use std::collections::VecDeque;

use crate::error::SetupError;
use crate::question::{Question, QuestionProvider};
use crate::scoring::{ScoreSink, TrialRecord};
use crate::settings::Settings;
use crate::sim::{AnnounceKind, GameEvent, InteractionPolicy, RoundState, RoundVerdict, TickInput, tick};
use crate::tuning::Tuning;

/// Accessibility announcement sink (screen reader live region)
pub trait Announcer {
    fn announce(&mut self, text: &str);
}

/// Announcer that queues text for the host to deliver
#[derive(Debug, Clone, Default)]
pub struct AnnouncementQueue {
    queue: VecDeque<String>,
}

impl AnnouncementQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.queue.drain(..).collect()
    }
}

impl Announcer for AnnouncementQueue {
    fn announce(&mut self, text: &str) {
        self.queue.push_back(text.to_string());
    }
}

/// Where the session is between rounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SessionPhase {
    Playing,
    /// Verdict on screen; counts down to the next question
    Feedback { remaining: f32 },
    /// Provider exhausted
    Finished,
}

pub struct Session<Q, S, A> {
    state: RoundState,
    provider: Q,
    sink: S,
    announcer: A,
    settings: Settings,
    base_tuning: Tuning,
    phase: SessionPhase,
    /// Current round is the guided warm-up (not scored)
    tutorial: bool,
    /// Rounds checked or abandoned, tutorial included
    rounds_finished: u32,
    outbox: Vec<GameEvent>,
}

impl<Q, S, A> Session<Q, S, A>
where
    Q: QuestionProvider,
    S: ScoreSink,
    A: Announcer,
{
    pub fn new(
        mut provider: Q,
        sink: S,
        announcer: A,
        settings: Settings,
        tuning: Tuning,
        seed: u64,
    ) -> Result<Self, SetupError> {
        let effective = settings.effective_tuning(&tuning);
        let (question, policy, tutorial) = if settings.tutorial {
            (Question::tutorial(), Question::tutorial_policy(), true)
        } else {
            let question = provider.next_question().ok_or(SetupError::NoQuestion)?;
            (question, InteractionPolicy::open(), false)
        };
        let state = RoundState::new(question, policy, effective, seed)?;

        let mut session = Self {
            state,
            provider,
            sink,
            announcer,
            settings,
            base_tuning: tuning,
            phase: SessionPhase::Playing,
            tutorial,
            rounds_finished: 0,
            outbox: Vec::new(),
        };
        session.pump();
        Ok(session)
    }

    // === Accessors ===

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn provider(&self) -> &Q {
        &self.provider
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn announcer(&self) -> &A {
        &self.announcer
    }

    pub fn announcer_mut(&mut self) -> &mut A {
        &mut self.announcer
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_tutorial(&self) -> bool {
        self.tutorial
    }

    pub fn is_finished(&self) -> bool {
        self.phase == SessionPhase::Finished
    }

    pub fn rounds_finished(&self) -> u32 {
        self.rounds_finished
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Apply new preferences; motion changes take effect immediately
    pub fn set_settings(&mut self, settings: Settings) {
        self.state.tuning = settings.effective_tuning(&self.base_tuning);
        self.settings = settings;
    }

    // === Loop ===

    /// Advance one fixed timestep
    pub fn tick(&mut self, input: &TickInput, dt: f32) {
        match self.phase {
            SessionPhase::Finished => {}
            SessionPhase::Playing => {
                tick(&mut self.state, input, dt);
                self.pump();
            }
            SessionPhase::Feedback { remaining } => {
                // Input is closed; animations still run
                tick(&mut self.state, &TickInput::default(), dt);
                self.pump();
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    self.advance();
                } else {
                    self.phase = SessionPhase::Feedback { remaining };
                }
            }
        }
    }

    /// Route round events to the collaborators and the outbox
    fn pump(&mut self) {
        let events = self.state.drain_events();
        let mut fault = false;
        for event in &events {
            match event {
                GameEvent::Announce { kind, text } => {
                    if self.wants_announcement(*kind) {
                        self.announcer.announce(text);
                    }
                }
                GameEvent::Checked { verdict } => self.on_verdict(verdict),
                GameEvent::IntegrityViolation { .. } => fault = true,
                _ => {}
            }
        }
        self.outbox.extend(events);

        if fault && self.phase == SessionPhase::Playing {
            log::warn!("Abandoning round {} after an integrity fault", self.state.round);
            if !self.tutorial {
                let question = self.state.question.clone();
                self.provider.round_consumed(&question, false);
            }
            self.rounds_finished += 1;
            self.advance();
        }
    }

    fn wants_announcement(&self, kind: AnnounceKind) -> bool {
        let level = self.settings.announcements;
        match kind {
            AnnounceKind::Selection => level.selection(),
            AnnounceKind::Placement | AnnounceKind::Verdict | AnnounceKind::Round => {
                level.placements()
            }
        }
    }

    fn on_verdict(&mut self, verdict: &RoundVerdict) {
        self.rounds_finished += 1;
        if self.tutorial {
            log::info!("Tutorial complete");
        } else {
            let question = self.state.question.clone();
            let record = TrialRecord {
                round: self.state.round,
                question: question.text(),
                correct: verdict.is_correct(),
                response: verdict.response(),
                expected_per_container: question.expected_per_container,
            };
            self.sink.record(verdict, record);
            self.provider.round_consumed(&question, verdict.is_correct());
        }
        self.phase = SessionPhase::Feedback {
            remaining: self.state.tuning.feedback_hold,
        };
    }

    /// Load the next usable question, or finish
    fn advance(&mut self) {
        self.tutorial = false;
        while let Some(question) = self.provider.next_question() {
            match self.state.load_question(question.clone(), InteractionPolicy::open()) {
                Ok(()) => {
                    self.phase = SessionPhase::Playing;
                    self.pump();
                    return;
                }
                Err(err) => {
                    log::warn!("Skipping unplayable question: {err}");
                    self.provider.round_consumed(&question, false);
                }
            }
        }

        log::info!("Session finished after {} rounds", self.rounds_finished);
        self.phase = SessionPhase::Finished;
        if self.settings.announcements.placements() {
            self.announcer.announce("All done!");
        }
    }
}
