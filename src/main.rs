//! Fair Share entry point
//!
//! On the web the library's `platform::web` module is the entry point. The
//! native binary plays a few scripted rounds through both input paths and
//! logs what happens, which is handy for eyeballing tuning changes.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Fair Share (native) starting...");

    let tuning = match std::env::args().nth(1) {
        Some(path) => match load_tuning(&path) {
            Ok(tuning) => tuning,
            Err(err) => {
                log::error!("Could not load tuning from {path}: {err}");
                std::process::exit(1);
            }
        },
        None => fair_share::Tuning::default(),
    };

    if let Err(err) = demo::run(tuning) {
        log::error!("Demo aborted: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: &str) -> Result<fair_share::Tuning, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(fair_share::Tuning::from_json(&json)?)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use fair_share::consts::SIM_DT;
    use fair_share::sim::{Activation, ContainerId, GameEvent, ItemId, PointerEvent, TickInput};
    use fair_share::{
        AnnouncementQueue, ItemKind, Question, ScriptedQuestions, Session, SetupError, Settings,
        TrialLog, Tuning,
    };

    type DemoSession = Session<ScriptedQuestions, TrialLog, AnnouncementQueue>;

    pub fn run(tuning: Tuning) -> Result<(), SetupError> {
        let questions = vec![
            Question::new(2, 2, ItemKind::Apple),
            Question::new(3, 3, ItemKind::Strawberry),
        ];
        let settings = Settings {
            tutorial: true,
            ..Default::default()
        };
        let mut session = Session::new(
            ScriptedQuestions::new(questions),
            TrialLog::new(),
            AnnouncementQueue::new(),
            settings,
            tuning,
            7,
        )?;

        // Tutorial: two at a time by keyboard, left plate first
        keyboard(&mut session, &[0, 1], 0);
        keyboard(&mut session, &[2, 3], 1);
        check_and_advance(&mut session);

        // Even split by pointer
        pointer(&mut session, &[0, 1], 0);
        pointer(&mut session, &[2, 3], 1);
        check_and_advance(&mut session);

        // Uneven split, mixing paths
        keyboard(&mut session, &[0, 1], 0);
        pointer(&mut session, &[2, 3, 4], 1);
        keyboard(&mut session, &[5, 6, 7, 8], 2);
        check_and_advance(&mut session);

        let log = session.sink();
        log::info!(
            "Finished: {} trials, accuracy {:.0}%, best streak {}",
            log.len(),
            log.accuracy().unwrap_or(0.0) * 100.0,
            log.best_streak
        );
        match log.to_json() {
            Ok(json) => log::info!("Trial log: {json}"),
            Err(err) => log::warn!("Trial log export failed: {err}"),
        }
        Ok(())
    }

    fn step(session: &mut DemoSession, input: TickInput) {
        session.tick(&input, SIM_DT);
        // Let tweens play out
        for _ in 0..60 {
            session.tick(&TickInput::default(), SIM_DT);
        }
        report(session);
    }

    fn keyboard(session: &mut DemoSession, ids: &[u32], container: u32) {
        let mut activations: Vec<Activation> = ids.iter().map(|&id| Activation::Item(ItemId(id))).collect();
        activations.push(Activation::Container(ContainerId(container)));
        step(
            session,
            TickInput {
                activations,
                ..Default::default()
            },
        );
    }

    fn pointer(session: &mut DemoSession, ids: &[u32], container: u32) {
        let state = session.state();
        let Some(target) = state.container(ContainerId(container)).map(|c| c.center) else {
            log::warn!("Demo: no container {container}");
            return;
        };
        let mut events = Vec::new();
        for &id in ids {
            if let Some(item) = state.item(ItemId(id)) {
                events.push(PointerEvent::Down(item.pos));
                events.push(PointerEvent::Up(item.pos));
            }
        }
        if let Some(first) = ids.first().and_then(|&id| state.item(ItemId(id))) {
            let start = first.pos;
            events.push(PointerEvent::Down(start));
            events.push(PointerEvent::Move(start + Vec2::new(0.0, -20.0)));
            events.push(PointerEvent::Move(target));
            events.push(PointerEvent::Up(target));
        }
        step(
            session,
            TickInput {
                pointer: events,
                ..Default::default()
            },
        );
    }

    fn check_and_advance(session: &mut DemoSession) {
        step(
            session,
            TickInput {
                check: true,
                ..Default::default()
            },
        );
        let hold = session.state().tuning.feedback_hold;
        session.tick(&TickInput::default(), hold + SIM_DT);
        report(session);
    }

    fn report(session: &mut DemoSession) {
        for event in session.drain_events() {
            match event {
                GameEvent::Placed { container, items, modality } => {
                    log::info!("{} placed {:?} on plate {}", modality.as_str(), items, container.0 + 1);
                }
                GameEvent::DropRejected { container, reason, modality } => {
                    log::info!("{} drop on plate {} rejected: {}", modality.as_str(), container.0 + 1, reason.describe());
                }
                GameEvent::Checked { verdict } => {
                    log::info!("Verdict {:?}, response {:?}", verdict.aggregate, verdict.response());
                }
                _ => {}
            }
        }
        for text in session.announcer_mut().drain() {
            log::debug!("Announce: {text}");
        }
    }
}
