//! Browser host bindings
//!
//! The JS side owns the canvas, audio and the ARIA live region. It forwards
//! pointer and activation input here, calls `update` once per animation
//! frame, and reads back JSON snapshots and event batches.

use wasm_bindgen::prelude::*;

use crate::consts::{MAX_SUBSTEPS, SIM_DT};
use crate::question::RandomQuestionProvider;
use crate::scoring::TrialLog;
use crate::session::{AnnouncementQueue, Session};
use crate::settings::Settings;
use crate::sim::{Activation, ContainerId, GameEvent, ItemId, PointerEvent, TickInput};
use crate::tuning::Tuning;

fn js_err(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// Panic hook and console logger
#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if let Err(err) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&js_err(err));
    }
    log::info!("Fair Share engine loaded");
}

#[wasm_bindgen]
pub struct WebSession {
    session: Session<RandomQuestionProvider, TrialLog, AnnouncementQueue>,
    /// Input gathered since the last tick
    input: TickInput,
    accumulator: f32,
    events: Vec<GameEvent>,
}

#[wasm_bindgen]
impl WebSession {
    /// Start a session. `tuning_json` may be empty for defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u32, tuning_json: &str) -> Result<WebSession, JsValue> {
        let tuning = if tuning_json.trim().is_empty() {
            Tuning::default()
        } else {
            Tuning::from_json(tuning_json).map_err(js_err)?
        };
        let settings = Settings::load();
        let provider = RandomQuestionProvider::new(seed as u64);
        let session = Session::new(
            provider,
            TrialLog::new(),
            AnnouncementQueue::new(),
            settings,
            tuning,
            seed as u64,
        )
        .map_err(js_err)?;

        log::info!("Session started (seed {seed})");
        Ok(Self {
            session,
            input: TickInput::default(),
            accumulator: 0.0,
            events: Vec::new(),
        })
    }

    // === Input ===

    pub fn pointer_down(&mut self, x: f32, y: f32) {
        self.input.pointer.push(PointerEvent::Down(glam::Vec2::new(x, y)));
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        // Coalesce consecutive moves within a tick
        if let Some(PointerEvent::Move(p)) = self.input.pointer.last_mut() {
            *p = glam::Vec2::new(x, y);
            return;
        }
        self.input.pointer.push(PointerEvent::Move(glam::Vec2::new(x, y)));
    }

    pub fn pointer_up(&mut self, x: f32, y: f32) {
        self.input.pointer.push(PointerEvent::Up(glam::Vec2::new(x, y)));
    }

    pub fn pointer_cancel(&mut self) {
        self.input.pointer.push(PointerEvent::Cancel);
    }

    pub fn activate_item(&mut self, id: u32) {
        self.input.activations.push(Activation::Item(ItemId(id)));
    }

    pub fn activate_container(&mut self, id: u32) {
        self.input.activations.push(Activation::Container(ContainerId(id)));
    }

    pub fn check(&mut self) {
        self.input.check = true;
    }

    pub fn reset(&mut self) {
        self.input.reset = true;
    }

    // === Loop ===

    /// Run fixed ticks for `dt` seconds of wall time. Returns ticks run.
    pub fn update(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.min(0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            // Queued input goes into the first tick only
            let input = std::mem::take(&mut self.input);
            self.session.tick(&input, SIM_DT);
            self.events.extend(self.session.drain_events());
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    // === Snapshots ===

    /// Current round (items, containers, selection, phase) as JSON
    pub fn state_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.state()).map_err(js_err)
    }

    /// Events since the last call, as a JSON array
    pub fn drain_events_json(&mut self) -> Result<String, JsValue> {
        let events = std::mem::take(&mut self.events);
        serde_json::to_string(&events).map_err(js_err)
    }

    /// Pending announcer text, as a JSON array of strings
    pub fn drain_announcements_json(&mut self) -> Result<String, JsValue> {
        let texts = self.session.announcer_mut().drain();
        serde_json::to_string(&texts).map_err(js_err)
    }

    pub fn trials_json(&self) -> Result<String, JsValue> {
        self.session.sink().to_json().map_err(js_err)
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.session.settings()).map_err(js_err)
    }

    /// Replace and persist the player's settings
    pub fn set_settings_json(&mut self, json: &str) -> Result<(), JsValue> {
        let settings: Settings = serde_json::from_str(json).map_err(js_err)?;
        settings.save();
        self.session.set_settings(settings);
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.session.is_finished()
    }
}
