//! Fair Share - the "share equally" division mini-game engine
//!
//! Core modules:
//! - `sim`: Deterministic placement simulation (items, containers, selection, drag, validation)
//! - `question`: Question data and the provider seam
//! - `scoring`: Trial records and the score sink seam
//! - `session`: Round lifecycle wiring the simulation to its collaborators
//! - `platform`: Browser bindings
//! - `tuning`: Data-driven geometry and timing

pub mod error;
pub mod platform;
pub mod question;
pub mod scoring;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{CheckError, IntegrityError, SetupError};
pub use question::{ItemKind, Question, QuestionProvider, RandomQuestionProvider, ScriptedQuestions};
pub use scoring::{ScoreSink, TrialLog, TrialRecord};
pub use session::{Announcer, AnnouncementQueue, Session, SessionPhase};
pub use settings::{AnnouncementLevel, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per rendered frame at 60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Cap on catch-up ticks per rendered frame
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Arena dimensions (logical pixels)
    pub const ARENA_WIDTH: f32 = 1024.0;
    pub const ARENA_HEIGHT: f32 = 768.0;

    /// Pointer travel below this is a click, not a marquee or drag
    pub const CLICK_THRESHOLD: f32 = 6.0;

    /// Items are square
    pub const ITEM_SIZE: f32 = 48.0;
    /// Horizontal distance between resident items inside a container
    pub const SLOT_PITCH: f32 = 40.0;
    /// Horizontal distance between items of a dragged group
    pub const FORMATION_PITCH: f32 = 36.0;

    /// Container (plate) height; width follows capacity
    pub const CONTAINER_HEIGHT: f32 = 96.0;
    /// Minimum horizontal space between neighbouring containers
    pub const CONTAINER_GAP: f32 = 16.0;
    /// Extra room around a container that still counts as "over" it
    pub const CONTAINER_HIT_PADDING: f32 = 24.0;
    /// Vertical center of the container row
    pub const CONTAINER_ROW_Y: f32 = 200.0;

    /// Top of the free item pile
    pub const PILE_TOP_Y: f32 = 480.0;
    /// Grid pitch of the free item pile
    pub const PILE_PITCH: f32 = 64.0;
    /// Items per pile row
    pub const PILE_COLUMNS: usize = 10;
    /// Max random offset applied to pile home positions
    pub const PILE_JITTER: f32 = 8.0;

    /// Revert tween duration (seconds)
    pub const REVERT_DURATION: f32 = 0.25;
    /// Feint (keyboard rejection) duration (seconds)
    pub const FEINT_DURATION: f32 = 0.4;
    /// Settle-into-slot tween duration (seconds)
    pub const SETTLE_DURATION: f32 = 0.15;
    /// Fraction of the way toward the target a feint travels before returning
    pub const FEINT_REACH: f32 = 0.35;
    /// Time verdict feedback stays up before the next round loads (seconds)
    pub const FEEDBACK_HOLD: f32 = 2.0;

    /// Capacity tiers; a container's capacity is the smallest tier above the expected count
    pub const CAPACITY_TIERS: [usize; 3] = [3, 5, 8];
    /// Largest pile a single round may hold
    pub const MAX_ITEMS: usize = 100;
}

/// Cubic ease-out on [0, 1]
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    1.0 - (1.0 - t).powi(3)
}

/// Out-and-back curve on [0, 1]: 0 -> 1 at the midpoint -> 0
#[inline]
pub fn out_and_back(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        ease_out_cubic(t * 2.0)
    } else {
        ease_out_cubic((1.0 - t) * 2.0)
    }
}
