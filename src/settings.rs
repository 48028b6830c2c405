//! Player preferences
//!
//! Persisted in LocalStorage on the web. Nothing about a round's progress is
//! stored here.

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

/// How chatty the accessibility announcer is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum AnnouncementLevel {
    /// No announcements
    Off,
    /// Placements, rejections and verdicts
    Placements,
    /// Everything above plus every selection change
    #[default]
    Verbose,
}

impl AnnouncementLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnnouncementLevel::Off => "Off",
            AnnouncementLevel::Placements => "Placements",
            AnnouncementLevel::Verbose => "Verbose",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "off" | "none" => Some(AnnouncementLevel::Off),
            "placements" => Some(AnnouncementLevel::Placements),
            "verbose" | "all" => Some(AnnouncementLevel::Verbose),
            _ => None,
        }
    }

    /// Whether selection changes are spoken
    pub fn selection(&self) -> bool {
        matches!(self, AnnouncementLevel::Verbose)
    }

    /// Whether placements, rejections and verdicts are spoken
    pub fn placements(&self) -> bool {
        !matches!(self, AnnouncementLevel::Off)
    }
}

/// Player settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Accessibility ===
    /// Reduced motion (revert, feint and settle animations complete instantly)
    pub reduced_motion: bool,
    /// Screen reader verbosity
    pub announcements: AnnouncementLevel,

    // === Flow ===
    /// Play the guided two-plate tutorial before the first real round
    pub tutorial: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            reduced_motion: false,
            announcements: AnnouncementLevel::Verbose,
            tutorial: true,
        }
    }
}

impl Settings {
    /// Tuning as the player experiences it (respects reduced_motion)
    pub fn effective_tuning(&self, base: &Tuning) -> Tuning {
        if self.reduced_motion {
            base.clone().with_reduced_motion()
        } else {
            base.clone()
        }
    }

    /// Parse a stored document; unreadable data falls back to defaults
    pub fn from_stored(json: &str) -> Self {
        serde_json::from_str(json).unwrap_or_else(|err| {
            log::warn!("Stored settings unreadable, using defaults: {err}");
            Self::default()
        })
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "fair_share_settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        match storage.map(|s| s.get_item(Self::STORAGE_KEY)) {
            Some(Ok(Some(json))) => {
                log::info!("Loaded settings from LocalStorage");
                Self::from_stored(&json)
            }
            Some(Err(err)) => {
                log::warn!("LocalStorage read failed: {err:?}");
                Self::default()
            }
            _ => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            match serde_json::to_string(self) {
                Ok(json) => match storage.set_item(Self::STORAGE_KEY, &json) {
                    Ok(()) => log::info!("Settings saved"),
                    Err(err) => log::warn!("Settings not saved, storage refused the write: {err:?}"),
                },
                Err(err) => log::warn!("Settings not saved: {err}"),
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_stored_falls_back_on_corrupt_data() {
        let settings = Settings::from_stored("{not json");
        assert!(settings.tutorial);
        assert_eq!(settings.announcements, AnnouncementLevel::Verbose);

        let settings = Settings::from_stored(r#"{ "reduced_motion": true }"#);
        assert!(settings.reduced_motion);
        assert!(settings.tutorial);
    }

    #[test]
    fn test_announcement_level_parse() {
        assert_eq!(AnnouncementLevel::parse("VERBOSE"), Some(AnnouncementLevel::Verbose));
        assert_eq!(AnnouncementLevel::parse("none"), Some(AnnouncementLevel::Off));
        assert_eq!(AnnouncementLevel::parse("loud"), None);
        assert!(!AnnouncementLevel::Placements.selection());
        assert!(AnnouncementLevel::Placements.placements());
    }

    #[test]
    fn test_reduced_motion_tuning() {
        let settings = Settings {
            reduced_motion: true,
            ..Default::default()
        };
        let tuning = settings.effective_tuning(&Tuning::default());
        assert_eq!(tuning.feint_duration, 0.0);

        let tuning = Settings::default().effective_tuning(&Tuning::default());
        assert!(tuning.feint_duration > 0.0);
    }
}
