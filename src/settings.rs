//! Player settings and preferences
//!
//! Persisted separately from the leaderboard in LocalStorage.

use serde::{Deserialize, Serialize};

use crate::platform::storage::{self, StorageError};
use crate::tuning::DeviceClass;

/// Longest username shown on the leaderboard
pub const MAX_USERNAME_LEN: usize = 16;
/// Used when the player never typed a name
pub const DEFAULT_USERNAME: &str = "Rider";
/// Number of selectable bikes
pub const BIKE_COUNT: u32 = 4;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Profile ===
    /// Name submitted with finished runs
    pub username: String,
    /// Bike picked on the selection screen
    pub selected_bike: u32,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,
    pub muted: bool,
    /// Mute when window loses focus
    pub mute_on_blur: bool,

    // === Accessibility ===
    /// Reduced motion (presentation skips the hit spin)
    pub reduced_motion: bool,

    /// Force a speed profile instead of detecting it
    pub device_override: Option<DeviceClass>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            selected_bike: 0,

            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
            mute_on_blur: true,

            reduced_motion: false,

            device_override: None,
        }
    }
}

impl Settings {
    /// Set username, trimmed and length-limited
    pub fn set_username(&mut self, name: &str) {
        self.username = sanitize_username(name);
    }

    /// Select a bike, wrapping out-of-range ids back to the first bike
    pub fn select_bike(&mut self, bike_id: u32) {
        self.selected_bike = if bike_id < BIKE_COUNT { bike_id } else { 0 };
    }

    /// Effective sfx volume (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        }
    }

    /// Detected class unless the player forced one
    pub fn device_class(&self, detected: DeviceClass) -> DeviceClass {
        self.device_override.unwrap_or(detected)
    }

    const STORAGE_KEY: &'static str = "bike_dash_settings";

    /// Load settings from LocalStorage
    pub fn load() -> Self {
        match storage::load::<Settings>(Self::STORAGE_KEY) {
            Ok(mut settings) => {
                settings.username = sanitize_username(&settings.username);
                settings.select_bike(settings.selected_bike);
                log::info!("Loaded settings from LocalStorage");
                settings
            }
            Err(StorageError::Corrupt(e)) => {
                log::warn!("Ignoring corrupt settings: {}", e);
                Self::default()
            }
            Err(StorageError::Missing) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings to LocalStorage
    pub fn save(&self) {
        if storage::save(Self::STORAGE_KEY, self) {
            log::info!("Settings saved");
        }
    }
}

/// Trim, drop control characters and cap length; empty becomes the default
pub fn sanitize_username(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .filter(|c| !c.is_control())
        .take(MAX_USERNAME_LEN)
        .collect();
    let cleaned = cleaned.trim_end().to_string();
    if cleaned.is_empty() {
        DEFAULT_USERNAME.to_string()
    } else {
        cleaned
    }
}
