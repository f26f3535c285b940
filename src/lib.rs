//! Bike Dash - A side-scrolling bike runner
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, spawning, collisions, game loop)
//! - `tuning`: Data-driven game balance
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Player preferences
//! - `leaderboard`: Local best runs

#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod leaderboard;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use leaderboard::Leaderboard;
pub use settings::Settings;
pub use tuning::{DeviceClass, SpeedProfile, SpeedVariation, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per nominal 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;
    /// Largest frame delta fed to the accumulator (seconds)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Energy meter bounds
    pub const ENERGY_MAX: f32 = 100.0;
    pub const ENERGY_MIN: f32 = 0.0;

    /// Player (rider + bike) nominal box
    pub const PLAYER_WIDTH: f32 = 80.0;
    pub const PLAYER_HEIGHT: f32 = 80.0;
    /// Player x as a fraction of viewport width
    pub const PLAYER_X_RATIO: f32 = 0.15;
    pub const PLAYER_X_MIN: f32 = 40.0;
    pub const PLAYER_X_MAX: f32 = 220.0;

    /// Used when the host reports unusable geometry before any good read
    pub const FALLBACK_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const FALLBACK_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Viewports narrower than this are treated as mobile
    pub const MOBILE_BREAKPOINT: f32 = 768.0;
    /// Touch devices narrower than this are treated as mobile (tablets)
    pub const TOUCH_TABLET_BREAKPOINT: f32 = 1024.0;

    /// How long the hit spin lasts (presentation timer)
    pub const SPIN_DURATION_MS: i32 = 800;
    /// How long collection/splash markers stay on screen
    pub const EFFECT_DURATION_MS: i32 = 600;
}
