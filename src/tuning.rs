//! Data-driven game balance
//!
//! Every per-tick constant the simulation uses lives in [`Tuning`]. Device
//! dependent rates are grouped into a [`SpeedProfile`] per [`DeviceClass`],
//! resolved once at game start (and again on resize) instead of branching
//! inside the tick.

use serde::{Deserialize, Serialize};

use crate::consts::{ENERGY_MAX, MOBILE_BREAKPOINT, TOUCH_TABLET_BREAKPOINT};
use crate::sim::Viewport;

/// Device class used to pick a speed profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DeviceClass {
    #[default]
    Desktop,
    Mobile,
}

impl DeviceClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceClass::Desktop => "Desktop",
            DeviceClass::Mobile => "Mobile",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "desktop" | "pc" => Some(DeviceClass::Desktop),
            "mobile" | "phone" | "tablet" => Some(DeviceClass::Mobile),
            _ => None,
        }
    }

    /// Capability query: narrow viewports, or touch-only tablets, are mobile
    pub fn detect(viewport: &Viewport, has_touch: bool) -> Self {
        let narrow = viewport.width < MOBILE_BREAKPOINT;
        if narrow || (has_touch && viewport.width < TOUCH_TABLET_BREAKPOINT) {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }
}

/// Per-device rates applied every tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedProfile {
    /// Scroll speed of obstacles/collectibles at full speed (px/tick)
    pub visual_speed: f32,
    /// Meters added to distance per tick at full speed
    pub distance_multiplier: f32,
    /// Energy drained per tick
    pub energy_decline_rate: f32,
}

impl SpeedProfile {
    pub fn desktop() -> Self {
        Self {
            visual_speed: 7.0,
            distance_multiplier: 0.05,
            energy_decline_rate: 0.0625,
        }
    }

    pub fn mobile() -> Self {
        Self {
            visual_speed: 4.5,
            distance_multiplier: 0.04,
            energy_decline_rate: 0.05,
        }
    }
}

/// Optional speed variation: hits and jumps shave speed off, the normal ramp
/// brings it back
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedVariation {
    pub hit_penalty: f32,
    pub jump_penalty: f32,
    /// Ramp rate while below max after a penalty (replaces `acceleration`)
    pub recovery_per_tick: f32,
    /// Penalties never push the multiplier below this
    pub min_multiplier: f32,
}

impl Default for SpeedVariation {
    fn default() -> Self {
        Self {
            hit_penalty: 0.35,
            jump_penalty: 0.05,
            recovery_per_tick: 0.004,
            min_multiplier: 0.3,
        }
    }
}

/// Upper bounds keep every per-tick product well inside f32 range
const MAX_GRAVITY: f32 = 50.0;
const MAX_JUMP_IMPULSE: f32 = 200.0;
const MAX_SPEED_MULTIPLIER: f32 = 10.0;
const MAX_VISUAL_SPEED: f32 = 500.0;
const MAX_DISTANCE_MULTIPLIER: f32 = 100.0;
const MAX_ENTITY_SIZE: f32 = 10_000.0;

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Physics ===
    pub gravity: f32,
    pub jump_impulse: f32,
    pub ground_level: f32,

    // === Speed ramp ===
    pub acceleration: f32,
    pub max_speed_multiplier: f32,

    // === Spawning ===
    pub obstacle_spawn_chance: f64,
    pub collectible_spawn_chance: f64,
    /// Minimum horizontal gap between any two entities at spawn time
    pub spawn_buffer: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
    pub collectible_size: f32,
    /// Collectible height band above ground
    pub collectible_min_height: f32,
    pub collectible_max_height: f32,
    /// Entities whose x drops below this are removed
    pub despawn_x: f32,

    // === Collision ===
    pub hit_energy_penalty: f32,
    pub collect_energy_bonus: f32,
    /// Fraction of linear size removed from obstacle hitboxes
    pub obstacle_hitbox_shrink: f32,
    /// Fraction of linear size removed from the player hitbox
    pub player_hitbox_shrink: f32,

    // === Device profiles ===
    pub desktop: SpeedProfile,
    pub mobile: SpeedProfile,

    pub speed_variation: Option<SpeedVariation>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: 0.6,
            jump_impulse: 14.0,
            ground_level: 0.0,

            acceleration: 0.01,
            max_speed_multiplier: 1.0,

            obstacle_spawn_chance: 0.018,
            collectible_spawn_chance: 0.018,
            spawn_buffer: 100.0,
            obstacle_width: 72.0,
            obstacle_height: 60.0,
            collectible_size: 40.0,
            collectible_min_height: 60.0,
            collectible_max_height: 180.0,
            despawn_x: -150.0,

            hit_energy_penalty: 5.0,
            collect_energy_bonus: 12.0,
            obstacle_hitbox_shrink: 0.5,
            player_hitbox_shrink: 0.4,

            desktop: SpeedProfile::desktop(),
            mobile: SpeedProfile::mobile(),

            speed_variation: None,
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON tuning override; missing fields keep
    /// their defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let tuning: Tuning = serde_json::from_str(json)?;
        Ok(tuning.sanitized())
    }

    /// Speed profile for a device class
    pub fn profile(&self, device: DeviceClass) -> SpeedProfile {
        match device {
            DeviceClass::Desktop => self.desktop,
            DeviceClass::Mobile => self.mobile,
        }
    }

    /// Force values into ranges the tick math can rely on
    pub fn sanitized(mut self) -> Self {
        let defaults = Tuning::default();

        self.gravity = positive_or(self.gravity, defaults.gravity).min(MAX_GRAVITY);
        self.jump_impulse =
            positive_or(self.jump_impulse, defaults.jump_impulse).min(MAX_JUMP_IMPULSE);
        if !self.ground_level.is_finite() {
            self.ground_level = defaults.ground_level;
        }

        self.max_speed_multiplier = positive_or(
            self.max_speed_multiplier,
            defaults.max_speed_multiplier,
        )
        .min(MAX_SPEED_MULTIPLIER);
        self.acceleration =
            positive_or(self.acceleration, defaults.acceleration).min(self.max_speed_multiplier);

        self.obstacle_spawn_chance = probability(self.obstacle_spawn_chance);
        self.collectible_spawn_chance = probability(self.collectible_spawn_chance);
        self.spawn_buffer =
            non_negative_or(self.spawn_buffer, defaults.spawn_buffer).min(MAX_ENTITY_SIZE);
        self.obstacle_width =
            positive_or(self.obstacle_width, defaults.obstacle_width).min(MAX_ENTITY_SIZE);
        self.obstacle_height =
            positive_or(self.obstacle_height, defaults.obstacle_height).min(MAX_ENTITY_SIZE);
        self.collectible_size =
            positive_or(self.collectible_size, defaults.collectible_size).min(MAX_ENTITY_SIZE);
        self.collectible_min_height =
            non_negative_or(self.collectible_min_height, defaults.collectible_min_height)
                .min(MAX_ENTITY_SIZE);
        self.collectible_max_height =
            non_negative_or(self.collectible_max_height, defaults.collectible_max_height)
                .min(MAX_ENTITY_SIZE);
        if self.collectible_min_height > self.collectible_max_height {
            std::mem::swap(
                &mut self.collectible_min_height,
                &mut self.collectible_max_height,
            );
        }
        if !self.despawn_x.is_finite() {
            self.despawn_x = defaults.despawn_x;
        }

        self.hit_energy_penalty =
            non_negative_or(self.hit_energy_penalty, defaults.hit_energy_penalty).min(ENERGY_MAX);
        self.collect_energy_bonus =
            non_negative_or(self.collect_energy_bonus, defaults.collect_energy_bonus)
                .min(ENERGY_MAX);
        self.obstacle_hitbox_shrink = shrink_fraction(self.obstacle_hitbox_shrink);
        self.player_hitbox_shrink = shrink_fraction(self.player_hitbox_shrink);

        self.desktop = sanitize_profile(self.desktop, defaults.desktop);
        self.mobile = sanitize_profile(self.mobile, defaults.mobile);

        if let Some(var) = self.speed_variation.as_mut() {
            var.hit_penalty = non_negative_or(var.hit_penalty, 0.0).min(self.max_speed_multiplier);
            var.jump_penalty =
                non_negative_or(var.jump_penalty, 0.0).min(self.max_speed_multiplier);
            var.recovery_per_tick =
                positive_or(var.recovery_per_tick, self.acceleration).min(self.max_speed_multiplier);
            var.min_multiplier = var
                .min_multiplier
                .clamp(0.0, self.max_speed_multiplier)
                .max(f32::EPSILON);
        }

        self
    }
}

fn sanitize_profile(profile: SpeedProfile, fallback: SpeedProfile) -> SpeedProfile {
    SpeedProfile {
        visual_speed: positive_or(profile.visual_speed, fallback.visual_speed)
            .min(MAX_VISUAL_SPEED),
        distance_multiplier: positive_or(profile.distance_multiplier, fallback.distance_multiplier)
            .min(MAX_DISTANCE_MULTIPLIER),
        energy_decline_rate: non_negative_or(
            profile.energy_decline_rate,
            fallback.energy_decline_rate,
        )
        .min(ENERGY_MAX),
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn non_negative_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value >= 0.0 {
        value
    } else {
        fallback
    }
}

fn probability(p: f64) -> f64 {
    if p.is_finite() { p.clamp(0.0, 1.0) } else { 0.0 }
}

fn shrink_fraction(f: f32) -> f32 {
    if f.is_finite() { f.clamp(0.0, 0.95) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "obstacle_spawn_chance": 0.0 }"#).unwrap();
        assert_eq!(tuning.obstacle_spawn_chance, 0.0);
        assert_eq!(tuning.collectible_spawn_chance, 0.018);
        assert_eq!(tuning.jump_impulse, Tuning::default().jump_impulse);
        assert!(tuning.speed_variation.is_none());
    }

    #[test]
    fn test_bad_json_is_an_error() {
        assert!(Tuning::from_json("{ not json").is_err());
    }

    #[test]
    fn test_sanitize_clamps_ranges() {
        let tuning = Tuning {
            obstacle_spawn_chance: 3.0,
            collectible_spawn_chance: -1.0,
            gravity: f32::NAN,
            collectible_min_height: 200.0,
            collectible_max_height: 50.0,
            desktop: SpeedProfile {
                visual_speed: -2.0,
                ..SpeedProfile::desktop()
            },
            ..Default::default()
        }
        .sanitized();

        assert_eq!(tuning.obstacle_spawn_chance, 1.0);
        assert_eq!(tuning.collectible_spawn_chance, 0.0);
        assert_eq!(tuning.gravity, Tuning::default().gravity);
        assert_eq!(tuning.collectible_min_height, 50.0);
        assert_eq!(tuning.collectible_max_height, 200.0);
        assert_eq!(tuning.desktop.visual_speed, SpeedProfile::desktop().visual_speed);
    }

    #[test]
    fn test_sanitize_caps_overflowing_values() {
        let tuning = Tuning::from_json(
            r#"{
                "jump_impulse": 3.0e38,
                "gravity": 1.0e30,
                "max_speed_multiplier": 1.0e20,
                "acceleration": 5.0e20,
                "hit_energy_penalty": 1.0e9,
                "desktop": { "visual_speed": 3.0e38, "distance_multiplier": 1.0e30, "energy_decline_rate": 7.0 }
            }"#,
        )
        .unwrap();

        assert_eq!(tuning.jump_impulse, MAX_JUMP_IMPULSE);
        assert_eq!(tuning.gravity, MAX_GRAVITY);
        assert_eq!(tuning.max_speed_multiplier, MAX_SPEED_MULTIPLIER);
        assert_eq!(tuning.acceleration, MAX_SPEED_MULTIPLIER);
        assert_eq!(tuning.hit_energy_penalty, ENERGY_MAX);
        assert_eq!(tuning.desktop.visual_speed, MAX_VISUAL_SPEED);
        assert_eq!(tuning.desktop.distance_multiplier, MAX_DISTANCE_MULTIPLIER);
        assert_eq!(tuning.desktop.energy_decline_rate, 7.0);
        // Defaults are untouched by the caps
        assert_eq!(Tuning::default().sanitized(), Tuning::default());
    }

    #[test]
    fn test_device_detection() {
        let phone = Viewport::new(390.0, 844.0);
        let tablet = Viewport::new(900.0, 1200.0);
        let laptop = Viewport::new(1440.0, 900.0);

        assert_eq!(DeviceClass::detect(&phone, true), DeviceClass::Mobile);
        assert_eq!(DeviceClass::detect(&tablet, true), DeviceClass::Mobile);
        assert_eq!(DeviceClass::detect(&tablet, false), DeviceClass::Desktop);
        assert_eq!(DeviceClass::detect(&laptop, true), DeviceClass::Desktop);

        let edge = Viewport::new(TOUCH_TABLET_BREAKPOINT, 768.0);
        assert_eq!(DeviceClass::detect(&edge, true), DeviceClass::Desktop);
    }

    #[test]
    fn test_profiles_differ_by_device() {
        let tuning = Tuning::default();
        assert_ne!(
            tuning.profile(DeviceClass::Desktop),
            tuning.profile(DeviceClass::Mobile)
        );
        assert_eq!(DeviceClass::parse("PHONE"), Some(DeviceClass::Mobile));
        assert_eq!(DeviceClass::parse("toaster"), None);
    }
}
