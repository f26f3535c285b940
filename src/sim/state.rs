//! Game state and core simulation types
//!
//! Coordinates are world pixels: x grows rightward from the left edge of the
//! playfield, y grows upward from the ground.

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Not running, waiting for a start command
    Idle,
    /// Ticking every frame
    Running,
    /// Energy ran out
    GameOver,
}

/// Vertical state of the rider
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerPhysics {
    pub y: f32,
    pub vel_y: f32,
    pub grounded: bool,
}

impl PlayerPhysics {
    /// Resting on the ground
    pub fn grounded_at(ground_level: f32) -> Self {
        Self {
            y: ground_level,
            vel_y: 0.0,
            grounded: true,
        }
    }

    /// Start a jump. Only works while grounded.
    pub fn jump(&mut self, impulse: f32) -> bool {
        if !self.grounded {
            return false;
        }
        self.vel_y = impulse;
        self.grounded = false;
        true
    }
}

/// Something to jump over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// An energy pickup floating above the road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collectible {
    pub id: u32,
    pub x: f32,
    /// Bottom edge, absolute
    pub y: f32,
}

/// Which cosmetic marker list an effect belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectKind {
    Collection,
    Splash,
}

/// A cosmetic marker centered at (x, y). Presentation removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectMarker {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

/// Sounds the audio collaborator knows how to play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEvent {
    Jump,
    Collect,
    Hit,
    GameOver,
}

/// Fire-and-forget notifications for presentation, audio and leaderboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Sound(SoundEvent),
    /// Start the spin timer; pass `generation` back to `clear_spin`
    SpinStarted { generation: u32 },
    /// Start the display timer; pass `kind`/`id` back to `remove_effect`
    EffectSpawned { kind: EffectKind, id: u32 },
    /// Emitted exactly once per session
    GameOver { distance: f32 },
}

/// Rendered playfield size, as last reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(FALLBACK_VIEWPORT_WIDTH, FALLBACK_VIEWPORT_HEIGHT)
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Replace unusable dimensions (NaN, zero, negative) with the last good read
    pub fn sanitized(self, last_good: Viewport) -> Viewport {
        let usable = |v: f32| v.is_finite() && v > 0.0;
        let width = if usable(self.width) {
            self.width
        } else if usable(last_good.width) {
            last_good.width
        } else {
            FALLBACK_VIEWPORT_WIDTH
        };
        let height = if usable(self.height) {
            self.height
        } else if usable(last_good.height) {
            last_good.height
        } else {
            FALLBACK_VIEWPORT_HEIGHT
        };
        Viewport { width, height }
    }

    /// Rider's fixed left edge
    pub fn player_x(&self) -> f32 {
        (self.width * PLAYER_X_RATIO).clamp(PLAYER_X_MIN, PLAYER_X_MAX)
    }

    /// Where new entities enter the playfield
    pub fn spawn_x(&self) -> f32 {
        self.width
    }
}

/// Monotonic id source shared by entities and effects
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityIds {
    next: u32,
}

impl Default for EntityIds {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl EntityIds {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Read-only frame snapshot published to presentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub phase: GamePhase,
    /// Meters travelled
    pub distance: f32,
    /// 0-100
    pub energy: f32,
    pub player_x: f32,
    pub player_y: f32,
    pub speed_multiplier: f32,
    pub obstacles: Vec<Obstacle>,
    pub collectibles: Vec<Collectible>,
    pub collection_effects: Vec<EffectMarker>,
    pub splash_effects: Vec<EffectMarker>,
    pub is_spinning: bool,
}

impl GameState {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jump_only_when_grounded() {
        let mut physics = PlayerPhysics::grounded_at(0.0);
        assert!(physics.jump(14.0));
        assert_eq!(physics.vel_y, 14.0);
        assert!(!physics.grounded);

        let airborne = physics;
        assert!(!physics.jump(14.0));
        assert_eq!(physics, airborne);
    }

    #[test]
    fn test_viewport_sanitize() {
        let good = Viewport::new(1024.0, 600.0);

        assert_eq!(Viewport::new(800.0, 500.0).sanitized(good), Viewport::new(800.0, 500.0));
        assert_eq!(Viewport::new(f32::NAN, 500.0).sanitized(good), Viewport::new(1024.0, 500.0));
        assert_eq!(Viewport::new(0.0, -3.0).sanitized(good), good);

        let nothing_good = Viewport::new(0.0, 0.0);
        assert_eq!(
            Viewport::new(-1.0, f32::INFINITY).sanitized(nothing_good),
            Viewport::default()
        );
    }

    #[test]
    fn test_player_x_tracks_width_within_bounds() {
        assert_eq!(Viewport::new(1000.0, 600.0).player_x(), 150.0);
        assert_eq!(Viewport::new(100.0, 600.0).player_x(), PLAYER_X_MIN);
        assert_eq!(Viewport::new(4000.0, 600.0).player_x(), PLAYER_X_MAX);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut ids = EntityIds::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(b, a + 1);
    }
}
