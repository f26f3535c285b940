//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per call, per-tick constants only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio or platform dependencies

pub mod autopilot;
pub mod collision;
pub mod movement;
pub mod physics;
pub mod spawner;
pub mod state;
pub mod tick;

pub use collision::{Aabb, CollisionReport, resolve_collisions};
pub use movement::{Scrolling, scroll};
pub use physics::integrate;
pub use spawner::{SpawnRolls, spawn};
pub use state::{
    Collectible, EffectKind, EffectMarker, EntityIds, GameEvent, GamePhase, GameState, Obstacle,
    PlayerPhysics, SoundEvent, Viewport,
};
pub use tick::Simulation;
