//! Per-frame simulation tick
//!
//! [`Simulation`] owns every piece of mutable game state. Hosts drive it with
//! a handful of commands (start, stop, jump, resize, effect/spin cleanup),
//! call [`Simulation::tick`] once per frame and read [`GameState`] snapshots.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{Aabb, resolve_collisions};
use super::movement::scroll;
use super::physics::integrate;
use super::spawner::{SpawnRolls, spawn};
use super::state::{
    Collectible, EffectKind, EffectMarker, EntityIds, GameEvent, GamePhase, GameState, Obstacle,
    PlayerPhysics, SoundEvent, Viewport,
};
use crate::consts::*;
use crate::tuning::{DeviceClass, SpeedProfile, Tuning};

/// The live, mutable game. Only snapshots leave this struct.
#[derive(Debug, Clone)]
pub struct Simulation {
    phase: GamePhase,
    tuning: Tuning,
    device: DeviceClass,
    profile: SpeedProfile,
    viewport: Viewport,

    physics: PlayerPhysics,
    speed_multiplier: f32,
    /// Set after a speed-variation penalty until back at max
    recovering: bool,
    distance: f32,
    energy: f32,

    obstacles: Vec<Obstacle>,
    collectibles: Vec<Collectible>,
    collection_effects: Vec<EffectMarker>,
    splash_effects: Vec<EffectMarker>,
    is_spinning: bool,
    spin_generation: u32,

    /// Ticks since the current session started
    time_ticks: u64,
    rng: Pcg32,
    ids: EntityIds,
    /// Events raised by commands between ticks
    pending: Vec<GameEvent>,
}

impl Simulation {
    /// Create an idle simulation
    pub fn new(tuning: Tuning, seed: u64, viewport: Viewport, device: DeviceClass) -> Self {
        let tuning = tuning.sanitized();
        let profile = tuning.profile(device);
        let viewport = viewport.sanitized(Viewport::default());
        Self {
            phase: GamePhase::Idle,
            physics: PlayerPhysics::grounded_at(tuning.ground_level),
            tuning,
            device,
            profile,
            viewport,
            speed_multiplier: 0.0,
            recovering: false,
            distance: 0.0,
            energy: ENERGY_MAX,
            obstacles: Vec::new(),
            collectibles: Vec::new(),
            collection_effects: Vec::new(),
            splash_effects: Vec::new(),
            is_spinning: false,
            spin_generation: 0,
            time_ticks: 0,
            rng: Pcg32::seed_from_u64(seed),
            ids: EntityIds::default(),
            pending: Vec::new(),
        }
    }

    /// Start (or restart) a session from the ground state
    pub fn start(&mut self) {
        self.physics = PlayerPhysics::grounded_at(self.tuning.ground_level);
        self.speed_multiplier = 0.0;
        self.recovering = false;
        self.distance = 0.0;
        self.energy = ENERGY_MAX;
        self.obstacles.clear();
        self.collectibles.clear();
        self.collection_effects.clear();
        self.splash_effects.clear();
        self.is_spinning = false;
        self.time_ticks = 0;
        self.pending.clear();
        self.phase = GamePhase::Running;
        log::info!(
            "Run started ({} profile, viewport {}x{})",
            self.device.as_str(),
            self.viewport.width,
            self.viewport.height
        );
    }

    /// Start with a fresh RNG seed
    pub fn start_with_seed(&mut self, seed: u64) {
        self.rng = Pcg32::seed_from_u64(seed);
        self.start();
    }

    /// Manual stop; later ticks are ignored until the next start
    pub fn stop(&mut self) {
        if self.phase == GamePhase::Running {
            log::info!("Run stopped at {:.1}m", self.distance);
        }
        self.phase = GamePhase::Idle;
        self.pending.clear();
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn device(&self) -> DeviceClass {
        self.device
    }

    pub fn profile(&self) -> SpeedProfile {
        self.profile
    }

    pub fn physics(&self) -> PlayerPhysics {
        self.physics
    }

    pub fn speed_multiplier(&self) -> f32 {
        self.speed_multiplier
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    /// New viewport geometry from the host. Bad reads keep the last good size.
    pub fn resize(&mut self, viewport: Viewport, device: DeviceClass) {
        let sanitized = viewport.sanitized(self.viewport);
        if sanitized != viewport {
            log::warn!(
                "Rejected viewport {}x{}, using {}x{}",
                viewport.width,
                viewport.height,
                sanitized.width,
                sanitized.height
            );
        }
        self.viewport = sanitized;

        if device != self.device {
            log::info!("Device profile {} -> {}", self.device.as_str(), device.as_str());
        }
        self.device = device;
        self.profile = self.tuning.profile(device);
    }

    /// Jump request from input. Ignored unless running and grounded.
    pub fn request_jump(&mut self) -> bool {
        if !self.is_running() || !self.physics.jump(self.tuning.jump_impulse) {
            return false;
        }
        if let Some(var) = self.tuning.speed_variation {
            self.apply_speed_penalty(var.jump_penalty, var.min_multiplier);
        }
        self.pending.push(GameEvent::Sound(SoundEvent::Jump));
        true
    }

    /// Spin timer finished. Stale timers from earlier hits are ignored.
    pub fn clear_spin(&mut self, generation: u32) -> bool {
        if generation != self.spin_generation || !self.is_spinning {
            return false;
        }
        self.is_spinning = false;
        true
    }

    /// Presentation is done showing an effect
    pub fn remove_effect(&mut self, kind: EffectKind, id: u32) -> bool {
        let list = match kind {
            EffectKind::Collection => &mut self.collection_effects,
            EffectKind::Splash => &mut self.splash_effects,
        };
        let before = list.len();
        list.retain(|e| e.id != id);
        list.len() != before
    }

    /// Player's nominal box this tick
    pub fn player_bounds(&self) -> Aabb {
        Aabb::from_corner(
            Vec2::new(self.viewport.player_x(), self.physics.y),
            Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
        )
    }

    /// Immutable copy for presentation
    pub fn snapshot(&self) -> GameState {
        GameState {
            phase: self.phase,
            distance: self.distance,
            energy: self.energy,
            player_x: self.viewport.player_x(),
            player_y: self.physics.y,
            speed_multiplier: self.speed_multiplier,
            obstacles: self.obstacles.clone(),
            collectibles: self.collectibles.clone(),
            collection_effects: self.collection_effects.clone(),
            splash_effects: self.splash_effects.clone(),
            is_spinning: self.is_spinning,
        }
    }

    /// Advance one tick. Returns everything that happened since the last call.
    pub fn tick(&mut self) -> Vec<GameEvent> {
        let mut events = std::mem::take(&mut self.pending);

        // Stale frame callbacks land here after game over or stop
        if self.phase != GamePhase::Running {
            return events;
        }

        self.time_ticks += 1;

        // A non-finite step is skipped; the rest of the tick still runs
        let physics = integrate(self.physics, &self.tuning);
        self.physics = if physics.y.is_finite() && physics.vel_y.is_finite() {
            physics
        } else {
            self.reject("player physics");
            PlayerPhysics::grounded_at(self.tuning.ground_level)
        };

        let speed = self.ramped_speed();
        if speed.is_finite() {
            self.speed_multiplier = speed;
        } else {
            self.reject("speed multiplier");
        }

        let distance = self.distance + self.profile.distance_multiplier * self.speed_multiplier;
        if distance.is_finite() {
            self.distance = distance;
        } else {
            self.reject("distance");
        }
        self.apply_energy(-self.profile.energy_decline_rate);

        let scroll_speed = self.profile.visual_speed * self.speed_multiplier;
        if scroll_speed.is_finite() {
            scroll(&mut self.obstacles, scroll_speed, self.tuning.despawn_x);
            scroll(&mut self.collectibles, scroll_speed, self.tuning.despawn_x);
        } else {
            self.reject("scroll speed");
        }

        let rolls = SpawnRolls::roll(&mut self.rng, &self.tuning);
        spawn(
            rolls,
            &self.viewport,
            &self.tuning,
            &mut self.obstacles,
            &mut self.collectibles,
            &mut self.ids,
        );

        let player = self.player_bounds();
        let report = resolve_collisions(
            player,
            &mut self.obstacles,
            &mut self.collectibles,
            &mut self.collection_effects,
            &mut self.splash_effects,
            &mut self.ids,
            &self.tuning,
        );
        self.apply_energy(report.energy_delta);

        if report.hit {
            self.is_spinning = true;
            self.spin_generation = self.spin_generation.wrapping_add(1);
            events.push(GameEvent::Sound(SoundEvent::Hit));
            events.push(GameEvent::SpinStarted {
                generation: self.spin_generation,
            });
            if let Some(var) = self.tuning.speed_variation {
                self.apply_speed_penalty(var.hit_penalty, var.min_multiplier);
            }
        }
        if let Some(id) = report.splash {
            events.push(GameEvent::EffectSpawned {
                kind: EffectKind::Splash,
                id,
            });
        }
        if !report.collected.is_empty() {
            events.push(GameEvent::Sound(SoundEvent::Collect));
            events.extend(report.collected.iter().map(|&id| GameEvent::EffectSpawned {
                kind: EffectKind::Collection,
                id,
            }));
        }

        self.energy = self.energy.clamp(ENERGY_MIN, ENERGY_MAX);

        if self.energy <= ENERGY_MIN {
            self.phase = GamePhase::GameOver;
            events.push(GameEvent::Sound(SoundEvent::GameOver));
            events.push(GameEvent::GameOver {
                distance: self.distance,
            });
            log::info!(
                "Game over: {:.1}m in {} ticks",
                self.distance,
                self.time_ticks
            );
        }

        events
    }

    fn ramped_speed(&mut self) -> f32 {
        let max = self.tuning.max_speed_multiplier;
        let rate = match self.tuning.speed_variation {
            Some(var) if self.recovering => var.recovery_per_tick,
            _ => self.tuning.acceleration,
        };
        let next = (self.speed_multiplier + rate).min(max);
        if next >= max {
            self.recovering = false;
        }
        next
    }

    fn apply_speed_penalty(&mut self, penalty: f32, floor: f32) {
        if penalty <= 0.0 {
            return;
        }
        let floor = floor.min(self.speed_multiplier);
        self.speed_multiplier = (self.speed_multiplier - penalty).max(floor);
        self.recovering = true;
    }

    fn apply_energy(&mut self, delta: f32) {
        let energy = self.energy + delta;
        if energy.is_finite() {
            self.energy = energy;
        } else {
            self.reject("energy");
        }
    }

    fn reject(&self, what: &str) {
        log::warn!("Non-finite {} at tick {}, step skipped", what, self.time_ticks);
    }
}
