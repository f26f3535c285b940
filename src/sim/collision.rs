//! Collision detection and response
//!
//! Obstacles use shrunk hitboxes on both sides so near misses feel fair.
//! Collectibles use full-size boxes so grabbing them is generous.

use glam::Vec2;

use super::state::{Collectible, EffectMarker, EntityIds, Obstacle};
use crate::tuning::Tuning;

/// Axis-aligned box, y up
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box from its bottom-left corner and size
    pub fn from_corner(corner: Vec2, size: Vec2) -> Self {
        Self {
            min: corner,
            max: corner + size,
        }
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    /// Same center, linear size scaled by `1 - fraction`
    pub fn shrunk(&self, fraction: f32) -> Self {
        let half = self.size() * (1.0 - fraction) * 0.5;
        let center = self.center();
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Strict overlap; boxes that only touch do not collide
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && other.min.x < self.max.x
            && self.min.y < other.max.y
            && other.min.y < self.max.y
    }
}

impl Obstacle {
    /// Nominal box, standing on the ground
    pub fn bounds(&self, ground_level: f32) -> Aabb {
        Aabb::from_corner(
            Vec2::new(self.x, ground_level),
            Vec2::new(self.width, self.height),
        )
    }
}

impl Collectible {
    pub fn bounds(&self, size: f32) -> Aabb {
        Aabb::from_corner(Vec2::new(self.x, self.y), Vec2::splat(size))
    }
}

/// What the resolver did this tick
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionReport {
    /// Signed energy change to apply
    pub energy_delta: f32,
    /// An obstacle was hit (at most one per tick)
    pub hit: bool,
    /// Splash effect created by the hit
    pub splash: Option<u32>,
    /// Collection effects created this tick, one per collectible
    pub collected: Vec<u32>,
}

impl CollisionReport {
    pub fn miss() -> Self {
        Self::default()
    }
}

/// Resolve player overlaps against obstacles, then collectibles.
///
/// The first obstacle in list order whose shrunk box overlaps the shrunk
/// player box is removed and replaces the splash list; later obstacles are
/// not checked. Every overlapping collectible is consumed.
pub fn resolve_collisions(
    player: Aabb,
    obstacles: &mut Vec<Obstacle>,
    collectibles: &mut Vec<Collectible>,
    collection_effects: &mut Vec<EffectMarker>,
    splash_effects: &mut Vec<EffectMarker>,
    ids: &mut EntityIds,
    tuning: &Tuning,
) -> CollisionReport {
    let mut report = CollisionReport::miss();

    let player_hitbox = player.shrunk(tuning.player_hitbox_shrink);
    let hit_index = obstacles.iter().position(|o| {
        o.bounds(tuning.ground_level)
            .shrunk(tuning.obstacle_hitbox_shrink)
            .overlaps(&player_hitbox)
    });

    if let Some(idx) = hit_index {
        let obstacle = obstacles.remove(idx);
        let center = obstacle.bounds(tuning.ground_level).center();
        let id = ids.next_id();

        // One impact flash at a time
        splash_effects.clear();
        splash_effects.push(EffectMarker {
            id,
            x: center.x,
            y: center.y,
        });

        report.hit = true;
        report.splash = Some(id);
        report.energy_delta -= tuning.hit_energy_penalty;
        log::debug!("Hit obstacle {}", obstacle.id);
    }

    let size = tuning.collectible_size;
    collectibles.retain(|c| {
        let bounds = c.bounds(size);
        if !bounds.overlaps(&player) {
            return true;
        }
        let center = bounds.center();
        let id = ids.next_id();
        collection_effects.push(EffectMarker {
            id,
            x: center.x,
            y: center.y,
        });
        report.collected.push(id);
        report.energy_delta += tuning.collect_energy_bonus;
        false
    });

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{PLAYER_HEIGHT, PLAYER_WIDTH};

    struct World {
        obstacles: Vec<Obstacle>,
        collectibles: Vec<Collectible>,
        collection_effects: Vec<EffectMarker>,
        splash_effects: Vec<EffectMarker>,
        ids: EntityIds,
        tuning: Tuning,
    }

    impl World {
        fn new() -> Self {
            Self {
                obstacles: Vec::new(),
                collectibles: Vec::new(),
                collection_effects: Vec::new(),
                splash_effects: Vec::new(),
                ids: EntityIds::default(),
                tuning: Tuning::default(),
            }
        }

        fn obstacle(&mut self, x: f32) -> u32 {
            let id = self.ids.next_id();
            self.obstacles.push(Obstacle {
                id,
                x,
                width: self.tuning.obstacle_width,
                height: self.tuning.obstacle_height,
            });
            id
        }

        fn collectible(&mut self, x: f32, y: f32) -> u32 {
            let id = self.ids.next_id();
            self.collectibles.push(Collectible { id, x, y });
            id
        }

        fn resolve(&mut self, player: Aabb) -> CollisionReport {
            resolve_collisions(
                player,
                &mut self.obstacles,
                &mut self.collectibles,
                &mut self.collection_effects,
                &mut self.splash_effects,
                &mut self.ids,
                &self.tuning,
            )
        }
    }

    fn player_at(x: f32, y: f32) -> Aabb {
        Aabb::from_corner(Vec2::new(x, y), Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT))
    }

    #[test]
    fn test_shrunk_keeps_center() {
        let b = Aabb::from_corner(Vec2::new(0.0, 0.0), Vec2::new(100.0, 40.0));
        let s = b.shrunk(0.5);
        assert_eq!(s.center(), b.center());
        assert_eq!(s.size(), Vec2::new(50.0, 20.0));
        assert_eq!(s.min, Vec2::new(25.0, 10.0));
    }

    #[test]
    fn test_touching_boxes_do_not_overlap() {
        let a = Aabb::from_corner(Vec2::ZERO, Vec2::splat(10.0));
        let b = Aabb::from_corner(Vec2::new(10.0, 0.0), Vec2::splat(10.0));
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&Aabb::from_corner(Vec2::new(9.0, 9.0), Vec2::splat(10.0))));
    }

    #[test]
    fn test_obstacle_hit() {
        let mut world = World::new();
        let hit_id = world.obstacle(150.0);
        let report = world.resolve(player_at(150.0, 0.0));

        assert!(report.hit);
        assert_eq!(report.energy_delta, -5.0);
        assert!(world.obstacles.iter().all(|o| o.id != hit_id));
        assert_eq!(world.splash_effects.len(), 1);
        assert_eq!(world.splash_effects[0].x, 150.0 + 36.0);
        assert_eq!(world.splash_effects[0].y, 30.0);
    }

    #[test]
    fn test_obstacle_miss_leaves_list_unchanged() {
        let mut world = World::new();
        world.obstacle(600.0);
        let before = world.obstacles.clone();

        let report = world.resolve(player_at(150.0, 0.0));
        assert!(!report.hit);
        assert_eq!(report.energy_delta, 0.0);
        assert_eq!(world.obstacles, before);
        assert!(world.splash_effects.is_empty());
    }

    #[test]
    fn test_shrunk_boxes_forgive_near_miss() {
        // Full boxes overlap by 20px horizontally, shrunk boxes do not
        let mut world = World::new();
        world.obstacle(150.0 + PLAYER_WIDTH - 20.0);
        let player = player_at(150.0, 0.0);
        assert!(world.obstacles[0].bounds(0.0).overlaps(&player));

        let report = world.resolve(player);
        assert!(!report.hit);
        assert_eq!(world.obstacles.len(), 1);
    }

    #[test]
    fn test_jumping_over_obstacle_is_clear() {
        let mut world = World::new();
        world.obstacle(150.0);
        let report = world.resolve(player_at(150.0, 70.0));
        assert!(!report.hit);
    }

    #[test]
    fn test_only_first_obstacle_per_tick() {
        let mut world = World::new();
        let first = world.obstacle(150.0);
        let second = world.obstacle(160.0);

        let report = world.resolve(player_at(150.0, 0.0));
        assert!(report.hit);
        assert_eq!(report.energy_delta, -5.0);
        assert_eq!(world.obstacles.len(), 1);
        assert_eq!(world.obstacles[0].id, second);
        assert_ne!(world.obstacles[0].id, first);
    }

    #[test]
    fn test_splash_list_is_replaced_not_appended() {
        let mut world = World::new();
        world.splash_effects.push(EffectMarker { id: 500, x: 1.0, y: 1.0 });
        world.obstacle(150.0);

        let report = world.resolve(player_at(150.0, 0.0));
        assert_eq!(world.splash_effects.len(), 1);
        assert_eq!(Some(world.splash_effects[0].id), report.splash);
    }

    #[test]
    fn test_multi_collect() {
        let mut world = World::new();
        // Three non-overlapping pickups all inside the full player box
        world.collectible(150.0, 0.0);
        world.collectible(150.0, 40.0);
        world.collectible(190.0, 20.0);

        let report = world.resolve(player_at(150.0, 0.0));
        assert!(!report.hit);
        assert_eq!(report.energy_delta, 36.0);
        assert!(world.collectibles.is_empty());
        assert_eq!(report.collected.len(), 3);
        assert_eq!(world.collection_effects.len(), 3);
    }

    #[test]
    fn test_collect_uses_full_player_box() {
        let mut world = World::new();
        // Overlaps only the outer 10px of the player box
        let far = world.collectible(150.0 + PLAYER_WIDTH - 10.0, 10.0);
        let out = world.collectible(400.0, 10.0);

        let report = world.resolve(player_at(150.0, 0.0));
        assert_eq!(report.energy_delta, 12.0);
        assert_eq!(world.collectibles.len(), 1);
        assert_eq!(world.collectibles[0].id, out);
        assert_ne!(world.collectibles[0].id, far);
    }

    #[test]
    fn test_hit_and_collect_same_tick() {
        let mut world = World::new();
        world.obstacle(150.0);
        world.collectible(160.0, 30.0);

        let report = world.resolve(player_at(150.0, 0.0));
        assert!(report.hit);
        assert_eq!(report.energy_delta, -5.0 + 12.0);
    }
}
