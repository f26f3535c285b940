//! Procedural obstacle/collectible spawning
//!
//! Checked once per tick. Two independent rolls, then a placement check
//! that keeps a minimum horizontal gap between any two entities regardless
//! of kind.

use rand::Rng;

use super::state::{Collectible, EntityIds, Obstacle, Viewport};
use crate::tuning::Tuning;

/// Outcome of this tick's random rolls
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SpawnRolls {
    pub obstacle: bool,
    /// Height above ground of a proposed collectible
    pub collectible_height: Option<f32>,
}

impl SpawnRolls {
    pub fn roll<R: Rng>(rng: &mut R, tuning: &Tuning) -> Self {
        let obstacle = rng.random::<f64>() < tuning.obstacle_spawn_chance;
        let collectible_height = if rng.random::<f64>() < tuning.collectible_spawn_chance {
            Some(rng.random_range(tuning.collectible_min_height..=tuning.collectible_max_height))
        } else {
            None
        };
        Self {
            obstacle,
            collectible_height,
        }
    }
}

/// What actually made it into the world this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spawned {
    pub obstacle: Option<u32>,
    pub collectible: Option<u32>,
}

/// True when `[x, x + width]` keeps `buffer` clearance from every entity
pub fn placement_clear(
    x: f32,
    width: f32,
    buffer: f32,
    obstacles: &[Obstacle],
    collectibles: &[Collectible],
    collectible_size: f32,
) -> bool {
    let too_close = |other_x: f32, other_width: f32| {
        x < other_x + other_width + buffer && other_x < x + width + buffer
    };

    !obstacles.iter().any(|o| too_close(o.x, o.width))
        && !collectibles.iter().any(|c| too_close(c.x, collectible_size))
}

/// Apply this tick's rolls at the right edge of the viewport. The obstacle
/// is placed first, so a collectible rolled in the same tick is checked
/// against it.
pub fn spawn(
    rolls: SpawnRolls,
    viewport: &Viewport,
    tuning: &Tuning,
    obstacles: &mut Vec<Obstacle>,
    collectibles: &mut Vec<Collectible>,
    ids: &mut EntityIds,
) -> Spawned {
    let x = viewport.spawn_x();
    let mut spawned = Spawned::default();

    if rolls.obstacle
        && placement_clear(
            x,
            tuning.obstacle_width,
            tuning.spawn_buffer,
            obstacles,
            collectibles,
            tuning.collectible_size,
        )
    {
        let id = ids.next_id();
        obstacles.push(Obstacle {
            id,
            x,
            width: tuning.obstacle_width,
            height: tuning.obstacle_height,
        });
        spawned.obstacle = Some(id);
        log::debug!("Spawned obstacle {} at x={}", id, x);
    }

    if let Some(height) = rolls.collectible_height {
        if placement_clear(
            x,
            tuning.collectible_size,
            tuning.spawn_buffer,
            obstacles,
            collectibles,
            tuning.collectible_size,
        ) {
            let id = ids.next_id();
            let y = tuning.ground_level + height;
            collectibles.push(Collectible { id, x, y });
            spawned.collectible = Some(id);
            log::debug!("Spawned collectible {} at ({}, {})", id, x, y);
        }
    }

    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn existing_obstacle(x: f32) -> Obstacle {
        Obstacle {
            id: 99,
            x,
            width: 72.0,
            height: 60.0,
        }
    }

    #[test]
    fn test_separation_against_obstacle() {
        let obstacles = vec![existing_obstacle(500.0)];

        assert!(!placement_clear(600.0, 72.0, 100.0, &obstacles, &[], 40.0));
        assert!(placement_clear(750.0, 72.0, 100.0, &obstacles, &[], 40.0));
        // Left side needs the same clearance
        assert!(!placement_clear(350.0, 72.0, 100.0, &obstacles, &[], 40.0));
        assert!(placement_clear(300.0, 72.0, 100.0, &obstacles, &[], 40.0));
    }

    #[test]
    fn test_separation_against_collectible() {
        let collectibles = vec![Collectible { id: 5, x: 1000.0, y: 100.0 }];

        assert!(!placement_clear(1100.0, 72.0, 100.0, &[], &collectibles, 40.0));
        assert!(placement_clear(1141.0, 72.0, 100.0, &[], &collectibles, 40.0));
    }

    #[test]
    fn test_spawn_at_right_edge() {
        let tuning = Tuning::default();
        let viewport = Viewport::new(1000.0, 600.0);
        let mut obstacles = Vec::new();
        let mut collectibles = Vec::new();
        let mut ids = EntityIds::default();

        let rolls = SpawnRolls {
            obstacle: true,
            collectible_height: None,
        };
        let spawned = spawn(rolls, &viewport, &tuning, &mut obstacles, &mut collectibles, &mut ids);

        assert!(spawned.obstacle.is_some());
        assert_eq!(obstacles.len(), 1);
        assert_eq!(obstacles[0].x, 1000.0);
        assert_eq!(obstacles[0].width, tuning.obstacle_width);
        assert_eq!(obstacles[0].height, tuning.obstacle_height);
    }

    #[test]
    fn test_same_tick_collectible_blocked_by_new_obstacle() {
        let tuning = Tuning::default();
        let viewport = Viewport::new(1000.0, 600.0);
        let mut obstacles = Vec::new();
        let mut collectibles = Vec::new();
        let mut ids = EntityIds::default();

        let rolls = SpawnRolls {
            obstacle: true,
            collectible_height: Some(100.0),
        };
        let spawned = spawn(rolls, &viewport, &tuning, &mut obstacles, &mut collectibles, &mut ids);

        assert!(spawned.obstacle.is_some());
        assert!(spawned.collectible.is_none());
        assert!(collectibles.is_empty());
    }

    #[test]
    fn test_rejection_then_lone_collectible() {
        let tuning = Tuning::default();
        let viewport = Viewport::new(1000.0, 600.0);
        // Both proposals share the right edge, so one nearby obstacle blocks both
        let mut obstacles = vec![existing_obstacle(950.0)];
        let mut collectibles = Vec::new();
        let mut ids = EntityIds::default();

        let rolls = SpawnRolls {
            obstacle: true,
            collectible_height: Some(100.0),
        };
        let spawned = spawn(rolls, &viewport, &tuning, &mut obstacles, &mut collectibles, &mut ids);
        assert_eq!(spawned, Spawned::default());
        assert_eq!(obstacles.len(), 1);

        // Nothing nearby: a lone collectible roll succeeds at its band height
        obstacles.clear();
        let rolls = SpawnRolls {
            obstacle: false,
            collectible_height: Some(100.0),
        };
        let spawned = spawn(rolls, &viewport, &tuning, &mut obstacles, &mut collectibles, &mut ids);
        assert!(spawned.collectible.is_some());
        assert_eq!(collectibles[0].y, tuning.ground_level + 100.0);
    }

    #[test]
    fn test_rolls_respect_probability() {
        let mut rng = Pcg32::seed_from_u64(7);

        let never = Tuning {
            obstacle_spawn_chance: 0.0,
            collectible_spawn_chance: 0.0,
            ..Default::default()
        };
        for _ in 0..1000 {
            assert_eq!(SpawnRolls::roll(&mut rng, &never), SpawnRolls::default());
        }

        let always = Tuning {
            obstacle_spawn_chance: 1.0,
            collectible_spawn_chance: 1.0,
            ..Default::default()
        };
        for _ in 0..100 {
            let rolls = SpawnRolls::roll(&mut rng, &always);
            assert!(rolls.obstacle);
            let h = rolls.collectible_height.unwrap();
            assert!(h >= always.collectible_min_height && h <= always.collectible_max_height);
        }
    }
}
