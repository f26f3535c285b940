//! Idle/demo mode - the bike rides itself
//!
//! Looks at the nearest obstacle ahead of the rider and jumps when it is
//! about to arrive under the middle of the jump arc.

use super::physics::airtime_ticks;
use super::tick::Simulation;

/// Should the demo rider jump this tick?
pub fn should_jump(sim: &Simulation) -> bool {
    if !sim.is_running() || !sim.physics().grounded {
        return false;
    }

    let tuning = sim.tuning();
    let player = sim.player_bounds();
    let scroll_speed = sim.profile().visual_speed * sim.speed_multiplier().max(tuning.acceleration);

    // Obstacle should reach the rider roughly halfway through the airtime
    let lead = scroll_speed * airtime_ticks(tuning) as f32 * 0.5;

    sim.obstacles()
        .iter()
        .filter(|o| o.x + o.width > player.min.x)
        .map(|o| o.x - player.max.x)
        .fold(None, |nearest: Option<f32>, gap| {
            Some(nearest.map_or(gap, |n| n.min(gap)))
        })
        .is_some_and(|gap| gap <= lead)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{GameEvent, GamePhase, Viewport};
    use crate::tuning::{DeviceClass, Tuning};

    fn demo_sim(tuning: Tuning) -> Simulation {
        let mut sim = Simulation::new(tuning, 4242, Viewport::new(1200.0, 700.0), DeviceClass::Desktop);
        sim.start();
        sim
    }

    #[test]
    fn test_no_jump_on_empty_road() {
        let tuning = Tuning {
            obstacle_spawn_chance: 0.0,
            collectible_spawn_chance: 0.0,
            ..Default::default()
        };
        let mut sim = demo_sim(tuning);
        for _ in 0..200 {
            assert!(!should_jump(&sim));
            sim.tick();
        }
    }

    #[test]
    fn test_no_jump_when_idle() {
        let sim = Simulation::new(Tuning::default(), 1, Viewport::default(), DeviceClass::Desktop);
        assert!(!should_jump(&sim));
    }

    #[test]
    fn test_autopilot_clears_obstacles() {
        let mut sim = demo_sim(Tuning {
            collectible_spawn_chance: 0.0,
            ..Default::default()
        });

        let mut hits = 0;
        let mut spawned = 0;
        let mut last_ids = Vec::new();
        for _ in 0..3000 {
            if should_jump(&sim) {
                sim.request_jump();
            }
            let events = sim.tick();
            hits += events.iter().filter(|e| matches!(e, GameEvent::SpinStarted { .. })).count();
            for o in sim.obstacles() {
                if !last_ids.contains(&o.id) {
                    spawned += 1;
                    last_ids.push(o.id);
                }
            }
            if sim.phase() == GamePhase::GameOver {
                break;
            }
        }

        assert!(spawned > 10, "expected a busy road, got {}", spawned);
        assert!(hits * 2 < spawned, "demo rider hit {} of {} obstacles", hits, spawned);
    }
}
