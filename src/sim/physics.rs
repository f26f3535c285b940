//! Vertical rider physics
//!
//! Plain Euler integration: velocity first, then position, then the ground
//! clamp. One call per tick.

use super::state::PlayerPhysics;
use crate::tuning::Tuning;

/// Advance the rider one tick
pub fn integrate(physics: PlayerPhysics, tuning: &Tuning) -> PlayerPhysics {
    let vel_y = physics.vel_y - tuning.gravity;
    let y = physics.y + vel_y;

    if y <= tuning.ground_level {
        PlayerPhysics::grounded_at(tuning.ground_level)
    } else {
        PlayerPhysics {
            y,
            vel_y,
            grounded: false,
        }
    }
}

/// Ticks a full jump spends in the air (for lead-distance estimates)
pub fn airtime_ticks(tuning: &Tuning) -> u32 {
    (2.0 * tuning.jump_impulse / tuning.gravity).ceil() as u32
}
