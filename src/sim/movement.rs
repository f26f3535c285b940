//! Leftward scrolling of world entities

use super::state::{Collectible, Obstacle};

/// Anything that scrolls with the road
pub trait Scrolling {
    fn x(&self) -> f32;
    fn set_x(&mut self, x: f32);
}

impl Scrolling for Obstacle {
    fn x(&self) -> f32 {
        self.x
    }
    fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}

impl Scrolling for Collectible {
    fn x(&self) -> f32 {
        self.x
    }
    fn set_x(&mut self, x: f32) {
        self.x = x;
    }
}

/// Move every entity left by `speed` and drop the ones past `despawn_x`
pub fn scroll<T: Scrolling>(entities: &mut Vec<T>, speed: f32, despawn_x: f32) {
    for entity in entities.iter_mut() {
        entity.set_x(entity.x() - speed);
    }
    entities.retain(|e| e.x() >= despawn_x);
}
