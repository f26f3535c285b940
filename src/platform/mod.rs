//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Time/ticks (frame accumulator driven by requestAnimationFrame timestamps)
//! - Storage (LocalStorage JSON, absent on native)

pub mod storage;
pub mod time;

pub use time::FrameClock;
