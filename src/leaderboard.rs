//! Local leaderboard of finished runs
//!
//! Persisted to LocalStorage, tracks the top 10 distances. The remote board
//! is fed separately by the host page.

use serde::{Deserialize, Serialize};

use crate::platform::storage;
use crate::settings::sanitize_username;

/// Maximum number of entries to keep
pub const MAX_ENTRIES: usize = 10;

/// A single finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    /// Meters travelled
    pub distance: f32,
    pub bike_id: u32,
    /// Unix timestamp (ms) when achieved
    pub timestamp: f64,
}

/// Best runs, sorted by distance descending
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    const STORAGE_KEY: &'static str = "bike_dash_leaderboard";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Check if a distance qualifies for the board
    pub fn qualifies(&self, distance: f32) -> bool {
        if !distance.is_finite() || distance <= 0.0 {
            return false;
        }
        if self.entries.len() < MAX_ENTRIES {
            return true;
        }
        self.entries.last().map(|e| distance > e.distance).unwrap_or(true)
    }

    /// Rank a distance would achieve (1-indexed, None if it doesn't qualify)
    pub fn potential_rank(&self, distance: f32) -> Option<usize> {
        if !self.qualifies(distance) {
            return None;
        }
        let rank = self.entries.iter().position(|e| distance > e.distance);
        Some(rank.unwrap_or(self.entries.len()) + 1)
    }

    /// Add a finished run. Returns the rank achieved or None.
    pub fn add_entry(
        &mut self,
        username: &str,
        distance: f32,
        bike_id: u32,
        timestamp: f64,
    ) -> Option<usize> {
        if !self.qualifies(distance) {
            return None;
        }

        let entry = LeaderboardEntry {
            username: sanitize_username(username),
            distance,
            bike_id,
            timestamp,
        };

        let pos = self.entries.iter().position(|e| distance > e.distance);
        let rank = match pos {
            Some(i) => {
                self.entries.insert(i, entry);
                i + 1
            }
            None => {
                self.entries.push(entry);
                self.entries.len()
            }
        };

        self.entries.truncate(MAX_ENTRIES);

        Some(rank)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_distance(&self) -> Option<f32> {
        self.entries.first().map(|e| e.distance)
    }

    /// Best run for a given rider
    pub fn personal_best(&self, username: &str) -> Option<&LeaderboardEntry> {
        let username = sanitize_username(username);
        self.entries.iter().find(|e| e.username == username)
    }

    /// Load from LocalStorage
    pub fn load() -> Self {
        match storage::load::<Leaderboard>(Self::STORAGE_KEY) {
            Ok(board) => {
                log::info!("Loaded {} leaderboard entries", board.entries.len());
                board
            }
            Err(e) => {
                log::info!("No leaderboard loaded ({}), starting fresh", e);
                Self::new()
            }
        }
    }

    /// Save to LocalStorage
    pub fn save(&self) {
        if storage::save(Self::STORAGE_KEY, self) {
            log::info!("Leaderboard saved ({} entries)", self.entries.len());
        }
    }
}
