//! Simulation tuning
//!
//! Every speed, timer and geometric constant the simulation reads lives here,
//! loadable from JSON so balance can be tweaked without a rebuild.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Tunable simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Tick ===
    /// Fixed simulation rate (Hz)
    pub tick_rate: f32,

    // === Speed ===
    pub initial_speed: f32,
    pub max_speed: f32,
    /// Speed added per increase step
    pub speed_increase_rate: f32,
    /// Seconds of play between increases
    pub speed_increase_interval: f32,

    // === Chain ===
    /// Target spacing between consecutive segments
    pub segment_radius: f32,
    /// Segments in a freshly built chain (head included)
    pub initial_length: usize,
    pub growth_per_apple: u32,
    /// Head spawn point (y is ignored)
    pub spawn_position: Vec3,
    /// Initial head facing (projected to the plane)
    pub spawn_facing: Vec3,

    // === Self-collision ===
    pub min_segment_distance: usize,
    pub probe_offset: f32,
    pub probe_radius: f32,

    // === Lifecycle ===
    pub countdown_duration: f32,
    pub level_completed_duration: f32,
    pub level_failed_duration: f32,
    pub game_over_duration: f32,
    pub starting_lives: u32,

    // === Arena ===
    pub arena_half_width: f32,
    pub arena_half_depth: f32,

    // === Apples ===
    pub apple_spawn_interval: f32,
    pub max_apples: usize,
    pub apple_radius: f32,
    pub apple_score: u32,
    /// Seed for apple placement
    pub seed: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,

            initial_speed: INITIAL_SPEED,
            max_speed: MAX_SPEED,
            speed_increase_rate: SPEED_INCREASE_RATE,
            speed_increase_interval: SPEED_INCREASE_INTERVAL,

            segment_radius: SEGMENT_RADIUS,
            initial_length: INITIAL_LENGTH,
            growth_per_apple: GROWTH_PER_APPLE,
            spawn_position: Vec3::ZERO,
            spawn_facing: Vec3::Z,

            min_segment_distance: MIN_SEGMENT_DISTANCE,
            probe_offset: PROBE_OFFSET,
            probe_radius: PROBE_RADIUS,

            countdown_duration: COUNTDOWN_DURATION,
            level_completed_duration: LEVEL_COMPLETED_DURATION,
            level_failed_duration: LEVEL_FAILED_DURATION,
            game_over_duration: GAME_OVER_DURATION,
            starting_lives: STARTING_LIVES,

            arena_half_width: ARENA_HALF_WIDTH,
            arena_half_depth: ARENA_HALF_DEPTH,

            apple_spawn_interval: APPLE_SPAWN_INTERVAL,
            max_apples: MAX_APPLES,
            apple_radius: APPLE_RADIUS,
            apple_score: APPLE_SCORE,
            seed: 0x5eed,
        }
    }
}

impl Settings {
    /// Fixed timestep derived from the tick rate
    pub fn fixed_dt(&self) -> f32 {
        1.0 / self.tick_rate
    }

    /// Parse settings from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Settings>(json).map(Settings::validated)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    return settings;
                }
                Err(e) => log::warn!("Invalid settings in {}: {}", path.display(), e),
            },
            Err(e) => log::warn!("Could not read {}: {}", path.display(), e),
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Repair values the simulation cannot run with
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();

        if self.tick_rate.is_nan() || self.tick_rate <= 0.0 {
            log::warn!("tick_rate {} invalid, using {}", self.tick_rate, defaults.tick_rate);
            self.tick_rate = defaults.tick_rate;
        }
        if self.segment_radius.is_nan() || self.segment_radius <= 0.0 {
            log::warn!(
                "segment_radius {} invalid, using {}",
                self.segment_radius,
                defaults.segment_radius
            );
            self.segment_radius = defaults.segment_radius;
        }
        if self.initial_speed < 0.0 {
            self.initial_speed = 0.0;
        }
        if self.max_speed < self.initial_speed {
            log::warn!(
                "max_speed {} below initial_speed {}, clamping",
                self.max_speed,
                self.initial_speed
            );
            self.max_speed = self.initial_speed;
        }
        if self.speed_increase_rate.is_nan() || self.speed_increase_rate < 0.0 {
            log::warn!(
                "speed_increase_rate {} invalid, using 0",
                self.speed_increase_rate
            );
            self.speed_increase_rate = 0.0;
        }
        if self.speed_increase_interval.is_nan() || self.speed_increase_interval <= 0.0 {
            log::warn!(
                "speed_increase_interval {} invalid, using {}",
                self.speed_increase_interval,
                defaults.speed_increase_interval
            );
            self.speed_increase_interval = defaults.speed_increase_interval;
        }
        if self.initial_length == 0 {
            self.initial_length = 1;
        }
        if self.flat_spawn_facing().length_squared() == 0.0 {
            self.spawn_facing = Vec3::Z;
        }
        self.arena_half_width = self.arena_half_width.abs();
        self.arena_half_depth = self.arena_half_depth.abs();

        self
    }

    /// Spawn facing projected to the plane and normalized
    pub fn flat_spawn_facing(&self) -> Vec3 {
        crate::flatten(self.spawn_facing).normalize_or_zero()
    }
}
