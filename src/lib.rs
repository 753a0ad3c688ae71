//! Serpentine - a chained-segment snake simulation core
//!
//! Core modules:
//! - `sim`: Fixed-tick simulation (locomotion, growth, self-collision, game state)
//! - `settings`: Data-driven tuning for speeds, timers and geometry

pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{Game, GameEvent, GameState};

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Snake movement speed (units/s)
    pub const INITIAL_SPEED: f32 = 5.0;
    pub const MAX_SPEED: f32 = 12.0;
    /// Speed gained per increase step
    pub const SPEED_INCREASE_RATE: f32 = 0.5;
    /// Seconds between speed increases
    pub const SPEED_INCREASE_INTERVAL: f32 = 10.0;

    /// Target spacing between consecutive segments
    pub const SEGMENT_RADIUS: f32 = 0.5;
    /// Segments (including head) in a freshly built chain
    pub const INITIAL_LENGTH: usize = 4;
    pub const GROWTH_PER_APPLE: u32 = 1;

    /// Contacts closer to the head than this index are ignored
    pub const MIN_SEGMENT_DISTANCE: usize = 3;
    /// Self-collision probe sits this far in front of the head
    pub const PROBE_OFFSET: f32 = 0.3;
    pub const PROBE_RADIUS: f32 = 0.2;

    /// Lifecycle timers (seconds)
    pub const COUNTDOWN_DURATION: f32 = 3.0;
    pub const LEVEL_COMPLETED_DURATION: f32 = 2.0;
    pub const LEVEL_FAILED_DURATION: f32 = 2.0;
    pub const GAME_OVER_DURATION: f32 = 3.0;
    pub const STARTING_LIVES: u32 = 3;

    /// Arena half extents on the x/z plane
    pub const ARENA_HALF_WIDTH: f32 = 15.0;
    pub const ARENA_HALF_DEPTH: f32 = 15.0;

    /// Apple spawning
    pub const APPLE_SPAWN_INTERVAL: f32 = 2.0;
    pub const MAX_APPLES: usize = 3;
    pub const APPLE_RADIUS: f32 = 0.4;
    pub const APPLE_SCORE: u32 = 10;
}

/// Project a point or direction onto the ground plane (y = 0)
#[inline]
pub fn flatten(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Distance between two points measured on the x/z plane only
#[inline]
pub fn planar_distance(a: Vec3, b: Vec3) -> f32 {
    flatten(b - a).length()
}

/// Heading angle of a planar facing vector (radians, 0 = +z)
#[inline]
pub fn facing_yaw(facing: Vec3) -> f32 {
    facing.x.atan2(facing.z)
}
