//! Fixed timestep locomotion
//!
//! The tick source turns variable frame times into a whole number of fixed
//! simulation steps, and the locomotion driver runs one step of the snake:
//! head move, growth, relaxation, self-collision, then the boundary check.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bounds::BoundaryProvider;
use super::chain::SegmentChain;
use super::collision::SelfCollisionDetector;
use super::pool::EntityPool;
use crate::consts::*;
use crate::flatten;

/// Accumulator that emits fixed-size steps
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedTimestep {
    step: f32,
    max_substeps: u32,
    accumulator: f32,
    total_steps: u64,
}

impl FixedTimestep {
    pub fn new(tick_rate: f32) -> Self {
        Self {
            step: 1.0 / tick_rate,
            max_substeps: MAX_SUBSTEPS,
            accumulator: 0.0,
            total_steps: 0,
        }
    }

    pub fn step(&self) -> f32 {
        self.step
    }

    pub fn total_steps(&self) -> u64 {
        self.total_steps
    }

    /// Leftover fraction of a step, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.step
    }

    /// Longest frame the accumulator accepts: one full batch of substeps
    pub fn max_frame_dt(&self) -> f32 {
        self.step * self.max_substeps as f32
    }

    /// Feed one frame of wall time; returns how many steps to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_nan() || frame_dt <= 0.0 {
            return 0;
        }
        let max_frame = self.max_frame_dt();
        if frame_dt > max_frame {
            log::warn!(
                "Frame of {:.3}s over the substep cap, dropping {:.3}s",
                frame_dt,
                frame_dt - max_frame
            );
        }
        self.accumulator += frame_dt.min(max_frame);

        let mut substeps = 0;
        while self.accumulator >= self.step && substeps < self.max_substeps {
            self.accumulator -= self.step;
            substeps += 1;
        }

        // Leftover from the previous frame can still overflow the cap
        if self.accumulator >= self.step {
            let dropped = (self.accumulator / self.step).floor();
            log::debug!("Dropping {} backlogged steps", dropped);
            self.accumulator -= dropped * self.step;
        }

        self.total_steps += u64::from(substeps);
        substeps
    }

    /// Discard any partial step carried over from earlier frames
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

impl Default for FixedTimestep {
    fn default() -> Self {
        Self::new(TICK_RATE)
    }
}

/// Steering for a single tick (planar direction, any length)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TickInput {
    pub direction: Vec3,
}

impl TickInput {
    pub fn new(direction: Vec3) -> Self {
        Self {
            direction: flatten(direction).normalize_or_zero(),
        }
    }

    /// Direction from a heading angle (radians, 0 = +z)
    pub fn from_yaw(yaw: f32) -> Self {
        Self::new(Vec3::new(yaw.sin(), 0.0, yaw.cos()))
    }

    /// Steer from `from` toward `to`
    pub fn towards(from: Vec3, to: Vec3) -> Self {
        Self::new(to - from)
    }
}

/// Follow point for a camera or viewpoint; only x/z track the head
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FollowAnchor {
    pub position: Vec3,
}

impl FollowAnchor {
    pub fn new(position: Vec3) -> Self {
        Self { position }
    }

    pub fn follow(&mut self, target: Vec3) {
        self.position.x = target.x;
        self.position.z = target.z;
    }
}

/// Violations found during one locomotion step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocomotionReport {
    /// Chain index the head ran into
    pub self_collision: Option<usize>,
    pub out_of_bounds: bool,
}

impl LocomotionReport {
    pub fn life_lost(&self) -> bool {
        self.self_collision.is_some() || self.out_of_bounds
    }
}

/// Per-tick locomotion driver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    pub detector: SelfCollisionDetector,
    pub anchor: FollowAnchor,
}

impl Locomotion {
    pub fn new(detector: SelfCollisionDetector) -> Self {
        Self {
            detector,
            anchor: FollowAnchor::default(),
        }
    }

    /// Run one Playing step. Missing collaborators skip their part.
    pub fn step(
        &mut self,
        chain: &mut SegmentChain,
        input: &TickInput,
        speed: f32,
        dt: f32,
        pool: Option<&mut dyn EntityPool>,
        bounds: Option<&dyn BoundaryProvider>,
    ) -> LocomotionReport {
        let mut report = LocomotionReport::default();
        if chain.is_empty() {
            return report;
        }

        chain.advance(input.direction, speed * dt, pool);

        let Some(head) = chain.head().map(|h| h.position) else {
            return report;
        };
        self.anchor.follow(head);

        report.self_collision = self.detector.check(chain);
        if let Some(index) = report.self_collision {
            log::info!("Head hit its own body at segment {}", index);
        }

        match bounds {
            Some(bounds) => {
                if !bounds.is_within_bounds(head) {
                    log::info!("Head left the arena at ({:.2}, {:.2})", head.x, head.z);
                    report.out_of_bounds = true;
                }
            }
            None => log::debug!("No boundary provider, boundary check skipped"),
        }

        report
    }
}

impl Default for Locomotion {
    fn default() -> Self {
        Self::new(SelfCollisionDetector::default())
    }
}
