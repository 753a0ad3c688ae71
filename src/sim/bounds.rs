//! Play area boundary

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::Settings;

/// Answers whether a point is still inside the play area
pub trait BoundaryProvider {
    fn is_within_bounds(&self, point: Vec3) -> bool;
}

/// Axis-aligned rectangle on the x/z plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectBounds {
    /// Center (x, z)
    pub center: Vec2,
    /// Half extents (x, z)
    pub half_extents: Vec2,
}

impl RectBounds {
    pub fn new(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            Vec2::ZERO,
            Vec2::new(settings.arena_half_width, settings.arena_half_depth),
        )
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    /// Shrink by `margin` on every side (never below zero size)
    pub fn inset(&self, margin: f32) -> Self {
        Self::new(self.center, (self.half_extents - Vec2::splat(margin)).max(Vec2::ZERO))
    }
}

impl BoundaryProvider for RectBounds {
    fn is_within_bounds(&self, point: Vec3) -> bool {
        let p = Vec2::new(point.x, point.z);
        let (min, max) = (self.min(), self.max());
        p.x >= min.x && p.x <= max.x && p.y >= min.y && p.y <= max.y
    }
}
