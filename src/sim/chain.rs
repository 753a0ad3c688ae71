//! Segment chain
//!
//! Ordered body of the snake, index 0 = head. Each tick the head is moved
//! directly and every body segment is pulled toward its predecessor
//! (sequential relaxation), so spacing never exceeds the segment radius.
//! Growth is queued and released one segment per tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::pool::{EntityPool, Handle};
use crate::flatten;

/// Capability tag; the head is excluded from self-collision contacts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentRole {
    Head,
    Body,
}

/// One link of the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub handle: Handle,
    pub role: SegmentRole,
    /// Position on the ground plane (y = 0)
    pub position: Vec3,
    /// Unit planar facing direction
    pub facing: Vec3,
}

impl Segment {
    #[inline]
    pub fn is_head(&self) -> bool {
        self.role == SegmentRole::Head
    }

    /// Heading angle (radians, 0 = +z)
    pub fn yaw(&self) -> f32 {
        crate::facing_yaw(self.facing)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentChain {
    segments: Vec<Segment>,
    segment_radius: f32,
    growth_per_apple: u32,
    pending_growth: u32,
}

impl SegmentChain {
    pub fn new(segment_radius: f32, growth_per_apple: u32) -> Self {
        Self {
            segments: Vec::new(),
            segment_radius,
            growth_per_apple,
            pending_growth: 0,
        }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn head(&self) -> Option<&Segment> {
        self.segments.first()
    }

    pub fn tail(&self) -> Option<&Segment> {
        self.segments.last()
    }

    pub fn segment_radius(&self) -> f32 {
        self.segment_radius
    }

    pub fn pending_growth(&self) -> u32 {
        self.pending_growth
    }

    /// Return every segment to the pool and lay out a fresh straight chain
    /// of `length` segments trailing behind `position`.
    pub fn rebuild(
        &mut self,
        pool: &mut dyn EntityPool,
        position: Vec3,
        facing: Vec3,
        length: usize,
    ) {
        self.clear(pool);

        let facing = flatten(facing).normalize_or(Vec3::Z);
        let origin = flatten(position);
        for i in 0..length.max(1) {
            let (handle, role) = if i == 0 {
                (pool.acquire_head(), SegmentRole::Head)
            } else {
                (pool.acquire_body(), SegmentRole::Body)
            };
            self.segments.push(Segment {
                handle,
                role,
                position: origin - facing * (self.segment_radius * i as f32),
                facing,
            });
        }
        log::debug!("Chain rebuilt with {} segments", self.segments.len());
    }

    /// Release all segments and drop queued growth
    pub fn clear(&mut self, pool: &mut dyn EntityPool) {
        for segment in self.segments.drain(..) {
            pool.release(segment.handle);
        }
        self.pending_growth = 0;
    }

    /// Queue growth; `None` uses the configured growth per apple
    pub fn grow_snake(&mut self, count: Option<u32>) {
        let count = count.unwrap_or(self.growth_per_apple);
        self.pending_growth = self.pending_growth.saturating_add(count);
    }

    /// Move the head along `direction` by `distance` and face that way.
    /// A zero direction keeps the current heading.
    pub fn move_head(&mut self, direction: Vec3, distance: f32) {
        let Some(head) = self.segments.first_mut() else {
            return;
        };
        let dir = flatten(direction).normalize_or(head.facing);
        head.position = flatten(head.position + dir * distance);
        head.facing = dir;
    }

    /// Append at most one queued segment behind the tail.
    /// Without a pool the growth stays queued.
    pub fn apply_growth(&mut self, pool: Option<&mut dyn EntityPool>) -> bool {
        if self.pending_growth == 0 {
            return false;
        }
        let Some(tail) = self.segments.last().copied() else {
            return false;
        };
        let Some(pool) = pool else {
            log::debug!("No pool attached, growth deferred");
            return false;
        };

        self.segments.push(Segment {
            handle: pool.acquire_body(),
            role: SegmentRole::Body,
            position: flatten(tail.position - tail.facing * self.segment_radius),
            facing: tail.facing,
        });
        self.pending_growth -= 1;
        true
    }

    /// Sequential head-to-tail distance relaxation
    pub fn relax(&mut self) {
        let radius = self.segment_radius;
        for i in 1..self.segments.len() {
            let leader = self.segments[i - 1].position;
            let segment = &mut self.segments[i];

            let to_leader = flatten(leader - segment.position);
            let distance = to_leader.length();
            if distance > radius {
                let dir = to_leader / distance;
                segment.position = flatten(segment.position + dir * (distance - radius));
                segment.facing = dir;
            }
        }
    }

    /// One locomotion step: head move, one growth step, relaxation
    pub fn advance(
        &mut self,
        direction: Vec3,
        distance: f32,
        pool: Option<&mut dyn EntityPool>,
    ) {
        self.move_head(direction, distance);
        self.apply_growth(pool);
        self.relax();
    }

    /// Chain index for a pooled handle, if it belongs to this chain
    pub fn index_of(&self, handle: Handle) -> Option<usize> {
        self.segments.iter().position(|s| s.handle == handle)
    }

    /// True if `point` is within `clearance` of any segment (planar)
    pub fn overlaps(&self, point: Vec3, clearance: f32) -> bool {
        self.segments
            .iter()
            .any(|s| crate::planar_distance(s.position, point) < clearance)
    }
}
