//! Self-collision detection
//!
//! A small probe sits a fixed distance in front of the head so it does not
//! start out overlapping the segment right behind it. Contacts are gathered
//! by a plain circle broad-phase, mapped back to chain indices, and only
//! count when the contacted segment is far enough down the chain that normal
//! turning could not have produced the overlap.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::chain::SegmentChain;
use super::pool::Handle;
use crate::{Settings, planar_distance};

/// Forward-offset probe attached to the head
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfCollisionProbe {
    /// Distance ahead of the head center
    pub offset: f32,
    pub radius: f32,
}

impl SelfCollisionProbe {
    pub fn new(offset: f32, radius: f32) -> Self {
        Self { offset, radius }
    }

    /// World position of the probe for the current head
    pub fn position(&self, chain: &SegmentChain) -> Option<Vec3> {
        chain
            .head()
            .map(|head| head.position + head.facing * self.offset)
    }
}

/// What a single contact amounts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactVerdict {
    /// Contact is the head itself
    Head,
    /// Geometry is not part of this chain
    Unresolved,
    /// Segment too close to the head to count
    Ignored { index: usize },
    SelfCollision { index: usize },
}

impl ContactVerdict {
    pub fn is_collision(&self) -> bool {
        matches!(self, ContactVerdict::SelfCollision { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SelfCollisionDetector {
    pub probe: SelfCollisionProbe,
    /// Contacts at chain indices below this are ignored
    pub min_segment_distance: usize,
}

impl SelfCollisionDetector {
    pub fn new(probe: SelfCollisionProbe, min_segment_distance: usize) -> Self {
        Self {
            probe,
            min_segment_distance,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            SelfCollisionProbe::new(settings.probe_offset, settings.probe_radius),
            settings.min_segment_distance,
        )
    }

    /// Collider radius of one segment; neighbours at rest just touch
    pub fn segment_collider_radius(chain: &SegmentChain) -> f32 {
        chain.segment_radius() * 0.5
    }

    /// Broad-phase: handles of every segment overlapping the probe
    pub fn contacts(&self, chain: &SegmentChain) -> Vec<Handle> {
        let Some(probe_pos) = self.probe.position(chain) else {
            return Vec::new();
        };
        let reach = self.probe.radius + Self::segment_collider_radius(chain);
        chain
            .segments()
            .iter()
            .filter(|s| planar_distance(s.position, probe_pos) < reach)
            .map(|s| s.handle)
            .collect()
    }

    /// Classify one contact reported against `chain`
    pub fn evaluate_contact(&self, chain: &SegmentChain, handle: Handle) -> ContactVerdict {
        let Some(index) = chain.index_of(handle) else {
            return ContactVerdict::Unresolved;
        };
        if chain.segments()[index].is_head() {
            return ContactVerdict::Head;
        }
        if index < self.min_segment_distance {
            return ContactVerdict::Ignored { index };
        }
        ContactVerdict::SelfCollision { index }
    }

    /// First chain index the head ran into this tick, if any
    pub fn check(&self, chain: &SegmentChain) -> Option<usize> {
        self.contacts(chain)
            .into_iter()
            .find_map(|handle| match self.evaluate_contact(chain, handle) {
                ContactVerdict::SelfCollision { index } => Some(index),
                _ => None,
            })
    }
}

impl Default for SelfCollisionDetector {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
