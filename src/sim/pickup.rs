//! Apple spawning and consumption
//!
//! Apples are placed by rejection sampling inside the arena, away from the
//! chain. Spawning only runs while Playing. Pausing freezes the apples in
//! place; every other way of leaving play clears them.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bounds::{BoundaryProvider, RectBounds};
use super::chain::SegmentChain;
use super::pool::{EntityPool, Handle};
use super::state::{GameEvent, GameState};
use crate::{Settings, planar_distance};

/// Placement attempts per spawn before giving up for this interval
pub const MAX_SPAWN_ATTEMPTS: u32 = 32;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Apple {
    pub handle: Handle,
    pub position: Vec3,
}

#[derive(Debug, Clone)]
pub struct AppleSpawner {
    apples: Vec<Apple>,
    rng: Pcg32,
    area: RectBounds,
    spawn_interval: f32,
    max_apples: usize,
    apple_radius: f32,
    since_spawn: f32,
    active: bool,
}

impl AppleSpawner {
    pub fn new(settings: &Settings) -> Self {
        Self {
            apples: Vec::new(),
            rng: Pcg32::seed_from_u64(settings.seed),
            area: RectBounds::from_settings(settings).inset(settings.apple_radius),
            spawn_interval: settings.apple_spawn_interval,
            max_apples: settings.max_apples,
            apple_radius: settings.apple_radius,
            since_spawn: 0.0,
            active: false,
        }
    }

    pub fn apples(&self) -> &[Apple] {
        &self.apples
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the spawn timer; spawns at most one apple
    pub fn tick(&mut self, dt: f32, chain: &SegmentChain, pool: Option<&mut dyn EntityPool>) {
        if !self.active || self.apples.len() >= self.max_apples {
            return;
        }
        self.since_spawn += dt;
        if self.since_spawn < self.spawn_interval {
            return;
        }
        let Some(pool) = pool else {
            log::debug!("No pool attached, apple spawn skipped");
            return;
        };
        self.since_spawn = 0.0;
        self.spawn(chain, pool);
    }

    /// Place one apple clear of the chain, if a spot can be found
    pub fn spawn(&mut self, chain: &SegmentChain, pool: &mut dyn EntityPool) -> Option<Vec3> {
        let position = self.find_spot(chain)?;
        self.apples.push(Apple {
            handle: pool.acquire_pickup(),
            position,
        });
        log::debug!("Apple spawned at ({:.2}, {:.2})", position.x, position.z);
        Some(position)
    }

    fn find_spot(&mut self, chain: &SegmentChain) -> Option<Vec3> {
        let clearance = chain.segment_radius() + self.apple_radius;
        let (min, max) = (self.area.min(), self.area.max());

        for _ in 0..MAX_SPAWN_ATTEMPTS {
            let candidate = Vec3::new(
                self.rng.random_range(min.x..=max.x),
                0.0,
                self.rng.random_range(min.y..=max.y),
            );
            let near_apple = self
                .apples
                .iter()
                .any(|a| planar_distance(a.position, candidate) < self.apple_radius * 2.0);
            if self.area.is_within_bounds(candidate)
                && !chain.overlaps(candidate, clearance)
                && !near_apple
            {
                return Some(candidate);
            }
        }
        log::debug!("No free spot for an apple after {} attempts", MAX_SPAWN_ATTEMPTS);
        None
    }

    /// Remove apples touching the head; returns how many were eaten
    pub fn consume(&mut self, head: Vec3, reach: f32, pool: Option<&mut dyn EntityPool>) -> u32 {
        let reach = reach + self.apple_radius;
        let (eaten, kept): (Vec<Apple>, Vec<Apple>) = self
            .apples
            .drain(..)
            .partition(|a| planar_distance(a.position, head) < reach);
        self.apples = kept;

        if let Some(pool) = pool {
            for apple in &eaten {
                pool.release(apple.handle);
            }
        }
        eaten.len() as u32
    }

    /// Remove every apple
    pub fn clear(&mut self, pool: Option<&mut dyn EntityPool>) {
        match pool {
            Some(pool) => {
                for apple in self.apples.drain(..) {
                    pool.release(apple.handle);
                }
            }
            None => self.apples.clear(),
        }
        self.since_spawn = 0.0;
    }

    pub fn on_event(&mut self, event: &GameEvent, pool: Option<&mut dyn EntityPool>) {
        let GameEvent::StateChanged { next, .. } = *event else {
            return;
        };
        match next {
            GameState::Playing => self.active = true,
            // Keep apples where they are while paused
            GameState::Paused => self.active = false,
            _ => {
                self.active = false;
                self.clear(pool);
            }
        }
    }
}
