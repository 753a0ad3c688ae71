//! Progressive speed ramp
//!
//! Speed climbs by a fixed step every interval of play, capped at the max.
//! A fresh entry into Playing resets it; resuming from Paused does not.

use serde::{Deserialize, Serialize};

use super::state::GameEvent;
use crate::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedController {
    initial_speed: f32,
    max_speed: f32,
    increase_rate: f32,
    increase_interval: f32,
    current_speed: f32,
    /// Seconds of play since the last increase
    since_increase: f32,
}

impl SpeedController {
    pub fn new(initial_speed: f32, max_speed: f32, increase_rate: f32, increase_interval: f32) -> Self {
        let max_speed = max_speed.max(initial_speed);
        Self {
            initial_speed,
            max_speed,
            // The ramp never slows the snake down
            increase_rate: increase_rate.max(0.0),
            increase_interval,
            current_speed: initial_speed,
            since_increase: 0.0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.initial_speed,
            settings.max_speed,
            settings.speed_increase_rate,
            settings.speed_increase_interval,
        )
    }

    pub fn current_speed(&self) -> f32 {
        self.current_speed
    }

    pub fn max_speed(&self) -> f32 {
        self.max_speed
    }

    pub fn reset(&mut self) {
        self.current_speed = self.initial_speed;
        self.since_increase = 0.0;
    }

    /// Advance the ramp by one Playing tick
    pub fn tick(&mut self, dt: f32) {
        if self.current_speed >= self.max_speed {
            return;
        }
        self.since_increase += dt;
        if self.since_increase >= self.increase_interval {
            self.current_speed = (self.current_speed + self.increase_rate).min(self.max_speed);
            self.since_increase = 0.0;
            log::debug!("Speed increased to {:.2}", self.current_speed);
        }
    }

    pub fn on_event(&mut self, event: &GameEvent) {
        if event.is_fresh_start() {
            self.reset();
        }
    }
}

impl Default for SpeedController {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
