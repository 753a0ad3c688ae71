//! Game state machine
//!
//! Sole writer of the session. Every public operation is guarded: calls that
//! make no sense for the current state return `false` and emit nothing.
//! Timed states count elapsed time in [`GameStateMachine::tick`] instead of
//! waiting, and entering any state discards the previous state's timer.
//!
//! Events are appended to an outbox in emission order; the owner drains it
//! with [`GameStateMachine::take_events`] and fans the events out before the
//! triggering call returns to its caller.

use super::state::{GameEvent, GameState, Session};
use crate::Settings;

/// Durations for the timed states (seconds)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateTimings {
    pub countdown: f32,
    pub level_completed: f32,
    pub level_failed: f32,
    pub game_over: f32,
}

impl StateTimings {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            countdown: settings.countdown_duration,
            level_completed: settings.level_completed_duration,
            level_failed: settings.level_failed_duration,
            game_over: settings.game_over_duration,
        }
    }

    fn duration_for(&self, state: GameState) -> Option<f32> {
        match state {
            GameState::Countdown => Some(self.countdown),
            GameState::LevelCompleted => Some(self.level_completed),
            GameState::LevelFailed => Some(self.level_failed),
            GameState::GameOver => Some(self.game_over),
            _ => None,
        }
    }
}

impl Default for StateTimings {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

/// Elapsed-time counter for the current timed state
#[derive(Debug, Clone, Copy, PartialEq)]
struct StateTimer {
    state: GameState,
    elapsed: f32,
    duration: f32,
}

#[derive(Debug)]
pub struct GameStateMachine {
    session: Session,
    previous: GameState,
    starting_lives: u32,
    timings: StateTimings,
    timer: Option<StateTimer>,
    events: Vec<GameEvent>,
}

impl GameStateMachine {
    pub fn new(starting_lives: u32, timings: StateTimings) -> Self {
        Self {
            session: Session::new(starting_lives),
            previous: GameState::NotStarted,
            starting_lives,
            timings,
            timer: None,
            events: Vec::new(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.starting_lives, StateTimings::from_settings(settings))
    }

    pub fn state(&self) -> GameState {
        self.session.state
    }

    pub fn previous_state(&self) -> GameState {
        self.previous
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn lives(&self) -> u32 {
        self.session.lives
    }

    pub fn score(&self) -> u32 {
        self.session.score
    }

    pub fn level(&self) -> u32 {
        self.session.level
    }

    pub fn starting_lives(&self) -> u32 {
        self.starting_lives
    }

    /// Seconds left on the running state timer, if any
    pub fn time_remaining(&self) -> Option<f32> {
        self.timer.map(|t| (t.duration - t.elapsed).max(0.0))
    }

    /// Drain pending broadcasts in emission order
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn has_pending_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Transition to `next`. Returns false when already in that state, or
    /// when leaving GameOver for anything but NotStarted.
    pub fn set_state(&mut self, next: GameState) -> bool {
        let previous = self.session.state;
        if next == previous {
            return false;
        }
        if previous == GameState::GameOver {
            if next != GameState::NotStarted {
                return false;
            }
            // Lives are back to full before anyone sees NotStarted
            self.session.lives = self.starting_lives;
            self.events.push(GameEvent::LivesChanged(self.session.lives));
        }

        self.previous = previous;
        self.session.state = next;
        log::info!("State {} -> {}", previous.as_str(), next.as_str());
        self.events.push(GameEvent::StateChanged { previous, next });

        // Replaces any in-flight timer
        self.start_timer(next);

        if next == GameState::GameOver {
            log::info!("Game over (score {}, level {})", self.session.score, self.session.level);
            self.events.push(GameEvent::GameOver);
        }

        true
    }

    /// Reset lives/score/level and force a countdown.
    /// GameOver must run out to NotStarted first.
    pub fn start_game(&mut self) -> bool {
        if self.session.state == GameState::GameOver {
            return false;
        }
        self.reset_session();
        if !self.set_state(GameState::Countdown) {
            // Already counting down: restart the countdown from zero
            self.start_timer(GameState::Countdown);
        }
        true
    }

    pub fn pause_game(&mut self) -> bool {
        if self.session.state != GameState::Playing {
            return false;
        }
        self.set_state(GameState::Paused)
    }

    pub fn resume_game(&mut self) -> bool {
        if self.session.state != GameState::Paused {
            return false;
        }
        self.set_state(GameState::Playing)
    }

    /// Abandon the session and return to NotStarted
    pub fn finish_session(&mut self) -> bool {
        self.set_state(GameState::NotStarted)
    }

    pub fn complete_level(&mut self) -> bool {
        if self.session.state != GameState::Playing {
            return false;
        }
        self.set_state(GameState::LevelCompleted)
    }

    /// Take one life; only effective while Playing
    pub fn lose_life(&mut self) -> bool {
        if self.session.state != GameState::Playing {
            return false;
        }

        self.session.lives = self.session.lives.saturating_sub(1);
        log::info!("Life lost, {} remaining", self.session.lives);
        self.events.push(GameEvent::LivesChanged(self.session.lives));

        if self.session.lives > 0 {
            self.set_state(GameState::LevelFailed)
        } else {
            self.set_state(GameState::GameOver)
        }
    }

    pub fn add_score(&mut self, amount: u32) -> bool {
        if amount == 0 {
            return false;
        }
        self.session.score = self.session.score.saturating_add(amount);
        self.events.push(GameEvent::ScoreChanged(self.session.score));
        true
    }

    /// Advance the running state timer, firing its auto-transition on expiry
    pub fn tick(&mut self, dt: f32) {
        let Some(timer) = self.timer.as_mut() else {
            return;
        };
        timer.elapsed += dt;
        if timer.elapsed < timer.duration {
            return;
        }

        let expired = timer.state;
        let overshoot = timer.elapsed - timer.duration;
        self.timer = None;
        match expired {
            GameState::Countdown => {
                self.set_state(GameState::Playing);
            }
            GameState::LevelCompleted => {
                self.session.level += 1;
                self.events.push(GameEvent::LevelChanged(self.session.level));
                self.set_state(GameState::Countdown);
            }
            GameState::LevelFailed => {
                self.set_state(GameState::Countdown);
            }
            GameState::GameOver => {
                self.set_state(GameState::NotStarted);
            }
            _ => {}
        }

        // The next timed state starts with the time this one overran by
        if let Some(next) = self.timer.as_mut() {
            next.elapsed = overshoot;
        }
    }

    fn start_timer(&mut self, state: GameState) {
        self.timer = self.timings.duration_for(state).map(|duration| StateTimer {
            state,
            elapsed: 0.0,
            duration,
        });
    }

    fn reset_session(&mut self) {
        self.session.lives = self.starting_lives;
        self.session.score = 0;
        self.session.level = 1;
        self.events.push(GameEvent::LivesChanged(self.session.lives));
        self.events.push(GameEvent::ScoreChanged(0));
        self.events.push(GameEvent::LevelChanged(1));
    }
}

impl Default for GameStateMachine {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}
