//! Session lifecycle types
//!
//! The state enum, the session record owned by the state machine, and the
//! events it broadcasts to dependents.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameState {
    /// Idle, waiting for a start request
    #[default]
    NotStarted,
    /// Timed lead-in before play
    Countdown,
    /// Active gameplay, locomotion running
    Playing,
    /// Locomotion suspended, resumable
    Paused,
    /// Timed celebration, advances the level
    LevelCompleted,
    /// Timed pause after losing a life
    LevelFailed,
    /// Timed end screen, returns to NotStarted
    GameOver,
}

impl GameState {
    pub const ALL: [GameState; 7] = [
        GameState::NotStarted,
        GameState::Countdown,
        GameState::Playing,
        GameState::Paused,
        GameState::LevelCompleted,
        GameState::LevelFailed,
        GameState::GameOver,
    ];

    /// States whose entry starts an auto-transition timer
    pub fn is_timed(self) -> bool {
        matches!(
            self,
            GameState::Countdown
                | GameState::LevelCompleted
                | GameState::LevelFailed
                | GameState::GameOver
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameState::NotStarted => "NotStarted",
            GameState::Countdown => "Countdown",
            GameState::Playing => "Playing",
            GameState::Paused => "Paused",
            GameState::LevelCompleted => "LevelCompleted",
            GameState::LevelFailed => "LevelFailed",
            GameState::GameOver => "GameOver",
        }
    }
}

/// Session bookkeeping, written only by the state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: GameState,
    pub lives: u32,
    pub score: u32,
    /// 1-based level number
    pub level: u32,
}

impl Session {
    pub fn new(starting_lives: u32) -> Self {
        Self {
            state: GameState::NotStarted,
            lives: starting_lives,
            score: 0,
            level: 1,
        }
    }
}

/// Broadcast from the state machine, delivered in emission order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    StateChanged { previous: GameState, next: GameState },
    LivesChanged(u32),
    ScoreChanged(u32),
    LevelChanged(u32),
    /// Fired once per GameOver entry
    GameOver,
}

impl GameEvent {
    /// True for a transition into Playing that is not a resume from Paused
    pub fn is_fresh_start(&self) -> bool {
        matches!(
            self,
            GameEvent::StateChanged {
                previous,
                next: GameState::Playing,
            } if *previous != GameState::Paused
        )
    }
}
