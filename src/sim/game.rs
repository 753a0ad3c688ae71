//! Game composition root
//!
//! Owns the state machine and every dependent system, and routes the state
//! machine's broadcasts to them. Collaborators (pool, boundary) are injected
//! and may be detached; the affected per-tick work is skipped while they are
//! missing.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bounds::{BoundaryProvider, RectBounds};
use super::chain::SegmentChain;
use super::collision::SelfCollisionDetector;
use super::machine::GameStateMachine;
use super::pickup::{Apple, AppleSpawner};
use super::pool::{EntityPool, SlotPool};
use super::speed::SpeedController;
use super::state::{GameEvent, GameState, Session};
use super::tick::{FixedTimestep, FollowAnchor, Locomotion, LocomotionReport, TickInput};
use crate::Settings;

/// External observer of state machine broadcasts
pub type Observer = Box<dyn FnMut(&GameEvent)>;

/// Read-only view of a running game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session: Session,
    pub speed: f32,
    pub pending_growth: u32,
    pub segments: Vec<Vec3>,
    pub apples: Vec<Vec3>,
    pub anchor: Vec3,
    pub ticks: u64,
}

fn pool_ref(pool: &mut Option<Box<dyn EntityPool>>) -> Option<&mut dyn EntityPool> {
    match pool {
        Some(pool) => Some(&mut **pool),
        None => None,
    }
}

pub struct Game {
    settings: Settings,
    machine: GameStateMachine,
    chain: SegmentChain,
    speed: SpeedController,
    locomotion: Locomotion,
    spawner: AppleSpawner,
    timestep: FixedTimestep,
    pool: Option<Box<dyn EntityPool>>,
    bounds: Option<Box<dyn BoundaryProvider>>,
    observers: Vec<Observer>,
    ticks: u64,
}

impl Game {
    /// Game with the default pool and the arena rectangle from settings
    pub fn new(settings: Settings) -> Self {
        let pool: Box<dyn EntityPool> = Box::new(SlotPool::new());
        let bounds: Box<dyn BoundaryProvider> = Box::new(RectBounds::from_settings(&settings));
        Self::with_collaborators(settings, Some(pool), Some(bounds))
    }

    pub fn with_collaborators(
        settings: Settings,
        pool: Option<Box<dyn EntityPool>>,
        bounds: Option<Box<dyn BoundaryProvider>>,
    ) -> Self {
        let settings = settings.validated();
        let mut game = Self {
            machine: GameStateMachine::from_settings(&settings),
            chain: SegmentChain::new(settings.segment_radius, settings.growth_per_apple),
            speed: SpeedController::from_settings(&settings),
            locomotion: Locomotion::new(SelfCollisionDetector::from_settings(&settings)),
            spawner: AppleSpawner::new(&settings),
            timestep: FixedTimestep::new(settings.tick_rate),
            pool,
            bounds,
            observers: Vec::new(),
            ticks: 0,
            settings,
        };
        game.rebuild_chain();
        game
    }

    // === Collaborators ===

    pub fn set_pool(&mut self, pool: Box<dyn EntityPool>) {
        self.pool = Some(pool);
        if self.chain.is_empty() {
            self.rebuild_chain();
        }
    }

    pub fn detach_pool(&mut self) -> Option<Box<dyn EntityPool>> {
        self.pool.take()
    }

    pub fn set_bounds(&mut self, bounds: Box<dyn BoundaryProvider>) {
        self.bounds = Some(bounds);
    }

    pub fn detach_bounds(&mut self) -> Option<Box<dyn BoundaryProvider>> {
        self.bounds.take()
    }

    /// Register an observer; observers run in registration order
    pub fn subscribe(&mut self, observer: impl FnMut(&GameEvent) + 'static) {
        self.observers.push(Box::new(observer));
    }

    // === Session entry points ===

    /// Start a new session; a partial step left over from before is dropped
    pub fn start_game(&mut self) -> bool {
        let changed = self.machine.start_game();
        if changed {
            self.timestep.reset();
        }
        self.dispatch();
        changed
    }

    pub fn pause_game(&mut self) -> bool {
        let changed = self.machine.pause_game();
        self.dispatch();
        changed
    }

    pub fn resume_game(&mut self) -> bool {
        let changed = self.machine.resume_game();
        self.dispatch();
        changed
    }

    pub fn finish_session(&mut self) -> bool {
        let changed = self.machine.finish_session();
        self.dispatch();
        changed
    }

    pub fn complete_level(&mut self) -> bool {
        let changed = self.machine.complete_level();
        self.dispatch();
        changed
    }

    pub fn lose_life(&mut self) -> bool {
        let changed = self.machine.lose_life();
        self.dispatch();
        changed
    }

    pub fn add_score(&mut self, amount: u32) -> bool {
        let changed = self.machine.add_score(amount);
        self.dispatch();
        changed
    }

    pub fn set_state(&mut self, state: GameState) -> bool {
        let changed = self.machine.set_state(state);
        self.dispatch();
        changed
    }

    /// Queue chain growth; `None` uses the configured amount per apple
    pub fn grow_snake(&mut self, count: Option<u32>) {
        self.chain.grow_snake(count);
    }

    // === Simulation ===

    /// Feed one frame of wall time and run the fixed steps it covers
    pub fn update(&mut self, frame_dt: f32, input: &TickInput) -> u32 {
        let steps = self.timestep.advance(frame_dt);
        for _ in 0..steps {
            self.tick(input);
        }
        steps
    }

    /// Run exactly one fixed simulation step
    pub fn tick(&mut self, input: &TickInput) -> LocomotionReport {
        let dt = self.timestep.step();
        self.ticks += 1;

        self.machine.tick(dt);
        self.dispatch();

        if self.machine.state() != GameState::Playing {
            return LocomotionReport::default();
        }

        self.speed.tick(dt);
        let report = self.locomotion.step(
            &mut self.chain,
            input,
            self.speed.current_speed(),
            dt,
            pool_ref(&mut self.pool),
            self.bounds.as_deref(),
        );

        if let Some(head) = self.chain.head().map(|h| h.position) {
            let reach = SelfCollisionDetector::segment_collider_radius(&self.chain);
            let eaten = self.spawner.consume(head, reach, pool_ref(&mut self.pool));
            if eaten > 0 {
                self.chain.grow_snake(Some(eaten * self.settings.growth_per_apple));
                self.machine.add_score(eaten * self.settings.apple_score);
            }
        }
        self.spawner.tick(dt, &self.chain, pool_ref(&mut self.pool));

        if report.life_lost() {
            self.machine.lose_life();
        }
        self.dispatch();

        report
    }

    /// Deliver pending broadcasts: internal dependents first, then observers
    fn dispatch(&mut self) {
        while self.machine.has_pending_events() {
            for event in self.machine.take_events() {
                if let GameEvent::StateChanged { previous, next } = event {
                    self.speed.on_event(&event);
                    if Self::resets_chain(previous, next) {
                        self.rebuild_chain();
                    }
                    self.spawner.on_event(&event, pool_ref(&mut self.pool));
                }
                for observer in self.observers.iter_mut() {
                    observer(&event);
                }
            }
        }
    }

    /// States that lay out a fresh chain on entry
    fn resets_chain(previous: GameState, next: GameState) -> bool {
        match next {
            GameState::NotStarted | GameState::LevelFailed | GameState::GameOver => true,
            GameState::Countdown => previous != GameState::LevelCompleted,
            _ => false,
        }
    }

    fn rebuild_chain(&mut self) {
        let Some(pool) = self.pool.as_mut() else {
            log::debug!("No pool attached, chain rebuild skipped");
            return;
        };
        self.chain.rebuild(
            &mut **pool,
            self.settings.spawn_position,
            self.settings.flat_spawn_facing(),
            self.settings.initial_length,
        );
        if let Some(head) = self.chain.head() {
            self.locomotion.anchor.follow(head.position);
        }
    }

    // === Accessors ===

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn state(&self) -> GameState {
        self.machine.state()
    }

    pub fn session(&self) -> &Session {
        self.machine.session()
    }

    pub fn machine(&self) -> &GameStateMachine {
        &self.machine
    }

    pub fn chain(&self) -> &SegmentChain {
        &self.chain
    }

    pub fn current_speed(&self) -> f32 {
        self.speed.current_speed()
    }

    pub fn anchor(&self) -> &FollowAnchor {
        &self.locomotion.anchor
    }

    /// Place the follow anchor (its height is never touched by the simulation)
    pub fn set_anchor(&mut self, position: Vec3) {
        self.locomotion.anchor = FollowAnchor::new(position);
    }

    pub fn apples(&self) -> &[Apple] {
        self.spawner.apples()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn timestep(&self) -> &FixedTimestep {
        &self.timestep
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            session: self.machine.session().clone(),
            speed: self.speed.current_speed(),
            pending_growth: self.chain.pending_growth(),
            segments: self.chain.segments().iter().map(|s| s.position).collect(),
            apples: self.spawner.apples().iter().map(|a| a.position).collect(),
            anchor: self.locomotion.anchor.position,
            ticks: self.ticks,
        }
    }
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn run_ticks(game: &mut Game, input: &TickInput, ticks: u32) {
        for _ in 0..ticks {
            game.tick(input);
        }
    }

    fn seconds(game: &Game, secs: f32) -> u32 {
        (secs * game.settings().tick_rate).ceil() as u32 + 1
    }

    fn playing_game(settings: Settings) -> Game {
        let mut game = Game::new(settings);
        game.start_game();
        let n = seconds(&game, game.settings().countdown_duration);
        run_ticks(&mut game, &TickInput::default(), n);
        assert_eq!(game.state(), GameState::Playing);
        game
    }

    #[test]
    fn test_new_game_is_idle_with_chain() {
        let game = Game::default();
        assert_eq!(game.state(), GameState::NotStarted);
        assert_eq!(game.chain().len(), game.settings().initial_length);
    }

    #[test]
    fn test_locomotion_only_while_playing() {
        let mut game = Game::default();
        let head = game.chain().head().unwrap().position;
        run_ticks(&mut game, &TickInput::new(Vec3::X), 30);
        assert_eq!(game.chain().head().unwrap().position, head);
        assert_eq!(game.ticks(), 30);
    }

    #[test]
    fn test_observers_run_in_registration_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut game = Game::default();
        for name in ["first", "second"] {
            let log = Rc::clone(&log);
            game.subscribe(move |event| {
                if matches!(event, GameEvent::StateChanged { .. }) {
                    log.borrow_mut().push(name);
                }
            });
        }
        game.start_game();
        assert_eq!(*log.borrow(), vec!["first", "second"]);
    }

    #[test]
    fn test_broadcast_delivered_before_call_returns() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut game = playing_game(Settings::default());
        let sink = Rc::clone(&seen);
        game.subscribe(move |event| sink.borrow_mut().push(*event));
        assert!(game.pause_game());
        assert_eq!(
            *seen.borrow(),
            vec![GameEvent::StateChanged {
                previous: GameState::Playing,
                next: GameState::Paused,
            }]
        );
        assert!(!game.pause_game());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_leaving_arena_costs_a_life() {
        let settings = Settings {
            arena_half_width: 2.0,
            arena_half_depth: 2.0,
            ..Default::default()
        };
        let mut game = playing_game(settings);
        let input = TickInput::new(Vec3::Z);
        let mut ticks = 0;
        while game.state() == GameState::Playing && ticks < 600 {
            game.tick(&input);
            ticks += 1;
        }
        assert_eq!(game.state(), GameState::LevelFailed);
        assert_eq!(game.session().lives, 2);
        // Chain laid out fresh at the spawn point
        assert_eq!(game.chain().head().unwrap().position, Vec3::ZERO);
    }

    #[test]
    fn test_missing_bounds_never_fails() {
        let settings = Settings {
            arena_half_width: 1.0,
            arena_half_depth: 1.0,
            apple_spawn_interval: 1.0e6,
            ..Default::default()
        };
        let mut game = playing_game(settings);
        assert!(game.detach_bounds().is_some());
        run_ticks(&mut game, &TickInput::new(Vec3::Z), 300);
        assert_eq!(game.state(), GameState::Playing);
    }

    #[test]
    fn test_growth_deferred_without_pool() {
        let mut game = playing_game(Settings::default());
        let len = game.chain().len();
        let pool = game.detach_pool().unwrap();
        game.grow_snake(Some(2));
        run_ticks(&mut game, &TickInput::new(Vec3::Z), 5);
        assert_eq!(game.chain().len(), len);
        assert_eq!(game.chain().pending_growth(), 2);

        game.set_pool(pool);
        game.tick(&TickInput::new(Vec3::Z));
        assert_eq!(game.chain().len(), len + 1);
    }

    #[test]
    fn test_anchor_tracks_head_on_plane() {
        let mut game = playing_game(Settings::default());
        game.set_anchor(Vec3::new(0.0, 10.0, -5.0));
        run_ticks(&mut game, &TickInput::new(Vec3::X), 10);
        let head = game.chain().head().unwrap().position;
        let anchor = game.anchor().position;
        assert_eq!((anchor.x, anchor.y, anchor.z), (head.x, 10.0, head.z));
    }

    #[test]
    fn test_snapshot_serializes() {
        let game = playing_game(Settings::default());
        let snapshot = game.snapshot();
        assert_eq!(snapshot.segments.len(), game.chain().len());
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }

    #[test]
    fn test_start_game_drops_partial_step() {
        let mut game = Game::default();
        let half_step = game.timestep().step() * 0.5;
        assert_eq!(game.update(half_step, &TickInput::default()), 0);
        assert!(game.timestep().alpha() > 0.4);
        assert!(game.start_game());
        assert_eq!(game.timestep().alpha(), 0.0);
    }

    #[test]
    fn test_update_runs_fixed_steps() {
        let mut game = Game::default();
        let steps = game.update(0.1, &TickInput::default());
        assert_eq!(u64::from(steps), game.ticks());
        assert!((5..=6).contains(&steps));
    }
}
