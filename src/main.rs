//! Serpentine - headless native runner
//!
//! Plays one scripted session: the snake steers toward the nearest apple,
//! weaving when there is none, until the session returns to NotStarted or the
//! time limit is reached. Pass a settings JSON path as the first argument.

use std::cell::Cell;
use std::rc::Rc;

use glam::Vec3;
use serpentine::sim::{GameEvent, GameState, TickInput};
use serpentine::{Game, Settings};

/// Simulated wall time limit (seconds)
const MAX_RUN_SECS: f32 = 300.0;
/// Simulated render frame time (uneven on purpose)
const FRAME_TIMES: [f32; 3] = [1.0 / 50.0, 1.0 / 75.0, 1.0 / 60.0];

fn steer(game: &Game, time: f32) -> TickInput {
    let Some(head) = game.chain().head() else {
        return TickInput::default();
    };

    let target = game
        .apples()
        .iter()
        .map(|a| a.position)
        .min_by(|a, b| {
            let da = a.distance_squared(head.position);
            let db = b.distance_squared(head.position);
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        });

    match target {
        Some(target) => TickInput::towards(head.position, target),
        None => {
            // Weave back toward the middle of the arena
            let home = TickInput::towards(head.position, Vec3::ZERO).direction;
            let wobble = Vec3::new((time * 1.7).cos(), 0.0, (time * 1.3).sin());
            TickInput::new(home + wobble * 0.8)
        }
    }
}

fn main() {
    env_logger::init();
    log::info!("Serpentine (native) starting...");

    let settings = match std::env::args().nth(1) {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    log::info!("Simulating at {} Hz with seed {}", settings.tick_rate, settings.seed);

    let mut game = Game::new(settings);

    let finished = Rc::new(Cell::new(false));
    {
        let finished = Rc::clone(&finished);
        game.subscribe(move |event| match event {
            GameEvent::StateChanged { previous, next } => {
                log::info!("[observer] {} -> {}", previous.as_str(), next.as_str());
                if *next == GameState::NotStarted {
                    finished.set(true);
                }
            }
            GameEvent::LivesChanged(lives) => log::info!("[observer] lives: {}", lives),
            GameEvent::ScoreChanged(score) => log::info!("[observer] score: {}", score),
            GameEvent::LevelChanged(level) => log::info!("[observer] level: {}", level),
            GameEvent::GameOver => log::info!("[observer] game over"),
        });
    }

    game.start_game();

    let mut time = 0.0;
    let mut frame = 0;
    while time < MAX_RUN_SECS && !finished.get() {
        let dt = FRAME_TIMES[frame % FRAME_TIMES.len()];
        let input = steer(&game, time);
        game.update(dt, &input);
        time += dt;
        frame += 1;
    }

    let snapshot = game.snapshot();
    log::info!(
        "Finished after {:.1}s ({} ticks): score {}, level {}, length {}",
        time,
        snapshot.ticks,
        snapshot.session.score,
        snapshot.session.level,
        snapshot.segments.len()
    );
    match serde_json::to_string_pretty(&snapshot) {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
