use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use serpentine::planar_distance;
use serpentine::sim::{GameEvent, GameState, TickInput};
use serpentine::{Game, Settings};

/// Settings without apples so growth only comes from the test
fn quiet_settings() -> Settings {
    Settings {
        apple_spawn_interval: 1.0e6,
        ..Default::default()
    }
}

fn ticks_for(game: &Game, secs: f32) -> u32 {
    (secs * game.settings().tick_rate).ceil() as u32 + 1
}

fn run(game: &mut Game, input: &TickInput, ticks: u32) {
    for _ in 0..ticks {
        game.tick(input);
    }
}

fn start_playing(settings: Settings) -> Game {
    let mut game = Game::new(settings);
    assert!(game.start_game());
    let n = ticks_for(&game, game.settings().countdown_duration);
    run(&mut game, &TickInput::default(), n);
    assert_eq!(game.state(), GameState::Playing);
    game
}

fn record_events(game: &mut Game) -> Rc<RefCell<Vec<GameEvent>>> {
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&events);
    game.subscribe(move |e| sink.borrow_mut().push(*e));
    events
}

#[test]
fn test_straight_chain_keeps_spacing_after_one_tick() {
    let settings = Settings {
        initial_length: 5,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    let r = game.chain().segment_radius();
    game.tick(&TickInput::new(Vec3::Z));
    for w in game.chain().segments().windows(2) {
        let d = planar_distance(w[0].position, w[1].position);
        assert!((d - r).abs() < 1e-4, "gap {} != {}", d, r);
    }
}

#[test]
fn test_spacing_bound_while_weaving() {
    let mut game = start_playing(quiet_settings());
    game.detach_bounds();
    game.grow_snake(Some(10));
    let r = game.chain().segment_radius();
    for i in 0..600 {
        let t = i as f32 / 60.0;
        game.tick(&TickInput::from_yaw((t * 0.7).sin() * 1.2));
        if game.state() != GameState::Playing {
            break;
        }
        for w in game.chain().segments().windows(2) {
            assert!(planar_distance(w[0].position, w[1].position) <= r + 1e-4);
        }
    }
}

#[test]
fn test_growth_one_per_tick() {
    let mut game = start_playing(quiet_settings());
    let len = game.chain().len();
    game.grow_snake(Some(2));

    let input = TickInput::new(Vec3::Z);
    game.tick(&input);
    assert_eq!(game.chain().len(), len + 1);
    game.tick(&input);
    assert_eq!(game.chain().len(), len + 2);
    run(&mut game, &input, 5);
    assert_eq!(game.chain().len(), len + 2);
}

#[test]
fn test_growth_default_amount() {
    let settings = Settings {
        growth_per_apple: 3,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    let len = game.chain().len();
    game.grow_snake(None);
    run(&mut game, &TickInput::new(Vec3::Z), 10);
    assert_eq!(game.chain().len(), len + 3);
}

#[test]
fn test_speed_ramps_and_resets() {
    let settings = Settings {
        initial_speed: 2.0,
        max_speed: 3.0,
        speed_increase_rate: 0.4,
        speed_increase_interval: 0.5,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    game.detach_bounds();

    let mut last = game.current_speed();
    for _ in 0..240 {
        game.tick(&TickInput::new(Vec3::Z));
        assert!(game.current_speed() >= last);
        assert!(game.current_speed() <= 3.0);
        last = game.current_speed();
    }
    assert_eq!(game.current_speed(), 3.0);

    // Pause/resume keeps speed
    assert!(game.pause_game());
    run(&mut game, &TickInput::default(), 120);
    assert!(game.resume_game());
    assert_eq!(game.current_speed(), 3.0);

    // A fresh entry into Playing resets it
    assert!(game.lose_life());
    let wait = game.settings().level_failed_duration + game.settings().countdown_duration;
    let n = ticks_for(&game, wait + 0.1);
    run(&mut game, &TickInput::default(), n);
    assert_eq!(game.state(), GameState::Playing);
    assert!(game.current_speed() < 2.1);
}

#[test]
fn test_same_state_no_broadcast() {
    let mut game = Game::new(quiet_settings());
    let events = record_events(&mut game);
    assert!(!game.set_state(GameState::NotStarted));
    assert!(!game.resume_game());
    assert!(!game.pause_game());
    assert!(!game.lose_life());
    assert!(events.borrow().is_empty());
}

#[test]
fn test_lose_life_then_countdown() {
    let mut game = start_playing(quiet_settings());
    assert_eq!(game.session().lives, 3);
    assert!(game.lose_life());
    assert_eq!(game.session().lives, 2);
    assert_eq!(game.state(), GameState::LevelFailed);

    let n = ticks_for(&game, game.settings().level_failed_duration);
    run(&mut game, &TickInput::default(), n);
    assert_eq!(game.state(), GameState::Countdown);
    assert_eq!(game.session().lives, 2);
}

#[test]
fn test_last_life_game_over_then_reset() {
    let settings = Settings {
        starting_lives: 1,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    let events = record_events(&mut game);

    assert!(game.lose_life());
    assert_eq!(game.session().lives, 0);
    assert_eq!(game.state(), GameState::GameOver);
    assert_eq!(
        events.borrow().iter().filter(|e| **e == GameEvent::GameOver).count(),
        1
    );

    // Nothing but the timer leaves GameOver
    assert!(!game.start_game());
    assert!(!game.resume_game());
    let n = ticks_for(&game, game.settings().game_over_duration);
    run(&mut game, &TickInput::default(), n);
    assert_eq!(game.state(), GameState::NotStarted);
    assert_eq!(game.session().lives, 1);

    let events = events.borrow();
    let restored = events
        .iter()
        .position(|e| *e == GameEvent::LivesChanged(1))
        .unwrap();
    let returned = events
        .iter()
        .position(|e| {
            *e == GameEvent::StateChanged {
                previous: GameState::GameOver,
                next: GameState::NotStarted,
            }
        })
        .unwrap();
    assert!(restored < returned);
}

#[test]
fn test_finish_during_game_over_restores_lives() {
    let settings = Settings {
        starting_lives: 1,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    assert!(game.lose_life());
    assert_eq!(game.state(), GameState::GameOver);
    let events = record_events(&mut game);

    assert!(game.finish_session());
    assert_eq!(game.state(), GameState::NotStarted);
    assert_eq!(game.session().lives, 1);
    assert_eq!(
        *events.borrow(),
        vec![
            GameEvent::LivesChanged(1),
            GameEvent::StateChanged {
                previous: GameState::GameOver,
                next: GameState::NotStarted,
            },
        ]
    );
}

#[test]
fn test_negative_ramp_never_slows_the_snake() {
    let settings = Settings {
        speed_increase_rate: -1.0,
        speed_increase_interval: 0.1,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    game.detach_bounds();
    let initial = game.current_speed();
    run(&mut game, &TickInput::new(Vec3::Z), 60);
    assert_eq!(game.current_speed(), initial);
}

#[test]
fn test_self_collision_costs_a_life() {
    let settings = Settings {
        initial_length: 14,
        initial_speed: 3.0,
        max_speed: 3.0,
        ..quiet_settings()
    };
    let mut game = start_playing(settings);
    game.detach_bounds();

    // Up, a short step sideways, then straight back down
    run(&mut game, &TickInput::new(Vec3::Z), 30);
    run(&mut game, &TickInput::new(Vec3::X), 6);
    let mut ticks = 0;
    while game.state() == GameState::Playing && ticks < 120 {
        game.tick(&TickInput::new(Vec3::NEG_Z));
        ticks += 1;
    }
    assert_eq!(game.state(), GameState::LevelFailed);
    assert_eq!(game.session().lives, 2);
}

#[test]
fn test_pause_keeps_apples_finish_clears() {
    let settings = Settings {
        apple_spawn_interval: 0.1,
        ..Default::default()
    };
    let mut game = start_playing(settings);
    game.detach_bounds();
    run(&mut game, &TickInput::new(Vec3::Z), 30);
    let count = game.apples().len();
    assert!(count > 0);

    assert!(game.pause_game());
    run(&mut game, &TickInput::default(), 60);
    assert_eq!(game.apples().len(), count);

    assert!(game.finish_session());
    assert!(game.apples().is_empty());
    assert_eq!(game.state(), GameState::NotStarted);
}

#[test]
fn test_eating_apple_grows_and_scores() {
    // A narrow strip: apples always land on the snake's line of travel
    let settings = Settings {
        arena_half_width: 0.5,
        arena_half_depth: 20.0,
        apple_spawn_interval: 0.05,
        max_apples: 50,
        ..Default::default()
    };
    let mut game = start_playing(settings);
    game.detach_bounds();
    let len = game.chain().len();

    let input = TickInput::new(Vec3::Z);
    let mut ticks = 0;
    while game.session().score == 0 && ticks < 600 {
        game.tick(&input);
        ticks += 1;
    }
    let score = game.session().score;
    assert!(score > 0);
    assert_eq!(score % game.settings().apple_score, 0);
    run(&mut game, &input, 5);
    assert!(game.chain().len() > len);
}

#[test]
fn test_level_completed_keeps_chain_and_advances() {
    let mut game = start_playing(quiet_settings());
    game.grow_snake(Some(3));
    run(&mut game, &TickInput::new(Vec3::Z), 5);
    let len = game.chain().len();

    assert!(game.complete_level());
    let n = ticks_for(&game, game.settings().level_completed_duration);
    run(&mut game, &TickInput::default(), n);
    assert_eq!(game.state(), GameState::Countdown);
    assert_eq!(game.session().level, 2);
    assert_eq!(game.chain().len(), len);
}
