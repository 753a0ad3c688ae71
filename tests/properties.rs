use glam::Vec3;
use proptest::prelude::*;
use serpentine::planar_distance;
use serpentine::sim::{SegmentChain, SlotPool, SpeedController};

const R: f32 = 0.5;

fn max_gap(chain: &SegmentChain) -> f32 {
    chain
        .segments()
        .windows(2)
        .map(|w| planar_distance(w[0].position, w[1].position))
        .fold(0.0, f32::max)
}

proptest! {
    #[test]
    fn spacing_never_exceeds_radius(
        yaws in prop::collection::vec(-std::f32::consts::PI..std::f32::consts::PI, 1..200),
        speed in 0.5f32..25.0,
        length in 1usize..20,
        growth in 0u32..10,
    ) {
        let mut pool = SlotPool::new();
        let mut chain = SegmentChain::new(R, 1);
        chain.rebuild(&mut pool, Vec3::ZERO, Vec3::Z, length);
        chain.grow_snake(Some(growth));

        for yaw in yaws {
            let before = chain.len();
            let dir = Vec3::new(yaw.sin(), 0.0, yaw.cos());
            chain.advance(dir, speed / 60.0, Some(&mut pool));

            prop_assert!(chain.len() - before <= 1);
            prop_assert!(max_gap(&chain) <= R + 1e-3);
            prop_assert!(chain.segments().iter().all(|s| s.position.y == 0.0));
        }
    }

    #[test]
    fn speed_is_monotonic_and_bounded(
        dts in prop::collection::vec(0.0f32..0.5, 1..300),
        initial in 1.0f32..10.0,
        extra in 0.0f32..10.0,
        rate in 0.01f32..3.0,
        interval in 0.05f32..2.0,
    ) {
        let max = initial + extra;
        let mut speed = SpeedController::new(initial, max, rate, interval);
        let mut last = speed.current_speed();
        for dt in dts {
            speed.tick(dt);
            let now = speed.current_speed();
            prop_assert!(now >= last);
            prop_assert!(now <= max);
            prop_assert!(now >= initial);
            last = now;
        }
    }
}
