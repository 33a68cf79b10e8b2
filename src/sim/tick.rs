//! Simulation tick
//!
//! One tick: steer gravity, integrate every ball, bounce off the wall, bounce
//! off each other. Always in that order, always one pass.

use glam::Vec2;

use super::collision::{CollisionEvent, resolve_pairs, resolve_walls};
use super::gravity::TiltInput;
use super::state::{Ball, World};

/// What a tick produced besides the new state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    /// Gravity vector applied this tick (for the readout)
    pub gravity: Vec2,
    /// Collisions in the order they were resolved (walls first, then pairs)
    pub events: Vec<CollisionEvent>,
}

/// Semi-implicit Euler: velocity first, then position with the new velocity
#[inline]
pub fn integrate(ball: &mut Ball, gravity: Vec2) {
    ball.vel += gravity;
    ball.pos += ball.vel;
}

/// Advance the world by one tick
pub fn tick(world: &mut World, input: TiltInput) -> TickReport {
    world.time_ticks += 1;

    let gravity = world.gravity.update(input);
    for ball in &mut world.balls {
        integrate(ball, gravity);
    }

    let mut events = Vec::new();
    resolve_walls(
        &mut world.balls,
        world.ball_radius,
        &world.arena,
        world.restitution,
        &mut events,
    );
    resolve_pairs(
        &mut world.balls,
        world.ball_radius,
        world.restitution,
        &mut events,
    );

    TickReport { gravity, events }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{SimConfig, Variant};

    fn still_world(positions: &[Vec2]) -> World {
        let mut world = World::new(&SimConfig::default(), 1).unwrap();
        world.balls = positions.iter().map(|&p| Ball::new(p, Vec2::ZERO)).collect();
        world
    }

    #[test]
    fn test_integrate_uses_new_velocity() {
        let mut ball = Ball::new(Vec2::new(10.0, 10.0), Vec2::new(1.0, 0.0));
        integrate(&mut ball, Vec2::new(0.0, 0.15));
        assert_eq!(ball.vel, Vec2::new(1.0, 0.15));
        assert_eq!(ball.pos, Vec2::new(11.0, 10.15));
    }

    #[test]
    fn test_tick_applies_gravity_down() {
        let mut world = still_world(&[Vec2::new(300.0, 300.0)]);
        let report = tick(&mut world, TiltInput::default());

        assert_eq!(world.time_ticks, 1);
        assert!((report.gravity - Vec2::new(0.0, 0.15)).length() < 1e-6);
        assert!(report.events.is_empty());
        assert!((world.balls[0].pos - Vec2::new(300.0, 300.15)).length() < 1e-4);
    }

    #[test]
    fn test_tick_wall_then_pairs() {
        // Ball 0 heads into the wall; balls 1 and 2 overlap near the center
        let mut world = still_world(&[
            Vec2::new(300.0, 538.0),
            Vec2::new(300.0, 300.0),
            Vec2::new(310.0, 300.0),
        ]);
        world.balls[0].vel = Vec2::new(0.0, 10.0);

        let report = tick(&mut world, TiltInput::default());
        assert_eq!(
            report.events,
            vec![
                CollisionEvent::Wall { ball: 0 },
                CollisionEvent::Pair { a: 1, b: 2 },
            ]
        );
        assert!(world.balls[0].vel.y < 0.0);
        assert!(world.arena.contains(world.balls[0].pos, world.ball_radius + 1e-3));
        assert!((world.balls[1].pos - world.balls[2].pos).length() >= 20.0 - 1e-3);
    }

    #[test]
    fn test_balls_stay_in_arena_over_time() {
        let config = SimConfig::for_variant(Variant::Multi);
        let mut world = World::new(&config, 2024).unwrap();
        let right = TiltInput {
            right: true,
            ..Default::default()
        };

        for i in 0..2000 {
            let input = if (i / 300) % 2 == 0 { TiltInput::default() } else { right };
            tick(&mut world, input);
            for ball in &world.balls {
                // Pair pushes can nudge a ball past the wall until the next tick
                let dist = (ball.pos - world.arena.center).length();
                assert!(dist + world.ball_radius <= world.arena.radius + 2.0 * world.ball_radius);
                assert!(ball.pos.is_finite() && ball.vel.is_finite());
            }
        }
        assert_eq!(world.balls.len(), config.ball_count);
    }

    #[test]
    fn test_single_ball_never_reports_pairs() {
        let config = SimConfig::for_variant(Variant::Single);
        let mut world = World::new(&config, 99).unwrap();
        let mut walls = 0;
        for _ in 0..1000 {
            let report = tick(&mut world, TiltInput::default());
            for event in report.events {
                assert!(matches!(event, CollisionEvent::Wall { ball: 0 }));
                walls += 1;
            }
        }
        assert!(walls > 0);
    }

    #[test]
    fn test_determinism() {
        // Two worlds with same seed and inputs end up byte-identical
        let config = SimConfig::default();
        let mut world1 = World::new(&config, 99999).unwrap();
        let mut world2 = World::new(&config, 99999).unwrap();

        let inputs = [
            TiltInput::default(),
            TiltInput {
                left: true,
                ..Default::default()
            },
            TiltInput {
                up: true,
                right: true,
                ..Default::default()
            },
            TiltInput::default(),
        ];

        for step in 0..400 {
            let input = inputs[step % inputs.len()];
            let r1 = tick(&mut world1, input);
            let r2 = tick(&mut world2, input);
            assert_eq!(r1, r2);
        }

        let json1 = serde_json::to_string(&world1).unwrap();
        let json2 = serde_json::to_string(&world2).unwrap();
        assert_eq!(json1, json2);
    }
}
