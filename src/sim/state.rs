//! Simulation state
//!
//! The whole run lives in a `World`: the fixed arena, the gravity field and
//! the balls. Nothing here is global; the frame driver owns the world and
//! hands it to `tick` by reference.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::gravity::GravityField;
use crate::direction;
use crate::settings::{ConfigError, SimConfig};

/// The circular wall, fixed for the run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub center: Vec2,
    pub radius: f32,
}

impl Arena {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Whether a circle is fully inside the wall
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        (pos - self.center).length() + radius <= self.radius
    }
}

/// A ball: position and velocity only
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Self { pos, vel }
    }
}

/// Complete simulation state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    /// Run seed for reproducibility
    pub seed: u64,
    pub arena: Arena,
    pub gravity: GravityField,
    /// Fixed-size, index-ordered; never grows or shrinks during a run
    pub balls: Vec<Ball>,
    pub ball_radius: f32,
    pub restitution: f32,
    /// Simulation tick counter
    pub time_ticks: u64,
}

impl World {
    /// Validate the config and spawn its balls around the arena center
    pub fn new(config: &SimConfig, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;

        let center = Vec2::new(config.arena_center.0, config.arena_center.1);
        let mut rng = Pcg32::seed_from_u64(seed);
        let balls = (0..config.ball_count)
            .map(|_| spawn_ball(&mut rng, center, config))
            .collect();

        Ok(Self {
            seed,
            arena: Arena::new(center, config.arena_radius),
            gravity: GravityField::new(config.gravity_magnitude, config.tilt_step),
            balls,
            ball_radius: config.ball_radius,
            restitution: config.restitution,
            time_ticks: 0,
        })
    }

    pub fn ball_count(&self) -> usize {
        self.balls.len()
    }
}

fn spawn_ball(rng: &mut Pcg32, center: Vec2, config: &SimConfig) -> Ball {
    let jitter = config.spawn_jitter;
    let offset = if jitter > 0.0 {
        Vec2::new(
            rng.random_range(-jitter..=jitter),
            rng.random_range(-jitter..=jitter),
        )
    } else {
        Vec2::ZERO
    };
    let theta = rng.random_range(0.0..std::f32::consts::TAU);
    Ball::new(center + offset, direction(theta) * config.ball_start_speed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Variant;

    #[test]
    fn test_spawn_multi() {
        let config = SimConfig::for_variant(Variant::Multi);
        let world = World::new(&config, 42).unwrap();
        assert_eq!(world.ball_count(), config.ball_count);
        assert_eq!(world.time_ticks, 0);

        for ball in &world.balls {
            let offset = ball.pos - world.arena.center;
            assert!(offset.x.abs() <= config.spawn_jitter);
            assert!(offset.y.abs() <= config.spawn_jitter);
            assert!((ball.vel.length() - config.ball_start_speed).abs() < 1e-4);
            assert!(world.arena.contains(ball.pos, world.ball_radius));
        }
    }

    #[test]
    fn test_spawn_single_at_center() {
        let config = SimConfig::for_variant(Variant::Single);
        let world = World::new(&config, 7).unwrap();
        assert_eq!(world.balls.len(), 1);
        assert_eq!(world.balls[0].pos, Vec2::new(300.0, 300.0));
        assert!((world.balls[0].vel.length() - 10.0).abs() < 1e-4);
        assert_eq!(world.gravity.tilt, Vec2::Y);
    }

    #[test]
    fn test_same_seed_same_spawn() {
        let config = SimConfig::default();
        let a = World::new(&config, 1234).unwrap();
        let b = World::new(&config, 1234).unwrap();
        let c = World::new(&config, 4321).unwrap();
        assert_eq!(a.balls, b.balls);
        assert_ne!(a.balls, c.balls);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = SimConfig::default();
        config.ball_count = 0;
        assert!(World::new(&config, 1).is_err());
    }

    #[test]
    fn test_arena_contains() {
        let arena = Arena::new(Vec2::new(300.0, 300.0), 250.0);
        assert!(arena.contains(Vec2::new(300.0, 540.0), 10.0));
        assert!(!arena.contains(Vec2::new(300.0, 545.0), 10.0));
    }
}
