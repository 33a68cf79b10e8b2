//! Collision detection and response
//!
//! Two kinds of contact: a ball poking through the arena wall, and two balls
//! overlapping. Both bounce with the same restitution-scaled reflection and
//! push the bodies apart in a single step. Resolvers never play sounds; they
//! report what happened as `CollisionEvent`s and the caller decides.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::{Arena, Ball};

/// Used when two centers coincide and no direction can be derived
pub const FALLBACK_NORMAL: Vec2 = Vec2::X;

/// Something hit something during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CollisionEvent {
    /// Ball at this index bounced off the arena wall
    Wall { ball: usize },
    /// Balls `a < b` bounced off each other
    Pair { a: usize, b: usize },
}

/// Reflect velocity off a surface, keeping `restitution` of the normal speed.
///
/// v' = v - (1 + e)(v·n)n. The tangential part is untouched.
#[inline]
pub fn reflect_with_restitution(velocity: Vec2, normal: Vec2, restitution: f32) -> Vec2 {
    velocity - (1.0 + restitution) * velocity.dot(normal) * normal
}

/// Unit vector along `offset`, or the fallback for a zero offset
#[inline]
fn contact_normal(offset: Vec2, distance: f32) -> Vec2 {
    if distance != 0.0 {
        offset / distance
    } else {
        FALLBACK_NORMAL
    }
}

/// Push a ball back inside the arena and bounce it.
///
/// Returns true when the ball was penetrating the wall.
pub fn resolve_boundary(ball: &mut Ball, ball_radius: f32, arena: &Arena, restitution: f32) -> bool {
    let offset = ball.pos - arena.center;
    let distance = offset.length();

    if distance + ball_radius <= arena.radius {
        return false;
    }

    // Points outward, through the ball
    let normal = contact_normal(offset, distance);
    ball.vel = reflect_with_restitution(ball.vel, normal, restitution);

    let overlap = (distance + ball_radius) - arena.radius;
    ball.pos -= normal * overlap;
    true
}

/// Separate and bounce two overlapping balls.
///
/// Each ball reflects its own velocity off the shared normal as if hitting a
/// fixed wall; there is no exchanged impulse. Returns true on overlap.
pub fn resolve_pair(a: &mut Ball, b: &mut Ball, ball_radius: f32, restitution: f32) -> bool {
    let offset = a.pos - b.pos;
    let distance = offset.length();
    let min_distance = 2.0 * ball_radius;

    if distance >= min_distance {
        return false;
    }

    // Points from b toward a
    let normal = contact_normal(offset, distance);
    a.vel = reflect_with_restitution(a.vel, normal, restitution);
    b.vel = reflect_with_restitution(b.vel, normal, restitution);

    let half = (min_distance - distance) / 2.0;
    a.pos += normal * half;
    b.pos -= normal * half;
    true
}

/// Check every ball against the wall, in index order
pub fn resolve_walls(
    balls: &mut [Ball],
    ball_radius: f32,
    arena: &Arena,
    restitution: f32,
    events: &mut Vec<CollisionEvent>,
) {
    for (idx, ball) in balls.iter_mut().enumerate() {
        if resolve_boundary(ball, ball_radius, arena, restitution) {
            events.push(CollisionEvent::Wall { ball: idx });
        }
    }
}

/// Single pass over every unordered pair (i < j, i then j ascending).
///
/// A ball touched by several pairs sees each correction in turn; overlaps
/// reintroduced by a later pair are left for the next tick.
pub fn resolve_pairs(
    balls: &mut [Ball],
    ball_radius: f32,
    restitution: f32,
    events: &mut Vec<CollisionEvent>,
) {
    for i in 0..balls.len() {
        let (head, tail) = balls.split_at_mut(i + 1);
        let a = &mut head[i];
        for (offset, b) in tail.iter_mut().enumerate() {
            if resolve_pair(a, b, ball_radius, restitution) {
                events.push(CollisionEvent::Pair {
                    a: i,
                    b: i + 1 + offset,
                });
            }
        }
    }
}
