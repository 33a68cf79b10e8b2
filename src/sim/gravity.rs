//! Steerable gravity
//!
//! Gravity always has the same strength; the player only changes its
//! direction by "tilting" the arena with the arrow/WASD keys.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Directions held this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TiltInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

/// Nudge the tilt by the held directions and renormalize.
///
/// Down grows Y, up shrinks Y, right grows X, left shrinks X (screen space).
/// A zero-length result is returned as-is.
pub fn update_tilt(tilt: Vec2, input: TiltInput, step: f32) -> Vec2 {
    let mut next = tilt;
    if input.up {
        next.y -= step;
    }
    if input.down {
        next.y += step;
    }
    if input.left {
        next.x -= step;
    }
    if input.right {
        next.x += step;
    }

    let norm = next.length();
    if norm != 0.0 { next / norm } else { next }
}

/// Gravity direction plus fixed strength
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GravityField {
    /// Unit direction (except in the degenerate zero case)
    pub tilt: Vec2,
    pub magnitude: f32,
    pub tilt_step: f32,
}

impl GravityField {
    /// Starts pointing straight down
    pub fn new(magnitude: f32, tilt_step: f32) -> Self {
        Self {
            tilt: Vec2::Y,
            magnitude,
            tilt_step,
        }
    }

    /// Apply this tick's input and return the gravity vector to integrate with
    pub fn update(&mut self, input: TiltInput) -> Vec2 {
        self.tilt = update_tilt(self.tilt, input, self.tilt_step);
        self.acceleration()
    }

    #[inline]
    pub fn acceleration(&self) -> Vec2 {
        self.tilt * self.magnitude
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{GRAVITY_MAGNITUDE, TILT_STEP};
    use proptest::prelude::*;

    #[test]
    fn test_idle_input_keeps_gravity_down() {
        let mut field = GravityField::new(GRAVITY_MAGNITUDE, TILT_STEP);
        let g = field.update(TiltInput::default());
        assert_eq!(field.tilt, Vec2::new(0.0, 1.0));
        assert!((g - Vec2::new(0.0, 0.15)).length() < 1e-6);
    }

    #[test]
    fn test_right_tilts_toward_positive_x() {
        let tilt = update_tilt(
            Vec2::Y,
            TiltInput {
                right: true,
                ..Default::default()
            },
            TILT_STEP,
        );
        assert!(tilt.x > 0.0);
        assert!(tilt.y < 1.0);
        assert!((tilt.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_up_against_down_shrinks_then_flips() {
        // Holding up long enough turns gravity upward
        let mut tilt = Vec2::new(0.001, 1.0).normalize();
        let up = TiltInput {
            up: true,
            ..Default::default()
        };
        for _ in 0..2000 {
            tilt = update_tilt(tilt, up, TILT_STEP);
        }
        assert!(tilt.y < 0.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let tilt = Vec2::new(0.6, 0.8);
        let all = TiltInput {
            up: true,
            down: true,
            left: true,
            right: true,
        };
        let next = update_tilt(tilt, all, TILT_STEP);
        assert!((next - tilt).length() < 1e-6);
    }

    #[test]
    fn test_zero_tilt_left_unnormalized() {
        let next = update_tilt(Vec2::ZERO, TiltInput::default(), TILT_STEP);
        assert_eq!(next, Vec2::ZERO);

        // Step lands exactly on zero
        let next = update_tilt(
            Vec2::new(0.0, TILT_STEP),
            TiltInput {
                up: true,
                ..Default::default()
            },
            TILT_STEP,
        );
        assert_eq!(next, Vec2::ZERO);
    }

    fn input_strategy() -> impl Strategy<Value = TiltInput> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
            |(up, down, left, right)| TiltInput {
                up,
                down,
                left,
                right,
            },
        )
    }

    proptest! {
        #[test]
        fn prop_tilt_stays_unit(
            theta in 0.0f32..std::f32::consts::TAU,
            inputs in proptest::collection::vec(input_strategy(), 1..200),
        ) {
            let mut field = GravityField::new(GRAVITY_MAGNITUDE, TILT_STEP);
            field.tilt = crate::direction(theta);
            for input in inputs {
                let g = field.update(input);
                prop_assert!((field.tilt.length() - 1.0).abs() < 1e-4);
                prop_assert!((g.length() - GRAVITY_MAGNITUDE).abs() < 1e-4);
            }
        }
    }
}
