//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - One tick per call, no wall-clock time
//! - Seeded RNG only (at spawn)
//! - Stable iteration order (by ball index)
//! - No rendering, audio or platform dependencies

pub mod collision;
pub mod gravity;
pub mod state;
pub mod tick;

pub use collision::{
    CollisionEvent, FALLBACK_NORMAL, reflect_with_restitution, resolve_boundary, resolve_pair,
    resolve_pairs, resolve_walls,
};
pub use gravity::{GravityField, TiltInput, update_tilt};
pub use state::{Arena, Ball, World};
pub use tick::{TickReport, integrate, tick};
