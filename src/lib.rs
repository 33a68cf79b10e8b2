//! Tilt Arena - balls bouncing inside a circle under steerable gravity
//!
//! Core modules:
//! - `sim`: Deterministic simulation (gravity, integration, collisions)
//! - `driver`: Frame driver and the collaborator seams it talks to
//! - `renderer`: WebGPU SDF renderer and a headless trace surface
//! - `audio`: Collision sound cues
//! - `settings`: Variant presets and run constants

pub mod audio;
pub mod driver;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use driver::{DriverState, FrameDriver, InputSource, RenderSurface, SoundCue};
pub use settings::{ConfigError, SimConfig, Variant};

use glam::Vec2;

/// Simulation configuration constants
///
/// Units are screen units (pixels of a 600x600 view) and ticks; Y grows downward.
pub mod consts {
    /// Side length of the square view the arena is drawn in
    pub const VIEW_SIZE: f32 = 600.0;

    /// Arena geometry
    pub const ARENA_CENTER_X: f32 = VIEW_SIZE / 2.0;
    pub const ARENA_CENTER_Y: f32 = VIEW_SIZE / 2.0;
    pub const ARENA_RADIUS: f32 = 250.0;
    /// Stroke width of the arena outline
    pub const ARENA_STROKE: f32 = 2.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Launch speed (units/tick), direction is random
    pub const BALL_START_SPEED: f32 = 10.0;

    /// Gravity acceleration (units/tick²)
    pub const GRAVITY_MAGNITUDE: f32 = 0.15;
    /// Tilt change per tick per held direction
    pub const TILT_STEP: f32 = 0.005;

    /// Fraction of normal velocity kept after any bounce
    pub const RESTITUTION: f32 = 0.995;

    /// Single-ball variant runs fast to keep the lone ball smooth
    pub const SINGLE_BALL_TICK_RATE: f32 = 155.0;
    pub const MULTI_BALL_TICK_RATE: f32 = 60.0;
    pub const MULTI_BALL_COUNT: usize = 8;
    /// Max offset from the arena center when spawning multiple balls
    pub const MULTI_BALL_SPAWN_JITTER: f32 = 40.0;

    /// Maximum ticks per animation frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame delta the accumulator accepts (seconds)
    pub const MAX_FRAME_DELTA: f32 = 0.1;
}

/// Unit direction for an angle in radians (screen space, Y down)
#[inline]
pub fn direction(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
