//! Render surfaces
//!
//! The browser draws with WebGPU, evaluating circle SDFs in the fragment
//! shader. Native runs are headless and only trace what would be drawn.

pub mod sdf_pipeline;
pub mod trace;

pub use sdf_pipeline::{SdfRenderState, SurfaceRecovery};
pub use trace::TraceSurface;

/// Colors for scene elements (linear RGBA)
pub mod colors {
    pub type Color = [f32; 4];

    pub const BACKGROUND: Color = [0.0, 0.0, 0.0, 1.0];
    pub const ARENA_WALL: Color = [1.0, 1.0, 1.0, 1.0];
    pub const BALL: Color = [1.0, 0.0, 0.0, 1.0];
    pub const TEXT: Color = [1.0, 1.0, 1.0, 1.0];
}
