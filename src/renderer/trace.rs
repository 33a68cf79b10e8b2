//! Headless render surface
//!
//! Keeps the last finished frame around so native runs (and tests) can see
//! what would have been drawn.

use glam::Vec2;

use super::colors::Color;
use crate::driver::RenderSurface;

/// One buffered circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleCommand {
    pub center: Vec2,
    pub radius: f32,
    pub color: Color,
    pub stroke: Option<f32>,
}

#[derive(Debug, Default)]
pub struct TraceSurface {
    pending: Vec<CircleCommand>,
    pending_text: Option<String>,
    /// Circles of the last presented frame
    pub last_frame: Vec<CircleCommand>,
    /// Readout of the last presented frame
    pub last_text: Option<String>,
    pub frames: u64,
}

impl TraceSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for TraceSurface {
    fn clear(&mut self, _color: Color) {
        self.pending.clear();
        self.pending_text = None;
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, stroke: Option<f32>) {
        log::trace!("circle at ({:.1}, {:.1}) r={}", center.x, center.y, radius);
        self.pending.push(CircleCommand {
            center,
            radius,
            color,
            stroke,
        });
    }

    fn draw_text(&mut self, _pos: Vec2, text: &str, _color: Color) {
        log::trace!("text {:?}", text);
        self.pending_text = Some(text.to_string());
    }

    fn present(&mut self) {
        self.frames += 1;
        self.last_frame = std::mem::take(&mut self.pending);
        self.last_text = self.pending_text.take();
    }
}
