//! Frame driver
//!
//! Runs the per-frame sequence around the pure simulation: poll quit, read the
//! keys, tick the world, play collision cues, draw. Rendering, input and sound
//! are collaborators behind traits so the loop runs the same in the browser,
//! headless on native, and under test.

use glam::Vec2;

use crate::audio::{AudioError, Cue};
use crate::consts::{ARENA_STROKE, MAX_FRAME_DELTA, MAX_SUBSTEPS};
use crate::renderer::colors::{self, Color};
use crate::sim::{CollisionEvent, TiltInput, World, tick};

/// Something that can draw circles and text
pub trait RenderSurface {
    fn clear(&mut self, color: Color);
    /// `stroke` of `None` fills the circle, `Some(w)` draws a ring `w` wide inside the radius
    fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, stroke: Option<f32>);
    fn draw_text(&mut self, pos: Vec2, text: &str, color: Color);
    fn present(&mut self);
}

/// Keyboard snapshot plus the quit signal
pub trait InputSource {
    /// True once the host wants the loop to stop
    fn poll_quit(&mut self) -> bool;
    fn tilt(&self) -> TiltInput;
}

/// Fire-and-forget sound trigger
pub trait SoundCue {
    fn play(&mut self, cue: Cue) -> Result<(), AudioError>;
}

/// Blocks until the next tick is due
pub trait Pacer {
    fn wait(&mut self);
}

/// Driver lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Terminating,
}

/// Counters reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub ticks: u64,
    pub collisions: u64,
    pub cue_failures: u64,
}

/// Owns the world and its collaborators and advances them one frame at a time
pub struct FrameDriver<S, I, A> {
    world: World,
    surface: S,
    input: I,
    audio: A,
    state: DriverState,
    /// Last applied gravity, shown in the readout
    gravity: Vec2,
    stats: DriverStats,
}

impl<S: RenderSurface, I: InputSource, A: SoundCue> FrameDriver<S, I, A> {
    pub fn new(world: World, surface: S, input: I, audio: A) -> Self {
        let gravity = world.gravity.acceleration();
        Self {
            world,
            surface,
            input,
            audio,
            state: DriverState::Running,
            gravity,
            stats: DriverStats::default(),
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    /// Physics half of a frame: quit check, input, tick, cues.
    ///
    /// Does nothing once terminating; a quit seen here skips the tick.
    pub fn step(&mut self) -> DriverState {
        if self.state == DriverState::Terminating {
            return self.state;
        }
        if self.input.poll_quit() {
            log::info!(
                "Quit received after {} ticks ({} collisions)",
                self.stats.ticks,
                self.stats.collisions
            );
            self.state = DriverState::Terminating;
            return self.state;
        }

        let report = tick(&mut self.world, self.input.tilt());
        self.gravity = report.gravity;
        self.stats.ticks += 1;
        self.stats.collisions += report.events.len() as u64;
        self.dispatch_cues(&report.events);

        self.state
    }

    /// Draw the arena, every ball and the gravity readout
    pub fn render(&mut self) {
        let surface = &mut self.surface;
        surface.clear(colors::BACKGROUND);
        surface.draw_circle(
            self.world.arena.center,
            self.world.arena.radius,
            colors::ARENA_WALL,
            Some(ARENA_STROKE),
        );
        for ball in &self.world.balls {
            surface.draw_circle(ball.pos, self.world.ball_radius, colors::BALL, None);
        }
        surface.draw_text(
            Vec2::new(10.0, 10.0),
            &gravity_readout(self.gravity),
            colors::TEXT,
        );
        surface.present();
    }

    /// One full frame; nothing is drawn after a quit
    pub fn tick(&mut self) -> DriverState {
        if self.step() == DriverState::Running {
            self.render();
        }
        self.state
    }

    /// Tick until quit, pacing between frames
    pub fn run<P: Pacer>(&mut self, pacer: &mut P) -> DriverStats {
        while self.tick() == DriverState::Running {
            pacer.wait();
        }
        self.stats
    }

    /// One cue per collision; a failing sound never stops the simulation
    fn dispatch_cues(&mut self, events: &[CollisionEvent]) {
        for event in events {
            if let Err(err) = self.audio.play(Cue::for_event(event)) {
                if self.stats.cue_failures == 0 {
                    log::warn!("Sound cue failed, continuing without it: {}", err);
                } else {
                    log::debug!("Sound cue failed: {}", err);
                }
                self.stats.cue_failures += 1;
            }
        }
    }
}

/// Text shown in the corner, e.g. `Gravity: (0.000, 0.150)`
pub fn gravity_readout(gravity: Vec2) -> String {
    format!("Gravity: ({:.3}, {:.3})", gravity.x, gravity.y)
}

/// Converts animation-frame deltas into whole ticks at a fixed rate
#[derive(Debug, Clone)]
pub struct TickAccumulator {
    interval: f32,
    accumulator: f32,
}

impl TickAccumulator {
    pub fn new(tick_rate: f32) -> Self {
        Self {
            interval: 1.0 / tick_rate,
            accumulator: 0.0,
        }
    }

    /// Add elapsed seconds and return how many ticks are due now
    pub fn advance(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DELTA);

        let mut due = 0;
        while self.accumulator >= self.interval && due < MAX_SUBSTEPS {
            self.accumulator -= self.interval;
            due += 1;
        }
        // Drop whatever the substep cap left behind
        if due == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(self.interval);
        }
        due
    }
}

/// Sleeps on the current thread until the next tick deadline
#[cfg(not(target_arch = "wasm32"))]
pub struct SleepPacer {
    interval: std::time::Duration,
    next: std::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl SleepPacer {
    pub fn new(tick_rate: f32) -> Self {
        let interval = std::time::Duration::from_secs_f32(1.0 / tick_rate);
        Self {
            interval,
            next: std::time::Instant::now() + interval,
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Pacer for SleepPacer {
    fn wait(&mut self) {
        let now = std::time::Instant::now();
        if self.next > now {
            std::thread::sleep(self.next - now);
            self.next += self.interval;
        } else {
            // Fell behind; don't try to catch up
            self.next = now + self.interval;
        }
    }
}
