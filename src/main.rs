//! Tilt Arena entry point
//!
//! Handles platform-specific initialization and runs the frame loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, HtmlCanvasElement, KeyboardEvent};

    use glam::Vec2;
    use tilt_arena::audio::AudioManager;
    use tilt_arena::consts::VIEW_SIZE;
    use tilt_arena::driver::{DriverState, FrameDriver, InputSource, RenderSurface, TickAccumulator};
    use tilt_arena::renderer::{SdfRenderState, SurfaceRecovery};
    use tilt_arena::renderer::colors::Color;
    use tilt_arena::sim::{TiltInput, World};
    use tilt_arena::SimConfig;

    /// Held keys, updated by keydown/keyup listeners
    #[derive(Default)]
    struct WebInput {
        tilt: TiltInput,
        quit: bool,
    }

    impl WebInput {
        /// Returns false for keys we don't care about
        fn set_key(&mut self, key: &str, down: bool) -> bool {
            match key {
                "w" | "W" | "ArrowUp" => self.tilt.up = down,
                "s" | "S" | "ArrowDown" => self.tilt.down = down,
                "a" | "A" | "ArrowLeft" => self.tilt.left = down,
                "d" | "D" | "ArrowRight" => self.tilt.right = down,
                "Escape" => self.quit |= down,
                _ => return false,
            }
            true
        }
    }

    impl InputSource for WebInput {
        fn poll_quit(&mut self) -> bool {
            self.quit
        }

        fn tilt(&self) -> TiltInput {
            self.tilt
        }
    }

    /// WebGPU circles plus a DOM element for the readout
    struct WebSurface {
        sdf: SdfRenderState,
        hud: Option<Element>,
    }

    impl RenderSurface for WebSurface {
        fn clear(&mut self, color: Color) {
            self.sdf.begin_frame(color);
        }

        fn draw_circle(&mut self, center: Vec2, radius: f32, color: Color, stroke: Option<f32>) {
            self.sdf.push_circle(center, radius, color, stroke);
        }

        fn draw_text(&mut self, _pos: Vec2, text: &str, _color: Color) {
            // Placement comes from the page's CSS
            if let Some(hud) = &self.hud {
                hud.set_text_content(Some(text));
            }
        }

        fn present(&mut self) {
            if let Err(e) = self.sdf.render() {
                if SurfaceRecovery::for_error(&e) == SurfaceRecovery::Reconfigure {
                    self.sdf.resize(self.sdf.size.0, self.sdf.size.1);
                }
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        driver: FrameDriver<WebSurface, WebInput, AudioManager>,
        pacer: TickAccumulator,
        last_time: f64,
    }

    /// `?variant=single` style override from the page URL
    fn variant_from_location() -> Option<String> {
        let search = web_sys::window()?.location().search().ok()?;
        search
            .trim_start_matches('?')
            .split('&')
            .find_map(|pair| pair.strip_prefix("variant="))
            .map(str::to_string)
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            return;
        }

        log::info!("Tilt Arena starting...");

        let Some(window) = web_sys::window() else { return };
        let Some(document) = window.document() else { return };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element on the page");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let config = SimConfig::from_variant_name(variant_from_location().as_deref());
        let seed = js_sys::Date::now() as u64;
        let world = match World::new(&config, seed) {
            Ok(world) => world,
            Err(e) => {
                log::error!("Invalid configuration: {}", e);
                return;
            }
        };
        log::info!(
            "Variant {} with {} balls at {} Hz, seed {}",
            config.variant.as_str(),
            config.ball_count,
            config.tick_rate,
            seed
        );

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU,
            ..Default::default()
        });

        let surface = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => surface,
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                return;
            }
        };

        let adapter = match instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
        {
            Ok(adapter) => adapter,
            Err(e) => {
                log::error!("Failed to get adapter: {}", e);
                return;
            }
        };

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let view_center = Vec2::from(config.arena_center);
        let sdf = match SdfRenderState::new(surface, &adapter, width, height, view_center, VIEW_SIZE)
            .await
        {
            Ok(sdf) => sdf,
            Err(e) => {
                log::error!("Failed to create device: {}", e);
                return;
            }
        };

        let surface = WebSurface {
            sdf,
            hud: document.get_element_by_id("hud-gravity"),
        };
        let game = Rc::new(RefCell::new(Game {
            driver: FrameDriver::new(world, surface, WebInput::default(), AudioManager::new()),
            pacer: TickAccumulator::new(config.tick_rate),
            last_time: 0.0,
        }));

        setup_input_handlers(game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Tilt Arena running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Key down: hold a direction, Escape quits
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                if g.driver.input_mut().set_key(&event.key(), true) {
                    event.prevent_default();
                    // First key press counts as the user gesture audio needs
                    g.driver.audio().resume();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up: release a direction
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                game.borrow_mut().driver.input_mut().set_key(&event.key(), false);
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Page going away counts as quit
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().driver.input_mut().quit = true;
            });
            let _ = window
                .add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            let due = g.pacer.advance(dt);
            for _ in 0..due {
                if g.driver.step() == DriverState::Terminating {
                    break;
                }
            }

            if g.driver.state() == DriverState::Terminating {
                let stats = g.driver.stats();
                log::info!(
                    "Tilt Arena stopped after {} ticks, {} collisions",
                    stats.ticks,
                    stats.collisions
                );
                return;
            }

            // Browser frames render once, after however many ticks were due
            g.driver.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use tilt_arena::audio::LogCue;
    use tilt_arena::driver::{FrameDriver, InputSource, SleepPacer};
    use tilt_arena::renderer::TraceSurface;
    use tilt_arena::sim::{TiltInput, World};
    use tilt_arena::{ConfigError, SimConfig};

    /// Environment variable naming the variant (`single` or `multi`)
    const VARIANT_ENV: &str = "TILT_ARENA_VARIANT";
    /// Simulated seconds a headless run lasts
    const RUN_SECONDS: f32 = 10.0;

    /// No keyboard: gravity stays put and quit fires after a fixed tick count
    struct TimedQuit {
        remaining: u64,
    }

    impl InputSource for TimedQuit {
        fn poll_quit(&mut self) -> bool {
            if self.remaining == 0 {
                return true;
            }
            self.remaining -= 1;
            false
        }

        fn tilt(&self) -> TiltInput {
            TiltInput::default()
        }
    }

    pub fn run() -> Result<(), ConfigError> {
        let variant = std::env::var(VARIANT_ENV).ok();
        let config = SimConfig::from_variant_name(variant.as_deref());
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();

        log::info!("Tilt Arena (native, headless) starting with seed {}", seed);
        match serde_json::to_string(&config) {
            Ok(json) => log::info!("Config: {}", json),
            Err(e) => log::warn!("Could not serialize config: {}", e),
        }

        let world = World::new(&config, seed)?;
        let ticks = (config.tick_rate * RUN_SECONDS) as u64;
        let mut driver = FrameDriver::new(
            world,
            TraceSurface::new(),
            TimedQuit { remaining: ticks },
            LogCue::default(),
        );

        let stats = driver.run(&mut SleepPacer::new(config.tick_rate));
        log::info!(
            "Stopped after {} ticks, {} collisions, {} frames; last readout {:?}",
            stats.ticks,
            stats.collisions,
            driver.surface().frames,
            driver.surface().last_text
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = native::run() {
        log::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
}
