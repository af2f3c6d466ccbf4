//! Light Cycle entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

use glam::Vec2;
use lightcycle::consts::*;
use lightcycle::sim::{Livery, PlayerSpec, World};

/// Standard two-bike layout: a steerable cyan bike and a parked orange one
fn spawn_default_bikes(world: &mut World) -> u32 {
    let viewport = world.viewport;
    let player = world.spawn_player(PlayerSpec {
        pos: Vec2::new(viewport.x * 0.25, viewport.y * 0.5 - BIKE_SIZE * 0.5),
        rotation: 90.0,
        livery: Livery::Cyan,
        controllable: true,
    });
    world.spawn_player(PlayerSpec {
        pos: Vec2::new(viewport.x * 0.75, viewport.y * 0.5 - BIKE_SIZE * 0.5),
        rotation: 270.0,
        livery: Livery::Orange,
        controllable: false,
    });
    player
}

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent};

    use glam::Vec2;
    use lightcycle::audio::{AudioManager, SoundEffect};
    use lightcycle::consts::*;
    use lightcycle::platform::{FixedStepClock, HostCommand, map_key};
    use lightcycle::renderer::RenderState;
    use lightcycle::sim::{GameEvent, World, tick};
    use lightcycle::Tuning;

    /// Game instance holding all state
    struct Game {
        world: World,
        clock: FixedStepClock,
        render_state: Option<RenderState>,
        audio: AudioManager,
        /// The keyboard-steered bike, while it exists
        player_id: Option<u32>,
    }

    impl Game {
        fn new(tuning: Tuning, viewport: Vec2, seed: u64) -> Self {
            let mut world = World::new(tuning, viewport, seed);
            let player_id = super::spawn_default_bikes(&mut world);
            Self {
                world,
                clock: FixedStepClock::new(),
                render_state: None,
                audio: AudioManager::new(),
                player_id: Some(player_id),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, time: f64) {
            let steps = self.clock.advance(time);
            for _ in 0..steps {
                tick(&mut self.world, SIM_DT);
            }

            for event in self.world.drain_events() {
                if let Some(effect) = SoundEffect::for_event(&event) {
                    self.audio.play(effect);
                }
                if let GameEvent::PlayerDestroyed { player } = event {
                    if self.player_id == Some(player) {
                        log::info!("Player bike destroyed");
                        self.player_id = None;
                    }
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&self.world) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        fn toggle_pause(&mut self) {
            self.world.toggle_pause();
            self.clock.reset();
            self.audio.play(if self.world.is_paused() {
                SoundEffect::Pause
            } else {
                SoundEffect::Resume
            });
        }

        /// Start over with fresh bikes once the player's bike is gone
        fn restart(&mut self, seed: u64) {
            let tuning = self.world.tuning.clone();
            let viewport = self.world.viewport;
            self.world = World::new(tuning, viewport, seed);
            self.player_id = Some(super::spawn_default_bikes(&mut self.world));
            self.clock.reset();
            log::info!("Game restarted with seed: {}", seed);
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialised".into());
        }

        log::info!("Light Cycle starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Simulation runs in CSS pixels, the surface in device pixels
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let seed = js_sys::Date::now() as u64;
        let viewport = Vec2::new(client_w as f32, client_h as f32);
        let game = Rc::new(RefCell::new(Game::new(Tuning::load(), viewport, seed)));
        log::info!("Game initialized with seed: {}", seed);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {}", e),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {}", e),
                }
            }
            Err(e) => log::error!("Failed to create surface: {}", e),
        }

        setup_keyboard(game.clone());
        setup_auto_pause(game.clone());
        setup_resize(canvas, game.clone());

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        request_animation_frame(game);

        log::info!("Light Cycle running!");
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let Some(command) = map_key(&event.key(), event.key_code()) else {
                    // Enter restarts once the player's bike is gone
                    let mut g = game.borrow_mut();
                    if g.player_id.is_none() && event.key() == "Enter" {
                        g.restart(js_sys::Date::now() as u64);
                    }
                    return;
                };
                if command.prevents_default() {
                    event.prevent_default();
                }
                let mut g = game.borrow_mut();
                match command {
                    HostCommand::Steer(key) => {
                        if let Some(id) = g.player_id {
                            g.world.key_down(id, key);
                        }
                    }
                    HostCommand::TogglePause => {
                        if !event.repeat() {
                            g.toggle_pause();
                        }
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if let Some(HostCommand::Steer(key)) = map_key(&event.key(), event.key_code()) {
                    event.prevent_default();
                    let mut g = game.borrow_mut();
                    if let Some(id) = g.player_id {
                        g.world.key_up(id, key);
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            return;
        };

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if !g.world.is_paused() {
                        g.toggle_pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if !g.world.is_paused() {
                    g.toggle_pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let client_w = canvas.client_width().max(1);
            let client_h = canvas.client_height().max(1);
            let width = (client_w as f64 * dpr) as u32;
            let height = (client_h as f64 * dpr) as u32;
            canvas.set_width(width);
            canvas.set_height(height);

            let mut g = game.borrow_mut();
            g.world.resize(Vec2::new(client_w as f32, client_h as f32));
            if let Some(render_state) = g.render_state.as_mut() {
                render_state.resize(width, height);
            }
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use lightcycle::Tuning;
    use lightcycle::sim::{Key, tick};

    env_logger::init();
    log::info!("Light Cycle (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    // Optional tuning overrides as a JSON file
    let tuning = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path) {
            Ok(json) => Tuning::from_json(&json).unwrap_or_else(|e| {
                log::warn!("Ignoring tuning from {}: {}", path, e);
                Tuning::default()
            }),
            Err(e) => {
                log::warn!("Could not read {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let mut world = World::new(tuning, Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT), 1);
    let player = spawn_default_bikes(&mut world);

    // Full throttle towards the parked bike, with a short swerve partway
    world.key_down(player, Key::Up);
    for frame in 0..500u32 {
        match frame {
            60 => world.key_down(player, Key::Left),
            66 => world.key_up(player, Key::Left),
            90 => world.key_down(player, Key::Right),
            96 => world.key_up(player, Key::Right),
            _ => {}
        }
        tick(&mut world, SIM_DT);
        for event in world.drain_events() {
            log::debug!("[{:>4}] {:?}", world.time_ticks, event);
        }
    }

    log::info!(
        "Demo finished after {} ticks: {} bikes, {} trail segments, {} explosions",
        world.time_ticks,
        world.players.len(),
        world.trails.len(),
        world.explosions.len()
    );
    world.clear();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
