//! Glitch Grid entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, KeyboardEvent, TouchEvent};

    use glitch_grid::audio::{AudioManager, AudioSink, SoundEffect};
    use glitch_grid::consts::TILE;
    use glitch_grid::persistence::{LocalStorage, SecureStorage};
    use glitch_grid::platform::PerformanceClock;
    use glitch_grid::renderer::CanvasRenderer;
    use glitch_grid::sim::RunState;
    use glitch_grid::{Engine, EngineError, Settings, Simulation, Tuning};

    const CANVAS_ID: &str = "gameCanvas";

    /// Audio handle shared between the simulation and the mute toggle
    struct SharedAudio(Rc<RefCell<AudioManager>>);

    impl AudioSink for SharedAudio {
        fn play(&mut self, effect: SoundEffect) {
            self.0.borrow_mut().play(effect);
        }
    }

    /// Browser game wrapper
    struct Game {
        engine: Engine<CanvasRenderer, PerformanceClock>,
        settings: Settings,
        audio: Rc<RefCell<AudioManager>>,
        touch_start: Option<Vec2>,
        /// State shown by the overlay, to redraw it only on change
        shown_state: Option<RunState>,
    }

    impl Game {
        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let sim = &self.engine.sim;
            set_text(document, "score-val", &sim.score().to_string());
            set_text(document, "high-score-val", &sim.high_score().to_string());

            let state = sim.run_state();
            if self.shown_state == Some(state) {
                return;
            }
            self.shown_state = Some(state);

            set_text(document, "title-text", state.title());
            set_text(document, "status-text", state.status());
            set_hidden(document, "overlay", state == RunState::Playing);
            // Resume goes through the pause key, not the start button
            set_hidden(document, "start-btn", state == RunState::Paused);
        }

        /// Step the quality preset and push it to the particles and the grid
        fn cycle_quality(&mut self) {
            let preset = self.settings.cycle_preset();
            self.engine.sim.apply_settings(&self.settings);
            self.engine
                .renderer_mut()
                .set_show_grid(self.settings.show_grid);
            self.settings.save(self.engine.sim.storage_mut());
            log::info!("Quality preset {}", preset.label());
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.borrow_mut().set_muted(muted);
            self.settings.save(self.engine.sim.storage_mut());
            log::info!("Audio {}", if muted { "muted" } else { "unmuted" });
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    fn fatal(err: EngineError) -> JsValue {
        log::error!("Startup failed: {err}");
        JsValue::from_str(&err.to_string())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Glitch Grid starting...");

        let window = web_sys::window().ok_or_else(|| fatal(EngineError::NoWindow))?;
        let document = window
            .document()
            .ok_or_else(|| fatal(EngineError::NoWindow))?;

        let storage = SecureStorage::new(Box::new(LocalStorage));
        let settings = Settings::load(&storage);
        let audio = Rc::new(RefCell::new(AudioManager::new()));
        audio.borrow_mut().set_muted(settings.muted);

        let seed = js_sys::Date::now() as u64;
        let sim = Simulation::new(
            Tuning::default(),
            &settings,
            seed,
            storage,
            Box::new(SharedAudio(audio.clone())),
        )
        .map_err(|e| fatal(e.into()))?;

        let renderer = CanvasRenderer::new(
            CANVAS_ID,
            sim.tuning.grid_w,
            sim.tuning.grid_h,
            TILE,
            settings.show_grid,
        )
        .map_err(fatal)?;

        let engine = Engine::new(sim, renderer, PerformanceClock::default());

        let game = Rc::new(RefCell::new(Game {
            engine,
            settings,
            audio,
            touch_start: None,
            shown_state: None,
        }));
        game.borrow_mut().update_hud(&document);

        setup_start_button(&document, game.clone());
        setup_input_handlers(game.clone());
        setup_auto_pause(&document, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Glitch Grid running!");
        Ok(())
    }

    fn setup_start_button(document: &Document, game: Rc<RefCell<Game>>) {
        if let Some(btn) = document.get_element_by_id("start-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                // Browsers only unlock audio inside a user gesture
                g.audio.borrow().resume();
                g.engine.start();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                let code = event.code();
                if code == "KeyM" {
                    g.toggle_mute();
                } else if code == "KeyQ" {
                    g.cycle_quality();
                } else if g.engine.key_down(&code) {
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                if let Some(touch) = event.touches().get(0) {
                    game.borrow_mut().touch_start =
                        Some(Vec2::new(touch.client_x() as f32, touch.client_y() as f32));
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end (swipe)
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                let mut g = game.borrow_mut();
                let Some(start) = g.touch_start.take() else {
                    return;
                };
                if let Some(touch) = event.changed_touches().get(0) {
                    let end = Vec2::new(touch.client_x() as f32, touch.client_y() as f32);
                    if g.engine.swipe(start, end) {
                        event.prevent_default();
                    }
                }
            });
            let _ = window
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(document: &Document, game: Rc<RefCell<Game>>) {
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if document_clone.visibility_state() != web_sys::VisibilityState::Hidden {
                return;
            }
            let mut g = game.borrow_mut();
            if g.engine.sim.run_state() == RunState::Playing {
                g.engine.sim.toggle_pause();
                log::info!("Auto-paused (tab hidden)");
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            let events = g.engine.frame();

            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                if let Some(last) = events.last() {
                    set_text(&document, "a11y-status", &last.announcement());
                }
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use glitch_grid::audio::NullAudio;
    use glitch_grid::persistence::{MemoryStorage, SecureStorage};
    use glitch_grid::platform::ManualClock;
    use glitch_grid::renderer::{Renderer, Shape};
    use glitch_grid::sim::Simulation;
    use glitch_grid::{Command, Engine, RunState, Settings, Tuning, TuningError};

    /// Frame period of the simulated display
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Give up after ten simulated minutes
    const MAX_FRAMES: u32 = 36_000;

    /// Counts draw calls instead of drawing
    #[derive(Debug, Default)]
    struct CountingRenderer {
        frames: u64,
        draws: u64,
    }

    impl Renderer for CountingRenderer {
        fn clear(&mut self) {
            self.frames += 1;
        }

        fn draw_entity(&mut self, _x: f32, _y: f32, _color: &str, _shape: Shape, _phase: f32) {
            self.draws += 1;
        }

        fn draw_particle(&mut self, _x: f32, _y: f32, _scale: f32, _alpha: f32, _color: &str) {
            self.draws += 1;
        }
    }

    /// Read tuning overrides from the JSON file at `path`
    pub fn load_tuning(path: Option<String>) -> Result<Tuning, TuningError> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        log::info!("Loading tuning from {path}");
        let json = std::fs::read_to_string(&path).unwrap_or_else(|e| {
            log::warn!("Could not read {path}: {e}, using defaults");
            "{}".to_string()
        });
        Tuning::from_json(&json)
    }

    /// Greedy autopilot: head for the fragment, sidestep instead of reversing
    fn steer(sim: &Simulation) -> Option<Command> {
        let delta = sim.fragment.pos - sim.player.pos;
        let mut want = if delta.x != 0 {
            glam::IVec2::new(delta.x.signum(), 0)
        } else if delta.y != 0 {
            glam::IVec2::new(0, delta.y.signum())
        } else {
            return None;
        };

        let dir = sim.player.dir();
        if want == -dir {
            want = glam::IVec2::new(dir.y.abs(), dir.x.abs());
            if !glitch_grid::sim::collision::in_bounds(
                sim.player.pos + want,
                sim.tuning.grid_w,
                sim.tuning.grid_h,
            ) {
                want = -want;
            }
        }
        (want != sim.player.next_dir()).then_some(Command::Move {
            dx: want.x,
            dy: want.y,
        })
    }

    pub fn run(tuning: Tuning, seed: u64) -> Result<(), TuningError> {
        let clock = ManualClock::new();
        let sim = Simulation::new(
            tuning,
            &Settings::default(),
            seed,
            SecureStorage::new(Box::new(MemoryStorage::new())),
            Box::new(NullAudio),
        )?;
        let mut engine = Engine::new(sim, CountingRenderer::default(), clock.clone());
        engine.start();

        let mut frames = 0;
        while frames < MAX_FRAMES && !engine.sim.run_state().is_terminal() {
            if engine.sim.input_mut().is_empty()
                && let Some(cmd) = steer(&engine.sim)
            {
                engine.sim.push_command(cmd);
            }
            for event in engine.frame() {
                log::debug!("{}", event.announcement());
            }
            clock.advance(FRAME_MS);
            frames += 1;
        }

        let sim = &engine.sim;
        let state = sim.run_state();
        match state {
            RunState::IntegrityViolation => log::error!("Run voided after {frames} frames"),
            _ => log::info!(
                "Run ended ({:?}) after {frames} frames: score {}, high {}, {} enemies",
                state,
                sim.score(),
                sim.high_score(),
                sim.enemies.len()
            ),
        }
        log::info!(
            "Renderer saw {} frames, {} draw calls",
            engine.renderer().frames,
            engine.renderer().draws
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Glitch Grid (native) starting headless run...");
    log::info!("Run with `trunk serve` for the web version");

    let mut args = std::env::args().skip(1);
    let tuning = match headless::load_tuning(args.next()) {
        Ok(tuning) => tuning,
        Err(e) => {
            log::error!("Invalid tuning: {e}");
            std::process::exit(1);
        }
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);

    if let Err(e) = headless::run(tuning, seed) {
        log::error!("Invalid tuning: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
