//! Flappy Drone entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, KeyboardEvent, PointerEvent};

    use flappy_drone::audio::AudioManager;
    use flappy_drone::consts::DEFAULT_PLAYER_NAME;
    use flappy_drone::persistence::LocalStorage;
    use flappy_drone::renderer::{RenderState, build_scene};
    use flappy_drone::session::NamePrompt;
    use flappy_drone::sim::GamePhase;
    use flappy_drone::{Session, Settings, Viewport, platform};

    /// `window.prompt` for the high-score name
    struct BrowserPrompt;

    impl NamePrompt for BrowserPrompt {
        fn request_name(&mut self) -> Option<String> {
            web_sys::window()?
                .prompt_with_message_and_default("New high score! Enter your name:", DEFAULT_PLAYER_NAME)
                .ok()
                .flatten()
        }
    }

    type WebSession = Session<AudioManager, LocalStorage, BrowserPrompt>;

    /// Game instance holding all state
    struct Game {
        session: WebSession,
        render_state: Option<RenderState>,
        settings: Settings,
        canvas: HtmlCanvasElement,
        /// Phase shown by the overlays, to rebuild them only on change
        shown_phase: Option<GamePhase>,
    }

    /// Canvas size in CSS pixels (game space) and physical pixels (surface)
    fn canvas_size(canvas: &HtmlCanvasElement) -> (Viewport, u32, u32) {
        let dpr = web_sys::window()
            .map(|w| w.device_pixel_ratio())
            .unwrap_or(1.0);
        let client_w = canvas.client_width().max(1);
        let client_h = canvas.client_height().max(1);
        let view = Viewport::new(client_w as f32, client_h as f32);
        (
            view,
            (client_w as f64 * dpr) as u32,
            (client_h as f64 * dpr) as u32,
        )
    }

    impl Game {
        fn tap(&mut self) {
            self.session.audio().resume();
            self.session.tap();
        }

        fn resize(&mut self) {
            let (view, width, height) = canvas_size(&self.canvas);
            self.canvas.set_width(width);
            self.canvas.set_height(height);
            if let Some(ref mut render_state) = self.render_state {
                render_state.resize(width, height, view);
            }
            self.session.resize(view);
        }

        fn set_hidden(&mut self, hidden: bool) {
            self.session.set_hidden(hidden, platform::now_ms());
            if self.settings.mute_on_hidden {
                self.session.audio_mut().set_hidden(hidden);
            }
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.session.audio_mut().apply_settings(&self.settings);
            self.settings.save(&mut LocalStorage);
            log::info!("Muted: {}", self.settings.muted);
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = build_scene(self.session.state());
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let (w, h) = render_state.size;
                        let view = render_state.view;
                        render_state.resize(w, h, view);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            let state = self.session.state();

            if let Some(el) = document.query_selector("#hud-score .hud-value").ok().flatten() {
                el.set_text_content(Some(&state.score.to_string()));
            }

            if let Some(el) = document.get_element_by_id("hud-fps") {
                if self.settings.show_fps {
                    let _ = el.set_attribute("class", "hud-item");
                    if let Some(val) = document.query_selector("#hud-fps .hud-value").ok().flatten() {
                        val.set_text_content(Some(&format!("{:.0}", self.session.fps())));
                    }
                } else {
                    let _ = el.set_attribute("class", "hud-item hidden");
                }
            }

            if let Some(el) = document.get_element_by_id("autopilot-badge") {
                let class = if self.session.autopilot() { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            // Overlays only change with the phase
            if self.shown_phase == Some(state.phase) {
                return;
            }
            self.shown_phase = Some(state.phase);

            if let Some(el) = document.get_element_by_id("intro") {
                let class = if state.phase == GamePhase::Intro { "" } else { "hidden" };
                let _ = el.set_attribute("class", class);
            }

            if let Some(el) = document.get_element_by_id("game-over") {
                if state.phase.is_dead() {
                    let _ = el.set_attribute("class", "");
                    if let Some(score_el) = document.get_element_by_id("final-score") {
                        score_el.set_text_content(Some(&state.score.to_string()));
                    }
                    if let Some(list) = document.get_element_by_id("high-score-list") {
                        let lines: Vec<String> = self
                            .session
                            .high_scores()
                            .entries()
                            .iter()
                            .enumerate()
                            .map(|(i, e)| format!("{}. {} - {}", i + 1, e.name, e.score))
                            .collect();
                        list.set_text_content(Some(&lines.join("\n")));
                    }
                } else {
                    let _ = el.set_attribute("class", "hidden");
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Flappy Drone starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let (view, width, height) = canvas_size(&canvas);
        canvas.set_width(width);
        canvas.set_height(height);

        let settings = Settings::load(&LocalStorage);
        let is_mobile = platform::is_mobile();
        let mut audio = AudioManager::new();
        audio.apply_settings(&settings);

        let seed = js_sys::Date::now() as u64;
        let session = Session::new(
            seed,
            view,
            &settings,
            is_mobile,
            platform::now_ms(),
            LocalStorage,
            audio,
            BrowserPrompt,
        );
        log::info!(
            "Game initialized with seed: {} (mobile: {}, quality: {})",
            seed,
            is_mobile,
            settings.quality.as_str()
        );

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let render_state = match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                match instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::LowPower,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await
                {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        RenderState::new(surface, &adapter, width, height, view)
                            .await
                            .map_err(|e| log::error!("Failed to create device: {}", e))
                            .ok()
                    }
                    Err(e) => {
                        log::error!("No graphics adapter: {}", e);
                        None
                    }
                }
            }
            Err(e) => {
                log::error!("Failed to create surface: {}", e);
                None
            }
        };

        let game = Rc::new(RefCell::new(Game {
            session,
            render_state,
            settings,
            canvas: canvas.clone(),
            shown_phase: None,
        }));

        setup_input_handlers(&canvas, game.clone());
        setup_window_handlers(game.clone());

        if let Some(hud) = document.get_element_by_id("hud") {
            let _ = hud.set_attribute("class", "");
        }

        // Draw the title screen once before the first accepted frame
        {
            let mut g = game.borrow_mut();
            g.render();
            g.update_hud();
        }

        // Start game loop
        request_animation_frame(game);

        log::info!("Flappy Drone running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer (mouse, touch and pen) taps
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                game.borrow_mut().tap();
            });
            let _ = canvas
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " | "Enter" | "ArrowUp" => {
                        event.prevent_default();
                        if !event.repeat() {
                            g.tap();
                        }
                    }
                    "i" | "I" => g.session.toggle_autopilot(),
                    "m" | "M" => g.toggle_mute(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_window_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let document = window.document().unwrap();

        // Resize
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut g = game.borrow_mut();
                g.resize();
                g.render();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Visibility change (tab switch, minimize)
        {
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let hidden = document_clone.visibility_state() == web_sys::VisibilityState::Hidden;
                game.borrow_mut().set_hidden(hidden);
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.session.audio_mut().pump();

            // Dropped and suspended frames skip both update and render
            if g.session.frame(time) {
                g.render();
                g.update_hud();
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

/// Simulated frames in a headless run (two minutes at 60 fps)
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAMES: u32 = 7_200;

/// Just above the 60 fps cap so no frame is dropped
#[cfg(not(target_arch = "wasm32"))]
const HEADLESS_FRAME_MS: f64 = 17.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use flappy_drone::persistence::{FileStore, KeyValueStore, MemoryStore};
    use flappy_drone::session::Silent;
    use flappy_drone::{Session, Settings, Viewport, platform};

    env_logger::init();
    log::info!("Flappy Drone (native) starting...");
    log::info!("Rendering needs a browser - run with `trunk serve` for the web version");

    let store: Box<dyn KeyValueStore> = match FileStore::new() {
        Ok(store) => Box::new(store),
        Err(e) => {
            log::warn!("No config directory ({}); scores won't be kept", e);
            Box::new(MemoryStore::new())
        }
    };

    let settings = Settings::load(&store);
    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut session = Session::new(
        seed,
        Viewport::default(),
        &settings,
        platform::is_mobile(),
        0.0,
        store,
        Silent,
        || None::<String>,
    );
    session.set_autopilot(true);

    let mut now = 0.0;
    let mut best = 0;
    for _ in 0..HEADLESS_FRAMES {
        now += HEADLESS_FRAME_MS;
        session.frame(now);
        best = best.max(session.state().score);
    }

    println!("\nAutopilot best run: {} pipes", best);
    println!("High scores:");
    for (i, entry) in session.high_scores().entries().iter().enumerate() {
        println!("  {}. {} - {}", i + 1, entry.name, entry.score);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
