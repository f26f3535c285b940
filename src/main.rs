//! Bike Dash entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{KeyboardEvent, PointerEvent};

    use bike_dash::audio::AudioManager;
    use bike_dash::consts::*;
    use bike_dash::platform::FrameClock;
    use bike_dash::sim::{GameEvent, GamePhase, Simulation, Viewport, autopilot};
    use bike_dash::{DeviceClass, Leaderboard, Settings, Tuning};

    /// Game instance holding all state
    struct Game {
        sim: Simulation,
        clock: FrameClock,
        audio: AudioManager,
        settings: Settings,
        leaderboard: Leaderboard,
        /// Demo mode - autopilot rides
        idle_mode: bool,
        /// A requestAnimationFrame callback is pending
        loop_scheduled: bool,
    }

    impl Game {
        fn new(seed: u64) -> Self {
            let settings = Settings::load();
            let mut audio = AudioManager::new();
            audio.apply_settings(&settings);

            let viewport = read_viewport();
            let device = settings.device_class(detect_device(&viewport));

            Self {
                sim: Simulation::new(Tuning::default(), seed, viewport, device),
                clock: FrameClock::new(),
                audio,
                settings,
                leaderboard: Leaderboard::load(),
                idle_mode: false,
                loop_scheduled: false,
            }
        }

        /// Run this frame's ticks, returning everything that happened
        fn update(&mut self, time: f64) -> Vec<GameEvent> {
            let ticks = self.clock.advance(time);
            let mut events = Vec::new();
            for _ in 0..ticks {
                if self.idle_mode && autopilot::should_jump(&self.sim) {
                    self.sim.request_jump();
                }
                events.extend(self.sim.tick());
                if !self.sim.is_running() {
                    break;
                }
            }
            events
        }

        /// Update HUD elements in DOM and hand the snapshot to the page
        fn publish_frame(&self) {
            let Some(window) = web_sys::window() else { return };
            let Some(document) = window.document() else { return };
            let state = self.sim.snapshot();

            if let Some(el) = document.query_selector("#hud-distance .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.0}m", state.distance)));
            }
            if let Some(el) = document.query_selector("#hud-energy .hud-value").ok().flatten() {
                el.set_text_content(Some(&format!("{:.0}", state.energy)));
            }

            // Rendering lives in the page; it may register window.onBikeDashFrame(json)
            let callback = js_sys::Reflect::get(&window, &JsValue::from_str("onBikeDashFrame"))
                .ok()
                .and_then(|f| f.dyn_into::<js_sys::Function>().ok());
            if let Some(callback) = callback {
                match state.to_json() {
                    Ok(json) => {
                        if let Err(e) = callback.call1(&JsValue::NULL, &JsValue::from_str(&json)) {
                            log::warn!("Frame callback failed: {:?}", e);
                        }
                    }
                    Err(e) => log::warn!("Snapshot encode failed: {}", e),
                }
            }
        }

        fn resize(&mut self) {
            let viewport = read_viewport();
            let device = self.settings.device_class(detect_device(&viewport));
            self.sim.resize(viewport, device);
        }
    }

    fn read_viewport() -> Viewport {
        let read = |v: Result<JsValue, JsValue>| {
            v.ok().and_then(|v| v.as_f64()).map(|v| v as f32).unwrap_or(f32::NAN)
        };
        match web_sys::window() {
            Some(w) => Viewport::new(read(w.inner_width()), read(w.inner_height())),
            None => Viewport::new(f32::NAN, f32::NAN),
        }
    }

    fn detect_device(viewport: &Viewport) -> DeviceClass {
        let has_touch = web_sys::window()
            .map(|w| w.navigator().max_touch_points() > 0)
            .unwrap_or(false);
        // Unusable reads are handled by the simulation; detection uses the fallback size
        DeviceClass::detect(&viewport.sanitized(Viewport::default()), has_touch)
    }

    fn set_class(id: &str, class: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            let _ = el.set_attribute("class", class);
        }
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(id))
        {
            el.set_text_content(Some(text));
        }
    }

    /// Fire `f` once after `ms` milliseconds
    fn set_timeout(ms: i32, f: impl FnOnce() + 'static) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once_into_js(f);
        let _ = window
            .set_timeout_with_callback_and_timeout_and_arguments_0(closure.unchecked_ref(), ms);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Bike Dash starting...");

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed)));

        log::info!(
            "Game initialized with seed: {} ({} profile)",
            seed,
            game.borrow().sim.device().as_str()
        );

        set_class("loading", "hidden");
        set_class("start-prompt", "");

        setup_input_handlers(game.clone());
        setup_resize_handler(game.clone());
        setup_restart_button(game.clone());
        setup_focus_handlers(game.clone());

        game.borrow().publish_frame();

        log::info!("Bike Dash ready!");
    }

    /// Start/reset command from the page
    fn start_game(game: &Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            g.sim.start_with_seed(js_sys::Date::now() as u64);
            g.clock.reset();
            g.audio.resume();
        }
        set_class("start-prompt", "hidden");
        set_class("game-over", "hidden");
        set_class("hud", "");
        schedule_frame(game.clone());
    }

    /// Jump while running; the first tap also starts the opening run
    fn jump_or_start(game: &Rc<RefCell<Game>>) {
        let idle = {
            let mut g = game.borrow_mut();
            g.sim.request_jump();
            g.sim.phase() == GamePhase::Idle
        };
        // After game over only Enter or the restart button start a new run
        if idle {
            start_game(game);
        }
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    " " | "ArrowUp" | "w" | "W" => {
                        event.prevent_default();
                        jump_or_start(&game);
                    }
                    "Enter" => {
                        if !game.borrow().sim.is_running() {
                            start_game(&game);
                        }
                    }
                    "i" | "I" => {
                        let mut g = game.borrow_mut();
                        g.idle_mode = !g.idle_mode;
                        log::info!("Idle mode: {}", g.idle_mode);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer covers mouse, pen and touch
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                if event.is_primary() {
                    jump_or_start(&game);
                }
            });
            let _ = window
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize_handler(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            game.borrow_mut().resize();
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .expect("no document");

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            // Handled on pointerdown so the press never bubbles to the window jump handler
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
                event.stop_propagation();
                start_game(&game);
            });
            let _ = btn
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_focus_handlers(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Tab hidden: don't replay the missed time as a burst of ticks
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().clock.reset();
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Mute on blur
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    let settings = g.settings.clone();
                    g.audio.set_muted(true, &settings);
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let settings = g.settings.clone();
                g.audio.set_muted(false, &settings);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Schedule one frame unless one is already pending
    fn schedule_frame(game: Rc<RefCell<Game>>) {
        {
            let mut g = game.borrow_mut();
            if g.loop_scheduled {
                return;
            }
            g.loop_scheduled = true;
        }
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        let events = {
            let mut g = game.borrow_mut();
            g.loop_scheduled = false;
            // Stale callback after game over or restart
            if !g.sim.is_running() {
                return;
            }
            g.update(time)
        };

        handle_events(&game, events);
        game.borrow().publish_frame();

        if game.borrow().sim.is_running() {
            schedule_frame(game);
        }
    }

    fn handle_events(game: &Rc<RefCell<Game>>, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Sound(sound) => game.borrow().audio.play(sound),
                GameEvent::SpinStarted { generation } => {
                    if game.borrow().settings.reduced_motion {
                        game.borrow_mut().sim.clear_spin(generation);
                        continue;
                    }
                    let game = game.clone();
                    set_timeout(SPIN_DURATION_MS, move || {
                        if let Ok(mut g) = game.try_borrow_mut() {
                            g.sim.clear_spin(generation);
                        }
                    });
                }
                GameEvent::EffectSpawned { kind, id } => {
                    let game = game.clone();
                    set_timeout(EFFECT_DURATION_MS, move || {
                        if let Ok(mut g) = game.try_borrow_mut() {
                            g.sim.remove_effect(kind, id);
                        }
                    });
                }
                GameEvent::GameOver { distance } => on_game_over(game, distance),
            }
        }
    }

    fn on_game_over(game: &Rc<RefCell<Game>>, distance: f32) {
        let mut g = game.borrow_mut();
        let username = g.settings.username.clone();
        let bike = g.settings.selected_bike;
        let rank = g
            .leaderboard
            .add_entry(&username, distance, bike, js_sys::Date::now());
        if rank.is_some() {
            g.leaderboard.save();
        }
        drop(g);

        set_text("final-distance", &format!("{:.0}m", distance));
        match rank {
            Some(r) => set_text("final-rank", &format!("#{}", r)),
            None => set_text("final-rank", "-"),
        }
        set_class("game-over", "");

        log::info!("Run finished: {:.1}m (rank {:?})", distance, rank);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Bike Dash (native) starting...");
    log::info!("Native mode runs a headless demo - run with `trunk serve` for the web version");

    let tuning = load_tuning(std::env::args().nth(1));
    run_headless_demo(tuning);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Optional tuning override from a JSON file
#[cfg(not(target_arch = "wasm32"))]
fn load_tuning(path: Option<String>) -> bike_dash::Tuning {
    use bike_dash::Tuning;

    let Some(path) = path else {
        return Tuning::default();
    };
    match std::fs::read_to_string(&path) {
        Ok(json) => match Tuning::from_json(&json) {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::warn!("Bad tuning file {}: {} - using defaults", path, e);
                Tuning::default()
            }
        },
        Err(e) => {
            log::warn!("Cannot read {}: {} - using defaults", path, e);
            Tuning::default()
        }
    }
}

/// Let the autopilot ride one session to the end
#[cfg(not(target_arch = "wasm32"))]
fn run_headless_demo(tuning: bike_dash::Tuning) {
    use std::time::{SystemTime, UNIX_EPOCH};

    use bike_dash::sim::{GameEvent, Simulation, SoundEvent, Viewport, autopilot};
    use bike_dash::{DeviceClass, Leaderboard, Settings};

    /// Ten minutes at 60 Hz
    const MAX_DEMO_TICKS: u64 = 60 * 60 * 10;

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let settings = Settings::load();
    let viewport = Viewport::new(1280.0, 720.0);
    let device = settings.device_class(DeviceClass::detect(&viewport, false));
    let mut sim = Simulation::new(tuning, now, viewport, device);
    let mut leaderboard = Leaderboard::load();

    sim.start();

    let (mut jumps, mut hits, mut pickups) = (0u32, 0u32, 0u32);
    let mut rank = None;
    while sim.is_running() && sim.time_ticks() < MAX_DEMO_TICKS {
        if autopilot::should_jump(&sim) && sim.request_jump() {
            jumps += 1;
        }
        for event in sim.tick() {
            match event {
                GameEvent::Sound(SoundEvent::Hit) => hits += 1,
                GameEvent::Sound(SoundEvent::Collect) => pickups += 1,
                GameEvent::GameOver { distance } => {
                    rank = leaderboard.add_entry(
                        &settings.username,
                        distance,
                        settings.selected_bike,
                        now as f64,
                    );
                }
                _ => {}
            }
        }
    }
    if sim.is_running() {
        log::info!("Demo reached the tick limit");
        sim.stop();
    }
    leaderboard.save();

    let state = sim.snapshot();
    println!(
        "\n{} rode {:.1}m in {} ticks: {} jumps, {} hits, {} pickups",
        settings.username,
        state.distance,
        sim.time_ticks(),
        jumps,
        hits,
        pickups
    );
    match rank {
        Some(r) => println!("Leaderboard rank: #{}", r),
        None => println!("Not on the leaderboard"),
    }
}
