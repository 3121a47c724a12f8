pub mod runner;

pub use runner::WebRunner;

use std::cell::RefCell;

use strafe_sim::{RawInput, SimConfig};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<WebRunner>> = RefCell::new(None);
}

fn with_runner<R>(f: impl FnOnce(&mut WebRunner) -> R) -> R {
    RUNNER.with(|cell| {
        let mut borrow = cell.borrow_mut();
        let runner = borrow
            .as_mut()
            .expect("Sim not initialized. Call sim_init() first.");
        f(runner)
    })
}

/// Build the simulation. `config_json` overrides `SimConfig` defaults;
/// pass an empty string to accept them all.
#[wasm_bindgen]
pub fn sim_init(config_json: &str) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let config = if config_json.trim().is_empty() {
        SimConfig::default()
    } else {
        match serde_json::from_str(config_json) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("bad config, using defaults: {}", e);
                SimConfig::default()
            }
        }
    };

    RUNNER.with(|cell| {
        *cell.borrow_mut() = Some(WebRunner::new(config));
    });
    log::info!("strafe: initialized");
}

#[wasm_bindgen]
pub fn sim_start() -> bool {
    with_runner(|r| r.start())
}

#[wasm_bindgen]
pub fn sim_stop() {
    with_runner(|r| r.stop());
}

#[wasm_bindgen]
pub fn sim_running() -> bool {
    with_runner(|r| r.running())
}

/// One `requestAnimationFrame` callback: `elapsed_ms` is the delta the
/// host measured since the previous callback.
#[wasm_bindgen]
pub fn sim_frame(elapsed_ms: f32) {
    with_runner(|r| r.frame(elapsed_ms));
}

/// Replace action bindings from a JSON array of `{ binding, action }`.
#[wasm_bindgen]
pub fn sim_apply_bindings(json: &str) -> bool {
    with_runner(|r| r.apply_bindings(json))
}

// ---- Input listeners (called from DOM event handlers) ----

#[wasm_bindgen]
pub fn on_key_down(timestamp_ms: f64, code: u32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::KeyDown { code }));
}

#[wasm_bindgen]
pub fn on_key_up(timestamp_ms: f64, code: u32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::KeyUp { code }));
}

#[wasm_bindgen]
pub fn on_pointer_down(timestamp_ms: f64, x: f32, y: f32, button: u8) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::PointerDown { x, y, button }));
}

#[wasm_bindgen]
pub fn on_pointer_up(timestamp_ms: f64, x: f32, y: f32, button: u8) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::PointerUp { x, y, button }));
}

#[wasm_bindgen]
pub fn on_pointer_move(timestamp_ms: f64, x: f32, y: f32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn on_touch_start(timestamp_ms: f64, x: f32, y: f32, id: u32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::TouchStart { x, y, id }));
}

#[wasm_bindgen]
pub fn on_touch_end(timestamp_ms: f64, id: u32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::TouchEnd { id }));
}

#[wasm_bindgen]
pub fn on_gamepad_button(timestamp_ms: f64, button: u8, pressed: bool, value: f32) {
    with_runner(|r| {
        r.push_input(timestamp_ms, RawInput::GamepadButton { button, pressed, value })
    });
}

#[wasm_bindgen]
pub fn on_gamepad_axis(timestamp_ms: f64, axis: u8, value: f32) {
    with_runner(|r| r.push_input(timestamp_ms, RawInput::GamepadAxis { axis, value }));
}

// ---- Snapshot buffer accessors (zero-copy reads from JavaScript) ----

#[wasm_bindgen]
pub fn snapshot_ptr() -> *const f32 {
    with_runner(|r| r.buffer().as_ptr())
}

#[wasm_bindgen]
pub fn snapshot_floats() -> u32 {
    with_runner(|r| r.buffer().len_floats() as u32)
}

#[wasm_bindgen]
pub fn entity_record_floats() -> u32 {
    strafe_sim::bridge::protocol::ENTITY_FLOATS as u32
}

#[wasm_bindgen]
pub fn event_record_floats() -> u32 {
    strafe_sim::bridge::protocol::EVENT_FLOATS as u32
}

#[wasm_bindgen]
pub fn sound_record_floats() -> u32 {
    strafe_sim::bridge::protocol::SOUND_FLOATS as u32
}
