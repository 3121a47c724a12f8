use std::collections::HashMap;

use serde::Deserialize;

use crate::input::state::Action;

/// The device a raw event came from. Used only for per-device
/// enable/disable at the boundary; gameplay code never sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Keyboard,
    Pointer,
    Touch,
    Gamepad,
}

impl DeviceClass {
    pub const COUNT: usize = 4;

    fn index(self) -> usize {
        self as usize
    }
}

/// Which half of an analog axis a binding listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AxisSign {
    Positive,
    Negative,
}

/// A physical control identity that can be bound to an action.
/// Touch taps normalize to `PointerButton { button: 0 }`, so one binding
/// covers mouse and touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Binding {
    Key { code: u32 },
    PointerButton { button: u8 },
    GamepadButton { button: u8 },
    GamepadAxis { axis: u8, sign: AxisSign },
}

/// One rebindable entry, as hosts ship it in JSON.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct BindingEntry {
    pub binding: Binding,
    pub action: Action,
}

/// Maps physical bindings to logical actions.
///
/// Multiple bindings may point at the same action; each binding resolves to
/// at most one action, and rebinding a taken binding replaces it. Devices
/// can be disabled wholesale without touching the bindings.
#[derive(Debug, Clone)]
pub struct ActionMap {
    bindings: HashMap<Binding, Action>,
    enabled: [bool; DeviceClass::COUNT],
    /// Analog values at or below this magnitude count as released.
    pub dead_zone: f32,
}

// Default key codes follow the browser `KeyboardEvent.keyCode` values the
// host forwards: WASD + arrows + space.
const KEY_A: u32 = 65;
const KEY_D: u32 = 68;
const KEY_S: u32 = 83;
const KEY_W: u32 = 87;
const KEY_P: u32 = 80;
const KEY_SPACE: u32 = 32;
const KEY_LEFT: u32 = 37;
const KEY_UP: u32 = 38;
const KEY_RIGHT: u32 = 39;
const KEY_DOWN: u32 = 40;

impl ActionMap {
    /// Empty map with every device enabled.
    pub fn new(dead_zone: f32) -> Self {
        Self {
            bindings: HashMap::new(),
            enabled: [true; DeviceClass::COUNT],
            dead_zone,
        }
    }

    /// Stock bindings: WASD/arrows to move, space or primary button to fire,
    /// left gamepad stick to move, south button to fire.
    pub fn with_defaults(dead_zone: f32) -> Self {
        let mut map = Self::new(dead_zone);
        map.bind(Binding::Key { code: KEY_A }, Action::MoveLeft);
        map.bind(Binding::Key { code: KEY_LEFT }, Action::MoveLeft);
        map.bind(Binding::Key { code: KEY_D }, Action::MoveRight);
        map.bind(Binding::Key { code: KEY_RIGHT }, Action::MoveRight);
        map.bind(Binding::Key { code: KEY_W }, Action::MoveUp);
        map.bind(Binding::Key { code: KEY_UP }, Action::MoveUp);
        map.bind(Binding::Key { code: KEY_S }, Action::MoveDown);
        map.bind(Binding::Key { code: KEY_DOWN }, Action::MoveDown);
        map.bind(Binding::Key { code: KEY_SPACE }, Action::Fire);
        map.bind(Binding::Key { code: KEY_P }, Action::Pause);
        map.bind(Binding::PointerButton { button: 0 }, Action::Fire);
        map.bind(Binding::GamepadButton { button: 0 }, Action::Fire);
        map.bind(
            Binding::GamepadAxis { axis: 0, sign: AxisSign::Negative },
            Action::MoveLeft,
        );
        map.bind(
            Binding::GamepadAxis { axis: 0, sign: AxisSign::Positive },
            Action::MoveRight,
        );
        map.bind(
            Binding::GamepadAxis { axis: 1, sign: AxisSign::Negative },
            Action::MoveUp,
        );
        map.bind(
            Binding::GamepadAxis { axis: 1, sign: AxisSign::Positive },
            Action::MoveDown,
        );
        map
    }

    /// Bind (or rebind) a physical control to an action.
    pub fn bind(&mut self, binding: Binding, action: Action) {
        self.bindings.insert(binding, action);
    }

    pub fn unbind(&mut self, binding: Binding) {
        self.bindings.remove(&binding);
    }

    /// Replace bindings from a JSON array of `{ binding, action }` entries.
    /// Entries earlier in the array lose to later rebinds of the same control.
    pub fn apply_json(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let entries: Vec<BindingEntry> = serde_json::from_str(json)?;
        for e in entries {
            self.bind(e.binding, e.action);
        }
        Ok(())
    }

    pub fn action_for(&self, binding: Binding) -> Option<Action> {
        self.bindings.get(&binding).copied()
    }

    pub fn set_device_enabled(&mut self, device: DeviceClass, enabled: bool) {
        self.enabled[device.index()] = enabled;
    }

    pub fn device_enabled(&self, device: DeviceClass) -> bool {
        self.enabled[device.index()]
    }
}
