use glam::Vec2;

use crate::input::bindings::{ActionMap, AxisSign, Binding, DeviceClass};
use crate::input::queue::{InputQueue, RawEvent, RawInput};
use crate::input::state::InputState;

impl RawInput {
    fn device(&self) -> DeviceClass {
        match self {
            RawInput::KeyDown { .. } | RawInput::KeyUp { .. } => DeviceClass::Keyboard,
            RawInput::PointerDown { .. }
            | RawInput::PointerUp { .. }
            | RawInput::PointerMove { .. } => DeviceClass::Pointer,
            RawInput::TouchStart { .. } | RawInput::TouchEnd { .. } => DeviceClass::Touch,
            RawInput::GamepadButton { .. } | RawInput::GamepadAxis { .. } => DeviceClass::Gamepad,
        }
    }
}

/// Turns asynchronous device events into a synchronous, tick-aligned state.
///
/// Host listeners `push` at any time; the loop calls `drain` exactly once per
/// tick. Draining consumes the whole queue, resolves each event through the
/// action map, and produces the tick's `InputState` with edge transitions
/// derived against the previous tick.
#[derive(Debug, Clone)]
pub struct InputHandler {
    queue: InputQueue,
    map: ActionMap,
    current: InputState,
}

impl InputHandler {
    pub fn new(queue_capacity: usize, map: ActionMap) -> Self {
        Self {
            queue: InputQueue::with_capacity(queue_capacity),
            map,
            current: InputState::default(),
        }
    }

    /// Enqueue a raw device event. Never blocks; overflow drops the oldest.
    pub fn push(&mut self, event: RawEvent) {
        self.queue.push(event);
    }

    /// Consume the queue and produce this tick's input state.
    pub fn drain(&mut self) -> InputState {
        let mut state = self.current.carry_over();

        let events: Vec<RawEvent> = self.queue.drain().collect();
        for event in events {
            if !self.map.device_enabled(event.input.device()) {
                continue;
            }
            Self::apply(&self.map, &mut state, event.input);
        }

        self.current = state.clone();
        state
    }

    fn apply(map: &ActionMap, state: &mut InputState, input: RawInput) {
        match input {
            RawInput::KeyDown { code } => {
                if let Some(a) = map.action_for(Binding::Key { code }) {
                    state.apply_press(a, 1.0);
                }
            }
            RawInput::KeyUp { code } => {
                if let Some(a) = map.action_for(Binding::Key { code }) {
                    state.apply_release(a);
                }
            }
            RawInput::PointerDown { x, y, button } => {
                state.cursor = Some(Vec2::new(x, y));
                if let Some(a) = map.action_for(Binding::PointerButton { button }) {
                    state.apply_press(a, 1.0);
                }
            }
            RawInput::PointerUp { x, y, button } => {
                state.cursor = Some(Vec2::new(x, y));
                if let Some(a) = map.action_for(Binding::PointerButton { button }) {
                    state.apply_release(a);
                }
            }
            RawInput::PointerMove { x, y } => {
                state.cursor = Some(Vec2::new(x, y));
            }
            // Touch normalizes to the primary pointer button.
            RawInput::TouchStart { x, y, .. } => {
                state.cursor = Some(Vec2::new(x, y));
                if let Some(a) = map.action_for(Binding::PointerButton { button: 0 }) {
                    state.apply_press(a, 1.0);
                }
            }
            RawInput::TouchEnd { .. } => {
                if let Some(a) = map.action_for(Binding::PointerButton { button: 0 }) {
                    state.apply_release(a);
                }
            }
            RawInput::GamepadButton { button, pressed, value } => {
                if let Some(a) = map.action_for(Binding::GamepadButton { button }) {
                    if pressed {
                        state.apply_press(a, if value > 0.0 { value } else { 1.0 });
                    } else {
                        state.apply_release(a);
                    }
                }
            }
            RawInput::GamepadAxis { axis, value } => {
                Self::apply_axis(map, state, axis, AxisSign::Positive, value);
                Self::apply_axis(map, state, axis, AxisSign::Negative, -value);
            }
        }
    }

    /// One half-axis: past the dead zone it is a press with an analog
    /// value, inside it a release.
    fn apply_axis(map: &ActionMap, state: &mut InputState, axis: u8, sign: AxisSign, value: f32) {
        let Some(a) = map.action_for(Binding::GamepadAxis { axis, sign }) else {
            return;
        };
        if value > map.dead_zone {
            state.apply_press(a, value.min(1.0));
        } else {
            state.apply_release(a);
        }
    }

    pub fn map(&self) -> &ActionMap {
        &self.map
    }

    /// Mutable access for runtime rebinding and device toggles.
    pub fn map_mut(&mut self) -> &mut ActionMap {
        &mut self.map
    }

    /// Events dropped to ring-buffer overflow since construction.
    pub fn overflow_count(&self) -> u64 {
        self.queue.overflow_count()
    }
}
