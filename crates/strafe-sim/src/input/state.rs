use glam::Vec2;
use serde::Deserialize;

/// Logical game actions. Downstream code branches on these, never on
/// device types or key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    Fire,
    Pause,
}

impl Action {
    pub const COUNT: usize = 6;

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Per-action state for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ActionState {
    pub pressed: bool,
    /// Went down at some point during this tick's queue.
    pub just_pressed: bool,
    /// Went up at some point during this tick's queue.
    pub just_released: bool,
    /// Analog magnitude in [0, 1]; 1.0 for digital sources.
    pub value: f32,
}

/// Tick-aligned logical input state, derived by draining the raw queue.
/// Double-buffered against the previous tick so edge transitions
/// (`just_pressed` / `just_released`) are exact even when a press and
/// release land inside the same tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    actions: [ActionState; Action::COUNT],
    /// Last known pointer position in world units, if any pointer source
    /// has reported one.
    pub cursor: Option<Vec2>,
}

impl InputState {
    pub fn action(&self, a: Action) -> ActionState {
        self.actions[a.index()]
    }

    pub fn pressed(&self, a: Action) -> bool {
        self.actions[a.index()].pressed
    }

    pub fn just_pressed(&self, a: Action) -> bool {
        self.actions[a.index()].just_pressed
    }

    pub fn just_released(&self, a: Action) -> bool {
        self.actions[a.index()].just_released
    }

    pub fn value(&self, a: Action) -> f32 {
        self.actions[a.index()].value
    }

    /// Signed axis from an opposing action pair, in [-1, 1].
    pub fn axis(&self, negative: Action, positive: Action) -> f32 {
        self.value(positive) - self.value(negative)
    }

    /// Begin the next tick's state from this one: held buttons carry over,
    /// edges reset.
    pub(crate) fn carry_over(&self) -> InputState {
        let mut next = self.clone();
        for a in next.actions.iter_mut() {
            a.just_pressed = false;
            a.just_released = false;
        }
        next
    }

    pub(crate) fn apply_press(&mut self, a: Action, value: f32) {
        let s = &mut self.actions[a.index()];
        if !s.pressed {
            s.just_pressed = true;
        }
        s.pressed = true;
        s.value = value;
    }

    pub(crate) fn apply_release(&mut self, a: Action) {
        let s = &mut self.actions[a.index()];
        if s.pressed {
            s.just_released = true;
        }
        s.pressed = false;
        s.value = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_then_release_in_one_tick_reports_both_edges() {
        let mut s = InputState::default();
        s.apply_press(Action::Fire, 1.0);
        s.apply_release(Action::Fire);
        let a = s.action(Action::Fire);
        assert!(!a.pressed);
        assert!(a.just_pressed);
        assert!(a.just_released);
    }

    #[test]
    fn carry_over_keeps_holds_and_clears_edges() {
        let mut s = InputState::default();
        s.apply_press(Action::MoveLeft, 1.0);
        let next = s.carry_over();
        let a = next.action(Action::MoveLeft);
        assert!(a.pressed);
        assert!(!a.just_pressed);
        assert!(!a.just_released);
        assert_eq!(a.value, 1.0);
    }

    #[test]
    fn repeated_press_is_not_a_new_edge() {
        let mut s = InputState::default();
        s.apply_press(Action::Fire, 1.0);
        let mut next = s.carry_over();
        // Key-repeat from the host while held.
        next.apply_press(Action::Fire, 1.0);
        assert!(!next.just_pressed(Action::Fire));
        assert!(next.pressed(Action::Fire));
    }

    #[test]
    fn axis_combines_opposing_actions() {
        let mut s = InputState::default();
        s.apply_press(Action::MoveRight, 0.75);
        assert_eq!(s.axis(Action::MoveLeft, Action::MoveRight), 0.75);
        s.apply_press(Action::MoveLeft, 1.0);
        assert_eq!(s.axis(Action::MoveLeft, Action::MoveRight), -0.25);
    }
}
