use crate::events::{InputEvent, Modifiers, PointerButton};
use crate::geometry::Vec2;
use std::time::Duration;

/// Only the two analog sticks drive the pointer.
const STICK_AXES: usize = 4;

/// One sample of a polled gamepad.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamepadState {
    pub axes: Vec<f64>,
    pub buttons: Vec<bool>,
}

impl GamepadState {
    fn axis(&self, index: usize) -> f64 {
        self.axes.get(index).copied().unwrap_or(0.0)
    }

    fn button(&self, index: usize) -> bool {
        self.buttons.get(index).copied().unwrap_or(false)
    }

    fn stick(&self, first_axis: usize) -> Vec2 {
        Vec2::new(self.axis(first_axis), self.axis(first_axis + 1))
    }
}

/// Turns gamepad samples into pointer events. The stick with the larger deflection
/// points from the active item towards the emulated pointer.
#[derive(Debug, Clone)]
pub struct GamepadInput {
    previous: GamepadState,
    deadzone: f64,
    reach: f64,
}

impl GamepadInput {
    pub fn new(deadzone: f64, reach: f64) -> Self {
        Self {
            previous: GamepadState::default(),
            deadzone,
            reach,
        }
    }

    pub fn configure(&mut self, deadzone: f64, reach: f64) {
        self.deadzone = deadzone;
        self.reach = reach;
    }

    pub fn emulated_pointer_position(&self, state: &GamepadState, center: Vec2) -> Vec2 {
        let (left, right) = (state.stick(0), state.stick(2));
        let stick = if right.length() > left.length() {
            right
        } else {
            left
        };

        if stick.length() < self.deadzone {
            center
        } else {
            center + stick.scale(self.reach)
        }
    }

    /// Compares `state` with the previous sample and emits the pointer events that
    /// happened in between. Positions are offsets from the active item; see
    /// [`InputEvent::translated`].
    pub fn poll(&mut self, state: GamepadState, timestamp: Duration) -> Vec<InputEvent> {
        let position = self.emulated_pointer_position(&state, Vec2::ZERO);
        let mut events = Vec::new();

        if (0..STICK_AXES).any(|i| state.axis(i) != self.previous.axis(i)) {
            events.push(InputEvent::PointerMotion {
                position,
                modifiers: Modifiers::NONE,
                timestamp,
            });
        }

        let button_count = state.buttons.len().max(self.previous.buttons.len());
        for index in 0..button_count {
            let Some(button) = Self::pointer_button(index) else {
                continue;
            };
            match (self.previous.button(index), state.button(index)) {
                (false, true) => events.push(InputEvent::PointerDown { position, button }),
                (true, false) => events.push(InputEvent::PointerUp { position, button }),
                _ => {}
            }
        }

        self.previous = state;
        events
    }

    pub fn reset(&mut self) {
        self.previous = GamepadState::default();
    }

    fn pointer_button(index: usize) -> Option<PointerButton> {
        match index {
            0 => Some(PointerButton::Primary),
            1 => Some(PointerButton::Secondary),
            _ => None,
        }
    }
}
