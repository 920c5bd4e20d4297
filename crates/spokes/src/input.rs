use crate::geometry::Vec2;
use strum::Display as StrumDisplay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, StrumDisplay)]
#[strum(serialize_all = "lowercase")]
pub enum InputState {
    #[default]
    Idle,
    /// A button is down but the pointer has not moved far yet.
    Clicked,
    /// The pointer moved while a button (or, in turbo mode, a key) is held.
    Dragging,
    Released,
}

/// A motion event which made it through the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub position: Vec2,
    pub dragged: bool,
}

/// Keeps the pointer snapshot relative to the active item and classifies clicks,
/// drags and turbo-mode drags.
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    absolute_position: Vec2,
    relative_position: Vec2,
    angle: f64,
    distance: f64,
    state: InputState,
    button_down: bool,
    turbo_mode: bool,
    deferred_turbo_mode: bool,
    drag_origin: Vec2,
    ignored_motion_events: u32,
    drag_threshold: f64,
}

impl InputTracker {
    pub fn new(drag_threshold: f64) -> Self {
        Self {
            drag_threshold,
            ..Default::default()
        }
    }

    pub fn absolute_position(&self) -> Vec2 {
        self.absolute_position
    }

    /// Pointer position relative to the active item.
    pub fn relative_position(&self) -> Vec2 {
        self.relative_position
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn turbo_mode(&self) -> bool {
        self.turbo_mode
    }

    pub fn set_drag_threshold(&mut self, drag_threshold: f64) {
        self.drag_threshold = drag_threshold;
    }

    /// Recomputes the snapshot for a pointer at `position` and an active item at
    /// `center`.
    pub fn update(&mut self, position: Vec2, center: Vec2) {
        self.absolute_position = position;
        self.relative_position = position - center;
        self.distance = self.relative_position.length();
        self.angle = self.relative_position.angle();
    }

    /// Some platforms report a bogus motion right after a window shows up.
    pub fn ignore_next_motion_events(&mut self, count: u32) {
        self.ignored_motion_events = count;
    }

    /// Keys held while the menu opens must not start turbo mode before the pointer
    /// has moved.
    pub fn defer_turbo_mode(&mut self, deferred: bool) {
        self.deferred_turbo_mode = deferred;
    }

    pub fn on_motion(
        &mut self,
        position: Vec2,
        center: Vec2,
        modifiers_held: bool,
    ) -> Option<MotionSample> {
        if self.ignored_motion_events > 0 {
            self.ignored_motion_events -= 1;
            return None;
        }

        self.update(position, center);

        if self.deferred_turbo_mode {
            self.deferred_turbo_mode = false;
            if modifiers_held {
                self.begin_turbo_mode();
            }
        }

        let may_drag = self.state == InputState::Clicked
            || (self.turbo_mode && self.state != InputState::Dragging);
        if may_drag && position.distance(self.drag_origin) > self.drag_threshold {
            self.state = InputState::Dragging;
        }

        Some(MotionSample {
            position,
            dragged: self.state == InputState::Dragging,
        })
    }

    pub fn on_pointer_down(&mut self, position: Vec2, center: Vec2) {
        self.update(position, center);
        self.state = InputState::Clicked;
        self.button_down = true;
        self.drag_origin = position;
    }

    pub fn on_pointer_up(&mut self) {
        self.state = InputState::Released;
        self.button_down = false;
        self.drag_origin = self.absolute_position;
    }

    pub fn on_key_down(&mut self) {
        if !self.deferred_turbo_mode && !self.turbo_mode {
            self.begin_turbo_mode();
        }
    }

    /// Leaves turbo mode once no modifier is held anymore. A turbo drag counts as
    /// released then.
    pub fn on_key_up(&mut self, modifiers_held: bool) {
        if modifiers_held {
            return;
        }

        self.deferred_turbo_mode = false;
        if self.turbo_mode {
            self.turbo_mode = false;
            if self.state == InputState::Dragging && !self.button_down {
                self.state = InputState::Released;
            }
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.drag_threshold);
    }

    fn begin_turbo_mode(&mut self) {
        self.turbo_mode = true;
        self.drag_origin = self.absolute_position;
    }
}
