use crate::geometry::Vec2;
use crate::gesture::GestureSettings;
use crate::item::MenuItem;
use crate::menu::{CENTER_RADIUS, DRAG_THRESHOLD, GAMEPAD_DEADZONE, PARENT_DISTANCE};
use serde::{Deserialize, Serialize};

/// Tunables of the selection behaviour. Everything has a sensible default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub center_radius: f64,
    pub parent_distance: f64,
    pub drag_threshold: f64,
    pub ignored_motion_events: u32,
    pub gamepad_deadzone: f64,
    pub gestures: GestureSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            center_radius: CENTER_RADIUS,
            parent_distance: PARENT_DISTANCE,
            drag_threshold: DRAG_THRESHOLD,
            ignored_motion_events: 0,
            gamepad_deadzone: GAMEPAD_DEADZONE,
            gestures: GestureSettings::default(),
        }
    }
}

/// Per-invocation information from whoever opens the menu.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowOptions {
    pub window_size: Vec2,
    pub zoom_factor: f64,
    pub mouse_position: Vec2,
    /// Open in the middle of the window instead of at the pointer.
    pub centered_mode: bool,
    /// Submenus open in place instead of following the pointer.
    pub anchored_mode: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            window_size: Vec2::new(1920.0, 1080.0),
            zoom_factor: 1.0,
            mouse_position: Vec2::ZERO,
            centered_mode: false,
            anchored_mode: false,
        }
    }
}

impl ShowOptions {
    fn zoom(&self) -> f64 {
        if self.zoom_factor > 0.0 {
            self.zoom_factor
        } else {
            1.0
        }
    }

    /// Window size in menu coordinates.
    pub fn logical_window_size(&self) -> Vec2 {
        self.window_size.scale(1.0 / self.zoom())
    }

    pub fn initial_position(&self) -> Vec2 {
        if self.centered_mode {
            self.logical_window_size().scale(0.5)
        } else {
            self.mouse_position.scale(1.0 / self.zoom())
        }
    }
}

/// Payload of a `show` request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowRequest {
    pub root: MenuItem,
    #[serde(default)]
    pub options: ShowOptions,
}
