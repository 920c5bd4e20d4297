pub mod model;
pub mod options;
pub mod view;

pub use model::Menu;
pub use options::{Settings, ShowOptions, ShowRequest};
pub use view::{Connector, Frame, ItemFrame, RenderClass};

pub const CENTER_RADIUS: f64 = 50.0; // inside: parent (or nothing) is hovered
pub const PARENT_DISTANCE: f64 = 150.0; // minimum distance of a selected submenu
pub const DRAG_THRESHOLD: f64 = 5.0;
pub const MAX_MENU_RADIUS: f64 = 150.0;
pub const GAMEPAD_DEADZONE: f64 = 0.3;
pub const SHORTCUT_KEYS: &str = "0123456789abcdefghijklmnopqrstuvwxyz";

/// What the geometry core needs to know about the theme which draws the menu.
pub trait MenuTheme {
    /// Radius around the active item that has to stay on screen.
    fn max_menu_radius(&self) -> f64;

    /// Whether child items are stacked underneath their parents.
    fn draw_children_below(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StaticTheme {
    pub max_menu_radius: f64,
    pub draw_children_below: bool,
}

impl Default for StaticTheme {
    fn default() -> Self {
        Self {
            max_menu_radius: MAX_MENU_RADIUS,
            draw_children_below: false,
        }
    }
}

impl MenuTheme for StaticTheme {
    fn max_menu_radius(&self) -> f64 {
        self.max_menu_radius
    }

    fn draw_children_below(&self) -> bool {
        self.draw_children_below
    }
}
