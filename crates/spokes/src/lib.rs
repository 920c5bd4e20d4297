pub mod events;
pub mod gamepad;
pub mod geometry;
pub mod gesture;
pub mod input;
pub mod item;
pub mod menu;

mod macros;

pub const SOCKET_PATH: &str = "/tmp/pinwheel.sock";
