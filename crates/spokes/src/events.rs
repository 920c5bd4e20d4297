use crate::gamepad::GamepadState;
use crate::geometry::Vec2;
use crate::item::ItemPath;
use crate::menu::SHORTCUT_KEYS;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use strum::{Display as StrumDisplay, EnumString, IntoStaticStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum PointerButton {
    #[strum(serialize = "primary", serialize = "left", serialize = "0")]
    Primary,
    #[strum(serialize = "middle", serialize = "1")]
    Middle,
    #[strum(serialize = "secondary", serialize = "right", serialize = "2")]
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, StrumDisplay)]
#[strum(ascii_case_insensitive)]
pub enum Modifier {
    #[strum(serialize = "ctrl", serialize = "control")]
    Ctrl,
    #[strum(serialize = "alt")]
    Alt,
    #[strum(serialize = "shift")]
    Shift,
    #[strum(serialize = "meta", serialize = "super")]
    Meta,
}

/// Modifier keys held while an input event happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };

    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift || self.meta
    }

    pub fn with(mut self, modifier: Modifier) -> Self {
        match modifier {
            Modifier::Ctrl => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
            Modifier::Meta => self.meta = true,
        }
        self
    }
}

/// Parses lists like `ctrl+shift`.
impl FromStr for Modifiers {
    type Err = strum::ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('+')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .try_fold(Self::NONE, |modifiers, name| {
                name.parse::<Modifier>().map(|m| modifiers.with(m))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(char),
    Escape,
    Named(String),
}

impl Key {
    /// Position of this key in the shortcut row `0-9a-z`.
    pub fn shortcut_index(&self) -> Option<usize> {
        match self {
            Self::Character(c) => SHORTCUT_KEYS.find(*c),
            _ => None,
        }
    }
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        Ok(match (chars.next(), chars.next()) {
            (Some(c), None) => Self::Character(c),
            _ if s.eq_ignore_ascii_case("escape") || s.eq_ignore_ascii_case("esc") => Self::Escape,
            _ => Self::Named(s.to_string()),
        })
    }
}

/// Normalized input routed into a [`crate::menu::Menu`]. Positions are in logical
/// window coordinates; timestamps only need to be monotonic.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerMotion {
        position: Vec2,
        modifiers: Modifiers,
        timestamp: Duration,
    },
    PointerDown {
        position: Vec2,
        button: PointerButton,
    },
    PointerUp {
        position: Vec2,
        button: PointerButton,
    },
    KeyDown {
        key: Key,
        modifiers: Modifiers,
    },
    /// `modifiers` are the ones still held after the release.
    KeyUp {
        key: Key,
        modifiers: Modifiers,
    },
    Gamepad {
        state: GamepadState,
        timestamp: Duration,
    },
    Tick {
        timestamp: Duration,
    },
}

impl InputEvent {
    /// Moves the position of pointer events by `offset`. Other events are returned
    /// unchanged.
    pub fn translated(mut self, offset: Vec2) -> Self {
        match &mut self {
            Self::PointerMotion { position, .. }
            | Self::PointerDown { position, .. }
            | Self::PointerUp { position, .. } => *position += offset,
            _ => {}
        }
        self
    }
}

/// Pointer warp distance in whole pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub fn is_zero(&self) -> bool {
        self.x == 0 && self.y == 0
    }
}

impl From<Vec2> for Offset {
    fn from(v: Vec2) -> Self {
        let v = v.trunc();
        Self {
            x: v.x as i32,
            y: v.y as i32,
        }
    }
}

impl From<Offset> for Vec2 {
    fn from(o: Offset) -> Self {
        Vec2::new(o.x as f64, o.y as f64)
    }
}

/// Notifications for the application and renderer.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "kebab-case")]
pub enum MenuEvent {
    /// A leaf was chosen; the menu should close and run its action.
    Select(ItemPath),
    Hover(ItemPath),
    Unhover(ItemPath),
    Cancel,
    /// The real pointer has to be warped because the menu was pushed away from a
    /// screen edge.
    MovePointer(Offset),
}

impl MenuEvent {
    pub fn name(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for MenuEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Select(path) | Self::Hover(path) | Self::Unhover(path) => {
                write!(f, "{} {}", self.name(), path)
            }
            Self::Cancel => f.write_str(self.name()),
            Self::MovePointer(offset) => write!(f, "{} {} {}", self.name(), offset.x, offset.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_button_names() {
        let cases = vec![
            ("left", PointerButton::Primary),
            ("Primary", PointerButton::Primary),
            ("0", PointerButton::Primary),
            ("RIGHT", PointerButton::Secondary),
            ("2", PointerButton::Secondary),
            ("middle", PointerButton::Middle),
        ];

        for (name, expected) in cases {
            assert_eq!(name.parse::<PointerButton>().unwrap(), expected);
        }
        assert!("thumb".parse::<PointerButton>().is_err());
    }

    #[test]
    fn test_modifier_lists() {
        let modifiers: Modifiers = "ctrl+Shift".parse().unwrap();
        assert!(modifiers.ctrl && modifiers.shift && !modifiers.alt);
        assert!(modifiers.any());

        assert_eq!("".parse::<Modifiers>().unwrap(), Modifiers::NONE);
        assert!("ctrl+hyper".parse::<Modifiers>().is_err());
    }

    #[test]
    fn test_keys() {
        assert_eq!("a".parse::<Key>().unwrap(), Key::Character('a'));
        assert_eq!("Escape".parse::<Key>().unwrap(), Key::Escape);
        assert_eq!(
            "Control_L".parse::<Key>().unwrap(),
            Key::Named("Control_L".into())
        );

        assert_eq!(Key::Character('0').shortcut_index(), Some(0));
        assert_eq!(Key::Character('9').shortcut_index(), Some(9));
        assert_eq!(Key::Character('a').shortcut_index(), Some(10));
        assert_eq!(Key::Character('A').shortcut_index(), None);
        assert_eq!(Key::Escape.shortcut_index(), None);
    }

    #[test]
    fn test_event_lines() {
        assert_eq!(
            MenuEvent::Select(ItemPath::new("/1/0")).to_string(),
            "select /1/0"
        );
        assert_eq!(MenuEvent::Cancel.to_string(), "cancel");
        assert_eq!(
            MenuEvent::MovePointer(Offset { x: -3, y: 12 }).to_string(),
            "move-pointer -3 12"
        );
        assert_eq!(Offset::from(Vec2::new(-2.7, 4.2)), Offset { x: -2, y: 4 });
    }

    #[test]
    fn test_translated_moves_pointer_events_only() {
        let offset = Vec2::new(10.0, -5.0);
        let down = InputEvent::PointerDown {
            position: Vec2::new(1.0, 1.0),
            button: PointerButton::Primary,
        };
        assert_eq!(
            down.translated(offset),
            InputEvent::PointerDown {
                position: Vec2::new(11.0, -4.0),
                button: PointerButton::Primary,
            }
        );

        let tick = InputEvent::Tick {
            timestamp: Duration::ZERO,
        };
        assert_eq!(tick.clone().translated(offset), tick);
    }
}
