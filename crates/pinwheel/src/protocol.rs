//! Line protocol of the daemon socket.
//!
//! Every line is one command, tokenized like a shell command line:
//!
//! ```text
//! show '{"root": {...}, "options": {...}}'
//! hide
//! motion X Y [MODIFIERS]
//! down X Y BUTTON
//! up X Y BUTTON
//! key-down KEY [MODIFIERS]
//! key-up KEY [MODIFIERS]
//! pad AXIS0 AXIS1 AXIS2 AXIS3 BUTTON_MASK
//! tick
//! frame
//! layout
//! ```
//!
//! Modifiers are written as `ctrl+shift`. For `key-up` they are the ones still held
//! after the release.
//!
//! The daemon writes menu notifications (`hover /0`, `select /0/1`, `cancel`, ...) to
//! every client. Answers only go to the client that asked: `frame JSON`, `layout JSON`,
//! `cancel` when its menu is replaced or hidden, and `error MESSAGE` when its line or
//! menu is rejected.

use crate::events::AppEvent;
use spokes::events::{InputEvent, Key, Modifiers, PointerButton};
use spokes::gamepad::GamepadState;
use spokes::geometry::Vec2;
use spokes::menu::ShowRequest;
use std::time::Duration;
use strum::EnumString;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("Missing argument <{0}>")]
    MissingArgument(&'static str),
    #[error("Unexpected argument '{0}'")]
    UnexpectedArgument(String),
    #[error("Invalid number '{0}'")]
    InvalidNumber(String),
    #[error("Failed to tokenize line: {0}")]
    Tokenize(#[from] shell_words::ParseError),
    #[error("Invalid menu: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid name: {0}")]
    Strum(#[from] strum::ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case")]
enum Command {
    Show,
    Hide,
    Motion,
    Down,
    Up,
    KeyDown,
    KeyUp,
    Pad,
    Tick,
    Frame,
    Layout,
}

struct Args<'a> {
    tokens: std::slice::Iter<'a, String>,
}

impl<'a> Args<'a> {
    fn next(&mut self, name: &'static str) -> Result<&'a str, ProtocolError> {
        self.optional().ok_or(ProtocolError::MissingArgument(name))
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.tokens.next().map(String::as_str)
    }

    fn number(&mut self, name: &'static str) -> Result<f64, ProtocolError> {
        let token = self.next(name)?;
        token
            .parse()
            .map_err(|_| ProtocolError::InvalidNumber(token.to_string()))
    }

    fn position(&mut self) -> Result<Vec2, ProtocolError> {
        Ok(Vec2::new(self.number("x")?, self.number("y")?))
    }

    fn modifiers(&mut self) -> Result<Modifiers, ProtocolError> {
        Ok(self
            .optional()
            .map(str::parse::<Modifiers>)
            .transpose()?
            .unwrap_or_default())
    }

    fn finish(mut self) -> Result<(), ProtocolError> {
        match self.optional() {
            Some(extra) => Err(ProtocolError::UnexpectedArgument(extra.to_string())),
            None => Ok(()),
        }
    }
}

/// Answer sent to a client whose line could not be handled.
pub fn error_line(error: impl std::fmt::Display) -> String {
    format!("error {}", error)
}

/// Parses one line received at `timestamp`.
pub fn parse_line(line: &str, timestamp: Duration) -> Result<AppEvent, ProtocolError> {
    let tokens = shell_words::split(line)?;
    let (name, rest) = tokens.split_first().ok_or(ProtocolError::Empty)?;
    let command: Command = name
        .parse()
        .map_err(|_| ProtocolError::UnknownCommand(name.clone()))?;
    let mut args = Args {
        tokens: rest.iter(),
    };

    let event = match command {
        Command::Show => {
            let request: ShowRequest = serde_json::from_str(args.next("json")?)?;
            AppEvent::Show {
                request: Box::new(request),
                reply: None,
            }
        }
        Command::Hide => AppEvent::Hide,
        Command::Motion => AppEvent::Input(InputEvent::PointerMotion {
            position: args.position()?,
            modifiers: args.modifiers()?,
            timestamp,
        }),
        Command::Down | Command::Up => {
            let position = args.position()?;
            let button: PointerButton = args.next("button")?.parse()?;
            AppEvent::Input(if command == Command::Down {
                InputEvent::PointerDown { position, button }
            } else {
                InputEvent::PointerUp { position, button }
            })
        }
        Command::KeyDown | Command::KeyUp => {
            let Ok(key) = args.next("key")?.parse::<Key>();
            let modifiers = args.modifiers()?;
            AppEvent::Input(if command == Command::KeyDown {
                InputEvent::KeyDown { key, modifiers }
            } else {
                InputEvent::KeyUp { key, modifiers }
            })
        }
        Command::Pad => {
            let axes = ["axis0", "axis1", "axis2", "axis3"]
                .into_iter()
                .map(|name| args.number(name))
                .collect::<Result<Vec<_>, _>>()?;
            let mask_token = args.next("buttons")?;
            let mask: u32 = mask_token
                .parse()
                .map_err(|_| ProtocolError::InvalidNumber(mask_token.to_string()))?;
            let count = u32::BITS - mask.leading_zeros();
            let buttons = (0..count).map(|bit| mask & (1 << bit) != 0).collect();

            AppEvent::Input(InputEvent::Gamepad {
                state: GamepadState { axes, buttons },
                timestamp,
            })
        }
        Command::Tick => AppEvent::Input(InputEvent::Tick { timestamp }),
        Command::Frame => AppEvent::Frame { reply: None },
        Command::Layout => AppEvent::Layout { reply: None },
    };

    args.finish()?;
    Ok(event)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<AppEvent, ProtocolError> {
        parse_line(line, Duration::from_millis(42))
    }

    fn input(line: &str) -> InputEvent {
        match parse(line).unwrap() {
            AppEvent::Input(event) => event,
            other => panic!("expected input event, got {:?}", other),
        }
    }

    #[test]
    fn test_show_request() {
        let line = r#"show '{"root": {"name": "Root", "children": [{"name": "A"}]}, "options": {"centered_mode": true}}'"#;
        let AppEvent::Show { request, reply } = parse(line).unwrap() else {
            panic!("expected show");
        };
        assert!(reply.is_none());
        assert_eq!(request.root.children[0].name, "A");
        assert!(request.options.centered_mode);
        assert_eq!(request.options.zoom_factor, 1.0);

        assert!(matches!(parse("hide"), Ok(AppEvent::Hide)));
        assert!(matches!(parse("frame"), Ok(AppEvent::Frame { reply: None })));
        assert!(matches!(parse("layout"), Ok(AppEvent::Layout { reply: None })));
        assert!(matches!(parse("show '{}'"), Err(ProtocolError::Json(_))));
    }

    #[test]
    fn test_pointer_commands() {
        assert_eq!(
            input("motion 10.5 -3 ctrl+alt"),
            InputEvent::PointerMotion {
                position: Vec2::new(10.5, -3.0),
                modifiers: Modifiers {
                    ctrl: true,
                    alt: true,
                    ..Modifiers::NONE
                },
                timestamp: Duration::from_millis(42),
            }
        );
        assert_eq!(
            input("down 1 2 left"),
            InputEvent::PointerDown {
                position: Vec2::new(1.0, 2.0),
                button: PointerButton::Primary,
            }
        );
        assert_eq!(
            input("up 1 2 right"),
            InputEvent::PointerUp {
                position: Vec2::new(1.0, 2.0),
                button: PointerButton::Secondary,
            }
        );
    }

    #[test]
    fn test_key_commands() {
        assert_eq!(
            input("key-down Escape"),
            InputEvent::KeyDown {
                key: Key::Escape,
                modifiers: Modifiers::NONE,
            }
        );
        assert_eq!(
            input("key-up Shift_L"),
            InputEvent::KeyUp {
                key: Key::Named("Shift_L".into()),
                modifiers: Modifiers::NONE,
            }
        );
        assert!(matches!(
            input("key-down 3 shift"),
            InputEvent::KeyDown {
                key: Key::Character('3'),
                modifiers: Modifiers { shift: true, .. },
            }
        ));
    }

    #[test]
    fn test_pad_command() {
        let InputEvent::Gamepad { state, timestamp } = input("pad 0.5 0 0 -1 5") else {
            panic!("expected gamepad event");
        };
        assert_eq!(state.axes, vec![0.5, 0.0, 0.0, -1.0]);
        assert_eq!(state.buttons, vec![true, false, true]);
        assert_eq!(timestamp, Duration::from_millis(42));

        let InputEvent::Gamepad { state, .. } = input("pad 0 0 0 0 0") else {
            panic!("expected gamepad event");
        };
        assert!(state.buttons.is_empty());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(parse(""), Err(ProtocolError::Empty)));
        assert!(matches!(parse("jump"), Err(ProtocolError::UnknownCommand(c)) if c == "jump"));
        assert!(matches!(parse("motion 1"), Err(ProtocolError::MissingArgument("y"))));
        assert!(matches!(parse("motion 1 x"), Err(ProtocolError::InvalidNumber(_))));
        assert!(matches!(parse("down 1 2 thumb"), Err(ProtocolError::Strum(_))));
        assert!(matches!(parse("motion 1 2 hyper"), Err(ProtocolError::Strum(_))));
        assert!(matches!(parse("hide now"), Err(ProtocolError::UnexpectedArgument(_))));
        assert!(matches!(parse("show 'unterminated"), Err(ProtocolError::Tokenize(_))));
        assert!(matches!(parse("frame all"), Err(ProtocolError::UnexpectedArgument(_))));
    }

    #[test]
    fn test_error_line() {
        let error = parse("jump").unwrap_err();
        assert_eq!(error_line(&error), "error Unknown command 'jump'");
    }
}
