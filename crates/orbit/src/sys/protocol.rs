//! Line protocol spoken over the daemon socket. One command per line, words
//! separated by whitespace.

use crate::drag::{MouseButton, PointerEvent, PointerKind};
use crate::geometry::{Point, Viewport};
use crate::menu::MenuEvent;
use std::str::FromStr;
use strum::EnumString;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString)]
#[strum(serialize_all = "kebab-case")]
enum Verb {
    Down,
    Move,
    Up,
    TouchDown,
    TouchMove,
    TouchUp,
    Click,
    Resize,
    Select,
    Close,
    Dump,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Event(MenuEvent),
    Dump,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("empty command")]
    Empty,
    #[error("unknown command '{0}'")]
    UnknownVerb(String),
    #[error("'{verb}' expects {expected}")]
    Arguments { verb: String, expected: &'static str },
    #[error("invalid value '{0}'")]
    Value(String),
}

fn value<T: FromStr>(word: &str) -> Result<T, ProtocolError> {
    word.parse()
        .map_err(|_| ProtocolError::Value(word.to_string()))
}

fn pointer(args: &[&str], touch: bool) -> Result<PointerEvent, ProtocolError> {
    let (x, y, extra) = match args {
        [x, y] => (x, y, None),
        [x, y, extra] => (x, y, Some(*extra)),
        _ => {
            return Err(ProtocolError::Arguments {
                verb: if touch { "touch" } else { "pointer" }.to_string(),
                expected: "X Y and an optional button or finger",
            });
        }
    };
    let kind = if touch {
        PointerKind::Touch {
            finger: extra.map(value).transpose()?.unwrap_or(0),
        }
    } else {
        PointerKind::Mouse(extra.map(value).transpose()?.unwrap_or(MouseButton::Primary))
    };
    Ok(PointerEvent {
        position: Point::new(value(x)?, value(y)?),
        kind,
    })
}

pub fn parse_line(line: &str) -> Result<Command, ProtocolError> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (&head, args) = words.split_first().ok_or(ProtocolError::Empty)?;
    let verb: Verb = head
        .parse()
        .map_err(|_| ProtocolError::UnknownVerb(head.to_string()))?;

    let arity = |n: usize, expected: &'static str| {
        if args.len() == n {
            Ok(())
        } else {
            Err(ProtocolError::Arguments {
                verb: head.to_string(),
                expected,
            })
        }
    };

    let event = match verb {
        Verb::Down => MenuEvent::PointerDown(pointer(args, false)?),
        Verb::Move => MenuEvent::PointerMove(pointer(args, false)?),
        Verb::Up => MenuEvent::PointerUp(pointer(args, false)?),
        Verb::TouchDown => MenuEvent::PointerDown(pointer(args, true)?),
        Verb::TouchMove => MenuEvent::PointerMove(pointer(args, true)?),
        Verb::TouchUp => MenuEvent::PointerUp(pointer(args, true)?),
        Verb::Click => {
            arity(0, "no arguments")?;
            MenuEvent::Click
        }
        Verb::Resize => {
            arity(2, "W H")?;
            MenuEvent::Resize(Viewport::new(value(args[0])?, value(args[1])?))
        }
        Verb::Select => {
            arity(1, "an item index")?;
            MenuEvent::Select(value(args[0])?)
        }
        Verb::Close => {
            arity(0, "no arguments")?;
            MenuEvent::Close
        }
        Verb::Dump => {
            arity(0, "no arguments")?;
            return Ok(Command::Dump);
        }
    };
    Ok(Command::Event(event))
}
