//! Commands a host sends to the pet, and the menus that produce them.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::geometry::Point;

/// Mouse input on the character window, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerInput {
    LeftPressed(Point),
    /// Pointer moved; `left_held` tells whether the left button is down.
    Moved { position: Point, left_held: bool },
    LeftDoubleClicked,
    RightPressed(Point),
}

/// Everything a host can ask the pet to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PetCommand {
    Pointer(PointerInput),
    SayHello,
    Pause,
    Resume,
    Show,
    Hide,
    ToggleVisibility,
    Quit,
}

impl fmt::Display for PetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PetCommand::Pointer(input) => write!(f, "pointer {input:?}"),
            PetCommand::SayHello => write!(f, "hello"),
            PetCommand::Pause => write!(f, "pause"),
            PetCommand::Resume => write!(f, "resume"),
            PetCommand::Show => write!(f, "show"),
            PetCommand::Hide => write!(f, "hide"),
            PetCommand::ToggleVisibility => write!(f, "toggle"),
            PetCommand::Quit => write!(f, "quit"),
        }
    }
}

fn parse_point<'a>(input: &str, mut args: impl Iterator<Item = &'a str>) -> Result<Point> {
    let mut coordinate = || {
        args.next()
            .and_then(|raw| raw.parse::<i32>().ok())
            .ok_or_else(|| Error::unknown_command(input))
    };
    let x = coordinate()?;
    let y = coordinate()?;
    Ok(Point::new(x, y))
}

/// Parses the line commands of the headless host: `hello`, `pause`,
/// `resume`, `show`, `hide`, `toggle`, `quit`, `press X Y`, `drag X Y`,
/// `double` and `menu X Y`.
impl FromStr for PetCommand {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let mut words = trimmed.split_whitespace();
        let Some(head) = words.next() else {
            return Err(Error::unknown_command(s));
        };
        let command = match head.to_ascii_lowercase().as_str() {
            "hello" | "say" => PetCommand::SayHello,
            "pause" | "stop" => PetCommand::Pause,
            "resume" | "go" => PetCommand::Resume,
            "show" => PetCommand::Show,
            "hide" => PetCommand::Hide,
            "toggle" => PetCommand::ToggleVisibility,
            "quit" | "exit" => PetCommand::Quit,
            "double" => PetCommand::Pointer(PointerInput::LeftDoubleClicked),
            "press" => PetCommand::Pointer(PointerInput::LeftPressed(parse_point(trimmed, &mut words)?)),
            "drag" => PetCommand::Pointer(PointerInput::Moved {
                position: parse_point(trimmed, &mut words)?,
                left_held: true,
            }),
            "menu" => PetCommand::Pointer(PointerInput::RightPressed(parse_point(trimmed, &mut words)?)),
            _ => return Err(Error::unknown_command(trimmed)),
        };
        if words.next().is_some() {
            return Err(Error::unknown_command(trimmed));
        }
        Ok(command)
    }
}

/// One entry of a menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Action { label: &'static str, command: PetCommand },
    Separator,
}

impl MenuItem {
    const fn action(label: &'static str, command: PetCommand) -> Self {
        MenuItem::Action { label, command }
    }
}

/// The right-click menu. Offers pause or resume depending on whether the
/// pet is currently set to wander.
pub fn context_menu(auto_move_enabled: bool) -> Vec<MenuItem> {
    let toggle = if auto_move_enabled {
        MenuItem::action("Pause ⏸", PetCommand::Pause)
    } else {
        MenuItem::action("Walk around ▶", PetCommand::Resume)
    };
    vec![
        MenuItem::action("Say hello 👋", PetCommand::SayHello),
        toggle,
        MenuItem::Separator,
        MenuItem::action("Quit ❌", PetCommand::Quit),
    ]
}

/// The tray icon menu. Activating the tray icon itself sends
/// [`PetCommand::ToggleVisibility`].
pub fn tray_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::action("Show pet", PetCommand::Show),
        MenuItem::action("Hide pet", PetCommand::Hide),
        MenuItem::Separator,
        MenuItem::action("Quit", PetCommand::Quit),
    ]
}
