//! Lighting command registry.

use std::fmt::Write;

use clap::crate_name;
use tracing::debug;

use crate::error::Error;
use crate::{Rgb, Speed};

/// Number of characters compared when looking up a command name.
const MAX_NAME_LENGTH: usize = 32;

/// Number of independently colorable keyboard zones.
pub const ZONES: usize = 4;

/// Zone colors of the `rainbow` preset.
pub const RAINBOW: [Rgb; ZONES] = [Rgb::RED, Rgb::YELLOW, Rgb::CYAN, Rgb::MAGENTA];

/// All available commands.
pub static COMMANDS: [CommandDescriptor; 14] = [
    CommandDescriptor::new("single_static", CommandKind::SingleStatic, 1, false),
    CommandDescriptor::new("single_breathing", CommandKind::SingleBreathing, 2, true),
    CommandDescriptor::new("single_colorcycle", CommandKind::SingleColorCycle, 0, true),
    CommandDescriptor::new("multi_static", CommandKind::MultiStatic, ZONES, false),
    CommandDescriptor::new("multi_breathing", CommandKind::MultiBreathing, ZONES, true),
    CommandDescriptor::new("red", CommandKind::Preset(Preset::Red), 0, false),
    CommandDescriptor::new("green", CommandKind::Preset(Preset::Green), 0, false),
    CommandDescriptor::new("blue", CommandKind::Preset(Preset::Blue), 0, false),
    CommandDescriptor::new("yellow", CommandKind::Preset(Preset::Yellow), 0, false),
    CommandDescriptor::new("cyan", CommandKind::Preset(Preset::Cyan), 0, false),
    CommandDescriptor::new("magenta", CommandKind::Preset(Preset::Magenta), 0, false),
    CommandDescriptor::new("white", CommandKind::Preset(Preset::White), 0, false),
    CommandDescriptor::new("black", CommandKind::Preset(Preset::Black), 0, false),
    CommandDescriptor::new("rainbow", CommandKind::Rainbow, 0, false),
];

/// Single color applied to the whole keyboard.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum Preset {
    Red,
    Green,
    Blue,
    Yellow,
    Cyan,
    Magenta,
    White,
    Black,
}

impl Preset {
    pub fn color(self) -> Rgb {
        match self {
            Self::Red => Rgb::RED,
            Self::Green => Rgb::GREEN,
            Self::Blue => Rgb::BLUE,
            Self::Yellow => Rgb::YELLOW,
            Self::Cyan => Rgb::CYAN,
            Self::Magenta => Rgb::MAGENTA,
            Self::White => Rgb::WHITE,
            Self::Black => Rgb::BLACK,
        }
    }
}

/// Kind of a command, without its arguments.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
pub enum CommandKind {
    SingleStatic,
    SingleBreathing,
    SingleColorCycle,
    MultiStatic,
    MultiBreathing,
    Preset(Preset),
    Rainbow,
}

/// Validated lighting command with all of its arguments.
#[derive(PartialEq, Eq, Debug, Clone)]
pub enum LightingCommand {
    SingleStatic(Rgb),
    SingleBreathing { color: Rgb, secondary: Rgb, speed: Speed },
    SingleColorCycle(Speed),
    MultiStatic([Rgb; ZONES]),
    MultiBreathing([Rgb; ZONES], Speed),
    Preset(Preset),
    Rainbow,
}

/// Command name and the arguments it takes.
#[derive(Debug)]
pub struct CommandDescriptor {
    pub name: &'static str,
    pub kind: CommandKind,
    pub colors: usize,
    pub speed: bool,
}

impl CommandDescriptor {
    const fn new(name: &'static str, kind: CommandKind, colors: usize, speed: bool) -> Self {
        Self { name, kind, colors, speed }
    }

    /// Find a command by name.
    pub fn lookup(name: &str) -> Result<&'static CommandDescriptor, Error> {
        COMMANDS
            .iter()
            .find(|command| truncated(command.name) == truncated(name))
            .ok_or_else(|| Error::UnknownCommand(name.into()))
    }

    /// Total number of arguments.
    pub fn arity(&self) -> usize {
        self.colors + self.speed as usize
    }

    /// Parse the command's arguments.
    ///
    /// Colors come first, followed by the speed.
    pub fn parse(&self, args: &[&str]) -> Result<LightingCommand, Error> {
        if args.len() != self.arity() {
            return Err(Error::ArgumentCountMismatch { command: self.name, usage: self.hint() });
        }

        let (color_args, speed_args) = args.split_at(self.colors);

        let mut colors = [Rgb::default(); ZONES];
        for (i, (color, arg)) in colors.iter_mut().zip(color_args).enumerate() {
            *color = arg.parse()?;
            debug!("color{} {} {} {}", i + 1, color.r, color.g, color.b);
        }

        let speed = match speed_args.first() {
            Some(arg) => arg.parse()?,
            None => Speed::default(),
        };
        if self.speed {
            debug!("speed {}", speed);
        }

        let [c1, c2, ..] = colors;
        Ok(match self.kind {
            CommandKind::SingleStatic => LightingCommand::SingleStatic(c1),
            CommandKind::SingleBreathing => {
                LightingCommand::SingleBreathing { color: c1, secondary: c2, speed }
            },
            CommandKind::SingleColorCycle => LightingCommand::SingleColorCycle(speed),
            CommandKind::MultiStatic => LightingCommand::MultiStatic(colors),
            CommandKind::MultiBreathing => LightingCommand::MultiBreathing(colors, speed),
            CommandKind::Preset(preset) => LightingCommand::Preset(preset),
            CommandKind::Rainbow => LightingCommand::Rainbow,
        })
    }

    /// Invocation example, like `single_breathing COLOR1 COLOR2 SPEED`.
    pub fn signature(&self) -> String {
        let mut signature = String::from(self.name);
        for i in 0..self.colors {
            let _ = write!(signature, " COLOR{}", i + 1);
        }
        if self.speed {
            signature.push_str(" SPEED");
        }
        signature
    }

    /// Explanation of the expected arguments.
    fn hint(&self) -> String {
        let takes = match (self.colors, self.speed) {
            (0, false) => String::from("no arguments"),
            (0, true) => String::from("a speed"),
            (n, false) => format!("{} color(s)", n),
            (n, true) => format!("{} color(s) and a speed", n),
        };

        format!(
            "Function {} takes {}:\n   {} {}\n\n\
             COLOR argument(s) should be given as hex values like ff0000\n\
             SPEED argument should be given as an integer: 1, 2, or 3",
            self.name,
            takes,
            crate_name!(),
            self.signature(),
        )
    }
}

/// Resolve a command name and its arguments.
pub fn resolve(name: &str, args: &[&str]) -> Result<LightingCommand, Error> {
    CommandDescriptor::lookup(name)?.parse(args)
}

/// List of all commands and their arguments.
pub fn usage() -> String {
    let mut usage = format!("Usage:\n   {} [-v] COMMAND ARGUMENTS\n\n", crate_name!());
    usage.push_str("COMMAND should be one of:\n");
    for command in &COMMANDS {
        let _ = writeln!(usage, "   {}", command.signature());
    }
    usage
}

/// Command name limited to the significant characters.
fn truncated(name: &str) -> &[u8] {
    let bytes = name.as_bytes();
    &bytes[..bytes.len().min(MAX_NAME_LENGTH)]
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Valid arguments for a command.
    fn sample_args(command: &CommandDescriptor) -> Vec<&'static str> {
        let mut args = vec!["ff0000", "00ff00", "0000ff", "ffffff"];
        args.truncate(command.colors);
        if command.speed {
            args.push("3");
        }
        args
    }

    #[test]
    fn command_names_are_unique() {
        for (i, command) in COMMANDS.iter().enumerate() {
            assert!(command.name.len() < MAX_NAME_LENGTH);
            assert!(COMMANDS[i + 1..].iter().all(|other| other.name != command.name));
        }
    }

    #[test]
    fn every_command_resolves() {
        for command in &COMMANDS {
            let lighting = resolve(command.name, &sample_args(command));
            assert!(lighting.is_ok(), "{}: {:?}", command.name, lighting);
        }
    }

    #[test]
    fn unknown_command() {
        for name in ["", "Red", "single", "single_static_", "rainbow "] {
            assert!(matches!(resolve(name, &[]), Err(Error::UnknownCommand(_))), "{:?}", name);
        }
    }

    #[test]
    fn argument_count_mismatch() {
        for command in &COMMANDS {
            let mut args = sample_args(command);
            args.push("1");
            let result = resolve(command.name, &args);
            assert!(
                matches!(result, Err(Error::ArgumentCountMismatch { command: name, .. }) if name == command.name),
                "{}: {:?}",
                command.name,
                result
            );

            if command.arity() > 0 {
                let result = resolve(command.name, &args[..command.arity() - 1]);
                assert!(matches!(result, Err(Error::ArgumentCountMismatch { .. })));
            }
        }
    }

    #[test]
    fn mismatch_hint() {
        let err = resolve("single_breathing", &["ff0000"]).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("Function single_breathing takes 2 color(s) and a speed"));
        assert!(text.contains("single_breathing COLOR1 COLOR2 SPEED"));

        let err = resolve("single_colorcycle", &[]).unwrap_err();
        assert!(err.to_string().contains("takes a speed"));

        let err = resolve("red", &["ff0000"]).unwrap_err();
        assert!(err.to_string().contains("takes no arguments"));
    }

    #[test]
    fn arguments_in_order() {
        let lighting = resolve("single_breathing", &["ff0000", "00ff00", "1"]).unwrap();
        assert_eq!(lighting, LightingCommand::SingleBreathing {
            color: Rgb::RED,
            secondary: Rgb::GREEN,
            speed: Speed::Slow,
        });

        let lighting =
            resolve("multi_breathing", &["ff0000", "00ff00", "0000ff", "ffffff", "0x3"]).unwrap();
        assert_eq!(
            lighting,
            LightingCommand::MultiBreathing(
                [Rgb::RED, Rgb::GREEN, Rgb::BLUE, Rgb::WHITE],
                Speed::Fast
            )
        );
    }

    #[test]
    fn invalid_arguments() {
        let result = resolve("single_static", &["red"]);
        assert!(matches!(result, Err(Error::InvalidColorFormat(token)) if token == "red"));

        let result = resolve("single_colorcycle", &["7"]);
        assert!(matches!(result, Err(Error::InvalidSpeedValue(token)) if token == "7"));

        // Speed tokens are not accepted in color positions.
        let result = resolve("single_breathing", &["ff0000", "2", "00ff00"]);
        assert!(matches!(result, Err(Error::InvalidColorFormat(_))));
    }

    #[test]
    fn name_comparison_is_truncated() {
        let long = "x".repeat(MAX_NAME_LENGTH);
        assert_eq!(truncated(&long).len(), MAX_NAME_LENGTH);
        assert_eq!(truncated(&format!("{long}yz")), truncated(&long));
        assert_eq!(truncated("red"), b"red");
    }

    #[test]
    fn usage_lists_all_commands() {
        let usage = usage();
        for command in &COMMANDS {
            assert!(usage.contains(&command.signature()));
        }
        assert!(usage.contains("multi_static COLOR1 COLOR2 COLOR3 COLOR4\n"));
    }
}
