//! ROG Aura keyboard lighting CLI tool
//!
//! Lighting changes are sent as 17 byte vendor feature reports to the keyboard, followed by a
//! "set" and an "apply" report which commit the staged zone state to the LEDs.

use std::fmt::{self, Display, Formatter};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{crate_description, crate_name, crate_version, Arg, ArgAction, ArgMatches, Command};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::command::LightingCommand;
use crate::controller::{HidApiBus, HidBus, Summary};
use crate::error::Error;

mod aura;
mod command;
mod controller;
mod error;

/// RGB color.
#[derive(Default, Debug, PartialEq, Eq, Copy, Clone)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Rgb = Rgb { r: 0xff, g: 0x00, b: 0x00 };
    pub const GREEN: Rgb = Rgb { r: 0x00, g: 0xff, b: 0x00 };
    pub const BLUE: Rgb = Rgb { r: 0x00, g: 0x00, b: 0xff };
    pub const YELLOW: Rgb = Rgb { r: 0xff, g: 0xff, b: 0x00 };
    pub const CYAN: Rgb = Rgb { r: 0x00, g: 0xff, b: 0xff };
    pub const MAGENTA: Rgb = Rgb { r: 0xff, g: 0x00, b: 0xff };
    pub const WHITE: Rgb = Rgb { r: 0xff, g: 0xff, b: 0xff };
    pub const BLACK: Rgb = Rgb { r: 0x00, g: 0x00, b: 0x00 };
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Rgb, Error> {
        if s.len() != 6 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(Error::InvalidColorFormat(s.into()));
        }

        let mut color =
            u32::from_str_radix(s, 16).map_err(|_| Error::InvalidColorFormat(s.into()))?;

        let b = (color & 0xff) as u8;
        color >>= 8;
        let g = (color & 0xff) as u8;
        color >>= 8;
        let r = color as u8;
        Ok(Rgb { r, g, b })
    }
}

impl Display for Rgb {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Animation speed.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone)]
pub enum Speed {
    Slow = 1,
    #[default]
    Medium = 2,
    Fast = 3,
}

impl Speed {
    /// Get the speed for its ordinal `1..=3`.
    pub fn from_ordinal(ordinal: i64) -> Option<Self> {
        match ordinal {
            1 => Some(Self::Slow),
            2 => Some(Self::Medium),
            3 => Some(Self::Fast),
            _ => None,
        }
    }

    pub fn ordinal(self) -> usize {
        self as usize
    }
}

impl FromStr for Speed {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_c_integer(s)
            .and_then(Speed::from_ordinal)
            .ok_or_else(|| Error::InvalidSpeedValue(s.into()))
    }
}

impl Display for Speed {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal())
    }
}

/// Parse an integer in decimal, `0x` hex or `0` octal notation.
fn parse_c_integer(s: &str) -> Option<i64> {
    let (digits, radix) = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => (hex, 16),
        None if s.len() > 1 && s.starts_with('0') => (&s[1..], 8),
        None => (s, 10),
    };

    // Signs are only accepted in front of plain decimals.
    if radix != 10 && !digits.starts_with(|c: char| c.is_ascii_hexdigit()) {
        return None;
    }

    i64::from_str_radix(digits, radix).ok()
}

/// Parsed CLI invocation.
struct Config {
    verbose: bool,
    command: Option<String>,
    arguments: Vec<String>,
}

impl Config {
    fn from_cli(matches: &ArgMatches) -> Self {
        let arguments = matches
            .get_many::<String>("arguments")
            .map(|values| values.cloned().collect())
            .unwrap_or_default();

        Self {
            verbose: matches.get_flag("verbose"),
            command: matches.get_one::<String>("command").cloned(),
            arguments,
        }
    }

    /// Resolve the lighting command and validate its arguments.
    fn lighting_command(&self) -> Result<Option<LightingCommand>, Error> {
        let name = match &self.command {
            Some(name) => name,
            None => return Ok(None),
        };

        let arguments: Vec<&str> = self.arguments.iter().map(String::as_str).collect();
        command::resolve(name, &arguments).map(Some)
    }
}

fn main() -> ExitCode {
    let config = Config::from_cli(&cli().get_matches());

    init_logging(config.verbose);

    let lighting = match config.lighting_command() {
        Ok(Some(lighting)) => lighting,
        Ok(None) => {
            print!("{}", command::usage());
            return ExitCode::FAILURE;
        },
        Err(err) => {
            if let Error::UnknownCommand(_) | Error::ArgumentCountMismatch { .. } = err {
                println!("{}", command::usage());
            }
            eprintln!("\x1b[31mError:\x1b[0m {err}");
            return ExitCode::FAILURE;
        },
    };

    debug!("resolved command: {:?}", lighting);

    let bus = match HidApiBus::new() {
        Ok(bus) => bus,
        Err(err) => {
            eprintln!("\x1b[31mError:\x1b[0m {err}");
            return ExitCode::FAILURE;
        },
    };

    run(&bus, &lighting).exit_code()
}

/// Result of a lighting update.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
enum Outcome {
    /// At least one keyboard received the full report sequence.
    Applied,
    /// No supported keyboard is attached.
    NoDevice,
    /// Every matched keyboard failed.
    Failed,
}

impl Outcome {
    fn exit_code(self) -> ExitCode {
        match self {
            Outcome::Applied | Outcome::NoDevice => ExitCode::SUCCESS,
            Outcome::Failed => ExitCode::FAILURE,
        }
    }
}

/// Write a lighting command to all attached keyboards.
fn run<B: HidBus>(bus: &B, lighting: &LightingCommand) -> Outcome {
    let messages = aura::encode(lighting);
    debug!("constructed {} messages:", messages.len());
    for (i, message) in messages.iter().enumerate() {
        debug!("message {}: {}", i, message);
    }

    match controller::update(bus, &messages) {
        Ok(summary) => report(&summary),
        Err(Error::NoCompatibleDeviceFound) => {
            println!("\x1b[33mNo compatible device found.\x1b[0m");
            Outcome::NoDevice
        },
        Err(err) => {
            eprintln!("\x1b[31mError:\x1b[0m {err}");
            Outcome::Failed
        },
    }
}

/// Print the result of a lighting update.
fn report(summary: &Summary) -> Outcome {
    for err in &summary.failures {
        eprintln!("\x1b[31mError:\x1b[0m {err}");
    }

    if summary.updated == 0 {
        return Outcome::Failed;
    }

    println!("\x1b[32mSuccessfully applied changes to {} keyboard(s).\x1b[0m", summary.updated);
    Outcome::Applied
}

/// Install the tracing subscriber.
fn init_logging(verbose: bool) {
    let level = if verbose { LevelFilter::DEBUG } else { LevelFilter::WARN };

    let filter = EnvFilter::builder().with_default_directive(level.into()).from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .init();
}

/// Get clap CLI parameters.
fn cli() -> Command {
    Command::new(crate_name!())
        .version(crate_version!())
        .about(crate_description!())
        .after_help(command::usage())
        .arg(
            Arg::new("verbose")
                .help("Trace parsed arguments and raw HID reports")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue),
        )
        .arg(Arg::new("command").help("Lighting command").value_name("COMMAND"))
        .arg(
            Arg::new("arguments")
                .help("Colors in hex [RRGGBB] followed by the speed [1, 2 or 3]")
                .value_name("ARG")
                .num_args(0..)
                .allow_hyphen_values(true)
                .action(ArgAction::Append),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::testing::FakeBus;

    #[test]
    fn color_round_trip() {
        for token in ["ff0000", "00FF7f", "123abc", "000000", "FfFfFf"] {
            let color = Rgb::from_str(token).unwrap();
            assert_eq!(color.to_string(), token.to_lowercase());
        }
    }

    #[test]
    fn color_channels() {
        let color = Rgb::from_str("12ab9f").unwrap();
        assert_eq!(color, Rgb { r: 0x12, g: 0xab, b: 0x9f });
    }

    #[test]
    fn invalid_colors() {
        for token in ["", "ff000", "ff00000", "0xff00", "gg0000", "+f0000", "ff 000", "ff00é"] {
            assert!(
                matches!(Rgb::from_str(token), Err(Error::InvalidColorFormat(_))),
                "accepted {:?}",
                token
            );
        }
    }

    #[test]
    fn speed_values() {
        assert_eq!(Speed::from_str("1").unwrap(), Speed::Slow);
        assert_eq!(Speed::from_str("2").unwrap(), Speed::Medium);
        assert_eq!(Speed::from_str("3").unwrap(), Speed::Fast);
        assert_eq!(Speed::from_str("0x3").unwrap(), Speed::Fast);
        assert_eq!(Speed::from_str("02").unwrap(), Speed::Medium);
    }

    #[test]
    fn invalid_speeds() {
        for token in ["", "0", "4", "-1", "fast", "1.5", "0x", "0x-1", "2 "] {
            assert!(
                matches!(Speed::from_str(token), Err(Error::InvalidSpeedValue(_))),
                "accepted {:?}",
                token
            );
        }
    }

    #[test]
    fn speed_ordinals() {
        for ordinal in 1..=3 {
            assert_eq!(Speed::from_ordinal(ordinal).unwrap().ordinal(), ordinal as usize);
        }
        assert_eq!(Speed::from_ordinal(4), None);
    }

    #[test]
    fn cli_collects_arguments() {
        let matches =
            cli().get_matches_from(["rogaura", "-v", "single_breathing", "ff0000", "00ff00", "2"]);
        let config = Config::from_cli(&matches);

        assert!(config.verbose);
        assert_eq!(config.command.as_deref(), Some("single_breathing"));
        assert_eq!(config.arguments, ["ff0000", "00ff00", "2"]);
        assert!(matches!(
            config.lighting_command(),
            Ok(Some(LightingCommand::SingleBreathing { .. }))
        ));
    }

    #[test]
    fn cli_passes_hyphenated_arguments() {
        let matches = cli().try_get_matches_from(["rogaura", "single_colorcycle", "-1"]).unwrap();
        let config = Config::from_cli(&matches);
        assert_eq!(config.arguments, ["-1"]);
        assert!(matches!(
            config.lighting_command(),
            Err(Error::InvalidSpeedValue(token)) if token == "-1"
        ));

        let matches = cli().try_get_matches_from(["rogaura", "single_static", "-f0000"]).unwrap();
        let config = Config::from_cli(&matches);
        assert!(matches!(config.lighting_command(), Err(Error::InvalidColorFormat(_))));
    }

    #[test]
    fn cli_without_command() {
        let matches = cli().get_matches_from(["rogaura"]);
        let config = Config::from_cli(&matches);

        assert!(!config.verbose);
        assert!(matches!(config.lighting_command(), Ok(None)));
    }

    #[test]
    fn run_without_keyboard_succeeds() {
        let bus = FakeBus::with_devices(&[(0x046d, 0xc52b)]);

        let outcome = run(&bus, &LightingCommand::Rainbow);
        assert_eq!(outcome, Outcome::NoDevice);
        assert_eq!(format!("{:?}", outcome.exit_code()), format!("{:?}", ExitCode::SUCCESS));
        assert!(bus.log.borrow().is_empty());
    }

    #[test]
    fn run_with_updated_keyboard_succeeds() {
        let mut bus = FakeBus::with_devices(&[(0x0b05, 0x1854), (0x0b05, 0x1866)]);
        bus.unopenable.insert(FakeBus::path(0));

        let outcome = run(&bus, &LightingCommand::SingleStatic(Rgb::BLUE));
        assert_eq!(outcome, Outcome::Applied);
        assert_eq!(format!("{:?}", outcome.exit_code()), format!("{:?}", ExitCode::SUCCESS));
        assert_eq!(bus.reports("/dev/hidraw1").len(), 3);
    }

    #[test]
    fn run_with_only_failing_keyboards_fails() {
        let mut bus = FakeBus::with_devices(&[(0x0b05, 0x1854), (0x0b05, 0x1869)]);
        bus.unopenable.insert(FakeBus::path(0));
        bus.failing_writes.insert(FakeBus::path(1), 0);

        let outcome = run(&bus, &LightingCommand::Preset(command::Preset::Cyan));
        assert_eq!(outcome, Outcome::Failed);
        assert_eq!(format!("{:?}", outcome.exit_code()), format!("{:?}", ExitCode::FAILURE));
    }
}
