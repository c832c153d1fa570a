//! ASUS ROG Aura keyboard protocol.

use std::fmt::{self, Display, Formatter};

use bytes::{BufMut, Bytes, BytesMut};

use crate::command::{LightingCommand, RAINBOW, ZONES};
use crate::{Rgb, Speed};

/// ASUSTek vendor ID.
pub const VENDOR_ID: u16 = 0x0b05;

/// Product IDs of supported ROG Aura keyboards.
pub const PRODUCT_IDS: [u16; 3] = [0x1854, 0x1869, 0x1866];

/// Size of every feature report.
pub const MESSAGE_LENGTH: usize = 17;

const REPORT_ID: u8 = 0x5d;

const OPCODE_ZONE: u8 = 0xb3;
const OPCODE_APPLY: u8 = 0xb4;
const OPCODE_SET: u8 = 0xb5;

/// Protocol values for slow, medium and fast animations.
const SPEED_BYTES: [u8; 3] = [0xe1, 0xeb, 0xf5];

/// Zone ID addressing the entire keyboard.
const ALL_ZONES: u8 = 0;

/// Single HID feature report.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Message(Bytes);

impl Message {
    /// Zero-pad a report to the fixed message length.
    fn new(mut buf: BytesMut) -> Self {
        debug_assert!(buf.len() <= MESSAGE_LENGTH);
        buf.resize(MESSAGE_LENGTH, 0);
        Self(buf.freeze())
    }

    fn with_opcode(opcode: u8) -> Self {
        let mut buf = BytesMut::with_capacity(MESSAGE_LENGTH);
        buf.put_u8(REPORT_ID);
        buf.put_u8(opcode);
        Self::new(buf)
    }

    /// Commit previously sent zone parameters.
    pub fn set() -> Self {
        Self::with_opcode(OPCODE_SET)
    }

    /// Show committed zone parameters on the LEDs.
    pub fn apply() -> Self {
        Self::with_opcode(OPCODE_APPLY)
    }

    pub fn report_id(&self) -> u8 {
        self.0[0]
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Zone animation.
#[derive(PartialEq, Eq, Debug, Copy, Clone)]
enum SubMode {
    Static = 0,
    Breathing = 1,
    ColorCycle = 2,
}

/// Parameters for one zone, or all of them.
struct ZoneReport {
    zone: u8,
    mode: SubMode,
    color: Rgb,
    speed: Option<Speed>,
    secondary: Option<Rgb>,
}

impl ZoneReport {
    fn new(zone: u8, mode: SubMode, color: Rgb) -> Self {
        Self { zone, mode, color, speed: None, secondary: None }
    }

    fn speed(mut self, speed: Speed) -> Self {
        self.speed = Some(speed);
        self
    }

    fn secondary(mut self, color: Rgb) -> Self {
        self.secondary = Some(color);
        self
    }

    fn encode(&self) -> Message {
        let mut buf = BytesMut::with_capacity(MESSAGE_LENGTH);

        // Report ID.
        buf.put_u8(REPORT_ID);
        buf.put_u8(OPCODE_ZONE);

        buf.put_u8(self.zone);
        buf.put_u8(self.mode as u8);

        // Primary color.
        buf.put_u8(self.color.r);
        buf.put_u8(self.color.g);
        buf.put_u8(self.color.b);

        buf.put_u8(self.speed.map_or(0, speed_byte));

        // Padding.
        buf.put_u8(0);

        // Secondary color, prefixed by its enable flag.
        if let Some(color) = self.secondary {
            buf.put_u8(1);
            buf.put_u8(color.r);
            buf.put_u8(color.g);
            buf.put_u8(color.b);
        }

        Message::new(buf)
    }
}

/// Convert speed to ROG Aura format.
pub fn speed_byte(speed: Speed) -> u8 {
    SPEED_BYTES[speed.ordinal() - 1]
}

/// Get all reports required to apply a lighting command.
///
/// This does not include the trailing "set" and "apply" reports.
pub fn encode(command: &LightingCommand) -> Vec<Message> {
    match *command {
        LightingCommand::SingleStatic(color) => vec![single_static(color)],
        LightingCommand::SingleBreathing { color, secondary, speed } => {
            vec![single_breathing(color, secondary, speed)]
        },
        LightingCommand::SingleColorCycle(speed) => vec![single_colorcycle(speed)],
        LightingCommand::MultiStatic(colors) => multi_static(colors),
        LightingCommand::MultiBreathing(colors, speed) => multi_breathing(colors, speed),
        LightingCommand::Preset(preset) => vec![single_static(preset.color())],
        LightingCommand::Rainbow => multi_static(RAINBOW),
    }
}

pub fn single_static(color: Rgb) -> Message {
    ZoneReport::new(ALL_ZONES, SubMode::Static, color).encode()
}

pub fn single_breathing(color: Rgb, secondary: Rgb, speed: Speed) -> Message {
    ZoneReport::new(ALL_ZONES, SubMode::Breathing, color).speed(speed).secondary(secondary).encode()
}

pub fn single_colorcycle(speed: Speed) -> Message {
    // Only the first byte of the color is used, as intensity.
    let intensity = Rgb { r: 0xff, ..Rgb::default() };
    ZoneReport::new(ALL_ZONES, SubMode::ColorCycle, intensity).speed(speed).encode()
}

/// One static color per zone.
///
/// The keyboard expects the medium speed byte here, even though static zones do not animate.
pub fn multi_static(colors: [Rgb; ZONES]) -> Vec<Message> {
    zones(colors, |zone, color| ZoneReport::new(zone, SubMode::Static, color).speed(Speed::Medium))
}

pub fn multi_breathing(colors: [Rgb; ZONES], speed: Speed) -> Vec<Message> {
    zones(colors, |zone, color| ZoneReport::new(zone, SubMode::Breathing, color).speed(speed))
}

/// Encode one report per zone, zone IDs starting at 1.
fn zones<F>(colors: [Rgb; ZONES], report: F) -> Vec<Message>
where
    F: Fn(u8, Rgb) -> ZoneReport,
{
    (1..).zip(colors.iter()).map(|(zone, color)| report(zone, *color).encode()).collect()
}
