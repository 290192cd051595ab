//! Control entities
//!
//! Passive value objects for every physical control on the Tweaker. Each setter
//! checks the declared range and leaves the entity untouched when it fails.

pub mod button;
pub mod encoder;
pub mod led;
pub mod pad;
pub mod potentiometer;

use crate::error::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

pub use button::Button;
pub use encoder::Encoder;
pub use led::{color_to_on_off, on_off_to_color, MonoLed, RgbLed};
pub use pad::Pad;
pub use potentiometer::Potentiometer;

/// Inclusive bounds of a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: u8,
    pub max: u8,
}

impl Bounds {
    pub const fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: i64) -> bool {
        value >= self.min as i64 && value <= self.max as i64
    }

    /// Validate `value` for `field`, returning it unchanged when in range
    pub fn check(self, field: &'static str, value: u8) -> Result<u8> {
        if self.contains(value as i64) {
            Ok(value)
        } else {
            Err(Error::Range {
                field,
                value: value as i64,
                min: self.min as i64,
                max: self.max as i64,
            })
        }
    }
}

/// MIDI note / CC number
pub const MAPPING: Bounds = Bounds::new(0, 127);
/// Human-facing MIDI channel
pub const CHANNEL: Bounds = Bounds::new(1, 16);

/// Whether a button emits Control-Change or Note messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputType {
    Cc,
    Note,
}

impl OutputType {
    /// Legacy document encoding: `true` = Note, `false` = CC
    pub fn from_flag(note: bool) -> Self {
        if note {
            OutputType::Note
        } else {
            OutputType::Cc
        }
    }

    pub fn as_flag(self) -> bool {
        self == OutputType::Note
    }
}

impl Serialize for OutputType {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.as_flag())
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputType::Cc => write!(f, "cc"),
            OutputType::Note => write!(f, "note"),
        }
    }
}

impl FromStr for OutputType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cc" => Ok(OutputType::Cc),
            "note" => Ok(OutputType::Note),
            _ => Err(Error::InvalidValue {
                field: "outputType",
                value: s.to_string(),
            }),
        }
    }
}

/// Visual behaviour of an encoder's LED ring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RingMode {
    #[serde(rename = "f")]
    Fill,
    #[serde(rename = "w")]
    Walk,
    #[serde(rename = "e")]
    Eq,
    #[serde(rename = "s")]
    Spread,
}

impl RingMode {
    pub const ALL: [RingMode; 4] = [RingMode::Fill, RingMode::Walk, RingMode::Eq, RingMode::Spread];

    /// Single-letter code used by saved documents
    pub fn code(self) -> &'static str {
        match self {
            RingMode::Fill => "f",
            RingMode::Walk => "w",
            RingMode::Eq => "e",
            RingMode::Spread => "s",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.code() == code)
    }
}

impl fmt::Display for RingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RingMode::Fill => "fill",
            RingMode::Walk => "walk",
            RingMode::Eq => "eq",
            RingMode::Spread => "spread",
        };
        f.write_str(name)
    }
}

impl FromStr for RingMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::from_code(&lower)
            .or_else(|| Self::ALL.into_iter().find(|m| m.to_string() == lower))
            .ok_or_else(|| Error::InvalidValue {
                field: "ringMode",
                value: s.to_string(),
            })
    }
}

/// RGB LED colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Color {
    #[serde(rename = "o")]
    Off,
    #[serde(rename = "g")]
    Green,
    #[serde(rename = "r")]
    Red,
    #[serde(rename = "y")]
    Yellow,
    #[serde(rename = "b")]
    Blue,
    #[serde(rename = "c")]
    Cyan,
    #[serde(rename = "m")]
    Magenta,
    #[serde(rename = "w")]
    White,
}

impl Color {
    pub const ALL: [Color; 8] = [
        Color::Off,
        Color::Green,
        Color::Red,
        Color::Yellow,
        Color::Blue,
        Color::Cyan,
        Color::Magenta,
        Color::White,
    ];

    /// Single-letter code used by saved documents
    pub fn code(self) -> &'static str {
        match self {
            Color::Off => "o",
            Color::Green => "g",
            Color::Red => "r",
            Color::Yellow => "y",
            Color::Blue => "b",
            Color::Cyan => "c",
            Color::Magenta => "m",
            Color::White => "w",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.code() == code)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Color::Off => "off",
            Color::Green => "green",
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Cyan => "cyan",
            Color::Magenta => "magenta",
            Color::White => "white",
        };
        f.write_str(name)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.to_ascii_lowercase();
        Self::from_code(&lower)
            .or_else(|| Self::ALL.into_iter().find(|c| c.to_string() == lower))
            .ok_or_else(|| Error::InvalidValue {
                field: "color",
                value: s.to_string(),
            })
    }
}
