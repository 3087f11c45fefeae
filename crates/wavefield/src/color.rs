//! Color value types and the four-color material configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::math::Vec3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits (e.g. #4361EE), got '{0}'")]
    Length(String),
    #[error("invalid hex digit in color '{0}'")]
    Digit(String),
}

/// Three-channel color with components nominally in `[0, 1]`.
///
/// Serialises as a `#RRGGBB` string so configuration files stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Normalises 8-bit channels by `/ 255`. No transfer curve is applied.
    pub fn from_bytes(r: u8, g: u8, b: u8) -> Self {
        Self::new(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    /// Parses `#RRGGBB` or `RRGGBB`.
    pub fn from_hex(value: &str) -> Result<Self, ColorParseError> {
        let trimmed = value.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(ColorParseError::Length(value.to_string()));
        }
        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16)
                .map_err(|_| ColorParseError::Digit(value.to_string()))
        };
        Ok(Self::from_bytes(channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }

    /// Formats as `#RRGGBB`, clamping each channel into range first.
    pub fn to_hex(self) -> String {
        let byte = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "#{:02X}{:02X}{:02X}",
            byte(self.r),
            byte(self.g),
            byte(self.b)
        )
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub(crate) fn to_vec3(self) -> Vec3 {
        Vec3::new(self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Output of one pixel evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    pub const BLACK: Self = Self::opaque(0.0, 0.0, 0.0);

    pub const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Identifies one of the four configurable base colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSlot {
    /// Bottom-left quadrant.
    Color1,
    /// Top-left quadrant.
    Color2,
    /// Bottom-right quadrant.
    Color3,
    /// Top-right quadrant.
    Color4,
}

impl ColorSlot {
    pub const ALL: [ColorSlot; 4] = [Self::Color1, Self::Color2, Self::Color3, Self::Color4];

    pub fn uniform_name(self) -> &'static str {
        match self {
            Self::Color1 => "color1",
            Self::Color2 => "color2",
            Self::Color3 => "color3",
            Self::Color4 => "color4",
        }
    }
}

/// The four base colors blended across the screen quadrants.
///
/// This is a plain value: every material instance owns its own copy, so
/// mutating one never leaks into another.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseColors {
    pub color1: Rgb,
    pub color2: Rgb,
    pub color3: Rgb,
    pub color4: Rgb,
}

impl BaseColors {
    pub fn get(&self, slot: ColorSlot) -> Rgb {
        match slot {
            ColorSlot::Color1 => self.color1,
            ColorSlot::Color2 => self.color2,
            ColorSlot::Color3 => self.color3,
            ColorSlot::Color4 => self.color4,
        }
    }

    pub fn set(&mut self, slot: ColorSlot, color: Rgb) {
        match slot {
            ColorSlot::Color1 => self.color1 = color,
            ColorSlot::Color2 => self.color2 = color,
            ColorSlot::Color3 => self.color3 = color,
            ColorSlot::Color4 => self.color4 = color,
        }
    }
}

impl Default for BaseColors {
    /// `#4361EE`, `#3A0CA3`, `#F72585`, `#7209B7`.
    fn default() -> Self {
        Self {
            color1: Rgb::from_bytes(0x43, 0x61, 0xEE),
            color2: Rgb::from_bytes(0x3A, 0x0C, 0xA3),
            color3: Rgb::from_bytes(0xF7, 0x25, 0x85),
            color4: Rgb::from_bytes(0x72, 0x09, 0xB7),
        }
    }
}
