//! RGB colors parsed from `#RRGGBB` literals.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ColorFormatError;

/// An RGB color with each channel normalized to `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Pale yellow, the default page background.
    pub const CREAM: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 204.0 / 255.0,
    };

    pub const WHITE: Color = Color { r: 1.0, g: 1.0, b: 1.0 };

    /// Create a color from 8-bit channels.
    pub fn from_rgb8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: f32::from(r) / 255.0,
            g: f32::from(g) / 255.0,
            b: f32::from(b) / 255.0,
        }
    }

    /// Parse a `#RRGGBB` literal. The leading `#` is optional.
    pub fn from_hex(literal: &str) -> Result<Self, ColorFormatError> {
        let digits = literal.trim();
        let digits = digits.strip_prefix('#').unwrap_or(digits);

        if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorFormatError::Digit {
                input: literal.to_string(),
            });
        }
        if digits.len() != 6 {
            return Err(ColorFormatError::Length {
                input: literal.to_string(),
                digits: digits.chars().count(),
            });
        }

        // All bytes are ASCII hex digits here, so byte slicing is safe.
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16).map_err(|_| ColorFormatError::Digit {
                input: literal.to_string(),
            })
        };

        Ok(Self::from_rgb8(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Channels rounded to the nearest byte.
    pub fn to_rgb8(self) -> [u8; 3] {
        let quantize = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [quantize(self.r), quantize(self.g), quantize(self.b)]
    }

    /// Render as an uppercase `#RRGGBB` literal.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{:02X}{:02X}{:02X}", r, g, b)
    }

    pub fn channels(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::CREAM
    }
}

impl FromStr for Color {
    type Err = ColorFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let literal = String::deserialize(deserializer)?;
        Color::from_hex(&literal).map_err(serde::de::Error::custom)
    }
}

/// Parse a `#RRGGBB` literal into a [`Color`].
pub fn parse_color(literal: &str) -> Result<Color, ColorFormatError> {
    Color::from_hex(literal)
}
