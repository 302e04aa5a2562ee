//! Color values as entered in color pickers (`#rrggbb`).

use std::fmt;
use std::str::FromStr;

use image::Rgba;

use crate::error::Error;

/// An opaque sRGB color.
///
/// Parsed from the `#rrggbb` (or short `#rgb`) form produced by HTML color inputs and
/// always printed back in lowercase `#rrggbb` form.
///
/// # Example
///
/// ```rust
/// use qrlogo::color::Color;
///
/// let orange: Color = "#FFA500".parse().unwrap();
/// assert_eq!(orange, Color::new(255, 165, 0));
/// assert_eq!(orange.to_string(), "#ffa500");
/// ```
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);
    pub const WHITE: Color = Color::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns the color as a fully opaque RGBA pixel.
    pub fn to_rgba(self) -> Rgba<u8> {
        Rgba([self.r, self.g, self.b, 255])
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor {
            value: s.to_string(),
        };
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        match hex.len() {
            3 => {
                let mut channels = [0u8; 3];
                for (channel, digit) in channels.iter_mut().zip(hex.chars()) {
                    // Checked by the hexdigit filter above.
                    let v = digit.to_digit(16).unwrap_or(0) as u8;
                    *channel = v * 17;
                }
                Ok(Color::new(channels[0], channels[1], channels[2]))
            }
            6 => {
                let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
                Ok(Color::new(channel(0)?, channel(2)?, channel(4)?))
            }
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_and_short_forms() {
        assert_eq!("#000000".parse::<Color>().unwrap(), Color::BLACK);
        assert_eq!("#FFFFFF".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#f80".parse::<Color>().unwrap(), Color::new(0xff, 0x88, 0x00));
        assert_eq!(" #1a2b3c ".parse::<Color>().unwrap(), Color::new(0x1a, 0x2b, 0x3c));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in ["", "000000", "#12345", "#gggggg", "#1234567", "red", "#ééé"] {
            assert!(bad.parse::<Color>().is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn test_display_is_lowercase_hex() {
        assert_eq!(Color::new(255, 165, 0).to_string(), "#ffa500");
        assert_eq!(Color::WHITE.to_rgba(), Rgba([255, 255, 255, 255]));
    }
}
