//! RGB colours.
//!
//! [`Color`] stores sRGB components in `[0, 1]`. It can be built from a packed
//! `0xRRGGBB` integer (the way light and material colours are written down) or
//! parsed from the CSS-like notations used for clear colours:
//! `rgb(r, g, b)`, `#rrggbb` and `0xrrggbb`.

use std::{fmt, str::FromStr};

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("empty colour string")]
    Empty,
    #[error("invalid hex colour `{0}`")]
    Hex(String),
    #[error("invalid rgb() colour `{0}`")]
    Rgb(String),
    #[error("unsupported colour notation `{0}`")]
    Unsupported(String),
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Unpack a `0xRRGGBB` integer. Bits above the lower 24 are ignored.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xff) as f32 / 255.0,
            g: ((hex >> 8) & 0xff) as f32 / 255.0,
            b: (hex & 0xff) as f32 / 255.0,
        }
    }

    pub fn to_hex(&self) -> u32 {
        let to_u8 = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (to_u8(self.r) << 16) | (to_u8(self.g) << 8) | to_u8(self.b)
    }

    /// Components converted from sRGB to linear space, as the shaders expect
    /// when rendering into an sRGB surface.
    pub fn to_linear(&self) -> [f32; 3] {
        let convert = |c: f32| {
            if c <= 0.04045 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        };
        [convert(self.r), convert(self.g), convert(self.b)]
    }

    pub fn scaled(&self, factor: f32) -> [f32; 3] {
        let [r, g, b] = self.to_linear();
        [r * factor, g * factor, b * factor]
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Color::from_hex(hex)
    }
}

impl From<Color> for wgpu::Color {
    fn from(color: Color) -> Self {
        let [r, g, b] = color.to_linear();
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: 1.0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_hex())
    }
}

fn parse_hex_digits(digits: &str, original: &str) -> Result<Color, ColorParseError> {
    if digits.len() != 6 {
        return Err(ColorParseError::Hex(original.to_string()));
    }
    u32::from_str_radix(digits, 16)
        .map(Color::from_hex)
        .map_err(|_| ColorParseError::Hex(original.to_string()))
}

fn parse_rgb_args(args: &str, original: &str) -> Result<Color, ColorParseError> {
    let channels = args
        .split(',')
        .map(|part| part.trim().parse::<u8>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| ColorParseError::Rgb(original.to_string()))?;
    match channels.as_slice() {
        [r, g, b] => Ok(Color::rgb(
            *r as f32 / 255.0,
            *g as f32 / 255.0,
            *b as f32 / 255.0,
        )),
        _ => Err(ColorParseError::Rgb(original.to_string())),
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ColorParseError::Empty);
        }
        if let Some(digits) = trimmed.strip_prefix('#') {
            return parse_hex_digits(digits, s);
        }
        if let Some(digits) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            return parse_hex_digits(digits, s);
        }
        if let Some(args) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return parse_rgb_args(args, s);
        }
        Err(ColorParseError::Unsupported(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_round_trips_through_components() {
        let violet = Color::from_hex(0xb799ff);
        assert_eq!(violet.to_hex(), 0xb799ff);
        assert_eq!(format!("{}", violet), "#b799ff");
    }

    #[test]
    fn parses_css_rgb() {
        let black: Color = "rgb(0,0,0)".parse().unwrap();
        assert_eq!(black, Color::BLACK);
        let spaced: Color = "rgb( 255, 0 ,255 )".parse().unwrap();
        assert_eq!(spaced.to_hex(), 0xff00ff);
    }

    #[test]
    fn parses_hex_notations() {
        assert_eq!("0xffffff".parse::<Color>().unwrap(), Color::WHITE);
        assert_eq!("#aee2ff".parse::<Color>().unwrap().to_hex(), 0xaee2ff);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert_eq!("".parse::<Color>(), Err(ColorParseError::Empty));
        assert!(matches!("#fff".parse::<Color>(), Err(ColorParseError::Hex(_))));
        assert!(matches!(
            "rgb(1,2)".parse::<Color>(),
            Err(ColorParseError::Rgb(_))
        ));
        assert!(matches!(
            "rgb(300,0,0)".parse::<Color>(),
            Err(ColorParseError::Rgb(_))
        ));
        assert!(matches!(
            "hsl(0,0%,0%)".parse::<Color>(),
            Err(ColorParseError::Unsupported(_))
        ));
    }

    #[test]
    fn linear_conversion_keeps_extremes() {
        assert_eq!(Color::BLACK.to_linear(), [0.0, 0.0, 0.0]);
        let [r, g, b] = Color::WHITE.to_linear();
        assert!((r - 1.0).abs() < 1e-6 && (g - 1.0).abs() < 1e-6 && (b - 1.0).abs() < 1e-6);
    }
}
