//! Colour type, parsing and blending.

use std::fmt;
use std::str::FromStr;

use palette::{Hsl, IntoColor, Srgb};
use serde::{Deserialize, Serialize};

use crate::error::{EditError, Result};

/// An RGBA colour value with straight (non-premultiplied) alpha.
///
/// Serializes as a hex string so configuration and project files stay
/// readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Opaque colour.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, u8::MAX)
    }

    /// The value empty layer pixels hold.
    pub const TRANSPARENT: Self = Self::new(0, 0, 0, 0);

    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const GREEN: Self = Self::rgb(0, 255, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);

    /// Reads `#RGB`, `#RGBA`, `#RRGGBB` or `#RRGGBBAA`. The leading `#` is
    /// optional and short forms double each digit, so `#F08` is `#FF0088`.
    pub fn from_hex(text: &str) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed.strip_prefix('#').unwrap_or(trimmed);

        let channels: Vec<u8> = match digits.len() {
            3 | 4 => digits
                .chars()
                .map(|c| c.to_digit(16).map(|d| (d as u8) * 0x11))
                .collect::<Option<Vec<u8>>>(),
            6 | 8 if digits.is_ascii() => digits
                .as_bytes()
                .chunks(2)
                .map(|pair| {
                    std::str::from_utf8(pair)
                        .ok()
                        .and_then(|p| u8::from_str_radix(p, 16).ok())
                })
                .collect::<Option<Vec<u8>>>(),
            _ => None,
        }
        .ok_or_else(|| invalid_hex(trimmed))?;

        Ok(match channels[..] {
            [r, g, b] => Self::rgb(r, g, b),
            [r, g, b, a] => Self::new(r, g, b, a),
            _ => return Err(invalid_hex(trimmed)),
        })
    }

    pub fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    pub fn from_rgba([r, g, b, a]: [u8; 4]) -> Self {
        Self::new(r, g, b, a)
    }

    pub fn is_transparent(self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(self) -> bool {
        self.a == u8::MAX
    }

    /// Largest per-channel difference to `other`, alpha included.
    ///
    /// Two fully transparent colours are always at distance zero regardless
    /// of their hidden RGB values.
    pub fn distance(self, other: Colour) -> u8 {
        if self.a == 0 && other.a == 0 {
            return 0;
        }
        let d = |a: u8, b: u8| a.abs_diff(b);
        d(self.r, other.r)
            .max(d(self.g, other.g))
            .max(d(self.b, other.b))
            .max(d(self.a, other.a))
    }

    /// Composite `self` over `dst` using the "over" operator, with the source
    /// alpha scaled by `opacity` (0.0..=1.0).
    pub fn over(self, dst: Colour, opacity: f32) -> Colour {
        let sa = (self.a as f32 / 255.0) * opacity.clamp(0.0, 1.0);
        if sa <= 0.0 {
            return dst;
        }
        let da = dst.a as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        if out_a <= 0.0 {
            return Colour::TRANSPARENT;
        }

        let channel = |s: u8, d: u8| {
            let v = (s as f32 * sa + d as f32 * da * (1.0 - sa)) / out_a;
            v.round().clamp(0.0, 255.0) as u8
        };

        Colour::new(
            channel(self.r, dst.r),
            channel(self.g, dst.g),
            channel(self.b, dst.b),
            (out_a * 255.0).round().clamp(0.0, 255.0) as u8,
        )
    }

    /// Convert to HSL (hue in degrees, saturation and lightness in 0..=1).
    pub fn to_hsl(self) -> (f32, f32, f32) {
        let rgb: Srgb<f32> = Srgb::new(
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        );
        let hsl: Hsl = rgb.into_color();
        (
            hsl.hue.into_positive_degrees(),
            hsl.saturation,
            hsl.lightness,
        )
    }

    /// Build a colour from HSL components, keeping the given alpha.
    pub fn from_hsl(hue: f32, saturation: f32, lightness: f32, alpha: u8) -> Self {
        let hsl = Hsl::new(
            hue.rem_euclid(360.0),
            saturation.clamp(0.0, 1.0),
            lightness.clamp(0.0, 1.0),
        );
        let rgb: Srgb<f32> = hsl.into_color();
        Colour::new(
            (rgb.red * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb.green * 255.0).round().clamp(0.0, 255.0) as u8,
            (rgb.blue * 255.0).round().clamp(0.0, 255.0) as u8,
            alpha,
        )
    }
}

impl FromStr for Colour {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl TryFrom<String> for Colour {
    type Error = EditError;

    fn try_from(s: String) -> Result<Self> {
        Self::from_hex(&s)
    }
}

impl From<Colour> for String {
    fn from(colour: Colour) -> Self {
        colour.to_string()
    }
}

impl From<image::Rgba<u8>> for Colour {
    fn from(px: image::Rgba<u8>) -> Self {
        Self::from_rgba(px.0)
    }
}

impl From<Colour> for image::Rgba<u8> {
    fn from(colour: Colour) -> Self {
        image::Rgba(colour.to_rgba())
    }
}

/// Uppercase hex, dropping the alpha pair when opaque.
impl fmt::Display for Colour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Colour { r, g, b, a } = *self;
        write!(f, "#{r:02X}{g:02X}{b:02X}")?;
        if a != u8::MAX {
            write!(f, "{a:02X}")?;
        }
        Ok(())
    }
}

fn invalid_hex(text: &str) -> EditError {
    EditError::Parse {
        message: format!("'{text}' is not a hex colour"),
        help: Some("Expected #RGB, #RGBA, #RRGGBB or #RRGGBBAA".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex_formats() {
        assert_eq!(Colour::from_hex("#FF0000").unwrap(), Colour::RED);
        assert_eq!(Colour::from_hex("#F00").unwrap(), Colour::RED);
        assert_eq!(
            Colour::from_hex("#F008").unwrap(),
            Colour::new(255, 0, 0, 0x88)
        );
        assert_eq!(
            Colour::from_hex("1a1a2e80").unwrap(),
            Colour::new(0x1a, 0x1a, 0x2e, 0x80)
        );
    }

    #[test]
    fn test_rejects_malformed_hex() {
        for bad in ["#GGG", "#12345", "", "#é12", "#ééé", "12zz56"] {
            assert!(Colour::from_hex(bad).is_err(), "{bad} parsed");
        }
    }

    #[test]
    fn test_display_drops_opaque_alpha() {
        assert_eq!(Colour::RED.to_string(), "#FF0000");
        assert_eq!(Colour::new(255, 0, 0, 128).to_string(), "#FF000080");
    }

    #[test]
    fn test_serde_as_hex() {
        let json = serde_json::to_string(&Colour::BLUE).unwrap();
        assert_eq!(json, "\"#0000FF\"");
        let back: Colour = serde_json::from_str("\"#00ff0080\"").unwrap();
        assert_eq!(back, Colour::new(0, 255, 0, 128));
    }

    #[test]
    fn test_distance() {
        assert_eq!(Colour::RED.distance(Colour::RED), 0);
        assert_eq!(Colour::RED.distance(Colour::rgb(250, 3, 0)), 5);
        assert_eq!(
            Colour::new(1, 2, 3, 0).distance(Colour::TRANSPARENT),
            0
        );
    }

    #[test]
    fn test_over_opaque_replaces() {
        assert_eq!(Colour::RED.over(Colour::BLUE, 1.0), Colour::RED);
    }

    #[test]
    fn test_over_transparent_keeps_destination() {
        assert_eq!(Colour::TRANSPARENT.over(Colour::BLUE, 1.0), Colour::BLUE);
        assert_eq!(Colour::RED.over(Colour::BLUE, 0.0), Colour::BLUE);
    }

    #[test]
    fn test_over_half_opacity() {
        let out = Colour::WHITE.over(Colour::BLACK, 0.5);
        assert_eq!(out, Colour::rgb(128, 128, 128));
    }

    #[test]
    fn test_over_onto_transparent() {
        let src = Colour::new(255, 0, 0, 128);
        assert_eq!(src.over(Colour::TRANSPARENT, 1.0), src);
    }

    #[test]
    fn test_hsl_round_trip() {
        let colour = Colour::rgb(200, 120, 40);
        let (h, s, l) = colour.to_hsl();
        assert_eq!(Colour::from_hsl(h, s, l, 255), colour);
    }
}
