//! Serializable colors for object fills and strokes.
//!
//! [`Rgba`] is what documents store. The `peniko::Color` conversions are for
//! renderers drawing a [`RenderSnapshot`](crate::canvas::RenderSnapshot); the
//! engine itself never goes through them.

use peniko::Color;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An RGBA8 color that serializes as a CSS hex string (`#rrggbb` / `#rrggbbaa`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub const fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub const fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS-style color: `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn parse(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }

        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let byte = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            3 => {
                let r = byte(&hex[0..1])? * 17;
                let g = byte(&hex[1..2])? * 17;
                let b = byte(&hex[2..3])? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                255,
            )),
            8 => Some(Self::new(
                byte(&hex[0..2])?,
                byte(&hex[2..4])?,
                byte(&hex[4..6])?,
                byte(&hex[6..8])?,
            )),
            _ => None,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a == 255 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid color: {value}"))
    }
}

impl From<Rgba> for String {
    fn from(color: Rgba) -> Self {
        color.to_string()
    }
}

impl From<Color> for Rgba {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self::new(rgba.r, rgba.g, rgba.b, rgba.a)
    }
}

impl From<Rgba> for Color {
    fn from(color: Rgba) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_short_hex() {
        assert_eq!(Rgba::parse("#fff"), Some(Rgba::white()));
        assert_eq!(Rgba::parse("#f00"), Some(Rgba::new(255, 0, 0, 255)));
    }

    #[test]
    fn test_parse_long_hex() {
        assert_eq!(Rgba::parse("#1e90ff"), Some(Rgba::new(0x1e, 0x90, 0xff, 255)));
        assert_eq!(Rgba::parse("#00000080"), Some(Rgba::new(0, 0, 0, 0x80)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(Rgba::parse("red"), None);
        assert_eq!(Rgba::parse("#12"), None);
        assert_eq!(Rgba::parse("#zzzzzz"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Rgba::new(255, 0, 0, 255).to_string(), "#ff0000");
        assert_eq!(Rgba::transparent().to_string(), "#00000000");
    }

    #[test]
    fn test_serde_as_hex_string() {
        let json = serde_json::to_string(&Rgba::new(16, 32, 48, 255)).unwrap();
        assert_eq!(json, "\"#102030\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Rgba::new(16, 32, 48, 255));
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_peniko_conversion() {
        let color = Rgba::new(10, 20, 30, 40);
        let peniko: Color = color.into();
        assert_eq!(Rgba::from(peniko), color);
    }
}
