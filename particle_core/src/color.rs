//! Linear RGB colours for particles.
//!
//! Channels are `f32` in `0.0..=1.0`.  Colours arrive as `#rrggbb` text from
//! the CLI / config file and leave as packed `0x00RRGGBB` for the framebuffer.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Rgb
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0.0, 0.0, 0.0);
    pub const WHITE: Rgb = Rgb::new(1.0, 1.0, 1.0);
    pub const CYAN:  Rgb = Rgb::new(0.0, 1.0, 1.0);

    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Rgb { r, g, b }
    }

    /// Build from a packed `0xRRGGBB` value (upper byte ignored).
    pub fn from_hex(hex: u32) -> Self {
        let ch = |shift: u32| ((hex >> shift) & 0xFF) as f32 / 255.0;
        Rgb::new(ch(16), ch(8), ch(0))
    }

    /// Convert HSV (hue in degrees) to RGB.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let h  = h.rem_euclid(360.0);
        let hi = (h / 60.0) as u32;
        let f  = h / 60.0 - hi as f32;
        let p  = v * (1.0 - s);
        let q  = v * (1.0 - s * f);
        let t  = v * (1.0 - s * (1.0 - f));
        let (r, g, b) = match hi {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Rgb::new(r, g, b)
    }

    /// Hue in degrees (0 for greys).
    pub fn hue(&self) -> f32 {
        let max = self.r.max(self.g).max(self.b);
        let min = self.r.min(self.g).min(self.b);
        let delta = max - min;
        if delta <= f32::EPSILON {
            return 0.0;
        }
        let h = if max == self.r {
            60.0 * ((self.g - self.b) / delta)
        } else if max == self.g {
            60.0 * ((self.b - self.r) / delta + 2.0)
        } else {
            60.0 * ((self.r - self.g) / delta + 4.0)
        };
        h.rem_euclid(360.0)
    }

    /// Every channel multiplied by `k`.
    pub fn scaled(&self, k: f32) -> Self {
        Rgb::new(self.r * k, self.g * k, self.b * k)
    }

    /// Pack into `0x00RRGGBB`, clamping each channel.
    pub fn to_packed(&self) -> u32 {
        let q = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u32;
        (q(self.r) << 16) | (q(self.g) << 8) | q(self.b)
    }
}

impl Default for Rgb {
    fn default() -> Self { Rgb::CYAN }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.to_packed())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Parsing
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorParseError {
    #[error("expected 6 hex digits, got {0:?}")]
    Length(String),
    #[error("invalid hex colour {0:?}")]
    Digits(String),
}

impl FromStr for Rgb {
    type Err = ColorParseError;

    /// Accepts `#rrggbb`, `0xrrggbb` or bare `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('#')
            .or_else(|| trimmed.strip_prefix("0x"))
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        if digits.len() != 6 {
            return Err(ColorParseError::Length(s.to_string()));
        }
        let hex = u32::from_str_radix(digits, 16)
            .map_err(|_| ColorParseError::Digits(s.to_string()))?;
        Ok(Rgb::from_hex(hex))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parse_hash_prefixed() {
        let c: Rgb = "#00ffff".parse().unwrap();
        assert_eq!(c, Rgb::CYAN);
    }

    #[test]
    fn parse_bare_and_0x() {
        let a: Rgb = "ff8000".parse().unwrap();
        let b: Rgb = "0xFF8000".parse().unwrap();
        assert_eq!(a, b);
        assert_relative_eq!(a.g, 128.0 / 255.0);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert_eq!(
            "#fff".parse::<Rgb>(),
            Err(ColorParseError::Length("#fff".to_string()))
        );
        assert!(matches!("#gg0000".parse::<Rgb>(), Err(ColorParseError::Digits(_))));
    }

    #[test]
    fn packed_roundtrips_display() {
        let c = Rgb::from_hex(0x12ab9f);
        assert_eq!(c.to_packed(), 0x12ab9f);
        assert_eq!(c.to_string(), "#12ab9f");
    }

    #[test]
    fn packed_clamps_overbright() {
        assert_eq!(Rgb::new(2.0, -1.0, 0.5).to_packed(), 0xFF0080);
    }

    #[test]
    fn hsv_primaries() {
        assert_eq!(Rgb::from_hsv(0.0, 1.0, 1.0).to_packed(), 0xFF0000);
        assert_eq!(Rgb::from_hsv(120.0, 1.0, 1.0).to_packed(), 0x00FF00);
        assert_eq!(Rgb::from_hsv(480.0, 1.0, 1.0).to_packed(), 0x00FF00);
    }

    #[test]
    fn hue_of_cyan() {
        assert_relative_eq!(Rgb::CYAN.hue(), 180.0);
        assert_relative_eq!(Rgb::WHITE.hue(), 0.0);
    }
}
