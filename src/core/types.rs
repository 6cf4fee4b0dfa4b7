//! Core value types and re-exports

use serde::{Deserialize, Serialize};

pub use glam::DVec2;

/// Standard Result type for the crate
pub type Result<T> = std::result::Result<T, crate::core::error::Error>;

// ---------------------------------------------------------------------------
// LatLon
// ---------------------------------------------------------------------------

/// Geographic coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

// ---------------------------------------------------------------------------
// ScreenRect
// ---------------------------------------------------------------------------

/// Pixel rectangle of a drawing surface, relative to whatever space the
/// caller's points live in (client coordinates, or the canvas itself with a
/// zero origin).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScreenRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ScreenRect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// Rect for a canvas of `width` x `height` pixels with its origin at 0,0.
    pub fn from_size(width: u32, height: u32) -> Self {
        Self::new(0.0, 0.0, width as f64, height as f64)
    }

    #[inline]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.left
            && p.x < self.left + self.width
            && p.y >= self.top
            && p.y < self.top + self.height
    }

    #[inline]
    pub fn aspect(&self) -> f64 {
        if self.height > 0.0 { self.width / self.height } else { 1.0 }
    }
}

// ---------------------------------------------------------------------------
// Rgba
// ---------------------------------------------------------------------------

/// 8-bit straight-alpha RGBA color. Serialized as a `#rrggbb` or
/// `#rrggbbaa` hex string.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);
    pub const WHITE: Rgba = Rgba([255, 255, 255, 255]);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [255u8; 4];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self(out))
            }
            6 => Some(Self([byte(0)?, byte(2)?, byte(4)?, 255])),
            8 => Some(Self([byte(0)?, byte(2)?, byte(4)?, byte(6)?])),
            _ => None,
        }
    }

    pub fn to_hex(&self) -> String {
        let [r, g, b, a] = self.0;
        if a == 255 {
            format!("#{r:02x}{g:02x}{b:02x}")
        } else {
            format!("#{r:02x}{g:02x}{b:02x}{a:02x}")
        }
    }

    /// Same color with alpha scaled by `factor` (clamped to [0,1]).
    pub fn with_alpha_scaled(self, factor: f32) -> Self {
        let [r, g, b, a] = self.0;
        let a = (a as f32 * factor.clamp(0.0, 1.0)).round() as u8;
        Self([r, g, b, a])
    }

    /// Channels as floats in [0,1].
    pub fn to_f32(self) -> [f32; 4] {
        self.0.map(|c| c as f32 / 255.0)
    }

    /// Inverse of [`to_f32`](Self::to_f32), rounding to the nearest byte.
    pub fn from_f32(c: [f32; 4]) -> Self {
        Self(c.map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8))
    }
}

impl Serialize for Rgba {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgba {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parse() {
        assert_eq!(Rgba::from_hex("#3288bd"), Some(Rgba::new(0x32, 0x88, 0xbd, 255)));
        assert_eq!(Rgba::from_hex("ffffff80"), Some(Rgba::new(255, 255, 255, 0x80)));
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::WHITE));
        assert_eq!(Rgba::from_hex("#12345"), None);
        assert_eq!(Rgba::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_hex_serde() {
        let c = Rgba::new(0xd5, 0x3e, 0x4f, 255);
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#d53e4f\"");
        let back: Rgba = serde_json::from_str(&json).unwrap();
        assert_eq!(back, c);
        assert!(serde_json::from_str::<Rgba>("\"nope\"").is_err());
    }

    #[test]
    fn test_rect_contains() {
        let rect = ScreenRect::from_size(100, 50);
        assert!(rect.contains(DVec2::new(0.0, 0.0)));
        assert!(rect.contains(DVec2::new(99.9, 49.9)));
        assert!(!rect.contains(DVec2::new(100.0, 10.0)));
        assert!(!rect.contains(DVec2::new(-0.1, 10.0)));
        assert!((rect.aspect() - 2.0).abs() < 1e-12);
    }
}
