//! Speed-to-color ramp.
//!
//! [`ColorRamp`] holds `(stop, color)` keys over the normalized speed range
//! [0,1]. It is rasterized once per change into a [`RampTable`] of
//! [`RAMP_SIZE`] entries, the same 1-D lookup the field shader samples and
//! the legend reads.

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result, Rgba};

/// Number of entries in a rasterized ramp table.
pub const RAMP_SIZE: usize = 256;

// ---------------------------------------------------------------------------
// Lerp trait
// ---------------------------------------------------------------------------

/// Trait for types that can be linearly interpolated.
pub trait Lerp: Clone {
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for [f32; 4] {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        [
            self[0] + (other[0] - self[0]) * t,
            self[1] + (other[1] - self[1]) * t,
            self[2] + (other[2] - self[2]) * t,
            self[3] + (other[3] - self[3]) * t,
        ]
    }
}

impl Lerp for Rgba {
    #[inline]
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Rgba::from_f32(self.to_f32().lerp(&other.to_f32(), t))
    }
}

// ---------------------------------------------------------------------------
// ColorRamp
// ---------------------------------------------------------------------------

/// One control point of a [`ColorRamp`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    pub stop: f32,
    pub color: Rgba,
}

impl ColorStop {
    pub const fn new(stop: f32, color: Rgba) -> Self {
        Self { stop, color }
    }
}

/// Ordered color stops over [0,1].
///
/// Sampling before the first stop or after the last returns the endpoint
/// color; between stops colors are interpolated linearly in RGBA.
#[derive(Clone, Debug, PartialEq)]
pub struct ColorRamp {
    stops: Vec<ColorStop>,
}

impl ColorRamp {
    /// Build a ramp, validating that there is at least one stop, that every
    /// stop lies in [0,1] and that stops strictly increase.
    pub fn new(stops: Vec<ColorStop>) -> Result<Self> {
        if stops.is_empty() {
            return Err(Error::config("color ramp needs at least one stop"));
        }
        for s in &stops {
            if !(0.0..=1.0).contains(&s.stop) {
                return Err(Error::config(format!("color stop {} outside [0,1]", s.stop)));
            }
        }
        for pair in stops.windows(2) {
            if pair[1].stop <= pair[0].stop {
                return Err(Error::config(format!(
                    "color stops must strictly increase ({} then {})",
                    pair[0].stop, pair[1].stop
                )));
            }
        }
        Ok(Self { stops })
    }

    /// Build from `(stop, hex color)` pairs.
    pub fn from_hex(stops: &[(f32, &str)]) -> Result<Self> {
        let stops = stops
            .iter()
            .map(|&(stop, hex)| {
                Rgba::from_hex(hex)
                    .map(|color| ColorStop::new(stop, color))
                    .ok_or_else(|| Error::config(format!("invalid color '{hex}'")))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(stops)
    }

    /// Create a ramp that always returns the same color.
    pub fn constant(color: Rgba) -> Self {
        Self {
            stops: vec![ColorStop::new(0.0, color)],
        }
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    /// Sample the ramp at normalized position `t`.
    pub fn sample(&self, t: f32) -> Rgba {
        let first = self.stops[0];
        let last = self.stops[self.stops.len() - 1];
        if t.is_nan() || t <= first.stop {
            return first.color;
        }
        if t >= last.stop {
            return last.color;
        }

        // First stop strictly above t; exists because t < last.stop
        let upper = self.stops.iter().position(|s| s.stop > t).unwrap_or(self.stops.len() - 1);
        let a = self.stops[upper - 1];
        let b = self.stops[upper];
        let frac = (t - a.stop) / (b.stop - a.stop);
        a.color.lerp(&b.color, frac)
    }

    /// Rasterize into a [`RAMP_SIZE`]-entry lookup table.
    pub fn build(&self) -> RampTable {
        let mut entries = [Rgba::TRANSPARENT; RAMP_SIZE];
        for (i, entry) in entries.iter_mut().enumerate() {
            *entry = self.sample(i as f32 / (RAMP_SIZE - 1) as f32);
        }
        RampTable { entries }
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        Self {
            stops: vec![
                ColorStop::new(0.0, Rgba::new(0x32, 0x88, 0xbd, 255)),
                ColorStop::new(0.1, Rgba::new(0x66, 0xc2, 0xa5, 255)),
                ColorStop::new(0.2, Rgba::new(0xab, 0xdd, 0xa4, 255)),
                ColorStop::new(0.3, Rgba::new(0xe6, 0xf5, 0x98, 255)),
                ColorStop::new(0.4, Rgba::new(0xfe, 0xe0, 0x8b, 255)),
                ColorStop::new(0.5, Rgba::new(0xfd, 0xae, 0x61, 255)),
                ColorStop::new(0.6, Rgba::new(0xf4, 0x6d, 0x43, 255)),
                ColorStop::new(1.0, Rgba::new(0xd5, 0x3e, 0x4f, 255)),
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// Serde support
// ---------------------------------------------------------------------------

impl Serialize for ColorRamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.stops.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ColorRamp {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let stops = Vec::<ColorStop>::deserialize(deserializer)?;
        Self::new(stops).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// RampTable
// ---------------------------------------------------------------------------

/// Rasterized ramp, one entry per 1/255 of normalized speed.
#[derive(Clone, Debug, PartialEq)]
pub struct RampTable {
    entries: [Rgba; RAMP_SIZE],
}

impl RampTable {
    /// Nearest entry for normalized position `t` (clamped to [0,1]).
    #[inline]
    pub fn lookup(&self, t: f32) -> Rgba {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        let idx = (t * (RAMP_SIZE - 1) as f32).round() as usize;
        self.entries[idx.min(RAMP_SIZE - 1)]
    }

    pub fn entries(&self) -> &[Rgba; RAMP_SIZE] {
        &self.entries
    }

    /// RGBA8 bytes laid out as a `RAMP_SIZE` x 1 texture.
    pub fn as_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|c| c.0).collect()
    }
}

/// `clamp(speed / max_speed, 0, 1)`; zero when `max_speed` is not positive.
#[inline]
pub fn speed_to_normalized(speed: f32, max_speed: f32) -> f32 {
    if max_speed <= 0.0 || !max_speed.is_finite() {
        return 0.0;
    }
    (speed / max_speed).clamp(0.0, 1.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
