//! Decoded wind vectors and the scalar quantities derived from them.

use serde::{Deserialize, Serialize};

/// Meters per second to knots.
pub const MS_TO_KNOTS: f32 = 1.94384;

/// Wind vector at a point, in m/s. `u` is eastward, `v` northward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct WindSample {
    pub u: f32,
    pub v: f32,
}

impl WindSample {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        speed(self.u, self.v)
    }

    #[inline]
    pub fn direction_degrees(&self) -> f32 {
        direction_degrees(self.u, self.v)
    }
}

/// Wind speed `sqrt(u² + v²)`.
#[inline]
pub fn speed(u: f32, v: f32) -> f32 {
    (u * u + v * v).sqrt()
}

/// Meteorological wind direction in degrees [0, 360): the compass bearing
/// the wind blows *from*, clockwise from north.
///
/// A southerly wind (`u = 0, v > 0`) reports 180, a westerly wind
/// (`u > 0, v = 0`) reports 270. Calm air has no bearing; the formula
/// yields 180 for it like any other input.
#[inline]
pub fn direction_degrees(u: f32, v: f32) -> f32 {
    ((-u).atan2(-v).to_degrees() + 360.0) % 360.0
}

#[inline]
pub fn ms_to_knots(ms: f32) -> f32 {
    ms * MS_TO_KNOTS
}
