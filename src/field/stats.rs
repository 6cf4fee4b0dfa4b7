//! Channel statistics of a wind raster.
//!
//! Reports the raw red/green code range actually used by a timestep and the
//! physical U/V range those codes decode to. Handy when checking that an
//! encoder used its declared bounds.

use crate::field::raster::WindRaster;

/// Inclusive min/max pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Range<T> {
    pub min: T,
    pub max: T,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RasterStats {
    pub red: Range<u8>,
    pub green: Range<u8>,
    /// Decoded U range in m/s
    pub u: Range<f32>,
    /// Decoded V range in m/s
    pub v: Range<f32>,
}

impl RasterStats {
    pub fn analyze(raster: &WindRaster) -> Self {
        let mut red = Range { min: u8::MAX, max: u8::MIN };
        let mut green = Range { min: u8::MAX, max: u8::MIN };

        for p in raster.image().pixels() {
            red.min = red.min.min(p[0]);
            red.max = red.max.max(p[0]);
            green.min = green.min.min(p[1]);
            green.max = green.max.max(p[1]);
        }

        let b = raster.bounds();
        let lo = b.decode_channels(red.min as f32, green.min as f32);
        let hi = b.decode_channels(red.max as f32, green.max as f32);

        Self {
            red,
            green,
            u: Range { min: lo.u, max: hi.u },
            v: Range { min: lo.v, max: hi.v },
        }
    }
}
