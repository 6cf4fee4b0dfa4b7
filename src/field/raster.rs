//! Wind raster: an RGBA8 image whose red and green channels encode the U and
//! V wind components, linearly scaled over per-timestep bounds.
//!
//! The raster is stored equirectangular: column 0 is longitude -180, row 0 is
//! latitude +90, both axes linear in degrees.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::field::sample::WindSample;

/// Physical range covered by the 0..=255 channel encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindBounds {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
}

impl WindBounds {
    pub const fn new(u_min: f32, u_max: f32, v_min: f32, v_max: f32) -> Self {
        Self { u_min, u_max, v_min, v_max }
    }

    /// Upper bound on the speed any pixel can decode to.
    pub fn max_speed(&self) -> f32 {
        let max_u = self.u_min.abs().max(self.u_max.abs());
        let max_v = self.v_min.abs().max(self.v_max.abs());
        (max_u * max_u + max_v * max_v).sqrt()
    }

    /// Decode raw channel values (as floats in 0..=255).
    #[inline]
    pub fn decode_channels(&self, r: f32, g: f32) -> WindSample {
        WindSample {
            u: self.u_min + (r / 255.0) * (self.u_max - self.u_min),
            v: self.v_min + (g / 255.0) * (self.v_max - self.v_min),
        }
    }

    fn validate(&self) -> Result<()> {
        let all = [self.u_min, self.u_max, self.v_min, self.v_max];
        if all.iter().any(|v| !v.is_finite()) {
            return Err(Error::config(format!("non-finite wind bounds {self:?}")));
        }
        Ok(())
    }
}

/// Immutable decoded forecast timestep.
#[derive(Clone, Debug)]
pub struct WindRaster {
    image: RgbaImage,
    bounds: WindBounds,
}

impl WindRaster {
    /// Wrap a decoded image. Fails on an empty image or non-finite bounds.
    pub fn new(image: RgbaImage, bounds: WindBounds) -> Result<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(Error::config("wind raster has zero size"));
        }
        bounds.validate()?;
        Ok(Self { image, bounds })
    }

    /// Build from raw RGBA8 bytes, row-major from the north-west corner.
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<u8>, bounds: WindBounds) -> Result<Self> {
        let image = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
            Error::config(format!("pixel buffer does not match {width}x{height} RGBA8"))
        })?;
        Self::new(image, bounds)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn bounds(&self) -> &WindBounds {
        &self.bounds
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Raw RGBA8 bytes for texture upload.
    pub fn texture_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    /// Upper bound on the field's speed, used to normalize the color ramp.
    pub fn max_speed(&self) -> f32 {
        self.bounds.max_speed()
    }

    /// Decode the pixel at `(px, py)`; `None` outside the raster.
    pub fn decode(&self, px: i64, py: i64) -> Option<WindSample> {
        if px < 0 || py < 0 || px >= self.width() as i64 || py >= self.height() as i64 {
            return None;
        }
        let p = self.image.get_pixel(px as u32, py as u32);
        Some(self.bounds.decode_channels(p[0] as f32, p[1] as f32))
    }

    /// Pixel coordinate holding `(lat, lon)`, which may lie outside the raster.
    pub fn pixel_for(&self, lat: f64, lon: f64) -> Option<(i64, i64)> {
        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }
        let px = ((lon + 180.0) / 360.0 * self.width() as f64).floor() as i64;
        let py = ((90.0 - lat) / 180.0 * self.height() as f64).floor() as i64;
        Some((px, py))
    }

    /// Nearest-pixel wind at a geographic coordinate; `None` when the
    /// coordinate maps outside the raster.
    pub fn sample_at(&self, lat: f64, lon: f64) -> Option<WindSample> {
        let (px, py) = self.pixel_for(lat, lon)?;
        self.decode(px, py)
    }

    /// Bilinearly filtered wind at normalized texture coordinate `(tx, ty)`,
    /// matching a GPU linear sampler with clamp-to-edge addressing.
    pub fn sample_bilinear(&self, tx: f32, ty: f32) -> WindSample {
        let w = self.width() as i64;
        let h = self.height() as i64;
        let fx = tx * w as f32 - 0.5;
        let fy = ty * h as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let ax = fx - x0;
        let ay = fy - y0;

        let texel = |x: i64, y: i64| {
            let p = self.image.get_pixel(x.clamp(0, w - 1) as u32, y.clamp(0, h - 1) as u32);
            [p[0] as f32, p[1] as f32]
        };
        let (x0, y0) = (x0 as i64, y0 as i64);
        let t00 = texel(x0, y0);
        let t10 = texel(x0 + 1, y0);
        let t01 = texel(x0, y0 + 1);
        let t11 = texel(x0 + 1, y0 + 1);

        let mix = |c: usize| {
            let top = t00[c] + (t10[c] - t00[c]) * ax;
            let bottom = t01[c] + (t11[c] - t01[c]) * ax;
            top + (bottom - top) * ay
        };
        self.bounds.decode_channels(mix(0), mix(1))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::Rgba;

    /// Raster filled with one channel pair.
    pub(crate) fn uniform_raster(width: u32, height: u32, r: u8, g: u8, bounds: WindBounds) -> WindRaster {
        let image = RgbaImage::from_pixel(width, height, Rgba([r, g, 0, 255]));
        WindRaster::new(image, bounds).unwrap()
    }

    fn symmetric() -> WindBounds {
        WindBounds::new(-10.0, 10.0, -10.0, 10.0)
    }

    #[test]
    fn test_reference_pixel_scenario() {
        // -10 + (128/255) * 20 = 0.0392 on both axes, just above the midpoint
        let raster = uniform_raster(4, 2, 128, 128, symmetric());
        let s = raster.decode(0, 0).unwrap();
        assert!((s.u - 0.0392).abs() < 1e-3, "u = {}", s.u);
        assert!((s.v - 0.0392).abs() < 1e-3, "v = {}", s.v);
        assert!((s.speed() - 0.0555).abs() < 1e-3, "speed = {}", s.speed());
        // One code below the midpoint flips the sign
        let below = uniform_raster(1, 1, 127, 127, symmetric()).decode(0, 0).unwrap();
        assert!((below.u + 0.0392).abs() < 1e-3);
    }

    #[test]
    fn test_decode_endpoints_and_monotone() {
        let bounds = WindBounds::new(-20.0, 30.0, -5.0, 5.0);
        let mut prev = f32::NEG_INFINITY;
        for r in 0..=255u8 {
            let raster = uniform_raster(1, 1, r, 0, bounds);
            let u = raster.decode(0, 0).unwrap().u;
            assert!(u >= prev, "u not monotone at r={r}");
            prev = u;
            if r == 0 {
                assert_eq!(u, -20.0);
            }
            if r == 255 {
                assert!((u - 30.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn test_decode_out_of_bounds() {
        let raster = uniform_raster(4, 2, 0, 0, symmetric());
        assert!(raster.decode(-1, 0).is_none());
        assert!(raster.decode(4, 0).is_none());
        assert!(raster.decode(0, 2).is_none());
        assert!(raster.decode(3, 1).is_some());
    }

    #[test]
    fn test_sample_at_boundaries() {
        let raster = uniform_raster(360, 180, 10, 20, symmetric());
        assert!(raster.sample_at(90.0 + 1e-6, 0.0).is_none());
        assert!(raster.sample_at(-90.0, 0.0).is_none());
        assert!(raster.sample_at(0.0, 180.0 + 1e-6).is_none());
        assert!(raster.sample_at(0.0, -180.0 - 1e-6).is_none());
        assert!(raster.sample_at(90.0, -180.0).is_some());
        assert!(raster.sample_at(0.0, 179.999).is_some());
        assert!(raster.sample_at(f64::NAN, 0.0).is_none());
    }

    #[test]
    fn test_sample_at_pixel_mapping() {
        // Distinct red per column so the mapping is observable
        let mut image = RgbaImage::new(4, 2);
        for (x, _y, p) in image.enumerate_pixels_mut() {
            *p = Rgba([(x * 50) as u8, 0, 0, 255]);
        }
        let raster = WindRaster::new(image, WindBounds::new(0.0, 255.0, 0.0, 1.0)).unwrap();
        assert_eq!(raster.pixel_for(45.0, -180.0), Some((0, 0)));
        assert_eq!(raster.pixel_for(-45.0, 100.0), Some((3, 1)));
        assert!((raster.sample_at(0.0, -10.0).unwrap().u - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_bilinear_between_texels() {
        let mut image = RgbaImage::new(2, 1);
        image.put_pixel(0, 0, Rgba([0, 0, 0, 255]));
        image.put_pixel(1, 0, Rgba([255, 0, 0, 255]));
        let raster = WindRaster::new(image, WindBounds::new(0.0, 10.0, 0.0, 0.0)).unwrap();
        // Texel centers sit at 0.25 and 0.75
        assert!((raster.sample_bilinear(0.25, 0.5).u - 0.0).abs() < 1e-4);
        assert!((raster.sample_bilinear(0.75, 0.5).u - 10.0).abs() < 1e-4);
        assert!((raster.sample_bilinear(0.5, 0.5).u - 5.0).abs() < 1e-4);
        // Clamp to edge
        assert!((raster.sample_bilinear(0.0, 0.0).u - 0.0).abs() < 1e-4);
        assert!((raster.sample_bilinear(1.0, 1.0).u - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_max_speed_bound() {
        let bounds = WindBounds::new(-30.0, 20.0, -40.0, 10.0);
        assert!((bounds.max_speed() - 50.0).abs() < 1e-4);
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(WindRaster::new(RgbaImage::new(0, 4), WindBounds::default()).is_err());
        assert!(WindRaster::from_rgba(2, 2, vec![0; 3], WindBounds::default()).is_err());
        let nan = WindBounds::new(f32::NAN, 1.0, 0.0, 1.0);
        assert!(WindRaster::new(RgbaImage::new(1, 1), nan).is_err());
    }

    #[test]
    fn test_bounds_json_names() {
        let json = r#"{"uMin":-21.3,"uMax":26.8,"vMin":-21.3,"vMax":21.4}"#;
        let b: WindBounds = serde_json::from_str(json).unwrap();
        assert_eq!(b.u_max, 26.8);
        assert_eq!(b.v_min, -21.3);
    }
}
