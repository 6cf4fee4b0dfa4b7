//! RGBA drawing surface for the CPU rasterizer.
//!
//! Pixels are straight (non-premultiplied) alpha. Shapes are composited
//! source-over, the same blend the browser canvas and the GPU pass use.

use std::path::Path;

use image::RgbaImage;

use crate::core::{Result, Rgba};

#[derive(Clone, Debug)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    /// Transparent canvas. Zero dimensions are bumped to 1.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width.max(1), height.max(1)),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width() && y < self.height()).then(|| Rgba(self.image.get_pixel(x, y).0))
    }

    /// Reallocate at a new size; contents are discarded.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.image.pixels_mut().for_each(|p| p.0 = [0; 4]);
    }

    /// Multiply every pixel's alpha by `factor`. Rounds down so that
    /// repeated fades reach full transparency.
    pub fn fade(&mut self, factor: f32) {
        let factor = factor.clamp(0.0, 1.0);
        for p in self.image.pixels_mut() {
            let a = p.0[3];
            if a != 0 {
                p.0[3] = (a as f32 * factor).floor() as u8;
                if p.0[3] == 0 {
                    p.0 = [0; 4];
                }
            }
        }
    }

    /// Composite `color` over the pixel at `(x, y)`; ignores points off
    /// the canvas.
    pub fn blend_pixel(&mut self, x: i64, y: i64, color: Rgba) {
        if x < 0 || y < 0 || x >= self.width() as i64 || y >= self.height() as i64 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        dst.0 = blend_over(color.0, dst.0);
    }

    /// Axis-aligned square of side `size` centered on `(cx, cy)`, the
    /// footprint of a GL point sprite. Always covers at least the pixel
    /// containing the center.
    pub fn fill_square(&mut self, cx: f64, cy: f64, size: f64, color: Rgba) {
        let half = size.max(0.0) / 2.0;
        let (x0, x1) = covered_span(cx, half);
        let (y0, y1) = covered_span(cy, half);
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.blend_pixel(x, y, color);
            }
        }
    }

    /// Filled disc of `radius` pixels centered on `(cx, cy)`. Pixels whose
    /// centers lie inside the disc are painted; a disc smaller than a pixel
    /// paints the pixel containing its center.
    pub fn fill_disc(&mut self, cx: f64, cy: f64, radius: f64, color: Rgba) {
        let r = radius.max(0.0);
        let (x0, x1) = covered_span(cx, r);
        let (y0, y1) = covered_span(cy, r);
        let mut painted = false;
        for y in y0..=y1 {
            for x in x0..=x1 {
                let dx = x as f64 + 0.5 - cx;
                let dy = y as f64 + 0.5 - cy;
                if dx * dx + dy * dy <= r * r {
                    self.blend_pixel(x, y, color);
                    painted = true;
                }
            }
        }
        if !painted {
            self.blend_pixel(cx.floor() as i64, cy.floor() as i64, color);
        }
    }

    /// Composite `top` over this canvas, aligned at the origin.
    pub fn composite_over(&mut self, top: &Canvas) {
        let w = self.width().min(top.width());
        let h = self.height().min(top.height());
        for y in 0..h {
            for x in 0..w {
                let src = top.image.get_pixel(x, y).0;
                if src[3] != 0 {
                    let dst = self.image.get_pixel_mut(x, y);
                    dst.0 = blend_over(src, dst.0);
                }
            }
        }
    }

    /// Number of pixels with non-zero alpha.
    pub fn coverage(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.image.save_with_format(path, image::ImageFormat::Png)?;
        Ok(())
    }
}

/// Inclusive pixel range whose centers fall within `center ± half`.
/// Collapses to the containing pixel when no center is covered.
fn covered_span(center: f64, half: f64) -> (i64, i64) {
    let lo = (center - half - 0.5).ceil() as i64;
    let hi = (center + half - 0.5).floor() as i64;
    if hi < lo {
        let c = center.floor() as i64;
        (c, c)
    } else {
        (lo, hi)
    }
}

/// Straight-alpha source-over.
fn blend_over(src: [u8; 4], dst: [u8; 4]) -> [u8; 4] {
    let sa = src[3] as f32 / 255.0;
    if sa >= 1.0 {
        return src;
    }
    if sa <= 0.0 {
        return dst;
    }
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    let mut out = [0u8; 4];
    for c in 0..3 {
        let v = (src[c] as f32 * sa + dst[c] as f32 * da * (1.0 - sa)) / out_a;
        out[c] = v.round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round() as u8;
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba = Rgba::new(255, 0, 0, 255);

    #[test]
    fn test_new_is_transparent() {
        let canvas = Canvas::new(8, 4);
        assert_eq!(canvas.coverage(), 0);
        assert_eq!(canvas.pixel(7, 3), Some(Rgba::TRANSPARENT));
        assert_eq!(canvas.pixel(8, 0), None);
        assert_eq!(Canvas::new(0, 0).width(), 1);
    }

    #[test]
    fn test_fill_square_footprint() {
        let mut canvas = Canvas::new(10, 10);
        canvas.fill_square(5.0, 5.0, 2.0, RED);
        assert_eq!(canvas.coverage(), 4);
        assert_eq!(canvas.pixel(4, 4), Some(RED));
        assert_eq!(canvas.pixel(5, 5), Some(RED));

        let mut tiny = Canvas::new(10, 10);
        tiny.fill_square(3.2, 3.7, 0.1, RED);
        assert_eq!(tiny.coverage(), 1);
        assert_eq!(tiny.pixel(3, 3), Some(RED));
    }

    #[test]
    fn test_fill_disc_clips_to_canvas() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_disc(0.0, 0.0, 3.0, RED);
        assert!(canvas.coverage() > 0);
        canvas.fill_disc(-50.0, -50.0, 1.0, RED);
        canvas.fill_disc(1.5, 1.5, 0.2, RED);
        assert_eq!(canvas.pixel(1, 1), Some(RED));
    }

    #[test]
    fn test_fade_reaches_zero() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_square(1.0, 1.0, 2.0, RED);
        canvas.fade(0.5);
        assert_eq!(canvas.pixel(0, 0).map(|c| c.0[3]), Some(127));
        for _ in 0..200 {
            canvas.fade(0.96);
        }
        assert_eq!(canvas.coverage(), 0);
    }

    #[test]
    fn test_blend_half_over_opaque() {
        let mut canvas = Canvas::new(1, 1);
        canvas.blend_pixel(0, 0, Rgba::new(0, 0, 255, 255));
        canvas.blend_pixel(0, 0, Rgba::new(255, 0, 0, 128));
        let p = canvas.pixel(0, 0).unwrap();
        assert_eq!(p.0[3], 255);
        assert!((p.0[0] as i32 - 128).abs() <= 1);
        assert!((p.0[2] as i32 - 127).abs() <= 1);
    }

    #[test]
    fn test_composite_over() {
        let mut base = Canvas::new(2, 1);
        base.blend_pixel(0, 0, Rgba::new(0, 0, 255, 255));
        let mut top = Canvas::new(3, 3);
        top.blend_pixel(1, 0, RED);
        base.composite_over(&top);
        assert_eq!(base.pixel(0, 0), Some(Rgba::new(0, 0, 255, 255)));
        assert_eq!(base.pixel(1, 0), Some(RED));
    }

    #[test]
    fn test_resize_discards() {
        let mut canvas = Canvas::new(4, 4);
        canvas.fill_square(2.0, 2.0, 4.0, RED);
        canvas.resize(6, 3);
        assert_eq!((canvas.width(), canvas.height()), (6, 3));
        assert_eq!(canvas.coverage(), 0);
    }

    #[test]
    fn test_save_png() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.png");
        let mut canvas = Canvas::new(3, 3);
        canvas.fill_square(1.5, 1.5, 1.0, RED);
        canvas.save_png(&path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(loaded.get_pixel(1, 1).0, RED.0);
    }
}
