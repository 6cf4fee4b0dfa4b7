//! Wind speed field renderer.
//!
//! A fixed grid of points covers the globe in normalized raster space. Each
//! frame every point is placed through the Mercator projection and the
//! current zoom/offset, and colored by the ramp at its bilinearly sampled
//! speed. Texture coordinates and draw positions are computed independently:
//! one in raster (equirectangular) space, one in Mercator space.

use std::sync::Arc;

use glam::DVec2;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::{Error, LatLon, Result, ScreenRect};
use crate::field::{ColorRamp, RampTable, WindRaster, WindSample, speed_to_normalized};
use crate::projection::{Projection, clamp_latitude};
use crate::render::canvas::Canvas;
use crate::render::uniforms::{FieldUniforms, FieldVertex};

/// Field renderer settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    /// Grid columns (>= 2)
    pub grid_res_x: u32,
    /// Grid rows (>= 2)
    pub grid_res_y: u32,
    pub color_ramp: ColorRamp,
    /// Global alpha multiplier in [0,1]
    pub opacity: f32,
    /// Point size floor in pixels
    pub point_base_size: f32,
    /// Zoom multiplier applied to the point size
    pub point_zoom_factor: f32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            grid_res_x: 1440,
            grid_res_y: 720,
            color_ramp: ColorRamp::default(),
            opacity: 0.8,
            point_base_size: 2.0,
            point_zoom_factor: 1.5,
        }
    }
}

impl FieldConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_res_x < 2 || self.grid_res_y < 2 {
            return Err(Error::config(format!(
                "field grid must be at least 2x2, got {}x{}",
                self.grid_res_x, self.grid_res_y
            )));
        }
        if !(self.point_base_size > 0.0) || !self.point_zoom_factor.is_finite() {
            return Err(Error::config("field point size must be positive and finite"));
        }
        if !self.opacity.is_finite() {
            return Err(Error::config("field opacity must be finite"));
        }
        Ok(())
    }
}

/// Outcome of one [`FieldRenderer::draw`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DrawStats {
    /// Grid points considered
    pub points_total: usize,
    /// Points whose footprint touched the canvas
    pub points_drawn: usize,
    /// Largest point size used this frame
    pub max_point_size: f32,
}

pub type PostDrawHook = Box<dyn FnMut(&Canvas, &DrawStats)>;
pub type WindUpdateHook = Box<dyn FnMut(&WindRaster)>;

/// Point-grid renderer for the wind speed field.
pub struct FieldRenderer {
    config: FieldConfig,
    vertices: Vec<FieldVertex>,
    ramp: RampTable,
    wind: Option<Arc<WindRaster>>,
    projection: Projection,
    opacity: f32,
    canvas: Canvas,
    post_draw_hooks: Vec<PostDrawHook>,
    wind_update_hooks: Vec<WindUpdateHook>,
}

impl FieldRenderer {
    /// Build the grid and ramp table for a `width` x `height` surface.
    pub fn new(config: FieldConfig, width: u32, height: u32) -> Result<Self> {
        config.validate()?;
        let vertices = build_grid(config.grid_res_x, config.grid_res_y);
        let ramp = config.color_ramp.build();
        let opacity = config.opacity.clamp(0.0, 1.0);

        info!(
            "Field renderer: {}x{} grid ({} points), {}x{} surface",
            config.grid_res_x,
            config.grid_res_y,
            vertices.len(),
            width,
            height
        );

        Ok(Self {
            config,
            vertices,
            ramp,
            wind: None,
            projection: Projection::default(),
            opacity,
            canvas: Canvas::new(width, height),
            post_draw_hooks: Vec::new(),
            wind_update_hooks: Vec::new(),
        })
    }

    // -- state -------------------------------------------------------------

    /// Bind a new timestep. Wind-update hooks run after the swap.
    pub fn set_wind(&mut self, wind: Arc<WindRaster>) {
        debug!(
            "Field wind bound: {}x{}, max speed {:.2} m/s",
            wind.width(),
            wind.height(),
            wind.max_speed()
        );
        self.wind = Some(wind);
        if let Some(wind) = &self.wind {
            for hook in &mut self.wind_update_hooks {
                hook(wind);
            }
        }
    }

    pub fn wind(&self) -> Option<&Arc<WindRaster>> {
        self.wind.as_ref()
    }

    pub fn set_zoom(&mut self, zoom: f64, offset_x: f64, offset_y: f64) {
        self.projection = Projection::new(zoom, offset_x, offset_y);
    }

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Set the global alpha, clamped to [0,1].
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 0.0 } else { opacity.clamp(0.0, 1.0) };
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_color_ramp(&mut self, ramp: ColorRamp) {
        self.ramp = ramp.build();
        self.config.color_ramp = ramp;
    }

    pub fn color_ramp(&self) -> &ColorRamp {
        &self.config.color_ramp
    }

    pub fn ramp_table(&self) -> &RampTable {
        &self.ramp
    }

    /// Resize the drawing surface; contents are discarded until the next draw.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn vertices(&self) -> &[FieldVertex] {
        &self.vertices
    }

    /// Uniform block for the current frame, `None` with no wind bound.
    pub fn uniforms(&self) -> Option<FieldUniforms> {
        self.wind.as_ref().map(|w| {
            FieldUniforms::new(
                w.bounds(),
                &self.projection,
                self.opacity,
                self.config.point_base_size,
                self.config.point_zoom_factor,
            )
        })
    }

    // -- hooks -------------------------------------------------------------

    /// Run `hook` after every draw with the finished surface.
    pub fn add_post_draw_hook(&mut self, hook: impl FnMut(&Canvas, &DrawStats) + 'static) {
        self.post_draw_hooks.push(Box::new(hook));
    }

    /// Run `hook` every time a new wind raster is bound.
    pub fn add_wind_update_hook(&mut self, hook: impl FnMut(&WindRaster) + 'static) {
        self.wind_update_hooks.push(Box::new(hook));
    }

    // -- queries -----------------------------------------------------------

    /// Upper-bound speed of the bound field, `None` with no wind bound.
    pub fn max_wind_speed(&self) -> Option<f32> {
        self.wind.as_ref().map(|w| w.max_speed())
    }

    pub fn wind_at_point(&self, lat: f64, lon: f64) -> Option<WindSample> {
        self.wind.as_ref()?.sample_at(lat, lon)
    }

    /// Geographic coordinate of a grid vertex.
    pub fn vertex_geo(v: FieldVertex) -> LatLon {
        LatLon::new(90.0 - 180.0 * v.pos[1] as f64, -180.0 + 360.0 * v.pos[0] as f64)
    }

    /// Pixel position of a grid vertex under the current projection.
    pub fn vertex_screen_position(&self, v: FieldVertex) -> DVec2 {
        let geo = Self::vertex_geo(v);
        let clamped = LatLon::new(clamp_latitude(geo.lat), geo.lon);
        let rect = ScreenRect::from_size(self.canvas.width(), self.canvas.height());
        self.projection.geo_to_screen(clamped, &rect)
    }

    /// Point size in pixels at latitude `lat`. Shrinks toward the poles to
    /// offset Mercator area inflation, never below the base size.
    pub fn point_size(&self, lat: f64) -> f32 {
        let base = self.config.point_base_size;
        let lat_scale = 2.0 * lat.to_radians().cos() as f32;
        let scaled = base * self.projection.zoom as f32 * lat_scale * self.config.point_zoom_factor;
        base.max(scaled)
    }

    // -- drawing -----------------------------------------------------------

    /// Clear the surface and draw the field. Idempotent for unchanged state.
    pub fn draw(&mut self) -> DrawStats {
        self.canvas.clear();
        let mut stats = DrawStats {
            points_total: self.vertices.len(),
            ..Default::default()
        };

        if let Some(wind) = self.wind.clone() {
            let max_speed = wind.max_speed();
            let width = self.canvas.width() as f64;
            let height = self.canvas.height() as f64;

            for i in 0..self.vertices.len() {
                let v = self.vertices[i];
                let lat = Self::vertex_geo(v).lat;
                let size = self.point_size(lat);
                let pos = self.vertex_screen_position(v);

                let half = size as f64 / 2.0;
                if pos.x + half < 0.0 || pos.y + half < 0.0 || pos.x - half > width || pos.y - half > height {
                    continue;
                }

                let sample = wind.sample_bilinear(v.pos[0], v.pos[1]);
                let t = speed_to_normalized(sample.speed(), max_speed);
                let color = self.ramp.lookup(t).with_alpha_scaled(self.opacity);
                if color.0[3] == 0 {
                    continue;
                }

                self.canvas.fill_square(pos.x, pos.y, size as f64, color);
                stats.points_drawn += 1;
                stats.max_point_size = stats.max_point_size.max(size);
            }
        }

        debug!(
            "Field draw: {}/{} points, zoom {:.3}",
            stats.points_drawn, stats.points_total, self.projection.zoom
        );

        for hook in &mut self.post_draw_hooks {
            hook(&self.canvas, &stats);
        }
        stats
    }
}

/// Row-major grid, `x = j/(res_x-1)`, `y = i/(res_y-1)` with `y = 0` north.
fn build_grid(res_x: u32, res_y: u32) -> Vec<FieldVertex> {
    let mut vertices = Vec::with_capacity(res_x as usize * res_y as usize);
    for i in 0..res_y {
        for j in 0..res_x {
            vertices.push(FieldVertex::new(
                j as f32 / (res_x - 1) as f32,
                i as f32 / (res_y - 1) as f32,
            ));
        }
    }
    vertices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Rgba;
    use crate::field::WindBounds;
    use crate::field::raster::tests::uniform_raster;
    use crate::projection::mercator_y;
    use std::cell::Cell;
    use std::rc::Rc;

    fn small_config() -> FieldConfig {
        FieldConfig {
            grid_res_x: 64,
            grid_res_y: 32,
            opacity: 1.0,
            ..Default::default()
        }
    }

    fn symmetric() -> WindBounds {
        WindBounds::new(-10.0, 10.0, -10.0, 10.0)
    }

    #[test]
    fn test_rejects_tiny_grid() {
        let config = FieldConfig { grid_res_x: 1, ..small_config() };
        assert!(matches!(FieldRenderer::new(config, 10, 10), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_grid_layout() {
        let r = FieldRenderer::new(small_config(), 10, 10).unwrap();
        let v = r.vertices();
        assert_eq!(v.len(), 64 * 32);
        assert_eq!(v[0].pos, [0.0, 0.0]);
        assert_eq!(v[63].pos, [1.0, 0.0]);
        assert_eq!(v[v.len() - 1].pos, [1.0, 1.0]);
        let nw = FieldRenderer::vertex_geo(v[0]);
        assert_eq!((nw.lat, nw.lon), (90.0, -180.0));
    }

    #[test]
    fn test_draw_without_wind_is_clear() {
        let mut r = FieldRenderer::new(small_config(), 32, 32).unwrap();
        let stats = r.draw();
        assert_eq!(stats.points_drawn, 0);
        assert_eq!(r.canvas().coverage(), 0);
        assert!(r.uniforms().is_none());
        assert!(r.max_wind_speed().is_none());
    }

    #[test]
    fn test_draw_colors_by_speed() {
        let mut r = FieldRenderer::new(small_config(), 64, 64).unwrap();
        // u = 10, v ~ 0.04
        let wind = Arc::new(uniform_raster(8, 4, 255, 128, symmetric()));
        let expected_t = speed_to_normalized(wind.decode(0, 0).unwrap().speed(), wind.max_speed());
        let expected = r.ramp_table().lookup(expected_t);
        r.set_wind(wind);
        let stats = r.draw();
        assert!(stats.points_drawn > 0);
        assert_eq!(r.canvas().pixel(32, 32), Some(expected));
    }

    #[test]
    fn test_draw_is_idempotent() {
        let mut r = FieldRenderer::new(small_config(), 48, 32).unwrap();
        r.set_opacity(0.6);
        r.set_zoom(1.7, 0.1, -0.2);
        r.set_wind(Arc::new(uniform_raster(8, 4, 200, 30, symmetric())));
        let first = r.draw();
        let a = r.canvas().image().clone();
        let second = r.draw();
        assert_eq!(first, second);
        assert_eq!(&a, r.canvas().image());
    }

    #[test]
    fn test_vertices_placed_in_mercator() {
        let r = FieldRenderer::new(small_config(), 100, 100).unwrap();
        // y = 1/6 is latitude 60
        let pos = r.vertex_screen_position(FieldVertex::new(0.5, 1.0 / 6.0));
        let expected_y = (1.0 - mercator_y(60.0)) * 0.5 * 100.0;
        assert!((pos.y - expected_y).abs() < 1e-3, "y {} vs {}", pos.y, expected_y);
        assert!((pos.x - 50.0).abs() < 1e-3);
        // Poles clamp to the edges of the Mercator square
        let north = r.vertex_screen_position(FieldVertex::new(0.0, 0.0));
        assert!(north.y.abs() < 1e-3);
    }

    #[test]
    fn test_point_size() {
        let mut r = FieldRenderer::new(small_config(), 10, 10).unwrap();
        assert!((r.point_size(0.0) - 6.0).abs() < 1e-5);
        assert_eq!(r.point_size(90.0), 2.0);
        r.set_zoom(0.1, 0.0, 0.0);
        assert_eq!(r.point_size(0.0), 2.0);
        r.set_zoom(4.0, 0.0, 0.0);
        assert!((r.point_size(60.0) - 12.0).abs() < 1e-4);
    }

    #[test]
    fn test_opacity_clamped_and_applied() {
        let mut r = FieldRenderer::new(small_config(), 16, 16).unwrap();
        r.set_opacity(3.0);
        assert_eq!(r.opacity(), 1.0);
        r.set_opacity(-1.0);
        assert_eq!(r.opacity(), 0.0);
        r.set_wind(Arc::new(uniform_raster(4, 2, 10, 10, symmetric())));
        let stats = r.draw();
        assert_eq!(stats.points_drawn, 0);
        assert_eq!(r.canvas().coverage(), 0);
    }

    #[test]
    fn test_hooks_run() {
        let mut r = FieldRenderer::new(small_config(), 16, 16).unwrap();
        let draws = Rc::new(Cell::new(0));
        let winds = Rc::new(Cell::new(0));
        {
            let draws = draws.clone();
            r.add_post_draw_hook(move |canvas, stats| {
                assert_eq!(canvas.width(), 16);
                assert_eq!(stats.points_total, 64 * 32);
                draws.set(draws.get() + 1);
            });
            let winds = winds.clone();
            r.add_wind_update_hook(move |w| {
                assert_eq!(w.width(), 4);
                winds.set(winds.get() + 1);
            });
        }
        r.draw();
        r.set_wind(Arc::new(uniform_raster(4, 2, 0, 0, symmetric())));
        r.draw();
        assert_eq!(draws.get(), 2);
        assert_eq!(winds.get(), 1);
    }

    #[test]
    fn test_wind_hook_sees_bound_raster() {
        let mut r = FieldRenderer::new(small_config(), 8, 8).unwrap();
        let seen = Rc::new(Cell::new(0usize));
        {
            let seen = seen.clone();
            r.add_wind_update_hook(move |w| seen.set(w as *const WindRaster as usize));
        }
        r.set_wind(Arc::new(uniform_raster(4, 2, 0, 0, symmetric())));
        let bound = Arc::as_ptr(r.wind().unwrap()) as usize;
        assert_eq!(seen.get(), bound);
    }

    #[test]
    fn test_set_color_ramp_rebuilds_table() {
        let mut r = FieldRenderer::new(small_config(), 8, 8).unwrap();
        let red = Rgba::new(255, 0, 0, 255);
        r.set_color_ramp(ColorRamp::constant(red));
        assert_eq!(r.ramp_table().lookup(0.3), red);
        assert_eq!(r.color_ramp().stops().len(), 1);
    }

    #[test]
    fn test_queries() {
        let mut r = FieldRenderer::new(small_config(), 8, 8).unwrap();
        assert!(r.wind_at_point(0.0, 0.0).is_none());
        r.set_wind(Arc::new(uniform_raster(36, 18, 255, 0, symmetric())));
        let s = r.wind_at_point(10.0, 20.0).unwrap();
        assert!((s.u - 10.0).abs() < 1e-4);
        assert!((s.v + 10.0).abs() < 1e-4);
        assert!(r.wind_at_point(91.0, 0.0).is_none());
        assert!((r.max_wind_speed().unwrap() - 200f32.sqrt()).abs() < 1e-4);
    }
}
