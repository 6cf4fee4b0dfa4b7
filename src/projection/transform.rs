//! Zoom/offset transform between geographic, world, NDC and screen space.
//!
//! ```text
//! geo (lat, lon) --mercator--> world [-1,1]² --(w + offset) * zoom--> NDC --rect--> screen px
//! ```
//!
//! Every inverse below is the exact algebraic inverse of its forward
//! counterpart, so picking always agrees with what is drawn.

use glam::DVec2;

use crate::core::{LatLon, ScreenRect};
use crate::projection::mercator::{
    clamp_latitude, clamp_longitude, lon_to_x, mercator_lat, mercator_y, x_to_lon,
};
use crate::projection::viewport::ViewportBounds;

/// Smallest zoom a projection accepts.
pub const MIN_ZOOM: f64 = 1e-6;

/// The renderer's scale + translate transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Projection {
    pub zoom: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl Default for Projection {
    fn default() -> Self {
        Self { zoom: 1.0, offset_x: 0.0, offset_y: 0.0 }
    }
}

impl Projection {
    /// Build a transform; zoom is clamped to at least [`MIN_ZOOM`] and
    /// non-finite values fall back to the identity.
    pub fn new(zoom: f64, offset_x: f64, offset_y: f64) -> Self {
        let zoom = if zoom.is_finite() { zoom.max(MIN_ZOOM) } else { 1.0 };
        let finite_or_zero = |v: f64| if v.is_finite() { v } else { 0.0 };
        Self {
            zoom,
            offset_x: finite_or_zero(offset_x),
            offset_y: finite_or_zero(offset_y),
        }
    }

    /// Transform centered on `center` at `zoom`.
    pub fn centered_on(center: LatLon, zoom: f64) -> Self {
        Self::new(zoom, -lon_to_x(center.lon), -mercator_y(center.lat))
    }

    #[inline]
    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.offset_x, self.offset_y)
    }

    // -- geo <-> world ----------------------------------------------------

    #[inline]
    pub fn geo_to_world(&self, geo: LatLon) -> DVec2 {
        DVec2::new(lon_to_x(geo.lon), mercator_y(geo.lat))
    }

    #[inline]
    pub fn world_to_geo(&self, world: DVec2) -> LatLon {
        LatLon::new(mercator_lat(world.y), x_to_lon(world.x))
    }

    // -- world <-> NDC ----------------------------------------------------

    #[inline]
    pub fn world_to_ndc(&self, world: DVec2) -> DVec2 {
        (world + self.offset()) * self.zoom
    }

    #[inline]
    pub fn ndc_to_world(&self, ndc: DVec2) -> DVec2 {
        ndc / self.zoom - self.offset()
    }

    #[inline]
    pub fn geo_to_ndc(&self, geo: LatLon) -> DVec2 {
        self.world_to_ndc(self.geo_to_world(geo))
    }

    #[inline]
    pub fn ndc_to_geo(&self, ndc: DVec2) -> LatLon {
        self.world_to_geo(self.ndc_to_world(ndc))
    }

    // -- NDC <-> screen ---------------------------------------------------

    /// Screen pixel to NDC; y flips because screen y grows downward.
    #[inline]
    pub fn screen_to_ndc(point: DVec2, rect: &ScreenRect) -> DVec2 {
        DVec2::new(
            (point.x - rect.left) / rect.width * 2.0 - 1.0,
            -((point.y - rect.top) / rect.height * 2.0 - 1.0),
        )
    }

    #[inline]
    pub fn ndc_to_screen(ndc: DVec2, rect: &ScreenRect) -> DVec2 {
        DVec2::new(
            rect.left + (ndc.x + 1.0) * 0.5 * rect.width,
            rect.top + (1.0 - ndc.y) * 0.5 * rect.height,
        )
    }

    // -- screen <-> geo ---------------------------------------------------

    /// Geographic coordinate under a screen point. Results are clamped to
    /// the Mercator latitude limits and [-180, 180] longitude.
    pub fn screen_to_geo(&self, point: DVec2, rect: &ScreenRect) -> LatLon {
        self.ndc_to_geo(Self::screen_to_ndc(point, rect))
    }

    /// Screen point of a geographic coordinate (latitude clamped first).
    pub fn geo_to_screen(&self, geo: LatLon, rect: &ScreenRect) -> DVec2 {
        Self::ndc_to_screen(self.geo_to_ndc(geo), rect)
    }

    /// Geographic area currently covered by the full NDC square.
    pub fn visible_bounds(&self) -> ViewportBounds {
        let nw = self.ndc_to_geo(DVec2::new(-1.0, 1.0));
        let se = self.ndc_to_geo(DVec2::new(1.0, -1.0));
        let center = self.ndc_to_geo(DVec2::ZERO);
        ViewportBounds {
            north: clamp_latitude(nw.lat),
            south: clamp_latitude(se.lat),
            east: clamp_longitude(se.lon),
            west: clamp_longitude(nw.lon),
            center,
        }
    }
}
