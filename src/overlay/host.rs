//! Interface to the interactive map the overlay sits on.

use glam::DVec2;

use crate::core::LatLon;
use crate::projection::ViewportBounds;

/// The host map widget, as seen by the overlay.
pub trait HostMap {
    /// Currently visible geographic bounds.
    fn bounds(&self) -> ViewportBounds;

    /// Container size in client (CSS) pixels.
    fn canvas_size(&self) -> (u32, u32);

    /// Physical pixels per client pixel.
    fn device_pixel_ratio(&self) -> f64 {
        1.0
    }

    /// The host's own conversion from a container point to geographic
    /// coordinates. `None` means the overlay should use its internal mirror.
    fn container_point_to_geo(&self, _point: DVec2) -> Option<LatLon> {
        None
    }
}

/// Plain-value host for headless rendering and tests.
#[derive(Clone, Debug, PartialEq)]
pub struct StaticHostMap {
    pub bounds: ViewportBounds,
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl StaticHostMap {
    pub fn new(bounds: ViewportBounds, width: u32, height: u32) -> Self {
        Self { bounds, width, height, pixel_ratio: 1.0 }
    }

    pub fn with_pixel_ratio(mut self, ratio: f64) -> Self {
        self.pixel_ratio = ratio;
        self
    }

    /// Shift the view so that it is centered on `center`, keeping its span.
    pub fn pan_to(&mut self, center: LatLon) {
        let half_lat = self.bounds.lat_span() / 2.0;
        let half_lon = self.bounds.lon_span() / 2.0;
        self.bounds = ViewportBounds {
            north: center.lat + half_lat,
            south: center.lat - half_lat,
            east: center.lon + half_lon,
            west: center.lon - half_lon,
            center,
        };
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }
}

impl HostMap for StaticHostMap {
    fn bounds(&self) -> ViewportBounds {
        self.bounds
    }

    fn canvas_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn device_pixel_ratio(&self) -> f64 {
        self.pixel_ratio
    }
}
