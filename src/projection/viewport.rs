//! Host viewport bounds and the zoom/offset fit derived from them.

use serde::{Deserialize, Serialize};

use crate::core::LatLon;
use crate::projection::mercator::{clamp_latitude, clamp_longitude};
use crate::projection::transform::Projection;

/// Spans narrower than this (degrees) are treated as this wide.
const MIN_SPAN_DEG: f64 = 1e-9;

/// Visible geographic extent reported by the host map.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub north: f64,
    pub south: f64,
    pub east: f64,
    pub west: f64,
    pub center: LatLon,
}

impl ViewportBounds {
    /// Bounds with the center at the midpoint of the box.
    pub fn new(north: f64, south: f64, east: f64, west: f64) -> Self {
        Self {
            north,
            south,
            east,
            west,
            center: LatLon::new((north + south) / 2.0, (east + west) / 2.0),
        }
    }

    /// Whole Mercator world.
    pub fn world() -> Self {
        Self::new(
            crate::projection::MAX_LATITUDE,
            -crate::projection::MAX_LATITUDE,
            180.0,
            -180.0,
        )
    }

    #[inline]
    pub fn lon_span(&self) -> f64 {
        self.east - self.west
    }

    #[inline]
    pub fn lat_span(&self) -> f64 {
        self.north - self.south
    }

    pub fn contains(&self, p: LatLon) -> bool {
        p.lat <= self.north && p.lat >= self.south && p.lon <= self.east && p.lon >= self.west
    }

    /// Same bounds clipped to the projectable world.
    pub fn clamped(&self) -> Self {
        Self {
            north: clamp_latitude(self.north),
            south: clamp_latitude(self.south),
            east: clamp_longitude(self.east),
            west: clamp_longitude(self.west),
            center: LatLon::new(clamp_latitude(self.center.lat), clamp_longitude(self.center.lon)),
        }
    }

    /// Edge-wise comparison within `tolerance` degrees.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        (self.north - other.north).abs() < tolerance
            && (self.south - other.south).abs() < tolerance
            && (self.east - other.east).abs() < tolerance
            && (self.west - other.west).abs() < tolerance
    }
}

/// How the zoom factor is fit to the host's bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomPolicy {
    /// Fit one axis, chosen by comparing canvas and bounds aspect ratios.
    #[default]
    AspectFit,
    /// `min(360 / lon_span, 180 / lat_span)`.
    IndependentAxis,
}

/// Zoom/offset transform that shows `bounds` on a canvas with aspect
/// ratio `canvas_aspect` (width / height).
///
/// The offset always centers on `bounds.center`: `offset_x = -lon/180`,
/// `offset_y = -mercator_y(lat)`.
pub fn fit_projection(bounds: &ViewportBounds, canvas_aspect: f64, policy: ZoomPolicy) -> Projection {
    let lon_span = bounds.lon_span().abs().max(MIN_SPAN_DEG);
    let lat_span = bounds.lat_span().abs().max(MIN_SPAN_DEG);

    let zoom = match policy {
        ZoomPolicy::AspectFit => {
            let bounds_aspect = lon_span / lat_span;
            if canvas_aspect > bounds_aspect {
                180.0 / lat_span
            } else {
                360.0 / lon_span
            }
        }
        ZoomPolicy::IndependentAxis => (360.0 / lon_span).min(180.0 / lat_span),
    };

    Projection::centered_on(bounds.center, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn centered_quarter() -> ViewportBounds {
        ViewportBounds {
            north: 45.0,
            south: -45.0,
            east: 90.0,
            west: -90.0,
            center: LatLon::new(0.0, 0.0),
        }
    }

    #[test]
    fn test_centered_bounds_scenario() {
        for policy in [ZoomPolicy::AspectFit, ZoomPolicy::IndependentAxis] {
            for aspect in [0.5, 1.0, 2.0, 3.0] {
                let p = fit_projection(&centered_quarter(), aspect, policy);
                assert!((p.zoom - 2.0).abs() < 1e-12, "{policy:?} aspect {aspect}: zoom {}", p.zoom);
                assert_eq!(p.offset_x, 0.0);
                assert_eq!(p.offset_y, 0.0);
            }
        }
    }

    #[test]
    fn test_aspect_fit_picks_axis() {
        // 60° wide, 60° tall
        let b = ViewportBounds::new(30.0, -30.0, 30.0, -30.0);
        let wide = fit_projection(&b, 2.0, ZoomPolicy::AspectFit);
        assert!((wide.zoom - 3.0).abs() < 1e-12); // 180/60
        let tall = fit_projection(&b, 0.5, ZoomPolicy::AspectFit);
        assert!((tall.zoom - 6.0).abs() < 1e-12); // 360/60
    }

    #[test]
    fn test_independent_axis_takes_min() {
        let b = ViewportBounds::new(30.0, -30.0, 30.0, -30.0);
        let p = fit_projection(&b, 1.0, ZoomPolicy::IndependentAxis);
        assert!((p.zoom - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_offset_signs() {
        let mut b = ViewportBounds::new(50.0, 10.0, 40.0, 0.0);
        b.center = LatLon::new(30.0, 20.0);
        let p = fit_projection(&b, 1.0, ZoomPolicy::AspectFit);
        assert!((p.offset_x + 20.0 / 180.0).abs() < 1e-12);
        assert!(p.offset_y < 0.0);
        assert!((p.offset_y + crate::projection::mercator_y(30.0)).abs() < 1e-12);
    }

    #[test]
    fn test_degenerate_bounds_stay_finite() {
        let b = ViewportBounds::new(10.0, 10.0, 5.0, 5.0);
        let p = fit_projection(&b, 1.5, ZoomPolicy::AspectFit);
        assert!(p.zoom.is_finite() && p.zoom > 0.0);
    }

    #[test]
    fn test_approx_eq_and_contains() {
        let a = ViewportBounds::new(10.0, -10.0, 20.0, -20.0);
        let mut b = a;
        b.north += 1e-7;
        assert!(a.approx_eq(&b, 1e-5));
        b.north += 1e-3;
        assert!(!a.approx_eq(&b, 1e-5));
        assert!(a.contains(LatLon::new(0.0, 0.0)));
        assert!(!a.contains(LatLon::new(11.0, 0.0)));
    }
}
