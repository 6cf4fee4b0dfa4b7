//! Spherical (Web) Mercator helpers.
//!
//! Normalized draw space ("world") is the square [-1,1]²: `x = lon/180`,
//! `y = ln(tan(π/4 + lat·π/360)) / π`. The square's top and bottom edges sit
//! at ±[`MAX_LATITUDE`], the standard Web Mercator clamp.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

/// Latitude at which the Mercator world becomes square.
pub const MAX_LATITUDE: f64 = 85.051129;

/// Clamp a latitude into the projectable range.
#[inline]
pub fn clamp_latitude(lat: f64) -> f64 {
    lat.clamp(-MAX_LATITUDE, MAX_LATITUDE)
}

/// Clamp a longitude into [-180, 180].
#[inline]
pub fn clamp_longitude(lon: f64) -> f64 {
    lon.clamp(-180.0, 180.0)
}

/// Forward Mercator: latitude in degrees to normalized world y in [-1,1].
#[inline]
pub fn mercator_y(lat: f64) -> f64 {
    let lat = clamp_latitude(lat);
    (FRAC_PI_4 + lat * PI / 360.0).tan().ln() / PI
}

/// Inverse Mercator: normalized world y to latitude in degrees.
///
/// `y` is clamped to [-1,1] first, so the result never exceeds
/// ±[`MAX_LATITUDE`].
#[inline]
pub fn mercator_lat(y: f64) -> f64 {
    let y = y.clamp(-1.0, 1.0);
    clamp_latitude((2.0 * (y * PI).exp().atan() - FRAC_PI_2).to_degrees())
}

#[inline]
pub fn lon_to_x(lon: f64) -> f64 {
    clamp_longitude(lon) / 180.0
}

#[inline]
pub fn x_to_lon(x: f64) -> f64 {
    clamp_longitude(x * 180.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_and_limits() {
        assert!(mercator_y(0.0).abs() < 1e-12);
        assert!((mercator_y(MAX_LATITUDE) - 1.0).abs() < 1e-6);
        assert!((mercator_y(-MAX_LATITUDE) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_round_trip_latitudes() {
        let mut lat = -85.05;
        while lat < 85.05 {
            let back = mercator_lat(mercator_y(lat));
            assert!((back - lat).abs() < 1e-6, "lat {lat} -> {back}");
            lat += 0.37;
        }
    }

    #[test]
    fn test_clamps_beyond_limit() {
        assert_eq!(mercator_y(89.0), mercator_y(MAX_LATITUDE));
        assert_eq!(mercator_y(-120.0), mercator_y(-MAX_LATITUDE));
        assert!(mercator_lat(5.0) <= MAX_LATITUDE);
        assert!(mercator_lat(-5.0) >= -MAX_LATITUDE);
    }

    #[test]
    fn test_mercator_is_not_linear() {
        // Most of the square's height goes to the high latitudes
        assert!(mercator_y(60.0) > 0.4 && mercator_y(60.0) < 0.5);
        assert!(mercator_y(60.0) < 60.0 / MAX_LATITUDE);
    }

    #[test]
    fn test_longitude_mapping() {
        assert_eq!(lon_to_x(90.0), 0.5);
        assert_eq!(x_to_lon(-1.0), -180.0);
        assert_eq!(x_to_lon(2.0), 180.0);
    }
}
