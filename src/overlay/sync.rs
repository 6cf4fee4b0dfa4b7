//! Viewport sync bridge.
//!
//! Mirrors the host map's bounds and size, and recomputes the projection
//! the renderer and particle engine share. The projection is only ever
//! derived here, either from host bounds or from an explicit zoom/offset.

use glam::DVec2;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::core::{Error, LatLon, Result, ScreenRect};
use crate::overlay::host::HostMap;
use crate::projection::{Projection, ViewportBounds, ZoomPolicy, fit_projection};

/// Sync bridge settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub zoom_policy: ZoomPolicy,
    /// Bounds closer than this (degrees, per edge) count as synchronized
    pub tolerance: f64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            zoom_policy: ZoomPolicy::AspectFit,
            tolerance: 1e-5,
        }
    }
}

impl SyncConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.tolerance > 0.0) {
            return Err(Error::config(format!("sync tolerance {} must be positive", self.tolerance)));
        }
        Ok(())
    }
}

/// Result of a sync pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportUpdate {
    pub bounds: ViewportBounds,
    pub projection: Projection,
    /// Drawing surface size in physical pixels
    pub surface_size: (u32, u32),
    /// Whether the surface size changed since the previous sync
    pub resized: bool,
}

#[derive(Clone, Debug)]
pub struct ViewportSync {
    config: SyncConfig,
    bounds: Option<ViewportBounds>,
    projection: Projection,
    client_size: (u32, u32),
    surface_size: (u32, u32),
}

impl ViewportSync {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            bounds: None,
            projection: Projection::default(),
            client_size: (0, 0),
            surface_size: (0, 0),
        }
    }

    /// Pull bounds and size from the host and recompute the projection.
    pub fn sync(&mut self, host: Option<&dyn HostMap>) -> Result<ViewportUpdate> {
        let host = host.ok_or(Error::MissingHostMap)?;

        let (cw, ch) = host.canvas_size();
        let ratio = host.device_pixel_ratio();
        let ratio = if ratio.is_finite() && ratio > 0.0 { ratio } else { 1.0 };
        let surface = (
            ((cw as f64 * ratio).floor() as u32).max(1),
            ((ch as f64 * ratio).floor() as u32).max(1),
        );
        let resized = surface != self.surface_size;
        self.client_size = (cw, ch);
        self.surface_size = surface;

        let bounds = host.bounds();
        let aspect = surface.0 as f64 / surface.1 as f64;
        self.projection = fit_projection(&bounds, aspect, self.config.zoom_policy);
        self.bounds = Some(bounds);

        debug!(
            "Viewport sync: N{:.4} S{:.4} E{:.4} W{:.4} -> zoom {:.4}, offset ({:.4}, {:.4})",
            bounds.north,
            bounds.south,
            bounds.east,
            bounds.west,
            self.projection.zoom,
            self.projection.offset_x,
            self.projection.offset_y
        );

        Ok(ViewportUpdate {
            bounds,
            projection: self.projection,
            surface_size: surface,
            resized,
        })
    }

    /// Set the transform directly; the mirrored bounds become the area the
    /// transform shows.
    pub fn set_projection(&mut self, projection: Projection) -> ViewportBounds {
        self.projection = projection;
        let bounds = projection.visible_bounds();
        self.bounds = Some(bounds);
        bounds
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn bounds(&self) -> Option<&ViewportBounds> {
        self.bounds.as_ref()
    }

    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Whether the mirrored bounds match the host's within tolerance.
    pub fn is_synchronized(&self, host: Option<&dyn HostMap>) -> bool {
        match (host, &self.bounds) {
            (Some(host), Some(bounds)) => bounds.approx_eq(&host.bounds(), self.config.tolerance),
            _ => false,
        }
    }

    /// Geographic coordinate under a container point (client pixels). The
    /// host's own conversion wins when it offers one.
    pub fn screen_to_geo(&self, host: Option<&dyn HostMap>, point: DVec2) -> LatLon {
        if let Some(geo) = host.and_then(|h| h.container_point_to_geo(point)) {
            return geo;
        }
        self.projection.screen_to_geo(point, &self.client_rect())
    }

    /// Container point (client pixels) of a geographic coordinate.
    pub fn geo_to_screen(&self, geo: LatLon) -> DVec2 {
        self.projection.geo_to_screen(geo, &self.client_rect())
    }

    fn client_rect(&self) -> ScreenRect {
        let (w, h) = if self.client_size.0 == 0 || self.client_size.1 == 0 {
            self.surface_size
        } else {
            self.client_size
        };
        ScreenRect::from_size(w.max(1), h.max(1))
    }
}
