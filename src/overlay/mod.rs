//! The wind overlay: field renderer, particle engine and viewport sync
//! composed into one owned handle.
//!
//! Host event handlers hold a `WindOverlay` and pass the host map in:
//!
//! ```no_run
//! use windmap::config::WindMapConfig;
//! use windmap::overlay::{StaticHostMap, WindOverlay};
//! use windmap::projection::ViewportBounds;
//!
//! let host = StaticHostMap::new(ViewportBounds::new(60.0, -60.0, 120.0, -120.0), 800, 400);
//! let mut overlay = WindOverlay::from_config(&WindMapConfig::default(), 800, 400)?;
//! overlay.on_viewport_changed(&host)?;
//! # Ok::<(), windmap::core::Error>(())
//! ```

pub mod host;
pub mod readout;
pub mod sync;
pub mod timeline;

use std::sync::Arc;
use std::time::Instant;

use glam::DVec2;
use log::info;

use crate::config::WindMapConfig;
use crate::core::{LatLon, Result};
use crate::field::{WindRaster, WindSample};
use crate::particles::{ParticleConfig, ParticleEngine, TickStats};
use crate::projection::{Projection, ViewportBounds};
use crate::render::{Canvas, DrawStats, FieldConfig, FieldRenderer};

pub use host::{HostMap, StaticHostMap};
pub use readout::{LegendEntry, WindReadout, legend_entries};
pub use sync::{SyncConfig, ViewportSync, ViewportUpdate};
pub use timeline::{TimelineFrame, WindTimeline};

pub struct WindOverlay {
    renderer: FieldRenderer,
    particles: Option<ParticleEngine>,
    sync: ViewportSync,
}

impl WindOverlay {
    /// Build the overlay for a `width` x `height` physical-pixel surface.
    /// Particles are disabled when `particles` is `None`.
    pub fn new(
        field: FieldConfig,
        particles: Option<ParticleConfig>,
        sync: SyncConfig,
        width: u32,
        height: u32,
    ) -> Result<Self> {
        sync.validate()?;
        let renderer = FieldRenderer::new(field, width, height)?;
        let particles = particles
            .map(|cfg| ParticleEngine::new(cfg, width, height))
            .transpose()?;
        Ok(Self {
            renderer,
            particles,
            sync: ViewportSync::new(sync),
        })
    }

    pub fn from_config(config: &WindMapConfig, width: u32, height: u32) -> Result<Self> {
        config.validate()?;
        let particles = config.particles_enabled.then(|| config.particles.clone());
        Self::new(config.field.clone(), particles, config.sync.clone(), width, height)
    }

    // -- host events -------------------------------------------------------

    /// Host map moved or resized: resync the projection, resize surfaces
    /// when needed and redraw the field.
    pub fn on_viewport_changed(&mut self, host: &dyn HostMap) -> Result<ViewportUpdate> {
        self.sync_with(Some(host))
    }

    /// Same as [`on_viewport_changed`](Self::on_viewport_changed) for
    /// callers whose host handle may not be attached yet.
    pub fn sync_with(&mut self, host: Option<&dyn HostMap>) -> Result<ViewportUpdate> {
        let update = self.sync.sync(host)?;
        if update.resized {
            let (w, h) = update.surface_size;
            info!("Overlay surface resized to {}x{}", w, h);
            self.resize_surfaces(w, h);
        }
        self.apply_viewport(update.bounds, update.projection);
        Ok(update)
    }

    /// Whether the mirrored bounds still match the host's.
    pub fn is_synchronized(&self, host: &dyn HostMap) -> bool {
        self.sync.is_synchronized(Some(host))
    }

    /// Resize both surfaces and redraw. The particle pool is reseeded.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.resize_surfaces(width, height);
        self.renderer.draw();
    }

    fn resize_surfaces(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        if let Some(engine) = &mut self.particles {
            engine.update_size(width, height);
        }
    }

    fn apply_viewport(&mut self, bounds: ViewportBounds, projection: Projection) {
        self.renderer.set_projection(projection);
        if let Some(engine) = &mut self.particles {
            engine.set_viewport(bounds, projection);
        }
        self.renderer.draw();
    }

    // -- commands ----------------------------------------------------------

    /// Bind a new timestep to the field and the particles, then redraw.
    pub fn set_wind(&mut self, wind: Arc<WindRaster>) {
        if let Some(engine) = &mut self.particles {
            engine.set_wind(wind.clone());
        }
        self.renderer.set_wind(wind);
        self.renderer.draw();
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.renderer.set_opacity(opacity);
        self.renderer.draw();
    }

    /// Set the transform directly instead of deriving it from host bounds.
    pub fn set_zoom(&mut self, zoom: f64, offset_x: f64, offset_y: f64) {
        let projection = Projection::new(zoom, offset_x, offset_y);
        let bounds = self.sync.set_projection(projection);
        self.apply_viewport(bounds, projection);
    }

    pub fn draw(&mut self) -> DrawStats {
        self.renderer.draw()
    }

    /// Host animation-frame callback; advances the particles when due.
    /// [`WindTimeline::frame`] wraps this with the playback clock.
    pub fn frame(&mut self, now: Instant) -> Option<TickStats> {
        self.particles.as_mut()?.frame(now)
    }

    pub fn start_particles(&mut self) {
        if let Some(engine) = &mut self.particles {
            engine.start();
        }
    }

    pub fn stop_particles(&mut self) {
        if let Some(engine) = &mut self.particles {
            engine.stop();
        }
    }

    // -- queries -----------------------------------------------------------

    pub fn max_wind_speed(&self) -> Option<f32> {
        self.renderer.max_wind_speed()
    }

    pub fn wind_at_point(&self, lat: f64, lon: f64) -> Option<WindSample> {
        self.renderer.wind_at_point(lat, lon)
    }

    /// Geographic coordinate under a container point (client pixels).
    pub fn pick(&self, host: Option<&dyn HostMap>, point: DVec2) -> LatLon {
        self.sync.screen_to_geo(host, point)
    }

    pub fn readout(&self, lat: f64, lon: f64) -> Option<WindReadout> {
        self.wind_at_point(lat, lon)
            .map(|sample| WindReadout::new(LatLon::new(lat, lon), sample))
    }

    /// Legend labels for the current ramp and field; empty with no wind.
    pub fn legend(&self) -> Vec<LegendEntry> {
        match self.max_wind_speed() {
            Some(max) => legend_entries(self.renderer.color_ramp().stops(), max),
            None => Vec::new(),
        }
    }

    /// Field and particle trails flattened into one image.
    pub fn composite(&self) -> Canvas {
        let mut out = self.renderer.canvas().clone();
        if let Some(engine) = &self.particles {
            out.composite_over(engine.canvas());
        }
        out
    }

    pub fn renderer(&self) -> &FieldRenderer {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut FieldRenderer {
        &mut self.renderer
    }

    pub fn particles(&self) -> Option<&ParticleEngine> {
        self.particles.as_ref()
    }

    pub fn sync(&self) -> &ViewportSync {
        &self.sync
    }
}
