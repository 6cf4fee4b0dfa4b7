//! Particle advection engine.
//!
//! Particles live in canvas pixel space. Each tick fades the trail buffer,
//! moves every particle by the wind under it and draws it as a disc.
//! Particles never die: a particle with no wind under it, one that loses
//! the per-tick respawn draw, or one that leaves the canvas is respawned in
//! place at a random point of the visible geographic area. Independent
//! random attrition keeps density stationary without synchronized pulses.

use std::sync::Arc;
use std::time::Instant;

use glam::{DVec2, Vec2};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::time::FrameGate;
use crate::core::{LatLon, Result, ScreenRect};
use crate::field::{WindRaster, speed_to_normalized};
use crate::particles::config::ParticleConfig;
use crate::particles::pool::{Particle, ParticlePool};
use crate::projection::{Projection, ViewportBounds};
use crate::render::Canvas;

/// Per-tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickStats {
    pub moved: usize,
    pub respawned: usize,
}

pub struct ParticleEngine {
    config: ParticleConfig,
    pool: ParticlePool,
    canvas: Canvas,
    wind: Option<Arc<WindRaster>>,
    bounds: Option<ViewportBounds>,
    projection: Projection,
    gate: FrameGate,
    rng: StdRng,
    running: bool,
}

impl ParticleEngine {
    /// Create an engine with a `width` x `height` trail canvas and a freshly
    /// seeded pool.
    pub fn new(config: ParticleConfig, width: u32, height: u32) -> Result<Self> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let mut engine = Self {
            gate: FrameGate::new(config.target_fps),
            config,
            pool: ParticlePool::new(),
            canvas: Canvas::new(width, height),
            wind: None,
            bounds: None,
            projection: Projection::default(),
            rng,
            running: false,
        };
        engine.init_particles();
        Ok(engine)
    }

    // -- configuration -----------------------------------------------------

    pub fn set_wind(&mut self, wind: Arc<WindRaster>) {
        self.wind = Some(wind);
    }

    /// Adopt a new viewport. Trails drawn under the old transform are
    /// cleared; particles stay put and redistribute through attrition.
    pub fn set_viewport(&mut self, bounds: ViewportBounds, projection: Projection) {
        self.bounds = Some(bounds);
        self.projection = projection;
        self.clear_trails();
    }

    /// Resize the pool; triggers a full reinitialization.
    pub fn set_num_particles(&mut self, count: usize) {
        self.config.num_particles = count;
        self.init_particles();
    }

    /// Resize the trail canvas and reseed the pool for the new dimensions.
    pub fn update_size(&mut self, width: u32, height: u32) {
        self.canvas.resize(width, height);
        self.init_particles();
    }

    /// Clear the pool and refill it uniformly over the visible area.
    pub fn init_particles(&mut self) {
        let rect = self.rect();
        let bounds = self.bounds;
        let projection = self.projection;
        let rng = &mut self.rng;
        self.pool.refill(self.config.num_particles, || {
            spawn_position(rng, bounds.as_ref(), &projection, &rect)
        });
        debug!("Particle pool seeded with {} particles", self.pool.len());
    }

    pub fn clear_trails(&mut self) {
        self.canvas.clear();
    }

    // -- lifecycle ---------------------------------------------------------

    /// Reseed the pool and enable ticking from [`frame`](Self::frame).
    pub fn start(&mut self) {
        self.init_particles();
        self.gate.reset();
        self.running = true;
        info!("Particle animation started ({} particles)", self.pool.len());
    }

    pub fn stop(&mut self) {
        if self.running {
            info!("Particle animation stopped");
        }
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Host frame callback: ticks when running and the frame gate allows.
    pub fn frame(&mut self, now: Instant) -> Option<TickStats> {
        if self.running && self.gate.ready(now) {
            Some(self.tick())
        } else {
            None
        }
    }

    /// One ungated simulation step. With no wind bound only the fade runs.
    pub fn tick(&mut self) -> TickStats {
        self.canvas.fade(self.config.fade_opacity);

        let mut stats = TickStats::default();
        let Some(wind) = self.wind.clone() else {
            return stats;
        };

        let rect = self.rect();
        let max_speed = wind.max_speed();
        let speed_factor = self.config.speed_factor;

        for i in 0..self.pool.len() {
            let p = self.pool.as_slice()[i];
            let geo = self
                .projection
                .screen_to_geo(DVec2::new(p.x as f64, p.y as f64), &rect);

            let next = wind.sample_at(geo.lat, geo.lon).and_then(|s| {
                let speed_t = speed_to_normalized(s.speed(), max_speed);
                if self.rng.random::<f32>() < self.config.drop_threshold(speed_t) {
                    return None;
                }
                let moved = Particle {
                    x: p.x + s.u * speed_factor,
                    y: p.y - s.v * speed_factor,
                    age: p.age.saturating_add(1),
                };
                rect.contains(DVec2::new(moved.x as f64, moved.y as f64)).then_some(moved)
            });

            match next {
                Some(moved) => {
                    self.pool.as_mut_slice()[i] = moved;
                    stats.moved += 1;
                }
                None => {
                    let pos = spawn_position(&mut self.rng, self.bounds.as_ref(), &self.projection, &rect);
                    self.pool.respawn(i, pos);
                    stats.respawned += 1;
                }
            }
        }

        let radius = self.config.particle_size as f64;
        let color = self.config.particle_color;
        for p in self.pool.iter() {
            self.canvas.fill_disc(p.x as f64, p.y as f64, radius, color);
        }

        stats
    }

    // -- accessors ---------------------------------------------------------

    pub fn particles(&self) -> &[Particle] {
        self.pool.as_slice()
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn bounds(&self) -> Option<&ViewportBounds> {
        self.bounds.as_ref()
    }

    fn rect(&self) -> ScreenRect {
        ScreenRect::from_size(self.canvas.width(), self.canvas.height())
    }
}

/// Random pixel position inside the visible geographic area, uniform in
/// latitude and longitude. Falls back to a uniform canvas point when no
/// bounds are known or the projected point lands off the canvas.
fn spawn_position(
    rng: &mut StdRng,
    bounds: Option<&ViewportBounds>,
    projection: &Projection,
    rect: &ScreenRect,
) -> Vec2 {
    if let Some(b) = bounds.map(ViewportBounds::clamped) {
        let lat = b.south + rng.random::<f64>() * (b.north - b.south);
        let lon = b.west + rng.random::<f64>() * (b.east - b.west);
        let p = projection.geo_to_screen(LatLon::new(lat, lon), rect);
        if rect.contains(p) {
            return p.as_vec2();
        }
    }
    Vec2::new(
        (rect.left + rng.random::<f64>() * rect.width) as f32,
        (rect.top + rng.random::<f64>() * rect.height) as f32,
    )
}
