//! Forecast timeline: the playback clock wired to the loader and the overlay.
//!
//! One [`WindTimeline::frame`] call per host animation frame runs both
//! clocks: playback advances request the next timestep, completed loads are
//! bound to the overlay, and the particle gate ticks. A failed load leaves
//! the last good raster bound.

use std::time::{Duration, Instant};

use log::{info, warn};

use crate::config::WindMapConfig;
use crate::core::{Error, Result};
use crate::overlay::WindOverlay;
use crate::particles::TickStats;
use crate::streaming::{
    AssetSource, FsAssetSource, LoadEvent, PlaybackConfig, TimestepId, TimestepLoader,
    TimestepPlayback,
};

/// What happened during one frame.
#[derive(Debug, Default)]
pub struct TimelineFrame {
    /// Timestep requested because playback advanced
    pub requested: Option<TimestepId>,
    /// Timestep whose raster was bound this frame
    pub loaded: Option<TimestepId>,
    /// Load failure of the latest request; the previous raster stays bound
    pub failed: Option<Error>,
    pub particles: Option<TickStats>,
}

pub struct WindTimeline<S: AssetSource> {
    playback: TimestepPlayback,
    loader: TimestepLoader<S>,
    bound: Option<TimestepId>,
}

impl WindTimeline<FsAssetSource> {
    /// Timeline over the configured timesteps, read from `asset_dir`.
    pub fn from_config(config: &WindMapConfig) -> Result<Self> {
        Self::new(config.playback.clone(), FsAssetSource::new(&config.asset_dir))
    }
}

impl<S: AssetSource> WindTimeline<S> {
    pub fn new(config: PlaybackConfig, source: S) -> Result<Self> {
        Ok(Self {
            playback: TimestepPlayback::new(config)?,
            loader: TimestepLoader::new(source)?,
            bound: None,
        })
    }

    /// Request the current timestep unless it is already bound.
    pub fn load_current(&mut self) -> Option<u64> {
        let current = self.playback.current().clone();
        if self.bound.as_ref() == Some(&current) && !self.loader.is_pending() {
            return None;
        }
        Some(self.loader.request(current))
    }

    /// Start playback at `now`, fetching the current step if needed.
    pub fn play(&mut self, now: Instant) {
        self.playback.play(now);
        self.load_current();
    }

    /// Stop playback and abandon the in-flight fetch.
    pub fn pause(&mut self) {
        self.playback.pause();
        if self.loader.is_pending() {
            info!("Playback paused, cancelling pending load");
        }
        self.loader.cancel();
    }

    /// Jump to `index` and fetch it. `None` when out of range.
    pub fn seek(&mut self, index: usize) -> Option<TimestepId> {
        let id = self.playback.seek(index)?.clone();
        self.load_current();
        Some(id)
    }

    /// Host animation-frame callback.
    pub fn frame(&mut self, now: Instant, overlay: &mut WindOverlay) -> TimelineFrame {
        let mut out = TimelineFrame::default();
        if let Some(id) = self.playback.update(now) {
            self.loader.request(id.clone());
            out.requested = Some(id);
        }
        if let Some(event) = self.loader.poll() {
            self.apply(event, overlay, &mut out);
        }
        out.particles = overlay.frame(now);
        out
    }

    /// Block until the pending load lands and bind it. `Ok(None)` on
    /// timeout or when nothing is pending.
    pub fn wait_loaded(
        &mut self,
        timeout: Duration,
        overlay: &mut WindOverlay,
    ) -> Result<Option<TimestepId>> {
        let mut out = TimelineFrame::default();
        if let Some(event) = self.loader.wait(timeout) {
            self.apply(event, overlay, &mut out);
        }
        match out.failed {
            Some(error) => Err(error),
            None => Ok(out.loaded),
        }
    }

    fn apply(&mut self, event: LoadEvent, overlay: &mut WindOverlay, out: &mut TimelineFrame) {
        match event {
            LoadEvent::Ready { id, raster } => {
                info!("Bound timestep {}", id);
                overlay.set_wind(raster);
                self.bound = Some(id.clone());
                out.loaded = Some(id);
            }
            LoadEvent::Failed { id, error } => {
                match &self.bound {
                    Some(bound) => warn!("Keeping timestep {} after {} failed", bound, id),
                    None => warn!("No wind bound, {} failed", id),
                }
                out.failed = Some(error);
            }
        }
    }

    /// Timestep whose raster is currently bound.
    pub fn bound(&self) -> Option<&TimestepId> {
        self.bound.as_ref()
    }

    pub fn playback(&self) -> &TimestepPlayback {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut TimestepPlayback {
        &mut self.playback
    }

    pub fn loader(&self) -> &TimestepLoader<S> {
        &self.loader
    }

    pub fn is_playing(&self) -> bool {
        self.playback.is_playing()
    }
}
