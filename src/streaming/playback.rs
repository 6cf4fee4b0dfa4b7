//! Forecast playback clock.

use std::time::{Duration, Instant};

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::core::time::FrameGate;
use crate::core::{Error, Result};
use crate::streaming::asset_io::{TimestepId, default_timesteps};

/// Timestep animation settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Base time between timesteps in milliseconds
    pub interval_ms: u64,
    /// Divides the interval; 2.0 plays twice as fast
    pub speed_multiplier: f32,
    /// Wrap to the first step after the last; otherwise stop there
    pub looping: bool,
    pub timesteps: Vec<TimestepId>,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            interval_ms: 500,
            speed_multiplier: 1.0,
            looping: true,
            timesteps: default_timesteps(),
        }
    }
}

impl PlaybackConfig {
    pub fn validate(&self) -> Result<()> {
        if self.timesteps.is_empty() {
            return Err(Error::config("playback needs at least one timestep"));
        }
        if !(self.speed_multiplier > 0.0) || !self.speed_multiplier.is_finite() {
            return Err(Error::config(format!(
                "speed_multiplier {} must be positive",
                self.speed_multiplier
            )));
        }
        if self.interval_ms == 0 {
            return Err(Error::config("playback interval must be non-zero"));
        }
        self.effective_interval().map(|_| ())
    }

    /// Interval between steps after applying the speed multiplier.
    pub fn effective_interval(&self) -> Result<Duration> {
        let secs = self.interval_ms as f64 / 1000.0 / self.speed_multiplier as f64;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            Error::config(format!(
                "speed_multiplier {} gives an interval out of range",
                self.speed_multiplier
            ))
        })
    }
}

/// Steps through an ordered list of timesteps on the host's frame clock.
#[derive(Clone, Debug)]
pub struct TimestepPlayback {
    config: PlaybackConfig,
    index: usize,
    playing: bool,
    gate: FrameGate,
}

impl TimestepPlayback {
    pub fn new(config: PlaybackConfig) -> Result<Self> {
        config.validate()?;
        let gate = FrameGate::with_interval(config.effective_interval()?);
        Ok(Self { config, index: 0, playing: false, gate })
    }

    pub fn current(&self) -> &TimestepId {
        &self.config.timesteps[self.index]
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.config.timesteps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.config.timesteps.is_empty()
    }

    pub fn timesteps(&self) -> &[TimestepId] {
        &self.config.timesteps
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn is_looping(&self) -> bool {
        self.config.looping
    }

    /// Start playing; the first advance happens one interval after `now`.
    pub fn play(&mut self, now: Instant) {
        self.gate.reset();
        self.gate.ready(now);
        self.playing = true;
        info!("Playback started at {}", self.current());
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.config.looping = looping;
    }

    /// Change the speed multiplier; takes effect from the next advance.
    pub fn set_speed_multiplier(&mut self, multiplier: f32) -> Result<()> {
        let mut config = self.config.clone();
        config.speed_multiplier = multiplier;
        config.validate()?;
        let interval = config.effective_interval()?;
        self.config = config;
        self.gate.set_interval(interval);
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        self.gate.interval()
    }

    /// Jump to `index`; returns the new current step, `None` when out of range.
    pub fn seek(&mut self, index: usize) -> Option<&TimestepId> {
        if index >= self.len() {
            return None;
        }
        self.index = index;
        Some(self.current())
    }

    /// Advance one step. At the end this wraps when looping; otherwise
    /// playback stops and `None` is returned.
    pub fn step_forward(&mut self) -> Option<&TimestepId> {
        if self.index + 1 < self.len() {
            self.index += 1;
        } else if self.config.looping {
            self.index = 0;
        } else {
            if self.playing {
                info!("Playback reached the last timestep");
            }
            self.playing = false;
            return None;
        }
        Some(self.current())
    }

    /// Frame callback: the new timestep when the clock advanced.
    pub fn update(&mut self, now: Instant) -> Option<TimestepId> {
        if !self.playing || !self.gate.ready(now) {
            return None;
        }
        let next = self.step_forward().cloned();
        if let Some(id) = &next {
            debug!("Playback advanced to {}", id);
        }
        next
    }
}
