//! Particle engine configuration.

use serde::{Deserialize, Serialize};

use crate::core::time::interval_for_fps;
use crate::core::{Error, Result, Rgba};

/// Configuration for the particle advection engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Pool size
    pub num_particles: usize,
    /// Per-tick alpha multiplier of the trail buffer
    pub fade_opacity: f32,
    /// Pixels moved per tick per m/s
    pub speed_factor: f32,
    /// Baseline per-tick respawn probability
    pub drop_rate: f32,
    /// Second, independent respawn threshold used to top up density
    pub drop_rate_bump: f32,
    /// Scale `drop_rate_bump` by normalized speed and add it to `drop_rate`
    /// instead of testing the two thresholds separately
    pub speed_weighted_drop: bool,
    /// Disc radius in pixels
    pub particle_size: f32,
    pub particle_color: Rgba,
    /// Upper bound on ticks per second
    pub target_fps: f32,
    /// Fixed RNG seed for reproducible runs
    pub seed: Option<u64>,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            num_particles: 5000,
            fade_opacity: 0.96,
            speed_factor: 0.25,
            drop_rate: 0.003,
            drop_rate_bump: 0.01,
            speed_weighted_drop: false,
            particle_size: 1.0,
            particle_color: Rgba::new(255, 255, 255, 204),
            target_fps: 60.0,
            seed: None,
        }
    }
}

impl ParticleConfig {
    /// Respawn threshold for one uniform draw at normalized speed `speed_t`.
    /// A particle is dropped when the draw falls below it.
    pub fn drop_threshold(&self, speed_t: f32) -> f32 {
        if self.speed_weighted_drop {
            self.drop_rate + speed_t * self.drop_rate_bump
        } else {
            self.drop_rate.max(self.drop_rate_bump)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.fade_opacity) {
            return Err(Error::config(format!(
                "fade_opacity {} outside [0,1]",
                self.fade_opacity
            )));
        }
        for (name, p) in [("drop_rate", self.drop_rate), ("drop_rate_bump", self.drop_rate_bump)] {
            if !(0.0..=1.0).contains(&p) {
                return Err(Error::config(format!("{name} {p} outside [0,1]")));
            }
        }
        if !self.speed_factor.is_finite() {
            return Err(Error::config("speed_factor must be finite"));
        }
        if !(self.particle_size >= 0.0) || !self.particle_size.is_finite() {
            return Err(Error::config(format!(
                "particle_size {} must be a non-negative number",
                self.particle_size
            )));
        }
        if interval_for_fps(self.target_fps).is_none() {
            return Err(Error::config(format!(
                "target_fps {} must be a positive rate",
                self.target_fps
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let cfg = ParticleConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.target_fps, 60.0);
    }

    #[test]
    fn test_validation() {
        let bad = [
            ParticleConfig { fade_opacity: 1.5, ..Default::default() },
            ParticleConfig { drop_rate: -0.1, ..Default::default() },
            ParticleConfig { drop_rate_bump: f32::NAN, ..Default::default() },
            ParticleConfig { particle_size: -1.0, ..Default::default() },
            ParticleConfig { target_fps: 0.0, ..Default::default() },
            ParticleConfig { target_fps: 1e-20, ..Default::default() },
            ParticleConfig { target_fps: f32::NAN, ..Default::default() },
        ];
        for cfg in bad {
            assert!(matches!(cfg.validate(), Err(Error::InvalidConfig(_))), "{cfg:?}");
        }
    }

    #[test]
    fn test_drop_threshold() {
        let cfg = ParticleConfig { drop_rate: 0.0, drop_rate_bump: 0.5, ..Default::default() };
        assert_eq!(cfg.drop_threshold(0.0), 0.5);
        assert_eq!(cfg.drop_threshold(1.0), 0.5);
        let weighted = ParticleConfig { speed_weighted_drop: true, ..cfg };
        assert_eq!(weighted.drop_threshold(0.0), 0.0);
        assert_eq!(weighted.drop_threshold(0.5), 0.25);
        assert_eq!(ParticleConfig::default().drop_threshold(0.0), 0.01);
    }

    #[test]
    fn test_partial_json() {
        let cfg: ParticleConfig =
            serde_json::from_str(r##"{"num_particles": 42, "particle_color": "#ff000080"}"##).unwrap();
        assert_eq!(cfg.num_particles, 42);
        assert_eq!(cfg.particle_color, Rgba::new(255, 0, 0, 128));
        assert_eq!(cfg.fade_opacity, 0.96);
    }
}
