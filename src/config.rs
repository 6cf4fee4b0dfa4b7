//! Top-level configuration.
//!
//! Every section has defaults, so a config file only needs the keys it
//! changes:
//!
//! ```json
//! {
//!   "asset_dir": "data/wind",
//!   "field": { "opacity": 0.6, "grid_res_x": 720, "grid_res_y": 360 },
//!   "particles": { "num_particles": 8000, "seed": 7 },
//!   "playback": { "speed_multiplier": 2.0, "looping": false }
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::Result;
use crate::overlay::SyncConfig;
use crate::particles::ParticleConfig;
use crate::render::FieldConfig;
use crate::streaming::PlaybackConfig;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindMapConfig {
    /// Directory holding `<stem>.json` / `<stem>.png` timestep pairs
    pub asset_dir: PathBuf,
    pub field: FieldConfig,
    pub particles_enabled: bool,
    pub particles: ParticleConfig,
    pub playback: PlaybackConfig,
    pub sync: SyncConfig,
}

impl Default for WindMapConfig {
    fn default() -> Self {
        Self {
            asset_dir: PathBuf::from("data/wind"),
            field: FieldConfig::default(),
            particles_enabled: true,
            particles: ParticleConfig::default(),
            playback: PlaybackConfig::default(),
            sync: SyncConfig::default(),
        }
    }
}

impl WindMapConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every section.
    pub fn validate(&self) -> Result<()> {
        self.field.validate()?;
        if self.particles_enabled {
            self.particles.validate()?;
        }
        self.playback.validate()?;
        self.sync.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Error;
    use crate::projection::ZoomPolicy;

    #[test]
    fn test_default_is_valid() {
        assert!(WindMapConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json() {
        let json = r#"{
            "field": { "opacity": 0.6, "grid_res_x": 720, "grid_res_y": 360 },
            "particles": { "num_particles": 8000, "seed": 7 },
            "sync": { "zoom_policy": "independent_axis" }
        }"#;
        let cfg = WindMapConfig::from_json_str(json).unwrap();
        assert_eq!(cfg.field.grid_res_x, 720);
        assert_eq!(cfg.field.point_base_size, 2.0);
        assert_eq!(cfg.particles.seed, Some(7));
        assert_eq!(cfg.sync.zoom_policy, ZoomPolicy::IndependentAxis);
        assert_eq!(cfg.playback.timesteps.len(), 9);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let bad_ramp = r##"{ "field": { "color_ramp": [{"stop": 0.5, "color": "#fff"}, {"stop": 0.2, "color": "#000"}] } }"##;
        assert!(matches!(WindMapConfig::from_json_str(bad_ramp), Err(Error::Json(_))));
        let bad_grid = r#"{ "field": { "grid_res_x": 1 } }"#;
        assert!(matches!(WindMapConfig::from_json_str(bad_grid), Err(Error::InvalidConfig(_))));
        assert!(matches!(WindMapConfig::from_json_str("{ nope"), Err(Error::Json(_))));
        let crawl = r#"{ "playback": { "speed_multiplier": 1e-30 } }"#;
        assert!(matches!(WindMapConfig::from_json_str(crawl), Err(Error::InvalidConfig(_))));
        let slow = r#"{ "particles": { "target_fps": 1e-20 } }"#;
        assert!(matches!(WindMapConfig::from_json_str(slow), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("windmap.json");
        std::fs::write(&path, r#"{ "particles_enabled": false, "particles": { "fade_opacity": 7.0 } }"#).unwrap();
        // Disabled particles are not validated
        let cfg = WindMapConfig::from_json_file(&path).unwrap();
        assert!(!cfg.particles_enabled);
        assert!(matches!(
            WindMapConfig::from_json_file(dir.path().join("missing.json")),
            Err(Error::Io(_))
        ));
    }
}
