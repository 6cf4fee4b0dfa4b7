//! Forecast timestep assets and their decoding
//!
//! A timestep is stored as two files sharing a stem:
//! `<stem>.json` with the channel bounds and `<stem>.png` with the encoded
//! U/V raster.

use std::fmt;
use std::future::Future;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::field::{WindBounds, WindRaster};

/// Forecast step: hour offset from the run start and asset file stem.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestepId {
    pub hour: u32,
    pub stem: String,
}

impl TimestepId {
    pub fn new(hour: u32, stem: impl Into<String>) -> Self {
        Self { hour, stem: stem.into() }
    }

    /// Step `hour` hours after a run starting at 00Z on
    /// `year`-`month`-`day`. The day must not roll past the month end.
    pub fn from_run(year: u32, month: u32, day: u32, hour: u32) -> Self {
        let stem = format!("{:04}{:02}{:02}{:02}", year, month, day + hour / 24, hour % 24);
        Self::new(hour, stem)
    }

    pub fn json_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", self.stem))
    }

    pub fn png_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("{}.png", self.stem))
    }
}

impl fmt::Display for TimestepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{}h)", self.stem, self.hour)
    }
}

/// The reference forecast run: 0 to 48 hours in 6 hour steps from
/// 2016-11-20 00Z.
pub fn default_timesteps() -> Vec<TimestepId> {
    (0..=48).step_by(6).map(|h| TimestepId::from_run(2016, 11, 20, h)).collect()
}

/// Timestep metadata (`<stem>.json`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimestepMeta {
    pub u_min: f32,
    pub u_max: f32,
    pub v_min: f32,
    pub v_max: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl TimestepMeta {
    pub fn bounds(&self) -> WindBounds {
        WindBounds::new(self.u_min, self.u_max, self.v_min, self.v_max)
    }
}

/// Combine decoded metadata and image into a raster. Declared dimensions,
/// when present, must match the image.
pub fn decode_timestep(id: &TimestepId, meta: &TimestepMeta, image: RgbaImage) -> Result<WindRaster> {
    if let (Some(w), Some(h)) = (meta.width, meta.height) {
        if (w, h) != image.dimensions() {
            return Err(Error::asset(
                &id.stem,
                format!("metadata says {}x{}, image is {}x{}", w, h, image.width(), image.height()),
            ));
        }
    }
    WindRaster::new(image, meta.bounds()).map_err(|e| Error::asset(&id.stem, e))
}

/// Anything that can produce the raster of a timestep.
pub trait AssetSource: Send + Sync + 'static {
    fn fetch(&self, id: &TimestepId) -> impl Future<Output = Result<WindRaster>> + Send;
}

/// Reads timesteps from a directory of `<stem>.json` + `<stem>.png` pairs.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    dir: PathBuf,
}

impl FsAssetSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn load(&self, id: &TimestepId) -> Result<WindRaster> {
        let meta_bytes = tokio::fs::read(id.json_path(&self.dir)).await?;
        let meta: TimestepMeta = serde_json::from_slice(&meta_bytes)?;
        let png_bytes = tokio::fs::read(id.png_path(&self.dir)).await?;
        let image = image::load_from_memory_with_format(&png_bytes, image::ImageFormat::Png)?.to_rgba8();
        decode_timestep(id, &meta, image)
    }
}

impl AssetSource for FsAssetSource {
    async fn fetch(&self, id: &TimestepId) -> Result<WindRaster> {
        self.load(id).await.map_err(|e| match e {
            Error::AssetLoad { .. } => e,
            other => Error::asset(&id.stem, other),
        })
    }
}

/// Write a timestep pair to `dir`, creating it if needed.
pub async fn save_timestep(dir: &Path, id: &TimestepId, meta: &TimestepMeta, image: &RgbaImage) -> Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(id.json_path(dir), serde_json::to_vec_pretty(meta)?).await?;
    let mut png = Vec::new();
    image.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
    tokio::fs::write(id.png_path(dir), png).await?;
    Ok(())
}
