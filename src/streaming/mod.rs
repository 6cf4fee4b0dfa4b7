//! Forecast timestep loading and playback

pub mod asset_io;
pub mod loader;
pub mod playback;

pub use asset_io::{
    AssetSource, FsAssetSource, TimestepId, TimestepMeta,
    decode_timestep, default_timesteps, save_timestep,
};
pub use loader::{LoadEvent, TimestepLoader};
pub use playback::{PlaybackConfig, TimestepPlayback};
