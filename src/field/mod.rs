//! Wind field data model.
//!
//! A forecast timestep arrives as a [`WindRaster`]: an RGBA8 image whose red
//! and green channels encode U and V over [`WindBounds`]. Point queries decode
//! to [`WindSample`]s in m/s; the [`ColorRamp`] maps normalized speed to color
//! for both the field renderer and the legend.

pub mod color_ramp;
pub mod raster;
pub mod sample;
pub mod stats;

// Re-exports
pub use color_ramp::{ColorRamp, ColorStop, RampTable, RAMP_SIZE, speed_to_normalized};
pub use raster::{WindBounds, WindRaster};
pub use sample::{WindSample, direction_degrees, ms_to_knots, speed, MS_TO_KNOTS};
pub use stats::RasterStats;
