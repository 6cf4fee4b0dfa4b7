//! Geographic projection and viewport math.
//!
//! Coordinates move through four spaces: geographic degrees, the
//! normalized Mercator "world" square, NDC after the zoom/offset transform,
//! and screen pixels of the overlay canvas.

pub mod mercator;
pub mod transform;
pub mod viewport;

// Re-exports
pub use mercator::{
    MAX_LATITUDE, clamp_latitude, clamp_longitude, lon_to_x, mercator_lat, mercator_y, x_to_lon,
};
pub use transform::{MIN_ZOOM, Projection};
pub use viewport::{ViewportBounds, ZoomPolicy, fit_projection};
