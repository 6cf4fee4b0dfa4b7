//! GPU data contract for the field point pass.
//!
//! A GPU backend uploads one [`FieldVertex`] per grid point, a
//! [`FieldUniforms`] block per frame, the wind raster as an RGBA8 texture
//! (linear filtering, clamp-to-edge) and the ramp as a 256x1 RGBA8 texture.
//! The CPU rasterizer in [`super::field`] evaluates the same contract.

use bytemuck::{Pod, Zeroable};

use crate::field::WindBounds;
use crate::projection::Projection;

/// One grid point in normalized raster space (y = 0 is the north edge).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct FieldVertex {
    pub pos: [f32; 2],
}

impl FieldVertex {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { pos: [x, y] }
    }
}

/// Per-frame uniform block (must match shader struct exactly, 48 bytes)
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct FieldUniforms {
    /// (u_min, v_min) (8 bytes, offset 0)
    pub wind_min: [f32; 2],
    /// (u_max, v_max) (8 bytes, offset 8)
    pub wind_max: [f32; 2],
    /// Projection offset (8 bytes, offset 16)
    pub offset: [f32; 2],
    /// Projection zoom (4 bytes, offset 24)
    pub zoom: f32,
    /// Global alpha multiplier (4 bytes, offset 28)
    pub opacity: f32,
    /// Speed mapped to the top of the ramp (4 bytes, offset 32)
    pub max_speed: f32,
    /// Minimum point size in pixels (4 bytes, offset 36)
    pub point_base_size: f32,
    /// Zoom scaling of the point size (4 bytes, offset 40)
    pub point_zoom_factor: f32,
    /// Padding to 48 bytes (4 bytes, offset 44)
    pub _pad: f32,
}

impl FieldUniforms {
    pub fn new(
        bounds: &WindBounds,
        projection: &Projection,
        opacity: f32,
        point_base_size: f32,
        point_zoom_factor: f32,
    ) -> Self {
        Self {
            wind_min: [bounds.u_min, bounds.v_min],
            wind_max: [bounds.u_max, bounds.v_max],
            offset: [projection.offset_x as f32, projection.offset_y as f32],
            zoom: projection.zoom as f32,
            opacity,
            max_speed: bounds.max_speed(),
            point_base_size,
            point_zoom_factor,
            _pad: 0.0,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}

impl Default for FieldUniforms {
    fn default() -> Self {
        Self {
            wind_min: [0.0; 2],
            wind_max: [0.0; 2],
            offset: [0.0; 2],
            zoom: 1.0,
            opacity: 1.0,
            max_speed: 0.0,
            point_base_size: 2.0,
            point_zoom_factor: 1.5,
            _pad: 0.0,
        }
    }
}
