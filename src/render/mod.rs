//! Field rendering and the GPU data contract

pub mod canvas;
pub mod field;
pub mod uniforms;

pub use canvas::Canvas;
pub use field::{DrawStats, FieldConfig, FieldRenderer, PostDrawHook, WindUpdateHook};
pub use uniforms::{FieldUniforms, FieldVertex};
