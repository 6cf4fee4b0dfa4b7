//! Windmap - animated wind field overlay for web-Mercator maps

pub mod core;
pub mod field;
pub mod projection;
pub mod render;
pub mod particles;
pub mod overlay;
pub mod streaming;
pub mod config;
