//! Particle streamline simulation.
//!
//! A fixed pool of tracers is advected through the wind field on the host's
//! frame clock, leaving fading trails on an RGBA canvas.

pub mod config;
pub mod engine;
pub mod pool;

pub use config::ParticleConfig;
pub use engine::{ParticleEngine, TickStats};
pub use pool::{Particle, ParticlePool};
