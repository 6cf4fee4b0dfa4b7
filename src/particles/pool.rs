//! Fixed-size particle storage.

use glam::Vec2;

/// One streamline tracer in canvas pixel space.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    /// Ticks survived since the last (re)spawn
    pub age: u32,
}

impl Particle {
    pub const fn spawned(x: f32, y: f32) -> Self {
        Self { x, y, age: 0 }
    }

    #[inline]
    pub fn position(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// Ordered pool whose length only changes through [`refill`](Self::refill).
/// Slots are reused in place; a particle never moves to another index.
#[derive(Clone, Debug, Default)]
pub struct ParticlePool {
    particles: Vec<Particle>,
}

impl ParticlePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole pool with `count` particles placed by `spawn`.
    pub fn refill(&mut self, count: usize, mut spawn: impl FnMut() -> Vec2) {
        self.particles.clear();
        self.particles.reserve(count);
        for _ in 0..count {
            let p = spawn();
            self.particles.push(Particle::spawned(p.x, p.y));
        }
    }

    /// Respawn slot `index` at `pos` with age 0.
    #[inline]
    pub fn respawn(&mut self, index: usize, pos: Vec2) {
        if let Some(p) = self.particles.get_mut(index) {
            *p = Particle::spawned(pos.x, pos.y);
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }
}
