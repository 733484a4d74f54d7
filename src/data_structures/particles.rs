//! Flat point buffer with biased random drift and wraparound.
//!
//! Every update moves each particle by a freshly sampled step: left and down
//! on average along x and y, forward along z. Particles that leave the cube
//! `[-bound, bound]` are moved to the opposite face instead of being clamped,
//! which produces a continuous one-directional snowfall.

use crate::animation::random::RandomSource;

/// Step scale applied to every sampled offset.
pub const DRIFT: f32 = 0.1;
/// Offsets subtracted from the raw sample per axis. x drifts in `(-0.1, 0]`,
/// y in `[-0.075, 0.025)` and z in `[0, 0.1)`.
pub const BIAS: [f32; 3] = [1.0, 0.75, 0.0];
pub const DEFAULT_BOUND: f32 = 50.0;

/// A single point, laid out for direct upload as a vertex.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: [f32; 3],
}

impl Particle {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// How often particles were moved to the opposite face, per axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Wraps {
    pub x: u64,
    pub y: u64,
    pub z: u64,
}

#[derive(Clone, Debug)]
pub struct ParticleBuffer {
    particles: Vec<Particle>,
    bound: f32,
    version: u64,
    wraps: Wraps,
}

impl ParticleBuffer {
    pub fn new(particles: Vec<Particle>) -> Self {
        Self {
            particles,
            bound: DEFAULT_BOUND,
            version: 0,
            wraps: Wraps::default(),
        }
    }

    /// `amount` particles at the origin.
    pub fn at_origin(amount: usize) -> Self {
        Self::new(vec![Particle::default(); amount])
    }

    /// `amount` particles spread uniformly over a cube with edge `distance` centred on the origin.
    pub fn scattered(amount: usize, distance: f32, rng: &mut dyn RandomSource) -> Self {
        let particles = (0..amount)
            .map(|_| {
                let x = (rng.next() - 0.5) * distance;
                let y = (rng.next() - 0.5) * distance;
                let z = (rng.next() - 0.5) * distance;
                Particle::new(x, y, z)
            })
            .collect();
        Self::new(particles)
    }

    pub fn with_bound(mut self, bound: f32) -> Self {
        self.bound = bound.abs();
        self
    }

    pub fn bound(&self) -> f32 {
        self.bound
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Mutable access marks the buffer dirty.
    pub fn particles_mut(&mut self) -> &mut [Particle] {
        self.mark_dirty();
        &mut self.particles
    }

    /// The vertex data as raw bytes, ready for a buffer upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.particles)
    }

    /// Bumped on every mutation. Renderers re-upload when it differs from what they last saw.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn mark_dirty(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    pub fn wraps(&self) -> Wraps {
        self.wraps
    }

    /// Applies one frame of drift to every particle and marks the buffer dirty.
    ///
    /// Three samples are drawn per particle, in x, y, z order.
    pub fn update(&mut self, rng: &mut dyn RandomSource) {
        let bound = self.bound;
        for particle in self.particles.iter_mut() {
            let [x, y, z] = &mut particle.position;
            *x += (rng.next() - BIAS[0]) * DRIFT;
            *y += (rng.next() - BIAS[1]) * DRIFT;
            *z += (rng.next() - BIAS[2]) * DRIFT;

            if *x < -bound {
                *x = bound;
                self.wraps.x += 1;
            }
            if *y < -bound {
                *y = bound;
                self.wraps.y += 1;
            }
            if *z < -bound {
                *z = bound;
                self.wraps.z += 1;
            } else if *z > bound {
                *z = -bound;
                self.wraps.z += 1;
            }
        }
        self.mark_dirty();
    }
}
