//! Injectable randomness.
//!
//! Per-frame updates take a `&mut dyn RandomSource` instead of reaching for a
//! global generator, so tests can drive them with a fixed sequence.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// A source of uniformly distributed values in `[0, 1)`.
pub trait RandomSource {
    fn next(&mut self) -> f32;
}

/// `RandomSource` backed by `rand`'s standard generator.
#[derive(Clone, Debug)]
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl RandomSource for StdRandom {
    fn next(&mut self) -> f32 {
        self.0.gen_range(0.0..1.0)
    }
}

/// Replays a fixed list of values, starting over after the last one.
#[derive(Clone, Debug)]
pub struct Sequence {
    values: Vec<f32>,
    cursor: usize,
}

impl Sequence {
    /// Values outside `[0, 1)` are clamped into it.
    pub fn new(values: impl Into<Vec<f32>>) -> Self {
        let mut values: Vec<f32> = values.into();
        if values.is_empty() {
            values.push(0.0);
        }
        for v in values.iter_mut() {
            *v = v.clamp(0.0, 1.0 - f32::EPSILON);
        }
        Self { values, cursor: 0 }
    }

    pub fn constant(value: f32) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for Sequence {
    fn next(&mut self) -> f32 {
        let v = self.values[self.cursor];
        self.cursor = (self.cursor + 1) % self.values.len();
        v
    }
}
