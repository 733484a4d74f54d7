//! Simplex noise in two and three dimensions.
//!
//! Used as a smooth pseudo-random generator: nearby inputs give nearby
//! outputs, and the same input always gives the same output for a given
//! [`Simplex`] instance. The seed only shuffles the permutation table.

use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

const GRAD3: [[f32; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

// Skewing and unskewing factors
const F2: f32 = 0.366_025_4; // 0.5 * (sqrt(3) - 1)
const G2: f32 = 0.211_324_87; // (3 - sqrt(3)) / 6
const F3: f32 = 1.0 / 3.0;
const G3: f32 = 1.0 / 6.0;

#[derive(Clone)]
pub struct Simplex {
    perm: [u8; 512],
    grad: [usize; 512],
    seed: u64,
}

impl Simplex {
    pub fn new(seed: u64) -> Self {
        let mut p: Vec<u8> = (0..=255).collect();
        p.shuffle(&mut StdRng::seed_from_u64(seed));
        let mut perm = [0u8; 512];
        let mut grad = [0usize; 512];
        for i in 0..512 {
            perm[i] = p[i & 255];
            grad[i] = perm[i] as usize % 12;
        }
        Self { perm, grad, seed }
    }

    /// A generator with a seed drawn from the thread RNG.
    pub fn random() -> Self {
        Self::new(rand::random())
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// 2D simplex noise in `[-1, 1]`. Non-finite coordinates yield 0.
    pub fn simplex2(&self, xin: f32, yin: f32) -> f32 {
        if !xin.is_finite() || !yin.is_finite() {
            return 0.0;
        }
        let s = (xin + yin) * F2;
        let i = (xin + s).floor();
        let j = (yin + s).floor();
        let t = (i + j) * G2;
        let x0 = xin - i + t;
        let y0 = yin - j + t;

        let (i1, j1) = if x0 > y0 { (1, 0) } else { (0, 1) };

        let x1 = x0 - i1 as f32 + G2;
        let y1 = y0 - j1 as f32 + G2;
        let x2 = x0 - 1.0 + 2.0 * G2;
        let y2 = y0 - 1.0 + 2.0 * G2;

        let i = wrap(i);
        let j = wrap(j);
        let gi0 = self.grad[i + self.perm[j] as usize];
        let gi1 = self.grad[i + i1 + self.perm[j + j1] as usize];
        let gi2 = self.grad[i + 1 + self.perm[j + 1] as usize];

        let n0 = corner2(gi0, x0, y0);
        let n1 = corner2(gi1, x1, y1);
        let n2 = corner2(gi2, x2, y2);

        (70.0 * (n0 + n1 + n2)).clamp(-1.0, 1.0)
    }

    /// 3D simplex noise in `[-1, 1]`. Non-finite coordinates yield 0.
    pub fn simplex3(&self, xin: f32, yin: f32, zin: f32) -> f32 {
        if !xin.is_finite() || !yin.is_finite() || !zin.is_finite() {
            return 0.0;
        }
        let s = (xin + yin + zin) * F3;
        let i = (xin + s).floor();
        let j = (yin + s).floor();
        let k = (zin + s).floor();
        let t = (i + j + k) * G3;
        let x0 = xin - i + t;
        let y0 = yin - j + t;
        let z0 = zin - k + t;

        // Offsets of the second and third corner in (i, j, k)
        let (i1, j1, k1, i2, j2, k2) = if x0 >= y0 {
            if y0 >= z0 {
                (1, 0, 0, 1, 1, 0)
            } else if x0 >= z0 {
                (1, 0, 0, 1, 0, 1)
            } else {
                (0, 0, 1, 1, 0, 1)
            }
        } else if y0 < z0 {
            (0, 0, 1, 0, 1, 1)
        } else if x0 < z0 {
            (0, 1, 0, 0, 1, 1)
        } else {
            (0, 1, 0, 1, 1, 0)
        };

        let x1 = x0 - i1 as f32 + G3;
        let y1 = y0 - j1 as f32 + G3;
        let z1 = z0 - k1 as f32 + G3;
        let x2 = x0 - i2 as f32 + 2.0 * G3;
        let y2 = y0 - j2 as f32 + 2.0 * G3;
        let z2 = z0 - k2 as f32 + 2.0 * G3;
        let x3 = x0 - 1.0 + 3.0 * G3;
        let y3 = y0 - 1.0 + 3.0 * G3;
        let z3 = z0 - 1.0 + 3.0 * G3;

        let i = wrap(i);
        let j = wrap(j);
        let k = wrap(k);
        let perm = |idx: usize| self.perm[idx] as usize;
        let gi0 = self.grad[i + perm(j + perm(k))];
        let gi1 = self.grad[i + i1 + perm(j + j1 + perm(k + k1))];
        let gi2 = self.grad[i + i2 + perm(j + j2 + perm(k + k2))];
        let gi3 = self.grad[i + 1 + perm(j + 1 + perm(k + 1))];

        let n0 = corner3(gi0, x0, y0, z0);
        let n1 = corner3(gi1, x1, y1, z1);
        let n2 = corner3(gi2, x2, y2, z2);
        let n3 = corner3(gi3, x3, y3, z3);

        (32.0 * (n0 + n1 + n2 + n3)).clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for Simplex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simplex").field("seed", &self.seed).finish()
    }
}

impl Default for Simplex {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Lattice coordinate reduced to the permutation table range.
fn wrap(v: f32) -> usize {
    (v as i64 & 255) as usize
}

fn corner2(g: usize, x: f32, y: f32) -> f32 {
    let t = 0.5 - x * x - y * y;
    if t < 0.0 {
        0.0
    } else {
        let t = t * t;
        t * t * (GRAD3[g][0] * x + GRAD3[g][1] * y)
    }
}

fn corner3(g: usize, x: f32, y: f32, z: f32) -> f32 {
    let t = 0.6 - x * x - y * y - z * z;
    if t < 0.0 {
        0.0
    } else {
        let t = t * t;
        t * t * (GRAD3[g][0] * x + GRAD3[g][1] * y + GRAD3[g][2] * z)
    }
}
