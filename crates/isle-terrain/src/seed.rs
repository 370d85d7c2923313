//! Deterministic seeded generation utilities.
//!
//! Provides the coordinate hash used both as a uniform `[0, 1)` draw and as
//! smooth spatial noise, deterministic math via `libm`, and a content digest
//! for comparing generated grids across runs.

use std::hash::Hasher;
use std::sync::OnceLock;

use crate::biome::BiomeType;

// ---------------------------------------------------------------------------
// Terrain seed
// ---------------------------------------------------------------------------

/// Seed held fixed for the lifetime of one generation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainSeed(pub f64);

impl TerrainSeed {
    /// Draw a seed once, typically at process start.
    pub fn random() -> Self {
        Self((rand::random::<f64>() * 10_000.0).floor())
    }

    /// Seed drawn once per process and reused by every later call.
    pub fn process() -> Self {
        static SEED: OnceLock<TerrainSeed> = OnceLock::new();
        *SEED.get_or_init(Self::random)
    }
}

impl Default for TerrainSeed {
    fn default() -> Self {
        Self(0.0)
    }
}

// ---------------------------------------------------------------------------
// Deterministic math (libm)
// ---------------------------------------------------------------------------

/// Deterministic sine using libm (not platform libc).
#[inline]
pub fn det_sin(x: f64) -> f64 {
    libm::sin(x)
}

/// Deterministic exponential using libm.
#[inline]
pub fn det_exp(x: f64) -> f64 {
    libm::exp(x)
}

/// Deterministic sqrt using libm.
#[inline]
pub fn det_sqrt(x: f64) -> f64 {
    libm::sqrt(x)
}

// ---------------------------------------------------------------------------
// Coordinate hash
// ---------------------------------------------------------------------------

/// The classic `fract(sin(dot) * 43758.5453)` coordinate hash, keyed by a
/// [`TerrainSeed`].
///
/// Distinct `offset` values give independent streams over the same grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SeededHash {
    seed: f64,
}

impl SeededHash {
    pub fn new(seed: TerrainSeed) -> Self {
        Self { seed: seed.0 }
    }

    /// Hash `(x, z)` on the stream selected by `offset`. Result is in `[0, 1)`.
    #[inline]
    pub fn sample(&self, x: f64, z: f64, offset: f64) -> f64 {
        let shift = self.seed + offset;
        let dot = (x + shift) * 12.9898 + (z + shift) * 78.233;
        let v = (det_sin(dot) * 43758.5453).abs();
        v - v.floor()
    }

    /// [`sample`](Self::sample) recentred to `[-0.5, 0.5)`.
    #[inline]
    pub fn centered(&self, x: f64, z: f64, offset: f64) -> f64 {
        self.sample(x, z, offset) - 0.5
    }

    /// Pick an index in `0..len` from the stream selected by `offset`.
    ///
    /// Returns 0 for an empty range so callers can index a non-empty slice.
    #[inline]
    pub fn pick(&self, x: f64, z: f64, offset: f64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        ((self.sample(x, z, offset) * len as f64) as usize).min(len - 1)
    }
}

// ---------------------------------------------------------------------------
// Verification
// ---------------------------------------------------------------------------

/// A deterministic FNV-1a 64-bit hasher.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Digest a row-major label stream for determinism comparison.
pub fn digest_labels(labels: &[BiomeType]) -> u64 {
    let mut hasher = FnvHasher::new();
    for biome in labels {
        hasher.write_u8(biome.index() as u8);
    }
    hasher.finish()
}
