//! Freshwater overlay: rivers, lakes, and coastal wetlands carved into land
//! cells after placement.
//!
//! Every predicate is a pure function of the cell sample and the seed, so the
//! overlay is evaluated in parallel and applied afterwards. The overlay does
//! not touch [`QuotaState`](crate::quota::QuotaState); reports reconcile
//! counts from the final assignment.

use rayon::prelude::*;

use crate::assignment::Assignment;
use crate::biome::BiomeType;
use crate::cluster::CellSample;
use crate::error::GenerationError;
use crate::seed::{SeededHash, det_sin, det_sqrt};

/// Normalized-distance band where coastal wetlands may form.
pub const WETLAND_BAND: (f64, f64) = (0.6, 0.8);

const FEATURE_OFFSET_BASE: f64 = 600.0;
const FEATURE_OFFSET_STRIDE: f64 = 10.0;

/// A river running from `source` to `target` in island-relative coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RiverSpec {
    pub source: (f64, f64),
    pub target: (f64, f64),
    /// Half-width at the source.
    pub base_width: f64,
    /// Extra half-width gained by the mouth.
    pub width_growth: f64,
    pub meander_amplitude: f64,
    /// Full meander periods along the path.
    pub meander_periods: f64,
    /// Elevation range at the source. The upper bound shrinks along the path.
    pub elevation_band: (f64, f64),
    /// Fraction of the upper bound lost by the mouth.
    pub band_shrink: f64,
    pub bank_jitter: f64,
    /// Probability a cell inside the channel survives the gap roll.
    pub density: f64,
}

/// A lake around `center`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LakeSpec {
    pub center: (f64, f64),
    pub radius: f64,
    /// Relative radius jitter per cell.
    pub jitter: f64,
    pub elevation_band: (f64, f64),
    pub density: f64,
}

/// A coastal wetland patch, only active inside [`WETLAND_BAND`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WetlandSpec {
    pub center: (f64, f64),
    pub radius: f64,
    pub jitter: f64,
    pub density: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaterFeature {
    River(RiverSpec),
    Lake(LakeSpec),
    Wetland(WetlandSpec),
}

/// Built-in features: two rivers draining the highlands, two lakes, and two
/// wetlands on the coast.
pub fn default_water_features() -> Vec<WaterFeature> {
    let river = RiverSpec {
        source: (0.05, -0.1),
        target: (0.35, 0.85),
        base_width: 0.02,
        width_growth: 0.04,
        meander_amplitude: 0.06,
        meander_periods: 3.0,
        elevation_band: (0.0, 1.8),
        band_shrink: 0.5,
        bank_jitter: 0.015,
        density: 0.6,
    };
    vec![
        WaterFeature::River(river),
        WaterFeature::River(RiverSpec {
            source: (-0.15, 0.05),
            target: (-0.85, -0.25),
            meander_periods: 2.0,
            ..river
        }),
        WaterFeature::Lake(LakeSpec {
            center: (0.15, 0.2),
            radius: 0.08,
            jitter: 0.25,
            elevation_band: (0.3, 1.6),
            density: 0.75,
        }),
        WaterFeature::Lake(LakeSpec {
            center: (-0.3, -0.3),
            radius: 0.06,
            jitter: 0.25,
            elevation_band: (0.2, 1.6),
            density: 0.75,
        }),
        WaterFeature::Wetland(WetlandSpec {
            center: (0.0, -0.7),
            radius: 0.2,
            jitter: 0.2,
            density: 0.5,
        }),
        WaterFeature::Wetland(WetlandSpec {
            center: (-0.65, 0.3),
            radius: 0.15,
            jitter: 0.2,
            density: 0.5,
        }),
    ]
}

fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dz = a.1 - b.1;
    det_sqrt(dx * dx + dz * dz)
}

/// Reclassifies land cells as freshwater.
pub struct WaterFeatureOverlay {
    hash: SeededHash,
    features: Vec<WaterFeature>,
}

impl WaterFeatureOverlay {
    pub fn new(hash: SeededHash) -> Self {
        Self::with_features(hash, default_water_features())
    }

    pub fn with_features(hash: SeededHash, features: Vec<WaterFeature>) -> Self {
        Self { hash, features }
    }

    pub fn features(&self) -> &[WaterFeature] {
        &self.features
    }

    /// `true` if any feature claims the cell. Ignores the current label.
    pub fn is_freshwater(&self, sample: &CellSample) -> bool {
        self.features.iter().enumerate().any(|(k, feature)| {
            let offset = FEATURE_OFFSET_BASE + FEATURE_OFFSET_STRIDE * k as f64;
            match feature {
                WaterFeature::River(spec) => self.in_river(spec, sample, offset),
                WaterFeature::Lake(spec) => self.in_lake(spec, sample, offset),
                WaterFeature::Wetland(spec) => self.in_wetland(spec, sample, offset),
            }
        })
    }

    fn in_river(&self, spec: &RiverSpec, sample: &CellSample, offset: f64) -> bool {
        let (sx, sz) = spec.source;
        let dx = spec.target.0 - sx;
        let dz = spec.target.1 - sz;
        let length_sq = dx * dx + dz * dz;
        if length_sq <= f64::EPSILON {
            return false;
        }
        let progress =
            (((sample.ix - sx) * dx + (sample.iz - sz) * dz) / length_sq).clamp(0.0, 1.0);

        let length = det_sqrt(length_sq);
        let (nx, nz) = (-dz / length, dx / length);
        let sway = det_sin(progress * spec.meander_periods * std::f64::consts::TAU)
            * spec.meander_amplitude;
        let channel = (
            sx + dx * progress + nx * sway,
            sz + dz * progress + nz * sway,
        );

        let x = sample.coord.x as f64;
        let z = sample.coord.z as f64;
        let width = spec.base_width
            + spec.width_growth * progress
            + self.hash.centered(x, z, offset) * spec.bank_jitter;
        if distance((sample.ix, sample.iz), channel) > width {
            return false;
        }

        let (low, high) = spec.elevation_band;
        let high = high * (1.0 - spec.band_shrink * progress);
        if sample.elevation < low || sample.elevation > high {
            return false;
        }
        self.hash.sample(x, z, offset + 1.0) < spec.density
    }

    fn in_lake(&self, spec: &LakeSpec, sample: &CellSample, offset: f64) -> bool {
        let x = sample.coord.x as f64;
        let z = sample.coord.z as f64;
        let radius = spec.radius * (1.0 + self.hash.centered(x, z, offset) * spec.jitter);
        if distance((sample.ix, sample.iz), spec.center) > radius {
            return false;
        }
        let (low, high) = spec.elevation_band;
        if sample.elevation < low || sample.elevation > high {
            return false;
        }
        self.hash.sample(x, z, offset + 1.0) < spec.density
    }

    fn in_wetland(&self, spec: &WetlandSpec, sample: &CellSample, offset: f64) -> bool {
        let (inner, outer) = WETLAND_BAND;
        if sample.normalized_distance < inner || sample.normalized_distance > outer {
            return false;
        }
        let x = sample.coord.x as f64;
        let z = sample.coord.z as f64;
        let radius = spec.radius * (1.0 + self.hash.centered(x, z, offset) * spec.jitter);
        if distance((sample.ix, sample.iz), spec.center) > radius {
            return false;
        }
        self.hash.sample(x, z, offset + 1.0) < spec.density
    }

    /// Convert claimed land cells of `assignment` to freshwater and return how
    /// many changed. `samples` must be row-major and cover the grid.
    pub fn apply(
        &self,
        assignment: &mut Assignment,
        samples: &[CellSample],
    ) -> Result<usize, GenerationError> {
        if samples.len() != assignment.len() {
            return Err(GenerationError::PreferenceLength {
                expected: assignment.len(),
                actual: samples.len(),
            });
        }
        let converts: Vec<usize> = assignment
            .labels()
            .par_iter()
            .zip(samples.par_iter())
            .enumerate()
            .filter(|(_, (biome, sample))| !biome.is_water() && self.is_freshwater(sample))
            .map(|(i, _)| i)
            .collect();
        for &i in &converts {
            assignment.relabel(i, BiomeType::Freshwater);
        }
        tracing::debug!(
            target: "isle_terrain::water",
            converted = converts.len(),
            "water features applied"
        );
        Ok(converts.len())
    }
}
