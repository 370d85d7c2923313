//! Authoritative biome placement.
//!
//! [`ExactCountPlacer`] fills the grid from the origin outward, one biome band
//! at a time, so every biome lands on exactly its quota. [`place_enforced`] is
//! the alternative per-cell driver built on [`QuotaEnforcer`].

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::biome::BiomeType;
use crate::cluster::CellSample;
use crate::enforcer::{PlacementSource, QuotaEnforcer};
use crate::error::GenerationError;
use crate::grid::{GridSpec, TileCoord};
use crate::quota::{Quota, QuotaState};

/// Band order from the innermost ring outward. The absorber fills whatever is
/// left after the last band.
pub const PLACEMENT_ORDER: [BiomeType; 13] = [
    BiomeType::Mountains,
    BiomeType::Tundra,
    BiomeType::BorealForest,
    BiomeType::TemperateForest,
    BiomeType::TropicalRainforest,
    BiomeType::Freshwater,
    BiomeType::TemperateGrassland,
    BiomeType::Savanna,
    BiomeType::Pastureland,
    BiomeType::Cropland,
    BiomeType::Scrub,
    BiomeType::Urban,
    BiomeType::Deserts,
];

/// How the authoritative pass turns preferences into labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementMode {
    /// Radial band fill with exact per-biome counts.
    #[default]
    ExactCount,
    /// Per-cell quota enforcement in radial order.
    Enforced,
}

/// All grid coordinates sorted by distance from the origin, then `x`, then `z`.
pub fn radial_order(grid: &GridSpec) -> Vec<TileCoord> {
    let mut coords: Vec<TileCoord> = grid.coords().collect();
    coords.sort_unstable_by_key(|c| (c.distance_squared(), c.x, c.z));
    coords
}

/// Fills the grid band by band so per-biome counts match the quota exactly.
#[derive(Clone, Copy, Debug)]
pub struct ExactCountPlacer {
    grid: GridSpec,
}

impl ExactCountPlacer {
    pub fn new(grid: GridSpec) -> Self {
        Self { grid }
    }

    /// Place `quota` on the grid.
    ///
    /// `preferences`, when given, holds one row-major preferred biome per
    /// cell. Inside a ring of equidistant cells that a biome only partly
    /// covers, cells preferring that biome are taken first; otherwise ring
    /// order (`x`, then `z`) decides.
    pub fn place(
        &self,
        quota: &Quota,
        preferences: Option<&[BiomeType]>,
    ) -> Result<(Assignment, QuotaState), GenerationError> {
        let total = self.grid.tile_count();
        if quota.total() != total as u64 {
            return Err(GenerationError::QuotaMismatch {
                expected: total as u64,
                actual: quota.total(),
            });
        }
        if let Some(prefs) = preferences {
            if prefs.len() != total {
                return Err(GenerationError::PreferenceLength {
                    expected: total,
                    actual: prefs.len(),
                });
            }
        }

        let order = radial_order(&self.grid);
        let mut rings = order.chunk_by(|a, b| a.distance_squared() == b.distance_squared());
        let mut slots: Vec<Option<BiomeType>> = vec![None; total];
        let mut state = QuotaState::new(*quota);
        let mut pool: Vec<TileCoord> = Vec::new();

        let mut put = |coord: TileCoord, biome: BiomeType, state: &mut QuotaState| {
            if let Some(i) = self.grid.index_of(coord) {
                slots[i] = Some(biome);
                state.consume(biome);
            }
        };

        for biome in PLACEMENT_ORDER {
            let mut need = quota.get(biome) as usize;
            while need > 0 {
                if pool.is_empty() {
                    match rings.next() {
                        Some(ring) => pool.extend_from_slice(ring),
                        None => break,
                    }
                }
                if pool.len() <= need {
                    need -= pool.len();
                    for coord in pool.drain(..) {
                        put(coord, biome, &mut state);
                    }
                } else {
                    if let Some(prefs) = preferences {
                        // Stable: keeps ring order within each group.
                        pool.sort_by_key(|c| {
                            self.grid.index_of(*c).map(|i| prefs[i]) != Some(biome)
                        });
                    }
                    for coord in pool.drain(..need) {
                        put(coord, biome, &mut state);
                    }
                    need = 0;
                }
            }
        }

        for coord in pool.drain(..) {
            put(coord, BiomeType::ABSORBER, &mut state);
        }
        for ring in rings {
            for &coord in ring {
                put(coord, BiomeType::ABSORBER, &mut state);
            }
        }

        let assignment = Assignment::from_slots(self.grid, slots)?;
        tracing::debug!(
            target: "isle_terrain::placement",
            grid = self.grid.size(),
            remaining = state.total_remaining(),
            "exact-count placement finished"
        );
        Ok((assignment, state))
    }
}

/// How often each fallback step fired during an enforced placement.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceTally {
    pub preferred: u64,
    pub diversity: u64,
    pub rare_boost: u64,
    pub similar: u64,
    pub any_remaining: u64,
    pub absolute: u64,
}

impl SourceTally {
    fn record(&mut self, source: PlacementSource) {
        match source {
            PlacementSource::Preferred => self.preferred += 1,
            PlacementSource::Diversity => self.diversity += 1,
            PlacementSource::RareBoost => self.rare_boost += 1,
            PlacementSource::Similar => self.similar += 1,
            PlacementSource::AnyRemaining => self.any_remaining += 1,
            PlacementSource::Absolute => self.absolute += 1,
        }
    }

    /// Placements that did not get their preferred biome.
    pub fn fallbacks(&self) -> u64 {
        self.diversity + self.rare_boost + self.similar + self.any_remaining + self.absolute
    }
}

/// Reduce step of the scatter/reduce split: feeds precomputed row-major
/// samples through `enforcer` in radial order on a single thread.
pub fn place_enforced(
    grid: GridSpec,
    samples: &[CellSample],
    quota: &Quota,
    enforcer: &QuotaEnforcer,
) -> Result<(Assignment, QuotaState, SourceTally), GenerationError> {
    let total = grid.tile_count();
    if quota.total() != total as u64 {
        return Err(GenerationError::QuotaMismatch {
            expected: total as u64,
            actual: quota.total(),
        });
    }
    if samples.len() != total {
        return Err(GenerationError::PreferenceLength {
            expected: total,
            actual: samples.len(),
        });
    }

    let mut slots: Vec<Option<BiomeType>> = vec![None; total];
    let mut state = QuotaState::new(*quota);
    let mut tally = SourceTally::default();
    for coord in radial_order(&grid) {
        let Some(i) = grid.index_of(coord) else {
            continue;
        };
        let (biome, source) = enforcer.place(&samples[i], &mut state);
        slots[i] = Some(biome);
        tally.record(source);
    }

    let assignment = Assignment::from_slots(grid, slots)?;
    if tally.absolute > 0 {
        tracing::warn!(
            target: "isle_terrain::placement",
            count = tally.absolute,
            "absolute fallback over-allocated past quota"
        );
    }
    tracing::debug!(
        target: "isle_terrain::placement",
        grid = grid.size(),
        fallbacks = tally.fallbacks(),
        "enforced placement finished"
    );
    Ok((assignment, state, tally))
}
