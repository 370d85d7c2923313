//! Integer tile quotas per biome and the live counters consumed during
//! placement.

use serde::{Deserialize, Serialize};

use crate::biome::BiomeType;
use crate::grid::GridSpec;
use crate::population::{AreaBreakdown, OCEAN_TARGET_FRACTION};

/// Target tile count per biome.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Quota {
    counts: [u64; BiomeType::COUNT],
}

impl Quota {
    /// Build a quota from `(biome, count)` pairs; unlisted biomes get 0.
    pub fn from_counts(pairs: &[(BiomeType, u64)]) -> Self {
        let mut quota = Self::default();
        for &(biome, count) in pairs {
            quota.counts[biome.index()] = count;
        }
        quota
    }

    pub fn get(&self, biome: BiomeType) -> u64 {
        self.counts[biome.index()]
    }

    pub fn set(&mut self, biome: BiomeType, count: u64) {
        self.counts[biome.index()] = count;
    }

    /// Sum over all biomes.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Sum over every biome except the absorber.
    pub fn total_without_absorber(&self) -> u64 {
        BiomeType::ALL
            .iter()
            .filter(|&&b| b != BiomeType::ABSORBER)
            .map(|&b| self.get(b))
            .sum()
    }

    /// `(biome, count)` pairs in [`BiomeType::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (BiomeType, u64)> + '_ {
        BiomeType::ALL.iter().map(move |&b| (b, self.get(b)))
    }
}

/// Computes quotas for `grid` from the area breakdown.
///
/// Every non-absorber biome gets `round(N² × fraction)`; the absorber takes
/// whatever remains so the total is exactly `N²`. If rounding ever pushed the
/// other biomes past `N²`, the largest of them are trimmed first.
pub fn compute_quota(grid: &GridSpec, breakdown: &AreaBreakdown) -> Quota {
    let total = grid.tile_count() as u64;
    let mut quota = Quota::default();
    for biome in BiomeType::ALL {
        if biome == BiomeType::ABSORBER {
            continue;
        }
        let share = total as f64 * breakdown.fraction(biome);
        quota.set(biome, share.round().max(0.0) as u64);
    }

    let mut others = quota.total_without_absorber();
    while others > total {
        let largest = largest_non_absorber(&quota);
        quota.set(largest, quota.get(largest) - 1);
        others -= 1;
    }
    quota.set(BiomeType::ABSORBER, total - others);

    tracing::debug!(
        target: "isle_terrain::quota",
        grid = grid.size(),
        total,
        absorber = quota.get(BiomeType::ABSORBER),
        "quota computed"
    );
    quota
}

fn largest_non_absorber(quota: &Quota) -> BiomeType {
    let mut best = BiomeType::Mountains;
    for biome in BiomeType::ALL {
        if biome != BiomeType::ABSORBER && quota.get(biome) > quota.get(best) {
            best = biome;
        }
    }
    best
}

/// Largest saltwater count allowed when ocean enforcement is on: `⌊N² × 0.709⌋`.
pub fn max_ocean_tiles(grid: &GridSpec) -> u64 {
    (grid.tile_count() as f64 * OCEAN_TARGET_FRACTION).floor() as u64
}

/// Rescales `quota` so saltwater lands exactly on [`max_ocean_tiles`].
///
/// Freshwater is clamped to the space left by the ocean target, then land
/// biomes are scaled proportionally into what is left. Scaling floors each
/// share and hands the remainder out one tile at a time to the largest
/// original allocations, ties going to the lexicographically smaller name.
pub fn enforce_ocean_ratio(grid: &GridSpec, quota: &Quota) -> Quota {
    let total = grid.tile_count() as u64;
    let desired_ocean = max_ocean_tiles(grid);
    let available = total - desired_ocean;

    let mut out = Quota::default();
    let freshwater = quota.get(BiomeType::Freshwater).min(available);
    out.set(BiomeType::Freshwater, freshwater);
    let land_budget = available - freshwater;

    let land: Vec<BiomeType> = BiomeType::ALL
        .iter()
        .copied()
        .filter(|b| !b.is_water())
        .collect();
    let land_requested: u64 = land.iter().map(|&b| quota.get(b)).sum();

    if land_requested > 0 {
        let mut assigned = 0u64;
        for &biome in &land {
            let scaled = (quota.get(biome) as u128 * land_budget as u128
                / land_requested as u128) as u64;
            out.set(biome, scaled);
            assigned += scaled;
        }

        let mut by_size = land.clone();
        by_size.sort_by(|a, b| {
            quota
                .get(*b)
                .cmp(&quota.get(*a))
                .then_with(|| a.name().cmp(b.name()))
        });
        let mut leftover = land_budget - assigned;
        for &biome in by_size.iter().cycle() {
            if leftover == 0 {
                break;
            }
            out.set(biome, out.get(biome) + 1);
            leftover -= 1;
        }
    }

    let others = out.total_without_absorber();
    out.set(BiomeType::ABSORBER, total - others);

    tracing::debug!(
        target: "isle_terrain::quota",
        desired_ocean,
        freshwater,
        land_budget,
        land_requested,
        "ocean ratio enforced"
    );
    out
}

/// Live quota bookkeeping for one generation run.
///
/// Starts equal to the target and is only ever decremented. A remaining count
/// can go negative only through the enforcer's absolute fallback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaState {
    target: Quota,
    remaining: [i64; BiomeType::COUNT],
}

impl QuotaState {
    pub fn new(target: Quota) -> Self {
        let mut remaining = [0i64; BiomeType::COUNT];
        for (biome, count) in target.iter() {
            remaining[biome.index()] = count as i64;
        }
        Self { target, remaining }
    }

    pub fn target(&self) -> &Quota {
        &self.target
    }

    pub fn remaining(&self, biome: BiomeType) -> i64 {
        self.remaining[biome.index()]
    }

    /// Tiles placed so far for `biome`.
    pub fn placed(&self, biome: BiomeType) -> i64 {
        self.target.get(biome) as i64 - self.remaining(biome)
    }

    /// `true` while `biome` still has quota left.
    pub fn has_room(&self, biome: BiomeType) -> bool {
        self.remaining(biome) > 0
    }

    /// `true` if `biome` has quota and none of it has been used yet.
    pub fn is_untouched(&self, biome: BiomeType) -> bool {
        self.target.get(biome) > 0 && self.remaining(biome) == self.target.get(biome) as i64
    }

    /// Record one placement of `biome`.
    pub fn consume(&mut self, biome: BiomeType) {
        self.remaining[biome.index()] -= 1;
    }

    /// Sum of all remaining counts (negative entries included).
    pub fn total_remaining(&self) -> i64 {
        self.remaining.iter().sum()
    }
}
