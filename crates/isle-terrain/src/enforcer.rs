//! Per-cell quota enforcement: turns a preferred biome plus the live
//! [`QuotaState`] into a placement, falling back when the preference is
//! exhausted.
//!
//! Fallback order:
//! 1. diversity forcing for biomes that have not been placed at all,
//! 2. rare-biome boosting for biomes with fewer than 50 placements,
//! 3. a static similarity table,
//! 4. any biome with room, in [`BiomeType::ALL`] order,
//! 5. [`ABSOLUTE_FALLBACK`], even with no quota left.
//!
//! The enforcer mutates shared counters, so callers must drive it in a stable
//! coordinate order for the result to be reproducible.

use crate::biome::BiomeType;
use crate::cluster::CellSample;
use crate::quota::QuotaState;
use crate::seed::SeededHash;

/// Biome used when nothing else has room. May push its remaining count below 0.
pub const ABSOLUTE_FALLBACK: BiomeType = BiomeType::Scrub;

/// Probability of forcing an untouched biome.
pub const DIVERSITY_PROBABILITY: f64 = 0.4;

/// Probability of boosting a rare biome.
pub const RARE_BOOST_PROBABILITY: f64 = 0.3;

/// Placements below which a biome counts as rare.
pub const RARE_THRESHOLD: i64 = 50;

const DIVERSITY_ROLL_OFFSET: f64 = 401.0;
const DIVERSITY_PICK_OFFSET: f64 = 409.0;
const RARE_ROLL_OFFSET: f64 = 419.0;
const RARE_PICK_OFFSET: f64 = 421.0;

/// Ordered substitutes tried when a biome is exhausted.
pub fn similar_biomes(biome: BiomeType) -> &'static [BiomeType] {
    use BiomeType::*;
    match biome {
        Mountains => &[Tundra, BorealForest],
        Tundra => &[Mountains, BorealForest, Scrub],
        BorealForest => &[TemperateForest, Tundra],
        TemperateForest => &[BorealForest, TropicalRainforest, TemperateGrassland],
        TropicalRainforest => &[TemperateForest, Savanna],
        TemperateGrassland => &[Pastureland, Savanna, TemperateForest],
        Savanna => &[TemperateGrassland, Scrub, Deserts],
        Scrub => &[Savanna, Deserts],
        Deserts => &[Scrub, Savanna],
        Urban => &[Cropland, Pastureland],
        Cropland => &[Pastureland, TemperateGrassland, Urban],
        Pastureland => &[Cropland, TemperateGrassland],
        Saltwater => &[Freshwater, Scrub],
        Freshwater => &[Saltwater, TemperateGrassland],
    }
}

/// Whether `biome` suits a location given in island-relative coordinates.
pub fn suits_location(biome: BiomeType, ix: f64, iz: f64) -> bool {
    use BiomeType::*;
    match biome {
        Mountains => ix.abs() < 0.1 && iz.abs() < 0.3,
        Tundra | BorealForest => iz < -0.3,
        TropicalRainforest | Savanna => iz > 0.3,
        TemperateForest | TemperateGrassland => iz.abs() < 0.1,
        Deserts | Scrub => ix > 0.3,
        Urban | Cropland | Pastureland => ix < -0.1,
        Freshwater => ix.abs() < 0.3 && iz.abs() < 0.3,
        Saltwater => ix.abs() > 0.3 || iz.abs() > 0.3,
    }
}

/// Which step of the fallback chain produced a placement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlacementSource {
    Preferred,
    Diversity,
    RareBoost,
    Similar,
    AnyRemaining,
    Absolute,
}

/// Resolves placements against a [`QuotaState`].
#[derive(Clone, Copy, Debug)]
pub struct QuotaEnforcer {
    hash: SeededHash,
}

impl QuotaEnforcer {
    pub fn new(hash: SeededHash) -> Self {
        Self { hash }
    }

    /// Place `sample.preferred` if it has room, otherwise walk the fallback
    /// chain. The chosen biome is consumed from `state`.
    pub fn place(
        &self,
        sample: &CellSample,
        state: &mut QuotaState,
    ) -> (BiomeType, PlacementSource) {
        let (biome, source) = self.resolve(sample, state);
        state.consume(biome);
        (biome, source)
    }

    fn resolve(&self, sample: &CellSample, state: &QuotaState) -> (BiomeType, PlacementSource) {
        if state.has_room(sample.preferred) {
            return (sample.preferred, PlacementSource::Preferred);
        }
        let x = sample.coord.x as f64;
        let z = sample.coord.z as f64;

        let untouched: Vec<BiomeType> = BiomeType::ALL
            .iter()
            .copied()
            .filter(|&b| state.is_untouched(b))
            .collect();
        if !untouched.is_empty()
            && self.hash.sample(x, z, DIVERSITY_ROLL_OFFSET) < DIVERSITY_PROBABILITY
        {
            let pick = untouched
                .iter()
                .copied()
                .find(|&b| suits_location(b, sample.ix, sample.iz))
                .unwrap_or_else(|| {
                    untouched[self.hash.pick(x, z, DIVERSITY_PICK_OFFSET, untouched.len())]
                });
            return (pick, PlacementSource::Diversity);
        }

        let rare: Vec<BiomeType> = BiomeType::ALL
            .iter()
            .copied()
            .filter(|&b| state.has_room(b) && state.placed(b) < RARE_THRESHOLD)
            .collect();
        if !rare.is_empty()
            && self.hash.sample(x, z, RARE_ROLL_OFFSET) < RARE_BOOST_PROBABILITY
        {
            let pick = rare[self.hash.pick(x, z, RARE_PICK_OFFSET, rare.len())];
            return (pick, PlacementSource::RareBoost);
        }

        if let Some(&similar) = similar_biomes(sample.preferred)
            .iter()
            .find(|&&b| state.has_room(b))
        {
            return (similar, PlacementSource::Similar);
        }

        if let Some(&any) = BiomeType::ALL.iter().find(|&&b| state.has_room(b)) {
            return (any, PlacementSource::AnyRemaining);
        }

        (ABSOLUTE_FALLBACK, PlacementSource::Absolute)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::TileCoord;
    use crate::quota::Quota;
    use crate::seed::TerrainSeed;

    fn sample_at(x: i32, z: i32, preferred: BiomeType) -> CellSample {
        CellSample {
            coord: TileCoord::new(x, z),
            ix: x as f64 / 10.0,
            iz: z as f64 / 10.0,
            normalized_distance: 0.0,
            elevation: 0.5,
            preferred,
        }
    }

    fn enforcer() -> QuotaEnforcer {
        QuotaEnforcer::new(SeededHash::new(TerrainSeed(5.0)))
    }

    #[test]
    fn test_preferred_placed_when_room() {
        let mut state = QuotaState::new(Quota::from_counts(&[(BiomeType::Savanna, 3)]));
        let (b, src) = enforcer().place(&sample_at(1, 1, BiomeType::Savanna), &mut state);
        assert_eq!(b, BiomeType::Savanna);
        assert_eq!(src, PlacementSource::Preferred);
        assert_eq!(state.remaining(BiomeType::Savanna), 2);
    }

    #[test]
    fn test_similarity_fallback_when_no_untouched_or_rare() {
        // Forest exhausted, boreal partly used and past the rare threshold.
        let quota = Quota::from_counts(&[
            (BiomeType::TemperateForest, 1),
            (BiomeType::BorealForest, 200),
        ]);
        let mut state = QuotaState::new(quota);
        state.consume(BiomeType::TemperateForest);
        for _ in 0..60 {
            state.consume(BiomeType::BorealForest);
        }
        let sample = sample_at(2, 3, BiomeType::TemperateForest);
        let (b, src) = enforcer().place(&sample, &mut state);
        assert_eq!(b, BiomeType::BorealForest);
        assert_eq!(src, PlacementSource::Similar);
    }

    #[test]
    fn test_any_remaining_when_similar_exhausted() {
        let quota = Quota::from_counts(&[(BiomeType::Urban, 1), (BiomeType::Saltwater, 500)]);
        let mut state = QuotaState::new(quota);
        state.consume(BiomeType::Urban);
        for _ in 0..100 {
            state.consume(BiomeType::Saltwater);
        }
        let (b, src) = enforcer().place(&sample_at(0, 0, BiomeType::Urban), &mut state);
        assert_eq!(b, BiomeType::Saltwater);
        assert_eq!(src, PlacementSource::AnyRemaining);
    }

    #[test]
    fn test_absolute_fallback_goes_negative() {
        let quota = Quota::from_counts(&[(BiomeType::Deserts, 1)]);
        let mut state = QuotaState::new(quota);
        state.consume(BiomeType::Deserts);
        let (b, src) = enforcer().place(&sample_at(4, 4, BiomeType::Deserts), &mut state);
        assert_eq!(b, ABSOLUTE_FALLBACK);
        assert_eq!(src, PlacementSource::Absolute);
        assert_eq!(state.remaining(ABSOLUTE_FALLBACK), -1);
    }

    #[test]
    fn test_diversity_only_picks_untouched() {
        let quota = Quota::from_counts(&[
            (BiomeType::Mountains, 1),
            (BiomeType::Deserts, 10),
            (BiomeType::Tundra, 10),
        ]);
        let e = enforcer();
        let mut forced = 0;
        for i in 0..200 {
            let mut state = QuotaState::new(quota);
            state.consume(BiomeType::Mountains);
            let (b, src) = e.place(&sample_at(i, -i, BiomeType::Mountains), &mut state);
            if src == PlacementSource::Diversity {
                forced += 1;
                assert!(matches!(b, BiomeType::Deserts | BiomeType::Tundra));
            }
        }
        assert!(forced > 40 && forced < 120, "diversity rate off: {forced}/200");
    }

    #[test]
    fn test_diversity_prefers_geography() {
        let quota = Quota::from_counts(&[
            (BiomeType::Mountains, 1),
            (BiomeType::Deserts, 10),
            (BiomeType::Tundra, 10),
        ]);
        let e = enforcer();
        for i in 0..100 {
            let mut state = QuotaState::new(quota);
            state.consume(BiomeType::Mountains);
            // Far south (iz < -0.3) but not east: tundra suits, deserts do not.
            let sample = CellSample {
                ix: 0.0,
                iz: -0.8,
                ..sample_at(i, i + 1, BiomeType::Mountains)
            };
            let (b, src) = e.place(&sample, &mut state);
            if src == PlacementSource::Diversity {
                assert_eq!(b, BiomeType::Tundra);
            }
        }
    }

    #[test]
    fn test_rare_boost_picks_sparse_biomes() {
        // Scrub exhausted; savanna and cropland both started, so nothing is
        // untouched. Savanna is past the rare threshold, cropland is not.
        let quota = Quota::from_counts(&[
            (BiomeType::Scrub, 1),
            (BiomeType::Savanna, 200),
            (BiomeType::Cropland, 5),
        ]);
        let e = enforcer();
        let mut boosted = 0;
        for i in 0..200 {
            let mut state = QuotaState::new(quota);
            state.consume(BiomeType::Scrub);
            state.consume(BiomeType::Cropland);
            for _ in 0..RARE_THRESHOLD {
                state.consume(BiomeType::Savanna);
            }
            let (b, src) = e.place(&sample_at(i, 2 * i - 7, BiomeType::Scrub), &mut state);
            assert_ne!(src, PlacementSource::Diversity);
            match src {
                PlacementSource::RareBoost => {
                    boosted += 1;
                    assert_eq!(b, BiomeType::Cropland);
                }
                _ => assert_eq!(b, BiomeType::Savanna),
            }
        }
        assert!(boosted > 30 && boosted < 95, "rare boost rate off: {boosted}/200");
    }

    #[test]
    fn test_rare_boost_skips_full_biomes() {
        let quota = Quota::from_counts(&[
            (BiomeType::Scrub, 1),
            (BiomeType::Savanna, 5),
            (BiomeType::Cropland, 1),
        ]);
        let e = enforcer();
        for i in 0..100 {
            let mut state = QuotaState::new(quota);
            state.consume(BiomeType::Scrub);
            state.consume(BiomeType::Savanna);
            state.consume(BiomeType::Cropland);
            let (b, src) = e.place(&sample_at(-i, i + 3, BiomeType::Scrub), &mut state);
            if src == PlacementSource::RareBoost {
                assert_eq!(b, BiomeType::Savanna);
            }
            assert_ne!(b, BiomeType::Cropland);
        }
    }

    #[test]
    fn test_same_inputs_same_choice() {
        let quota = Quota::from_counts(&[
            (BiomeType::Scrub, 1),
            (BiomeType::Savanna, 5),
            (BiomeType::Cropland, 5),
        ]);
        let e = enforcer();
        let run = || {
            let mut state = QuotaState::new(quota);
            state.consume(BiomeType::Scrub);
            e.place(&sample_at(7, -3, BiomeType::Scrub), &mut state)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_similarity_lists_exclude_self() {
        for biome in BiomeType::ALL {
            let list = similar_biomes(biome);
            assert!((2..=3).contains(&list.len()));
            assert!(!list.contains(&biome));
        }
    }
}
