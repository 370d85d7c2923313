//! Population-to-area model: year → world population → surface area per
//! person → per-biome area breakdown.

use crate::biome::BiomeType;

/// Anchor population at [`BASE_YEAR`].
pub const BASE_POPULATION: f64 = 8_045_311_447.0;

/// Anchor year for the population model.
pub const BASE_YEAR: i32 = 2023;

/// Earth's surface area in square meters.
pub const EARTH_SURFACE_M2: f64 = 510_072_000_000_000.0;

/// Share of the surface that is ocean.
pub const SALTWATER_FRACTION: f64 = 0.6903;

/// Share of the surface that is lakes, rivers, and wetlands.
pub const FRESHWATER_FRACTION: f64 = 0.0177;

/// Share of the surface that is land.
pub const LAND_FRACTION: f64 = 0.292;

/// Global ocean fraction used when ocean quota enforcement is active.
pub const OCEAN_TARGET_FRACTION: f64 = 0.709;

const DECLINE_BEFORE_BASE: f64 = 0.0084;
const GROWTH_TO_2030: f64 = 0.0067;
const GROWTH_TO_2050: f64 = 0.0043;
const GROWTH_AFTER_2050: f64 = 0.0010;

/// Share of land covered by each natural biome.
const NATURAL_LAND_SHARES: [(BiomeType, f64); 9] = [
    (BiomeType::Mountains, 0.10),
    (BiomeType::Tundra, 0.06),
    (BiomeType::BorealForest, 0.08),
    (BiomeType::TemperateForest, 0.07),
    (BiomeType::TropicalRainforest, 0.07),
    (BiomeType::TemperateGrassland, 0.06),
    (BiomeType::Savanna, 0.06),
    (BiomeType::Scrub, 0.04),
    (BiomeType::Deserts, 0.08),
];

/// `(biome, use fraction, land share)` for human-use biomes: the land share is
/// the slice of land devoted to the use category, the use fraction splits it.
const HUMAN_USE_SHARES: [(BiomeType, f64, f64); 3] = [
    (BiomeType::Urban, 1.0, 0.01),
    (BiomeType::Cropland, 0.33, 0.37),
    (BiomeType::Pastureland, 0.67, 0.37),
];

/// World population for `year`, rounded to the nearest person.
///
/// Piecewise compound model anchored at 2023: decline going backwards, then
/// three forward growth regimes each chained from the end of the previous one.
pub fn population(year: i32) -> f64 {
    let raw = if year < BASE_YEAR {
        BASE_POPULATION / (1.0 + DECLINE_BEFORE_BASE).powi(BASE_YEAR.saturating_sub(year))
    } else if year <= 2030 {
        BASE_POPULATION * (1.0 + GROWTH_TO_2030).powi(year - BASE_YEAR)
    } else if year <= 2050 {
        let at_2030 = BASE_POPULATION * (1.0 + GROWTH_TO_2030).powi(2030 - BASE_YEAR);
        at_2030 * (1.0 + GROWTH_TO_2050).powi(year - 2030)
    } else {
        let at_2030 = BASE_POPULATION * (1.0 + GROWTH_TO_2030).powi(2030 - BASE_YEAR);
        let at_2050 = at_2030 * (1.0 + GROWTH_TO_2050).powi(20);
        at_2050 * (1.0 + GROWTH_AFTER_2050).powi(year - 2050)
    };
    raw.round()
}

/// Surface area per person in m² for `year`.
///
/// Population is floored at one person, so pathological years that drive the
/// model to zero (or overflow it) still yield a finite, positive area.
pub fn area_per_person(year: i32) -> f64 {
    let people = population(year);
    let people = if people.is_finite() { people.max(1.0) } else { f64::MAX };
    EARTH_SURFACE_M2 / people
}

/// Fraction of the total surface assigned to `biome`.
pub fn surface_fraction(biome: BiomeType) -> f64 {
    match biome {
        BiomeType::Saltwater => SALTWATER_FRACTION,
        BiomeType::Freshwater => FRESHWATER_FRACTION,
        _ => {
            if let Some(&(_, share)) = NATURAL_LAND_SHARES.iter().find(|(b, _)| *b == biome) {
                share * LAND_FRACTION
            } else if let Some(&(_, use_fraction, land_share)) =
                HUMAN_USE_SHARES.iter().find(|(b, _, _)| *b == biome)
            {
                use_fraction * land_share * LAND_FRACTION
            } else {
                0.0
            }
        }
    }
}

/// Per-biome area in m² per person for a given year.
#[derive(Clone, Debug, PartialEq)]
pub struct AreaBreakdown {
    year: i32,
    area_per_person: f64,
    areas: [f64; BiomeType::COUNT],
}

impl AreaBreakdown {
    /// Build the breakdown for `year`.
    pub fn for_year(year: i32) -> Self {
        let area_per_person = area_per_person(year);
        let mut areas = [0.0; BiomeType::COUNT];
        for biome in BiomeType::ALL {
            areas[biome.index()] = surface_fraction(biome) * area_per_person;
        }
        Self {
            year,
            area_per_person,
            areas,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// Total surface area per person in m².
    pub fn area_per_person(&self) -> f64 {
        self.area_per_person
    }

    /// Area in m² per person for `biome`.
    pub fn area(&self, biome: BiomeType) -> f64 {
        self.areas[biome.index()]
    }

    /// Area for a biome given by label; unknown labels fail closed to 0.
    pub fn area_by_name(&self, name: &str) -> f64 {
        BiomeType::from_name(name).map_or(0.0, |b| self.area(b))
    }

    /// `area(biome) / area_per_person`, i.e. the biome's share of the grid.
    pub fn fraction(&self, biome: BiomeType) -> f64 {
        if self.area_per_person > 0.0 {
            self.area(biome) / self.area_per_person
        } else {
            0.0
        }
    }
}
