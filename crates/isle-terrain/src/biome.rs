//! Biome labels: the closed set of terrain classes covering the island grid.

use serde::{Deserialize, Serialize};

/// Flat height used for saltwater and freshwater tiles.
pub const WATER_ELEVATION: f32 = 0.2;

/// Flat height used for every land biome.
pub const LAND_ELEVATION: f32 = 1.0;

/// One of the fourteen fixed terrain classes.
///
/// The discriminant doubles as the index into per-biome arrays such as
/// [`Quota`](crate::Quota) and [`QuotaState`](crate::QuotaState).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BiomeType {
    Mountains,
    Tundra,
    BorealForest,
    TemperateForest,
    TropicalRainforest,
    TemperateGrassland,
    Savanna,
    Scrub,
    Deserts,
    Urban,
    Cropland,
    Pastureland,
    Saltwater,
    Freshwater,
}

impl BiomeType {
    /// Number of biome labels.
    pub const COUNT: usize = 14;

    /// Every biome, in declaration order. This is the fixed iteration order
    /// used wherever "any biome" must be resolved deterministically.
    pub const ALL: [BiomeType; Self::COUNT] = [
        BiomeType::Mountains,
        BiomeType::Tundra,
        BiomeType::BorealForest,
        BiomeType::TemperateForest,
        BiomeType::TropicalRainforest,
        BiomeType::TemperateGrassland,
        BiomeType::Savanna,
        BiomeType::Scrub,
        BiomeType::Deserts,
        BiomeType::Urban,
        BiomeType::Cropland,
        BiomeType::Pastureland,
        BiomeType::Saltwater,
        BiomeType::Freshwater,
    ];

    /// The biome that absorbs quota rounding residue.
    pub const ABSORBER: BiomeType = BiomeType::Saltwater;

    /// Index into per-biome arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Stable label, matching the serialized form.
    pub fn name(self) -> &'static str {
        match self {
            BiomeType::Mountains => "mountains",
            BiomeType::Tundra => "tundra",
            BiomeType::BorealForest => "borealForest",
            BiomeType::TemperateForest => "temperateForest",
            BiomeType::TropicalRainforest => "tropicalRainforest",
            BiomeType::TemperateGrassland => "temperateGrassland",
            BiomeType::Savanna => "savanna",
            BiomeType::Scrub => "scrub",
            BiomeType::Deserts => "deserts",
            BiomeType::Urban => "urban",
            BiomeType::Cropland => "cropland",
            BiomeType::Pastureland => "pastureland",
            BiomeType::Saltwater => "saltwater",
            BiomeType::Freshwater => "freshwater",
        }
    }

    /// Looks a biome up by its label. Unknown labels yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|b| b.name() == name)
    }

    /// `true` for the ocean class (saltwater only).
    pub fn is_ocean(self) -> bool {
        self == BiomeType::Saltwater
    }

    /// `true` for both water classes.
    pub fn is_water(self) -> bool {
        matches!(self, BiomeType::Saltwater | BiomeType::Freshwater)
    }

    /// `true` for biomes shaped by human land use.
    pub fn is_human_use(self) -> bool {
        matches!(
            self,
            BiomeType::Urban | BiomeType::Cropland | BiomeType::Pastureland
        )
    }

    /// Debug color used by the biome map renderer.
    pub fn color(self) -> (u8, u8, u8) {
        match self {
            BiomeType::Mountains => (130, 110, 90),
            BiomeType::Tundra => (200, 210, 220),
            BiomeType::BorealForest => (40, 90, 60),
            BiomeType::TemperateForest => (30, 120, 30),
            BiomeType::TropicalRainforest => (10, 80, 20),
            BiomeType::TemperateGrassland => (100, 180, 60),
            BiomeType::Savanna => (180, 170, 60),
            BiomeType::Scrub => (150, 140, 90),
            BiomeType::Deserts => (220, 190, 80),
            BiomeType::Urban => (90, 90, 100),
            BiomeType::Cropland => (210, 180, 40),
            BiomeType::Pastureland => (140, 200, 90),
            BiomeType::Saltwater => (20, 50, 180),
            BiomeType::Freshwater => (60, 140, 230),
        }
    }
}

impl std::fmt::Display for BiomeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Flat per-class height handed to the renderer. Not a heightmap.
pub fn elevation_for(biome: BiomeType) -> f32 {
    if biome.is_water() {
        WATER_ELEVATION
    } else {
        LAND_ELEVATION
    }
}
