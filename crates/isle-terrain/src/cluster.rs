//! Geographic biome clustering: a per-cell "natural" biome preference.
//!
//! Each cell is mapped to island-relative coordinates, given a synthetic
//! elevation, matched to the nearest seed region that contains it, and then
//! resolved to one of that region's member biomes. The result is a hint for
//! placement, never an authoritative label.

use rayon::prelude::*;

use crate::biome::BiomeType;
use crate::grid::{GridSpec, TileCoord};
use crate::seed::{SeededHash, det_exp, det_sqrt};

const NOISE_OFFSETS: [(f64, f64); 3] = [(17.0, 1.0), (53.0, 0.6), (97.0, 0.3)];
const MEMBER_PICK_OFFSET: f64 = 211.0;

/// How a seed region resolves one of its members for a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MemberRule {
    /// Three members ordered cold → temperate → warm, split on `iz` at
    /// `±threshold`.
    Latitude { threshold: f64 },
    /// `(min_elevation, biome)` bands, highest first; the first band the cell
    /// reaches wins, otherwise the last band's biome.
    ElevationBands(&'static [(f64, BiomeType)]),
    /// Hash-indexed pick among the members.
    HashPick,
}

/// A fixed geographic anchor that clusters related biomes.
#[derive(Clone, Debug, PartialEq)]
pub struct SeedRegion {
    pub name: &'static str,
    /// Center in island-relative units (roughly `[-1, 1]`).
    pub center: (f64, f64),
    pub radius: f64,
    pub members: &'static [BiomeType],
    pub rule: MemberRule,
}

impl SeedRegion {
    fn distance_to(&self, ix: f64, iz: f64) -> f64 {
        let dx = ix - self.center.0;
        let dz = iz - self.center.1;
        det_sqrt(dx * dx + dz * dz)
    }
}

/// The built-in seed region table. The first entry is the default region for
/// cells no region contains.
pub fn default_seed_regions() -> Vec<SeedRegion> {
    vec![
        SeedRegion {
            name: "forest",
            center: (-0.45, 0.0),
            radius: 0.55,
            members: &[
                BiomeType::BorealForest,
                BiomeType::TemperateForest,
                BiomeType::TropicalRainforest,
            ],
            rule: MemberRule::Latitude { threshold: 0.15 },
        },
        SeedRegion {
            name: "highlands",
            center: (0.0, 0.0),
            radius: 0.3,
            members: &[BiomeType::Mountains, BiomeType::Tundra],
            rule: MemberRule::ElevationBands(&[
                (1.2, BiomeType::Mountains),
                (0.0, BiomeType::Tundra),
            ]),
        },
        SeedRegion {
            name: "grassland",
            center: (0.45, 0.1),
            radius: 0.5,
            members: &[
                BiomeType::TemperateGrassland,
                BiomeType::Savanna,
                BiomeType::Scrub,
            ],
            rule: MemberRule::ElevationBands(&[
                (0.8, BiomeType::TemperateGrassland),
                (0.4, BiomeType::Savanna),
                (0.0, BiomeType::Scrub),
            ]),
        },
        SeedRegion {
            name: "agriculture",
            center: (-0.1, 0.55),
            radius: 0.4,
            members: &[
                BiomeType::Pastureland,
                BiomeType::Cropland,
                BiomeType::Urban,
            ],
            rule: MemberRule::ElevationBands(&[
                (0.9, BiomeType::Pastureland),
                (0.35, BiomeType::Cropland),
                (0.0, BiomeType::Urban),
            ]),
        },
        SeedRegion {
            name: "arid",
            center: (0.55, -0.5),
            radius: 0.4,
            members: &[BiomeType::Deserts, BiomeType::Scrub, BiomeType::Savanna],
            rule: MemberRule::HashPick,
        },
        SeedRegion {
            name: "wetland",
            center: (0.0, -0.55),
            radius: 0.3,
            members: &[
                BiomeType::Freshwater,
                BiomeType::TemperateGrassland,
                BiomeType::Tundra,
            ],
            rule: MemberRule::HashPick,
        },
    ]
}

/// Everything the clustering pass knows about one cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellSample {
    pub coord: TileCoord,
    /// Island-relative x (`x / R`).
    pub ix: f64,
    /// Island-relative z (`z / R`).
    pub iz: f64,
    /// Distance from the origin divided by the island radius.
    pub normalized_distance: f64,
    /// Synthetic elevation, `>= 0`.
    pub elevation: f64,
    pub preferred: BiomeType,
}

/// Computes per-cell biome preferences from seed regions.
pub struct BiomeClusterAssigner {
    grid: GridSpec,
    hash: SeededHash,
    regions: Vec<SeedRegion>,
}

impl BiomeClusterAssigner {
    pub fn new(grid: GridSpec, hash: SeededHash) -> Self {
        Self::with_regions(grid, hash, default_seed_regions())
    }

    /// Use a custom region table. An empty table makes every island cell
    /// fall back to scrub.
    pub fn with_regions(grid: GridSpec, hash: SeededHash, regions: Vec<SeedRegion>) -> Self {
        Self {
            grid,
            hash,
            regions,
        }
    }

    pub fn regions(&self) -> &[SeedRegion] {
        &self.regions
    }

    /// Island radius `R` in tiles, floored at one tile for degenerate grids.
    fn radius(&self) -> f64 {
        self.grid.island_radius().max(1.0)
    }

    /// Synthetic elevation at `coord`.
    ///
    /// A radial falloff plus a diagonal ridge spine, a foothill swell, and
    /// three hash-noise terms.
    pub fn elevation(&self, coord: TileCoord) -> f64 {
        let x = coord.x as f64;
        let z = coord.z as f64;
        let normalized = det_sqrt(x * x + z * z) / self.radius();

        let base = 1.0 - normalized;
        let spine = if (0.3 * x + 0.1 * z).abs() < 20.0 { 1.0 } else { 0.0 };
        let ridge = 0.05 * x + 0.03 * z;
        let foothill = det_exp(-(ridge * ridge)) * 0.8;
        let noise: f64 = NOISE_OFFSETS
            .iter()
            .map(|&(offset, scale)| self.hash.centered(x, z, offset) * scale)
            .sum();

        (base + 0.4 * (spine + foothill) + 0.3 * noise).max(0.0)
    }

    /// Index of the region that claims `(ix, iz)`.
    ///
    /// The closest containing region wins, earlier entries winning ties; if no
    /// region contains the point the first region is used.
    pub fn region_for(&self, ix: f64, iz: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (i, region) in self.regions.iter().enumerate() {
            let d = region.distance_to(ix, iz);
            if d > region.radius {
                continue;
            }
            match best {
                Some((_, best_d)) if d >= best_d => {}
                _ => best = Some((i, d)),
            }
        }
        match best {
            Some((i, _)) => Some(i),
            None if self.regions.is_empty() => None,
            None => Some(0),
        }
    }

    fn resolve_member(&self, region: &SeedRegion, sample: &CellSample) -> BiomeType {
        let members = region.members;
        if members.is_empty() {
            return BiomeType::Scrub;
        }
        match region.rule {
            MemberRule::Latitude { threshold } if members.len() >= 3 => {
                if sample.iz < -threshold {
                    members[0]
                } else if sample.iz > threshold {
                    members[2]
                } else {
                    members[1]
                }
            }
            MemberRule::ElevationBands(bands) if !bands.is_empty() => bands
                .iter()
                .find(|(min, _)| sample.elevation >= *min)
                .map_or(bands[bands.len() - 1].1, |&(_, biome)| biome),
            _ => {
                let x = sample.coord.x as f64;
                let z = sample.coord.z as f64;
                members[self.hash.pick(x, z, MEMBER_PICK_OFFSET, members.len())]
            }
        }
    }

    /// Full sample for one cell. Cells beyond the island radius prefer the
    /// absorber biome.
    pub fn sample(&self, coord: TileCoord) -> CellSample {
        let r = self.radius();
        let ix = coord.x as f64 / r;
        let iz = coord.z as f64 / r;
        let normalized_distance = det_sqrt(ix * ix + iz * iz);
        let mut sample = CellSample {
            coord,
            ix,
            iz,
            normalized_distance,
            elevation: self.elevation(coord),
            preferred: BiomeType::ABSORBER,
        };
        if normalized_distance <= 1.0 {
            sample.preferred = match self.region_for(ix, iz) {
                Some(i) => self.resolve_member(&self.regions[i], &sample),
                None => BiomeType::Scrub,
            };
        }
        sample
    }

    /// Samples for every cell, row-major. Computed in parallel; the output
    /// order does not depend on the thread count.
    pub fn sample_all(&self) -> Vec<CellSample> {
        (0..self.grid.tile_count())
            .into_par_iter()
            .map(|i| self.sample(self.grid.coord_of(i)))
            .collect()
    }
}
