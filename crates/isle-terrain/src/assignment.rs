//! The immutable result of a generation run: one biome per grid cell.

use crate::biome::{BiomeType, elevation_for};
use crate::error::GenerationError;
use crate::grid::{GridSpec, TileCoord};
use crate::seed::digest_labels;

/// Complete coordinate → biome mapping for one grid.
///
/// Always holds exactly `N²` labels; construction fails otherwise.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    grid: GridSpec,
    labels: Vec<BiomeType>,
}

impl Assignment {
    /// Seal a row-major slot vector. Any empty slot or a length other than
    /// `N²` is an internal invariant failure.
    pub fn from_slots(
        grid: GridSpec,
        slots: Vec<Option<BiomeType>>,
    ) -> Result<Self, GenerationError> {
        let expected = grid.tile_count();
        let filled = slots.iter().filter(|s| s.is_some()).count();
        if slots.len() != expected || filled != expected {
            return Err(GenerationError::IncompleteAssignment {
                expected,
                actual: filled,
            });
        }
        let labels = slots.into_iter().flatten().collect();
        Ok(Self { grid, labels })
    }

    pub fn grid(&self) -> &GridSpec {
        &self.grid
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Row-major labels.
    pub fn labels(&self) -> &[BiomeType] {
        &self.labels
    }

    pub fn get(&self, coord: TileCoord) -> Option<BiomeType> {
        self.grid.index_of(coord).map(|i| self.labels[i])
    }

    /// Point lookup; `None` outside the grid.
    pub fn biome_at(&self, x: i32, z: i32) -> Option<BiomeType> {
        self.get(TileCoord::new(x, z))
    }

    /// Flat render height of the cell at `(x, z)`.
    pub fn elevation_at(&self, x: i32, z: i32) -> Option<f32> {
        self.biome_at(x, z).map(elevation_for)
    }

    /// `(coord, biome)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (TileCoord, BiomeType)> + '_ {
        self.labels
            .iter()
            .enumerate()
            .map(|(i, &b)| (self.grid.coord_of(i), b))
    }

    /// Tile count per biome, indexed by [`BiomeType::index`].
    pub fn counts(&self) -> [u64; BiomeType::COUNT] {
        let mut counts = [0u64; BiomeType::COUNT];
        for biome in &self.labels {
            counts[biome.index()] += 1;
        }
        counts
    }

    pub fn count(&self, biome: BiomeType) -> u64 {
        self.labels.iter().filter(|&&b| b == biome).count() as u64
    }

    /// Deterministic digest of the label stream.
    pub fn digest(&self) -> u64 {
        digest_labels(&self.labels)
    }

    /// Replace the label at `index`. Only the pipeline's own passes use this,
    /// before the assignment is published.
    pub(crate) fn relabel(&mut self, index: usize, biome: BiomeType) {
        self.labels[index] = biome;
    }
}
