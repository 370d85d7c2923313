//! Grid sizing and tile coordinates.

use serde::{Deserialize, Serialize};

use crate::population::area_per_person;

/// Smallest allowed grid dimension.
pub const MIN_GRID_SIZE: u32 = 50;

/// Largest allowed grid dimension.
pub const MAX_GRID_SIZE: u32 = 500;

/// Dimension used when population-based sizing is disabled.
pub const FIXED_GRID_SIZE: u32 = 141;

/// Integer tile coordinate, centered on the island origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i32,
    pub z: i32,
}

impl TileCoord {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Squared distance from the origin. Exact, so it can be used for
    /// equality grouping.
    #[inline]
    pub fn distance_squared(self) -> i64 {
        let x = self.x as i64;
        let z = self.z as i64;
        x * x + z * z
    }
}

/// Dimension of the square grid and the derived coordinate range.
///
/// Coordinates span `[-half_size, half_size]` on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSpec {
    size: u32,
}

impl GridSpec {
    /// Create a grid of dimension `size`. Sizes below 1 are raised to 1 and
    /// even sizes are bumped to the next odd value so the origin is a cell.
    pub fn new(size: u32) -> Self {
        let size = size.max(1);
        let size = if size % 2 == 0 { size + 1 } else { size };
        Self { size }
    }

    /// Grid dimension `N`.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// `⌊N / 2⌋`.
    pub fn half_size(&self) -> i32 {
        (self.size / 2) as i32
    }

    /// `N²`.
    pub fn tile_count(&self) -> usize {
        self.size as usize * self.size as usize
    }

    pub fn contains(&self, coord: TileCoord) -> bool {
        let h = self.half_size();
        (-h..=h).contains(&coord.x) && (-h..=h).contains(&coord.z)
    }

    /// Row-major index of `coord` (rows are `z`, columns are `x`).
    pub fn index_of(&self, coord: TileCoord) -> Option<usize> {
        if !self.contains(coord) {
            return None;
        }
        let h = self.half_size();
        let col = (coord.x + h) as usize;
        let row = (coord.z + h) as usize;
        Some(row * self.size as usize + col)
    }

    /// Inverse of [`index_of`](Self::index_of).
    pub fn coord_of(&self, index: usize) -> TileCoord {
        let n = self.size as usize;
        let h = self.half_size();
        TileCoord::new((index % n) as i32 - h, (index / n) as i32 - h)
    }

    /// All coordinates in row-major order.
    pub fn coords(&self) -> impl Iterator<Item = TileCoord> + '_ {
        (0..self.tile_count()).map(|i| self.coord_of(i))
    }

    /// Radius (in tiles) of the island proper: `half_size × 0.65`.
    pub fn island_radius(&self) -> f64 {
        self.half_size() as f64 * 0.65
    }
}

/// How the grid dimension is chosen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SizeMode {
    /// Fixed [`FIXED_GRID_SIZE`].
    Fixed,
    /// `√(area per person)` for the selected year, clamped to
    /// `[MIN_GRID_SIZE, MAX_GRID_SIZE]`.
    Population,
    /// Explicit dimension, clamped the same way.
    Explicit(u32),
}

/// Chooses a grid dimension: clamp, then force odd.
pub fn grid_for(mode: SizeMode, year: i32) -> GridSpec {
    let raw = match mode {
        SizeMode::Fixed => FIXED_GRID_SIZE,
        SizeMode::Population => {
            let side = area_per_person(year).sqrt().floor();
            // `as` saturates, so huge areas land on MAX_GRID_SIZE via the clamp.
            side as u32
        }
        SizeMode::Explicit(n) => n,
    };
    let clamped = raw.clamp(MIN_GRID_SIZE, MAX_GRID_SIZE);
    if clamped != raw {
        tracing::debug!(
            target: "isle_terrain::grid",
            requested = raw,
            clamped,
            "grid size clamped"
        );
    }
    GridSpec::new(clamped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_mode_ignores_year() {
        assert_eq!(grid_for(SizeMode::Fixed, 1800).size(), 141);
        assert_eq!(grid_for(SizeMode::Fixed, 2100).size(), 141);
    }

    #[test]
    fn test_population_mode_is_clamped_and_odd() {
        for year in [1000, 1900, 2023, 2050, 2300, 5000] {
            let grid = grid_for(SizeMode::Population, year);
            let n = grid.size();
            assert!(n % 2 == 1, "size {n} for {year} is even");
            assert!((MIN_GRID_SIZE..=MAX_GRID_SIZE + 1).contains(&n));
        }
    }

    #[test]
    fn test_population_mode_at_anchor() {
        // √(510_072e9 / 8_045_311_447) ≈ 251.8 → 251 (already odd).
        assert_eq!(grid_for(SizeMode::Population, 2023).size(), 251);
    }

    #[test]
    fn test_explicit_clamp_extremes() {
        assert_eq!(grid_for(SizeMode::Explicit(10), 2023).size(), 51);
        assert_eq!(grid_for(SizeMode::Explicit(51), 2023).size(), 51);
        assert_eq!(grid_for(SizeMode::Explicit(10_000), 2023).size(), 501);
        assert_eq!(grid_for(SizeMode::Explicit(499), 2023).size(), 499);
    }

    #[test]
    fn test_half_size_and_tile_count() {
        let grid = GridSpec::new(51);
        assert_eq!(grid.half_size(), 25);
        assert_eq!(grid.tile_count(), 2601);
    }

    #[test]
    fn test_index_round_trip_covers_grid() {
        let grid = GridSpec::new(7);
        let mut seen = vec![false; grid.tile_count()];
        for coord in grid.coords() {
            let i = grid.index_of(coord).unwrap();
            assert!(!seen[i], "duplicate index {i}");
            seen[i] = true;
            assert_eq!(grid.coord_of(i), coord);
        }
        assert!(seen.iter().all(|&s| s));
        assert_eq!(grid.index_of(TileCoord::new(4, 0)), None);
    }

    #[test]
    fn test_distance_squared_exact() {
        assert_eq!(TileCoord::new(3, -4).distance_squared(), 25);
        assert_eq!(TileCoord::new(0, 0).distance_squared(), 0);
    }
}
