//! Per-run statistics for display and logging.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::assignment::Assignment;
use crate::biome::BiomeType;
use crate::population::SALTWATER_FRACTION;
use crate::quota::QuotaState;

/// Target versus actual for one biome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BiomeRow {
    pub biome: BiomeType,
    pub target: u64,
    pub actual: u64,
    /// Placement bookkeeping; does not reflect the water overlay.
    pub remaining: i64,
    /// `target − actual` after every pass. Negative means over-allocated.
    pub unfulfilled: i64,
    /// Share of the grid, in percent.
    pub percent: f64,
}

/// Summary of a finished generation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    pub year: i32,
    pub seed: f64,
    pub grid_size: u32,
    pub tile_count: usize,
    pub rows: Vec<BiomeRow>,
    /// Land cells turned into freshwater by the overlay.
    pub water_converted: usize,
    /// Actual saltwater minus its literal `N² × 0.6903` target.
    pub absorber_deviation: f64,
    /// Saltwater ceiling when ocean enforcement was on.
    pub max_ocean_tiles: Option<u64>,
    pub digest: u64,
}

impl GenerationReport {
    pub fn build(
        year: i32,
        seed: f64,
        assignment: &Assignment,
        state: &QuotaState,
        water_converted: usize,
        max_ocean_tiles: Option<u64>,
    ) -> Self {
        let tile_count = assignment.len();
        let counts = assignment.counts();
        let rows = BiomeType::ALL
            .iter()
            .map(|&biome| {
                let target = state.target().get(biome);
                let actual = counts[biome.index()];
                BiomeRow {
                    biome,
                    target,
                    actual,
                    remaining: state.remaining(biome),
                    unfulfilled: target as i64 - actual as i64,
                    percent: if tile_count == 0 {
                        0.0
                    } else {
                        actual as f64 * 100.0 / tile_count as f64
                    },
                }
            })
            .collect();
        let saltwater = counts[BiomeType::Saltwater.index()] as f64;
        Self {
            year,
            seed,
            grid_size: assignment.grid().size(),
            tile_count,
            rows,
            water_converted,
            absorber_deviation: saltwater - tile_count as f64 * SALTWATER_FRACTION,
            max_ocean_tiles,
            digest: assignment.digest(),
        }
    }

    pub fn row(&self, biome: BiomeType) -> Option<&BiomeRow> {
        self.rows.iter().find(|r| r.biome == biome)
    }

    pub fn actual(&self, biome: BiomeType) -> u64 {
        self.row(biome).map_or(0, |r| r.actual)
    }

    pub fn target(&self, biome: BiomeType) -> u64 {
        self.row(biome).map_or(0, |r| r.target)
    }

    pub fn percentage(&self, biome: BiomeType) -> f64 {
        self.row(biome).map_or(0.0, |r| r.percent)
    }

    /// Biomes whose final count differs from the target.
    pub fn unfulfilled(&self) -> impl Iterator<Item = &BiomeRow> {
        self.rows.iter().filter(|r| r.unfulfilled != 0)
    }
}

impl fmt::Display for GenerationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "year {} | seed {} | grid {}x{} ({} tiles) | digest {:016x}",
            self.year, self.seed, self.grid_size, self.grid_size, self.tile_count, self.digest
        )?;
        writeln!(
            f,
            "{:<20} {:>8} {:>8} {:>8} {:>7}",
            "biome", "target", "actual", "delta", "%"
        )?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<20} {:>8} {:>8} {:>8} {:>6.2}%",
                row.biome.name(),
                row.target,
                row.actual,
                row.unfulfilled,
                row.percent
            )?;
        }
        write!(
            f,
            "water overlay: {} cells | saltwater deviation: {:+.1}",
            self.water_converted, self.absorber_deviation
        )?;
        if let Some(max) = self.max_ocean_tiles {
            write!(f, " | ocean ceiling: {max}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;
    use crate::quota::Quota;

    fn sample_report() -> GenerationReport {
        let grid = GridSpec::new(3);
        let mut slots = vec![Some(BiomeType::Saltwater); 9];
        slots[4] = Some(BiomeType::Freshwater);
        let assignment = Assignment::from_slots(grid, slots).unwrap();
        let quota = Quota::from_counts(&[(BiomeType::Scrub, 1), (BiomeType::Saltwater, 8)]);
        let mut state = QuotaState::new(quota);
        for _ in 0..8 {
            state.consume(BiomeType::Saltwater);
        }
        state.consume(BiomeType::Scrub);
        GenerationReport::build(2023, 1.0, &assignment, &state, 1, None)
    }

    #[test]
    fn test_overlay_shows_as_unfulfilled() {
        let report = sample_report();
        let scrub = report.row(BiomeType::Scrub).unwrap();
        assert_eq!(scrub.remaining, 0, "placement bookkeeping was complete");
        assert_eq!(scrub.unfulfilled, 1);
        let fresh = report.row(BiomeType::Freshwater).unwrap();
        assert_eq!(fresh.unfulfilled, -1);
        assert_eq!(report.unfulfilled().count(), 2);
    }

    #[test]
    fn test_percentages_sum_to_hundred() {
        let report = sample_report();
        let sum: f64 = report.rows.iter().map(|r| r.percent).sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert_eq!(report.actual(BiomeType::Saltwater), 8);
        assert_eq!(report.target(BiomeType::Scrub), 1);
    }

    #[test]
    fn test_report_serializes() {
        let report = sample_report();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"saltwater\""));
        let back: GenerationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.digest, report.digest);
        assert_eq!(back.actual(BiomeType::Freshwater), 1);
    }

    #[test]
    fn test_display_lists_every_biome() {
        let text = sample_report().to_string();
        for biome in BiomeType::ALL {
            assert!(text.contains(biome.name()), "missing {biome}");
        }
    }
}
