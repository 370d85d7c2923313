//! The generation pipeline and the guarded front end the renderer talks to.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

use crate::assignment::Assignment;
use crate::biome::{BiomeType, elevation_for};
use crate::cluster::BiomeClusterAssigner;
use crate::enforcer::QuotaEnforcer;
use crate::error::GenerationError;
use crate::grid::{SizeMode, grid_for};
use crate::placement::{ExactCountPlacer, PlacementMode, place_enforced};
use crate::population::AreaBreakdown;
use crate::quota::{QuotaState, compute_quota, enforce_ocean_ratio, max_ocean_tiles};
use crate::report::GenerationReport;
use crate::seed::{SeededHash, TerrainSeed};
use crate::water::WaterFeatureOverlay;

/// Inputs for one generation run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenerationParams {
    pub year: i32,
    /// Size the grid from area per person instead of the fixed dimension.
    pub population_sizing: bool,
    /// Explicit dimension; wins over `population_sizing`.
    pub grid_size_override: Option<u32>,
    pub seed: TerrainSeed,
    /// Rescale quotas so saltwater matches the global ocean fraction.
    pub enforce_ocean_quota: bool,
    pub water_features: bool,
    pub placement: PlacementMode,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            year: crate::population::BASE_YEAR,
            population_sizing: true,
            grid_size_override: None,
            seed: TerrainSeed::process(),
            enforce_ocean_quota: false,
            water_features: true,
            placement: PlacementMode::ExactCount,
        }
    }
}

impl GenerationParams {
    pub fn size_mode(&self) -> SizeMode {
        match self.grid_size_override {
            Some(size) => SizeMode::Explicit(size),
            None if self.population_sizing => SizeMode::Population,
            None => SizeMode::Fixed,
        }
    }
}

/// Everything a finished run publishes.
#[derive(Clone, Debug)]
pub struct GenerationOutput {
    pub params: GenerationParams,
    pub assignment: Assignment,
    /// Quota bookkeeping as left by placement.
    pub quota_state: QuotaState,
    pub report: GenerationReport,
}

/// Run the full pipeline once. Pure in `params`: the same inputs always give
/// the same assignment.
pub fn run_generation(params: &GenerationParams) -> Result<GenerationOutput, GenerationError> {
    let start = Instant::now();
    let grid = grid_for(params.size_mode(), params.year);
    let breakdown = AreaBreakdown::for_year(params.year);

    let mut quota = compute_quota(&grid, &breakdown);
    let ocean_ceiling = if params.enforce_ocean_quota {
        quota = enforce_ocean_ratio(&grid, &quota);
        Some(max_ocean_tiles(&grid))
    } else {
        None
    };

    let hash = SeededHash::new(params.seed);
    let samples = BiomeClusterAssigner::new(grid, hash).sample_all();

    let (mut assignment, quota_state) = match params.placement {
        PlacementMode::ExactCount => {
            let preferences: Vec<BiomeType> = samples.iter().map(|s| s.preferred).collect();
            ExactCountPlacer::new(grid).place(&quota, Some(&preferences))?
        }
        PlacementMode::Enforced => {
            let enforcer = QuotaEnforcer::new(hash);
            let (assignment, state, _) = place_enforced(grid, &samples, &quota, &enforcer)?;
            (assignment, state)
        }
    };

    let converted = if params.water_features {
        WaterFeatureOverlay::new(hash).apply(&mut assignment, &samples)?
    } else {
        0
    };

    let report = GenerationReport::build(
        params.year,
        params.seed.0,
        &assignment,
        &quota_state,
        converted,
        ocean_ceiling,
    );
    tracing::info!(
        target: "isle_terrain::generator",
        year = params.year,
        grid = grid.size(),
        tiles = grid.tile_count(),
        water = converted,
        digest = report.digest,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "island generated"
    );

    Ok(GenerationOutput {
        params: *params,
        assignment,
        quota_state,
        report,
    })
}

/// Clears the in-progress flag when a run ends, including on error.
struct InProgress<'a>(&'a AtomicBool);

impl Drop for InProgress<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Guarded generation front end.
///
/// Only one run may be in flight; overlapping requests are rejected with
/// [`GenerationError::Busy`] rather than queued. Each run builds a fresh
/// [`Assignment`]; the last successful one is kept for point queries.
#[derive(Default)]
pub struct IslandGenerator {
    in_progress: AtomicBool,
    last: RwLock<Option<Arc<GenerationOutput>>>,
}

impl IslandGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_generating(&self) -> bool {
        self.in_progress.load(Ordering::Acquire)
    }

    /// Run a generation and publish it. Failed runs leave the previous
    /// result in place.
    pub fn generate(
        &self,
        params: GenerationParams,
    ) -> Result<Arc<GenerationOutput>, GenerationError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::warn!(
                target: "isle_terrain::generator",
                "generation already running, request dropped"
            );
            return Err(GenerationError::Busy);
        }
        let _guard = InProgress(&self.in_progress);

        let output = Arc::new(run_generation(&params)?);
        *self.last.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&output));
        Ok(output)
    }

    /// The last published run, if any.
    pub fn last(&self) -> Option<Arc<GenerationOutput>> {
        self.last
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_report(&self) -> Option<GenerationReport> {
        self.last().map(|out| out.report.clone())
    }

    /// Biome at `(x, z)` in the last published run.
    pub fn biome_at(&self, x: i32, z: i32) -> Option<BiomeType> {
        self.last().and_then(|out| out.assignment.biome_at(x, z))
    }

    /// Flat render height at `(x, z)` in the last published run.
    pub fn elevation_at(&self, x: i32, z: i32) -> Option<f32> {
        self.biome_at(x, z).map(elevation_for)
    }
}
