//! Biome allocation and island generation: population-driven quotas, spatial
//! clustering, exact-count placement, and a freshwater overlay.

mod assignment;
mod async_generation;
mod error;
mod generator;
mod report;

pub mod biome;
pub mod cluster;
pub mod debug_viz;
pub mod enforcer;
pub mod grid;
pub mod placement;
pub mod population;
pub mod quota;
pub mod seed;
pub mod water;

pub use assignment::Assignment;
pub use async_generation::{GenerationResult, IslandWorker, RESULT_CAPACITY};
pub use biome::{BiomeType, LAND_ELEVATION, WATER_ELEVATION, elevation_for};
pub use cluster::{BiomeClusterAssigner, CellSample, SeedRegion, default_seed_regions};
pub use debug_viz::{DebugImage, render_assignment};
pub use enforcer::{PlacementSource, QuotaEnforcer};
pub use error::GenerationError;
pub use generator::{GenerationOutput, GenerationParams, IslandGenerator, run_generation};
pub use grid::{GridSpec, SizeMode, TileCoord, grid_for};
pub use placement::{ExactCountPlacer, PlacementMode, SourceTally, place_enforced, radial_order};
pub use population::{AreaBreakdown, area_per_person, population};
pub use quota::{Quota, QuotaState, compute_quota, enforce_ocean_ratio, max_ocean_tiles};
pub use report::{BiomeRow, GenerationReport};
pub use seed::{SeededHash, TerrainSeed};
pub use water::{WaterFeature, WaterFeatureOverlay, default_water_features};
