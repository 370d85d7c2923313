//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, PlacementMode};

/// Island generator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "isle", about = "Population-driven biome island generator")]
pub struct CliArgs {
    /// Year driving the population model.
    #[arg(long, allow_negative_numbers = true)]
    pub year: Option<i32>,

    /// Explicit grid dimension (clamped to 50..=500, forced odd).
    #[arg(long)]
    pub grid_size: Option<u32>,

    /// Use the fixed 141x141 grid instead of population sizing.
    #[arg(long)]
    pub no_population_sizing: bool,

    /// Terrain seed.
    #[arg(long, allow_negative_numbers = true)]
    pub seed: Option<f64>,

    /// Rescale quotas to the global ocean fraction.
    #[arg(long)]
    pub enforce_ocean: bool,

    /// Skip rivers, lakes, and wetlands.
    #[arg(long)]
    pub no_water: bool,

    /// Use per-cell quota enforcement instead of exact-count placement.
    #[arg(long)]
    pub enforced_placement: bool,

    /// Write a PNG biome map.
    #[arg(long)]
    pub png: bool,

    /// Print the report as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config. Flags only ever switch a
    /// setting on or off in one direction; absent flags leave it alone.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let generation = &mut self.generation;
        if let Some(year) = args.year {
            generation.year = year;
        }
        if let Some(size) = args.grid_size {
            generation.grid_size = Some(size);
        }
        if args.no_population_sizing {
            generation.population_sizing = false;
        }
        if let Some(seed) = args.seed {
            generation.seed = Some(seed);
        }
        if args.enforce_ocean {
            generation.enforce_ocean_quota = true;
        }
        if args.no_water {
            generation.water_features = false;
        }
        if args.enforced_placement {
            generation.placement = PlacementMode::Enforced;
        }
        if args.png {
            self.output.write_png = true;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
