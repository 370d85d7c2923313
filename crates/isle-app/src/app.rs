//! One command-line run: config in, report and optional PNG out.

use std::path::PathBuf;

use isle_config::{
    CONFIG_FILE, CliArgs, Config, ConfigError, GenerationConfig, PlacementMode as ConfigPlacement,
};
use isle_terrain::{
    GenerationError, GenerationOutput, GenerationParams, IslandGenerator, PlacementMode,
    TerrainSeed, render_assignment,
};

use crate::platform::{PlatformDirs, PlatformError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Platform(#[from] PlatformError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

/// Map persisted settings onto generation inputs. A missing seed becomes the
/// process-wide seed, drawn once.
pub fn params_from_config(generation: &GenerationConfig) -> GenerationParams {
    GenerationParams {
        year: generation.year,
        population_sizing: generation.population_sizing,
        grid_size_override: generation.grid_size,
        seed: generation
            .seed
            .map_or_else(TerrainSeed::process, TerrainSeed),
        enforce_ocean_quota: generation.enforce_ocean_quota,
        water_features: generation.water_features,
        placement: match generation.placement {
            ConfigPlacement::ExactCount => PlacementMode::ExactCount,
            ConfigPlacement::Enforced => PlacementMode::Enforced,
        },
    }
}

/// Effective config plus where it came from.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// The file was missing and defaults were written.
    pub created: bool,
}

/// Load `config.ron` from `--config` or the platform config dir, then apply
/// CLI overrides. Runs before logging exists; see [`log_config_source`].
pub fn load_config(args: &CliArgs, dirs: &PlatformDirs) -> Result<LoadedConfig, AppError> {
    let config_dir = args.config.as_ref().unwrap_or(&dirs.config_dir);
    let path = config_dir.join(CONFIG_FILE);
    let created = !path.exists();
    let mut config = Config::load_or_create(config_dir)?;
    config.apply_cli_overrides(args);
    config.validate()?;
    Ok(LoadedConfig {
        config,
        path,
        created,
    })
}

/// Record the config source once a subscriber is installed.
pub fn log_config_source(loaded: &LoadedConfig) {
    if loaded.created {
        tracing::info!(path = %loaded.path.display(), "created default config");
    } else {
        tracing::info!(path = %loaded.path.display(), "loaded config");
    }
}

/// What a run produced.
pub struct RunOutcome {
    pub output: std::sync::Arc<GenerationOutput>,
    pub png_path: Option<PathBuf>,
}

/// Generate once and write the PNG if configured. Does not touch logging.
pub fn execute(config: &Config, dirs: &PlatformDirs) -> Result<RunOutcome, AppError> {
    let params = params_from_config(&config.generation);
    tracing::debug!(?params, "starting generation");
    let generator = IslandGenerator::new();
    let output = generator.generate(params)?;

    let png_path = if config.output.write_png {
        let path = dirs.data_dir.join(&config.output.file_name);
        let image = render_assignment(&output.assignment, config.output.png_scale);
        let bytes = image.encode_png()?;
        std::fs::write(&path, bytes).map_err(|source| AppError::Write {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "biome map written");
        Some(path)
    } else {
        None
    };

    Ok(RunOutcome { output, png_path })
}

/// Text printed to stdout for a finished run.
pub fn render_report(outcome: &RunOutcome, json: bool) -> Result<String, AppError> {
    let report = &outcome.output.report;
    if json {
        return Ok(serde_json::to_string_pretty(report)?);
    }
    let mut text = report.to_string();
    if let Some(path) = &outcome.png_path {
        text.push_str(&format!("\nbiome map: {}", path.display()));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use isle_terrain::BiomeType;

    fn temp_dirs() -> (tempfile::TempDir, PlatformDirs) {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        (tmp, dirs)
    }

    #[test]
    fn test_params_mapping() {
        let generation = GenerationConfig {
            year: 1990,
            population_sizing: false,
            grid_size: Some(75),
            seed: Some(12.0),
            enforce_ocean_quota: true,
            water_features: false,
            placement: ConfigPlacement::Enforced,
        };
        let params = params_from_config(&generation);
        assert_eq!(params.year, 1990);
        assert!(!params.population_sizing);
        assert_eq!(params.grid_size_override, Some(75));
        assert_eq!(params.seed, TerrainSeed(12.0));
        assert!(params.enforce_ocean_quota);
        assert!(!params.water_features);
        assert_eq!(params.placement, PlacementMode::Enforced);
    }

    #[test]
    fn test_missing_seed_is_held_fixed() {
        let generation = GenerationConfig::default();
        let a = params_from_config(&generation);
        let b = params_from_config(&generation);
        assert_eq!(a.seed, b.seed);
    }

    #[test]
    fn test_config_dir_override() {
        let (tmp, dirs) = temp_dirs();
        let custom = tmp.path().join("custom");
        let args = CliArgs {
            config: Some(custom.clone()),
            year: Some(2030),
            ..CliArgs::default()
        };
        let loaded = load_config(&args, &dirs).unwrap();
        assert_eq!(loaded.config.generation.year, 2030);
        assert_eq!(loaded.path, custom.join(CONFIG_FILE));
        assert!(custom.join(CONFIG_FILE).exists());
        assert!(!dirs.config_dir.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_config_source_tracks_creation() {
        let (_tmp, dirs) = temp_dirs();
        let args = CliArgs::default();
        let first = load_config(&args, &dirs).unwrap();
        assert!(first.created);
        assert_eq!(first.path, dirs.config_dir.join(CONFIG_FILE));
        let second = load_config(&args, &dirs).unwrap();
        assert!(!second.created);
        assert_eq!(first.config, second.config);
    }

    #[test]
    fn test_execute_writes_png() {
        let (_tmp, dirs) = temp_dirs();
        let mut config = Config::default();
        config.generation.grid_size = Some(51);
        config.generation.seed = Some(3.0);
        config.output.write_png = true;

        let outcome = execute(&config, &dirs).unwrap();
        let path = outcome.png_path.clone().expect("png path missing");
        assert_eq!(path, dirs.data_dir.join("island.png"));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");

        let text = render_report(&outcome, false).unwrap();
        assert!(text.contains("biome map:"));
        assert!(text.contains(BiomeType::Saltwater.name()));
    }

    #[test]
    fn test_json_report() {
        let (_tmp, dirs) = temp_dirs();
        let mut config = Config::default();
        config.generation.grid_size = Some(51);
        config.generation.seed = Some(3.0);

        let outcome = execute(&config, &dirs).unwrap();
        assert!(outcome.png_path.is_none());
        let json = render_report(&outcome, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["grid_size"], 51);
        assert_eq!(value["tile_count"], 2601);
    }
}
