//! Configuration structs with defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name of the persisted config inside a config directory.
pub const CONFIG_FILE: &str = "config.ron";

/// Largest accepted `png_scale`.
pub const MAX_PNG_SCALE: u32 = 32;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Island generation inputs.
    pub generation: GenerationConfig,
    /// What to produce after a run.
    pub output: OutputConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// How placement resolves per-cell preferences.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum PlacementMode {
    /// Radial band fill with exact per-biome counts.
    #[default]
    ExactCount,
    /// Per-cell quota enforcement with fallbacks.
    Enforced,
}

/// Island generation inputs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GenerationConfig {
    /// Year driving the population model.
    pub year: i32,
    /// Size the grid from area per person; otherwise a fixed 141×141 grid.
    pub population_sizing: bool,
    /// Explicit grid dimension. Clamped to `[50, 500]` and forced odd.
    pub grid_size: Option<u32>,
    /// Terrain seed. `None` draws one at startup.
    pub seed: Option<f64>,
    /// Rescale quotas so the ocean matches the global ocean fraction.
    pub enforce_ocean_quota: bool,
    /// Carve rivers, lakes, and wetlands after placement.
    pub water_features: bool,
    pub placement: PlacementMode,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Write a PNG biome map after each run.
    pub write_png: bool,
    /// Pixels per tile in the PNG.
    pub png_scale: u32,
    /// PNG file name, relative to the data directory.
    pub file_name: String,
    /// Print the per-biome report to stdout.
    pub print_report: bool,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            year: 2023,
            population_sizing: true,
            grid_size: None,
            seed: None,
            enforce_ocean_quota: false,
            water_features: true,
            placement: PlacementMode::ExactCount,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            write_png: false,
            png_scale: 2,
            file_name: "island.png".to_string(),
            print_report: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = Self::read(config_dir)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    fn read(config_dir: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(2)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Re-read the file: `Some(new_config)` if it changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(config_dir)?;
        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Reject values no run could use. Out-of-range grid sizes are not
    /// errors; generation clamps them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(seed) = self.generation.seed {
            if !seed.is_finite() {
                return Err(ConfigError::InvalidValue {
                    field: "generation.seed",
                    reason: format!("{seed} is not finite"),
                });
            }
        }
        if !(1..=MAX_PNG_SCALE).contains(&self.output.png_scale) {
            return Err(ConfigError::InvalidValue {
                field: "output.png_scale",
                reason: format!("{} is outside 1..={MAX_PNG_SCALE}", self.output.png_scale),
            });
        }
        if self.output.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "output.file_name",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(2))
                .unwrap();
        assert!(ron_str.contains("year: 2023"));
        assert!(ron_str.contains("file_name: \"island.png\""));
        assert!(ron_str.contains("ExactCount"));
    }

    #[test]
    fn test_config_roundtrip() {
        let mut config = Config::default();
        config.generation.seed = Some(1234.0);
        config.generation.grid_size = Some(75);
        config.generation.placement = PlacementMode::Enforced;
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(generation: (year: 1990))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.generation.year, 1990);
        assert!(config.generation.population_sizing);
        assert_eq!(config.output, OutputConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.generation.year = 2050;
        config.generation.enforce_ocean_quota = true;
        config.output.write_png = true;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("isle");
        let config = Config::load_or_create(&nested).unwrap();
        assert_eq!(config, Config::default());
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.generation.grid_size = Some(301);
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().generation.grid_size, Some(301));
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "{{not valid}}").unwrap();
        assert!(matches!(
            Config::load_or_create(dir.path()),
            Err(ConfigError::ParseError(_))
        ));
    }

    #[test]
    fn test_zero_png_scale_rejected() {
        let mut config = Config::default();
        config.output.png_scale = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "output.png_scale",
                ..
            })
        ));
    }

    #[test]
    fn test_non_finite_seed_rejected() {
        let mut config = Config::default();
        config.generation.seed = Some(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_ron_comments_accepted() {
        let ron_str = "// island settings\n(\n  // nothing yet\n)";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config, Config::default());
    }
}
