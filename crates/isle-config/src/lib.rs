//! Configuration for the island generator.
//!
//! Settings persist to disk as RON and can be overridden from the command
//! line. Missing fields fall back to defaults and unknown fields are ignored,
//! so older and newer config files both load.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    CONFIG_FILE, Config, DebugConfig, GenerationConfig, MAX_PNG_SCALE, OutputConfig, PlacementMode,
};
pub use error::ConfigError;
