//! Layered configuration
//!
//! Resolves the effective configuration from two optional YAML files:
//! 1. Home config (`~/.params2env.yaml`)
//! 2. Local config (`./.params2env.yaml`)
//!
//! CLI flags are applied on top by each command handler.

mod file;
mod merge;
mod resolver;

pub use file::{Config, ConfigError, OutputMode, ParamConfig, CONFIG_FILE_NAME};
pub use merge::merge_config;
pub use resolver::{ConfigOrigin, ConfigResolver, ConfigSource, ResolvedConfig};
