//! Configuration discovery and resolution
//!
//! Loads the home and local config files, fails fast on any unreadable,
//! unparseable or invalid document, and merges local over home.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::file::{Config, ConfigError, CONFIG_FILE_NAME};
use super::merge::merge_config;
use crate::logging::sanitize_for_log;

/// Origin of a configuration source
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ConfigOrigin {
    Home,
    Local,
}

/// A contributing config file with provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSource {
    pub origin: ConfigOrigin,

    /// Path the document was read from
    pub path: PathBuf,
}

/// Merged configuration plus the files that contributed to it
#[derive(Debug, Clone, Default)]
pub struct ResolvedConfig {
    pub config: Config,

    /// Contributing sources in precedence order (lowest first)
    pub sources: Vec<ConfigSource>,
}

/// Finds and merges the home and working-directory config files.
#[derive(Debug, Clone)]
pub struct ConfigResolver {
    home_dir: Option<PathBuf>,
    work_dir: PathBuf,
}

impl ConfigResolver {
    pub fn new(home_dir: Option<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            home_dir,
            work_dir: work_dir.into(),
        }
    }

    /// Resolver for `$HOME` and the current directory.
    pub fn from_env() -> Self {
        let home_dir = std::env::var_os("HOME")
            .filter(|h| !h.is_empty())
            .map(PathBuf::from);
        Self::new(home_dir, ".")
    }

    /// Resolve the effective config.
    pub fn resolve(&self) -> Result<Config, ConfigError> {
        self.resolve_with_sources().map(|resolved| resolved.config)
    }

    /// Resolve the effective config and report which files contributed.
    ///
    /// Never returns a partially merged config: any failing document aborts
    /// resolution.
    pub fn resolve_with_sources(&self) -> Result<ResolvedConfig, ConfigError> {
        let mut resolved = ResolvedConfig::default();

        if let Some(path) = self.home_config_path() {
            let (config, source) = load_source(&path, ConfigOrigin::Home)?;
            resolved.config = config;
            resolved.sources.push(source);
        }

        let local_path = self.work_dir.join(CONFIG_FILE_NAME);
        if local_path.is_file() {
            let (local, source) = load_source(&local_path, ConfigOrigin::Local)?;
            resolved.config = merge_config(resolved.config, local);
            resolved.sources.push(source);
        } else {
            debug!(path = %sanitize_for_log(&local_path.to_string_lossy()), "No local config");
        }

        Ok(resolved)
    }

    /// Home config path, if present and contained in the home directory.
    fn home_config_path(&self) -> Option<PathBuf> {
        let Some(home) = self.home_dir.as_ref() else {
            debug!("Home directory unavailable, skipping home config");
            return None;
        };

        let candidate = home.join(CONFIG_FILE_NAME);
        if !candidate.is_file() {
            debug!(path = %sanitize_for_log(&candidate.to_string_lossy()), "No home config");
            return None;
        }

        let canonical_home = match home.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Invalid home directory path detected");
                return None;
            }
        };
        let canonical = match candidate.canonicalize() {
            Ok(path) => path,
            Err(e) => {
                warn!(error = %e, "Invalid home config path detected");
                return None;
            }
        };

        if !canonical.starts_with(&canonical_home) {
            warn!(
                path = %sanitize_for_log(&canonical.to_string_lossy()),
                "Ignoring home config that resolves outside the home directory"
            );
            return None;
        }

        Some(canonical)
    }
}

fn load_source(path: &Path, origin: ConfigOrigin) -> Result<(Config, ConfigSource), ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let config = Config::parse(&content, path)?;

    debug!(
        origin = ?origin,
        path = %sanitize_for_log(&path.to_string_lossy()),
        "Loaded config"
    );

    Ok((
        config,
        ConfigSource {
            origin,
            path: path.to_path_buf(),
        },
    ))
}
