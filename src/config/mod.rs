//! Configuration for extenv
//!
//! The CLI reads a single TOML file naming the directories scanned for extension
//! providers and the archives or directories forming the common environment:
//!
//! ```toml
//! extension_dirs = ["~/.extenv/ext", "$BUILD_HOME/ext"]
//! common = ["/opt/build/lib/common.jar", "/opt/build/conf"]
//! ```
//!
//! **Location:**
//! - Unix/macOS: `~/.extenv/config.toml`
//! - Windows: `%LOCALAPPDATA%\extenv\config.toml`
//! - Override: `--config <PATH>` or the `EXTENV_CONFIG` environment variable
//!
//! A missing file is the empty configuration. Entries are expanded with
//! `shellexpand` (`~` and `$VAR`) when converted to paths, not when loaded, so the
//! file round-trips unchanged.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::ExtenvError;

/// Contents of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtenvConfig {
    /// Directories scanned (in order) for archives providing extensions
    pub extension_dirs: Vec<String>,
    /// Archives and directories forming the common environment, in lookup order
    pub common: Vec<String>,
}

impl ExtenvConfig {
    /// Load from `path`, or from [`default_path`](Self::default_path) when `None`.
    ///
    /// A file that does not exist yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        let path = match path {
            Some(path) => path,
            None => Self::default_path()?,
        };
        if path.exists() {
            Self::load_from(&path).await
        } else {
            tracing::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration TOML.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse config from {}", path.display()))
    }

    /// Platform default location of the configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the home (or local data) directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = if cfg!(target_os = "windows") {
            dirs::data_local_dir()
                .ok_or_else(|| anyhow::anyhow!("Unable to determine local data directory"))?
                .join("extenv")
        } else {
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?.join(".extenv")
        };

        Ok(config_dir.join("config.toml"))
    }

    /// Append command-line supplied entries after the configured ones.
    pub fn extend(&mut self, extension_dirs: &[PathBuf], common: &[PathBuf]) {
        self.extension_dirs.extend(extension_dirs.iter().map(|p| p.display().to_string()));
        self.common.extend(common.iter().map(|p| p.display().to_string()));
    }

    /// Extension directories with `~` and variables expanded.
    pub fn extension_dir_paths(&self) -> Result<Vec<PathBuf>, ExtenvError> {
        self.extension_dirs.iter().map(|entry| expand_path(entry)).collect()
    }

    /// Common environment entries with `~` and variables expanded.
    pub fn common_paths(&self) -> Result<Vec<PathBuf>, ExtenvError> {
        self.common.iter().map(|entry| expand_path(entry)).collect()
    }
}

/// Expand `~` and `$VAR` / `${VAR}` in a configured path.
///
/// # Errors
///
/// Returns [`ExtenvError::ConfigError`] naming the variable that is not set.
pub fn expand_path(entry: &str) -> Result<PathBuf, ExtenvError> {
    shellexpand::full(entry).map(|expanded| PathBuf::from(expanded.as_ref())).map_err(|e| {
        ExtenvError::ConfigError {
            message: format!("Cannot expand '{entry}': {e}"),
        }
    })
}
