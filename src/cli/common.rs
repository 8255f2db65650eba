//! Shared setup for commands: configuration, index scan and manager construction.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;

use super::CliConfig;
use crate::config::ExtenvConfig;
use crate::core::{Artifact, ErrorContext, ExtenvError, user_friendly_error};
use crate::environment::Environment;
use crate::index::DirectoryExtensionIndex;
use crate::manager::EnvironmentManager;
use crate::manifest::ArchiveMetadataReader;

/// Everything a command needs to work with environments.
pub struct CommandContext {
    pub manager: Arc<EnvironmentManager>,
    pub index: Arc<DirectoryExtensionIndex>,
}

impl CommandContext {
    /// Load the configuration, scan the extension directories and open the common
    /// environment.
    ///
    /// Scanning and opening archives is blocking work and runs on the blocking pool.
    pub async fn load(cli_config: &CliConfig) -> Result<Self> {
        let mut config = ExtenvConfig::load_with_optional(cli_config.config_path.clone()).await?;
        config.extend(&cli_config.ext_dirs, &cli_config.common);

        let ext_dirs = config.extension_dir_paths()?;
        let common_paths = config.common_paths()?;

        let context = tokio::task::spawn_blocking(move || -> Result<Self, ExtenvError> {
            let index = Arc::new(DirectoryExtensionIndex::scan(&ext_dirs, &ArchiveMetadataReader::new()));
            tracing::info!("Indexed {} extension(s) from {} director(ies)", index.len(), ext_dirs.len());

            let common = Arc::new(Environment::common_from_paths(&common_paths)?);
            let manager = EnvironmentManager::new(common, index.clone());
            Ok(Self {
                manager: Arc::new(manager),
                index,
            })
        })
        .await
        .context("Environment setup task failed")??;

        Ok(context)
    }

    /// Identify each path as an artifact.
    pub fn artifacts(paths: &[PathBuf]) -> Result<Vec<Artifact>, ExtenvError> {
        paths.iter().map(Artifact::from_path).collect()
    }

    /// Render `error` for the user, adding similarly named extensions when a
    /// requirement could not be satisfied.
    pub fn explain(&self, error: ExtenvError) -> ErrorContext {
        let similar = match error.root_cause() {
            ExtenvError::UnsatisfiedExtension {
                requirement,
                ..
            } => self.index.suggest(&requirement.name),
            _ => Vec::new(),
        };

        let mut ctx = user_friendly_error(error.into());
        if !similar.is_empty() {
            let hint = format!(
                "Did you mean {}?",
                similar.iter().map(|name| format!("'{name}'")).collect::<Vec<_>>().join(", ")
            );
            ctx.suggestion = Some(match ctx.suggestion {
                Some(existing) => format!("{existing}. {hint}"),
                None => hint,
            });
        }
        ctx
    }
}
