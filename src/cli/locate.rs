//! `extenv locate`: resolve a resource the way a running artifact would.
//!
//! With one artifact its isolated environment is used; with several, a flat
//! combined environment. By default only the winning location is printed
//! (parents first, then own content); `--all` lists every visible location.

use anyhow::{Result, bail};
use clap::Args;
use std::path::PathBuf;

use super::CliConfig;
use super::common::CommandContext;
use crate::core::ExtenvError;

/// Locate a resource through the environment of one or more artifacts.
#[derive(Args, Debug)]
pub struct LocateCommand {
    /// Artifact archives, followed by the resource name (e.g. `org/example/Task.class`)
    #[arg(required = true, num_args = 2.., value_name = "ARTIFACT... RESOURCE")]
    args: Vec<String>,

    /// List every location instead of the first one
    #[arg(long)]
    all: bool,
}

impl LocateCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let Some((resource, artifacts)) = self.args.split_last() else {
            bail!("Expected at least one artifact and a resource name");
        };
        let paths: Vec<PathBuf> = artifacts.iter().map(PathBuf::from).collect();
        let resource = resource.clone();

        let context = CommandContext::load(config).await?;
        let artifacts = CommandContext::artifacts(&paths)?;

        let manager = context.manager.clone();
        let env = tokio::task::spawn_blocking(move || manager.get_environment_for(&artifacts)).await?;
        let env = env.map_err(|e| context.explain(e))?;

        if self.all {
            let locations = env.enumerate_resource_locations(&resource);
            if locations.is_empty() {
                return Err(not_found(&resource).into());
            }
            for location in locations {
                println!("{location}");
            }
        } else {
            match env.resolve_symbol(&resource) {
                Some(location) => println!("{location}"),
                None => return Err(not_found(&resource).into()),
            }
        }

        Ok(())
    }
}

fn not_found(resource: &str) -> ExtenvError {
    ExtenvError::Other {
        message: format!("Resource '{resource}' is not visible from the requested environment"),
    }
}
