//! `extenv check`: build every artifact's environment and report the outcome.
//!
//! Environments are built concurrently on the blocking pool through one shared
//! manager, so shared providers are built once. The command fails if any artifact
//! fails.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::Arc;

use super::CliConfig;
use super::common::CommandContext;
use crate::core::{Artifact, ExtenvError};

/// Build environments for artifacts concurrently and report failures.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Artifact archives to check
    #[arg(required = true)]
    artifacts: Vec<PathBuf>,
}

impl CheckCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let context = Arc::new(CommandContext::load(config).await?);

        let tasks = self.artifacts.into_iter().map(|path| {
            let context = Arc::clone(&context);
            tokio::task::spawn_blocking(move || {
                let outcome = Artifact::from_path(&path).and_then(|artifact| {
                    let env = context.manager.get_environment(&artifact)?;
                    Ok::<_, ExtenvError>(env.parents().len() - 1)
                });
                (path, outcome)
            })
        });

        let mut failures = 0;
        for joined in join_all(tasks).await {
            let (path, outcome) = joined?;
            match outcome {
                Ok(providers) => {
                    println!("{} {} ({providers} provider(s))", "✓".green(), path.display());
                }
                Err(e) => {
                    failures += 1;
                    println!("{} {}", "✗".red(), path.display());
                    let ctx = context.explain(e);
                    for line in ctx.to_string().lines() {
                        println!("    {line}");
                    }
                }
            }
        }

        if failures > 0 {
            bail!("{failures} artifact(s) failed to resolve");
        }
        Ok(())
    }
}
