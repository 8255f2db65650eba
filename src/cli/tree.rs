//! `extenv tree`: show which providers an artifact pulls in.
//!
//! ```bash
//! extenv --ext-dir ./ext tree plugins/tasks.jar
//! ```
//!
//! ```text
//! tasks.jar
//! ├── xml.jar
//! │   └── util.jar
//! └── tools.jar
//!     └── util.jar (shared)
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

use super::CliConfig;
use super::common::CommandContext;
use crate::core::Artifact;

/// Print the resolved provider tree of an artifact.
#[derive(Args, Debug)]
pub struct TreeCommand {
    /// Artifact archive to resolve
    artifact: PathBuf,

    /// Also print the build order (providers first)
    #[arg(long)]
    order: bool,
}

impl TreeCommand {
    pub async fn execute(self, config: &CliConfig) -> Result<()> {
        let context = CommandContext::load(config).await?;
        let artifact = Artifact::from_path(&self.artifact)?;

        let manager = context.manager.clone();
        let resolved = artifact.clone();
        let graph = tokio::task::spawn_blocking(move || manager.dependency_graph(&resolved)).await?;
        let graph = graph.map_err(|e| context.explain(e))?;

        print!("{}", graph.to_tree_string(&artifact));

        if self.order {
            println!();
            println!("{}", "Build order:".bold());
            for (i, step) in graph.build_order()?.iter().enumerate() {
                println!("  {}. {}", i + 1, step.file_name().cyan());
            }
        }

        Ok(())
    }
}
