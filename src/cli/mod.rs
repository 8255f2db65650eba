//! Command-line interface for extenv
//!
//! # Commands
//!
//! - `tree` - print the provider tree of an artifact
//! - `locate` - resolve a resource through an artifact's environment
//! - `check` - build environments for several artifacts and report failures
//!
//! # Global Options
//!
//! | Option | Meaning |
//! |--------|---------|
//! | `-v, --verbose` | debug logging |
//! | `-q, --quiet` | errors only |
//! | `-c, --config <PATH>` | configuration file (also `EXTENV_CONFIG`) |
//! | `--ext-dir <DIR>` | extra extension directory, searched after configured ones |
//! | `--common <PATH>` | extra common environment entry, after configured ones |
//!
//! `RUST_LOG` takes precedence over the verbosity flags when set.
//!
//! # Examples
//!
//! ```bash
//! extenv --ext-dir ./ext tree plugins/tasks.jar
//! extenv --common lib/common.jar locate plugins/tasks.jar org/example/Task.class
//! extenv locate plugins/a.jar plugins/b.jar shared.txt --all
//! extenv check plugins/*.jar
//! ```

pub mod check;
pub mod common;
pub mod locate;
pub mod tree;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags, applied once before a command runs.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    /// Log filter used when `RUST_LOG` is not set
    pub log_level: String,
    /// Explicit configuration file, if any
    pub config_path: Option<PathBuf>,
    /// Extension directories given on the command line
    pub ext_dirs: Vec<PathBuf>,
    /// Common environment entries given on the command line
    pub common: Vec<PathBuf>,
}

impl CliConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            log_level: "warn".to_string(),
            ..Self::default()
        }
    }

    /// Install the global tracing subscriber, logging to stderr.
    ///
    /// Does nothing if a subscriber is already installed.
    pub fn init_logging(&self) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&self.log_level)
        };

        let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
    }
}

/// Extension-aware isolated environment manager.
#[derive(Parser, Debug)]
#[command(
    name = "extenv",
    about = "Resolve extension dependencies of pluggable archives and inspect their environments",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "EXTENV_CONFIG")]
    config: Option<PathBuf>,

    /// Additional directory to scan for extension providers (repeatable)
    #[arg(long = "ext-dir", global = true, value_name = "DIR")]
    ext_dirs: Vec<PathBuf>,

    /// Additional archive or directory for the common environment (repeatable)
    #[arg(long = "common", global = true, value_name = "PATH")]
    common: Vec<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved provider tree of an artifact
    Tree(tree::TreeCommand),
    /// Locate a resource through the environment of one or more artifacts
    Locate(locate::LocateCommand),
    /// Build environments for artifacts concurrently and report failures
    Check(check::CheckCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
            ext_dirs: self.ext_dirs.clone(),
            common: self.common.clone(),
        }
    }

    /// Run the command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();

        match self.command {
            Commands::Tree(cmd) => cmd.execute(&config).await,
            Commands::Locate(cmd) => cmd.execute(&config).await,
            Commands::Check(cmd) => cmd.execute(&config).await,
        }
    }
}
