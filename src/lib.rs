//! extenv - extension-aware isolated environment manager
//!
//! Pluggable artifacts (zip archives such as `.jar` files) declare the named
//! extensions they need in `META-INF/MANIFEST.MF`. extenv resolves those
//! requirements to provider artifacts, detects dependency cycles, and builds one
//! isolated [`Environment`](environment::Environment) per artifact: a lookup scope
//! that sees the common environment, every transitive provider, and the artifact's
//! own content, in that order, and nothing else.
//!
//! Environments are cached for the life of an
//! [`EnvironmentManager`](manager::EnvironmentManager): every artifact is resolved
//! and built once, no matter how many other artifacts depend on it or how many
//! threads ask for it at the same time.
//!
//! # Architecture
//!
//! ```text
//! EnvironmentManager ──▶ EnvironmentCache ──▶ EnvironmentBuilder
//!                                                 │
//!                         DependencyResolver ◀────┘
//!                          │              │
//!                 MetadataReader     ExtensionIndex
//! ```
//!
//! - [`manifest`] - manifest parsing and the [`MetadataReader`](manifest::MetadataReader) seam
//! - [`index`] - provider lookup, including a directory-scanning index
//! - [`resolver`] - transitive resolution with cycle detection
//! - [`cache`] - at-most-once construction per artifact
//! - [`environment`] - parents-first symbol and resource lookup
//! - [`manager`] - the public façade and environment builder
//! - [`core`] - artifact identity and errors
//! - [`config`] / [`cli`] - configuration file and the `extenv` binary
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use extenv::environment::Environment;
//! use extenv::index::DirectoryExtensionIndex;
//! use extenv::manager::EnvironmentManager;
//! use extenv::manifest::ArchiveMetadataReader;
//!
//! # fn example() -> Result<(), extenv::core::ExtenvError> {
//! let index = DirectoryExtensionIndex::scan(&["ext"], &ArchiveMetadataReader::new());
//! let manager = EnvironmentManager::new(Arc::new(Environment::empty()), Arc::new(index));
//!
//! let env = manager.get_environment_for_path("plugins/tasks.jar")?;
//! for location in env.enumerate_resource_locations("shared.txt") {
//!     println!("{location}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod core;
pub mod environment;
pub mod index;
pub mod manager;
pub mod manifest;
pub mod resolver;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
