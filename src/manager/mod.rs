//! The environment manager: resolution, construction and caching behind one façade.
//!
//! # Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use extenv::environment::Environment;
//! use extenv::index::DirectoryExtensionIndex;
//! use extenv::manager::EnvironmentManager;
//! use extenv::manifest::ArchiveMetadataReader;
//!
//! # fn example() -> Result<(), extenv::core::ExtenvError> {
//! let common = Arc::new(Environment::common_from_paths(&["/opt/build/lib/common.jar"])?);
//! let index = DirectoryExtensionIndex::scan(&["/opt/build/ext"], &ArchiveMetadataReader::new());
//! let manager = EnvironmentManager::new(common, Arc::new(index));
//!
//! let env = manager.get_environment_for_path("plugins/tasks.jar")?;
//! if let Some(location) = env.resolve_symbol("org/example/Task.class") {
//!     println!("{location}");
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Guarantees
//!
//! - One environment per artifact identity for the life of the manager; repeated
//!   and concurrent requests return the same [`Arc`]
//! - Artifacts resolving an extension to the same provider share that provider's
//!   environment instance
//! - Failed constructions are not remembered
//!
//! The manager is `Send + Sync`; share it behind an `Arc` across threads.

pub mod builder;

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::cache::EnvironmentCache;
use crate::core::{Artifact, ExtenvError};
use crate::environment::Environment;
use crate::index::ExtensionIndex;
use crate::manifest::{ArchiveMetadataReader, MetadataReader};
use crate::resolver::{DependencyGraph, DependencyResolver};

pub use builder::EnvironmentBuilder;

/// Public entry point: hands out cached, isolated environments for artifacts.
pub struct EnvironmentManager {
    common: Arc<Environment>,
    index: Arc<dyn ExtensionIndex>,
    reader: Arc<dyn MetadataReader>,
    cache: EnvironmentCache,
}

impl EnvironmentManager {
    /// Create a manager over `common` and `index`, reading metadata from zip archives.
    pub fn new(common: Arc<Environment>, index: Arc<dyn ExtensionIndex>) -> Self {
        Self {
            common,
            index,
            reader: Arc::new(ArchiveMetadataReader::new()),
            cache: EnvironmentCache::new(),
        }
    }

    /// Replace the metadata reader.
    #[must_use]
    pub fn with_reader(mut self, reader: Arc<dyn MetadataReader>) -> Self {
        self.reader = reader;
        self
    }

    /// The common environment every built environment has as first parent.
    pub fn common(&self) -> &Arc<Environment> {
        &self.common
    }

    /// The cache of built environments.
    pub fn cache(&self) -> &EnvironmentCache {
        &self.cache
    }

    fn builder(&self) -> EnvironmentBuilder<'_> {
        EnvironmentBuilder::new(self.reader.as_ref(), self.index.as_ref(), &self.cache, &self.common)
    }

    /// The isolated environment of `artifact`, built on first request.
    ///
    /// # Errors
    ///
    /// [`ExtenvError::MalformedMetadata`], [`ExtenvError::UnsatisfiedExtension`],
    /// [`ExtenvError::CycleDetected`], [`ExtenvError::IoFailure`] or
    /// [`ExtenvError::ConstructionFailure`]. Nothing is cached on failure.
    pub fn get_environment(&self, artifact: &Artifact) -> Result<Arc<Environment>, ExtenvError> {
        self.cache.get_or_build(artifact, || self.builder().build(artifact))
    }

    /// One environment holding all of `artifacts` as own content.
    ///
    /// An empty list yields the common environment and a single artifact its cached
    /// isolated environment. Combinations of several artifacts are built fresh on
    /// every call; their provider environments still come from the cache.
    pub fn get_environment_for(&self, artifacts: &[Artifact]) -> Result<Arc<Environment>, ExtenvError> {
        match artifacts {
            [] => Ok(Arc::clone(&self.common)),
            [single] => self.get_environment(single),
            many => {
                debug!("Building flat environment for {} artifacts", many.len());
                Ok(Arc::new(self.builder().build_flat(many)?))
            }
        }
    }

    /// Identify the artifact at `path` and return its environment.
    ///
    /// # Errors
    ///
    /// [`ExtenvError::InvalidArtifact`] if `path` is not an existing file, otherwise
    /// as [`get_environment`](Self::get_environment).
    pub fn get_environment_for_path(&self, path: impl AsRef<Path>) -> Result<Arc<Environment>, ExtenvError> {
        let artifact = Artifact::from_path(path)?;
        self.get_environment(&artifact)
    }

    /// Ordered list of every provider `artifact` needs.
    pub fn resolve_providers(&self, artifact: &Artifact) -> Result<Vec<Artifact>, ExtenvError> {
        DependencyResolver::new(self.reader.as_ref(), self.index.as_ref()).resolve(artifact)
    }

    /// The requirement graph below `artifact`.
    pub fn dependency_graph(&self, artifact: &Artifact) -> Result<DependencyGraph, ExtenvError> {
        DependencyResolver::new(self.reader.as_ref(), self.index.as_ref()).graph(artifact)
    }
}
