//! Isolated resolution environments.
//!
//! An [`Environment`] is an ordered list of parent environments plus its own
//! content. Lookups consult the parents **before** the environment's own content:
//!
//! ```text
//! get_environment(task.jar)
//!   parents: [common, xml.jar env, tools.jar env]
//!   own:     task.jar
//!
//! resolve_symbol("shared.txt")
//!   common → xml.jar env → tools.jar env → task.jar   (first hit wins)
//! ```
//!
//! Every parent is itself an environment with its own parents, so a query walks
//! the whole parent graph depth-first in order. Parents are deduplicated by
//! instance identity at construction time; resource enumeration additionally
//! deduplicates locations so a provider reached through a diamond is reported once.
//!
//! Environments are immutable after construction and shared through [`Arc`].

pub mod content;

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::core::{Artifact, ExtenvError};

pub use content::{ArchiveContent, ContentSource, DirectoryContent, Location};

/// An isolated resolution scope: ordered parents plus own content.
#[derive(Debug)]
pub struct Environment {
    parents: Vec<Arc<Environment>>,
    content: Vec<Box<dyn ContentSource>>,
    artifacts: Vec<Artifact>,
}

impl Environment {
    /// Assemble an environment.
    ///
    /// Later occurrences of a parent that is already present (same instance) are
    /// dropped; the order of first occurrences is kept.
    pub fn new(
        parents: Vec<Arc<Environment>>,
        content: Vec<Box<dyn ContentSource>>,
        artifacts: Vec<Artifact>,
    ) -> Self {
        let mut unique: Vec<Arc<Environment>> = Vec::with_capacity(parents.len());
        for parent in parents {
            if !unique.iter().any(|seen| Arc::ptr_eq(seen, &parent)) {
                unique.push(parent);
            }
        }

        Self {
            parents: unique,
            content,
            artifacts,
        }
    }

    /// A root environment with no parents, e.g. the common environment.
    pub fn root(content: Vec<Box<dyn ContentSource>>) -> Self {
        Self::new(Vec::new(), content, Vec::new())
    }

    /// A root environment with no content at all.
    pub fn empty() -> Self {
        Self::root(Vec::new())
    }

    /// Build a root environment from archives and directories on disk.
    ///
    /// Directories become [`DirectoryContent`], files are opened as archives. The
    /// order of `paths` is the lookup order.
    ///
    /// # Errors
    ///
    /// Returns [`ExtenvError::InvalidArtifact`] for a path that does not exist and
    /// [`ExtenvError::IoFailure`] for an archive that cannot be opened.
    pub fn common_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, ExtenvError> {
        let mut content: Vec<Box<dyn ContentSource>> = Vec::with_capacity(paths.len());
        let mut artifacts = Vec::new();

        for path in paths {
            let path = path.as_ref();
            if path.is_dir() {
                debug!("Common content directory {}", path.display());
                content.push(Box::new(DirectoryContent::new(path)));
            } else {
                let artifact = Artifact::from_path(path)?;
                debug!("Common content archive {artifact}");
                content.push(Box::new(ArchiveContent::open(&artifact)?));
                artifacts.push(artifact);
            }
        }

        Ok(Self::new(Vec::new(), content, artifacts))
    }

    /// Parent environments in lookup order.
    pub fn parents(&self) -> &[Arc<Environment>] {
        &self.parents
    }

    /// Artifacts whose content this environment holds directly.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    /// Whether this is a root (parentless) environment.
    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Find `name`, consulting every parent in order before the own content.
    ///
    /// Each environment reachable along several parent paths is consulted once.
    pub fn resolve_symbol(&self, name: &str) -> Option<Location> {
        self.find_symbol(name, &mut HashSet::new())
    }

    fn find_symbol(&self, name: &str, visited: &mut HashSet<usize>) -> Option<Location> {
        for parent in &self.parents {
            // Already walked without a hit, or the walk would have stopped there
            if !visited.insert(Arc::as_ptr(parent) as usize) {
                continue;
            }
            if let Some(location) = parent.find_symbol(name, visited) {
                return Some(location);
            }
        }
        self.content.iter().find_map(|source| source.locate(name))
    }

    /// Every location of `name` visible from this environment.
    ///
    /// Parents are enumerated in order, then the own content. A location reachable
    /// along several paths is listed once, at its first occurrence.
    pub fn enumerate_resource_locations(&self, name: &str) -> Vec<Location> {
        let mut locations = Vec::new();
        let mut seen = HashSet::new();
        let mut visited = HashSet::new();
        self.collect_locations(name, &mut locations, &mut seen, &mut visited);
        locations
    }

    fn collect_locations(
        &self,
        name: &str,
        locations: &mut Vec<Location>,
        seen: &mut HashSet<String>,
        visited: &mut HashSet<usize>,
    ) {
        for parent in &self.parents {
            if visited.insert(Arc::as_ptr(parent) as usize) {
                parent.collect_locations(name, locations, seen, visited);
            }
        }
        for source in &self.content {
            if let Some(location) = source.locate(name)
                && seen.insert(location.to_string())
            {
                locations.push(location);
            }
        }
    }
}
