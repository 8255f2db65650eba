//! Transitive extension resolution.
//!
//! The [`DependencyResolver`] turns an artifact into the ordered list of every
//! provider artifact it needs, directly or transitively. It reads metadata through
//! a [`MetadataReader`] and asks an [`ExtensionIndex`] for providers; it never
//! touches environments or the cache.
//!
//! # Algorithm
//!
//! Depth-first walk with a path-local [`PendingSet`]:
//!
//! 1. If the artifact is already pending, report [`ExtenvError::CycleDetected`]
//! 2. Mark it pending and read its requirements
//! 3. Look up a provider for every required extension; a missing provider is
//!    [`ExtenvError::UnsatisfiedExtension`]. Optional extensions without a
//!    provider are skipped
//! 4. Append each provider followed by its own transitive providers, skipping
//!    artifacts already in the list
//! 5. Unmark it, whether resolution succeeded or not
//!
//! Unmarking on the way out is what keeps diamonds legal: two siblings requiring
//! the same provider each see it as not pending.
//!
//! ```text
//! task.jar ──requires──▶ xml.jar ──requires──▶ util.jar
//!     └──────requires──▶ tools.jar ──requires──▶ util.jar
//!
//! resolve(task.jar) = [xml.jar, util.jar, tools.jar]
//! ```

pub mod dependency_graph;

use tracing::debug;

use crate::core::{Artifact, ArtifactId, ExtenvError};
use crate::index::ExtensionIndex;
use crate::manifest::MetadataReader;

pub use dependency_graph::DependencyGraph;

/// Artifacts currently being resolved within one top-level call, outermost first.
///
/// Never shared between calls or threads.
#[derive(Debug, Default, Clone)]
pub struct PendingSet {
    path: Vec<ArtifactId>,
}

impl PendingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.path.contains(id)
    }

    pub fn len(&self) -> usize {
        self.path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    fn push(&mut self, id: ArtifactId) {
        self.path.push(id);
    }

    fn pop(&mut self) {
        self.path.pop();
    }

    /// The pending path from the first occurrence of `id`, closed by `id` again.
    fn cycle_through(&self, id: &ArtifactId) -> Vec<ArtifactId> {
        let start = self.path.iter().position(|pending| pending == id).unwrap_or(0);
        let mut chain = self.path[start..].to_vec();
        chain.push(id.clone());
        chain
    }
}

/// Computes transitive provider lists.
pub struct DependencyResolver<'a> {
    reader: &'a dyn MetadataReader,
    index: &'a dyn ExtensionIndex,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(reader: &'a dyn MetadataReader, index: &'a dyn ExtensionIndex) -> Self {
        Self {
            reader,
            index,
        }
    }

    /// Ordered, duplicate-free list of every provider `artifact` needs.
    ///
    /// Uses a fresh [`PendingSet`] for this call.
    ///
    /// # Errors
    ///
    /// - [`ExtenvError::MalformedMetadata`] if any visited artifact cannot be read
    /// - [`ExtenvError::UnsatisfiedExtension`] if a required extension has no provider
    /// - [`ExtenvError::CycleDetected`] if an artifact transitively requires itself
    pub fn resolve(&self, artifact: &Artifact) -> Result<Vec<Artifact>, ExtenvError> {
        let mut pending = PendingSet::new();
        self.resolve_with(artifact, &mut pending, &mut None)
    }

    /// Resolve `artifact` and record every requirement edge in a [`DependencyGraph`].
    pub fn graph(&self, artifact: &Artifact) -> Result<DependencyGraph, ExtenvError> {
        let mut pending = PendingSet::new();
        let mut graph = Some(DependencyGraph::new());
        self.resolve_with(artifact, &mut pending, &mut graph)?;

        let mut graph = graph.unwrap_or_default();
        graph.ensure_root(artifact);
        Ok(graph)
    }

    /// Resolve `artifact` against an existing pending set.
    ///
    /// `pending` is left exactly as it was passed in, on success and on failure.
    pub fn resolve_in(&self, artifact: &Artifact, pending: &mut PendingSet) -> Result<Vec<Artifact>, ExtenvError> {
        self.resolve_with(artifact, pending, &mut None)
    }

    fn resolve_with(
        &self,
        artifact: &Artifact,
        pending: &mut PendingSet,
        graph: &mut Option<DependencyGraph>,
    ) -> Result<Vec<Artifact>, ExtenvError> {
        let id = artifact.id();
        if pending.contains(id) {
            let chain = pending.cycle_through(id);
            debug!(
                target: "resolver",
                "Cycle closed by {}: {}",
                artifact.file_name(),
                chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ")
            );
            return Err(ExtenvError::CycleDetected {
                artifact: id.clone(),
                chain,
            });
        }

        pending.push(id.clone());
        let result = self.resolve_providers(artifact, pending, graph);
        pending.pop();
        result
    }

    fn resolve_providers(
        &self,
        artifact: &Artifact,
        pending: &mut PendingSet,
        graph: &mut Option<DependencyGraph>,
    ) -> Result<Vec<Artifact>, ExtenvError> {
        let metadata = self.reader.read_metadata(artifact)?;
        debug!(
            target: "resolver",
            "Resolving {} ({} required, {} optional, depth {})",
            artifact.file_name(),
            metadata.required.len(),
            metadata.optional.len(),
            pending.len()
        );

        let mut direct = Vec::with_capacity(metadata.required.len());
        for requirement in &metadata.required {
            let Some(provider) = self.index.lookup(requirement) else {
                return Err(ExtenvError::UnsatisfiedExtension {
                    artifact: artifact.id().clone(),
                    requirement: requirement.clone(),
                });
            };
            debug!(target: "resolver", "{}: {requirement} provided by {}", artifact.file_name(), provider.file_name());
            direct.push(provider);
        }

        for requirement in &metadata.optional {
            match self.index.lookup(requirement) {
                Some(provider) => {
                    debug!(
                        target: "resolver",
                        "{}: optional {requirement} provided by {}",
                        artifact.file_name(),
                        provider.file_name()
                    );
                    direct.push(provider);
                }
                None => debug!(
                    target: "resolver",
                    "{}: optional {requirement} not available, skipping",
                    artifact.file_name()
                ),
            }
        }

        let mut providers: Vec<Artifact> = Vec::new();
        for provider in direct {
            if let Some(graph) = graph.as_mut() {
                graph.add_dependency(artifact.clone(), provider.clone());
            }
            if providers.contains(&provider) {
                continue;
            }

            let transitive = self.resolve_with(&provider, pending, graph)?;
            providers.push(provider);
            for dep in transitive {
                if !providers.contains(&dep) {
                    providers.push(dep);
                }
            }
        }

        Ok(providers)
    }
}
