//! Environment construction.

use std::sync::Arc;

use tracing::{debug, info};

use crate::cache::EnvironmentCache;
use crate::core::{Artifact, ExtenvError};
use crate::environment::{ArchiveContent, ContentSource, Environment};
use crate::index::ExtensionIndex;
use crate::manifest::MetadataReader;
use crate::resolver::DependencyResolver;

/// Builds environments for artifacts, fetching provider environments through the cache.
///
/// Parent order of a built environment is fixed: the common environment, then one
/// environment per distinct provider in resolution order. The artifact's own
/// archive is the only own content.
pub struct EnvironmentBuilder<'a> {
    reader: &'a dyn MetadataReader,
    index: &'a dyn ExtensionIndex,
    cache: &'a EnvironmentCache,
    common: &'a Arc<Environment>,
}

impl<'a> EnvironmentBuilder<'a> {
    pub fn new(
        reader: &'a dyn MetadataReader,
        index: &'a dyn ExtensionIndex,
        cache: &'a EnvironmentCache,
        common: &'a Arc<Environment>,
    ) -> Self {
        Self {
            reader,
            index,
            cache,
            common,
        }
    }

    /// Build the isolated environment of `artifact`.
    ///
    /// Provider environments are taken from (or added to) the cache; the returned
    /// environment itself is not stored, that is the caller's job.
    ///
    /// Every provider build that misses the cache resolves its own subtree again,
    /// so manifests below it are re-read: a chain of n uncached providers costs
    /// O(n²) metadata reads on first use. Later requests hit the cache and read
    /// nothing.
    ///
    /// # Errors
    ///
    /// Any resolution error for `artifact` itself, [`ExtenvError::ConstructionFailure`]
    /// wrapping a provider's failure, or [`ExtenvError::IoFailure`] if the archive
    /// cannot be opened.
    pub fn build(&self, artifact: &Artifact) -> Result<Environment, ExtenvError> {
        let providers = DependencyResolver::new(self.reader, self.index).resolve(artifact)?;

        let mut parents = Vec::with_capacity(providers.len() + 1);
        parents.push(Arc::clone(self.common));
        for provider in &providers {
            parents.push(self.provider_environment(artifact, provider)?);
        }

        let content: Vec<Box<dyn ContentSource>> = vec![Box::new(ArchiveContent::open(artifact)?)];

        info!("Built environment for {} with {} provider(s)", artifact.file_name(), providers.len());
        Ok(Environment::new(parents, content, vec![artifact.clone()]))
    }

    /// Build one flat environment holding every artifact in `artifacts` as own content.
    ///
    /// Parents are the common environment followed by the union of every member's
    /// providers, minus providers that are members themselves. Members are listed
    /// once, in the given order.
    pub fn build_flat(&self, artifacts: &[Artifact]) -> Result<Environment, ExtenvError> {
        let mut members: Vec<Artifact> = Vec::with_capacity(artifacts.len());
        for artifact in artifacts {
            if !members.contains(artifact) {
                members.push(artifact.clone());
            }
        }

        let resolver = DependencyResolver::new(self.reader, self.index);
        let mut parents = vec![Arc::clone(self.common)];
        let mut seen: Vec<Artifact> = Vec::new();

        for member in &members {
            for provider in resolver.resolve(member)? {
                if members.contains(&provider) || seen.contains(&provider) {
                    continue;
                }
                parents.push(self.provider_environment(member, &provider)?);
                seen.push(provider);
            }
        }

        let mut content: Vec<Box<dyn ContentSource>> = Vec::with_capacity(members.len());
        for member in &members {
            content.push(Box::new(ArchiveContent::open(member)?));
        }

        debug!("Built flat environment for {} artifact(s) with {} provider(s)", members.len(), seen.len());
        Ok(Environment::new(parents, content, members))
    }

    fn provider_environment(&self, artifact: &Artifact, provider: &Artifact) -> Result<Arc<Environment>, ExtenvError> {
        self.cache.get_or_build(provider, || self.build(provider)).map_err(|source| {
            ExtenvError::ConstructionFailure {
                artifact: artifact.id().clone(),
                provider: provider.id().clone(),
                source: Box::new(source),
            }
        })
    }
}
