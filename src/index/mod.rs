//! Extension provider lookup.
//!
//! The resolver never decides *which* artifact provides an extension; it asks an
//! [`ExtensionIndex`]. Indexes are built outside the manager and handed to it ready
//! to use. Two implementations ship with the crate:
//!
//! - [`DirectoryExtensionIndex`] scans extension directories for archives and
//!   registers the extensions their manifests provide
//! - any `Fn(&ExtensionRequirement) -> Option<Artifact>` closure, for callers with
//!   their own registry
//!
//! If several artifacts register the same extension, the index picks one
//! deterministically; the manager does not arbitrate.

pub mod directory;

use crate::core::Artifact;
use crate::manifest::ExtensionRequirement;

pub use directory::DirectoryExtensionIndex;

/// Lookup capability: which artifact provides a required extension.
pub trait ExtensionIndex: Send + Sync {
    /// Return the artifact providing `requirement`, or `None` if nothing does.
    fn lookup(&self, requirement: &ExtensionRequirement) -> Option<Artifact>;
}

impl<F> ExtensionIndex for F
where
    F: Fn(&ExtensionRequirement) -> Option<Artifact> + Send + Sync,
{
    fn lookup(&self, requirement: &ExtensionRequirement) -> Option<Artifact> {
        self(requirement)
    }
}
