//! Artifact identity.
//!
//! An [`Artifact`] is a pluggable archive on the local filesystem. Its identity is the
//! canonicalized path of the archive, so two different spellings of the same file
//! (relative paths, `..` segments, symlinks) always refer to the same artifact and
//! therefore to the same cached environment.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::core::error::ExtenvError;

/// Stable identity of an artifact: its canonicalized path.
///
/// Cloning an `ArtifactId` is cheap (the path is shared), which matters because
/// identities are copied into pending sets, cache keys and error values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArtifactId(Arc<Path>);

impl ArtifactId {
    /// Borrow the canonical path backing this identity.
    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// A pluggable unit (archive) that may declare extension requirements and
/// provide content.
///
/// Artifacts are immutable once identified. Use [`Artifact::from_path`] to identify
/// a file on disk; the path is canonicalized so equality and hashing follow the
/// identity of the underlying file.
///
/// # Examples
///
/// ```rust,no_run
/// use extenv::core::Artifact;
///
/// # fn example() -> Result<(), extenv::core::ExtenvError> {
/// let a = Artifact::from_path("plugins/../plugins/tasks.jar")?;
/// let b = Artifact::from_path("plugins/tasks.jar")?;
/// assert_eq!(a, b);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Artifact {
    id: ArtifactId,
}

impl Artifact {
    /// Identify the artifact stored at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtenvError::InvalidArtifact`] if the path does not exist, cannot be
    /// canonicalized, or is not a regular file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ExtenvError> {
        let path = path.as_ref();
        let canonical = path.canonicalize().map_err(|e| ExtenvError::InvalidArtifact {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if !canonical.is_file() {
            return Err(ExtenvError::InvalidArtifact {
                path: canonical,
                reason: "not a regular file".to_string(),
            });
        }

        Ok(Self::from_canonical(canonical))
    }

    /// Wrap a path that the caller guarantees is already canonical.
    ///
    /// Used by the directory index, which canonicalizes every candidate once during
    /// the scan, and by tests that work with synthetic identities.
    pub fn from_canonical(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self {
            id: ArtifactId(Arc::from(path.into_boxed_path())),
        }
    }

    /// The identity of this artifact.
    pub fn id(&self) -> &ArtifactId {
        &self.id
    }

    /// Path to the archive on disk.
    pub fn path(&self) -> &Path {
        self.id.path()
    }

    /// The archive's file name, for compact log and tree output.
    pub fn file_name(&self) -> String {
        self.path()
            .file_name()
            .map_or_else(|| self.path().display().to_string(), |n| n.to_string_lossy().into_owned())
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.id.fmt(f)
    }
}
