//! Content sources: where an environment's own symbols and resources live.

use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};

use zip::ZipArchive;

use crate::core::{Artifact, ExtenvError};

/// Where a symbol or resource was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Location {
    /// An entry inside an archive
    Archive {
        /// Path of the archive on disk
        archive: PathBuf,
        /// Entry name inside the archive, without a leading `/`
        entry: String,
    },
    /// A plain file inside a content directory
    File(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Archive {
                archive,
                entry,
            } => write!(f, "jar:file:{}!/{entry}", archive.display()),
            Self::File(path) => write!(f, "file:{}", path.display()),
        }
    }
}

/// Own content of an environment, answering "where is `name`?".
pub trait ContentSource: Send + Sync + fmt::Debug {
    /// Locate `name` (a `/`-separated relative name such as `org/example/Task.class`).
    fn locate(&self, name: &str) -> Option<Location>;
}

/// Normalize a lookup name: strip leading slashes and reject parent traversal.
fn normalize(name: &str) -> Option<&str> {
    let name = name.trim_start_matches('/');
    if name.is_empty() || name.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(name)
}

/// Content of a zip archive.
///
/// The entry table is read once when the source is opened; later lookups do not
/// touch the filesystem.
#[derive(Debug, Clone)]
pub struct ArchiveContent {
    archive: PathBuf,
    entries: HashSet<String>,
}

impl ArchiveContent {
    /// Open `artifact` and index its entries.
    ///
    /// # Errors
    ///
    /// Returns [`ExtenvError::IoFailure`] if the archive cannot be opened or read.
    pub fn open(artifact: &Artifact) -> Result<Self, ExtenvError> {
        let io_failure = |source: std::io::Error| ExtenvError::IoFailure {
            artifact: artifact.id().clone(),
            source,
        };

        let file = File::open(artifact.path()).map_err(io_failure)?;
        let archive = ZipArchive::new(file)
            .map_err(|e| io_failure(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))?;
        let entries = archive.file_names().map(str::to_string).collect();

        Ok(Self {
            archive: artifact.path().to_path_buf(),
            entries,
        })
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl ContentSource for ArchiveContent {
    fn locate(&self, name: &str) -> Option<Location> {
        let name = normalize(name)?;
        self.entries.contains(name).then(|| Location::Archive {
            archive: self.archive.clone(),
            entry: name.to_string(),
        })
    }
}

/// Content of a directory on disk, used for exploded common environments.
#[derive(Debug, Clone)]
pub struct DirectoryContent {
    root: PathBuf,
}

impl DirectoryContent {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContentSource for DirectoryContent {
    fn locate(&self, name: &str) -> Option<Location> {
        let name = normalize(name)?;
        let path = self.root.join(name);
        if path.components().any(|c| matches!(c, Component::ParentDir)) {
            return None;
        }
        path.is_file().then_some(Location::File(path))
    }
}
