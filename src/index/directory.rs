//! Extension index built by scanning extension directories.
//!
//! Every `*.jar` / `*.zip` file found below the configured directories is opened and
//! every extension its manifest sections provide (`Extension-Name`,
//! `Specification-Version`) is registered. Directories are scanned in the order
//! given and files in file-name order, so the scan order (and therefore tie-breaking
//! between duplicate providers) is deterministic.
//!
//! # Provider Selection
//!
//! For a requirement on `name`:
//! 1. Only registrations for exactly `name` are candidates
//! 2. With a version token, a candidate must declare a version that is at least the
//!    token ([`SpecVersion::satisfies`](crate::version::SpecVersion::satisfies))
//! 3. Among the remaining candidates the highest dotted-decimal version wins;
//!    unversioned or non-numeric versions rank lowest
//! 4. Ties go to the candidate scanned first

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use strsim::levenshtein;
use tracing::{debug, warn};
use walkdir::WalkDir;

use super::ExtensionIndex;
use crate::core::Artifact;
use crate::manifest::{ExtensionRequirement, ExtensionSpec, MetadataReader};
use crate::version::SpecVersion;

/// File extensions recognized as artifact archives.
pub const ARCHIVE_EXTENSIONS: &[&str] = &["jar", "zip"];

/// Maximum allowed Levenshtein distance as a percentage of the name length for suggestions.
const SIMILARITY_THRESHOLD_PERCENT: usize = 50;

#[derive(Debug, Clone)]
struct Registration {
    artifact: Artifact,
    version: Option<String>,
}

impl Registration {
    fn parsed_version(&self) -> Option<SpecVersion> {
        self.version.as_deref().and_then(SpecVersion::parse)
    }
}

/// An [`ExtensionIndex`] populated from archives on disk.
///
/// # Examples
///
/// ```rust,no_run
/// use extenv::index::{DirectoryExtensionIndex, ExtensionIndex};
/// use extenv::manifest::{ArchiveMetadataReader, ExtensionRequirement};
///
/// let index = DirectoryExtensionIndex::scan(&["/opt/build/ext"], &ArchiveMetadataReader::new());
/// if let Some(provider) = index.lookup(&ExtensionRequirement::new("org.example.xml")) {
///     println!("provided by {provider}");
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct DirectoryExtensionIndex {
    providers: HashMap<String, Vec<Registration>>,
}

impl DirectoryExtensionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `dirs` for archives and register the extensions they provide.
    ///
    /// Missing directories, unreadable entries and archives whose metadata cannot be
    /// read are logged and skipped; a partially usable extension path still yields an
    /// index.
    pub fn scan<P: AsRef<Path>>(dirs: &[P], reader: &dyn MetadataReader) -> Self {
        let mut index = Self::new();

        for dir in dirs {
            let dir = dir.as_ref();
            if !dir.is_dir() {
                warn!(target: "index", "Extension directory {} does not exist, skipping", dir.display());
                continue;
            }

            for entry in WalkDir::new(dir).follow_links(true).sort_by_file_name() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!(target: "index", "Skipping unreadable entry in {}: {e}", dir.display());
                        continue;
                    }
                };

                if !entry.file_type().is_file() || !is_archive(entry.path()) {
                    continue;
                }

                let artifact = match Artifact::from_path(entry.path()) {
                    Ok(artifact) => artifact,
                    Err(e) => {
                        warn!(target: "index", "Skipping {}: {e}", entry.path().display());
                        continue;
                    }
                };

                match reader.read_metadata(&artifact) {
                    Ok(metadata) => {
                        for spec in metadata.provided {
                            index.register(artifact.clone(), spec);
                        }
                    }
                    Err(e) => warn!(target: "index", "Skipping {}: {e}", artifact.file_name()),
                }
            }
        }

        debug!(target: "index", "Indexed {} extension(s)", index.len());
        index
    }

    /// Register `artifact` as a provider of `spec`.
    ///
    /// Registrations keep their insertion order for tie-breaking.
    pub fn register(&mut self, artifact: Artifact, spec: ExtensionSpec) {
        debug!(target: "index", "{} provides {spec}", artifact.file_name());
        self.providers.entry(spec.name).or_default().push(Registration {
            artifact,
            version: spec.version,
        });
    }

    /// Number of distinct extension names registered.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether no extension is registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Registered extension names, sorted.
    pub fn extension_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.providers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Up to three registered extension names similar to `name`, closest first.
    pub fn suggest(&self, name: &str) -> Vec<String> {
        let mut scored: Vec<(&str, usize)> =
            self.providers.keys().map(|candidate| (candidate.as_str(), levenshtein(name, candidate))).collect();

        scored.sort_by(|(a, da), (b, db)| da.cmp(db).then_with(|| a.cmp(b)));

        scored
            .into_iter()
            .filter(|(candidate, dist)| {
                *candidate != name && *dist <= name.len() * SIMILARITY_THRESHOLD_PERCENT / 100
            })
            .take(3)
            .map(|(candidate, _)| candidate.to_string())
            .collect()
    }
}

impl ExtensionIndex for DirectoryExtensionIndex {
    fn lookup(&self, requirement: &ExtensionRequirement) -> Option<Artifact> {
        let candidates = self.providers.get(&requirement.name)?;

        let mut best: Option<&Registration> = None;
        for candidate in candidates {
            let spec = ExtensionSpec {
                name: requirement.name.clone(),
                version: candidate.version.clone(),
            };
            if !requirement.is_satisfied_by(&spec) {
                continue;
            }

            best = match best {
                Some(current) if compare_versions(candidate, current) != Ordering::Greater => Some(current),
                _ => Some(candidate),
            };
        }

        best.map(|registration| registration.artifact.clone())
    }
}

fn compare_versions(a: &Registration, b: &Registration) -> Ordering {
    match (a.parsed_version(), b.parsed_version()) {
        (Some(va), Some(vb)) => va.cmp(&vb),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}

fn is_archive(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ARCHIVE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}
