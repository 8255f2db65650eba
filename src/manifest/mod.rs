//! Artifact metadata: declared and provided extensions.
//!
//! Every artifact may carry a manifest (`META-INF/MANIFEST.MF`) describing the
//! extensions it requires and the extension it provides itself. This module
//! defines the value types for those declarations and the [`MetadataReader`]
//! seam the resolver uses to obtain them.
//!
//! # Manifest Attributes
//!
//! | Attribute | Section | Meaning |
//! |-----------|---------|---------|
//! | `Extension-List` | any | whitespace-separated aliases of required extensions |
//! | `Optional-Extension-List` | any | aliases of extensions used when available |
//! | `<alias>-Extension-Name` | same as list | name of the aliased extension |
//! | `<alias>-Specification-Version` | same as list | optional version token |
//! | `Extension-Name` | any | extension provided by this artifact |
//! | `Specification-Version` | same as name | version of the provided extension |
//!
//! Lists and provided extensions are collected from the main section first and
//! then from every entry section, in file order.
//!
//! # Examples
//!
//! ```rust,no_run
//! use extenv::core::Artifact;
//! use extenv::manifest::{ArchiveMetadataReader, MetadataReader};
//!
//! # fn example() -> Result<(), extenv::core::ExtenvError> {
//! let artifact = Artifact::from_path("plugins/tasks.jar")?;
//! for requirement in ArchiveMetadataReader::new().read(&artifact)? {
//!     println!("requires {requirement}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod parser;
pub mod reader;

use std::fmt;

use tracing::warn;

use crate::core::{Artifact, ExtenvError};
use crate::version::SpecVersion;

pub use parser::{Manifest, Section};
pub use reader::{ArchiveMetadataReader, MANIFEST_PATH};

/// Attribute listing the aliases of required extensions.
pub const EXTENSION_LIST: &str = "Extension-List";
/// Attribute listing the aliases of optional extensions.
pub const OPTIONAL_EXTENSION_LIST: &str = "Optional-Extension-List";
/// Attribute naming an extension.
pub const EXTENSION_NAME: &str = "Extension-Name";
/// Attribute holding an extension's version token.
pub const SPECIFICATION_VERSION: &str = "Specification-Version";

/// A requirement on a named extension, optionally pinned to a minimum version token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionRequirement {
    /// Extension name, e.g. `org.example.xml`
    pub name: String,
    /// Version token from `<alias>-Specification-Version`, if declared
    pub version: Option<String>,
}

impl ExtensionRequirement {
    /// Requirement on any version of `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: None,
        }
    }

    /// Requirement on `name` at `version` or later.
    pub fn with_version(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: Some(version.into()),
        }
    }

    /// Whether `spec` satisfies this requirement.
    ///
    /// Names must match exactly. When a version token is required the provider must
    /// declare a version that is at least that token (see [`SpecVersion::satisfies`]).
    pub fn is_satisfied_by(&self, spec: &ExtensionSpec) -> bool {
        if self.name != spec.name {
            return false;
        }
        match (&self.version, &spec.version) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(required), Some(provided)) => SpecVersion::satisfies(provided, required),
        }
    }
}

impl fmt::Display for ExtensionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "'{}' (version {version})", self.name),
            None => write!(f, "'{}'", self.name),
        }
    }
}

/// An extension provided by an artifact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExtensionSpec {
    /// Extension name
    pub name: String,
    /// Declared `Specification-Version`, if any
    pub version: Option<String>,
}

impl fmt::Display for ExtensionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.version {
            Some(version) => write!(f, "{} {version}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// Everything an artifact's manifest declares about extensions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArtifactMetadata {
    /// Extensions that must be present, in declaration order
    pub required: Vec<ExtensionRequirement>,
    /// Extensions used when a provider is available, in declaration order
    pub optional: Vec<ExtensionRequirement>,
    /// Extensions this artifact provides
    pub provided: Vec<ExtensionSpec>,
}

impl ArtifactMetadata {
    /// Extract extension declarations from a parsed manifest.
    ///
    /// `artifact` is only used for diagnostics about skipped aliases.
    pub fn from_manifest(manifest: &Manifest, artifact: &Artifact) -> Self {
        let provided = manifest
            .sections()
            .filter_map(|section| {
                Some(ExtensionSpec {
                    name: non_empty(section.get(EXTENSION_NAME))?,
                    version: non_empty(section.get(SPECIFICATION_VERSION)),
                })
            })
            .collect();

        Self {
            required: listed(manifest, EXTENSION_LIST, artifact),
            optional: listed(manifest, OPTIONAL_EXTENSION_LIST, artifact),
            provided,
        }
    }
}

/// Collect the requirements listed under `list_key` across all sections.
fn listed(manifest: &Manifest, list_key: &str, artifact: &Artifact) -> Vec<ExtensionRequirement> {
    let mut requirements = Vec::new();

    for section in manifest.sections() {
        let Some(aliases) = section.get(list_key) else {
            continue;
        };

        for alias in aliases.split_whitespace() {
            let Some(name) = non_empty(section.get(&format!("{alias}-{EXTENSION_NAME}"))) else {
                warn!(
                    target: "manifest",
                    "{}: {list_key} alias '{alias}' has no {alias}-{EXTENSION_NAME}, ignoring it",
                    artifact.file_name()
                );
                continue;
            };

            requirements.push(ExtensionRequirement {
                name,
                version: non_empty(section.get(&format!("{alias}-{SPECIFICATION_VERSION}"))),
            });
        }
    }

    requirements
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

/// Reads extension metadata from artifacts.
///
/// The resolver only depends on this trait, so alternative artifact encodings
/// (or instrumented readers in tests) can be injected into the manager.
/// Implementations must be side-effect free beyond the read itself.
pub trait MetadataReader: Send + Sync {
    /// Read every extension declaration of `artifact`.
    ///
    /// # Errors
    ///
    /// Returns [`ExtenvError::MalformedMetadata`] if the artifact cannot be opened or
    /// its metadata cannot be parsed. An artifact without declarations is not an
    /// error.
    fn read_metadata(&self, artifact: &Artifact) -> Result<ArtifactMetadata, ExtenvError>;

    /// Read only the required extensions of `artifact`.
    fn read(&self, artifact: &Artifact) -> Result<Vec<ExtensionRequirement>, ExtenvError> {
        Ok(self.read_metadata(artifact)?.required)
    }
}
