//! Reading extension metadata out of artifact archives.

use std::fs::File;
use std::io::Read;

use tracing::debug;
use zip::ZipArchive;
use zip::result::ZipError;

use super::{ArtifactMetadata, Manifest, MetadataReader};
use crate::core::{Artifact, ExtenvError};

/// Location of the manifest inside an artifact archive.
pub const MANIFEST_PATH: &str = "META-INF/MANIFEST.MF";

/// [`MetadataReader`] for zip-based artifacts (`.jar`, `.zip`).
///
/// Opens the archive, reads [`MANIFEST_PATH`] and extracts the declared
/// extensions. An archive without a manifest declares nothing and yields empty
/// metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArchiveMetadataReader;

impl ArchiveMetadataReader {
    /// Create a new archive reader.
    pub const fn new() -> Self {
        Self
    }

    fn read_manifest_text(artifact: &Artifact) -> Result<Option<String>, ExtenvError> {
        let malformed = |reason: String| ExtenvError::MalformedMetadata {
            artifact: artifact.id().clone(),
            reason,
        };

        let file = File::open(artifact.path()).map_err(|e| malformed(format!("cannot open archive: {e}")))?;
        let mut archive =
            ZipArchive::new(file).map_err(|e| malformed(format!("not a valid archive: {e}")))?;

        let mut entry = match archive.by_name(MANIFEST_PATH) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(malformed(format!("cannot read {MANIFEST_PATH}: {e}"))),
        };

        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .map_err(|e| malformed(format!("cannot read {MANIFEST_PATH}: {e}")))?;
        Ok(Some(text))
    }
}

impl MetadataReader for ArchiveMetadataReader {
    fn read_metadata(&self, artifact: &Artifact) -> Result<ArtifactMetadata, ExtenvError> {
        let Some(text) = Self::read_manifest_text(artifact)? else {
            debug!(target: "manifest", "{} has no manifest", artifact.file_name());
            return Ok(ArtifactMetadata::default());
        };

        let manifest = Manifest::parse(&text).map_err(|reason| ExtenvError::MalformedMetadata {
            artifact: artifact.id().clone(),
            reason: format!("{MANIFEST_PATH}: {reason}"),
        })?;

        let metadata = ArtifactMetadata::from_manifest(&manifest, artifact);
        debug!(
            target: "manifest",
            "{}: {} required, {} optional, {} provided",
            artifact.file_name(),
            metadata.required.len(),
            metadata.optional.len(),
            metadata.provided.len()
        );
        Ok(metadata)
    }
}
