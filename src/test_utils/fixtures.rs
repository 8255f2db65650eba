//! Fixtures for writing artifact archives and observing metadata reads.

use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use dashmap::DashMap;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::core::{Artifact, ArtifactId, ExtenvError};
use crate::manifest::{ArtifactMetadata, MANIFEST_PATH, MetadataReader};

/// Builder for a zip artifact with a generated manifest.
///
/// Required extensions get the aliases `req0`, `req1`, ...; optional ones `opt0`,
/// `opt1`, ... The generated manifest always carries `Manifest-Version: 1.0`.
#[derive(Clone, Debug)]
pub struct ArchiveFixture {
    pub name: String,
    required: Vec<(String, Option<String>)>,
    optional: Vec<(String, Option<String>)>,
    provided: Option<(String, Option<String>)>,
    entries: Vec<(String, Vec<u8>)>,
    manifest: ManifestSource,
}

#[derive(Clone, Debug)]
enum ManifestSource {
    Generated,
    Raw(String),
    Absent,
}

impl ArchiveFixture {
    /// Start an archive named `name` (e.g. `"task.jar"`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: Vec::new(),
            optional: Vec::new(),
            provided: None,
            entries: Vec::new(),
            manifest: ManifestSource::Generated,
        }
    }

    /// Declare a required extension.
    pub fn requires(mut self, name: &str, version: Option<&str>) -> Self {
        self.required.push((name.to_string(), version.map(str::to_string)));
        self
    }

    /// Declare an optional extension.
    pub fn optional(mut self, name: &str, version: Option<&str>) -> Self {
        self.optional.push((name.to_string(), version.map(str::to_string)));
        self
    }

    /// Declare the extension this archive provides.
    pub fn provides(mut self, name: &str, version: Option<&str>) -> Self {
        self.provided = Some((name.to_string(), version.map(str::to_string)));
        self
    }

    /// Add a file entry.
    pub fn entry(mut self, name: &str, content: impl AsRef<[u8]>) -> Self {
        self.entries.push((name.to_string(), content.as_ref().to_vec()));
        self
    }

    /// Write `text` verbatim as the manifest instead of generating one.
    pub fn raw_manifest(mut self, text: &str) -> Self {
        self.manifest = ManifestSource::Raw(text.to_string());
        self
    }

    /// Leave the manifest out of the archive entirely.
    pub fn without_manifest(mut self) -> Self {
        self.manifest = ManifestSource::Absent;
        self
    }

    /// Render the manifest text this fixture would write.
    pub fn manifest_text(&self) -> Option<String> {
        match &self.manifest {
            ManifestSource::Absent => None,
            ManifestSource::Raw(text) => Some(text.clone()),
            ManifestSource::Generated => {
                let mut text = String::from("Manifest-Version: 1.0\n");
                if let Some((name, version)) = &self.provided {
                    text.push_str(&format!("Extension-Name: {name}\n"));
                    if let Some(version) = version {
                        text.push_str(&format!("Specification-Version: {version}\n"));
                    }
                }
                append_list(&mut text, "Extension-List", "req", &self.required);
                append_list(&mut text, "Optional-Extension-List", "opt", &self.optional);
                Some(text)
            }
        }
    }

    /// Write the archive into `dir` (created if needed) and identify it.
    pub fn write(&self, dir: &Path) -> Result<Artifact> {
        let path = self.write_to(dir)?;
        Ok(Artifact::from_path(&path)?)
    }

    /// Write the archive into `dir` and return its path without identifying it.
    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
        let path = dir.join(&self.name);
        let file = File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

        let mut zip = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        if let Some(text) = self.manifest_text() {
            zip.start_file(MANIFEST_PATH, options)?;
            zip.write_all(text.as_bytes())?;
        }
        for (name, content) in &self.entries {
            zip.start_file(name.as_str(), options)?;
            zip.write_all(content)?;
        }
        zip.finish()?;

        Ok(path)
    }
}

fn append_list(text: &mut String, key: &str, prefix: &str, items: &[(String, Option<String>)]) {
    if items.is_empty() {
        return;
    }

    let aliases: Vec<String> = (0..items.len()).map(|i| format!("{prefix}{i}")).collect();
    text.push_str(&format!("{key}: {}\n", aliases.join(" ")));
    for (alias, (name, version)) in aliases.iter().zip(items) {
        text.push_str(&format!("{alias}-Extension-Name: {name}\n"));
        if let Some(version) = version {
            text.push_str(&format!("{alias}-Specification-Version: {version}\n"));
        }
    }
}

/// A [`MetadataReader`] that delegates to another reader and counts reads per artifact.
#[derive(Debug, Default)]
pub struct CountingReader<R> {
    inner: R,
    reads: DashMap<ArtifactId, usize>,
}

impl<R: MetadataReader> CountingReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            reads: DashMap::new(),
        }
    }

    /// How many times `artifact` has been read.
    pub fn reads_of(&self, artifact: &Artifact) -> usize {
        self.reads.get(artifact.id()).map_or(0, |count| *count)
    }

    /// Total number of reads across all artifacts.
    pub fn total_reads(&self) -> usize {
        self.reads.iter().map(|entry| *entry.value()).sum()
    }
}

impl<R: MetadataReader> MetadataReader for CountingReader<R> {
    fn read_metadata(&self, artifact: &Artifact) -> Result<ArtifactMetadata, ExtenvError> {
        *self.reads.entry(artifact.id().clone()).or_insert(0) += 1;
        self.inner.read_metadata(artifact)
    }
}
