//! Error handling for extenv
//!
//! This module provides the typed error used across the crate and the user-friendly
//! rendering the CLI shows. The error system follows two principles:
//! 1. **Strongly-typed errors** so callers can match on the exact failure
//! 2. **User-friendly messages** with actionable suggestions for CLI users
//!
//! # Architecture
//!
//! - [`ExtenvError`] - every failure the environment manager can report
//! - [`ErrorContext`] - wrapper adding details and a suggestion for display
//! - [`user_friendly_error`] - converts any [`anyhow::Error`] into an [`ErrorContext`]
//!
//! # Error Categories
//!
//! - **Metadata**: [`ExtenvError::MalformedMetadata`]
//! - **Resolution**: [`ExtenvError::UnsatisfiedExtension`], [`ExtenvError::CycleDetected`]
//! - **Construction**: [`ExtenvError::IoFailure`], [`ExtenvError::ConstructionFailure`]
//! - **Ambient**: [`ExtenvError::InvalidArtifact`], [`ExtenvError::ConfigError`],
//!   [`ExtenvError::Other`]
//!
//! Failures are never cached: a later request for the same artifact is free to
//! attempt resolution again.
//!
//! # Examples
//!
//! ```rust,no_run
//! use extenv::core::{ExtenvError, user_friendly_error};
//!
//! fn build() -> anyhow::Result<()> {
//!     Err(ExtenvError::ConfigError {
//!         message: "extension_dirs must be a list".to_string(),
//!     }
//!     .into())
//! }
//!
//! if let Err(e) = build() {
//!     user_friendly_error(e).display();
//! }
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::core::artifact::ArtifactId;
use crate::manifest::ExtensionRequirement;

/// The main error type for extenv operations
///
/// # Error Categories
///
/// ## Resolution
/// - [`MalformedMetadata`] - the artifact's manifest cannot be opened or parsed
/// - [`UnsatisfiedExtension`] - no provider is registered for a requirement
/// - [`CycleDetected`] - an artifact (transitively) requires itself
///
/// ## Construction
/// - [`IoFailure`] - the archive could not be opened while building its environment
/// - [`ConstructionFailure`] - building a provider's environment failed
///
/// [`MalformedMetadata`]: ExtenvError::MalformedMetadata
/// [`UnsatisfiedExtension`]: ExtenvError::UnsatisfiedExtension
/// [`CycleDetected`]: ExtenvError::CycleDetected
/// [`IoFailure`]: ExtenvError::IoFailure
/// [`ConstructionFailure`]: ExtenvError::ConstructionFailure
#[derive(Error, Debug)]
pub enum ExtenvError {
    /// The artifact's metadata section cannot be read or parsed
    ///
    /// Raised when the archive cannot be opened, is not a valid zip file, or its
    /// `META-INF/MANIFEST.MF` violates the manifest syntax.
    #[error("Malformed metadata in '{artifact}': {reason}")]
    MalformedMetadata {
        /// Artifact whose metadata could not be read
        artifact: ArtifactId,
        /// Specific reason for the failure
        reason: String,
    },

    /// A required extension has no registered provider
    #[error("Artifact '{artifact}' requires extension {requirement}, which no artifact provides")]
    UnsatisfiedExtension {
        /// Artifact that declared the requirement
        artifact: ArtifactId,
        /// The exact requirement (name and version token) that could not be matched
        requirement: ExtensionRequirement,
    },

    /// An artifact was reached again while it was still being resolved
    ///
    /// # Fields
    /// - `artifact`: the artifact whose presence in the pending set closed the cycle
    /// - `chain`: the pending resolution path, ending with `artifact`
    #[error("Dependency cycle detected at '{artifact}'")]
    CycleDetected {
        /// Artifact that closes the cycle
        artifact: ArtifactId,
        /// Resolution path from the first occurrence of `artifact` back to itself
        chain: Vec<ArtifactId>,
    },

    /// The archive could not be opened while constructing its environment
    #[error("Failed to open artifact '{artifact}'")]
    IoFailure {
        /// Artifact that could not be opened
        artifact: ArtifactId,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Building the environment of a provider failed
    ///
    /// Nested failures form a chain: "while building X, failed building provider Y".
    /// Use [`ExtenvError::root_cause`] to reach the original failure.
    #[error("Failed to build environment for '{artifact}': provider '{provider}' failed")]
    ConstructionFailure {
        /// Artifact whose construction triggered the provider build
        artifact: ArtifactId,
        /// Provider whose environment could not be built
        provider: ArtifactId,
        /// The provider's failure
        #[source]
        source: Box<ExtenvError>,
    },

    /// A path handed to the manager does not identify an artifact
    #[error("Invalid artifact '{}': {reason}", .path.display())]
    InvalidArtifact {
        /// The offending path as given
        path: PathBuf,
        /// Why it could not be identified
        reason: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration error
        message: String,
    },

    /// Other error
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl ExtenvError {
    /// Follow nested [`ExtenvError::ConstructionFailure`]s down to the original error.
    pub fn root_cause(&self) -> &ExtenvError {
        let mut current = self;
        while let Self::ConstructionFailure {
            source,
            ..
        } = current
        {
            current = source;
        }
        current
    }

    /// The construction chain as a list of artifacts, outermost first.
    ///
    /// For a plain error this is just the implicated artifact (if any).
    pub fn construction_chain(&self) -> Vec<ArtifactId> {
        let mut chain = Vec::new();
        let mut current = self;
        loop {
            match current {
                Self::ConstructionFailure {
                    artifact,
                    source,
                    ..
                } => {
                    chain.push(artifact.clone());
                    current = source;
                }
                Self::MalformedMetadata {
                    artifact,
                    ..
                }
                | Self::UnsatisfiedExtension {
                    artifact,
                    ..
                }
                | Self::CycleDetected {
                    artifact,
                    ..
                }
                | Self::IoFailure {
                    artifact,
                    ..
                } => {
                    if chain.last() != Some(artifact) {
                        chain.push(artifact.clone());
                    }
                    return chain;
                }
                _ => return chain,
            }
        }
    }
}

/// Error context wrapper that provides user-friendly error information
///
/// When displayed, errors show:
/// 1. **Error**: The main error message in red
/// 2. **Details**: Additional context about the error in yellow (optional)
/// 3. **Suggestion**: Actionable steps to resolve the issue in green (optional)
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: ExtenvError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context without suggestion or details.
    #[must_use]
    pub const fn new(error: ExtenvError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into a user-friendly [`ErrorContext`].
///
/// An [`ErrorContext`] that was already prepared is passed through unchanged.
/// [`ExtenvError`]s get tailored suggestions, I/O errors get generic filesystem
/// advice and everything else is rendered with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let error = match error.downcast::<ErrorContext>() {
        Ok(ctx) => return ctx,
        Err(other) => other,
    };

    let error = match error.downcast::<ExtenvError>() {
        Ok(extenv_error) => return create_error_context(extenv_error),
        Err(other) => other,
    };

    if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(ExtenvError::Other {
                    message: format!("Permission denied: {io_error}"),
                })
                .with_suggestion("Check the file permissions of the artifact and extension directories");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(ExtenvError::Other {
                    message: format!("File not found: {io_error}"),
                })
                .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    if let Some(toml_error) = error.downcast_ref::<toml::de::Error>() {
        return ErrorContext::new(ExtenvError::ConfigError {
            message: toml_error.to_string(),
        })
        .with_suggestion("Check the TOML syntax of your extenv configuration file")
        .with_details("Expected keys: extension_dirs = [..], common = [..]");
    }

    // Generic error - include the full error chain for better diagnostics
    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ExtenvError::Other {
        message,
    })
}

/// Map each [`ExtenvError`] variant to a context with tailored suggestions.
fn create_error_context(error: ExtenvError) -> ErrorContext {
    let (suggestion, details): (Option<String>, Option<String>) = match error.root_cause() {
        ExtenvError::MalformedMetadata {
            reason,
            ..
        } => (
            Some("Check that the artifact is a valid zip archive and that META-INF/MANIFEST.MF uses 'Name: value' lines".to_string()),
            Some(reason.clone()),
        ),
        ExtenvError::UnsatisfiedExtension {
            requirement,
            ..
        } => (
            Some(format!(
                "Add an archive providing extension '{}' to one of the extension directories (--ext-dir)",
                requirement.name
            )),
            Some(match &requirement.version {
                Some(version) => format!(
                    "A provider must declare 'Extension-Name: {}' with a Specification-Version of at least {version}",
                    requirement.name
                ),
                None => format!("A provider must declare 'Extension-Name: {}'", requirement.name),
            }),
        ),
        ExtenvError::CycleDetected {
            chain,
            ..
        } => (
            Some("Remove one of the Extension-List entries that forms the cycle".to_string()),
            Some(format!(
                "Resolution chain: {}",
                chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ")
            )),
        ),
        ExtenvError::IoFailure {
            source,
            ..
        } => (
            Some("Check that the archive exists and is readable".to_string()),
            Some(source.to_string()),
        ),
        ExtenvError::InvalidArtifact {
            ..
        } => (Some("Pass the path of an existing archive file".to_string()), None),
        _ => (None, None),
    };

    let chain = error.construction_chain();
    let details = if chain.len() > 1 {
        let path = chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" → ");
        Some(match details {
            Some(d) => format!("While building {path}: {d}"),
            None => format!("While building {path}"),
        })
    } else {
        details
    };

    let mut ctx = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        ctx = ctx.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        ctx = ctx.with_details(details);
    }
    ctx
}
