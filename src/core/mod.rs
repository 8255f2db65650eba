//! Core types for extenv
//!
//! This module holds the two abstractions every other module builds on:
//!
//! - **Artifact identity** ([`Artifact`], [`ArtifactId`]): a pluggable archive
//!   identified by its canonical path
//! - **Error management** ([`ExtenvError`], [`ErrorContext`]): strongly-typed failures
//!   plus user-friendly rendering for the CLI
//!
//! # Error Handling Pattern
//!
//! Library operations return `Result<T, ExtenvError>` so callers can match on the
//! exact failure. The CLI works with [`anyhow::Result`] and converts failures with
//! [`user_friendly_error`] right before printing them.
//!
//! ```rust,no_run
//! use extenv::core::{Artifact, user_friendly_error};
//!
//! match Artifact::from_path("plugins/tasks.jar") {
//!     Ok(artifact) => println!("identified {artifact}"),
//!     Err(e) => user_friendly_error(e.into()).display(),
//! }
//! ```

pub mod artifact;
pub mod error;

pub use artifact::{Artifact, ArtifactId};
pub use error::{ErrorContext, ExtenvError, user_friendly_error};
