//! Test utilities for extenv
//!
//! Helpers shared by unit tests and the integration test target:
//! - [`ArchiveFixture`] writes real zip artifacts with a generated
//!   `META-INF/MANIFEST.MF` and arbitrary entries
//! - [`CountingReader`] wraps a [`MetadataReader`](crate::manifest::MetadataReader)
//!   and records how often each artifact was read
//! - [`init_test_logging`] installs a test-friendly tracing subscriber
//!
//! # Example
//!
//! ```rust,no_run
//! use extenv::test_utils::ArchiveFixture;
//!
//! # fn example() -> anyhow::Result<()> {
//! let temp = tempfile::TempDir::new()?;
//! let provider = ArchiveFixture::new("xml.jar")
//!     .provides("org.example.xml", Some("1.0"))
//!     .entry("shared.txt", "from xml")
//!     .write(temp.path())?;
//! # Ok(())
//! # }
//! ```

pub mod fixtures;

pub use fixtures::{ArchiveFixture, CountingReader};

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. With `Some(level)` that level is used,
/// otherwise `RUST_LOG` is honored; with neither, logging stays off.
///
/// ```bash
/// RUST_LOG=resolver=debug,cache=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(true)
            .try_init();
    });
}
