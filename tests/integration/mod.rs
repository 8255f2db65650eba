//! Integration test suite for extenv
//!
//! End-to-end tests against real zip archives written into temporary directories.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **caching**: environment identity, sharing and failure retry
//! - **resolution**: cycles, unsatisfied and optional extensions, versions
//! - **lookup**: parents-first symbol resolution and resource enumeration
//! - **concurrency**: concurrent first use and sibling resolution
//! - **cli**: the `extenv` binary


mod caching;
mod cli;
mod concurrency;
mod lookup;
mod resolution;
