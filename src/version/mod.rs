//! Specification version tokens.
//!
//! Extension versions are dotted-decimal tokens such as `1.2` or `3.0.1`, as found in
//! `Specification-Version` manifest attributes. This module only answers "is the
//! provided version at least the required one". There is no range syntax.
//!
//! Tokens that are not dotted-decimal (for example `1.0-beta`) are treated as opaque:
//! they only match a token with the identical text.
//!
//! # Examples
//!
//! ```rust
//! use extenv::version::SpecVersion;
//!
//! assert!(SpecVersion::satisfies("1.10", "1.9"));
//! assert!(SpecVersion::satisfies("2", "1.9.9"));
//! assert!(!SpecVersion::satisfies("1.2", "1.2.1"));
//! assert!(SpecVersion::satisfies("1.0-beta", "1.0-beta"));
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// A parsed dotted-decimal version such as `1.2.0`.
///
/// Missing trailing components compare as zero, so `1.2` equals `1.2.0`.
#[derive(Debug, Clone, Eq)]
pub struct SpecVersion {
    components: Vec<u64>,
}

impl SpecVersion {
    /// Parse a dotted-decimal token, returning `None` for anything else.
    pub fn parse(token: &str) -> Option<Self> {
        token.trim().parse().ok()
    }

    /// Whether a provider declaring `provided` satisfies a requirement for `required`.
    ///
    /// Both tokens are compared numerically when they parse as dotted-decimal;
    /// otherwise only an exact (trimmed) textual match is accepted.
    pub fn satisfies(provided: &str, required: &str) -> bool {
        match (Self::parse(provided), Self::parse(required)) {
            (Some(p), Some(r)) => p >= r,
            _ => provided.trim() == required.trim(),
        }
    }

    /// Numeric components of this version.
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    fn component(&self, index: usize) -> u64 {
        self.components.get(index).copied().unwrap_or(0)
    }
}

impl FromStr for SpecVersion {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let components = s.split('.').map(str::parse::<u64>).collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            components,
        })
    }
}

impl PartialEq for SpecVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for SpecVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SpecVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        (0..len)
            .map(|i| self.component(i).cmp(&other.component(i)))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl fmt::Display for SpecVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.components.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join("."))
    }
}
