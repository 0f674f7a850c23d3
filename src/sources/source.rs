//! Source trait - common interface for all package sources.

use std::fmt;

use crate::core::Package;

/// Error raised by a source that cannot serve a request.
///
/// `Display` and `Error` are implemented by hand: thiserror would treat
/// the `source` field (the source's *name*) as the error's cause and
/// demand it implement `Error`.
#[derive(Debug)]
pub enum SourceError {
    /// The source could not be reached or returned garbage.
    Unavailable { source: String, reason: String },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceError::Unavailable { source, reason } => {
                write!(f, "source `{source}` unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for SourceError {}

impl SourceError {
    pub fn unavailable(source: impl Into<String>, reason: impl Into<String>) -> Self {
        SourceError::Unavailable {
            source: source.into(),
            reason: reason.into(),
        }
    }
}

/// A remote catalog of extras.
///
/// Implementations differ in transport (REST API, GitHub org) but share
/// one failure contract: only `list_all` reports errors. `find` folds every
/// failure into `None` and `search` into an empty result, so callers never
/// distinguish a transport error from a genuine absence on those paths.
pub trait Source: Send + Sync {
    /// Identity used for provenance stamping and display.
    fn name(&self) -> &str;

    /// Endpoint or organization URL, for display.
    fn url(&self) -> &str;

    /// Every package the source advertises.
    fn list_all(&self) -> Result<Vec<Package>, SourceError>;

    /// Look up one package by exact name.
    fn find(&self, name: &str) -> Option<Package>;

    /// Packages matching a free-form query.
    fn search(&self, query: &str) -> Vec<Package>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_display() {
        let err = SourceError::unavailable("official", "connection refused");
        assert_eq!(
            err.to_string(),
            "source `official` unavailable: connection refused"
        );
    }
}
