//! Test utilities and mocks for extras unit tests.
//!
//! The main piece is [`StaticSource`], an in-memory [`Source`] with
//! scripted contents and failure behavior, so aggregation and service
//! logic can be tested without a network.
//!
//! # Example
//!
//! ```rust,ignore
//! use extras::test_support::{package, StaticSource};
//!
//! #[test]
//! fn test_example() {
//!     let source = StaticSource::new("official")
//!         .with_package(package("acme/widget", "1.0.0"));
//!     assert_eq!(source.list_all().unwrap().len(), 1);
//! }
//! ```

pub mod fixtures;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::core::Package;
use crate::sources::{Source, SourceError};

// Re-export fixtures for convenience
pub use fixtures::*;

/// In-memory source with scripted contents.
pub struct StaticSource {
    name: String,
    url: String,
    packages: Vec<Package>,
    fail_listing: bool,
    find_calls: Arc<AtomicUsize>,
}

impl StaticSource {
    /// Create an empty source named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        StaticSource {
            url: format!("static://{name}"),
            name,
            packages: Vec::new(),
            fail_listing: false,
            find_calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Add a package to the scripted catalog.
    pub fn with_package(mut self, package: Package) -> Self {
        self.packages.push(package);
        self
    }

    /// Make `list_all` fail with an unavailable error.
    pub fn failing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    /// Shared counter of `find` invocations.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.find_calls)
    }
}

impl Source for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.url
    }

    fn list_all(&self) -> Result<Vec<Package>, SourceError> {
        if self.fail_listing {
            return Err(SourceError::unavailable(&self.name, "scripted failure"));
        }
        Ok(self.packages.clone())
    }

    fn find(&self, name: &str) -> Option<Package> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        self.packages.iter().find(|p| p.name == name).cloned()
    }

    fn search(&self, query: &str) -> Vec<Package> {
        self.packages
            .iter()
            .filter(|p| p.name.contains(query) || p.description.contains(query))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_source_scripting() {
        let source = StaticSource::new("official")
            .with_package(package("acme/widget", "1.0.0"))
            .with_package(package("acme/gadget", "2.0.0"));

        assert_eq!(source.name(), "official");
        assert_eq!(source.url(), "static://official");
        assert_eq!(source.list_all().unwrap().len(), 2);
        assert_eq!(source.search("widget").len(), 1);

        let calls = source.call_counter();
        assert!(source.find("acme/widget").is_some());
        assert!(source.find("acme/nothing").is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_static_source_failure() {
        let source = StaticSource::new("official").failing();
        assert!(source.list_all().is_err());
    }
}
