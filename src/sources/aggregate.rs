//! Priority-ordered aggregation over every registered source.
//!
//! Registration order is the authoritative priority: when two sources
//! advertise the same package name, the earlier registration wins and the
//! later descriptor is dropped. One failing source never fails an
//! aggregate query; its contribution is skipped with a warning.

use std::collections::HashSet;
use std::fmt;

use crate::core::Package;
use crate::sources::source::Source;

/// Name and URL of a source, for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceInfo {
    pub name: String,
    pub url: String,
}

/// A collection of sources queried in registration order.
#[derive(Default)]
pub struct SourceSet {
    sources: Vec<Box<dyn Source>>,
}

impl fmt::Debug for SourceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.sources.iter().map(|source| source.name()).collect();
        f.debug_struct("SourceSet").field("sources", &names).finish()
    }
}

impl SourceSet {
    pub fn new() -> Self {
        SourceSet::default()
    }

    /// Register a source. Order of registration is priority order; a
    /// duplicate identity is allowed and still queried.
    pub fn add(&mut self, source: Box<dyn Source>) {
        self.sources.push(source);
    }

    pub fn sources(&self) -> &[Box<dyn Source>] {
        &self.sources
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// First registration of each identity, order preserved.
    ///
    /// This is a display view only; queries always fan out over every
    /// registration.
    pub fn unique_sources(&self) -> Vec<&dyn Source> {
        let mut seen = HashSet::new();
        self.sources
            .iter()
            .filter(|source| seen.insert(source.name().to_string()))
            .map(|source| source.as_ref())
            .collect()
    }

    /// First registered source with the given identity.
    pub fn by_name(&self, name: &str) -> Option<&dyn Source> {
        self.sources
            .iter()
            .find(|source| source.name() == name)
            .map(|source| source.as_ref())
    }

    /// `(name, url)` pairs of the unique view, in priority order.
    pub fn infos(&self) -> Vec<SourceInfo> {
        self.unique_sources()
            .into_iter()
            .map(|source| SourceInfo {
                name: source.name().to_string(),
                url: source.url().to_string(),
            })
            .collect()
    }

    /// Every package from every source, merged.
    ///
    /// Merge order follows registration order, and the first source to
    /// name a package supplies its descriptor. Each surviving descriptor
    /// is stamped with the contributing source's identity.
    pub fn list_all(&self) -> Vec<Package> {
        self.merge(|source| match source.list_all() {
            Ok(packages) => packages,
            Err(e) => {
                tracing::warn!("{e}; skipping");
                Vec::new()
            }
        })
    }

    /// Search every source, merged with the same first-wins rule.
    pub fn search(&self, query: &str) -> Vec<Package> {
        self.merge(|source| source.search(query))
    }

    /// Walk sources in registration order, returning the first hit.
    ///
    /// Later sources are not queried once a source answers.
    pub fn find(&self, name: &str) -> Option<Package> {
        for source in &self.sources {
            if let Some(mut package) = source.find(name) {
                package.origin = source.name().to_string();
                return Some(package);
            }
        }
        None
    }

    fn merge(&self, mut query: impl FnMut(&dyn Source) -> Vec<Package>) -> Vec<Package> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for source in &self.sources {
            for mut package in query(source.as_ref()) {
                if package.name.is_empty() || !seen.insert(package.name.clone()) {
                    continue;
                }
                package.origin = source.name().to_string();
                merged.push(package);
            }
        }
        merged
    }
}
