//! Package sources.
//!
//! Sources are responsible for fetching package metadata from remote
//! locations (the extras API, GitHub organizations) and are queried
//! through an aggregate that merges their catalogs.

use std::sync::Arc;

use anyhow::{bail, Result};

use crate::util::config::{Config, SourceKind};

pub mod aggregate;
pub mod api;
pub mod cache;
pub mod github;
pub mod source;

pub use aggregate::{SourceInfo, SourceSet};
pub use api::ApiSource;
pub use cache::{cache_from_config, Cache, CacheStatus, DiskCache, MemoryCache, NoCache};
pub use github::GithubSource;
pub use source::{Source, SourceError};

/// Build the aggregate source set described by the configuration.
///
/// Entries are registered in configuration order, which fixes their
/// priority. Disabled entries are skipped. GitHub sources pick up an
/// access token from `GITHUB_TOKEN` when the configuration has none.
pub fn from_config(config: &Config, cache: Arc<dyn Cache>) -> Result<SourceSet> {
    let ttl = config.cache_ttl();
    let token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());

    let mut set = SourceSet::new();
    for entry in config.source_entries() {
        if !entry.enabled {
            tracing::debug!("source `{}` disabled, skipping", entry.name);
            continue;
        }
        match entry.kind {
            SourceKind::Api => {
                let url = entry.url.clone().unwrap_or_else(|| config.api_url());
                let source = ApiSource::new(entry.name.as_str(), &url, cache.clone(), ttl)?;
                set.add(Box::new(source));
            }
            SourceKind::Github => {
                let Some(org) = entry.organization.as_deref() else {
                    bail!("github source `{}` has no organization", entry.name);
                };
                let source =
                    GithubSource::new(entry.name.as_str(), org, token.clone(), cache.clone(), ttl)?;
                set.add(Box::new(source));
            }
        }
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::cache::NoCache;
    use crate::util::config::{Config, SourceConfig};

    #[test]
    fn test_from_config_defaults() {
        let config = Config::default();
        let set = from_config(&config, Arc::new(NoCache)).unwrap();

        let infos = set.infos();
        assert_eq!(infos.len(), 2);
        assert_eq!(infos[0].name, "official");
        assert_eq!(infos[1].name, "community");
    }

    #[test]
    fn test_from_config_skips_disabled() {
        let mut config = Config::default();
        config.sources = Some(vec![SourceConfig {
            kind: SourceKind::Api,
            name: "official".into(),
            url: Some("http://127.0.0.1:9/api/v1".into()),
            organization: None,
            enabled: false,
        }]);

        let set = from_config(&config, Arc::new(NoCache)).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_from_config_rejects_github_without_organization() {
        let mut config = Config::default();
        config.sources = Some(vec![SourceConfig {
            kind: SourceKind::Github,
            name: "community".into(),
            url: None,
            organization: None,
            enabled: true,
        }]);

        let err = from_config(&config, Arc::new(NoCache)).unwrap_err();
        assert!(err.to_string().contains("no organization"));
    }
}
