//! GitHub organization package source.
//!
//! Treats an organization's public repositories as a catalog. Each repo is
//! enriched best-effort from its `composer.json` (contents API) and its
//! latest release tag; when enrichment fails the repo still appears with
//! whatever the repo object itself provides.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::prelude::*;
use reqwest::header::ACCEPT;
use serde_json::Value;
use url::Url;

use crate::core::Package;
use crate::sources::cache::Cache;
use crate::sources::source::{Source, SourceError};

const API_ROOT: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("extras-cli/", env!("CARGO_PKG_VERSION"));

/// Version reported for repos without a published release.
const DEV_VERSION: &str = "dev-master";

/// Source backed by a GitHub organization.
pub struct GithubSource {
    name: String,
    org: String,
    display_url: String,
    api_root: Url,
    http: reqwest::blocking::Client,
    cache: Arc<dyn Cache>,
    ttl: Duration,
    token: Option<String>,
}

impl GithubSource {
    pub fn new(
        name: impl Into<String>,
        org: impl Into<String>,
        token: Option<String>,
        cache: Arc<dyn Cache>,
        ttl: Duration,
    ) -> Result<Self> {
        let org = org.into();
        let api_root = Url::parse(API_ROOT).context("invalid GitHub API root")?;
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(GithubSource {
            name: name.into(),
            display_url: format!("https://github.com/{org}"),
            org,
            api_root,
            http,
            cache,
            ttl,
            token,
        })
    }

    /// Point at a different API root, for GitHub Enterprise installs.
    pub fn with_api_root(mut self, api_root: Url) -> Self {
        self.api_root = api_root;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn get_json(&self, url: Url) -> Result<Value, String> {
        tracing::debug!("GET {url}");
        let mut request = self.http.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        let response = request.send().map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.json::<Value>().map_err(|e| e.to_string())
    }

    fn list_key(&self) -> String {
        format!("github:{}:{}:repos", self.name, self.org)
    }

    /// Build a descriptor for one repo object, enriching it from the
    /// repo's composer.json and latest release when reachable.
    fn package_from_repo(&self, repo: &Value) -> Option<Package> {
        let repo_name = repo.get("name").and_then(Value::as_str)?;

        let mut package = self.fetch_manifest(repo_name).unwrap_or_default();
        if package.name.is_empty() {
            package.name = format!("{}/{}", self.org, repo_name);
        }
        package.version = self
            .latest_release(repo_name)
            .unwrap_or_else(|| DEV_VERSION.to_string());

        if package.description.is_empty() {
            package.description = str_field(repo, "description");
        }
        if package.homepage.is_empty() {
            package.homepage = str_field(repo, "html_url");
        }
        if package.author.is_empty() {
            package.author = self.org.clone();
        }
        if package.license.is_empty() {
            package.license = repo
                .get("license")
                .and_then(|l| l.get("spdx_id"))
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string();
        }
        if package.keywords.is_empty() {
            package.keywords = repo
                .get("topics")
                .and_then(Value::as_array)
                .map(|topics| {
                    topics
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
        }
        if package.source_url.is_none() {
            package.source_url = repo
                .get("clone_url")
                .or_else(|| repo.get("html_url"))
                .and_then(Value::as_str)
                .map(str::to_string);
        }
        package.created_at = str_field(repo, "created_at");
        package.updated_at = str_field(repo, "updated_at");

        Some(package)
    }

    fn fetch_manifest(&self, repo_name: &str) -> Option<Package> {
        let url = self.endpoint(&["repos", &self.org, repo_name, "contents", "composer.json"]);
        let body = self.get_json(url).ok()?;
        parse_contents(&body)
    }

    fn latest_release(&self, repo_name: &str) -> Option<String> {
        let url = self.endpoint(&["repos", &self.org, repo_name, "releases", "latest"]);
        let body = self.get_json(url).ok()?;
        body.get("tag_name").and_then(Value::as_str).map(str::to_string)
    }
}

fn str_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn is_archived(repo: &Value) -> bool {
    repo.get("archived").and_then(Value::as_bool).unwrap_or(false)
}

/// The path tail of a package name: `vendor/pkg` names the repo `pkg`.
fn repo_slug(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Decode a contents-API response into a package descriptor.
///
/// The API wraps file bodies in base64 with embedded newlines.
fn parse_contents(body: &Value) -> Option<Package> {
    let encoded = body.get("content").and_then(Value::as_str)?;
    let compact: String = encoded.split_whitespace().collect();
    let raw = BASE64_STANDARD.decode(compact.as_bytes()).ok()?;
    serde_json::from_slice(&raw).ok()
}

impl Source for GithubSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        &self.display_url
    }

    /// Enumerate the organization's public repos.
    ///
    /// Unlike the API source, a listing failure degrades to an empty
    /// contribution: an org behind a flaky proxy behaves like an empty
    /// org instead of poisoning aggregation.
    fn list_all(&self) -> Result<Vec<Package>, SourceError> {
        let key = self.list_key();
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("cache hit for {key}");
            return Ok(serde_json::from_value(cached).unwrap_or_default());
        }

        let mut url = self.endpoint(&["orgs", &self.org, "repos"]);
        url.query_pairs_mut()
            .append_pair("per_page", "100")
            .append_pair("type", "public");

        let body = match self.get_json(url) {
            Ok(body) => body,
            Err(reason) => {
                tracing::warn!("listing org `{}` failed: {reason}", self.org);
                return Ok(Vec::new());
            }
        };

        let packages: Vec<Package> = body
            .as_array()
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter(|repo| !is_archived(repo))
            .filter_map(|repo| self.package_from_repo(repo))
            .collect();

        if let Ok(value) = serde_json::to_value(&packages) {
            self.cache.put(&key, value, self.ttl);
        }
        Ok(packages)
    }

    fn find(&self, name: &str) -> Option<Package> {
        let url = self.endpoint(&["repos", &self.org, repo_slug(name)]);
        let body = self.get_json(url).ok()?;
        self.package_from_repo(&body)
    }

    fn search(&self, query: &str) -> Vec<Package> {
        let mut url = self.endpoint(&["search", "repositories"]);
        url.query_pairs_mut()
            .append_pair("q", &format!("org:{} {query}", self.org))
            .append_pair("sort", "stars")
            .append_pair("order", "desc");

        match self.get_json(url) {
            Ok(body) => body
                .get("items")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter(|repo| !is_archived(repo))
                        .filter_map(|repo| self.package_from_repo(repo))
                        .collect()
                })
                .unwrap_or_default(),
            Err(reason) => {
                tracing::warn!("search against `{}` failed: {reason}", self.name);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::cache::MemoryCache;
    use serde_json::json;

    /// An API root where every enrichment request is refused immediately.
    fn dead_source() -> GithubSource {
        let cache: Arc<dyn Cache> = Arc::new(MemoryCache::new());
        GithubSource::new("community", "cms-extras", None, cache, Duration::from_secs(60))
            .unwrap()
            .with_api_root(Url::parse("http://127.0.0.1:9").unwrap())
    }

    #[test]
    fn test_repo_slug() {
        assert_eq!(repo_slug("acme/widget"), "widget");
        assert_eq!(repo_slug("widget"), "widget");
        assert_eq!(repo_slug("a/b/c"), "c");
    }

    #[test]
    fn test_package_from_repo_metadata_only() {
        let source = dead_source();
        let repo = json!({
            "name": "widget",
            "description": "A widget",
            "html_url": "https://github.com/cms-extras/widget",
            "clone_url": "https://github.com/cms-extras/widget.git",
            "topics": ["cms", "widget"],
            "license": {"spdx_id": "MIT"},
            "created_at": "2023-05-01T00:00:00Z",
            "updated_at": "2024-05-01T00:00:00Z"
        });

        let package = source.package_from_repo(&repo).unwrap();
        assert_eq!(package.name, "cms-extras/widget");
        assert_eq!(package.version, "dev-master");
        assert_eq!(package.description, "A widget");
        assert_eq!(package.author, "cms-extras");
        assert_eq!(package.license, "MIT");
        assert_eq!(package.keywords, vec!["cms", "widget"]);
        assert_eq!(
            package.source_url.as_deref(),
            Some("https://github.com/cms-extras/widget.git")
        );
    }

    #[test]
    fn test_package_from_repo_without_name_is_skipped() {
        let source = dead_source();
        assert!(source.package_from_repo(&json!({"full_name": "x/y"})).is_none());
    }

    #[test]
    fn test_is_archived() {
        assert!(is_archived(&json!({"archived": true})));
        assert!(!is_archived(&json!({"archived": false})));
        assert!(!is_archived(&json!({})));
    }

    #[test]
    fn test_parse_contents_with_wrapped_base64() {
        // "ewogICJuYW1lIjogImFjbWUvd2lkZ2V0Igp9Cg==" is {"name": "acme/widget"},
        // split the way the contents API wraps long bodies.
        let body = json!({
            "content": "ewogICJuYW1lIjogImFj\nbWUvd2lkZ2V0Igp9Cg==\n",
            "encoding": "base64"
        });

        let package = parse_contents(&body).unwrap();
        assert_eq!(package.name, "acme/widget");
    }

    #[test]
    fn test_parse_contents_rejects_garbage() {
        assert!(parse_contents(&json!({"content": "!!!"})).is_none());
        assert!(parse_contents(&json!({})).is_none());
    }

    #[test]
    fn test_list_all_unreachable_degrades_to_empty() {
        let source = dead_source();
        assert!(source.list_all().unwrap().is_empty());
    }

    #[test]
    fn test_list_all_served_from_cache() {
        let cache = Arc::new(MemoryCache::new());
        cache.put(
            "github:community:cms-extras:repos",
            json!([{"name": "cms-extras/widget", "version": "1.0.0"}]),
            Duration::from_secs(60),
        );

        let source = GithubSource::new(
            "community",
            "cms-extras",
            None,
            cache,
            Duration::from_secs(60),
        )
        .unwrap()
        .with_api_root(Url::parse("http://127.0.0.1:9").unwrap());

        let packages = source.list_all().unwrap();
        assert_eq!(packages.len(), 1);
        assert_eq!(packages[0].version, "1.0.0");
    }

    #[test]
    fn test_display_url() {
        let source = dead_source();
        assert_eq!(source.url(), "https://github.com/cms-extras");
    }
}
