//! REST API package source.
//!
//! Speaks the extras catalog API: `GET /extras`, `GET /extras/{name}` and
//! `GET /extras/search?q=`. Responses arrive either as a bare JSON array
//! or wrapped in a `{"data": ...}` envelope; both are accepted.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value;
use url::Url;

use crate::core::Package;
use crate::sources::cache::Cache;
use crate::sources::source::{Source, SourceError};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("extras-cli/", env!("CARGO_PKG_VERSION"));

/// Source backed by an extras REST API.
pub struct ApiSource {
    name: String,
    base_url: Url,
    http: reqwest::blocking::Client,
    cache: Arc<dyn Cache>,
    ttl: Duration,
}

impl ApiSource {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        cache: Arc<dyn Cache>,
        ttl: Duration,
    ) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .with_context(|| format!("invalid API base URL: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            bail!("API base URL has no path: {base_url}");
        }
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(ApiSource {
            name: name.into(),
            base_url,
            http,
            cache,
            ttl,
        })
    }

    /// Join path segments onto the base URL. A `/` inside a segment is
    /// percent-encoded, so `vendor/name` stays one segment.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn fetch_json(&self, url: Url) -> Result<Value, String> {
        tracing::debug!("GET {url}");
        let response = self.http.get(url).send().map_err(|e| e.to_string())?;
        let response = response.error_for_status().map_err(|e| e.to_string())?;
        response.json::<Value>().map_err(|e| e.to_string())
    }

    fn list_key(&self) -> String {
        format!("api:{}:all", self.name)
    }
}

/// Unwrap the optional `{"data": ...}` envelope around a package list.
fn parse_package_list(body: &Value) -> Vec<Package> {
    let items: &[Value] = match body {
        Value::Array(items) => items,
        Value::Object(map) => map
            .get("data")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    };
    items
        .iter()
        .filter_map(|item| serde_json::from_value::<Package>(item.clone()).ok())
        .filter(|package| !package.name.is_empty())
        .collect()
}

/// Unwrap the optional envelope around a single package.
fn parse_package(body: &Value) -> Option<Package> {
    let item = match body {
        Value::Object(map) if map.contains_key("data") => map.get("data")?,
        other => other,
    };
    serde_json::from_value::<Package>(item.clone())
        .ok()
        .filter(|package| !package.name.is_empty())
}

impl Source for ApiSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn url(&self) -> &str {
        self.base_url.as_str()
    }

    fn list_all(&self) -> Result<Vec<Package>, SourceError> {
        let key = self.list_key();
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("cache hit for {key}");
            return Ok(parse_package_list(&cached));
        }

        let body = self
            .fetch_json(self.endpoint(&["extras"]))
            .map_err(|reason| SourceError::unavailable(&self.name, reason))?;
        let packages = parse_package_list(&body);
        self.cache.put(&key, body, self.ttl);
        Ok(packages)
    }

    fn find(&self, name: &str) -> Option<Package> {
        // A still-fresh listing answers without a roundtrip. Absence from
        // the cached list is not a negative answer; only the remote is.
        if let Some(cached) = self.cache.get(&self.list_key()) {
            if let Some(package) = parse_package_list(&cached)
                .into_iter()
                .find(|package| package.name == name)
            {
                tracing::debug!("found `{name}` in cached listing");
                return Some(package);
            }
        }

        let body = self.fetch_json(self.endpoint(&["extras", name])).ok()?;
        parse_package(&body)
    }

    fn search(&self, query: &str) -> Vec<Package> {
        let key = format!("api:{}:search:{query}", self.name);
        if let Some(cached) = self.cache.get(&key) {
            tracing::debug!("cache hit for {key}");
            return parse_package_list(&cached);
        }

        let mut url = self.endpoint(&["extras", "search"]);
        url.query_pairs_mut().append_pair("q", query);
        match self.fetch_json(url) {
            Ok(body) => {
                let packages = parse_package_list(&body);
                self.cache.put(&key, body, self.ttl);
                packages
            }
            Err(reason) => {
                tracing::warn!("search against `{}` failed: {reason}", self.name);
                Vec::new()
            }
        }
    }
}
