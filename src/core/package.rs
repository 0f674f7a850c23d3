//! Package - the descriptor exchanged between sources and the CLI.
//!
//! Descriptors arrive from remote catalogs with wildly varying shapes, so
//! deserialization is deliberately tolerant: every field except the name
//! defaults when absent or malformed.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Maximum length of a short description before truncation.
const SHORT_DESCRIPTION_LEN: usize = 100;

/// Shape of a canonical `vendor/package` name.
static NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([a-z0-9._-]*[a-z0-9])?/[a-z0-9]([a-z0-9._-]*[a-z0-9])?$")
        .expect("valid package name regex")
});

/// Metadata for one extra, as advertised by a package source.
///
/// The `name` is the canonical identity; matching is exact and
/// case-sensitive everywhere. `origin` records which source supplied the
/// descriptor and is stamped by the aggregator, never by sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Package {
    pub name: String,

    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub description: String,

    /// Advertised latest version. Display only; installs always go through
    /// a constraint, never this field.
    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub version: String,

    /// Package type tag, e.g. "cms-plugin".
    #[serde(rename = "type", deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub kind: String,

    #[serde(deserialize_with = "author_string", skip_serializing_if = "String::is_empty")]
    pub author: String,

    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub license: String,

    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub homepage: String,

    #[serde(deserialize_with = "string_vec", skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,

    /// Dependency constraints, display only.
    #[serde(deserialize_with = "string_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub require: BTreeMap<String, String>,

    #[serde(deserialize_with = "string_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub suggest: BTreeMap<String, String>,

    /// Support URLs (issues, docs, source).
    #[serde(deserialize_with = "string_map", skip_serializing_if = "BTreeMap::is_empty")]
    pub support: BTreeMap<String, String>,

    /// Download URL, flattened from a nested `dist.url` object when present.
    #[serde(alias = "dist", deserialize_with = "nested_url", skip_serializing_if = "Option::is_none")]
    pub dist_url: Option<String>,

    /// Repository URL, flattened from a nested `source.url` object when present.
    #[serde(alias = "source", deserialize_with = "nested_url", skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,

    /// Free-form vendor block; `extra.instructions` is shown after install.
    #[serde(deserialize_with = "json_map", skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, Value>,

    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub created_at: String,

    #[serde(deserialize_with = "lossy_string", skip_serializing_if = "String::is_empty")]
    pub updated_at: String,

    /// Display name of the source this descriptor came from.
    #[serde(rename = "repository", skip_serializing_if = "String::is_empty")]
    pub origin: String,
}

impl Package {
    /// Create a descriptor carrying only a name.
    pub fn new(name: impl Into<String>) -> Self {
        Package {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name for display, or a placeholder when the source omitted one.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "(unnamed)"
        } else {
            &self.name
        }
    }

    /// Description truncated for table output.
    pub fn short_description(&self) -> String {
        let count = self.description.chars().count();
        if count <= SHORT_DESCRIPTION_LEN {
            return self.description.clone();
        }
        let truncated: String = self
            .description
            .chars()
            .take(SHORT_DESCRIPTION_LEN - 3)
            .collect();
        format!("{truncated}...")
    }

    /// Whether the name has the canonical `vendor/package` shape.
    pub fn is_valid(&self) -> bool {
        NAME_RE.is_match(&self.name)
    }
}

/// Accept a string, number, or null where a string is expected.
fn lossy_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Accept a string, or the composer-style list of `{name, email}` objects.
fn author_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| item.get("name").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    })
}

fn string_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

/// Accept a map of strings; non-string values are dropped. PHP backends
/// encode empty maps as `[]`, which also lands here.
fn string_map<'de, D>(deserializer: D) -> Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let mut out = BTreeMap::new();
    if let Some(Value::Object(map)) = value {
        for (key, value) in map {
            if let Value::String(s) = value {
                out.insert(key, s);
            }
        }
    }
    Ok(out)
}

fn json_map<'de, D>(deserializer: D) -> Result<serde_json::Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Object(map)) => map,
        _ => serde_json::Map::new(),
    })
}

/// Accept a bare URL string or a `{url: ...}` object.
fn nested_url<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => Some(s),
        Value::Object(map) => map
            .get("url")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sparse_payload() {
        let package: Package = serde_json::from_value(json!({
            "name": "acme/widget"
        }))
        .unwrap();

        assert_eq!(package.name, "acme/widget");
        assert!(package.description.is_empty());
        assert!(package.require.is_empty());
        assert!(package.dist_url.is_none());
    }

    #[test]
    fn test_full_payload() {
        let package: Package = serde_json::from_value(json!({
            "name": "acme/widget",
            "description": "A widget",
            "version": "1.2.3",
            "type": "cms-plugin",
            "author": "Acme",
            "license": "MIT",
            "homepage": "https://acme.example",
            "keywords": ["widget", "cms"],
            "require": {"php": ">=8.1"},
            "dist": {"url": "https://acme.example/widget.zip", "type": "zip"},
            "source": {"url": "https://github.com/acme/widget", "type": "git"},
            "extra": {"instructions": "Run migrations."},
            "created_at": "2024-01-01T00:00:00Z",
            "unknown_field": 42
        }))
        .unwrap();

        assert_eq!(package.kind, "cms-plugin");
        assert_eq!(package.keywords, vec!["widget", "cms"]);
        assert_eq!(package.require["php"], ">=8.1");
        assert_eq!(
            package.dist_url.as_deref(),
            Some("https://acme.example/widget.zip")
        );
        assert_eq!(
            package.source_url.as_deref(),
            Some("https://github.com/acme/widget")
        );
        assert_eq!(
            package.extra.get("instructions").and_then(Value::as_str),
            Some("Run migrations.")
        );
    }

    #[test]
    fn test_php_empty_array_maps() {
        // PHP serializes empty associative arrays as JSON arrays.
        let package: Package = serde_json::from_value(json!({
            "name": "acme/widget",
            "require": [],
            "extra": [],
            "support": []
        }))
        .unwrap();

        assert!(package.require.is_empty());
        assert!(package.extra.is_empty());
        assert!(package.support.is_empty());
    }

    #[test]
    fn test_author_list() {
        let package: Package = serde_json::from_value(json!({
            "name": "acme/widget",
            "author": [{"name": "Ada"}, {"name": "Grace", "email": "g@example.com"}]
        }))
        .unwrap();

        assert_eq!(package.author, "Ada, Grace");
    }

    #[test]
    fn test_serialized_form_round_trips() {
        let mut package = Package::new("acme/widget");
        package.dist_url = Some("https://acme.example/widget.zip".to_string());
        package.origin = "official".to_string();

        let value = serde_json::to_value(&package).unwrap();
        assert_eq!(value["repository"], "official");

        let back: Package = serde_json::from_value(value).unwrap();
        assert_eq!(back, package);
    }

    #[test]
    fn test_display_name() {
        assert_eq!(Package::new("acme/widget").display_name(), "acme/widget");
        assert_eq!(Package::default().display_name(), "(unnamed)");
    }

    #[test]
    fn test_short_description() {
        let mut package = Package::new("acme/widget");
        package.description = "short".to_string();
        assert_eq!(package.short_description(), "short");

        package.description = "x".repeat(150);
        let short = package.short_description();
        assert_eq!(short.chars().count(), 100);
        assert!(short.ends_with("..."));
    }

    #[test]
    fn test_is_valid() {
        assert!(Package::new("acme/widget").is_valid());
        assert!(Package::new("acme/my-widget_2.x").is_valid());
        assert!(!Package::new("").is_valid());
        assert!(!Package::new("widget").is_valid());
        assert!(!Package::new("Acme/Widget").is_valid());
        assert!(!Package::new("acme/widget/extra").is_valid());
        assert!(!Package::new("-acme/widget").is_valid());
    }
}
