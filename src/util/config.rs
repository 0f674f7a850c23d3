//! Configuration file support for extras.
//!
//! Extras supports two configuration file locations:
//! - Global: `~/.extras/config.toml` - User-wide defaults
//! - Project: `.extras/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. The
//! `EXTRAS_CONFIG` environment variable points at an alternate global
//! file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Base URL of the official extras API.
pub const DEFAULT_API_URL: &str = "https://extras.example.com/api/v1";

/// GitHub organization of the community extras.
pub const DEFAULT_GITHUB_ORG: &str = "cms-extras";

const DEFAULT_TIMEOUT_SECS: u64 = 300;
const DEFAULT_TTL_SECS: u64 = 3600;

/// Extras configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the official API
    pub api_url: Option<String>,

    /// Composer settings
    pub composer: ComposerConfig,

    /// Metadata cache settings
    pub cache: CacheConfig,

    /// Package sources, in priority order. When set, this replaces the
    /// built-in default set rather than appending to it.
    pub sources: Option<Vec<SourceConfig>>,
}

/// Composer-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    /// Resolver binary name or path (default: `composer` from PATH)
    pub bin: Option<String>,

    /// Directory holding composer.json (default: working directory)
    pub project_path: Option<PathBuf>,

    /// Resolver run timeout in seconds
    pub timeout_secs: Option<u64>,
}

/// Metadata cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache remote responses at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Entry lifetime in seconds
    pub ttl_secs: Option<u64>,

    /// Cache directory (default: `~/.extras/cache`)
    pub dir: Option<PathBuf>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            enabled: true,
            ttl_secs: None,
            dir: None,
        }
    }
}

/// What kind of backend a source entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Api,
    Github,
}

/// One configured package source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(rename = "type")]
    pub kind: SourceKind,

    /// Identity used for provenance and priority dedup
    pub name: String,

    /// API base URL; `api` entries fall back to the top-level `api_url`
    #[serde(default)]
    pub url: Option<String>,

    /// GitHub organization; required for `github` entries
    #[serde(default)]
    pub organization: Option<String>,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(self).with_context(|| "failed to serialize config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.api_url.is_some() {
            self.api_url = other.api_url;
        }

        // Composer settings
        if other.composer.bin.is_some() {
            self.composer.bin = other.composer.bin;
        }
        if other.composer.project_path.is_some() {
            self.composer.project_path = other.composer.project_path;
        }
        if other.composer.timeout_secs.is_some() {
            self.composer.timeout_secs = other.composer.timeout_secs;
        }

        // Cache settings; enabled defaults to true, so only a disable
        // carries over
        if !other.cache.enabled {
            self.cache.enabled = false;
        }
        if other.cache.ttl_secs.is_some() {
            self.cache.ttl_secs = other.cache.ttl_secs;
        }
        if other.cache.dir.is_some() {
            self.cache.dir = other.cache.dir;
        }

        // A configured source list replaces the inherited one wholesale
        if other.sources.is_some() {
            self.sources = other.sources;
        }
    }

    /// Resolved API base URL.
    pub fn api_url(&self) -> String {
        self.api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_API_URL.to_string())
    }

    /// Resolved composer binary name.
    pub fn composer_bin(&self) -> String {
        self.composer
            .bin
            .clone()
            .unwrap_or_else(|| "composer".to_string())
    }

    /// Configured project directory, if any.
    pub fn project_path(&self) -> Option<PathBuf> {
        self.composer.project_path.clone()
    }

    /// Resolver run timeout.
    pub fn composer_timeout(&self) -> Duration {
        Duration::from_secs(self.composer.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Cache entry lifetime.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs.unwrap_or(DEFAULT_TTL_SECS))
    }

    /// Resolved cache directory.
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.cache
            .dir
            .clone()
            .or_else(|| global_config_dir().map(|dir| dir.join("cache")))
    }

    /// Source entries in priority order.
    ///
    /// Without explicit `[[sources]]` this is the official API followed
    /// by the community GitHub organization.
    pub fn source_entries(&self) -> Vec<SourceConfig> {
        self.sources.clone().unwrap_or_else(|| {
            vec![
                SourceConfig {
                    kind: SourceKind::Api,
                    name: "official".to_string(),
                    url: None,
                    organization: None,
                    enabled: true,
                },
                SourceConfig {
                    kind: SourceKind::Github,
                    name: "community".to_string(),
                    url: None,
                    organization: Some(DEFAULT_GITHUB_ORG.to_string()),
                    enabled: true,
                },
            ]
        })
    }
}

/// Get the global extras config directory (~/.extras).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".extras"))
}

/// Get the global config path, honoring `EXTRAS_CONFIG`.
pub fn global_config_path() -> Option<PathBuf> {
    match std::env::var("EXTRAS_CONFIG") {
        Ok(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => global_config_dir().map(|dir| dir.join("config.toml")),
    }
}

/// Get the project config path (.extras/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".extras").join("config.toml")
}

/// Load merged configuration from explicit global and project paths.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.extras/config.toml)
/// 2. Global config (~/.extras/config.toml)
/// 3. Defaults
pub fn load_config(global_path: &Path, project_path: &Path) -> Config {
    let mut config = Config::default();

    // Load global config first
    if global_path.exists() {
        let global = Config::load_or_default(global_path);
        config.merge(global);
    }

    // Project config overrides global
    if project_path.exists() {
        let project = Config::load_or_default(project_path);
        config.merge(project);
    }

    config
}

/// Load merged configuration for a project directory.
pub fn load_merged(project_root: &Path) -> Config {
    let global = global_config_path().unwrap_or_else(|| PathBuf::from(".extras/config.toml"));
    load_config(&global, &project_config_path(project_root))
}
