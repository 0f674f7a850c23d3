//! composer.json manipulation and resolver invocation.
//!
//! Install, remove and update all follow the same shape: rewrite the
//! `require` table in the project manifest, then hand the project to the
//! external `composer` binary to resolve and fetch. The manifest edit is
//! never rolled back when the resolver fails; the next run picks the
//! constraint up again.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use crate::util::fs::write_string;
use crate::util::process::{find_executable, ProcessBuilder};

/// File name of the project manifest.
pub const MANIFEST_NAME: &str = "composer.json";

const DEFAULT_BIN: &str = "composer";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Map a requested version onto a composer constraint.
///
/// An empty or `latest` request means "whatever resolves", spelled `*`.
pub fn constraint_for(version: &str) -> String {
    let version = version.trim();
    if version.is_empty() || version.eq_ignore_ascii_case("latest") {
        "*".to_string()
    } else {
        version.to_string()
    }
}

/// Adapter around a project's composer.json and the composer binary.
///
/// Manifest edits and resolver runs are serialized through an internal
/// lock, so a shared instance is safe to drive from a thread pool.
pub struct Composer {
    project_root: PathBuf,
    bin: String,
    timeout: Duration,
    lock: Mutex<()>,
}

impl Composer {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Composer {
            project_root: project_root.into(),
            bin: DEFAULT_BIN.to_string(),
            timeout: DEFAULT_TIMEOUT,
            lock: Mutex::new(()),
        }
    }

    /// Use a different resolver binary (name or path).
    pub fn with_bin(mut self, bin: impl Into<String>) -> Self {
        self.bin = bin.into();
        self
    }

    /// Cap a single resolver run at `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.project_root.join(MANIFEST_NAME)
    }

    /// Read the manifest, degrading to an empty document.
    ///
    /// A missing file, unreadable file, invalid JSON or a non-object
    /// top level all come back as an empty map; a fresh project has no
    /// manifest yet and that is not an error.
    pub fn read_manifest(&self) -> Map<String, Value> {
        let path = self.manifest_path();
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Map::new(),
            Err(e) => {
                tracing::debug!("failed to read {}: {e}", path.display());
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(manifest)) => manifest,
            Ok(_) => {
                tracing::debug!("{} is not a JSON object, treating as empty", path.display());
                Map::new()
            }
            Err(e) => {
                tracing::debug!("{} is not valid JSON ({e}), treating as empty", path.display());
                Map::new()
            }
        }
    }

    /// Write the manifest back, pretty-printed with a trailing newline.
    pub fn write_manifest(&self, manifest: &Map<String, Value>) -> Result<()> {
        let rendered = serde_json::to_string_pretty(manifest)
            .context("failed to serialize composer.json")?;
        write_string(&self.manifest_path(), &format!("{rendered}\n"))
    }

    /// The `require` table as `name -> constraint`, sorted by name.
    ///
    /// Constraints that are not strings are skipped.
    pub fn installed(&self) -> BTreeMap<String, String> {
        self.read_manifest()
            .get("require")
            .and_then(Value::as_object)
            .map(|require| {
                require
                    .iter()
                    .filter_map(|(name, constraint)| {
                        constraint.as_str().map(|c| (name.clone(), c.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.installed().contains_key(name)
    }

    /// Record `name` at `constraint` in `require` and run the resolver.
    ///
    /// Returns whether the resolver run succeeded. The manifest keeps the
    /// new constraint either way.
    pub fn install(&self, name: &str, constraint: &str) -> Result<bool> {
        let _guard = self.lock.lock().unwrap();

        let mut manifest = self.read_manifest();
        let require = manifest
            .entry("require")
            .or_insert_with(|| Value::Object(Map::new()));
        if !require.is_object() {
            // PHP tooling writes empty maps as `[]`; heal to an object.
            *require = Value::Object(Map::new());
        }
        if let Some(require) = require.as_object_mut() {
            require.insert(name.to_string(), Value::String(constraint.to_string()));
        }
        self.write_manifest(&manifest)?;

        self.run_resolver()
    }

    /// Drop `name` from `require` and run the resolver.
    ///
    /// Returns `Ok(false)` without touching the file when the package is
    /// not in the manifest.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let _guard = self.lock.lock().unwrap();

        let mut manifest = self.read_manifest();
        let removed = manifest
            .get_mut("require")
            .and_then(Value::as_object_mut)
            .map(|require| require.remove(name).is_some())
            .unwrap_or(false);
        if !removed {
            return Ok(false);
        }
        self.write_manifest(&manifest)?;

        self.run_resolver()
    }

    /// Re-pin `name` to `constraint`. Same manifest edit as an install.
    pub fn update(&self, name: &str, constraint: &str) -> Result<bool> {
        self.install(name, constraint)
    }

    fn run_resolver(&self) -> Result<bool> {
        let Some(bin) = find_executable(&self.bin) else {
            tracing::warn!("`{}` not found in PATH, skipping resolver run", self.bin);
            return Ok(false);
        };

        let builder = ProcessBuilder::new(bin)
            .args(["install", "--no-interaction"])
            .cwd(&self.project_root)
            .env(
                "COMPOSER_PROCESS_TIMEOUT",
                self.timeout.as_secs().to_string(),
            );
        tracing::debug!("running `{}`", builder.display_command());

        match builder.status() {
            Ok(status) => Ok(status.success()),
            Err(e) => {
                tracing::warn!("{e:#}");
                Ok(false)
            }
        }
    }
}
