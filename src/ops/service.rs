//! High-level package operations tying remote sources to the local
//! project.

use std::collections::BTreeMap;

use thiserror::Error;

use crate::core::Package;
use crate::manifest::composer::{constraint_for, Composer};
use crate::sources::SourceSet;

/// Failure of a single high-level operation.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("package `{0}` not found in any source")]
    PackageNotFound(String),
    #[error("installation of `{name}` failed: {reason}")]
    InstallationFailed { name: String, reason: String },
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Sources plus a project manifest, with the operations the CLI exposes.
///
/// The service is shared across batch workers; the composer adapter
/// underneath serializes manifest edits and resolver runs.
pub struct ExtrasService {
    sources: SourceSet,
    composer: Composer,
}

impl ExtrasService {
    pub fn new(sources: SourceSet, composer: Composer) -> Self {
        ExtrasService { sources, composer }
    }

    pub fn sources(&self) -> &SourceSet {
        &self.sources
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    /// The merged catalog, keyed by package name.
    pub fn available(&self) -> BTreeMap<String, Package> {
        self.sources
            .list_all()
            .into_iter()
            .map(|package| (package.name.clone(), package))
            .collect()
    }

    pub fn search(&self, query: &str) -> Vec<Package> {
        self.sources.search(query)
    }

    pub fn find(&self, name: &str) -> Option<Package> {
        self.sources.find(name)
    }

    /// Packages recorded in the project manifest, `name -> constraint`.
    pub fn installed(&self) -> BTreeMap<String, String> {
        self.composer.installed()
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.composer.is_installed(name)
    }

    /// Resolve `name` against the sources, then record and install it.
    ///
    /// An unknown package fails before the manifest is touched. Once the
    /// descriptor resolves, a failed resolver run leaves the recorded
    /// constraint in place and reports the failure.
    pub fn install(&self, name: &str, version: &str) -> Result<Package, ServiceError> {
        let package = self
            .sources
            .find(name)
            .ok_or_else(|| ServiceError::PackageNotFound(name.to_string()))?;

        let constraint = constraint_for(version);
        match self.composer.install(name, &constraint) {
            Ok(true) => Ok(package),
            Ok(false) => Err(ServiceError::InstallationFailed {
                name: name.to_string(),
                reason: "composer install failed".to_string(),
            }),
            Err(e) => Err(ServiceError::InstallationFailed {
                name: name.to_string(),
                reason: format!("{e:#}"),
            }),
        }
    }

    /// Remove `name` from the project.
    ///
    /// The catalog is not consulted; a package stays removable after its
    /// source has disappeared. `Ok(false)` means there was nothing to
    /// remove.
    pub fn remove(&self, name: &str) -> Result<bool, ServiceError> {
        Ok(self.composer.remove(name)?)
    }

    /// Re-pin `name` to `version` and re-run the resolver.
    ///
    /// Like `remove`, this skips the catalog and operates on whatever
    /// the manifest says.
    pub fn update(&self, name: &str, version: &str) -> Result<bool, ServiceError> {
        Ok(self.composer.update(name, &constraint_for(version))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{full_package, package, StaticSource};

    fn service(dir: &std::path::Path, sources: Vec<StaticSource>, bin: &str) -> ExtrasService {
        let mut set = SourceSet::new();
        for source in sources {
            set.add(Box::new(source));
        }
        ExtrasService::new(set, Composer::new(dir).with_bin(bin))
    }

    #[test]
    fn test_install_unknown_package_is_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), vec![StaticSource::new("official")], "true");

        let err = service.install("acme/widget", "latest").unwrap_err();
        assert!(matches!(err, ServiceError::PackageNotFound(_)));
        assert!(err.to_string().contains("not found in any source"));

        // Resolution failed before any manifest edit.
        assert!(!service.composer().manifest_path().exists());
    }

    #[test]
    fn test_install_records_constraint_and_reports_provenance() {
        let dir = tempfile::tempdir().unwrap();
        let source =
            StaticSource::new("official").with_package(full_package("acme/widget", "2.1.0"));
        let service = service(dir.path(), vec![source], "true");

        let installed = service.install("acme/widget", "^2.0").unwrap();
        assert_eq!(installed.origin, "official");
        assert_eq!(installed.version, "2.1.0");
        // The resolved descriptor comes back intact for display.
        assert_eq!(installed.license, "MIT");
        assert_eq!(service.installed()["acme/widget"], "^2.0");
    }

    #[test]
    fn test_install_latest_becomes_wildcard() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource::new("official").with_package(package("acme/widget", "1.0.0"));
        let service = service(dir.path(), vec![source], "true");

        service.install("acme/widget", "latest").unwrap();
        assert_eq!(service.installed()["acme/widget"], "*");
    }

    #[test]
    fn test_failed_resolver_keeps_manifest_edit() {
        let dir = tempfile::tempdir().unwrap();
        let source = StaticSource::new("official").with_package(package("acme/widget", "1.0.0"));
        let service = service(dir.path(), vec![source], "false");

        let err = service.install("acme/widget", "^1.0").unwrap_err();
        assert!(matches!(err, ServiceError::InstallationFailed { .. }));

        // No rollback: the constraint survives for the next run.
        assert_eq!(service.installed()["acme/widget"], "^1.0");
    }

    #[test]
    fn test_remove_skips_catalog() {
        let dir = tempfile::tempdir().unwrap();
        // No sources at all; removal must still work.
        let service = service(dir.path(), Vec::new(), "true");

        std::fs::write(
            service.composer().manifest_path(),
            r#"{"require": {"gone/pkg": "^1.0"}}"#,
        )
        .unwrap();

        assert!(service.remove("gone/pkg").unwrap());
        assert!(!service.is_installed("gone/pkg"));
        assert!(!service.remove("gone/pkg").unwrap());
    }

    #[test]
    fn test_update_skips_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path(), Vec::new(), "true");

        assert!(service.update("acme/widget", "^3.0").unwrap());
        assert_eq!(service.installed()["acme/widget"], "^3.0");

        assert!(service.update("acme/widget", "latest").unwrap());
        assert_eq!(service.installed()["acme/widget"], "*");
    }

    #[test]
    fn test_available_merges_catalogs() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(
            dir.path(),
            vec![
                StaticSource::new("official").with_package(package("acme/widget", "1.0.0")),
                StaticSource::new("community").with_package(package("acme/gadget", "0.3.0")),
            ],
            "true",
        );

        let catalog = service.available();
        let names: Vec<&str> = catalog.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["acme/gadget", "acme/widget"]);
        assert_eq!(catalog["acme/widget"].origin, "official");
    }
}
