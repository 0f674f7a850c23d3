//! Test fixtures for common test scenarios.

use crate::core::Package;

/// A minimal package descriptor.
pub fn package(name: &str, version: &str) -> Package {
    let mut package = Package::new(name);
    package.version = version.to_string();
    package.description = format!("Test fixture for {name}");
    package
}

/// A package descriptor with the richer metadata fields filled in.
pub fn full_package(name: &str, version: &str) -> Package {
    let mut package = package(name, version);
    package.kind = "cms-extra".to_string();
    package.author = "Fixture Author".to_string();
    package.license = "MIT".to_string();
    package.homepage = format!("https://example.com/{name}");
    package.keywords = vec!["fixture".to_string()];
    package
        .require
        .insert("php".to_string(), ">=8.1".to_string());
    package
}

/// Render a composer.json document with the given `require` entries.
pub fn manifest_json(require: &[(&str, &str)]) -> String {
    let entries: Vec<String> = require
        .iter()
        .map(|(name, constraint)| format!("    \"{name}\": \"{constraint}\""))
        .collect();
    format!("{{\n  \"require\": {{\n{}\n  }}\n}}\n", entries.join(",\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_packages_are_valid() {
        assert!(package("acme/widget", "1.0.0").is_valid());
        assert!(full_package("acme/widget", "1.0.0").is_valid());
    }

    #[test]
    fn test_manifest_json_parses() {
        let raw = manifest_json(&[("acme/widget", "^1.0"), ("acme/gadget", "*")]);
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["require"]["acme/widget"], "^1.0");
        assert_eq!(value["require"]["acme/gadget"], "*");
    }
}
