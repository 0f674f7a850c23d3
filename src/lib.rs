//! Extras - a package manager for CMS extras
//!
//! This crate provides the library behind the `extras` CLI: remote package
//! sources and their aggregation, the composer.json manifest adapter, and
//! the install/update/remove workflows with batch execution.

pub mod core;
pub mod manifest;
pub mod ops;
pub mod sources;
pub mod util;

/// Test doubles and fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::Package;
pub use crate::manifest::Composer;
pub use crate::ops::{BatchOptions, BatchReport, ExtrasService, ServiceError};
pub use crate::sources::{Source, SourceError, SourceSet};
pub use crate::util::Config;
